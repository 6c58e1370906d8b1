//! Contact-form relay to a Resend-compatible email API.

use std::collections::BTreeMap;
use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use reqwest::Client;
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use playground_shared::{ContactConfig, FormData, PlaygroundError, Result, resolve_api_key};

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid regex"));

/// What the visitor is asking about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InquiryType {
    Consultation,
    Development,
    Legacy,
    Other,
}

impl InquiryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Consultation => "consultation",
            Self::Development => "development",
            Self::Legacy => "legacy",
            Self::Other => "other",
        }
    }
}

impl std::str::FromStr for InquiryType {
    type Err = PlaygroundError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "consultation" => Ok(Self::Consultation),
            "development" => Ok(Self::Development),
            "legacy" => Ok(Self::Legacy),
            "other" => Ok(Self::Other),
            other => Err(PlaygroundError::validation(format!(
                "unknown inquiry type '{other}'"
            ))),
        }
    }
}

/// Per-field validation messages, keyed by form field name.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// A validated contact submission.
#[derive(Debug, Clone, PartialEq)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub inquiry: InquiryType,
    pub message: String,
}

impl ContactForm {
    /// Validate every field, collecting all failures rather than stopping at the first.
    pub fn from_form(form: &FormData) -> std::result::Result<Self, FieldErrors> {
        let mut errors = FieldErrors::new();
        let mut reject = |field: &str, message: &str| {
            errors
                .entry(field.to_string())
                .or_default()
                .push(message.to_string());
        };

        let name = form.get("name").unwrap_or("").trim();
        if name.chars().count() < 2 {
            reject("name", "Name is required");
        }

        let email = form.get("email").unwrap_or("").trim();
        if !EMAIL_RE.is_match(email) {
            reject("email", "Invalid email address");
        }

        let inquiry = form.get("type").unwrap_or("").trim().parse::<InquiryType>();
        if inquiry.is_err() {
            reject("type", "Invalid inquiry type");
        }

        let message = form.get("message").unwrap_or("").trim();
        if message.chars().count() < 10 {
            reject("message", "Message must be at least 10 characters");
        }

        match inquiry {
            Ok(inquiry) if errors.is_empty() => Ok(Self {
                name: name.to_string(),
                email: email.to_string(),
                inquiry,
                message: message.to_string(),
            }),
            _ => Err(errors),
        }
    }
}

/// Outcome of a contact submission, shaped for the form that posted it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContactState {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub errors: FieldErrors,
}

impl ContactState {
    fn sent() -> Self {
        Self {
            success: true,
            message: Some("Message sent successfully!".into()),
            errors: FieldErrors::new(),
        }
    }

    fn invalid(errors: FieldErrors) -> Self {
        Self {
            success: false,
            message: Some("Validation failed".into()),
            errors,
        }
    }

    fn failed() -> Self {
        Self {
            success: false,
            message: Some("Failed to send message. Please try again.".into()),
            errors: FieldErrors::new(),
        }
    }
}

#[derive(Debug, Serialize)]
struct OutboundEmail<'a> {
    from: &'a str,
    to: &'a str,
    reply_to: &'a str,
    subject: String,
    text: String,
    html: String,
}

/// Relays validated contact submissions as email.
#[derive(Clone)]
pub struct ContactRelay {
    config: ContactConfig,
    api_key: String,
    client: Client,
}

impl std::fmt::Debug for ContactRelay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContactRelay")
            .field("base_url", &self.config.base_url)
            .field("to", &self.config.to)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

impl ContactRelay {
    pub fn new(config: ContactConfig, api_key: impl Into<String>) -> Result<Self> {
        if config.to.trim().is_empty() {
            return Err(PlaygroundError::config(
                "contact.to must name the address that receives inquiries",
            ));
        }

        let mut builder = Client::builder();
        if config.timeout_secs > 0 {
            builder = builder.timeout(Duration::from_secs(config.timeout_secs));
        }
        let client = builder
            .build()
            .map_err(|e| PlaygroundError::config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            config,
            api_key: api_key.into(),
            client,
        })
    }

    /// Build from the `[contact]` section, reading the key from its env var.
    pub fn from_config(config: &ContactConfig) -> Result<Self> {
        let api_key = resolve_api_key(&config.api_key_env)?;
        Self::new(config.clone(), api_key)
    }

    /// Validate and relay one submission. Never fails; problems are reported in the state.
    #[instrument(skip_all)]
    pub async fn send(&self, form: &FormData) -> ContactState {
        let contact = match ContactForm::from_form(form) {
            Ok(contact) => contact,
            Err(errors) => {
                debug!(fields = ?errors.keys().collect::<Vec<_>>(), "contact form rejected");
                return ContactState::invalid(errors);
            }
        };

        match self.deliver(&contact).await {
            Ok(()) => {
                info!(inquiry = contact.inquiry.as_str(), "contact message relayed");
                ContactState::sent()
            }
            Err(err) => {
                warn!(error_kind = %err.kind(), error = %err, "contact relay failed");
                ContactState::failed()
            }
        }
    }

    async fn deliver(&self, contact: &ContactForm) -> Result<()> {
        let kind = contact.inquiry.as_str();
        let email = OutboundEmail {
            from: &self.config.from,
            to: &self.config.to,
            reply_to: &contact.email,
            subject: format!(
                "{} New {kind} Inquiry from {}",
                self.config.subject_prefix, contact.name
            ),
            text: format!(
                "Name: {}\nEmail: {}\nType: {kind}\n\nMessage:\n{}\n",
                contact.name, contact.email, contact.message
            ),
            html: format!(
                "<h2>New Website Inquiry</h2>\n\
                 <p><strong>Name:</strong> {}</p>\n\
                 <p><strong>Email:</strong> {}</p>\n\
                 <p><strong>Type:</strong> {kind}</p>\n\
                 <hr />\n\
                 <h3>Message:</h3>\n\
                 <p style=\"white-space: pre-wrap;\">{}</p>\n",
                escape_html(&contact.name),
                escape_html(&contact.email),
                escape_html(&contact.message),
            ),
        };

        let url = format!("{}/emails", self.config.base_url.trim_end_matches('/'));
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&email)
            .send()
            .await
            .map_err(|e| PlaygroundError::Relay(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PlaygroundError::Relay(format!(
                "email API returned {status}: {}",
                body.trim()
            )));
        }

        Ok(())
    }
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn valid_form() -> FormData {
        FormData::new()
            .with("name", "Ada Lovelace")
            .with("email", "ada@example.com")
            .with("type", "legacy")
            .with("message", "We need help migrating a <COBOL> system.")
    }

    fn relay(server: &MockServer) -> ContactRelay {
        let config = ContactConfig {
            base_url: server.uri(),
            to: "inbox@example.com".into(),
            ..Default::default()
        };
        ContactRelay::new(config, "test-key").unwrap()
    }

    #[test]
    fn collects_every_field_error() {
        let form = FormData::new()
            .with("name", "A")
            .with("email", "not-an-email")
            .with("type", "sales")
            .with("message", "short");
        let errors = ContactForm::from_form(&form).unwrap_err();
        assert_eq!(errors["name"], vec!["Name is required"]);
        assert_eq!(errors["email"], vec!["Invalid email address"]);
        assert_eq!(errors["type"], vec!["Invalid inquiry type"]);
        assert_eq!(errors["message"], vec!["Message must be at least 10 characters"]);
    }

    #[test]
    fn accepts_valid_form() {
        let contact = ContactForm::from_form(&valid_form()).unwrap();
        assert_eq!(contact.inquiry, InquiryType::Legacy);
        assert_eq!(contact.email, "ada@example.com");
    }

    #[test]
    fn escapes_markup() {
        assert_eq!(
            escape_html(r#"<b onclick="x">Tom & 'Jerry'</b>"#),
            "&lt;b onclick=&quot;x&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/b&gt;"
        );
    }

    #[test]
    fn empty_recipient_is_config_error() {
        let err = ContactRelay::new(ContactConfig::default(), "key").unwrap_err();
        assert_eq!(err.kind(), playground_shared::ErrorKind::Config);
    }

    #[tokio::test]
    async fn invalid_form_makes_no_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let state = relay(&server).send(&FormData::new().with("name", "Ada")).await;
        assert!(!state.success);
        assert_eq!(state.message.as_deref(), Some("Validation failed"));
        assert!(!state.errors.contains_key("name"));
        assert!(state.errors.contains_key("email"));
        assert!(state.errors.contains_key("message"));
    }

    #[tokio::test]
    async fn relays_expected_payload() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/emails"))
            .and(header("authorization", "Bearer test-key"))
            .and(body_partial_json(json!({
                "from": "Contact <onboarding@resend.dev>",
                "to": "inbox@example.com",
                "reply_to": "ada@example.com",
                "subject": "[Portfolio] New legacy Inquiry from Ada Lovelace"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "email_1" })))
            .expect(1)
            .mount(&server)
            .await;

        let state = relay(&server).send(&valid_form()).await;
        assert!(state.success);
        assert_eq!(state.message.as_deref(), Some("Message sent successfully!"));
        assert!(state.errors.is_empty());

        let requests = server.received_requests().await.unwrap();
        let body: Value = serde_json::from_slice(&requests[0].body).unwrap();
        let html = body["html"].as_str().unwrap();
        assert!(html.contains("migrating a &lt;COBOL&gt; system."));
        assert!(body["text"].as_str().unwrap().contains("migrating a <COBOL> system."));
    }

    #[tokio::test]
    async fn api_failure_reports_generic_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/emails"))
            .respond_with(ResponseTemplate::new(422).set_body_string("invalid from address"))
            .mount(&server)
            .await;

        let state = relay(&server).send(&valid_form()).await;
        assert!(!state.success);
        assert_eq!(
            state.message.as_deref(),
            Some("Failed to send message. Please try again.")
        );
    }

    #[test]
    fn state_serializes_without_empty_errors() {
        assert_eq!(
            serde_json::to_value(ContactState::sent()).unwrap(),
            json!({ "success": true, "message": "Message sent successfully!" })
        );
    }
}
