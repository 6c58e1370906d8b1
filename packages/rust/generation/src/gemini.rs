//! Gemini backend over the Generative Language REST API.
//!
//! `POST {base_url}/v1beta/models/{model}:generateContent` with the API key
//! in the `x-goog-api-key` header. Object calls set
//! `responseMimeType = "application/json"` and a `responseSchema`.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, info, instrument, warn};

use playground_shared::{GenerationConfig, PlaygroundError, Result, resolve_api_key};

use crate::backend::GenerationBackend;
use crate::schema::OutputSchema;

/// Connection settings for [`GeminiBackend`].
#[derive(Clone)]
pub struct GeminiConfig {
    pub base_url: String,
    pub model: String,
    pub api_key: String,
}

impl std::fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

impl GeminiConfig {
    /// Build from the `[generation]` section, reading the key from its env var.
    pub fn from_settings(settings: &GenerationConfig) -> Result<Self> {
        Ok(Self {
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            model: settings.model.clone(),
            api_key: resolve_api_key(&settings.api_key_env)?,
        })
    }
}

/// [`GenerationBackend`] backed by Gemini.
#[derive(Debug, Clone)]
pub struct GeminiBackend {
    config: GeminiConfig,
    client: Client,
}

impl GeminiBackend {
    pub fn new(config: GeminiConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("playground/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| PlaygroundError::config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { config, client })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.base_url, self.config.model
        )
    }

    /// Send one `generateContent` request and return the candidate text.
    async fn generate_content(&self, body: Value) -> Result<String> {
        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| PlaygroundError::Generation(format!("generation request failed: {e}")))?;

        let status = response.status();
        let text = response.text().await.map_err(|e| {
            PlaygroundError::Generation(format!("failed to read generation response: {e}"))
        })?;

        if !status.is_success() {
            warn!(status = status.as_u16(), "generation API returned error status");
            return Err(http_error(status.as_u16(), &text));
        }

        let parsed: GenerateContentResponse = serde_json::from_str(&text).map_err(|e| {
            PlaygroundError::Generation(format!(
                "invalid generation response: {e} (got: {})",
                excerpt(&text)
            ))
        })?;

        if let Some(usage) = &parsed.usage_metadata {
            debug!(
                tokens_in = usage.prompt_token_count,
                tokens_out = usage.candidates_token_count,
                "generation usage"
            );
        }

        parsed.into_text()
    }
}

#[async_trait]
impl GenerationBackend for GeminiBackend {
    fn name(&self) -> &str {
        "gemini"
    }

    fn model(&self) -> &str {
        &self.config.model
    }

    #[instrument(skip_all, fields(model = %self.config.model, prompt_chars = prompt.len()))]
    async fn generate_object(&self, prompt: &str, schema: &OutputSchema) -> Result<Value> {
        let body = json!({
            "contents": [{ "role": "user", "parts": [{ "text": prompt }] }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": schema.to_json(),
            },
        });

        let text = self.generate_content(body).await?;
        let value = serde_json::from_str(text.trim()).map_err(|e| {
            PlaygroundError::Generation(format!(
                "model returned malformed JSON: {e} (got: {})",
                excerpt(&text)
            ))
        })?;

        info!("structured generation complete");
        Ok(value)
    }

    #[instrument(skip_all, fields(model = %self.config.model, prompt_chars = prompt.len()))]
    async fn generate_text(&self, prompt: &str) -> Result<String> {
        let body = json!({
            "contents": [{ "role": "user", "parts": [{ "text": prompt }] }],
        });

        let text = self.generate_content(body).await?;
        info!(chars = text.len(), "text generation complete");
        Ok(text)
    }
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<Content>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u64,
    #[serde(default)]
    candidates_token_count: u64,
}

impl GenerateContentResponse {
    fn into_text(self) -> Result<String> {
        if let Some(reason) = self.prompt_feedback.and_then(|f| f.block_reason) {
            return Err(PlaygroundError::Generation(format!(
                "prompt was blocked by the model: {reason}"
            )));
        }

        let candidate = self.candidates.into_iter().next().ok_or_else(|| {
            PlaygroundError::Generation("model returned no candidates".into())
        })?;

        let text: String = candidate
            .content
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if text.trim().is_empty() {
            let reason = candidate.finish_reason.unwrap_or_else(|| "UNKNOWN".into());
            return Err(PlaygroundError::Generation(format!(
                "model returned an empty response (finish reason: {reason})"
            )));
        }

        Ok(text)
    }
}

/// Map an error status to a generation error, preferring the API's own message.
fn http_error(status: u16, body: &str) -> PlaygroundError {
    let detail = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(String::from))
        .unwrap_or_else(|| excerpt(body).to_string());

    let message = match status {
        400 => format!("invalid generation request: {detail}"),
        401 | 403 => format!("generation API rejected the credentials: {detail}"),
        404 => format!("model not found: {detail}"),
        429 => format!("generation API rate limited: {detail}"),
        500..=599 => format!("generation API unavailable (HTTP {status}): {detail}"),
        _ => format!("HTTP {status}: {detail}"),
    };
    PlaygroundError::Generation(message)
}

fn excerpt(text: &str) -> &str {
    match text.char_indices().nth(200) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
