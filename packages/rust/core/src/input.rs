//! Validation of untyped form input into a typed [`ToolInput`].
//!
//! Runs before any network call; every failure is a validation error.

use url::Url;

use playground_shared::{FormData, PlaygroundError, Result, ToolKind};

/// Direction of the translate tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranslateMode {
    /// Natural-language request to code.
    ToCode,
    /// Code to plain-English explanation.
    Explain,
}

impl TranslateMode {
    /// `"to-code"` selects [`TranslateMode::ToCode`]; anything else explains.
    pub fn from_form(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some("to-code") => Self::ToCode,
            _ => Self::Explain,
        }
    }
}

/// A validated request for one tool.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolInput {
    Extract { text: String, fields: Vec<String> },
    Repurpose { url: Url },
    Scout { url: Url },
    Translate { input: String, mode: TranslateMode },
}

impl ToolInput {
    /// Validate `form` for `kind`.
    pub fn from_form(kind: ToolKind, form: &FormData) -> Result<Self> {
        match kind {
            ToolKind::Extract => {
                const MISSING: &str = "Please provide both text and fields.";
                let text = form.non_blank("text").ok_or_else(|| PlaygroundError::validation(MISSING))?;
                let raw_fields = form.non_blank("fields").ok_or_else(|| PlaygroundError::validation(MISSING))?;
                let fields = parse_fields(raw_fields);
                if fields.is_empty() {
                    return Err(PlaygroundError::validation(MISSING));
                }
                Ok(Self::Extract {
                    text: text.to_string(),
                    fields,
                })
            }
            ToolKind::Repurpose => Ok(Self::Repurpose {
                url: document_url(form, "Please provide a URL.")?,
            }),
            ToolKind::Scout => Ok(Self::Scout {
                url: document_url(form, "Please provide a Company URL.")?,
            }),
            ToolKind::Translate => {
                let input = form
                    .non_blank("input")
                    .ok_or_else(|| PlaygroundError::validation("Please provide input."))?;
                Ok(Self::Translate {
                    input: input.to_string(),
                    mode: TranslateMode::from_form(form.get("mode")),
                })
            }
        }
    }
}

/// Split a comma-separated field list: trimmed, blanks dropped, first occurrence wins.
pub fn parse_fields(raw: &str) -> Vec<String> {
    let mut fields: Vec<String> = Vec::new();
    for field in raw.split(',').map(str::trim).filter(|f| !f.is_empty()) {
        if !fields.iter().any(|f| f == field) {
            fields.push(field.to_string());
        }
    }
    fields
}

/// Read the `url` field as an absolute http(s) URL.
fn document_url(form: &FormData, missing: &str) -> Result<Url> {
    let raw = form
        .non_blank("url")
        .ok_or_else(|| PlaygroundError::validation(missing))?;

    let url = Url::parse(raw).map_err(|_| {
        PlaygroundError::validation(format!("'{raw}' is not a valid absolute URL."))
    })?;

    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(PlaygroundError::validation(format!(
            "'{raw}' must be an http or https URL."
        )));
    }

    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use playground_shared::ErrorKind;

    fn validation_message(kind: ToolKind, form: FormData) -> String {
        let err = ToolInput::from_form(kind, &form).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        err.to_string()
    }

    #[test]
    fn empty_primary_input_fails_for_every_tool() {
        for kind in ToolKind::ALL {
            let form = FormData::new()
                .with("text", "")
                .with("url", "  ")
                .with("input", "")
                .with("fields", "Name");
            validation_message(kind, form);
        }
    }

    #[test]
    fn extract_requires_fields() {
        let msg = validation_message(ToolKind::Extract, FormData::new().with("text", "John, 42"));
        assert_eq!(msg, "Please provide both text and fields.");

        let msg = validation_message(
            ToolKind::Extract,
            FormData::new().with("text", "John").with("fields", " , ,"),
        );
        assert_eq!(msg, "Please provide both text and fields.");
    }

    #[test]
    fn extract_parses_fields() {
        let form = FormData::new()
            .with("text", "John Smith, john@example.com")
            .with("fields", "Name, Email ,Name,,Phone");
        let input = ToolInput::from_form(ToolKind::Extract, &form).unwrap();
        assert_eq!(
            input,
            ToolInput::Extract {
                text: "John Smith, john@example.com".into(),
                fields: vec!["Name".into(), "Email".into(), "Phone".into()],
            }
        );
    }

    #[test]
    fn url_tools_have_their_own_messages() {
        assert_eq!(
            validation_message(ToolKind::Repurpose, FormData::new()),
            "Please provide a URL."
        );
        assert_eq!(
            validation_message(ToolKind::Scout, FormData::new()),
            "Please provide a Company URL."
        );
    }

    #[test]
    fn url_must_be_absolute_http() {
        let msg = validation_message(
            ToolKind::Repurpose,
            FormData::new().with("url", "example.com/blog"),
        );
        assert!(msg.contains("not a valid absolute URL"));

        let msg = validation_message(
            ToolKind::Scout,
            FormData::new().with("url", "ftp://example.com/file"),
        );
        assert!(msg.contains("http or https"));
    }

    #[test]
    fn url_is_trimmed_and_parsed() {
        let form = FormData::new().with("url", "  https://acme.example/about  ");
        let input = ToolInput::from_form(ToolKind::Scout, &form).unwrap();
        match input {
            ToolInput::Scout { url } => assert_eq!(url.as_str(), "https://acme.example/about"),
            other => panic!("expected Scout, got {other:?}"),
        }
    }

    #[test]
    fn translate_mode_defaults_to_explain() {
        assert_eq!(TranslateMode::from_form(Some("to-code")), TranslateMode::ToCode);
        assert_eq!(TranslateMode::from_form(Some("explain")), TranslateMode::Explain);
        assert_eq!(TranslateMode::from_form(Some("anything")), TranslateMode::Explain);
        assert_eq!(TranslateMode::from_form(None), TranslateMode::Explain);

        let form = FormData::new().with("input", "find emails").with("mode", "to-code");
        let input = ToolInput::from_form(ToolKind::Translate, &form).unwrap();
        assert!(matches!(
            input,
            ToolInput::Translate { mode: TranslateMode::ToCode, .. }
        ));
    }
}
