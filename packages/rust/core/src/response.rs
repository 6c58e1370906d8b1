//! The envelope every pipeline call resolves to.

use serde::Serialize;

use playground_shared::{ErrorKind, PlaygroundError, ToolKind, ToolResult};

/// `{ success, data?, error? }`. Exactly one of `data` and `error` is set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<ToolResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Classification of the failure, kept for logging and callers.
    #[serde(skip)]
    pub error_kind: Option<ErrorKind>,
}

impl ToolResponse {
    pub fn ok(data: ToolResult) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            error_kind: None,
        }
    }

    /// Flatten `err` into the user-facing message for `kind`.
    pub fn failure(kind: ToolKind, err: &PlaygroundError) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(user_message(kind, err)),
            error_kind: Some(err.kind()),
        }
    }
}

/// Validation messages pass through as-is; everything else gets a
/// tool-specific wrapper around the error's own message.
pub fn user_message(kind: ToolKind, err: &PlaygroundError) -> String {
    if err.kind() == ErrorKind::Validation {
        return err.to_string();
    }

    let detail = err.to_string();
    match kind {
        ToolKind::Repurpose => format!("Failed to process this URL: {detail}"),
        ToolKind::Scout => {
            format!("Could not access the site ({detail}). It might have bot protection.")
        }
        ToolKind::Extract => format!("Failed to extract data: {detail}"),
        ToolKind::Translate => format!("Failed to process request: {detail}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use playground_shared::{CodeTranslation, Conforming};
    use serde_json::json;

    #[test]
    fn success_serializes_without_error() {
        let data = json!({ "output": "SELECT 1;", "language": "SQL", "explanation": "Selects one." });
        let response = ToolResponse::ok(ToolResult::Translation(
            Conforming::<CodeTranslation>::from_value(data).unwrap(),
        ));
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({
                "success": true,
                "data": { "output": "SELECT 1;", "language": "SQL", "explanation": "Selects one." }
            })
        );
    }

    #[test]
    fn failure_serializes_without_data_or_kind() {
        let err = PlaygroundError::http_status(404, "Not Found");
        let response = ToolResponse::failure(ToolKind::Repurpose, &err);
        assert_eq!(response.error_kind, Some(ErrorKind::Fetch));
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({ "success": false, "error": "Failed to process this URL: HTTP 404 Not Found" })
        );
    }

    #[test]
    fn validation_message_is_not_wrapped() {
        let err = PlaygroundError::validation("Please provide input.");
        assert_eq!(user_message(ToolKind::Translate, &err), "Please provide input.");
    }

    #[test]
    fn each_tool_wraps_its_own_way() {
        let err = PlaygroundError::Generation("quota exceeded".into());
        assert_eq!(
            user_message(ToolKind::Scout, &err),
            "Could not access the site (quota exceeded). It might have bot protection."
        );
        assert_eq!(
            user_message(ToolKind::Extract, &err),
            "Failed to extract data: quota exceeded"
        );
        assert_eq!(
            user_message(ToolKind::Translate, &err),
            "Failed to process request: quota exceeded"
        );
    }
}
