//! Request-scoped domain types for the playground pipeline.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use url::Url;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// ToolKind
// ---------------------------------------------------------------------------

/// The four playground demos served by the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolKind {
    /// Structured data extraction from free text.
    Extract,
    /// Turn a webpage into social posts.
    Repurpose,
    /// Analyze a company from its homepage.
    Scout,
    /// Natural language to code, or code to explanation.
    Translate,
}

impl ToolKind {
    pub const ALL: [ToolKind; 4] = [Self::Extract, Self::Repurpose, Self::Scout, Self::Translate];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Extract => "extract",
            Self::Repurpose => "repurpose",
            Self::Scout => "scout",
            Self::Translate => "translate",
        }
    }
}

impl std::fmt::Display for ToolKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ToolKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| format!("unknown tool kind '{s}'"))
    }
}

// ---------------------------------------------------------------------------
// FormData
// ---------------------------------------------------------------------------

/// Untyped key/value form input, as submitted by the UI layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormData(BTreeMap<String, String>);

impl FormData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// The trimmed value for `key`, or `None` when absent or blank.
    pub fn non_blank(&self, key: &str) -> Option<&str> {
        self.get(key).map(str::trim).filter(|v| !v.is_empty())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FormData {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

// ---------------------------------------------------------------------------
// RequestId / ToolRequest
// ---------------------------------------------------------------------------

/// A UUID v7 identifier attached to each invocation for tracing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(pub Uuid);

impl RequestId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One pipeline invocation. Owned by the call and discarded afterwards.
#[derive(Debug, Clone)]
pub struct ToolRequest {
    pub id: RequestId,
    pub kind: ToolKind,
    pub form: FormData,
}

impl ToolRequest {
    pub fn new(kind: ToolKind, form: FormData) -> Self {
        Self {
            id: RequestId::new(),
            kind,
            form,
        }
    }
}

// ---------------------------------------------------------------------------
// FetchedDocument
// ---------------------------------------------------------------------------

/// A remote page after retrieval and cleaning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchedDocument {
    /// The URL that was requested.
    pub source_url: Url,
    /// HTTP status of the final response.
    pub status: u16,
    /// Text of the `<title>` element, whitespace-collapsed.
    pub title: String,
    /// Visible body text: chrome stripped, whitespace collapsed, length-capped.
    pub body_text: String,
    pub fetched_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// ToolResult
// ---------------------------------------------------------------------------

/// One extracted record, keyed by the requested field names.
pub type ExtractedRecord = serde_json::Map<String, serde_json::Value>;

/// Social-post set produced by the repurpose tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepurposedContent {
    pub tweet: String,
    pub linkedin: String,
    pub newsletter: String,
    pub summary: String,
}

/// Company analysis produced by the scout tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyAnalysis {
    pub one_liner: String,
    pub target_audience: String,
    pub value_props: Vec<String>,
    pub competitors: Vec<String>,
    pub rating: f64,
    pub improvement: String,
}

/// Code or explanation produced by the translate tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeTranslation {
    pub output: String,
    pub language: String,
    pub explanation: String,
}

/// A backend object that passed schema validation, with a typed view of it.
///
/// Serializes as the JSON it was read from, so integer numbers and keys the
/// typed view does not know about survive unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct Conforming<T> {
    typed: T,
    raw: serde_json::Value,
}

impl<T: DeserializeOwned> Conforming<T> {
    pub fn from_value(raw: serde_json::Value) -> serde_json::Result<Self> {
        let typed = T::deserialize(&raw)?;
        Ok(Self { typed, raw })
    }
}

impl<T> Conforming<T> {
    pub fn typed(&self) -> &T {
        &self.typed
    }

    pub fn raw(&self) -> &serde_json::Value {
        &self.raw
    }
}

impl<T> Serialize for Conforming<T> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.raw.serialize(serializer)
    }
}

/// Typed result of a successful invocation, one variant per tool kind.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ToolResult {
    Extraction(Vec<ExtractedRecord>),
    Repurposed(Conforming<RepurposedContent>),
    Company(Conforming<CompanyAnalysis>),
    Translation(Conforming<CodeTranslation>),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tool_kind_parses_its_own_name() {
        for kind in ToolKind::ALL {
            let parsed: ToolKind = kind.as_str().parse().expect("parse ToolKind");
            assert_eq!(parsed, kind);
        }
        assert!("summarize".parse::<ToolKind>().is_err());
    }

    #[test]
    fn form_data_non_blank_trims() {
        let form = FormData::new()
            .with("url", "  https://example.com  ")
            .with("text", "   ");
        assert_eq!(form.non_blank("url"), Some("https://example.com"));
        assert_eq!(form.non_blank("text"), None);
        assert_eq!(form.non_blank("missing"), None);
        assert_eq!(form.get("text"), Some("   "));
    }

    #[test]
    fn form_data_from_pairs() {
        let form: FormData = [("input", "select all users"), ("mode", "to-code")]
            .into_iter()
            .collect();
        assert_eq!(form.get("mode"), Some("to-code"));
    }

    #[test]
    fn company_analysis_uses_camel_case() {
        let analysis = CompanyAnalysis {
            one_liner: "Payroll for startups".into(),
            target_audience: "Seed-stage founders".into(),
            value_props: vec!["Fast".into()],
            competitors: vec!["Gusto".into()],
            rating: 7.0,
            improvement: "Show pricing".into(),
        };
        let json = serde_json::to_value(&analysis).expect("serialize");
        assert_eq!(json["oneLiner"], "Payroll for startups");
        assert_eq!(json["valueProps"][0], "Fast");
    }

    #[test]
    fn tool_result_serializes_untagged() {
        let raw = serde_json::json!({
            "output": "SELECT * FROM users;",
            "language": "SQL",
            "explanation": "Selects every row."
        });
        let result = ToolResult::Translation(Conforming::from_value(raw.clone()).expect("conforms"));
        assert_eq!(serde_json::to_value(&result).expect("serialize"), raw);
    }

    #[test]
    fn conforming_serializes_the_original_value() {
        let raw = serde_json::json!({
            "oneLiner": "Payroll for startups",
            "targetAudience": "Seed-stage founders",
            "valueProps": ["Fast"],
            "competitors": ["Gusto"],
            "rating": 7,
            "improvement": "Show pricing",
            "confidence": "high"
        });
        let analysis: Conforming<CompanyAnalysis> =
            Conforming::from_value(raw.clone()).expect("conforms");
        assert_eq!(analysis.typed().rating, 7.0);
        assert_eq!(serde_json::to_value(&analysis).expect("serialize"), raw);
        assert_eq!(analysis.raw()["rating"], 7);
    }
}
