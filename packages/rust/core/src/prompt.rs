//! Prompt templates and declared output schemas, one pair per tool.
//!
//! Every function here is pure: the same input always yields the same
//! [`PromptSpec`].

use url::Url;

use playground_generation::OutputSchema;
use playground_shared::FetchedDocument;

use crate::input::TranslateMode;

/// Prompt text plus the output shape the backend must produce.
#[derive(Debug, Clone, PartialEq)]
pub struct PromptSpec {
    pub prompt: String,
    pub schema: OutputSchema,
}

// ---------------------------------------------------------------------------
// Extraction
// ---------------------------------------------------------------------------

/// Array of records whose keys are exactly the requested fields.
pub fn extraction_schema(fields: &[String]) -> OutputSchema {
    OutputSchema::array(OutputSchema::object(fields.iter().map(|f| {
        (
            f.clone(),
            OutputSchema::string().describe(format!("Value of \"{f}\", or \"\" if not present")),
        )
    })))
    .describe("One object per item found in the text")
}

pub fn extraction(text: &str, fields: &[String]) -> PromptSpec {
    let field_list = fields.join(", ");
    let example_row = |n: usize| {
        let pairs: Vec<String> = fields
            .iter()
            .enumerate()
            .map(|(i, f)| format!("\"{f}\": \"value{}\"", n + i))
            .collect();
        format!("  {{{}}}", pairs.join(", "))
    };

    let prompt = format!(
        r#"You are a data extraction expert. Extract the following fields from the text and return ONLY a valid JSON array of objects.

Fields to extract: {field_list}

Text to analyze:
"{text}"

IMPORTANT:
- Return ONLY the JSON array, no other text
- Each object in the array should have these exact keys: {field_list}
- If a field is not found, use an empty string ""
- Extract ALL items found in the text

Example format:
[
{},
{}
]"#,
        example_row(1),
        example_row(1 + fields.len()),
    );

    PromptSpec {
        prompt,
        schema: extraction_schema(fields),
    }
}

// ---------------------------------------------------------------------------
// Repurpose
// ---------------------------------------------------------------------------

pub fn repurpose_schema() -> OutputSchema {
    OutputSchema::object([
        (
            "tweet",
            OutputSchema::string().describe("A viral-style tweet thread opener or single tweet"),
        ),
        (
            "linkedin",
            OutputSchema::string().describe("A professional LinkedIn post with hashtags"),
        ),
        (
            "newsletter",
            OutputSchema::string()
                .describe("A short, punchy newsletter blurb linking to this content"),
        ),
        (
            "summary",
            OutputSchema::string().describe("One sentence summary of the source"),
        ),
    ])
}

pub fn repurpose(doc: &FetchedDocument) -> PromptSpec {
    let prompt = format!(
        r#"You are a world-class growth marketer. Repurpose the following webpage content into three formats:

SOURCE TITLE: {title}
SOURCE CONTENT: {body}

1. TWEET: punchy, hook-driven, no hashtags.
2. LINKEDIN: professional but engaging, line breaks for readability.
3. NEWSLETTER: "TL;DR" style.

Keep the tone confident and high-value."#,
        title = doc.title,
        body = doc.body_text,
    );

    PromptSpec {
        prompt,
        schema: repurpose_schema(),
    }
}

// ---------------------------------------------------------------------------
// Scout
// ---------------------------------------------------------------------------

pub fn scout_schema() -> OutputSchema {
    OutputSchema::object([
        (
            "oneLiner",
            OutputSchema::string()
                .describe("A crystal clear, jargon-free one-liner about what they do"),
        ),
        (
            "targetAudience",
            OutputSchema::string().describe("Inferred primary target audience"),
        ),
        (
            "valueProps",
            OutputSchema::array(OutputSchema::string())
                .describe("List of 3 main value propositions"),
        ),
        (
            "competitors",
            OutputSchema::array(OutputSchema::string())
                .describe("3 potential competitor categories or known names"),
        ),
        (
            "rating",
            OutputSchema::number().describe("A score from 1-10 on their messaging clarity"),
        ),
        (
            "improvement",
            OutputSchema::string()
                .describe("One specific tip to improve their landing page conversion"),
        ),
    ])
}

pub fn scout(url: &Url, doc: &FetchedDocument) -> PromptSpec {
    let prompt = format!(
        r#"Analyze this company based on their homepage content:

URL: {url}
CONTENT: {body}

Act as a Venture Capital Scout. Cut through the marketing fluff.
1. What do they ACTUALLY do?
2. Who is it for?
3. Rate their messaging clarity.

Be sharp, direct, and slightly critical but constructive."#,
        body = doc.body_text,
    );

    PromptSpec {
        prompt,
        schema: scout_schema(),
    }
}

// ---------------------------------------------------------------------------
// Translate
// ---------------------------------------------------------------------------

pub fn translation_schema() -> OutputSchema {
    OutputSchema::object([
        (
            "output",
            OutputSchema::string().describe("The verified code solution OR explanation"),
        ),
        (
            "language",
            OutputSchema::string()
                .describe("The programming language used (e.g. Python, Regex, SQL)"),
        ),
        (
            "explanation",
            OutputSchema::string().describe("Brief explanation of how it works"),
        ),
    ])
}

pub fn translation(input: &str, mode: TranslateMode) -> PromptSpec {
    let prompt = match mode {
        TranslateMode::ToCode => format!(
            "Translate this natural language request into high-quality, efficient code. \
             Infer the language (Regex, SQL, Python, JS) from context if not specified.\n\
             REQUEST: \"{input}\""
        ),
        TranslateMode::Explain => format!(
            "Explain this code in plain English. Break down complex logic.\nCODE: \"{input}\""
        ),
    };

    PromptSpec {
        prompt,
        schema: translation_schema(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    fn doc(body: &str) -> FetchedDocument {
        FetchedDocument {
            source_url: Url::parse("https://acme.example/").unwrap(),
            status: 200,
            title: "Acme Payroll".into(),
            body_text: body.into(),
            fetched_at: Utc::now(),
        }
    }

    fn fields(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn extraction_prompt_lists_fields_and_text() {
        let spec = extraction("John Smith, CTO", &fields(&["Name", "Title"]));
        assert!(spec.prompt.contains("Fields to extract: Name, Title"));
        assert!(spec.prompt.contains("\"John Smith, CTO\""));
        assert!(spec.prompt.contains(r#"{"Name": "value1", "Title": "value2"}"#));
        assert!(spec.prompt.contains(r#"{"Name": "value3", "Title": "value4"}"#));
    }

    #[test]
    fn extraction_schema_is_array_of_requested_fields() {
        let schema = extraction_schema(&fields(&["Name", "Email"]));
        let json = schema.to_json();
        assert_eq!(json["type"], "ARRAY");
        assert_eq!(json["items"]["type"], "OBJECT");
        assert_eq!(json["items"]["required"], json!(["Name", "Email"]));
        assert_eq!(json["items"]["properties"]["Email"]["type"], "STRING");
    }

    #[test]
    fn repurpose_prompt_embeds_document() {
        let spec = repurpose(&doc("Run payroll in minutes."));
        assert!(spec.prompt.contains("growth marketer"));
        assert!(spec.prompt.contains("SOURCE TITLE: Acme Payroll"));
        assert!(spec.prompt.contains("SOURCE CONTENT: Run payroll in minutes."));
        assert_eq!(
            spec.schema.property_names(),
            vec!["tweet", "linkedin", "newsletter", "summary"]
        );
    }

    #[test]
    fn scout_prompt_embeds_url_and_persona() {
        let url = Url::parse("https://acme.example/").unwrap();
        let spec = scout(&url, &doc("Payroll for teams."));
        assert!(spec.prompt.contains("Venture Capital Scout"));
        assert!(spec.prompt.contains("URL: https://acme.example/"));
        assert!(spec.prompt.contains("CONTENT: Payroll for teams."));
        let json = spec.schema.to_json();
        assert_eq!(json["properties"]["rating"]["type"], "NUMBER");
        assert_eq!(json["properties"]["valueProps"]["type"], "ARRAY");
    }

    #[test]
    fn translation_prompt_depends_on_mode() {
        let to_code = translation("emails ending in .edu", TranslateMode::ToCode);
        assert!(to_code.prompt.contains("REQUEST: \"emails ending in .edu\""));

        let explain = translation("^\\S+@\\S+\\.edu$", TranslateMode::Explain);
        assert!(explain.prompt.starts_with("Explain this code"));
        assert!(explain.prompt.contains("CODE: "));
        assert_eq!(to_code.schema, explain.schema);
    }

    #[test]
    fn prompts_are_deterministic() {
        let a = extraction("x", &fields(&["A"]));
        let b = extraction("x", &fields(&["A"]));
        assert_eq!(a, b);
    }
}
