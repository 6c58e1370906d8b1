//! Declared output shapes for schema-constrained generation.
//!
//! An [`OutputSchema`] is sent to the backend (as the Gemini/OpenAPI schema
//! subset) and used afterwards to check that the returned value conforms.

use serde_json::{Map, Value, json};

/// Shape of one schema node.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaType {
    String,
    Number,
    Array(Box<OutputSchema>),
    /// Properties in declaration order. All are required.
    Object(Vec<(String, OutputSchema)>),
}

/// A typed output shape with natural-language field descriptions.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputSchema {
    pub ty: SchemaType,
    pub description: Option<String>,
}

impl OutputSchema {
    pub fn string() -> Self {
        Self::of(SchemaType::String)
    }

    pub fn number() -> Self {
        Self::of(SchemaType::Number)
    }

    pub fn array(items: OutputSchema) -> Self {
        Self::of(SchemaType::Array(Box::new(items)))
    }

    pub fn object<I, K>(properties: I) -> Self
    where
        I: IntoIterator<Item = (K, OutputSchema)>,
        K: Into<String>,
    {
        Self::of(SchemaType::Object(
            properties.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        ))
    }

    fn of(ty: SchemaType) -> Self {
        Self {
            ty,
            description: None,
        }
    }

    /// Attach a description the model sees for this node.
    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Property names, when this is an object schema.
    pub fn property_names(&self) -> Vec<&str> {
        match &self.ty {
            SchemaType::Object(props) => props.iter().map(|(k, _)| k.as_str()).collect(),
            _ => Vec::new(),
        }
    }

    /// Render as the OpenAPI-style schema accepted by `responseSchema`.
    pub fn to_json(&self) -> Value {
        let mut node = match &self.ty {
            SchemaType::String => json!({ "type": "STRING" }),
            SchemaType::Number => json!({ "type": "NUMBER" }),
            SchemaType::Array(items) => json!({ "type": "ARRAY", "items": items.to_json() }),
            SchemaType::Object(props) => {
                let properties: Map<String, Value> = props
                    .iter()
                    .map(|(name, schema)| (name.clone(), schema.to_json()))
                    .collect();
                let required: Vec<&str> = props.iter().map(|(name, _)| name.as_str()).collect();
                json!({ "type": "OBJECT", "properties": properties, "required": required })
            }
        };
        if let Some(desc) = &self.description {
            node["description"] = Value::String(desc.clone());
        }
        node
    }

    /// Check that `value` conforms. The error names the offending path.
    pub fn validate(&self, value: &Value) -> Result<(), String> {
        self.validate_at("$", value)
    }

    fn validate_at(&self, at: &str, value: &Value) -> Result<(), String> {
        match (&self.ty, value) {
            (SchemaType::String, Value::String(_)) => Ok(()),
            (SchemaType::Number, Value::Number(_)) => Ok(()),
            (SchemaType::Array(items), Value::Array(values)) => values
                .iter()
                .enumerate()
                .try_for_each(|(i, v)| items.validate_at(&format!("{at}[{i}]"), v)),
            (SchemaType::Object(props), Value::Object(map)) => {
                for (name, schema) in props {
                    let field_at = format!("{at}.{name}");
                    match map.get(name) {
                        Some(v) => schema.validate_at(&field_at, v)?,
                        None => return Err(format!("missing field {field_at}")),
                    }
                }
                Ok(())
            }
            (expected, got) => Err(format!(
                "expected {} at {at}, got {}",
                type_name(expected),
                value_type_name(got)
            )),
        }
    }
}

fn type_name(ty: &SchemaType) -> &'static str {
    match ty {
        SchemaType::String => "string",
        SchemaType::Number => "number",
        SchemaType::Array(_) => "array",
        SchemaType::Object(_) => "object",
    }
}

fn value_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post_schema() -> OutputSchema {
        OutputSchema::object([
            ("tweet", OutputSchema::string().describe("A single tweet")),
            ("tags", OutputSchema::array(OutputSchema::string())),
            ("score", OutputSchema::number()),
        ])
    }

    #[test]
    fn renders_openapi_subset() {
        let json = post_schema().describe("Post").to_json();
        assert_eq!(json["type"], "OBJECT");
        assert_eq!(json["description"], "Post");
        assert_eq!(json["properties"]["tweet"]["type"], "STRING");
        assert_eq!(json["properties"]["tweet"]["description"], "A single tweet");
        assert_eq!(json["properties"]["tags"]["items"]["type"], "STRING");
        assert_eq!(json["required"], json!(["tweet", "tags", "score"]));
    }

    #[test]
    fn accepts_conforming_value() {
        let value = json!({ "tweet": "hi", "tags": ["a", "b"], "score": 7, "extra": true });
        assert!(post_schema().validate(&value).is_ok());
    }

    #[test]
    fn reports_missing_field() {
        let value = json!({ "tweet": "hi", "tags": [] });
        let err = post_schema().validate(&value).unwrap_err();
        assert_eq!(err, "missing field $.score");
    }

    #[test]
    fn reports_wrong_type_with_path() {
        let value = json!({ "tweet": "hi", "tags": ["a", 3], "score": 1 });
        let err = post_schema().validate(&value).unwrap_err();
        assert_eq!(err, "expected string at $.tags[1], got number");
    }

    #[test]
    fn array_of_objects() {
        let schema = OutputSchema::array(OutputSchema::object([("Name", OutputSchema::string())]));
        assert!(schema.validate(&json!([{ "Name": "John" }])).is_ok());
        assert!(schema.validate(&json!({ "Name": "John" })).is_err());
        assert_eq!(schema.property_names(), Vec::<&str>::new());
    }
}
