use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{BindingError, BindingResult};

/// Declarative chart configuration handed to the rendering engine.
///
/// The engine owns the meaning of every field; this type only guarantees the
/// payload is a JSON object so defaults can be layered field by field.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChartOptions {
    fields: Map<String, Value>,
}

impl ChartOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps a JSON value, rejecting anything other than an object.
    pub fn from_value(value: Value) -> BindingResult<Self> {
        match value {
            Value::Object(fields) => Ok(Self { fields }),
            other => Err(BindingError::InvalidOptions(format!(
                "chart options must be a JSON object, got {}",
                json_kind(&other)
            ))),
        }
    }

    pub fn from_json_str(input: &str) -> BindingResult<Self> {
        let value: Value = serde_json::from_str(input)
            .map_err(|e| BindingError::InvalidOptions(format!("failed to parse options: {e}")))?;
        Self::from_value(value)
    }

    pub fn to_json_pretty(&self) -> BindingResult<String> {
        serde_json::to_string_pretty(&self.fields)
            .map_err(|e| BindingError::InvalidOptions(format!("failed to serialize options: {e}")))
    }

    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    #[must_use]
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Returns a copy with `defaults` layered underneath.
    ///
    /// Fields already present in `self` always win; defaults only fill gaps.
    #[must_use]
    pub fn with_defaults(&self, defaults: &ChartOptions) -> ChartOptions {
        let mut fields = defaults.fields.clone();
        for (key, value) in &self.fields {
            fields.insert(key.clone(), value.clone());
        }
        ChartOptions { fields }
    }
}

impl TryFrom<Value> for ChartOptions {
    type Error = BindingError;

    fn try_from(value: Value) -> BindingResult<Self> {
        Self::from_value(value)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::ChartOptions;
    use crate::error::BindingError;

    #[test]
    fn defaults_fill_missing_fields_only() {
        let cached = ChartOptions::from_value(json!({"series": [1, 2], "backgroundColor": "#fff"}))
            .expect("object options");
        let defaults = ChartOptions::new()
            .with_field("backgroundColor", "transparent")
            .with_field("animation", false);

        let merged = cached.with_defaults(&defaults);

        assert_eq!(merged.get("backgroundColor"), Some(&json!("#fff")));
        assert_eq!(merged.get("animation"), Some(&json!(false)));
        assert_eq!(merged.get("series"), Some(&json!([1, 2])));
        assert_eq!(merged.len(), 3);
    }

    #[test]
    fn non_object_payload_is_rejected() {
        let err = ChartOptions::from_value(json!([1, 2, 3])).expect_err("array must be rejected");
        assert!(matches!(err, BindingError::InvalidOptions(message) if message.contains("array")));
    }

    #[test]
    fn parses_json_text() {
        let options = ChartOptions::from_json_str(r#"{"title": {"text": "load"}}"#)
            .expect("valid json object");
        assert_eq!(options.get("title"), Some(&json!({"text": "load"})));
        assert!(ChartOptions::from_json_str("{").is_err());
    }
}
