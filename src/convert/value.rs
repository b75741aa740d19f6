//! Runtime values flowing between rows and user objects.

use serde_json::Value as JsonValue;
use std::collections::BTreeMap;
use std::fmt;

/// A value tagged with its current runtime type.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    F32(f32),
    F64(f64),
    Char(char),
    String(String),
    Json(JsonValue),
    /// Opaque byte payload. Never treated as a sequence of bytes.
    Bytes(Vec<u8>),
    Sequence(Vec<Value>),
    Struct(BTreeMap<String, Value>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Get the type name of this value for diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::I8(_) => "i8",
            Self::I16(_) => "i16",
            Self::I32(_) => "i32",
            Self::I64(_) => "i64",
            Self::F32(_) => "f32",
            Self::F64(_) => "f64",
            Self::Char(_) => "char",
            Self::String(_) => "string",
            Self::Json(_) => "json",
            Self::Bytes(_) => "bytes",
            Self::Sequence(_) => "array",
            Self::Struct(_) => "struct",
        }
    }

    /// Integer payload widened to i64.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::I8(v) => Some(i64::from(*v)),
            Self::I16(v) => Some(i64::from(*v)),
            Self::I32(v) => Some(i64::from(*v)),
            Self::I64(v) => Some(*v),
            _ => None,
        }
    }

    /// Floating-point payload widened to f64.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::F32(v) => Some(f64::from(*v)),
            Self::F64(v) => Some(*v),
            _ => None,
        }
    }

    /// Render as JSON. Bytes become base64 strings; non-finite floats become strings.
    pub fn to_json(&self) -> JsonValue {
        use base64::{Engine as _, engine::general_purpose::STANDARD};

        match self {
            Self::Null => JsonValue::Null,
            Self::Bool(v) => JsonValue::Bool(*v),
            Self::I8(_) | Self::I16(_) | Self::I32(_) | Self::I64(_) => {
                JsonValue::Number(self.as_i64().unwrap_or_default().into())
            }
            Self::F32(_) | Self::F64(_) => {
                let v = self.as_f64().unwrap_or_default();
                serde_json::Number::from_f64(v)
                    .map(JsonValue::Number)
                    .unwrap_or_else(|| JsonValue::String(v.to_string()))
            }
            Self::Char(c) => JsonValue::String(c.to_string()),
            Self::String(s) => JsonValue::String(s.clone()),
            Self::Json(v) => v.clone(),
            Self::Bytes(bytes) => JsonValue::String(STANDARD.encode(bytes)),
            Self::Sequence(items) => JsonValue::Array(items.iter().map(Value::to_json).collect()),
            Self::Struct(fields) => JsonValue::Object(
                fields
                    .iter()
                    .map(|(name, value)| (name.clone(), value.to_json()))
                    .collect(),
            ),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Bool(v) => write!(f, "{}", v),
            Self::I8(v) => write!(f, "{}", v),
            Self::I16(v) => write!(f, "{}", v),
            Self::I32(v) => write!(f, "{}", v),
            Self::I64(v) => write!(f, "{}", v),
            Self::F32(v) => write!(f, "{}", v),
            Self::F64(v) => write!(f, "{}", v),
            Self::Char(c) => write!(f, "{}", c),
            Self::String(s) => write!(f, "{}", s),
            Self::Json(_) | Self::Bytes(_) | Self::Sequence(_) | Self::Struct(_) => {
                write!(f, "{}", self.to_json())
            }
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::I32(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::I64(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::F64(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Self::Bytes(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Self::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_type_name() {
        assert_eq!(Value::Null.type_name(), "null");
        assert_eq!(Value::Bytes(vec![1]).type_name(), "bytes");
        assert_eq!(Value::Sequence(vec![]).type_name(), "array");
    }

    #[test]
    fn test_to_json_bytes_as_base64() {
        let value = Value::Bytes(b"hello world".to_vec());
        assert_eq!(value.to_json(), json!("aGVsbG8gd29ybGQ="));
    }

    #[test]
    fn test_to_json_nested() {
        let mut fields = BTreeMap::new();
        fields.insert("id".to_string(), Value::I64(7));
        fields.insert(
            "tags".to_string(),
            Value::Sequence(vec!["a".into(), Value::Null]),
        );
        assert_eq!(
            Value::Struct(fields).to_json(),
            json!({ "id": 7, "tags": ["a", null] })
        );
    }

    #[test]
    fn test_to_json_non_finite_float() {
        assert_eq!(Value::F64(f64::NAN).to_json(), json!("NaN"));
    }

    #[test]
    fn test_from_option() {
        assert_eq!(Value::from(None::<i64>), Value::Null);
        assert_eq!(Value::from(Some("x")), Value::String("x".to_string()));
    }
}
