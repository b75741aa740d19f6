//! Single-value converters.
//!
//! The coercion engine never decides how one value becomes another; it hands
//! each value to a [`Converter`]. [`StandardConverter`] covers the scalar
//! coercions a row mapper normally needs.

use super::descriptor::{PrimitiveKind, TypeDescriptor};
use super::engine::convert_sequence;
use super::value::Value;
use crate::error::ConversionError;
use base64::{Engine as _, engine::general_purpose::STANDARD};

/// Converts one value to a target type descriptor.
pub trait Converter: Send + Sync {
    fn convert(&self, value: &Value, target: &TypeDescriptor) -> Result<Value, ConversionError>;
}

impl<F> Converter for F
where
    F: Fn(&Value, &TypeDescriptor) -> Result<Value, ConversionError> + Send + Sync,
{
    fn convert(&self, value: &Value, target: &TypeDescriptor) -> Result<Value, ConversionError> {
        self(value, target)
    }
}

/// Default scalar coercions between column values and object properties.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardConverter;

impl StandardConverter {
    pub fn new() -> Self {
        Self
    }
}

impl Converter for StandardConverter {
    fn convert(&self, value: &Value, target: &TypeDescriptor) -> Result<Value, ConversionError> {
        if value.is_null() {
            return match target {
                TypeDescriptor::Primitive(_) => Err(ConversionError::null_to_primitive(target)),
                _ => Ok(Value::Null),
            };
        }

        match target {
            TypeDescriptor::Primitive(kind) => to_scalar(value, *kind, target),
            TypeDescriptor::Boxed(kind) => to_scalar(value, kind.unboxed(), target),
            TypeDescriptor::String => to_string(value, target),
            TypeDescriptor::Json => Ok(Value::Json(value.to_json())),
            TypeDescriptor::Binary(_) => to_bytes(value, target),
            TypeDescriptor::Sequence(element) => match value {
                Value::Sequence(items) => convert_sequence(items, element, self).map(Value::Sequence),
                other => Err(ConversionError::unsupported(other.type_name(), target)),
            },
            TypeDescriptor::Struct(_) => match value {
                Value::Struct(_) => Ok(value.clone()),
                other => Err(ConversionError::unsupported(other.type_name(), target)),
            },
        }
    }
}

fn to_scalar(
    value: &Value,
    kind: PrimitiveKind,
    target: &TypeDescriptor,
) -> Result<Value, ConversionError> {
    match kind {
        PrimitiveKind::Bool => to_bool(value, target).map(Value::Bool),
        PrimitiveKind::I8 => to_integer(value, target).and_then(|v| narrow(v, target, Value::I8)),
        PrimitiveKind::I16 => to_integer(value, target).and_then(|v| narrow(v, target, Value::I16)),
        PrimitiveKind::I32 => to_integer(value, target).and_then(|v| narrow(v, target, Value::I32)),
        PrimitiveKind::I64 => to_integer(value, target).map(Value::I64),
        PrimitiveKind::F32 => to_float(value, target).and_then(|v| {
            let narrowed = v as f32;
            if v.is_finite() && !narrowed.is_finite() {
                Err(ConversionError::out_of_range(v, target))
            } else {
                Ok(Value::F32(narrowed))
            }
        }),
        PrimitiveKind::F64 => to_float(value, target).map(Value::F64),
        PrimitiveKind::Char => to_char(value, target).map(Value::Char),
    }
}

fn narrow<T>(
    v: i64,
    target: &TypeDescriptor,
    wrap: impl FnOnce(T) -> Value,
) -> Result<Value, ConversionError>
where
    T: TryFrom<i64>,
{
    T::try_from(v)
        .map(wrap)
        .map_err(|_| ConversionError::out_of_range(v, target))
}

fn to_integer(value: &Value, target: &TypeDescriptor) -> Result<i64, ConversionError> {
    if let Some(v) = value.as_i64() {
        return Ok(v);
    }
    if let Some(v) = value.as_f64() {
        // Only integral floats inside the i64 range convert.
        if v.fract() == 0.0 && v >= i64::MIN as f64 && v < i64::MAX as f64 {
            return Ok(v as i64);
        }
        return Err(ConversionError::out_of_range(v, target));
    }
    match value {
        Value::Bool(b) => Ok(i64::from(*b)),
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|e| ConversionError::parse(s.as_str(), target, e)),
        Value::Json(serde_json::Value::Number(n)) => n
            .as_i64()
            .ok_or_else(|| ConversionError::out_of_range(n, target)),
        other => Err(ConversionError::unsupported(other.type_name(), target)),
    }
}

fn to_float(value: &Value, target: &TypeDescriptor) -> Result<f64, ConversionError> {
    if let Some(v) = value.as_f64() {
        return Ok(v);
    }
    if let Some(v) = value.as_i64() {
        return Ok(v as f64);
    }
    match value {
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|e| ConversionError::parse(s.as_str(), target, e)),
        Value::Json(serde_json::Value::Number(n)) => n
            .as_f64()
            .ok_or_else(|| ConversionError::out_of_range(n, target)),
        other => Err(ConversionError::unsupported(other.type_name(), target)),
    }
}

fn to_bool(value: &Value, target: &TypeDescriptor) -> Result<bool, ConversionError> {
    match value {
        Value::Bool(b) => Ok(*b),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.eq_ignore_ascii_case("true") {
                Ok(true)
            } else if trimmed.eq_ignore_ascii_case("false") {
                Ok(false)
            } else {
                Err(ConversionError::parse(s.as_str(), target, "expected true or false"))
            }
        }
        Value::Json(serde_json::Value::Bool(b)) => Ok(*b),
        other => match other.as_i64() {
            Some(0) => Ok(false),
            Some(1) => Ok(true),
            Some(v) => Err(ConversionError::out_of_range(v, target)),
            None => Err(ConversionError::unsupported(other.type_name(), target)),
        },
    }
}

fn to_char(value: &Value, target: &TypeDescriptor) -> Result<char, ConversionError> {
    match value {
        Value::Char(c) => Ok(*c),
        Value::String(s) => {
            let mut chars = s.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Ok(c),
                _ => Err(ConversionError::parse(
                    s.as_str(),
                    target,
                    "expected exactly one character",
                )),
            }
        }
        other => Err(ConversionError::unsupported(other.type_name(), target)),
    }
}

fn to_string(value: &Value, target: &TypeDescriptor) -> Result<Value, ConversionError> {
    match value {
        Value::Bytes(bytes) => Ok(Value::String(STANDARD.encode(bytes))),
        Value::Json(serde_json::Value::String(s)) => Ok(Value::String(s.clone())),
        Value::Sequence(_) | Value::Struct(_) => {
            Err(ConversionError::unsupported(value.type_name(), target))
        }
        other => Ok(Value::String(other.to_string())),
    }
}

fn to_bytes(value: &Value, target: &TypeDescriptor) -> Result<Value, ConversionError> {
    match value {
        Value::Bytes(bytes) => Ok(Value::Bytes(bytes.clone())),
        Value::String(s) => STANDARD
            .decode(s.trim())
            .map(Value::Bytes)
            .map_err(|e| ConversionError::parse(s.as_str(), target, e)),
        other => Err(ConversionError::unsupported(other.type_name(), target)),
    }
}
