//! Type descriptors for the mapping layer.
//!
//! A `TypeDescriptor` names the shape a value should take on the object side.
//! Primitive kinds cannot represent absence; each one has exactly one boxed
//! (nullable) counterpart, listed in [`PRIMITIVE_BOXING`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Non-nullable scalar kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrimitiveKind {
    Bool,
    I8,
    I16,
    I32,
    I64,
    F32,
    F64,
    Char,
}

/// Nullable wrappers for the primitive kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoxedKind {
    Bool,
    I8,
    I16,
    I32,
    I64,
    F32,
    F64,
    Char,
}

/// Representations of a single opaque byte payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BinaryKind {
    /// Plain byte buffer (`bytea`, `varbinary`).
    Bytes,
    /// Large object column (`blob`).
    Blob,
}

/// Primitive kind to boxed kind, one row per primitive.
pub const PRIMITIVE_BOXING: [(PrimitiveKind, BoxedKind); 8] = [
    (PrimitiveKind::Bool, BoxedKind::Bool),
    (PrimitiveKind::I8, BoxedKind::I8),
    (PrimitiveKind::I16, BoxedKind::I16),
    (PrimitiveKind::I32, BoxedKind::I32),
    (PrimitiveKind::I64, BoxedKind::I64),
    (PrimitiveKind::F32, BoxedKind::F32),
    (PrimitiveKind::F64, BoxedKind::F64),
    (PrimitiveKind::Char, BoxedKind::Char),
];

impl PrimitiveKind {
    pub const fn boxed(self) -> BoxedKind {
        match self {
            Self::Bool => BoxedKind::Bool,
            Self::I8 => BoxedKind::I8,
            Self::I16 => BoxedKind::I16,
            Self::I32 => BoxedKind::I32,
            Self::I64 => BoxedKind::I64,
            Self::F32 => BoxedKind::F32,
            Self::F64 => BoxedKind::F64,
            Self::Char => BoxedKind::Char,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::I8 => "i8",
            Self::I16 => "i16",
            Self::I32 => "i32",
            Self::I64 => "i64",
            Self::F32 => "f32",
            Self::F64 => "f64",
            Self::Char => "char",
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        PRIMITIVE_BOXING
            .iter()
            .map(|(p, _)| *p)
            .find(|p| p.name() == name)
    }
}

impl BoxedKind {
    pub const fn unboxed(self) -> PrimitiveKind {
        match self {
            Self::Bool => PrimitiveKind::Bool,
            Self::I8 => PrimitiveKind::I8,
            Self::I16 => PrimitiveKind::I16,
            Self::I32 => PrimitiveKind::I32,
            Self::I64 => PrimitiveKind::I64,
            Self::F32 => PrimitiveKind::F32,
            Self::F64 => PrimitiveKind::F64,
            Self::Char => PrimitiveKind::Char,
        }
    }
}

/// The target shape of a converted value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "of", rename_all = "lowercase")]
pub enum TypeDescriptor {
    Primitive(PrimitiveKind),
    Boxed(BoxedKind),
    String,
    Json,
    Binary(BinaryKind),
    /// Ordered collection converted element by element.
    Sequence(Box<TypeDescriptor>),
    /// Named user object, filled from a row.
    Struct(String),
}

impl TypeDescriptor {
    pub fn sequence_of(element: TypeDescriptor) -> Self {
        Self::Sequence(Box::new(element))
    }

    pub fn is_primitive(&self) -> bool {
        matches!(self, Self::Primitive(_))
    }

    /// Element type of a sequence descriptor.
    pub fn element(&self) -> Option<&TypeDescriptor> {
        match self {
            Self::Sequence(element) => Some(element),
            _ => None,
        }
    }

    /// The scalar kind behind a primitive or boxed descriptor.
    pub fn scalar_kind(&self) -> Option<PrimitiveKind> {
        match self {
            Self::Primitive(kind) => Some(*kind),
            Self::Boxed(kind) => Some(kind.unboxed()),
            _ => None,
        }
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primitive(kind) => write!(f, "{}", kind.name()),
            Self::Boxed(kind) => write!(f, "{}?", kind.unboxed().name()),
            Self::String => write!(f, "string"),
            Self::Json => write!(f, "json"),
            Self::Binary(BinaryKind::Bytes) => write!(f, "bytes"),
            Self::Binary(BinaryKind::Blob) => write!(f, "blob"),
            Self::Sequence(element) => write!(f, "array<{}>", element),
            Self::Struct(name) => write!(f, "struct:{}", name),
        }
    }
}

/// Error returned when a type descriptor string cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown type descriptor '{0}'")]
pub struct ParseTypeError(pub String);

impl FromStr for TypeDescriptor {
    type Err = ParseTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let lower = trimmed.to_ascii_lowercase();

        if let Some(inner) = lower
            .strip_prefix("array<")
            .and_then(|rest| rest.strip_suffix('>'))
        {
            // Re-slice the original so struct names keep their case.
            let start = "array<".len();
            let inner_original = &trimmed[start..start + inner.len()];
            return Ok(Self::sequence_of(inner_original.parse()?));
        }

        if lower.starts_with("struct:") {
            let name = trimmed["struct:".len()..].trim();
            if name.is_empty() {
                return Err(ParseTypeError(s.to_string()));
            }
            return Ok(Self::Struct(name.to_string()));
        }

        let (base, nullable) = match lower.strip_suffix('?') {
            Some(base) => (base, true),
            None => (lower.as_str(), false),
        };

        if let Some(kind) = PrimitiveKind::from_name(base) {
            return Ok(if nullable {
                Self::Boxed(kind.boxed())
            } else {
                Self::Primitive(kind)
            });
        }

        // Non-primitive descriptors are already nullable; a trailing '?' is accepted.
        match base {
            "string" | "text" => Ok(Self::String),
            "json" => Ok(Self::Json),
            "bytes" => Ok(Self::Binary(BinaryKind::Bytes)),
            "blob" => Ok(Self::Binary(BinaryKind::Blob)),
            _ => Err(ParseTypeError(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_boxing_table_covers_each_primitive_once() {
        let primitives: HashSet<_> = PRIMITIVE_BOXING.iter().map(|(p, _)| *p).collect();
        let boxed: HashSet<_> = PRIMITIVE_BOXING.iter().map(|(_, b)| *b).collect();
        assert_eq!(primitives.len(), PRIMITIVE_BOXING.len());
        assert_eq!(boxed.len(), PRIMITIVE_BOXING.len());
    }

    #[test]
    fn test_boxing_table_matches_boxed() {
        for (primitive, boxed) in PRIMITIVE_BOXING {
            assert_eq!(primitive.boxed(), boxed);
            assert_eq!(boxed.unboxed(), primitive);
        }
    }

    #[test]
    fn test_parse_primitive_and_boxed() {
        assert_eq!(
            "i64".parse::<TypeDescriptor>().unwrap(),
            TypeDescriptor::Primitive(PrimitiveKind::I64)
        );
        assert_eq!(
            "I64?".parse::<TypeDescriptor>().unwrap(),
            TypeDescriptor::Boxed(BoxedKind::I64)
        );
        assert_eq!(
            " bool ".parse::<TypeDescriptor>().unwrap(),
            TypeDescriptor::Primitive(PrimitiveKind::Bool)
        );
    }

    #[test]
    fn test_parse_nested_sequence() {
        let parsed: TypeDescriptor = "array<array<string>>".parse().unwrap();
        assert_eq!(
            parsed,
            TypeDescriptor::sequence_of(TypeDescriptor::sequence_of(TypeDescriptor::String))
        );
    }

    #[test]
    fn test_parse_struct_keeps_case() {
        let parsed: TypeDescriptor = "array<struct:UserProfile>".parse().unwrap();
        assert_eq!(
            parsed,
            TypeDescriptor::sequence_of(TypeDescriptor::Struct("UserProfile".to_string()))
        );
    }

    #[test]
    fn test_parse_rejects_unknown() {
        assert!("uint128".parse::<TypeDescriptor>().is_err());
        assert!("struct:".parse::<TypeDescriptor>().is_err());
        assert!("array<nope>".parse::<TypeDescriptor>().is_err());
    }

    #[test]
    fn test_display_matches_parse() {
        for text in ["bool", "f32?", "string", "json", "bytes", "blob", "array<i16?>", "struct:Row"] {
            let parsed: TypeDescriptor = text.parse().unwrap();
            assert_eq!(parsed.to_string(), text);
        }
    }

    #[test]
    fn test_scalar_kind() {
        assert_eq!(
            TypeDescriptor::Boxed(BoxedKind::Char).scalar_kind(),
            Some(PrimitiveKind::Char)
        );
        assert_eq!(TypeDescriptor::String.scalar_kind(), None);
    }
}
