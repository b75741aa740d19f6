//! Type coercion for the object mapping layer.
//!
//! This module converts values read from columns into the shapes requested by
//! object-side type descriptors:
//! - Type descriptors with a static primitive-to-boxed table
//! - Runtime values tagged by variant
//! - The coercion engine (boxing, sequence gating, element-wise conversion)
//! - The converter capability and its standard implementation

pub mod converter;
pub mod descriptor;
pub mod engine;
pub mod value;

pub use converter::{Converter, StandardConverter};
pub use descriptor::{
    BinaryKind, BoxedKind, PRIMITIVE_BOXING, ParseTypeError, PrimitiveKind, TypeDescriptor,
};
pub use engine::{box_if_needed, convert_sequence, convert_value, is_sequence_non_binary};
pub use value::Value;
