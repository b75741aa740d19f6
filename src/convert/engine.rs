//! Type coercion between row values and object-side type descriptors.
//!
//! All functions here are pure: they read their arguments and allocate only
//! the returned value.

use super::converter::Converter;
use super::descriptor::TypeDescriptor;
use super::value::Value;
use crate::error::ConversionError;

/// Normalize a primitive descriptor to its nullable boxed form.
///
/// `None` passes through; non-primitive descriptors are returned unchanged.
pub fn box_if_needed(ty: Option<&TypeDescriptor>) -> Option<TypeDescriptor> {
    ty.map(|ty| match ty {
        TypeDescriptor::Primitive(kind) => TypeDescriptor::Boxed(kind.boxed()),
        other => other.clone(),
    })
}

/// True for sequence descriptors that should be converted element-wise.
///
/// Binary descriptors are single values even though they hold many bytes.
pub fn is_sequence_non_binary(ty: &TypeDescriptor) -> bool {
    matches!(ty, TypeDescriptor::Sequence(_))
}

/// Convert each element of `source` to `target_element`, preserving order.
///
/// Stops at the first element the converter rejects and returns that error as is.
pub fn convert_sequence<'a, I, C>(
    source: I,
    target_element: &TypeDescriptor,
    converter: &C,
) -> Result<Vec<Value>, ConversionError>
where
    I: IntoIterator<Item = &'a Value>,
    C: Converter + ?Sized,
{
    source
        .into_iter()
        .map(|item| converter.convert(item, target_element))
        .collect()
}

/// Convert a value read from a column to the descriptor of the property it fills.
pub fn convert_value<C>(
    value: &Value,
    target: &TypeDescriptor,
    converter: &C,
) -> Result<Value, ConversionError>
where
    C: Converter + ?Sized,
{
    if value.is_null() && target.is_primitive() {
        return Err(ConversionError::null_to_primitive(target));
    }

    if is_sequence_non_binary(target) {
        let items = match value {
            Value::Sequence(items) => items,
            Value::Null => return Ok(Value::Null),
            other => return Err(ConversionError::unsupported(other.type_name(), target)),
        };
        let element = box_if_needed(target.element()).unwrap_or(TypeDescriptor::Json);
        return convert_sequence(items, &element, converter).map(Value::Sequence);
    }

    let boxed = box_if_needed(Some(target));
    converter.convert(value, boxed.as_ref().unwrap_or(target))
}
