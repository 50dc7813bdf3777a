//! Primitive codecs for scalar type tags.
//!
//! Each codec produces segment-padded payload bytes: numbers are padded on
//! the left, strings and booleans on the right, addresses are exactly one
//! segment and `null` has no payload at all.

pub mod address;
pub mod boolean;
pub mod number;
pub mod string;

use crate::error::{FormatError, ValidationError};
use crate::tag::TypeTag;
use crate::value::Value;

/// Checks that `value` has the kind the scalar `tag` stores.
pub fn check(tag: TypeTag, value: &Value) -> Result<(), ValidationError> {
    let ok = match tag {
        TypeTag::Null => value.is_null(),
        TypeTag::Boolean => matches!(value, Value::Bool(_)),
        TypeTag::Float32
        | TypeTag::Float64
        | TypeTag::Uint8
        | TypeTag::Int8
        | TypeTag::Int16
        | TypeTag::Int32
        | TypeTag::Int64 => return number::check(tag, value),
        TypeTag::String => matches!(value, Value::String(_)),
        TypeTag::ManifestRef => matches!(value, Value::ManifestRef(_)),
        TypeTag::FeedRef => matches!(value, Value::FeedRef(_)),
        TypeTag::Array | TypeTag::NullableArray | TypeTag::Object | TypeTag::NullableObject => {
            false
        }
    };
    if ok {
        Ok(())
    } else {
        Err(ValidationError::WrongValue {
            expected: tag,
            actual: value.kind(),
        })
    }
}

/// Encodes a scalar value into its padded payload.
pub fn encode(tag: TypeTag, value: &Value) -> Result<Vec<u8>, ValidationError> {
    match (tag, value) {
        (TypeTag::Null, Value::Null) => Ok(Vec::new()),
        (TypeTag::Boolean, _) => boolean::encode(value),
        (TypeTag::String, _) => string::encode(value),
        (TypeTag::ManifestRef, Value::ManifestRef(r)) | (TypeTag::FeedRef, Value::FeedRef(r)) => {
            Ok(r.as_bytes().to_vec())
        }
        _ if tag.numeric_width().is_some() => number::encode(tag, value),
        _ => Err(ValidationError::WrongValue {
            expected: tag,
            actual: value.kind(),
        }),
    }
}

/// Decodes the payload of a scalar tag.
pub fn decode(tag: TypeTag, payload: &[u8]) -> Result<Value, FormatError> {
    match tag {
        TypeTag::Null => Ok(Value::Null),
        TypeTag::Boolean => boolean::decode(payload),
        TypeTag::Float32
        | TypeTag::Float64
        | TypeTag::Uint8
        | TypeTag::Int8
        | TypeTag::Int16
        | TypeTag::Int32
        | TypeTag::Int64 => number::decode(tag, payload),
        TypeTag::String => string::decode(payload),
        TypeTag::ManifestRef => address::decode(payload).map(Value::ManifestRef),
        TypeTag::FeedRef => address::decode(payload).map(Value::FeedRef),
        TypeTag::Array | TypeTag::NullableArray | TypeTag::Object | TypeTag::NullableObject => {
            Err(FormatError::UnknownTypeTag(tag.code()))
        }
    }
}
