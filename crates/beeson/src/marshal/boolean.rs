//! Booleans: one byte, right-padded to a segment.

use crate::constants::SEGMENT_SIZE;
use crate::error::{FormatError, ValidationError};
use crate::tag::TypeTag;
use crate::value::Value;

pub fn encode(value: &Value) -> Result<Vec<u8>, ValidationError> {
    let Value::Bool(b) = value else {
        return Err(ValidationError::WrongValue {
            expected: TypeTag::Boolean,
            actual: value.kind(),
        });
    };
    let mut bytes = vec![0u8; SEGMENT_SIZE];
    bytes[0] = u8::from(*b);
    Ok(bytes)
}

pub fn decode(payload: &[u8]) -> Result<Value, FormatError> {
    let byte = payload.first().ok_or(FormatError::UnexpectedEof)?;
    Ok(Value::Bool(*byte != 0))
}
