//! UTF-8 strings closed by a `"` terminator, right-padded with zeros.

use crate::constants::STRING_TERMINATOR;
use crate::error::{FormatError, ValidationError};
use crate::segment::pad_right;
use crate::tag::TypeTag;
use crate::value::Value;

pub fn encode(value: &Value) -> Result<Vec<u8>, ValidationError> {
    let Value::String(s) = value else {
        return Err(ValidationError::WrongValue {
            expected: TypeTag::String,
            actual: value.kind(),
        });
    };
    let mut bytes = Vec::with_capacity(s.len() + 1);
    bytes.extend_from_slice(s.as_bytes());
    bytes.push(STRING_TERMINATOR);
    pad_right(&mut bytes);
    Ok(bytes)
}

/// The string ends at the last terminator; the string itself may contain `"`.
pub fn decode(payload: &[u8]) -> Result<Value, FormatError> {
    let end = payload
        .iter()
        .rposition(|&b| b == STRING_TERMINATOR)
        .ok_or(FormatError::MissingStringTerminator)?;
    let s = std::str::from_utf8(&payload[..end]).map_err(|_| FormatError::InvalidUtf8)?;
    Ok(Value::String(s.to_owned()))
}
