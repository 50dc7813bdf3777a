//! Fixed-width big-endian numbers, left-padded to one segment.

use beeson_buffers::{Reader, Writer};

use crate::constants::SEGMENT_SIZE;
use crate::error::{FormatError, ValidationError};
use crate::segment::pad_left;
use crate::tag::TypeTag;
use crate::value::Value;

fn int_range(tag: TypeTag) -> Option<(i64, i64)> {
    match tag {
        TypeTag::Uint8 => Some((0, u8::MAX.into())),
        TypeTag::Int8 => Some((i8::MIN.into(), i8::MAX.into())),
        TypeTag::Int16 => Some((i16::MIN.into(), i16::MAX.into())),
        TypeTag::Int32 => Some((i32::MIN.into(), i32::MAX.into())),
        _ => None,
    }
}

/// Checks that `value` is representable under the numeric `tag`.
pub fn check(tag: TypeTag, value: &Value) -> Result<(), ValidationError> {
    let wrong = |actual| ValidationError::WrongValue {
        expected: tag,
        actual,
    };
    match (tag, value) {
        (TypeTag::Int64, Value::BigInt(_)) => Ok(()),
        (TypeTag::Float32 | TypeTag::Float64, Value::Int(_) | Value::Float(_)) => Ok(()),
        (_, Value::Int(n)) => match int_range(tag) {
            Some((min, max)) if (min..=max).contains(n) => Ok(()),
            Some(_) => Err(wrong("out-of-range integer")),
            None => Err(wrong(value.kind())),
        },
        _ => Err(wrong(value.kind())),
    }
}

pub fn encode(tag: TypeTag, value: &Value) -> Result<Vec<u8>, ValidationError> {
    check(tag, value)?;
    let mut writer = Writer::with_capacity(8);
    match (tag, value) {
        (TypeTag::Uint8, Value::Int(n)) => writer.u8(*n as u8),
        (TypeTag::Int8, Value::Int(n)) => writer.i8(*n as i8),
        (TypeTag::Int16, Value::Int(n)) => writer.i16(*n as i16),
        (TypeTag::Int32, Value::Int(n)) => writer.i32(*n as i32),
        (TypeTag::Int64, Value::BigInt(n)) => writer.i64(*n),
        (TypeTag::Float32, Value::Int(n)) => writer.f32(*n as f32),
        (TypeTag::Float32, Value::Float(f)) => writer.f32(*f as f32),
        (TypeTag::Float64, Value::Int(n)) => writer.f64(*n as f64),
        (TypeTag::Float64, Value::Float(f)) => writer.f64(*f),
        _ => {
            return Err(ValidationError::WrongValue {
                expected: tag,
                actual: value.kind(),
            })
        }
    }
    Ok(pad_left(&writer.flush()))
}

pub fn decode(tag: TypeTag, payload: &[u8]) -> Result<Value, FormatError> {
    let width = tag
        .numeric_width()
        .ok_or(FormatError::UnknownTypeTag(tag.code()))?;
    let mut reader = Reader::at(payload, SEGMENT_SIZE - width);
    let value = match tag {
        TypeTag::Uint8 => Value::Int(reader.u8()?.into()),
        TypeTag::Int8 => Value::Int(reader.i8()?.into()),
        TypeTag::Int16 => Value::Int(reader.i16()?.into()),
        TypeTag::Int32 => Value::Int(reader.i32()?.into()),
        TypeTag::Int64 => Value::BigInt(reader.i64()?),
        TypeTag::Float32 => Value::Float(reader.f32()?.into()),
        TypeTag::Float64 => Value::Float(reader.f64()?),
        _ => return Err(FormatError::UnknownTypeTag(tag.code())),
    };
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn int32_is_left_padded_big_endian() {
        let bytes = encode(TypeTag::Int32, &Value::Int(48)).unwrap();
        assert_eq!(bytes.len(), 32);
        assert_eq!(&bytes[28..], &[0, 0, 0, 48]);
        assert_eq!(decode(TypeTag::Int32, &bytes).unwrap(), Value::Int(48));
    }

    #[test]
    fn negative_values_survive() {
        for tag in [TypeTag::Int8, TypeTag::Int16, TypeTag::Int32] {
            let bytes = encode(tag, &Value::Int(-7)).unwrap();
            assert_eq!(decode(tag, &bytes).unwrap(), Value::Int(-7));
        }
        let bytes = encode(TypeTag::Int64, &Value::BigInt(i64::MIN)).unwrap();
        assert_eq!(decode(TypeTag::Int64, &bytes).unwrap(), Value::BigInt(i64::MIN));
    }

    #[test]
    fn ranges_are_enforced() {
        assert!(check(TypeTag::Uint8, &Value::Int(255)).is_ok());
        assert!(check(TypeTag::Uint8, &Value::Int(256)).is_err());
        assert!(check(TypeTag::Uint8, &Value::Int(-1)).is_err());
        assert!(check(TypeTag::Int8, &Value::Int(-128)).is_ok());
        assert!(check(TypeTag::Int32, &Value::Float(1.5)).is_err());
        assert!(check(TypeTag::Int64, &Value::Int(1)).is_err());
        assert!(check(TypeTag::Float32, &Value::Int(3)).is_ok());
    }

    #[test]
    fn floats_roundtrip() {
        let bytes = encode(TypeTag::Float64, &Value::Float(0.1)).unwrap();
        assert_eq!(decode(TypeTag::Float64, &bytes).unwrap(), Value::Float(0.1));
        let bytes = encode(TypeTag::Float32, &Value::Float(1.5)).unwrap();
        assert_eq!(&bytes[28..], &1.5f32.to_be_bytes());
    }
}
