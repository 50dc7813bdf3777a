use crate::constants::SEGMENT_SIZE;
use crate::error::{FormatError, Result, ValidationError};
use crate::marshal;
use crate::reference::BmtHasher;
use crate::segment::segment_count;
use crate::tag::TypeTag;
use crate::value::Value;

use super::{ChildDescriptor, SchemaNode};

/// Infers the canonical schema of `value`.
///
/// Integers take `int32`, other numbers `float64` and big integers `int64`.
/// Each container child records the segment length of its own encoding;
/// object children are ordered by key.
pub fn infer_schema(value: &Value) -> Result<SchemaNode> {
    infer_sized(value).map(|(schema, _)| schema)
}

/// The inferred schema together with the byte length of the header-less
/// encoding of `value` under it.
fn infer_sized(value: &Value) -> Result<(SchemaNode, usize)> {
    let tag = match value {
        Value::Null => TypeTag::Null,
        Value::Bool(_) => TypeTag::Boolean,
        Value::Int(n) => {
            if i32::try_from(*n).is_err() {
                return Err(ValidationError::Unidentifiable(format!(
                    "integer {} does not fit int32",
                    n
                ))
                .into());
            }
            TypeTag::Int32
        }
        Value::Float(_) => TypeTag::Float64,
        Value::BigInt(_) => TypeTag::Int64,
        Value::String(_) => TypeTag::String,
        Value::ManifestRef(_) => TypeTag::ManifestRef,
        Value::FeedRef(_) => TypeTag::FeedRef,
        Value::Array(items) => {
            let children = items
                .iter()
                .enumerate()
                .map(|(i, item)| infer_child(item, None).map_err(|err| err.at_index(i)))
                .collect::<Result<Vec<_>>>()?;
            return sized_container(TypeTag::Array, children);
        }
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            let children = entries
                .into_iter()
                .map(|(key, item)| {
                    infer_child(item, Some(key.clone())).map_err(|err| err.at_key(key))
                })
                .collect::<Result<Vec<_>>>()?;
            return sized_container(TypeTag::Object, children);
        }
    };
    let length = marshal::encode(tag, value)?.len();
    Ok((SchemaNode::scalar(tag)?, length))
}

/// Table bytes plus every child's declared segments.
fn sized_container(tag: TypeTag, children: Vec<ChildDescriptor>) -> Result<(SchemaNode, usize)> {
    let payload: usize = children
        .iter()
        .map(|child| child.segment_length.unwrap_or_default() as usize * SEGMENT_SIZE)
        .sum();
    let schema = SchemaNode::container(tag, children)?;
    let table = schema.serialize_with(false, &BmtHasher)?.len();
    Ok((schema, table + payload))
}

fn infer_child(value: &Value, marker: Option<String>) -> Result<ChildDescriptor> {
    let (schema, length) = infer_sized(value)?;
    let segments = u32::try_from(segment_count(length))
        .map_err(|_| FormatError::LengthOverflow("segment length"))?;
    Ok(ChildDescriptor::new(Some(segments), marker, schema))
}
