//! Payload encoding and decoding, driven by a schema.

use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt};
use indexmap::IndexMap;

use crate::bitvector::{byte_length, BitVector};
use crate::constants::SEGMENT_SIZE;
use crate::error::{FormatError, Result, ValidationError};
use crate::loader::StorageLoader;
use crate::marshal;
use crate::reference::SchemaHasher;
use crate::schema::{ChildDescriptor, ChildSchema, Header, SchemaHead, SchemaNode};
use crate::segment::{pad_right, pad_to_segments, padded_length, segment_count};
use crate::tag::ContainerKind;
use crate::value::Value;

/// A child's complete encoding: its header-less schema section followed by
/// its payload.
pub(crate) fn encode_child(
    schema: &SchemaNode,
    value: &Value,
    hasher: &dyn SchemaHasher,
) -> Result<Vec<u8>> {
    let mut out = schema.serialize_with(false, hasher)?;
    out.extend(encode(schema, value, hasher)?);
    Ok(out)
}

/// Children values in table order.
fn child_values<'v>(schema: &SchemaNode, value: &'v Value) -> Result<Vec<&'v Value>> {
    schema.assert_value(value)?;
    match value {
        Value::Array(items) => Ok(items.iter().collect()),
        Value::Object(map) => schema
            .children()
            .iter()
            .map(|child| {
                let marker = child.marker.as_deref().unwrap_or_default();
                map.get(marker)
                    .ok_or_else(|| ValidationError::MissingKeys(vec![marker.to_owned()]).into())
            })
            .collect(),
        _ => Err(ValidationError::WrongValue {
            expected: schema.tag(),
            actual: value.kind(),
        }
        .into()),
    }
}

/// Encodes the payload section of `value`.
///
/// Nullable containers open with a segment-padded bit vector of the children
/// that are actually null; those children contribute no bytes.
pub(crate) fn encode(
    schema: &SchemaNode,
    value: &Value,
    hasher: &dyn SchemaHasher,
) -> Result<Vec<u8>> {
    if !schema.tag().is_container() {
        return Ok(marshal::encode(schema.tag(), value)?);
    }
    let items = child_values(schema, value)?;
    let nullable = schema.tag().is_nullable_container();
    let mut out = Vec::new();
    if nullable {
        let mut nulls = BitVector::new(items.len());
        for (i, item) in items.iter().enumerate() {
            if item.is_null() {
                nulls.set(i)?;
            }
        }
        out.extend(nulls.into_bytes());
        pad_right(&mut out);
    }
    for (child, item) in schema.children().iter().zip(items) {
        if nullable && item.is_null() {
            continue;
        }
        let mut bytes = encode_child(&child.schema, item, hasher)?;
        match child.segment_length {
            Some(segments) => {
                if !pad_to_segments(&mut bytes, segments as usize) {
                    return Err(ValidationError::SegmentOverflow {
                        declared: segments,
                        actual: segment_count(bytes.len()),
                    }
                    .into());
                }
            }
            None => pad_right(&mut bytes),
        }
        out.extend(bytes);
    }
    Ok(out)
}

/// Decodes the payload described by `head`, assembling the full schema
/// tree along the way.
pub(crate) fn decode<'a>(
    head: SchemaHead,
    payload: &'a [u8],
    loader: Option<&'a dyn StorageLoader>,
) -> BoxFuture<'a, Result<(SchemaNode, Value)>> {
    async move {
        let Some(kind) = head.tag.container_kind() else {
            let value = marshal::decode(head.tag, payload)?;
            return Ok((head.into_shallow_node(), value));
        };
        let count = head.children.len();
        let mut offset = 0;
        let nulls = if head.tag.is_nullable_container() {
            let length = byte_length(count);
            let bytes = payload.get(..length).ok_or(FormatError::UnexpectedEof)?;
            offset = padded_length(length);
            Some(BitVector::from_bytes(count, bytes)?)
        } else {
            None
        };

        let mut children = Vec::with_capacity(count);
        let mut values = Vec::with_capacity(count);
        for (i, child) in head.children.into_iter().enumerate() {
            let is_null = match &nulls {
                Some(bits) => bits.get(i)?,
                None => false,
            };
            if is_null && !child.nullable {
                return Err(FormatError::NullInStrictSlot(i).into());
            }
            let (schema, value) = if is_null {
                let schema = match child.schema {
                    ChildSchema::Inline(tag) => SchemaHead::bare(head.version, tag),
                    ChildSchema::Resolved(head) => *head,
                };
                (schema.into_shallow_node(), Value::Null)
            } else {
                let end = match child.segment_length {
                    Some(segments) => (segments as usize)
                        .checked_mul(SEGMENT_SIZE)
                        .and_then(|length| offset.checked_add(length))
                        .ok_or(FormatError::UnexpectedEof)?,
                    None => payload.len(),
                };
                let slice = payload.get(offset..end).ok_or(FormatError::UnexpectedEof)?;
                offset = end;
                decode_child(child.schema, slice, loader).await?
            };
            values.push(value);
            children.push(ChildDescriptor {
                segment_length: child.segment_length,
                marker: child.marker,
                schema: Arc::new(schema.with_nullable(child.nullable)),
            });
        }

        let value = match kind {
            ContainerKind::Array => Value::Array(values),
            ContainerKind::Object => Value::Object(
                children
                    .iter()
                    .map(|child| child.marker.clone().unwrap_or_default())
                    .zip(values)
                    .collect::<IndexMap<_, _>>(),
            ),
        };
        let schema = SchemaNode::from_parts(head.tag, false, head.indirected, children);
        Ok((schema, value))
    }
    .boxed()
}

async fn decode_child(
    schema: ChildSchema,
    slice: &[u8],
    loader: Option<&dyn StorageLoader>,
) -> Result<(SchemaNode, Value)> {
    match schema {
        ChildSchema::Inline(tag) if tag.is_container() => {
            let (head, consumed) =
                SchemaNode::deserialize(slice, Some(Header::new(tag)), loader).await?;
            let payload = slice.get(consumed..).ok_or(FormatError::UnexpectedEof)?;
            decode(head, payload, loader).await
        }
        ChildSchema::Inline(tag) => {
            let value = marshal::decode(tag, slice)?;
            Ok((SchemaNode::from_parts(tag, false, false, Vec::new()), value))
        }
        ChildSchema::Resolved(head) => decode(*head, slice, loader).await,
    }
}
