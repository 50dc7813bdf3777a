//! [`BeeSon`]: a schema paired with a value.

use std::sync::Arc;

use crate::error::{BeeSonError, FormatError, Result};
use crate::loader::StorageLoader;
use crate::payload;
use crate::reference::{BmtHasher, Reference, SchemaHasher};
use crate::schema::{infer_schema, ChildDescriptor, ChildKey, Header, SchemaNode};
use crate::segment::segment_count;
use crate::value::Value;

/// A value node: one [`SchemaNode`] and, once assigned, a value that
/// satisfies it.
///
/// ```
/// use beeson::BeeSon;
/// use serde_json::json;
///
/// # futures::executor::block_on(async {
/// let node = BeeSon::from_json(&json!({"name": "coke", "age": 48})).unwrap();
/// let bytes = node.serialize().unwrap();
/// let back = BeeSon::deserialize(&bytes, None, None).await.unwrap();
/// assert_eq!(back.to_json().unwrap(), json!({"age": 48, "name": "coke"}));
/// # });
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct BeeSon {
    schema: Arc<SchemaNode>,
    value: Option<Value>,
}

impl BeeSon {
    /// Infers the schema of `value` and wraps both.
    pub fn from_value(value: impl Into<Value>) -> Result<Self> {
        let value = value.into();
        let schema = infer_schema(&value)?;
        Ok(Self {
            schema: Arc::new(schema),
            value: Some(value),
        })
    }

    pub fn from_json(json: &serde_json::Value) -> Result<Self> {
        Self::from_value(Value::from(json))
    }

    /// A node with no value yet.
    pub fn from_schema(schema: impl Into<Arc<SchemaNode>>) -> Self {
        Self {
            schema: schema.into(),
            value: None,
        }
    }

    pub fn schema(&self) -> &Arc<SchemaNode> {
        &self.schema
    }

    /// A copy of the stored value.
    pub fn json(&self) -> Result<Value> {
        self.value.clone().ok_or(BeeSonError::ValueUnset)
    }

    pub fn to_json(&self) -> Result<serde_json::Value> {
        self.value
            .as_ref()
            .map(Value::to_json)
            .ok_or(BeeSonError::ValueUnset)
    }

    /// Validates `value` against the schema and stores it. Integers in
    /// `float32`/`float64` slots are stored as floats. On failure the
    /// previous value is left untouched.
    pub fn set_json(&mut self, value: impl Into<Value>) -> Result<()> {
        let value = value.into();
        self.schema.validate(&value)?;
        self.value = Some(self.schema.normalize(value));
        Ok(())
    }

    fn value_ref(&self) -> Result<&Value> {
        self.value.as_ref().ok_or(BeeSonError::ValueUnset)
    }

    /// Header, schema section and payload, hashing out-of-band schemas with
    /// [`BmtHasher`].
    pub fn serialize(&self) -> Result<Vec<u8>> {
        self.serialize_with(true, &BmtHasher)
    }

    pub fn serialize_with(&self, with_header: bool, hasher: &dyn SchemaHasher) -> Result<Vec<u8>> {
        let value = self.value_ref()?;
        let mut out = self.schema.serialize_with(with_header, hasher)?;
        out.extend(payload::encode(&self.schema, value, hasher)?);
        Ok(out)
    }

    /// Schema blobs to persist before [`serialize`](Self::serialize)d bytes
    /// can be decoded.
    pub fn out_of_band_schemas(
        &self,
        hasher: &dyn SchemaHasher,
    ) -> Result<Vec<(Reference, Vec<u8>)>> {
        self.schema.out_of_band_schemas(hasher)
    }

    /// Decodes an encoding produced by [`serialize_with`](Self::serialize_with).
    ///
    /// Without `header` the bytes must start with one. `loader` is required
    /// as soon as any schema level is stored out of band.
    pub async fn deserialize(
        bytes: &[u8],
        header: Option<Header>,
        loader: Option<&dyn StorageLoader>,
    ) -> Result<Self> {
        let (head, consumed) = SchemaNode::deserialize(bytes, header, loader).await?;
        let rest = bytes.get(consumed..).ok_or(FormatError::UnexpectedEof)?;
        let (schema, value) = payload::decode(head, rest, loader).await?;
        Ok(Self {
            schema: Arc::new(schema),
            value: Some(value),
        })
    }

    fn with_schema(&self, schema: SchemaNode) -> Self {
        Self {
            schema: Arc::new(schema),
            value: self.value.clone(),
        }
    }

    /// The same value under the nullable counterpart of this container.
    pub fn with_nullable_container(&self) -> Result<Self> {
        Ok(self.with_schema(self.schema.with_nullable_container()?))
    }

    /// Changes whether one child may hold `null`. Fails if the child
    /// currently holds `null` and `nullable` is false.
    pub fn with_child_nullable(&self, key: impl Into<ChildKey>, nullable: bool) -> Result<Self> {
        let index = self.schema.child_index(&key.into())?;
        let schema = self.schema.with_child_nullable(index, nullable)?;
        if let Some(value) = &self.value {
            schema.validate(value)?;
        }
        Ok(self.with_schema(schema))
    }

    /// Moves one container child's schema out of band, or back inline. The
    /// child's segment length is recomputed from its current value.
    pub fn with_child_indirected(
        &self,
        key: impl Into<ChildKey>,
        indirected: bool,
    ) -> Result<Self> {
        let key = key.into();
        let index = self.schema.child_index(&key)?;
        let child = &self.schema.children()[index];
        let schema = child.schema.indirected(indirected)?;
        let segment_length = match (child.segment_length, self.child_value(index)) {
            (Some(_), Some(value)) if !value.is_null() => {
                let encoded = payload::encode_child(&schema, value, &BmtHasher)?;
                Some(
                    u32::try_from(segment_count(encoded.len()))
                        .map_err(|_| FormatError::LengthOverflow("segment length"))?,
                )
            }
            (length, _) => length,
        };
        let child = ChildDescriptor {
            segment_length,
            marker: child.marker.clone(),
            schema: Arc::new(schema),
        };
        Ok(self.with_schema(self.schema.with_child(index, child)))
    }

    /// Marks the root schema as stored out of band.
    pub fn with_indirected(&self, indirected: bool) -> Result<Self> {
        Ok(self.with_schema(self.schema.indirected(indirected)?))
    }

    fn child_value(&self, index: usize) -> Option<&Value> {
        match self.value.as_ref()? {
            Value::Array(items) => items.get(index),
            Value::Object(map) => self.schema.children()[index]
                .marker
                .as_deref()
                .and_then(|marker| map.get(marker)),
            _ => None,
        }
    }
}
