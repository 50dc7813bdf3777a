//! Schema nodes: the recursive type descriptor of a BeeSon value.
//!
//! A [`SchemaNode`] is immutable. Operations that change nullability or
//! indirection return a new node that shares every untouched subtree with
//! the original through `Arc`.

mod description;
mod infer;

pub use description::{ChildDescription, SchemaDescription};
pub use infer::infer_schema;

use std::fmt;
use std::sync::Arc;

use beeson_buffers::Reader;
use futures::future::{try_join_all, BoxFuture, FutureExt};
use tracing::debug;

use crate::constants::{HEADER_BYTE_LENGTH, HEADER_PADDING, Version};
use crate::error::{FormatError, ResolutionError, Result, ValidationError};
use crate::layout::{self, TableEntry};
use crate::loader::StorageLoader;
use crate::marshal;
use crate::reference::{BmtHasher, Reference, SchemaHasher};
use crate::tag::{ContainerKind, SlotTag, TypeTag};
use crate::value::Value;

/// The fixed-size block that opens every standalone encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub version: Version,
    pub slot: SlotTag,
}

impl Header {
    pub fn new(slot: impl Into<SlotTag>) -> Self {
        Self {
            version: Version::default(),
            slot: slot.into(),
        }
    }

    pub fn to_bytes(&self) -> [u8; HEADER_BYTE_LENGTH] {
        let mut bytes = [0u8; HEADER_BYTE_LENGTH];
        bytes[..4].copy_from_slice(&self.version.magic());
        bytes[HEADER_BYTE_LENGTH - 2..].copy_from_slice(&self.slot.code().to_be_bytes());
        bytes
    }

    pub fn read(bytes: &[u8]) -> Result<Self, FormatError> {
        let mut reader = Reader::new(bytes);
        let mut magic = [0u8; 4];
        magic.copy_from_slice(reader.buf(4)?);
        let version = Version::from_magic(magic).ok_or(FormatError::UnsupportedVersion(magic))?;
        reader.skip(HEADER_PADDING)?;
        let code = reader.u16()?;
        let slot = SlotTag::from_code(code).ok_or(FormatError::UnknownTypeTag(code))?;
        Ok(Self { version, slot })
    }
}

/// One child slot of a container schema.
#[derive(Debug, Clone, PartialEq)]
pub struct ChildDescriptor {
    /// Size of the child's own schema+payload encoding in segments. `None`
    /// means "the rest of the slice" and is only valid on the last child.
    pub segment_length: Option<u32>,
    /// Object key; `None` for array children.
    pub marker: Option<String>,
    pub schema: Arc<SchemaNode>,
}

impl ChildDescriptor {
    pub fn new(segment_length: Option<u32>, marker: Option<String>, schema: SchemaNode) -> Self {
        Self {
            segment_length,
            marker,
            schema: Arc::new(schema),
        }
    }

    fn marker_str(&self) -> &str {
        self.marker.as_deref().unwrap_or_default()
    }
}

/// Addresses a container child by position or by object key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ChildKey {
    Index(usize),
    Marker(String),
}

impl From<usize> for ChildKey {
    fn from(index: usize) -> Self {
        ChildKey::Index(index)
    }
}

impl From<&str> for ChildKey {
    fn from(marker: &str) -> Self {
        ChildKey::Marker(marker.to_owned())
    }
}

impl From<String> for ChildKey {
    fn from(marker: String) -> Self {
        ChildKey::Marker(marker)
    }
}

impl fmt::Display for ChildKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChildKey::Index(index) => write!(f, "{}", index),
            ChildKey::Marker(marker) => f.write_str(marker),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SchemaNode {
    version: Version,
    tag: TypeTag,
    nullable: bool,
    indirected: bool,
    children: Arc<[ChildDescriptor]>,
}

impl SchemaNode {
    /// A schema for a scalar tag.
    pub fn scalar(tag: TypeTag) -> Result<Self, ValidationError> {
        if tag.is_container() {
            return Err(ValidationError::InvalidDescription(format!(
                "{} is a container type",
                tag
            )));
        }
        Ok(Self::from_parts(tag, false, false, Vec::new()))
    }

    /// A container schema. Object children are sorted by marker.
    pub fn container(
        tag: TypeTag,
        mut children: Vec<ChildDescriptor>,
    ) -> Result<Self, ValidationError> {
        let kind = tag.container_kind().ok_or(ValidationError::NotContainer(tag))?;
        match kind {
            ContainerKind::Array => {
                if let Some(child) = children.iter().find(|child| child.marker.is_some()) {
                    return Err(ValidationError::InvalidDescription(format!(
                        "array child has marker `{}`",
                        child.marker_str()
                    )));
                }
            }
            ContainerKind::Object => {
                if children.iter().any(|child| child.marker.is_none()) {
                    return Err(ValidationError::InvalidDescription(
                        "object child without marker".into(),
                    ));
                }
                children.sort_by(|a, b| a.marker_str().cmp(b.marker_str()));
                if let Some(pair) = children
                    .windows(2)
                    .find(|pair| pair[0].marker == pair[1].marker)
                {
                    return Err(ValidationError::DuplicateMarker(pair[0].marker_str().into()));
                }
            }
        }
        let last = children.len().saturating_sub(1);
        for (i, child) in children.iter().enumerate() {
            if child.segment_length.is_none() && i != last {
                return Err(ValidationError::UnknownSegmentLength(i));
            }
            if child.schema.nullable && !tag.is_nullable_container() {
                return Err(ValidationError::NotNullableContainer(tag));
            }
        }
        Ok(Self::from_parts(tag, false, false, children))
    }

    pub(crate) fn from_parts(
        tag: TypeTag,
        nullable: bool,
        indirected: bool,
        children: Vec<ChildDescriptor>,
    ) -> Self {
        Self {
            version: Version::default(),
            tag,
            nullable,
            indirected,
            children: children.into(),
        }
    }

    pub fn version(&self) -> Version {
        self.version
    }

    pub fn tag(&self) -> TypeTag {
        self.tag
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    pub fn is_indirected(&self) -> bool {
        self.indirected
    }

    pub fn children(&self) -> &[ChildDescriptor] {
        &self.children
    }

    /// Object markers in table order.
    pub fn markers(&self) -> impl Iterator<Item = &str> {
        self.children.iter().filter_map(|child| child.marker.as_deref())
    }

    fn marker_index(&self, key: &str) -> Option<usize> {
        self.children
            .binary_search_by(|child| child.marker_str().cmp(key))
            .ok()
    }

    /// Resolves a [`ChildKey`] to a position in the child list.
    pub fn child_index(&self, key: &ChildKey) -> Result<usize, ValidationError> {
        let kind = self
            .tag
            .container_kind()
            .ok_or(ValidationError::NotContainer(self.tag))?;
        let index = match (key, kind) {
            (ChildKey::Index(index), _) => Some(*index).filter(|&i| i < self.children.len()),
            (ChildKey::Marker(marker), ContainerKind::Object) => self.marker_index(marker),
            (ChildKey::Marker(_), ContainerKind::Array) => None,
        };
        index.ok_or_else(|| ValidationError::NoSuchChild(key.to_string()))
    }

    /// Shallow structural check: scalar kinds, array length and object key
    /// set. Children are not inspected.
    pub fn assert_value(&self, value: &Value) -> Result<(), ValidationError> {
        if self.nullable && value.is_null() {
            return Ok(());
        }
        let wrong = || ValidationError::WrongValue {
            expected: self.tag,
            actual: value.kind(),
        };
        match self.tag.container_kind() {
            None => marshal::check(self.tag, value),
            Some(ContainerKind::Array) => {
                let Value::Array(items) = value else {
                    return Err(wrong());
                };
                if items.len() != self.children.len() {
                    return Err(ValidationError::ArrayLength {
                        expected: self.children.len(),
                        actual: items.len(),
                    });
                }
                Ok(())
            }
            Some(ContainerKind::Object) => {
                let Value::Object(map) = value else {
                    return Err(wrong());
                };
                let missing: Vec<String> = self
                    .markers()
                    .filter(|marker| !map.contains_key(*marker))
                    .map(str::to_owned)
                    .collect();
                if !missing.is_empty() {
                    return Err(ValidationError::MissingKeys(missing));
                }
                let mut unexpected: Vec<String> = map
                    .keys()
                    .filter(|key| self.marker_index(key).is_none())
                    .cloned()
                    .collect();
                if !unexpected.is_empty() {
                    unexpected.sort();
                    return Err(ValidationError::UnexpectedKeys(unexpected));
                }
                Ok(())
            }
        }
    }

    /// Full recursive check; child failures name the index or key.
    pub fn validate(&self, value: &Value) -> Result<(), ValidationError> {
        self.assert_value(value)?;
        match value {
            Value::Null => Ok(()),
            Value::Array(items) => {
                for (i, (child, item)) in self.children.iter().zip(items).enumerate() {
                    child
                        .schema
                        .validate(item)
                        .map_err(|err| ValidationError::at_index(i, err))?;
                }
                Ok(())
            }
            Value::Object(map) => {
                for child in self.children.iter() {
                    let key = child.marker_str();
                    if let Some(item) = map.get(key) {
                        child
                            .schema
                            .validate(item)
                            .map_err(|err| ValidationError::at_key(key, err))?;
                    }
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }

    /// Stores integers held in float slots as floats, which is how they
    /// decode.
    pub(crate) fn normalize(&self, value: Value) -> Value {
        match value {
            Value::Int(n) if self.tag == TypeTag::Float32 => Value::Float(n as f32 as f64),
            Value::Int(n) if self.tag == TypeTag::Float64 => Value::Float(n as f64),
            Value::Array(items) => Value::Array(
                items
                    .into_iter()
                    .zip(self.children.iter())
                    .map(|(item, child)| child.schema.normalize(item))
                    .collect(),
            ),
            Value::Object(map) => Value::Object(
                map.into_iter()
                    .map(|(key, item)| {
                        let item = match self.marker_index(&key) {
                            Some(i) => self.children[i].schema.normalize(item),
                            None => item,
                        };
                        (key, item)
                    })
                    .collect(),
            ),
            other => other,
        }
    }

    /// Serializes the schema section, hashing indirected schemas with
    /// [`BmtHasher`].
    pub fn serialize(&self, with_header: bool) -> Result<Vec<u8>> {
        self.serialize_with(with_header, &BmtHasher)
    }

    /// Serializes the schema section.
    ///
    /// With a header, an indirected node becomes the super header followed
    /// by its reference. Without one it contributes no bytes: its table
    /// lives out of band and its payload follows directly.
    pub fn serialize_with(&self, with_header: bool, hasher: &dyn SchemaHasher) -> Result<Vec<u8>> {
        if self.indirected {
            if !with_header {
                return Ok(Vec::new());
            }
            let reference = self.reference(hasher)?;
            debug!(%reference, tag = %self.tag, "emitting out-of-band schema reference");
            let mut out = Header::new(SlotTag::Super).to_bytes().to_vec();
            out.extend_from_slice(reference.as_bytes());
            return Ok(out);
        }
        let mut out = Vec::new();
        if with_header {
            out.extend_from_slice(&self.header().to_bytes());
        }
        out.extend(self.table_bytes(hasher)?);
        Ok(out)
    }

    fn header(&self) -> Header {
        Header {
            version: self.version,
            slot: SlotTag::Type(self.tag),
        }
    }

    fn table_bytes(&self, hasher: &dyn SchemaHasher) -> Result<Vec<u8>> {
        let Some(kind) = self.tag.container_kind() else {
            return Ok(Vec::new());
        };
        let mut entries = Vec::with_capacity(self.children.len());
        let mut references = Vec::new();
        for child in self.children.iter() {
            let slot = if child.schema.indirected {
                references.push(child.schema.reference(hasher)?);
                SlotTag::Super
            } else {
                SlotTag::Type(child.schema.tag)
            };
            entries.push(TableEntry {
                slot,
                segment_length: child.segment_length,
                marker: child.marker.clone(),
                nullable: child.schema.nullable,
            });
        }
        Ok(layout::write_table(
            kind,
            self.tag.is_nullable_container(),
            &entries,
            &references,
        )?)
    }

    /// The self-contained bytes stored out of band for this node: its real
    /// header followed by its table.
    pub fn schema_blob(&self, hasher: &dyn SchemaHasher) -> Result<Vec<u8>> {
        let mut out = self.header().to_bytes().to_vec();
        out.extend(self.table_bytes(hasher)?);
        Ok(out)
    }

    /// The reference under which [`schema_blob`](Self::schema_blob) is stored.
    pub fn reference(&self, hasher: &dyn SchemaHasher) -> Result<Reference> {
        Ok(hasher.hash(&self.schema_blob(hasher)?))
    }

    /// Every blob that must be persisted before an encoding of this tree can
    /// be decoded, paired with its reference.
    pub fn out_of_band_schemas(
        &self,
        hasher: &dyn SchemaHasher,
    ) -> Result<Vec<(Reference, Vec<u8>)>> {
        let mut out = Vec::new();
        self.collect_out_of_band(hasher, &mut out)?;
        Ok(out)
    }

    fn collect_out_of_band(
        &self,
        hasher: &dyn SchemaHasher,
        out: &mut Vec<(Reference, Vec<u8>)>,
    ) -> Result<()> {
        if self.indirected {
            let blob = self.schema_blob(hasher)?;
            out.push((hasher.hash(&blob), blob));
        }
        for child in self.children.iter() {
            child.schema.collect_out_of_band(hasher, out)?;
        }
        Ok(())
    }

    /// Parses one schema level.
    ///
    /// Without `header` the first [`HEADER_BYTE_LENGTH`] bytes are read as
    /// one. A super header is followed by a reference that is resolved
    /// through `loader`. Returns the parsed level and the number of bytes
    /// consumed; the payload starts right after.
    ///
    /// Nested inline containers keep their tables at the start of their own
    /// payload slices, so the returned [`SchemaHead`] describes this level
    /// only. [`BeeSon::deserialize`](crate::BeeSon::deserialize) walks the
    /// payload to assemble the full tree.
    pub fn deserialize<'a>(
        bytes: &'a [u8],
        header: Option<Header>,
        loader: Option<&'a dyn StorageLoader>,
    ) -> BoxFuture<'a, Result<(SchemaHead, usize)>> {
        async move {
            let (header, mut offset) = match header {
                Some(header) => (header, 0),
                None => (Header::read(bytes)?, HEADER_BYTE_LENGTH),
            };
            let tag = match header.slot {
                SlotTag::Super => {
                    let reference = Reference::new(Reader::at(bytes, offset).bytes32()?);
                    offset += reference.as_bytes().len();
                    let head = resolve(reference, loader).await?;
                    return Ok((head, offset));
                }
                SlotTag::Type(tag) => tag,
            };
            let Some(kind) = tag.container_kind() else {
                return Ok((SchemaHead::bare(header.version, tag), offset));
            };
            let rest = bytes.get(offset..).ok_or(FormatError::UnexpectedEof)?;
            let table = layout::read_table(kind, tag.is_nullable_container(), rest)?;
            let resolved = try_join_all(
                table
                    .references
                    .iter()
                    .map(|reference| resolve(*reference, loader)),
            )
            .await?;
            let mut resolved = resolved.into_iter();
            let mut children = Vec::with_capacity(table.entries.len());
            for entry in table.entries {
                let schema = match entry.slot {
                    SlotTag::Type(tag) => ChildSchema::Inline(tag),
                    SlotTag::Super => match resolved.next() {
                        Some(head) => ChildSchema::Resolved(Box::new(head)),
                        None => {
                            return Err(FormatError::SuperCountMismatch {
                                declared: table.references.len(),
                                found: table.references.len() + 1,
                            }
                            .into())
                        }
                    },
                };
                children.push(HeadChild {
                    schema,
                    segment_length: entry.segment_length,
                    marker: entry.marker,
                    nullable: entry.nullable,
                });
            }
            let head = SchemaHead {
                version: header.version,
                tag,
                indirected: false,
                children,
            };
            Ok((head, offset + table.byte_length))
        }
        .boxed()
    }

    /// Same node with a different nullable flag.
    pub(crate) fn with_nullable(&self, nullable: bool) -> Self {
        Self {
            nullable,
            ..self.clone()
        }
    }

    pub(crate) fn with_child(&self, index: usize, child: ChildDescriptor) -> Self {
        let mut children = self.children.to_vec();
        children[index] = child;
        Self {
            children: children.into(),
            ..self.clone()
        }
    }

    /// The nullable counterpart of this strict container, with every child
    /// flagged nullable.
    pub fn with_nullable_container(&self) -> Result<Self, ValidationError> {
        let tag = match self.tag.nullable_counterpart() {
            Some(tag) => tag,
            None if self.tag.is_container() => {
                return Err(ValidationError::NotStrictContainer(self.tag))
            }
            None => return Err(ValidationError::NotContainer(self.tag)),
        };
        let children: Vec<ChildDescriptor> = self
            .children
            .iter()
            .map(|child| ChildDescriptor {
                segment_length: child.segment_length,
                marker: child.marker.clone(),
                schema: Arc::new(child.schema.with_nullable(true)),
            })
            .collect();
        Ok(Self {
            tag,
            children: children.into(),
            ..self.clone()
        })
    }

    /// Changes the nullable flag of one child of a nullable container.
    pub fn with_child_nullable(
        &self,
        index: usize,
        nullable: bool,
    ) -> Result<Self, ValidationError> {
        if !self.tag.is_nullable_container() {
            return Err(ValidationError::NotNullableContainer(self.tag));
        }
        let child = self
            .children
            .get(index)
            .ok_or_else(|| ValidationError::NoSuchChild(index.to_string()))?;
        let child = ChildDescriptor {
            segment_length: child.segment_length,
            marker: child.marker.clone(),
            schema: Arc::new(child.schema.with_nullable(nullable)),
        };
        Ok(self.with_child(index, child))
    }

    /// Marks this container's schema as stored out of band.
    pub fn indirected(&self, indirected: bool) -> Result<Self, ValidationError> {
        if !self.tag.is_container() {
            return Err(ValidationError::NotContainer(self.tag));
        }
        Ok(Self {
            indirected,
            ..self.clone()
        })
    }
}

/// Resolves one reference to the schema level stored behind it.
async fn resolve(
    reference: Reference,
    loader: Option<&dyn StorageLoader>,
) -> Result<SchemaHead> {
    let loader = loader.ok_or(ResolutionError::MissingLoader)?;
    let blob = loader
        .load(&reference)
        .await
        .map_err(|source| ResolutionError::Load { reference, source })?;
    debug!(%reference, bytes = blob.len(), "resolved out-of-band schema");
    let header = Header::read(&blob)?;
    match header.slot {
        SlotTag::Type(tag) if tag.is_container() => {}
        SlotTag::Type(tag) => return Err(FormatError::ScalarIndirection(tag).into()),
        SlotTag::Super => return Err(FormatError::UnknownTypeTag(header.slot.code()).into()),
    }
    let body = blob.get(HEADER_BYTE_LENGTH..).ok_or(FormatError::UnexpectedEof)?;
    let (mut head, _) = SchemaNode::deserialize(body, Some(header), Some(loader)).await?;
    head.indirected = true;
    Ok(head)
}

/// One decoded schema level.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaHead {
    pub version: Version,
    pub tag: TypeTag,
    /// The level was read from an out-of-band blob.
    pub indirected: bool,
    pub children: Vec<HeadChild>,
}

/// A child slot of a [`SchemaHead`].
#[derive(Debug, Clone, PartialEq)]
pub struct HeadChild {
    pub schema: ChildSchema,
    pub segment_length: Option<u32>,
    pub marker: Option<String>,
    pub nullable: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChildSchema {
    /// A scalar tag, or a container whose table opens its payload slice.
    Inline(TypeTag),
    /// A container level resolved from out of band.
    Resolved(Box<SchemaHead>),
}

impl SchemaHead {
    /// A level with no known children.
    pub(crate) fn bare(version: Version, tag: TypeTag) -> Self {
        Self {
            version,
            tag,
            indirected: false,
            children: Vec::new(),
        }
    }

    /// Builds a node from what this level knows. Inline container children
    /// get empty child lists since their tables live in payload bytes.
    pub fn into_shallow_node(self) -> SchemaNode {
        let children = self
            .children
            .into_iter()
            .map(|child| {
                let schema = match child.schema {
                    ChildSchema::Inline(tag) => {
                        SchemaNode::from_parts(tag, false, false, Vec::new())
                    }
                    ChildSchema::Resolved(head) => head.into_shallow_node(),
                };
                ChildDescriptor::new(
                    child.segment_length,
                    child.marker,
                    schema.with_nullable(child.nullable),
                )
            })
            .collect();
        SchemaNode {
            version: self.version,
            tag: self.tag,
            nullable: false,
            indirected: self.indirected,
            children,
        }
    }
}
