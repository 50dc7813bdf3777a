//! BeeSon type tags and their stable wire codes.

use serde::{Deserialize, Serialize};

use crate::constants::SUPER_TYPE_CODE;

/// The closed set of value types a schema node can describe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TypeTag {
    Null,
    Boolean,
    Float32,
    Float64,
    Uint8,
    Int8,
    Int16,
    Int32,
    Int64,
    String,
    ManifestRef,
    FeedRef,
    Array,
    NullableArray,
    Object,
    NullableObject,
}

/// The two container families; nullability is orthogonal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContainerKind {
    Array,
    Object,
}

impl TypeTag {
    pub const ALL: [TypeTag; 16] = [
        TypeTag::Null,
        TypeTag::Boolean,
        TypeTag::Float32,
        TypeTag::Float64,
        TypeTag::Uint8,
        TypeTag::Int8,
        TypeTag::Int16,
        TypeTag::Int32,
        TypeTag::Int64,
        TypeTag::String,
        TypeTag::ManifestRef,
        TypeTag::FeedRef,
        TypeTag::Array,
        TypeTag::NullableArray,
        TypeTag::Object,
        TypeTag::NullableObject,
    ];

    /// Wire code of the tag.
    pub const fn code(self) -> u16 {
        match self {
            TypeTag::Null => 1,
            TypeTag::Boolean => 2,
            TypeTag::Float32 => 16,
            TypeTag::Float64 => 17,
            TypeTag::Uint8 => 32,
            TypeTag::Int8 => 48,
            TypeTag::Int16 => 49,
            TypeTag::Int32 => 50,
            TypeTag::Int64 => 51,
            TypeTag::String => 64,
            TypeTag::ManifestRef => 80,
            TypeTag::FeedRef => 81,
            TypeTag::Array => 256,
            TypeTag::NullableArray => 257,
            TypeTag::Object => 512,
            TypeTag::NullableObject => 513,
        }
    }

    pub fn from_code(code: u16) -> Option<Self> {
        TypeTag::ALL.into_iter().find(|tag| tag.code() == code)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TypeTag::Null => "null",
            TypeTag::Boolean => "boolean",
            TypeTag::Float32 => "float32",
            TypeTag::Float64 => "float64",
            TypeTag::Uint8 => "uint8",
            TypeTag::Int8 => "int8",
            TypeTag::Int16 => "int16",
            TypeTag::Int32 => "int32",
            TypeTag::Int64 => "int64",
            TypeTag::String => "string",
            TypeTag::ManifestRef => "manifestRef",
            TypeTag::FeedRef => "feedRef",
            TypeTag::Array => "array",
            TypeTag::NullableArray => "nullableArray",
            TypeTag::Object => "object",
            TypeTag::NullableObject => "nullableObject",
        }
    }

    pub fn container_kind(self) -> Option<ContainerKind> {
        match self {
            TypeTag::Array | TypeTag::NullableArray => Some(ContainerKind::Array),
            TypeTag::Object | TypeTag::NullableObject => Some(ContainerKind::Object),
            TypeTag::Null
            | TypeTag::Boolean
            | TypeTag::Float32
            | TypeTag::Float64
            | TypeTag::Uint8
            | TypeTag::Int8
            | TypeTag::Int16
            | TypeTag::Int32
            | TypeTag::Int64
            | TypeTag::String
            | TypeTag::ManifestRef
            | TypeTag::FeedRef => None,
        }
    }

    pub fn is_container(self) -> bool {
        self.container_kind().is_some()
    }

    /// True for the container tags whose children may be flagged nullable.
    pub fn is_nullable_container(self) -> bool {
        matches!(self, TypeTag::NullableArray | TypeTag::NullableObject)
    }

    /// The nullable counterpart of a strict container tag.
    pub fn nullable_counterpart(self) -> Option<TypeTag> {
        match self {
            TypeTag::Array => Some(TypeTag::NullableArray),
            TypeTag::Object => Some(TypeTag::NullableObject),
            _ => None,
        }
    }

    /// Width in bytes of the fixed-size numeric encodings.
    pub fn numeric_width(self) -> Option<usize> {
        match self {
            TypeTag::Uint8 | TypeTag::Int8 => Some(1),
            TypeTag::Int16 => Some(2),
            TypeTag::Int32 | TypeTag::Float32 => Some(4),
            TypeTag::Int64 | TypeTag::Float64 => Some(8),
            _ => None,
        }
    }
}

impl std::fmt::Display for TypeTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The tag carried by a header or descriptor slot: either a real type or the
/// out-of-band marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlotTag {
    Type(TypeTag),
    Super,
}

impl SlotTag {
    pub const fn code(self) -> u16 {
        match self {
            SlotTag::Type(tag) => tag.code(),
            SlotTag::Super => SUPER_TYPE_CODE,
        }
    }

    pub fn from_code(code: u16) -> Option<Self> {
        if code == SUPER_TYPE_CODE {
            return Some(SlotTag::Super);
        }
        TypeTag::from_code(code).map(SlotTag::Type)
    }
}

impl From<TypeTag> for SlotTag {
    fn from(tag: TypeTag) -> Self {
        SlotTag::Type(tag)
    }
}
