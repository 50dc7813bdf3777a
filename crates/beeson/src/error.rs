//! Error types, one enum per failure kind.

use thiserror::Error;

use crate::reference::Reference;
use crate::tag::TypeTag;
use beeson_buffers::BufferError;

/// Error returned by a [`StorageLoader`](crate::StorageLoader).
pub type LoadError = Box<dyn std::error::Error + Send + Sync>;

/// A value does not fit the schema it is assigned to.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    #[error("wrong value for type {expected}: got {actual}")]
    WrongValue {
        expected: TypeTag,
        actual: &'static str,
    },
    #[error("array has {actual} elements, the schema defines {expected}")]
    ArrayLength { expected: usize, actual: usize },
    #[error("object is missing keys: {}", .0.join(", "))]
    MissingKeys(Vec<String>),
    #[error("object has keys the schema does not define: {}", .0.join(", "))]
    UnexpectedKeys(Vec<String>),
    #[error("at index {index}: {source}")]
    AtIndex {
        index: usize,
        source: Box<ValidationError>,
    },
    #[error("at key `{key}`: {source}")]
    AtKey {
        key: String,
        source: Box<ValidationError>,
    },
    #[error("value cannot be identified: {0}")]
    Unidentifiable(String),
    #[error("type {0} is not a nullable container")]
    NotNullableContainer(TypeTag),
    #[error("type {0} is not a strict container")]
    NotStrictContainer(TypeTag),
    #[error("type {0} is not a container")]
    NotContainer(TypeTag),
    #[error("no child `{0}`")]
    NoSuchChild(String),
    #[error("duplicate marker `{0}`")]
    DuplicateMarker(String),
    #[error("child encoding takes {actual} segments, the schema declares {declared}")]
    SegmentOverflow { declared: u32, actual: usize },
    #[error("child {0} has an unknown segment length but is not the last child")]
    UnknownSegmentLength(usize),
    #[error("invalid schema description: {0}")]
    InvalidDescription(String),
}

impl ValidationError {
    pub(crate) fn at_index(index: usize, source: ValidationError) -> Self {
        ValidationError::AtIndex {
            index,
            source: Box::new(source),
        }
    }

    pub(crate) fn at_key(key: &str, source: ValidationError) -> Self {
        ValidationError::AtKey {
            key: key.to_owned(),
            source: Box::new(source),
        }
    }
}

/// The bytes being decoded are not a valid BeeSon encoding.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("unsupported BeeSon version {0:?}")]
    UnsupportedVersion([u8; 4]),
    #[error("unknown type code {0}")]
    UnknownTypeTag(u16),
    #[error("unexpected end of input")]
    UnexpectedEof,
    #[error("invalid UTF-8")]
    InvalidUtf8,
    #[error("string payload has no terminator")]
    MissingStringTerminator,
    #[error("descriptor table declares {declared} out-of-band schemas, found {found}")]
    SuperCountMismatch { declared: usize, found: usize },
    #[error("object markers are not in ascending order")]
    UnsortedMarkers,
    #[error("{0} does not fit its length field")]
    LengthOverflow(&'static str),
    #[error("unknown segment length on child {0}, which is not the last child")]
    MisplacedUnknownLength(usize),
    #[error("payload marks child {0} null but its slot is not nullable")]
    NullInStrictSlot(usize),
    #[error("invalid address: {0}")]
    InvalidAddress(String),
    #[error("out-of-band schema for a {0} slot must be a container")]
    ScalarIndirection(TypeTag),
}

impl From<BufferError> for FormatError {
    fn from(err: BufferError) -> Self {
        match err {
            BufferError::EndOfBuffer => FormatError::UnexpectedEof,
            BufferError::InvalidUtf8 => FormatError::InvalidUtf8,
        }
    }
}

/// An out-of-band schema could not be resolved.
#[derive(Debug, Error)]
pub enum ResolutionError {
    #[error("no storage loader was supplied to resolve an out-of-band schema")]
    MissingLoader,
    #[error("failed to load schema {reference}: {source}")]
    Load {
        reference: Reference,
        #[source]
        source: LoadError,
    },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BitVectorError {
    #[error("bit vector can contain maximum {capacity} bits, index {index} is out of range")]
    OutOfBounds { index: usize, capacity: usize },
    #[error("bit vector of {capacity} bits needs {expected} bytes, got {actual}")]
    LengthMismatch {
        capacity: usize,
        expected: usize,
        actual: usize,
    },
}

/// Coarse error classes callers can branch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Format,
    Resolution,
    State,
}

#[derive(Debug, Error)]
pub enum BeeSonError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Format(#[from] FormatError),
    #[error(transparent)]
    Resolution(#[from] ResolutionError),
    #[error(transparent)]
    BitVector(#[from] BitVectorError),
    #[error("there is no value set")]
    ValueUnset,
}

impl BeeSonError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            BeeSonError::Validation(_) => ErrorKind::Validation,
            BeeSonError::Format(_) | BeeSonError::BitVector(_) => ErrorKind::Format,
            BeeSonError::Resolution(_) => ErrorKind::Resolution,
            BeeSonError::ValueUnset => ErrorKind::State,
        }
    }

    pub(crate) fn at_index(self, index: usize) -> Self {
        match self {
            BeeSonError::Validation(err) => ValidationError::at_index(index, err).into(),
            other => other,
        }
    }

    pub(crate) fn at_key(self, key: &str) -> Self {
        match self {
            BeeSonError::Validation(err) => ValidationError::at_key(key, err).into(),
            other => other,
        }
    }
}

impl From<BufferError> for BeeSonError {
    fn from(err: BufferError) -> Self {
        BeeSonError::Format(err.into())
    }
}

pub type Result<T, E = BeeSonError> = std::result::Result<T, E>;
