//! Resolution of out-of-band schemas.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;

use crate::error::LoadError;
use crate::reference::{Reference, SchemaHasher};

/// Fetches the bytes stored under a reference.
///
/// Supplied by the embedding application and threaded explicitly through
/// every decode call. A failed load aborts the whole decode.
#[async_trait]
pub trait StorageLoader: Send + Sync {
    async fn load(&self, reference: &Reference) -> Result<Vec<u8>, LoadError>;
}

/// Returned by [`MemoryStorage`] for references it does not hold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotFound(pub Reference);

impl fmt::Display for NotFound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "no data stored under {}", self.0)
    }
}

impl std::error::Error for NotFound {}

/// In-memory content-addressed store.
///
/// Clones share the same underlying map.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    data: Arc<RwLock<HashMap<Reference, Vec<u8>>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `bytes` under an explicit reference.
    pub fn insert(&self, reference: Reference, bytes: Vec<u8>) {
        self.data
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(reference, bytes);
    }

    /// Stores `bytes` under their content address and returns it.
    pub fn save(&self, bytes: Vec<u8>, hasher: &dyn SchemaHasher) -> Reference {
        let reference = hasher.hash(&bytes);
        self.insert(reference, bytes);
        reference
    }

    /// Stores every `(reference, blob)` pair, as produced by
    /// [`SchemaNode::out_of_band_schemas`](crate::SchemaNode::out_of_band_schemas).
    pub fn save_schemas(&self, schemas: impl IntoIterator<Item = (Reference, Vec<u8>)>) {
        let mut data = self.data.write().unwrap_or_else(PoisonError::into_inner);
        for (reference, bytes) in schemas {
            data.insert(reference, bytes);
        }
    }

    pub fn contains(&self, reference: &Reference) -> bool {
        self.data
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(reference)
    }

    pub fn len(&self) -> usize {
        self.data
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl StorageLoader for MemoryStorage {
    async fn load(&self, reference: &Reference) -> Result<Vec<u8>, LoadError> {
        self.data
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(reference)
            .cloned()
            .ok_or_else(|| Box::new(NotFound(*reference)) as LoadError)
    }
}
