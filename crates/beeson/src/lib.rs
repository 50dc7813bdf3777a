//! BeeSon: a segment-aligned, self-describing binary encoding for JSON-like
//! values.
//!
//! Every encoding is a schema section followed by a payload, both aligned to
//! 32-byte segments so documents map cleanly onto Swarm chunks. Container
//! schemas can be stored out of band and referenced by content hash; decoding
//! such documents needs a [`StorageLoader`].
//!
//! ```
//! use beeson::{BeeSon, BmtHasher, MemoryStorage};
//! use serde_json::json;
//!
//! # futures::executor::block_on(async {
//! let node = BeeSon::from_json(&json!({"tags": ["a", "b"], "n": 1}))
//!     .unwrap()
//!     .with_child_indirected("tags", true)
//!     .unwrap();
//!
//! let storage = MemoryStorage::new();
//! storage.save_schemas(node.out_of_band_schemas(&BmtHasher).unwrap());
//!
//! let bytes = node.serialize().unwrap();
//! let back = BeeSon::deserialize(&bytes, None, Some(&storage)).await.unwrap();
//! assert_eq!(back.json().unwrap(), node.json().unwrap());
//! # });
//! ```

mod bitvector;
mod constants;
mod error;
mod layout;
mod loader;
mod marshal;
mod node;
mod payload;
mod reference;
mod schema;
mod segment;
mod tag;
mod value;

pub use bitvector::BitVector;
pub use constants::{
    Version, ARRAY_ENTRY_LENGTH, HEADER_BYTE_LENGTH, OBJECT_ENTRY_LENGTH, REFERENCE_LENGTH,
    SEGMENT_SIZE, SUPER_TYPE_CODE, UNKNOWN_SEGMENT_LENGTH,
};
pub use error::{
    BeeSonError, BitVectorError, ErrorKind, FormatError, LoadError, ResolutionError, Result,
    ValidationError,
};
pub use layout::{read_table, write_table, Table, TableEntry};
pub use loader::{MemoryStorage, NotFound, StorageLoader};
pub use marshal::address::{parse_cid, to_cid, AddressKind};
pub use node::BeeSon;
pub use reference::{chunk_address, BmtHasher, Reference, SchemaHasher, CHUNK_PAYLOAD_SIZE};
pub use schema::{
    infer_schema, ChildDescription, ChildDescriptor, ChildKey, ChildSchema, Header, HeadChild,
    SchemaDescription, SchemaHead, SchemaNode,
};
pub use tag::{ContainerKind, SlotTag, TypeTag};
pub use value::Value;
