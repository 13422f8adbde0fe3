//! # Host Collaborator Contracts
//!
//! Traits the engine consumes from its host environment: the transactional
//! key-value store and the append-only event sink. The engine owns neither;
//! it is handed implementations at construction time and never assumes any
//! in-memory state survives across invocations.
//!
//! ## Store Contract
//!
//! `HostStore` is a flat byte-keyed map with serializable isolation per
//! invocation, provided by the host. The engine performs all durable reads
//! and writes through it; atomicity of one invocation is layered on top by
//! the engine's staging buffer, so a `HostStore` implementation only has to
//! be a correct map.
//!
//! ## Event Contract
//!
//! Events are named tuples of ASCII string fields. Field order is part of
//! the schema; downstream consumers match positionally. The sink append is
//! infallible from the engine's point of view; durability is the host's
//! problem.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors crossing the store boundary.
///
/// `Backend` wraps host-side failures; `Encode`/`Decode` cover marshal
/// failures for typed entities, which indicate a corrupt or foreign value
/// under an engine-owned key.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("failed to {op}: {detail}")]
    Backend { op: String, detail: String },

    #[error("failed to marshal {entity}: {detail}")]
    Encode { entity: &'static str, detail: String },

    #[error("failed to unmarshal {entity}: {detail}")]
    Decode { entity: &'static str, detail: String },
}

impl StoreError {
    pub fn backend(op: impl Into<String>, detail: impl Into<String>) -> Self {
        StoreError::Backend {
            op: op.into(),
            detail: detail.into(),
        }
    }
}

/// Host key-value store: get/put/delete over opaque byte keys.
///
/// The host serializes invocations into a total order, so implementations
/// are free to be plain single-threaded maps. Keys written by the engine
/// are ASCII and prefix-delimited.
pub trait HostStore {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError>;

    fn put(&mut self, key: &[u8], value: &[u8]) -> Result<(), StoreError>;

    fn delete(&mut self, key: &[u8]) -> Result<(), StoreError>;
}

/// One emitted event: a stable name plus ordered string fields.
///
/// Numeric fields are rendered in decimal; field order never changes for
/// a given name.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub name: String,
    pub fields: Vec<String>,
}

impl Event {
    pub fn new(name: impl Into<String>, fields: Vec<String>) -> Self {
        Event {
            name: name.into(),
            fields,
        }
    }
}

/// Host event sink: an append-only log of emitted events.
///
/// The engine buffers events per invocation and appends them only after
/// the invocation's writes commit, in source order.
pub trait EventSink {
    fn append(&mut self, event: Event);
}
