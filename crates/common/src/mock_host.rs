//! Mock host implementations for testing.
//!
//! This module provides fully in-memory stand-ins for the three host
//! collaborators: the key-value store, the event sink, and the signature
//! verifier. All of them are deterministic; none performs I/O.
//!
//! # Example
//!
//! ```ignore
//! use sentra_common::mock_host::{AllowAllVerifier, CollectingSink, MemoryStore};
//!
//! let store = MemoryStore::new();
//! let sink = CollectingSink::new();
//! let verifier = AllowAllVerifier;
//! ```

use std::collections::BTreeMap;

use crate::crypto::{CryptoError, SignatureVerifier};
use crate::store::{Event, EventSink, HostStore, StoreError};
use crate::types::Principal;

/// In-memory key-value store backed by a `BTreeMap`.
///
/// Iteration order is the byte order of keys, so snapshots and
/// comparisons are deterministic. Invocation atomicity is the engine's
/// responsibility; this store is just a map.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MemoryStore {
    entries: BTreeMap<Vec<u8>, Vec<u8>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains_key(&self, key: &[u8]) -> bool {
        self.entries.contains_key(key)
    }

    /// Test helper: seed a raw entry without going through the engine.
    pub fn inject(&mut self, key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) {
        self.entries.insert(key.into(), value.into());
    }

    /// Keys currently present under an ASCII prefix. Handy for invariant
    /// checks in tests.
    pub fn keys_with_prefix(&self, prefix: &str) -> Vec<String> {
        self.entries
            .keys()
            .filter_map(|k| std::str::from_utf8(k).ok())
            .filter(|k| k.starts_with(prefix))
            .map(|k| k.to_string())
            .collect()
    }
}

impl HostStore for MemoryStore {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn put(&mut self, key: &[u8], value: &[u8]) -> Result<(), StoreError> {
        self.entries.insert(key.to_vec(), value.to_vec());
        Ok(())
    }

    fn delete(&mut self, key: &[u8]) -> Result<(), StoreError> {
        self.entries.remove(key);
        Ok(())
    }
}

/// Event sink that collects every appended event in order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CollectingSink {
    events: Vec<Event>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Drains and returns the collected events.
    pub fn take(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }
}

impl EventSink for CollectingSink {
    fn append(&mut self, event: Event) {
        self.events.push(event);
    }
}

/// Verifier that accepts every signature. For tests that exercise logic
/// other than signature checking.
#[derive(Debug, Default, Clone, Copy)]
pub struct AllowAllVerifier;

impl SignatureVerifier for AllowAllVerifier {
    fn verify(
        &self,
        _caller: &Principal,
        _digest: &[u8],
        _signature: &[u8],
    ) -> Result<bool, CryptoError> {
        Ok(true)
    }
}

/// Verifier that rejects every signature.
#[derive(Debug, Default, Clone, Copy)]
pub struct RejectAllVerifier;

impl SignatureVerifier for RejectAllVerifier {
    fn verify(
        &self,
        _caller: &Principal,
        _digest: &[u8],
        _signature: &[u8],
    ) -> Result<bool, CryptoError> {
        Ok(false)
    }
}
