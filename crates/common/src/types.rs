//! # Core Identity Types
//!
//! Principal identifiers and the contract lifecycle state.
//!
//! A `Principal` is the opaque caller identity supplied by the host for
//! every invocation. The engine never interprets its contents beyond a
//! minimum-length well-formedness check; on hosts that derive principals
//! from key material the string is a hex-encoded address, but nothing in
//! the engine depends on that.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Minimum length of a well-formed principal or node address string.
pub const MIN_PRINCIPAL_LEN: usize = 10;

/// Opaque caller identity supplied by the host.
///
/// Principals are compared byte-for-byte and stored verbatim in the
/// key-value store, both as key suffixes and as JSON string values.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Principal(pub String);

impl Principal {
    pub fn new(s: impl Into<String>) -> Self {
        Principal(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Address strings shorter than [`MIN_PRINCIPAL_LEN`] are rejected
    /// wherever an address enters the system as an argument.
    pub fn is_well_formed(&self) -> bool {
        self.0.len() >= MIN_PRINCIPAL_LEN
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Principal").field(&self.0).finish()
    }
}

impl From<&str> for Principal {
    fn from(s: &str) -> Self {
        Principal(s.to_string())
    }
}

impl Serialize for Principal {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Principal {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Principal, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(Principal(s))
    }
}

// ════════════════════════════════════════════════════════════════════════════
// CONTRACT LIFECYCLE STATE
// ════════════════════════════════════════════════════════════════════════════

/// Lifecycle state of the whole contract.
///
/// Stored as a single ASCII digit under the state singleton key. While the
/// contract is not `Active`, every mutating operation except the resume
/// operation is rejected. `EmergencyStopped` is representable but nothing
/// currently transitions into it.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ContractState {
    Active,
    Paused,
    EmergencyStopped,
}

impl ContractState {
    pub fn as_u8(self) -> u8 {
        match self {
            ContractState::Active => 0,
            ContractState::Paused => 1,
            ContractState::EmergencyStopped => 2,
        }
    }

    pub fn from_u8(v: u8) -> Option<Self> {
        match v {
            0 => Some(ContractState::Active),
            1 => Some(ContractState::Paused),
            2 => Some(ContractState::EmergencyStopped),
            _ => None,
        }
    }

    /// ASCII encoding used in the store ("0", "1", "2").
    pub fn encode(self) -> Vec<u8> {
        self.as_u8().to_string().into_bytes()
    }

    pub fn decode(bytes: &[u8]) -> Option<Self> {
        std::str::from_utf8(bytes)
            .ok()
            .and_then(|s| s.trim().parse::<u8>().ok())
            .and_then(Self::from_u8)
    }
}

impl fmt::Display for ContractState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContractState::Active => write!(f, "active"),
            ContractState::Paused => write!(f, "paused"),
            ContractState::EmergencyStopped => write!(f, "emergency-stopped"),
        }
    }
}
