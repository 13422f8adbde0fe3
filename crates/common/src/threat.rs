//! # Threat Attestation Types
//!
//! Value types for the threat-intelligence half of the contract: the
//! severity scale, the attestation record anchored in the store, the
//! global threat index entry, the per-verifier stamp, and the address
//! validation rule applied to reported endpoints.
//!
//! ## Attestation Invariants
//!
//! - The attestation id is `threat_<source-ip>_<timestamp>` and is unique
//!   per `(source_ip, timestamp)` pair.
//! - Two reports for the same `(source_ip, threat_type)` within the same
//!   suppression window collapse into one; the later one is rejected.
//! - `verified` is true exactly when `verification_count` has reached the
//!   verification quorum.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use crate::types::Principal;

// ════════════════════════════════════════════════════════════════════════════
// THREAT LEVEL
// ════════════════════════════════════════════════════════════════════════════

/// Severity of a reported threat, ordered from `Info` to `Emergency`.
///
/// Levels at `Critical` or above additionally feed the global threat
/// index. Serialized as the ordinal; parsed from its canonical name on
/// the invocation surface.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ThreatLevel {
    Info,
    Warning,
    Critical,
    Emergency,
}

impl ThreatLevel {
    pub fn as_u8(self) -> u8 {
        match self {
            ThreatLevel::Info => 0,
            ThreatLevel::Warning => 1,
            ThreatLevel::Critical => 2,
            ThreatLevel::Emergency => 3,
        }
    }

    pub fn from_u8(v: u8) -> Option<Self> {
        match v {
            0 => Some(ThreatLevel::Info),
            1 => Some(ThreatLevel::Warning),
            2 => Some(ThreatLevel::Critical),
            3 => Some(ThreatLevel::Emergency),
            _ => None,
        }
    }

    /// Parses the canonical level name used on the invocation surface.
    /// Unknown names are rejected, there is no fallback level.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "Info" => Some(ThreatLevel::Info),
            "Warning" => Some(ThreatLevel::Warning),
            "Critical" => Some(ThreatLevel::Critical),
            "Emergency" => Some(ThreatLevel::Emergency),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ThreatLevel::Info => "Info",
            ThreatLevel::Warning => "Warning",
            ThreatLevel::Critical => "Critical",
            ThreatLevel::Emergency => "Emergency",
        }
    }
}

impl fmt::Display for ThreatLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for ThreatLevel {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u8(self.as_u8())
    }
}

impl<'de> Deserialize<'de> for ThreatLevel {
    fn deserialize<D>(deserializer: D) -> std::result::Result<ThreatLevel, D::Error>
    where
        D: Deserializer<'de>,
    {
        let v = u8::deserialize(deserializer)?;
        ThreatLevel::from_u8(v)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown threat level ordinal {v}")))
    }
}

// ════════════════════════════════════════════════════════════════════════════
// ATTESTATION RECORD
// ════════════════════════════════════════════════════════════════════════════

/// A signed, timestamped threat report anchored in the store.
///
/// Created by an active sensor node; cross-verified by validators until
/// the verification quorum flips `verified`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreatAttestation {
    /// Derived id: `threat_<source-ip>_<timestamp>`.
    pub id: String,
    pub timestamp: i64,
    pub source_ip: String,
    pub target_ip: String,
    /// Operator-defined category, e.g. "ddos" or "bruteforce". Opaque to
    /// the contract beyond duplicate suppression.
    pub threat_type: String,
    pub threat_level: ThreatLevel,
    /// Free-form description of what the sensor observed.
    pub context: String,
    /// Principal of the reporting sensor node.
    pub agent_address: Principal,
    /// Hash of off-chain evidence, empty if none was attached.
    pub evidence_hash: String,
    pub geolocation: String,
    pub network_flow: String,
    /// True once `verification_count` has reached the quorum.
    pub verified: bool,
    pub verification_count: u64,
    /// Regulatory tag, defaulting to the reporter's compliance zone.
    pub compliance_tag: String,
    pub region: String,
}

impl ThreatAttestation {
    /// Derives the attestation id for a report.
    pub fn derive_id(source_ip: &str, timestamp: i64) -> String {
        format!("threat_{source_ip}_{timestamp}")
    }
}

/// One entry of the global threat index, keyed by source ip.
///
/// `level` only ever moves upward; `first_seen` is immutable after
/// insertion; `last_seen` and `report_count` track every qualifying
/// re-report.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalThreatEntry {
    pub ip: String,
    pub level: ThreatLevel,
    pub first_seen: i64,
    pub last_seen: i64,
    pub report_count: u64,
}

/// Per-(attestation, validator) verification stamp.
///
/// Its presence in the store makes repeat verification by the same
/// validator a no-op.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationStamp {
    pub verifier: Principal,
    pub verified: bool,
    pub timestamp: i64,
    pub report_id: String,
}

// ════════════════════════════════════════════════════════════════════════════
// ENDPOINT VALIDATION
// ════════════════════════════════════════════════════════════════════════════

/// Validates a reported endpoint address.
///
/// The address is split on `.` and every segment must be empty, the
/// wildcard `x`, or a decimal integer. Empty and `x` segments admit
/// subnet-style reports such as `192.168.1.` or `192.168.1.x`. Segment
/// count is not enforced.
pub fn is_valid_endpoint(ip: &str) -> bool {
    ip.split('.').all(|segment| {
        segment.is_empty() || segment == "x" || segment.parse::<u64>().is_ok()
    })
}
