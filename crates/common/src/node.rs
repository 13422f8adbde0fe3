//! # Node Records & Membership Tiers
//!
//! On-chain state for every sensor node admitted to the network: the
//! [`Node`] record itself, its lifecycle [`NodeStatus`], the membership
//! [`NodeTier`], and the reputation history entry.
//!
//! ## Record Invariants
//!
//! - Every stored `Node` has a corresponding node-id index entry, and the
//!   index maps `node_id` back to `node_address`. No two nodes share a
//!   `node_id`.
//! - A node address appears in at most one tier list at any time.
//! - `is_consensus_node == true` exactly when the address is a member of
//!   the consensus tier list.
//! - `reputation_score` stays within `[0, 1000]`.
//! - `challenge_count`, `threat_score`, and `verified_threats` only grow.
//!
//! ## Serialization
//!
//! `Node` serializes via serde with snake_case field names. `NodeStatus`
//! serializes as its ordinal so the stored JSON stays compatible across
//! runtimes that treat enums as plain integers. `DeploymentType` is a
//! lowercase string.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use crate::types::Principal;

/// Reputation score assigned to every freshly admitted node.
pub const INITIAL_REPUTATION: u64 = 100;

/// Upper clamp for reputation scores.
pub const MAX_REPUTATION: u64 = 1000;

// ════════════════════════════════════════════════════════════════════════════
// NODE STATUS
// ════════════════════════════════════════════════════════════════════════════

/// Lifecycle status of an admitted node.
///
/// A node is created `Registered` by a successful stake and never deleted;
/// withdrawal reduces stake, slashing moves the node to `Slashed`, which is
/// terminal for withdrawal purposes. Only `Active` nodes may submit threat
/// reports or challenges.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum NodeStatus {
    Unregistered,
    Registered,
    Active,
    Slashed,
    PendingRemoval,
    ThreatDetected,
    Verified,
}

impl NodeStatus {
    pub fn as_u8(self) -> u8 {
        match self {
            NodeStatus::Unregistered => 0,
            NodeStatus::Registered => 1,
            NodeStatus::Active => 2,
            NodeStatus::Slashed => 3,
            NodeStatus::PendingRemoval => 4,
            NodeStatus::ThreatDetected => 5,
            NodeStatus::Verified => 6,
        }
    }

    pub fn from_u8(v: u8) -> Option<Self> {
        match v {
            0 => Some(NodeStatus::Unregistered),
            1 => Some(NodeStatus::Registered),
            2 => Some(NodeStatus::Active),
            3 => Some(NodeStatus::Slashed),
            4 => Some(NodeStatus::PendingRemoval),
            5 => Some(NodeStatus::ThreatDetected),
            6 => Some(NodeStatus::Verified),
            _ => None,
        }
    }
}

impl fmt::Display for NodeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeStatus::Unregistered => write!(f, "unregistered"),
            NodeStatus::Registered => write!(f, "registered"),
            NodeStatus::Active => write!(f, "active"),
            NodeStatus::Slashed => write!(f, "slashed"),
            NodeStatus::PendingRemoval => write!(f, "pending-removal"),
            NodeStatus::ThreatDetected => write!(f, "threat-detected"),
            NodeStatus::Verified => write!(f, "verified"),
        }
    }
}

impl Serialize for NodeStatus {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u8(self.as_u8())
    }
}

impl<'de> Deserialize<'de> for NodeStatus {
    fn deserialize<D>(deserializer: D) -> std::result::Result<NodeStatus, D::Error>
    where
        D: Deserializer<'de>,
    {
        let v = u8::deserialize(deserializer)?;
        NodeStatus::from_u8(v)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown node status ordinal {v}")))
    }
}

// ════════════════════════════════════════════════════════════════════════════
// MEMBERSHIP TIER
// ════════════════════════════════════════════════════════════════════════════

/// Membership tier a node stakes into.
///
/// The consensus tier is safety-critical: it carries the highest stake
/// requirement and is capped in size. Partition nodes aggregate regional
/// intelligence; edge nodes are numerous, lightweight sensors.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum NodeTier {
    Consensus,
    Partition,
    Edge,
}

impl NodeTier {
    /// Maps the numeric `node_type` staking argument to a tier.
    /// 0 is consensus, 1 is partition, everything else is edge.
    pub fn from_node_type(node_type: u8) -> Self {
        match node_type {
            0 => NodeTier::Consensus,
            1 => NodeTier::Partition,
            _ => NodeTier::Edge,
        }
    }

    /// Deployment classification recorded on nodes of this tier.
    pub fn deployment_type(self) -> DeploymentType {
        match self {
            NodeTier::Consensus => DeploymentType::Consensus,
            NodeTier::Partition => DeploymentType::Intelligence,
            NodeTier::Edge => DeploymentType::Edge,
        }
    }
}

impl fmt::Display for NodeTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeTier::Consensus => write!(f, "consensus"),
            NodeTier::Partition => write!(f, "partition"),
            NodeTier::Edge => write!(f, "edge"),
        }
    }
}

/// Deployment classification of a node, serialized as a lowercase string.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeploymentType {
    Edge,
    Consensus,
    Intelligence,
}

impl fmt::Display for DeploymentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeploymentType::Edge => write!(f, "edge"),
            DeploymentType::Consensus => write!(f, "consensus"),
            DeploymentType::Intelligence => write!(f, "intelligence"),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// NODE RECORD
// ════════════════════════════════════════════════════════════════════════════

/// Single source of truth for one admitted node.
///
/// Created by a successful stake, keyed by `node_address`, indexed by
/// `node_id`. The record is never deleted; lifecycle transitions and
/// counter updates rewrite it in place.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    /// Principal of the node operator (primary key).
    pub node_address: Principal,
    /// Currently staked amount. Reduced by withdrawals and slashing.
    pub stake_amount: u64,
    /// Timestamp of first admission. The withdrawal lock period counts
    /// from here.
    pub stake_start: i64,
    /// Reputation score, clamped to `[0, 1000]`.
    pub reputation_score: u64,
    /// Lifecycle status, serialized as its ordinal.
    pub status: NodeStatus,
    /// Operator-chosen identifier, globally unique.
    pub node_id: String,
    /// Hash of the operator's business license filing. Immutable.
    pub business_license: String,
    /// Hash of the operator's registration filing number. Immutable.
    pub filing_number: String,
    /// Total challenges and threat reports submitted by this node.
    pub challenge_count: u64,
    pub challenges_won: u64,
    pub challenges_lost: u64,
    /// Timestamp of the last observed activity.
    pub last_seen: i64,
    /// True exactly while the address is in the consensus tier list.
    pub is_consensus_node: bool,
    /// Set once the node has submitted at least one threat report.
    pub is_threat_sensor: bool,
    /// Version string reported by the operator's sensor agent.
    pub agent_version: String,
    /// Deployment classification derived from the admission tier.
    pub deployment_type: DeploymentType,
    /// Timestamp of the most recent threat report, 0 if none.
    pub last_threat_report: i64,
    /// Monotonic score accumulated from submitted reports, weighted by
    /// threat level.
    pub threat_score: u64,
    /// Number of this node's reports that received a verification stamp.
    pub verified_threats: u64,
    /// Regulatory zone tag the operator registered under.
    pub compliance_zone: String,
}

impl Node {
    /// Applies a signed reputation delta, clamping to `[0, MAX_REPUTATION]`,
    /// and returns the new score.
    pub fn apply_reputation_delta(&mut self, delta: i64) -> u64 {
        let current = self.reputation_score as i64;
        let new = (current.saturating_add(delta)).clamp(0, MAX_REPUTATION as i64) as u64;
        self.reputation_score = new;
        new
    }
}

/// One entry in a node's reputation history trail.
///
/// Appended on every validator-driven reputation update, newest last.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReputationChange {
    pub delta: i64,
    pub new_score: u64,
    pub timestamp: i64,
    pub updated_by: Principal,
}
