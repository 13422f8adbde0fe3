//! Economic parameter configuration using TOML and serde.
//! Defaults are the protocol constants; a deployment may override any
//! subset from a TOML file.

use serde::Deserialize;
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::node::NodeTier;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Economic and policy parameters of the engine.
///
/// Every field has a protocol default; overriding them is a deployment
/// decision, not something handlers may do at runtime.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct EngineConfig {
    /// Minimum stake for the consensus (root) tier.
    pub min_stake_consensus: u64,

    /// Minimum stake for the partition tier.
    pub min_stake_partition: u64,

    /// Minimum stake for the edge tier.
    pub min_stake_edge: u64,

    /// Seconds a stake is locked after first admission.
    pub stake_lock_period_secs: i64,

    /// Hard cap on consensus tier membership.
    pub max_consensus_nodes: usize,

    /// Slash penalty as a percentage of the staked amount.
    pub slash_rate_percent: u64,

    /// Verification stamps required before an attestation is verified.
    pub min_verification_count: u64,

    /// Width of the duplicate-report suppression window, in seconds.
    pub duplicate_window_secs: i64,

    /// Reputation credited to the reporter per verification stamp.
    pub verification_reputation_bonus: u64,

    /// Reputation floor below which a consensus node is demoted.
    pub consensus_demotion_threshold: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            min_stake_consensus: 10_000,
            min_stake_partition: 5_000,
            min_stake_edge: 100,
            stake_lock_period_secs: 7 * 24 * 60 * 60,
            max_consensus_nodes: 21,
            slash_rate_percent: 100,
            min_verification_count: 3,
            duplicate_window_secs: 300,
            verification_reputation_bonus: 5,
            consensus_demotion_threshold: 80,
        }
    }
}

impl EngineConfig {
    /// Minimum stake required to join the given tier.
    pub fn min_stake_for(&self, tier: NodeTier) -> u64 {
        match tier {
            NodeTier::Consensus => self.min_stake_consensus,
            NodeTier::Partition => self.min_stake_partition,
            NodeTier::Edge => self.min_stake_edge,
        }
    }
}

/// Load config from a TOML file path.
/// Fields absent from the file keep their protocol defaults.
pub fn load_from_file(path: impl AsRef<Path>) -> Result<EngineConfig, ConfigError> {
    let s = fs::read_to_string(path.as_ref())?;
    let cfg: EngineConfig = toml::from_str(&s)?;
    Ok(cfg)
}
