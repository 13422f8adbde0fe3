//! # Event Schema
//!
//! Typed constructors for every event the contract emits. Field order is
//! normative: downstream consumers match positionally, so the vectors
//! built here never reorder. Numeric fields are rendered in decimal;
//! signed deltas keep their sign.

use sentra_common::store::Event;
use sentra_common::types::Principal;

pub const NODE_STAKED: &str = "NodeStaked";
pub const WITHDRAWAL_REQUESTED: &str = "WithdrawalRequested";
pub const NODE_SLASHED: &str = "NodeSlashed";
pub const NODE_CHALLENGED: &str = "NodeChallenged";
pub const REPUTATION_UPDATED: &str = "ReputationUpdated";
pub const VALIDATOR_ADDED: &str = "ValidatorAdded";
pub const CONTRACT_PAUSED: &str = "ContractPaused";
pub const CONTRACT_RESUMED: &str = "ContractResumed";
pub const THREAT_REPORTED: &str = "ThreatReported";
pub const THREAT_VERIFIED: &str = "ThreatVerified";

pub fn node_staked(node_id: &str, staker: &Principal, amount: u64, timestamp: i64) -> Event {
    Event::new(
        NODE_STAKED,
        vec![
            node_id.to_string(),
            staker.to_string(),
            amount.to_string(),
            timestamp.to_string(),
        ],
    )
}

pub fn withdrawal_requested(requester: &Principal, amount: u64, timestamp: i64) -> Event {
    Event::new(
        WITHDRAWAL_REQUESTED,
        vec![
            requester.to_string(),
            amount.to_string(),
            timestamp.to_string(),
        ],
    )
}

pub fn node_slashed(address: &Principal, penalty: u64, reason: &str, timestamp: i64) -> Event {
    Event::new(
        NODE_SLASHED,
        vec![
            address.to_string(),
            penalty.to_string(),
            reason.to_string(),
            timestamp.to_string(),
        ],
    )
}

pub fn node_challenged(
    challenge_id: &str,
    cache_key: &str,
    challenger: &Principal,
    reason: &str,
    timestamp: i64,
) -> Event {
    Event::new(
        NODE_CHALLENGED,
        vec![
            challenge_id.to_string(),
            cache_key.to_string(),
            challenger.to_string(),
            reason.to_string(),
            timestamp.to_string(),
        ],
    )
}

pub fn reputation_updated(
    address: &Principal,
    delta: i64,
    new_score: u64,
    timestamp: i64,
) -> Event {
    Event::new(
        REPUTATION_UPDATED,
        vec![
            address.to_string(),
            delta.to_string(),
            new_score.to_string(),
            timestamp.to_string(),
        ],
    )
}

pub fn validator_added(validator: &Principal, timestamp: i64) -> Event {
    Event::new(
        VALIDATOR_ADDED,
        vec![validator.to_string(), timestamp.to_string()],
    )
}

pub fn contract_paused(timestamp: i64) -> Event {
    Event::new(CONTRACT_PAUSED, vec![timestamp.to_string()])
}

pub fn contract_resumed(timestamp: i64) -> Event {
    Event::new(CONTRACT_RESUMED, vec![timestamp.to_string()])
}

pub fn threat_reported(
    report_id: &str,
    source_ip: &str,
    target_ip: &str,
    threat_type: &str,
    timestamp: i64,
) -> Event {
    Event::new(
        THREAT_REPORTED,
        vec![
            report_id.to_string(),
            source_ip.to_string(),
            target_ip.to_string(),
            threat_type.to_string(),
            timestamp.to_string(),
        ],
    )
}

pub fn threat_verified(report_id: &str, verifier: &Principal, verdict: bool, timestamp: i64) -> Event {
    Event::new(
        THREAT_VERIFIED,
        vec![
            report_id.to_string(),
            verifier.to_string(),
            verdict.to_string(),
            timestamp.to_string(),
        ],
    )
}
