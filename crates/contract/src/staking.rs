//! # Staking Lifecycle
//!
//! Admission, withdrawal, and slashing. The lifecycle is
//! register → active → slashed → (no withdrawal); withdrawal is possible
//! from any non-slashed state once the lock period has elapsed.
//!
//! ## Admission Order
//!
//! `stake_node` validates strictly before it creates anything:
//! replay check, signature, tier minimum, node-id uniqueness,
//! one-node-per-principal, filing hashes. Only then is the record
//! written and the tier membership taken, where the consensus cap can
//! still reject. The staging layer turns any late rejection into a full
//! rollback.

use serde::Serialize;

use sentra_common::error::ContractError;
use sentra_common::node::{Node, NodeStatus, NodeTier, INITIAL_REPUTATION};
use sentra_common::types::Principal;

use crate::args::{optional_str, required_bytes, required_str, required_u64, required_u8};
use crate::events;
use crate::nonce;
use crate::registry::{add_to_tier, encode_payload, remove_from_tier};
use crate::session::InvocationCtx;

/// Minimum length of the business-license and filing-number hashes.
const MIN_FILING_HASH_LEN: usize = 10;

#[derive(Debug, Serialize)]
pub struct StakePayload {
    pub node_id: String,
    pub node_address: String,
    pub stake_amount: u64,
    pub tier: String,
}

/// Admits a new node. All-or-nothing: any failed step leaves no trace.
pub fn stake_node(ctx: &mut InvocationCtx<'_>) -> Result<Vec<u8>, ContractError> {
    let node_id = required_str(ctx.args, "node_id")?.to_string();
    let amount = required_u64(ctx.args, "amount")?;
    let signature = required_bytes(ctx.args, "sm2_signature")?.to_vec();
    let data_hash = required_bytes(ctx.args, "data_hash")?.to_vec();
    let nonce_value = required_u64(ctx.args, "nonce")?;
    let business_license = required_str(ctx.args, "business_license_hash")?.to_string();
    let filing_number = required_str(ctx.args, "filing_number_hash")?.to_string();
    let node_type = required_u8(ctx.args, "node_type")?;
    let agent_version = optional_str(ctx.args, "agent_version")?.unwrap_or("").to_string();
    let compliance_zone = optional_str(ctx.args, "compliance_zone")?.unwrap_or("").to_string();

    nonce::consume_nonce(ctx, "stakeNode", nonce_value)?;
    ctx.verify_signature(&data_hash, &signature)?;

    let tier = NodeTier::from_node_type(node_type);
    let min_stake = ctx.config.min_stake_for(tier);
    if amount < min_stake {
        return Err(ContractError::InsufficientStake {
            required: min_stake,
            provided: amount,
        });
    }

    if ctx.node_address_for_id(&node_id)?.is_some() {
        return Err(ContractError::NodeIdExists { node_id });
    }

    let caller = ctx.caller.clone();
    if ctx.node(&caller)?.is_some() {
        return Err(ContractError::NodeAlreadyRegistered {
            address: caller.to_string(),
        });
    }

    validate_filing_hash("business_license_hash", &business_license)?;
    validate_filing_hash("filing_number_hash", &filing_number)?;

    let node = Node {
        node_address: caller.clone(),
        stake_amount: amount,
        stake_start: ctx.timestamp,
        reputation_score: INITIAL_REPUTATION,
        status: NodeStatus::Registered,
        node_id: node_id.clone(),
        business_license,
        filing_number,
        challenge_count: 0,
        challenges_won: 0,
        challenges_lost: 0,
        last_seen: ctx.timestamp,
        is_consensus_node: tier == NodeTier::Consensus,
        is_threat_sensor: false,
        agent_version,
        deployment_type: tier.deployment_type(),
        last_threat_report: 0,
        threat_score: 0,
        verified_threats: 0,
        compliance_zone,
    };

    ctx.save_node(&node)?;
    add_to_tier(ctx, tier, &caller)?;

    let timestamp = ctx.timestamp;
    ctx.emit(events::node_staked(&node_id, &caller, amount, timestamp));

    encode_payload(&StakePayload {
        node_id,
        node_address: caller.to_string(),
        stake_amount: amount,
        tier: tier.to_string(),
    })
}

fn validate_filing_hash(name: &str, value: &str) -> Result<(), ContractError> {
    if value.len() < MIN_FILING_HASH_LEN {
        return Err(ContractError::InvalidArgument {
            name: name.to_string(),
            detail: format!("hash must be at least {MIN_FILING_HASH_LEN} characters"),
        });
    }
    Ok(())
}

#[derive(Debug, Serialize)]
pub struct WithdrawalPayload {
    pub node_address: String,
    pub amount: u64,
    pub pending_total: u64,
}

/// Books a withdrawal against the caller's stake.
///
/// The pending ledger is advisory: it records the cumulative amount the
/// host environment owes the operator; settlement happens outside the
/// contract. It only ever grows.
pub fn request_withdrawal(ctx: &mut InvocationCtx<'_>) -> Result<Vec<u8>, ContractError> {
    let amount = required_u64(ctx.args, "amount")?;

    let caller = ctx.caller.clone();
    let mut node = ctx.require_node(&caller)?;

    if node.status == NodeStatus::Slashed {
        return Err(ContractError::SlashedNodeWithdrawal);
    }
    if ctx.timestamp < node.stake_start + ctx.config.stake_lock_period_secs {
        return Err(ContractError::LockPeriodActive);
    }
    if amount > node.stake_amount {
        return Err(ContractError::WithdrawalExceedsStake {
            available: node.stake_amount,
            requested: amount,
        });
    }

    node.stake_amount -= amount;
    ctx.save_node(&node)?;

    let pending_total = ctx.pending_withdrawal(&caller)?.saturating_add(amount);
    ctx.set_pending_withdrawal(&caller, pending_total);

    let timestamp = ctx.timestamp;
    ctx.emit(events::withdrawal_requested(&caller, amount, timestamp));

    encode_payload(&WithdrawalPayload {
        node_address: caller.to_string(),
        amount,
        pending_total,
    })
}

#[derive(Debug, Serialize)]
pub struct SlashPayload {
    pub node_address: String,
    pub penalty: u64,
    pub remaining_stake: u64,
}

/// Forfeits a node's stake and evicts it from the consensus tier.
///
/// The penalty is `stake × slash-rate / 100`; at the default full rate
/// the stake drops to zero. Slashed is terminal for withdrawal purposes.
pub fn slash_node(ctx: &mut InvocationCtx<'_>) -> Result<Vec<u8>, ContractError> {
    let address = Principal::from(required_str(ctx.args, "node_address")?);
    let reason = required_str(ctx.args, "reason")?.to_string();

    let mut node = ctx.require_node(&address)?;

    let penalty =
        ((u128::from(node.stake_amount) * u128::from(ctx.config.slash_rate_percent) / 100) as u64)
            .min(node.stake_amount);
    node.stake_amount -= penalty;
    node.status = NodeStatus::Slashed;

    if node.is_consensus_node {
        node.is_consensus_node = false;
        remove_from_tier(ctx, NodeTier::Consensus, &address)?;
    }

    ctx.save_node(&node)?;

    let timestamp = ctx.timestamp;
    ctx.emit(events::node_slashed(&address, penalty, &reason, timestamp));

    encode_payload(&SlashPayload {
        node_address: address.to_string(),
        penalty,
        remaining_stake: node.stake_amount,
    })
}
