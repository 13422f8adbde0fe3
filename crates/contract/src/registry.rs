//! # Node Registry
//!
//! Tier-list membership operations plus the read handlers over node
//! state and the challenge submission path.
//!
//! ## Invariant Preservation
//!
//! Every mutating function here preserves the membership invariants:
//!
//! 1. A node address appears in at most one tier list.
//! 2. No tier list contains duplicates.
//! 3. The consensus list never exceeds its cap.
//!
//! All validations run before any mutation; the staging layer in
//! [`crate::session`] additionally guarantees that a failure after a
//! partial mutation discards everything.

use serde::Serialize;

use sentra_common::error::ContractError;
use sentra_common::node::{Node, NodeStatus, NodeTier};
use sentra_common::types::Principal;

use crate::args::{required_str, ArgMap};
use crate::events;
use crate::session::InvocationCtx;

// ════════════════════════════════════════════════════════════════════════════
// TIER LIST OPERATIONS
// ════════════════════════════════════════════════════════════════════════════

/// Inserts an address into a tier list, preserving insertion order.
///
/// The consensus tier enforces its membership cap; every tier rejects a
/// duplicate insert.
pub fn add_to_tier(
    ctx: &mut InvocationCtx<'_>,
    tier: NodeTier,
    address: &Principal,
) -> Result<(), ContractError> {
    let mut list = ctx.tier_list(tier)?;

    if tier == NodeTier::Consensus && list.len() >= ctx.config.max_consensus_nodes {
        return Err(ContractError::ConsensusTierFull {
            cap: ctx.config.max_consensus_nodes,
        });
    }
    if list.contains(address) {
        return Err(ContractError::AlreadyInTier {
            tier: tier.to_string(),
            address: address.to_string(),
        });
    }

    list.push(address.clone());
    ctx.save_tier_list(tier, &list)
}

/// Removes an address from a tier list. Removing an absent address is a
/// no-op; callers decide whether absence is an error.
pub fn remove_from_tier(
    ctx: &mut InvocationCtx<'_>,
    tier: NodeTier,
    address: &Principal,
) -> Result<(), ContractError> {
    let mut list = ctx.tier_list(tier)?;
    let before = list.len();
    list.retain(|member| member != address);
    if list.len() != before {
        ctx.save_tier_list(tier, &list)?;
    }
    Ok(())
}

// ════════════════════════════════════════════════════════════════════════════
// READ HANDLERS
// ════════════════════════════════════════════════════════════════════════════

/// Payload of the node-info query. Lookup failures are reported inline
/// instead of aborting, so clients can render them.
#[derive(Debug, Serialize)]
pub struct NodeInfoPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node: Option<Node>,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub fn get_node_info(ctx: &InvocationCtx<'_>) -> Result<Vec<u8>, ContractError> {
    let address = Principal::from(required_str(ctx.args, "node_address")?);

    let payload = match ctx.node(&address)? {
        Some(node) => NodeInfoPayload {
            node: Some(node),
            success: true,
            error: None,
        },
        None => NodeInfoPayload {
            node: None,
            success: false,
            error: Some(
                ContractError::NodeNotFound {
                    address: address.to_string(),
                }
                .to_string(),
            ),
        },
    };
    encode_payload(&payload)
}

/// Aggregate statistics over the three tier lists.
///
/// The per-tier totals count list membership regardless of status, while
/// `active_nodes` and `total_staked` restrict to `Active` records. The
/// split is deliberate: it lets callers observe churn between admission
/// and activation.
#[derive(Debug, Default, Serialize)]
pub struct ContractStats {
    pub total_staked: u64,
    pub active_nodes: u64,
    pub total_consensus_nodes: u64,
    pub total_partition_nodes: u64,
    pub total_edge_nodes: u64,
}

pub fn get_contract_stats(ctx: &InvocationCtx<'_>) -> Result<Vec<u8>, ContractError> {
    let consensus = ctx.tier_list(NodeTier::Consensus)?;
    let partition = ctx.tier_list(NodeTier::Partition)?;
    let edge = ctx.tier_list(NodeTier::Edge)?;

    let mut stats = ContractStats {
        total_consensus_nodes: consensus.len() as u64,
        total_partition_nodes: partition.len() as u64,
        total_edge_nodes: edge.len() as u64,
        ..ContractStats::default()
    };

    for address in consensus.iter().chain(partition.iter()).chain(edge.iter()) {
        if let Some(node) = ctx.node(address)? {
            if node.status == NodeStatus::Active {
                stats.total_staked += node.stake_amount;
                stats.active_nodes += 1;
            }
        }
    }

    encode_payload(&stats)
}

// ════════════════════════════════════════════════════════════════════════════
// CHALLENGES
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Serialize)]
pub struct ChallengePayload {
    pub challenge_id: String,
    pub challenger: String,
}

/// Records an integrity challenge against a cached entry. The caller
/// must be an active node (enforced by the capability gate); the
/// challenge itself lives in the event log, but the caller's challenge
/// counter is part of its record.
pub fn submit_challenge(ctx: &mut InvocationCtx<'_>) -> Result<Vec<u8>, ContractError> {
    let cache_key = required_str(ctx.args, "cache_key")?.to_string();
    let reason = required_str(ctx.args, "reason")?.to_string();

    let challenge_id = format!("challenge_{}_{}", cache_key, ctx.timestamp);

    let caller = ctx.caller.clone();
    let mut node = ctx.require_node(&caller)?;
    node.challenge_count += 1;
    node.last_seen = ctx.timestamp;
    ctx.save_node(&node)?;

    let timestamp = ctx.timestamp;
    ctx.emit(events::node_challenged(
        &challenge_id,
        &cache_key,
        &caller,
        &reason,
        timestamp,
    ));

    encode_payload(&ChallengePayload {
        challenge_id,
        challenger: caller.to_string(),
    })
}

pub(crate) fn encode_payload<T: Serialize>(payload: &T) -> Result<Vec<u8>, ContractError> {
    serde_json::to_vec(payload).map_err(|e| {
        ContractError::Store(sentra_common::store::StoreError::Encode {
            entity: "payload",
            detail: e.to_string(),
        })
    })
}

/// Shared argument helper: an address argument must look like a
/// principal before it is used as one.
pub(crate) fn well_formed_address(args: &ArgMap, name: &str) -> Result<Principal, ContractError> {
    let raw = required_str(args, name)?;
    let principal = Principal::from(raw);
    if !principal.is_well_formed() {
        return Err(ContractError::InvalidArgument {
            name: name.to_string(),
            detail: format!(
                "address must be at least {} characters",
                sentra_common::types::MIN_PRINCIPAL_LEN
            ),
        });
    }
    Ok(principal)
}
