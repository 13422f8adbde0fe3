//! # Reputation Engine
//!
//! Validators adjust node reputation by bounded additive deltas. The
//! score is clamped to `[0, 1000]`; dropping below the demotion
//! threshold costs a consensus node both its flag and its list seat, so
//! the membership invariant holds from either direction. Every update
//! leaves an entry in the node's history trail.
//!
//! Scores above the high-water mark carry no automatic effect; that
//! headroom is reserved for future privilege promotion.

use serde::Serialize;

use sentra_common::error::ContractError;
use sentra_common::node::{NodeTier, ReputationChange};
use sentra_common::types::Principal;

use crate::args::{required_i64, required_str};
use crate::events;
use crate::registry::{encode_payload, remove_from_tier};
use crate::session::InvocationCtx;

#[derive(Debug, Serialize)]
pub struct ReputationPayload {
    pub node_address: String,
    pub delta: i64,
    pub new_score: u64,
}

pub fn update_reputation(ctx: &mut InvocationCtx<'_>) -> Result<Vec<u8>, ContractError> {
    let address = Principal::from(required_str(ctx.args, "node_address")?);
    let delta = required_i64(ctx.args, "reputation_delta")?;

    let mut node = ctx.require_node(&address)?;
    let new_score = node.apply_reputation_delta(delta);

    if new_score < ctx.config.consensus_demotion_threshold && node.is_consensus_node {
        node.is_consensus_node = false;
        remove_from_tier(ctx, NodeTier::Consensus, &address)?;
    }

    ctx.save_node(&node)?;

    let change = ReputationChange {
        delta,
        new_score,
        timestamp: ctx.timestamp,
        updated_by: ctx.caller.clone(),
    };
    ctx.append_reputation_change(&address, change)?;

    let timestamp = ctx.timestamp;
    ctx.emit(events::reputation_updated(&address, delta, new_score, timestamp));

    encode_payload(&ReputationPayload {
        node_address: address.to_string(),
        delta,
        new_score,
    })
}
