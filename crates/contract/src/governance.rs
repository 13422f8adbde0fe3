//! # Governance Controls
//!
//! Contract-state transitions and validator registration. Pausing stops
//! every mutating operation except the resume path; resuming is the one
//! operation legal while paused. Validator removal is deliberately not
//! exposed.

use serde::Serialize;

use sentra_common::error::ContractError;
use sentra_common::types::ContractState;

use crate::events;
use crate::registry::{encode_payload, well_formed_address};
use crate::session::InvocationCtx;

#[derive(Debug, Serialize)]
pub struct StatePayload {
    pub state: u8,
}

pub fn pause_contract(ctx: &mut InvocationCtx<'_>) -> Result<Vec<u8>, ContractError> {
    ctx.set_contract_state(ContractState::Paused);
    let timestamp = ctx.timestamp;
    ctx.emit(events::contract_paused(timestamp));
    encode_payload(&StatePayload {
        state: ContractState::Paused.as_u8(),
    })
}

pub fn resume_contract(ctx: &mut InvocationCtx<'_>) -> Result<Vec<u8>, ContractError> {
    ctx.set_contract_state(ContractState::Active);
    let timestamp = ctx.timestamp;
    ctx.emit(events::contract_resumed(timestamp));
    encode_payload(&StatePayload {
        state: ContractState::Active.as_u8(),
    })
}

#[derive(Debug, Serialize)]
pub struct ValidatorPayload {
    pub validator_address: String,
}

pub fn add_validator(ctx: &mut InvocationCtx<'_>) -> Result<Vec<u8>, ContractError> {
    let validator = well_formed_address(ctx.args, "validator_address")?;

    ctx.add_validator(&validator);

    let timestamp = ctx.timestamp;
    ctx.emit(events::validator_added(&validator, timestamp));

    encode_payload(&ValidatorPayload {
        validator_address: validator.to_string(),
    })
}
