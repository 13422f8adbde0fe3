//! # Capability Gate
//!
//! Every handler declares the role its caller must hold. The gate
//! resolves the caller against stored state and rejects with a
//! deterministic message before the handler body runs.
//!
//! | Capability | Resolution |
//! |------------|------------|
//! | `Owner` | caller equals the owner singleton |
//! | `Governance` | caller equals the governance singleton |
//! | `Validator` | caller holds an authorized-validator entry |
//! | `ActiveNode` | caller's node record exists with `Active` status |
//! | `Public` | no check |
//!
//! A failed gate changes no state; the invocation aborts before any
//! handler write.

use sentra_common::error::ContractError;
use sentra_common::node::NodeStatus;

use crate::session::InvocationCtx;

/// Role a handler requires of its caller.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Capability {
    Owner,
    Governance,
    Validator,
    ActiveNode,
    Public,
}

/// Checks the caller against the required capability.
pub fn ensure_capability(ctx: &InvocationCtx<'_>, cap: Capability) -> Result<(), ContractError> {
    match cap {
        Capability::Public => Ok(()),
        Capability::Owner => {
            if ctx.owner()? == ctx.caller {
                Ok(())
            } else {
                Err(denied("owner", ctx))
            }
        }
        Capability::Governance => {
            if ctx.governance()? == ctx.caller {
                Ok(())
            } else {
                Err(denied("governance", ctx))
            }
        }
        Capability::Validator => {
            if ctx.is_validator(&ctx.caller)? {
                Ok(())
            } else {
                Err(denied("authorized validators", ctx))
            }
        }
        Capability::ActiveNode => {
            let node = ctx.require_node(&ctx.caller)?;
            if node.status == NodeStatus::Active {
                Ok(())
            } else {
                Err(denied("active nodes", ctx))
            }
        }
    }
}

fn denied(role: &'static str, ctx: &InvocationCtx<'_>) -> ContractError {
    ContractError::CapabilityDenied {
        role,
        caller: ctx.caller.to_string(),
    }
}
