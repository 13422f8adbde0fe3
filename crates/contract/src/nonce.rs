//! # Replay Protection
//!
//! Caller-signed operations carry a client nonce. The register digests
//! (caller, operation tag, invocation timestamp, nonce) and refuses any
//! digest it has seen before. Uniqueness is all that matters here; the
//! digest only has to be collision resistant, not secret.
//!
//! The consumed set grows monotonically and is never evicted.

use sentra_common::crypto::sha3_256_hex;
use sentra_common::error::ContractError;
use sentra_common::types::Principal;

use crate::session::InvocationCtx;

/// Hex digest identifying one signed request.
pub fn replay_digest(caller: &Principal, op: &str, timestamp: i64, nonce: u64) -> String {
    sha3_256_hex(format!("{caller}|{op}|{timestamp}|{nonce}").as_bytes())
}

/// Rejects a replayed request, otherwise consumes its digest.
pub fn consume_nonce(
    ctx: &mut InvocationCtx<'_>,
    op: &str,
    nonce: u64,
) -> Result<(), ContractError> {
    let digest = replay_digest(&ctx.caller, op, ctx.timestamp, nonce);
    if ctx.is_nonce_used(&digest)? {
        return Err(ContractError::NonceAlreadyUsed);
    }
    ctx.mark_nonce_used(&digest);
    Ok(())
}
