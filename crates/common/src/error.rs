//! # Contract Error Types
//!
//! The closed error contract of the membership-and-attestation engine.
//! Every failure a handler can produce maps to exactly one
//! [`ContractError`] variant with a deterministic, operator-facing
//! message. The host receives these messages verbatim.
//!
//! ## Categories
//!
//! | Category | Variants |
//! |----------|----------|
//! | Arguments | `MissingArgument`, `InvalidArgument` |
//! | Lifecycle | `NotActive` |
//! | Authorization | `CapabilityDenied`, `InvalidSignature` |
//! | Replay | `NonceAlreadyUsed` |
//! | Duplicates | `DuplicateThreatReport`, `NodeIdExists`, `NodeAlreadyRegistered`, `AlreadyInTier` |
//! | Lookup | `NodeNotFound`, `ReportNotFound`, `UnknownMethod` |
//! | Policy | `InsufficientStake`, `WithdrawalExceedsStake`, `LockPeriodActive`, `SlashedNodeWithdrawal`, `ConsensusTierFull` |
//! | Storage | `Store` |
//!
//! ## Design
//!
//! `ContractError` is a plain value type: `Clone`, `Debug`, `PartialEq`,
//! `Eq`, hand-written `Display`, `std::error::Error`. No implicit error
//! wrapping; the only nested error is the typed [`StoreError`] from the
//! host-store boundary. Messages contain no debug formatting and no
//! locale-dependent content.

use std::fmt;

use crate::store::StoreError;

/// Every failure the engine can surface to the host.
///
/// One variant per failure condition; the conditions are non-overlapping.
/// Any error aborts the whole invocation, so a surfaced `ContractError`
/// always implies zero state change.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ContractError {
    /// A required argument was absent or empty.
    MissingArgument { name: String },

    /// An argument was present but failed to parse or validate.
    InvalidArgument { name: String, detail: String },

    /// The contract is paused or emergency-stopped and the invoked
    /// operation is not the resume operation.
    NotActive { state: u8 },

    /// The caller does not hold the capability the handler requires.
    CapabilityDenied { role: &'static str, caller: String },

    /// The replay digest for this invocation was already consumed.
    NonceAlreadyUsed,

    /// A report for the same source and type already exists within the
    /// suppression window, or the derived attestation id is taken.
    DuplicateThreatReport,

    /// The requested node id is already mapped to an address.
    NodeIdExists { node_id: String },

    /// The caller already operates a node; one node per principal.
    NodeAlreadyRegistered { address: String },

    /// The address is already a member of the named tier list.
    AlreadyInTier { tier: String, address: String },

    /// No node record exists for the address.
    NodeNotFound { address: String },

    /// No attestation exists for the report id.
    ReportNotFound { report_id: String },

    /// The dispatcher does not recognize the method name.
    UnknownMethod { method: String },

    /// The staked amount is below the tier minimum.
    InsufficientStake { required: u64, provided: u64 },

    /// The withdrawal amount exceeds the currently staked amount.
    WithdrawalExceedsStake { available: u64, requested: u64 },

    /// The stake lock period has not elapsed yet.
    LockPeriodActive,

    /// Slashed nodes forfeit their stake and cannot withdraw.
    SlashedNodeWithdrawal,

    /// The consensus tier already holds the maximum number of nodes.
    ConsensusTierFull { cap: usize },

    /// The submitted signature did not verify for the caller.
    InvalidSignature,

    /// The host store failed or returned undecodable bytes.
    Store(StoreError),
}

impl fmt::Display for ContractError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContractError::MissingArgument { name } => {
                write!(f, "{name} is required")
            }
            ContractError::InvalidArgument { name, detail } => {
                write!(f, "invalid {name}: {detail}")
            }
            ContractError::NotActive { state } => {
                write!(f, "contract is not active, current state: {state}")
            }
            ContractError::CapabilityDenied { role, caller } => {
                write!(f, "only {role} can call this function, caller: {caller}")
            }
            ContractError::NonceAlreadyUsed => write!(f, "nonce already used"),
            ContractError::DuplicateThreatReport => {
                write!(f, "duplicate threat report detected")
            }
            ContractError::NodeIdExists { node_id } => {
                write!(f, "node ID already exists: {node_id}")
            }
            ContractError::NodeAlreadyRegistered { address } => {
                write!(f, "node already registered: {address}")
            }
            ContractError::AlreadyInTier { tier, address } => {
                write!(f, "node already in {tier} list: {address}")
            }
            ContractError::NodeNotFound { address } => {
                write!(f, "node not found: {address}")
            }
            ContractError::ReportNotFound { report_id } => {
                write!(f, "threat report not found: {report_id}")
            }
            ContractError::UnknownMethod { method } => {
                write!(f, "unknown method: {method}")
            }
            ContractError::InsufficientStake { required, provided } => {
                write!(
                    f,
                    "insufficient stake amount, required: {required}, provided: {provided}"
                )
            }
            ContractError::WithdrawalExceedsStake {
                available,
                requested,
            } => {
                write!(
                    f,
                    "insufficient stake amount, available: {available}, requested: {requested}"
                )
            }
            ContractError::LockPeriodActive => write!(f, "lock period not ended"),
            ContractError::SlashedNodeWithdrawal => {
                write!(f, "slashed nodes cannot withdraw")
            }
            ContractError::ConsensusTierFull { cap } => {
                write!(f, "max consensus nodes reached: {cap}")
            }
            ContractError::InvalidSignature => write!(f, "invalid signature"),
            ContractError::Store(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for ContractError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ContractError::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StoreError> for ContractError {
    fn from(err: StoreError) -> Self {
        ContractError::Store(err)
    }
}
