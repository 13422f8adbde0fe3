//! # Sentra Contract Core
//!
//! State machine of the membership-and-attestation engine: edge sensors
//! stake economic value to join one of three tiers, submit signed threat
//! attestations against remote peers, validators cross-verify them, and
//! governance can slash misbehaving nodes. Authoritative state lives
//! behind the host key-value store, so every mutation is ordered,
//! auditable, and replayable.
//!
//! ## Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | `keys` | keyspace constants and key builders |
//! | `args` | opaque-bytes argument map and typed extraction |
//! | `session` | per-invocation staging over the host store |
//! | `caps` | capability gate (owner/governance/validator/active-node) |
//! | `nonce` | replay-protection digest register |
//! | `registry` | tier lists, node info, statistics, challenges |
//! | `staking` | admission, withdrawal, slashing |
//! | `reputation` | bounded reputation updates and demotion |
//! | `threat` | attestation ingestion, verification, global index |
//! | `governance` | pause/resume, validator registration |
//! | `events` | typed event constructors with stable field order |
//! | `engine` | dispatcher and the `init`/`invoke` entry points |
//!
//! ## Execution Model
//!
//! The host serializes invocations into a totally ordered log and gives
//! each one a flat transaction over the store. Handlers run synchronously
//! with no suspension points; an error anywhere aborts the invocation
//! with zero state change and zero emitted events.

pub mod args;
pub mod caps;
pub mod engine;
pub mod events;
pub mod governance;
pub mod keys;
pub mod nonce;
pub mod registry;
pub mod reputation;
pub mod session;
pub mod staking;
pub mod threat;

pub use args::ArgMap;
pub use engine::{Engine, Invocation, InvokeOutcome};
pub use session::InvocationCtx;
