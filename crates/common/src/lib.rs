//! # Sentra Common Crate
//!
//! Shared value types and host-facing contracts for the Sentra
//! membership-and-attestation engine.
//!
//! ## Modules
//! - `types`: `Principal` identity and the contract lifecycle state
//! - `node`: node records, lifecycle status, membership tiers
//! - `threat`: threat levels, attestation records, the global threat index
//! - `error`: the closed `ContractError` contract surfaced to the host
//! - `store`: `HostStore` and `EventSink` collaborator traits
//! - `crypto`: SHA3 digests, `SignatureVerifier`, Ed25519 implementation
//! - `config`: economic parameters with TOML overrides
//! - `mock_host`: in-memory host implementations for testing
//!
//! ## Host Architecture
//! ```text
//! ┌───────────────┐   ┌───────────────┐   ┌───────────────────┐
//! │   HostStore   │   │   EventSink   │   │ SignatureVerifier │
//! └──────┬────────┘   └──────┬────────┘   └────────┬──────────┘
//!        │                   │                     │
//! ┌──────▼────────┐   ┌──────▼────────┐   ┌────────▼──────────┐
//! │  MemoryStore  │   │ CollectingSink│   │  Ed25519Verifier  │
//! └───────────────┘   └───────────────┘   └───────────────────┘
//! ```
//!
//! The engine in `sentra-contract` consumes the traits; hosts and tests
//! pick the implementations.

pub mod config;
pub mod crypto;
pub mod error;
pub mod mock_host;
pub mod node;
pub mod store;
pub mod threat;
pub mod types;

pub use config::EngineConfig;
pub use crypto::{Ed25519Verifier, SignatureVerifier};
pub use error::ContractError;
pub use mock_host::{AllowAllVerifier, CollectingSink, MemoryStore, RejectAllVerifier};
pub use node::{DeploymentType, Node, NodeStatus, NodeTier, ReputationChange};
pub use store::{Event, EventSink, HostStore, StoreError};
pub use threat::{GlobalThreatEntry, ThreatAttestation, ThreatLevel, VerificationStamp};
pub use types::{ContractState, Principal};
