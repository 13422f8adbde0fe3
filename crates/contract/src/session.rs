//! # Invocation Session
//!
//! One [`InvocationCtx`] lives for exactly one invocation. It carries the
//! caller principal, the host-supplied timestamp, the argument map, and a
//! staged view of the store; handlers read and write through it and emit
//! events into its buffer.
//!
//! ## Transaction Discipline
//!
//! All writes go into an in-memory overlay on top of the host store.
//! Reads see the overlay first, so a handler observes its own writes.
//! Nothing touches the host until [`InvocationCtx::commit`] runs; dropping
//! the context discards every write and every buffered event. This is
//! what makes partial effects impossible: an error anywhere aborts the
//! whole invocation with zero state change, and the duplicate-suppression
//! markers, nonce register, and tier lists stay consistent with the
//! records they guard.
//!
//! The overlay never outlives the invocation. Durable state is only what
//! the host store holds; no cache survives between invocations.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::Serialize;

use sentra_common::config::EngineConfig;
use sentra_common::crypto::SignatureVerifier;
use sentra_common::error::ContractError;
use sentra_common::node::{Node, NodeTier, ReputationChange};
use sentra_common::store::{Event, HostStore, StoreError};
use sentra_common::threat::{GlobalThreatEntry, ThreatAttestation, VerificationStamp};
use sentra_common::types::{ContractState, Principal};

use crate::args::ArgMap;
use crate::keys;

// ════════════════════════════════════════════════════════════════════════════
// STAGED STORE OVERLAY
// ════════════════════════════════════════════════════════════════════════════

/// Write buffer layered over the host store for one invocation.
///
/// The engine never deletes keys (history is preserved by design), so the
/// overlay only needs to stage upserts.
struct Staged<'a> {
    base: &'a mut dyn HostStore,
    writes: BTreeMap<Vec<u8>, Vec<u8>>,
}

impl<'a> Staged<'a> {
    fn new(base: &'a mut dyn HostStore) -> Self {
        Staged {
            base,
            writes: BTreeMap::new(),
        }
    }

    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        if let Some(value) = self.writes.get(key) {
            return Ok(Some(value.clone()));
        }
        self.base.get(key)
    }

    fn put(&mut self, key: Vec<u8>, value: Vec<u8>) {
        self.writes.insert(key, value);
    }

    /// Applies every staged write to the host store, in key order.
    fn flush(self) -> Result<(), StoreError> {
        for (key, value) in self.writes {
            self.base.put(&key, &value)?;
        }
        Ok(())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// INVOCATION CONTEXT
// ════════════════════════════════════════════════════════════════════════════

/// Everything a handler needs for one invocation.
pub struct InvocationCtx<'a> {
    pub caller: Principal,
    pub timestamp: i64,
    pub args: &'a ArgMap,
    pub config: &'a EngineConfig,
    verifier: &'a dyn SignatureVerifier,
    store: Staged<'a>,
    events: Vec<Event>,
}

impl<'a> InvocationCtx<'a> {
    pub fn new(
        caller: Principal,
        timestamp: i64,
        args: &'a ArgMap,
        config: &'a EngineConfig,
        verifier: &'a dyn SignatureVerifier,
        store: &'a mut dyn HostStore,
    ) -> Self {
        InvocationCtx {
            caller,
            timestamp,
            args,
            config,
            verifier,
            store: Staged::new(store),
            events: Vec::new(),
        }
    }

    /// Buffers an event; it reaches the host sink only if the invocation
    /// commits.
    pub fn emit(&mut self, event: Event) {
        self.events.push(event);
    }

    /// Delegates to the external verification primitive. Both a negative
    /// verdict and an uninterpretable blob surface as an invalid
    /// signature.
    pub fn verify_signature(&self, digest: &[u8], signature: &[u8]) -> Result<(), ContractError> {
        match self.verifier.verify(&self.caller, digest, signature) {
            Ok(true) => Ok(()),
            Ok(false) | Err(_) => Err(ContractError::InvalidSignature),
        }
    }

    /// Flushes staged writes to the host store and hands back the
    /// buffered events for the host sink.
    pub fn commit(self) -> Result<Vec<Event>, ContractError> {
        self.store.flush()?;
        Ok(self.events)
    }

    // ── raw access ──────────────────────────────────────────────────────

    pub fn get_raw(&self, key: &[u8]) -> Result<Option<Vec<u8>>, ContractError> {
        Ok(self.store.get(key)?)
    }

    pub fn put_raw(&mut self, key: Vec<u8>, value: Vec<u8>) {
        self.store.put(key, value);
    }

    pub fn has_key(&self, key: &[u8]) -> Result<bool, ContractError> {
        Ok(self.store.get(key)?.is_some())
    }

    fn get_json<T: DeserializeOwned>(
        &self,
        key: &[u8],
        entity: &'static str,
    ) -> Result<Option<T>, ContractError> {
        match self.store.get(key)? {
            None => Ok(None),
            Some(bytes) => serde_json::from_slice(&bytes).map(Some).map_err(|e| {
                ContractError::Store(StoreError::Decode {
                    entity,
                    detail: e.to_string(),
                })
            }),
        }
    }

    fn put_json<T: Serialize>(
        &mut self,
        key: Vec<u8>,
        entity: &'static str,
        value: &T,
    ) -> Result<(), ContractError> {
        let bytes = serde_json::to_vec(value).map_err(|e| {
            ContractError::Store(StoreError::Encode {
                entity,
                detail: e.to_string(),
            })
        })?;
        self.store.put(key, bytes);
        Ok(())
    }

    // ── node records & id index ─────────────────────────────────────────

    pub fn node(&self, address: &Principal) -> Result<Option<Node>, ContractError> {
        self.get_json(&keys::node_key(address), "node")
    }

    pub fn require_node(&self, address: &Principal) -> Result<Node, ContractError> {
        self.node(address)?.ok_or_else(|| ContractError::NodeNotFound {
            address: address.to_string(),
        })
    }

    /// Persists a node record and its node-id index entry together, so
    /// the bidirectional index can never dangle.
    pub fn save_node(&mut self, node: &Node) -> Result<(), ContractError> {
        self.put_json(keys::node_key(&node.node_address), "node", node)?;
        self.store.put(
            keys::node_id_index_key(&node.node_id),
            node.node_address.to_string().into_bytes(),
        );
        Ok(())
    }

    pub fn node_address_for_id(&self, node_id: &str) -> Result<Option<Principal>, ContractError> {
        match self.store.get(&keys::node_id_index_key(node_id))? {
            None => Ok(None),
            Some(bytes) => {
                let s = String::from_utf8(bytes).map_err(|e| {
                    ContractError::Store(StoreError::Decode {
                        entity: "node id mapping",
                        detail: e.to_string(),
                    })
                })?;
                Ok(Some(Principal::new(s)))
            }
        }
    }

    // ── tier lists ──────────────────────────────────────────────────────

    pub fn tier_list(&self, tier: NodeTier) -> Result<Vec<Principal>, ContractError> {
        Ok(self
            .get_json(keys::tier_list_key(tier), tier_entity(tier))?
            .unwrap_or_default())
    }

    pub fn save_tier_list(
        &mut self,
        tier: NodeTier,
        list: &[Principal],
    ) -> Result<(), ContractError> {
        self.put_json(keys::tier_list_key(tier).to_vec(), tier_entity(tier), &list)
    }

    // ── singletons ──────────────────────────────────────────────────────

    pub fn contract_state(&self) -> Result<ContractState, ContractError> {
        let bytes = self
            .store
            .get(keys::CONTRACT_STATE_KEY.as_bytes())?
            .ok_or_else(|| StoreError::backend("get contract state", "value not found"))?;
        ContractState::decode(&bytes).ok_or_else(|| {
            ContractError::Store(StoreError::Decode {
                entity: "contract state",
                detail: format!("unrecognized value {:?}", String::from_utf8_lossy(&bytes)),
            })
        })
    }

    pub fn set_contract_state(&mut self, state: ContractState) {
        self.store
            .put(keys::CONTRACT_STATE_KEY.as_bytes().to_vec(), state.encode());
    }

    pub fn owner(&self) -> Result<Principal, ContractError> {
        self.principal_singleton(keys::OWNER_KEY, "get owner address")
    }

    pub fn set_owner(&mut self, owner: &Principal) {
        self.store.put(
            keys::OWNER_KEY.as_bytes().to_vec(),
            owner.to_string().into_bytes(),
        );
    }

    pub fn governance(&self) -> Result<Principal, ContractError> {
        self.principal_singleton(keys::GOVERNANCE_KEY, "get governance address")
    }

    pub fn set_governance(&mut self, governance: &Principal) {
        self.store.put(
            keys::GOVERNANCE_KEY.as_bytes().to_vec(),
            governance.to_string().into_bytes(),
        );
    }

    fn principal_singleton(
        &self,
        key: &str,
        op: &'static str,
    ) -> Result<Principal, ContractError> {
        let bytes = self
            .store
            .get(key.as_bytes())?
            .ok_or_else(|| StoreError::backend(op, "value not found"))?;
        let s = String::from_utf8(bytes)
            .map_err(|e| StoreError::backend(op, e.to_string()))?;
        Ok(Principal::new(s))
    }

    // ── validators ──────────────────────────────────────────────────────

    pub fn is_validator(&self, address: &Principal) -> Result<bool, ContractError> {
        Ok(matches!(
            self.store.get(&keys::validator_key(address))?,
            Some(bytes) if bytes == keys::VALIDATOR_SENTINEL
        ))
    }

    pub fn add_validator(&mut self, address: &Principal) {
        self.store
            .put(keys::validator_key(address), keys::VALIDATOR_SENTINEL.to_vec());
    }

    // ── pending withdrawals ─────────────────────────────────────────────

    pub fn pending_withdrawal(&self, address: &Principal) -> Result<u64, ContractError> {
        match self.store.get(&keys::pending_withdrawal_key(address))? {
            None => Ok(0),
            Some(bytes) => std::str::from_utf8(&bytes)
                .ok()
                .and_then(|s| s.parse::<u64>().ok())
                .ok_or_else(|| {
                    ContractError::Store(StoreError::Decode {
                        entity: "pending withdrawal",
                        detail: "not a decimal integer".to_string(),
                    })
                }),
        }
    }

    pub fn set_pending_withdrawal(&mut self, address: &Principal, amount: u64) {
        self.store.put(
            keys::pending_withdrawal_key(address),
            amount.to_string().into_bytes(),
        );
    }

    // ── nonce register ──────────────────────────────────────────────────

    pub fn is_nonce_used(&self, digest: &str) -> Result<bool, ContractError> {
        self.has_key(&keys::used_nonce_key(digest))
    }

    pub fn mark_nonce_used(&mut self, digest: &str) {
        self.store
            .put(keys::used_nonce_key(digest), keys::NONCE_SENTINEL.to_vec());
    }

    // ── threat attestations ─────────────────────────────────────────────

    pub fn attestation(&self, report_id: &str) -> Result<Option<ThreatAttestation>, ContractError> {
        self.get_json(&keys::attestation_key(report_id), "threat attestation")
    }

    /// Raw stored bytes of an attestation, for read handlers that return
    /// the stored JSON verbatim.
    pub fn attestation_raw(&self, report_id: &str) -> Result<Option<Vec<u8>>, ContractError> {
        self.get_raw(&keys::attestation_key(report_id))
    }

    pub fn save_attestation(&mut self, attestation: &ThreatAttestation) -> Result<(), ContractError> {
        self.put_json(
            keys::attestation_key(&attestation.id),
            "threat attestation",
            attestation,
        )
    }

    pub fn has_verification_stamp(
        &self,
        report_id: &str,
        verifier: &Principal,
    ) -> Result<bool, ContractError> {
        self.has_key(&keys::verification_key(report_id, verifier))
    }

    pub fn save_verification_stamp(&mut self, stamp: &VerificationStamp) -> Result<(), ContractError> {
        self.put_json(
            keys::verification_key(&stamp.report_id, &stamp.verifier),
            "verification stamp",
            stamp,
        )
    }

    pub fn has_duplicate_marker(
        &self,
        source_ip: &str,
        threat_type: &str,
        bucket: i64,
    ) -> Result<bool, ContractError> {
        self.has_key(&keys::duplicate_key(source_ip, threat_type, bucket))
    }

    pub fn set_duplicate_marker(&mut self, source_ip: &str, threat_type: &str, bucket: i64) {
        self.store.put(
            keys::duplicate_key(source_ip, threat_type, bucket),
            keys::DUPLICATE_SENTINEL.to_vec(),
        );
    }

    pub fn global_threat_list(&self) -> Result<Vec<GlobalThreatEntry>, ContractError> {
        Ok(self
            .get_json(keys::GLOBAL_THREAT_LIST_KEY.as_bytes(), "global threat list")?
            .unwrap_or_default())
    }

    pub fn global_threat_list_raw(&self) -> Result<Option<Vec<u8>>, ContractError> {
        self.get_raw(keys::GLOBAL_THREAT_LIST_KEY.as_bytes())
    }

    pub fn save_global_threat_list(
        &mut self,
        list: &[GlobalThreatEntry],
    ) -> Result<(), ContractError> {
        self.put_json(
            keys::GLOBAL_THREAT_LIST_KEY.as_bytes().to_vec(),
            "global threat list",
            &list,
        )
    }

    // ── reputation history ──────────────────────────────────────────────

    pub fn reputation_history(
        &self,
        address: &Principal,
    ) -> Result<Vec<ReputationChange>, ContractError> {
        Ok(self
            .get_json(&keys::reputation_history_key(address), "reputation history")?
            .unwrap_or_default())
    }

    pub fn append_reputation_change(
        &mut self,
        address: &Principal,
        change: ReputationChange,
    ) -> Result<(), ContractError> {
        let mut history = self.reputation_history(address)?;
        history.push(change);
        self.put_json(
            keys::reputation_history_key(address),
            "reputation history",
            &history,
        )
    }
}

fn tier_entity(tier: NodeTier) -> &'static str {
    match tier {
        NodeTier::Consensus => "consensus nodes",
        NodeTier::Partition => "partition nodes",
        NodeTier::Edge => "edge nodes",
    }
}
