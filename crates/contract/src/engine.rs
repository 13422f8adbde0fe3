//! # Dispatcher & Lifecycle Entry Points
//!
//! The engine owns the two host-facing entry points:
//!
//! - [`Engine::init`] runs once: it seeds the owner and governance
//!   principals, the empty tier lists, and the Active contract state.
//! - [`Engine::invoke`] handles every subsequent call: it resolves the
//!   method, applies the contract-state gate for mutating methods
//!   (resume is exempt), applies the capability gate, runs the handler
//!   against a staged view, and either commits writes plus events or
//!   discards everything.
//!
//! The host serializes invocations into a total order, so the engine is
//! single-threaded by construction: no suspension points, no shared
//! mutable state beyond the store it is handed.

use tracing::{debug, warn};

use sentra_common::config::EngineConfig;
use sentra_common::crypto::SignatureVerifier;
use sentra_common::error::ContractError;
use sentra_common::node::NodeTier;
use sentra_common::store::{EventSink, HostStore};
use sentra_common::types::{ContractState, Principal};

use crate::args::ArgMap;
use crate::caps::{ensure_capability, Capability};
use crate::governance;
use crate::registry;
use crate::reputation;
use crate::session::InvocationCtx;
use crate::staking;
use crate::threat;

/// One external call as handed over by the host.
#[derive(Debug, Clone)]
pub struct Invocation {
    /// Caller principal resolved by the host.
    pub caller: Principal,
    /// Host-assigned invocation timestamp (unix seconds).
    pub timestamp: i64,
    /// Raw argument map; `method` selects the handler.
    pub args: ArgMap,
}

impl Invocation {
    pub fn new(caller: impl Into<Principal>, timestamp: i64, args: ArgMap) -> Self {
        Invocation {
            caller: caller.into(),
            timestamp,
            args,
        }
    }
}

/// Host-ABI result triple: the ok flag mirrors the absence of an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvokeOutcome {
    pub ok: bool,
    pub payload: Vec<u8>,
    pub error: Option<String>,
}

/// The membership-and-attestation engine, generic over its three host
/// collaborators.
pub struct Engine<S, V, E> {
    store: S,
    verifier: V,
    events: E,
    config: EngineConfig,
}

impl<S, V, E> Engine<S, V, E>
where
    S: HostStore,
    V: SignatureVerifier,
    E: EventSink,
{
    pub fn new(store: S, verifier: V, events: E) -> Self {
        Self::with_config(store, verifier, events, EngineConfig::default())
    }

    pub fn with_config(store: S, verifier: V, events: E, config: EngineConfig) -> Self {
        Engine {
            store,
            verifier,
            events,
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Direct store access for host tooling and test seeding. Engine
    /// invariants only hold for state written through `invoke`.
    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn sink(&self) -> &E {
        &self.events
    }

    pub fn sink_mut(&mut self) -> &mut E {
        &mut self.events
    }

    /// One-time initialization: owner, governance, empty tier lists,
    /// Active state.
    ///
    /// The governance principal comes from `_arg0` (quick-deploy hosts)
    /// or `governance_address` (SDK hosts); absent both, governance
    /// defaults to the caller.
    pub fn init(&mut self, inv: &Invocation) -> Result<(), ContractError> {
        let mut ctx = InvocationCtx::new(
            inv.caller.clone(),
            inv.timestamp,
            &inv.args,
            &self.config,
            &self.verifier,
            &mut self.store,
        );

        ctx.set_contract_state(ContractState::Active);
        ctx.set_owner(&inv.caller);

        let governance = match crate::args::optional_str(&inv.args, "_arg0")? {
            Some(addr) => Principal::new(addr),
            None => match crate::args::optional_str(&inv.args, "governance_address")? {
                Some(addr) => Principal::new(addr),
                None => inv.caller.clone(),
            },
        };
        ctx.set_governance(&governance);

        for tier in [NodeTier::Consensus, NodeTier::Partition, NodeTier::Edge] {
            ctx.save_tier_list(tier, &[])?;
        }

        ctx.commit()?;
        debug!(owner = %inv.caller, governance = %governance, "contract initialized");
        Ok(())
    }

    /// Dispatches one invocation. On success the staged writes and the
    /// buffered events are committed; on error nothing is.
    pub fn invoke(&mut self, inv: &Invocation) -> Result<Vec<u8>, ContractError> {
        let method = crate::args::required_str(&inv.args, "method")?.to_string();

        let spec = method_spec(&method).ok_or(ContractError::UnknownMethod {
            method: method.clone(),
        })?;

        debug!(%method, caller = %inv.caller, "dispatching invocation");

        let mut ctx = InvocationCtx::new(
            inv.caller.clone(),
            inv.timestamp,
            &inv.args,
            &self.config,
            &self.verifier,
            &mut self.store,
        );

        // State gate: while paused, only the resume operation may run.
        if spec.mutating && method != "resumeContract" {
            let state = ctx.contract_state()?;
            if state != ContractState::Active {
                return Err(ContractError::NotActive {
                    state: state.as_u8(),
                });
            }
        }

        ensure_capability(&ctx, spec.capability)?;

        let payload = (spec.handler)(&mut ctx)?;

        let events = ctx.commit()?;
        for event in events {
            self.events.append(event);
        }

        Ok(payload)
    }

    /// `invoke` flattened into the host ABI triple.
    pub fn invoke_raw(&mut self, inv: &Invocation) -> InvokeOutcome {
        match self.invoke(inv) {
            Ok(payload) => InvokeOutcome {
                ok: true,
                payload,
                error: None,
            },
            Err(err) => {
                warn!(%err, caller = %inv.caller, "invocation failed");
                InvokeOutcome {
                    ok: false,
                    payload: Vec::new(),
                    error: Some(err.to_string()),
                }
            }
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// METHOD TABLE
// ════════════════════════════════════════════════════════════════════════════

type Handler = fn(&mut InvocationCtx<'_>) -> Result<Vec<u8>, ContractError>;

struct MethodSpec {
    capability: Capability,
    mutating: bool,
    handler: Handler,
}

fn method_spec(method: &str) -> Option<MethodSpec> {
    let spec = match method {
        "stakeNode" => MethodSpec {
            capability: Capability::Public,
            mutating: true,
            handler: staking::stake_node,
        },
        "getNodeInfo" => MethodSpec {
            capability: Capability::Public,
            mutating: false,
            handler: get_node_info,
        },
        "getContractStats" => MethodSpec {
            capability: Capability::Public,
            mutating: false,
            handler: get_contract_stats,
        },
        "submitChallenge" => MethodSpec {
            capability: Capability::ActiveNode,
            mutating: true,
            handler: registry::submit_challenge,
        },
        "updateReputation" => MethodSpec {
            capability: Capability::Validator,
            mutating: true,
            handler: reputation::update_reputation,
        },
        "slashNode" => MethodSpec {
            capability: Capability::Governance,
            mutating: true,
            handler: staking::slash_node,
        },
        "requestWithdrawal" => MethodSpec {
            capability: Capability::Public,
            mutating: true,
            handler: staking::request_withdrawal,
        },
        "addValidator" => MethodSpec {
            capability: Capability::Owner,
            mutating: true,
            handler: governance::add_validator,
        },
        "pauseContract" => MethodSpec {
            capability: Capability::Governance,
            mutating: true,
            handler: governance::pause_contract,
        },
        "resumeContract" => MethodSpec {
            capability: Capability::Governance,
            mutating: true,
            handler: governance::resume_contract,
        },
        "submitThreatReport" => MethodSpec {
            capability: Capability::ActiveNode,
            mutating: true,
            handler: threat::submit_threat_report,
        },
        "verifyThreatReport" => MethodSpec {
            capability: Capability::Validator,
            mutating: true,
            handler: threat::verify_threat_report,
        },
        "getThreatReport" => MethodSpec {
            capability: Capability::Public,
            mutating: false,
            handler: get_threat_report,
        },
        "getGlobalThreatList" => MethodSpec {
            capability: Capability::Public,
            mutating: false,
            handler: get_global_threat_list,
        },
        _ => return None,
    };
    Some(spec)
}

// Read handlers share the mutating handler signature so the method table
// stays a plain fn-pointer table; they never write.

fn get_node_info(ctx: &mut InvocationCtx<'_>) -> Result<Vec<u8>, ContractError> {
    registry::get_node_info(ctx)
}

fn get_contract_stats(ctx: &mut InvocationCtx<'_>) -> Result<Vec<u8>, ContractError> {
    registry::get_contract_stats(ctx)
}

fn get_threat_report(ctx: &mut InvocationCtx<'_>) -> Result<Vec<u8>, ContractError> {
    threat::get_threat_report(ctx)
}

fn get_global_threat_list(ctx: &mut InvocationCtx<'_>) -> Result<Vec<u8>, ContractError> {
    threat::get_global_threat_list(ctx)
}
