//! Dispatcher, lifecycle, and governance integration tests.
//! Run with: cargo test --test engine_tests

use sentra_common::mock_host::{AllowAllVerifier, CollectingSink, MemoryStore};
use sentra_common::node::{Node, NodeStatus};
use sentra_common::HostStore;
use sentra_contract::{ArgMap, Engine, Invocation};

type TestEngine = Engine<MemoryStore, AllowAllVerifier, CollectingSink>;

const T0: i64 = 1_700_000_000;
const OWNER: &str = "owner-principal-01";
const GOVERNANCE: &str = "governance-princ-01";

fn new_engine() -> TestEngine {
    let mut engine = Engine::new(MemoryStore::new(), AllowAllVerifier, CollectingSink::new());
    let mut args = ArgMap::new();
    args.insert("governance_address", GOVERNANCE.as_bytes());
    engine.init(&Invocation::new(OWNER, T0, args)).expect("init");
    engine
}

fn stake_consensus(engine: &mut TestEngine, caller: &str, node_id: &str, ts: i64) {
    let args = ArgMap::new()
        .with("method", "stakeNode")
        .with("node_id", node_id)
        .with("amount", "10000")
        .with("sm2_signature", "test-signature-bytes")
        .with("data_hash", "test-digest-0000001")
        .with("nonce", "1")
        .with("business_license_hash", "LIC0000001")
        .with("filing_number_hash", "FIL0000001")
        .with("node_type", "0");
    engine
        .invoke(&Invocation::new(caller, ts, args))
        .expect("stake");
}

fn add_validator(engine: &mut TestEngine, validator: &str, ts: i64) {
    let args = ArgMap::from([("method", "addValidator"), ("validator_address", validator)]);
    engine
        .invoke(&Invocation::new(OWNER, ts, args))
        .expect("addValidator");
}

fn node_record(engine: &TestEngine, address: &str) -> Node {
    let key = format!("NODE_{address}").into_bytes();
    let bytes = engine
        .store()
        .get(&key)
        .expect("get")
        .expect("node exists");
    serde_json::from_slice(&bytes).expect("node json")
}

fn stats(engine: &mut TestEngine, ts: i64) -> serde_json::Value {
    let args = ArgMap::from([("method", "getContractStats")]);
    let payload = engine
        .invoke(&Invocation::new("anyone-reader-01", ts, args))
        .expect("stats");
    serde_json::from_slice(&payload).expect("stats json")
}

// ============================================================
// INITIALIZATION
// ============================================================

#[test]
fn test_init_seeds_singletons_and_empty_lists() {
    let engine = new_engine();

    assert_eq!(
        engine.store().get(b"OWNER_").expect("get"),
        Some(OWNER.as_bytes().to_vec())
    );
    assert_eq!(
        engine.store().get(b"GOVERNANCE_").expect("get"),
        Some(GOVERNANCE.as_bytes().to_vec())
    );
    assert_eq!(
        engine.store().get(b"CONTRACT_STATE_").expect("get"),
        Some(b"0".to_vec())
    );
    for key in [
        b"CONSENSUS_NODES".as_slice(),
        b"PARTITION_NODES".as_slice(),
        b"EDGE_NODES".as_slice(),
    ] {
        assert_eq!(engine.store().get(key).expect("get"), Some(b"[]".to_vec()));
    }
}

#[test]
fn test_init_governance_defaults_to_caller() {
    let mut engine = Engine::new(MemoryStore::new(), AllowAllVerifier, CollectingSink::new());
    engine
        .init(&Invocation::new(OWNER, T0, ArgMap::new()))
        .expect("init");
    assert_eq!(
        engine.store().get(b"GOVERNANCE_").expect("get"),
        Some(OWNER.as_bytes().to_vec())
    );
}

#[test]
fn test_init_accepts_quick_deploy_arg() {
    let mut engine = Engine::new(MemoryStore::new(), AllowAllVerifier, CollectingSink::new());
    let mut args = ArgMap::new();
    args.insert("_arg0", "governance-princ-99".as_bytes());
    engine.init(&Invocation::new(OWNER, T0, args)).expect("init");
    assert_eq!(
        engine.store().get(b"GOVERNANCE_").expect("get"),
        Some(b"governance-princ-99".to_vec())
    );
}

#[test]
fn test_stats_are_zero_right_after_init() {
    let mut engine = new_engine();
    let stats = stats(&mut engine, T0 + 1);
    assert_eq!(stats["total_staked"], 0);
    assert_eq!(stats["active_nodes"], 0);
    assert_eq!(stats["total_consensus_nodes"], 0);
    assert_eq!(stats["total_partition_nodes"], 0);
    assert_eq!(stats["total_edge_nodes"], 0);
}

// ============================================================
// DISPATCH
// ============================================================

#[test]
fn test_unknown_method_rejected() {
    let mut engine = new_engine();
    let args = ArgMap::from([("method", "mintTokens")]);
    let err = engine
        .invoke(&Invocation::new("anyone-caller-01", T0, args))
        .expect_err("unknown method");
    assert_eq!(err.to_string(), "unknown method: mintTokens");
}

#[test]
fn test_missing_method_rejected() {
    let mut engine = new_engine();
    let err = engine
        .invoke(&Invocation::new("anyone-caller-01", T0, ArgMap::new()))
        .expect_err("no method");
    assert_eq!(err.to_string(), "method is required");
}

#[test]
fn test_invoke_raw_mirrors_result() {
    let mut engine = new_engine();

    let ok = engine.invoke_raw(&Invocation::new(
        "anyone-reader-01",
        T0,
        ArgMap::from([("method", "getContractStats")]),
    ));
    assert!(ok.ok);
    assert!(ok.error.is_none());
    assert!(!ok.payload.is_empty());

    let failed = engine.invoke_raw(&Invocation::new(
        "anyone-caller-01",
        T0,
        ArgMap::from([("method", "mintTokens")]),
    ));
    assert!(!failed.ok);
    assert!(failed.payload.is_empty());
    assert_eq!(failed.error.as_deref(), Some("unknown method: mintTokens"));
}

#[test]
fn test_get_node_info_for_unknown_address() {
    let mut engine = new_engine();
    let args = ArgMap::from([("method", "getNodeInfo"), ("node_address", "ghost-00000001")]);
    let payload = engine
        .invoke(&Invocation::new("anyone-reader-01", T0, args))
        .expect("read handlers do not raise on missing entities");
    let info: serde_json::Value = serde_json::from_slice(&payload).expect("json");
    assert_eq!(info["success"], false);
    assert_eq!(info["error"], "node not found: ghost-00000001");
    assert!(info.get("node").is_none());
}

// ============================================================
// STATE GATE
// ============================================================

#[test]
fn test_pause_gates_every_mutating_method() {
    let mut engine = new_engine();

    let args = ArgMap::from([("method", "pauseContract")]);
    engine
        .invoke(&Invocation::new(GOVERNANCE, T0 + 1, args))
        .expect("pause");

    // mutating methods bounce with the paused state in the message
    let err = engine
        .invoke(&Invocation::new(
            "consensus-op-0001",
            T0 + 2,
            ArgMap::from([("method", "stakeNode")]),
        ))
        .expect_err("paused");
    assert_eq!(err.to_string(), "contract is not active, current state: 1");

    let err = engine
        .invoke(&Invocation::new(
            GOVERNANCE,
            T0 + 3,
            ArgMap::from([("method", "pauseContract")]),
        ))
        .expect_err("pause while paused");
    assert_eq!(err.to_string(), "contract is not active, current state: 1");

    // reads still answer
    let stats = stats(&mut engine, T0 + 4);
    assert_eq!(stats["total_consensus_nodes"], 0);

    // resume is the single operation allowed while paused
    let args = ArgMap::from([("method", "resumeContract")]);
    engine
        .invoke(&Invocation::new(GOVERNANCE, T0 + 5, args))
        .expect("resume");

    stake_consensus(&mut engine, "consensus-op-0001", "n1", T0 + 6);
}

#[test]
fn test_pause_and_resume_emit_events() {
    let mut engine = new_engine();

    engine
        .invoke(&Invocation::new(
            GOVERNANCE,
            T0 + 1,
            ArgMap::from([("method", "pauseContract")]),
        ))
        .expect("pause");
    engine
        .invoke(&Invocation::new(
            GOVERNANCE,
            T0 + 2,
            ArgMap::from([("method", "resumeContract")]),
        ))
        .expect("resume");

    let events = engine.sink().events();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].name, "ContractPaused");
    assert_eq!(events[0].fields, vec![(T0 + 1).to_string()]);
    assert_eq!(events[1].name, "ContractResumed");
    assert_eq!(events[1].fields, vec![(T0 + 2).to_string()]);
}

#[test]
fn test_pause_requires_governance() {
    let mut engine = new_engine();
    let err = engine
        .invoke(&Invocation::new(
            "mallory-000001",
            T0,
            ArgMap::from([("method", "pauseContract")]),
        ))
        .expect_err("not governance");
    assert_eq!(
        err.to_string(),
        "only governance can call this function, caller: mallory-000001"
    );
}

// ============================================================
// CAPABILITIES
// ============================================================

#[test]
fn test_add_validator_is_owner_only() {
    let mut engine = new_engine();
    let args = ArgMap::from([
        ("method", "addValidator"),
        ("validator_address", "validator-op-0001"),
    ]);
    let err = engine
        .invoke(&Invocation::new(GOVERNANCE, T0, args))
        .expect_err("governance is not owner");
    assert_eq!(
        err.to_string(),
        "only owner can call this function, caller: governance-princ-01"
    );
}

#[test]
fn test_add_validator_validates_address_shape() {
    let mut engine = new_engine();
    let args = ArgMap::from([("method", "addValidator"), ("validator_address", "tiny")]);
    let err = engine
        .invoke(&Invocation::new(OWNER, T0, args))
        .expect_err("short address");
    assert_eq!(
        err.to_string(),
        "invalid validator_address: address must be at least 10 characters"
    );
}

#[test]
fn test_add_validator_records_authorization() {
    let mut engine = new_engine();
    add_validator(&mut engine, "validator-op-0001", T0);
    assert_eq!(
        engine
            .store()
            .get(b"VALIDATOR_validator-op-0001")
            .expect("get"),
        Some(b"1".to_vec())
    );
    let events = engine.sink().events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].name, "ValidatorAdded");
    assert_eq!(
        events[0].fields,
        vec!["validator-op-0001".to_string(), T0.to_string()]
    );
}

#[test]
fn test_update_reputation_is_validator_only() {
    let mut engine = new_engine();
    stake_consensus(&mut engine, "consensus-op-0001", "n1", T0 + 1);

    let args = ArgMap::from([
        ("method", "updateReputation"),
        ("node_address", "consensus-op-0001"),
        ("reputation_delta", "-10"),
    ]);
    let err = engine
        .invoke(&Invocation::new("mallory-000001", T0 + 2, args))
        .expect_err("not a validator");
    assert_eq!(
        err.to_string(),
        "only authorized validators can call this function, caller: mallory-000001"
    );
}

#[test]
fn test_challenge_requires_a_known_node() {
    let mut engine = new_engine();
    let args = ArgMap::from([
        ("method", "submitChallenge"),
        ("cache_key", "cache-123"),
        ("reason", "stale entry"),
    ]);
    let err = engine
        .invoke(&Invocation::new("stranger-000001", T0, args))
        .expect_err("no node record");
    assert_eq!(err.to_string(), "node not found: stranger-000001");
}

// ============================================================
// REPUTATION
// ============================================================

#[test]
fn test_reputation_drop_demotes_consensus_node() {
    let mut engine = new_engine();
    let target = "consensus-op-0001";
    stake_consensus(&mut engine, target, "n1", T0 + 1);
    add_validator(&mut engine, "validator-op-0001", T0 + 2);

    let args = ArgMap::from([
        ("method", "updateReputation"),
        ("node_address", target),
        ("reputation_delta", "-30"),
    ]);
    engine
        .invoke(&Invocation::new("validator-op-0001", T0 + 3, args))
        .expect("update");

    let node = node_record(&engine, target);
    assert_eq!(node.reputation_score, 70);
    assert!(!node.is_consensus_node);

    // the list seat goes with the flag
    let list: Vec<String> = serde_json::from_slice(
        &engine
            .store()
            .get(b"CONSENSUS_NODES")
            .expect("get")
            .expect("list"),
    )
    .expect("json");
    assert!(list.is_empty());

    let event = engine
        .sink()
        .events()
        .iter()
        .find(|e| e.name == "ReputationUpdated")
        .expect("event")
        .clone();
    assert_eq!(
        event.fields,
        vec![
            target.to_string(),
            "-30".to_string(),
            "70".to_string(),
            (T0 + 3).to_string()
        ]
    );

    // history trail recorded the change
    let history: Vec<serde_json::Value> = serde_json::from_slice(
        &engine
            .store()
            .get(format!("REPUTATION_HISTORY_{target}").as_bytes())
            .expect("get")
            .expect("history"),
    )
    .expect("json");
    assert_eq!(history.len(), 1);
    assert_eq!(history[0]["delta"], -30);
    assert_eq!(history[0]["new_score"], 70);
    assert_eq!(history[0]["updated_by"], "validator-op-0001");
}

#[test]
fn test_reputation_clamps_at_both_bounds() {
    let mut engine = new_engine();
    let target = "consensus-op-0001";
    stake_consensus(&mut engine, target, "n1", T0 + 1);
    add_validator(&mut engine, "validator-op-0001", T0 + 2);

    let update = |engine: &mut TestEngine, delta: &str, ts: i64| {
        let args = ArgMap::from([
            ("method", "updateReputation"),
            ("node_address", target),
            ("reputation_delta", delta),
        ]);
        engine
            .invoke(&Invocation::new("validator-op-0001", ts, args))
            .expect("update");
    };

    update(&mut engine, "2000", T0 + 3);
    assert_eq!(node_record(&engine, target).reputation_score, 1000);

    update(&mut engine, "-5000", T0 + 4);
    assert_eq!(node_record(&engine, target).reputation_score, 0);
}

#[test]
fn test_update_reputation_of_unknown_node() {
    let mut engine = new_engine();
    add_validator(&mut engine, "validator-op-0001", T0 + 1);

    let args = ArgMap::from([
        ("method", "updateReputation"),
        ("node_address", "ghost-00000001"),
        ("reputation_delta", "5"),
    ]);
    let err = engine
        .invoke(&Invocation::new("validator-op-0001", T0 + 2, args))
        .expect_err("missing node");
    assert_eq!(err.to_string(), "node not found: ghost-00000001");
}

// ============================================================
// CHALLENGES
// ============================================================

#[test]
fn test_challenge_flow() {
    let mut engine = new_engine();
    let challenger = "consensus-op-0001";
    stake_consensus(&mut engine, challenger, "n1", T0 + 1);

    // challenges require an active node
    {
        let key = format!("NODE_{challenger}").into_bytes();
        let bytes = engine.store().get(&key).expect("get").expect("node");
        let mut node: Node = serde_json::from_slice(&bytes).expect("json");
        node.status = NodeStatus::Active;
        let bytes = serde_json::to_vec(&node).expect("encode");
        engine.store_mut().put(&key, &bytes).expect("put");
    }

    let args = ArgMap::from([
        ("method", "submitChallenge"),
        ("cache_key", "cache-123"),
        ("reason", "served stale intel"),
    ]);
    let payload = engine
        .invoke(&Invocation::new(challenger, T0 + 10, args))
        .expect("challenge");
    let ack: serde_json::Value = serde_json::from_slice(&payload).expect("json");
    assert_eq!(
        ack["challenge_id"],
        format!("challenge_cache-123_{}", T0 + 10)
    );

    assert_eq!(node_record(&engine, challenger).challenge_count, 1);

    let event = engine
        .sink()
        .events()
        .iter()
        .find(|e| e.name == "NodeChallenged")
        .expect("event")
        .clone();
    assert_eq!(
        event.fields,
        vec![
            format!("challenge_cache-123_{}", T0 + 10),
            "cache-123".to_string(),
            challenger.to_string(),
            "served stale intel".to_string(),
            (T0 + 10).to_string()
        ]
    );
}

// ============================================================
// ATOMICITY
// ============================================================

#[test]
fn test_failed_invocation_leaves_store_untouched() {
    let mut engine = new_engine();
    let before = engine.store().clone();

    let args = ArgMap::new()
        .with("method", "stakeNode")
        .with("node_id", "n1")
        .with("amount", "10000")
        .with("sm2_signature", "test-signature-bytes")
        .with("data_hash", "test-digest-0000001")
        .with("nonce", "1")
        .with("business_license_hash", "short")
        .with("filing_number_hash", "FIL0000001")
        .with("node_type", "0");
    engine
        .invoke(&Invocation::new("consensus-op-0001", T0 + 1, args))
        .expect_err("invalid license hash");

    assert_eq!(engine.store(), &before);
    assert!(engine.sink().events().is_empty());
}

#[test]
fn test_events_follow_invocation_order() {
    let mut engine = new_engine();
    stake_consensus(&mut engine, "consensus-op-0001", "n1", T0 + 1);
    add_validator(&mut engine, "validator-op-0001", T0 + 2);
    engine
        .invoke(&Invocation::new(
            GOVERNANCE,
            T0 + 3,
            ArgMap::from([("method", "pauseContract")]),
        ))
        .expect("pause");

    let names: Vec<_> = engine
        .sink()
        .events()
        .iter()
        .map(|e| e.name.as_str())
        .collect();
    assert_eq!(names, vec!["NodeStaked", "ValidatorAdded", "ContractPaused"]);
}
