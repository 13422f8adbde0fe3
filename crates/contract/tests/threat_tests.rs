//! Threat attestation integration tests.
//! Run with: cargo test --test threat_tests

use sentra_common::mock_host::{AllowAllVerifier, CollectingSink, MemoryStore};
use sentra_common::node::{Node, NodeStatus};
use sentra_common::ContractError;
use sentra_common::HostStore;
use sentra_contract::{ArgMap, Engine, Invocation};

type TestEngine = Engine<MemoryStore, AllowAllVerifier, CollectingSink>;

// T1 sits exactly on a suppression-window boundary so the in-window and
// out-of-window cases in the tests are unambiguous.
const T1: i64 = 1_700_000_100;
const OWNER: &str = "owner-principal-01";
const GOVERNANCE: &str = "governance-princ-01";
const SENSOR: &str = "edge-sensor-op-01";
const VALIDATORS: [&str; 3] = ["validator-op-0001", "validator-op-0002", "validator-op-0003"];

// ============================================================
// DETERMINISTIC TEST HELPERS
// ============================================================

/// Engine with an active edge sensor and three authorized validators.
fn sensor_engine() -> TestEngine {
    let mut engine = Engine::new(MemoryStore::new(), AllowAllVerifier, CollectingSink::new());
    let mut args = ArgMap::new();
    args.insert("governance_address", GOVERNANCE.as_bytes());
    engine.init(&Invocation::new(OWNER, T1 - 1_000, args)).expect("init");

    let args = ArgMap::new()
        .with("method", "stakeNode")
        .with("node_id", "sensor-1")
        .with("amount", "100")
        .with("sm2_signature", "test-signature-bytes")
        .with("data_hash", "test-digest-0000001")
        .with("nonce", "1")
        .with("business_license_hash", "LIC0000001")
        .with("filing_number_hash", "FIL0000001")
        .with("node_type", "2")
        .with("compliance_zone", "zone-cn-north");
    engine
        .invoke(&Invocation::new(SENSOR, T1 - 900, args))
        .expect("stake sensor");
    activate_node(&mut engine, SENSOR);

    for validator in VALIDATORS {
        let args = ArgMap::from([("method", "addValidator"), ("validator_address", validator)]);
        engine
            .invoke(&Invocation::new(OWNER, T1 - 800, args))
            .expect("add validator");
    }
    engine.sink_mut().take();
    engine
}

/// Activation has no invocation-surface operation; operators flip it
/// through host tooling, tests flip it through the store.
fn activate_node(engine: &mut TestEngine, address: &str) {
    let key = format!("NODE_{address}").into_bytes();
    let mut node: Node = {
        let bytes = engine
            .store()
            .get(&key)
            .expect("get")
            .expect("node exists");
        serde_json::from_slice(&bytes).expect("node json")
    };
    node.status = NodeStatus::Active;
    let bytes = serde_json::to_vec(&node).expect("encode");
    engine.store_mut().put(&key, &bytes).expect("put");
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

fn report_args(threat_type: &str, source_ip: &str, level: &str) -> ArgMap {
    ArgMap::new()
        .with("method", "submitThreatReport")
        .with("threat_type", threat_type)
        .with("source_ip", source_ip)
        .with("target_ip", "10.0.0.8")
        .with("threat_level", level)
        .with("context", "syn flood against edge gateway")
}

fn submit(
    engine: &mut TestEngine,
    ts: i64,
    args: ArgMap,
) -> Result<Vec<u8>, ContractError> {
    engine.invoke(&Invocation::new(SENSOR, ts, args))
}

fn verify(
    engine: &mut TestEngine,
    validator: &str,
    report_id: &str,
    ts: i64,
) -> Result<serde_json::Value, ContractError> {
    let args = ArgMap::from([("method", "verifyThreatReport"), ("report_id", report_id)]);
    let payload = engine.invoke(&Invocation::new(validator, ts, args))?;
    Ok(serde_json::from_slice(&payload).expect("verify payload json"))
}

fn global_list(engine: &mut TestEngine, ts: i64) -> serde_json::Value {
    let args = ArgMap::from([("method", "getGlobalThreatList")]);
    let payload = engine
        .invoke(&Invocation::new("anyone-reader-01", ts, args))
        .expect("getGlobalThreatList");
    serde_json::from_slice(&payload).expect("list json")
}

fn fetch_report(engine: &mut TestEngine, report_id: &str, ts: i64) -> serde_json::Value {
    let args = ArgMap::from([("method", "getThreatReport"), ("report_id", report_id)]);
    let payload = engine
        .invoke(&Invocation::new("anyone-reader-01", ts, args))
        .expect("getThreatReport");
    serde_json::from_slice(&payload).expect("report json")
}

// ============================================================
// SUBMISSION
// ============================================================

#[test]
fn test_submit_critical_report() {
    let mut engine = sensor_engine();

    let payload = submit(&mut engine, T1, report_args("ddos", "1.2.3.4", "Critical"))
        .expect("submit");
    let report_id = String::from_utf8(payload).expect("id is ascii");
    assert_eq!(report_id, format!("threat_1.2.3.4_{T1}"));

    let events = engine.sink().events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].name, "ThreatReported");
    assert_eq!(
        events[0].fields,
        vec![
            report_id.clone(),
            "1.2.3.4".to_string(),
            "10.0.0.8".to_string(),
            "ddos".to_string(),
            T1.to_string()
        ]
    );

    let report = fetch_report(&mut engine, &report_id, T1 + 5);
    assert_eq!(report["threat_level"], 2);
    assert_eq!(report["agent_address"], SENSOR);
    assert_eq!(report["verified"], false);
    assert_eq!(report["verification_count"], 0);
    // compliance tag defaults to the sensor's registered zone
    assert_eq!(report["compliance_tag"], "zone-cn-north");

    let list = global_list(&mut engine, T1 + 5);
    assert_eq!(list.as_array().expect("array").len(), 1);
    assert_eq!(list[0]["ip"], "1.2.3.4");
    assert_eq!(list[0]["level"], 2);
    assert_eq!(list[0]["report_count"], 1);
    assert_eq!(list[0]["first_seen"], T1);
}

#[test]
fn test_sensor_counters_update_on_submit() {
    let mut engine = sensor_engine();
    let before = node_record(&engine, SENSOR);
    assert!(!before.is_threat_sensor);

    submit(&mut engine, T1, report_args("ddos", "1.2.3.4", "Critical")).expect("submit");

    let after = node_record(&engine, SENSOR);
    assert!(after.is_threat_sensor);
    assert_eq!(after.last_threat_report, T1);
    assert_eq!(after.challenge_count, before.challenge_count + 1);
    // critical reports weigh 3 on the monotonic threat score
    assert_eq!(after.threat_score, before.threat_score + 3);
}

#[test]
fn test_below_critical_stays_out_of_global_index() {
    let mut engine = sensor_engine();
    submit(&mut engine, T1, report_args("portscan", "5.6.7.8", "Warning")).expect("submit");

    let list = global_list(&mut engine, T1 + 5);
    assert_eq!(list, serde_json::json!([]));
}

#[test]
fn test_global_index_level_escalation() {
    let mut engine = sensor_engine();
    submit(&mut engine, T1, report_args("ddos", "1.2.3.4", "Critical")).expect("first");
    // different window, different type; same source ip
    submit(&mut engine, T1 + 400, report_args("botnet-c2", "1.2.3.4", "Emergency"))
        .expect("second");

    let list = global_list(&mut engine, T1 + 500);
    assert_eq!(list.as_array().expect("array").len(), 1);
    assert_eq!(list[0]["level"], 3);
    assert_eq!(list[0]["report_count"], 2);
    assert_eq!(list[0]["first_seen"], T1);
    assert_eq!(list[0]["last_seen"], T1 + 400);

    // a later lower-severity report never lowers the level
    submit(&mut engine, T1 + 800, report_args("ddos", "1.2.3.4", "Critical")).expect("third");
    let list = global_list(&mut engine, T1 + 900);
    assert_eq!(list[0]["level"], 3);
    assert_eq!(list[0]["report_count"], 3);
}

#[test]
fn test_duplicate_suppression_window() {
    let mut engine = sensor_engine();
    submit(&mut engine, T1, report_args("ddos", "1.2.3.4", "Critical")).expect("first");

    let err = submit(&mut engine, T1 + 60, report_args("ddos", "1.2.3.4", "Critical"))
        .expect_err("same window");
    assert_eq!(err.to_string(), "duplicate threat report detected");

    // next window: accepted again
    submit(&mut engine, T1 + 301, report_args("ddos", "1.2.3.4", "Critical"))
        .expect("next window");
}

#[test]
fn test_duplicate_rejection_leaves_no_trace() {
    let mut engine = sensor_engine();
    submit(&mut engine, T1, report_args("ddos", "1.2.3.4", "Critical")).expect("first");

    let before = engine.store().clone();
    submit(&mut engine, T1 + 60, report_args("ddos", "1.2.3.4", "Critical"))
        .expect_err("duplicate");
    assert_eq!(engine.store(), &before);
}

#[test]
fn test_endpoint_validation() {
    let mut engine = sensor_engine();

    let err = submit(&mut engine, T1, report_args("ddos", "1.2.3.evil", "Critical"))
        .expect_err("bad source");
    assert_eq!(
        err.to_string(),
        "invalid source_ip: malformed address: 1.2.3.evil"
    );

    // subnet wildcards are fine
    submit(&mut engine, T1, report_args("ddos", "192.168.1.x", "Critical"))
        .expect("wildcard source");
}

#[test]
fn test_unknown_threat_level_rejected() {
    let mut engine = sensor_engine();
    let err = submit(&mut engine, T1, report_args("ddos", "1.2.3.4", "Severe"))
        .expect_err("unknown level");
    assert_eq!(err.to_string(), "invalid threat_level: Severe");
}

#[test]
fn test_submission_requires_active_node() {
    let mut engine = sensor_engine();

    // a registered but never-activated node
    let args = ArgMap::new()
        .with("method", "stakeNode")
        .with("node_id", "dormant-1")
        .with("amount", "100")
        .with("sm2_signature", "test-signature-bytes")
        .with("data_hash", "test-digest-0000001")
        .with("nonce", "1")
        .with("business_license_hash", "LIC0000001")
        .with("filing_number_hash", "FIL0000001")
        .with("node_type", "2");
    engine
        .invoke(&Invocation::new("dormant-op-00001", T1 - 10, args))
        .expect("stake");

    let err = engine
        .invoke(&Invocation::new(
            "dormant-op-00001",
            T1,
            report_args("ddos", "1.2.3.4", "Critical"),
        ))
        .expect_err("not active");
    assert_eq!(
        err.to_string(),
        "only active nodes can call this function, caller: dormant-op-00001"
    );
}

// ============================================================
// VERIFICATION
// ============================================================

#[test]
fn test_quorum_flips_verified_and_credits_reporter() {
    let mut engine = sensor_engine();
    let payload = submit(&mut engine, T1, report_args("ddos", "1.2.3.4", "Critical"))
        .expect("submit");
    let report_id = String::from_utf8(payload).expect("id");

    let reputation_before = node_record(&engine, SENSOR).reputation_score;

    for (i, validator) in VALIDATORS.iter().enumerate() {
        let ack = verify(&mut engine, validator, &report_id, T1 + 10 + i as i64)
            .expect("verification");
        assert_eq!(ack["verification_count"], (i + 1) as u64);
        assert_eq!(ack["verified"], i + 1 >= 3);
        assert_eq!(ack["already_recorded"], false);
    }

    let report = fetch_report(&mut engine, &report_id, T1 + 60);
    assert_eq!(report["verified"], true);
    assert_eq!(report["verification_count"], 3);

    let sensor = node_record(&engine, SENSOR);
    assert_eq!(sensor.reputation_score, reputation_before + 15);
    assert_eq!(sensor.verified_threats, 3);

    let verified_events: Vec<_> = engine
        .sink()
        .events()
        .iter()
        .filter(|e| e.name == "ThreatVerified")
        .cloned()
        .collect();
    assert_eq!(verified_events.len(), 3);
    assert_eq!(
        verified_events[0].fields,
        vec![
            report_id.clone(),
            VALIDATORS[0].to_string(),
            "true".to_string(),
            (T1 + 10).to_string()
        ]
    );
}

#[test]
fn test_repeat_verification_by_same_validator_is_idempotent() {
    let mut engine = sensor_engine();
    let payload = submit(&mut engine, T1, report_args("ddos", "1.2.3.4", "Critical"))
        .expect("submit");
    let report_id = String::from_utf8(payload).expect("id");

    verify(&mut engine, VALIDATORS[0], &report_id, T1 + 10).expect("first");
    let ack = verify(&mut engine, VALIDATORS[0], &report_id, T1 + 20).expect("repeat");
    assert_eq!(ack["already_recorded"], true);
    assert_eq!(ack["verification_count"], 1);

    let report = fetch_report(&mut engine, &report_id, T1 + 30);
    assert_eq!(report["verification_count"], 1);

    // single credit, single event
    assert_eq!(node_record(&engine, SENSOR).verified_threats, 1);
    let verified_events = engine
        .sink()
        .events()
        .iter()
        .filter(|e| e.name == "ThreatVerified")
        .count();
    assert_eq!(verified_events, 1);
}

#[test]
fn test_verification_requires_validator() {
    let mut engine = sensor_engine();
    let payload = submit(&mut engine, T1, report_args("ddos", "1.2.3.4", "Critical"))
        .expect("submit");
    let report_id = String::from_utf8(payload).expect("id");

    let args = ArgMap::new()
        .with("method", "verifyThreatReport")
        .with("report_id", report_id.as_str());
    let err = engine
        .invoke(&Invocation::new("mallory-000001", T1 + 10, args))
        .expect_err("not a validator");
    assert_eq!(
        err.to_string(),
        "only authorized validators can call this function, caller: mallory-000001"
    );
}

#[test]
fn test_verification_of_missing_report_fails() {
    let mut engine = sensor_engine();
    let err = verify(&mut engine, VALIDATORS[0], "threat_9.9.9.9_0", T1)
        .expect_err("missing report");
    assert_eq!(
        err.to_string(),
        "threat report not found: threat_9.9.9.9_0"
    );
}

// ============================================================
// READ HANDLERS
// ============================================================

#[test]
fn test_missing_report_yields_inline_error_payload() {
    let mut engine = sensor_engine();
    let report = fetch_report(&mut engine, "threat_9.9.9.9_0", T1);
    assert_eq!(report["success"], false);
    assert_eq!(
        report["error"],
        "threat report not found: threat_9.9.9.9_0"
    );
}

#[test]
fn test_empty_global_list_reads_as_empty_array() {
    let mut engine = sensor_engine();
    assert_eq!(global_list(&mut engine, T1), serde_json::json!([]));
}
