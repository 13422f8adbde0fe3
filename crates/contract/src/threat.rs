//! # Threat Attestation Store
//!
//! Ingestion and cross-verification of threat reports.
//!
//! ## Ingestion
//!
//! An active sensor node submits a report; the engine validates the
//! endpoints, suppresses near-duplicates through a bucketed marker key,
//! anchors the attestation, updates the reporter's sensor counters, and
//! feeds the global threat index for Critical-and-above severities. A
//! failure in any of those steps, including the index update, aborts the
//! whole submission: the index and the attestation store never diverge.
//!
//! ## Verification
//!
//! Validators stamp reports one at a time. A stamp is per
//! (report, verifier) and idempotent; the report flips to verified at
//! the quorum, and every counted stamp credits the reporter.

use serde::Serialize;
use tracing::debug;

use sentra_common::error::ContractError;
use sentra_common::threat::{
    is_valid_endpoint, GlobalThreatEntry, ThreatAttestation, ThreatLevel, VerificationStamp,
};

use crate::args::{optional_str, required_str};
use crate::events;
use crate::registry::encode_payload;
use crate::session::InvocationCtx;

pub fn submit_threat_report(ctx: &mut InvocationCtx<'_>) -> Result<Vec<u8>, ContractError> {
    let threat_type = required_str(ctx.args, "threat_type")?.to_string();
    let source_ip = required_str(ctx.args, "source_ip")?.to_string();
    let target_ip = required_str(ctx.args, "target_ip")?.to_string();
    let level_name = required_str(ctx.args, "threat_level")?;
    let context = required_str(ctx.args, "context")?.to_string();
    let evidence_hash = optional_str(ctx.args, "evidence_hash")?.unwrap_or("").to_string();
    let geolocation = optional_str(ctx.args, "geolocation")?.unwrap_or("").to_string();
    let network_flow = optional_str(ctx.args, "network_flow")?.unwrap_or("").to_string();
    let region = optional_str(ctx.args, "region")?.unwrap_or("").to_string();
    let compliance_arg = optional_str(ctx.args, "compliance_tag")?.map(str::to_string);

    validate_endpoint("source_ip", &source_ip)?;
    validate_endpoint("target_ip", &target_ip)?;

    // Near-duplicate suppression: one report per (source, type) per
    // window bucket.
    let bucket = ctx.timestamp.div_euclid(ctx.config.duplicate_window_secs);
    if ctx.has_duplicate_marker(&source_ip, &threat_type, bucket)? {
        return Err(ContractError::DuplicateThreatReport);
    }
    ctx.set_duplicate_marker(&source_ip, &threat_type, bucket);

    let threat_level =
        ThreatLevel::from_name(level_name).ok_or_else(|| ContractError::InvalidArgument {
            name: "threat_level".to_string(),
            detail: level_name.to_string(),
        })?;

    let report_id = ThreatAttestation::derive_id(&source_ip, ctx.timestamp);
    if ctx.attestation(&report_id)?.is_some() {
        // Same source in the same second under a different type; the id
        // must stay unique.
        return Err(ContractError::DuplicateThreatReport);
    }

    let caller = ctx.caller.clone();
    let mut node = ctx.require_node(&caller)?;

    let attestation = ThreatAttestation {
        id: report_id.clone(),
        timestamp: ctx.timestamp,
        source_ip: source_ip.clone(),
        target_ip: target_ip.clone(),
        threat_type: threat_type.clone(),
        threat_level,
        context,
        agent_address: caller.clone(),
        evidence_hash,
        geolocation,
        network_flow,
        verified: false,
        verification_count: 0,
        compliance_tag: compliance_arg.unwrap_or_else(|| node.compliance_zone.clone()),
        region,
    };
    ctx.save_attestation(&attestation)?;

    node.last_threat_report = ctx.timestamp;
    node.last_seen = ctx.timestamp;
    node.challenge_count += 1;
    node.threat_score += u64::from(threat_level.as_u8()) + 1;
    node.is_threat_sensor = true;
    ctx.save_node(&node)?;

    if threat_level >= ThreatLevel::Critical {
        upsert_global_threat(ctx, &source_ip, threat_level)?;
    }

    let timestamp = ctx.timestamp;
    ctx.emit(events::threat_reported(
        &report_id,
        &source_ip,
        &target_ip,
        &threat_type,
        timestamp,
    ));

    Ok(report_id.into_bytes())
}

fn validate_endpoint(name: &str, ip: &str) -> Result<(), ContractError> {
    if !is_valid_endpoint(ip) {
        return Err(ContractError::InvalidArgument {
            name: name.to_string(),
            detail: format!("malformed address: {ip}"),
        });
    }
    Ok(())
}

/// Raises the global index entry for a source ip.
///
/// `level` is monotonic upward; `first_seen` never changes after
/// insertion; `last_seen` and `report_count` track every qualifying
/// report.
fn upsert_global_threat(
    ctx: &mut InvocationCtx<'_>,
    source_ip: &str,
    level: ThreatLevel,
) -> Result<(), ContractError> {
    let mut list = ctx.global_threat_list()?;

    match list.iter_mut().find(|entry| entry.ip == source_ip) {
        Some(entry) => {
            if level > entry.level {
                debug!(ip = source_ip, from = %entry.level, to = %level, "raising indexed threat level");
                entry.level = level;
            }
            entry.last_seen = ctx.timestamp;
            entry.report_count += 1;
        }
        None => {
            list.push(GlobalThreatEntry {
                ip: source_ip.to_string(),
                level,
                first_seen: ctx.timestamp,
                last_seen: ctx.timestamp,
                report_count: 1,
            });
        }
    }

    ctx.save_global_threat_list(&list)
}

#[derive(Debug, Serialize)]
pub struct VerificationPayload {
    pub report_id: String,
    pub verification_count: u64,
    pub verified: bool,
    pub already_recorded: bool,
}

pub fn verify_threat_report(ctx: &mut InvocationCtx<'_>) -> Result<Vec<u8>, ContractError> {
    let report_id = required_str(ctx.args, "report_id")?.to_string();

    let mut attestation = ctx
        .attestation(&report_id)?
        .ok_or_else(|| ContractError::ReportNotFound {
            report_id: report_id.clone(),
        })?;

    let verifier = ctx.caller.clone();

    // A second stamp from the same validator is a no-op: no tally, no
    // credit, no event.
    if ctx.has_verification_stamp(&report_id, &verifier)? {
        return encode_payload(&VerificationPayload {
            report_id,
            verification_count: attestation.verification_count,
            verified: attestation.verified,
            already_recorded: true,
        });
    }

    let stamp = VerificationStamp {
        verifier: verifier.clone(),
        verified: true,
        timestamp: ctx.timestamp,
        report_id: report_id.clone(),
    };
    ctx.save_verification_stamp(&stamp)?;

    attestation.verification_count += 1;
    attestation.verified = attestation.verification_count >= ctx.config.min_verification_count;
    ctx.save_attestation(&attestation)?;

    // Credit the reporting sensor. A missing reporter record means the
    // store is inconsistent; that aborts the verification rather than
    // leaving a half-counted stamp.
    let reporter = attestation.agent_address.clone();
    let mut node = ctx.require_node(&reporter)?;
    node.apply_reputation_delta(ctx.config.verification_reputation_bonus as i64);
    node.verified_threats += 1;
    ctx.save_node(&node)?;

    let timestamp = ctx.timestamp;
    ctx.emit(events::threat_verified(&report_id, &verifier, true, timestamp));

    encode_payload(&VerificationPayload {
        report_id,
        verification_count: attestation.verification_count,
        verified: attestation.verified,
        already_recorded: false,
    })
}

/// Read handler: the stored attestation JSON, or an inline error payload
/// when the report does not exist.
pub fn get_threat_report(ctx: &InvocationCtx<'_>) -> Result<Vec<u8>, ContractError> {
    let report_id = required_str(ctx.args, "report_id")?;

    match ctx.attestation_raw(report_id)? {
        Some(bytes) => Ok(bytes),
        None => {
            let err = ContractError::ReportNotFound {
                report_id: report_id.to_string(),
            };
            encode_payload(&ReadErrorPayload {
                success: false,
                error: err.to_string(),
            })
        }
    }
}

/// Read handler: the global threat index, empty list if nothing has been
/// indexed yet.
pub fn get_global_threat_list(ctx: &InvocationCtx<'_>) -> Result<Vec<u8>, ContractError> {
    match ctx.global_threat_list_raw()? {
        Some(bytes) => Ok(bytes),
        None => Ok(b"[]".to_vec()),
    }
}

#[derive(Debug, Serialize)]
struct ReadErrorPayload {
    success: bool,
    error: String,
}
