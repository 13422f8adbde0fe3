//! # Keyspace Layout
//!
//! Every durable entity lives under an ASCII, prefix-delimited key. The
//! prefixes below are the whole keyspace; nothing else is ever written.
//!
//! ```text
//! NODE_<address>                        node record JSON
//! NODEID_TO_ADDR_<node-id>              address (ASCII)
//! CONSENSUS_NODES                       JSON array of addresses
//! PARTITION_NODES                       JSON array of addresses
//! EDGE_NODES                            JSON array of addresses
//! PENDING_WITHDRAWAL_<address>          cumulative amount (ASCII decimal)
//! USED_NONCE_<digest>                   sentinel "used"
//! OWNER_                                owner principal
//! GOVERNANCE_                           governance principal
//! CONTRACT_STATE_                       ASCII digit 0/1/2
//! VALIDATOR_<address>                   sentinel "1"
//! THREAT_ATTESTATION_<id>               attestation JSON
//! GLOBAL_THREAT_LIST_                   JSON array of index entries
//! THREAT_VERIFICATION_<id>_<verifier>   verification stamp JSON
//! THREAT_DUPLICATE_<src>_<type>_<bucket> sentinel "1"
//! REPUTATION_HISTORY_<address>          JSON array of reputation changes
//! ```

use sentra_common::node::NodeTier;
use sentra_common::types::Principal;

pub const NODE_PREFIX: &str = "NODE_";
pub const NODE_ID_INDEX_PREFIX: &str = "NODEID_TO_ADDR_";
pub const CONSENSUS_NODES_KEY: &str = "CONSENSUS_NODES";
pub const PARTITION_NODES_KEY: &str = "PARTITION_NODES";
pub const EDGE_NODES_KEY: &str = "EDGE_NODES";
pub const PENDING_WITHDRAWAL_PREFIX: &str = "PENDING_WITHDRAWAL_";
pub const USED_NONCE_PREFIX: &str = "USED_NONCE_";
pub const OWNER_KEY: &str = "OWNER_";
pub const GOVERNANCE_KEY: &str = "GOVERNANCE_";
pub const CONTRACT_STATE_KEY: &str = "CONTRACT_STATE_";
pub const VALIDATOR_PREFIX: &str = "VALIDATOR_";
pub const THREAT_ATTESTATION_PREFIX: &str = "THREAT_ATTESTATION_";
pub const GLOBAL_THREAT_LIST_KEY: &str = "GLOBAL_THREAT_LIST_";
pub const THREAT_VERIFICATION_PREFIX: &str = "THREAT_VERIFICATION_";
pub const THREAT_DUPLICATE_PREFIX: &str = "THREAT_DUPLICATE_";
pub const REPUTATION_HISTORY_PREFIX: &str = "REPUTATION_HISTORY_";

/// Value stored under a consumed nonce digest.
pub const NONCE_SENTINEL: &[u8] = b"used";
/// Value stored under an authorized validator key.
pub const VALIDATOR_SENTINEL: &[u8] = b"1";
/// Value stored under a duplicate-suppression bucket key.
pub const DUPLICATE_SENTINEL: &[u8] = b"1";

pub fn node_key(address: &Principal) -> Vec<u8> {
    format!("{NODE_PREFIX}{address}").into_bytes()
}

pub fn node_id_index_key(node_id: &str) -> Vec<u8> {
    format!("{NODE_ID_INDEX_PREFIX}{node_id}").into_bytes()
}

pub fn tier_list_key(tier: NodeTier) -> &'static [u8] {
    match tier {
        NodeTier::Consensus => CONSENSUS_NODES_KEY.as_bytes(),
        NodeTier::Partition => PARTITION_NODES_KEY.as_bytes(),
        NodeTier::Edge => EDGE_NODES_KEY.as_bytes(),
    }
}

pub fn pending_withdrawal_key(address: &Principal) -> Vec<u8> {
    format!("{PENDING_WITHDRAWAL_PREFIX}{address}").into_bytes()
}

pub fn used_nonce_key(digest: &str) -> Vec<u8> {
    format!("{USED_NONCE_PREFIX}{digest}").into_bytes()
}

pub fn validator_key(address: &Principal) -> Vec<u8> {
    format!("{VALIDATOR_PREFIX}{address}").into_bytes()
}

pub fn attestation_key(report_id: &str) -> Vec<u8> {
    format!("{THREAT_ATTESTATION_PREFIX}{report_id}").into_bytes()
}

pub fn verification_key(report_id: &str, verifier: &Principal) -> Vec<u8> {
    format!("{THREAT_VERIFICATION_PREFIX}{report_id}_{verifier}").into_bytes()
}

/// Duplicate-suppression key: the timestamp bucket coalesces near
/// duplicates for the same source and threat type.
pub fn duplicate_key(source_ip: &str, threat_type: &str, bucket: i64) -> Vec<u8> {
    format!("{THREAT_DUPLICATE_PREFIX}{source_ip}_{threat_type}_{bucket}").into_bytes()
}

pub fn reputation_history_key(address: &Principal) -> Vec<u8> {
    format!("{REPUTATION_HISTORY_PREFIX}{address}").into_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_builders() {
        let addr = Principal::from("addr-0000000001");
        assert_eq!(node_key(&addr), b"NODE_addr-0000000001".to_vec());
        assert_eq!(node_id_index_key("n1"), b"NODEID_TO_ADDR_n1".to_vec());
        assert_eq!(
            duplicate_key("1.2.3.4", "ddos", 5_666_666),
            b"THREAT_DUPLICATE_1.2.3.4_ddos_5666666".to_vec()
        );
        assert_eq!(
            verification_key("threat_1.2.3.4_99", &Principal::from("validator-1")),
            b"THREAT_VERIFICATION_threat_1.2.3.4_99_validator-1".to_vec()
        );
    }

    #[test]
    fn test_tier_list_keys_are_distinct() {
        assert_ne!(tier_list_key(NodeTier::Consensus), tier_list_key(NodeTier::Partition));
        assert_ne!(tier_list_key(NodeTier::Partition), tier_list_key(NodeTier::Edge));
    }
}
