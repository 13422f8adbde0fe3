//! Crypto helpers: SHA3 digests, Ed25519 signature verification, and the
//! principal derivation used by key-based hosts.
//! Compatible with ed25519-dalek v2 + rand_core feature enabled.
//!
//! Combined key format (64 bytes):
//!   [0..32]  = private key bytes
//!   [32..64] = public key bytes
//!
//! Signature blob format on the invocation surface (96 bytes):
//!   [0..32]  = public key bytes
//!   [32..96] = Ed25519 signature over the submitted digest

use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use hex::encode as hex_encode;
use rand::rngs::OsRng;
use sha3::{Digest, Sha3_256, Sha3_512};
use thiserror::Error;

use crate::types::Principal;

/// Byte length of the pubkey-prefixed signature blob.
pub const SIGNATURE_BLOB_LEN: usize = 96;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CryptoError {
    #[error("invalid key length: expected {expected}, found {found}")]
    InvalidKeyLength { expected: usize, found: usize },

    #[error("malformed signature blob: {0}")]
    MalformedSignature(String),
}

/// Hex-encoded SHA3-256 of the input.
pub fn sha3_256_hex(data: &[u8]) -> String {
    let mut hasher = Sha3_256::new();
    hasher.update(data);
    hex_encode(hasher.finalize())
}

/// Derives a principal from an Ed25519 public key: the hex encoding of
/// the first 20 bytes of SHA3-512 over the key bytes.
pub fn principal_from_pubkey(pubkey: &[u8]) -> Result<Principal, CryptoError> {
    if pubkey.len() != 32 {
        return Err(CryptoError::InvalidKeyLength {
            expected: 32,
            found: pubkey.len(),
        });
    }
    let mut hasher = Sha3_512::new();
    hasher.update(pubkey);
    let digest = hasher.finalize();
    Ok(Principal::new(hex_encode(&digest[..20])))
}

/// External signature-verification primitive.
///
/// The engine asks one question: is `signature` valid over `digest` for
/// `caller`? Everything about how the answer is produced (curve, host
/// built-in, HSM) is the implementation's business. `Ok(false)` means a
/// well-formed but invalid signature; `Err` means the blob could not be
/// interpreted at all. The engine treats both as an invalid signature.
pub trait SignatureVerifier {
    fn verify(
        &self,
        caller: &Principal,
        digest: &[u8],
        signature: &[u8],
    ) -> Result<bool, CryptoError>;
}

/// Production verifier over pubkey-prefixed Ed25519 signature blobs.
///
/// Accepts a 96-byte blob (public key followed by signature), checks the
/// caller principal matches the key's derived principal, then verifies
/// the signature over the digest. A principal mismatch is a negative
/// verdict, not an error: anyone can attach someone else's key.
#[derive(Debug, Default, Clone, Copy)]
pub struct Ed25519Verifier;

impl SignatureVerifier for Ed25519Verifier {
    fn verify(
        &self,
        caller: &Principal,
        digest: &[u8],
        signature: &[u8],
    ) -> Result<bool, CryptoError> {
        if signature.len() != SIGNATURE_BLOB_LEN {
            return Err(CryptoError::MalformedSignature(format!(
                "expected {SIGNATURE_BLOB_LEN} bytes, found {}",
                signature.len()
            )));
        }

        let mut pk_arr = [0u8; 32];
        pk_arr.copy_from_slice(&signature[0..32]);
        let vk = VerifyingKey::from_bytes(&pk_arr)
            .map_err(|e| CryptoError::MalformedSignature(e.to_string()))?;

        if principal_from_pubkey(&pk_arr)? != *caller {
            return Ok(false);
        }

        let mut sig_arr = [0u8; 64];
        sig_arr.copy_from_slice(&signature[32..96]);
        let sig = Signature::from_bytes(&sig_arr);

        Ok(vk.verify(digest, &sig).is_ok())
    }
}

/// Generate a new Ed25519 keypair and return concatenated 64-byte
/// (private + public). Used by tests and operator tooling.
pub fn generate_keypair_bytes() -> Vec<u8> {
    let mut rng = OsRng;
    let sk = SigningKey::generate(&mut rng);
    let vk = sk.verifying_key();

    let mut combined = Vec::with_capacity(64);
    combined.extend_from_slice(&sk.to_bytes());
    combined.extend_from_slice(&vk.to_bytes());
    combined
}

/// Build a SigningKey from combined keypair bytes.
pub fn signing_key_from_bytes(bytes: &[u8]) -> Result<SigningKey, CryptoError> {
    if bytes.len() != 64 {
        return Err(CryptoError::InvalidKeyLength {
            expected: 64,
            found: bytes.len(),
        });
    }
    let mut sk_bytes = [0u8; 32];
    sk_bytes.copy_from_slice(&bytes[0..32]);
    Ok(SigningKey::from_bytes(&sk_bytes))
}

/// Extract public key bytes from 64-byte keypair.
pub fn public_key_bytes_from_keypair_bytes(kp_bytes: &[u8]) -> Result<Vec<u8>, CryptoError> {
    if kp_bytes.len() != 64 {
        return Err(CryptoError::InvalidKeyLength {
            expected: 64,
            found: kp_bytes.len(),
        });
    }
    Ok(kp_bytes[32..64].to_vec())
}

/// Sign a digest and return the pubkey-prefixed 96-byte signature blob.
pub fn sign_digest_blob(kp_bytes: &[u8], digest: &[u8]) -> Result<Vec<u8>, CryptoError> {
    let sk = signing_key_from_bytes(kp_bytes)?;
    let sig = sk.sign(digest);

    let mut blob = Vec::with_capacity(SIGNATURE_BLOB_LEN);
    blob.extend_from_slice(&sk.verifying_key().to_bytes());
    blob.extend_from_slice(&sig.to_bytes());
    Ok(blob)
}
