//! Account key derivation for spending MobileCoin outputs.
//!
//! Recovers the keys a ring input needs: the subaddress spend private key,
//! the one-time private key of the real output, and its key image. Ristretto
//! arithmetic via curve25519-dalek; every hash is a domain-separated
//! Blake2b-512 digest.

pub mod keys;

pub use keys::{create_onetime_public_key, key_image, onetime_public_key, AccountKey};

use curve25519_dalek::ristretto::{CompressedRistretto, RistrettoPoint};
use curve25519_dalek::scalar::Scalar;
use thiserror::Error;

/// Domain tag for subaddress spend key derivation.
pub const SUBADDRESS_DOMAIN_TAG: &[u8] = b"mc_subaddress";

/// Domain tag for hashing a shared secret to a scalar.
pub const HASH_TO_SCALAR_DOMAIN_TAG: &[u8] = b"mc_hash_to_scalar";

/// Domain tag for hashing a public key to a curve point.
pub const HASH_TO_POINT_DOMAIN_TAG: &[u8] = b"mc_hash_to_point";

#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("private key must be {expected} hex chars, got {actual}")]
    InvalidKeyLength { expected: usize, actual: usize },

    #[error("hex decode error: {0}")]
    Hex(#[from] hex::FromHexError),

    #[error("{0} is not a canonical scalar")]
    NonCanonicalScalar(&'static str),

    #[error("{0} is not a valid Ristretto point")]
    InvalidPoint(&'static str),
}

// ─── Helpers ────────────────────────────────────────────────────────────────

fn blake2b_wide(domain: &[u8], parts: &[&[u8]]) -> [u8; 64] {
    let mut state = blake2b_simd::Params::new().hash_length(64).to_state();
    state.update(domain);
    for part in parts {
        state.update(part);
    }
    let mut out = [0u8; 64];
    out.copy_from_slice(state.finalize().as_bytes());
    out
}

/// Hs(domain || parts...) reduced mod l.
pub fn hash_to_scalar(domain: &[u8], parts: &[&[u8]]) -> Scalar {
    Scalar::from_bytes_mod_order_wide(&blake2b_wide(domain, parts))
}

/// Hp(P): maps a point to an independent point with unknown discrete log.
pub fn hash_to_point(point: &RistrettoPoint) -> RistrettoPoint {
    let compressed = point.compress();
    RistrettoPoint::from_uniform_bytes(&blake2b_wide(
        HASH_TO_POINT_DOMAIN_TAG,
        &[compressed.as_bytes()],
    ))
}

/// Parse a 32-byte canonical scalar.
pub fn scalar_from_bytes(bytes: &[u8], what: &'static str) -> Result<Scalar, CryptoError> {
    let arr: [u8; 32] = bytes
        .try_into()
        .map_err(|_| CryptoError::NonCanonicalScalar(what))?;
    Option::<Scalar>::from(Scalar::from_canonical_bytes(arr))
        .ok_or(CryptoError::NonCanonicalScalar(what))
}

/// Decompress a 32-byte Ristretto point.
pub fn point_from_bytes(bytes: &[u8], what: &'static str) -> Result<RistrettoPoint, CryptoError> {
    CompressedRistretto::from_slice(bytes)
        .ok()
        .and_then(|c| c.decompress())
        .ok_or(CryptoError::InvalidPoint(what))
}
