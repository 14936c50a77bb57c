//! MobileCoin amount units, fee constants, key sizes, and masked-amount versions.

use serde::{Deserialize, Serialize};

// =============================================================================
// Amount Units
// =============================================================================

/// picoMOB per milliMOB. Change below this granularity is unspendable dust.
pub const MILLIMOB_TO_PICOMOB: u64 = 1_000_000_000;

/// Network minimum fee in picoMOB (0.0004 MOB).
pub const MOB_MINIMUM_FEE: u64 = 400_000_000;

// =============================================================================
// Sizes
// =============================================================================

/// Compressed Ristretto point / scalar size in bytes.
pub const KEY_SIZE: usize = 32;

/// Hex length of a UTXO private key record (view key || spend key).
pub const PRIVATE_KEY_HEX_LEN: usize = KEY_SIZE * 2 * 2;

/// Shortest accepted hex-encoded output descriptor.
pub const MIN_SCRIPT_PUB_KEY_LEN: usize = 8;

/// Size of the shared secret returned for each output.
pub const SHARED_SECRET_SIZE: usize = 32;

/// Size of the confirmation number returned for each output.
pub const CONFIRMATION_SIZE: usize = 32;

/// Size of the CRC-32 checksum prefixed to printable addresses.
pub const CHECKSUM_SIZE: usize = 4;

// =============================================================================
// Accounts and Attestation
// =============================================================================

/// Subaddress index used for every spend.
pub const DEFAULT_SUBADDRESS_INDEX: u64 = 0;

/// Hardening advisory accepted alongside a fog report measurement.
pub const ALLOWED_HARDENING_ADVISORY: &str = "INTEL-SA-00334";

// =============================================================================
// Masked Amounts
// =============================================================================

/// Wire variant used to encode a TxOut's masked amount.
///
/// Versions 0 and 1 share the V1 variant; version 2 uses V2. Both variants
/// carry the same fields (commitment, masked value, masked token id).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MaskedAmountVersion {
    V1,
    V2,
}

impl MaskedAmountVersion {
    /// Map a protocol version number to its wire variant.
    pub fn from_version(version: u32) -> Option<Self> {
        match version {
            0 | 1 => Some(Self::V1),
            2 => Some(Self::V2),
            _ => None,
        }
    }

    /// Canonical version number emitted when decoding this variant.
    pub fn version(&self) -> u32 {
        match self {
            Self::V1 => 1,
            Self::V2 => 2,
        }
    }
}
