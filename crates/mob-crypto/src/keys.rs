//! Spending keys recovered from a UTXO's private key record.

use std::fmt;

use curve25519_dalek::constants::RISTRETTO_BASEPOINT_POINT;
use curve25519_dalek::ristretto::RistrettoPoint;
use curve25519_dalek::scalar::Scalar;
use mob_types::constants::{KEY_SIZE, PRIVATE_KEY_HEX_LEN};

use crate::{
    hash_to_point, hash_to_scalar, point_from_bytes, scalar_from_bytes, CryptoError,
    HASH_TO_SCALAR_DOMAIN_TAG, SUBADDRESS_DOMAIN_TAG,
};

/// An account's root view and spend private keys.
#[derive(Clone)]
pub struct AccountKey {
    view_private: Scalar,
    spend_private: Scalar,
}

impl fmt::Debug for AccountKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccountKey { .. }")
    }
}

impl AccountKey {
    pub fn new(view_private: Scalar, spend_private: Scalar) -> Self {
        Self {
            view_private,
            spend_private,
        }
    }

    /// Parse the 128-char hex record: view private key, then spend private key.
    pub fn from_hex(private_key: &str) -> Result<Self, CryptoError> {
        if private_key.len() != PRIVATE_KEY_HEX_LEN {
            return Err(CryptoError::InvalidKeyLength {
                expected: PRIVATE_KEY_HEX_LEN,
                actual: private_key.len(),
            });
        }
        let bytes = hex::decode(private_key)?;
        let view_private = scalar_from_bytes(&bytes[..KEY_SIZE], "view private key")?;
        let spend_private = scalar_from_bytes(&bytes[KEY_SIZE..], "spend private key")?;
        Ok(Self::new(view_private, spend_private))
    }

    pub fn view_private(&self) -> &Scalar {
        &self.view_private
    }

    pub fn spend_private(&self) -> &Scalar {
        &self.spend_private
    }

    /// d_i = b + Hs("mc_subaddress" || a || i)
    pub fn subaddress_spend_private(&self, index: u64) -> Scalar {
        let n = Scalar::from(index);
        let hs = hash_to_scalar(
            SUBADDRESS_DOMAIN_TAG,
            &[self.view_private.as_bytes(), n.as_bytes()],
        );
        self.spend_private + hs
    }

    /// Subaddress public keys `(C_i, D_i)` where `D_i = d_i * G` and `C_i = a * D_i`.
    pub fn subaddress(&self, index: u64) -> ([u8; KEY_SIZE], [u8; KEY_SIZE]) {
        let spend_public = RISTRETTO_BASEPOINT_POINT * self.subaddress_spend_private(index);
        let view_public = spend_public * self.view_private;
        (
            view_public.compress().to_bytes(),
            spend_public.compress().to_bytes(),
        )
    }

    /// x = Hs(a * R) + d_i, for the output with tx public key `R`.
    pub fn recover_onetime_private_key(
        &self,
        tx_public_key: &[u8],
        subaddress_index: u64,
    ) -> Result<Scalar, CryptoError> {
        let r = point_from_bytes(tx_public_key, "tx public key")?;
        let shared = (r * self.view_private).compress();
        let hs = hash_to_scalar(HASH_TO_SCALAR_DOMAIN_TAG, &[shared.as_bytes()]);
        Ok(hs + self.subaddress_spend_private(subaddress_index))
    }
}

/// P = x * G
pub fn onetime_public_key(onetime_private: &Scalar) -> [u8; KEY_SIZE] {
    (RISTRETTO_BASEPOINT_POINT * onetime_private).compress().to_bytes()
}

/// I = x * Hp(x * G)
pub fn key_image(onetime_private: &Scalar) -> [u8; KEY_SIZE] {
    let public: RistrettoPoint = RISTRETTO_BASEPOINT_POINT * onetime_private;
    (hash_to_point(&public) * onetime_private).compress().to_bytes()
}

/// Sender side: target key `Hs(r * C) * G + D` for tx private key `r`.
///
/// Returns `(target_key, tx_public_key)` where the tx public key is `r * D`.
pub fn create_onetime_public_key(
    tx_private: &Scalar,
    view_public: &[u8],
    spend_public: &[u8],
) -> Result<([u8; KEY_SIZE], [u8; KEY_SIZE]), CryptoError> {
    let c = point_from_bytes(view_public, "view public key")?;
    let d = point_from_bytes(spend_public, "spend public key")?;
    let shared = (c * tx_private).compress();
    let hs = hash_to_scalar(HASH_TO_SCALAR_DOMAIN_TAG, &[shared.as_bytes()]);
    let target = RISTRETTO_BASEPOINT_POINT * hs + d;
    let tx_public = d * tx_private;
    Ok((target.compress().to_bytes(), tx_public.compress().to_bytes()))
}
