//! Ring assembly: placing each real output inside its decoy set.
//!
//! The caller supplies, per input, the real element and a candidate decoy
//! ring. The real output is located by public key; its position becomes the
//! input's `real_index`. A ring that lacks the real output is either
//! corrected (lenient) or rejected (strict).

use mob_types::constants::DEFAULT_SUBADDRESS_INDEX;
use serde::{Deserialize, Serialize};

use crate::engine::InputKeys;
use crate::types::{Proofs, RingElement};
use crate::utxo::UtxoIndex;
use crate::wire;
use crate::TxError;

/// What to do when a real output is missing from its own decoy ring.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RingPolicy {
    /// Overwrite position 0 with the real element.
    #[default]
    Lenient,
    /// Fail with [`TxError::RealOutputNotInRing`].
    Strict,
}

/// One real input ready for the engine.
#[derive(Debug, Clone)]
pub struct Input {
    pub ring: Vec<RingElement>,
    /// Position of the real output in `ring`.
    pub real_index: usize,
    pub keys: InputKeys,
    /// Hex key image of the real output.
    pub key_image: String,
}

impl Input {
    /// The real element.
    pub fn real(&self) -> &RingElement {
        &self.ring[self.real_index]
    }

    /// Protobuf-encode every `(TxOut, proof)` pair of the ring.
    pub fn encode_ring(&self) -> Result<Vec<(Vec<u8>, Vec<u8>)>, TxError> {
        self.ring
            .iter()
            .map(|e| {
                Ok((
                    wire::encode_tx_out(&e.tx_out)?,
                    wire::encode_membership_proof(&e.proof)?,
                ))
            })
            .collect()
    }
}

/// Builds one [`Input`] per real element of a [`Proofs`] record.
#[derive(Debug, Clone, Copy, Default)]
pub struct RingBuilder {
    policy: RingPolicy,
}

impl RingBuilder {
    pub fn new(policy: RingPolicy) -> Self {
        Self { policy }
    }

    /// Build inputs in the order of `proofs.ring`.
    pub fn build(&self, proofs: &Proofs, utxos: &UtxoIndex) -> Result<Vec<Input>, TxError> {
        if proofs.ring.is_empty() || proofs.ring.len() != proofs.rings.len() {
            return Err(TxError::RingCountMismatch {
                ring: proofs.ring.len(),
                rings: proofs.rings.len(),
            });
        }

        let mut inputs = Vec::with_capacity(proofs.ring.len());
        for (i, (real, candidates)) in proofs.ring.iter().zip(&proofs.rings).enumerate() {
            let (ring, real_index) = self.place_real(i, real, candidates)?;

            let spendable = utxos.require(&real.tx_out.public_key)?;
            let keys = InputKeys {
                view_private: *spendable.account.view_private(),
                subaddress_spend_private: spendable
                    .account
                    .subaddress_spend_private(DEFAULT_SUBADDRESS_INDEX),
            };

            log::debug!(
                "input {}: ring size {}, real index {}",
                i,
                ring.len(),
                real_index
            );
            inputs.push(Input {
                ring,
                real_index,
                keys,
                key_image: spendable.key_image.clone(),
            });
        }
        Ok(inputs)
    }

    fn place_real(
        &self,
        input: usize,
        real: &RingElement,
        candidates: &[RingElement],
    ) -> Result<(Vec<RingElement>, usize), TxError> {
        let mut ring = candidates.to_vec();
        if ring.is_empty() {
            ring.push(real.clone());
            return Ok((ring, 0));
        }

        if let Some(pos) = ring.iter().position(|e| {
            e.tx_out
                .public_key
                .eq_ignore_ascii_case(&real.tx_out.public_key)
        }) {
            return Ok((ring, pos));
        }

        match self.policy {
            RingPolicy::Strict => Err(TxError::RealOutputNotInRing { input }),
            RingPolicy::Lenient => {
                log::warn!(
                    "input {}: real output not in its ring, replacing member 0",
                    input
                );
                ring[0] = real.clone();
                Ok((ring, 0))
            }
        }
    }
}
