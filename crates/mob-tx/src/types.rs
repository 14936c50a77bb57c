//! Domain model for spend proposals.
//!
//! Field names follow the mobilecoind JSON layout: snake_case, binary values
//! as lowercase hex, and u64 values inside a `Tx` as decimal strings. The
//! caller-facing records (`Utxo`, `Proofs`, `BuildOutput`) keep their
//! camelCase / PascalCase wire names.

use std::fmt;

use mob_types::PublicAddress;
use serde::{Deserialize, Serialize};

// ─── Outputs and Proofs ─────────────────────────────────────────────────────

/// Masked amount of an output. `version` selects the wire variant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Amount {
    pub commitment: String,
    pub masked_value: String,
    #[serde(default)]
    pub masked_token_id: String,
    #[serde(default)]
    pub version: u32,
}

/// An output descriptor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxOut {
    pub amount: Amount,
    pub target_key: String,
    pub public_key: String,
    /// Encrypted fog hint; empty when absent.
    #[serde(default)]
    pub e_fog_hint: String,
    /// Encrypted memo; empty when absent.
    #[serde(default)]
    pub e_memo: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Range {
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxOutMembershipElement {
    pub range: Range,
    pub hash: String,
}

/// Inclusion proof of an output in the global output set. Passed through
/// to the engine unmodified.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxOutMembershipProof {
    pub index: String,
    pub highest_index: String,
    #[serde(default)]
    pub elements: Vec<TxOutMembershipElement>,
}

// ─── Signed Transaction ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxIn {
    pub ring: Vec<TxOut>,
    pub proofs: Vec<TxOutMembershipProof>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxPrefix {
    pub inputs: Vec<TxIn>,
    pub outputs: Vec<TxOut>,
    pub fee: String,
    pub tombstone_block: String,
    #[serde(default)]
    pub fee_token_id: String,
}

/// One ring signature: challenge, one response per ring member, key image.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RingMlsag {
    pub c_zero: String,
    pub responses: Vec<String>,
    pub key_image: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureRctBulletproofs {
    pub ring_signatures: Vec<RingMlsag>,
    pub pseudo_output_commitments: Vec<String>,
    pub range_proofs: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tx {
    pub prefix: TxPrefix,
    pub signature: SignatureRctBulletproofs,
}

// ─── Proposal ───────────────────────────────────────────────────────────────

/// A spent UTXO as listed in the proposal's input list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnspentTxOut {
    pub tx_out: TxOut,
    pub subaddress_index: u64,
    pub key_image: String,
    pub value: String,
    pub attempted_spend_height: u64,
    pub attempted_spend_tombstone: u64,
    pub monitor_id: String,
}

/// Public address in proposal JSON form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonPublicAddress {
    pub view_public_key: String,
    pub spend_public_key: String,
    pub fog_report_url: String,
    pub fog_report_id: String,
    pub fog_authority_sig: String,
}

impl From<&PublicAddress> for JsonPublicAddress {
    fn from(address: &PublicAddress) -> Self {
        Self {
            view_public_key: hex::encode(address.view_public_key),
            spend_public_key: hex::encode(address.spend_public_key),
            fog_report_url: address.fog_report_url.clone(),
            fog_report_id: address.fog_report_id.clone(),
            fog_authority_sig: hex::encode(&address.fog_authority_sig),
        }
    }
}

/// A payment instruction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outlay {
    pub value: String,
    pub receiver: JsonPublicAddress,
}

impl Outlay {
    pub fn new(value: u64, receiver: &PublicAddress) -> Self {
        Self {
            value: value.to_string(),
            receiver: receiver.into(),
        }
    }
}

/// The assembled spend proposal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxProposal {
    pub input_list: Vec<UnspentTxOut>,
    pub outlay_list: Vec<Outlay>,
    pub tx: Tx,
    pub fee: u64,
    pub outlay_index_to_tx_out_index: Vec<(usize, usize)>,
    pub outlay_confirmation_numbers: Vec<Vec<u8>>,
}

// ─── Caller Records ─────────────────────────────────────────────────────────

/// A spendable output supplied by the caller.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Utxo {
    pub transaction_hash: String,
    pub output_index: u32,
    pub amount: u64,
    /// View private key then spend private key, 128 hex chars.
    pub private_key: String,
    /// Hex of the JSON-encoded [`TxOut`].
    pub script_pub_key: String,
}

impl fmt::Debug for Utxo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Utxo")
            .field("transaction_hash", &self.transaction_hash)
            .field("output_index", &self.output_index)
            .field("amount", &self.amount)
            .field("script_pub_key", &self.script_pub_key)
            .finish_non_exhaustive()
    }
}

/// An output with its membership proof.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RingElement {
    #[serde(rename = "TxOut")]
    pub tx_out: TxOut,
    #[serde(rename = "Proof")]
    pub proof: TxOutMembershipProof,
}

/// Real elements (`Ring`, in input order) and their decoy sets (`Rings`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proofs {
    #[serde(rename = "Ring")]
    pub ring: Vec<RingElement>,
    #[serde(rename = "Rings")]
    pub rings: Vec<Vec<RingElement>>,
}

/// Result of a successful build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildOutput {
    pub transaction_hash: String,
    /// Hex of the JSON-encoded [`TxProposal`].
    pub raw_transaction: String,
    pub shared_secret: String,
    pub fee: u64,
    pub output_index: i64,
    pub output_hash: String,
    pub change_index: i64,
    pub change_hash: String,
    pub change_amount: u64,
}
