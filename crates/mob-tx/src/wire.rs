//! Conversion between the domain model and the engine's protobuf wire form.
//!
//! Marshaling parses hex and decimal strings into protobuf messages; binary
//! fields are passed through without curve validation (the engine checks
//! them). Unmarshaling hex-encodes every binary field and renders u64 fields
//! as decimal strings.
//!
//! An empty hex string means an absent fog hint or memo. A wire `TxOut`
//! carrying a present but empty hint or memo therefore comes back without
//! it; round trips are exact only for outputs whose hint and memo are either
//! absent or non-empty.

use mob_types::MaskedAmountVersion;
use prost::Message;

use crate::types::*;
use crate::TxError;

/// Protobuf messages mirroring MobileCoin's `external.proto` and
/// `blockchain.proto` definitions.
pub mod proto {
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct CompressedRistretto {
        #[prost(bytes = "vec", tag = "1")]
        pub data: Vec<u8>,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct CurveScalar {
        #[prost(bytes = "vec", tag = "1")]
        pub data: Vec<u8>,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct KeyImage {
        #[prost(bytes = "vec", tag = "1")]
        pub data: Vec<u8>,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct EncryptedFogHint {
        #[prost(bytes = "vec", tag = "1")]
        pub data: Vec<u8>,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct EncryptedMemo {
        #[prost(bytes = "vec", tag = "1")]
        pub data: Vec<u8>,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct TxOutMembershipHash {
        #[prost(bytes = "vec", tag = "1")]
        pub data: Vec<u8>,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct MaskedAmount {
        #[prost(message, optional, tag = "1")]
        pub commitment: Option<CompressedRistretto>,
        #[prost(fixed64, tag = "2")]
        pub masked_value: u64,
        #[prost(bytes = "vec", tag = "3")]
        pub masked_token_id: Vec<u8>,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct TxOut {
        #[prost(oneof = "tx_out::MaskedAmount", tags = "1, 6")]
        pub masked_amount: Option<tx_out::MaskedAmount>,
        #[prost(message, optional, tag = "2")]
        pub target_key: Option<CompressedRistretto>,
        #[prost(message, optional, tag = "3")]
        pub public_key: Option<CompressedRistretto>,
        #[prost(message, optional, tag = "4")]
        pub e_fog_hint: Option<EncryptedFogHint>,
        #[prost(message, optional, tag = "5")]
        pub e_memo: Option<EncryptedMemo>,
    }

    pub mod tx_out {
        #[derive(Clone, PartialEq, ::prost::Oneof)]
        pub enum MaskedAmount {
            #[prost(message, tag = "1")]
            MaskedAmountV1(super::MaskedAmount),
            #[prost(message, tag = "6")]
            MaskedAmountV2(super::MaskedAmount),
        }
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct Range {
        #[prost(uint64, tag = "1")]
        pub from: u64,
        #[prost(uint64, tag = "2")]
        pub to: u64,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct TxOutMembershipElement {
        #[prost(message, optional, tag = "1")]
        pub range: Option<Range>,
        #[prost(message, optional, tag = "2")]
        pub hash: Option<TxOutMembershipHash>,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct TxOutMembershipProof {
        #[prost(uint64, tag = "1")]
        pub index: u64,
        #[prost(uint64, tag = "2")]
        pub highest_index: u64,
        #[prost(message, repeated, tag = "3")]
        pub elements: Vec<TxOutMembershipElement>,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct TxIn {
        #[prost(message, repeated, tag = "1")]
        pub ring: Vec<TxOut>,
        #[prost(message, repeated, tag = "2")]
        pub proofs: Vec<TxOutMembershipProof>,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct TxPrefix {
        #[prost(message, repeated, tag = "1")]
        pub inputs: Vec<TxIn>,
        #[prost(message, repeated, tag = "2")]
        pub outputs: Vec<TxOut>,
        #[prost(uint64, tag = "3")]
        pub fee: u64,
        #[prost(fixed64, tag = "4")]
        pub tombstone_block: u64,
        #[prost(fixed64, tag = "5")]
        pub fee_token_id: u64,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct RingMlsag {
        #[prost(message, optional, tag = "1")]
        pub c_zero: Option<CurveScalar>,
        #[prost(message, repeated, tag = "2")]
        pub responses: Vec<CurveScalar>,
        #[prost(message, optional, tag = "3")]
        pub key_image: Option<KeyImage>,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct SignatureRctBulletproofs {
        #[prost(message, repeated, tag = "1")]
        pub ring_signatures: Vec<RingMlsag>,
        #[prost(message, repeated, tag = "2")]
        pub pseudo_output_commitments: Vec<CompressedRistretto>,
        #[prost(bytes = "vec", tag = "3")]
        pub range_proof_bytes: Vec<u8>,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct Tx {
        #[prost(message, optional, tag = "1")]
        pub prefix: Option<TxPrefix>,
        #[prost(message, optional, tag = "2")]
        pub signature: Option<SignatureRctBulletproofs>,
    }
}

// ─── Helpers ────────────────────────────────────────────────────────────────

fn bytes_from_hex(field: &str, value: &str) -> Result<Vec<u8>, TxError> {
    hex::decode(value).map_err(|e| TxError::Parse(format!("{field}: {e}")))
}

fn u64_from_decimal(field: &str, value: &str) -> Result<u64, TxError> {
    value
        .parse::<u64>()
        .map_err(|e| TxError::Parse(format!("{field} {value:?}: {e}")))
}

fn ristretto(field: &str, value: &str) -> Result<proto::CompressedRistretto, TxError> {
    Ok(proto::CompressedRistretto {
        data: bytes_from_hex(field, value)?,
    })
}

fn data_hex(data: Option<&[u8]>) -> String {
    data.map(hex::encode).unwrap_or_default()
}

// ─── Marshal (domain -> wire) ───────────────────────────────────────────────

pub fn marshal_tx_out(out: &TxOut) -> Result<proto::TxOut, TxError> {
    let version = MaskedAmountVersion::from_version(out.amount.version)
        .ok_or(TxError::UnsupportedAmountVersion(out.amount.version))?;
    let masked = proto::MaskedAmount {
        commitment: Some(ristretto("commitment", &out.amount.commitment)?),
        masked_value: u64_from_decimal("masked_value", &out.amount.masked_value)?,
        masked_token_id: bytes_from_hex("masked_token_id", &out.amount.masked_token_id)?,
    };
    let masked_amount = match version {
        MaskedAmountVersion::V1 => proto::tx_out::MaskedAmount::MaskedAmountV1(masked),
        MaskedAmountVersion::V2 => proto::tx_out::MaskedAmount::MaskedAmountV2(masked),
    };

    let e_fog_hint = if out.e_fog_hint.is_empty() {
        None
    } else {
        Some(proto::EncryptedFogHint {
            data: bytes_from_hex("e_fog_hint", &out.e_fog_hint)?,
        })
    };
    let e_memo = if out.e_memo.is_empty() {
        None
    } else {
        Some(proto::EncryptedMemo {
            data: bytes_from_hex("e_memo", &out.e_memo)?,
        })
    };

    Ok(proto::TxOut {
        masked_amount: Some(masked_amount),
        target_key: Some(ristretto("target_key", &out.target_key)?),
        public_key: Some(ristretto("public_key", &out.public_key)?),
        e_fog_hint,
        e_memo,
    })
}

pub fn marshal_membership_proof(
    proof: &TxOutMembershipProof,
) -> Result<proto::TxOutMembershipProof, TxError> {
    let elements = proof
        .elements
        .iter()
        .map(|e| {
            Ok(proto::TxOutMembershipElement {
                range: Some(proto::Range {
                    from: u64_from_decimal("range.from", &e.range.from)?,
                    to: u64_from_decimal("range.to", &e.range.to)?,
                }),
                hash: Some(proto::TxOutMembershipHash {
                    data: bytes_from_hex("hash", &e.hash)?,
                }),
            })
        })
        .collect::<Result<Vec<_>, TxError>>()?;

    Ok(proto::TxOutMembershipProof {
        index: u64_from_decimal("index", &proof.index)?,
        highest_index: u64_from_decimal("highest_index", &proof.highest_index)?,
        elements,
    })
}

pub fn marshal_ring_mlsag(sig: &RingMlsag) -> Result<proto::RingMlsag, TxError> {
    let responses = sig
        .responses
        .iter()
        .map(|r| {
            Ok(proto::CurveScalar {
                data: bytes_from_hex("response", r)?,
            })
        })
        .collect::<Result<Vec<_>, TxError>>()?;
    Ok(proto::RingMlsag {
        c_zero: Some(proto::CurveScalar {
            data: bytes_from_hex("c_zero", &sig.c_zero)?,
        }),
        responses,
        key_image: Some(proto::KeyImage {
            data: bytes_from_hex("key_image", &sig.key_image)?,
        }),
    })
}

pub fn marshal_tx(tx: &Tx) -> Result<proto::Tx, TxError> {
    let inputs = tx
        .prefix
        .inputs
        .iter()
        .map(|input| {
            Ok(proto::TxIn {
                ring: input
                    .ring
                    .iter()
                    .map(marshal_tx_out)
                    .collect::<Result<_, _>>()?,
                proofs: input
                    .proofs
                    .iter()
                    .map(marshal_membership_proof)
                    .collect::<Result<_, _>>()?,
            })
        })
        .collect::<Result<Vec<_>, TxError>>()?;
    let outputs = tx
        .prefix
        .outputs
        .iter()
        .map(marshal_tx_out)
        .collect::<Result<Vec<_>, _>>()?;
    let fee_token_id = if tx.prefix.fee_token_id.is_empty() {
        0
    } else {
        u64_from_decimal("fee_token_id", &tx.prefix.fee_token_id)?
    };

    let signature = &tx.signature;
    Ok(proto::Tx {
        prefix: Some(proto::TxPrefix {
            inputs,
            outputs,
            fee: u64_from_decimal("fee", &tx.prefix.fee)?,
            tombstone_block: u64_from_decimal("tombstone_block", &tx.prefix.tombstone_block)?,
            fee_token_id,
        }),
        signature: Some(proto::SignatureRctBulletproofs {
            ring_signatures: signature
                .ring_signatures
                .iter()
                .map(marshal_ring_mlsag)
                .collect::<Result<_, _>>()?,
            pseudo_output_commitments: signature
                .pseudo_output_commitments
                .iter()
                .map(|c| ristretto("pseudo_output_commitment", c))
                .collect::<Result<_, _>>()?,
            range_proof_bytes: bytes_from_hex("range_proofs", &signature.range_proofs)?,
        }),
    })
}

// ─── Unmarshal (wire -> domain) ─────────────────────────────────────────────

pub fn unmarshal_tx_out(out: &proto::TxOut) -> Result<TxOut, TxError> {
    let (masked, version) = match &out.masked_amount {
        Some(proto::tx_out::MaskedAmount::MaskedAmountV1(m)) => (m, MaskedAmountVersion::V1),
        Some(proto::tx_out::MaskedAmount::MaskedAmountV2(m)) => (m, MaskedAmountVersion::V2),
        None => return Err(TxError::Parse("tx out has no masked amount".into())),
    };
    Ok(TxOut {
        amount: Amount {
            commitment: data_hex(masked.commitment.as_ref().map(|c| c.data.as_slice())),
            masked_value: masked.masked_value.to_string(),
            masked_token_id: hex::encode(&masked.masked_token_id),
            version: version.version(),
        },
        target_key: data_hex(out.target_key.as_ref().map(|k| k.data.as_slice())),
        public_key: data_hex(out.public_key.as_ref().map(|k| k.data.as_slice())),
        e_fog_hint: data_hex(out.e_fog_hint.as_ref().map(|h| h.data.as_slice())),
        e_memo: data_hex(out.e_memo.as_ref().map(|m| m.data.as_slice())),
    })
}

pub fn unmarshal_membership_proof(proof: &proto::TxOutMembershipProof) -> TxOutMembershipProof {
    let elements = proof
        .elements
        .iter()
        .map(|e| {
            let range = e.range.clone().unwrap_or_default();
            TxOutMembershipElement {
                range: Range {
                    from: range.from.to_string(),
                    to: range.to.to_string(),
                },
                hash: data_hex(e.hash.as_ref().map(|h| h.data.as_slice())),
            }
        })
        .collect();
    TxOutMembershipProof {
        index: proof.index.to_string(),
        highest_index: proof.highest_index.to_string(),
        elements,
    }
}

pub fn unmarshal_ring_mlsag(sig: &proto::RingMlsag) -> RingMlsag {
    RingMlsag {
        c_zero: data_hex(sig.c_zero.as_ref().map(|c| c.data.as_slice())),
        responses: sig.responses.iter().map(|r| hex::encode(&r.data)).collect(),
        key_image: data_hex(sig.key_image.as_ref().map(|k| k.data.as_slice())),
    }
}

pub fn unmarshal_tx(tx: &proto::Tx) -> Result<Tx, TxError> {
    let prefix = tx
        .prefix
        .as_ref()
        .ok_or_else(|| TxError::Parse("tx has no prefix".into()))?;
    let signature = tx
        .signature
        .as_ref()
        .ok_or_else(|| TxError::Parse("tx has no signature".into()))?;

    let inputs = prefix
        .inputs
        .iter()
        .map(|input| {
            Ok(TxIn {
                ring: input
                    .ring
                    .iter()
                    .map(unmarshal_tx_out)
                    .collect::<Result<_, _>>()?,
                proofs: input.proofs.iter().map(unmarshal_membership_proof).collect(),
            })
        })
        .collect::<Result<Vec<_>, TxError>>()?;
    let outputs = prefix
        .outputs
        .iter()
        .map(unmarshal_tx_out)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Tx {
        prefix: TxPrefix {
            inputs,
            outputs,
            fee: prefix.fee.to_string(),
            tombstone_block: prefix.tombstone_block.to_string(),
            fee_token_id: prefix.fee_token_id.to_string(),
        },
        signature: SignatureRctBulletproofs {
            ring_signatures: signature
                .ring_signatures
                .iter()
                .map(unmarshal_ring_mlsag)
                .collect(),
            pseudo_output_commitments: signature
                .pseudo_output_commitments
                .iter()
                .map(|c| hex::encode(&c.data))
                .collect(),
            range_proofs: hex::encode(&signature.range_proof_bytes),
        },
    })
}

// ─── Byte-level Encoding ────────────────────────────────────────────────────

pub fn encode_tx_out(out: &TxOut) -> Result<Vec<u8>, TxError> {
    Ok(marshal_tx_out(out)?.encode_to_vec())
}

pub fn encode_membership_proof(proof: &TxOutMembershipProof) -> Result<Vec<u8>, TxError> {
    Ok(marshal_membership_proof(proof)?.encode_to_vec())
}

pub fn encode_tx(tx: &Tx) -> Result<Vec<u8>, TxError> {
    Ok(marshal_tx(tx)?.encode_to_vec())
}

pub fn decode_tx_out(bytes: &[u8]) -> Result<TxOut, TxError> {
    let out = proto::TxOut::decode(bytes).map_err(|e| TxError::Parse(e.to_string()))?;
    unmarshal_tx_out(&out)
}

pub fn decode_tx(bytes: &[u8]) -> Result<Tx, TxError> {
    let tx = proto::Tx::decode(bytes).map_err(|e| TxError::Parse(e.to_string()))?;
    unmarshal_tx(&tx)
}
