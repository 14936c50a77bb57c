//! MobileCoin spend-proposal assembly.
//!
//! Indexes caller UTXOs, places each real output inside its decoy ring,
//! reconciles fee and change, resolves fog attestation policies, drives an
//! external confidential-transaction engine through a fixed call sequence,
//! and converts between the domain model and protobuf wire form. Key
//! derivation is delegated to mob-crypto; the engine does all signing.

pub mod types;
pub mod wire;
pub mod utxo;
pub mod ring;
pub mod fog;
pub mod engine;
pub mod fee;
pub mod config;
pub mod builder;

pub use types::{
    BuildOutput, Outlay, Proofs, RingElement, Tx, TxOut, TxOutMembershipProof, TxProposal,
    UnspentTxOut, Utxo,
};
pub use builder::{build_transaction, BuildRequest, ProposalBuilder};
pub use config::BuilderConfig;
pub use engine::{ConfidentialTransactionEngine, EngineError, Handle, HandleKind};
pub use fee::FeePolicy;
pub use fog::{AttestationPolicy, MeasurementRegistry};
pub use ring::{Input, RingBuilder, RingPolicy};
pub use utxo::UtxoIndex;

use mob_crypto::CryptoError;
use mob_types::AddressError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TxError {
    #[error("invalid script pub key: {0}")]
    InvalidScriptPubKey(String),

    #[error("invalid private key: {0}")]
    InvalidPrivateKey(CryptoError),

    #[error("invalid proofs: ring len {ring}, rings len {rings}")]
    RingCountMismatch { ring: usize, rings: usize },

    #[error("no UTXO for ring output {0}")]
    UtxoNotFound(String),

    #[error("real output of input {input} is not in its ring")]
    RealOutputNotInRing { input: usize },

    #[error("input amounts overflow u64")]
    AmountOverflow,

    #[error("insufficient funds: need {need}, have {have}")]
    InsufficientFunds { need: u64, have: u64 },

    #[error("invalid change amount {0}")]
    InvalidChangeAmount(u64),

    #[error("invalid amount: total {total} != amount {amount} + fee {fee} + change {change}")]
    AmountMismatch {
        total: u64,
        amount: u64,
        fee: u64,
        change: u64,
    },

    #[error("no measurement for fog url {0}")]
    UnknownFogUrl(String),

    #[error("address error: {0}")]
    Address(#[from] AddressError),

    #[error("crypto error: {0}")]
    Crypto(#[from] CryptoError),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("serialization error: {0}")]
    Serialize(String),

    #[error("unsupported masked amount version {0}")]
    UnsupportedAmountVersion(u32),

    #[error("config error: {0}")]
    Config(String),

    #[error("{call} returned a {field} of {actual} bytes, expected {expected}")]
    InvalidReceipt {
        call: &'static str,
        field: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("{call} failed: {source}")]
    Engine {
        call: &'static str,
        #[source]
        source: EngineError,
    },
}

/// Broad classification of a [`TxError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Caller input was rejected.
    Validation,
    /// Hex, decimal, JSON, or protobuf decoding failed.
    Parse,
    /// The configuration violates an invariant callers must never break.
    Configuration,
    /// The confidential-transaction engine reported a failure.
    Engine,
}

impl TxError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            TxError::Parse(_) | TxError::Serialize(_) => ErrorKind::Parse,
            TxError::UnsupportedAmountVersion(_) | TxError::Config(_) => {
                ErrorKind::Configuration
            }
            TxError::Engine { .. } | TxError::InvalidReceipt { .. } => ErrorKind::Engine,
            _ => ErrorKind::Validation,
        }
    }

    pub(crate) fn engine(call: &'static str) -> impl FnOnce(EngineError) -> TxError {
        move |source| TxError::Engine { call, source }
    }
}
