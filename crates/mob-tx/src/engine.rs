//! The confidential-transaction engine seam.
//!
//! The engine owns all commitment, ring-signature and range-proof work. This
//! crate only drives it: open a builder, register rings, add inputs and
//! outputs, build. Every engine-side object is addressed by a [`Handle`]
//! owned by a [`Session`], which releases it on every exit path.

use std::fmt;

use curve25519_dalek::scalar::Scalar;
use mob_types::PublicAddress;
use thiserror::Error;

use crate::fog::AttestationPolicy;
use crate::TxError;

/// Error reported by the engine: a numeric code and a description.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("[{code}] {description}")]
pub struct EngineError {
    pub code: i32,
    pub description: String,
}

impl EngineError {
    pub fn new(code: i32, description: impl Into<String>) -> Self {
        Self {
            code,
            description: description.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandleKind {
    AttestationPolicy,
    Builder,
    Ring,
}

/// Opaque reference to an engine-side object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Handle {
    pub kind: HandleKind,
    pub id: u64,
}

/// Parameters fixed when the engine builder is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuilderParams {
    pub fee: u64,
    pub token_id: u64,
    pub tombstone_block: u64,
    pub block_version: u32,
}

/// Keys that prove ownership of a ring's real output.
#[derive(Clone, PartialEq, Eq)]
pub struct InputKeys {
    pub view_private: Scalar,
    pub subaddress_spend_private: Scalar,
}

impl fmt::Debug for InputKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("InputKeys { .. }")
    }
}

/// What the engine returns for each added output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputReceipt {
    pub shared_secret: Vec<u8>,
    pub confirmation: Vec<u8>,
    /// Protobuf-encoded `TxOut`.
    pub tx_out: Vec<u8>,
}

/// A synchronous confidential-transaction engine.
///
/// Calls are blocking round-trips and are never retried by this crate.
pub trait ConfidentialTransactionEngine {
    fn create_attestation_policy(&self, policy: &AttestationPolicy) -> Result<Handle, EngineError>;

    fn create_builder(&self, params: &BuilderParams) -> Result<Handle, EngineError>;

    fn create_ring(&self) -> Result<Handle, EngineError>;

    /// Append a protobuf `TxOut` and its membership proof to a ring.
    fn register_ring_element(
        &self,
        ring: Handle,
        tx_out: &[u8],
        proof: &[u8],
    ) -> Result<(), EngineError>;

    fn add_input(
        &self,
        builder: Handle,
        ring: Handle,
        keys: &InputKeys,
        real_index: usize,
    ) -> Result<(), EngineError>;

    fn add_output(
        &self,
        builder: Handle,
        amount: u64,
        recipient: &PublicAddress,
        policy: Option<Handle>,
    ) -> Result<OutputReceipt, EngineError>;

    /// Sign and serialize the transaction as a protobuf `Tx`.
    fn build(&self, builder: Handle) -> Result<Vec<u8>, EngineError>;

    fn release(&self, handle: Handle);
}

/// One engine session: every handle it opens is released when it drops,
/// in reverse order of acquisition, whether the build succeeded or not.
pub struct Session<'e, E: ConfidentialTransactionEngine + ?Sized> {
    engine: &'e E,
    handles: Vec<Handle>,
}

impl<'e, E: ConfidentialTransactionEngine + ?Sized> Session<'e, E> {
    pub fn new(engine: &'e E) -> Self {
        Self {
            engine,
            handles: Vec::new(),
        }
    }

    /// Handles currently held, oldest first.
    pub fn handles(&self) -> &[Handle] {
        &self.handles
    }

    fn track(&mut self, handle: Handle) -> Handle {
        log::trace!("acquired {:?} handle {}", handle.kind, handle.id);
        self.handles.push(handle);
        handle
    }

    pub fn open_attestation_policy(
        &mut self,
        policy: &AttestationPolicy,
    ) -> Result<Handle, TxError> {
        let handle = self
            .engine
            .create_attestation_policy(policy)
            .map_err(TxError::engine("create_attestation_policy"))?;
        Ok(self.track(handle))
    }

    pub fn open_builder(&mut self, params: &BuilderParams) -> Result<Handle, TxError> {
        let handle = self
            .engine
            .create_builder(params)
            .map_err(TxError::engine("create_builder"))?;
        Ok(self.track(handle))
    }

    pub fn open_ring(&mut self) -> Result<Handle, TxError> {
        let handle = self
            .engine
            .create_ring()
            .map_err(TxError::engine("create_ring"))?;
        Ok(self.track(handle))
    }
}

impl<E: ConfidentialTransactionEngine + ?Sized> Drop for Session<'_, E> {
    fn drop(&mut self) {
        while let Some(handle) = self.handles.pop() {
            log::trace!("releasing {:?} handle {}", handle.kind, handle.id);
            self.engine.release(handle);
        }
    }
}

impl<E: ConfidentialTransactionEngine + ?Sized> fmt::Debug for Session<'_, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("handles", &self.handles)
            .finish_non_exhaustive()
    }
}
