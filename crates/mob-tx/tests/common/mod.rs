//! Shared fixtures: a recording in-memory engine and deterministic keys.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};

use curve25519_dalek::constants::RISTRETTO_BASEPOINT_POINT;
use curve25519_dalek::scalar::Scalar;
use mob_types::PublicAddress;
use mob_tx::engine::{BuilderParams, InputKeys, OutputReceipt};
use mob_tx::fog::AttestationPolicy;
use mob_tx::types::{Amount, RingElement, TxOut, TxOutMembershipProof, Utxo};
use mob_tx::wire::proto;
use mob_tx::{BuilderConfig, ConfidentialTransactionEngine, EngineError, FeePolicy, Handle, HandleKind};
use prost::Message;

pub const VIEW_PRIVATE: u64 = 0x1111;
pub const SPEND_PRIVATE: u64 = 0x2222;

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

// ─── Keys and Records ───────────────────────────────────────────────────────

pub fn private_key_hex() -> String {
    format!(
        "{}{}",
        hex::encode(Scalar::from(VIEW_PRIVATE).as_bytes()),
        hex::encode(Scalar::from(SPEND_PRIVATE).as_bytes())
    )
}

pub fn public_key_hex(seed: u64) -> String {
    hex::encode((RISTRETTO_BASEPOINT_POINT * Scalar::from(seed)).compress().as_bytes())
}

pub fn tx_out(seed: u64, version: u32) -> TxOut {
    TxOut {
        amount: Amount {
            commitment: public_key_hex(seed + 1000),
            masked_value: (seed * 7).to_string(),
            masked_token_id: hex::encode([0u8; 8]),
            version,
        },
        target_key: public_key_hex(seed + 2000),
        public_key: public_key_hex(seed),
        e_fog_hint: hex::encode([seed as u8; 16]),
        e_memo: String::new(),
    }
}

pub fn element(seed: u64) -> RingElement {
    element_with_version(seed, 2)
}

pub fn element_with_version(seed: u64, version: u32) -> RingElement {
    RingElement {
        tx_out: tx_out(seed, version),
        proof: TxOutMembershipProof {
            index: seed.to_string(),
            highest_index: "100000".into(),
            elements: vec![mob_tx::types::TxOutMembershipElement {
                range: mob_tx::types::Range {
                    from: seed.to_string(),
                    to: seed.to_string(),
                },
                hash: hex::encode([seed as u8; 32]),
            }],
        },
    }
}

pub fn utxo(seed: u64, amount: u64) -> Utxo {
    utxo_for(&tx_out(seed, 2), amount)
}

pub fn utxo_for(out: &TxOut, amount: u64) -> Utxo {
    Utxo {
        transaction_hash: format!("{:064x}", amount),
        output_index: 0,
        amount,
        private_key: private_key_hex(),
        script_pub_key: hex::encode(serde_json::to_vec(out).unwrap()),
    }
}

pub fn address(seed: u8) -> PublicAddress {
    PublicAddress::new([seed; 32], [seed.wrapping_add(1); 32])
}

pub fn fog_address(seed: u8, url: &str) -> PublicAddress {
    address(seed).with_fog(url, "", &[seed; 64])
}

/// Small thresholds so amounts in tests stay readable.
pub fn test_config() -> BuilderConfig {
    BuilderConfig::default().with_fee_policy(FeePolicy::new(5, 20))
}

// ─── Recording Engine ───────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    CreateAttestationPolicy([u8; 32]),
    CreateBuilder(BuilderParams),
    CreateRing(Handle),
    RegisterRingElement { ring: Handle, public_key: String },
    AddInput { ring: Handle, real_index: usize },
    AddOutput { amount: u64, recipient: PublicAddress, policy: Option<Handle> },
    Build,
}

/// In-memory engine that records calls and tracks live handles.
#[derive(Default)]
pub struct RecordingEngine {
    next_id: Cell<u64>,
    fail_at: Option<(&'static str, usize)>,
    seen: RefCell<HashMap<&'static str, usize>>,
    confirmation_len: Option<usize>,
    calls: RefCell<Vec<Call>>,
    live: RefCell<HashSet<Handle>>,
    released: RefCell<Vec<Handle>>,
    bad_releases: RefCell<Vec<Handle>>,
    params: Cell<Option<BuilderParams>>,
    rings: RefCell<Vec<(Handle, proto::TxIn)>>,
    inputs: RefCell<Vec<(proto::TxIn, usize)>>,
    outputs: RefCell<Vec<proto::TxOut>>,
}

impl RecordingEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the named engine call with code 42.
    pub fn failing_at(call: &'static str) -> Self {
        Self::failing_at_nth(call, 0)
    }

    /// Fail the `nth` (zero-based) invocation of the named call.
    pub fn failing_at_nth(call: &'static str, nth: usize) -> Self {
        Self {
            fail_at: Some((call, nth)),
            ..Self::default()
        }
    }

    /// Return confirmation numbers of `len` bytes instead of 32.
    pub fn with_confirmation_len(len: usize) -> Self {
        Self {
            confirmation_len: Some(len),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn released(&self) -> Vec<Handle> {
        self.released.borrow().clone()
    }

    /// True when every acquired handle was released exactly once.
    pub fn all_released(&self) -> bool {
        self.live.borrow().is_empty() && self.bad_releases.borrow().is_empty()
    }

    fn check(&self, call: &'static str) -> Result<(), EngineError> {
        let mut seen = self.seen.borrow_mut();
        let count = seen.entry(call).or_insert(0);
        let nth = *count;
        *count += 1;
        if self.fail_at == Some((call, nth)) {
            return Err(EngineError::new(42, format!("{call} rejected")));
        }
        Ok(())
    }

    fn acquire(&self, kind: HandleKind) -> Handle {
        let id = self.next_id.get() + 1;
        self.next_id.set(id);
        let handle = Handle { kind, id };
        self.live.borrow_mut().insert(handle);
        handle
    }

    fn assert_live(&self, handle: Handle, kind: HandleKind) {
        assert_eq!(handle.kind, kind);
        assert!(self.live.borrow().contains(&handle), "{handle:?} not live");
    }
}

impl ConfidentialTransactionEngine for RecordingEngine {
    fn create_attestation_policy(&self, policy: &AttestationPolicy) -> Result<Handle, EngineError> {
        self.check("create_attestation_policy")?;
        assert!(!policy.allowed_advisories.is_empty());
        self.calls
            .borrow_mut()
            .push(Call::CreateAttestationPolicy(policy.mr_enclave));
        Ok(self.acquire(HandleKind::AttestationPolicy))
    }

    fn create_builder(&self, params: &BuilderParams) -> Result<Handle, EngineError> {
        self.check("create_builder")?;
        self.calls.borrow_mut().push(Call::CreateBuilder(*params));
        self.params.set(Some(*params));
        Ok(self.acquire(HandleKind::Builder))
    }

    fn create_ring(&self) -> Result<Handle, EngineError> {
        self.check("create_ring")?;
        let handle = self.acquire(HandleKind::Ring);
        self.calls.borrow_mut().push(Call::CreateRing(handle));
        self.rings.borrow_mut().push((handle, proto::TxIn::default()));
        Ok(handle)
    }

    fn register_ring_element(
        &self,
        ring: Handle,
        tx_out: &[u8],
        proof: &[u8],
    ) -> Result<(), EngineError> {
        self.check("register_ring_element")?;
        self.assert_live(ring, HandleKind::Ring);
        let tx_out = proto::TxOut::decode(tx_out).map_err(|e| EngineError::new(1, e.to_string()))?;
        let proof = proto::TxOutMembershipProof::decode(proof)
            .map_err(|e| EngineError::new(2, e.to_string()))?;
        let public_key = hex::encode(&tx_out.public_key.as_ref().unwrap().data);
        self.calls
            .borrow_mut()
            .push(Call::RegisterRingElement { ring, public_key });

        let mut rings = self.rings.borrow_mut();
        let entry = rings.iter_mut().find(|(h, _)| *h == ring).unwrap();
        entry.1.ring.push(tx_out);
        entry.1.proofs.push(proof);
        Ok(())
    }

    fn add_input(
        &self,
        builder: Handle,
        ring: Handle,
        _keys: &InputKeys,
        real_index: usize,
    ) -> Result<(), EngineError> {
        self.check("add_input")?;
        self.assert_live(builder, HandleKind::Builder);
        self.assert_live(ring, HandleKind::Ring);
        self.calls.borrow_mut().push(Call::AddInput { ring, real_index });

        let rings = self.rings.borrow();
        let (_, tx_in) = rings.iter().find(|(h, _)| *h == ring).unwrap();
        if real_index >= tx_in.ring.len() {
            return Err(EngineError::new(3, "real index out of range"));
        }
        self.inputs.borrow_mut().push((tx_in.clone(), real_index));
        Ok(())
    }

    fn add_output(
        &self,
        builder: Handle,
        amount: u64,
        recipient: &PublicAddress,
        policy: Option<Handle>,
    ) -> Result<OutputReceipt, EngineError> {
        self.check("add_output")?;
        self.assert_live(builder, HandleKind::Builder);
        if let Some(policy) = policy {
            self.assert_live(policy, HandleKind::AttestationPolicy);
        }
        self.calls.borrow_mut().push(Call::AddOutput {
            amount,
            recipient: recipient.clone(),
            policy,
        });

        let n = self.outputs.borrow().len() as u8;
        let out = proto::TxOut {
            masked_amount: Some(proto::tx_out::MaskedAmount::MaskedAmountV2(proto::MaskedAmount {
                commitment: Some(proto::CompressedRistretto { data: vec![0xC0 + n; 32] }),
                masked_value: amount ^ 0x5555,
                masked_token_id: vec![0; 8],
            })),
            target_key: Some(proto::CompressedRistretto { data: recipient.spend_public_key.to_vec() }),
            public_key: Some(proto::CompressedRistretto { data: vec![0xA0 + n; 32] }),
            e_fog_hint: Some(proto::EncryptedFogHint { data: vec![n; 84] }),
            e_memo: Some(proto::EncryptedMemo { data: vec![n; 66] }),
        };
        let bytes = out.encode_to_vec();
        self.outputs.borrow_mut().push(out);
        Ok(OutputReceipt {
            shared_secret: vec![0x50 + n; 32],
            confirmation: vec![0x70 + n; self.confirmation_len.unwrap_or(32)],
            tx_out: bytes,
        })
    }

    fn build(&self, builder: Handle) -> Result<Vec<u8>, EngineError> {
        self.check("build")?;
        self.assert_live(builder, HandleKind::Builder);
        self.calls.borrow_mut().push(Call::Build);

        let params = self.params.get().unwrap();
        let inputs = self.inputs.borrow();
        let ring_signatures = inputs
            .iter()
            .enumerate()
            .map(|(i, (tx_in, _))| proto::RingMlsag {
                c_zero: Some(proto::CurveScalar { data: vec![i as u8; 32] }),
                responses: tx_in
                    .ring
                    .iter()
                    .map(|_| proto::CurveScalar { data: vec![0xEE; 32] })
                    .collect(),
                key_image: Some(proto::KeyImage { data: vec![0xD0 + i as u8; 32] }),
            })
            .collect();
        let tx = proto::Tx {
            prefix: Some(proto::TxPrefix {
                inputs: inputs.iter().map(|(tx_in, _)| tx_in.clone()).collect(),
                outputs: self.outputs.borrow().clone(),
                fee: params.fee,
                tombstone_block: params.tombstone_block,
                fee_token_id: params.token_id,
            }),
            signature: Some(proto::SignatureRctBulletproofs {
                ring_signatures,
                pseudo_output_commitments: inputs
                    .iter()
                    .map(|_| proto::CompressedRistretto { data: vec![0xBB; 32] })
                    .collect(),
                range_proof_bytes: vec![0xAB; 64],
            }),
        };
        Ok(tx.encode_to_vec())
    }

    fn release(&self, handle: Handle) {
        if !self.live.borrow_mut().remove(&handle) {
            self.bad_releases.borrow_mut().push(handle);
        }
        self.released.borrow_mut().push(handle);
    }
}
