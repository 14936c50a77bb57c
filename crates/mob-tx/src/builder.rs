//! Spend-proposal builder.
//!
//! Reconciles fee and change, builds rings, resolves fog attestation, then
//! drives the engine in a fixed order: per input, register the ring then add
//! the input; add the primary output; add the change output if any; build.
//! Everything that can be validated locally is validated before the engine
//! session opens, so a rejected request never reaches the engine.

use mob_types::constants::{CONFIRMATION_SIZE, SHARED_SECRET_SIZE};
use mob_types::{decode_address, AddressError, PublicAddress};
use serde::{Deserialize, Serialize};

use crate::config::BuilderConfig;
use crate::engine::{BuilderParams, ConfidentialTransactionEngine, OutputReceipt, Session};
use crate::fee::Reconciled;
use crate::ring::RingBuilder;
use crate::types::*;
use crate::utxo::UtxoIndex;
use crate::wire;
use crate::TxError;

/// Block version used when none is given.
pub const DEFAULT_BLOCK_VERSION: u32 = 3;

/// String-addressed build request, as received from callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildRequest {
    pub inputs: Vec<Utxo>,
    pub proofs: Proofs,
    /// Printable recipient address.
    pub recipient: String,
    pub amount: u64,
    pub fee: u64,
    pub tombstone_block: u64,
    #[serde(default)]
    pub token_id: u64,
    #[serde(default = "default_block_version")]
    pub block_version: u32,
    /// Printable change address; empty to send change to the recipient.
    #[serde(default)]
    pub change_address: String,
}

fn default_block_version() -> u32 {
    DEFAULT_BLOCK_VERSION
}

/// Decode the request's addresses and build.
pub fn build_transaction<E: ConfidentialTransactionEngine + ?Sized>(
    request: &BuildRequest,
    engine: &E,
    config: &BuilderConfig,
) -> Result<BuildOutput, TxError> {
    let recipient = decode_address(&request.recipient)?;
    let change = if request.change_address.trim().is_empty() {
        None
    } else {
        Some(decode_address(&request.change_address)?)
    };

    let mut builder = ProposalBuilder::new()
        .with_config(config.clone())
        .utxos(request.inputs.clone())
        .proofs(request.proofs.clone())
        .recipient(recipient)
        .amount(request.amount)
        .fee(request.fee)
        .tombstone_block(request.tombstone_block)
        .token_id(request.token_id)
        .block_version(request.block_version);
    if let Some(change) = change {
        builder = builder.change_address(change);
    }
    builder.build(engine)?.into_build_output()
}

/// One output added by the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddedOutput {
    pub tx_out: TxOut,
    pub shared_secret: Vec<u8>,
    pub confirmation: Vec<u8>,
}

impl AddedOutput {
    /// Decode an engine receipt, holding it to the fixed secret and
    /// confirmation sizes.
    fn from_receipt(call: &'static str, receipt: OutputReceipt) -> Result<Self, TxError> {
        check_len(call, "shared secret", SHARED_SECRET_SIZE, &receipt.shared_secret)?;
        check_len(call, "confirmation", CONFIRMATION_SIZE, &receipt.confirmation)?;
        Ok(Self {
            tx_out: wire::decode_tx_out(&receipt.tx_out)?,
            shared_secret: receipt.shared_secret,
            confirmation: receipt.confirmation,
        })
    }
}

fn check_len(
    call: &'static str,
    field: &'static str,
    expected: usize,
    bytes: &[u8],
) -> Result<(), TxError> {
    if bytes.len() != expected {
        return Err(TxError::InvalidReceipt {
            call,
            field,
            expected,
            actual: bytes.len(),
        });
    }
    Ok(())
}

/// A built proposal together with its primary and change outputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assembled {
    pub proposal: TxProposal,
    pub output: AddedOutput,
    pub change: Option<AddedOutput>,
    pub change_amount: u64,
}

impl Assembled {
    /// Caller-facing result; `raw_transaction` is hex of the proposal JSON.
    pub fn into_build_output(self) -> Result<BuildOutput, TxError> {
        let json =
            serde_json::to_vec(&self.proposal).map_err(|e| TxError::Serialize(e.to_string()))?;
        let output_hash = self.output.tx_out.public_key.clone();
        Ok(BuildOutput {
            transaction_hash: output_hash.clone(),
            raw_transaction: hex::encode(json),
            shared_secret: hex::encode(&self.output.shared_secret),
            fee: self.proposal.fee,
            output_index: 0,
            output_hash,
            change_index: 0,
            change_hash: self
                .change
                .map(|c| c.tx_out.public_key)
                .unwrap_or_default(),
            change_amount: self.change_amount,
        })
    }
}

/// Builder for a spend proposal.
#[derive(Debug, Clone, Default)]
pub struct ProposalBuilder {
    utxos: Vec<Utxo>,
    proofs: Proofs,
    recipient: Option<PublicAddress>,
    change_address: Option<PublicAddress>,
    amount: u64,
    fee: u64,
    tombstone_block: u64,
    token_id: u64,
    block_version: Option<u32>,
    config: BuilderConfig,
}

impl ProposalBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(mut self, config: BuilderConfig) -> Self {
        self.config = config;
        self
    }

    pub fn add_utxo(mut self, utxo: Utxo) -> Self {
        self.utxos.push(utxo);
        self
    }

    pub fn utxos(mut self, utxos: Vec<Utxo>) -> Self {
        self.utxos = utxos;
        self
    }

    pub fn proofs(mut self, proofs: Proofs) -> Self {
        self.proofs = proofs;
        self
    }

    pub fn recipient(mut self, address: PublicAddress) -> Self {
        self.recipient = Some(address);
        self
    }

    /// Send change here instead of to the recipient.
    pub fn change_address(mut self, address: PublicAddress) -> Self {
        self.change_address = Some(address);
        self
    }

    pub fn amount(mut self, amount: u64) -> Self {
        self.amount = amount;
        self
    }

    pub fn fee(mut self, fee: u64) -> Self {
        self.fee = fee;
        self
    }

    pub fn tombstone_block(mut self, height: u64) -> Self {
        self.tombstone_block = height;
        self
    }

    pub fn token_id(mut self, token_id: u64) -> Self {
        self.token_id = token_id;
        self
    }

    pub fn block_version(mut self, version: u32) -> Self {
        self.block_version = Some(version);
        self
    }

    /// Assemble the proposal. No partial result is returned on failure.
    pub fn build<E: ConfidentialTransactionEngine + ?Sized>(
        &self,
        engine: &E,
    ) -> Result<Assembled, TxError> {
        let recipient = self.recipient.as_ref().ok_or(AddressError::Empty)?;
        let change_receiver = self.change_address.as_ref().unwrap_or(recipient);
        let config = &self.config;

        let utxos = UtxoIndex::build(&self.utxos)?;
        let total = utxos.total_amount()?;
        let Reconciled { fee, change } =
            config.fee_policy.reconcile(total, self.amount, self.fee)?;

        let inputs = RingBuilder::new(config.ring_policy).build(&self.proofs, &utxos)?;
        let rings = inputs
            .iter()
            .map(|input| input.encode_ring())
            .collect::<Result<Vec<_>, _>>()?;

        let advisories = &config.allowed_advisories;
        let recipient_policy = config.measurements.policy_for(recipient, advisories)?;
        let change_policy = if change > 0 {
            config.measurements.policy_for(change_receiver, advisories)?
        } else {
            None
        };

        let params = BuilderParams {
            fee,
            token_id: self.token_id,
            tombstone_block: self.tombstone_block,
            block_version: self.block_version.unwrap_or(DEFAULT_BLOCK_VERSION),
        };

        let (tx_bytes, primary, change_receipt) = {
            let mut session = Session::new(engine);
            let recipient_policy = match &recipient_policy {
                Some(policy) => Some(session.open_attestation_policy(policy)?),
                None => None,
            };
            let change_policy = match &change_policy {
                Some(policy) => Some(session.open_attestation_policy(policy)?),
                None => None,
            };
            let builder = session.open_builder(&params)?;

            for (input, elements) in inputs.iter().zip(&rings) {
                let ring = session.open_ring()?;
                for (tx_out, proof) in elements {
                    engine
                        .register_ring_element(ring, tx_out, proof)
                        .map_err(TxError::engine("register_ring_element"))?;
                }
                engine
                    .add_input(builder, ring, &input.keys, input.real_index)
                    .map_err(TxError::engine("add_input"))?;
            }

            let primary = engine
                .add_output(builder, self.amount, recipient, recipient_policy)
                .map_err(TxError::engine("add_output"))?;
            let change_receipt = if change > 0 {
                Some(
                    engine
                        .add_output(builder, change, change_receiver, change_policy)
                        .map_err(TxError::engine("add_change_output"))?,
                )
            } else {
                None
            };
            let tx_bytes = engine
                .build(builder)
                .map_err(TxError::engine("build"))?;
            (tx_bytes, primary, change_receipt)
        };

        let tx = wire::decode_tx(&tx_bytes)?;
        let output = AddedOutput::from_receipt("add_output", primary)?;
        let change_output = change_receipt
            .map(|receipt| AddedOutput::from_receipt("add_change_output", receipt))
            .transpose()?;

        let mut outlay_list = vec![Outlay::new(self.amount, recipient)];
        let mut outlay_index_to_tx_out_index = vec![(0, 0)];
        let mut outlay_confirmation_numbers = vec![output.confirmation.clone()];
        if let Some(change_output) = &change_output {
            outlay_list.push(Outlay::new(change, change_receiver));
            outlay_index_to_tx_out_index.push((1, 1));
            outlay_confirmation_numbers.push(change_output.confirmation.clone());
        }

        let proposal = TxProposal {
            input_list: utxos.iter().map(|u| u.to_unspent()).collect(),
            outlay_list,
            tx,
            fee,
            outlay_index_to_tx_out_index,
            outlay_confirmation_numbers,
        };
        log::info!(
            "assembled proposal: {} inputs, {} outlays, fee {}, change {}",
            proposal.input_list.len(),
            proposal.outlay_list.len(),
            fee,
            change
        );

        Ok(Assembled {
            proposal,
            output,
            change: change_output,
            change_amount: change,
        })
    }
}
