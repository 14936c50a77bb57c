//! Index of caller-supplied UTXOs keyed by output public key.

use std::collections::HashMap;

use mob_crypto::{key_image, AccountKey};
use mob_types::constants::{DEFAULT_SUBADDRESS_INDEX, MIN_SCRIPT_PUB_KEY_LEN};

use crate::types::{TxOut, UnspentTxOut, Utxo};
use crate::TxError;

/// A UTXO with its decoded output and recovered spending keys.
#[derive(Debug, Clone)]
pub struct SpendableUtxo {
    pub utxo: Utxo,
    pub tx_out: TxOut,
    pub account: AccountKey,
    /// Hex key image of the output.
    pub key_image: String,
}

impl SpendableUtxo {
    /// Decode the output descriptor and derive the key image.
    pub fn from_utxo(utxo: &Utxo) -> Result<Self, TxError> {
        let tx_out = decode_script_pub_key(&utxo.script_pub_key)?;
        let account =
            AccountKey::from_hex(&utxo.private_key).map_err(TxError::InvalidPrivateKey)?;
        let tx_public_key = hex::decode(&tx_out.public_key)
            .map_err(|e| TxError::InvalidScriptPubKey(format!("public_key: {e}")))?;
        let onetime_private =
            account.recover_onetime_private_key(&tx_public_key, DEFAULT_SUBADDRESS_INDEX)?;

        Ok(Self {
            utxo: utxo.clone(),
            tx_out,
            account,
            key_image: hex::encode(key_image(&onetime_private)),
        })
    }

    /// The proposal's input-list entry for this UTXO.
    pub fn to_unspent(&self) -> UnspentTxOut {
        UnspentTxOut {
            tx_out: self.tx_out.clone(),
            subaddress_index: DEFAULT_SUBADDRESS_INDEX,
            key_image: self.key_image.clone(),
            value: self.utxo.amount.to_string(),
            attempted_spend_height: 0,
            attempted_spend_tombstone: 0,
            monitor_id: String::new(),
        }
    }
}

/// Decode a hex-encoded JSON [`TxOut`].
pub fn decode_script_pub_key(script_pub_key: &str) -> Result<TxOut, TxError> {
    if script_pub_key.len() < MIN_SCRIPT_PUB_KEY_LEN {
        return Err(TxError::InvalidScriptPubKey(format!(
            "too short ({} chars)",
            script_pub_key.len()
        )));
    }
    let data =
        hex::decode(script_pub_key).map_err(|e| TxError::InvalidScriptPubKey(e.to_string()))?;
    serde_json::from_slice(&data).map_err(|e| TxError::InvalidScriptPubKey(e.to_string()))
}

/// UTXOs in caller order, indexed by decoded output public key.
#[derive(Debug, Default)]
pub struct UtxoIndex {
    entries: Vec<SpendableUtxo>,
    by_public_key: HashMap<Vec<u8>, usize>,
}

impl UtxoIndex {
    /// Index every UTXO. Any malformed record fails the whole index.
    ///
    /// When two UTXOs share a public key the later one wins the lookup.
    pub fn build(utxos: &[Utxo]) -> Result<Self, TxError> {
        let mut index = Self::default();
        for utxo in utxos {
            let spendable = SpendableUtxo::from_utxo(utxo)?;
            let key = hex::decode(&spendable.tx_out.public_key)
                .map_err(|e| TxError::InvalidScriptPubKey(e.to_string()))?;
            index.by_public_key.insert(key, index.entries.len());
            index.entries.push(spendable);
        }
        log::debug!(
            "indexed {} utxos ({} distinct outputs)",
            index.entries.len(),
            index.by_public_key.len()
        );
        Ok(index)
    }

    /// Look up a UTXO by hex output public key.
    pub fn get(&self, public_key: &str) -> Option<&SpendableUtxo> {
        let key = hex::decode(public_key).ok()?;
        self.by_public_key.get(&key).map(|&i| &self.entries[i])
    }

    /// Like [`get`](Self::get) but a miss is an error.
    pub fn require(&self, public_key: &str) -> Result<&SpendableUtxo, TxError> {
        self.get(public_key)
            .ok_or_else(|| TxError::UtxoNotFound(public_key.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &SpendableUtxo> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all UTXO amounts.
    pub fn total_amount(&self) -> Result<u64, TxError> {
        self.entries.iter().try_fold(0u64, |acc, e| {
            acc.checked_add(e.utxo.amount).ok_or(TxError::AmountOverflow)
        })
    }
}
