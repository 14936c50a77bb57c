//! Fee and change reconciliation.
//!
//! Change is whatever the inputs carry beyond `amount + fee`. Change below
//! the minimum fee is zeroed; change that survives but is finer than the
//! dust granularity is rejected, since it could never be spent.

use mob_types::constants::{MILLIMOB_TO_PICOMOB, MOB_MINIMUM_FEE};
use serde::{Deserialize, Serialize};

use crate::TxError;

/// Thresholds applied to the change output, in picoMOB.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeePolicy {
    /// Change below this is zeroed.
    pub minimum_fee: u64,
    /// Non-zero change below this is rejected.
    pub dust_granularity: u64,
}

impl Default for FeePolicy {
    fn default() -> Self {
        Self {
            minimum_fee: MOB_MINIMUM_FEE,
            dust_granularity: MILLIMOB_TO_PICOMOB,
        }
    }
}

/// Final fee and change of a proposal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reconciled {
    pub fee: u64,
    pub change: u64,
}

impl FeePolicy {
    pub fn new(minimum_fee: u64, dust_granularity: u64) -> Self {
        Self {
            minimum_fee,
            dust_granularity,
        }
    }

    /// Split `total` into `amount`, fee and change.
    ///
    /// On success `total == amount + fee + change` holds exactly.
    pub fn reconcile(&self, total: u64, amount: u64, fee: u64) -> Result<Reconciled, TxError> {
        let need = amount.checked_add(fee).ok_or(TxError::InsufficientFunds {
            need: u64::MAX,
            have: total,
        })?;
        let mut change = total
            .checked_sub(need)
            .ok_or(TxError::InsufficientFunds { need, have: total })?;
        let mut fee = fee;

        if change < self.minimum_fee {
            change = 0;
            // Folds the zeroed change: the sub-floor remainder is not recovered.
            fee += change;
        }
        if change > 0 && change < self.dust_granularity {
            return Err(TxError::InvalidChangeAmount(change));
        }

        let spent = amount
            .checked_add(fee)
            .and_then(|v| v.checked_add(change));
        if spent != Some(total) {
            return Err(TxError::AmountMismatch {
                total,
                amount,
                fee,
                change,
            });
        }

        log::debug!("fee {} change {} (total {})", fee, change, total);
        Ok(Reconciled { fee, change })
    }
}
