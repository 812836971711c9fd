use super::amount::Amount;
use super::ids::is_placeholder;
use crate::error::PayoutError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Position of a record in the ledger.
///
/// A record's `id` changes when it settles, so the ledger addresses records by
/// this key instead. Keys follow insertion order and are never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LedgerKey(pub u64);

/// One submitted withdrawal.
///
/// Only `id` and `settled` ever change after creation, and only through
/// [`WithdrawalRecord::settle`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WithdrawalRecord {
    /// Provider reference once settled, local placeholder before that.
    pub id: String,
    pub recipient: String,
    pub amount: Amount,
    pub submitted_at: DateTime<Utc>,
    pub settled: bool,
}

impl WithdrawalRecord {
    /// A withdrawal whose first attempt was accepted by the provider.
    pub fn settled(recipient: impl Into<String>, amount: Amount, reference: String) -> Self {
        Self {
            id: reference,
            recipient: recipient.into(),
            amount,
            submitted_at: Utc::now(),
            settled: true,
        }
    }

    /// A withdrawal waiting for the retry sweep.
    pub fn pending(recipient: impl Into<String>, amount: Amount, placeholder: String) -> Self {
        Self {
            id: placeholder,
            recipient: recipient.into(),
            amount,
            submitted_at: Utc::now(),
            settled: false,
        }
    }

    /// Marks the record paid under the provider's `reference`.
    ///
    /// Settlement happens at most once; a second call is an inconsistency in the
    /// caller, not a retry.
    pub fn settle(&mut self, reference: &str) -> Result<(), PayoutError> {
        if self.settled {
            return Err(PayoutError::InternalInconsistency(format!(
                "withdrawal {} is already settled",
                self.id
            )));
        }
        if reference.is_empty() || is_placeholder(reference) {
            return Err(PayoutError::InternalInconsistency(format!(
                "refusing to settle {} with non-provider reference {:?}",
                self.id, reference
            )));
        }
        self.id = reference.to_string();
        self.settled = true;
        Ok(())
    }
}
