use super::amount::Amount;
use super::withdrawal::{LedgerKey, WithdrawalRecord};
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// The ordered, append-only record of every withdrawal.
///
/// Implementations serialize mutation internally; callers share one instance
/// between request handlers and the retry sweeper.
#[async_trait]
pub trait WithdrawalLedger: Send + Sync {
    /// Appends a record and returns the key it is addressed by from now on.
    async fn append(&self, record: WithdrawalRecord) -> Result<LedgerKey>;

    /// Snapshot of every unsettled record, in insertion order.
    ///
    /// Records appended after the snapshot is taken are not included; the next
    /// call picks them up.
    async fn unsettled(&self) -> Result<Vec<(LedgerKey, WithdrawalRecord)>>;

    /// Settles the record at `key` in place under the provider's `reference`.
    ///
    /// Fails with `InternalInconsistency` if the key is unknown or the record
    /// is already settled.
    async fn settle(&self, key: LedgerKey, reference: &str) -> Result<()>;

    /// Read-only copy of the whole ledger, newest first.
    async fn snapshot(&self) -> Result<Vec<WithdrawalRecord>>;
}

/// A single disbursement attempt against the payout provider.
///
/// Returns the provider's reference on success. Any error means the money did
/// not move; retrying is the caller's business.
///
/// `key` identifies the withdrawal across attempts: the first attempt and every
/// retry of the same withdrawal carry the same key, so a provider that
/// deduplicates on it can refuse a second payout.
#[async_trait]
pub trait PayoutGateway: Send + Sync {
    async fn disburse(&self, key: &str, recipient: &str, amount: Amount) -> Result<String>;
}

pub type LedgerRef = Arc<dyn WithdrawalLedger>;
pub type GatewayRef = Arc<dyn PayoutGateway>;
