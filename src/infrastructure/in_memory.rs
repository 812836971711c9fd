use crate::domain::ports::WithdrawalLedger;
use crate::domain::withdrawal::{LedgerKey, WithdrawalRecord};
use crate::error::{PayoutError, Result};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A thread-safe in-memory withdrawal ledger.
///
/// Uses `Arc<RwLock<Vec<WithdrawalRecord>>>`; a record's ledger key is its index.
/// One coarse lock guards the whole ledger, which is plenty for the expected
/// request rate. The lock is never held across a gateway call.
#[derive(Default, Clone)]
pub struct InMemoryLedger {
    records: Arc<RwLock<Vec<WithdrawalRecord>>>,
}

impl InMemoryLedger {
    /// Creates a new, empty in-memory ledger.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl WithdrawalLedger for InMemoryLedger {
    async fn append(&self, record: WithdrawalRecord) -> Result<LedgerKey> {
        let mut records = self.records.write().await;
        let key = LedgerKey(records.len() as u64);
        records.push(record);
        Ok(key)
    }

    async fn unsettled(&self) -> Result<Vec<(LedgerKey, WithdrawalRecord)>> {
        let records = self.records.read().await;
        Ok(records
            .iter()
            .enumerate()
            .filter(|(_, r)| !r.settled)
            .map(|(i, r)| (LedgerKey(i as u64), r.clone()))
            .collect())
    }

    async fn settle(&self, key: LedgerKey, reference: &str) -> Result<()> {
        let mut records = self.records.write().await;
        let record = usize::try_from(key.0)
            .ok()
            .and_then(|i| records.get_mut(i))
            .ok_or_else(|| {
                PayoutError::InternalInconsistency(format!("no withdrawal at ledger key {}", key.0))
            })?;
        record.settle(reference)
    }

    async fn snapshot(&self) -> Result<Vec<WithdrawalRecord>> {
        let records = self.records.read().await;
        Ok(records.iter().rev().cloned().collect())
    }
}
