use crate::domain::ports::WithdrawalLedger;
use crate::domain::withdrawal::{LedgerKey, WithdrawalRecord};
use crate::error::{PayoutError, Result};
use async_trait::async_trait;
use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, DB, IteratorMode, Options};
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::Mutex;

/// Column Family for storing withdrawal records.
pub const CF_WITHDRAWALS: &str = "withdrawals";

/// A persistent withdrawal ledger backed by RocksDB.
///
/// Records live in their own Column Family under big-endian `u64` keys, so the
/// natural iteration order is insertion order. Values are JSON.
///
/// This struct is thread-safe (`Clone` shares the underlying `Arc<DB>`).
#[derive(Clone)]
pub struct RocksDbLedger {
    db: Arc<DB>,
    next_key: Arc<AtomicU64>,
    // Serializes read-modify-write in `settle`.
    settle_lock: Arc<Mutex<()>>,
}

impl RocksDbLedger {
    /// Opens or creates a RocksDB instance at the specified path.
    ///
    /// Key allocation resumes after the last stored record.
    ///
    /// # Arguments
    ///
    /// * `path` - The filesystem path where the database will be stored.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_withdrawals = ColumnFamilyDescriptor::new(CF_WITHDRAWALS, Options::default());
        let db = DB::open_cf_descriptors(&opts, path, vec![cf_withdrawals])?;

        let next_key = {
            let cf = db.cf_handle(CF_WITHDRAWALS).ok_or_else(missing_cf)?;
            match db.iterator_cf(cf, IteratorMode::End).next() {
                Some(item) => {
                    let (key, _) = item?;
                    decode_key(&key)?.0 + 1
                }
                None => 0,
            }
        };

        Ok(Self {
            db: Arc::new(db),
            next_key: Arc::new(AtomicU64::new(next_key)),
            settle_lock: Arc::new(Mutex::new(())),
        })
    }

    fn cf(&self) -> Result<&ColumnFamily> {
        self.db.cf_handle(CF_WITHDRAWALS).ok_or_else(missing_cf)
    }

    fn scan(&self, mode: IteratorMode) -> Result<Vec<(LedgerKey, WithdrawalRecord)>> {
        let cf = self.cf()?;
        let mut out = Vec::new();
        for item in self.db.iterator_cf(cf, mode) {
            let (key, value) = item?;
            let record: WithdrawalRecord = serde_json::from_slice(&value)?;
            out.push((decode_key(&key)?, record));
        }
        Ok(out)
    }
}

fn missing_cf() -> PayoutError {
    PayoutError::InternalInconsistency("withdrawals column family not found".to_string())
}

fn decode_key(bytes: &[u8]) -> Result<LedgerKey> {
    let raw: [u8; 8] = bytes.try_into().map_err(|_| {
        PayoutError::InternalInconsistency(format!("malformed ledger key of {} bytes", bytes.len()))
    })?;
    Ok(LedgerKey(u64::from_be_bytes(raw)))
}

#[async_trait]
impl WithdrawalLedger for RocksDbLedger {
    async fn append(&self, record: WithdrawalRecord) -> Result<LedgerKey> {
        let cf = self.cf()?;
        let key = LedgerKey(self.next_key.fetch_add(1, Ordering::SeqCst));
        let value = serde_json::to_vec(&record)?;
        self.db.put_cf(cf, key.0.to_be_bytes(), value)?;
        Ok(key)
    }

    async fn unsettled(&self) -> Result<Vec<(LedgerKey, WithdrawalRecord)>> {
        Ok(self
            .scan(IteratorMode::Start)?
            .into_iter()
            .filter(|(_, r)| !r.settled)
            .collect())
    }

    async fn settle(&self, key: LedgerKey, reference: &str) -> Result<()> {
        let _guard = self.settle_lock.lock().await;
        let cf = self.cf()?;
        let bytes = self.db.get_cf(cf, key.0.to_be_bytes())?.ok_or_else(|| {
            PayoutError::InternalInconsistency(format!("no withdrawal at ledger key {}", key.0))
        })?;

        let mut record: WithdrawalRecord = serde_json::from_slice(&bytes)?;
        record.settle(reference)?;
        self.db
            .put_cf(cf, key.0.to_be_bytes(), serde_json::to_vec(&record)?)?;
        Ok(())
    }

    async fn snapshot(&self) -> Result<Vec<WithdrawalRecord>> {
        Ok(self
            .scan(IteratorMode::End)?
            .into_iter()
            .map(|(_, r)| r)
            .collect())
    }
}
