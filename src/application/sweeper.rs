use super::gateway_call::{AttemptOutcome, GatewayCaller};
use super::notice_board::NoticeBoard;
use crate::domain::notice::SystemNotice;
use crate::domain::ports::LedgerRef;
use crate::error::Result;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error, info};

/// Aggregate of one sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepOutcome {
    pub any_settled: bool,
    pub any_still_pending: bool,
    /// Gateway calls made during the sweep.
    pub attempted: usize,
    pub settled: usize,
}

/// Retries every unsettled withdrawal.
///
/// The sweeper has no timer of its own; a scheduler calls [`RetrySweeper::tick`]
/// (or a test calls [`RetrySweeper::run_once`]) whenever a sweep is due. Sweeps
/// never overlap.
pub struct RetrySweeper {
    ledger: LedgerRef,
    gateway: GatewayCaller,
    notice: Arc<NoticeBoard>,
    running: Mutex<()>,
}

impl RetrySweeper {
    pub fn new(ledger: LedgerRef, gateway: GatewayCaller, notice: Arc<NoticeBoard>) -> Self {
        Self {
            ledger,
            gateway,
            notice,
            running: Mutex::new(()),
        }
    }

    /// Runs a sweep, waiting for any sweep already in flight to finish first.
    pub async fn run_once(&self) -> Result<SweepOutcome> {
        let _running = self.running.lock().await;
        self.sweep().await
    }

    /// Runs a sweep unless one is already in flight, in which case the tick is
    /// dropped and `None` is returned.
    pub async fn tick(&self) -> Result<Option<SweepOutcome>> {
        let Ok(_running) = self.running.try_lock() else {
            debug!("sweep already in progress, skipping tick");
            return Ok(None);
        };
        self.sweep().await.map(Some)
    }

    async fn sweep(&self) -> Result<SweepOutcome> {
        let pending = self.ledger.unsettled().await?;
        let mut outcome = SweepOutcome::default();
        if pending.is_empty() {
            debug!("no unsettled withdrawals");
            return Ok(outcome);
        }

        info!(count = pending.len(), "retrying unsettled withdrawals");

        for (key, record) in pending {
            outcome.attempted += 1;
            match self
                .gateway
                .attempt(&record.id, &record.recipient, record.amount)
                .await
            {
                AttemptOutcome::Settled { reference } => {
                    match self.ledger.settle(key, &reference).await {
                        Ok(()) => {
                            info!(
                                placeholder = %record.id,
                                %reference,
                                recipient = %record.recipient,
                                "withdrawal settled on retry"
                            );
                            outcome.any_settled = true;
                            outcome.settled += 1;
                        }
                        Err(e) => {
                            // The provider paid but the ledger could not record it.
                            error!(
                                placeholder = %record.id,
                                %reference,
                                error = %e,
                                "failed to record settlement"
                            );
                            outcome.any_still_pending = true;
                        }
                    }
                }
                AttemptOutcome::Failed { .. } => {
                    outcome.any_still_pending = true;
                }
            }
        }

        if outcome.any_settled {
            self.notice.publish(SystemNotice::operational());
        } else if outcome.any_still_pending {
            self.notice.publish(SystemNotice::degraded());
        }

        info!(
            attempted = outcome.attempted,
            settled = outcome.settled,
            "sweep finished"
        );
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::amount::Amount;
    use crate::domain::notice::Severity;
    use crate::domain::ports::{PayoutGateway, WithdrawalLedger};
    use crate::domain::withdrawal::WithdrawalRecord;
    use crate::error::PayoutError;
    use crate::infrastructure::in_memory::InMemoryLedger;
    use async_trait::async_trait;
    use rust_decimal_macros::dec;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Pays recipients whose address starts with "ok".
    struct ByRecipient {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl PayoutGateway for ByRecipient {
        async fn disburse(&self, _key: &str, recipient: &str, _amount: Amount) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if recipient.starts_with("ok") {
                Ok(format!("BATCH-{recipient}"))
            } else {
                Err(PayoutError::PayoutAttemptFailed("declined".into()))
            }
        }
    }

    fn sweeper() -> (RetrySweeper, Arc<ByRecipient>, Arc<NoticeBoard>, InMemoryLedger) {
        let gateway = Arc::new(ByRecipient {
            calls: AtomicUsize::new(0),
        });
        let ledger = InMemoryLedger::new();
        let notice = Arc::new(NoticeBoard::new());
        let sweeper = RetrySweeper::new(
            Arc::new(ledger.clone()),
            GatewayCaller::new(gateway.clone(), Duration::from_secs(1)),
            Arc::clone(&notice),
        );
        (sweeper, gateway, notice, ledger)
    }

    async fn add_pending(ledger: &InMemoryLedger, recipient: &str, n: u32) {
        ledger
            .append(WithdrawalRecord::pending(
                recipient,
                Amount::new(dec!(2)).unwrap(),
                format!("PENDING_0_{n}"),
            ))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_empty_ledger_leaves_notice_untouched() {
        let (sweeper, gateway, notice, _) = sweeper();
        notice.write("Maintenance tonight", Severity::Info);

        let outcome = sweeper.run_once().await.unwrap();
        assert!(!outcome.any_settled);
        assert!(!outcome.any_still_pending);
        assert_eq!(gateway.calls.load(Ordering::SeqCst), 0);
        assert_eq!(notice.read().severity, Severity::Info);
    }

    #[tokio::test]
    async fn test_mixed_sweep_restores_ok() {
        let (sweeper, _, notice, ledger) = sweeper();
        notice.publish(SystemNotice::degraded());
        add_pending(&ledger, "ok-a@x.com", 1).await;
        add_pending(&ledger, "bad@x.com", 2).await;

        let outcome = sweeper.run_once().await.unwrap();
        assert!(outcome.any_settled);
        assert!(outcome.any_still_pending);
        assert_eq!(notice.read().severity, Severity::Ok);
    }

    #[tokio::test]
    async fn test_all_failing_sweep_degrades() {
        let (sweeper, _, notice, ledger) = sweeper();
        add_pending(&ledger, "bad@x.com", 1).await;

        let outcome = sweeper.run_once().await.unwrap();
        assert!(!outcome.any_settled);
        assert!(outcome.any_still_pending);
        assert_eq!(notice.read().severity, Severity::Degraded);
    }

    #[tokio::test]
    async fn test_settled_records_are_not_retried() {
        let (sweeper, gateway, _, ledger) = sweeper();
        add_pending(&ledger, "ok-a@x.com", 1).await;
        add_pending(&ledger, "bad@x.com", 2).await;

        sweeper.run_once().await.unwrap();
        assert_eq!(gateway.calls.load(Ordering::SeqCst), 2);

        // Second sweep only sees the one still pending.
        let outcome = sweeper.run_once().await.unwrap();
        assert_eq!(outcome.attempted, 1);
        assert_eq!(gateway.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_failure_does_not_abort_sweep() {
        let (sweeper, _, _, ledger) = sweeper();
        add_pending(&ledger, "bad@x.com", 1).await;
        add_pending(&ledger, "ok-b@x.com", 2).await;

        let outcome = sweeper.run_once().await.unwrap();
        assert_eq!(outcome.attempted, 2);
        assert_eq!(outcome.settled, 1);

        let records = ledger.snapshot().await.unwrap();
        assert_eq!(records[0].id, "BATCH-ok-b@x.com");
        assert!(records[0].settled);
        assert!(!records[1].settled);
    }
}
