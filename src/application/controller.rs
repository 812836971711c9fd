use super::gateway_call::{AttemptOutcome, GatewayCaller};
use super::notice_board::NoticeBoard;
use crate::domain::amount::Amount;
use crate::domain::ids::{IdGenerator, PLACEHOLDER_PREFIX};
use crate::domain::notice::SystemNotice;
use crate::domain::ports::LedgerRef;
use crate::domain::withdrawal::WithdrawalRecord;
use crate::error::{PayoutError, Result};
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{info, warn};

pub const SETTLED_MESSAGE: &str = "Withdrawal sent. The payment is on its way.";
pub const PENDING_MESSAGE: &str = "The payout provider is busy right now. Your withdrawal \
     has been queued and will be retried automatically, please wait.";

/// What the submitter is told about their withdrawal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitReceipt {
    pub settled: bool,
    /// Provider reference when settled, placeholder otherwise.
    pub reference: String,
    pub message: String,
}

/// Drives one withdrawal through validation, a single payout attempt and its
/// ledger entry.
///
/// A failed payout is an expected outcome: it is recorded as unsettled, the
/// notice turns degraded, and the retry sweeper takes it from there. A success
/// never restores the notice; only a sweep has the aggregate view to do that.
pub struct WithdrawalController {
    ledger: LedgerRef,
    gateway: GatewayCaller,
    notice: Arc<NoticeBoard>,
    minimum: Decimal,
    placeholders: IdGenerator,
}

impl WithdrawalController {
    /// Creates a new `WithdrawalController`.
    ///
    /// # Arguments
    ///
    /// * `ledger` - Where every accepted withdrawal is recorded.
    /// * `gateway` - The bounded payout call shared with the sweeper.
    /// * `notice` - The process-wide notice board.
    /// * `minimum` - Smallest accepted withdrawal amount.
    pub fn new(
        ledger: LedgerRef,
        gateway: GatewayCaller,
        notice: Arc<NoticeBoard>,
        minimum: Decimal,
    ) -> Self {
        Self {
            ledger,
            gateway,
            notice,
            minimum,
            placeholders: IdGenerator::new(PLACEHOLDER_PREFIX),
        }
    }

    pub fn minimum(&self) -> Decimal {
        self.minimum
    }

    /// Submits a withdrawal.
    ///
    /// Only `InvalidRequest` (and ledger storage failures) come back as errors;
    /// a declined or timed-out payout is reported through the receipt.
    pub async fn submit(&self, recipient: &str, amount: Decimal) -> Result<SubmitReceipt> {
        let recipient = recipient.trim();
        if recipient.is_empty() {
            return Err(PayoutError::InvalidRequest(
                "recipient is required".to_string(),
            ));
        }
        if amount < self.minimum {
            return Err(PayoutError::InvalidRequest(format!(
                "minimum withdrawal is {}",
                self.minimum
            )));
        }
        let amount = Amount::new(amount)?;

        // Names the withdrawal for the provider on this and every later attempt,
        // and becomes its ledger id if this attempt fails.
        let placeholder = self.placeholders.next_id();
        info!(%recipient, %amount, %placeholder, "processing withdrawal");

        match self.gateway.attempt(&placeholder, recipient, amount).await {
            AttemptOutcome::Settled { reference } => {
                let record = WithdrawalRecord::settled(recipient, amount, reference.clone());
                self.ledger.append(record).await?;
                info!(%recipient, %amount, %reference, "withdrawal settled");

                Ok(SubmitReceipt {
                    settled: true,
                    reference,
                    message: SETTLED_MESSAGE.to_string(),
                })
            }
            AttemptOutcome::Failed { reason } => {
                let record = WithdrawalRecord::pending(recipient, amount, placeholder.clone());
                self.ledger.append(record).await?;
                self.notice.publish(SystemNotice::degraded());
                warn!(%recipient, %amount, %placeholder, %reason, "withdrawal queued for retry");

                Ok(SubmitReceipt {
                    settled: false,
                    reference: placeholder,
                    message: PENDING_MESSAGE.to_string(),
                })
            }
        }
    }
}
