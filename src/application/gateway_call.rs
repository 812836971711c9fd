use crate::domain::amount::Amount;
use crate::domain::ports::GatewayRef;
use std::time::Duration;
use tracing::warn;

/// Result of one bounded disbursement attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    Settled { reference: String },
    Failed { reason: String },
}

/// The only path through which the controller and the sweeper reach the
/// payout provider.
///
/// Every call is bounded by `timeout`. Errors and timeouts both come back as
/// [`AttemptOutcome::Failed`]; nothing here propagates.
#[derive(Clone)]
pub struct GatewayCaller {
    gateway: GatewayRef,
    timeout: Duration,
}

impl GatewayCaller {
    pub fn new(gateway: GatewayRef, timeout: Duration) -> Self {
        Self { gateway, timeout }
    }

    /// Attempts one payout. `key` is the withdrawal's placeholder id, reused
    /// on every retry of the same withdrawal.
    pub async fn attempt(&self, key: &str, recipient: &str, amount: Amount) -> AttemptOutcome {
        let call = self.gateway.disburse(key, recipient, amount);
        match tokio::time::timeout(self.timeout, call).await {
            Ok(Ok(reference)) => AttemptOutcome::Settled { reference },
            Ok(Err(e)) => {
                warn!(%key, %recipient, %amount, error = %e, "payout attempt failed");
                AttemptOutcome::Failed {
                    reason: e.to_string(),
                }
            }
            Err(_) => {
                warn!(%key, %recipient, %amount, timeout = ?self.timeout, "payout attempt timed out");
                AttemptOutcome::Failed {
                    reason: format!("timed out after {:?}", self.timeout),
                }
            }
        }
    }
}
