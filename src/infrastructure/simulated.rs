use crate::domain::amount::Amount;
use crate::domain::ids::IdGenerator;
use crate::domain::ports::PayoutGateway;
use crate::error::Result;
use async_trait::async_trait;
use std::time::Duration;
use tracing::info;

/// Stand-in for the payout provider when no credentials are configured.
///
/// Every attempt succeeds with a synthetic `SIMULATED_BATCH_…` reference after
/// a fixed delay that mimics the provider's round trip.
#[derive(Debug)]
pub struct SimulatedGateway {
    delay: Duration,
    references: IdGenerator,
}

impl SimulatedGateway {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            references: IdGenerator::new("SIMULATED_BATCH"),
        }
    }
}

#[async_trait]
impl PayoutGateway for SimulatedGateway {
    async fn disburse(&self, key: &str, recipient: &str, amount: Amount) -> Result<String> {
        info!(%key, %recipient, %amount, "simulating payout");
        tokio::time::sleep(self.delay).await;
        Ok(self.references.next_id())
    }
}
