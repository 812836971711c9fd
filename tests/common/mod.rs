#![allow(dead_code)]

use async_trait::async_trait;
use payouts::application::controller::WithdrawalController;
use payouts::application::gateway_call::GatewayCaller;
use payouts::application::notice_board::NoticeBoard;
use payouts::application::sweeper::RetrySweeper;
use payouts::domain::amount::Amount;
use payouts::domain::ports::{GatewayRef, PayoutGateway};
use payouts::error::{PayoutError, Result};
use payouts::infrastructure::in_memory::InMemoryLedger;
use rust_decimal_macros::dec;
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Fake payout provider that follows a script of outcomes, then falls back to
/// a default. Records every recipient and key it was asked to pay.
pub struct ScriptedGateway {
    script: Mutex<VecDeque<bool>>,
    default_succeeds: bool,
    calls: AtomicUsize,
    recipients: Mutex<Vec<String>>,
    keys: Mutex<Vec<String>>,
}

impl ScriptedGateway {
    pub fn always(succeed: bool) -> Arc<Self> {
        Self::scripted(&[], succeed)
    }

    pub fn scripted(outcomes: &[bool], then: bool) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(outcomes.iter().copied().collect()),
            default_succeeds: then,
            calls: AtomicUsize::new(0),
            recipients: Mutex::new(Vec::new()),
            keys: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn recipients(&self) -> Vec<String> {
        self.recipients.lock().unwrap().clone()
    }

    pub fn keys(&self) -> Vec<String> {
        self.keys.lock().unwrap().clone()
    }
}

#[async_trait]
impl PayoutGateway for ScriptedGateway {
    async fn disburse(&self, key: &str, recipient: &str, _amount: Amount) -> Result<String> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        self.recipients.lock().unwrap().push(recipient.to_string());
        self.keys.lock().unwrap().push(key.to_string());
        let succeed = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(self.default_succeeds);
        if succeed {
            Ok(format!("PAYPAL-BATCH-{n}"))
        } else {
            Err(PayoutError::PayoutAttemptFailed("provider unavailable".into()))
        }
    }
}

/// Controller, sweeper and the state they share, wired like `main` does.
pub struct Harness {
    pub ledger: InMemoryLedger,
    pub notice: Arc<NoticeBoard>,
    pub controller: Arc<WithdrawalController>,
    pub sweeper: Arc<RetrySweeper>,
}

pub fn harness(gateway: GatewayRef) -> Harness {
    let ledger = InMemoryLedger::new();
    let notice = Arc::new(NoticeBoard::new());
    let caller = GatewayCaller::new(gateway, Duration::from_secs(2));

    let controller = Arc::new(WithdrawalController::new(
        Arc::new(ledger.clone()),
        caller.clone(),
        Arc::clone(&notice),
        dec!(1.00),
    ));
    let sweeper = Arc::new(RetrySweeper::new(
        Arc::new(ledger.clone()),
        caller,
        Arc::clone(&notice),
    ));

    Harness {
        ledger,
        notice,
        controller,
        sweeper,
    }
}
