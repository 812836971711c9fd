use clap::Parser;
use miette::{IntoDiagnostic, Result};
use payouts::application::controller::WithdrawalController;
use payouts::application::gateway_call::GatewayCaller;
use payouts::application::notice_board::NoticeBoard;
use payouts::application::scheduler::spawn_sweeps;
use payouts::application::sweeper::RetrySweeper;
use payouts::config::Config;
use payouts::domain::ports::{GatewayRef, LedgerRef};
use payouts::infrastructure::in_memory::InMemoryLedger;
use payouts::infrastructure::paypal::PayPalGateway;
use payouts::infrastructure::simulated::SimulatedGateway;
use payouts::interfaces::http::{AppState, router};
use payouts::logging::init_logging;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{info, warn};

fn open_ledger(config: &Config) -> Result<LedgerRef> {
    let Some(db_path) = config.db_path.as_ref() else {
        return Ok(Arc::new(InMemoryLedger::new()));
    };

    #[cfg(feature = "storage-rocksdb")]
    {
        use payouts::infrastructure::rocksdb::RocksDbLedger;
        info!(path = %db_path.display(), "using RocksDB ledger");
        let ledger = RocksDbLedger::open(db_path).into_diagnostic()?;
        Ok(Arc::new(ledger))
    }

    #[cfg(not(feature = "storage-rocksdb"))]
    {
        warn!(
            path = %db_path.display(),
            "persistent storage requested via --db-path, but the 'storage-rocksdb' feature \
             is not enabled; falling back to in-memory ledger"
        );
        Ok(Arc::new(InMemoryLedger::new()))
    }
}

fn build_gateway(config: &Config) -> Result<GatewayRef> {
    match config.paypal_credentials() {
        Some(credentials) => {
            info!(environment = ?config.paypal_environment, "paying out through PayPal");
            let gateway = PayPalGateway::new(
                config.paypal_environment.base_url(),
                credentials,
                config.currency.clone(),
            )
            .into_diagnostic()?;
            Ok(Arc::new(gateway))
        }
        None => {
            warn!("SIMULATION MODE: PayPal credentials not found, payouts are simulated");
            Ok(Arc::new(SimulatedGateway::new(config.simulated_delay())))
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::parse();
    config.validate().into_diagnostic()?;
    init_logging(&config);

    let ledger = open_ledger(&config)?;
    let gateway = GatewayCaller::new(build_gateway(&config)?, config.gateway_timeout());
    let notice = Arc::new(NoticeBoard::new());

    let controller = Arc::new(WithdrawalController::new(
        Arc::clone(&ledger),
        gateway.clone(),
        Arc::clone(&notice),
        config.min_withdrawal,
    ));
    let sweeper = Arc::new(RetrySweeper::new(
        Arc::clone(&ledger),
        gateway,
        Arc::clone(&notice),
    ));

    let (stop_sweeps, shutdown) = watch::channel(false);
    let sweeps = spawn_sweeps(sweeper, config.sweep_interval(), shutdown);

    if config.admin_secret.is_none() {
        warn!("ADMIN_SECRET not set, admin endpoints are disabled");
    }
    let app = router(Arc::new(AppState {
        controller,
        ledger,
        notice,
        admin_secret: config.admin_secret.clone(),
    }));

    let addr = config.listen_addr().into_diagnostic()?;
    let listener = tokio::net::TcpListener::bind(addr).await.into_diagnostic()?;
    info!(
        %addr,
        simulation = config.simulation_mode(),
        min_withdrawal = %config.min_withdrawal,
        "payout server listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutdown requested");
        })
        .await
        .into_diagnostic()?;

    // An in-flight sweep finishes before the scheduler exits.
    let _ = stop_sweeps.send(true);
    sweeps.await.into_diagnostic()?;

    Ok(())
}
