use crate::error::{PayoutError, Result};
use crate::infrastructure::paypal::{LIVE_BASE_URL, PayPalCredentials, SANDBOX_BASE_URL};
use clap::{Parser, ValueEnum};
use rust_decimal::Decimal;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PayPalEnvironment {
    Sandbox,
    Live,
}

impl PayPalEnvironment {
    pub fn base_url(self) -> &'static str {
        match self {
            PayPalEnvironment::Sandbox => SANDBOX_BASE_URL,
            PayPalEnvironment::Live => LIVE_BASE_URL,
        }
    }
}

/// Withdrawal payout service.
///
/// Every flag can also be set through the environment variable shown in `--help`.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Address to bind the HTTP server to
    #[arg(long, env = "BIND_ADDR", default_value = "0.0.0.0")]
    pub bind: String,

    /// Port to listen on
    #[arg(long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    /// PayPal REST client id. Without it payouts are simulated.
    #[arg(long, env = "PAYPAL_CLIENT_ID")]
    pub paypal_client_id: Option<String>,

    /// PayPal REST secret. Without it payouts are simulated.
    #[arg(long, env = "PAYPAL_SECRET", hide_env_values = true)]
    pub paypal_secret: Option<String>,

    /// Which PayPal environment to pay out from
    #[arg(long, env = "PAYPAL_ENVIRONMENT", value_enum, default_value_t = PayPalEnvironment::Sandbox)]
    pub paypal_environment: PayPalEnvironment,

    /// Currency every withdrawal is paid in
    #[arg(long, env = "PAYOUT_CURRENCY", default_value = "EUR")]
    pub currency: String,

    /// Smallest accepted withdrawal
    #[arg(long, env = "MIN_WITHDRAWAL", default_value = "1.00")]
    pub min_withdrawal: Decimal,

    /// Seconds between retry sweeps over unsettled withdrawals
    #[arg(long, env = "SWEEP_INTERVAL_SECS", default_value_t = 600)]
    pub sweep_interval_secs: u64,

    /// Upper bound in seconds for a single payout attempt
    #[arg(long, env = "GATEWAY_TIMEOUT_SECS", default_value_t = 30)]
    pub gateway_timeout_secs: u64,

    /// Simulated provider round trip in milliseconds
    #[arg(long, env = "SIMULATED_DELAY_MS", default_value_t = 1500)]
    pub simulated_delay_ms: u64,

    /// Shared secret for the admin endpoints. Admin endpoints are disabled without it.
    #[arg(long, env = "ADMIN_SECRET", hide_env_values = true)]
    pub admin_secret: Option<String>,

    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long)]
    pub db_path: Option<PathBuf>,

    /// Default log filter, overridden by RUST_LOG
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Emit logs as JSON lines
    #[arg(long, env = "LOG_JSON")]
    pub log_json: bool,
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        if self.min_withdrawal <= Decimal::ZERO {
            return Err(PayoutError::Config(
                "minimum withdrawal must be positive".to_string(),
            ));
        }
        if self.sweep_interval_secs == 0 {
            return Err(PayoutError::Config(
                "sweep interval must be at least one second".to_string(),
            ));
        }
        if self.gateway_timeout_secs == 0 {
            return Err(PayoutError::Config(
                "gateway timeout must be at least one second".to_string(),
            ));
        }
        if self.currency.trim().is_empty() {
            return Err(PayoutError::Config("currency must not be empty".to_string()));
        }
        if self.paypal_client_id.is_some() != self.paypal_secret.is_some() {
            return Err(PayoutError::Config(
                "PAYPAL_CLIENT_ID and PAYPAL_SECRET must be set together".to_string(),
            ));
        }
        Ok(())
    }

    /// Provider credentials, or `None` when payouts should be simulated.
    pub fn paypal_credentials(&self) -> Option<PayPalCredentials> {
        match (&self.paypal_client_id, &self.paypal_secret) {
            (Some(client_id), Some(secret)) if !client_id.is_empty() && !secret.is_empty() => {
                Some(PayPalCredentials {
                    client_id: client_id.clone(),
                    secret: secret.clone(),
                })
            }
            _ => None,
        }
    }

    pub fn simulation_mode(&self) -> bool {
        self.paypal_credentials().is_none()
    }

    pub fn listen_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.bind, self.port)
            .parse()
            .map_err(|e| PayoutError::Config(format!("invalid bind address: {e}")))
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }

    pub fn gateway_timeout(&self) -> Duration {
        Duration::from_secs(self.gateway_timeout_secs)
    }

    pub fn simulated_delay(&self) -> Duration {
        Duration::from_millis(self.simulated_delay_ms)
    }
}
