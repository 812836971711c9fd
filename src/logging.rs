use crate::config::Config;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Installs the global subscriber. `RUST_LOG` takes precedence over `--log-level`.
pub fn init_logging(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.as_str()));

    let registry = tracing_subscriber::registry().with(filter);

    if config.log_json {
        registry
            .with(fmt::layer().json().with_target(true).with_ansi(false))
            .init();
    } else {
        registry.with(fmt::layer().with_target(false)).init();
    }
}
