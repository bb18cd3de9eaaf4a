//! Logging setup

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

const DEFAULT_FILTER: &str = "ramais_cli=info,ramais_client=info";

/// Initialize tracing on stderr
///
/// `RUST_LOG` wins over the default filter. With `json` set, events are
/// emitted as one JSON object per line.
pub fn init_logger(json: bool) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let registry = tracing_subscriber::registry().with(env_filter);

    if json {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .init();
    }
}

/// `RAMAIS_LOG_JSON` as a flag: `1`, `true` or `yes`
pub fn json_from_env() -> bool {
    std::env::var("RAMAIS_LOG_JSON")
        .map(|v| matches!(v.trim().to_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}
