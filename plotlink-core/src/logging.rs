//! Subscriber setup for hosts that do not install their own.
//!
//! The driver only emits `tracing` events. Device diagnostics use the
//! `plotlink::device` target so they can be filtered separately, e.g.
//! `RUST_LOG=info,plotlink::device=off`.

use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;
use crate::error::PlotError;

/// Install a global `fmt` subscriber.
///
/// `RUST_LOG` wins over `config.level` when set. Fails if a global
/// subscriber is already installed.
pub fn init(config: &LoggingConfig) -> Result<(), PlotError> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .map_err(|e| PlotError::Other(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_init_fails() {
        let cfg = LoggingConfig::default();
        // Another test may have won the race; either way the second call fails.
        let _ = init(&cfg);
        assert!(init(&cfg).is_err());
    }
}
