//! Domain-specific error types for the plotter link.
//!
//! The polling loop itself never returns errors: device chatter it does not
//! understand is logged and dropped. `PlotError` is the channel for the
//! operations that can meaningfully fail (deadlines, opcode parsing,
//! configuration, the async link).

use std::time::Duration;
use thiserror::Error;

/// The canonical error type for plotlink.
#[derive(Debug, Error)]
pub enum PlotError {
    // ── Protocol Errors ──────────────────────────────────────────
    /// An opcode character did not map to any instruction kind.
    #[error("unknown opcode {0:?}: expected 'M' or 'L'")]
    UnknownOpcode(char),

    /// A command line could not be parsed.
    #[error("malformed command {line:?}: {reason}")]
    MalformedCommand { line: String, reason: &'static str },

    /// A link state transition was attempted from the wrong state.
    #[error("protocol violation: {0}")]
    ProtocolViolation(&'static str),

    // ── Link Errors ──────────────────────────────────────────────
    /// The transport reported an I/O failure.
    #[error("transport error: {0}")]
    Transport(#[from] std::io::Error),

    /// No transport is attached to the driver.
    #[error("no transport attached")]
    Detached,

    /// The device did not acknowledge a command before its deadline.
    #[error("no acknowledgment for command #{index} after {waited:?}")]
    AckTimeout { index: usize, waited: Duration },

    /// The device closed the stream while a command was outstanding.
    #[error("link closed by device")]
    LinkClosed,

    // ── Configuration Errors ─────────────────────────────────────
    /// A configuration file could not be parsed.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Catch-all for errors that do not fit another variant.
    #[error("{0}")]
    Other(String),
}

// ── Convenient From implementations ──────────────────────────────

impl From<String> for PlotError {
    fn from(s: String) -> Self {
        PlotError::Other(s)
    }
}

impl From<&str> for PlotError {
    fn from(s: &str) -> Self {
        PlotError::Other(s.to_string())
    }
}

impl From<toml::de::Error> for PlotError {
    fn from(e: toml::de::Error) -> Self {
        PlotError::Config(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_messages() {
        let e = PlotError::UnknownOpcode('Z');
        assert!(e.to_string().contains("'Z'"));

        let e = PlotError::AckTimeout {
            index: 7,
            waited: Duration::from_millis(1500),
        };
        assert!(e.to_string().contains("#7"));
        assert!(e.to_string().contains("1.5s"));
    }

    #[test]
    fn from_string() {
        let e: PlotError = "something broke".into();
        assert!(matches!(e, PlotError::Other(_)));
    }

    #[test]
    fn from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe broke");
        let e: PlotError = io_err.into();
        assert!(matches!(e, PlotError::Transport(_)));
    }

    #[test]
    fn from_toml() {
        let err = toml::from_str::<toml::Value>("= nope").unwrap_err();
        let e: PlotError = err.into();
        assert!(matches!(e, PlotError::Config(_)));
    }
}
