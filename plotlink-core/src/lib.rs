//! # plotlink-core
//!
//! Host-side driver for pen plotters that speak a line-based
//! request/acknowledge protocol over a serial link.
//!
//! The host sends one command (`M x y\r` or `L x y\r`) and waits for the
//! firmware to answer `OK` before sending the next. Lines starting with `#`
//! are firmware diagnostics; anything else is ignored.
//!
//! This crate contains:
//! - **Framing**: `LineFramer` turns the device byte stream into lines
//! - **Messages**: `DeviceMessage` classifies each line
//! - **Encoding**: `Transform` + `render` map instructions to wire commands
//! - **Protocol**: `InstructionQueue`, `LinkState` and `Router` implement the
//!   single-outstanding-command flow
//! - **Drivers**: `Plotter` for cooperative polling over a `Transport`,
//!   `AsyncLink` for tokio streams via `PlotterCodec`
//! - **Config / logging**: TOML `DriverConfig`, `tracing` subscriber setup
//! - **Error**: `PlotError`, a `thiserror`-based error hierarchy

pub mod codec;
pub mod config;
pub mod driver;
pub mod encoder;
pub mod error;
pub mod framer;
pub mod instruction;
pub mod link;
pub mod logging;
pub mod message;
pub mod queue;
pub mod router;
pub mod state;
pub mod transform;
pub mod transport;

// ── Re-exports for ergonomic usage ───────────────────────────────

pub use codec::PlotterCodec;
pub use config::{DriverConfig, LinkConfig, LoggingConfig};
pub use driver::{Plotter, PollReport};
pub use encoder::{Command, parse_command, render};
pub use error::PlotError;
pub use framer::LineFramer;
pub use instruction::{Instruction, InstructionKind};
pub use link::{AsyncLink, LinkReport};
pub use message::{ACK_TOKEN, DeviceMessage};
pub use queue::InstructionQueue;
pub use router::{RouteOutcome, Router};
pub use state::LinkState;
pub use transform::Transform;
pub use transport::{MemoryTransport, Transport};
