//! # plotlink-sim
//!
//! A software stand-in for plotter firmware, for exercising hosts without
//! hardware.
//!
//! - **Sync**: `SimulatedPlotter` implements `plotlink_core::Transport`, so a
//!   `Plotter<SimulatedPlotter>` talks to it directly.
//! - **Async**: `SimulatedPlotter::serve` answers over any tokio stream,
//!   e.g. one half of `tokio::io::duplex`, with `AsyncLink` on the other.

pub mod codec;
pub mod device;

pub use codec::DeviceCodec;
pub use device::{LineEnding, Segment, SimulatedPlotter};
