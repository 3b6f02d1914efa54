//! Async driver over any byte stream (serial port, socket, pipe).
//!
//! [`AsyncLink`] runs the same ack protocol as [`Plotter`](crate::Plotter)
//! but awaits device output instead of polling, and enforces the ack
//! deadline with `tokio::time::timeout`.

use std::time::Duration;

use futures::{SinkExt, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_util::codec::Framed;
use tracing::{debug, info};

use crate::codec::PlotterCodec;
use crate::config::DriverConfig;
use crate::encoder::Command;
use crate::error::PlotError;
use crate::instruction::Instruction;
use crate::message::DeviceMessage;
use crate::queue::InstructionQueue;
use crate::router::{RouteOutcome, Router};
use crate::state::LinkState;
use crate::transform::Transform;

/// Summary of a completed [`AsyncLink::run`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LinkReport {
    pub sent: usize,
    pub acks: usize,
    pub diagnostics: usize,
    pub ignored: usize,
}

pub struct AsyncLink<S> {
    framed: Framed<S, PlotterCodec>,
    router: Router,
    link: LinkState,
    transform: Transform,
    prime: bool,
}

impl<S> AsyncLink<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S) -> Self {
        Self::with_config(stream, &DriverConfig::default())
    }

    pub fn with_config(stream: S, config: &DriverConfig) -> Self {
        Self {
            framed: Framed::new(
                stream,
                PlotterCodec::with_max_line_length(config.link.max_line_length),
            ),
            router: Router::with_ack_deadline(config.link.ack_timeout()),
            link: LinkState::default(),
            transform: config.transform,
            prime: false,
        }
    }

    /// Send the first instruction immediately instead of waiting for the
    /// device's boot `OK`.
    pub fn priming(mut self, prime: bool) -> Self {
        self.prime = prime;
        self
    }

    pub fn set_transform(&mut self, transform: Transform) {
        self.transform = transform;
    }

    pub fn transform(&self) -> Transform {
        self.transform
    }

    pub fn link_state(&self) -> &LinkState {
        &self.link
    }

    /// Stream `instructions` to the device, one per ack.
    ///
    /// Returns once every instruction has been sent and acknowledged.
    /// Fails if the device closes the stream or misses an ack deadline.
    pub async fn run(
        &mut self,
        instructions: impl Into<Vec<Instruction>>,
    ) -> Result<LinkReport, PlotError> {
        let mut queue = InstructionQueue::new(instructions);
        let mut report = LinkReport::default();
        self.link.reset();
        info!(count = queue.len(), "streaming instructions");

        if self.prime {
            if let Some((index, instruction)) = queue.advance() {
                self.link.begin_send(index, self.router.ack_deadline())?;
                self.send(&instruction, Some(index)).await?;
                report.sent += 1;
            }
        }

        while !(queue.is_exhausted() && self.link.is_idle()) {
            let message = self.next_message().await?;
            match &message {
                DeviceMessage::Ack => report.acks += 1,
                DeviceMessage::Diagnostic(_) => report.diagnostics += 1,
                DeviceMessage::Empty | DeviceMessage::Unrecognized(_) => report.ignored += 1,
            }

            if let RouteOutcome::Release { index, instruction } =
                self.router.route(&message, Some(&mut queue), &mut self.link)
            {
                self.send(&instruction, Some(index)).await?;
                report.sent += 1;
            }
        }

        info!(sent = report.sent, "instructions complete");
        Ok(report)
    }

    /// Write `instruction` now, outside any queue.
    pub async fn send_direct(&mut self, instruction: &Instruction) -> Result<(), PlotError> {
        self.send(instruction, None).await
    }

    /// Next classified line from the device, honouring the ack deadline.
    pub async fn next_message(&mut self) -> Result<DeviceMessage, PlotError> {
        let next = match self.remaining_deadline() {
            Some((index, remaining)) => {
                match tokio::time::timeout(remaining, self.framed.next()).await {
                    Ok(next) => next,
                    Err(_) => {
                        return Err(PlotError::AckTimeout {
                            index,
                            waited: self.link.elapsed().unwrap_or(remaining),
                        });
                    }
                }
            }
            None => self.framed.next().await,
        };
        next.unwrap_or(Err(PlotError::LinkClosed))
    }

    pub fn into_inner(self) -> S {
        self.framed.into_inner()
    }

    // ── Internal ─────────────────────────────────────────────────

    fn remaining_deadline(&self) -> Option<(usize, Duration)> {
        match self.link {
            LinkState::AwaitingAck {
                index,
                sent_at,
                deadline: Some(d),
            } => Some((index, d.saturating_sub(sent_at.elapsed()))),
            _ => None,
        }
    }

    async fn send(
        &mut self,
        instruction: &Instruction,
        index: Option<usize>,
    ) -> Result<(), PlotError> {
        let command = Command::from_instruction(instruction, &self.transform);
        debug!(?index, %command, "sending");
        self.framed.send(command).await
    }
}
