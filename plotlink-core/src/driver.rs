//! Polling driver facade.
//!
//! [`Plotter`] ties the pieces together for hosts that run their own loop:
//! call [`Plotter::poll_transport`] once per tick and it drains whatever the
//! transport has buffered, frames it, routes each line and writes released
//! commands back. Nothing blocks and nothing in the loop returns an error;
//! failures are logged and counted in the returned [`PollReport`].

use std::time::Duration;

use tracing::{debug, error, info};

use crate::config::DriverConfig;
use crate::encoder::render;
use crate::error::PlotError;
use crate::framer::LineFramer;
use crate::instruction::Instruction;
use crate::message::DeviceMessage;
use crate::queue::InstructionQueue;
use crate::router::{RouteOutcome, Router};
use crate::state::LinkState;
use crate::transform::Transform;
use crate::transport::Transport;

/// Counters for one [`Plotter::poll_transport`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollReport {
    pub bytes_read: usize,
    pub messages: usize,
    pub diagnostics: usize,
    pub acks: usize,
    /// Commands released by acks and written successfully.
    pub sent: usize,
    /// Commands released by acks whose write failed.
    pub write_errors: usize,
    /// Device lines dropped for exceeding the configured length limit.
    pub discarded: usize,
}

/// Host-side driver for one plotter link.
///
/// Methods take `&mut self`; hosts that share a `Plotter` between threads
/// must serialise access (e.g. behind a `Mutex`) so acks and sends stay
/// strictly sequential.
#[derive(Debug)]
pub struct Plotter<T> {
    transport: Option<T>,
    framer: LineFramer,
    router: Router,
    queue: Option<InstructionQueue>,
    link: LinkState,
    transform: Transform,
}

impl<T: Transport> Plotter<T> {
    pub fn new(transport: T) -> Self {
        Self::with_config(Some(transport), &DriverConfig::default())
    }

    /// A driver with no transport: every operation is a no-op and
    /// [`is_finished`](Self::is_finished) is always `true`.
    pub fn detached() -> Self {
        Self::with_config(None, &DriverConfig::default())
    }

    pub fn with_config(transport: Option<T>, config: &DriverConfig) -> Self {
        Self {
            transport,
            framer: LineFramer::with_max_line_length(config.link.max_line_length),
            router: Router::with_ack_deadline(config.link.ack_timeout()),
            queue: None,
            link: LinkState::default(),
            transform: config.transform,
        }
    }

    // ── Transport ────────────────────────────────────────────────

    /// Attach a transport, returning the previous one.
    ///
    /// Partial input and any outstanding ack belong to the old link and are
    /// dropped.
    pub fn attach(&mut self, transport: T) -> Option<T> {
        self.reset_link();
        self.transport.replace(transport)
    }

    pub fn detach(&mut self) -> Option<T> {
        self.reset_link();
        self.transport.take()
    }

    pub fn transport(&self) -> Option<&T> {
        self.transport.as_ref()
    }

    pub fn transport_mut(&mut self) -> Option<&mut T> {
        self.transport.as_mut()
    }

    // ── Queue & transform ────────────────────────────────────────

    /// Replace the queue wholesale; the cursor restarts at zero.
    ///
    /// An ack still outstanding for the previous queue is forgotten; the
    /// device's next `OK` releases the first new instruction.
    pub fn set_instructions(&mut self, instructions: impl Into<Vec<Instruction>>) {
        let queue = InstructionQueue::new(instructions);
        info!(count = queue.len(), "instruction queue set");
        self.queue = Some(queue);
        self.link.reset();
    }

    pub fn queue(&self) -> Option<&InstructionQueue> {
        self.queue.as_ref()
    }

    /// Replace the transform. Applies to commands rendered from now on.
    pub fn set_transform(&mut self, translate_x: f64, translate_y: f64, scale: f64) {
        self.transform = Transform::new(translate_x, translate_y, scale);
    }

    /// Change only the translation.
    pub fn translate(&mut self, x: f64, y: f64) {
        self.transform.translate_x = x;
        self.transform.translate_y = y;
    }

    /// Change only the scale.
    pub fn set_scale(&mut self, scale: f64) {
        self.transform.scale = scale;
    }

    pub fn transform(&self) -> Transform {
        self.transform
    }

    // ── Status ───────────────────────────────────────────────────

    /// `true` with no transport, no queue, or every instruction handed out.
    ///
    /// The last command may still be awaiting its ack; see
    /// [`is_complete`](Self::is_complete).
    pub fn is_finished(&self) -> bool {
        if self.transport.is_none() {
            return true;
        }
        self.queue.as_ref().is_none_or(InstructionQueue::is_exhausted)
    }

    /// Finished and the device has acknowledged everything sent.
    pub fn is_complete(&self) -> bool {
        self.is_finished() && self.link.is_idle()
    }

    /// `(handed out, total)` for the current queue.
    pub fn progress(&self) -> Option<(usize, usize)> {
        self.queue.as_ref().map(|q| (q.cursor(), q.len()))
    }

    pub fn link_state(&self) -> &LinkState {
        &self.link
    }

    /// `Err(AckTimeout)` when the outstanding command is past the
    /// configured deadline. Without a deadline this always succeeds.
    pub fn check_ack_deadline(&self) -> Result<(), PlotError> {
        self.link.check_deadline()
    }

    pub fn ack_deadline(&self) -> Option<Duration> {
        self.router.ack_deadline()
    }

    // ── Protocol ─────────────────────────────────────────────────

    /// Drain the bytes buffered by the transport right now.
    ///
    /// Bytes arriving while this runs are left for the next call.
    pub fn poll_transport(&mut self) -> PollReport {
        let mut report = PollReport::default();
        let Some(transport) = self.transport.as_ref() else {
            return report;
        };

        let available = transport.bytes_available();
        let dropped_before = self.framer.dropped();
        for _ in 0..available {
            let Some(byte) = self.transport.as_mut().and_then(|t| t.read_byte()) else {
                break;
            };
            report.bytes_read += 1;
            if let Some(line) = self.framer.push(byte) {
                self.dispatch_line(line, &mut report);
            }
        }
        report.discarded = self.framer.dropped() - dropped_before;
        report
    }

    /// Send the first queued instruction without waiting for the device's
    /// boot `OK`.
    ///
    /// For firmware that does not announce itself. Returns `true` if a
    /// command was written. Does nothing unless the link is idle with work
    /// pending.
    pub fn prime(&mut self) -> bool {
        if self.transport.is_none() || !self.link.is_idle() {
            return false;
        }
        let Some((index, instruction)) = self.queue.as_mut().and_then(InstructionQueue::advance)
        else {
            return false;
        };
        if let Err(err) = self.link.begin_send(index, self.router.ack_deadline()) {
            error!(%err, "cannot prime link");
            return false;
        }
        match self.write(&instruction, Some(index)) {
            Ok(()) => true,
            Err(err) => {
                error!(%err, index, "failed to write command");
                false
            }
        }
    }

    /// Render and write `instruction` now, outside the queue.
    ///
    /// Does not touch the cursor or link state. Mixing this with queued
    /// sends can put two commands in flight; that is the caller's call.
    /// Failures are logged; use [`try_send_instruction`](Self::try_send_instruction)
    /// to observe them.
    pub fn send_instruction_directly(&mut self, instruction: &Instruction) {
        if self.transport.is_none() {
            return;
        }
        if let Err(err) = self.write(instruction, None) {
            error!(%err, %instruction, "failed to write direct command");
        }
    }

    /// Like [`send_instruction_directly`](Self::send_instruction_directly)
    /// but reports failures.
    pub fn try_send_instruction(&mut self, instruction: &Instruction) -> Result<(), PlotError> {
        self.write(instruction, None)
    }

    /// Drop partial input and forget any outstanding ack.
    pub fn reset_link(&mut self) {
        self.framer.reset();
        self.link.reset();
    }

    // ── Internal ─────────────────────────────────────────────────

    fn dispatch_line(&mut self, line: String, report: &mut PollReport) {
        report.messages += 1;
        let message = DeviceMessage::from(line);
        if message.is_ack() {
            report.acks += 1;
        }

        match self
            .router
            .route(&message, self.queue.as_mut(), &mut self.link)
        {
            RouteOutcome::Release { index, instruction } => {
                match self.write(&instruction, Some(index)) {
                    Ok(()) => report.sent += 1,
                    Err(err) => {
                        error!(%err, index, "failed to write command");
                        report.write_errors += 1;
                    }
                }
            }
            RouteOutcome::Diagnostic => report.diagnostics += 1,
            RouteOutcome::Ignored | RouteOutcome::NothingToSend => {}
        }
    }

    fn write(&mut self, instruction: &Instruction, index: Option<usize>) -> Result<(), PlotError> {
        let transport = self.transport.as_mut().ok_or(PlotError::Detached)?;
        let line = render(instruction, &self.transform);
        debug!(?index, command = line.trim_end(), "sending");
        transport.write_str(&line)?;
        Ok(())
    }
}
