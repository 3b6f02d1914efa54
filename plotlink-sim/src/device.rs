//! Simulated plotter firmware.
//!
//! Executes `M`/`L` commands against a virtual pen, records every segment
//! drawn, and answers each command with `OK`. Malformed commands get a `#`
//! diagnostic followed by `OK` so the host keeps streaming.

use std::collections::VecDeque;
use std::io;

use futures::{SinkExt, StreamExt};
use plotlink_core::{Command, InstructionKind, Transport, parse_command};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_util::codec::Framed;
use tracing::{debug, warn};

use crate::codec::DeviceCodec;

/// Reply terminator the firmware uses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LineEnding {
    #[default]
    Lf,
    CrLf,
}

impl LineEnding {
    pub fn as_str(self) -> &'static str {
        match self {
            LineEnding::Lf => "\n",
            LineEnding::CrLf => "\r\n",
        }
    }
}

/// A pen-down stroke between two device points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    pub from: (i64, i64),
    pub to: (i64, i64),
}

#[derive(Debug)]
pub struct SimulatedPlotter {
    ending: LineEnding,
    /// Stop answering `OK`, as a stalled device would.
    acking: bool,
    pen: (i64, i64),
    executed: Vec<Command>,
    segments: Vec<Segment>,
    rejected: usize,
    /// Partial command from the host (sync transport path).
    inbound: String,
    /// Reply bytes not yet read by the host.
    outbound: VecDeque<u8>,
}

impl SimulatedPlotter {
    pub fn new() -> Self {
        Self::with_line_ending(LineEnding::default())
    }

    pub fn with_line_ending(ending: LineEnding) -> Self {
        Self {
            ending,
            acking: true,
            pen: (0, 0),
            executed: Vec::new(),
            segments: Vec::new(),
            rejected: 0,
            inbound: String::new(),
            outbound: VecDeque::new(),
        }
    }

    /// Replies the firmware prints at power-on: a banner and the first `OK`.
    pub fn boot_replies(&self) -> Vec<String> {
        vec![
            format!("# plotlink-sim {}", env!("CARGO_PKG_VERSION")),
            plotlink_core::ACK_TOKEN.to_string(),
        ]
    }

    /// Queue the boot replies for the sync transport path.
    pub fn boot(&mut self) {
        let replies = self.boot_replies();
        self.queue_replies(replies);
    }

    pub fn set_acking(&mut self, acking: bool) {
        self.acking = acking;
    }

    /// Run one command line (without terminator), returning reply lines.
    pub fn execute_line(&mut self, line: &str) -> Vec<String> {
        let mut replies = Vec::with_capacity(2);
        match parse_command(line) {
            Ok(command) => self.execute(command),
            Err(err) => {
                warn!(%err, "rejecting command");
                self.rejected += 1;
                replies.push(format!("# error: {err}"));
            }
        }
        if self.acking {
            replies.push(plotlink_core::ACK_TOKEN.to_string());
        }
        replies
    }

    pub fn pen(&self) -> (i64, i64) {
        self.pen
    }

    pub fn executed(&self) -> &[Command] {
        &self.executed
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn rejected(&self) -> usize {
        self.rejected
    }

    /// Serve a host over an async stream until it hangs up.
    ///
    /// Sends the boot replies first, then one reply batch per command.
    pub async fn serve<S>(mut self, stream: S) -> io::Result<Self>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let mut framed = Framed::new(stream, DeviceCodec::new(self.ending));
        for reply in self.boot_replies() {
            framed.feed(reply).await?;
        }
        framed.flush().await?;

        while let Some(line) = framed.next().await {
            let line = line?;
            if line.is_empty() {
                continue;
            }
            for reply in self.execute_line(&line) {
                framed.feed(reply).await?;
            }
            framed.flush().await?;
        }
        Ok(self)
    }

    // ── Internal ─────────────────────────────────────────────────

    fn execute(&mut self, command: Command) {
        debug!(%command, "executing");
        let target = (command.x, command.y);
        if command.kind == InstructionKind::LineAbsolute {
            self.segments.push(Segment {
                from: self.pen,
                to: target,
            });
        }
        self.pen = target;
        self.executed.push(command);
    }

    fn queue_replies(&mut self, replies: Vec<String>) {
        for reply in replies {
            self.outbound.extend(reply.as_bytes());
            self.outbound.extend(self.ending.as_str().as_bytes());
        }
    }
}

impl Default for SimulatedPlotter {
    fn default() -> Self {
        Self::new()
    }
}

/// The sync path: the host reads replies and writes commands directly.
impl Transport for SimulatedPlotter {
    fn bytes_available(&self) -> usize {
        self.outbound.len()
    }

    fn read_byte(&mut self) -> Option<u8> {
        self.outbound.pop_front()
    }

    fn write_str(&mut self, text: &str) -> io::Result<()> {
        for ch in text.chars() {
            match ch {
                '\r' => {
                    let line = std::mem::take(&mut self.inbound);
                    let replies = self.execute_line(&line);
                    self.queue_replies(replies);
                }
                '\n' => {}
                other => self.inbound.push(other),
            }
        }
        Ok(())
    }
}
