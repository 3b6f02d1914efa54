//! Reaction to classified device messages.
//!
//! The router is the only code that moves the queue cursor. On an ack it
//! takes the instruction at the cursor, advances past it and marks it
//! outstanding, *then* hands it back for rendering. Because the cursor moves
//! first, a failed write is never retried.

use std::time::Duration;

use tracing::{debug, info, trace, warn};

use crate::instruction::Instruction;
use crate::message::DeviceMessage;
use crate::queue::InstructionQueue;
use crate::state::LinkState;

/// What the caller must do after routing a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteOutcome {
    /// A firmware diagnostic was logged.
    Diagnostic,
    /// Blank or unrecognized line; nothing changed.
    Ignored,
    /// An ack arrived with no queue or an exhausted queue.
    NothingToSend,
    /// An ack released `instruction` (queue position `index`); render and
    /// write it.
    Release { index: usize, instruction: Instruction },
}

/// Classifies nothing itself; applies the ack protocol to queue and state.
#[derive(Debug, Clone, Copy, Default)]
pub struct Router {
    ack_deadline: Option<Duration>,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a deadline to every command released from now on.
    pub fn with_ack_deadline(ack_deadline: Option<Duration>) -> Self {
        Self { ack_deadline }
    }

    pub fn ack_deadline(&self) -> Option<Duration> {
        self.ack_deadline
    }

    pub fn route(
        &self,
        message: &DeviceMessage,
        queue: Option<&mut InstructionQueue>,
        link: &mut LinkState,
    ) -> RouteOutcome {
        match message {
            DeviceMessage::Diagnostic(text) => {
                info!(target: "plotlink::device", "bot: {text}");
                RouteOutcome::Diagnostic
            }
            DeviceMessage::Ack => self.on_ack(queue, link),
            DeviceMessage::Empty => {
                trace!("empty line from device");
                RouteOutcome::Ignored
            }
            DeviceMessage::Unrecognized(text) => {
                warn!(message = %text, "unrecognized device message");
                RouteOutcome::Ignored
            }
        }
    }

    fn on_ack(&self, queue: Option<&mut InstructionQueue>, link: &mut LinkState) -> RouteOutcome {
        let completed = link.acknowledge();
        debug!(?completed, "received ok");

        let Some((index, instruction)) = queue.and_then(InstructionQueue::advance) else {
            debug!("nothing to do");
            return RouteOutcome::NothingToSend;
        };

        if let Err(err) = link.begin_send(index, self.ack_deadline) {
            // acknowledge() left us Idle, so this only fires on a logic bug.
            warn!(%err, index, "link state out of sync");
        }
        RouteOutcome::Release { index, instruction }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn queue() -> InstructionQueue {
        InstructionQueue::new(vec![Instruction::move_to(1, 2), Instruction::line_to(3, 4)])
    }

    #[test]
    fn diagnostic_never_moves_cursor() {
        let router = Router::new();
        let mut q = queue();
        let mut link = LinkState::default();
        let msg = DeviceMessage::classify("#anything");
        assert_eq!(router.route(&msg, Some(&mut q), &mut link), RouteOutcome::Diagnostic);
        assert_eq!(q.cursor(), 0);
        assert!(link.is_idle());
    }

    #[test]
    fn ack_releases_exactly_one() {
        let router = Router::new();
        let mut q = queue();
        let mut link = LinkState::default();

        let outcome = router.route(&DeviceMessage::Ack, Some(&mut q), &mut link);
        assert_eq!(
            outcome,
            RouteOutcome::Release {
                index: 0,
                instruction: Instruction::move_to(1, 2)
            }
        );
        assert_eq!(q.cursor(), 1);
        assert_eq!(link.outstanding(), Some(0));

        let outcome = router.route(&DeviceMessage::Ack, Some(&mut q), &mut link);
        assert!(matches!(outcome, RouteOutcome::Release { index: 1, .. }));
        assert_eq!(link.outstanding(), Some(1));
    }

    #[test]
    fn ack_on_exhausted_queue_is_noop() {
        let router = Router::new();
        let mut q = queue();
        let mut link = LinkState::default();
        router.route(&DeviceMessage::Ack, Some(&mut q), &mut link);
        router.route(&DeviceMessage::Ack, Some(&mut q), &mut link);

        let outcome = router.route(&DeviceMessage::Ack, Some(&mut q), &mut link);
        assert_eq!(outcome, RouteOutcome::NothingToSend);
        assert_eq!(q.cursor(), 2);
        assert!(link.is_idle());
    }

    #[test]
    fn ack_without_queue_is_noop() {
        let router = Router::new();
        let mut link = LinkState::default();
        assert_eq!(
            router.route(&DeviceMessage::Ack, None, &mut link),
            RouteOutcome::NothingToSend
        );
    }

    #[test]
    fn unrecognized_and_empty_are_ignored() {
        let router = Router::new();
        let mut q = queue();
        let mut link = LinkState::default();
        for line in ["", "ERR 3", "ok"] {
            let msg = DeviceMessage::classify(line);
            assert_eq!(router.route(&msg, Some(&mut q), &mut link), RouteOutcome::Ignored);
        }
        assert_eq!(q.cursor(), 0);
    }

    #[test]
    fn released_command_carries_deadline() {
        let router = Router::with_ack_deadline(Some(Duration::from_secs(2)));
        let mut q = queue();
        let mut link = LinkState::default();
        router.route(&DeviceMessage::Ack, Some(&mut q), &mut link);
        assert!(matches!(
            link,
            LinkState::AwaitingAck {
                deadline: Some(d),
                ..
            } if d == Duration::from_secs(2)
        ));
    }
}
