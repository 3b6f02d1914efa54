//! Request/acknowledge state of a plotter link.
//!
//! ```text
//!            send(i)                    ack
//!   Idle ─────────────► AwaitingAck(i) ─────► Idle ──► send(i + 1) ...
//!    ▲  │ ack (boot / unsolicited)
//!    └──┘
//! ```
//!
//! At most one command is outstanding at any time. Transitions that would
//! break that rule return `Err` instead of panicking.

use std::fmt;
use std::time::{Duration, Instant};

use crate::error::PlotError;

/// Whether the host is waiting on the device.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LinkState {
    /// Nothing outstanding; the next ack may release a command.
    #[default]
    Idle,

    /// Command `index` of the queue was sent and is not yet acknowledged.
    AwaitingAck {
        index: usize,
        /// When the command was written.
        sent_at: Instant,
        /// Optional deadline; `None` waits forever.
        deadline: Option<Duration>,
    },
}

impl fmt::Display for LinkState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "Idle"),
            Self::AwaitingAck { index, .. } => write!(f, "AwaitingAck({index})"),
        }
    }
}

impl LinkState {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    /// Queue index of the outstanding command, if any.
    pub fn outstanding(&self) -> Option<usize> {
        match self {
            Self::AwaitingAck { index, .. } => Some(*index),
            Self::Idle => None,
        }
    }

    /// How long the outstanding command has been in flight.
    pub fn elapsed(&self) -> Option<Duration> {
        match self {
            Self::AwaitingAck { sent_at, .. } => Some(sent_at.elapsed()),
            Self::Idle => None,
        }
    }

    /// Returns `true` once the outstanding command has passed its deadline.
    pub fn is_expired(&self) -> bool {
        match self {
            Self::AwaitingAck {
                sent_at,
                deadline: Some(d),
                ..
            } => sent_at.elapsed() > *d,
            _ => false,
        }
    }

    // ── Transitions ──────────────────────────────────────────────

    /// Record that command `index` was written.
    ///
    /// Valid from: `Idle`.
    pub fn begin_send(
        &mut self,
        index: usize,
        deadline: Option<Duration>,
    ) -> Result<(), PlotError> {
        match self {
            Self::Idle => {
                *self = Self::AwaitingAck {
                    index,
                    sent_at: Instant::now(),
                    deadline,
                };
                Ok(())
            }
            Self::AwaitingAck { .. } => Err(PlotError::ProtocolViolation(
                "cannot send: a command is already awaiting acknowledgment",
            )),
        }
    }

    /// Consume an acknowledgment, returning the index it completed.
    ///
    /// An ack while `Idle` (the firmware's boot `OK`, or one following a
    /// direct send) completes nothing and returns `None`.
    pub fn acknowledge(&mut self) -> Option<usize> {
        let completed = self.outstanding();
        *self = Self::Idle;
        completed
    }

    /// `Err(AckTimeout)` if the outstanding command is past its deadline.
    pub fn check_deadline(&self) -> Result<(), PlotError> {
        match self {
            Self::AwaitingAck { index, sent_at, .. } if self.is_expired() => {
                Err(PlotError::AckTimeout {
                    index: *index,
                    waited: sent_at.elapsed(),
                })
            }
            _ => Ok(()),
        }
    }

    /// Force back to `Idle`, dropping any outstanding command.
    pub fn reset(&mut self) {
        *self = Self::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn send_ack_cycle() {
        let mut state = LinkState::default();
        assert!(state.is_idle());

        state.begin_send(0, None).unwrap();
        assert_eq!(state.outstanding(), Some(0));
        assert!(state.elapsed().is_some());

        assert_eq!(state.acknowledge(), Some(0));
        assert!(state.is_idle());

        state.begin_send(1, None).unwrap();
        assert_eq!(state.to_string(), "AwaitingAck(1)");
    }

    #[test]
    fn second_send_while_awaiting_is_rejected() {
        let mut state = LinkState::default();
        state.begin_send(0, None).unwrap();
        assert!(matches!(
            state.begin_send(1, None),
            Err(PlotError::ProtocolViolation(_))
        ));
        assert_eq!(state.outstanding(), Some(0));
    }

    #[test]
    fn ack_while_idle_completes_nothing() {
        let mut state = LinkState::Idle;
        assert_eq!(state.acknowledge(), None);
        assert!(state.is_idle());
    }

    #[test]
    fn deadline_expires() {
        let mut state = LinkState::default();
        state.begin_send(3, Some(Duration::ZERO)).unwrap();
        std::thread::sleep(Duration::from_millis(1));

        assert!(state.is_expired());
        let err = state.check_deadline().unwrap_err();
        assert!(matches!(err, PlotError::AckTimeout { index: 3, .. }));
    }

    #[test]
    fn no_deadline_never_expires() {
        let mut state = LinkState::default();
        state.begin_send(0, None).unwrap();
        assert!(!state.is_expired());
        assert!(state.check_deadline().is_ok());
        assert!(LinkState::Idle.check_deadline().is_ok());
    }

    #[test]
    fn reset_from_any_state() {
        let mut state = LinkState::default();
        state.begin_send(9, None).unwrap();
        state.reset();
        assert!(state.is_idle());
        assert_eq!(state.to_string(), "Idle");
    }
}
