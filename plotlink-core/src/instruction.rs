//! Plotter instructions in logical coordinates.
//!
//! Instruction kinds form a closed enum, so every kind the host can build has
//! a wire representation. Raw opcodes go through `TryFrom<char>` and fail
//! with [`PlotError::UnknownOpcode`] instead of being silently dropped.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::PlotError;

// ── InstructionKind ──────────────────────────────────────────────

/// What the pen does while travelling to the target point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InstructionKind {
    /// Travel with the pen lifted.
    MoveAbsolute,
    /// Travel with the pen down, drawing a straight segment.
    LineAbsolute,
}

impl InstructionKind {
    /// The single-character opcode used on the wire.
    pub const fn opcode(self) -> char {
        match self {
            InstructionKind::MoveAbsolute => 'M',
            InstructionKind::LineAbsolute => 'L',
        }
    }
}

impl TryFrom<char> for InstructionKind {
    type Error = PlotError;

    fn try_from(value: char) -> Result<Self, Self::Error> {
        match value {
            'M' => Ok(InstructionKind::MoveAbsolute),
            'L' => Ok(InstructionKind::LineAbsolute),
            other => Err(PlotError::UnknownOpcode(other)),
        }
    }
}

impl fmt::Display for InstructionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InstructionKind::MoveAbsolute => write!(f, "MoveAbsolute"),
            InstructionKind::LineAbsolute => write!(f, "LineAbsolute"),
        }
    }
}

// ── Instruction ──────────────────────────────────────────────────

/// A single motion command in logical (untransformed) units.
///
/// Instructions are plain values: the driver never mutates them and the
/// transform is applied only when a command is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Instruction {
    pub kind: InstructionKind,
    pub x: i32,
    pub y: i32,
}

impl Instruction {
    pub const fn new(kind: InstructionKind, x: i32, y: i32) -> Self {
        Self { kind, x, y }
    }

    /// Pen-up travel to `(x, y)`.
    pub const fn move_to(x: i32, y: i32) -> Self {
        Self::new(InstructionKind::MoveAbsolute, x, y)
    }

    /// Pen-down segment to `(x, y)`.
    pub const fn line_to(x: i32, y: i32) -> Self {
        Self::new(InstructionKind::LineAbsolute, x, y)
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({}, {})", self.kind, self.x, self.y)
    }
}
