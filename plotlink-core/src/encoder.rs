//! Rendering of instructions into host → device command lines.
//!
//! Wire format: `<opcode> <x> <y>\r`, opcode `M` or `L`, device coordinates
//! as decimal integers. The encoder never appends a line-feed.

use std::fmt;

use bytes::{BufMut, BytesMut};

use crate::error::PlotError;
use crate::instruction::{Instruction, InstructionKind};
use crate::transform::Transform;

/// Command terminator on the host → device direction.
pub const COMMAND_TERMINATOR: char = '\r';

/// An instruction mapped into device coordinates, ready for the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Command {
    pub kind: InstructionKind,
    pub x: i64,
    pub y: i64,
}

impl Command {
    /// Apply `transform` to `instruction`.
    pub fn from_instruction(instruction: &Instruction, transform: &Transform) -> Self {
        let (x, y) = transform.apply(instruction.x, instruction.y);
        Self {
            kind: instruction.kind,
            x,
            y,
        }
    }

    /// The full wire line, terminator included.
    pub fn to_wire(&self) -> String {
        format!("{self}{COMMAND_TERMINATOR}")
    }

    /// Append the wire line to `dst`.
    pub fn encode_into(&self, dst: &mut BytesMut) {
        let line = self.to_wire();
        dst.reserve(line.len());
        dst.put_slice(line.as_bytes());
    }
}

/// Formats without the terminator, e.g. `L 0 0`.
impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.kind.opcode(), self.x, self.y)
    }
}

/// Render `instruction` under `transform` into its wire line.
pub fn render(instruction: &Instruction, transform: &Transform) -> String {
    Command::from_instruction(instruction, transform).to_wire()
}

/// Parse a command line as the device sees it.
///
/// Accepts the line with or without its trailing `\r`. Fields must be
/// separated by exactly one space.
pub fn parse_command(line: &str) -> Result<Command, PlotError> {
    let body = line.strip_suffix(COMMAND_TERMINATOR).unwrap_or(line);
    let malformed = |reason| PlotError::MalformedCommand {
        line: line.to_owned(),
        reason,
    };

    let mut fields = body.split(' ');
    let (Some(op), Some(x), Some(y), None) =
        (fields.next(), fields.next(), fields.next(), fields.next())
    else {
        return Err(malformed("expected `<opcode> <x> <y>`"));
    };

    let mut op_chars = op.chars();
    let (Some(opcode), None) = (op_chars.next(), op_chars.next()) else {
        return Err(malformed("opcode must be a single character"));
    };
    let kind = InstructionKind::try_from(opcode)?;
    let x = x.parse().map_err(|_| malformed("x is not an integer"))?;
    let y = y.parse().map_err(|_| malformed("y is not an integer"))?;

    Ok(Command { kind, x, y })
}
