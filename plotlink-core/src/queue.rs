//! Ordered instruction list with a send cursor.

use crate::instruction::Instruction;

/// Pending instructions plus the index of the next one to send.
///
/// The cursor only moves forward and never passes the end of the list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstructionQueue {
    instructions: Vec<Instruction>,
    cursor: usize,
}

impl InstructionQueue {
    pub fn new(instructions: impl Into<Vec<Instruction>>) -> Self {
        Self {
            instructions: instructions.into(),
            cursor: 0,
        }
    }

    /// Instruction at the cursor, without advancing.
    pub fn peek(&self) -> Option<&Instruction> {
        self.instructions.get(self.cursor)
    }

    /// Take the instruction at the cursor and advance past it.
    ///
    /// Returns the instruction together with its index in the list.
    pub fn advance(&mut self) -> Option<(usize, Instruction)> {
        let index = self.cursor;
        let instruction = *self.instructions.get(index)?;
        self.cursor += 1;
        Some((index, instruction))
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Instructions not yet handed out.
    pub fn remaining(&self) -> usize {
        self.instructions.len() - self.cursor
    }

    pub fn is_exhausted(&self) -> bool {
        self.cursor == self.instructions.len()
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }
}

impl FromIterator<Instruction> for InstructionQueue {
    fn from_iter<I: IntoIterator<Item = Instruction>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect::<Vec<_>>())
    }
}
