//! Postfix output: the instruction set and where instructions go.
//!
//! The writer hands every instruction to a [`PostfixEmitter`]. Turning
//! them into target assembly is the emitter's business; [`Listing`] simply
//! records them in order.

mod instruction;

use std::fmt;

pub use instruction::{Instruction, SymbolKind};

/// Sink for generated instructions.
pub trait PostfixEmitter {
    /// Append one instruction.
    fn emit(&mut self, instruction: Instruction);
}

/// An in-memory, ordered instruction listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Listing {
    instructions: Vec<Instruction>,
}

impl Listing {
    /// Create an empty listing.
    pub fn new() -> Self {
        Self::default()
    }

    /// The instructions emitted so far.
    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Instruction> {
        self.instructions.iter()
    }

    /// Index of the first occurrence of `sequence` as a contiguous run.
    pub fn find_sequence(&self, sequence: &[Instruction]) -> Option<usize> {
        if sequence.is_empty() {
            return Some(0);
        }
        self.instructions.windows(sequence.len()).position(|window| window == sequence)
    }

    /// Consume the listing, returning its instructions.
    pub fn into_instructions(self) -> Vec<Instruction> {
        self.instructions
    }
}

impl PostfixEmitter for Listing {
    fn emit(&mut self, instruction: Instruction) {
        self.instructions.push(instruction);
    }
}

impl<'a> IntoIterator for &'a Listing {
    type Item = &'a Instruction;
    type IntoIter = std::slice::Iter<'a, Instruction>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl fmt::Display for Listing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for instruction in &self.instructions {
            writeln!(f, "{instruction}")?;
        }
        Ok(())
    }
}
