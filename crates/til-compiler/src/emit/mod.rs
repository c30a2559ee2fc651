//! Bookkeeping for code emission: label names and loop targets.

mod labels;
mod loops;

pub use labels::LabelAllocator;
pub use loops::{LoopStack, LoopTargets};
