//! Label allocation.

/// Hands out fresh label names: `_L1`, `_L2`, ...
///
/// Labels are never reused within one writer.
#[derive(Debug, Default)]
pub struct LabelAllocator {
    issued: u32,
}

impl LabelAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// A label that has not been handed out before.
    pub fn fresh(&mut self) -> String {
        self.issued += 1;
        format!("_L{}", self.issued)
    }

    /// The number of labels issued so far.
    pub fn issued(&self) -> u32 {
        self.issued
    }
}
