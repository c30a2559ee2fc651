//! Loop targets for `next`/`stop`.
//!
//! Tracks a stack of enclosing loops so a level-N `next` or `stop` can find
//! the loop N levels out from the innermost one.

/// Jump targets of one loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoopTargets {
    /// Where `next` jumps: the condition check
    pub continue_label: String,
    /// Where `stop` jumps: past the loop
    pub break_label: String,
}

/// Stack of enclosing loops (innermost last).
#[derive(Debug, Default)]
pub struct LoopStack {
    loops: Vec<LoopTargets>,
}

impl LoopStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enter a loop.
    pub fn enter_loop(&mut self, continue_label: String, break_label: String) {
        self.loops.push(LoopTargets {
            continue_label,
            break_label,
        });
    }

    /// Leave the innermost loop.
    pub fn exit_loop(&mut self) {
        self.loops.pop();
    }

    /// Current loop nesting depth.
    pub fn depth(&self) -> usize {
        self.loops.len()
    }

    /// Targets of the loop `level` steps out (1 = innermost).
    ///
    /// `None` for level 0 or a level beyond the nesting depth.
    pub fn target(&self, level: u32) -> Option<&LoopTargets> {
        let level = usize::try_from(level).ok()?;
        if level == 0 || level > self.loops.len() {
            return None;
        }
        self.loops.get(self.loops.len() - level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stack(names: &[(&str, &str)]) -> LoopStack {
        let mut loops = LoopStack::new();
        for (cont, brk) in names {
            loops.enter_loop(cont.to_string(), brk.to_string());
        }
        loops
    }

    #[test]
    fn empty_stack_has_no_targets() {
        let loops = LoopStack::new();
        assert_eq!(loops.depth(), 0);
        assert!(loops.target(1).is_none());
    }

    #[test]
    fn levels_count_outwards() {
        let loops = stack(&[("c1", "b1"), ("c2", "b2")]);
        assert_eq!(loops.target(1).map(|t| t.continue_label.as_str()), Some("c2"));
        assert_eq!(loops.target(2).map(|t| t.break_label.as_str()), Some("b1"));
        assert!(loops.target(3).is_none());
        assert!(loops.target(0).is_none());
    }

    #[test]
    fn exit_pops_innermost() {
        let mut loops = stack(&[("c1", "b1"), ("c2", "b2")]);
        loops.exit_loop();
        assert_eq!(loops.depth(), 1);
        assert_eq!(loops.target(1).map(|t| t.continue_label.as_str()), Some("c1"));
    }
}
