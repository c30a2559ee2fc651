//! Frame sizing for function bodies.
//!
//! Replays the writer's local offset assignment without emitting anything.
//! Locals grow downwards from the frame pointer; a block hands its space
//! back when it closes, so sibling blocks (and the two arms of an `if`)
//! share the same slots. The frame must cover the deepest point reached.

use til_ast::{Block, Instr};
use til_core::INT_SIZE;

/// Computes the local storage a function body needs.
#[derive(Debug, Default)]
pub struct FrameSizeCalculator {
    /// Running offset, mirroring the writer's
    offset: i32,
    /// Most negative offset seen
    deepest: i32,
}

impl FrameSizeCalculator {
    /// Bytes the prologue must reserve for `body`.
    ///
    /// Declarations must already carry their resolved types.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn frame_size(body: &Block<'_>) -> u32 {
        let mut calc = Self::default();
        calc.visit_block(body);
        calc.deepest.unsigned_abs()
    }

    fn declare(&mut self, size: u32) {
        self.offset -= size as i32;
        self.deepest = self.deepest.min(self.offset);
    }

    /// Run `f` in a scope whose declarations are released afterwards.
    fn scoped(&mut self, f: impl FnOnce(&mut Self)) {
        let saved = self.offset;
        f(self);
        self.offset = saved;
    }

    fn visit_block(&mut self, block: &Block<'_>) {
        self.scoped(|calc| {
            for decl in block.declarations {
                calc.declare(decl.ty().size());
            }
            for instr in block.instructions {
                calc.visit_instr(instr);
            }
        });
    }

    fn visit_instr(&mut self, instr: &Instr<'_>) {
        match instr {
            Instr::Block(block) => self.visit_block(block),
            Instr::If(stmt) => {
                self.visit_instr(&stmt.then_branch);
                if let Some(else_branch) = &stmt.else_branch {
                    self.visit_instr(else_branch);
                }
            }
            Instr::Loop(stmt) => self.visit_instr(&stmt.body),
            // Hidden counters: `_low`/`_high`, `_unless`/`_count`, one index each otherwise.
            Instr::With(_) | Instr::Unless(_) => self.scoped(|calc| {
                calc.declare(INT_SIZE);
                calc.declare(INT_SIZE);
            }),
            Instr::Sweep(_) | Instr::Iterate(_) => self.scoped(|calc| calc.declare(INT_SIZE)),
            Instr::Eval(_)
            | Instr::Print(_)
            | Instr::Next(_)
            | Instr::Stop(_)
            | Instr::Return(_) => {}
        }
    }
}
