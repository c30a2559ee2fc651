//! Lowering of the vector iteration forms.
//!
//! Each form becomes a plain loop over a hidden counter, declared in a
//! scope of its own. Every pass applies the function to one element and
//! steps the counter:
//! ```text
//! loop (counter < bound) {
//!     f(vector!counter);
//!     counter = counter + 1;
//! }
//! ```
//! The forms differ in their bounds and guard.
//!
//! | form      | guard                      | counter   | bound     |
//! |-----------|----------------------------|-----------|-----------|
//! | `with`    | none                       | `_low`    | `_high`   |
//! | `unless`  | skipped if condition holds | `_unless` | `_count`  |
//! | `sweep`   | runs if condition holds    | `_low`    | high      |
//! | `iterate` | runs if condition holds    | `_iterate`| count     |

use til_ast::{AstBuilder, BinaryOp, Expr, Instr, IterateStmt, SweepStmt, UnlessStmt, WithStmt};
use til_core::Type;

use super::{PostfixWriter, Result};
use crate::postfix::Instruction;

/// One pass of an iteration loop: apply `function` to `vector!counter`,
/// then step the counter.
fn element_pass<'ast>(b: AstBuilder<'ast>, function: Expr<'ast>, vector: Expr<'ast>, counter: &str) -> Instr<'ast> {
    let element = b.rvalue(b.index(vector, b.var(counter)));
    let step = b.assign(b.variable(counter), b.binary(b.var(counter), BinaryOp::Add, b.int(1)));
    b.block_instr(&[], &[b.eval(b.call(function, &[element])), b.eval(step)])
}

impl<'w, 'ast> PostfixWriter<'w, 'ast> {
    /// Declare `counter` (and optionally `bound`), then loop while
    /// `counter < limit`.
    fn emit_counted_loop(
        &mut self,
        b: AstBuilder<'ast>,
        counter: (&str, Expr<'ast>),
        bound: Option<(&str, Expr<'ast>)>,
        limit: Expr<'ast>,
        pass: Instr<'ast>,
    ) -> Result<()> {
        self.in_scope(|writer| {
            let (name, start) = counter;
            writer.emit_local_declaration(b.declare(name, Type::Int, Some(start)))?;
            if let Some((bound, end)) = bound {
                writer.emit_local_declaration(b.declare(bound, Type::Int, Some(end)))?;
            }
            writer.emit_loop(b.binary(b.var(name), BinaryOp::Lt, limit), &pass)
        })
    }

    /// `with f v low high`: apply `f` to `v!low` .. `v!(high-1)`.
    pub(super) fn emit_with(&mut self, stmt: &WithStmt<'ast>) -> Result<()> {
        self.in_scope(|writer| Ok(writer.checker().check_with(stmt)?))?;
        let b = self.builder.at(stmt.span);
        let pass = element_pass(b, stmt.function, stmt.vector, "_low");
        self.emit_counted_loop(b, ("_low", stmt.low), Some(("_high", stmt.high)), b.var("_high"), pass)
    }

    /// `unless cond v count f`: apply `f` to the first `count` elements
    /// unless `cond` holds.
    ///
    /// Postfix layout:
    /// ```text
    /// [condition]
    /// JNZ end
    /// [counted loop]
    /// ALIGN
    /// LABEL end
    /// ```
    pub(super) fn emit_unless(&mut self, stmt: &UnlessStmt<'ast>) -> Result<()> {
        self.in_scope(|writer| Ok(writer.checker().check_unless(stmt)?))?;
        let b = self.builder.at(stmt.span);
        let end = self.labels.fresh();

        self.emit_expr(stmt.condition)?;
        self.emit(Instruction::Jnz(end.clone()));
        let pass = element_pass(b, stmt.function, stmt.vector, "_unless");
        self.emit_counted_loop(b, ("_unless", b.int(0)), Some(("_count", stmt.count)), b.var("_count"), pass)?;
        self.emit_label(end);
        Ok(())
    }

    /// `sweep v low high f cond`: apply `f` to `v!low` .. `v!(high-1)` if
    /// `cond` holds. `high` is evaluated before every pass.
    pub(super) fn emit_sweep(&mut self, stmt: &SweepStmt<'ast>) -> Result<()> {
        self.in_scope(|writer| Ok(writer.checker().check_sweep(stmt)?))?;
        let b = self.builder.at(stmt.span);
        let end = self.labels.fresh();

        self.emit_expr(stmt.condition)?;
        self.emit(Instruction::Jz(end.clone()));
        let pass = element_pass(b, stmt.function, stmt.vector, "_low");
        self.emit_counted_loop(b, ("_low", stmt.low), None, stmt.high, pass)?;
        self.emit_label(end);
        Ok(())
    }

    /// `iterate v count f cond`: apply `f` to the first `count` elements if
    /// `cond` holds. `count` is evaluated before every pass.
    pub(super) fn emit_iterate(&mut self, stmt: &IterateStmt<'ast>) -> Result<()> {
        self.in_scope(|writer| Ok(writer.checker().check_iterate(stmt)?))?;
        let b = self.builder.at(stmt.span);
        let end = self.labels.fresh();

        self.emit_expr(stmt.condition)?;
        self.emit(Instruction::Jz(end.clone()));
        let pass = element_pass(b, stmt.function, stmt.vector, "_iterate");
        self.emit_counted_loop(b, ("_iterate", b.int(0)), None, stmt.count, pass)?;
        self.emit_label(end);
        Ok(())
    }
}
