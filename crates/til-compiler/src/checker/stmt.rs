//! Instruction checking.

use til_ast::{Block, Expr, Instr, PrintStmt, ReturnStmt};
use til_core::{SemanticError, Type};

use super::{Result, TypeChecker, resolve_unspec, scalar_default, unify_pointer};
use crate::coercion::compatible;

impl<'t, 'ast> TypeChecker<'t, 'ast> {
    /// Check a block in its own scope: declarations first, then instructions.
    pub fn check_block(&mut self, block: &Block<'ast>) -> Result<()> {
        self.in_scope(|checker| {
            for decl in block.declarations {
                checker.check_declaration(decl)?;
            }
            for instr in block.instructions {
                checker.check_instr(instr)?;
            }
            Ok(())
        })
    }

    /// Check one instruction and everything nested in it.
    pub fn check_instr(&mut self, instr: &Instr<'ast>) -> Result<()> {
        match instr {
            Instr::Eval(stmt) => self.check_evaluation(stmt.expr),
            Instr::Print(stmt) => self.check_print(stmt),
            Instr::Block(block) => self.check_block(block),
            Instr::If(stmt) => {
                self.check_condition(stmt.condition, "conditional instruction")?;
                self.check_instr(&stmt.then_branch)?;
                if let Some(else_branch) = &stmt.else_branch {
                    self.check_instr(else_branch)?;
                }
                Ok(())
            }
            Instr::Loop(stmt) => {
                self.check_condition(stmt.condition, "loop instruction")?;
                self.check_instr(&stmt.body)
            }
            // Levels are validated against the loop nesting when lowering.
            Instr::Next(_) | Instr::Stop(_) => Ok(()),
            Instr::Return(stmt) => self.check_return(stmt),
            Instr::With(stmt) => self.in_scope(|checker| checker.check_with(stmt)),
            Instr::Unless(stmt) => self.in_scope(|checker| checker.check_unless(stmt)),
            Instr::Sweep(stmt) => self.in_scope(|checker| checker.check_sweep(stmt)),
            Instr::Iterate(stmt) => self.in_scope(|checker| checker.check_iterate(stmt)),
        }
    }

    /// An expression whose value is discarded.
    ///
    /// Whatever is left open defaults to `int` (or `int!`).
    pub fn check_evaluation(&mut self, expr: Expr<'ast>) -> Result<()> {
        let ty = self.check_expr(expr)?;
        if ty.is_unspec() {
            expr.slot().set(Type::Int);
        } else if ty.referenced() == Some(Type::Unspec) {
            expr.slot().set(Type::INT_POINTER);
        }
        Ok(())
    }

    /// Every printed value must be a number or a string.
    pub fn check_print(&mut self, stmt: &PrintStmt<'ast>) -> Result<()> {
        for (i, arg) in stmt.args.iter().enumerate() {
            self.check_expr(*arg)?;
            match resolve_unspec(*arg, Type::Int) {
                Type::Int | Type::Double | Type::String => {}
                other => {
                    return Err(SemanticError::ArgumentTypeMismatch {
                        position: i + 1,
                        expected: "int, double or string".to_string(),
                        found: other.to_string(),
                        span: arg.span(),
                    });
                }
            }
        }
        Ok(())
    }

    /// `if`/`loop` condition: an integer truth value.
    pub fn check_condition(&mut self, condition: Expr<'ast>, construct: &'static str) -> Result<()> {
        self.expect_int(condition, "condition", construct)
    }

    /// A return must sit in a function and match its output type.
    pub fn check_return(&mut self, stmt: &ReturnStmt<'ast>) -> Result<()> {
        let output = self
            .symbols
            .enclosing_function()
            .and_then(|function| function.ty.signature())
            .map(|signature| signature.output)
            .ok_or(SemanticError::ReturnOutsideFunction { span: stmt.span })?;

        let value = match (stmt.value, output.is_void()) {
            (None, true) => return Ok(()),
            (None, false) => return Err(SemanticError::MissingReturnValue { span: stmt.span }),
            (Some(_), true) => return Err(SemanticError::UnexpectedReturnValue { span: stmt.span }),
            (Some(value), false) => value,
        };

        if self.check_expr(value)?.is_unspec() {
            value.slot().set(scalar_default(output));
        } else {
            unify_pointer(value, output);
        }

        if !compatible(output, value.ty(), true) {
            return Err(SemanticError::ReturnTypeMismatch {
                expected: output.to_string(),
                found: value.ty().to_string(),
                span: value.span(),
            });
        }
        Ok(())
    }
}
