//! Checking for the vector iteration instructions.
//!
//! Each form checks its own operands in source order. Scalars (`low`,
//! `high`, `count`, `condition`) are integers, `vector` is a pointer and
//! `function` takes exactly one argument of the vector's element type. What
//! the function returns is discarded.

use til_ast::{Expr, IterateStmt, SweepStmt, UnlessStmt, WithStmt};
use til_core::Type;

use super::{Result, TypeChecker, wrong_operand};

impl<'t, 'ast> TypeChecker<'t, 'ast> {
    pub fn check_with(&mut self, stmt: &WithStmt<'ast>) -> Result<()> {
        const CONSTRUCT: &str = "with instruction";
        let vector = self.expect_vector(stmt.vector, CONSTRUCT)?;
        self.expect_int(stmt.low, "low", CONSTRUCT)?;
        self.expect_int(stmt.high, "high", CONSTRUCT)?;
        self.expect_element_function(stmt.function, vector, CONSTRUCT)
    }

    pub fn check_unless(&mut self, stmt: &UnlessStmt<'ast>) -> Result<()> {
        const CONSTRUCT: &str = "unless instruction";
        self.expect_int(stmt.condition, "condition", CONSTRUCT)?;
        let vector = self.expect_vector(stmt.vector, CONSTRUCT)?;
        self.expect_int(stmt.count, "count", CONSTRUCT)?;
        self.expect_element_function(stmt.function, vector, CONSTRUCT)
    }

    pub fn check_sweep(&mut self, stmt: &SweepStmt<'ast>) -> Result<()> {
        const CONSTRUCT: &str = "sweep instruction";
        let vector = self.expect_vector(stmt.vector, CONSTRUCT)?;
        self.expect_int(stmt.low, "low", CONSTRUCT)?;
        self.expect_int(stmt.high, "high", CONSTRUCT)?;
        self.expect_int(stmt.condition, "condition", CONSTRUCT)?;
        self.expect_element_function(stmt.function, vector, CONSTRUCT)
    }

    pub fn check_iterate(&mut self, stmt: &IterateStmt<'ast>) -> Result<()> {
        const CONSTRUCT: &str = "iterate instruction";
        let vector = self.expect_vector(stmt.vector, CONSTRUCT)?;
        self.expect_int(stmt.count, "count", CONSTRUCT)?;
        self.expect_int(stmt.condition, "condition", CONSTRUCT)?;
        self.expect_element_function(stmt.function, vector, CONSTRUCT)
    }

    fn expect_vector(&mut self, vector: Expr<'ast>, construct: &'static str) -> Result<Type<'ast>> {
        let ty = self.check_expr(vector)?;
        if !ty.is_pointer() {
            return Err(wrong_operand("vector", construct, ty, vector.span()));
        }
        Ok(ty)
    }

    fn expect_element_function(&mut self, function: Expr<'ast>, vector: Type<'ast>, construct: &'static str) -> Result<()> {
        let ty = self.check_expr(function)?;
        let fits = match (ty.signature(), vector.referenced()) {
            (Some(signature), Some(element)) => signature.arity() == 1 && signature.inputs[0] == element,
            _ => false,
        };
        if !fits {
            return Err(wrong_operand("function", construct, ty, function.span()));
        }
        Ok(())
    }
}
