//! Expression checking.

use til_ast::{
    AddressOfExpr, AssignExpr, BinaryExpr, CallExpr, Expr, IndexExpr, LiteralKind, Lvalue,
    UnaryExpr, UnaryOp,
};
use til_core::{SemanticError, Type};

use super::{Result, TypeChecker, resolve_unspec, scalar_default, unify_pointer, wrong_operand};
use crate::coercion::compatible;

impl<'t, 'ast> TypeChecker<'t, 'ast> {
    /// Resolve the type of `expr`, annotating it and its subtree.
    ///
    /// Returns `Unspec` only for `input`, whose type is fixed by the
    /// context it is used in.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn check_expr(&mut self, expr: Expr<'ast>) -> Result<Type<'ast>> {
        let slot = expr.slot();
        if slot.is_resolved() {
            return Ok(slot.get());
        }

        let ty = match expr {
            Expr::Literal(lit) => match lit.kind {
                LiteralKind::Int(_) => Type::Int,
                LiteralKind::Double(_) => Type::Double,
                LiteralKind::String(_) => Type::String,
            },
            Expr::Null(_) => Type::UNSPEC_POINTER,
            Expr::Read(_) => Type::Unspec,
            Expr::Unary(e) => self.check_unary(e)?,
            Expr::Binary(e) => self.check_binary(e)?,
            Expr::Rvalue(e) => self.check_lvalue(e.lvalue)?,
            Expr::Assign(e) => self.check_assign(e)?,
            Expr::AddressOf(e) => self.check_address_of(e)?,
            Expr::SizeOf(e) => {
                self.check_expr(e.operand)?;
                resolve_unspec(e.operand, Type::Int);
                Type::Int
            }
            Expr::Objects(e) => {
                self.expect_int(e.count, "argument", "objects expression")?;
                Type::UNSPEC_POINTER
            }
            Expr::Call(e) => self.check_call(e)?,
            Expr::Function(def) => self.check_function_def(def)?,
        };

        slot.set(ty);
        Ok(ty)
    }

    /// Resolve the type of a storage location.
    pub fn check_lvalue(&mut self, lvalue: Lvalue<'ast>) -> Result<Type<'ast>> {
        let slot = lvalue.slot();
        if slot.is_resolved() {
            return Ok(slot.get());
        }

        let ty = match lvalue {
            Lvalue::Variable(var) => {
                self.symbols
                    .find(var.name)
                    .ok_or_else(|| SemanticError::UndeclaredVariable {
                        name: var.name.to_string(),
                        span: var.span,
                    })?
                    .ty
            }
            Lvalue::Index(index) => self.check_index(index)?,
        };

        slot.set(ty);
        Ok(ty)
    }

    fn check_unary(&mut self, e: &UnaryExpr<'ast>) -> Result<Type<'ast>> {
        let accepts_double = e.op != UnaryOp::Not;
        match self.check_expr(e.operand)? {
            Type::Unspec => {
                e.operand.slot().set(Type::Int);
                Ok(Type::Int)
            }
            Type::Int => Ok(Type::Int),
            Type::Double if accepts_double => Ok(Type::Double),
            other => Err(wrong_operand("argument", "unary expression", other, e.operand.span())),
        }
    }

    fn check_binary(&mut self, e: &BinaryExpr<'ast>) -> Result<Type<'ast>> {
        if e.op.is_arithmetic() {
            self.check_arithmetic(e)
        } else {
            self.check_predicate(e)
        }
    }

    /// `+ - * / %`
    ///
    /// | left          | right            | result        |
    /// |---------------|------------------|---------------|
    /// | int / unspec  | int, double      | right         |
    /// | int / unspec  | pointer          | right         |
    /// | double        | int, double      | double        |
    /// | pointer       | int              | left          |
    /// | pointer       | same pointer     | int           |
    ///
    /// An `Unspec` operand takes the type the table gives it.
    fn check_arithmetic(&mut self, e: &BinaryExpr<'ast>) -> Result<Type<'ast>> {
        const CONSTRUCT: &str = "arithmetic expression";

        let left = self.check_expr(e.left)?;
        if !matches!(left, Type::Int | Type::Unspec | Type::Double | Type::Pointer(_)) {
            return Err(wrong_operand("left argument", CONSTRUCT, left, e.left.span()));
        }

        let right = self.check_expr(e.right)?;
        match left {
            Type::Int | Type::Unspec => {
                let ty = match right {
                    Type::Int | Type::Double => right,
                    Type::Unspec => {
                        e.right.slot().set(Type::Int);
                        Type::Int
                    }
                    Type::Pointer(_) => {
                        resolve_unspec(e.left, Type::Int);
                        right
                    }
                    other => return Err(wrong_operand("right argument", CONSTRUCT, other, e.right.span())),
                };
                resolve_unspec(e.left, ty);
                Ok(ty)
            }
            Type::Double => match right {
                Type::Int | Type::Double => Ok(Type::Double),
                Type::Unspec => {
                    e.right.slot().set(Type::Double);
                    Ok(Type::Double)
                }
                other => Err(wrong_operand("right argument", CONSTRUCT, other, e.right.span())),
            },
            Type::Pointer(_) => match right {
                Type::Int => Ok(left),
                Type::Unspec => {
                    e.right.slot().set(Type::Int);
                    Ok(left)
                }
                other if compatible(left, other, false) => Ok(Type::Int),
                other => Err(wrong_operand("right argument", CONSTRUCT, other, e.right.span())),
            },
            other => Err(wrong_operand("left argument", CONSTRUCT, other, e.left.span())),
        }
    }

    /// Comparisons and `and`/`or`; always `Int`.
    ///
    /// Comparisons mix `int` and `double`; logical operators take integers
    /// only. Pointers are never accepted.
    fn check_predicate(&mut self, e: &BinaryExpr<'ast>) -> Result<Type<'ast>> {
        let accepts_double = e.op.is_comparison();
        let construct = if accepts_double {
            "comparison expression"
        } else {
            "logical expression"
        };

        let left = self.check_expr(e.left)?;
        if !(left.is_int() || left.is_unspec() || (accepts_double && left.is_double())) {
            return Err(wrong_operand("left argument", construct, left, e.left.span()));
        }

        let right = self.check_expr(e.right)?;
        match (left, right) {
            (Type::Unspec, Type::Unspec) => {
                e.left.slot().set(Type::Int);
                e.right.slot().set(Type::Int);
            }
            (_, Type::Unspec) => e.right.slot().set(left),
            (_, Type::Int) => {
                resolve_unspec(e.left, Type::Int);
            }
            (_, Type::Double) if accepts_double => {
                resolve_unspec(e.left, Type::Double);
            }
            (_, other) => return Err(wrong_operand("right argument", construct, other, e.right.span())),
        }
        Ok(Type::Int)
    }

    fn check_index(&mut self, e: &IndexExpr<'ast>) -> Result<Type<'ast>> {
        let base = self.check_expr(e.base)?;
        let Some(element) = base.referenced() else {
            return Err(wrong_operand("base", "pointer index", base, e.base.span()));
        };
        self.expect_int(e.index, "index", "pointer index")?;

        if element.is_unspec() {
            e.base.slot().set(Type::INT_POINTER);
            return Ok(Type::Int);
        }
        Ok(element)
    }

    fn check_assign(&mut self, e: &AssignExpr<'ast>) -> Result<Type<'ast>> {
        let target = self.check_lvalue(e.lvalue)?;
        let value = self.check_expr(e.value)?;

        if value.is_unspec() {
            e.value.slot().set(target);
        } else {
            unify_pointer(e.value, target);
        }

        let value = e.value.ty();
        if !compatible(target, value, true) {
            return Err(SemanticError::AssignmentTypeMismatch {
                expected: target.to_string(),
                found: value.to_string(),
                span: e.span,
            });
        }
        Ok(target)
    }

    fn check_address_of(&mut self, e: &AddressOfExpr<'ast>) -> Result<Type<'ast>> {
        let ty = self.check_lvalue(e.lvalue)?;
        // void!! collapses to void!
        if ty.referenced() == Some(Type::Void) {
            return Ok(ty);
        }
        Ok(self.builder.pointer(ty))
    }

    fn check_call(&mut self, e: &CallExpr<'ast>) -> Result<Type<'ast>> {
        let signature = match e.callee {
            None => {
                let function = self
                    .symbols
                    .enclosing_function()
                    .ok_or(SemanticError::SelfCallOutsideFunction { span: e.span })?;
                if function.is_main {
                    return Err(SemanticError::SelfCallInMain { span: e.span });
                }
                function
                    .ty
                    .signature()
                    .ok_or(SemanticError::SelfCallOutsideFunction { span: e.span })?
            }
            Some(callee) => {
                let ty = self.check_expr(callee)?;
                ty.signature().ok_or_else(|| SemanticError::NotAFunction {
                    found: ty.to_string(),
                    span: callee.span(),
                })?
            }
        };

        if signature.arity() != e.args.len() {
            return Err(SemanticError::ArgumentCountMismatch {
                expected: signature.arity(),
                found: e.args.len(),
                span: e.span,
            });
        }

        for (i, (arg, param)) in e.args.iter().zip(signature.inputs).enumerate() {
            if self.check_expr(*arg)?.is_unspec() {
                arg.slot().set(scalar_default(*param));
            } else {
                unify_pointer(*arg, *param);
            }
            if !compatible(*param, arg.ty(), true) {
                return Err(SemanticError::ArgumentTypeMismatch {
                    position: i + 1,
                    expected: param.to_string(),
                    found: arg.ty().to_string(),
                    span: arg.span(),
                });
            }
        }

        Ok(signature.output)
    }
}
