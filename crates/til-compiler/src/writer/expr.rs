//! Expressions.
//!
//! Every expression leaves exactly its value on the stack: one cell for
//! integers and addresses, two for doubles, nothing for `void` calls.

use til_ast::{BinaryExpr, BinaryOp, CallExpr, Expr, LiteralKind, Lvalue, UnaryExpr, UnaryOp};
use til_core::{CodegenError, Type};

use super::decl::{load, store};
use super::{PostfixWriter, Result, runtime};
use crate::postfix::Instruction;

impl<'w, 'ast> PostfixWriter<'w, 'ast> {
    /// Push the value of `expr`.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub(super) fn emit_expr(&mut self, expr: Expr<'ast>) -> Result<()> {
        let ty = self.checker().check_expr(expr)?;
        match expr {
            Expr::Literal(lit) => match lit.kind {
                LiteralKind::Int(v) => self.emit(Instruction::Int(v)),
                LiteralKind::Double(v) => self.emit(Instruction::double(v)),
                LiteralKind::String(s) => {
                    let label = self.emit_string(s);
                    let enclosing = self.current_function(lit.span)?;
                    self.emit(Instruction::Text(enclosing));
                    self.emit(Instruction::Addr(label));
                }
            },
            Expr::Null(_) => self.emit(Instruction::Int(0)),
            Expr::Unary(e) => self.emit_unary(e)?,
            Expr::Binary(e) => self.emit_binary(e)?,
            Expr::Rvalue(e) => {
                if let Some(name) = self.external_name(e.lvalue) {
                    // The function's address is all there is to load.
                    self.emit(Instruction::Addr(name));
                } else {
                    self.emit_lvalue(e.lvalue)?;
                    self.emit(load(e.lvalue.ty()));
                }
            }
            Expr::Assign(e) => {
                let target = self.checker().check_lvalue(e.lvalue)?;
                self.accept_covariant(target, e.value)?;
                self.emit(if target.is_double() {
                    Instruction::Dup64
                } else {
                    Instruction::Dup32
                });
                self.emit_lvalue(e.lvalue)?;
                self.emit(store(target));
            }
            Expr::AddressOf(e) => self.emit_lvalue(e.lvalue)?,
            Expr::Read(_) => {
                if ty.is_double() {
                    self.call_runtime(runtime::READ_DOUBLE);
                    self.emit(Instruction::LdFval64);
                } else {
                    self.call_runtime(runtime::READ_INT);
                    self.emit(Instruction::LdFval32);
                }
            }
            Expr::SizeOf(e) => self.emit(Instruction::Int(e.operand.ty().size() as i32)),
            Expr::Objects(e) => {
                // Stack space for `count` elements of the pointed-to type.
                self.accept_covariant(Type::Int, e.count)?;
                self.emit(Instruction::Int(element_size(ty)));
                self.emit(Instruction::Mul);
                self.emit(Instruction::Alloc);
                self.emit(Instruction::Sp);
            }
            Expr::Call(e) => self.emit_call(e)?,
            Expr::Function(def) => self.emit_function_value(def)?,
        }
        Ok(())
    }

    /// Push the address of a storage location.
    ///
    /// Postfix layout:
    /// ```text
    /// ADDR name | LOCAL offset        ; variable
    ///
    /// [base]                          ; base!index
    /// [index]
    /// INT element_size
    /// MUL
    /// ADD
    /// ```
    pub(super) fn emit_lvalue(&mut self, lvalue: Lvalue<'ast>) -> Result<()> {
        self.checker().check_lvalue(lvalue)?;
        match lvalue {
            Lvalue::Variable(var) => {
                let symbol = self.symbols.find(var.name).ok_or_else(|| CodegenError::UnknownSymbol {
                    name: var.name.to_string(),
                    span: var.span,
                })?;
                self.emit(if symbol.is_global() {
                    Instruction::Addr(var.name.to_string())
                } else {
                    Instruction::Local(symbol.offset)
                });
            }
            Lvalue::Index(index) => {
                self.emit_expr(index.base)?;
                self.accept_covariant(Type::Int, index.index)?;
                self.emit(Instruction::Int(index.ty.get().size() as i32));
                self.emit(Instruction::Mul);
                self.emit(Instruction::Add);
            }
        }
        Ok(())
    }

    /// Name of an `external` function a bare variable refers to.
    fn external_name(&self, lvalue: Lvalue<'ast>) -> Option<String> {
        match lvalue {
            Lvalue::Variable(var) => self
                .symbols
                .find(var.name)
                .filter(|symbol| symbol.is_external())
                .map(|symbol| symbol.name.to_string()),
            Lvalue::Index(_) => None,
        }
    }

    fn emit_unary(&mut self, e: &UnaryExpr<'ast>) -> Result<()> {
        self.emit_expr(e.operand)?;
        match e.op {
            UnaryOp::Plus => {}
            UnaryOp::Neg if e.ty.get().is_double() => self.emit(Instruction::DNeg),
            UnaryOp::Neg => self.emit(Instruction::Neg),
            UnaryOp::Not => {
                self.emit(Instruction::Int(0));
                self.emit(Instruction::Eq);
            }
        }
        Ok(())
    }

    fn emit_binary(&mut self, e: &BinaryExpr<'ast>) -> Result<()> {
        match e.op {
            BinaryOp::And | BinaryOp::Or => self.emit_logical(e),
            BinaryOp::Add | BinaryOp::Sub if e.left.ty().is_pointer() || e.right.ty().is_pointer() => {
                self.emit_pointer_arithmetic(e)
            }
            BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod => {
                self.emit_arithmetic(e)
            }
            BinaryOp::Eq | BinaryOp::Ne | BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => {
                self.emit_comparison(e)
            }
        }
    }

    /// Short-circuit `&&` / `||`.
    ///
    /// `AND` and `OR` are bitwise, so each operand is first reduced to 0 or 1.
    ///
    /// Postfix layout:
    /// ```text
    /// [left]
    /// INT 0
    /// NE
    /// DUP32
    /// JZ end | JNZ end
    /// [right]
    /// INT 0
    /// NE
    /// AND | OR
    /// ALIGN
    /// LABEL end
    /// ```
    fn emit_logical(&mut self, e: &BinaryExpr<'ast>) -> Result<()> {
        let end = self.labels.fresh();
        self.emit_truth_value(e.left)?;
        self.emit(Instruction::Dup32);
        if e.op == BinaryOp::And {
            self.emit(Instruction::Jz(end.clone()));
            self.emit_truth_value(e.right)?;
            self.emit(Instruction::And);
        } else {
            self.emit(Instruction::Jnz(end.clone()));
            self.emit_truth_value(e.right)?;
            self.emit(Instruction::Or);
        }
        self.emit_label(end);
        Ok(())
    }

    /// `expr != 0`
    fn emit_truth_value(&mut self, expr: Expr<'ast>) -> Result<()> {
        self.emit_expr(expr)?;
        self.emit(Instruction::Int(0));
        self.emit(Instruction::Ne);
        Ok(())
    }

    /// Numeric arithmetic; an integer operand of a double operation is
    /// converted where it is pushed.
    fn emit_arithmetic(&mut self, e: &BinaryExpr<'ast>) -> Result<()> {
        let ty = e.ty.get();
        if !ty.is_double() {
            self.emit_expr(e.left)?;
            self.emit_expr(e.right)?;
            self.emit(match e.op {
                BinaryOp::Add => Instruction::Add,
                BinaryOp::Sub => Instruction::Sub,
                BinaryOp::Mul => Instruction::Mul,
                BinaryOp::Div => Instruction::Div,
                _ => Instruction::Mod,
            });
            return Ok(());
        }

        if e.op == BinaryOp::Mod {
            // No double remainder: truncate both sides and widen the result.
            self.accept_covariant(Type::Int, e.left)?;
            self.accept_covariant(Type::Int, e.right)?;
            self.emit(Instruction::Mod);
            self.emit(Instruction::I2D);
            return Ok(());
        }

        self.accept_covariant(Type::Double, e.left)?;
        self.accept_covariant(Type::Double, e.right)?;
        self.emit(match e.op {
            BinaryOp::Add => Instruction::DAdd,
            BinaryOp::Sub => Instruction::DSub,
            BinaryOp::Mul => Instruction::DMul,
            _ => Instruction::DDiv,
        });
        Ok(())
    }

    /// `ptr ± int`, `int + ptr` and `ptr - ptr`.
    ///
    /// The integer side is scaled by the element size; a pointer difference
    /// is divided by it. A sum of two pointers is left unscaled.
    fn emit_pointer_arithmetic(&mut self, e: &BinaryExpr<'ast>) -> Result<()> {
        let (left, right) = (e.left.ty(), e.right.ty());
        let op = if e.op == BinaryOp::Add {
            Instruction::Add
        } else {
            Instruction::Sub
        };

        if left.is_pointer() && right.is_pointer() {
            self.emit_expr(e.left)?;
            self.emit_expr(e.right)?;
            self.emit(op);
            if e.op == BinaryOp::Sub {
                self.emit(Instruction::Int(element_size(left)));
                self.emit(Instruction::Div);
            }
            return Ok(());
        }

        let scale = element_size(e.ty.get());
        self.emit_expr(e.left)?;
        if !left.is_pointer() {
            self.emit_scaled(scale);
        }
        self.emit_expr(e.right)?;
        if !right.is_pointer() {
            self.emit_scaled(scale);
        }
        self.emit(op);
        Ok(())
    }

    fn emit_scaled(&mut self, scale: i32) {
        self.emit(Instruction::Int(scale));
        self.emit(Instruction::Mul);
    }

    /// Integer comparisons compare directly. With a double operand, `DCMP`
    /// yields -1, 0 or 1, which is then compared against 0.
    fn emit_comparison(&mut self, e: &BinaryExpr<'ast>) -> Result<()> {
        let compare = match e.op {
            BinaryOp::Eq => Instruction::Eq,
            BinaryOp::Ne => Instruction::Ne,
            BinaryOp::Lt => Instruction::Lt,
            BinaryOp::Le => Instruction::Le,
            BinaryOp::Gt => Instruction::Gt,
            _ => Instruction::Ge,
        };

        if e.left.ty().is_double() || e.right.ty().is_double() {
            self.accept_covariant(Type::Double, e.left)?;
            self.accept_covariant(Type::Double, e.right)?;
            self.emit(Instruction::DCmp);
            self.emit(Instruction::Int(0));
        } else {
            self.emit_expr(e.left)?;
            self.emit_expr(e.right)?;
        }
        self.emit(compare);
        Ok(())
    }

    /// Call a function value, an import, or the enclosing function.
    ///
    /// Postfix layout:
    /// ```text
    /// [argument n] ... [argument 1]    ; converted to the parameter types
    /// CALL name                        ; import
    /// | [callee] BRANCH                ; function value
    /// | ADDR current BRANCH            ; self-call
    /// TRASH argument_bytes
    /// LDFVAL32 | LDFVAL64              ; unless void
    /// ```
    fn emit_call(&mut self, e: &CallExpr<'ast>) -> Result<()> {
        let signature = match e.callee {
            Some(callee) => self.checker().check_expr(callee)?.signature(),
            None => self.symbols.enclosing_function().and_then(|function| function.ty.signature()),
        }
        .ok_or(CodegenError::MissingFunctionContext { span: e.span })?;

        let mut argument_bytes = 0;
        for (arg, param) in e.args.iter().zip(signature.inputs).rev() {
            self.accept_covariant(*param, *arg)?;
            argument_bytes += param.size();
        }

        let import = match e.callee {
            Some(Expr::Rvalue(rvalue)) => self.external_name(rvalue.lvalue),
            _ => None,
        };
        match (import, e.callee) {
            (Some(name), _) => self.emit(Instruction::Call(name)),
            (None, Some(callee)) => {
                self.emit_expr(callee)?;
                self.emit(Instruction::Branch);
            }
            (None, None) => {
                let current = self.current_function(e.span)?;
                self.emit(Instruction::Addr(current));
                self.emit(Instruction::Branch);
            }
        }

        if argument_bytes > 0 {
            self.emit(Instruction::Trash(argument_bytes));
        }
        match signature.output {
            Type::Void => {}
            Type::Double => self.emit(Instruction::LdFval64),
            _ => self.emit(Instruction::LdFval32),
        }
        Ok(())
    }
}

/// Bytes one element behind a pointer of type `ty` spans (at least 1).
fn element_size(ty: Type<'_>) -> i32 {
    ty.referenced().map_or(1, |referenced| referenced.size().max(1)) as i32
}
