//! Values stored into a slot of a wider type.
//!
//! Wherever a value meets a declared type (initializers, assignments,
//! arguments, return values) an `int` is widened to `double`. A function
//! value whose signature differs from the slot's only by such widenings is
//! wrapped: a synthesized function with the slot's signature converts the
//! arguments, calls the original through a hidden global, and converts the
//! result.

use til_ast::{Declaration, Expr};
use til_core::{CodegenError, Qualifier, Type};

use super::{PostfixWriter, Result};
use crate::coercion::needs_wrapper;
use crate::postfix::Instruction;

impl<'w, 'ast> PostfixWriter<'w, 'ast> {
    /// Push `expr` as a value of type `target`.
    ///
    /// Narrowing `double` to `int` only arises for the arguments a wrapper
    /// forwards.
    pub(super) fn accept_covariant(&mut self, target: Type<'ast>, expr: Expr<'ast>) -> Result<()> {
        let source = self.checker().check_expr(expr)?;
        match (target, source) {
            (Type::Double, Type::Int) => {
                self.emit_expr(expr)?;
                self.emit(Instruction::I2D);
            }
            (Type::Int, Type::Double) => {
                self.emit_expr(expr)?;
                self.emit(Instruction::D2I);
            }
            _ if needs_wrapper(target, source) => {
                let label = self.emit_wrapper(target, expr)?;
                self.emit_function_address(label);
            }
            _ => self.emit_expr(expr)?,
        }
        Ok(())
    }

    /// Generate a wrapper giving the function value `source` the signature
    /// of `target`, and return the wrapper's label.
    ///
    /// The value is kept in a private global. Inside a function it is
    /// stored there at run time; at global scope `source` is a function
    /// literal and becomes the global's static initializer.
    ///
    /// Postfix layout (inside a function):
    /// ```text
    /// BSS
    /// ALIGN
    /// LABEL hidden
    /// SALLOC 4
    /// TEXT current
    /// ALIGN
    /// [source]
    /// DUP32
    /// ADDR hidden
    /// STINT
    /// TRASH 4
    /// [wrapper function]
    /// ```
    pub(super) fn emit_wrapper(&mut self, target: Type<'ast>, source: Expr<'ast>) -> Result<String> {
        let missing = || CodegenError::MissingFunctionContext { span: source.span() };
        let target_signature = target.signature().ok_or_else(missing)?;
        let source_type = source.ty();
        let source_signature = source_type.signature().ok_or_else(missing)?;

        let b = self.builder.at(source.span());
        let hidden = format!("{}{}", self.options.wrapper_prefix, self.labels.fresh());

        if let Some(current) = self.function_labels.last().cloned() {
            let slot = b.declaration(Qualifier::Private, &hidden, Some(source_type), None);
            self.emit_global_declaration(slot)?;
            self.emit(Instruction::Text(current));
            self.emit(Instruction::Align);
            self.emit_evaluation(b.assign(b.variable(&hidden), source))?;
        } else {
            let slot = b.declaration(Qualifier::Private, &hidden, Some(source_type), Some(source));
            self.emit_global_declaration(slot)?;
        }

        let params: Vec<&'ast Declaration<'ast>> = target_signature
            .inputs
            .iter()
            .enumerate()
            .map(|(i, ty)| b.param(&format!("_arg{i}"), *ty))
            .collect();
        let args: Vec<Expr<'ast>> = (0..params.len()).map(|i| b.var(&format!("_arg{i}"))).collect();
        let forward = b.call_resolved(b.var(&hidden), &args, source_signature.output);

        let body = if target_signature.output.is_void() {
            b.block(&[], &[b.eval(forward)])
        } else {
            b.block(&[], &[b.ret(Some(forward))])
        };
        let wrapper = b.function_def(&params, target_signature.output, body);
        self.emit_function(wrapper)
    }
}
