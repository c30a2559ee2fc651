//! Declaration checking and symbol creation.

use til_ast::Declaration;
use til_core::{Qualifier, SemanticError, Type};

use super::{Result, TypeChecker, scalar_default, unify_pointer};
use crate::coercion::compatible;
use crate::symbol::Symbol;

impl<'t, 'ast> TypeChecker<'t, 'ast> {
    /// Resolve a declaration's type and bind it in the innermost scope.
    ///
    /// Without a declared type the initializer decides. A name already bound
    /// in the same scope may only be redeclared over a `forward`/`external`
    /// declaration of the identical type, which the new symbol replaces.
    ///
    /// Returns the symbol as bound (global storage; callers that place the
    /// variable in a frame update the offset).
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn check_declaration(&mut self, decl: &Declaration<'ast>) -> Result<Symbol<'ast>> {
        let ty = match decl.declared {
            None => self.infer_declaration(decl)?,
            Some(ty) => {
                self.check_initializer(decl, ty)?;
                ty
            }
        };

        if ty.is_void() {
            return Err(SemanticError::VoidDeclaration {
                name: decl.name.to_string(),
                span: decl.span,
            });
        }
        if decl.qualifier == Qualifier::External && !ty.is_function() {
            return Err(SemanticError::ExternalNonFunction {
                name: decl.name.to_string(),
                span: decl.span,
            });
        }

        decl.ty.set(ty);
        let symbol = Symbol::new(decl.name, ty, decl.qualifier);
        if self.symbols.insert(symbol) {
            return Ok(symbol);
        }

        match self.symbols.find_local(decl.name) {
            Some(previous) if previous.qualifier.is_declaration_only() && compatible(previous.ty, ty, false) => {
                self.symbols.replace(symbol);
                Ok(symbol)
            }
            _ => Err(SemanticError::Redeclaration {
                name: decl.name.to_string(),
                span: decl.span,
            }),
        }
    }

    /// `var` declarations take the initializer's type, with open types
    /// settled to `int` / `int!`.
    fn infer_declaration(&mut self, decl: &Declaration<'ast>) -> Result<Type<'ast>> {
        let Some(init) = decl.initializer else {
            return Ok(Type::Int);
        };

        let ty = match self.check_expr(init)? {
            Type::Unspec => Type::Int,
            ty if ty.referenced() == Some(Type::Unspec) => Type::INT_POINTER,
            ty => return Ok(ty),
        };
        init.slot().set(ty);
        Ok(ty)
    }

    fn check_initializer(&mut self, decl: &Declaration<'ast>, ty: Type<'ast>) -> Result<()> {
        let Some(init) = decl.initializer else {
            return Ok(());
        };

        if self.check_expr(init)?.is_unspec() {
            init.slot().set(scalar_default(ty));
        } else {
            unify_pointer(init, ty);
        }

        if !compatible(ty, init.ty(), true) {
            return Err(SemanticError::InitializerTypeMismatch {
                name: decl.name.to_string(),
                expected: ty.to_string(),
                found: init.ty().to_string(),
                span: decl.span,
            });
        }
        Ok(())
    }
}
