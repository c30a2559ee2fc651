//! Type checker.
//!
//! The [`TypeChecker`] resolves the type of every expression node in place,
//! writing each node's [`TypeSlot`](til_ast::TypeSlot), and creates symbols
//! as declarations are met. It handles:
//! - Literal typing and `Unspec` defaulting from context
//! - Arithmetic, comparison and logical operators
//! - Lvalues, assignment, address-of and pointer indexing
//! - Calls, including self-calls through the `@` binding
//! - Declarations with inference, forward replacement and qualifier rules
//! - Instructions: evaluation, print, conditions, returns and the
//!   iteration forms
//!
//! A node whose slot already holds a concrete type is not checked again, so
//! running the checker over an annotated tree is a no-op. The code
//! generator relies on this to resolve the subtrees it synthesizes.
//!
//! # Example
//!
//! ```
//! use bumpalo::Bump;
//! use til_ast::{AstBuilder, BinaryOp};
//! use til_compiler::{SymbolTable, TypeChecker};
//! use til_core::Type;
//!
//! let arena = Bump::new();
//! let b = AstBuilder::new(&arena);
//! let expr = b.binary(b.int(1), BinaryOp::Mul, b.double(2.5));
//!
//! let mut symbols = SymbolTable::new();
//! let mut checker = TypeChecker::new(&mut symbols, b);
//! assert_eq!(checker.check_expr(expr).unwrap(), Type::Double);
//! ```

mod decl;
mod expr;
mod stmt;
mod sugar;

use til_ast::{AstBuilder, Expr, FunctionDef, Program};
use til_core::{SemanticError, Span, Type};

use crate::symbol::{Symbol, SymbolTable};

type Result<T> = std::result::Result<T, SemanticError>;

/// Resolves and checks types over a tree.
pub struct TypeChecker<'t, 'ast> {
    /// Scopes the checker declares into and resolves names from
    symbols: &'t mut SymbolTable<'ast>,
    /// Arena access for derived types
    builder: AstBuilder<'ast>,
    /// Whether function literals have their bodies checked
    walks_bodies: bool,
}

impl<'t, 'ast> TypeChecker<'t, 'ast> {
    /// A checker for a whole program: function bodies are walked.
    pub fn new(symbols: &'t mut SymbolTable<'ast>, builder: AstBuilder<'ast>) -> Self {
        Self {
            symbols,
            builder,
            walks_bodies: true,
        }
    }

    /// A checker for use during code generation.
    ///
    /// Function literals are typed but their bodies are left alone; the
    /// writer walks them itself, declaring as it goes.
    pub fn for_codegen(symbols: &'t mut SymbolTable<'ast>, builder: AstBuilder<'ast>) -> Self {
        Self {
            symbols,
            builder,
            walks_bodies: false,
        }
    }

    /// The symbol table being populated.
    pub fn symbols(&self) -> &SymbolTable<'ast> {
        self.symbols
    }

    /// Check every global declaration, then the entry function.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn check_program(&mut self, program: &Program<'ast>) -> Result<()> {
        for decl in program.declarations {
            self.check_declaration(decl)?;
        }
        if let Some(main) = program.main {
            self.check_function_def(main)?;
        }
        Ok(())
    }

    /// Bind `@` to `def` in the innermost scope.
    ///
    /// Callers push the function's parameter scope first, so the binding is
    /// dropped together with the parameters.
    pub fn bind_function(&mut self, def: &FunctionDef<'ast>) {
        let symbol = Symbol::function(def.function_type(), def.is_main);
        if !self.symbols.insert(symbol) {
            self.symbols.replace(symbol);
        }
    }

    /// Type a function literal and, when walking bodies, check its body.
    ///
    /// Scope layout: a parameter scope holding `@` and the parameters, then
    /// the body block's own scope.
    pub(crate) fn check_function_def(&mut self, def: &FunctionDef<'ast>) -> Result<Type<'ast>> {
        let ty = def.function_type();
        def.ty.set(ty);
        if self.walks_bodies {
            self.in_scope(|checker| {
                checker.bind_function(def);
                for param in def.params {
                    checker.check_declaration(param)?;
                }
                checker.check_block(def.body)
            })?;
        }
        Ok(ty)
    }

    /// Run `f` inside a fresh scope.
    fn in_scope<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        self.symbols.push();
        let result = f(self);
        self.symbols.pop();
        result
    }

    /// Check `expr` and require an integer, defaulting `Unspec` to `Int`.
    fn expect_int(&mut self, expr: Expr<'ast>, operand: &'static str, construct: &'static str) -> Result<()> {
        match self.check_expr(expr)? {
            Type::Int => Ok(()),
            Type::Unspec => {
                expr.slot().set(Type::Int);
                Ok(())
            }
            other => Err(wrong_operand(operand, construct, other, expr.span())),
        }
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn wrong_operand(operand: &'static str, construct: &'static str, found: Type<'_>, span: Span) -> SemanticError {
    SemanticError::WrongOperandType {
        operand,
        construct,
        found: found.to_string(),
        span,
    }
}

/// Give `expr` type `ty` if it is still unresolved; return its type.
fn resolve_unspec<'ast>(expr: Expr<'ast>, ty: Type<'ast>) -> Type<'ast> {
    if expr.ty().is_unspec() {
        expr.slot().set(ty);
    }
    expr.ty()
}

/// Refine a generic pointer value toward the pointer type it is stored as.
///
/// Applies when the value points to `unspec`/`void`, or the target points to
/// `void`.
fn unify_pointer<'ast>(value: Expr<'ast>, target: Type<'ast>) {
    if let (Type::Pointer(to), Type::Pointer(from)) = (target, value.ty()) {
        if matches!(from, Type::Unspec | Type::Void) || matches!(to, Type::Void) {
            value.slot().set(target);
        }
    }
}

/// Default for an `Unspec` value stored into `target`.
fn scalar_default<'ast>(target: Type<'ast>) -> Type<'ast> {
    if target.is_double() { Type::Double } else { Type::Int }
}
