//! Declarations, function definitions and the program root.

use til_core::{FunctionType, Qualifier, Span, Type};

use crate::expr::Expr;
use crate::slot::TypeSlot;
use crate::stmt::Block;

/// A variable declaration (global, local or parameter).
#[derive(Debug, PartialEq)]
pub struct Declaration<'ast> {
    /// Linkage/visibility qualifier
    pub qualifier: Qualifier,
    /// Declared name
    pub name: &'ast str,
    /// Explicit type; `None` means `var` (inferred from the initializer)
    pub declared: Option<Type<'ast>>,
    /// Optional initializer
    pub initializer: Option<Expr<'ast>>,
    /// Resolved type: the declared type, or the inferred one after checking
    pub ty: TypeSlot<'ast>,
    /// Source location
    pub span: Span,
}

impl<'ast> Declaration<'ast> {
    /// Currently resolved type of the declared variable.
    #[inline]
    pub fn ty(&self) -> Type<'ast> {
        self.ty.get()
    }
}

/// A function literal.
///
/// Functions are values: a definition evaluates to the address of its code.
#[derive(Debug, PartialEq)]
pub struct FunctionDef<'ast> {
    /// Parameters in order; each has a declared type
    pub params: &'ast [&'ast Declaration<'ast>],
    /// Signature derived from the parameter and return types
    pub signature: &'ast FunctionType<'ast>,
    /// Function body
    pub body: &'ast Block<'ast>,
    /// Whether this is the program's entry function
    pub is_main: bool,
    /// Resolved type (always the signature once checked)
    pub ty: TypeSlot<'ast>,
    /// Source location
    pub span: Span,
}

impl<'ast> FunctionDef<'ast> {
    /// The function's type.
    #[inline]
    pub fn function_type(&self) -> Type<'ast> {
        Type::Function(self.signature)
    }

    /// The declared output type.
    #[inline]
    pub fn output(&self) -> Type<'ast> {
        self.signature.output
    }
}

/// A whole compilation unit.
#[derive(Debug, PartialEq)]
pub struct Program<'ast> {
    /// Module-level declarations, in source order
    pub declarations: &'ast [&'ast Declaration<'ast>],
    /// The entry function, if the unit has one
    pub main: Option<&'ast FunctionDef<'ast>>,
}
