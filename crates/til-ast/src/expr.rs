//! Expression AST nodes.
//!
//! Provides nodes for every value-producing construct:
//! - Literals (integer, double, string) and `null`
//! - Unary and binary operations
//! - Lvalues (variables, pointer indexing) and their uses (rvalue, assignment, address-of)
//! - `input`, `sizeof`, `objects`
//! - Function calls and function definitions (functions are values)
//!
//! Every node owns a [`TypeSlot`] written by the type checker.

use til_core::{Span, Type};

use crate::decl::FunctionDef;
use crate::ops::{BinaryOp, UnaryOp};
use crate::slot::TypeSlot;

/// An expression.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Expr<'ast> {
    /// Integer, double or string literal
    Literal(&'ast LiteralExpr<'ast>),
    /// `null`
    Null(&'ast NullExpr<'ast>),
    /// Unary prefix operation
    Unary(&'ast UnaryExpr<'ast>),
    /// Binary operation
    Binary(&'ast BinaryExpr<'ast>),
    /// Value stored at an lvalue
    Rvalue(&'ast RvalueExpr<'ast>),
    /// Assignment
    Assign(&'ast AssignExpr<'ast>),
    /// Address of an lvalue
    AddressOf(&'ast AddressOfExpr<'ast>),
    /// `input`: read a value from the runtime
    Read(&'ast ReadExpr<'ast>),
    /// `sizeof`
    SizeOf(&'ast SizeOfExpr<'ast>),
    /// `objects`: vector allocation
    Objects(&'ast ObjectsExpr<'ast>),
    /// Function call
    Call(&'ast CallExpr<'ast>),
    /// Function definition (a function value)
    Function(&'ast FunctionDef<'ast>),
}

impl<'ast> Expr<'ast> {
    /// Get the span of this expression.
    pub fn span(&self) -> Span {
        match self {
            Self::Literal(e) => e.span,
            Self::Null(e) => e.span,
            Self::Unary(e) => e.span,
            Self::Binary(e) => e.span,
            Self::Rvalue(e) => e.span,
            Self::Assign(e) => e.span,
            Self::AddressOf(e) => e.span,
            Self::Read(e) => e.span,
            Self::SizeOf(e) => e.span,
            Self::Objects(e) => e.span,
            Self::Call(e) => e.span,
            Self::Function(e) => e.span,
        }
    }

    /// The node's resolved-type slot.
    pub fn slot(&self) -> &'ast TypeSlot<'ast> {
        match *self {
            Self::Literal(e) => &e.ty,
            Self::Null(e) => &e.ty,
            Self::Unary(e) => &e.ty,
            Self::Binary(e) => &e.ty,
            Self::Rvalue(e) => &e.ty,
            Self::Assign(e) => &e.ty,
            Self::AddressOf(e) => &e.ty,
            Self::Read(e) => &e.ty,
            Self::SizeOf(e) => &e.ty,
            Self::Objects(e) => &e.ty,
            Self::Call(e) => &e.ty,
            Self::Function(e) => &e.ty,
        }
    }

    /// Currently resolved type (`Unspec` until checked).
    #[inline]
    pub fn ty(&self) -> Type<'ast> {
        self.slot().get()
    }

    /// Whether this expression is a compile-time constant usable as a
    /// global initializer: a literal, `null`, or a function definition.
    pub fn is_static_initializer(&self) -> bool {
        matches!(self, Self::Literal(_) | Self::Null(_) | Self::Function(_))
    }
}

/// A literal value.
#[derive(Debug, PartialEq)]
pub struct LiteralExpr<'ast> {
    /// The literal kind
    pub kind: LiteralKind<'ast>,
    /// Resolved type
    pub ty: TypeSlot<'ast>,
    /// Source location
    pub span: Span,
}

/// The kind of literal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LiteralKind<'ast> {
    /// Integer literal
    Int(i32),
    /// Double literal
    Double(f64),
    /// String literal
    String(&'ast str),
}

/// The `null` pointer.
#[derive(Debug, PartialEq)]
pub struct NullExpr<'ast> {
    pub ty: TypeSlot<'ast>,
    pub span: Span,
}

/// A unary prefix operation.
#[derive(Debug, PartialEq)]
pub struct UnaryExpr<'ast> {
    /// The operator
    pub op: UnaryOp,
    /// The operand
    pub operand: Expr<'ast>,
    /// Resolved type
    pub ty: TypeSlot<'ast>,
    /// Source location
    pub span: Span,
}

/// A binary operation.
#[derive(Debug, PartialEq)]
pub struct BinaryExpr<'ast> {
    /// Left operand
    pub left: Expr<'ast>,
    /// The operator
    pub op: BinaryOp,
    /// Right operand
    pub right: Expr<'ast>,
    /// Resolved type
    pub ty: TypeSlot<'ast>,
    /// Source location
    pub span: Span,
}

/// Something that denotes a storage location.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Lvalue<'ast> {
    /// A named variable
    Variable(&'ast VariableExpr<'ast>),
    /// `base[index]`
    Index(&'ast IndexExpr<'ast>),
}

impl<'ast> Lvalue<'ast> {
    /// Get the span of this lvalue.
    pub fn span(&self) -> Span {
        match self {
            Self::Variable(v) => v.span,
            Self::Index(i) => i.span,
        }
    }

    /// The node's resolved-type slot.
    pub fn slot(&self) -> &'ast TypeSlot<'ast> {
        match *self {
            Self::Variable(v) => &v.ty,
            Self::Index(i) => &i.ty,
        }
    }

    /// Currently resolved type (`Unspec` until checked).
    #[inline]
    pub fn ty(&self) -> Type<'ast> {
        self.slot().get()
    }
}

/// A reference to a named variable.
#[derive(Debug, PartialEq)]
pub struct VariableExpr<'ast> {
    /// The identifier
    pub name: &'ast str,
    /// Resolved type
    pub ty: TypeSlot<'ast>,
    /// Source location
    pub span: Span,
}

/// Pointer indexing: `base[index]`.
#[derive(Debug, PartialEq)]
pub struct IndexExpr<'ast> {
    /// The pointer being indexed
    pub base: Expr<'ast>,
    /// The element index
    pub index: Expr<'ast>,
    /// Resolved type (the element type)
    pub ty: TypeSlot<'ast>,
    /// Source location
    pub span: Span,
}

/// The value stored at an lvalue.
#[derive(Debug, PartialEq)]
pub struct RvalueExpr<'ast> {
    pub lvalue: Lvalue<'ast>,
    pub ty: TypeSlot<'ast>,
    pub span: Span,
}

/// Assignment: `lvalue = value`.
#[derive(Debug, PartialEq)]
pub struct AssignExpr<'ast> {
    /// Target location
    pub lvalue: Lvalue<'ast>,
    /// Value to store
    pub value: Expr<'ast>,
    /// Resolved type (the target's type)
    pub ty: TypeSlot<'ast>,
    /// Source location
    pub span: Span,
}

/// Address of an lvalue: `lvalue?`.
#[derive(Debug, PartialEq)]
pub struct AddressOfExpr<'ast> {
    pub lvalue: Lvalue<'ast>,
    pub ty: TypeSlot<'ast>,
    pub span: Span,
}

/// `input`: the type is decided by the context it is used in.
#[derive(Debug, PartialEq)]
pub struct ReadExpr<'ast> {
    pub ty: TypeSlot<'ast>,
    pub span: Span,
}

/// `sizeof(expr)`.
#[derive(Debug, PartialEq)]
pub struct SizeOfExpr<'ast> {
    /// Only the operand's type is used
    pub operand: Expr<'ast>,
    pub ty: TypeSlot<'ast>,
    pub span: Span,
}

/// `objects(count)`: allocate `count` elements on the stack.
#[derive(Debug, PartialEq)]
pub struct ObjectsExpr<'ast> {
    /// Number of elements
    pub count: Expr<'ast>,
    /// Resolved type (a pointer refined by context)
    pub ty: TypeSlot<'ast>,
    /// Source location
    pub span: Span,
}

/// A function call.
#[derive(Debug, PartialEq)]
pub struct CallExpr<'ast> {
    /// The function value; `None` calls the enclosing function
    pub callee: Option<Expr<'ast>>,
    /// Arguments in source order
    pub args: &'ast [Expr<'ast>],
    /// Resolved type (the callee's output)
    pub ty: TypeSlot<'ast>,
    /// Source location
    pub span: Span,
}
