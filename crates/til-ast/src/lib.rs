//! Abstract syntax tree for til programs.
//!
//! Nodes are allocated in a [`bumpalo::Bump`] arena through [`AstBuilder`]
//! and referenced with the `'ast` lifetime. Every expression, lvalue and
//! declaration owns a [`TypeSlot`]; the type checker fills these in place
//! and code generation reads them back.
//!
//! - [`Expr`], [`Lvalue`]: value-producing nodes
//! - [`Instr`], [`Block`]: instructions
//! - [`Declaration`], [`FunctionDef`], [`Program`]: declarations and the root

mod builder;
mod decl;
mod expr;
mod ops;
mod slot;
mod stmt;

pub use builder::AstBuilder;
pub use decl::{Declaration, FunctionDef, Program};
pub use expr::{
    AddressOfExpr, AssignExpr, BinaryExpr, CallExpr, Expr, IndexExpr, LiteralExpr, LiteralKind,
    Lvalue, NullExpr, ObjectsExpr, ReadExpr, RvalueExpr, SizeOfExpr, UnaryExpr, VariableExpr,
};
pub use ops::{BinaryOp, UnaryOp};
pub use slot::TypeSlot;
pub use stmt::{
    Block, EvalStmt, IfStmt, Instr, IterateStmt, LoopControl, LoopStmt, PrintStmt, ReturnStmt,
    SweepStmt, UnlessStmt, WithStmt,
};
