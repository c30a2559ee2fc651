//! Instruction AST nodes.
//!
//! Instructions do not produce values and carry no type slot. Besides the
//! primitive control flow (`if`, `loop`, `next`, `stop`, `return`), four
//! vector iteration forms (`with`, `unless`, `sweep`, `iterate`) are kept
//! as distinct nodes; code generation lowers them to primitive loops.

use til_core::Span;

use crate::decl::Declaration;
use crate::expr::Expr;

/// An instruction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Instr<'ast> {
    /// Expression evaluated for its side effects
    Eval(&'ast EvalStmt<'ast>),
    /// `!` / `!!`: print values
    Print(&'ast PrintStmt<'ast>),
    /// Nested block
    Block(&'ast Block<'ast>),
    /// `if` with optional `else`
    If(&'ast IfStmt<'ast>),
    /// `loop`
    Loop(&'ast LoopStmt<'ast>),
    /// `next N`: continue the N-th enclosing loop
    Next(&'ast LoopControl),
    /// `stop N`: break out of the N-th enclosing loop
    Stop(&'ast LoopControl),
    /// `return`
    Return(&'ast ReturnStmt<'ast>),
    /// `with`
    With(&'ast WithStmt<'ast>),
    /// `unless`
    Unless(&'ast UnlessStmt<'ast>),
    /// `sweep`
    Sweep(&'ast SweepStmt<'ast>),
    /// `iterate`
    Iterate(&'ast IterateStmt<'ast>),
}

impl<'ast> Instr<'ast> {
    /// Get the span of this instruction.
    pub fn span(&self) -> Span {
        match self {
            Self::Eval(s) => s.span,
            Self::Print(s) => s.span,
            Self::Block(s) => s.span,
            Self::If(s) => s.span,
            Self::Loop(s) => s.span,
            Self::Next(s) | Self::Stop(s) => s.span,
            Self::Return(s) => s.span,
            Self::With(s) => s.span,
            Self::Unless(s) => s.span,
            Self::Sweep(s) => s.span,
            Self::Iterate(s) => s.span,
        }
    }
}

/// A block: declarations first, then instructions.
#[derive(Debug, PartialEq)]
pub struct Block<'ast> {
    /// Block-local declarations
    pub declarations: &'ast [&'ast Declaration<'ast>],
    /// Instructions in execution order
    pub instructions: &'ast [Instr<'ast>],
    /// Source location
    pub span: Span,
}

/// An expression evaluated for its side effects; its value is discarded.
#[derive(Debug, PartialEq)]
pub struct EvalStmt<'ast> {
    pub expr: Expr<'ast>,
    pub span: Span,
}

/// Print a sequence of values.
#[derive(Debug, PartialEq)]
pub struct PrintStmt<'ast> {
    /// Values, printed left to right
    pub args: &'ast [Expr<'ast>],
    /// Whether a line break follows
    pub newline: bool,
    /// Source location
    pub span: Span,
}

/// Conditional with optional else branch.
#[derive(Debug, PartialEq)]
pub struct IfStmt<'ast> {
    /// Condition (integer truth value)
    pub condition: Expr<'ast>,
    /// Then branch
    pub then_branch: Instr<'ast>,
    /// Optional else branch
    pub else_branch: Option<Instr<'ast>>,
    /// Source location
    pub span: Span,
}

/// Pre-tested loop.
#[derive(Debug, PartialEq)]
pub struct LoopStmt<'ast> {
    /// Condition checked before every iteration
    pub condition: Expr<'ast>,
    /// Loop body
    pub body: Instr<'ast>,
    /// Source location
    pub span: Span,
}

/// `next` / `stop` with its loop level (1 = innermost).
#[derive(Debug, PartialEq, Eq)]
pub struct LoopControl {
    pub level: u32,
    pub span: Span,
}

/// `return` with an optional value.
#[derive(Debug, PartialEq)]
pub struct ReturnStmt<'ast> {
    pub value: Option<Expr<'ast>>,
    pub span: Span,
}

/// Apply `function` to `vector[low..high]`.
#[derive(Debug, PartialEq)]
pub struct WithStmt<'ast> {
    pub function: Expr<'ast>,
    pub vector: Expr<'ast>,
    pub low: Expr<'ast>,
    pub high: Expr<'ast>,
    pub span: Span,
}

/// Apply `function` to `vector[0..count]` unless `condition` holds.
#[derive(Debug, PartialEq)]
pub struct UnlessStmt<'ast> {
    pub condition: Expr<'ast>,
    pub vector: Expr<'ast>,
    pub count: Expr<'ast>,
    pub function: Expr<'ast>,
    pub span: Span,
}

/// Apply `function` to `vector[low..high]` if `condition` holds.
///
/// `high` is evaluated before every iteration.
#[derive(Debug, PartialEq)]
pub struct SweepStmt<'ast> {
    pub vector: Expr<'ast>,
    pub low: Expr<'ast>,
    pub high: Expr<'ast>,
    pub function: Expr<'ast>,
    pub condition: Expr<'ast>,
    pub span: Span,
}

/// Apply `function` to `vector[0..count]` if `condition` holds.
///
/// `count` is evaluated before every iteration.
#[derive(Debug, PartialEq)]
pub struct IterateStmt<'ast> {
    pub vector: Expr<'ast>,
    pub count: Expr<'ast>,
    pub function: Expr<'ast>,
    pub condition: Expr<'ast>,
    pub span: Span,
}
