//! Error types for semantic analysis and code generation.
//!
//! ## Error Hierarchy
//!
//! ```text
//! CompileError (top-level wrapper)
//! ├── SemanticError - type checking violations
//! └── CodegenError  - code generation invariant violations
//! ```
//!
//! Every variant carries the [`Span`] of the offending node. The first error
//! aborts compilation; there is no recovery or batching.

use thiserror::Error;

use crate::Span;

// ============================================================================
// Semantic Errors
// ============================================================================

/// A rule of the type system was violated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SemanticError {
    /// A name was used without a visible declaration.
    #[error("at {span}: undeclared variable '{name}'")]
    UndeclaredVariable {
        /// The identifier that wasn't found.
        name: String,
        /// Where it was referenced.
        span: Span,
    },

    /// An operand of a construct has a type the construct does not accept.
    #[error("at {span}: wrong type in {operand} of {construct} (found {found})")]
    WrongOperandType {
        /// Which operand (e.g. "left argument", "condition").
        operand: &'static str,
        /// Which construct (e.g. "arithmetic expression", "with instruction").
        construct: &'static str,
        /// The offending type.
        found: String,
        /// Where the operand occurred.
        span: Span,
    },

    /// A call supplies the wrong number of arguments.
    #[error("at {span}: incorrect number of arguments (expected {expected}, found {found})")]
    ArgumentCountMismatch {
        expected: usize,
        found: usize,
        span: Span,
    },

    /// A call argument is not compatible with its parameter.
    #[error("at {span}: incorrect type for argument {position} (expected {expected}, found {found})")]
    ArgumentTypeMismatch {
        /// 1-based argument position.
        position: usize,
        expected: String,
        found: String,
        span: Span,
    },

    /// The value of an assignment is not compatible with its target.
    #[error("at {span}: cannot assign {found} to {expected}")]
    AssignmentTypeMismatch {
        expected: String,
        found: String,
        span: Span,
    },

    /// A declaration's initializer is not compatible with its declared type.
    #[error("at {span}: wrong type in initializer for '{name}' (expected {expected}, found {found})")]
    InitializerTypeMismatch {
        name: String,
        expected: String,
        found: String,
        span: Span,
    },

    /// A returned value is not compatible with the function's output type.
    #[error("at {span}: incorrect type for return value (expected {expected}, found {found})")]
    ReturnTypeMismatch {
        expected: String,
        found: String,
        span: Span,
    },

    /// `return` used outside of any function.
    #[error("at {span}: return outside of a function")]
    ReturnOutsideFunction { span: Span },

    /// Bare `return` in a function that produces a value.
    #[error("at {span}: missing return value in non-void function")]
    MissingReturnValue { span: Span },

    /// `return` with a value in a void function.
    #[error("at {span}: return value in void function")]
    UnexpectedReturnValue { span: Span },

    /// Self-call (no callee) outside of any function.
    #[error("at {span}: recursive call outside of a function")]
    SelfCallOutsideFunction { span: Span },

    /// Self-call (no callee) inside the program's entry function.
    #[error("at {span}: recursive call within the main block")]
    SelfCallInMain { span: Span },

    /// A call target is not a function value.
    #[error("at {span}: called value of type {found} is not a function")]
    NotAFunction { found: String, span: Span },

    /// A declaration would introduce a void-typed variable.
    #[error("at {span}: cannot declare '{name}' of type void")]
    VoidDeclaration { name: String, span: Span },

    /// An `external` declaration that is not a function.
    #[error("at {span}: foreign declaration of non-function '{name}'")]
    ExternalNonFunction { name: String, span: Span },

    /// A name declared twice in the same scope.
    #[error("at {span}: redeclaration of '{name}'")]
    Redeclaration { name: String, span: Span },
}

impl SemanticError {
    /// Get the span where this error occurred.
    pub fn span(&self) -> Span {
        match self {
            SemanticError::UndeclaredVariable { span, .. }
            | SemanticError::WrongOperandType { span, .. }
            | SemanticError::ArgumentCountMismatch { span, .. }
            | SemanticError::ArgumentTypeMismatch { span, .. }
            | SemanticError::AssignmentTypeMismatch { span, .. }
            | SemanticError::InitializerTypeMismatch { span, .. }
            | SemanticError::ReturnTypeMismatch { span, .. }
            | SemanticError::ReturnOutsideFunction { span }
            | SemanticError::MissingReturnValue { span }
            | SemanticError::UnexpectedReturnValue { span }
            | SemanticError::SelfCallOutsideFunction { span }
            | SemanticError::SelfCallInMain { span }
            | SemanticError::NotAFunction { span, .. }
            | SemanticError::VoidDeclaration { span, .. }
            | SemanticError::ExternalNonFunction { span, .. }
            | SemanticError::Redeclaration { span, .. } => *span,
        }
    }
}

// ============================================================================
// Code Generation Errors
// ============================================================================

/// Code generation found a tree it cannot lower.
///
/// Apart from `UnreachableCode` and `NonLiteralGlobalInitializer`, these only
/// fire on trees that skipped or failed type checking.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodegenError {
    /// `next 0` / `stop 0`.
    #[error("at {span}: invalid {keyword} level 0")]
    InvalidLoopLevel { keyword: &'static str, span: Span },

    /// A loop control level exceeds the enclosing loop depth.
    #[error("at {span}: {keyword} {level} not within {level} loops (depth is {depth})")]
    LoopLevelOutOfRange {
        keyword: &'static str,
        level: u32,
        depth: usize,
        span: Span,
    },

    /// An instruction follows a return/next/stop in the same block.
    #[error("at {span}: unreachable code after a final instruction")]
    UnreachableCode { span: Span },

    /// A global initialized with something other than a literal or function.
    #[error("at {span}: non-literal initializer for global variable '{name}'")]
    NonLiteralGlobalInitializer { name: String, span: Span },

    /// A name with no symbol at code generation time.
    #[error("at {span}: no symbol for '{name}'")]
    UnknownSymbol { name: String, span: Span },

    /// A return or self-call with no enclosing function.
    #[error("at {span}: no enclosing function")]
    MissingFunctionContext { span: Span },
}

impl CodegenError {
    /// Get the span where this error occurred.
    pub fn span(&self) -> Span {
        match self {
            CodegenError::InvalidLoopLevel { span, .. }
            | CodegenError::LoopLevelOutOfRange { span, .. }
            | CodegenError::UnreachableCode { span }
            | CodegenError::NonLiteralGlobalInitializer { span, .. }
            | CodegenError::UnknownSymbol { span, .. }
            | CodegenError::MissingFunctionContext { span } => *span,
        }
    }
}

// ============================================================================
// Top-level Error
// ============================================================================

/// Any failure of the check-then-generate pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    /// A type checking error.
    #[error(transparent)]
    Semantic(#[from] SemanticError),

    /// A code generation error.
    #[error(transparent)]
    Codegen(#[from] CodegenError),
}

impl CompileError {
    /// Check if this is a type checking error.
    pub fn is_semantic(&self) -> bool {
        matches!(self, CompileError::Semantic(_))
    }

    /// Check if this is a code generation error.
    pub fn is_codegen(&self) -> bool {
        matches!(self, CompileError::Codegen(_))
    }

    /// Get the span where this error occurred.
    pub fn span(&self) -> Span {
        match self {
            CompileError::Semantic(e) => e.span(),
            CompileError::Codegen(e) => e.span(),
        }
    }
}
