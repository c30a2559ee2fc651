//! til Compiler
//!
//! Type checking and postfix code generation for til programs.
//!
//! ## Architecture
//!
//! - **Pass 1 (Checking)**: resolve the type of every node and validate the
//!   program, annotating the tree in place
//! - **Pass 2 (Generation)**: walk the annotated tree and emit postfix
//!   stack-machine instructions, lowering the iteration forms and wrapping
//!   covariant function values along the way
//!
//! ## Modules
//!
//! - [`checker`]: the type checker
//! - [`coercion`]: type compatibility rules
//! - [`config`]: code generation options
//! - [`emit`]: label allocation and loop targets
//! - [`frame`]: frame sizing for function bodies
//! - [`postfix`]: the instruction set and emitters
//! - [`symbol`]: symbols and nested scopes
//! - [`writer`]: the postfix code generator

pub mod checker;
pub mod coercion;
pub mod config;
pub mod emit;
pub mod frame;
pub mod postfix;
pub mod symbol;
pub mod writer;

pub use checker::TypeChecker;
pub use coercion::{compatible, needs_wrapper};
pub use config::CodegenOptions;
pub use emit::{LabelAllocator, LoopStack, LoopTargets};
pub use frame::FrameSizeCalculator;
pub use postfix::{Instruction, Listing, PostfixEmitter, SymbolKind};
pub use symbol::{FUNCTION_SYMBOL, Symbol, SymbolTable};
pub use writer::PostfixWriter;

// Re-export the error types from core for convenience
pub use til_core::{CodegenError, CompileError, SemanticError};
