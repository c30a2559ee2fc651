//! Core types shared by the til compiler crates.
//!
//! - [`Span`]: source positions
//! - [`Type`], [`FunctionType`]: the value types
//! - [`Qualifier`]: declaration linkage/visibility
//! - [`SemanticError`], [`CodegenError`], [`CompileError`]: failures

mod error;
mod qualifier;
mod span;
mod types;

pub use error::{CodegenError, CompileError, SemanticError};
pub use qualifier::Qualifier;
pub use span::Span;
pub use types::{DOUBLE_SIZE, FunctionType, INT_SIZE, POINTER_SIZE, Type};
