//! til
//!
//! Semantic analysis and postfix code generation for the til language.
//!
//! A program arrives as an arena-allocated tree built through
//! [`AstBuilder`]. [`compile`] runs the two passes over it:
//!
//! 1. **Check**: the [`TypeChecker`] resolves every node's type in place
//!    and rejects ill-typed programs.
//! 2. **Write**: the [`PostfixWriter`] lowers the annotated tree to
//!    postfix stack-machine [`Instruction`]s.
//!
//! The first error from either pass aborts compilation.
//!
//! # Example
//!
//! ```
//! use til::{AstBuilder, Bump, Instruction, Type};
//!
//! let arena = Bump::new();
//! let b = AstBuilder::new(&arena);
//!
//! // int<int> f = (int x) -> int { return x + 1; }
//! let body = b.block(&[], &[b.ret(Some(b.binary(b.var("x"), til::BinaryOp::Add, b.int(1))))]);
//! let f = b.declare_var("f", b.function(&[b.param("x", Type::Int)], Type::Int, body));
//! let main = b.main(b.block(&[], &[b.print(&[b.call(b.var("f"), &[b.int(3)])], true)]));
//!
//! let listing = til::compile(b, b.program(&[f], Some(main))).unwrap();
//! assert!(listing.instructions().contains(&Instruction::Branch));
//! ```

pub use bumpalo::Bump;
pub use til_ast::{
    AstBuilder, BinaryOp, Block, Declaration, Expr, FunctionDef, Instr, Lvalue, Program, UnaryOp,
};
pub use til_compiler::{
    CodegenOptions, FrameSizeCalculator, Instruction, Listing, PostfixEmitter, PostfixWriter,
    Symbol, SymbolKind, SymbolTable, TypeChecker, compatible, needs_wrapper,
};
pub use til_core::{
    CodegenError, CompileError, FunctionType, Qualifier, SemanticError, Span, Type,
};

/// Type check `program`, annotating it in place.
pub fn check<'ast>(builder: AstBuilder<'ast>, program: &Program<'ast>) -> Result<(), SemanticError> {
    #[cfg(feature = "profiling")]
    profiling::scope!("til::check");

    let mut symbols = SymbolTable::new();
    TypeChecker::new(&mut symbols, builder).check_program(program)
}

/// Check and generate `program` with default options.
pub fn compile<'ast>(builder: AstBuilder<'ast>, program: &Program<'ast>) -> Result<Listing, CompileError> {
    compile_with(builder, program, CodegenOptions::default())
}

/// Check and generate `program` into a fresh [`Listing`].
pub fn compile_with<'ast>(
    builder: AstBuilder<'ast>,
    program: &Program<'ast>,
    options: CodegenOptions,
) -> Result<Listing, CompileError> {
    let mut listing = Listing::new();
    compile_into(builder, program, options, &mut listing)?;
    Ok(listing)
}

/// Check `program`, then hand its instructions to `emitter`.
///
/// Nothing is emitted for a program that fails to check.
pub fn compile_into<'ast>(
    builder: AstBuilder<'ast>,
    program: &Program<'ast>,
    options: CodegenOptions,
    emitter: &mut dyn PostfixEmitter,
) -> Result<(), CompileError> {
    check(builder, program)?;

    #[cfg(feature = "profiling")]
    profiling::scope!("til::write");

    PostfixWriter::new(builder, options, emitter).write_program(program)
}
