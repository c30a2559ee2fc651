//! Postfix code generator.
//!
//! The [`PostfixWriter`] walks a checked program and hands postfix
//! instructions to a [`PostfixEmitter`]. It handles:
//! - Global storage (BSS, initialized data, read-only strings) and externs
//! - Function prologues/epilogues with parameter and local frame offsets
//! - Expressions, including pointer arithmetic and int/double conversion
//! - Control flow: blocks, `if`, `loop`, `next`/`stop`, `return`
//! - The iteration forms, lowered to plain loops over hidden counters
//! - Conversion wrappers for function values of covariant types
//!
//! The writer keeps its own symbol table and runs a [`TypeChecker`] in
//! codegen mode over every node before emitting it. On an annotated tree
//! that is a no-op; for the nodes the writer synthesizes it resolves types
//! and binds the hidden variables.
//!
//! # Example
//!
//! ```
//! use bumpalo::Bump;
//! use til_ast::AstBuilder;
//! use til_compiler::{CodegenOptions, Instruction, Listing, PostfixWriter};
//!
//! let arena = Bump::new();
//! let b = AstBuilder::new(&arena);
//! let main = b.main(b.block(&[], &[b.print(&[b.int(7)], true)]));
//! let program = b.program(&[], Some(main));
//!
//! let mut listing = Listing::new();
//! PostfixWriter::new(b, CodegenOptions::default(), &mut listing)
//!     .write_program(program)
//!     .unwrap();
//! assert!(listing.instructions().contains(&Instruction::Call("printi".into())));
//! ```

mod covariant;
mod decl;
mod expr;
mod function;
mod stmt;
mod sugar;

use std::collections::BTreeSet;

use til_ast::{AstBuilder, Program};
use til_core::{CodegenError, CompileError, Span};

use crate::checker::TypeChecker;
use crate::config::CodegenOptions;
use crate::emit::{LabelAllocator, LoopStack};
use crate::postfix::{Instruction, PostfixEmitter};
use crate::symbol::SymbolTable;

type Result<T> = std::result::Result<T, CompileError>;

/// Runtime routines the generated code calls.
pub(crate) mod runtime {
    pub const PRINT_INT: &str = "printi";
    pub const PRINT_DOUBLE: &str = "printd";
    pub const PRINT_STRING: &str = "prints";
    pub const PRINT_NEWLINE: &str = "println";
    pub const READ_INT: &str = "readi";
    pub const READ_DOUBLE: &str = "readd";
}

/// Generates postfix code for a checked program.
pub struct PostfixWriter<'w, 'ast> {
    /// Builds the nodes of lowered constructs
    builder: AstBuilder<'ast>,
    options: CodegenOptions,
    /// Where instructions go
    emitter: &'w mut dyn PostfixEmitter,
    /// Scopes seen during generation, with frame offsets
    symbols: SymbolTable<'ast>,
    labels: LabelAllocator,
    /// `next`/`stop` targets of the current function
    loops: LoopStack,
    /// Labels of the functions being generated (innermost last)
    function_labels: Vec<String>,
    /// Epilogue label of the current function
    return_label: Option<String>,
    /// Next parameter offset, or the last local offset handed out
    offset: i32,
    /// Set after `return`/`next`/`stop`; the rest of the block is dead
    unreachable: bool,
    /// Symbols to import when the unit is closed
    externs: BTreeSet<String>,
}

impl<'w, 'ast> PostfixWriter<'w, 'ast> {
    pub fn new(builder: AstBuilder<'ast>, options: CodegenOptions, emitter: &'w mut dyn PostfixEmitter) -> Self {
        Self {
            builder,
            options,
            emitter,
            symbols: SymbolTable::new(),
            labels: LabelAllocator::new(),
            loops: LoopStack::new(),
            function_labels: Vec::new(),
            return_label: None,
            offset: 0,
            unreachable: false,
            externs: BTreeSet::new(),
        }
    }

    /// Generate the whole unit: globals in order, then the entry function.
    ///
    /// Imports are declared after the entry function, or at the end of the
    /// unit when there is none.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn write_program(&mut self, program: &Program<'ast>) -> Result<()> {
        for decl in program.declarations {
            self.emit_global_declaration(decl)?;
        }
        match program.main {
            Some(main) => {
                self.emit_function(main)?;
            }
            None => self.emit_externs(),
        }
        Ok(())
    }

    /// Symbols the unit imports so far, in name order.
    pub fn externs(&self) -> impl Iterator<Item = &str> {
        self.externs.iter().map(String::as_str)
    }

    // ==========================================================================
    // Helpers
    // ==========================================================================

    #[inline]
    fn emit(&mut self, instruction: Instruction) {
        self.emitter.emit(instruction);
    }

    /// A checker over the writer's scopes.
    fn checker(&mut self) -> TypeChecker<'_, 'ast> {
        TypeChecker::for_codegen(&mut self.symbols, self.builder)
    }

    /// Whether code is being generated inside a function body.
    fn in_function(&self) -> bool {
        !self.function_labels.is_empty()
    }

    /// Label of the innermost function being generated.
    fn current_function(&self, span: Span) -> Result<String> {
        self.function_labels
            .last()
            .cloned()
            .ok_or_else(|| CodegenError::MissingFunctionContext { span }.into())
    }

    /// Call a runtime routine, importing it.
    fn call_runtime(&mut self, routine: &str) {
        self.externs.insert(routine.to_string());
        self.emit(Instruction::Call(routine.to_string()));
    }

    fn emit_externs(&mut self) {
        let names: Vec<String> = self.externs.iter().cloned().collect();
        for name in names {
            self.emit(Instruction::Extern(name));
        }
    }

    /// Run `f` in a fresh scope; locals declared inside release their frame
    /// space afterwards.
    fn in_scope<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        self.symbols.push();
        let saved = self.offset;
        let result = f(self);
        self.offset = saved;
        self.symbols.pop();
        result
    }
}
