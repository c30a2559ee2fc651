//! Shared helpers for the integration tests.

#![allow(dead_code)]

pub mod machine;

use til::{AstBuilder, Listing, Program};

pub use machine::{Machine, Run, STACK_TOP};

/// Compile `program`, panicking with the error on failure.
pub fn compile<'ast>(b: AstBuilder<'ast>, program: &Program<'ast>) -> Listing {
    til::compile(b, program).unwrap_or_else(|e| panic!("compilation failed: {e}"))
}

/// Compile `program` and run its entry function.
pub fn run<'ast>(b: AstBuilder<'ast>, program: &Program<'ast>) -> Run {
    run_with_input(b, program, &[])
}

/// Compile `program` and run it, feeding `input` to its reads.
pub fn run_with_input<'ast>(b: AstBuilder<'ast>, program: &Program<'ast>, input: &[f64]) -> Run {
    let listing = compile(b, program);
    Machine::load(&listing).with_input(input).run("_main")
}
