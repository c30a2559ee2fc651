//! End-to-end scenarios: compile a program, run it on the test machine,
//! and check both the generated code and its behavior.

mod common;

use common::{STACK_TOP, compile, run};
use til::{
    AstBuilder, BinaryOp, Bump, CodegenError, CompileError, Instr, Instruction, Qualifier, SemanticError, Type,
};

/// `int<int> f = (int x) -> int { return x + 1; }`
fn successor<'a>(b: AstBuilder<'a>) -> &'a til::Declaration<'a> {
    let body = b.block(&[], &[b.ret(Some(b.binary(b.var("x"), BinaryOp::Add, b.int(1))))]);
    b.declare(
        "f",
        b.function_type(&[Type::Int], Type::Int),
        Some(b.function(&[b.param("x", Type::Int)], Type::Int, body)),
    )
}

/// `void<int> show = (int x) -> void { println x; }`
fn show<'a>(b: AstBuilder<'a>) -> &'a til::Declaration<'a> {
    let body = b.block(&[], &[b.print(&[b.var("x")], true)]);
    b.declare_var("show", b.function(&[b.param("x", Type::Int)], Type::Void, body))
}

/// `v!index = value;`
fn store<'a>(b: AstBuilder<'a>, index: i32, value: i32) -> Instr<'a> {
    b.eval(b.assign(b.index(b.var("v"), b.int(index)), b.int(value)))
}

/// A main declaring `int! v = objects 3` holding 10, 20, 30, then `form`.
fn over_vector<'a>(b: AstBuilder<'a>, form: Instr<'a>) -> &'a til::Program<'a> {
    let v = b.declare("v", b.pointer(Type::Int), Some(b.objects(b.int(3))));
    let main = b.main(b.block(&[v], &[store(b, 0, 10), store(b, 1, 20), store(b, 2, 30), form]));
    b.program(&[show(b)], Some(main))
}

// =============================================================================
// Calls
// =============================================================================

#[test]
fn test_call_pushes_argument_and_cleans_up() {
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);
    let call = b.call(b.var("f"), &[b.int(3)]);
    let main = b.main(b.block(&[], &[b.print(&[call], true)]));
    let program = b.program(&[successor(b)], Some(main));

    let listing = compile(b, program);
    assert_eq!(call.ty(), Type::Int);
    assert!(
        listing
            .find_sequence(&[
                Instruction::Int(3),
                Instruction::Addr("f".into()),
                Instruction::LdInt,
                Instruction::Branch,
                Instruction::Trash(4),
                Instruction::LdFval32,
            ])
            .is_some(),
        "{listing}"
    );

    let result = run(b, program);
    assert_eq!(result.output, "4\n");
    assert_eq!(result.exit_code, 0);
    assert_eq!(result.final_sp, STACK_TOP);
}

// =============================================================================
// Iteration forms
// =============================================================================

#[test]
fn test_with_visits_each_element_once() {
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);
    let program = over_vector(b, b.with(b.var("show"), b.var("v"), b.int(0), b.int(3)));

    let result = run(b, program);
    assert_eq!(result.output, "10\n20\n30\n");
    assert_eq!(result.final_sp, STACK_TOP);
}

#[test]
fn test_with_respects_bounds() {
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);
    let program = over_vector(b, b.with(b.var("show"), b.var("v"), b.int(1), b.int(2)));
    assert_eq!(run(b, program).output, "20\n");
}

#[test]
fn test_unless_runs_only_when_condition_is_false() {
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);
    let program = over_vector(b, b.unless(b.int(0), b.var("v"), b.int(2), b.var("show")));
    assert_eq!(run(b, program).output, "10\n20\n");

    let arena = Bump::new();
    let b = AstBuilder::new(&arena);
    let program = over_vector(b, b.unless(b.int(1), b.var("v"), b.int(2), b.var("show")));
    assert_eq!(run(b, program).output, "");
}

#[test]
fn test_sweep_runs_only_when_condition_is_true() {
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);
    let program = over_vector(b, b.sweep(b.var("v"), b.int(1), b.int(3), b.var("show"), b.int(1)));
    assert_eq!(run(b, program).output, "20\n30\n");

    let arena = Bump::new();
    let b = AstBuilder::new(&arena);
    let program = over_vector(b, b.sweep(b.var("v"), b.int(1), b.int(3), b.var("show"), b.int(0)));
    assert_eq!(run(b, program).output, "");
}

#[test]
fn test_iterate_runs_only_when_condition_is_true() {
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);
    let program = over_vector(b, b.iterate(b.var("v"), b.int(3), b.var("show"), b.int(1)));
    assert_eq!(run(b, program).output, "10\n20\n30\n");

    let arena = Bump::new();
    let b = AstBuilder::new(&arena);
    let program = over_vector(b, b.iterate(b.var("v"), b.int(3), b.var("show"), b.int(0)));
    assert_eq!(run(b, program).output, "");
}

// =============================================================================
// Conversion wrappers
// =============================================================================

/// `int<int> f = (int x) -> int { return x * 10; }`
fn times_ten<'a>(b: AstBuilder<'a>) -> &'a til::Declaration<'a> {
    let body = b.block(&[], &[b.ret(Some(b.binary(b.var("x"), BinaryOp::Mul, b.int(10))))]);
    b.declare(
        "f",
        b.function_type(&[Type::Int], Type::Int),
        Some(b.function(&[b.param("x", Type::Int)], Type::Int, body)),
    )
}

#[test]
fn test_wrapper_truncates_double_argument() {
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);
    // int<double> h = f; println h(2.0), " ", h(2.7);
    let h = b.declare("h", b.function_type(&[Type::Double], Type::Int), Some(b.var("f")));
    let calls = [
        b.call(b.var("h"), &[b.double(2.0)]),
        b.string(" "),
        b.call(b.var("h"), &[b.double(2.7)]),
    ];
    let main = b.main(b.block(&[h], &[b.print(&calls, true)]));
    let program = b.program(&[times_ten(b)], Some(main));

    let listing = compile(b, program);
    let hidden: Vec<_> = listing
        .iter()
        .filter(|i| matches!(i, Instruction::Label(l) if l.starts_with("_wrapper_target_")))
        .collect();
    assert_eq!(hidden.len(), 1, "{listing}");

    let result = run(b, program);
    assert_eq!(result.output, "20 20\n");
    assert_eq!(result.final_sp, STACK_TOP);
}

#[test]
fn test_wrapper_widens_result() {
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);
    // double<int> h = f; println h(3) / 4;
    let h = b.declare("h", b.function_type(&[Type::Int], Type::Double), Some(b.var("f")));
    let quarter = b.binary(b.call(b.var("h"), &[b.int(3)]), BinaryOp::Div, b.int(4));
    let main = b.main(b.block(&[h], &[b.print(&[quarter], true)]));
    let program = b.program(&[times_ten(b)], Some(main));

    assert_eq!(run(b, program).output, "7.5\n");
}

#[test]
fn test_global_function_literal_is_wrapped() {
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);
    // public double<double> g = (int x) -> int { return x + 1; }
    let body = b.block(&[], &[b.ret(Some(b.binary(b.var("x"), BinaryOp::Add, b.int(1))))]);
    let g = b.declaration(
        Qualifier::Public,
        "g",
        Some(b.function_type(&[Type::Double], Type::Double)),
        Some(b.function(&[b.param("x", Type::Int)], Type::Int, body)),
    );
    let main = b.main(b.block(&[], &[b.print(&[b.call(b.var("g"), &[b.double(2.5)])], true)]));

    assert_eq!(run(b, b.program(&[g], Some(main))).output, "3\n");
}

/// `int<int<int>> s = (int<int> k) -> int { return k(3); }` and
/// `int<int> d = (int y) -> int { println y; return 0; }`
fn callback_pair<'a>(b: AstBuilder<'a>) -> [&'a til::Declaration<'a>; 2] {
    let callback = b.function_type(&[Type::Int], Type::Int);
    let apply = b.block(&[], &[b.ret(Some(b.call(b.var("k"), &[b.int(3)])))]);
    let s = b.declare(
        "s",
        b.function_type(&[callback], Type::Int),
        Some(b.function(&[b.param("k", callback)], Type::Int, apply)),
    );
    let show = b.block(&[], &[b.print(&[b.var("y")], true), b.ret(Some(b.int(0)))]);
    let d = b.declare("d", callback, Some(b.function(&[b.param("y", Type::Int)], Type::Int, show)));
    [s, d]
}

#[test]
fn test_function_taking_a_function_is_stored_unchanged() {
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);
    let callback = b.function_type(&[Type::Int], Type::Int);
    let t = b.declare("t", b.function_type(&[callback], Type::Int), Some(b.var("s")));
    let main = b.main(b.block(&[t], &[b.eval(b.call(b.var("t"), &[b.var("d")]))]));
    let program = b.program(&callback_pair(b), Some(main));

    let listing = compile(b, program);
    assert!(
        !listing.iter().any(|i| matches!(i, Instruction::Label(l) if l.starts_with("_wrapper_target_"))),
        "{listing}"
    );
    assert_eq!(run(b, program).output, "3\n");
}

#[test]
fn test_nested_function_types_are_not_widened() {
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);
    // int<int<double>> t = s;
    let wide_callback = b.function_type(&[Type::Double], Type::Int);
    let t = b.declare("t", b.function_type(&[wide_callback], Type::Int), Some(b.var("s")));
    let main = b.main(b.block(&[t], &[]));

    let err = til::compile(b, b.program(&callback_pair(b), Some(main))).unwrap_err();
    assert!(
        matches!(err, CompileError::Semantic(SemanticError::InitializerTypeMismatch { ref name, .. }) if name == "t"),
        "{err}"
    );
}

// =============================================================================
// Global initializers
// =============================================================================

#[test]
fn test_non_literal_global_initializer_fails_in_generation() {
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);
    let a = b.declare("a", Type::Int, Some(b.int(1)));
    let c = b.declare("c", Type::Int, Some(b.binary(b.var("a"), BinaryOp::Add, b.int(1))));
    let program = b.program(&[a, c], None);

    assert!(til::check(b, program).is_ok());
    let err = til::compile(b, program).unwrap_err();
    assert!(matches!(
        err,
        CompileError::Codegen(CodegenError::NonLiteralGlobalInitializer { ref name, .. }) if name == "c"
    ));
}
