//! Arena-backed AST construction.
//!
//! [`AstBuilder`] is the one way nodes get made, whether by a parser, by a
//! test, or by code generation synthesizing helper trees. All nodes live in
//! the same [`Bump`] arena and share the `'ast` lifetime.
//!
//! # Example
//!
//! ```
//! use bumpalo::Bump;
//! use til_ast::{AstBuilder, BinaryOp};
//! use til_core::Span;
//!
//! let arena = Bump::new();
//! let b = AstBuilder::new(&arena).at(Span::line(3));
//! let sum = b.binary(b.int(1), BinaryOp::Add, b.var("x"));
//! assert_eq!(sum.span(), Span::line(3));
//! ```

use bumpalo::Bump;
use til_core::{FunctionType, Qualifier, Span, Type};

use crate::decl::{Declaration, FunctionDef, Program};
use crate::expr::*;
use crate::ops::{BinaryOp, UnaryOp};
use crate::slot::TypeSlot;
use crate::stmt::*;

/// Builds nodes in an arena, stamping each with the current span.
#[derive(Debug, Clone, Copy)]
pub struct AstBuilder<'ast> {
    arena: &'ast Bump,
    span: Span,
}

impl<'ast> AstBuilder<'ast> {
    /// Create a builder over `arena`.
    pub fn new(arena: &'ast Bump) -> Self {
        Self {
            arena,
            span: Span::default(),
        }
    }

    /// A builder that stamps nodes with `span`.
    pub fn at(self, span: Span) -> Self {
        Self { span, ..self }
    }

    /// The span stamped on new nodes.
    pub fn span(&self) -> Span {
        self.span
    }

    /// The backing arena.
    pub fn arena(&self) -> &'ast Bump {
        self.arena
    }

    /// Copy a string into the arena.
    pub fn name(&self, s: &str) -> &'ast str {
        self.arena.alloc_str(s)
    }

    // ==========================================================================
    // Types
    // ==========================================================================

    /// `ty!`
    pub fn pointer(&self, ty: Type<'ast>) -> Type<'ast> {
        Type::Pointer(self.arena.alloc(ty))
    }

    /// A function signature.
    pub fn signature(&self, inputs: &[Type<'ast>], output: Type<'ast>) -> &'ast FunctionType<'ast> {
        let inputs = self.arena.alloc_slice_copy(inputs);
        self.arena.alloc(FunctionType::new(inputs, output))
    }

    /// `output<inputs...>`
    pub fn function_type(&self, inputs: &[Type<'ast>], output: Type<'ast>) -> Type<'ast> {
        Type::Function(self.signature(inputs, output))
    }

    // ==========================================================================
    // Expressions
    // ==========================================================================

    fn literal(&self, kind: LiteralKind<'ast>) -> Expr<'ast> {
        Expr::Literal(self.arena.alloc(LiteralExpr {
            kind,
            ty: TypeSlot::unresolved(),
            span: self.span,
        }))
    }

    pub fn int(&self, value: i32) -> Expr<'ast> {
        self.literal(LiteralKind::Int(value))
    }

    pub fn double(&self, value: f64) -> Expr<'ast> {
        self.literal(LiteralKind::Double(value))
    }

    pub fn string(&self, value: &str) -> Expr<'ast> {
        let value = self.name(value);
        self.literal(LiteralKind::String(value))
    }

    pub fn null(&self) -> Expr<'ast> {
        Expr::Null(self.arena.alloc(NullExpr {
            ty: TypeSlot::unresolved(),
            span: self.span,
        }))
    }

    pub fn unary(&self, op: UnaryOp, operand: Expr<'ast>) -> Expr<'ast> {
        Expr::Unary(self.arena.alloc(UnaryExpr {
            op,
            operand,
            ty: TypeSlot::unresolved(),
            span: self.span,
        }))
    }

    pub fn binary(&self, left: Expr<'ast>, op: BinaryOp, right: Expr<'ast>) -> Expr<'ast> {
        Expr::Binary(self.arena.alloc(BinaryExpr {
            left,
            op,
            right,
            ty: TypeSlot::unresolved(),
            span: self.span,
        }))
    }

    /// A variable lvalue.
    pub fn variable(&self, name: &str) -> Lvalue<'ast> {
        let name = self.name(name);
        Lvalue::Variable(self.arena.alloc(VariableExpr {
            name,
            ty: TypeSlot::unresolved(),
            span: self.span,
        }))
    }

    /// `base[index]` as an lvalue.
    pub fn index(&self, base: Expr<'ast>, index: Expr<'ast>) -> Lvalue<'ast> {
        Lvalue::Index(self.arena.alloc(IndexExpr {
            base,
            index,
            ty: TypeSlot::unresolved(),
            span: self.span,
        }))
    }

    pub fn rvalue(&self, lvalue: Lvalue<'ast>) -> Expr<'ast> {
        Expr::Rvalue(self.arena.alloc(RvalueExpr {
            lvalue,
            ty: TypeSlot::unresolved(),
            span: self.span,
        }))
    }

    /// The value of a named variable.
    pub fn var(&self, name: &str) -> Expr<'ast> {
        self.rvalue(self.variable(name))
    }

    pub fn assign(&self, lvalue: Lvalue<'ast>, value: Expr<'ast>) -> Expr<'ast> {
        Expr::Assign(self.arena.alloc(AssignExpr {
            lvalue,
            value,
            ty: TypeSlot::unresolved(),
            span: self.span,
        }))
    }

    pub fn address_of(&self, lvalue: Lvalue<'ast>) -> Expr<'ast> {
        Expr::AddressOf(self.arena.alloc(AddressOfExpr {
            lvalue,
            ty: TypeSlot::unresolved(),
            span: self.span,
        }))
    }

    pub fn read(&self) -> Expr<'ast> {
        Expr::Read(self.arena.alloc(ReadExpr {
            ty: TypeSlot::unresolved(),
            span: self.span,
        }))
    }

    pub fn size_of(&self, operand: Expr<'ast>) -> Expr<'ast> {
        Expr::SizeOf(self.arena.alloc(SizeOfExpr {
            operand,
            ty: TypeSlot::unresolved(),
            span: self.span,
        }))
    }

    pub fn objects(&self, count: Expr<'ast>) -> Expr<'ast> {
        Expr::Objects(self.arena.alloc(ObjectsExpr {
            count,
            ty: TypeSlot::unresolved(),
            span: self.span,
        }))
    }

    fn call_node(&self, callee: Option<Expr<'ast>>, args: &[Expr<'ast>], ty: TypeSlot<'ast>) -> Expr<'ast> {
        Expr::Call(self.arena.alloc(CallExpr {
            callee,
            args: self.arena.alloc_slice_copy(args),
            ty,
            span: self.span,
        }))
    }

    /// Call a function value.
    pub fn call(&self, callee: Expr<'ast>, args: &[Expr<'ast>]) -> Expr<'ast> {
        self.call_node(Some(callee), args, TypeSlot::unresolved())
    }

    /// Call the enclosing function.
    pub fn self_call(&self, args: &[Expr<'ast>]) -> Expr<'ast> {
        self.call_node(None, args, TypeSlot::unresolved())
    }

    /// Call whose result type is fixed at construction.
    ///
    /// A resolved slot is never re-inferred, so its arguments are taken as
    /// already matching the callee.
    pub fn call_resolved(&self, callee: Expr<'ast>, args: &[Expr<'ast>], ty: Type<'ast>) -> Expr<'ast> {
        self.call_node(Some(callee), args, TypeSlot::resolved(ty))
    }

    /// A function definition node.
    pub fn function_def(
        &self,
        params: &[&'ast Declaration<'ast>],
        output: Type<'ast>,
        body: &'ast Block<'ast>,
    ) -> &'ast FunctionDef<'ast> {
        let inputs: Vec<Type<'ast>> = params.iter().map(|p| p.ty()).collect();
        self.arena.alloc(FunctionDef {
            params: self.arena.alloc_slice_copy(params),
            signature: self.signature(&inputs, output),
            body,
            is_main: false,
            ty: TypeSlot::unresolved(),
            span: self.span,
        })
    }

    /// A function definition used as a value.
    pub fn function(
        &self,
        params: &[&'ast Declaration<'ast>],
        output: Type<'ast>,
        body: &'ast Block<'ast>,
    ) -> Expr<'ast> {
        Expr::Function(self.function_def(params, output, body))
    }

    /// The program's entry function: no parameters, integer exit code.
    pub fn main(&self, body: &'ast Block<'ast>) -> &'ast FunctionDef<'ast> {
        self.arena.alloc(FunctionDef {
            params: &[],
            signature: self.signature(&[], Type::Int),
            body,
            is_main: true,
            ty: TypeSlot::unresolved(),
            span: self.span,
        })
    }

    // ==========================================================================
    // Declarations
    // ==========================================================================

    pub fn declaration(
        &self,
        qualifier: Qualifier,
        name: &str,
        declared: Option<Type<'ast>>,
        initializer: Option<Expr<'ast>>,
    ) -> &'ast Declaration<'ast> {
        let ty = match declared {
            Some(ty) => TypeSlot::resolved(ty),
            None => TypeSlot::unresolved(),
        };
        self.arena.alloc(Declaration {
            qualifier,
            name: self.name(name),
            declared,
            initializer,
            ty,
            span: self.span,
        })
    }

    /// A typed, unqualified declaration.
    pub fn declare(&self, name: &str, ty: Type<'ast>, initializer: Option<Expr<'ast>>) -> &'ast Declaration<'ast> {
        self.declaration(Qualifier::None, name, Some(ty), initializer)
    }

    /// `var name = initializer`
    pub fn declare_var(&self, name: &str, initializer: Expr<'ast>) -> &'ast Declaration<'ast> {
        self.declaration(Qualifier::None, name, None, Some(initializer))
    }

    /// A function parameter.
    pub fn param(&self, name: &str, ty: Type<'ast>) -> &'ast Declaration<'ast> {
        self.declaration(Qualifier::None, name, Some(ty), None)
    }

    // ==========================================================================
    // Instructions
    // ==========================================================================

    pub fn block(&self, declarations: &[&'ast Declaration<'ast>], instructions: &[Instr<'ast>]) -> &'ast Block<'ast> {
        self.arena.alloc(Block {
            declarations: self.arena.alloc_slice_copy(declarations),
            instructions: self.arena.alloc_slice_copy(instructions),
            span: self.span,
        })
    }

    /// A nested block as an instruction.
    pub fn block_instr(&self, declarations: &[&'ast Declaration<'ast>], instructions: &[Instr<'ast>]) -> Instr<'ast> {
        Instr::Block(self.block(declarations, instructions))
    }

    pub fn eval(&self, expr: Expr<'ast>) -> Instr<'ast> {
        Instr::Eval(self.arena.alloc(EvalStmt { expr, span: self.span }))
    }

    pub fn print(&self, args: &[Expr<'ast>], newline: bool) -> Instr<'ast> {
        Instr::Print(self.arena.alloc(PrintStmt {
            args: self.arena.alloc_slice_copy(args),
            newline,
            span: self.span,
        }))
    }

    pub fn if_(&self, condition: Expr<'ast>, then_branch: Instr<'ast>, else_branch: Option<Instr<'ast>>) -> Instr<'ast> {
        Instr::If(self.arena.alloc(IfStmt {
            condition,
            then_branch,
            else_branch,
            span: self.span,
        }))
    }

    pub fn loop_(&self, condition: Expr<'ast>, body: Instr<'ast>) -> Instr<'ast> {
        Instr::Loop(self.arena.alloc(LoopStmt {
            condition,
            body,
            span: self.span,
        }))
    }

    pub fn next(&self, level: u32) -> Instr<'ast> {
        Instr::Next(self.arena.alloc(LoopControl { level, span: self.span }))
    }

    pub fn stop(&self, level: u32) -> Instr<'ast> {
        Instr::Stop(self.arena.alloc(LoopControl { level, span: self.span }))
    }

    pub fn ret(&self, value: Option<Expr<'ast>>) -> Instr<'ast> {
        Instr::Return(self.arena.alloc(ReturnStmt { value, span: self.span }))
    }

    pub fn with(&self, function: Expr<'ast>, vector: Expr<'ast>, low: Expr<'ast>, high: Expr<'ast>) -> Instr<'ast> {
        Instr::With(self.arena.alloc(WithStmt {
            function,
            vector,
            low,
            high,
            span: self.span,
        }))
    }

    pub fn unless(
        &self,
        condition: Expr<'ast>,
        vector: Expr<'ast>,
        count: Expr<'ast>,
        function: Expr<'ast>,
    ) -> Instr<'ast> {
        Instr::Unless(self.arena.alloc(UnlessStmt {
            condition,
            vector,
            count,
            function,
            span: self.span,
        }))
    }

    pub fn sweep(
        &self,
        vector: Expr<'ast>,
        low: Expr<'ast>,
        high: Expr<'ast>,
        function: Expr<'ast>,
        condition: Expr<'ast>,
    ) -> Instr<'ast> {
        Instr::Sweep(self.arena.alloc(SweepStmt {
            vector,
            low,
            high,
            function,
            condition,
            span: self.span,
        }))
    }

    pub fn iterate(
        &self,
        vector: Expr<'ast>,
        count: Expr<'ast>,
        function: Expr<'ast>,
        condition: Expr<'ast>,
    ) -> Instr<'ast> {
        Instr::Iterate(self.arena.alloc(IterateStmt {
            vector,
            count,
            function,
            condition,
            span: self.span,
        }))
    }

    // ==========================================================================
    // Program
    // ==========================================================================

    pub fn program(
        &self,
        declarations: &[&'ast Declaration<'ast>],
        main: Option<&'ast FunctionDef<'ast>>,
    ) -> &'ast Program<'ast> {
        self.arena.alloc(Program {
            declarations: self.arena.alloc_slice_copy(declarations),
            main,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nodes_start_unresolved() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let e = b.binary(b.int(1), BinaryOp::Add, b.double(2.0));
        assert!(!e.slot().is_resolved());
        assert_eq!(e.ty(), Type::Unspec);
    }

    #[test]
    fn span_is_stamped() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena).at(Span::line(12));
        assert_eq!(b.var("x").span(), Span::line(12));
        assert_eq!(b.ret(None).span(), Span::line(12));
    }

    #[test]
    fn declared_type_resolves_slot() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let typed = b.declare("x", Type::Double, None);
        let inferred = b.declare_var("y", b.int(1));
        assert_eq!(typed.ty(), Type::Double);
        assert_eq!(inferred.ty(), Type::Unspec);
    }

    #[test]
    fn function_signature_from_params() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let body = b.block(&[], &[b.ret(Some(b.var("x")))]);
        let def = b.function_def(&[b.param("x", Type::Int), b.param("y", Type::Double)], Type::Int, body);
        assert_eq!(def.signature.inputs, &[Type::Int, Type::Double]);
        assert_eq!(def.output(), Type::Int);
        assert_eq!(def.function_type().to_string(), "int<int,double>");
        assert!(!def.is_main);
    }

    #[test]
    fn main_has_int_output() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let main = b.main(b.block(&[], &[]));
        assert!(main.is_main);
        assert_eq!(main.function_type().to_string(), "int<>");
    }

    #[test]
    fn resolved_call_keeps_its_type() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let call = b.call_resolved(b.var("f"), &[b.int(1)], Type::Double);
        assert!(call.slot().is_resolved());
        assert_eq!(call.ty(), Type::Double);
    }

    #[test]
    fn derived_types() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        assert_eq!(b.pointer(Type::Int), Type::INT_POINTER);
        let f = b.function_type(&[Type::Int], Type::Void);
        assert_eq!(f.signature().map(|s| s.arity()), Some(1));
    }
}
