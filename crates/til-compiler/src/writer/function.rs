//! Function bodies, function values and `return`.

use til_ast::{FunctionDef, ReturnStmt};
use til_core::{CodegenError, Type};

use super::{PostfixWriter, Result};
use crate::emit::LoopStack;
use crate::frame::FrameSizeCalculator;
use crate::postfix::{Instruction, SymbolKind};

/// Writer state owned by one function body.
struct FunctionState {
    offset: i32,
    return_label: Option<String>,
    loops: LoopStack,
    unreachable: bool,
}

impl<'w, 'ast> PostfixWriter<'w, 'ast> {
    /// Generate a function's code and return its label.
    ///
    /// Nested function literals are generated in place: the enclosing
    /// function's state is set aside and restored afterwards. The entry
    /// function also declares the unit's imports.
    ///
    /// Postfix layout:
    /// ```text
    /// TEXT label
    /// ALIGN
    /// [GLOBAL _main, FUNC]
    /// LABEL label
    /// ENTER frame_size
    /// [body]
    /// [INT 0, STFVAL32]        ; entry function only
    /// ALIGN
    /// LABEL return_label
    /// LEAVE
    /// RET
    /// ```
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub(super) fn emit_function(&mut self, def: &FunctionDef<'ast>) -> Result<String> {
        self.checker().check_function_def(def)?;
        let label = if def.is_main {
            self.options.entry_label.clone()
        } else {
            self.labels.fresh()
        };
        self.function_labels.push(label.clone());

        self.emit(Instruction::Text(label.clone()));
        self.emit(Instruction::Align);
        if def.is_main {
            self.emit(Instruction::Global(label.clone(), SymbolKind::Func));
        }
        self.emit(Instruction::Label(label.clone()));

        let saved = FunctionState {
            offset: self.offset,
            return_label: self.return_label.take(),
            loops: std::mem::take(&mut self.loops),
            unreachable: std::mem::replace(&mut self.unreachable, false),
        };

        self.symbols.push();
        let body = self.emit_function_body(def);
        self.symbols.pop();

        self.offset = saved.offset;
        self.return_label = saved.return_label;
        self.loops = saved.loops;
        self.unreachable = saved.unreachable;
        self.function_labels.pop();
        body?;

        if def.is_main {
            self.emit_externs();
        }
        Ok(label)
    }

    fn emit_function_body(&mut self, def: &FunctionDef<'ast>) -> Result<()> {
        self.checker().bind_function(def);
        self.offset = self.options.param_base;
        for param in def.params {
            self.declare_parameter(param)?;
        }

        self.emit(Instruction::Enter(FrameSizeCalculator::frame_size(def.body)));
        let return_label = self.labels.fresh();
        self.return_label = Some(return_label.clone());
        self.offset = 0;

        self.emit_block(def.body)?;

        if def.is_main {
            self.emit(Instruction::Int(0));
            self.emit(Instruction::StFval32);
        }
        self.emit(Instruction::Align);
        self.emit(Instruction::Label(return_label));
        self.emit(Instruction::Leave);
        self.emit(Instruction::Ret);
        Ok(())
    }

    /// Generate a function literal and push its address.
    ///
    /// Inside a function the address is pushed at run time; at global scope
    /// it becomes a data word.
    pub(super) fn emit_function_value(&mut self, def: &FunctionDef<'ast>) -> Result<()> {
        let label = self.emit_function(def)?;
        self.emit_function_address(label);
        Ok(())
    }

    /// Resume the enclosing code (or data) and refer to `label`.
    pub(super) fn emit_function_address(&mut self, label: String) {
        match self.function_labels.last().cloned() {
            Some(enclosing) => {
                self.emit(Instruction::Text(enclosing));
                self.emit(Instruction::Addr(label));
            }
            None => {
                self.emit(Instruction::Data);
                self.emit(Instruction::SAddr(label));
            }
        }
    }

    /// Store the return value, if any, and jump to the epilogue.
    ///
    /// Postfix layout:
    /// ```text
    /// [value, converted to the output type]
    /// STFVAL32 | STFVAL64
    /// JMP return_label
    /// ```
    pub(super) fn emit_return(&mut self, stmt: &ReturnStmt<'ast>) -> Result<()> {
        self.checker().check_return(stmt)?;
        let missing = || CodegenError::MissingFunctionContext { span: stmt.span };
        let return_label = self.return_label.clone().ok_or_else(missing)?;
        let output = self
            .symbols
            .enclosing_function()
            .and_then(|function| function.ty.signature())
            .map(|signature| signature.output)
            .ok_or_else(missing)?;

        if let Some(value) = stmt.value {
            self.accept_covariant(output, value)?;
            self.emit(if output == Type::Double {
                Instruction::StFval64
            } else {
                Instruction::StFval32
            });
        }
        self.emit(Instruction::Jmp(return_label));
        self.unreachable = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use bumpalo::Bump;
    use til_ast::AstBuilder;
    use til_core::{Qualifier, Type};

    use crate::postfix::{Instruction, SymbolKind};
    use crate::writer::test_support::{assert_sequence, generate};

    #[test]
    fn entry_function_frame() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let main = b.main(b.block(&[], &[]));
        let listing = generate(b, b.program(&[], Some(main))).unwrap();

        assert_eq!(
            listing.instructions(),
            &[
                Instruction::Text("_main".into()),
                Instruction::Align,
                Instruction::Global("_main".into(), SymbolKind::Func),
                Instruction::Label("_main".into()),
                Instruction::Enter(0),
                Instruction::Int(0),
                Instruction::StFval32,
                Instruction::Align,
                Instruction::Label("_L1".into()),
                Instruction::Leave,
                Instruction::Ret,
            ]
        );
    }

    #[test]
    fn parameters_sit_above_the_frame_pointer() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let body = b.block(&[], &[b.ret(Some(b.var("y")))]);
        let f = b.function(&[b.param("x", Type::Double), b.param("y", Type::Int)], Type::Int, body);
        let decl = b.declaration(Qualifier::Public, "f", None, Some(f));
        let listing = generate(b, b.program(&[decl], None)).unwrap();

        assert_sequence(
            &listing,
            &[
                Instruction::Local(16),
                Instruction::LdInt,
                Instruction::StFval32,
                Instruction::Jmp("_L2".into()),
            ],
        );
        assert_sequence(
            &listing,
            &[
                Instruction::Data,
                Instruction::Align,
                Instruction::Global("f".into(), SymbolKind::Obj),
                Instruction::Label("f".into()),
                Instruction::SAddr("_L1".into()),
            ],
        );
    }

    #[test]
    fn double_return_is_widened() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let body = b.block(&[], &[b.ret(Some(b.int(1)))]);
        let f = b.declare_var("f", b.function(&[], Type::Double, body));
        let listing = generate(b, b.program(&[f], None)).unwrap();

        assert_sequence(
            &listing,
            &[Instruction::Int(1), Instruction::I2D, Instruction::StFval64],
        );
    }

    #[test]
    fn nested_function_resumes_enclosing_text() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let inner = b.function(&[], Type::Int, b.block(&[], &[b.ret(Some(b.int(4)))]));
        let g = b.declare("g", b.function_type(&[], Type::Int), Some(inner));
        let main = b.main(b.block(&[g], &[b.ret(Some(b.call(b.var("g"), &[])))]));
        let listing = generate(b, b.program(&[], Some(main))).unwrap();

        assert_sequence(
            &listing,
            &[
                Instruction::Ret,
                Instruction::Text("_main".into()),
                Instruction::Addr("_L2".into()),
                Instruction::Local(-4),
                Instruction::StInt,
            ],
        );
    }
}
