//! Instructions: blocks, control flow, evaluation and printing.

use til_ast::{Block, Expr, IfStmt, Instr, LoopControl, PrintStmt};
use til_core::{CodegenError, Type};

use super::{PostfixWriter, Result, runtime};
use crate::postfix::Instruction;

impl<'w, 'ast> PostfixWriter<'w, 'ast> {
    /// Generate a block in its own scope.
    ///
    /// Nothing may follow a `return`, `next` or `stop` in the same block.
    pub(super) fn emit_block(&mut self, block: &Block<'ast>) -> Result<()> {
        self.in_scope(|writer| {
            for decl in block.declarations {
                writer.emit_local_declaration(decl)?;
            }
            for instr in block.instructions {
                if writer.unreachable {
                    return Err(CodegenError::UnreachableCode { span: instr.span() }.into());
                }
                writer.emit_instr(instr)?;
            }
            Ok(())
        })?;
        self.unreachable = false;
        Ok(())
    }

    pub(super) fn emit_instr(&mut self, instr: &Instr<'ast>) -> Result<()> {
        match instr {
            Instr::Eval(stmt) => self.emit_evaluation(stmt.expr),
            Instr::Print(stmt) => self.emit_print(stmt),
            Instr::Block(block) => self.emit_block(block),
            Instr::If(stmt) => self.emit_if(stmt),
            Instr::Loop(stmt) => self.emit_loop(stmt.condition, &stmt.body),
            Instr::Next(control) => self.emit_loop_control(control, "next"),
            Instr::Stop(control) => self.emit_loop_control(control, "stop"),
            Instr::Return(stmt) => self.emit_return(stmt),
            Instr::With(stmt) => self.emit_with(stmt),
            Instr::Unless(stmt) => self.emit_unless(stmt),
            Instr::Sweep(stmt) => self.emit_sweep(stmt),
            Instr::Iterate(stmt) => self.emit_iterate(stmt),
        }
    }

    /// Evaluate an expression and drop its value.
    pub(super) fn emit_evaluation(&mut self, expr: Expr<'ast>) -> Result<()> {
        self.checker().check_evaluation(expr)?;
        self.emit_expr(expr)?;
        let size = expr.ty().size();
        if size > 0 {
            self.emit(Instruction::Trash(size));
        }
        Ok(())
    }

    /// Postfix layout, per argument:
    /// ```text
    /// [argument]
    /// CALL printi | printd | prints
    /// TRASH 4 | 8 | 4
    /// ```
    /// then `CALL println` for the newline form.
    fn emit_print(&mut self, stmt: &PrintStmt<'ast>) -> Result<()> {
        self.checker().check_print(stmt)?;
        for arg in stmt.args {
            self.emit_expr(*arg)?;
            let ty = arg.ty();
            let routine = match ty {
                Type::Double => runtime::PRINT_DOUBLE,
                Type::String => runtime::PRINT_STRING,
                _ => runtime::PRINT_INT,
            };
            self.call_runtime(routine);
            self.emit(Instruction::Trash(ty.size()));
        }
        if stmt.newline {
            self.call_runtime(runtime::PRINT_NEWLINE);
        }
        Ok(())
    }

    /// Postfix layout:
    /// ```text
    /// [condition]                [condition]
    /// JZ end                     JZ else
    /// [then]                     [then]
    /// ALIGN                      JMP end
    /// LABEL end                  ALIGN
    ///                            LABEL else
    ///                            [else]
    ///                            ALIGN
    ///                            LABEL end
    /// ```
    fn emit_if(&mut self, stmt: &IfStmt<'ast>) -> Result<()> {
        self.checker().check_condition(stmt.condition, "conditional instruction")?;
        self.emit_expr(stmt.condition)?;

        match &stmt.else_branch {
            None => {
                let end = self.labels.fresh();
                self.emit(Instruction::Jz(end.clone()));
                self.emit_instr(&stmt.then_branch)?;
                self.unreachable = false;
                self.emit_label(end);
            }
            Some(else_branch) => {
                let otherwise = self.labels.fresh();
                let end = self.labels.fresh();
                self.emit(Instruction::Jz(otherwise.clone()));
                self.emit_instr(&stmt.then_branch)?;
                self.unreachable = false;
                self.emit(Instruction::Jmp(end.clone()));
                self.emit_label(otherwise);
                self.emit_instr(else_branch)?;
                self.unreachable = false;
                self.emit_label(end);
            }
        }
        Ok(())
    }

    /// A loop testing `condition` before every pass over `body`.
    ///
    /// Postfix layout:
    /// ```text
    /// LABEL head      <- next
    /// [condition]
    /// JZ end
    /// [body]
    /// JMP head
    /// ALIGN
    /// LABEL end       <- stop
    /// ```
    pub(super) fn emit_loop(&mut self, condition: Expr<'ast>, body: &Instr<'ast>) -> Result<()> {
        self.checker().check_condition(condition, "loop instruction")?;
        let head = self.labels.fresh();
        let end = self.labels.fresh();

        self.emit(Instruction::Label(head.clone()));
        self.emit_expr(condition)?;
        self.emit(Instruction::Jz(end.clone()));

        self.loops.enter_loop(head.clone(), end.clone());
        let result = self.emit_instr(body);
        self.loops.exit_loop();
        result?;
        self.unreachable = false;

        self.emit(Instruction::Jmp(head));
        self.emit_label(end);
        Ok(())
    }

    /// `next N` / `stop N`: jump to the head or the exit of the loop N
    /// levels out.
    fn emit_loop_control(&mut self, control: &LoopControl, keyword: &'static str) -> Result<()> {
        if control.level == 0 {
            return Err(CodegenError::InvalidLoopLevel {
                keyword,
                span: control.span,
            }
            .into());
        }
        let targets = self
            .loops
            .target(control.level)
            .ok_or(CodegenError::LoopLevelOutOfRange {
                keyword,
                level: control.level,
                depth: self.loops.depth(),
                span: control.span,
            })?;
        let label = if keyword == "next" {
            targets.continue_label.clone()
        } else {
            targets.break_label.clone()
        };
        self.emit(Instruction::Jmp(label));
        self.unreachable = true;
        Ok(())
    }

    /// An aligned jump target.
    pub(super) fn emit_label(&mut self, label: String) {
        self.emit(Instruction::Align);
        self.emit(Instruction::Label(label));
    }
}
