//! Storage for declarations: globals, parameters and locals.

use til_ast::{Declaration, Expr, LiteralKind};
use til_core::{CodegenError, Qualifier, Type};

use super::{PostfixWriter, Result};
use crate::coercion::needs_wrapper;
use crate::postfix::{Instruction, SymbolKind};

impl<'w, 'ast> PostfixWriter<'w, 'ast> {
    /// Lay out a global variable.
    ///
    /// `forward`/`external` declarations only record an import, which a
    /// later definition of the same name cancels.
    ///
    /// Postfix layout:
    /// ```text
    /// ; uninitialized              ; initialized
    /// BSS                          [out-of-line parts of the value]
    /// ALIGN                        DATA
    /// [GLOBAL name, OBJ]           ALIGN
    /// LABEL name                   [GLOBAL name, OBJ]
    /// SALLOC size                  LABEL name
    ///                              SINT | SDOUBLE | SADDR value
    /// ```
    pub(super) fn emit_global_declaration(&mut self, decl: &Declaration<'ast>) -> Result<()> {
        self.checker().check_declaration(decl)?;
        let name = decl.name.to_string();

        if decl.qualifier.is_declaration_only() {
            self.externs.insert(name);
            return Ok(());
        }
        self.externs.remove(&name);

        let Some(init) = decl.initializer else {
            self.emit(Instruction::Bss);
            self.emit(Instruction::Align);
            self.emit_global_header(decl.qualifier, name);
            self.emit(Instruction::SAlloc(decl.ty().size()));
            return Ok(());
        };

        let value = self.static_value(decl, init)?;
        self.emit(Instruction::Data);
        self.emit(Instruction::Align);
        self.emit_global_header(decl.qualifier, name);
        self.emit(value);
        Ok(())
    }

    fn emit_global_header(&mut self, qualifier: Qualifier, name: String) {
        if qualifier == Qualifier::Public {
            self.emit(Instruction::Global(name.clone(), SymbolKind::Obj));
        }
        self.emit(Instruction::Label(name));
    }

    /// The data directive holding a global's initializer.
    ///
    /// Strings and functions are emitted out of line first; the directive
    /// holds their address.
    fn static_value(&mut self, decl: &Declaration<'ast>, init: Expr<'ast>) -> Result<Instruction> {
        let target = decl.ty();
        let value = match init {
            Expr::Literal(lit) => match lit.kind {
                LiteralKind::Int(v) if target.is_double() => Instruction::sdouble(f64::from(v)),
                LiteralKind::Int(v) => Instruction::SInt(v),
                LiteralKind::Double(v) => Instruction::sdouble(v),
                LiteralKind::String(s) => Instruction::SAddr(self.emit_string(s)),
            },
            Expr::Null(_) => Instruction::SInt(0),
            Expr::Function(def) if needs_wrapper(target, def.function_type()) => {
                Instruction::SAddr(self.emit_wrapper(target, init)?)
            }
            Expr::Function(def) => Instruction::SAddr(self.emit_function(def)?),
            _ => {
                return Err(CodegenError::NonLiteralGlobalInitializer {
                    name: decl.name.to_string(),
                    span: decl.span,
                }
                .into());
            }
        };
        Ok(value)
    }

    /// Place a string literal in read-only data and return its label.
    pub(super) fn emit_string(&mut self, value: &str) -> String {
        let label = self.labels.fresh();
        self.emit(Instruction::Rodata);
        self.emit(Instruction::Align);
        self.emit(Instruction::Label(label.clone()));
        self.emit(Instruction::SString(value.to_string()));
        label
    }

    /// Bind a parameter at the next offset above the frame pointer.
    pub(super) fn declare_parameter(&mut self, decl: &Declaration<'ast>) -> Result<()> {
        let mut symbol = self.checker().check_declaration(decl)?;
        symbol.offset = self.offset;
        self.offset += decl.ty().size() as i32;
        self.symbols.replace(symbol);
        Ok(())
    }

    /// Bind a local below the frame pointer and store its initializer.
    ///
    /// Postfix layout:
    /// ```text
    /// [initializer, converted to the declared type]
    /// LOCAL offset
    /// STINT | STDOUBLE
    /// ```
    pub(super) fn emit_local_declaration(&mut self, decl: &Declaration<'ast>) -> Result<()> {
        let mut symbol = self.checker().check_declaration(decl)?;
        let ty = decl.ty();
        self.offset -= ty.size() as i32;
        symbol.offset = self.offset;
        self.symbols.replace(symbol);

        if let Some(init) = decl.initializer {
            self.accept_covariant(ty, init)?;
            self.emit(Instruction::Local(symbol.offset));
            self.emit(store(ty));
        }
        Ok(())
    }
}

/// Store instruction for a value of type `ty`.
pub(super) fn store(ty: Type<'_>) -> Instruction {
    if ty.is_double() { Instruction::StDouble } else { Instruction::StInt }
}

/// Load instruction for a value of type `ty`.
pub(super) fn load(ty: Type<'_>) -> Instruction {
    if ty.is_double() { Instruction::LdDouble } else { Instruction::LdInt }
}
