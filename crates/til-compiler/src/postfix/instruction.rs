//! Postfix stack-machine instructions.
//!
//! The target is a pure evaluation stack with a frame pointer. Integers
//! and addresses take one 4-byte cell, doubles take two. Operations pop
//! their operands and push their result.

use std::fmt;

use ordered_float::OrderedFloat;

/// Kind of an exported symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    /// Code
    Func,
    /// Data
    Obj,
}

impl fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SymbolKind::Func => write!(f, "FUNC"),
            SymbolKind::Obj => write!(f, "OBJ"),
        }
    }
}

/// A postfix instruction.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Instruction {
    // =========================================================================
    // Segments
    // =========================================================================
    /// Select the code segment for the named function.
    Text(String),
    /// Select the initialized data segment.
    Data,
    /// Select the read-only data segment.
    Rodata,
    /// Select the zero-initialized data segment.
    Bss,
    /// Align the current position.
    Align,

    // =========================================================================
    // Symbols
    // =========================================================================
    /// Define a label at the current position.
    Label(String),
    /// Export a symbol.
    Global(String, SymbolKind),
    /// Import a symbol.
    Extern(String),

    // =========================================================================
    // Static Data
    // =========================================================================
    /// 4-byte integer.
    SInt(i32),
    /// 8-byte double.
    SDouble(OrderedFloat<f64>),
    /// Zero-terminated string.
    SString(String),
    /// Address of a label.
    SAddr(String),
    /// N zero bytes.
    SAlloc(u32),

    // =========================================================================
    // Pushes
    // =========================================================================
    /// Push an integer.
    Int(i32),
    /// Push a double.
    Double(OrderedFloat<f64>),
    /// Push the address of a label.
    Addr(String),
    /// Push frame pointer + offset.
    Local(i32),

    // =========================================================================
    // Memory
    // =========================================================================
    /// Pop an address, push the integer stored there.
    LdInt,
    /// Pop an address, push the double stored there.
    LdDouble,
    /// Pop an address, then an integer; store it.
    StInt,
    /// Pop an address, then a double; store it.
    StDouble,

    // =========================================================================
    // Integer Operations
    // =========================================================================
    Neg,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    /// Bitwise and.
    And,
    /// Bitwise or.
    Or,

    // =========================================================================
    // Double Operations
    // =========================================================================
    DNeg,
    DAdd,
    DSub,
    DMul,
    DDiv,
    /// Compare two doubles, push -1, 0 or 1.
    DCmp,

    // =========================================================================
    // Conversions
    // =========================================================================
    /// Int to double.
    I2D,
    /// Double to int (truncating).
    D2I,

    // =========================================================================
    // Stack
    // =========================================================================
    /// Duplicate the top cell.
    Dup32,
    /// Duplicate the top double.
    Dup64,
    /// Discard N bytes.
    Trash(u32),
    /// Pop a byte count, reserve that much stack.
    Alloc,
    /// Push the stack pointer.
    Sp,

    // =========================================================================
    // Control
    // =========================================================================
    Jmp(String),
    /// Pop; jump if zero.
    Jz(String),
    /// Pop; jump if not zero.
    Jnz(String),
    /// Call a named routine.
    Call(String),
    /// Pop an address and call it.
    Branch,
    /// Open a frame reserving N bytes of locals.
    Enter(u32),
    Leave,
    Ret,
    /// Push the 4-byte function result.
    LdFval32,
    /// Push the 8-byte function result.
    LdFval64,
    /// Pop the 4-byte function result.
    StFval32,
    /// Pop the 8-byte function result.
    StFval64,
}

impl Instruction {
    /// Shorthand for [`Instruction::Double`].
    pub fn double(value: f64) -> Self {
        Instruction::Double(OrderedFloat(value))
    }

    /// Shorthand for [`Instruction::SDouble`].
    pub fn sdouble(value: f64) -> Self {
        Instruction::SDouble(OrderedFloat(value))
    }

    /// Mnemonic without operands.
    pub fn mnemonic(&self) -> &'static str {
        match self {
            Instruction::Text(_) => "TEXT",
            Instruction::Data => "DATA",
            Instruction::Rodata => "RODATA",
            Instruction::Bss => "BSS",
            Instruction::Align => "ALIGN",
            Instruction::Label(_) => "LABEL",
            Instruction::Global(..) => "GLOBAL",
            Instruction::Extern(_) => "EXTERN",
            Instruction::SInt(_) => "SINT",
            Instruction::SDouble(_) => "SDOUBLE",
            Instruction::SString(_) => "SSTRING",
            Instruction::SAddr(_) => "SADDR",
            Instruction::SAlloc(_) => "SALLOC",
            Instruction::Int(_) => "INT",
            Instruction::Double(_) => "DOUBLE",
            Instruction::Addr(_) => "ADDR",
            Instruction::Local(_) => "LOCAL",
            Instruction::LdInt => "LDINT",
            Instruction::LdDouble => "LDDOUBLE",
            Instruction::StInt => "STINT",
            Instruction::StDouble => "STDOUBLE",
            Instruction::Neg => "NEG",
            Instruction::Add => "ADD",
            Instruction::Sub => "SUB",
            Instruction::Mul => "MUL",
            Instruction::Div => "DIV",
            Instruction::Mod => "MOD",
            Instruction::Eq => "EQ",
            Instruction::Ne => "NE",
            Instruction::Lt => "LT",
            Instruction::Le => "LE",
            Instruction::Gt => "GT",
            Instruction::Ge => "GE",
            Instruction::And => "AND",
            Instruction::Or => "OR",
            Instruction::DNeg => "DNEG",
            Instruction::DAdd => "DADD",
            Instruction::DSub => "DSUB",
            Instruction::DMul => "DMUL",
            Instruction::DDiv => "DDIV",
            Instruction::DCmp => "DCMP",
            Instruction::I2D => "I2D",
            Instruction::D2I => "D2I",
            Instruction::Dup32 => "DUP32",
            Instruction::Dup64 => "DUP64",
            Instruction::Trash(_) => "TRASH",
            Instruction::Alloc => "ALLOC",
            Instruction::Sp => "SP",
            Instruction::Jmp(_) => "JMP",
            Instruction::Jz(_) => "JZ",
            Instruction::Jnz(_) => "JNZ",
            Instruction::Call(_) => "CALL",
            Instruction::Branch => "BRANCH",
            Instruction::Enter(_) => "ENTER",
            Instruction::Leave => "LEAVE",
            Instruction::Ret => "RET",
            Instruction::LdFval32 => "LDFVAL32",
            Instruction::LdFval64 => "LDFVAL64",
            Instruction::StFval32 => "STFVAL32",
            Instruction::StFval64 => "STFVAL64",
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = self.mnemonic();
        match self {
            Instruction::Text(name)
            | Instruction::Label(name)
            | Instruction::Extern(name)
            | Instruction::SAddr(name)
            | Instruction::Addr(name)
            | Instruction::Jmp(name)
            | Instruction::Jz(name)
            | Instruction::Jnz(name)
            | Instruction::Call(name) => write!(f, "{op} {name}"),
            Instruction::Global(name, kind) => write!(f, "{op} {name}, {kind}"),
            Instruction::SInt(value) | Instruction::Int(value) => write!(f, "{op} {value}"),
            Instruction::SDouble(value) | Instruction::Double(value) => write!(f, "{op} {value}"),
            Instruction::SString(value) => write!(f, "{op} {value:?}"),
            Instruction::SAlloc(n) | Instruction::Trash(n) | Instruction::Enter(n) => write!(f, "{op} {n}"),
            Instruction::Local(offset) => write!(f, "{op} {offset}"),
            _ => f.write_str(op),
        }
    }
}
