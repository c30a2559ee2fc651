//! A small postfix stack machine for running generated listings.
//!
//! Memory is one flat little-endian byte array. Static data is laid out
//! from [`DATA_BASE`] (read-only data, then data, then BSS); the stack
//! starts at the top and grows down. Code lives in a separate address
//! space: instruction `i` has address `CODE_BASE + i`.
//!
//! Calling convention, as the writer emits it: arguments are pushed last
//! to first, `BRANCH`/`CALL` push the return address, `ENTER` saves the
//! frame pointer, so the first parameter sits at `fp + 8`. Results travel
//! through a separate return-value register.

use std::collections::{HashMap, VecDeque};

use til::{Instruction, Listing};

pub const CODE_BASE: u32 = 1 << 24;
pub const DATA_BASE: u32 = 16;
const MEMORY_SIZE: usize = 1 << 16;
/// Stack pointer before the entry function is called
pub const STACK_TOP: u32 = MEMORY_SIZE as u32;
const HALT: u32 = CODE_BASE - 1;
const STEP_LIMIT: usize = 1_000_000;

#[derive(Clone, Copy, PartialEq, Eq)]
enum DataSection {
    Rodata,
    Data,
    Bss,
}

impl DataSection {
    fn index(self) -> usize {
        match self {
            DataSection::Rodata => 0,
            DataSection::Data => 1,
            DataSection::Bss => 2,
        }
    }
}

#[derive(Clone, Copy)]
enum Section {
    Text(usize),
    Data(DataSection),
}

/// Collects a listing into code streams (one per `TEXT` name) and data
/// sections, then links them.
#[derive(Default)]
struct Assembler {
    streams: Vec<(String, Vec<Instruction>)>,
    code_labels: HashMap<String, (usize, usize)>,
    data: [Vec<u8>; 3],
    data_labels: HashMap<String, (usize, usize)>,
    /// (section, offset, label) words to patch with a label's address
    fixups: Vec<(usize, usize, String)>,
}

impl Assembler {
    fn stream(&mut self, name: &str) -> usize {
        match self.streams.iter().position(|(n, _)| n == name) {
            Some(i) => i,
            None => {
                self.streams.push((name.to_string(), Vec::new()));
                self.streams.len() - 1
            }
        }
    }

    fn assemble(listing: &Listing) -> Machine {
        let mut asm = Assembler::default();
        let mut section: Option<Section> = None;

        for instruction in listing {
            match instruction {
                Instruction::Text(name) => section = Some(Section::Text(asm.stream(name))),
                Instruction::Data => section = Some(Section::Data(DataSection::Data)),
                Instruction::Rodata => section = Some(Section::Data(DataSection::Rodata)),
                Instruction::Bss => section = Some(Section::Data(DataSection::Bss)),
                Instruction::Global(..) | Instruction::Extern(_) => {}
                Instruction::Align => {
                    if let Some(Section::Data(s)) = section {
                        let bytes = &mut asm.data[s.index()];
                        while bytes.len() % 4 != 0 {
                            bytes.push(0);
                        }
                    }
                }
                Instruction::Label(label) => match section {
                    Some(Section::Text(stream)) => {
                        let at = asm.streams[stream].1.len();
                        asm.code_labels.insert(label.clone(), (stream, at));
                    }
                    Some(Section::Data(s)) => {
                        let at = asm.data[s.index()].len();
                        asm.data_labels.insert(label.clone(), (s.index(), at));
                    }
                    None => panic!("label {label} outside any section"),
                },
                Instruction::SInt(v) => asm.data_bytes(&section, &v.to_le_bytes()),
                Instruction::SDouble(v) => asm.data_bytes(&section, &v.into_inner().to_le_bytes()),
                Instruction::SString(s) => {
                    let mut bytes = s.as_bytes().to_vec();
                    bytes.push(0);
                    asm.data_bytes(&section, &bytes);
                }
                Instruction::SAlloc(n) => asm.data_bytes(&section, &vec![0; *n as usize]),
                Instruction::SAddr(label) => {
                    let Some(Section::Data(s)) = section else {
                        panic!("SADDR outside data");
                    };
                    let at = asm.data[s.index()].len();
                    asm.fixups.push((s.index(), at, label.clone()));
                    asm.data_bytes(&section, &[0; 4]);
                }
                other => match section {
                    Some(Section::Text(stream)) => asm.streams[stream].1.push(other.clone()),
                    _ => panic!("{other} outside a code segment"),
                },
            }
        }
        asm.link()
    }

    fn data_bytes(&mut self, section: &Option<Section>, bytes: &[u8]) {
        match section {
            Some(Section::Data(s)) => self.data[s.index()].extend_from_slice(bytes),
            _ => panic!("static data outside a data segment"),
        }
    }

    fn link(self) -> Machine {
        let mut labels = HashMap::new();

        let mut code = Vec::new();
        let mut starts = Vec::new();
        for (_, stream) in &self.streams {
            starts.push(code.len());
            code.extend(stream.iter().cloned());
        }
        for (label, (stream, at)) in &self.code_labels {
            labels.insert(label.clone(), CODE_BASE + (starts[*stream] + at) as u32);
        }

        let mut bases = [0usize; 3];
        let mut next = DATA_BASE as usize;
        for (i, bytes) in self.data.iter().enumerate() {
            bases[i] = next;
            next += bytes.len().next_multiple_of(8);
        }
        for (label, (section, at)) in &self.data_labels {
            labels.insert(label.clone(), (bases[*section] + at) as u32);
        }

        let mut memory = vec![0u8; MEMORY_SIZE];
        for (i, bytes) in self.data.iter().enumerate() {
            memory[bases[i]..bases[i] + bytes.len()].copy_from_slice(bytes);
        }
        for (section, at, label) in &self.fixups {
            let address = *labels.get(label).unwrap_or_else(|| panic!("undefined label {label}"));
            let at = bases[*section] + at;
            memory[at..at + 4].copy_from_slice(&address.to_le_bytes());
        }

        Machine {
            code,
            labels,
            memory,
            sp: STACK_TOP,
            fp: 0,
            fval: 0,
            input: VecDeque::new(),
            output: String::new(),
        }
    }
}

/// A linked program ready to run.
pub struct Machine {
    code: Vec<Instruction>,
    labels: HashMap<String, u32>,
    memory: Vec<u8>,
    sp: u32,
    fp: u32,
    /// Return-value register (an int or a double's bits)
    fval: u64,
    input: VecDeque<f64>,
    output: String,
}

/// What a finished run left behind.
#[derive(Debug)]
pub struct Run {
    pub exit_code: i32,
    pub output: String,
    /// Stack pointer after the entry function returned
    pub final_sp: u32,
}

impl Machine {
    pub fn load(listing: &Listing) -> Self {
        Assembler::assemble(listing)
    }

    /// Values handed out by `readi`/`readd`, in order.
    pub fn with_input(mut self, values: &[f64]) -> Self {
        self.input.extend(values.iter().copied());
        self
    }

    /// Address of a label.
    pub fn address(&self, label: &str) -> u32 {
        *self.labels.get(label).unwrap_or_else(|| panic!("undefined label {label}"))
    }

    /// Call `entry` with no arguments and run until it returns.
    pub fn run(mut self, entry: &str) -> Run {
        let mut pc = self.address(entry) - CODE_BASE;
        self.push_i32(HALT as i32);

        for _ in 0..STEP_LIMIT {
            let instruction = self.code[pc as usize].clone();
            pc += 1;
            if let Some(target) = self.step(&instruction, pc) {
                if target == HALT {
                    return Run {
                        exit_code: self.fval as u32 as i32,
                        output: self.output,
                        final_sp: self.sp,
                    };
                }
                pc = target - CODE_BASE;
            }
        }
        panic!("step limit exceeded");
    }

    /// Execute one instruction; returns a jump target if control moves.
    fn step(&mut self, instruction: &Instruction, next: u32) -> Option<u32> {
        use Instruction::*;

        match instruction {
            Int(v) => self.push_i32(*v),
            Double(v) => self.push_f64(v.into_inner()),
            Addr(label) => {
                let address = self.address(label);
                self.push_i32(address as i32);
            }
            Local(offset) => self.push_i32((self.fp as i32).wrapping_add(*offset)),

            LdInt => {
                let address = self.pop_i32() as u32;
                let v = self.read_i32(address);
                self.push_i32(v);
            }
            LdDouble => {
                let address = self.pop_i32() as u32;
                let v = self.read_f64(address);
                self.push_f64(v);
            }
            StInt => {
                let address = self.pop_i32() as u32;
                let v = self.pop_i32();
                self.write_i32(address, v);
            }
            StDouble => {
                let address = self.pop_i32() as u32;
                let v = self.pop_f64();
                self.write_f64(address, v);
            }

            Neg => {
                let v = self.pop_i32();
                self.push_i32(v.wrapping_neg());
            }
            Add | Sub | Mul | Div | Mod | Eq | Ne | Lt | Le | Gt | Ge | And | Or => {
                let b = self.pop_i32();
                let a = self.pop_i32();
                let v = match instruction {
                    Add => a.wrapping_add(b),
                    Sub => a.wrapping_sub(b),
                    Mul => a.wrapping_mul(b),
                    Div => a / b,
                    Mod => a % b,
                    Eq => (a == b) as i32,
                    Ne => (a != b) as i32,
                    Lt => (a < b) as i32,
                    Le => (a <= b) as i32,
                    Gt => (a > b) as i32,
                    Ge => (a >= b) as i32,
                    And => a & b,
                    _ => a | b,
                };
                self.push_i32(v);
            }

            DNeg => {
                let v = self.pop_f64();
                self.push_f64(-v);
            }
            DAdd | DSub | DMul | DDiv => {
                let b = self.pop_f64();
                let a = self.pop_f64();
                let v = match instruction {
                    DAdd => a + b,
                    DSub => a - b,
                    DMul => a * b,
                    _ => a / b,
                };
                self.push_f64(v);
            }
            DCmp => {
                let b = self.pop_f64();
                let a = self.pop_f64();
                let v = if a < b {
                    -1
                } else if a > b {
                    1
                } else {
                    0
                };
                self.push_i32(v);
            }
            I2D => {
                let v = self.pop_i32();
                self.push_f64(f64::from(v));
            }
            D2I => {
                let v = self.pop_f64();
                self.push_i32(v as i32);
            }

            Dup32 => {
                let v = self.read_i32(self.sp);
                self.push_i32(v);
            }
            Dup64 => {
                let v = self.read_f64(self.sp);
                self.push_f64(v);
            }
            Trash(n) => self.sp += n,
            Alloc => {
                let n = self.pop_i32() as u32;
                self.sp -= n;
            }
            Sp => self.push_i32(self.sp as i32),

            Jmp(label) => return Some(self.address(label)),
            Jz(label) => {
                if self.pop_i32() == 0 {
                    return Some(self.address(label));
                }
            }
            Jnz(label) => {
                if self.pop_i32() != 0 {
                    return Some(self.address(label));
                }
            }
            Call(name) => {
                if self.runtime(name) {
                    return None;
                }
                self.push_i32((CODE_BASE + next) as i32);
                return Some(self.address(name));
            }
            Branch => {
                let target = self.pop_i32() as u32;
                self.push_i32((CODE_BASE + next) as i32);
                return Some(target);
            }
            Enter(n) => {
                self.push_i32(self.fp as i32);
                self.fp = self.sp;
                self.sp -= n;
            }
            Leave => {
                self.sp = self.fp;
                self.fp = self.pop_i32() as u32;
            }
            Ret => return Some(self.pop_i32() as u32),
            LdFval32 => self.push_i32(self.fval as u32 as i32),
            LdFval64 => self.push_f64(f64::from_bits(self.fval)),
            StFval32 => self.fval = u64::from(self.pop_i32() as u32),
            StFval64 => self.fval = self.pop_f64().to_bits(),

            other => panic!("{other} is not executable"),
        }
        None
    }

    /// Run a runtime routine. Arguments are read in place; the caller
    /// trashes them.
    fn runtime(&mut self, name: &str) -> bool {
        match name {
            "printi" => {
                let v = self.read_i32(self.sp);
                self.output.push_str(&v.to_string());
            }
            "printd" => {
                let v = self.read_f64(self.sp);
                self.output.push_str(&v.to_string());
            }
            "prints" => {
                let mut address = self.read_i32(self.sp) as usize;
                while self.memory[address] != 0 {
                    self.output.push(self.memory[address] as char);
                    address += 1;
                }
            }
            "println" => self.output.push('\n'),
            "readi" => {
                let v = self.input.pop_front().unwrap_or_default();
                self.fval = u64::from(v as i32 as u32);
            }
            "readd" => {
                let v = self.input.pop_front().unwrap_or_default();
                self.fval = v.to_bits();
            }
            _ => return false,
        }
        true
    }

    fn push_i32(&mut self, v: i32) {
        self.sp -= 4;
        self.write_i32(self.sp, v);
    }

    fn pop_i32(&mut self) -> i32 {
        let v = self.read_i32(self.sp);
        self.sp += 4;
        v
    }

    fn push_f64(&mut self, v: f64) {
        self.sp -= 8;
        self.write_f64(self.sp, v);
    }

    fn pop_f64(&mut self) -> f64 {
        let v = self.read_f64(self.sp);
        self.sp += 8;
        v
    }

    fn read_i32(&self, address: u32) -> i32 {
        let at = address as usize;
        i32::from_le_bytes(self.memory[at..at + 4].try_into().unwrap())
    }

    fn write_i32(&mut self, address: u32, v: i32) {
        let at = address as usize;
        self.memory[at..at + 4].copy_from_slice(&v.to_le_bytes());
    }

    fn read_f64(&self, address: u32) -> f64 {
        let at = address as usize;
        f64::from_le_bytes(self.memory[at..at + 8].try_into().unwrap())
    }

    fn write_f64(&mut self, address: u32, v: f64) {
        let at = address as usize;
        self.memory[at..at + 8].copy_from_slice(&v.to_le_bytes());
    }
}
