use crate::definitions::{Address, Word};
use crate::util::to_hex;
use std::fmt;

/// The registers that general instructions may name. The program counter is
/// deliberately missing, only control flow can touch it.
#[derive(Debug, Eq, PartialEq, Copy, Clone, Hash)]
pub enum Register {
    R0,
    R1,
    R2,
    R3,
    R4,
    R5,
    R6,
    R7,
    Sp,
}

impl Register {
    pub const ALL: [Register; 9] = [
        Register::R0,
        Register::R1,
        Register::R2,
        Register::R3,
        Register::R4,
        Register::R5,
        Register::R6,
        Register::R7,
        Register::Sp,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Register::R0 => "r0",
            Register::R1 => "r1",
            Register::R2 => "r2",
            Register::R3 => "r3",
            Register::R4 => "r4",
            Register::R5 => "r5",
            Register::R6 => "r6",
            Register::R7 => "r7",
            Register::Sp => "sp",
        }
    }
}

impl TryFrom<&str> for Register {
    type Error = ();
    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Register::ALL
            .into_iter()
            .find(|r| r.name() == s)
            .ok_or(())
    }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[derive(Debug, Eq, PartialEq, Copy, Clone, Hash)]
#[repr(u8)]
pub enum Opcode {
    Copy = 0x00,
    CopyImm = 0x01,
    Sb = 0x02,
    Lb = 0x03,
    Sw = 0x04,
    Lw = 0x05,

    Add = 0x10,
    AddImm = 0x11,
    Sub = 0x12,
    Mul = 0x13,
    Div = 0x14,
    Mod = 0x15,
    Neg = 0x16,
    Flow = 0x17,

    Eq = 0x20,
    Neq = 0x21,
    Gt = 0x22,
    Lt = 0x23,
    Gte = 0x24,
    Lte = 0x25,

    And = 0x30,
    AndImm = 0x31,
    Or = 0x32,
    OrImm = 0x33,
    Xor = 0x34,
    XorImm = 0x35,

    LshiftImm = 0x40,
    Lshift = 0x41,
    ZrshiftImm = 0x42,
    Zrshift = 0x43,
    RshiftImm = 0x44,
    Rshift = 0x45,

    Jump = 0x50,
    Zjump = 0x51,
    Call = 0x52,
    Return = 0x53,
}

/// The constant part of an address expression
#[derive(Debug, Eq, PartialEq, Clone, Hash)]
pub enum Offset {
    Value(Word),
    /// a label that the assembler has not replaced yet
    Label(String),
}

/// `[reg1 reg2 offset]`, every part is optional but at least one is present
#[derive(Debug, Eq, PartialEq, Clone, Hash, Default)]
pub struct AddressExpr {
    pub base: Option<Register>,
    pub index: Option<Register>,
    pub offset: Option<Offset>,
}

impl fmt::Display for AddressExpr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut parts = Vec::with_capacity(3);
        parts.extend(self.base.map(|r| r.name().to_owned()));
        parts.extend(self.index.map(|r| r.name().to_owned()));
        match &self.offset {
            Some(Offset::Value(value)) => parts.push(format!("0x{:X}", value)),
            Some(Offset::Label(label)) => parts.push(label.clone()),
            None => {}
        }
        write!(f, "[{}]", parts.join(" "))
    }
}

/// An operand as it was written, before it gets checked against an opcode
#[derive(Debug, Eq, PartialEq, Clone)]
pub enum Operand {
    Register(Register),
    Immediate(Word),
    Address(AddressExpr),
}

impl Operand {
    /// the character used for this operand kind in the mnemonic patterns
    pub fn kind(&self) -> char {
        match self {
            Self::Register(_) => 'r',
            Self::Immediate(_) => 'v',
            Self::Address(_) => 'a',
        }
    }
}

#[derive(Debug, Eq, PartialEq, Clone)]
pub enum Operation {
    /// dst = src
    Copy(Register, Register),
    /// dst = value
    CopyImm(Register, Word),
    /// mem[addr] = lowest byte of src
    Sb(AddressExpr, Register),
    /// dst = mem[addr]
    Lb(Register, AddressExpr),
    /// mem[addr..addr + 4] = src
    Sw(AddressExpr, Register),
    /// dst = mem[addr..addr + 4]
    Lw(Register, AddressExpr),

    Add(Register, Register, Register),
    AddImm(Register, Register, Word),
    Sub(Register, Register, Register),
    Mul(Register, Register, Register),
    Div(Register, Register, Register),
    Mod(Register, Register, Register),
    /// negates the register in place
    Neg(Register),
    /// dst = overflow flag, 0 if set
    Flow(Register),

    Eq(Register, Register, Register),
    Neq(Register, Register, Register),
    Gt(Register, Register, Register),
    Lt(Register, Register, Register),
    Gte(Register, Register, Register),
    Lte(Register, Register, Register),

    And(Register, Register, Register),
    AndImm(Register, Register, Word),
    Or(Register, Register, Register),
    OrImm(Register, Register, Word),
    Xor(Register, Register, Register),
    XorImm(Register, Register, Word),

    LshiftImm(Register, Register, Word),
    Lshift(Register, Register, Register),
    ZrshiftImm(Register, Register, Word),
    Zrshift(Register, Register, Register),
    RshiftImm(Register, Register, Word),
    Rshift(Register, Register, Register),

    Jump(AddressExpr),
    /// jump if the register is zero
    Zjump(Register, AddressExpr),
    Call(AddressExpr),
    Return,
}

impl Operation {
    pub fn opcode(&self) -> Opcode {
        match self {
            Self::Copy(..) => Opcode::Copy,
            Self::CopyImm(..) => Opcode::CopyImm,
            Self::Sb(..) => Opcode::Sb,
            Self::Lb(..) => Opcode::Lb,
            Self::Sw(..) => Opcode::Sw,
            Self::Lw(..) => Opcode::Lw,
            Self::Add(..) => Opcode::Add,
            Self::AddImm(..) => Opcode::AddImm,
            Self::Sub(..) => Opcode::Sub,
            Self::Mul(..) => Opcode::Mul,
            Self::Div(..) => Opcode::Div,
            Self::Mod(..) => Opcode::Mod,
            Self::Neg(..) => Opcode::Neg,
            Self::Flow(..) => Opcode::Flow,
            Self::Eq(..) => Opcode::Eq,
            Self::Neq(..) => Opcode::Neq,
            Self::Gt(..) => Opcode::Gt,
            Self::Lt(..) => Opcode::Lt,
            Self::Gte(..) => Opcode::Gte,
            Self::Lte(..) => Opcode::Lte,
            Self::And(..) => Opcode::And,
            Self::AndImm(..) => Opcode::AndImm,
            Self::Or(..) => Opcode::Or,
            Self::OrImm(..) => Opcode::OrImm,
            Self::Xor(..) => Opcode::Xor,
            Self::XorImm(..) => Opcode::XorImm,
            Self::LshiftImm(..) => Opcode::LshiftImm,
            Self::Lshift(..) => Opcode::Lshift,
            Self::ZrshiftImm(..) => Opcode::ZrshiftImm,
            Self::Zrshift(..) => Opcode::Zrshift,
            Self::RshiftImm(..) => Opcode::RshiftImm,
            Self::Rshift(..) => Opcode::Rshift,
            Self::Jump(..) => Opcode::Jump,
            Self::Zjump(..) => Opcode::Zjump,
            Self::Call(..) => Opcode::Call,
            Self::Return => Opcode::Return,
        }
    }

    pub fn size(&self) -> u32 {
        self.opcode().size()
    }

    /// The address operand of this operation. No opcode takes more than one.
    pub fn address_mut(&mut self) -> Option<&mut AddressExpr> {
        match self {
            Self::Sb(addr, _)
            | Self::Lb(_, addr)
            | Self::Sw(addr, _)
            | Self::Lw(_, addr)
            | Self::Jump(addr)
            | Self::Zjump(_, addr)
            | Self::Call(addr) => Some(addr),
            _ => None,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = self.opcode().mnemonic();
        match self {
            Self::Copy(a, b) => write!(f, "{} {}, {}", name, a, b),
            Self::CopyImm(a, v) => write!(f, "{} {}, {}", name, a, v),
            Self::Sb(addr, r) | Self::Sw(addr, r) => write!(f, "{} {}, {}", name, addr, r),
            Self::Lb(r, addr) | Self::Lw(r, addr) | Self::Zjump(r, addr) => {
                write!(f, "{} {}, {}", name, r, addr)
            }
            Self::Neg(r) | Self::Flow(r) => write!(f, "{} {}", name, r),
            Self::AddImm(a, b, v)
            | Self::AndImm(a, b, v)
            | Self::OrImm(a, b, v)
            | Self::XorImm(a, b, v)
            | Self::LshiftImm(a, b, v)
            | Self::ZrshiftImm(a, b, v)
            | Self::RshiftImm(a, b, v) => write!(f, "{} {}, {}, {}", name, a, b, v),
            Self::Add(a, b, c)
            | Self::Sub(a, b, c)
            | Self::Mul(a, b, c)
            | Self::Div(a, b, c)
            | Self::Mod(a, b, c)
            | Self::Eq(a, b, c)
            | Self::Neq(a, b, c)
            | Self::Gt(a, b, c)
            | Self::Lt(a, b, c)
            | Self::Gte(a, b, c)
            | Self::Lte(a, b, c)
            | Self::And(a, b, c)
            | Self::Or(a, b, c)
            | Self::Xor(a, b, c)
            | Self::Lshift(a, b, c)
            | Self::Zrshift(a, b, c)
            | Self::Rshift(a, b, c) => write!(f, "{} {}, {}, {}", name, a, b, c),
            Self::Jump(addr) | Self::Call(addr) => write!(f, "{} {}", name, addr),
            Self::Return => write!(f, "{}", name),
        }
    }
}

/// A decoded instruction inside of a program image
#[derive(Debug, Eq, PartialEq, Clone)]
pub struct Instruction {
    pub operation: Operation,
    /// index of the source line this was assembled from (0 based)
    pub line_idx: usize,
}

impl Instruction {
    pub fn new(operation: Operation, line_idx: usize) -> Self {
        Self {
            operation,
            line_idx,
        }
    }

    pub fn size(&self) -> u32 {
        self.operation.size()
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.operation)
    }
}

/// Renders `address  opcode  size  line  disassembly` rows for a listing
pub fn listing_row(address: Address, instruction: &Instruction) -> String {
    format!(
        "{}  {:02X}  {}  {:>4}  {}",
        to_hex(address),
        instruction.operation.opcode().code(),
        instruction.size(),
        instruction.line_idx + 1,
        instruction
    )
}
