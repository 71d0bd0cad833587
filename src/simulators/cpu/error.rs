use crate::definitions::Word;
use crate::util::to_hex;
use std::error;
use std::fmt;

#[derive(Debug, Eq, PartialEq, Clone)]
pub enum CpuError {
    /// u64, because a word access may run past the end of the address space
    IllegalMemoryAddress(u64),
    InvalidByteValue(Word),
    DivisionByZero,
    /// an address still refers to a label, which the assembler should have replaced
    UnresolvedLabel(String),
}

impl fmt::Display for CpuError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::IllegalMemoryAddress(a) => match Word::try_from(*a) {
                Ok(a) => write!(f, "Address {} is invalid", to_hex(a)),
                Err(_) => write!(f, "Address {:#X} is invalid", a),
            },
            Self::InvalidByteValue(v) => write!(f, "Byte value {} is invalid", v),
            Self::DivisionByZero => write!(f, "Division by zero"),
            Self::UnresolvedLabel(label) => write!(f, "Label {} was never resolved", label),
        }
    }
}

impl error::Error for CpuError {}
