use super::command::Register;
use crate::definitions::{Address, Word, INIT_SP, REGISTER_COUNT};
use crate::util::{signed_decimal, to_hex};
use std::fmt;

/// r0-r7 and sp, plus the program counter which can only be changed by control flow
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registers {
    general: [Word; REGISTER_COUNT],
    pc: Address,
}

impl Default for Registers {
    fn default() -> Self {
        let mut general = [0; REGISTER_COUNT];
        general[Register::Sp.index()] = INIT_SP;
        Self { general, pc: 0 }
    }
}

impl Registers {
    #[inline]
    pub fn get(&self, reg: Register) -> Word {
        self.general[reg.index()]
    }

    #[inline]
    pub fn set(&mut self, reg: Register, value: Word) {
        self.general[reg.index()] = value;
    }

    #[inline]
    pub fn pc(&self) -> Address {
        self.pc
    }

    pub(super) fn set_pc(&mut self, pc: Address) {
        self.pc = pc;
    }

    /// all general registers in the order r0..r7, sp
    pub fn values(&self) -> [Word; REGISTER_COUNT] {
        self.general
    }
}

fn write_row(f: &mut fmt::Formatter, name: &str, value: Word) -> fmt::Result {
    write!(f, "{:>3}: {} {:>10}", name, to_hex(value), value)?;
    if let Some(signed) = signed_decimal(value) {
        write!(f, " ({})", signed)?;
    }
    writeln!(f)
}

impl fmt::Display for Registers {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for reg in Register::ALL {
            write_row(f, reg.name(), self.get(reg))?;
        }
        write_row(f, "pc", self.pc)
    }
}
