use crate::definitions::{Address, Word};
use crate::util::{add_unsigned, lowest_byte, negate};
use command::{AddressExpr, Offset, Operation, Register};
use devices::{DisplayBuffer, KeyboardBuffer};
use memory::{truth, Memory};
use program::Program;
use registers::Registers;

pub use error::CpuError;

#[cfg(feature = "trace_cpu")]
use log::trace;

pub mod command;
pub mod devices;
pub mod error;
pub mod isa;
pub mod memory;
pub mod program;
pub mod registers;

pub type CpuResult<T = ()> = Result<T, CpuError>;

/// What happened in a single step
#[derive(Debug, Eq, PartialEq, Copy, Clone)]
pub enum Status {
    /// an instruction was executed
    Continuing,
    /// there is no instruction at pc, nothing was executed
    Halted,
}

#[derive(Debug, Default, Clone)]
pub struct Cpu {
    registers: Registers,
    overflow: bool,
    memory: Memory,
    program: Program,
}

impl Cpu {
    /// Replace the program and reset all machine state
    pub fn load(&mut self, program: Program) {
        *self = Self {
            program,
            ..Self::default()
        };
    }

    /// Forget the program and reset all machine state
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    #[inline]
    fn reg(&self, reg: Register) -> Word {
        self.registers.get(reg)
    }

    #[inline]
    fn set_reg(&mut self, reg: Register, value: Word) {
        self.registers.set(reg, value);
    }

    /// The wrapping sum of the registers and the offset of an address expression
    pub fn effective_address(&self, address: &AddressExpr) -> CpuResult<Address> {
        let offset = match &address.offset {
            Some(Offset::Value(value)) => *value,
            Some(Offset::Label(label)) => return Err(CpuError::UnresolvedLabel(label.clone())),
            None => 0,
        };

        Ok([address.base, address.index]
            .into_iter()
            .flatten()
            .fold(offset, |sum, reg| sum.wrapping_add(self.reg(reg))))
    }

    /// Execute the instruction at pc
    pub fn step(&mut self) -> CpuResult<Status> {
        macro_rules! compare {
            ($dst:expr, $lhs:expr, $op:tt, $rhs:expr) => {{
                let result = self.reg($lhs) $op self.reg($rhs);
                self.set_reg($dst, truth(result));
            }};
        }

        macro_rules! bitwise {
            ($dst:expr, $lhs:expr, $op:tt, $rhs:expr) => {{
                let value = self.reg($lhs) $op $rhs;
                self.set_reg($dst, value);
            }};
        }

        macro_rules! shift {
            ($dst:expr, $src:expr, $amount:expr, $f:expr) => {{
                let value = $f(self.reg($src), $amount % 32);
                self.set_reg($dst, value);
            }};
        }

        let pc = self.registers.pc();
        let Some(instruction) = self.program.get(pc) else {
            return Ok(Status::Halted);
        };
        let operation = instruction.operation.clone();
        let mut next_pc = pc.wrapping_add(instruction.size());

        #[cfg(feature = "trace_cpu")]
        trace!("{:#010X}: {}", pc, operation);

        match operation {
            Operation::Copy(dst, src) => self.set_reg(dst, self.reg(src)),
            Operation::CopyImm(dst, value) => self.set_reg(dst, value),
            Operation::Sb(addr, src) => {
                let address = self.effective_address(&addr)?;
                self.memory.write(address, lowest_byte(self.reg(src)))?;
            }
            Operation::Lb(dst, addr) => {
                let address = self.effective_address(&addr)?;
                let value = self.memory.read(address)?;
                self.set_reg(dst, value);
            }
            Operation::Sw(addr, src) => {
                let address = self.effective_address(&addr)?;
                self.memory.write_word(address, self.reg(src))?;
            }
            Operation::Lw(dst, addr) => {
                let address = self.effective_address(&addr)?;
                let value = self.memory.read_word(address)?;
                self.set_reg(dst, value);
            }

            Operation::Add(dst, lhs, rhs) => {
                let (value, overflow) = add_unsigned(self.reg(lhs), self.reg(rhs));
                self.set_reg(dst, value);
                self.overflow = overflow;
            }
            Operation::AddImm(dst, lhs, rhs) => {
                let (value, overflow) = add_unsigned(self.reg(lhs), rhs);
                self.set_reg(dst, value);
                self.overflow = overflow;
            }
            Operation::Sub(dst, lhs, rhs) => {
                let (value, overflow) = self.reg(lhs).overflowing_sub(self.reg(rhs));
                self.set_reg(dst, value);
                self.overflow = overflow;
            }
            Operation::Mul(dst, lhs, rhs) => {
                let (value, overflow) = self.reg(lhs).overflowing_mul(self.reg(rhs));
                self.set_reg(dst, value);
                self.overflow = overflow;
            }
            Operation::Div(dst, lhs, rhs) => {
                let value = self
                    .reg(lhs)
                    .checked_div(self.reg(rhs))
                    .ok_or(CpuError::DivisionByZero)?;
                self.set_reg(dst, value);
            }
            Operation::Mod(dst, lhs, rhs) => {
                let value = self
                    .reg(lhs)
                    .checked_rem(self.reg(rhs))
                    .ok_or(CpuError::DivisionByZero)?;
                self.set_reg(dst, value);
            }
            Operation::Neg(reg) => self.set_reg(reg, negate(self.reg(reg))),
            Operation::Flow(dst) => self.set_reg(dst, truth(self.overflow)),

            Operation::Eq(dst, lhs, rhs) => compare!(dst, lhs, ==, rhs),
            Operation::Neq(dst, lhs, rhs) => compare!(dst, lhs, !=, rhs),
            Operation::Gt(dst, lhs, rhs) => compare!(dst, lhs, >, rhs),
            Operation::Lt(dst, lhs, rhs) => compare!(dst, lhs, <, rhs),
            Operation::Gte(dst, lhs, rhs) => compare!(dst, lhs, >=, rhs),
            Operation::Lte(dst, lhs, rhs) => compare!(dst, lhs, <=, rhs),

            Operation::And(dst, lhs, rhs) => bitwise!(dst, lhs, &, self.reg(rhs)),
            Operation::AndImm(dst, lhs, rhs) => bitwise!(dst, lhs, &, rhs),
            Operation::Or(dst, lhs, rhs) => bitwise!(dst, lhs, |, self.reg(rhs)),
            Operation::OrImm(dst, lhs, rhs) => bitwise!(dst, lhs, |, rhs),
            Operation::Xor(dst, lhs, rhs) => bitwise!(dst, lhs, ^, self.reg(rhs)),
            Operation::XorImm(dst, lhs, rhs) => bitwise!(dst, lhs, ^, rhs),

            Operation::LshiftImm(dst, src, amount) => shift!(dst, src, amount, Word::wrapping_shl),
            Operation::Lshift(dst, src, amount) => {
                shift!(dst, src, self.reg(amount), Word::wrapping_shl)
            }
            Operation::ZrshiftImm(dst, src, amount) => {
                shift!(dst, src, amount, Word::wrapping_shr)
            }
            Operation::Zrshift(dst, src, amount) => {
                shift!(dst, src, self.reg(amount), Word::wrapping_shr)
            }
            Operation::RshiftImm(dst, src, amount) => {
                shift!(dst, src, amount, |v: Word, n| ((v as i32) >> n) as Word)
            }
            Operation::Rshift(dst, src, amount) => {
                shift!(dst, src, self.reg(amount), |v: Word, n| ((v as i32) >> n)
                    as Word)
            }

            Operation::Jump(addr) => next_pc = self.effective_address(&addr)?,
            Operation::Zjump(reg, addr) => {
                if self.reg(reg) == 0 {
                    next_pc = self.effective_address(&addr)?;
                }
            }
            Operation::Call(addr) => {
                let target = self.effective_address(&addr)?;
                let sp = self.reg(Register::Sp);
                self.memory.write_word(sp, next_pc)?;
                self.set_reg(Register::Sp, sp.wrapping_add(4));
                next_pc = target;
            }
            Operation::Return => {
                let sp = self.reg(Register::Sp).wrapping_sub(4);
                next_pc = self.memory.read_word(sp)?;
                self.set_reg(Register::Sp, sp);
            }
        }

        self.registers.set_pc(next_pc);
        Ok(Status::Continuing)
    }
}

// UI interaction
impl Cpu {
    pub fn registers(&self) -> &Registers {
        &self.registers
    }

    pub fn overflow(&self) -> bool {
        self.overflow
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    pub fn push_key(&mut self, key: u8) -> bool {
        self.memory.push_key(key)
    }

    pub fn keyboard(&self) -> &KeyboardBuffer {
        self.memory.keyboard()
    }

    pub fn display(&self) -> &DisplayBuffer {
        self.memory.display()
    }

    /// Store a value that was not produced by the program, so it still has to be checked
    pub fn poke(&mut self, address: Address, value: Word) -> CpuResult {
        self.memory.poke(address, value)
    }

    /// the source line of the instruction at pc, if there is one
    pub fn current_line(&self) -> Option<usize> {
        self.program
            .get(self.registers.pc())
            .map(|instruction| instruction.line_idx)
    }

    pub fn is_halted(&self) -> bool {
        self.current_line().is_none()
    }
}
