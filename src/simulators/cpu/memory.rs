use super::devices::{DisplayBuffer, KeyboardBuffer};
use super::error::CpuError;
use super::CpuResult;
use crate::definitions::{
    Address, Word, DISPLAY_DATA, DISPLAY_STATUS, FALSE, KEYBOARD_DATA, KEYBOARD_STATUS,
    MIN_MEMORY_ADDRESS, TRUE,
};
use crate::util::{join_word, lowest_byte, split_word};
use std::collections::HashMap;

use log::debug;

/// The address space of the machine
///
/// General memory is sparse: only bytes that were written are stored, everything
/// else reads as 0. That costs a hash lookup per access, but allows programs to
/// use any address in the upper three quarters of the address space.
#[derive(Debug, Default, Clone)]
pub struct Memory {
    cells: HashMap<Address, u8>,
    keyboard: KeyboardBuffer,
    display: DisplayBuffer,
}

fn offset_address(address: Address, offset: u32) -> CpuResult<Address> {
    address
        .checked_add(offset)
        .ok_or(CpuError::IllegalMemoryAddress(address as u64 + offset as u64))
}

impl Memory {
    /// Read a single address. Device registers can return values that don't fit into a byte
    pub fn read(&mut self, address: Address) -> CpuResult<Word> {
        if address >= MIN_MEMORY_ADDRESS {
            return Ok(self.cells.get(&address).copied().unwrap_or(0) as Word);
        }

        match address {
            KEYBOARD_STATUS => Ok(if self.keyboard.is_empty() { 0 } else { 0xFFFF_FFFF }),
            KEYBOARD_DATA => Ok(self.keyboard.pop().unwrap_or(0) as Word),
            // the display is always ready
            DISPLAY_STATUS => Ok(0xFFFF_FFFF),
            DISPLAY_DATA => Ok(0),
            _ => Err(CpuError::IllegalMemoryAddress(address as u64)),
        }
    }

    pub fn write(&mut self, address: Address, value: u8) -> CpuResult {
        if address >= MIN_MEMORY_ADDRESS {
            self.cells.insert(address, value);
            return Ok(());
        }

        match address {
            // the keyboard is read only and the display status can't be changed
            KEYBOARD_STATUS | KEYBOARD_DATA | DISPLAY_STATUS => Ok(()),
            DISPLAY_DATA => {
                self.display.push(value);
                Ok(())
            }
            _ => Err(CpuError::IllegalMemoryAddress(address as u64)),
        }
    }

    /// Reads 4 bytes in big endian order, keeping the lowest byte of each read
    pub fn read_word(&mut self, address: Address) -> CpuResult<Word> {
        let mut bytes = [0; 4];
        for (offset, byte) in (0..).zip(bytes.iter_mut()) {
            *byte = lowest_byte(self.read(offset_address(address, offset)?)?);
        }
        Ok(join_word(bytes))
    }

    /// Writes 4 bytes in big endian order
    ///
    /// a failing write leaves the bytes before it in place
    pub fn write_word(&mut self, address: Address, value: Word) -> CpuResult {
        for (offset, byte) in (0..).zip(split_word(value)) {
            self.write(offset_address(address, offset)?, byte)?;
        }
        Ok(())
    }

    /// Write a value that still has to be checked to be a byte
    pub fn poke(&mut self, address: Address, value: Word) -> CpuResult {
        let byte = u8::try_from(value).map_err(|_| CpuError::InvalidByteValue(value))?;
        self.write(address, byte)
    }

    /// Look at general memory without any side effects on devices
    pub fn peek(&self, address: Address) -> Option<u8> {
        (address >= MIN_MEMORY_ADDRESS).then(|| self.cells.get(&address).copied().unwrap_or(0))
    }

    /// Input from the outside world, dropped if the keyboard buffer is full
    pub fn push_key(&mut self, key: u8) -> bool {
        let accepted = self.keyboard.push(key);
        if !accepted {
            debug!("keyboard buffer is full, dropping key {}", key);
        }
        accepted
    }

    pub fn keyboard(&self) -> &KeyboardBuffer {
        &self.keyboard
    }

    pub fn display(&self) -> &DisplayBuffer {
        &self.display
    }
}

/// the result of a comparison in the machine's convention
pub fn truth(value: bool) -> Word {
    if value {
        TRUE
    } else {
        FALSE
    }
}
