// a register/memory value of the machine
pub type Word = u32;
// an address in the 32-bit address space
pub type Address = u32;

// everything below this address is either a device register or invalid
pub const MIN_MEMORY_ADDRESS: Address = 0x4000_0000;

// memory mapped device registers
pub const KEYBOARD_STATUS: Address = 0x2000_0000;
pub const KEYBOARD_DATA: Address = 0x2000_0001;
pub const DISPLAY_STATUS: Address = 0x2000_0002;
pub const DISPLAY_DATA: Address = 0x2000_0003;

pub const KEYBOARD_BUFFER_SIZE: usize = 256;
// once the display holds more bytes than this, the older half is thrown away
pub const DISPLAY_BUFFER_MAX: usize = 1000;

// r0-r7 and sp
pub const REGISTER_COUNT: usize = 9;
pub const INIT_SP: Word = 0xF000_0000;

// comparisons and flow use 0 for true, so that zjump can branch on the result directly
pub const TRUE: Word = 0;
pub const FALSE: Word = 0xFFFF_FFFF;

// range of decimal literals accepted by the assembler
pub const MIN_LITERAL: i64 = -(1 << 31);
pub const MAX_LITERAL: i64 = u32::MAX as i64;
