use crate::definitions::Word;

/// Add two words, returning the wrapped sum and whether the exact sum left the 32-bit range
pub fn add_unsigned(lhs: Word, rhs: Word) -> (Word, bool) {
    lhs.overflowing_add(rhs)
}

pub fn negate(value: Word) -> Word {
    value.wrapping_neg()
}

pub fn lowest_byte(word: Word) -> u8 {
    (word & 0xFF) as u8
}

// words are stored big endian in memory
pub fn split_word(word: Word) -> [u8; 4] {
    word.to_be_bytes()
}

pub fn join_word(bytes: [u8; 4]) -> Word {
    Word::from_be_bytes(bytes)
}

/// The two's complement interpretation of a word, but only if it is actually negative
pub fn signed_decimal(value: Word) -> Option<i32> {
    let signed = value as i32;
    (signed < 0).then_some(signed)
}

/// Formats a word as 0xXXXX_XXXX
pub fn to_hex(value: Word) -> String {
    let hex = format!("{:08X}", value);
    format!("0x{}_{}", &hex[..4], &hex[4..])
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_split_and_join_are_big_endian() {
        assert_eq!([0x12, 0x34, 0x56, 0x78], split_word(0x1234_5678));
        assert_eq!(0xDEAD_BEEF, join_word([0xDE, 0xAD, 0xBE, 0xEF]));
    }

    #[test]
    fn test_hex_formatting() {
        assert_eq!("0x0000_0000", to_hex(0));
        assert_eq!("0x0000_0020", to_hex(0x20));
        assert_eq!("0xF000_0000", to_hex(0xF000_0000));
        assert_eq!("0xDEAD_BEEF", to_hex(0xDEAD_BEEF));
    }

    #[test]
    fn test_signed_decimal_only_for_negative_values() {
        assert_eq!(None, signed_decimal(0));
        assert_eq!(None, signed_decimal(0x7FFF_FFFF));
        assert_eq!(Some(-1), signed_decimal(0xFFFF_FFFF));
        assert_eq!(Some(i32::MIN), signed_decimal(0x8000_0000));
    }

    #[test]
    fn test_lowest_byte() {
        assert_eq!(0xEF, lowest_byte(0xDEAD_BEEF));
        assert_eq!(0, lowest_byte(0x100));
    }

    proptest! {
        #[test]
        fn add_wraps_and_reports_overflow(a in any::<u32>(), b in any::<u32>()) {
            let exact = a as u64 + b as u64;
            let (sum, overflow) = add_unsigned(a, b);
            prop_assert_eq!(sum as u64, exact % (1 << 32));
            prop_assert_eq!(overflow, exact >= 1 << 32);
        }

        #[test]
        fn negate_is_twos_complement(v in any::<u32>()) {
            prop_assert_eq!(negate(v) as u64, ((1u64 << 32) - v as u64) % (1 << 32));
        }
    }
}
