use std::collections::HashMap;

use lazy_static::lazy_static;

const BACKSPACE_KEY: u8 = 8;
const TAB_KEY: u8 = 9;
const NEWLINE_KEY: u8 = 10;
const ESC_KEY: u8 = 27;
const SPACE_KEY: u8 = 32;
const DELETE_KEY: u8 = 127;

lazy_static! {
    static ref ACTION_KEY_CODES: HashMap<&'static str, u8> = {
        let mut map = HashMap::new();
        map.insert("Space", SPACE_KEY);
        map.insert("Tab", TAB_KEY);
        map.insert("Backspace", BACKSPACE_KEY);
        map.insert("Enter", NEWLINE_KEY);
        map.insert("Escape", ESC_KEY);
        map.insert("Delete", DELETE_KEY);
        map
    };
}

/// Translate the name of a key event (as the browser reports it) into the byte
/// that gets pushed into the keyboard buffer
///
/// Printable characters map to their ascii code. Everything else the machine
/// has no code for (arrow keys, function keys, non ascii letters) yields None.
pub fn get_key_code(key: &str) -> Option<u8> {
    let mut chars = key.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii() => Some(c as u8),
        _ => ACTION_KEY_CODES.get(key).copied(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_printable_keys_keep_their_case() {
        assert_eq!(Some(b'a'), get_key_code("a"));
        assert_eq!(Some(b'A'), get_key_code("A"));
        assert_eq!(Some(b'#'), get_key_code("#"));
    }

    #[test]
    fn test_action_keys() {
        assert_eq!(Some(10), get_key_code("Enter"));
        assert_eq!(Some(8), get_key_code("Backspace"));
        assert_eq!(Some(32), get_key_code("Space"));
    }

    #[test]
    fn test_unknown_keys() {
        assert_eq!(None, get_key_code("ArrowLeft"));
        assert_eq!(None, get_key_code("ä"));
        assert_eq!(None, get_key_code(""));
    }
}
