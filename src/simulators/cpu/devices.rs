use crate::definitions::{DISPLAY_BUFFER_MAX, KEYBOARD_BUFFER_SIZE};

/// Keys that were typed but not read by the program yet
///
/// This is a fixed size circular queue. If it is full, new keys are dropped,
/// reading from an empty buffer never blocks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyboardBuffer {
    data: [u8; KEYBOARD_BUFFER_SIZE],
    // index of the oldest pending key
    head: usize,
    len: usize,
}

impl Default for KeyboardBuffer {
    fn default() -> Self {
        Self {
            data: [0; KEYBOARD_BUFFER_SIZE],
            head: 0,
            len: 0,
        }
    }
}

impl KeyboardBuffer {
    /// Queue a key, returns false if it had to be dropped
    pub fn push(&mut self, key: u8) -> bool {
        if self.len == KEYBOARD_BUFFER_SIZE {
            return false;
        }
        let tail = (self.head + self.len) % KEYBOARD_BUFFER_SIZE;
        self.data[tail] = key;
        self.len += 1;
        true
    }

    pub fn pop(&mut self) -> Option<u8> {
        if self.len == 0 {
            return None;
        }
        let key = self.data[self.head];
        self.head = (self.head + 1) % KEYBOARD_BUFFER_SIZE;
        self.len -= 1;
        Some(key)
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// Everything the program wrote to the display
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DisplayBuffer {
    data: Vec<u8>,
    // bytes written since reset, including the ones that were evicted
    written: u64,
}

impl DisplayBuffer {
    pub fn push(&mut self, byte: u8) {
        self.data.push(byte);
        self.written += 1;
        if self.data.len() > DISPLAY_BUFFER_MAX {
            self.data.drain(..DISPLAY_BUFFER_MAX / 2);
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn written(&self) -> u64 {
        self.written
    }

    /// The bytes written after the first `seen` bytes that are still in the buffer
    pub fn since(&self, seen: u64) -> &[u8] {
        let new = self.written.saturating_sub(seen);
        let new = usize::try_from(new).unwrap_or(usize::MAX).min(self.data.len());
        &self.data[self.data.len() - new..]
    }

    /// every byte is treated as a latin-1 character
    pub fn text(&self) -> String {
        self.data.iter().map(|&b| char::from(b)).collect()
    }
}
