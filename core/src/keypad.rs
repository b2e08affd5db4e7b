/// # Keypad
/// Input comes from a 16 key hexadecimal keypad:
/// ```text
/// |1|2|3|C|
/// |4|5|6|D|
/// |7|8|9|E|
/// |A|0|B|F|
/// ```
/// The machine only sees a single latched key: the last one pressed and not yet released
/// (or consumed by a key wait).
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Keypad {
    latched: Option<u8>,
}

impl Keypad {
    /// Latches `key`, replacing any key that was latched before.
    pub fn press(&mut self, key: u8) {
        debug_assert!(key <= 0xF, "key {:#X} is not on the keypad", key);
        self.latched = Some(key & 0xF);
    }

    /// Releases `key` if it is the latched one.
    pub fn release(&mut self, key: u8) {
        if self.latched == Some(key) {
            self.latched = None;
        }
    }

    pub fn current(&self) -> Option<u8> {
        self.latched
    }

    /// Consumes the latched key.
    pub fn take(&mut self) -> Option<u8> {
        self.latched.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_press_latches_last_key() {
        let mut keypad = Keypad::default();
        keypad.press(0x1);
        keypad.press(0xE);
        assert_eq!(keypad.current(), Some(0xE));
    }

    #[test]
    fn test_release_ignores_other_keys() {
        let mut keypad = Keypad::default();
        keypad.press(0x1);
        keypad.press(0xE);
        keypad.release(0x1);
        assert_eq!(keypad.current(), Some(0xE));
        keypad.release(0xE);
        assert_eq!(keypad.current(), None);
    }

    #[test]
    fn test_take_clears() {
        let mut keypad = Keypad::default();
        keypad.press(0x7);
        assert_eq!(keypad.take(), Some(0x7));
        assert_eq!(keypad.current(), None);
    }
}
