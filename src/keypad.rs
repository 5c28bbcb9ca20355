use log::warn;

/// number of logical keys, 0x0-0xF
pub const KEY_COUNT: u8 = 16;

/// Logical key states as a bitmask; bit n set means key n is down. Which
/// physical key drives which bit is up to the input driver.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Keypad {
    mask: u16,
}

impl Keypad {
    pub fn new() -> Self {
        Keypad { mask: 0 }
    }

    pub fn set_key_down(&mut self, index: u8) {
        if Self::check(index) {
            self.mask |= 1 << index;
        }
    }

    pub fn set_key_up(&mut self, index: u8) {
        if Self::check(index) {
            self.mask &= !(1 << index);
        }
    }

    /// false for anything past 0xF, which no key can be
    pub fn is_down(&self, index: u8) -> bool {
        index < KEY_COUNT && self.mask & (1 << index) != 0
    }

    /// lowest-numbered key currently down
    pub fn first_down(&self) -> Option<u8> {
        match self.mask {
            0 => None,
            m => Some(m.trailing_zeros() as u8),
        }
    }

    pub fn mask(&self) -> u16 {
        self.mask
    }

    pub fn release_all(&mut self) {
        self.mask = 0;
    }

    fn check(index: u8) -> bool {
        if index >= KEY_COUNT {
            warn!("ignoring out of range key index {:#x}", index);
            return false;
        }
        true
    }
}
