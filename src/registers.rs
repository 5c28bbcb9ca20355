use crate::memory::PROGRAM_ADDR;

/// number of general purpose registers
pub const REGISTER_COUNT: usize = 16;

/// VF doubles as carry, borrow and collision flag
pub const FLAG_REGISTER: u8 = 0xF;

/// V0-VF, the index register and the program counter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterFile {
    v: [u8; REGISTER_COUNT],
    i: u16,
    pc: u16,
}

impl Default for RegisterFile {
    fn default() -> Self {
        Self::new()
    }
}

impl RegisterFile {
    /// everything zeroed, PC at the program start
    pub fn new() -> Self {
        RegisterFile {
            v: [0; REGISTER_COUNT],
            i: 0,
            pc: PROGRAM_ADDR,
        }
    }

    /// Vx. `x` comes from a decoded nibble so is always < 16
    pub fn get(&self, x: u8) -> u8 {
        self.v[x as usize & 0xF]
    }

    pub fn set(&mut self, x: u8, value: u8) {
        self.v[x as usize & 0xF] = value;
    }

    pub fn flag(&self) -> u8 {
        self.v[FLAG_REGISTER as usize]
    }

    pub fn set_flag(&mut self, set: bool) {
        self.v[FLAG_REGISTER as usize] = set as u8;
    }

    pub fn all(&self) -> [u8; REGISTER_COUNT] {
        self.v
    }

    pub fn i(&self) -> u16 {
        self.i
    }

    pub fn set_i(&mut self, value: u16) {
        self.i = value;
    }

    pub fn pc(&self) -> u16 {
        self.pc
    }

    pub fn set_pc(&mut self, addr: u16) {
        self.pc = addr;
    }

    /// move PC on by `n` bytes
    pub fn advance(&mut self, n: u16) {
        self.pc = self.pc.wrapping_add(n);
    }
}
