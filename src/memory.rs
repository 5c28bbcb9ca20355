use crate::error::{LoadError, RuntimeError};
use log::debug;

// NB. addresses are u16 as per the chip-8; lengths and offending addresses are
//     usize so that I + n can run past 0xffff without wrapping

/// Represents the flat address space. Everything is bounds checked; a bad
/// address is a runtime fault, never a panic.
pub trait MemoryMap {
    /// the whole address space
    fn bytes(&self) -> &[u8];

    /// the whole address space, writable
    fn bytes_mut(&mut self) -> &mut [u8];

    /// get a single byte
    fn read_byte(&self, addr: usize) -> Result<u8, RuntimeError> {
        self.bytes()
            .get(addr)
            .copied()
            .ok_or(RuntimeError::OutOfBounds { address: addr })
    }

    /// put a single byte
    fn write_byte(&mut self, addr: usize, value: u8) -> Result<(), RuntimeError> {
        let byte = self
            .bytes_mut()
            .get_mut(addr)
            .ok_or(RuntimeError::OutOfBounds { address: addr })?;
        *byte = value;
        Ok(())
    }

    /// get a big-endian two-byte word
    fn get_word(&self, addr: usize) -> Result<u16, RuntimeError> {
        let word = self.get_ro_slice(addr, 2)?;
        Ok(u16::from_be_bytes([word[0], word[1]]))
    }

    /// get a r/o slice of the underlying memory
    fn get_ro_slice(&self, addr: usize, len: usize) -> Result<&[u8], RuntimeError> {
        let size = self.bytes().len();
        check_range(size, addr, len)?;
        Ok(&self.bytes()[addr..addr + len])
    }

    /// get a r/w slice of the underlying memory
    fn get_rw_slice(&mut self, addr: usize, len: usize) -> Result<&mut [u8], RuntimeError> {
        let size = self.bytes().len();
        check_range(size, addr, len)?;
        Ok(&mut self.bytes_mut()[addr..addr + len])
    }

    /// write a chunk of bytes
    fn write(&mut self, data: &[u8], addr: usize) -> Result<(), RuntimeError> {
        self.get_rw_slice(addr, data.len())?.copy_from_slice(data);
        Ok(())
    }
}

/// `addr..addr + len` must sit inside `size` bytes; the error names the
/// first address that doesn't exist
fn check_range(size: usize, addr: usize, len: usize) -> Result<(), RuntimeError> {
    if addr >= size && len > 0 {
        return Err(RuntimeError::OutOfBounds { address: addr });
    }
    if addr + len > size {
        return Err(RuntimeError::OutOfBounds { address: size });
    }
    Ok(())
}

/// how much RAM we have
pub const RAM_SIZE_BYTES: usize = 4096;

/// where the program is loaded
pub const PROGRAM_ADDR: u16 = 0x0200;

/// largest ROM that fits between the program address and the top of RAM
pub const MAX_PROGRAM_BYTES: usize = RAM_SIZE_BYTES - PROGRAM_ADDR as usize;

/// where the hex digit glyphs live; LD F,Vx relies on this being zero
pub const FONT_ADDR: u16 = 0x000;

/// bytes per hex digit glyph
pub const FONT_GLYPH_BYTES: u16 = 5;

/// Defines the CHIP-8 memory map:
///   0x0000-0x004f  hex digit glyphs
///   0x0050-0x01ff  unused (interpreter area on the original machine)
///   0x0200-0x0fff  program
pub struct Chip8MemoryMap {
    bytes: Box<[u8]>,
}

impl MemoryMap for Chip8MemoryMap {
    fn bytes(&self) -> &[u8] {
        &self.bytes
    }
    fn bytes_mut(&mut self) -> &mut [u8] {
        &mut self.bytes
    }
}

impl Default for Chip8MemoryMap {
    fn default() -> Self {
        Self::new()
    }
}

impl Chip8MemoryMap {
    /// zeroed RAM with the glyph table in place
    pub fn new() -> Self {
        let mut mm = Chip8MemoryMap {
            bytes: vec![0u8; RAM_SIZE_BYTES].into_boxed_slice(),
        };
        mm.install_font();
        mm
    }

    fn install_font(&mut self) {
        let start = FONT_ADDR as usize;
        self.bytes[start..start + CHIP8_FONT.len()].copy_from_slice(&CHIP8_FONT);
    }

    /// wipe RAM, put the glyphs back and copy a program in at 0x200
    pub fn load(&mut self, rom: &[u8]) -> Result<(), LoadError> {
        if rom.len() > MAX_PROGRAM_BYTES {
            return Err(LoadError::LoadTooLarge {
                size: rom.len(),
                max: MAX_PROGRAM_BYTES,
            });
        }
        self.bytes.fill(0);
        self.install_font();
        let start = PROGRAM_ADDR as usize;
        self.bytes[start..start + rom.len()].copy_from_slice(rom);
        debug!("loaded {} byte program at {:#06x}", rom.len(), PROGRAM_ADDR);
        Ok(())
    }

    /// big-endian opcode at `pc`; the whole word must be inside RAM
    pub fn fetch_opcode(&self, pc: u16) -> Result<u16, RuntimeError> {
        let addr = pc as usize;
        if addr + 1 >= RAM_SIZE_BYTES {
            return Err(RuntimeError::OutOfBounds { address: addr });
        }
        self.get_word(addr)
    }
}

const CHIP8_FONT: [u8; 80] = [
    0xF0, 0x90, 0x90, 0x90, 0xF0, // 0
    0x20, 0x60, 0x20, 0x20, 0x70, // 1
    0xF0, 0x10, 0xF0, 0x80, 0xF0, // 2
    0xF0, 0x10, 0xF0, 0x10, 0xF0, // 3
    0x90, 0x90, 0xF0, 0x10, 0x10, // 4
    0xF0, 0x80, 0xF0, 0x10, 0xF0, // 5
    0xF0, 0x80, 0xF0, 0x90, 0xF0, // 6
    0xF0, 0x10, 0x20, 0x40, 0x40, // 7
    0xF0, 0x90, 0xF0, 0x90, 0xF0, // 8
    0xF0, 0x90, 0xF0, 0x10, 0xF0, // 9
    0xF0, 0x90, 0xF0, 0x90, 0x90, // A
    0xE0, 0x90, 0xE0, 0x90, 0xE0, // B
    0xF0, 0x80, 0x80, 0x80, 0xF0, // C
    0xE0, 0x90, 0x90, 0x90, 0xE0, // D
    0xF0, 0x80, 0xF0, 0x80, 0xF0, // E
    0xF0, 0x80, 0xF0, 0x80, 0x80, // F
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_zeroed_above_font() {
        let m = Chip8MemoryMap::new();
        assert_eq!(m.bytes[0x50..], [0; RAM_SIZE_BYTES - 0x50]);
    }

    #[test]
    fn test_font_at_zero() {
        let m = Chip8MemoryMap::new();
        // glyph for 0, then glyph for F
        assert_eq!(m.bytes[0..5], [0xF0, 0x90, 0x90, 0x90, 0xF0]);
        assert_eq!(m.bytes[75..80], [0xF0, 0x80, 0xF0, 0x80, 0x80]);
    }

    #[test]
    fn test_write_slice_ok() -> Result<(), RuntimeError> {
        let mut dst = Chip8MemoryMap::new();
        dst.write(&[0, 1, 2, 3, 4, 5, 6, 7], 0x308)?;
        assert_eq!(
            dst.bytes[0x300..0x310],
            [0, 0, 0, 0, 0, 0, 0, 0, 0, 1, 2, 3, 4, 5, 6, 7]
        );
        Ok(())
    }

    #[test]
    fn test_read_word() -> Result<(), RuntimeError> {
        let mut m = Chip8MemoryMap::new();
        m.write(&[0, 1, 2, 3, 4, 5, 6, 7], 0x300)?;
        assert_eq!(m.get_word(0x304)?, 0x0405);
        Ok(())
    }

    #[test]
    fn test_write_past_end_is_fault() {
        let mut dst = Chip8MemoryMap::new();
        assert_eq!(
            dst.write(&[0; 8], 4089),
            Err(RuntimeError::OutOfBounds { address: 4096 })
        );
        // nothing was written
        assert_eq!(dst.bytes[4089..], [0; 7]);
    }

    #[test]
    fn test_read_byte_bounds() {
        let m = Chip8MemoryMap::new();
        assert_eq!(m.read_byte(0xfff), Ok(0));
        assert_eq!(
            m.read_byte(0x1000),
            Err(RuntimeError::OutOfBounds { address: 0x1000 })
        );
    }

    #[test]
    fn test_program_load_ok() -> Result<(), Box<dyn std::error::Error>> {
        let mut dst = Chip8MemoryMap::new();
        dst.load(&[0x00, 0xe0])?; // clear screen
        assert_eq!(dst.get_ro_slice(0x200, 2)?, &[0x00, 0xe0]);
        Ok(())
    }

    #[test]
    fn test_load_replaces_previous_program() -> Result<(), Box<dyn std::error::Error>> {
        let mut m = Chip8MemoryMap::new();
        m.load(&[0xaa, 0xbb, 0xcc])?;
        m.write_byte(0x10, 0x99)?;
        m.load(&[0x11])?;
        assert_eq!(m.get_ro_slice(0x200, 3)?, &[0x11, 0x00, 0x00]);
        // font survives stray writes into its region
        assert_eq!(m.read_byte(0x10)?, 0xF0);
        Ok(())
    }

    #[test]
    fn test_load_largest_rom() {
        let mut m = Chip8MemoryMap::new();
        assert_eq!(m.load(&[0x12; MAX_PROGRAM_BYTES]), Ok(()));
        assert_eq!(m.bytes[0xfff], 0x12);
    }

    #[test]
    fn test_load_too_large() {
        let mut m = Chip8MemoryMap::new();
        assert_eq!(
            m.load(&[0; MAX_PROGRAM_BYTES + 1]),
            Err(LoadError::LoadTooLarge {
                size: 3585,
                max: 3584
            })
        );
    }

    #[test]
    fn test_fetch_opcode() -> Result<(), Box<dyn std::error::Error>> {
        let mut m = Chip8MemoryMap::new();
        m.load(&[0x12, 0x34, 0xab, 0xcd])?;
        assert_eq!(m.fetch_opcode(0x200)?, 0x1234);
        assert_eq!(m.fetch_opcode(0x202)?, 0xabcd);
        assert_eq!(m.fetch_opcode(0xffe)?, 0x0000);
        assert_eq!(
            m.fetch_opcode(0xfff),
            Err(RuntimeError::OutOfBounds { address: 0xfff })
        );
        Ok(())
    }
}
