//! Opcode decoding. Every CHIP-8 instruction is one big-endian 16-bit word;
//! the nibbles select the operation, registers and immediates.

use std::fmt;

/// A raw 16-bit opcode, with accessors for the fields instructions use
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Opcode(pub u16);

impl From<u16> for Opcode {
    fn from(value: u16) -> Self {
        Opcode(value)
    }
}

impl Opcode {
    /// the four nibbles, most significant first
    pub fn nibbles(self) -> (u8, u8, u8, u8) {
        (
            ((self.0 & 0xF000) >> 12) as u8,
            ((self.0 & 0x0F00) >> 8) as u8,
            ((self.0 & 0x00F0) >> 4) as u8,
            (self.0 & 0x000F) as u8,
        )
    }

    /// second nibble, a register
    pub fn x(self) -> u8 {
        self.nibbles().1
    }

    /// third nibble, a register
    pub fn y(self) -> u8 {
        self.nibbles().2
    }

    /// low nibble, a count
    pub fn n(self) -> u8 {
        self.nibbles().3
    }

    /// low byte, an immediate
    pub fn kk(self) -> u8 {
        (self.0 & 0x00FF) as u8
    }

    /// low 12 bits, an address
    pub fn nnn(self) -> u16 {
        self.0 & 0x0FFF
    }
}

/// A decoded instruction. Register operands are indices 0-15.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    /// 00E0
    Cls,
    /// 00EE
    Ret,
    /// 1nnn
    Jp(u16),
    /// 2nnn
    Call(u16),
    /// 3xkk
    SeByte { x: u8, kk: u8 },
    /// 4xkk
    SneByte { x: u8, kk: u8 },
    /// 5xy0
    SeReg { x: u8, y: u8 },
    /// 6xkk
    LdByte { x: u8, kk: u8 },
    /// 7xkk
    AddByte { x: u8, kk: u8 },
    /// 8xy0
    LdReg { x: u8, y: u8 },
    /// 8xy1
    Or { x: u8, y: u8 },
    /// 8xy2
    And { x: u8, y: u8 },
    /// 8xy3
    Xor { x: u8, y: u8 },
    /// 8xy4
    AddReg { x: u8, y: u8 },
    /// 8xy5
    Sub { x: u8, y: u8 },
    /// 8xy6
    Shr { x: u8 },
    /// 8xy7
    Subn { x: u8, y: u8 },
    /// 8xyE
    Shl { x: u8 },
    /// 9xy0
    SneReg { x: u8, y: u8 },
    /// Annn
    LdI(u16),
    /// Bnnn
    JpV0(u16),
    /// Cxkk
    Rnd { x: u8, kk: u8 },
    /// Dxyn
    Drw { x: u8, y: u8, n: u8 },
    /// Ex9E
    Skp { x: u8 },
    /// ExA1
    Sknp { x: u8 },
    /// Fx07
    LdVxDt { x: u8 },
    /// Fx0A
    LdVxKey { x: u8 },
    /// Fx15
    LdDtVx { x: u8 },
    /// Fx18
    LdStVx { x: u8 },
    /// Fx1E
    AddIVx { x: u8 },
    /// Fx29
    LdFVx { x: u8 },
    /// Fx33
    LdBVx { x: u8 },
    /// Fx55
    StoreRegs { x: u8 },
    /// Fx65
    LoadRegs { x: u8 },
}

impl Instruction {
    /// None if no instruction has this bit pattern
    pub fn decode(opcode: Opcode) -> Option<Instruction> {
        use Instruction::*;
        let (x, y, n, kk, nnn) = (opcode.x(), opcode.y(), opcode.n(), opcode.kk(), opcode.nnn());
        let instruction = match opcode.nibbles() {
            (0x0, 0x0, 0xE, 0x0) => Cls,
            (0x0, 0x0, 0xE, 0xE) => Ret,
            (0x1, ..) => Jp(nnn),
            (0x2, ..) => Call(nnn),
            (0x3, ..) => SeByte { x, kk },
            (0x4, ..) => SneByte { x, kk },
            (0x5, _, _, 0x0) => SeReg { x, y },
            (0x6, ..) => LdByte { x, kk },
            (0x7, ..) => AddByte { x, kk },
            (0x8, _, _, 0x0) => LdReg { x, y },
            (0x8, _, _, 0x1) => Or { x, y },
            (0x8, _, _, 0x2) => And { x, y },
            (0x8, _, _, 0x3) => Xor { x, y },
            (0x8, _, _, 0x4) => AddReg { x, y },
            (0x8, _, _, 0x5) => Sub { x, y },
            (0x8, _, _, 0x6) => Shr { x },
            (0x8, _, _, 0x7) => Subn { x, y },
            (0x8, _, _, 0xE) => Shl { x },
            (0x9, _, _, 0x0) => SneReg { x, y },
            (0xA, ..) => LdI(nnn),
            (0xB, ..) => JpV0(nnn),
            (0xC, ..) => Rnd { x, kk },
            (0xD, ..) => Drw { x, y, n },
            (0xE, _, 0x9, 0xE) => Skp { x },
            (0xE, _, 0xA, 0x1) => Sknp { x },
            (0xF, _, 0x0, 0x7) => LdVxDt { x },
            (0xF, _, 0x0, 0xA) => LdVxKey { x },
            (0xF, _, 0x1, 0x5) => LdDtVx { x },
            (0xF, _, 0x1, 0x8) => LdStVx { x },
            (0xF, _, 0x1, 0xE) => AddIVx { x },
            (0xF, _, 0x2, 0x9) => LdFVx { x },
            (0xF, _, 0x3, 0x3) => LdBVx { x },
            (0xF, _, 0x5, 0x5) => StoreRegs { x },
            (0xF, _, 0x6, 0x5) => LoadRegs { x },
            _ => return None,
        };
        Some(instruction)
    }
}

impl fmt::Display for Instruction {
    /// conventional assembler mnemonics, e.g. `DRW V0, V1, 5`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Instruction::*;
        match *self {
            Cls => write!(f, "CLS"),
            Ret => write!(f, "RET"),
            Jp(nnn) => write!(f, "JP {:#05X}", nnn),
            Call(nnn) => write!(f, "CALL {:#05X}", nnn),
            SeByte { x, kk } => write!(f, "SE V{:X}, {:#04X}", x, kk),
            SneByte { x, kk } => write!(f, "SNE V{:X}, {:#04X}", x, kk),
            SeReg { x, y } => write!(f, "SE V{:X}, V{:X}", x, y),
            LdByte { x, kk } => write!(f, "LD V{:X}, {:#04X}", x, kk),
            AddByte { x, kk } => write!(f, "ADD V{:X}, {:#04X}", x, kk),
            LdReg { x, y } => write!(f, "LD V{:X}, V{:X}", x, y),
            Or { x, y } => write!(f, "OR V{:X}, V{:X}", x, y),
            And { x, y } => write!(f, "AND V{:X}, V{:X}", x, y),
            Xor { x, y } => write!(f, "XOR V{:X}, V{:X}", x, y),
            AddReg { x, y } => write!(f, "ADD V{:X}, V{:X}", x, y),
            Sub { x, y } => write!(f, "SUB V{:X}, V{:X}", x, y),
            Shr { x } => write!(f, "SHR V{:X}", x),
            Subn { x, y } => write!(f, "SUBN V{:X}, V{:X}", x, y),
            Shl { x } => write!(f, "SHL V{:X}", x),
            SneReg { x, y } => write!(f, "SNE V{:X}, V{:X}", x, y),
            LdI(nnn) => write!(f, "LD I, {:#05X}", nnn),
            JpV0(nnn) => write!(f, "JP V0, {:#05X}", nnn),
            Rnd { x, kk } => write!(f, "RND V{:X}, {:#04X}", x, kk),
            Drw { x, y, n } => write!(f, "DRW V{:X}, V{:X}, {}", x, y, n),
            Skp { x } => write!(f, "SKP V{:X}", x),
            Sknp { x } => write!(f, "SKNP V{:X}", x),
            LdVxDt { x } => write!(f, "LD V{:X}, DT", x),
            LdVxKey { x } => write!(f, "LD V{:X}, K", x),
            LdDtVx { x } => write!(f, "LD DT, V{:X}", x),
            LdStVx { x } => write!(f, "LD ST, V{:X}", x),
            AddIVx { x } => write!(f, "ADD I, V{:X}", x),
            LdFVx { x } => write!(f, "LD F, V{:X}", x),
            LdBVx { x } => write!(f, "LD B, V{:X}", x),
            StoreRegs { x } => write!(f, "LD [I], V{:X}", x),
            LoadRegs { x } => write!(f, "LD V{:X}, [I]", x),
        }
    }
}

/// one line of disassembly: the opcode and, if it decodes, its mnemonic
pub fn disassemble(opcode: u16) -> String {
    match Instruction::decode(Opcode(opcode)) {
        Some(instruction) => format!("{:04X}  {}", opcode, instruction),
        None => format!("{:04X}  ???", opcode),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(op: u16) -> Option<Instruction> {
        Instruction::decode(Opcode(op))
    }

    #[test]
    fn test_fields() {
        let op = Opcode(0xD12F);
        assert_eq!(op.nibbles(), (0xD, 0x1, 0x2, 0xF));
        assert_eq!((op.x(), op.y(), op.n()), (1, 2, 0xF));
        assert_eq!(op.kk(), 0x2F);
        assert_eq!(op.nnn(), 0x12F);
    }

    #[test]
    fn test_decode_table() {
        use Instruction::*;
        let table = [
            (0x00E0, Cls),
            (0x00EE, Ret),
            (0x1ABC, Jp(0xABC)),
            (0x2ABC, Call(0xABC)),
            (0x3A12, SeByte { x: 0xA, kk: 0x12 }),
            (0x4A12, SneByte { x: 0xA, kk: 0x12 }),
            (0x5AB0, SeReg { x: 0xA, y: 0xB }),
            (0x6A12, LdByte { x: 0xA, kk: 0x12 }),
            (0x7A12, AddByte { x: 0xA, kk: 0x12 }),
            (0x8AB0, LdReg { x: 0xA, y: 0xB }),
            (0x8AB1, Or { x: 0xA, y: 0xB }),
            (0x8AB2, And { x: 0xA, y: 0xB }),
            (0x8AB3, Xor { x: 0xA, y: 0xB }),
            (0x8AB4, AddReg { x: 0xA, y: 0xB }),
            (0x8AB5, Sub { x: 0xA, y: 0xB }),
            (0x8AB6, Shr { x: 0xA }),
            (0x8AB7, Subn { x: 0xA, y: 0xB }),
            (0x8ABE, Shl { x: 0xA }),
            (0x9AB0, SneReg { x: 0xA, y: 0xB }),
            (0xA123, LdI(0x123)),
            (0xB123, JpV0(0x123)),
            (0xCA12, Rnd { x: 0xA, kk: 0x12 }),
            (0xDAB5, Drw { x: 0xA, y: 0xB, n: 5 }),
            (0xEA9E, Skp { x: 0xA }),
            (0xEAA1, Sknp { x: 0xA }),
            (0xFA07, LdVxDt { x: 0xA }),
            (0xFA0A, LdVxKey { x: 0xA }),
            (0xFA15, LdDtVx { x: 0xA }),
            (0xFA18, LdStVx { x: 0xA }),
            (0xFA1E, AddIVx { x: 0xA }),
            (0xFA29, LdFVx { x: 0xA }),
            (0xFA33, LdBVx { x: 0xA }),
            (0xFA55, StoreRegs { x: 0xA }),
            (0xFA65, LoadRegs { x: 0xA }),
        ];
        for (op, expected) in table {
            assert_eq!(decode(op), Some(expected), "opcode {:04X}", op);
        }
    }

    #[test]
    fn test_unknown_patterns() {
        for op in [0x0000, 0x0123, 0x00E1, 0x5AB1, 0x8AB8, 0x8ABF, 0x9AB1, 0xEA9F, 0xFA00, 0xFFFF] {
            assert_eq!(decode(op), None, "opcode {:04X}", op);
        }
    }

    #[test]
    fn test_disassemble() {
        assert_eq!(disassemble(0xD015), "D015  DRW V0, V1, 5");
        assert_eq!(disassemble(0xA0FF), "A0FF  LD I, 0x0FF");
        assert_eq!(disassemble(0x6005), "6005  LD V0, 0x05");
        assert_eq!(disassemble(0xFFFF), "FFFF  ???");
    }
}
