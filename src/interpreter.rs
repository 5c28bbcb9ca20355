//! # interpreter
//!
//! Owns the whole machine: memory, registers, call stack, framebuffer,
//! keypad and timers. Two independent clocks drive it from outside:
//!
//!  * `step()`        -- one instruction, at whatever rate the driver likes
//!  * `tick_timers()` -- one 60 Hz timer decrement
//!
//! Each instruction handler reports how the program counter should move
//! (`Flow`); the dispatcher applies it. The key wait (Fx0A) reports `Wait`,
//! which leaves PC alone so the same instruction runs again next step.
//!
//! Any fault halts the machine. A halted interpreter refuses to step until
//! `reset()` or `load()` puts it back to power-on state.
use crate::error::{LoadError, RuntimeError};
use crate::framebuffer::{Framebuffer, HEIGHT, WIDTH};
use crate::instruction::{disassemble, Instruction, Opcode};
use crate::keypad::Keypad;
use crate::memory::{Chip8MemoryMap, MemoryMap, FONT_ADDR, FONT_GLYPH_BYTES};
use crate::registers::{RegisterFile, REGISTER_COUNT};
use crate::stack::CallStack;
use crate::timer::TimerUnit;
use log::{debug, trace, warn};
use rand::{Rng, RngCore};
use std::fmt;

/// whether the interpreter will execute another instruction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MachineState {
    Running,
    Halted,
}

/// how PC moves once an instruction has executed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    /// the next instruction
    Next,
    /// skip over the next instruction
    Skip,
    Jump(u16),
    /// run this instruction again
    Wait,
}

impl Flow {
    fn skip_if(condition: bool) -> Flow {
        if condition {
            Flow::Skip
        } else {
            Flow::Next
        }
    }
}

pub struct Interpreter {
    memory: Chip8MemoryMap,
    registers: RegisterFile,
    stack: CallStack,
    framebuffer: Framebuffer,
    keypad: Keypad,
    timers: TimerUnit,
    rng: Box<dyn RngCore>,
    state: MachineState,
    halt_reason: Option<RuntimeError>,
    rom: Vec<u8>,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter {
    /// a machine with nothing loaded, drawing random bytes from the thread RNG
    pub fn new() -> Self {
        Self::with_rng(rand::thread_rng())
    }

    /// a machine with nothing loaded and a caller-supplied random source
    pub fn with_rng(rng: impl RngCore + 'static) -> Self {
        Interpreter {
            memory: Chip8MemoryMap::new(),
            registers: RegisterFile::new(),
            stack: CallStack::new(),
            framebuffer: Framebuffer::new(),
            keypad: Keypad::new(),
            timers: TimerUnit::new(),
            rng: Box::new(rng),
            state: MachineState::Running,
            halt_reason: None,
            rom: Vec::new(),
        }
    }

    /// load a chip8 program at 0x200 and reset everything else
    pub fn load(&mut self, rom: &[u8]) -> Result<(), LoadError> {
        self.memory.load(rom)?;
        self.rom = rom.to_vec();
        self.reset_state();
        Ok(())
    }

    /// back to power-on state with the last loaded program
    pub fn reset(&mut self) {
        // the stored rom already fitted once, so this can't fail
        if let Err(e) = self.memory.load(&self.rom) {
            warn!("reloading program failed: {}", e);
        }
        self.reset_state();
    }

    fn reset_state(&mut self) {
        self.registers = RegisterFile::new();
        self.stack = CallStack::new();
        self.framebuffer.clear();
        self.keypad.release_all();
        self.timers = TimerUnit::new();
        self.state = MachineState::Running;
        self.halt_reason = None;
        debug!("interpreter reset, pc={:#06x}", self.registers.pc());
    }

    /// fetch, decode and execute exactly one instruction
    pub fn step(&mut self) -> Result<(), RuntimeError> {
        if self.state == MachineState::Halted {
            return Err(RuntimeError::Halted);
        }
        match self.execute_next() {
            Ok(()) => Ok(()),
            Err(e) => {
                warn!("halting: {}", e);
                self.state = MachineState::Halted;
                self.halt_reason = Some(e.clone());
                Err(e)
            }
        }
    }

    /// one 60 Hz tick of the delay and sound timers
    pub fn tick_timers(&mut self) {
        self.timers.tick();
    }

    fn execute_next(&mut self) -> Result<(), RuntimeError> {
        let pc = self.registers.pc();
        let opcode = self.memory.fetch_opcode(pc)?;
        let instruction = Instruction::decode(Opcode(opcode)).ok_or(
            RuntimeError::UnknownOpcode {
                opcode,
                address: pc,
            },
        )?;
        trace!("{:#06x}: {}", pc, disassemble(opcode));
        match self.execute(instruction)? {
            Flow::Next => self.registers.advance(2),
            Flow::Skip => self.registers.advance(4),
            Flow::Jump(addr) => self.registers.set_pc(addr),
            Flow::Wait => {}
        }
        Ok(())
    }

    fn execute(&mut self, instruction: Instruction) -> Result<Flow, RuntimeError> {
        use Instruction::*;
        let pc = self.registers.pc();
        let r = &mut self.registers;
        let flow = match instruction {
            Cls => {
                self.framebuffer.clear();
                Flow::Next
            }
            Ret => {
                let addr = self.stack.pop().map_err(|fault| fault.at(pc))?;
                Flow::Jump(addr.wrapping_add(2))
            }
            Jp(nnn) => Flow::Jump(nnn),
            Call(nnn) => {
                self.stack.push(pc).map_err(|fault| fault.at(pc))?;
                Flow::Jump(nnn)
            }
            SeByte { x, kk } => Flow::skip_if(r.get(x) == kk),
            SneByte { x, kk } => Flow::skip_if(r.get(x) != kk),
            SeReg { x, y } => Flow::skip_if(r.get(x) == r.get(y)),
            SneReg { x, y } => Flow::skip_if(r.get(x) != r.get(y)),
            LdByte { x, kk } => {
                r.set(x, kk);
                Flow::Next
            }
            AddByte { x, kk } => {
                r.set(x, r.get(x).wrapping_add(kk));
                Flow::Next
            }
            LdReg { x, y } => {
                r.set(x, r.get(y));
                Flow::Next
            }
            Or { x, y } => {
                r.set(x, r.get(x) | r.get(y));
                Flow::Next
            }
            And { x, y } => {
                r.set(x, r.get(x) & r.get(y));
                Flow::Next
            }
            Xor { x, y } => {
                r.set(x, r.get(x) ^ r.get(y));
                Flow::Next
            }
            AddReg { x, y } => {
                let (sum, carry) = r.get(x).overflowing_add(r.get(y));
                r.set_flag(carry);
                r.set(x, sum);
                Flow::Next
            }
            Sub { x, y } => {
                let (vx, vy) = (r.get(x), r.get(y));
                r.set_flag(vx > vy);
                r.set(x, vx.wrapping_sub(vy));
                Flow::Next
            }
            Shr { x } => {
                let vx = r.get(x);
                r.set_flag(vx & 1 == 1);
                r.set(x, vx >> 1);
                Flow::Next
            }
            Subn { x, y } => {
                let (vx, vy) = (r.get(x), r.get(y));
                r.set(x, vy.wrapping_sub(vx));
                r.set_flag(vy > vx);
                Flow::Next
            }
            Shl { x } => {
                let vx = r.get(x);
                r.set_flag(vx & 0x80 != 0);
                r.set(x, vx << 1);
                Flow::Next
            }
            LdI(nnn) => {
                r.set_i(nnn);
                Flow::Next
            }
            JpV0(nnn) => Flow::Jump(nnn + r.get(0) as u16),
            Rnd { x, kk } => {
                let byte: u8 = self.rng.gen();
                r.set(x, byte & kk);
                Flow::Next
            }
            Drw { x, y, n } => {
                let origin = (r.get(x) as usize % WIDTH, r.get(y) as usize % HEIGHT);
                let rows = self.memory.get_ro_slice(r.i() as usize, n as usize)?;
                let collision = self.framebuffer.draw_sprite(origin.0, origin.1, rows);
                r.set_flag(collision);
                Flow::Next
            }
            Skp { x } => Flow::skip_if(self.keypad.is_down(r.get(x))),
            Sknp { x } => Flow::skip_if(!self.keypad.is_down(r.get(x))),
            LdVxDt { x } => {
                r.set(x, self.timers.delay());
                Flow::Next
            }
            LdVxKey { x } => match self.keypad.first_down() {
                Some(key) => {
                    r.set(x, key);
                    Flow::Next
                }
                None => Flow::Wait,
            },
            LdDtVx { x } => {
                self.timers.set_delay(r.get(x));
                Flow::Next
            }
            LdStVx { x } => {
                self.timers.set_sound(r.get(x));
                Flow::Next
            }
            AddIVx { x } => {
                r.set_i(r.i().wrapping_add(r.get(x) as u16));
                Flow::Next
            }
            LdFVx { x } => {
                r.set_i(FONT_ADDR + r.get(x) as u16 * FONT_GLYPH_BYTES);
                Flow::Next
            }
            LdBVx { x } => {
                let value = r.get(x);
                self.memory
                    .write(&[value / 100, (value / 10) % 10, value % 10], r.i() as usize)?;
                Flow::Next
            }
            StoreRegs { x } => {
                let count = x as usize + 1;
                let values = r.all();
                self.memory.write(&values[..count], r.i() as usize)?;
                Flow::Next
            }
            LoadRegs { x } => {
                let count = x as usize + 1;
                let values = self.memory.get_ro_slice(r.i() as usize, count)?;
                for (reg, value) in values.iter().enumerate() {
                    r.set(reg as u8, *value);
                }
                Flow::Next
            }
        };
        Ok(flow)
    }

    pub fn state(&self) -> MachineState {
        self.state
    }

    /// the fault that halted the machine, if it is halted
    pub fn halt_reason(&self) -> Option<&RuntimeError> {
        self.halt_reason.as_ref()
    }

    pub fn framebuffer(&self) -> &Framebuffer {
        &self.framebuffer
    }

    pub fn set_key_down(&mut self, index: u8) {
        self.keypad.set_key_down(index);
    }

    pub fn set_key_up(&mut self, index: u8) {
        self.keypad.set_key_up(index);
    }

    pub fn keypad(&self) -> &Keypad {
        &self.keypad
    }

    pub fn timers(&self) -> &TimerUnit {
        &self.timers
    }

    /// the tone should be playing
    pub fn is_sounding(&self) -> bool {
        self.timers.is_sounding()
    }

    /// read-only view of the address space
    pub fn memory(&self) -> &[u8] {
        self.memory.bytes()
    }

    /// copy of everything a debugger wants to show
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            pc: self.registers.pc(),
            sp: self.stack.pointer(),
            v: self.registers.all(),
            i: self.registers.i(),
            stack: self.stack.entries().to_vec(),
            delay_timer: self.timers.delay(),
            sound_timer: self.timers.sound(),
            next_opcode: self.memory.fetch_opcode(self.registers.pc()).ok(),
            state: self.state,
        }
    }
}

/// A point-in-time copy of the machine's registers, for debug overlays
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub pc: u16,
    pub sp: usize,
    pub v: [u8; REGISTER_COUNT],
    pub i: u16,
    /// live return addresses, oldest first
    pub stack: Vec<u16>,
    pub delay_timer: u8,
    pub sound_timer: u8,
    /// None when PC points outside memory
    pub next_opcode: Option<u16>,
    pub state: MachineState,
}

impl fmt::Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "PC {:04X}  SP {:X}  I {:04X}", self.pc, self.sp, self.i)?;
        writeln!(f, "DT {:02X}  ST {:02X}  {:?}", self.delay_timer, self.sound_timer, self.state)?;
        for (n, value) in self.v.iter().enumerate() {
            write!(f, "V{:X} {:02X}", n, value)?;
            f.write_str(if n % 4 == 3 { "\n" } else { "  " })?;
        }
        f.write_str("stack")?;
        for addr in &self.stack {
            write!(f, " {:04X}", addr)?;
        }
        writeln!(f)?;
        match self.next_opcode {
            Some(op) => write!(f, "next {}", disassemble(op)),
            None => write!(f, "next ----"),
        }
    }
}
