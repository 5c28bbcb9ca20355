//! ## Design
//!
//! * the core is pure state: memory, registers, call stack, framebuffer,
//!   keypad and timers, all owned by one `Interpreter`
//! * two clocks, both driven from outside: `step()` at the configured
//!   instruction rate, `tick_timers()` at a fixed 60 Hz
//! * every fault (bad opcode, bad address, stack over/underflow) halts the
//!   interpreter and comes back as an error; nothing panics on a bad ROM
//! * display, input and audio are traits so the core never knows how the
//!   screen works; the terminal implementations live beside it
//! * the random source is injectable so RND is testable
//!
//! Model
//!
//! Environment
//!  |-- display, input, sound, config
//!  |-- interpreter(memory, registers, stack, framebuffer, keypad, timers, rng)
//!  `-- main loop, one iteration per 60 Hz frame
//!       |-- poll input -> keypad
//!       |-- step() x (rate / 60), carrying the remainder between frames
//!       |-- tick_timers()
//!       |-- sound on/off on sound timer edges
//!       `-- draw framebuffer (+ register overlay when debugging or halted)
pub mod config;
pub mod display;
pub mod environment;
pub mod error;
pub mod framebuffer;
pub mod input;
pub mod instruction;
pub mod interpreter;
pub mod keypad;
pub mod memory;
pub mod registers;
pub mod sound;
pub mod stack;
pub mod timer;

pub use error::{FrontendError, LoadError, RuntimeError};
pub use framebuffer::Framebuffer;
pub use interpreter::{Interpreter, MachineState, Snapshot};
pub use keypad::Keypad;
