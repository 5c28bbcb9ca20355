use std::io;
use thiserror::Error;

/// Raised before execution starts, when a ROM can't be placed in memory
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    #[error("ROM is too large ({size} bytes), program space holds {max} bytes")]
    LoadTooLarge { size: usize, max: usize },
}

/// Faults raised by `Interpreter::step`. Every one of these halts the
/// interpreter; recovery is a reset or reload by the caller.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuntimeError {
    #[error("memory access out of bounds at address {address:#06X}")]
    OutOfBounds { address: usize },

    #[error("unknown opcode {opcode:#06X} at {address:#06X}")]
    UnknownOpcode { opcode: u16, address: u16 },

    #[error("call stack overflow at {address:#06X}")]
    StackOverflow { address: u16 },

    #[error("return with empty call stack at {address:#06X}")]
    StackUnderflow { address: u16 },

    #[error("interpreter is halted; reset or reload a ROM to continue")]
    Halted,
}

/// Anything that can stop the terminal front end
#[derive(Error, Debug)]
pub enum FrontendError {
    #[error(transparent)]
    Io(#[from] io::Error),

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Runtime(#[from] RuntimeError),

    #[error("sound device failed: {0}")]
    Sound(String),
}
