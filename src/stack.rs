use crate::error::RuntimeError;

/// how deep subroutine calls may nest
pub const STACK_DEPTH: usize = 16;

/// what went wrong with a push or pop, before the interpreter attaches a PC
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackFault {
    Overflow,
    Underflow,
}

impl StackFault {
    /// the runtime error for a fault raised by the instruction at `address`
    pub fn at(self, address: u16) -> RuntimeError {
        match self {
            StackFault::Overflow => RuntimeError::StackOverflow { address },
            StackFault::Underflow => RuntimeError::StackUnderflow { address },
        }
    }
}

/// Return addresses for CALL/RET. `sp` is the number of live entries, so it
/// runs 0..=16 and a full stack refuses further pushes instead of writing
/// past the end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallStack {
    entries: [u16; STACK_DEPTH],
    sp: usize,
}

impl Default for CallStack {
    fn default() -> Self {
        Self::new()
    }
}

impl CallStack {
    pub fn new() -> Self {
        CallStack {
            entries: [0; STACK_DEPTH],
            sp: 0,
        }
    }

    pub fn push(&mut self, addr: u16) -> Result<(), StackFault> {
        let slot = self.entries.get_mut(self.sp).ok_or(StackFault::Overflow)?;
        *slot = addr;
        self.sp += 1;
        Ok(())
    }

    pub fn pop(&mut self) -> Result<u16, StackFault> {
        if self.sp == 0 {
            return Err(StackFault::Underflow);
        }
        self.sp -= 1;
        Ok(self.entries[self.sp])
    }

    pub fn pointer(&self) -> usize {
        self.sp
    }

    /// live entries, oldest first
    pub fn entries(&self) -> &[u16] {
        &self.entries[..self.sp]
    }
}
