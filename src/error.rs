/// Faults raised while loading or executing a CHIP-8 program.
///
/// Every fault is terminal for the current session; the driver decides whether
/// to reset the machine or give up on it.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("ROM is too large ({size} bytes), at most {max} bytes fit in memory")]
    RomTooLarge { size: usize, max: usize },

    #[error("illegal opcode {0:#06X}")]
    IllegalOpcode(u16),

    #[error("stack overflow calling subroutine at {address:#05X}")]
    StackOverflow { address: u16 },

    #[error("stack underflow: return with an empty call stack")]
    StackUnderflow,

    #[error("program counter {0:#06X} is outside of memory")]
    ProgramCounterOutOfBounds(u16),

    #[error("memory access out of bounds at address {address:#06X}")]
    MemoryOutOfBounds { address: usize },
}

pub type Result<T> = std::result::Result<T, Error>;
