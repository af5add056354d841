//! A CHIP-8 interpreter core.
//!
//! The [`Machine`] owns all emulated hardware: 4K of memory with the hex font
//! at 0x000, sixteen 8-bit registers, `I`, a 16-level call stack, the delay and
//! sound timers, a 64x32 monochrome display and the 16-key keypad.
//!
//! A host drives it once per frame (nominally 60 Hz):
//!
//! ```
//! use chip8_vm::{Machine, KEY_COUNT};
//!
//! let mut chip8 = Machine::new();
//! chip8.load(&[0x60, 0x05, 0xF0, 0x29, 0xD1, 0x15])?;
//!
//! for _ in 0..3 {
//!     chip8.set_keys([false; KEY_COUNT]);
//!     chip8.step()?;
//! }
//!
//! // The '5' glyph is now on screen.
//! assert!(chip8.pixel(0, 0));
//! assert!(!chip8.sound_active());
//! # Ok::<(), chip8_vm::Error>(())
//! ```
//!
//! The core never touches a window, audio device or file; the host reads the
//! framebuffer and the tone signal back after each step.

pub mod cpu;
pub mod error;
pub mod font;
pub mod instruction;

pub use cpu::{
    Machine, DISPLAY_HEIGHT, DISPLAY_WIDTH, INSTRUCTION_SIZE, KEY_COUNT, MAX_ROM_SIZE, MEMORY_SIZE,
    PROGRAM_START, REGISTER_COUNT, STACK_DEPTH,
};
pub use error::{Error, Result};
pub use instruction::Instruction;
