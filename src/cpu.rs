use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::error::{Error, Result};
use crate::font;
use crate::instruction::Instruction;

/// Total addressable memory in bytes.
pub const MEMORY_SIZE: usize = 4096;
/// Address the program image is loaded to; everything below is reserved.
pub const PROGRAM_START: u16 = 0x200;
/// Largest ROM image that fits between `PROGRAM_START` and the end of memory.
pub const MAX_ROM_SIZE: usize = MEMORY_SIZE - PROGRAM_START as usize;
pub const DISPLAY_WIDTH: usize = 64;
pub const DISPLAY_HEIGHT: usize = 32;
pub const KEY_COUNT: usize = 16;
pub const STACK_DEPTH: usize = 16;
pub const REGISTER_COUNT: usize = 16;
pub const INSTRUCTION_SIZE: u16 = 2; // All instructions are 2 bytes long.

const FLAG: usize = 0xF;

/// What the program counter does once an instruction has executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Next,
    Skip,
    Jump(u16),
    /// Stay on the current instruction so it runs again on the next step.
    Hold,
}

impl Flow {
    fn skip_if(condition: bool) -> Self {
        if condition { Flow::Skip } else { Flow::Next }
    }
}

pub struct Machine {
    // Address of the next instruction to execute:
    program_counter: u16,

    // Note that the stack pointer is specified to be 8 bit, but this being larger
    // shouldn't matter, and avoids casting when indexing into the stack.
    stack_pointer: usize,
    stack: [u16; STACK_DEPTH],

    // Decremented once per step while non-zero.
    // When the sound_timer is non-zero, sound should be activated.
    delay_timer: u8,
    sound_timer: u8,

    // Set by a step in which the sound timer ran down from 1 to 0.
    tone: bool,

    // 16 general 8-bit registers, referred to as V0, V1, ..., VF.
    registers: [u8; REGISTER_COUNT],

    // Additional register, usually used to store memory addresses.
    register_i: u16,

    // General RAM; note that the first 512 bytes (up to address 0x200) are reserved.
    // The built-in hexadecimal font is stored in this reserved memory.
    memory: [u8; MEMORY_SIZE],

    // Display Buffer; each cell is 0 (off) or 1 (on).
    display: [[u8; DISPLAY_WIDTH]; DISPLAY_HEIGHT],

    // Current state of keys 0x0 through 0xF, written by the host between steps.
    keypad: [bool; KEY_COUNT],

    rng: StdRng,
}

impl Machine {
    /// Creates a new CHIP-8 machine in its initial state, drawing random
    /// numbers from an entropy-seeded generator.
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Creates a new CHIP-8 machine whose `RND` instruction produces a
    /// reproducible sequence for the given seed.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        let mut machine = Self {
            program_counter: PROGRAM_START,
            stack_pointer: 0,
            stack: [0; STACK_DEPTH],
            delay_timer: 0,
            sound_timer: 0,
            tone: false,
            registers: [0; REGISTER_COUNT],
            register_i: 0,
            memory: [0; MEMORY_SIZE],
            display: [[0; DISPLAY_WIDTH]; DISPLAY_HEIGHT],
            keypad: [false; KEY_COUNT],
            rng,
        };
        machine.initialize();
        machine
    }

    /// Puts every register, timer and memory cell back to its power-on value:
    /// all zero, except the font in low memory and the program counter at 0x200.
    pub fn initialize(&mut self) {
        self.memory = [0; MEMORY_SIZE];
        font::load_font(&mut self.memory);

        self.registers = [0; REGISTER_COUNT];
        self.stack = [0; STACK_DEPTH];
        self.stack_pointer = 0;
        self.program_counter = PROGRAM_START;
        self.register_i = 0;
        self.delay_timer = 0;
        self.sound_timer = 0;
        self.tone = false;
        self.display = [[0; DISPLAY_WIDTH]; DISPLAY_HEIGHT];
        self.keypad = [false; KEY_COUNT];
    }

    /// Same as [`Machine::initialize`].
    pub fn reset(&mut self) {
        self.initialize();
    }

    /// Copies a raw program image into memory at 0x200 and points the
    /// program counter at it.
    pub fn load(&mut self, rom: &[u8]) -> Result<()> {
        if rom.len() > MAX_ROM_SIZE {
            return Err(Error::RomTooLarge { size: rom.len(), max: MAX_ROM_SIZE });
        }

        let base = PROGRAM_START as usize;
        self.memory[base..base + rom.len()].copy_from_slice(rom);
        self.program_counter = PROGRAM_START;

        log::info!("loaded {} byte program at {:#05X}", rom.len(), PROGRAM_START);
        Ok(())
    }

    /// Reads, decodes and executes the instruction at the program counter,
    /// then decays both timers by one tick.
    pub fn step(&mut self) -> Result<()> {
        self.tone = false;

        let result = self.fetch().and_then(|opcode| {
            let instruction = Instruction::decode(opcode)?;
            log::trace!(
                "[{:04X}] {:04X} {:?} :: {:?}",
                self.program_counter,
                opcode,
                instruction,
                self.registers
            );
            self.execute(instruction)
        });

        if let Err(err) = &result {
            log::warn!("fault at {:#06X}: {}", self.program_counter, err);
        }
        result?;

        self.decay_timers();
        Ok(())
    }

    /// Executes a fixed number of steps, stopping at the first fault.
    pub fn run(&mut self, steps: usize) -> Result<()> {
        for _ in 0..steps {
            self.step()?;
        }
        Ok(())
    }

    fn fetch(&self) -> Result<u16> {
        let pc = self.program_counter as usize;
        if pc + 1 >= MEMORY_SIZE {
            return Err(Error::ProgramCounterOutOfBounds(self.program_counter));
        }
        Ok((self.memory[pc] as u16) << 8 | (self.memory[pc + 1] as u16))
    }

    fn execute(&mut self, instruction: Instruction) -> Result<()> {
        let flow = match instruction {
            Instruction::ClearScreen => {
                for row in &mut self.display {
                    for pixel in row { *pixel = 0; }
                }
                Flow::Next
            },

            Instruction::Return => {
                if self.stack_pointer == 0 {
                    return Err(Error::StackUnderflow);
                }
                self.stack_pointer -= 1;
                // Execution picks up after the CALL instruction:
                Flow::Jump(self.stack[self.stack_pointer].wrapping_add(INSTRUCTION_SIZE))
            },

            Instruction::Jump { addr } => Flow::Jump(addr),

            Instruction::Call { addr } => {
                if self.stack_pointer == STACK_DEPTH {
                    return Err(Error::StackOverflow { address: addr });
                }
                self.stack[self.stack_pointer] = self.program_counter;
                self.stack_pointer += 1;
                Flow::Jump(addr)
            },

            Instruction::SkipIfEqualByte { x, kk } => Flow::skip_if(self.registers[x] == kk),
            Instruction::SkipIfNotEqualByte { x, kk } => Flow::skip_if(self.registers[x] != kk),
            Instruction::SkipIfEqual { x, y } => Flow::skip_if(self.registers[x] == self.registers[y]),
            Instruction::SkipIfNotEqual { x, y } => Flow::skip_if(self.registers[x] != self.registers[y]),

            Instruction::LoadByte { x, kk } => {
                self.registers[x] = kk;
                Flow::Next
            },

            Instruction::AddByte { x, kk } => {
                // No carry flag for immediate adds.
                self.registers[x] = self.registers[x].wrapping_add(kk);
                Flow::Next
            },

            Instruction::Load { x, y } => {
                self.registers[x] = self.registers[y];
                Flow::Next
            },
            Instruction::Or { x, y } => {
                self.registers[x] |= self.registers[y];
                Flow::Next
            },
            Instruction::And { x, y } => {
                self.registers[x] &= self.registers[y];
                Flow::Next
            },
            Instruction::Xor { x, y } => {
                self.registers[x] ^= self.registers[y];
                Flow::Next
            },

            // The flag is always written last, so VF as an operand sees its old value
            // and VF as a destination ends up holding the flag.
            Instruction::Add { x, y } => {
                let (result, carry) = self.registers[x].overflowing_add(self.registers[y]);
                self.registers[x] = result;
                self.registers[FLAG] = carry.into();
                Flow::Next
            },

            Instruction::Sub { x, y } => {
                let no_borrow = (self.registers[x] > self.registers[y]).into();
                self.registers[x] = self.registers[x].wrapping_sub(self.registers[y]);
                self.registers[FLAG] = no_borrow;
                Flow::Next
            },

            Instruction::ShiftRight { x } => {
                let carry = self.registers[x] & 1;
                self.registers[x] <<= 1;
                self.registers[FLAG] = carry;
                Flow::Next
            },

            Instruction::SubN { x, y } => {
                let flag = (self.registers[y] > self.registers[x]).into();
                self.registers[x] = self.registers[x].wrapping_sub(self.registers[y]);
                self.registers[FLAG] = flag;
                Flow::Next
            },

            Instruction::ShiftLeft { x } => {
                let carry = self.registers[x] >> 7;
                self.registers[x] <<= 1;
                self.registers[FLAG] = carry;
                Flow::Next
            },

            Instruction::LoadIndex { addr } => {
                self.register_i = addr;
                Flow::Next
            },

            Instruction::JumpOffset { addr } => Flow::Jump(addr + self.registers[0] as u16),

            Instruction::Random { x, kk } => {
                self.registers[x] = self.rng.gen::<u8>() & kk;
                Flow::Next
            },

            Instruction::Draw { x, y, n } => {
                self.draw_sprite(self.registers[x], self.registers[y], n)?;
                Flow::Next
            },

            Instruction::SkipIfKeyPressed { x } => Flow::skip_if(self.is_key_pressed(self.registers[x])),
            Instruction::SkipIfKeyNotPressed { x } => Flow::skip_if(!self.is_key_pressed(self.registers[x])),

            Instruction::LoadDelayTimer { x } => {
                self.registers[x] = self.delay_timer;
                Flow::Next
            },

            Instruction::WaitForKey { x } => {
                // Halt execution until a key is pressed; the lowest pressed key wins.
                match self.keypad.iter().position(|&pressed| pressed) {
                    Some(key) => {
                        self.registers[x] = key as u8;
                        Flow::Next
                    },
                    None => {
                        log::debug!("waiting for key press into V{:X}", x);
                        Flow::Hold
                    },
                }
            },

            Instruction::SetDelayTimer { x } => {
                self.delay_timer = self.registers[x];
                Flow::Next
            },

            Instruction::SetSoundTimer { x } => {
                self.sound_timer = self.registers[x];
                Flow::Next
            },

            Instruction::AddIndex { x } => {
                let sum = self.register_i.wrapping_add(self.registers[x] as u16);
                self.registers[FLAG] = (sum > 0x0FFF).into();
                self.register_i = sum;
                Flow::Next
            },

            Instruction::LoadGlyph { x } => {
                self.register_i = font::glyph_address(self.registers[x]);
                Flow::Next
            },

            Instruction::StoreBcd { x } => {
                // Hundreds digit -> I, tens -> I+1, ones -> I+2.
                let vx = self.registers[x];
                let base = self.index_range(3)?;
                self.memory[base] = vx / 100;
                self.memory[base + 1] = vx / 10 % 10;
                self.memory[base + 2] = vx % 10;
                Flow::Next
            },

            Instruction::StoreRegisters { x } => {
                let base = self.index_range(x + 1)?;
                self.memory[base..=base + x].copy_from_slice(&self.registers[..=x]);
                Flow::Next
            },

            Instruction::LoadRegisters { x } => {
                let base = self.index_range(x + 1)?;
                self.registers[..=x].copy_from_slice(&self.memory[base..=base + x]);
                Flow::Next
            },
        };

        self.program_counter = match flow {
            Flow::Next => self.program_counter.wrapping_add(INSTRUCTION_SIZE),
            Flow::Skip => self.program_counter.wrapping_add(2 * INSTRUCTION_SIZE),
            Flow::Jump(addr) => addr,
            Flow::Hold => self.program_counter,
        };
        Ok(())
    }

    /// XORs an `n`-byte sprite read from `I` onto the display at (`vx`, `vy`),
    /// setting VF if any lit pixel gets switched off.
    ///
    /// The origin wraps around the screen; the parts of the sprite that then
    /// run past the right or bottom edge are clipped.
    fn draw_sprite(&mut self, vx: u8, vy: u8, n: u8) -> Result<()> {
        let base = self.index_range(n as usize)?;
        let start_col = vx as usize % DISPLAY_WIDTH;
        let start_row = vy as usize % DISPLAY_HEIGHT;

        // Initialise erase flag:
        self.registers[FLAG] = 0;
        for byte in 0..n as usize {
            let row = start_row + byte;
            if row >= DISPLAY_HEIGHT { break; }

            let sprite_row = self.memory[base + byte];
            for bit in 0..8 {
                let col = start_col + bit;
                if col >= DISPLAY_WIDTH { break; }

                // Test if this pixel of the sprite is 'on' (i.e. bit == 1):
                if sprite_row & (0x80 >> bit) != 0 {
                    if self.display[row][col] == 1 {
                        self.registers[FLAG] = 1;
                    }
                    self.display[row][col] ^= 1;
                }
            }
        }
        Ok(())
    }

    /// Checks that `len` bytes starting at `I` lie within memory and returns
    /// `I` as a memory index.
    fn index_range(&self, len: usize) -> Result<usize> {
        let base = self.register_i as usize;
        if len > 0 && base + len > MEMORY_SIZE {
            return Err(Error::MemoryOutOfBounds { address: base.max(MEMORY_SIZE) });
        }
        Ok(base)
    }

    /// Decrement the delay and sound timers by 1 tick, raising the tone
    /// signal when the sound timer runs out.
    fn decay_timers(&mut self) {
        self.delay_timer = self.delay_timer.saturating_sub(1);
        if self.sound_timer == 1 {
            self.tone = true;
            log::debug!("tone tick");
        }
        self.sound_timer = self.sound_timer.saturating_sub(1);
    }

    /// Overwrite the state of all 16 keys at once.
    pub fn set_keys(&mut self, keys: [bool; KEY_COUNT]) { self.keypad = keys; }

    /// Register a key as being pressed. Keys above 0xF are ignored.
    pub fn key_down(&mut self, key: u8) {
        if let Some(k) = self.keypad.get_mut(key as usize) { *k = true; }
    }

    /// Unregister a key, marking it as no-longer being pressed.
    pub fn key_up(&mut self, key: u8) {
        if let Some(k) = self.keypad.get_mut(key as usize) { *k = false; }
    }

    /// Keys above 0xF are never pressed.
    pub fn is_key_pressed(&self, key: u8) -> bool {
        self.keypad.get(key as usize).copied().unwrap_or(false)
    }

    /// The display buffer, one row per scanline; each cell is 0 or 1.
    pub fn framebuffer(&self) -> &[[u8; DISPLAY_WIDTH]; DISPLAY_HEIGHT] { &self.display }

    /// Whether the pixel at column `x`, row `y` is lit. Out of range is off.
    pub fn pixel(&self, x: usize, y: usize) -> bool {
        self.display.get(y).and_then(|row| row.get(x)).is_some_and(|&p| p != 0)
    }

    /// Returns true if the buzzer should currently be sounding.
    pub fn sound_active(&self) -> bool { self.sound_timer > 0 }

    /// Returns true if the last step ran the sound timer down from 1 to 0.
    pub fn tone(&self) -> bool { self.tone }

    pub fn program_counter(&self) -> u16 { self.program_counter }
    pub fn index_register(&self) -> u16 { self.register_i }
    pub fn stack_pointer(&self) -> usize { self.stack_pointer }
    pub fn registers(&self) -> &[u8; REGISTER_COUNT] { &self.registers }
    pub fn register(&self, x: usize) -> u8 { self.registers[x & 0xF] }
    pub fn delay_timer(&self) -> u8 { self.delay_timer }
    pub fn sound_timer(&self) -> u8 { self.sound_timer }
    pub fn memory(&self) -> &[u8; MEMORY_SIZE] { &self.memory }
}

impl Default for Machine {
    fn default() -> Self {
        Self::new()
    }
}
