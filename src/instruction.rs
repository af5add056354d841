use crate::error::{Error, Result};

/// A decoded CHIP-8 instruction, carrying its operand fields.
///
/// Register operands (`x`, `y`) are register indices in `0x0..=0xF`,
/// `kk` is the low byte of the opcode, `n` the low nibble and `addr`
/// the low 12 bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    /// 00E0 - CLS
    ClearScreen,
    /// 00EE - RET
    Return,
    /// 1nnn - JP addr
    Jump { addr: u16 },
    /// 2nnn - CALL addr
    Call { addr: u16 },
    /// 3xkk - SE Vx, byte
    SkipIfEqualByte { x: usize, kk: u8 },
    /// 4xkk - SNE Vx, byte
    SkipIfNotEqualByte { x: usize, kk: u8 },
    /// 5xy0 - SE Vx, Vy
    SkipIfEqual { x: usize, y: usize },
    /// 6xkk - LD Vx, byte
    LoadByte { x: usize, kk: u8 },
    /// 7xkk - ADD Vx, byte
    AddByte { x: usize, kk: u8 },
    /// 8xy0 - LD Vx, Vy
    Load { x: usize, y: usize },
    /// 8xy1 - OR Vx, Vy
    Or { x: usize, y: usize },
    /// 8xy2 - AND Vx, Vy
    And { x: usize, y: usize },
    /// 8xy3 - XOR Vx, Vy
    Xor { x: usize, y: usize },
    /// 8xy4 - ADD Vx, Vy
    Add { x: usize, y: usize },
    /// 8xy5 - SUB Vx, Vy
    Sub { x: usize, y: usize },
    /// 8xy6 - SHR Vx
    ///
    /// VF receives the least-significant bit of Vx, but Vx itself is shifted
    /// *left*. This pairing is part of the reference instruction set.
    ShiftRight { x: usize },
    /// 8xy7 - SUBN Vx, Vy
    ///
    /// VF is set when Vy > Vx, while Vx receives Vx - Vy.
    SubN { x: usize, y: usize },
    /// 8xyE - SHL Vx
    ShiftLeft { x: usize },
    /// 9xy0 - SNE Vx, Vy
    SkipIfNotEqual { x: usize, y: usize },
    /// Annn - LD I, addr
    LoadIndex { addr: u16 },
    /// Bnnn - JP V0, addr
    JumpOffset { addr: u16 },
    /// Cxkk - RND Vx, byte
    Random { x: usize, kk: u8 },
    /// Dxyn - DRW Vx, Vy, nibble
    Draw { x: usize, y: usize, n: u8 },
    /// Ex9E - SKP Vx
    SkipIfKeyPressed { x: usize },
    /// ExA1 - SKNP Vx
    SkipIfKeyNotPressed { x: usize },
    /// Fx07 - LD Vx, DT
    LoadDelayTimer { x: usize },
    /// Fx0A - LD Vx, K
    WaitForKey { x: usize },
    /// Fx15 - LD DT, Vx
    SetDelayTimer { x: usize },
    /// Fx18 - LD ST, Vx
    SetSoundTimer { x: usize },
    /// Fx1E - ADD I, Vx
    AddIndex { x: usize },
    /// Fx29 - LD F, Vx
    LoadGlyph { x: usize },
    /// Fx33 - LD B, Vx
    StoreBcd { x: usize },
    /// Fx55 - LD [I], Vx
    StoreRegisters { x: usize },
    /// Fx65 - LD Vx, [I]
    LoadRegisters { x: usize },
}

impl Instruction {
    /// Decode a raw 16-bit opcode.
    ///
    /// Dispatch is on the most-significant nibble, then on the low nibble or
    /// low byte where several instructions share a prefix. Anything that
    /// doesn't match is an [`Error::IllegalOpcode`].
    pub fn decode(opcode: u16) -> Result<Self> {
        let x = (0x000F & (opcode >> 8)) as usize;
        let y = (0x000F & (opcode >> 4)) as usize;
        let n = (opcode & 0x000F) as u8;
        // The lowest 8 bits contain the value, so we can use a narrowing cast.
        let kk = opcode as u8;
        let addr = opcode & 0x0FFF;

        let instruction = match opcode >> 12 {
            0x0 => match opcode {
                0x00E0 => Self::ClearScreen,
                0x00EE => Self::Return,
                // 0nnn (SYS addr) calls native machine code and is unsupported.
                _ => return Err(Error::IllegalOpcode(opcode)),
            },
            0x1 => Self::Jump { addr },
            0x2 => Self::Call { addr },
            0x3 => Self::SkipIfEqualByte { x, kk },
            0x4 => Self::SkipIfNotEqualByte { x, kk },
            0x5 if n == 0 => Self::SkipIfEqual { x, y },
            0x6 => Self::LoadByte { x, kk },
            0x7 => Self::AddByte { x, kk },
            0x8 => match n {
                0x0 => Self::Load { x, y },
                0x1 => Self::Or { x, y },
                0x2 => Self::And { x, y },
                0x3 => Self::Xor { x, y },
                0x4 => Self::Add { x, y },
                0x5 => Self::Sub { x, y },
                0x6 => Self::ShiftRight { x },
                0x7 => Self::SubN { x, y },
                0xE => Self::ShiftLeft { x },
                _ => return Err(Error::IllegalOpcode(opcode)),
            },
            0x9 if n == 0 => Self::SkipIfNotEqual { x, y },
            0xA => Self::LoadIndex { addr },
            0xB => Self::JumpOffset { addr },
            0xC => Self::Random { x, kk },
            0xD => Self::Draw { x, y, n },
            0xE => match kk {
                0x9E => Self::SkipIfKeyPressed { x },
                0xA1 => Self::SkipIfKeyNotPressed { x },
                _ => return Err(Error::IllegalOpcode(opcode)),
            },
            0xF => match kk {
                0x07 => Self::LoadDelayTimer { x },
                0x0A => Self::WaitForKey { x },
                0x15 => Self::SetDelayTimer { x },
                0x18 => Self::SetSoundTimer { x },
                0x1E => Self::AddIndex { x },
                0x29 => Self::LoadGlyph { x },
                0x33 => Self::StoreBcd { x },
                0x55 => Self::StoreRegisters { x },
                0x65 => Self::LoadRegisters { x },
                _ => return Err(Error::IllegalOpcode(opcode)),
            },
            _ => return Err(Error::IllegalOpcode(opcode)),
        };

        Ok(instruction)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_decode_operand_fields() {
        assert_eq!(
            Instruction::decode(0xD123).unwrap(),
            Instruction::Draw { x: 1, y: 2, n: 3 }
        );
        assert_eq!(
            Instruction::decode(0x7AFF).unwrap(),
            Instruction::AddByte { x: 0xA, kk: 0xFF }
        );
        assert_eq!(
            Instruction::decode(0x2ABC).unwrap(),
            Instruction::Call { addr: 0xABC }
        );
        assert_eq!(
            Instruction::decode(0xBFFF).unwrap(),
            Instruction::JumpOffset { addr: 0xFFF }
        );
    }

    #[test]
    fn test_decode_second_level_dispatch() {
        assert_eq!(Instruction::decode(0x00E0).unwrap(), Instruction::ClearScreen);
        assert_eq!(Instruction::decode(0x00EE).unwrap(), Instruction::Return);
        assert_eq!(Instruction::decode(0x8126).unwrap(), Instruction::ShiftRight { x: 1 });
        assert_eq!(Instruction::decode(0x812E).unwrap(), Instruction::ShiftLeft { x: 1 });
        assert_eq!(Instruction::decode(0x8127).unwrap(), Instruction::SubN { x: 1, y: 2 });
        assert_eq!(Instruction::decode(0xE59E).unwrap(), Instruction::SkipIfKeyPressed { x: 5 });
        assert_eq!(Instruction::decode(0xE5A1).unwrap(), Instruction::SkipIfKeyNotPressed { x: 5 });
        assert_eq!(Instruction::decode(0xF30A).unwrap(), Instruction::WaitForKey { x: 3 });
        assert_eq!(Instruction::decode(0xF333).unwrap(), Instruction::StoreBcd { x: 3 });
        assert_eq!(Instruction::decode(0xFE65).unwrap(), Instruction::LoadRegisters { x: 0xE });
    }

    #[test]
    fn test_decode_illegal_opcodes() {
        // SYS addr, unknown ALU ops, non-zero low nibble on register compares,
        // and unknown E/F sub-opcodes are all rejected with the raw value.
        for opcode in [0x0000, 0x0123, 0x00E1, 0x8008, 0x800F, 0x5121, 0x912F, 0xE19F, 0xF0FF, 0xF100] {
            assert_eq!(Instruction::decode(opcode), Err(Error::IllegalOpcode(opcode)));
        }
    }
}
