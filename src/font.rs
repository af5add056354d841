/// Height in bytes of a single hexadecimal glyph.
pub const GLYPH_SIZE: usize = 5;

/// The built-in hexadecimal font, stored in reserved memory from address 0x000.
///
/// Sprites are monochromatic and 8px wide; each glyph uses the high nibble of
/// 5 consecutive bytes, so '0' lives at bytes 0 through 4, '1' at 5 through 9,
/// and so on.
pub const HEX_FONT: [u8; 16 * GLYPH_SIZE] = [
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

/// Copy the font into the start of `memory`.
pub fn load_font(memory: &mut [u8]) {
    memory[..HEX_FONT.len()].copy_from_slice(&HEX_FONT);
}

/// Address of the glyph for `digit`.
/// Digits above 0xF are not masked and point past the end of the font.
pub fn glyph_address(digit: u8) -> u16 {
    digit as u16 * GLYPH_SIZE as u16
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_font_is_copied_to_low_memory() {
        let mut memory = [0; 4096];
        load_font(&mut memory);

        assert_eq!(&memory[..80], &HEX_FONT[..]);
        assert!(memory[80..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_glyph_address() {
        assert_eq!(glyph_address(0x0), 0);
        assert_eq!(glyph_address(0xA), 50);
        assert_eq!(glyph_address(0xF), 75);
        // 'F' glyph: F0 80 F0 80 80.
        let at = glyph_address(0xF) as usize;
        assert_eq!(&HEX_FONT[at..at + GLYPH_SIZE], &[0xF0, 0x80, 0xF0, 0x80, 0x80]);
    }
}
