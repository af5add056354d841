use sdl2::keyboard::Keycode;

/// Translate SDL2 Keycode values to the CHIP-8 key they stand in for.
///
/// ```text
/// CHIP-8 keypad    Keyboard
/// 1 2 3 C          1 2 3 4
/// 4 5 6 D          Q W E R
/// 7 8 9 E          A S D F
/// A 0 B F          Z X C V
/// ```
pub(crate) fn to_key(k: Keycode) -> Option<u8> {
    let key = match k {
        Keycode::Num1 => 0x1,
        Keycode::Num2 => 0x2,
        Keycode::Num3 => 0x3,
        Keycode::Num4 => 0xC,

        Keycode::Q    => 0x4,
        Keycode::W    => 0x5,
        Keycode::E    => 0x6,
        Keycode::R    => 0xD,

        Keycode::A    => 0x7,
        Keycode::S    => 0x8,
        Keycode::D    => 0x9,
        Keycode::F    => 0xE,

        Keycode::Z    => 0xA,
        Keycode::X    => 0x0,
        Keycode::C    => 0xB,
        Keycode::V    => 0xF,

        _ => return None,
    };
    Some(key)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_every_key_is_bound_once() {
        let bound = [
            Keycode::Num1, Keycode::Num2, Keycode::Num3, Keycode::Num4,
            Keycode::Q,    Keycode::W,    Keycode::E,    Keycode::R,
            Keycode::A,    Keycode::S,    Keycode::D,    Keycode::F,
            Keycode::Z,    Keycode::X,    Keycode::C,    Keycode::V,
        ];
        let mut seen = [false; 16];
        for k in bound {
            let key = to_key(k).unwrap() as usize;
            assert!(!seen[key]);
            seen[key] = true;
        }
        assert!(seen.iter().all(|&s| s));
        assert_eq!(to_key(Keycode::Space), None);
    }
}
