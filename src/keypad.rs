/// frames a key stays down after it is seen; a terminal only reports the
/// press, never the release
pub const HOLD_FRAMES: u8 = 4;

/// left-hand side of a qwerty keyboard to the COSMAC hex keypad:
///   1 2 3 4        1 2 3 C
///   q w e r   =>   4 5 6 D
///   a s d f        7 8 9 E
///   z x c v        A 0 B F
const CHIP8_CONVENTIONAL_KEYMAP: [(u8, u8); 16] = [
    (b'1', 0x01),
    (b'2', 0x02),
    (b'3', 0x03),
    (b'4', 0x0c),
    (b'q', 0x04),
    (b'w', 0x05),
    (b'e', 0x06),
    (b'r', 0x0d),
    (b'a', 0x07),
    (b's', 0x08),
    (b'd', 0x09),
    (b'f', 0x0e),
    (b'z', 0x0a),
    (b'x', 0x00),
    (b'c', 0x0b),
    (b'v', 0x0f),
];

/// map a raw key code to a keypad index
pub fn key_index(raw: u8) -> Option<u8> {
    CHIP8_CONVENTIONAL_KEYMAP
        .iter()
        .find(|(code, _)| *code == raw)
        .map(|(_, key)| *key)
}

/// The 16 hex keys, each with a debounce counter: 0 is up, anything else
/// is down for that many more frames.
#[derive(Debug, Default)]
pub struct Keypad {
    slots: [u8; 16],
}

impl Keypad {
    pub fn new() -> Self {
        Keypad::default()
    }

    /// record a raw key; returns the keypad index if the code is mapped
    pub fn press_raw(&mut self, raw: u8) -> Option<u8> {
        let key = key_index(raw);
        match key {
            Some(key) => self.press(key),
            None => log::debug!("can't map 0x{:02x} to a COSMAC key", raw),
        }
        key
    }

    pub fn press(&mut self, key: u8) {
        self.slots[(key & 0x0f) as usize] = HOLD_FRAMES;
    }

    pub fn is_pressed(&self, key: u8) -> bool {
        self.slots[(key & 0x0f) as usize] > 0
    }

    /// one frame passes; every held key counts down
    pub fn age(&mut self) {
        for slot in self.slots.iter_mut() {
            *slot = slot.saturating_sub(1);
        }
    }

    /// release everything
    pub fn clear(&mut self) {
        self.slots = [0; 16];
    }
}
