use crate::error::Chip8Error;

// NB. addresses are u16 as per the chip-8; every access wraps to the 4K
//     address space so a stray I can never index out of the array

/// Represents the flat address space seen by the interpreter.
pub trait MemoryMap {
    /// read one byte; the address wraps modulo the memory size
    fn get_byte(&self, addr: u16) -> u8;

    /// write one byte; the address wraps modulo the memory size
    fn set_byte(&mut self, addr: u16, value: u8);

    /// write a chunk of bytes starting at addr
    fn write(&mut self, data: &[u8], addr: u16) {
        for (offset, byte) in data.iter().enumerate() {
            self.set_byte(addr.wrapping_add(offset as u16), *byte);
        }
    }

    /// get a big-endian two-byte word (instructions)
    fn get_word(&self, addr: u16) -> u16 {
        ((self.get_byte(addr) as u16) << 8) | self.get_byte(addr.wrapping_add(1)) as u16
    }
}

/// how much RAM we have
pub const CHIP8_RAM_SIZE_BYTES: usize = 4096;

/// where the program is loaded
pub const CHIP8_PROGRAM_ADDR: u16 = 0x0200;

/// largest program that fits between 0x200 and the top of RAM
pub const CHIP8_MAX_PROGRAM_BYTES: usize = CHIP8_RAM_SIZE_BYTES - CHIP8_PROGRAM_ADDR as usize;

pub const CHIP8_FONT_ADDR: u16 = 0x080;
pub const CHIP8_FONT_GLYPH_BYTES: u16 = 5;

/// Defines the CHIP-8 memory map:
///   0x0000-0x007f  unused
///   0x0080-0x00cf  font glyphs, 16 x 5 bytes
///   0x00d0-0x01ff  unused
///   0x0200-0x0fff  program
///
/// the call stack is not kept in this memory; the interpreter holds it
pub struct Chip8MemoryMap {
    bytes: Box<[u8; CHIP8_RAM_SIZE_BYTES]>,
}

impl MemoryMap for Chip8MemoryMap {
    fn get_byte(&self, addr: u16) -> u8 {
        self.bytes[addr as usize % CHIP8_RAM_SIZE_BYTES]
    }

    fn set_byte(&mut self, addr: u16, value: u8) {
        self.bytes[addr as usize % CHIP8_RAM_SIZE_BYTES] = value;
    }
}

impl Chip8MemoryMap {
    /// zeroed memory with the font baked in
    pub fn new() -> Self {
        let mut mm = Chip8MemoryMap {
            bytes: Box::new([0u8; CHIP8_RAM_SIZE_BYTES]),
        };
        mm.write(&CHIP8_FONT, CHIP8_FONT_ADDR);
        mm
    }

    /// load a CHIP-8 program at 0x200, truncating anything past the top of RAM
    pub fn load_program(&mut self, program: &[u8]) -> Result<(), Chip8Error> {
        if program.is_empty() {
            return Err(Chip8Error::EmptyProgram);
        }
        let program = if program.len() > CHIP8_MAX_PROGRAM_BYTES {
            log::warn!(
                "program is {} bytes; only the first {} are loaded",
                program.len(),
                CHIP8_MAX_PROGRAM_BYTES
            );
            &program[..CHIP8_MAX_PROGRAM_BYTES]
        } else {
            program
        };
        self.write(program, CHIP8_PROGRAM_ADDR);
        Ok(())
    }

    /// address of the glyph for a hex digit
    pub fn glyph_addr(digit: u8) -> u16 {
        CHIP8_FONT_ADDR + (digit & 0x0f) as u16 * CHIP8_FONT_GLYPH_BYTES
    }
}

impl Default for Chip8MemoryMap {
    fn default() -> Self {
        Self::new()
    }
}

const CHIP8_FONT: [u8; 80] = [
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_zeroed() {
        let m = Chip8MemoryMap::new();
        // NB. memory is zeroed outside the font table
        assert_eq!(m.bytes[..0x80], [0; 0x80]);
        assert_eq!(m.bytes[0xd0..], [0; 0xf30]);
    }

    #[test]
    fn test_font_location() {
        let m = Chip8MemoryMap::new();
        assert_eq!(m.get_byte(0x080), 0xF0);
        assert_eq!(m.get_byte(0x0cf), 0x80);
        assert_eq!(Chip8MemoryMap::glyph_addr(0xa), 0x0b2);
        assert_eq!(m.get_byte(Chip8MemoryMap::glyph_addr(1)), 0x20);
    }

    #[test]
    fn test_write_slice_ok() {
        let mut dst = Chip8MemoryMap::new();
        let src: &[u8] = &[0, 1, 2, 3, 4, 5, 6, 7];
        dst.write(src, 8);
        assert_eq!(
            dst.bytes[..16],
            [0, 0, 0, 0, 0, 0, 0, 0, 0, 1, 2, 3, 4, 5, 6, 7]
        );
    }

    #[test]
    fn test_read_word() {
        let mut m = Chip8MemoryMap::new();
        m.write(&[0, 1, 2, 3, 4, 5, 6, 7], 0x300);
        assert_eq!(m.get_word(0x304), 0x0405);
    }

    #[test]
    fn test_access_wraps() {
        let mut m = Chip8MemoryMap::new();
        m.set_byte(0x1005, 0xab);
        assert_eq!(m.get_byte(0x005), 0xab);
        m.set_byte(0x0fff, 0x12);
        m.set_byte(0x0000, 0x34);
        assert_eq!(m.get_word(0x0fff), 0x1234);
    }

    #[test]
    fn test_program_load_ok() -> Result<(), Chip8Error> {
        let mut dst = Chip8MemoryMap::new();
        dst.load_program(&[0x00, 0xe0])?; // clear screen
        assert_eq!(dst.get_word(0x200), 0x00e0);
        Ok(())
    }

    #[test]
    fn test_program_load_empty() {
        let mut dst = Chip8MemoryMap::new();
        assert!(matches!(
            dst.load_program(&[]),
            Err(Chip8Error::EmptyProgram)
        ));
    }

    #[test]
    fn test_program_load_truncated() -> Result<(), Chip8Error> {
        let mut dst = Chip8MemoryMap::new();
        dst.load_program(&[0x11; CHIP8_MAX_PROGRAM_BYTES + 4])?;
        assert_eq!(dst.get_byte(0xfff), 0x11);
        // nothing wrapped round into low memory
        assert_eq!(dst.get_byte(0x000), 0x00);
        assert_eq!(dst.get_byte(0x080), 0xF0);
        Ok(())
    }
}
