use crate::config::Quirks;
use std::fmt;

/// register index, 0x0..=0xf
pub type Reg = usize;

/// One decoded CHIP-8 instruction. Operand fields are taken straight from
/// the nibbles of the instruction word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    /// 0NNN, legacy machine-code call; ignored
    MachineCall(u16),
    /// 00E0
    ClearScreen,
    /// 00EE
    Return,
    /// 1NNN
    Jump(u16),
    /// 2NNN
    Call(u16),
    /// 3XNN
    SkipEqImm(Reg, u8),
    /// 4XNN
    SkipNeImm(Reg, u8),
    /// 5XY0
    SkipEqReg(Reg, Reg),
    /// 6XNN
    LoadImm(Reg, u8),
    /// 7XNN, no carry
    AddImm(Reg, u8),
    /// 8XY0
    Move(Reg, Reg),
    /// 8XY1
    Or(Reg, Reg),
    /// 8XY2
    And(Reg, Reg),
    /// 8XY3
    Xor(Reg, Reg),
    /// 8XY4
    Add(Reg, Reg),
    /// 8XY5, VX = VX - VY
    Sub(Reg, Reg),
    /// 8XY6
    ShiftRight(Reg, Reg),
    /// 8XY7, VX = VY - VX
    SubN(Reg, Reg),
    /// 8XYE
    ShiftLeft(Reg, Reg),
    /// 9XY0
    SkipNeReg(Reg, Reg),
    /// ANNN
    LoadIndex(u16),
    /// BNNN
    JumpOffset(u16),
    /// CXNN
    Random(Reg, u8),
    /// DXYN
    Draw(Reg, Reg, u8),
    /// EX9E
    SkipKey(Reg),
    /// EXA1
    SkipNotKey(Reg),
    /// FX07
    LoadDelay(Reg),
    /// FX0A
    WaitKey(Reg),
    /// FX15
    SetDelay(Reg),
    /// FX18
    SetSound(Reg),
    /// FX1E
    AddIndex(Reg),
    /// FX29
    LoadGlyph(Reg),
    /// FX33
    StoreBcd(Reg),
    /// FX55
    StoreRegs(Reg),
    /// FX65
    LoadRegs(Reg),
}

impl Instruction {
    /// decode an instruction word, or None if it isn't a known encoding
    pub fn decode(opcode: u16) -> Option<Self> {
        let nibbles = (
            (opcode >> 12) as u8,
            ((opcode >> 8) & 0xf) as usize,
            ((opcode >> 4) & 0xf) as usize,
            (opcode & 0xf) as u8,
        );
        let nnn = opcode & 0x0fff;
        let nn = (opcode & 0x00ff) as u8;

        use Instruction::*;
        let ins = match nibbles {
            (0x0, _, _, _) => match opcode {
                0x00e0 => ClearScreen,
                0x00ee => Return,
                _ => MachineCall(nnn),
            },
            (0x1, _, _, _) => Jump(nnn),
            (0x2, _, _, _) => Call(nnn),
            (0x3, x, _, _) => SkipEqImm(x, nn),
            (0x4, x, _, _) => SkipNeImm(x, nn),
            (0x5, x, y, 0x0) => SkipEqReg(x, y),
            (0x6, x, _, _) => LoadImm(x, nn),
            (0x7, x, _, _) => AddImm(x, nn),
            (0x8, x, y, 0x0) => Move(x, y),
            (0x8, x, y, 0x1) => Or(x, y),
            (0x8, x, y, 0x2) => And(x, y),
            (0x8, x, y, 0x3) => Xor(x, y),
            (0x8, x, y, 0x4) => Add(x, y),
            (0x8, x, y, 0x5) => Sub(x, y),
            (0x8, x, y, 0x6) => ShiftRight(x, y),
            (0x8, x, y, 0x7) => SubN(x, y),
            (0x8, x, y, 0xe) => ShiftLeft(x, y),
            (0x9, x, y, 0x0) => SkipNeReg(x, y),
            (0xa, _, _, _) => LoadIndex(nnn),
            (0xb, _, _, _) => JumpOffset(nnn),
            (0xc, x, _, _) => Random(x, nn),
            (0xd, x, y, n) => Draw(x, y, n),
            (0xe, x, _, _) => match nn {
                0x9e => SkipKey(x),
                0xa1 => SkipNotKey(x),
                _ => return None,
            },
            (0xf, x, _, _) => match nn {
                0x07 => LoadDelay(x),
                0x0a => WaitKey(x),
                0x15 => SetDelay(x),
                0x18 => SetSound(x),
                0x1e => AddIndex(x),
                0x29 => LoadGlyph(x),
                0x33 => StoreBcd(x),
                0x55 => StoreRegs(x),
                0x65 => LoadRegs(x),
                _ => return None,
            },
            _ => return None,
        };
        Some(ins)
    }

    /// disassembly as the given quirks execute it; only BNNN differs
    pub fn disassemble(&self, quirks: &Quirks) -> String {
        match *self {
            Instruction::JumpOffset(nnn) if quirks.jmp => {
                format!("JP   V{:X}, {:#05x}", nnn >> 8, nnn)
            }
            _ => self.to_string(),
        }
    }
}

/// quirk-free disassembly; see `disassemble` for the form a quirked
/// interpreter runs
impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Instruction::*;
        match *self {
            MachineCall(nnn) => write!(f, "SYS  {:#05x}", nnn),
            ClearScreen => write!(f, "CLS"),
            Return => write!(f, "RET"),
            Jump(nnn) => write!(f, "JP   {:#05x}", nnn),
            Call(nnn) => write!(f, "CALL {:#05x}", nnn),
            SkipEqImm(x, nn) => write!(f, "SE   V{:X}, {:#04x}", x, nn),
            SkipNeImm(x, nn) => write!(f, "SNE  V{:X}, {:#04x}", x, nn),
            SkipEqReg(x, y) => write!(f, "SE   V{:X}, V{:X}", x, y),
            LoadImm(x, nn) => write!(f, "LD   V{:X}, {:#04x}", x, nn),
            AddImm(x, nn) => write!(f, "ADD  V{:X}, {:#04x}", x, nn),
            Move(x, y) => write!(f, "LD   V{:X}, V{:X}", x, y),
            Or(x, y) => write!(f, "OR   V{:X}, V{:X}", x, y),
            And(x, y) => write!(f, "AND  V{:X}, V{:X}", x, y),
            Xor(x, y) => write!(f, "XOR  V{:X}, V{:X}", x, y),
            Add(x, y) => write!(f, "ADD  V{:X}, V{:X}", x, y),
            Sub(x, y) => write!(f, "SUB  V{:X}, V{:X}", x, y),
            ShiftRight(x, y) => write!(f, "SHR  V{:X}, V{:X}", x, y),
            SubN(x, y) => write!(f, "SUBN V{:X}, V{:X}", x, y),
            ShiftLeft(x, y) => write!(f, "SHL  V{:X}, V{:X}", x, y),
            SkipNeReg(x, y) => write!(f, "SNE  V{:X}, V{:X}", x, y),
            LoadIndex(nnn) => write!(f, "LD   I, {:#05x}", nnn),
            JumpOffset(nnn) => write!(f, "JP   V0, {:#05x}", nnn),
            Random(x, nn) => write!(f, "RND  V{:X}, {:#04x}", x, nn),
            Draw(x, y, n) => write!(f, "DRW  V{:X}, V{:X}, {}", x, y, n),
            SkipKey(x) => write!(f, "SKP  V{:X}", x),
            SkipNotKey(x) => write!(f, "SKNP V{:X}", x),
            LoadDelay(x) => write!(f, "LD   V{:X}, DT", x),
            WaitKey(x) => write!(f, "LD   V{:X}, K", x),
            SetDelay(x) => write!(f, "LD   DT, V{:X}", x),
            SetSound(x) => write!(f, "LD   ST, V{:X}", x),
            AddIndex(x) => write!(f, "ADD  I, V{:X}", x),
            LoadGlyph(x) => write!(f, "LD   F, V{:X}", x),
            StoreBcd(x) => write!(f, "LD   B, V{:X}", x),
            StoreRegs(x) => write!(f, "LD   [I], V{:X}", x),
            LoadRegs(x) => write!(f, "LD   V{:X}, [I]", x),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Instruction::*;
    use super::*;

    #[test]
    fn test_decode_operands() {
        assert_eq!(Instruction::decode(0x1234), Some(Jump(0x234)));
        assert_eq!(Instruction::decode(0x3a7f), Some(SkipEqImm(0xa, 0x7f)));
        assert_eq!(Instruction::decode(0x8ce4), Some(Add(0xc, 0xe)));
        assert_eq!(Instruction::decode(0xd125), Some(Draw(1, 2, 5)));
        assert_eq!(Instruction::decode(0xf365), Some(LoadRegs(3)));
        assert_eq!(Instruction::decode(0xe09e), Some(SkipKey(0)));
    }

    #[test]
    fn test_decode_system_family() {
        assert_eq!(Instruction::decode(0x00e0), Some(ClearScreen));
        assert_eq!(Instruction::decode(0x00ee), Some(Return));
        assert_eq!(Instruction::decode(0x0123), Some(MachineCall(0x123)));
        assert_eq!(Instruction::decode(0x0000), Some(MachineCall(0x000)));
    }

    #[test]
    fn test_decode_rejects_unknown() {
        for opcode in [0x5121, 0x9ab1, 0x8008, 0x800f, 0xe19f, 0xf0ff, 0xf256] {
            assert_eq!(Instruction::decode(opcode), None, "{:#06x}", opcode);
        }
    }

    #[test]
    fn test_disassembly() {
        assert_eq!(LoadIndex(0x2ea).to_string(), "LD   I, 0x2ea");
        assert_eq!(Draw(0, 1, 8).to_string(), "DRW  V0, V1, 8");
        assert_eq!(StoreRegs(0xf).to_string(), "LD   [I], VF");
    }

    #[test]
    fn test_disassembly_follows_jump_quirk() {
        let jmp = Quirks {
            jmp: true,
            ..Quirks::default()
        };
        assert_eq!(JumpOffset(0x345).to_string(), "JP   V0, 0x345");
        assert_eq!(
            JumpOffset(0x345).disassemble(&Quirks::default()),
            "JP   V0, 0x345"
        );
        assert_eq!(JumpOffset(0x345).disassemble(&jmp), "JP   V3, 0x345");
        assert_eq!(JumpOffset(0xa00).disassemble(&jmp), "JP   VA, 0xa00");
        assert_eq!(Draw(0, 1, 8).disassemble(&jmp), "DRW  V0, V1, 8");
    }
}
