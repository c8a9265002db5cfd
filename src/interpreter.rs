//! # interpreter
//!
//! The CHIP-8 machine state and its fetch/decode/execute cycle:
//!  * 16 8-bit registers V0-VF; VF doubles as carry/borrow/collision flag
//!  * I, the 16-bit address register; memory accesses through it wrap at 4K
//!  * the program counter, only valid in 0x200-0xfff
//!  * a call stack of return addresses, held outside addressable memory
//!  * delay and sound timers, counted down once per frame by the scheduler
//!
//! Conditional skips are deferred by one cycle, as historical interpreters
//! did: the skip sets a flag, and the next cycle steps over the instruction
//! before fetching.

use crate::config::{Config, Quirks};
use crate::display::{Display, FrameBuffer};
use crate::error::Chip8Error;
use crate::input::{Input, EXIT_KEY};
use crate::instruction::{Instruction, Reg};
use crate::keypad::{key_index, Keypad};
use crate::memory::{Chip8MemoryMap, MemoryMap, CHIP8_PROGRAM_ADDR, CHIP8_RAM_SIZE_BYTES};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::io;

/// deep enough for a call at every instruction of a full program
pub const CHIP8_STACK_DEPTH: usize = 1792;

const VF: Reg = 0xf;

/// What the caller should do after a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    /// the exit key was read; shut down
    Exit,
}

pub struct Chip8Interpreter<'a> {
    memory: Chip8MemoryMap,
    frame: FrameBuffer,
    keypad: Keypad,
    display: &'a mut dyn Display,
    input: &'a mut dyn Input,
    quirks: Quirks,
    v: [u8; 16],
    i: u16,
    program_counter: u16,
    stack: Vec<u16>,
    delay_timer: u8,
    sound_timer: u8,
    skip_pending: bool,
    last_opcode: u16,
    rng: StdRng,
}

impl<'a> Chip8Interpreter<'a> {
    pub fn new(
        display: &'a mut dyn Display,
        input: &'a mut dyn Input,
        config: &Config,
    ) -> Chip8Interpreter<'a> {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Chip8Interpreter {
            memory: Chip8MemoryMap::new(),
            frame: FrameBuffer::new(),
            keypad: Keypad::new(),
            display,
            input,
            quirks: config.quirks,
            v: [0; 16],
            i: 0,
            program_counter: CHIP8_PROGRAM_ADDR,
            stack: Vec::with_capacity(CHIP8_STACK_DEPTH),
            delay_timer: 0,
            sound_timer: 0,
            skip_pending: false,
            last_opcode: 0,
            rng,
        }
    }

    /// load a chip8 program
    pub fn load_program(&mut self, program: &[u8]) -> Result<(), Chip8Error> {
        self.memory.load_program(program)
    }

    /// run exactly one instruction
    pub fn cycle(&mut self) -> Result<Flow, Chip8Error> {
        if self.skip_pending {
            self.program_counter = self.program_counter.wrapping_add(2);
            self.skip_pending = false;
        }

        let addr = self.program_counter;
        if addr < CHIP8_PROGRAM_ADDR || addr as usize >= CHIP8_RAM_SIZE_BYTES {
            return Err(Chip8Error::Bounds {
                addr,
                last_opcode: self.last_opcode,
            });
        }

        let opcode = self.memory.get_word(addr);
        self.program_counter = addr + 2;
        self.last_opcode = opcode;

        let ins = Instruction::decode(opcode).ok_or(Chip8Error::Decode { addr, opcode })?;
        log::trace!("{:03x}: {:04x}  {}", addr, opcode, ins.disassemble(&self.quirks));
        self.execute(ins, addr, opcode)
    }

    fn execute(&mut self, ins: Instruction, addr: u16, opcode: u16) -> Result<Flow, Chip8Error> {
        use Instruction::*;
        match ins {
            MachineCall(nnn) => log::debug!("ignoring machine call {:#05x} at {:#05x}", nnn, addr),
            ClearScreen => self.frame.clear(),
            Return => match self.stack.pop() {
                Some(ret) => self.program_counter = ret,
                None => log::debug!("return with empty stack at {:#05x}", addr),
            },
            Jump(nnn) => self.program_counter = nnn,
            Call(nnn) => {
                if self.stack.len() >= CHIP8_STACK_DEPTH {
                    return Err(Chip8Error::StackOverflow { addr, opcode });
                }
                self.stack.push(self.program_counter);
                self.program_counter = nnn;
            }
            SkipEqImm(x, nn) => self.skip_pending = self.v[x] == nn,
            SkipNeImm(x, nn) => self.skip_pending = self.v[x] != nn,
            SkipEqReg(x, y) => self.skip_pending = self.v[x] == self.v[y],
            SkipNeReg(x, y) => self.skip_pending = self.v[x] != self.v[y],
            LoadImm(x, nn) => self.v[x] = nn,
            AddImm(x, nn) => self.v[x] = self.v[x].wrapping_add(nn),
            Move(x, y) => self.v[x] = self.v[y],
            Or(x, y) => self.logic(x, self.v[x] | self.v[y]),
            And(x, y) => self.logic(x, self.v[x] & self.v[y]),
            Xor(x, y) => self.logic(x, self.v[x] ^ self.v[y]),
            Add(x, y) => {
                let (sum, carry) = self.v[x].overflowing_add(self.v[y]);
                self.arith(x, sum, carry as u8);
            }
            Sub(x, y) => {
                let (diff, borrow) = self.v[x].overflowing_sub(self.v[y]);
                self.arith(x, diff, !borrow as u8);
            }
            SubN(x, y) => {
                let (diff, borrow) = self.v[y].overflowing_sub(self.v[x]);
                self.arith(x, diff, !borrow as u8);
            }
            ShiftRight(x, y) => {
                let src = self.shift_source(x, y);
                self.arith(x, src >> 1, src & 0x01);
            }
            ShiftLeft(x, y) => {
                let src = self.shift_source(x, y);
                self.arith(x, src << 1, src >> 7);
            }
            LoadIndex(nnn) => self.i = nnn,
            JumpOffset(nnn) => {
                let reg = if self.quirks.jmp {
                    (nnn >> 8) as Reg
                } else {
                    0
                };
                self.program_counter = nnn.wrapping_add(self.v[reg] as u16);
            }
            Random(x, nn) => self.v[x] = self.rng.gen::<u8>() & nn,
            Draw(x, y, n) => {
                let sprite: Vec<u8> = (0..n as u16)
                    .map(|row| self.memory.get_byte(self.i.wrapping_add(row)))
                    .collect();
                let (px, py) = (self.v[x], self.v[y]);
                self.v[VF] = 0;
                let collision = self.frame.draw_sprite(px, py, &sprite);
                self.v[VF] = collision as u8;
            }
            SkipKey(x) => self.skip_pending = self.keypad.is_pressed(self.v[x]),
            SkipNotKey(x) => self.skip_pending = !self.keypad.is_pressed(self.v[x]),
            LoadDelay(x) => self.v[x] = self.delay_timer,
            WaitKey(x) => match self.wait_for_key()? {
                Some(key) => self.v[x] = key,
                None => return Ok(Flow::Exit),
            },
            SetDelay(x) => self.delay_timer = self.v[x],
            SetSound(x) => self.sound_timer = self.v[x],
            AddIndex(x) => self.i = self.i.wrapping_add(self.v[x] as u16),
            LoadGlyph(x) => self.i = Chip8MemoryMap::glyph_addr(self.v[x]),
            StoreBcd(x) => {
                let value = self.v[x];
                let digits = [value / 100, (value / 10) % 10, value % 10];
                for (offset, digit) in digits.iter().enumerate() {
                    self.memory
                        .set_byte(self.i.wrapping_add(offset as u16), *digit);
                }
            }
            StoreRegs(x) => {
                for reg in 0..=x {
                    self.memory
                        .set_byte(self.i.wrapping_add(reg as u16), self.v[reg]);
                }
                self.advance_index(x);
            }
            LoadRegs(x) => {
                for reg in 0..=x {
                    self.v[reg] = self.memory.get_byte(self.i.wrapping_add(reg as u16));
                }
                self.advance_index(x);
            }
        }
        Ok(Flow::Continue)
    }

    /// OR/AND/XOR result; the VIP interpreter clobbered VF as a side effect
    fn logic(&mut self, x: Reg, result: u8) {
        self.v[x] = result;
        if self.quirks.vip {
            self.v[VF] = 0;
        }
    }

    /// result and flag are both computed from the operands before either
    /// is written; the flag lands last, so VF as destination ends up holding
    /// the flag with or without the CRY quirk
    fn arith(&mut self, x: Reg, result: u8, flag: u8) {
        self.v[x] = result;
        self.v[VF] = flag;
    }

    fn shift_source(&self, x: Reg, y: Reg) -> u8 {
        if self.quirks.lsq {
            self.v[x]
        } else {
            self.v[y]
        }
    }

    /// FX55/FX65 leave I one past the last register unless STQ is set
    fn advance_index(&mut self, x: Reg) {
        if !self.quirks.stq {
            self.i = self.i.wrapping_add(x as u16 + 1);
        }
    }

    /// FX0A: show the current frame, drop held keys and timers, then block
    /// until a mapped key arrives. None means the exit key was read.
    fn wait_for_key(&mut self) -> Result<Option<u8>, io::Error> {
        // nothing can change the frame while blocked, so one draw is enough
        self.display.draw(&self.frame)?;
        self.frame.take_dirty();
        self.keypad.clear();
        self.delay_timer = 0;
        self.sound_timer = 0;
        loop {
            let raw = self.input.read_key()?;
            if raw == EXIT_KEY {
                return Ok(None);
            }
            if let Some(key) = key_index(raw) {
                self.keypad.press(key);
                return Ok(Some(key));
            }
            log::debug!("can't map 0x{:02x} to a COSMAC key", raw);
        }
    }

    /// draw the frame if a clear or sprite changed it since last time
    pub fn render(&mut self) -> Result<(), io::Error> {
        if self.frame.take_dirty() {
            self.display.draw(&self.frame)?;
        }
        Ok(())
    }

    /// 60Hz tick of both timers
    pub fn tick_timers(&mut self) {
        self.delay_timer = self.delay_timer.saturating_sub(1);
        self.sound_timer = self.sound_timer.saturating_sub(1);
    }

    /// age held keys by a frame, then take at most one key from the input
    pub fn poll_keypad(&mut self) -> Result<Flow, io::Error> {
        self.keypad.age();
        match self.input.poll_key()? {
            Some(EXIT_KEY) => Ok(Flow::Exit),
            Some(raw) => {
                self.keypad.press_raw(raw);
                Ok(Flow::Continue)
            }
            None => Ok(Flow::Continue),
        }
    }

    /// blank the screen and hand the display back
    pub fn shutdown(&mut self) -> Result<(), io::Error> {
        self.frame.clear();
        self.display.release()
    }

    pub fn frame(&self) -> &FrameBuffer {
        &self.frame
    }

    pub fn program_counter(&self) -> u16 {
        self.program_counter
    }

    pub fn register(&self, reg: Reg) -> u8 {
        self.v[reg & 0xf]
    }

    pub fn index(&self) -> u16 {
        self.i
    }

    pub fn delay_timer(&self) -> u8 {
        self.delay_timer
    }

    pub fn sound_timer(&self) -> u8 {
        self.sound_timer
    }
}
