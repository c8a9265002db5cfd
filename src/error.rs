use std::io;
use std::path::PathBuf;

/// Everything that can stop a run. Decode and bounds errors carry the
/// address and raw instruction word so they can be reported after the
/// terminal has been restored.
#[derive(Debug, thiserror::Error)]
pub enum Chip8Error {
    #[error("unknown instruction {opcode:#06x} at address {addr:#05x}")]
    Decode { addr: u16, opcode: u16 },

    #[error("program counter left program space at {addr:#06x} (after instruction {last_opcode:#06x})")]
    Bounds { addr: u16, last_opcode: u16 },

    #[error("call stack overflow at address {addr:#05x} (instruction {opcode:#06x})")]
    StackOverflow { addr: u16, opcode: u16 },

    #[error("program image is empty")]
    EmptyProgram,

    #[error("cannot read program {}: {source}", .path.display())]
    Unreadable { path: PathBuf, source: io::Error },

    #[error(transparent)]
    Io(#[from] io::Error),
}
