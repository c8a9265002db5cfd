//! A CHIP-8 virtual machine for the terminal.
//!
//! ## Design
//!
//! * one owned machine state (`Chip8Interpreter`); no globals, so tests can
//!   run as many machines as they like
//! * instructions decoded once into an `Instruction` and dispatched with a
//!   single match; quirk handling lives with its instruction family
//! * display, keyboard and pacing sit behind traits so the core can run
//!   headless
//! * authentic 60Hz frames: a fixed number of instructions per frame, then
//!   sleep (or a calibrated busy loop) for the remainder
//!
//! Model
//!
//! main
//!  |-- terminal hooks (signals, panics)
//!  |-- config (cli flags + ROM suffix quirks)
//!  |-- display, input
//!  |-- interpreter(display, input, config)
//!  |    |-- memory (font at 0x080, program at 0x200)
//!  |    |-- frame buffer, keypad
//!  |    `-- registers, stack, timers
//!  `-- scheduler(interpreter, pacer)
//!       `-- per frame
//!            |-- interpreter.cycle() x cycles_per_frame
//!            |-- render if the frame buffer changed
//!            |-- tick delay and sound timers
//!            |-- age keypad; poll one key
//!            `-- pacer.idle()
pub mod config;
pub mod display;
pub mod error;
pub mod input;
pub mod instruction;
pub mod interpreter;
pub mod keypad;
pub mod memory;
pub mod scheduler;
pub mod terminal;
pub mod timing;
