use crate::error::Chip8Error;
use crate::interpreter::{Chip8Interpreter, Flow};
use crate::timing::Pacer;

/// The 60Hz outer loop. Each frame runs a fixed batch of instructions,
/// renders if the screen changed, counts the timers down, ages and polls
/// the keypad, then idles out the rest of the frame.
pub struct Scheduler<'a> {
    interpreter: Chip8Interpreter<'a>,
    pacer: Pacer,
    cycles_per_frame: u32,
    frames: u64,
}

impl<'a> Scheduler<'a> {
    pub fn new(interpreter: Chip8Interpreter<'a>, pacer: Pacer, cycles_per_frame: u32) -> Self {
        Scheduler {
            interpreter,
            pacer,
            cycles_per_frame,
            frames: 0,
        }
    }

    /// run one frame
    pub fn frame(&mut self) -> Result<Flow, Chip8Error> {
        for _ in 0..self.cycles_per_frame {
            if self.interpreter.cycle()? == Flow::Exit {
                return Ok(Flow::Exit);
            }
        }
        self.interpreter.render()?;
        self.interpreter.tick_timers();
        if self.interpreter.poll_keypad()? == Flow::Exit {
            return Ok(Flow::Exit);
        }
        self.pacer.idle();
        self.frames += 1;
        Ok(Flow::Continue)
    }

    /// run frames until the exit key or a fatal error; the display is
    /// released either way
    pub fn run(&mut self) -> Result<(), Chip8Error> {
        log::info!(
            "running {} cycles per frame, pacing {:?}",
            self.cycles_per_frame,
            self.pacer
        );
        let result = loop {
            match self.frame() {
                Ok(Flow::Continue) => {}
                Ok(Flow::Exit) => break Ok(()),
                Err(e) => break Err(e),
            }
        };
        log::info!("stopped after {} frames", self.frames);
        let teardown = self.interpreter.shutdown();
        result?;
        teardown?;
        Ok(())
    }

    pub fn interpreter(&self) -> &Chip8Interpreter<'a> {
        &self.interpreter
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }
}
