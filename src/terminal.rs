//! Last-resort terminal restoration.
//!
//! `StdinInput` and `MonoTermDisplay` put the terminal back when they are
//! dropped, but neither drop runs if the process is killed by a signal, and
//! a panic message printed over the alternate screen is lost. These hooks
//! cover both cases.

use crossterm::terminal::{self, LeaveAlternateScreen};
use crossterm::{cursor, style::ResetColor, ExecutableCommand};
use signal_hook::consts::{SIGINT, SIGTERM};
use signal_hook::iterator::Signals;
use std::io::{self, Write};
use std::{panic, process, thread};

/// leave raw mode and the alternate screen, show the cursor; errors are
/// ignored since there is nothing left to report them to
pub fn restore() {
    let _ = terminal::disable_raw_mode();
    let mut stdout = io::stdout();
    let _ = stdout.execute(cursor::Show);
    let _ = stdout.execute(LeaveAlternateScreen);
    let _ = stdout.execute(ResetColor);
    let _ = stdout.flush();
}

/// shell convention for a process ended by a signal
pub fn exit_status(signal: i32) -> i32 {
    128 + signal
}

/// restore the terminal before the default panic message is printed
pub fn install_cleanup_hook() {
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        restore();
        original_hook(panic_info);
    }));
}

/// On SIGINT or SIGTERM, restore the terminal and exit. Must be installed
/// before raw mode is entered.
pub fn install_signal_handlers() -> Result<(), io::Error> {
    let mut signals = Signals::new([SIGINT, SIGTERM])?;
    thread::spawn(move || {
        if let Some(signal) = signals.forever().next() {
            log::info!("caught signal {}; restoring terminal", signal);
            restore();
            process::exit(exit_status(signal));
        }
    });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_status() {
        assert_eq!(exit_status(SIGINT), 130);
        assert_eq!(exit_status(SIGTERM), 143);
    }

    #[test]
    fn test_signal_handlers_register() {
        // registering only; nothing is raised
        assert!(install_signal_handlers().is_ok());
    }
}
