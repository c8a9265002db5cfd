mod cli;

use std::fs::{self, File};
use std::io;
use std::process::ExitCode;

use chip8_tty::display::MonoTermDisplay;
use chip8_tty::error::Chip8Error;
use chip8_tty::input::StdinInput;
use chip8_tty::interpreter::Chip8Interpreter;
use chip8_tty::scheduler::Scheduler;
use chip8_tty::terminal;
use chip8_tty::timing::Pacer;
use clap::Parser;
use cli::Cli;

fn run(cli: &Cli) -> Result<(), Chip8Error> {
    let config = cli.config();
    log::info!("{:?}", config);

    // load before touching the terminal so a bad ROM leaves it alone
    let program = fs::read(&cli.rom).map_err(|source| Chip8Error::Unreadable {
        path: cli.rom.clone(),
        source,
    })?;
    if program.is_empty() {
        return Err(Chip8Error::EmptyProgram);
    }

    // calibration busy-loops, so do it before the screen goes blank
    let pacer = Pacer::for_pacing(config.pacing, config.cycles_per_frame);

    terminal::install_signal_handlers()?;

    // NB. input is declared first so it drops last: raw mode stays on until
    //     the display has put the terminal back
    let mut input = StdinInput::new()?;
    let mut display = MonoTermDisplay::new()?;
    let mut interpreter = Chip8Interpreter::new(&mut display, &mut input, &config);
    interpreter.load_program(&program)?;
    Scheduler::new(interpreter, pacer, config.cycles_per_frame).run()
}

/// stderr shares the terminal with the display, so a log file can be named
fn init_logging(cli: &Cli) -> Result<(), io::Error> {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if let Some(path) = &cli.log_file {
        builder.target(env_logger::Target::Pipe(Box::new(File::create(path)?)));
    }
    builder.init();
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(e) = init_logging(&cli) {
        eprintln!("chip8-tty: cannot open log file: {}", e);
        return ExitCode::FAILURE;
    }
    terminal::install_cleanup_hook();

    // terminal state is restored by the time run() returns
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("chip8-tty: {}", e);
            ExitCode::FAILURE
        }
    }
}
