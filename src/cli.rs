use chip8_tty::config::{Config, Pacing, Quirks, DEFAULT_CYCLES_PER_FRAME};
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "chip8-tty",
    about = "Run a CHIP-8 program in the terminal",
    long_about = "Runs a CHIP-8 program in the terminal at 60 frames a second.\n\
                  Keys 1234/qwer/asdf/zxcv form the hex keypad; ESC exits.\n\
                  A ROM named *.l, *.s, *.sl or *.ls turns on the matching quirks.\n\
                  Logging (RUST_LOG) goes to stderr, which shares the screen;\n\
                  use --log-file or redirect stderr to keep the display clean.",
    version
)]
pub struct Cli {
    /// Program image to run
    pub rom: PathBuf,

    /// Instructions executed per 60Hz frame
    #[arg(short, long, default_value_t = DEFAULT_CYCLES_PER_FRAME,
          value_parser = clap::value_parser!(u32).range(1..))]
    pub cycles: u32,

    /// Shifts operate on VX in place
    #[arg(long)]
    pub lsq: bool,

    /// FX55/FX65 leave I unchanged
    #[arg(long)]
    pub stq: bool,

    /// OR/AND/XOR reset VF
    #[arg(long)]
    pub vip: bool,

    /// BNNN jumps relative to VX instead of V0
    #[arg(long)]
    pub jmp: bool,

    /// Carry-flag write ordering (no observable effect)
    #[arg(long)]
    pub cry: bool,

    /// Seed for the random number instruction
    #[arg(long)]
    pub seed: Option<u64>,

    /// Pace frames with a calibrated busy loop instead of sleeping
    #[arg(long)]
    pub busy_wait: bool,

    /// Write log output to this file instead of stderr
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    pub fn config(&self) -> Config {
        let explicit = Quirks {
            lsq: self.lsq,
            stq: self.stq,
            vip: self.vip,
            jmp: self.jmp,
            cry: self.cry,
        };
        Config {
            cycles_per_frame: self.cycles,
            quirks: explicit.union(Quirks::from_rom_name(&self.rom)),
            pacing: if self.busy_wait {
                Pacing::BusyLoop
            } else {
                Pacing::Sleep
            },
            seed: self.seed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["chip8-tty", "roms/pong.ch8"]).unwrap();
        assert_eq!(
            cli.config(),
            Config {
                cycles_per_frame: 20,
                ..Config::default()
            }
        );
    }

    #[test]
    fn test_flags() {
        let cli = Cli::try_parse_from([
            "chip8-tty",
            "-c",
            "50",
            "--vip",
            "--jmp",
            "--seed",
            "7",
            "--busy-wait",
            "blinky.ch8",
        ])
        .unwrap();
        let config = cli.config();
        assert_eq!(config.cycles_per_frame, 50);
        assert!(config.quirks.vip && config.quirks.jmp);
        assert!(!config.quirks.lsq);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.pacing, Pacing::BusyLoop);
        assert_eq!(cli.log_file, None);
    }

    #[test]
    fn test_log_file() {
        let cli =
            Cli::try_parse_from(["chip8-tty", "--log-file", "trace.log", "pong.ch8"]).unwrap();
        assert_eq!(cli.log_file, Some(PathBuf::from("trace.log")));
        assert_eq!(cli.rom, PathBuf::from("pong.ch8"));
    }

    #[test]
    fn test_suffix_adds_quirks() {
        let cli = Cli::try_parse_from(["chip8-tty", "--cry", "roms/invaders.sl"]).unwrap();
        let quirks = cli.config().quirks;
        assert!(quirks.lsq && quirks.stq && quirks.cry);
    }

    #[test]
    fn test_rejects_zero_cycles() {
        assert!(Cli::try_parse_from(["chip8-tty", "-c", "0", "pong.ch8"]).is_err());
    }
}
