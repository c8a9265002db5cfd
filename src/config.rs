use std::path::Path;

pub const DEFAULT_CYCLES_PER_FRAME: u32 = 20;

/// Behavioural variants needed by different generations of CHIP-8 software.
/// Fixed for the lifetime of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Quirks {
    /// shifts operate on VX in place rather than reading VY
    pub lsq: bool,
    /// FX55/FX65 leave I untouched
    pub stq: bool,
    /// 8XY1/8XY2/8XY3 reset VF
    pub vip: bool,
    /// BNNN jumps relative to VX (X taken from the address) instead of V0
    pub jmp: bool,
    /// flag/destination write ordering; no observable effect
    pub cry: bool,
}

impl Quirks {
    /// quirks implied by the ROM filename: `.l`, `.s`, `.sl` or `.ls`
    pub fn from_rom_name(path: &Path) -> Self {
        let suffix = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .unwrap_or_default();
        match suffix.as_str() {
            "l" => Quirks {
                lsq: true,
                ..Quirks::default()
            },
            "s" => Quirks {
                stq: true,
                ..Quirks::default()
            },
            "sl" | "ls" => Quirks {
                lsq: true,
                stq: true,
                ..Quirks::default()
            },
            _ => Quirks::default(),
        }
    }

    /// a quirk is on if either side turns it on
    pub fn union(self, other: Quirks) -> Self {
        Quirks {
            lsq: self.lsq || other.lsq,
            stq: self.stq || other.stq,
            vip: self.vip || other.vip,
            jmp: self.jmp || other.jmp,
            cry: self.cry || other.cry,
        }
    }
}

/// How the scheduler idles between frames.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Pacing {
    /// sleep until the next frame deadline
    #[default]
    Sleep,
    /// burn a calibrated number of no-op iterations per frame
    BusyLoop,
}

/// Startup configuration, immutable for the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub cycles_per_frame: u32,
    pub quirks: Quirks,
    pub pacing: Pacing,
    /// seed for CXNN; entropy when absent
    pub seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            cycles_per_frame: DEFAULT_CYCLES_PER_FRAME,
            quirks: Quirks::default(),
            pacing: Pacing::default(),
            seed: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_suffix_no_quirks() {
        assert_eq!(Quirks::from_rom_name(Path::new("roms/pong.ch8")), Quirks::default());
        assert_eq!(Quirks::from_rom_name(Path::new("pong")), Quirks::default());
    }

    #[test]
    fn test_suffix_quirks() {
        let l = Quirks::from_rom_name(Path::new("roms/blitz.l"));
        assert!(l.lsq && !l.stq);
        let s = Quirks::from_rom_name(Path::new("roms/blitz.S"));
        assert!(s.stq && !s.lsq);
        for name in ["invaders.sl", "invaders.ls"] {
            let q = Quirks::from_rom_name(Path::new(name));
            assert!(q.lsq && q.stq);
            assert!(!q.vip && !q.jmp && !q.cry);
        }
    }

    #[test]
    fn test_union() {
        let explicit = Quirks {
            vip: true,
            ..Quirks::default()
        };
        let q = explicit.union(Quirks::from_rom_name(Path::new("x.l")));
        assert!(q.vip && q.lsq && !q.stq);
    }

    #[test]
    fn test_default_config() {
        let c = Config::default();
        assert_eq!(c.cycles_per_frame, 20);
        assert_eq!(c.pacing, Pacing::Sleep);
        assert_eq!(c.quirks, Quirks::default());
    }
}
