//! Frame pacing.
//!
//! The interpreter runs a batch of instructions per 60Hz frame and then
//! idles for the rest of the frame. Idling is either a sleep to the next
//! frame deadline, or a busy loop whose length is calibrated once at startup
//! against whatever clock the host offers.

use std::hint::black_box;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use crate::config::Pacing;

pub const FRAMES_PER_SECOND: u64 = 60;

/// first calibration attempt; grows tenfold while the clock can't see it
pub const CALIBRATION_START_ITERATIONS: u64 = 100_000;

/// fixed per-frame loop overhead taken off the idle count
pub const FRAME_OVERHEAD_ITERATIONS: u64 = 100;

const CLOCK_PROBE_SPINS: u32 = 10_000_000;

/// A millisecond clock. Readings only need to be comparable with each
/// other, not with wall time.
pub trait Clock {
    fn now_millis(&self) -> u64;
}

/// preferred clock: monotonic, millisecond resolution
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        MonotonicClock {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now_millis(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }
}

/// fallback clock with whole-second resolution; calibration against it is
/// coarse
pub struct WallClock;

impl Clock for WallClock {
    fn now_millis(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs() * 1000)
            .unwrap_or(0)
    }
}

/// the monotonic clock if it can be seen to advance, else the wall clock
pub fn detect_clock() -> Box<dyn Clock> {
    let probe = Instant::now();
    for _ in 0..CLOCK_PROBE_SPINS {
        if probe.elapsed() > Duration::ZERO {
            return Box::new(MonotonicClock::new());
        }
    }
    log::warn!("monotonic clock does not advance; pacing falls back to a whole-second clock");
    Box::new(WallClock)
}

/// spin for the given number of no-op iterations
pub fn busy_loop(iterations: u64) {
    for i in 0..iterations {
        black_box(i);
    }
}

/// how many busy-loop iterations fill one frame, net of the instructions
/// executed in it
pub fn calibrate(clock: &dyn Clock, cycles_per_frame: u32) -> u64 {
    calibrate_with(clock, cycles_per_frame, busy_loop)
}

fn calibrate_with(clock: &dyn Clock, cycles_per_frame: u32, mut spin: impl FnMut(u64)) -> u64 {
    let mut iterations = CALIBRATION_START_ITERATIONS;
    let elapsed_ms = loop {
        let start = clock.now_millis();
        spin(iterations);
        let elapsed = clock.now_millis().saturating_sub(start);
        if elapsed > 0 {
            break elapsed;
        }
        iterations = iterations.saturating_mul(10);
    };

    let per_frame = iterations as u128 * 1000 / (elapsed_ms as u128 * FRAMES_PER_SECOND as u128);
    let per_frame = u64::try_from(per_frame).unwrap_or(u64::MAX);
    let idle = per_frame
        .saturating_sub(cycles_per_frame as u64)
        .saturating_sub(FRAME_OVERHEAD_ITERATIONS);
    log::info!(
        "calibrated {} iterations in {}ms; idling {} iterations per frame",
        iterations,
        elapsed_ms,
        idle
    );
    idle
}

/// Idles out the remainder of each frame.
#[derive(Debug)]
pub enum Pacer {
    /// sleep to a deadline one frame after the previous one
    Sleep { frame: Duration, deadline: Instant },
    /// fixed-length busy loop, calibrated once
    BusyLoop { idle_iterations: u64 },
}

impl Pacer {
    pub fn sleep() -> Self {
        let frame = Duration::from_nanos(1_000_000_000 / FRAMES_PER_SECOND);
        Pacer::Sleep {
            frame,
            deadline: Instant::now() + frame,
        }
    }

    pub fn busy_loop(clock: &dyn Clock, cycles_per_frame: u32) -> Self {
        Pacer::BusyLoop {
            idle_iterations: calibrate(clock, cycles_per_frame),
        }
    }

    pub fn for_pacing(pacing: Pacing, cycles_per_frame: u32) -> Self {
        match pacing {
            Pacing::Sleep => Pacer::sleep(),
            Pacing::BusyLoop => Pacer::busy_loop(detect_clock().as_ref(), cycles_per_frame),
        }
    }

    /// wait out the rest of the current frame
    pub fn idle(&mut self) {
        match self {
            Pacer::Sleep { frame, deadline } => {
                let now = Instant::now();
                if *deadline > now {
                    spin_sleep::sleep(*deadline - now);
                    *deadline += *frame;
                } else if now - *deadline > *frame {
                    // too far behind to catch up; don't burst
                    *deadline = now + *frame;
                } else {
                    *deadline += *frame;
                }
            }
            Pacer::BusyLoop { idle_iterations } => busy_loop(*idle_iterations),
        }
    }
}
