//! Timers and the fixed-step accumulator
//!
//! Every timed behaviour in the sim is a plain countdown advanced by the
//! caller's `dt`; nothing suspends.

use serde::{Deserialize, Serialize};

use crate::consts::{MAX_FRAME_DT, MAX_SUBSTEPS, SIM_DT};

/// Remainders below this count as expired. Repeated f32 subtraction of a
/// step that is not a power of two never lands exactly on zero.
const EXPIRY_EPSILON: f32 = 1e-4;

/// A countdown that expires once
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Countdown {
    duration: f32,
    remaining: f32,
}

impl Countdown {
    pub fn start(duration: f32) -> Self {
        let duration = duration.max(0.0);
        Self {
            duration,
            remaining: duration,
        }
    }

    /// Advance by `dt`. Returns true only on the tick the countdown reaches zero.
    pub fn advance(&mut self, dt: f32) -> bool {
        if self.remaining <= 0.0 {
            return false;
        }
        self.remaining -= dt;
        if self.remaining <= EXPIRY_EPSILON {
            self.remaining = 0.0;
        }
        self.remaining <= 0.0
    }

    pub fn remaining(&self) -> f32 {
        self.remaining
    }

    pub fn duration(&self) -> f32 {
        self.duration
    }

    pub fn is_expired(&self) -> bool {
        self.remaining <= 0.0
    }

    /// Remaining fraction: 1.0 when started, 0.0 once expired
    pub fn ratio(&self) -> f32 {
        if self.duration <= 0.0 {
            0.0
        } else {
            (self.remaining / self.duration).clamp(0.0, 1.0)
        }
    }
}

/// Turns variable frame times into a count of fixed physics steps
#[derive(Debug, Clone, Default)]
pub struct FrameClock {
    accumulator: f32,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one frame's elapsed time; returns how many fixed steps to run
    pub fn advance(&mut self, frame_dt: f32) -> u32 {
        self.accumulator += frame_dt.clamp(0.0, MAX_FRAME_DT);

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            self.accumulator -= SIM_DT;
            substeps += 1;
        }
        // Drop the backlog instead of spiralling
        if substeps == MAX_SUBSTEPS {
            self.accumulator = self.accumulator.min(SIM_DT);
        }
        substeps
    }

    /// Leftover time as a fraction of a step (for interpolation)
    pub fn alpha(&self) -> f32 {
        (self.accumulator / SIM_DT).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_countdown_expires_once() {
        let mut timer = Countdown::start(0.5);
        assert_eq!(timer.ratio(), 1.0);
        assert!(!timer.advance(0.25));
        assert_eq!(timer.ratio(), 0.5);
        assert!(timer.advance(0.25));
        assert_eq!(timer.ratio(), 0.0);
        assert!(!timer.advance(0.25));
        assert!(timer.is_expired());
    }

    #[test]
    fn test_countdown_lands_on_exact_tick_at_sim_dt() {
        for (duration, expected) in [(1.0, 50), (0.3, 15), (3.0, 150)] {
            let mut timer = Countdown::start(duration);
            let mut ticks = 0;
            while !timer.advance(SIM_DT) {
                ticks += 1;
                assert!(ticks < 1000);
            }
            assert_eq!(ticks + 1, expected, "duration {duration}");
            assert_eq!(timer.ratio(), 0.0);
        }
    }

    #[test]
    fn test_countdown_zero_duration() {
        let mut timer = Countdown::start(0.0);
        assert!(timer.is_expired());
        assert_eq!(timer.ratio(), 0.0);
        assert!(!timer.advance(1.0));
    }

    #[test]
    fn test_frame_clock_steps() {
        let mut clock = FrameClock::new();
        assert_eq!(clock.advance(SIM_DT * 2.5), 2);
        assert!((clock.alpha() - 0.5).abs() < 1e-3);
        assert_eq!(clock.advance(SIM_DT * 0.6), 1);
    }

    #[test]
    fn test_frame_clock_caps_substeps() {
        let mut clock = FrameClock::new();
        // A huge hitch is clamped to MAX_FRAME_DT
        let steps = clock.advance(10.0);
        assert!((4..=5).contains(&steps));
        assert!(clock.alpha() <= 1.0);
    }
}
