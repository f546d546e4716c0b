//! Decision-loop time model.
//!
//! # Design
//!
//! The external traffic simulator owns simulated time (seconds, reported as
//! `f64`).  The decision engine only counts the simulator steps it has
//! driven, as a monotonically increasing `Tick`.  Agents reevaluate their
//! rule on every tick that is a multiple of the reevaluation interval
//! (5 by default), including tick 0.
//!
//! Keeping the step counter integral means the "is this a decision tick?"
//! test is exact and independent of the simulator's step length.

use std::fmt;

// ── Tick ─────────────────────────────────────────────────────────────────────

/// An absolute count of simulator steps driven by the engine in this run.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tick(pub u64);

impl Tick {
    pub const ZERO: Tick = Tick(0);

    /// Return the tick `n` steps after `self`.
    #[inline]
    pub fn offset(self, n: u64) -> Tick {
        Tick(self.0 + n)
    }

    /// `true` if this tick falls on a multiple of `interval`.
    ///
    /// An interval of 0 never matches.
    #[inline]
    pub fn is_multiple_of(self, interval: u64) -> bool {
        interval != 0 && self.0 % interval == 0
    }
}

impl std::ops::Add<u64> for Tick {
    type Output = Tick;
    #[inline]
    fn add(self, rhs: u64) -> Tick {
        Tick(self.0 + rhs)
    }
}

impl std::ops::Sub for Tick {
    type Output = u64;
    #[inline]
    fn sub(self, rhs: Tick) -> u64 {
        self.0 - rhs.0
    }
}

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{}", self.0)
    }
}

// ── SimClock ──────────────────────────────────────────────────────────────────

/// Step counter plus the reevaluation cadence for one simulation run.
///
/// `SimClock` is cheap to copy and holds no heap data.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimClock {
    /// Agents reevaluate every `reevaluation_interval` steps.
    pub reevaluation_interval: u64,
    /// The current tick, advanced by `SimClock::advance()` after each step.
    pub current_tick: Tick,
    /// Number of reevaluation ticks seen so far.
    pub decisions: u64,
}

impl SimClock {
    pub fn new(reevaluation_interval: u64) -> Self {
        Self {
            reevaluation_interval,
            current_tick: Tick::ZERO,
            decisions:    0,
        }
    }

    /// Advance the clock by one simulator step.
    #[inline]
    pub fn advance(&mut self) {
        self.current_tick = Tick(self.current_tick.0 + 1);
    }

    /// `true` if agents reevaluate on the current tick.
    #[inline]
    pub fn is_reevaluation_tick(&self) -> bool {
        self.current_tick.is_multiple_of(self.reevaluation_interval)
    }

    /// Number of steps until the next reevaluation tick (0 if this is one).
    pub fn steps_until_reevaluation(&self) -> u64 {
        if self.reevaluation_interval == 0 {
            return u64::MAX;
        }
        let rem = self.current_tick.0 % self.reevaluation_interval;
        if rem == 0 { 0 } else { self.reevaluation_interval - rem }
    }
}

impl fmt::Display for SimClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} decisions)", self.current_tick, self.decisions)
    }
}
