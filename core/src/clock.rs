//! Simulation clock: the tick counter and its mapping to simulated time.

use crate::types::{SimTime, Tick};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimClock {
    current_tick:  Tick,
    tick_duration: SimTime,
}

impl SimClock {
    pub fn new(tick_duration: SimTime) -> Self {
        Self {
            current_tick: 0,
            tick_duration,
        }
    }

    /// Advance one tick. Returns the new tick number.
    pub fn advance(&mut self) -> Tick {
        self.current_tick += 1;
        self.current_tick
    }

    pub fn current_tick(&self) -> Tick {
        self.current_tick
    }

    /// Simulated time at the current tick.
    ///
    /// Derived from the integer tick rather than accumulated, so two clocks
    /// at the same tick always report bit-identical times.
    pub fn time(&self) -> SimTime {
        self.current_tick as SimTime * self.tick_duration
    }

    pub fn reset(&mut self) {
        self.current_tick = 0;
    }
}
