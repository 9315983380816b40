//! Cosmetic progress meter shown while a run is pending.
//!
//! The value has no relation to real transfer progress. It climbs in fixed
//! steps toward a ceiling below 100 and only reaches 100 on success.

use std::time::Duration;

pub const PROGRESS_START: u8 = 8;
pub const PROGRESS_STEP: u8 = 11;
pub const PROGRESS_CEILING: u8 = 90;
pub const PROGRESS_TICK: Duration = Duration::from_millis(220);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProgressMeter {
    value: u8,
}

impl ProgressMeter {
    pub fn value(&self) -> u8 {
        self.value
    }

    pub fn start(&mut self) -> u8 {
        self.value = PROGRESS_START;
        self.value
    }

    /// Advance one step. Never decreases and never exceeds the ceiling.
    pub fn tick(&mut self) -> u8 {
        self.value = self
            .value
            .saturating_add(PROGRESS_STEP)
            .min(PROGRESS_CEILING)
            .max(self.value);
        self.value
    }

    pub fn complete(&mut self) -> u8 {
        self.value = 100;
        self.value
    }

    pub fn reset(&mut self) -> u8 {
        self.value = 0;
        self.value
    }
}
