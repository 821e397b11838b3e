//! Cycle bookkeeping.
//!
//! The core never paces itself. It only counts; the host turns the counts
//! into audio/video timing.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Clock {
    total: u64,
    last_step: u32,
    instructions: u64,
}

impl Clock {
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Cycles of the most recent instruction or interrupt entry.
    pub fn last_step(&self) -> u32 {
        self.last_step
    }

    pub fn instructions(&self) -> u64 {
        self.instructions
    }

    pub(crate) fn record(&mut self, cycles: u32, instruction: bool) {
        self.total = self.total.wrapping_add(cycles as u64);
        self.last_step = cycles;
        if instruction {
            self.instructions += 1;
        }
    }
}

/// Running cycle credit for a host loop.
///
/// The host adds the cycles of one frame (or audio chunk) and steps the
/// CPU while credit remains. An instruction that overshoots leaves the
/// credit negative, and the next `add` pays that back.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleBudget {
    credit: i64,
}

impl CycleBudget {
    pub fn new(cycles: u64) -> Self {
        CycleBudget {
            credit: cycles as i64,
        }
    }

    pub fn add(&mut self, cycles: u64) {
        self.credit += cycles as i64;
    }

    pub fn spend(&mut self, cycles: u32) {
        self.credit -= cycles as i64;
    }

    pub fn has_credit(&self) -> bool {
        self.credit > 0
    }

    pub fn credit(&self) -> i64 {
        self.credit
    }
}
