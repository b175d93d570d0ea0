//! Hierarchical periodic rest schedule for long tile batches
//!
//! Ordinary pacing sleeps between every unit; on top of that, tile jobs
//! take an exponentially-rarer extended rest so a long batch never settles
//! into a perfectly regular request pattern. Every `5^L` completed API
//! calls (for levels L up to the configured maximum) the job rests for a
//! random duration drawn uniformly from `[2^(L-1), 2^L)` seconds, where L
//! is the highest level whose modulus divides the running call count.

use rand::Rng;
use std::time::Duration;

/// Calls per rest level: level L rests every `5^L` calls.
pub const REST_COUNT_PER_LVL: u64 = 5;

/// Default highest rest level.
pub const REST_LVLS: u32 = 3;

/// Rest schedule keyed by a running count of completed API calls.
#[derive(Debug, Clone, Copy)]
pub struct RestSchedule {
    base: u64,
    max_level: u32,
}

impl Default for RestSchedule {
    fn default() -> Self {
        Self::new(REST_COUNT_PER_LVL, REST_LVLS)
    }
}

impl RestSchedule {
    pub fn new(base: u64, max_level: u32) -> Self {
        debug_assert!(base > 1);
        Self { base, max_level }
    }

    /// The highest level whose modulus divides `completed_calls`, or None
    /// when no rest is due. Call count zero never rests.
    pub fn level_for(&self, completed_calls: u64) -> Option<u32> {
        if completed_calls == 0 {
            return None;
        }
        // Scan one past the configured maximum, matching the original
        // schedule's widest stride.
        let mut level = self.max_level + 1;
        while level > 0 {
            if completed_calls % self.base.pow(level) == 0 {
                return Some(level);
            }
            level -= 1;
        }
        None
    }

    /// Rest duration due after `completed_calls` API calls, if any:
    /// uniform in `[2^(L-1), 2^L)` seconds for the level L found.
    pub fn rest_after(&self, completed_calls: u64) -> Option<Duration> {
        let level = self.level_for(completed_calls)?;
        let low = 2f64.powi(level as i32 - 1);
        let high = 2f64.powi(level as i32);
        let secs = rand::thread_rng().gen_range(low..high);
        Some(Duration::from_secs_f64(secs))
    }
}
