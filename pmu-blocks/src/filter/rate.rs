//! Rate limiter and debounce

use crate::math::saturate;

/// Limit how fast a signal may rise or fall
///
/// Rates are in units per second; a rate of 0 or less leaves that
/// direction unlimited. Any non-zero `dt_ms` allows at least one unit of
/// movement so small rates do not stall on short ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RateLimiterState {
    value: i32,
    initialized: bool,
}

impl RateLimiterState {
    pub const fn new() -> Self {
        Self {
            value: 0,
            initialized: false,
        }
    }

    pub fn update(&mut self, input: i32, rise_rate: i32, fall_rate: i32, dt_ms: u32) -> i32 {
        if !self.initialized {
            self.value = input;
            self.initialized = true;
            return input;
        }
        if dt_ms == 0 {
            return self.value;
        }

        let delta = input as i64 - self.value as i64;
        let step = if delta > 0 {
            delta.min(max_step(rise_rate, dt_ms).unwrap_or(delta))
        } else {
            delta.max(-max_step(fall_rate, dt_ms).unwrap_or(-delta))
        };
        self.value = saturate(self.value as i64 + step);
        self.value
    }
}

/// Largest change allowed in `dt_ms`, or `None` when unlimited
fn max_step(rate: i32, dt_ms: u32) -> Option<i64> {
    if rate <= 0 {
        return None;
    }
    Some((rate as i64 * dt_ms as i64 / 1000).max(1))
}

/// Debounce a value: a change must hold for `debounce_ms` before it is
/// accepted
///
/// With a non-zero `hysteresis`, inputs within that band of the stable
/// value count as "no change" and do not start the debounce clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DebounceState {
    stable: i32,
    pending: i32,
    pending_time_ms: u32,
    initialized: bool,
}

impl DebounceState {
    pub const fn new() -> Self {
        Self {
            stable: 0,
            pending: 0,
            pending_time_ms: 0,
            initialized: false,
        }
    }

    pub fn stable(&self) -> i32 {
        self.stable
    }

    pub fn update(&mut self, input: i32, debounce_ms: u32, hysteresis: u32, dt_ms: u32) -> i32 {
        if !self.initialized {
            self.stable = input;
            self.pending = input;
            self.pending_time_ms = 0;
            self.initialized = true;
            return input;
        }

        let distance = (input as i64 - self.stable as i64).unsigned_abs();
        if hysteresis > 0 && distance <= hysteresis as u64 {
            self.pending = self.stable;
            self.pending_time_ms = 0;
            return self.stable;
        }

        if input != self.pending {
            self.pending = input;
            self.pending_time_ms = 0;
        } else {
            self.pending_time_ms = self.pending_time_ms.saturating_add(dt_ms);
        }

        if self.pending != self.stable && self.pending_time_ms >= debounce_ms {
            self.stable = self.pending;
        }
        self.stable
    }
}
