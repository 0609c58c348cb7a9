//! Up/down counter block
//!
//! Increment, decrement and reset triggers share one [`EdgeMode`]. Reset is
//! evaluated first; a reset tick ignores increment and decrement.

use crate::edge::EdgeMode;

/// Counter parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CounterConfig {
    pub edge_mode: EdgeMode,
    /// Wrap around modulo `max - min + 1` instead of clamping
    pub wrap: bool,
    /// Value after init and after every reset
    pub initial_value: i32,
    pub min: i32,
    pub max: i32,
    pub step: i32,
}

impl Default for CounterConfig {
    fn default() -> Self {
        Self {
            edge_mode: EdgeMode::Rising,
            wrap: false,
            initial_value: 0,
            min: 0,
            max: i32::MAX,
            step: 1,
        }
    }
}

/// Counter runtime state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CounterState {
    value: i32,
    last_inc: bool,
    last_dec: bool,
    last_reset: bool,
}

impl CounterState {
    /// Create a counter holding `initial_value`
    pub const fn new(initial_value: i32) -> Self {
        Self {
            value: initial_value,
            last_inc: false,
            last_dec: false,
            last_reset: false,
        }
    }

    pub fn value(&self) -> i32 {
        self.value
    }

    /// Process one tick of trigger inputs and return the count
    pub fn update(&mut self, config: &CounterConfig, inc: i32, dec: i32, reset: i32) -> i32 {
        let (inc, dec, reset) = (inc != 0, dec != 0, reset != 0);
        let mode = config.edge_mode;
        let inc_fired = mode.qualify(self.last_inc, inc);
        let dec_fired = mode.qualify(self.last_dec, dec);
        let reset_fired = mode.qualify(self.last_reset, reset);
        self.last_inc = inc;
        self.last_dec = dec;
        self.last_reset = reset;

        if reset_fired {
            self.value = config.initial_value;
            return self.value;
        }
        if !inc_fired && !dec_fired {
            return self.value;
        }

        let step = config.step as i64;
        let mut next = self.value as i64;
        if inc_fired {
            next += step;
        }
        if dec_fired {
            next -= step;
        }

        self.value = if config.wrap {
            wrap(next, config.min, config.max)
        } else {
            next.clamp(config.min.min(config.max) as i64, config.max as i64) as i32
        };
        self.value
    }
}

/// Wrap `value` into `[min, max]` modulo the span
fn wrap(value: i64, min: i32, max: i32) -> i32 {
    let span = max as i64 - min as i64 + 1;
    if span <= 0 {
        return min;
    }
    (min as i64 + (value - min as i64).rem_euclid(span)) as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decade(wrap: bool) -> CounterConfig {
        CounterConfig {
            edge_mode: EdgeMode::Rising,
            wrap,
            initial_value: 0,
            min: 0,
            max: 9,
            step: 1,
        }
    }

    /// Pulse the increment input once (rising then falling)
    fn pulse_inc(state: &mut CounterState, cfg: &CounterConfig) -> i32 {
        let v = state.update(cfg, 1, 0, 0);
        state.update(cfg, 0, 0, 0);
        v
    }

    #[test]
    fn test_wrap_ten_increments() {
        let cfg = decade(true);
        let mut counter = CounterState::new(cfg.initial_value);
        let mut last = 0;
        for _ in 0..10 {
            last = pulse_inc(&mut counter, &cfg);
        }
        assert_eq!(last, 0);
        assert_eq!(counter.value(), 0);
    }

    #[test]
    fn test_wrap_below_min() {
        let cfg = decade(true);
        let mut counter = CounterState::new(0);
        assert_eq!(counter.update(&cfg, 0, 1, 0), 9);
    }

    #[test]
    fn test_clamp() {
        let cfg = decade(false);
        let mut counter = CounterState::new(0);
        for _ in 0..20 {
            pulse_inc(&mut counter, &cfg);
        }
        assert_eq!(counter.value(), 9);
        assert_eq!(counter.update(&cfg, 0, 1, 0), 8);
    }

    #[test]
    fn test_edge_mode_ignores_held_input() {
        let cfg = decade(false);
        let mut counter = CounterState::new(0);
        for _ in 0..5 {
            counter.update(&cfg, 1, 0, 0);
        }
        assert_eq!(counter.value(), 1);
    }

    #[test]
    fn test_level_mode_counts_every_tick() {
        let cfg = CounterConfig {
            edge_mode: EdgeMode::Level,
            ..decade(false)
        };
        let mut counter = CounterState::new(0);
        for _ in 0..5 {
            counter.update(&cfg, 1, 0, 0);
        }
        assert_eq!(counter.value(), 5);
    }

    #[test]
    fn test_reset_wins_and_ignores_range() {
        let cfg = CounterConfig {
            initial_value: 50,
            ..decade(false)
        };
        let mut counter = CounterState::new(3);
        // Reset on the same tick as increment
        assert_eq!(counter.update(&cfg, 1, 0, 1), 50);
        assert_eq!(counter.value(), 50);
        // Next increment brings it back into range
        counter.update(&cfg, 0, 0, 0);
        assert_eq!(counter.update(&cfg, 1, 0, 0), 9);
    }

    #[test]
    fn test_wrap_helper() {
        assert_eq!(wrap(10, 0, 9), 0);
        assert_eq!(wrap(-1, 0, 9), 9);
        assert_eq!(wrap(25, -5, 5), 3);
        assert_eq!(wrap(3, 5, 0), 5);
    }
}
