//! Hysteresis comparators
//!
//! - [`HysteresisState`]: two-threshold Schmitt trigger
//! - [`WindowState`]: inside/outside a band, with widened exit bounds
//! - [`MultiLevelState`]: ladder of up/down thresholds

/// Maximum number of thresholds in a multi-level ladder
pub const MAX_LEVELS: usize = 8;

/// Hysteresis channel type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HysteresisKind {
    Simple,
    Window,
    MultiLevel,
}

impl HysteresisKind {
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::Simple),
            1 => Some(Self::Window),
            2 => Some(Self::MultiLevel),
            _ => None,
        }
    }
}

/// Two-threshold comparator state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct HysteresisState {
    output: bool,
    initialized: bool,
}

impl HysteresisState {
    pub const fn new() -> Self {
        Self {
            output: false,
            initialized: false,
        }
    }

    /// Output 1 at or above `high`, 0 at or below `low`, hold in between
    ///
    /// The very first sample is compared against the midpoint of the two
    /// thresholds instead, so the comparator starts in a defined state.
    pub fn update(&mut self, input: i32, high: i32, low: i32) -> i32 {
        if !self.initialized {
            let midpoint = (high as i64 + low as i64) / 2;
            self.output = input as i64 >= midpoint;
            self.initialized = true;
        } else if input >= high {
            self.output = true;
        } else if input <= low {
            self.output = false;
        }
        self.output as i32
    }
}

/// Window comparator state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct WindowState {
    inside: bool,
    initialized: bool,
}

impl WindowState {
    pub const fn new() -> Self {
        Self {
            inside: false,
            initialized: false,
        }
    }

    /// Output 1 while `input` is inside `[low, high]`
    ///
    /// Once inside, the output holds until the input leaves
    /// `[low - hyst, high + hyst]`; from outside it has to enter
    /// `[low + hyst, high - hyst]`. The first sample uses the plain window.
    pub fn update(&mut self, input: i32, low: i32, high: i32, hyst: i32) -> i32 {
        let (input, low, high, hyst) = (input as i64, low as i64, high as i64, hyst as i64);
        self.inside = if !self.initialized {
            self.initialized = true;
            input >= low && input <= high
        } else if self.inside {
            input >= low - hyst && input <= high + hyst
        } else {
            input >= low + hyst && input <= high - hyst
        };
        self.inside as i32
    }
}

/// Multi-level comparator state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MultiLevelState {
    level: u8,
}

impl MultiLevelState {
    pub const fn new() -> Self {
        Self { level: 0 }
    }

    pub fn level(&self) -> i32 {
        self.level as i32
    }

    /// Move through the ladder and return the current level (0..=count)
    ///
    /// `up[i]` is the threshold to climb from level `i` to `i + 1`;
    /// `down[i]` the threshold to fall from `i + 1` back to `i`. Several
    /// steps can be taken in one update.
    pub fn update(&mut self, input: i32, up: &[i32], down: &[i32]) -> i32 {
        let count = up.len().min(down.len()).min(MAX_LEVELS);
        let mut level = (self.level as usize).min(count);

        while level < count && input >= up[level] {
            level += 1;
        }
        while level > 0 && input <= down[level - 1] {
            level -= 1;
        }

        self.level = level as u8;
        self.level()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_hysteresis() {
        let mut h = HysteresisState::new();
        assert_eq!(h.update(50, 80, 20), 1);
        assert_eq!(h.update(30, 80, 20), 1);
        assert_eq!(h.update(20, 80, 20), 0);
        assert_eq!(h.update(79, 80, 20), 0);
        assert_eq!(h.update(80, 80, 20), 1);
    }

    #[test]
    fn test_simple_initial_below_midpoint() {
        let mut h = HysteresisState::new();
        assert_eq!(h.update(49, 80, 20), 0);
    }

    #[test]
    fn test_window() {
        let mut w = WindowState::new();
        assert_eq!(w.update(5, 10, 20, 2), 0);
        // Must reach low + hyst to enter
        assert_eq!(w.update(11, 10, 20, 2), 0);
        assert_eq!(w.update(12, 10, 20, 2), 1);
        // Exit only beyond high + hyst
        assert_eq!(w.update(22, 10, 20, 2), 1);
        assert_eq!(w.update(23, 10, 20, 2), 0);
    }

    #[test]
    fn test_window_first_sample_plain() {
        let mut w = WindowState::new();
        assert_eq!(w.update(10, 10, 20, 5), 1);
    }

    #[test]
    fn test_multi_level_jumps() {
        let up = [10, 20, 30];
        let down = [5, 15, 25];
        let mut m = MultiLevelState::new();
        assert_eq!(m.update(0, &up, &down), 0);
        assert_eq!(m.update(35, &up, &down), 3);
        assert_eq!(m.update(26, &up, &down), 3);
        assert_eq!(m.update(25, &up, &down), 2);
        assert_eq!(m.update(0, &up, &down), 0);
        assert_eq!(m.update(12, &up, &down), 1);
    }

    #[test]
    fn test_multi_level_empty_ladder() {
        let mut m = MultiLevelState::new();
        assert_eq!(m.update(1000, &[], &[]), 0);
    }
}
