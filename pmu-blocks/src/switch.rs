//! Selectors and multiplexers

/// Pick `values[selector]`, with the selector clamped to the valid range
///
/// An empty value list yields 0.
pub fn select(values: &[i32], selector: i32) -> i32 {
    if values.is_empty() {
        return 0;
    }
    let last = values.len() - 1;
    let index = if selector < 0 {
        0
    } else {
        (selector as usize).min(last)
    };
    values[index]
}

/// Result paired with the first case value equal to `input`, else `default`
pub fn case(input: i32, cases: &[i32], results: &[i32], default: i32) -> i32 {
    cases
        .iter()
        .zip(results.iter())
        .find(|&(&c, _)| c == input)
        .map_or(default, |(_, &r)| r)
}

/// Result paired with the last threshold `<= input`
///
/// Thresholds must be ascending. An input below the first threshold yields
/// `default`.
pub fn range_case(input: i32, thresholds: &[i32], results: &[i32], default: i32) -> i32 {
    let mut out = default;
    for (&t, &r) in thresholds.iter().zip(results.iter()) {
        if t > input {
            break;
        }
        out = r;
    }
    out
}

/// Value paired with the first non-zero condition, else `default`
pub fn mux(conditions: &[i32], values: &[i32], default: i32) -> i32 {
    conditions
        .iter()
        .zip(values.iter())
        .find(|&(&c, _)| c != 0)
        .map_or(default, |(_, &v)| v)
}

/// Index of the first non-zero input, or -1 if all are zero
pub fn priority(inputs: &[i32]) -> i32 {
    inputs
        .iter()
        .position(|&v| v != 0)
        .map_or(-1, |i| i as i32)
}

/// Switch channel mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SwitchMode {
    /// Input is an index into the result list
    Select,
    /// Exact match against case values
    Case,
    /// Ascending thresholds, last one at or below the input wins
    Range,
}

impl SwitchMode {
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::Select),
            1 => Some(Self::Case),
            2 => Some(Self::Range),
            _ => None,
        }
    }

    /// Evaluate the switch for `input`
    pub fn apply(self, input: i32, cases: &[i32], results: &[i32], default: i32) -> i32 {
        match self {
            Self::Select => select(results, input),
            Self::Case => case(input, cases, results, default),
            Self::Range => range_case(input, cases, results, default),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_clamps() {
        let values = [10, 20, 30];
        assert_eq!(select(&values, 1), 20);
        assert_eq!(select(&values, -4), 10);
        assert_eq!(select(&values, 99), 30);
        assert_eq!(select(&[], 0), 0);
    }

    #[test]
    fn test_case_first_match() {
        let cases = [1, 2, 2];
        let results = [100, 200, 300];
        assert_eq!(case(2, &cases, &results, -1), 200);
        assert_eq!(case(5, &cases, &results, -1), -1);
    }

    #[test]
    fn test_range_case() {
        let thresholds = [0, 100, 200];
        let results = [1, 2, 3];
        assert_eq!(range_case(-1, &thresholds, &results, 0), 0);
        assert_eq!(range_case(0, &thresholds, &results, 0), 1);
        assert_eq!(range_case(150, &thresholds, &results, 0), 2);
        assert_eq!(range_case(5000, &thresholds, &results, 0), 3);
    }

    #[test]
    fn test_mux_first_true_wins() {
        assert_eq!(mux(&[0, 1, 1], &[10, 20, 30], 99), 20);
        assert_eq!(mux(&[0, 0], &[10, 20], 99), 99);
    }

    #[test]
    fn test_priority() {
        assert_eq!(priority(&[0, 0, 5, 1]), 2);
        assert_eq!(priority(&[0, 0]), -1);
        assert_eq!(priority(&[]), -1);
    }
}
