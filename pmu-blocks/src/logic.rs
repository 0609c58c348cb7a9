//! Boolean and comparison primitives
//!
//! Channel values are plain `i32`: zero is false, anything else is true.
//! All functions return 0 or 1. Multi-input gates look at no more than
//! [`MAX_INPUTS`] values; an empty input list evaluates to 0.

/// Maximum inputs for a multi-input gate
pub const MAX_INPUTS: usize = 8;

#[inline]
const fn truthy(v: i32) -> bool {
    v != 0
}

#[inline]
const fn from_bool(b: bool) -> i32 {
    b as i32
}

fn bounded(inputs: &[i32]) -> &[i32] {
    &inputs[..inputs.len().min(MAX_INPUTS)]
}

/// True iff every input is non-zero
pub fn and(inputs: &[i32]) -> i32 {
    let inputs = bounded(inputs);
    from_bool(!inputs.is_empty() && inputs.iter().all(|&v| truthy(v)))
}

/// True iff at least one input is non-zero
pub fn or(inputs: &[i32]) -> i32 {
    from_bool(bounded(inputs).iter().any(|&v| truthy(v)))
}

/// True iff an odd number of inputs are non-zero
pub fn xor(inputs: &[i32]) -> i32 {
    let count = bounded(inputs).iter().filter(|&&v| truthy(v)).count();
    from_bool(count % 2 == 1)
}

pub fn nand(inputs: &[i32]) -> i32 {
    if bounded(inputs).is_empty() {
        return 0;
    }
    1 - and(inputs)
}

pub fn nor(inputs: &[i32]) -> i32 {
    if bounded(inputs).is_empty() {
        return 0;
    }
    1 - or(inputs)
}

#[inline]
pub fn is_true(v: i32) -> i32 {
    from_bool(truthy(v))
}

#[inline]
pub fn is_false(v: i32) -> i32 {
    from_bool(!truthy(v))
}

#[inline]
pub fn gt(a: i32, b: i32) -> i32 {
    from_bool(a > b)
}

#[inline]
pub fn gte(a: i32, b: i32) -> i32 {
    from_bool(a >= b)
}

#[inline]
pub fn lt(a: i32, b: i32) -> i32 {
    from_bool(a < b)
}

#[inline]
pub fn lte(a: i32, b: i32) -> i32 {
    from_bool(a <= b)
}

#[inline]
pub fn eq(a: i32, b: i32) -> i32 {
    from_bool(a == b)
}

#[inline]
pub fn neq(a: i32, b: i32) -> i32 {
    from_bool(a != b)
}

/// Inclusive range check: `min <= value <= max`
#[inline]
pub fn in_range(value: i32, min: i32, max: i32) -> i32 {
    from_bool(value >= min && value <= max)
}

/// Complement of [`in_range`]
#[inline]
pub fn outside_range(value: i32, min: i32, max: i32) -> i32 {
    1 - in_range(value, min, max)
}

/// Logic channel operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LogicOp {
    And,
    Or,
    Xor,
    Nand,
    Nor,
    IsTrue,
    IsFalse,
    Gt,
    Gte,
    Lt,
    Lte,
    Eq,
    Neq,
    InRange,
    OutsideRange,
}

impl LogicOp {
    /// Decode from the wire operation code
    pub const fn from_code(code: u8) -> Option<Self> {
        Some(match code {
            0 => Self::And,
            1 => Self::Or,
            2 => Self::Xor,
            3 => Self::Nand,
            4 => Self::Nor,
            5 => Self::IsTrue,
            6 => Self::IsFalse,
            7 => Self::Gt,
            8 => Self::Gte,
            9 => Self::Lt,
            10 => Self::Lte,
            11 => Self::Eq,
            12 => Self::Neq,
            13 => Self::InRange,
            14 => Self::OutsideRange,
            _ => return None,
        })
    }

    /// Fewest connected inputs the operation needs to be meaningful
    ///
    /// Gates need two inputs; single-input comparisons compare against the
    /// configured constant; range checks need value, low and high.
    pub const fn min_inputs(self) -> usize {
        match self {
            Self::And | Self::Or | Self::Xor | Self::Nand | Self::Nor => 2,
            Self::InRange | Self::OutsideRange => 3,
            _ => 1,
        }
    }

    /// Evaluate the operation
    ///
    /// Comparisons use `inputs[0]` vs `inputs[1]` when two inputs are
    /// present, otherwise `inputs[0]` vs `compare`. Missing inputs read 0.
    pub fn apply(self, inputs: &[i32], compare: i32) -> i32 {
        let at = |i: usize| inputs.get(i).copied().unwrap_or(0);
        let rhs = if inputs.len() >= 2 { at(1) } else { compare };

        match self {
            Self::And => and(inputs),
            Self::Or => or(inputs),
            Self::Xor => xor(inputs),
            Self::Nand => nand(inputs),
            Self::Nor => nor(inputs),
            Self::IsTrue => is_true(at(0)),
            Self::IsFalse => is_false(at(0)),
            Self::Gt => gt(at(0), rhs),
            Self::Gte => gte(at(0), rhs),
            Self::Lt => lt(at(0), rhs),
            Self::Lte => lte(at(0), rhs),
            Self::Eq => eq(at(0), rhs),
            Self::Neq => neq(at(0), rhs),
            Self::InRange if inputs.len() >= 3 => in_range(at(0), at(1), at(2)),
            Self::OutsideRange if inputs.len() >= 3 => outside_range(at(0), at(1), at(2)),
            Self::InRange | Self::OutsideRange => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gates() {
        assert_eq!(and(&[1, 5, -3]), 1);
        assert_eq!(and(&[1, 0]), 0);
        assert_eq!(or(&[0, 0, 7]), 1);
        assert_eq!(or(&[0, 0]), 0);
        assert_eq!(nand(&[1, 1]), 0);
        assert_eq!(nor(&[0, 0]), 1);
    }

    #[test]
    fn test_xor_counts_odd_inputs() {
        assert_eq!(xor(&[1, 0]), 1);
        assert_eq!(xor(&[1, 1]), 0);
        assert_eq!(xor(&[1, 1, 1]), 1);
        assert_eq!(xor(&[2, -2, 9, 0]), 1);
    }

    #[test]
    fn test_empty_inputs_are_false() {
        assert_eq!(and(&[]), 0);
        assert_eq!(or(&[]), 0);
        assert_eq!(xor(&[]), 0);
        assert_eq!(nand(&[]), 0);
        assert_eq!(nor(&[]), 0);
    }

    #[test]
    fn test_only_first_eight_inputs_count() {
        // Ninth input is ignored
        assert_eq!(and(&[1, 1, 1, 1, 1, 1, 1, 1, 0]), 1);
    }

    #[test]
    fn test_ranges_inclusive() {
        assert_eq!(in_range(10, 10, 20), 1);
        assert_eq!(in_range(20, 10, 20), 1);
        assert_eq!(in_range(21, 10, 20), 0);
        assert_eq!(outside_range(9, 10, 20), 1);
        assert_eq!(outside_range(15, 10, 20), 0);
    }

    #[test]
    fn test_op_compare_against_constant() {
        assert_eq!(LogicOp::Gt.apply(&[50], 40), 1);
        assert_eq!(LogicOp::Gt.apply(&[50, 60], 40), 0);
        assert_eq!(LogicOp::Eq.apply(&[7], 7), 1);
        assert_eq!(LogicOp::InRange.apply(&[5, 0, 10], 0), 1);
        assert_eq!(LogicOp::InRange.apply(&[5, 0], 0), 0);
    }

    #[test]
    fn test_op_codes() {
        for code in 0..15 {
            assert!(LogicOp::from_code(code).is_some());
        }
        assert_eq!(LogicOp::from_code(15), None);
        assert_eq!(LogicOp::And.min_inputs(), 2);
        assert_eq!(LogicOp::IsTrue.min_inputs(), 1);
    }
}
