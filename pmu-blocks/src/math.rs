//! Integer arithmetic primitives
//!
//! All operations saturate to the `i32` range instead of wrapping, and
//! division or modulo by zero yields 0. Intermediate products use `i64`,
//! or `i128` where two full-range differences are multiplied.

/// Saturate an `i64` intermediate into the `i32` range
#[inline]
pub const fn saturate(v: i64) -> i32 {
    if v > i32::MAX as i64 {
        i32::MAX
    } else if v < i32::MIN as i64 {
        i32::MIN
    } else {
        v as i32
    }
}

/// Saturate an `i128` intermediate into the `i32` range
#[inline]
pub const fn saturate_wide(v: i128) -> i32 {
    saturate(saturate_i64(v))
}

/// Saturate an `i128` intermediate into the `i64` range
#[inline]
pub const fn saturate_i64(v: i128) -> i64 {
    if v > i64::MAX as i128 {
        i64::MAX
    } else if v < i64::MIN as i128 {
        i64::MIN
    } else {
        v as i64
    }
}

#[inline]
pub fn add(a: i32, b: i32) -> i32 {
    a.saturating_add(b)
}

#[inline]
pub fn sub(a: i32, b: i32) -> i32 {
    a.saturating_sub(b)
}

#[inline]
pub fn mul(a: i32, b: i32) -> i32 {
    a.saturating_mul(b)
}

/// Integer division truncating toward zero; `b == 0` yields 0
#[inline]
pub fn div(a: i32, b: i32) -> i32 {
    if b == 0 {
        return 0;
    }
    // i32::MIN / -1 is the only overflowing case
    saturate(a as i64 / b as i64)
}

/// Remainder with the sign of `a`; `b == 0` yields 0
#[inline]
pub fn modulo(a: i32, b: i32) -> i32 {
    if b == 0 {
        return 0;
    }
    (a as i64 % b as i64) as i32
}

#[inline]
pub fn abs(a: i32) -> i32 {
    a.saturating_abs()
}

#[inline]
pub fn neg(a: i32) -> i32 {
    a.saturating_neg()
}

#[inline]
pub fn min(a: i32, b: i32) -> i32 {
    if a < b {
        a
    } else {
        b
    }
}

#[inline]
pub fn max(a: i32, b: i32) -> i32 {
    if a > b {
        a
    } else {
        b
    }
}

/// Sum of all values, saturated
pub fn sum(values: &[i32]) -> i32 {
    saturate(values.iter().map(|&v| v as i64).sum())
}

/// Mean of all values, truncated toward zero; empty slice yields 0
pub fn avg(values: &[i32]) -> i32 {
    if values.is_empty() {
        return 0;
    }
    let total: i64 = values.iter().map(|&v| v as i64).sum();
    saturate(total / values.len() as i64)
}

/// Clamp `value` into `[min, max]`
///
/// Unlike `Ord::clamp` this never panics; with `min > max` the lower
/// bound is checked first.
#[inline]
pub fn clamp(value: i32, min: i32, max: i32) -> i32 {
    if value < min {
        min
    } else if value > max {
        max
    } else {
        value
    }
}

/// Linearly rescale `value` from `[in_min, in_max]` to `[out_min, out_max]`
///
/// No clamping is applied; values outside the input range extrapolate.
/// A degenerate input range returns `out_min`.
pub fn map(value: i32, in_min: i32, in_max: i32, out_min: i32, out_max: i32) -> i32 {
    if in_min == in_max {
        return out_min;
    }
    let num = (value as i128 - in_min as i128) * (out_max as i128 - out_min as i128);
    let den = in_max as i128 - in_min as i128;
    saturate_wide(out_min as i128 + num / den)
}

/// `(value * mult) / div` with a 64-bit intermediate; `div == 0` yields 0
pub fn scale(value: i32, mult: i32, div: i32) -> i32 {
    if div == 0 {
        return 0;
    }
    saturate((value as i64 * mult as i64) / div as i64)
}

/// Math channel operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MathOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Abs,
    Neg,
    Min,
    Max,
    Avg,
    /// `params[0]` = min, `params[1]` = max
    Clamp,
    /// `params` = in_min, in_max, out_min, out_max
    Map,
    /// `params[0]` = multiplier, `params[1]` = divisor
    Scale,
}

impl MathOp {
    /// Decode from the wire operation code
    pub const fn from_code(code: u8) -> Option<Self> {
        Some(match code {
            0 => Self::Add,
            1 => Self::Sub,
            2 => Self::Mul,
            3 => Self::Div,
            4 => Self::Mod,
            5 => Self::Abs,
            6 => Self::Neg,
            7 => Self::Min,
            8 => Self::Max,
            9 => Self::Avg,
            10 => Self::Clamp,
            11 => Self::Map,
            12 => Self::Scale,
            _ => return None,
        })
    }

    /// Fewest connected inputs the operation needs
    pub const fn min_inputs(self) -> usize {
        match self {
            Self::Sub | Self::Div | Self::Mod => 2,
            _ => 1,
        }
    }

    /// Evaluate the operation over the resolved inputs
    ///
    /// Folding operations (add, sub, mul, min, max) walk every input left
    /// to right; binary ones (div, mod) use the first two; unary ones use
    /// the first. Missing inputs read 0.
    pub fn apply(self, inputs: &[i32], params: &[i32; 4]) -> i32 {
        let first = inputs.first().copied().unwrap_or(0);
        let second = inputs.get(1).copied().unwrap_or(0);
        let rest = inputs.get(1..).unwrap_or(&[]);

        match self {
            Self::Add => sum(inputs),
            Self::Sub => rest.iter().fold(first, |acc, &v| sub(acc, v)),
            Self::Mul => rest.iter().fold(first, |acc, &v| mul(acc, v)),
            Self::Div => div(first, second),
            Self::Mod => modulo(first, second),
            Self::Abs => abs(first),
            Self::Neg => neg(first),
            Self::Min => rest.iter().fold(first, |acc, &v| min(acc, v)),
            Self::Max => rest.iter().fold(first, |acc, &v| max(acc, v)),
            Self::Avg => avg(inputs),
            Self::Clamp => clamp(first, params[0], params[1]),
            Self::Map => map(first, params[0], params[1], params[2], params[3]),
            Self::Scale => scale(first, params[0], params[1]),
        }
    }
}
