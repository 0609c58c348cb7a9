//! Signal filters
//!
//! Each filter owns a small, fixed-size state struct; none of them
//! allocate. Windowed filters ([`SmaState`], [`MedianState`]) clamp the
//! requested window to their buffer capacity.

pub mod average;
pub mod median;
pub mod rate;

pub use average::{EmaState, LpfState, SmaState, DEFAULT_LPF_SCALE, MAX_SMA_WINDOW};
pub use median::{MedianState, MAX_MEDIAN_WINDOW};
pub use rate::{DebounceState, RateLimiterState};

/// Filter channel type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FilterType {
    /// Simple moving average
    Sma,
    /// Exponential moving average (alpha / 256)
    Ema,
    /// First-order low-pass with a time constant
    LowPass,
    Median,
    RateLimit,
    Debounce,
}

impl FilterType {
    pub const fn from_code(code: u8) -> Option<Self> {
        Some(match code {
            0 => Self::Sma,
            1 => Self::Ema,
            2 => Self::LowPass,
            3 => Self::Median,
            4 => Self::RateLimit,
            5 => Self::Debounce,
            _ => return None,
        })
    }
}
