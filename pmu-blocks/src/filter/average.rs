//! Averaging filters: SMA, EMA and time-constant low-pass

use crate::math::{saturate, saturate_i64};

/// SMA buffer capacity
pub const MAX_SMA_WINDOW: usize = 32;

/// Default internal precision factor of the low-pass filter
pub const DEFAULT_LPF_SCALE: i32 = 1000;

/// Simple moving average over a circular buffer
///
/// Until the window fills, the average is taken over the samples seen so far.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SmaState {
    buffer: [i32; MAX_SMA_WINDOW],
    index: u8,
    count: u8,
    sum: i64,
}

impl Default for SmaState {
    fn default() -> Self {
        Self::new()
    }
}

impl SmaState {
    pub const fn new() -> Self {
        Self {
            buffer: [0; MAX_SMA_WINDOW],
            index: 0,
            count: 0,
            sum: 0,
        }
    }

    /// Number of samples currently in the window
    pub fn count(&self) -> usize {
        self.count as usize
    }

    pub fn update(&mut self, input: i32, window: u8) -> i32 {
        let window = (window as usize).clamp(1, MAX_SMA_WINDOW);
        if self.count as usize > window {
            // Window shrank since the last sample
            *self = Self::new();
        }

        let slot = self.index as usize % window;
        if (self.count as usize) < window {
            self.count += 1;
        } else {
            self.sum -= self.buffer[slot] as i64;
        }
        self.buffer[slot] = input;
        self.sum += input as i64;
        self.index = ((slot + 1) % window) as u8;

        saturate(self.sum / self.count as i64)
    }
}

/// Exponential moving average: `out = (alpha*in + (256-alpha)*prev) / 256`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EmaState {
    value: i32,
    initialized: bool,
}

impl EmaState {
    pub const fn new() -> Self {
        Self {
            value: 0,
            initialized: false,
        }
    }

    /// Filter one sample; the first sample passes through unfiltered
    pub fn update(&mut self, input: i32, alpha: u8) -> i32 {
        if !self.initialized {
            self.value = input;
            self.initialized = true;
            return input;
        }
        let alpha = alpha.max(1) as i64;
        let mixed = alpha * input as i64 + (256 - alpha) * self.value as i64;
        self.value = saturate(mixed / 256);
        self.value
    }
}

/// First-order IIR low-pass parameterised by a time constant
///
/// `out = (dt*in + tau*prev) / (tau + dt)`, carried internally multiplied
/// by a precision factor so slow filters still converge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LpfState {
    scaled: i64,
    initialized: bool,
}

impl LpfState {
    pub const fn new() -> Self {
        Self {
            scaled: 0,
            initialized: false,
        }
    }

    /// Filter one sample; `scale <= 0` selects [`DEFAULT_LPF_SCALE`]
    pub fn update(&mut self, input: i32, tau_ms: u32, dt_ms: u32, scale: i32) -> i32 {
        let scale = if scale > 0 { scale } else { DEFAULT_LPF_SCALE } as i64;
        let in_scaled = input as i64 * scale;

        if !self.initialized {
            self.scaled = in_scaled;
            self.initialized = true;
            return input;
        }

        let (tau, dt) = (tau_ms as i128, dt_ms as i128);
        self.scaled = if tau + dt == 0 {
            in_scaled
        } else {
            saturate_i64((dt * in_scaled as i128 + tau * self.scaled as i128) / (tau + dt))
        };
        saturate(self.scaled / scale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sma_partial_window() {
        let mut sma = SmaState::new();
        assert_eq!(sma.update(10, 4), 10);
        assert_eq!(sma.update(20, 4), 15);
        assert_eq!(sma.update(30, 4), 20);
        assert_eq!(sma.count(), 3);
    }

    #[test]
    fn test_sma_sliding() {
        let mut sma = SmaState::new();
        for v in [10, 20, 30, 40] {
            sma.update(v, 4);
        }
        // Window is now [20, 30, 40, 50]
        assert_eq!(sma.update(50, 4), 35);
        assert_eq!(sma.count(), 4);
    }

    #[test]
    fn test_sma_identical_inputs_converge_exactly() {
        let mut sma = SmaState::new();
        let mut out = 0;
        for _ in 0..8 {
            out = sma.update(-1234, 8);
        }
        assert_eq!(out, -1234);
    }

    #[test]
    fn test_sma_window_clamped() {
        let mut sma = SmaState::new();
        sma.update(5, 0);
        assert_eq!(sma.update(7, 0), 7);
        for _ in 0..100 {
            sma.update(1, 255);
        }
        assert_eq!(sma.count(), MAX_SMA_WINDOW);
    }

    #[test]
    fn test_sma_window_shrink_restarts() {
        let mut sma = SmaState::new();
        for v in [100, 100, 100, 100] {
            sma.update(v, 4);
        }
        assert_eq!(sma.update(0, 2), 0);
        assert_eq!(sma.count(), 1);
    }

    #[test]
    fn test_ema() {
        let mut ema = EmaState::new();
        assert_eq!(ema.update(1000, 128), 1000);
        assert_eq!(ema.update(0, 128), 500);
        assert_eq!(ema.update(0, 128), 250);
    }

    #[test]
    fn test_ema_alpha_zero_treated_as_one() {
        let mut ema = EmaState::new();
        ema.update(0, 0);
        assert_eq!(ema.update(256, 0), 1);
    }

    #[test]
    fn test_lpf() {
        let mut lpf = LpfState::new();
        assert_eq!(lpf.update(0, 100, 100, 0), 0);
        assert_eq!(lpf.update(1000, 100, 100, 0), 500);
        assert_eq!(lpf.update(1000, 100, 100, 0), 750);
    }

    #[test]
    fn test_lpf_zero_dt_holds() {
        let mut lpf = LpfState::new();
        lpf.update(400, 50, 10, 1000);
        assert_eq!(lpf.update(9000, 50, 0, 1000), 400);
    }

    #[test]
    fn test_lpf_zero_tau_passes_through() {
        let mut lpf = LpfState::new();
        lpf.update(400, 0, 10, 1000);
        assert_eq!(lpf.update(-77, 0, 10, 1000), -77);
    }

    #[test]
    fn test_lpf_extreme_input_long_gap() {
        let mut lpf = LpfState::new();
        assert_eq!(lpf.update(i32::MAX, 100, 0, DEFAULT_LPF_SCALE), i32::MAX);
        assert_eq!(lpf.update(i32::MAX, 100, 10_000_000, DEFAULT_LPF_SCALE), i32::MAX);
        assert_eq!(
            lpf.update(i32::MIN, 60_000, u32::MAX, DEFAULT_LPF_SCALE),
            i32::MIN + 60_000
        );
    }
}
