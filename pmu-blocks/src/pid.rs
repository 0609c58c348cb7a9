//! Fixed-point PID controller
//!
//! Gains are integers scaled by `scale` (default 1000, i.e. three decimal
//! digits): `kp = 1500` with `scale = 1000` is a gain of 1.5. The integral
//! is accumulated in a 64-bit register that carries the same scale, so the
//! anti-windup limits are applied as `[integral_min, integral_max] * scale`.
//!
//! Products of gains, errors and `dt_ms` are formed in `i128` and saturated
//! back into the 64-bit registers, so no input or tick gap can overflow.
//!
//! `dt_ms` is the time since the previous update. An update with
//! `dt_ms == 0` does nothing and returns the previous output; this keeps the
//! derivative term free of a division by zero on every path.

use crate::math::{saturate, saturate_i64};

/// Default fixed-point scale for gains
pub const DEFAULT_SCALE: i32 = 1000;

/// PID parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PidConfig {
    /// Proportional gain (x scale)
    pub kp: i32,
    /// Integral gain per second (x scale)
    pub ki: i32,
    /// Derivative gain in seconds (x scale)
    pub kd: i32,
    /// Gain scale; 0 selects [`DEFAULT_SCALE`]
    pub scale: i32,
    /// Errors with magnitude at or below this are treated as zero
    pub deadband: i32,
    pub output_min: i32,
    pub output_max: i32,
    /// Anti-windup bounds for the integral term (both 0 = effectively unbounded)
    pub integral_min: i32,
    pub integral_max: i32,
    /// Differentiate the measurement instead of the error (no setpoint kick)
    pub d_on_measurement: bool,
    /// Clear the integral whenever the setpoint changes
    pub reset_integral_on_setpoint: bool,
}

impl Default for PidConfig {
    fn default() -> Self {
        Self {
            kp: 0,
            ki: 0,
            kd: 0,
            scale: DEFAULT_SCALE,
            deadband: 0,
            output_min: i32::MIN,
            output_max: i32::MAX,
            integral_min: 0,
            integral_max: 0,
            d_on_measurement: false,
            reset_integral_on_setpoint: false,
        }
    }
}

impl PidConfig {
    /// Scale in effect (never zero)
    pub fn effective_scale(&self) -> i64 {
        if self.scale > 0 {
            self.scale as i64
        } else {
            DEFAULT_SCALE as i64
        }
    }

    /// Integral register bounds, already multiplied by the scale
    fn integral_limits(&self) -> (i64, i64) {
        let scale = self.effective_scale();
        if self.integral_min == 0 && self.integral_max == 0 {
            (i32::MIN as i64 * scale, i32::MAX as i64 * scale)
        } else {
            (
                self.integral_min as i64 * scale,
                self.integral_max as i64 * scale,
            )
        }
    }

    fn saturate_output(&self, value: i64) -> i32 {
        let value = saturate(value);
        if self.output_min < self.output_max {
            value.clamp(self.output_min, self.output_max)
        } else {
            value
        }
    }
}

/// Apply a deadband: inside it the error is 0, outside it shrinks toward 0
pub fn apply_deadband(error: i64, deadband: i32) -> i64 {
    let band = deadband.max(0) as i64;
    if error.abs() <= band {
        0
    } else if error > 0 {
        error - band
    } else {
        error + band
    }
}

/// PID runtime state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PidState {
    /// Integral register (x scale)
    integral: i64,
    prev_error: i64,
    prev_measurement: i32,
    /// Previous error/measurement are valid for the derivative
    has_history: bool,
    prev_setpoint: i32,
    has_setpoint: bool,
    output: i32,
}

impl PidState {
    /// Fully cleared controller
    pub const fn new() -> Self {
        Self {
            integral: 0,
            prev_error: 0,
            prev_measurement: 0,
            has_history: false,
            prev_setpoint: 0,
            has_setpoint: false,
            output: 0,
        }
    }

    /// Clear integral and derivative history, keeping the setpoint history
    pub fn reset(&mut self) {
        let (prev_setpoint, has_setpoint) = (self.prev_setpoint, self.has_setpoint);
        *self = Self::new();
        self.prev_setpoint = prev_setpoint;
        self.has_setpoint = has_setpoint;
    }

    pub fn output(&self) -> i32 {
        self.output
    }

    /// Integral term in output units
    pub fn integral_term(&self, config: &PidConfig) -> i64 {
        self.integral / config.effective_scale()
    }

    /// Run one control step and return the saturated output
    pub fn update(&mut self, config: &PidConfig, setpoint: i32, measurement: i32, dt_ms: u32) -> i32 {
        if dt_ms == 0 {
            return self.output;
        }
        let scale = config.effective_scale();
        let dt = dt_ms as i128;

        if config.reset_integral_on_setpoint && self.has_setpoint && setpoint != self.prev_setpoint
        {
            self.integral = 0;
        }
        self.prev_setpoint = setpoint;
        self.has_setpoint = true;

        let error = apply_deadband(setpoint as i64 - measurement as i64, config.deadband);

        let p = saturate_i64(config.kp as i128 * error as i128 / scale as i128);

        let (i_min, i_max) = config.integral_limits();
        let i_step = saturate_i64(config.ki as i128 * error as i128 * dt / 1000);
        self.integral = self.integral.saturating_add(i_step).clamp(i_min, i_max.max(i_min));
        let i = self.integral / scale;

        let d = if self.has_history {
            let delta = if config.d_on_measurement {
                -(measurement as i64 - self.prev_measurement as i64)
            } else {
                error - self.prev_error
            };
            saturate_i64(config.kd as i128 * delta as i128 * 1000 / (dt * scale as i128))
        } else {
            0
        };

        self.prev_error = error;
        self.prev_measurement = measurement;
        self.has_history = true;

        self.output = config.saturate_output(p.saturating_add(i).saturating_add(d));
        self.output
    }
}
