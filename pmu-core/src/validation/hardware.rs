//! Validators for hardware-bound input and output channels

use pmu_blocks::EdgeMode;

use super::{code, flag, nonzero, ordered, range, ValidationLimits, ValidationResult};
use crate::config::{
    ByteOrder, CfgAnalogInput, CfgCanInput, CfgCanOutput, CfgDigitalInput, CfgFrequencyInput,
    CfgHBridge, CfgPowerOutput, CfgPwmOutput, HBridgeMode,
};

/// Largest 29-bit extended CAN identifier
const MAX_CAN_ID: i32 = 0x1FFF_FFFF;
/// Widest signal packed into one frame
const MAX_SIGNAL_BITS: i32 = 32;
/// Payload bits of a classic CAN frame
const FRAME_BITS: i32 = 64;

pub fn validate_digital_input(cfg: &CfgDigitalInput, limits: &ValidationLimits) -> ValidationResult {
    flag("active_high", cfg.active_high)?;
    flag("use_pullup", cfg.use_pullup)?;
    range("debounce_ms", cfg.debounce_ms, 0, limits.max_debounce_ms)
}

pub fn validate_analog_input(cfg: &CfgAnalogInput, limits: &ValidationLimits) -> ValidationResult {
    // in_max - in_min is the divisor of the linear map
    ordered("in_min", cfg.in_min, cfg.in_max)?;
    range("filter_ms", cfg.filter_ms, 0, limits.max_filter_ms)?;
    range("decimal_places", cfg.decimal_places, 0, limits.max_decimal_places)
}

pub fn validate_frequency_input(cfg: &CfgFrequencyInput, _limits: &ValidationLimits) -> ValidationResult {
    range("timeout_ms", cfg.timeout_ms, 1, u16::MAX as i32)?;
    let edge = code("edge_mode", cfg.edge_mode, cfg.edge(), EdgeMode::Both.code() as i32)?;
    if edge.is_level() {
        // A level cannot be counted
        return range("edge_mode", cfg.edge_mode, 1, EdgeMode::Both.code() as i32);
    }
    range("pulses_per_rev", cfg.pulses_per_rev, 1, u8::MAX as i32)?;
    nonzero("divider", cfg.divider)
}

pub fn validate_can_input(cfg: &CfgCanInput, limits: &ValidationLimits) -> ValidationResult {
    range("can_id", cfg.can_id, 0, MAX_CAN_ID)?;
    range("bus", cfg.bus, 0, limits.max_can_bus)?;
    range("bit_length", cfg.bit_length, 1, MAX_SIGNAL_BITS)?;
    range("start_bit", cfg.start_bit, 0, FRAME_BITS - cfg.bit_length as i32)?;
    code("byte_order", cfg.byte_order, cfg.order(), ByteOrder::Motorola as i32)?;
    nonzero("divider", cfg.divider)
}

pub fn validate_power_output(cfg: &CfgPowerOutput, limits: &ValidationLimits) -> ValidationResult {
    range(
        "current_limit_ma",
        cfg.current_limit_ma,
        limits.min_current_ma,
        limits.max_current_ma,
    )?;
    if cfg.inrush_limit_ma != 0 {
        range(
            "inrush_limit_ma",
            cfg.inrush_limit_ma,
            cfg.current_limit_ma as i32,
            u16::MAX as i32,
        )?;
    }
    range("retry_count", cfg.retry_count, 0, limits.max_retry_count)?;
    if cfg.is_pwm() {
        range(
            "pwm_frequency_hz",
            cfg.pwm_frequency_hz,
            limits.pwm_freq_min,
            limits.pwm_freq_max,
        )?;
    }
    Ok(())
}

pub fn validate_pwm_output(cfg: &CfgPwmOutput, limits: &ValidationLimits) -> ValidationResult {
    range("frequency_hz", cfg.frequency_hz, limits.pwm_freq_min, limits.pwm_freq_max)?;
    range("max_duty", cfg.max_duty, 1, limits.max_duty)?;
    ordered("min_duty", cfg.min_duty as i32, cfg.max_duty as i32)?;
    range("default_duty", cfg.default_duty, 0, limits.max_duty)
}

pub fn validate_hbridge(cfg: &CfgHBridge, limits: &ValidationLimits) -> ValidationResult {
    code("mode", cfg.mode, cfg.bridge_mode(), HBridgeMode::ForwardOnly as i32)?;
    flag("brake_on_zero", cfg.brake_on_zero)?;
    range("frequency_hz", cfg.frequency_hz, limits.pwm_freq_min, limits.pwm_freq_max)?;
    range(
        "current_limit_ma",
        cfg.current_limit_ma,
        limits.min_current_ma,
        limits.max_current_ma,
    )?;
    range("max_duty", cfg.max_duty, 1, limits.max_duty)?;
    // A deadband at or above max_duty would swallow every command
    let deadband_max = limits.max_hbridge_deadband.min(cfg.max_duty as i32 - 1);
    range("deadband", cfg.deadband, 0, deadband_max)
}

pub fn validate_can_output(cfg: &CfgCanOutput, limits: &ValidationLimits) -> ValidationResult {
    range("can_id", cfg.can_id, 0, MAX_CAN_ID)?;
    range("bus", cfg.bus, 0, limits.max_can_bus)?;
    range("dlc", cfg.dlc, 1, 8)?;
    let frame_bits = cfg.dlc as i32 * 8;
    range("bit_length", cfg.bit_length, 1, MAX_SIGNAL_BITS.min(frame_bits))?;
    range("start_bit", cfg.start_bit, 0, frame_bits - cfg.bit_length as i32)?;
    range("period_ms", cfg.period_ms, 1, u16::MAX as i32)?;
    code("byte_order", cfg.byte_order, cfg.order(), ByteOrder::Motorola as i32).map(|_| ())
}
