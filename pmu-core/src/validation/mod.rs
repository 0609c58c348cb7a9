//! Configuration validation
//!
//! Configuration reaches the engine from an untrusted configurator, so
//! every record is checked against a [`ValidationLimits`] table before a
//! channel is built from it. Each validator is a pure function that stops
//! at the first problem and reports it as a [`ValidationError`].

mod blocks;
mod hardware;

pub use blocks::{
    validate_counter, validate_filter, validate_flipflop, validate_hysteresis, validate_logic,
    validate_math, validate_number, validate_pid, validate_switch, validate_table_2d,
    validate_table_3d, validate_timer,
};
pub use hardware::{
    validate_analog_input, validate_can_input, validate_can_output, validate_digital_input,
    validate_frequency_input, validate_hbridge, validate_power_output, validate_pwm_output,
};

use core::fmt;

use pmu_blocks::math::saturate;

use crate::channel::{ChannelFlags, ChannelRef, ChannelType, HwDevice, CH_ID_NONE, CH_REF_NONE};
use crate::config::{CfgChannelHeader, ChannelConfig};

/// What a validation failure is about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ValidationErrorKind {
    /// Channel id is 0, 0xFFFF or above the limit
    InvalidChannelId,
    /// Reference names no valid channel
    InvalidReference,
    /// Type tag is not a known channel type
    UnknownType,
    /// Configuration type differs from the header's type tag
    TypeMismatch,
    /// Payload size differs from the type's fixed size
    SizeMismatch,
    /// Name is longer than allowed or differs from the declared length
    NameLength,
    /// Value outside its allowed range
    OutOfRange,
    /// A `min` is not below its `max`
    InvalidOrder,
    /// Divisor or span is zero
    ZeroDivisor,
    /// Breakpoints or thresholds are not strictly increasing
    NotMonotonic,
    /// Input count outside the allowed range or too low for the operation
    InputCount,
    /// Case count outside the allowed range
    CaseCount,
    /// Operation, mode or type code is not defined
    InvalidOperation,
    /// Hardware channel without a device binding
    MissingHardware,
}

/// First problem found in a configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ValidationError {
    pub kind: ValidationErrorKind,
    /// Offending field
    pub field: &'static str,
    pub actual: i32,
    pub expected_min: i32,
    pub expected_max: i32,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:?} in `{}`: {} not in [{}, {}]",
            self.kind, self.field, self.actual, self.expected_min, self.expected_max
        )
    }
}

/// `Ok(())` when the configuration is acceptable
pub type ValidationResult = Result<(), ValidationError>;

/// Bounds applied during validation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ValidationLimits {
    pub max_channel_id: i32,
    pub max_name_len: i32,
    pub min_current_ma: i32,
    pub max_current_ma: i32,
    pub pwm_freq_min: i32,
    pub pwm_freq_max: i32,
    pub max_hbridge_deadband: i32,
    /// Full-scale duty, per-mille
    pub max_duty: i32,
    pub max_timer_ms: i32,
    pub max_inputs: i32,
    pub max_switch_cases: i32,
    pub max_table_2d: i32,
    pub max_table_3d: i32,
    pub max_sma_window: i32,
    pub max_median_window: i32,
    pub max_mlevels: i32,
    /// Gains must lie in `[-max_pid_gain, max_pid_gain]`
    pub max_pid_gain: i32,
    pub max_debounce_ms: i32,
    pub max_filter_ms: i32,
    pub max_decimal_places: i32,
    pub max_can_bus: i32,
    pub max_retry_count: i32,
}

/// Limits for the 30-channel unit
pub const DEFAULT_LIMITS: ValidationLimits = ValidationLimits {
    max_channel_id: 1023,
    max_name_len: 31,
    min_current_ma: 100,
    max_current_ma: 40_000,
    pwm_freq_min: 10,
    pwm_freq_max: 25_000,
    max_hbridge_deadband: 500,
    max_duty: 1000,
    max_timer_ms: 24 * 60 * 60 * 1000,
    max_inputs: pmu_blocks::logic::MAX_INPUTS as i32,
    max_switch_cases: crate::config::MAX_SWITCH_CASES as i32,
    max_table_2d: crate::config::MAX_TABLE_2D_POINTS as i32,
    max_table_3d: crate::config::MAX_TABLE_3D_POINTS as i32,
    max_sma_window: pmu_blocks::filter::MAX_SMA_WINDOW as i32,
    max_median_window: pmu_blocks::filter::MAX_MEDIAN_WINDOW as i32,
    max_mlevels: pmu_blocks::hysteresis::MAX_LEVELS as i32,
    max_pid_gain: 1_000_000,
    max_debounce_ms: 10_000,
    max_filter_ms: 60_000,
    max_decimal_places: 6,
    max_can_bus: 1,
    max_retry_count: 10,
};

impl Default for ValidationLimits {
    fn default() -> Self {
        DEFAULT_LIMITS
    }
}

fn fail(
    kind: ValidationErrorKind,
    field: &'static str,
    actual: i64,
    expected_min: i32,
    expected_max: i32,
) -> ValidationResult {
    Err(ValidationError {
        kind,
        field,
        actual: saturate(actual),
        expected_min,
        expected_max,
    })
}

/// `actual` within `[min, max]`, reported as `kind`
fn bounded(
    kind: ValidationErrorKind,
    field: &'static str,
    actual: impl Into<i64>,
    min: i32,
    max: i32,
) -> ValidationResult {
    let actual = actual.into();
    if actual < min as i64 || actual > max as i64 {
        return fail(kind, field, actual, min, max);
    }
    Ok(())
}

fn range(field: &'static str, actual: impl Into<i64>, min: i32, max: i32) -> ValidationResult {
    bounded(ValidationErrorKind::OutOfRange, field, actual, min, max)
}

/// 0/1 boolean byte
fn flag(field: &'static str, actual: u8) -> ValidationResult {
    range(field, actual, 0, 1)
}

/// `min < max`
fn ordered(field: &'static str, min: i32, max: i32) -> ValidationResult {
    if min >= max {
        return fail(
            ValidationErrorKind::InvalidOrder,
            field,
            min as i64,
            i32::MIN,
            max.saturating_sub(1),
        );
    }
    Ok(())
}

fn nonzero(field: &'static str, actual: impl Into<i64>) -> ValidationResult {
    if actual.into() == 0 {
        return fail(ValidationErrorKind::ZeroDivisor, field, 0, i32::MIN, i32::MAX);
    }
    Ok(())
}

/// Decode an operation/mode code or report it
fn code<T>(field: &'static str, actual: u8, decoded: Option<T>, max_code: i32) -> Result<T, ValidationError> {
    decoded.ok_or(ValidationError {
        kind: ValidationErrorKind::InvalidOperation,
        field,
        actual: actual as i32,
        expected_min: 0,
        expected_max: max_code,
    })
}

/// Strictly increasing values
fn increasing(field: &'static str, values: &[i32]) -> ValidationResult {
    for pair in values.windows(2) {
        if pair[1] <= pair[0] {
            return fail(
                ValidationErrorKind::NotMonotonic,
                field,
                pair[1] as i64,
                pair[0].saturating_add(1),
                i32::MAX,
            );
        }
    }
    Ok(())
}

fn channel_id(field: &'static str, id: u16, limits: &ValidationLimits) -> ValidationResult {
    if id == CH_ID_NONE || id == CH_REF_NONE {
        return fail(ValidationErrorKind::InvalidChannelId, field, id as i64, 1, limits.max_channel_id);
    }
    bounded(ValidationErrorKind::InvalidChannelId, field, id, 1, limits.max_channel_id)
}

/// Reference that may be left unconnected
fn optional_ref(field: &'static str, r: ChannelRef, limits: &ValidationLimits) -> ValidationResult {
    if r == CH_REF_NONE {
        return Ok(());
    }
    bounded(ValidationErrorKind::InvalidReference, field, r, 1, limits.max_channel_id)
}

/// Reference that must name a channel
fn required_ref(field: &'static str, r: ChannelRef, limits: &ValidationLimits) -> ValidationResult {
    bounded(ValidationErrorKind::InvalidReference, field, r, 1, limits.max_channel_id)
}

/// Check the common record header
pub fn validate_header(header: &CfgChannelHeader, limits: &ValidationLimits) -> ValidationResult {
    channel_id("id", header.id, limits)?;

    let Some(kind) = ChannelType::from_code(header.channel_type) else {
        return fail(
            ValidationErrorKind::UnknownType,
            "channel_type",
            header.channel_type as i64,
            ChannelType::DigitalInput.code() as i32,
            ChannelType::Hysteresis.code() as i32,
        );
    };

    let flags = ChannelFlags::from_bits(header.flags);
    if flags.unknown_bits() != 0 {
        return fail(
            ValidationErrorKind::OutOfRange,
            "flags",
            header.flags as i64,
            0,
            ChannelFlags::ALL.bits() as i32,
        );
    }

    let device = code(
        "hw_device",
        header.hw_device,
        HwDevice::from_code(header.hw_device),
        HwDevice::Freq.code() as i32,
    )?;
    if kind.needs_hardware() && device == HwDevice::None {
        return fail(
            ValidationErrorKind::MissingHardware,
            "hw_device",
            0,
            HwDevice::Gpio.code() as i32,
            HwDevice::Freq.code() as i32,
        );
    }

    optional_ref("source_id", header.source_id, limits)?;
    bounded(ValidationErrorKind::NameLength, "name_len", header.name_len, 0, limits.max_name_len)?;

    let size = kind.config_size() as i32;
    bounded(ValidationErrorKind::SizeMismatch, "config_size", header.config_size, size, size)
}

/// Validate a type-specific configuration
pub fn validate_config(config: &ChannelConfig, limits: &ValidationLimits) -> ValidationResult {
    match config {
        ChannelConfig::DigitalInput(c) => validate_digital_input(c, limits),
        ChannelConfig::AnalogInput(c) => validate_analog_input(c, limits),
        ChannelConfig::FrequencyInput(c) => validate_frequency_input(c, limits),
        ChannelConfig::CanInput(c) => validate_can_input(c, limits),
        ChannelConfig::PowerOutput(c) => validate_power_output(c, limits),
        ChannelConfig::PwmOutput(c) => validate_pwm_output(c, limits),
        ChannelConfig::HBridge(c) => validate_hbridge(c, limits),
        ChannelConfig::CanOutput(c) => validate_can_output(c, limits),
        ChannelConfig::Timer(c) => validate_timer(c, limits),
        ChannelConfig::Logic(c) => validate_logic(c, limits),
        ChannelConfig::Math(c) => validate_math(c, limits),
        ChannelConfig::Table2D(c) => validate_table_2d(c, limits),
        ChannelConfig::Table3D(c) => validate_table_3d(c, limits),
        ChannelConfig::Filter(c) => validate_filter(c, limits),
        ChannelConfig::Pid(c) => validate_pid(c, limits),
        ChannelConfig::Number(c) => validate_number(c, limits),
        ChannelConfig::Switch(c) => validate_switch(c, limits),
        ChannelConfig::Counter(c) => validate_counter(c, limits),
        ChannelConfig::FlipFlop(c) => validate_flipflop(c, limits),
        ChannelConfig::Hysteresis(c) => validate_hysteresis(c, limits),
    }
}

/// Validate a whole channel: header, then name, then the typed payload
pub fn validate_channel(
    header: &CfgChannelHeader,
    name: &str,
    config: &ChannelConfig,
    limits: &ValidationLimits,
) -> ValidationResult {
    validate_header(header, limits)?;

    let declared = header.name_len as i32;
    bounded(ValidationErrorKind::NameLength, "name", name.len() as u32, declared, declared)?;

    let kind = config.channel_type().code();
    if kind != header.channel_type {
        return fail(
            ValidationErrorKind::TypeMismatch,
            "channel_type",
            kind as i64,
            header.channel_type as i32,
            header.channel_type as i32,
        );
    }
    let size = header.config_size as i32;
    bounded(ValidationErrorKind::SizeMismatch, "config_size", config.size() as u32, size, size)?;

    validate_config(config, limits)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CfgDigitalInput, CfgLogic, CfgNumber};

    fn header_for(config: &ChannelConfig, name: &str) -> CfgChannelHeader {
        let kind = config.channel_type();
        CfgChannelHeader {
            id: 5,
            channel_type: kind.code(),
            flags: ChannelFlags::ENABLED.bits(),
            hw_device: if kind.needs_hardware() { HwDevice::Gpio.code() } else { 0 },
            hw_index: 0,
            source_id: CH_REF_NONE,
            default_value: 0,
            name_len: name.len() as u8,
            config_size: kind.config_size() as u8,
        }
    }

    #[test]
    fn test_header_ids() {
        let config = ChannelConfig::Number(CfgNumber::default());
        let mut header = header_for(&config, "");
        assert_eq!(validate_header(&header, &DEFAULT_LIMITS), Ok(()));

        for bad in [0, 1024, 0xFFFF] {
            header.id = bad;
            let err = validate_header(&header, &DEFAULT_LIMITS).unwrap_err();
            assert_eq!(err.kind, ValidationErrorKind::InvalidChannelId);
            assert_eq!(err.field, "id");
        }
    }

    #[test]
    fn test_header_type_and_size() {
        let config = ChannelConfig::Number(CfgNumber::default());
        let mut header = header_for(&config, "");
        header.channel_type = 0x05;
        assert_eq!(
            validate_header(&header, &DEFAULT_LIMITS).unwrap_err().kind,
            ValidationErrorKind::UnknownType
        );

        let mut header = header_for(&config, "");
        header.config_size = 19;
        let err = validate_header(&header, &DEFAULT_LIMITS).unwrap_err();
        assert_eq!(err.kind, ValidationErrorKind::SizeMismatch);
        assert_eq!((err.actual, err.expected_min, err.expected_max), (19, 20, 20));
    }

    #[test]
    fn test_header_hardware_and_flags() {
        let config = ChannelConfig::DigitalInput(CfgDigitalInput::default());
        let mut header = header_for(&config, "");
        header.hw_device = 0;
        assert_eq!(
            validate_header(&header, &DEFAULT_LIMITS).unwrap_err().kind,
            ValidationErrorKind::MissingHardware
        );

        let mut header = header_for(&config, "");
        header.flags = 0x40;
        assert_eq!(validate_header(&header, &DEFAULT_LIMITS).unwrap_err().field, "flags");

        let mut header = header_for(&config, "");
        header.source_id = 2000;
        assert_eq!(
            validate_header(&header, &DEFAULT_LIMITS).unwrap_err().kind,
            ValidationErrorKind::InvalidReference
        );
    }

    #[test]
    fn test_header_name_limit() {
        let config = ChannelConfig::Number(CfgNumber::default());
        let mut header = header_for(&config, "");
        header.name_len = 32;
        assert_eq!(
            validate_header(&header, &DEFAULT_LIMITS).unwrap_err().kind,
            ValidationErrorKind::NameLength
        );
    }

    #[test]
    fn test_channel_chain() {
        let config = ChannelConfig::Number(CfgNumber::default());
        let header = header_for(&config, "Idle");
        assert_eq!(validate_channel(&header, "Idle", &config, &DEFAULT_LIMITS), Ok(()));

        let err = validate_channel(&header, "Idl", &config, &DEFAULT_LIMITS).unwrap_err();
        assert_eq!(err.kind, ValidationErrorKind::NameLength);

        let logic = ChannelConfig::Logic(CfgLogic::default());
        let err = validate_channel(&header, "Idle", &logic, &DEFAULT_LIMITS).unwrap_err();
        assert_eq!(err.kind, ValidationErrorKind::TypeMismatch);
    }

    #[test]
    fn test_chain_reports_first_error() {
        let config = ChannelConfig::Number(CfgNumber {
            min: 10,
            max: 0,
            ..Default::default()
        });
        let mut header = header_for(&config, "n");
        header.id = 0;
        // Bad header and bad payload: only the header error is reported
        let err = validate_channel(&header, "n", &config, &DEFAULT_LIMITS).unwrap_err();
        assert_eq!(err.kind, ValidationErrorKind::InvalidChannelId);
    }

    #[test]
    fn test_increasing() {
        assert_eq!(increasing("x", &[1, 2, 3]), Ok(()));
        let err = increasing("x", &[1, 3, 3]).unwrap_err();
        assert_eq!(err.kind, ValidationErrorKind::NotMonotonic);
        assert_eq!(err.expected_min, 4);
    }
}
