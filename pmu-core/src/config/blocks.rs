//! Virtual (logic) channel configurations

use pmu_blocks::counter::CounterConfig;
use pmu_blocks::filter::FilterType;
use pmu_blocks::flipflop::FlipFlopKind;
use pmu_blocks::hysteresis::{HysteresisKind, MAX_LEVELS};
use pmu_blocks::logic::{LogicOp, MAX_INPUTS};
use pmu_blocks::math::MathOp;
use pmu_blocks::pid::PidConfig;
use pmu_blocks::switch::SwitchMode;
use pmu_blocks::timer::{TimerConfig, TimerMode};
use pmu_blocks::EdgeMode;

use super::wire::{LayoutError, WireConfig, WireReader, WireWriter};
use crate::channel::{ChannelRef, CH_REF_NONE};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Number of case slots in a switch record
pub const MAX_SWITCH_CASES: usize = 16;

/// Timer channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CfgTimer {
    pub trigger_id: ChannelRef,
    /// [`TimerMode`] code
    pub mode: u8,
    /// [`EdgeMode`] code qualifying the trigger
    pub start_edge: u8,
    pub duration_ms: u32,
    pub blink_on_ms: u16,
    pub blink_off_ms: u16,
    /// While this input is non-zero the timer is held in reset
    pub reset_id: ChannelRef,
    pub reserved: u16,
}

impl Default for CfgTimer {
    fn default() -> Self {
        Self {
            trigger_id: CH_REF_NONE,
            mode: 0,
            start_edge: 0,
            duration_ms: 1000,
            blink_on_ms: 500,
            blink_off_ms: 500,
            reset_id: CH_REF_NONE,
            reserved: 0,
        }
    }
}

impl CfgTimer {
    pub fn timer_mode(&self) -> Option<TimerMode> {
        TimerMode::from_code(self.mode)
    }

    /// Block parameters, `None` if a code is out of range
    pub fn timer_config(&self) -> Option<TimerConfig> {
        Some(TimerConfig {
            mode: self.timer_mode()?,
            start_edge: EdgeMode::from_code(self.start_edge)?,
            duration_ms: self.duration_ms,
            blink_on_ms: self.blink_on_ms as u32,
            blink_off_ms: self.blink_off_ms as u32,
        })
    }
}

impl WireConfig for CfgTimer {
    const SIZE: usize = 2 + 1 + 1 + 4 + 2 + 2 + 2 + 2;

    fn read(r: &mut WireReader<'_>) -> Result<Self, LayoutError> {
        Ok(Self {
            trigger_id: r.u16()?,
            mode: r.u8()?,
            start_edge: r.u8()?,
            duration_ms: r.u32()?,
            blink_on_ms: r.u16()?,
            blink_off_ms: r.u16()?,
            reset_id: r.u16()?,
            reserved: r.u16()?,
        })
    }

    fn write(&self, w: &mut WireWriter<'_>) -> Result<(), LayoutError> {
        w.put_u16(self.trigger_id)?;
        w.put_u8(self.mode)?;
        w.put_u8(self.start_edge)?;
        w.put_u32(self.duration_ms)?;
        w.put_u16(self.blink_on_ms)?;
        w.put_u16(self.blink_off_ms)?;
        w.put_u16(self.reset_id)?;
        w.put_u16(self.reserved)
    }
}

/// Logic gate / comparator channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CfgLogic {
    /// [`LogicOp`] code
    pub operation: u8,
    pub input_count: u8,
    pub inputs: [ChannelRef; MAX_INPUTS],
    /// Right-hand side for comparisons with a single input
    pub compare_value: i32,
    pub invert_output: u8,
    pub reserved: u8,
}

impl Default for CfgLogic {
    fn default() -> Self {
        Self {
            operation: 0,
            input_count: 2,
            inputs: [CH_REF_NONE; MAX_INPUTS],
            compare_value: 0,
            invert_output: 0,
            reserved: 0,
        }
    }
}

impl CfgLogic {
    pub fn op(&self) -> Option<LogicOp> {
        LogicOp::from_code(self.operation)
    }

    /// Configured inputs (at most [`MAX_INPUTS`])
    pub fn active_inputs(&self) -> &[ChannelRef] {
        &self.inputs[..(self.input_count as usize).min(MAX_INPUTS)]
    }
}

impl WireConfig for CfgLogic {
    const SIZE: usize = 1 + 1 + 2 * MAX_INPUTS + 4 + 1 + 1;

    fn read(r: &mut WireReader<'_>) -> Result<Self, LayoutError> {
        Ok(Self {
            operation: r.u8()?,
            input_count: r.u8()?,
            inputs: r.u16_array()?,
            compare_value: r.i32()?,
            invert_output: r.u8()?,
            reserved: r.u8()?,
        })
    }

    fn write(&self, w: &mut WireWriter<'_>) -> Result<(), LayoutError> {
        w.put_u8(self.operation)?;
        w.put_u8(self.input_count)?;
        w.put_u16_slice(&self.inputs)?;
        w.put_i32(self.compare_value)?;
        w.put_u8(self.invert_output)?;
        w.put_u8(self.reserved)
    }
}

/// Arithmetic channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CfgMath {
    /// [`MathOp`] code
    pub operation: u8,
    pub input_count: u8,
    pub inputs: [ChannelRef; MAX_INPUTS],
    /// Constant operands: clamp bounds, map ranges, scale factors
    pub params: [i32; 4],
    pub reserved: [u8; 2],
}

impl Default for CfgMath {
    fn default() -> Self {
        Self {
            operation: 0,
            input_count: 2,
            inputs: [CH_REF_NONE; MAX_INPUTS],
            params: [0; 4],
            reserved: [0; 2],
        }
    }
}

impl CfgMath {
    pub fn op(&self) -> Option<MathOp> {
        MathOp::from_code(self.operation)
    }

    pub fn active_inputs(&self) -> &[ChannelRef] {
        &self.inputs[..(self.input_count as usize).min(MAX_INPUTS)]
    }
}

impl WireConfig for CfgMath {
    const SIZE: usize = 1 + 1 + 2 * MAX_INPUTS + 4 * 4 + 2;

    fn read(r: &mut WireReader<'_>) -> Result<Self, LayoutError> {
        Ok(Self {
            operation: r.u8()?,
            input_count: r.u8()?,
            inputs: r.u16_array()?,
            params: r.i32_array()?,
            reserved: [r.u8()?, r.u8()?],
        })
    }

    fn write(&self, w: &mut WireWriter<'_>) -> Result<(), LayoutError> {
        w.put_u8(self.operation)?;
        w.put_u8(self.input_count)?;
        w.put_u16_slice(&self.inputs)?;
        w.put_i32_slice(&self.params)?;
        w.put_bytes(&self.reserved)
    }
}

/// Signal filter channel
///
/// Which fields apply depends on `filter_type`: `window_size` for SMA and
/// median, `alpha` for EMA, `time_constant_ms` for the low-pass,
/// `rise_rate`/`fall_rate` for the rate limiter and
/// `debounce_ms`/`hysteresis` for debounce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CfgFilter {
    pub input_id: ChannelRef,
    /// [`FilterType`] code
    pub filter_type: u8,
    pub window_size: u8,
    /// EMA weight of the new sample, out of 255
    pub alpha: u8,
    pub reserved: u8,
    pub time_constant_ms: u16,
    /// Units per second, 0 = unlimited
    pub rise_rate: i32,
    pub fall_rate: i32,
    pub debounce_ms: u16,
    pub hysteresis: u16,
}

impl Default for CfgFilter {
    fn default() -> Self {
        Self {
            input_id: CH_REF_NONE,
            filter_type: 0,
            window_size: 8,
            alpha: 64,
            reserved: 0,
            time_constant_ms: 100,
            rise_rate: 0,
            fall_rate: 0,
            debounce_ms: 0,
            hysteresis: 0,
        }
    }
}

impl CfgFilter {
    pub fn kind(&self) -> Option<FilterType> {
        FilterType::from_code(self.filter_type)
    }
}

impl WireConfig for CfgFilter {
    const SIZE: usize = 2 + 1 + 1 + 1 + 1 + 2 + 4 + 4 + 2 + 2;

    fn read(r: &mut WireReader<'_>) -> Result<Self, LayoutError> {
        Ok(Self {
            input_id: r.u16()?,
            filter_type: r.u8()?,
            window_size: r.u8()?,
            alpha: r.u8()?,
            reserved: r.u8()?,
            time_constant_ms: r.u16()?,
            rise_rate: r.i32()?,
            fall_rate: r.i32()?,
            debounce_ms: r.u16()?,
            hysteresis: r.u16()?,
        })
    }

    fn write(&self, w: &mut WireWriter<'_>) -> Result<(), LayoutError> {
        w.put_u16(self.input_id)?;
        w.put_u8(self.filter_type)?;
        w.put_u8(self.window_size)?;
        w.put_u8(self.alpha)?;
        w.put_u8(self.reserved)?;
        w.put_u16(self.time_constant_ms)?;
        w.put_i32(self.rise_rate)?;
        w.put_i32(self.fall_rate)?;
        w.put_u16(self.debounce_ms)?;
        w.put_u16(self.hysteresis)
    }
}

/// PID controller channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CfgPid {
    /// Setpoint source; when unconnected `setpoint_value` is used
    pub setpoint_id: ChannelRef,
    pub feedback_id: ChannelRef,
    pub setpoint_value: i32,
    pub kp: i32,
    pub ki: i32,
    pub kd: i32,
    pub scale: u16,
    pub deadband: u16,
    pub output_min: i32,
    pub output_max: i32,
    pub integral_min: i32,
    pub integral_max: i32,
    pub d_on_measurement: u8,
    pub reset_integral_on_setpoint: u8,
    pub reserved: u16,
}

impl Default for CfgPid {
    fn default() -> Self {
        Self {
            setpoint_id: CH_REF_NONE,
            feedback_id: CH_REF_NONE,
            setpoint_value: 0,
            kp: 1000,
            ki: 0,
            kd: 0,
            scale: pmu_blocks::pid::DEFAULT_SCALE as u16,
            deadband: 0,
            output_min: 0,
            output_max: 1000,
            integral_min: 0,
            integral_max: 0,
            d_on_measurement: 0,
            reset_integral_on_setpoint: 0,
            reserved: 0,
        }
    }
}

impl CfgPid {
    pub fn pid_config(&self) -> PidConfig {
        PidConfig {
            kp: self.kp,
            ki: self.ki,
            kd: self.kd,
            scale: self.scale as i32,
            deadband: self.deadband as i32,
            output_min: self.output_min,
            output_max: self.output_max,
            integral_min: self.integral_min,
            integral_max: self.integral_max,
            d_on_measurement: self.d_on_measurement != 0,
            reset_integral_on_setpoint: self.reset_integral_on_setpoint != 0,
        }
    }
}

impl WireConfig for CfgPid {
    const SIZE: usize = 2 + 2 + 4 + 4 * 3 + 2 + 2 + 4 * 4 + 1 + 1 + 2;

    fn read(r: &mut WireReader<'_>) -> Result<Self, LayoutError> {
        Ok(Self {
            setpoint_id: r.u16()?,
            feedback_id: r.u16()?,
            setpoint_value: r.i32()?,
            kp: r.i32()?,
            ki: r.i32()?,
            kd: r.i32()?,
            scale: r.u16()?,
            deadband: r.u16()?,
            output_min: r.i32()?,
            output_max: r.i32()?,
            integral_min: r.i32()?,
            integral_max: r.i32()?,
            d_on_measurement: r.u8()?,
            reset_integral_on_setpoint: r.u8()?,
            reserved: r.u16()?,
        })
    }

    fn write(&self, w: &mut WireWriter<'_>) -> Result<(), LayoutError> {
        w.put_u16(self.setpoint_id)?;
        w.put_u16(self.feedback_id)?;
        w.put_i32(self.setpoint_value)?;
        w.put_i32(self.kp)?;
        w.put_i32(self.ki)?;
        w.put_i32(self.kd)?;
        w.put_u16(self.scale)?;
        w.put_u16(self.deadband)?;
        w.put_i32(self.output_min)?;
        w.put_i32(self.output_max)?;
        w.put_i32(self.integral_min)?;
        w.put_i32(self.integral_max)?;
        w.put_u8(self.d_on_measurement)?;
        w.put_u8(self.reset_integral_on_setpoint)?;
        w.put_u16(self.reserved)
    }
}

/// User-adjustable constant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CfgNumber {
    pub value: i32,
    pub min: i32,
    pub max: i32,
    /// Quantisation of written values, 0 = any value
    pub step: i32,
    pub decimal_places: u8,
    pub reserved: [u8; 3],
}

impl Default for CfgNumber {
    fn default() -> Self {
        Self {
            value: 0,
            min: 0,
            max: 1000,
            step: 1,
            decimal_places: 0,
            reserved: [0; 3],
        }
    }
}

impl WireConfig for CfgNumber {
    const SIZE: usize = 4 * 4 + 1 + 3;

    fn read(r: &mut WireReader<'_>) -> Result<Self, LayoutError> {
        Ok(Self {
            value: r.i32()?,
            min: r.i32()?,
            max: r.i32()?,
            step: r.i32()?,
            decimal_places: r.u8()?,
            reserved: [r.u8()?, r.u8()?, r.u8()?],
        })
    }

    fn write(&self, w: &mut WireWriter<'_>) -> Result<(), LayoutError> {
        w.put_i32(self.value)?;
        w.put_i32(self.min)?;
        w.put_i32(self.max)?;
        w.put_i32(self.step)?;
        w.put_u8(self.decimal_places)?;
        w.put_bytes(&self.reserved)
    }
}

/// Selector / lookup switch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CfgSwitch {
    pub input_id: ChannelRef,
    /// [`SwitchMode`] code
    pub mode: u8,
    pub case_count: u8,
    pub default_value: i32,
    pub case_values: [i32; MAX_SWITCH_CASES],
    pub case_results: [i32; MAX_SWITCH_CASES],
}

impl Default for CfgSwitch {
    fn default() -> Self {
        Self {
            input_id: CH_REF_NONE,
            mode: 0,
            case_count: 0,
            default_value: 0,
            case_values: [0; MAX_SWITCH_CASES],
            case_results: [0; MAX_SWITCH_CASES],
        }
    }
}

impl CfgSwitch {
    pub fn switch_mode(&self) -> Option<SwitchMode> {
        SwitchMode::from_code(self.mode)
    }

    /// Configured `(values, results)` pairs
    pub fn cases(&self) -> (&[i32], &[i32]) {
        let n = (self.case_count as usize).min(MAX_SWITCH_CASES);
        (&self.case_values[..n], &self.case_results[..n])
    }
}

impl WireConfig for CfgSwitch {
    const SIZE: usize = 2 + 1 + 1 + 4 + 4 * MAX_SWITCH_CASES * 2;

    fn read(r: &mut WireReader<'_>) -> Result<Self, LayoutError> {
        Ok(Self {
            input_id: r.u16()?,
            mode: r.u8()?,
            case_count: r.u8()?,
            default_value: r.i32()?,
            case_values: r.i32_array()?,
            case_results: r.i32_array()?,
        })
    }

    fn write(&self, w: &mut WireWriter<'_>) -> Result<(), LayoutError> {
        w.put_u16(self.input_id)?;
        w.put_u8(self.mode)?;
        w.put_u8(self.case_count)?;
        w.put_i32(self.default_value)?;
        w.put_i32_slice(&self.case_values)?;
        w.put_i32_slice(&self.case_results)
    }
}

/// Up/down counter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CfgCounter {
    pub inc_id: ChannelRef,
    pub dec_id: ChannelRef,
    pub reset_id: ChannelRef,
    /// [`EdgeMode`] code applied to inc and dec
    pub edge_mode: u8,
    pub wrap: u8,
    pub initial_value: i32,
    pub min: i32,
    pub max: i32,
    pub step: i32,
}

impl Default for CfgCounter {
    fn default() -> Self {
        Self {
            inc_id: CH_REF_NONE,
            dec_id: CH_REF_NONE,
            reset_id: CH_REF_NONE,
            edge_mode: EdgeMode::Rising.code(),
            wrap: 0,
            initial_value: 0,
            min: 0,
            max: 100,
            step: 1,
        }
    }
}

impl CfgCounter {
    pub fn counter_config(&self) -> Option<CounterConfig> {
        Some(CounterConfig {
            edge_mode: EdgeMode::from_code(self.edge_mode)?,
            wrap: self.wrap != 0,
            initial_value: self.initial_value,
            min: self.min,
            max: self.max,
            step: self.step,
        })
    }
}

impl WireConfig for CfgCounter {
    const SIZE: usize = 2 * 3 + 1 + 1 + 4 * 4;

    fn read(r: &mut WireReader<'_>) -> Result<Self, LayoutError> {
        Ok(Self {
            inc_id: r.u16()?,
            dec_id: r.u16()?,
            reset_id: r.u16()?,
            edge_mode: r.u8()?,
            wrap: r.u8()?,
            initial_value: r.i32()?,
            min: r.i32()?,
            max: r.i32()?,
            step: r.i32()?,
        })
    }

    fn write(&self, w: &mut WireWriter<'_>) -> Result<(), LayoutError> {
        w.put_u16(self.inc_id)?;
        w.put_u16(self.dec_id)?;
        w.put_u16(self.reset_id)?;
        w.put_u8(self.edge_mode)?;
        w.put_u8(self.wrap)?;
        w.put_i32(self.initial_value)?;
        w.put_i32(self.min)?;
        w.put_i32(self.max)?;
        w.put_i32(self.step)
    }
}

/// Latch / flip-flop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CfgFlipFlop {
    /// [`FlipFlopKind`] code
    pub ff_type: u8,
    /// SR only: set wins when both inputs are high
    pub set_priority: u8,
    /// S, D, T or J
    pub input_a: ChannelRef,
    /// R or K
    pub input_b: ChannelRef,
    /// Clock, or enable for the latch types
    pub clock_id: ChannelRef,
    pub initial_state: u8,
    pub reserved: u8,
}

impl Default for CfgFlipFlop {
    fn default() -> Self {
        Self {
            ff_type: 0,
            set_priority: 0,
            input_a: CH_REF_NONE,
            input_b: CH_REF_NONE,
            clock_id: CH_REF_NONE,
            initial_state: 0,
            reserved: 0,
        }
    }
}

impl CfgFlipFlop {
    pub fn kind(&self) -> Option<FlipFlopKind> {
        FlipFlopKind::from_code(self.ff_type)
    }
}

impl WireConfig for CfgFlipFlop {
    const SIZE: usize = 1 + 1 + 2 * 3 + 1 + 1;

    fn read(r: &mut WireReader<'_>) -> Result<Self, LayoutError> {
        Ok(Self {
            ff_type: r.u8()?,
            set_priority: r.u8()?,
            input_a: r.u16()?,
            input_b: r.u16()?,
            clock_id: r.u16()?,
            initial_state: r.u8()?,
            reserved: r.u8()?,
        })
    }

    fn write(&self, w: &mut WireWriter<'_>) -> Result<(), LayoutError> {
        w.put_u8(self.ff_type)?;
        w.put_u8(self.set_priority)?;
        w.put_u16(self.input_a)?;
        w.put_u16(self.input_b)?;
        w.put_u16(self.clock_id)?;
        w.put_u8(self.initial_state)?;
        w.put_u8(self.reserved)
    }
}

/// Hysteresis comparator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CfgHysteresis {
    pub input_id: ChannelRef,
    /// [`HysteresisKind`] code
    pub hyst_type: u8,
    pub level_count: u8,
    /// Simple: switch-on threshold. Window: upper bound.
    pub threshold_high: i32,
    /// Simple: switch-off threshold. Window: lower bound.
    pub threshold_low: i32,
    pub window_hysteresis: i32,
    pub level_up: [i32; MAX_LEVELS],
    pub level_down: [i32; MAX_LEVELS],
}

impl Default for CfgHysteresis {
    fn default() -> Self {
        Self {
            input_id: CH_REF_NONE,
            hyst_type: 0,
            level_count: 0,
            threshold_high: 0,
            threshold_low: 0,
            window_hysteresis: 0,
            level_up: [0; MAX_LEVELS],
            level_down: [0; MAX_LEVELS],
        }
    }
}

impl CfgHysteresis {
    pub fn kind(&self) -> Option<HysteresisKind> {
        HysteresisKind::from_code(self.hyst_type)
    }

    /// Configured `(up, down)` ladder
    pub fn levels(&self) -> (&[i32], &[i32]) {
        let n = (self.level_count as usize).min(MAX_LEVELS);
        (&self.level_up[..n], &self.level_down[..n])
    }
}

impl WireConfig for CfgHysteresis {
    const SIZE: usize = 2 + 1 + 1 + 4 * 3 + 4 * MAX_LEVELS * 2;

    fn read(r: &mut WireReader<'_>) -> Result<Self, LayoutError> {
        Ok(Self {
            input_id: r.u16()?,
            hyst_type: r.u8()?,
            level_count: r.u8()?,
            threshold_high: r.i32()?,
            threshold_low: r.i32()?,
            window_hysteresis: r.i32()?,
            level_up: r.i32_array()?,
            level_down: r.i32_array()?,
        })
    }

    fn write(&self, w: &mut WireWriter<'_>) -> Result<(), LayoutError> {
        w.put_u16(self.input_id)?;
        w.put_u8(self.hyst_type)?;
        w.put_u8(self.level_count)?;
        w.put_i32(self.threshold_high)?;
        w.put_i32(self.threshold_low)?;
        w.put_i32(self.window_hysteresis)?;
        w.put_i32_slice(&self.level_up)?;
        w.put_i32_slice(&self.level_down)
    }
}

const _: () = assert!(CfgTimer::SIZE == 16);
const _: () = assert!(CfgLogic::SIZE == 24);
const _: () = assert!(CfgMath::SIZE == 36);
const _: () = assert!(CfgFilter::SIZE == 20);
const _: () = assert!(CfgPid::SIZE == 44);
const _: () = assert!(CfgNumber::SIZE == 20);
const _: () = assert!(CfgSwitch::SIZE == 136);
const _: () = assert!(CfgCounter::SIZE == 24);
const _: () = assert!(CfgFlipFlop::SIZE == 10);
const _: () = assert!(CfgHysteresis::SIZE == 80);
