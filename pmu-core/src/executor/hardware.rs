//! Hardware-bound channel types
//!
//! Inputs turn a raw reading from [`ChannelBus::read_hardware`] into an
//! engineering value; outputs condition their source into the command the
//! driver layer applies. Neither side touches hardware directly.

use pmu_blocks::filter::{DebounceState, LpfState, DEFAULT_LPF_SCALE};
use pmu_blocks::math;

use super::{ChannelBus, ExecContext};
use crate::channel::{is_connected, ChannelFlags, ChannelRef, HwBinding};
use crate::config::{
    CfgAnalogInput, CfgCanInput, CfgDigitalInput, CfgFrequencyInput, CfgHBridge, CfgPowerOutput,
    CfgPwmOutput, HBridgeMode, DUTY_FULL_SCALE,
};

impl<B: ChannelBus> ExecContext<B> {
    pub(super) fn exec_digital_input(
        &self,
        cfg: &CfgDigitalInput,
        state: &mut DebounceState,
        hw: HwBinding,
        flags: ChannelFlags,
    ) -> i32 {
        let raw = self.bus.read_hardware(hw);
        let active = (raw != 0) == cfg.is_active_high();
        let level = active ^ flags.is_inverted();
        state.update(level as i32, cfg.debounce_ms as u32, 0, self.dt_ms)
    }

    pub(super) fn exec_analog_input(&self, cfg: &CfgAnalogInput, state: &mut LpfState, hw: HwBinding) -> i32 {
        let raw = self.bus.read_hardware(hw);
        let mapped = math::map(raw, cfg.in_min, cfg.in_max, cfg.out_min, cfg.out_max);
        state.update(mapped, cfg.filter_ms as u32, self.dt_ms, DEFAULT_LPF_SCALE)
    }

    pub(super) fn exec_frequency_input(&self, cfg: &CfgFrequencyInput, hw: HwBinding) -> i32 {
        math::scale(self.bus.read_hardware(hw), cfg.multiplier, cfg.divider)
    }

    pub(super) fn exec_can_input(&self, cfg: &CfgCanInput, hw: HwBinding) -> i32 {
        if cfg.divider == 0 {
            return 0;
        }
        let raw = self.bus.read_hardware(hw);
        let scaled = math::scale(raw, cfg.multiplier as i32, cfg.divider as i32);
        math::add(scaled, cfg.offset as i32)
    }

    pub(super) fn exec_power_output(&self, cfg: &CfgPowerOutput, source: ChannelRef, flags: ChannelFlags) -> i32 {
        let command = self.input(source);
        if cfg.is_pwm() {
            math::clamp(command, 0, DUTY_FULL_SCALE)
        } else {
            ((command != 0) ^ flags.is_inverted()) as i32
        }
    }

    pub(super) fn exec_pwm_output(&self, cfg: &CfgPwmOutput, source: ChannelRef) -> i32 {
        if !is_connected(source) {
            return cfg.default_duty as i32;
        }
        math::clamp(self.input(source), cfg.min_duty as i32, cfg.max_duty as i32)
    }

    pub(super) fn exec_hbridge(&self, cfg: &CfgHBridge, source: ChannelRef) -> i32 {
        let command = self.input(source);
        if (command as i64).abs() <= cfg.deadband as i64 {
            return 0;
        }
        let limit = cfg.max_duty as i32;
        let floor = match cfg.bridge_mode() {
            Some(HBridgeMode::ForwardOnly) => 0,
            _ => -limit,
        };
        math::clamp(command, floor, limit)
    }
}
