//! Execution-time channel state

use pmu_blocks::counter::CounterState;
use pmu_blocks::filter::{
    DebounceState, EmaState, FilterType, LpfState, MedianState, RateLimiterState, SmaState,
};
use pmu_blocks::flipflop::FlipFlopState;
use pmu_blocks::hysteresis::{HysteresisKind, HysteresisState, MultiLevelState, WindowState};
use pmu_blocks::math;
use pmu_blocks::pid::PidState;
use pmu_blocks::timer::TimerState;

use super::model::{initial_value, Channel};
use super::types::{ChannelFlags, ChannelId, ChannelRef, ChannelType, HwBinding};
use crate::config::{CfgNumber, ChannelConfig};

/// Rejected user write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WriteError {
    /// Channel has the `READONLY` flag
    ReadOnly,
    /// Only Number channels accept user values
    NotWritable,
}

/// Per-channel block state
///
/// Built from the configuration by [`ChannelState::for_config`], so the
/// variant always matches the channel type.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ChannelState {
    /// Stateless channel types
    None,
    Timer(TimerState),
    Counter(CounterState),
    Pid(PidState),
    Sma(SmaState),
    Ema(EmaState),
    Lpf(LpfState),
    Median(MedianState),
    RateLimiter(RateLimiterState),
    Debounce(DebounceState),
    FlipFlop(FlipFlopState),
    Hysteresis(HysteresisState),
    Window(WindowState),
    MultiLevel(MultiLevelState),
}

impl ChannelState {
    /// Fresh state for a configuration
    ///
    /// Digital inputs debounce and analog inputs low-pass filter their raw
    /// reading, so they carry state too.
    pub fn for_config(config: &ChannelConfig) -> Self {
        match config {
            ChannelConfig::DigitalInput(_) => Self::Debounce(DebounceState::new()),
            ChannelConfig::AnalogInput(_) => Self::Lpf(LpfState::new()),
            ChannelConfig::Timer(_) => Self::Timer(TimerState::new()),
            ChannelConfig::Counter(c) => Self::Counter(CounterState::new(c.initial_value)),
            ChannelConfig::Pid(_) => Self::Pid(PidState::new()),
            ChannelConfig::Filter(c) => match c.kind() {
                Some(FilterType::Sma) => Self::Sma(SmaState::new()),
                Some(FilterType::Ema) => Self::Ema(EmaState::new()),
                Some(FilterType::LowPass) => Self::Lpf(LpfState::new()),
                Some(FilterType::Median) => Self::Median(MedianState::new()),
                Some(FilterType::RateLimit) => Self::RateLimiter(RateLimiterState::new()),
                Some(FilterType::Debounce) => Self::Debounce(DebounceState::new()),
                None => Self::None,
            },
            ChannelConfig::FlipFlop(c) => Self::FlipFlop(FlipFlopState::new(c.initial_state != 0)),
            ChannelConfig::Hysteresis(c) => match c.kind() {
                Some(HysteresisKind::Simple) => Self::Hysteresis(HysteresisState::new()),
                Some(HysteresisKind::Window) => Self::Window(WindowState::new()),
                Some(HysteresisKind::MultiLevel) => Self::MultiLevel(MultiLevelState::new()),
                None => Self::None,
            },
            _ => Self::None,
        }
    }
}

/// Execution-time view of a channel
///
/// The configuration is fixed for the lifetime of the runtime; a new
/// configuration means a new runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChannelRuntime {
    pub id: ChannelId,
    pub flags: ChannelFlags,
    pub value: i32,
    /// Value from the previous tick
    pub prev_value: i32,
    pub hw: HwBinding,
    pub source_id: ChannelRef,
    config: ChannelConfig,
    state: ChannelState,
}

impl ChannelRuntime {
    pub fn new(id: ChannelId, config: ChannelConfig) -> Self {
        let value = initial_value(&config, 0);
        Self {
            id,
            flags: ChannelFlags::default(),
            value,
            prev_value: value,
            hw: HwBinding::UNBOUND,
            source_id: super::types::CH_REF_NONE,
            state: ChannelState::for_config(&config),
            config,
        }
    }

    pub fn from_channel(channel: &Channel) -> Self {
        let mut runtime = Self::new(channel.id, channel.config);
        runtime.flags = channel.flags;
        runtime.hw = channel.hw;
        runtime.source_id = channel.source_id;
        runtime.value = initial_value(&channel.config, channel.default_value);
        runtime.prev_value = runtime.value;
        runtime
    }

    pub fn channel_type(&self) -> ChannelType {
        self.config.channel_type()
    }

    pub fn config(&self) -> &ChannelConfig {
        &self.config
    }

    pub fn state(&self) -> &ChannelState {
        &self.state
    }

    pub(crate) fn state_mut(&mut self) -> &mut ChannelState {
        &mut self.state
    }

    /// Configuration and state borrowed together for dispatch
    pub(crate) fn parts_mut(&mut self) -> (&ChannelConfig, &mut ChannelState) {
        (&self.config, &mut self.state)
    }

    /// Full initialisation: every piece of history is dropped
    pub fn init_state(&mut self) {
        self.state = ChannelState::for_config(&self.config);
    }

    /// Reset on reconfiguration
    ///
    /// Clears state and zeroes the value. A timer returns to idle without
    /// forgetting the last trigger level, so a held trigger does not look
    /// like a fresh edge; a PID keeps its setpoint history.
    ///
    /// A Number is the exception to zeroing: it returns to its configured
    /// `value`, which is what the user set up as its starting point.
    pub fn reset_state(&mut self) {
        match &mut self.state {
            ChannelState::Timer(t) => t.reset(),
            ChannelState::Pid(p) => p.reset(),
            state => *state = ChannelState::for_config(&self.config),
        }
        self.value = initial_value(&self.config, 0);
        self.prev_value = self.value;
        trace!("Channel {} reset", self.id);
    }

    /// Pause a timer channel; no effect on other types
    pub fn pause_timer(&mut self, now_ms: u32) {
        if let ChannelState::Timer(t) = &mut self.state {
            t.pause(now_ms);
        }
    }

    /// Resume a paused timer channel
    pub fn resume_timer(&mut self, now_ms: u32) {
        if let ChannelState::Timer(t) = &mut self.state {
            t.resume(now_ms);
        }
    }

    /// User write into a Number channel
    ///
    /// The value is snapped to the nearest `step` counted from `min`, then
    /// clamped to `[min, max]`. Returns the stored value.
    pub fn write_number(&mut self, value: i32) -> Result<i32, WriteError> {
        if self.flags.is_readonly() {
            return Err(WriteError::ReadOnly);
        }
        let ChannelConfig::Number(cfg) = &self.config else {
            return Err(WriteError::NotWritable);
        };
        self.value = quantize(value, cfg);
        Ok(self.value)
    }
}

fn quantize(value: i32, cfg: &CfgNumber) -> i32 {
    let snapped = if cfg.step > 0 {
        let step = cfg.step as i64;
        let offset = value as i64 - cfg.min as i64;
        let steps = (offset + step / 2).div_euclid(step);
        math::saturate(cfg.min as i64 + steps * step)
    } else {
        value
    };
    math::clamp(snapped, cfg.min, cfg.max)
}
