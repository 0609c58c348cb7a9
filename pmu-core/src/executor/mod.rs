//! Channel executor
//!
//! Evaluates one [`ChannelRuntime`] per call by dispatching on its
//! configuration to the blocks in `pmu-blocks`. The executor knows nothing
//! about how values are stored; it reads and publishes them through a
//! [`ChannelBus`] supplied by the channel manager.
//!
//! Per control tick the manager calls [`ExecContext::update_time`] once,
//! then [`ExecContext::process_channel`] for every channel in dependency
//! order. Cycles are not detected here.

mod blocks;
mod hardware;

use pmu_blocks::logic::MAX_INPUTS;
use pmu_blocks::math;

use crate::channel::{is_connected, ChannelId, ChannelRef, ChannelRuntime, ChannelState, HwBinding};
use crate::config::ChannelConfig;

/// Value storage seen by the executor
pub trait ChannelBus {
    /// Current value of a channel
    fn get_value(&self, id: ChannelId) -> i32;

    /// Publish a channel's new value
    fn set_value(&mut self, id: ChannelId, value: i32);

    /// Raw reading of the device behind an input channel
    fn read_hardware(&self, binding: HwBinding) -> i32 {
        let _ = binding;
        0
    }
}

impl<T: ChannelBus + ?Sized> ChannelBus for &mut T {
    fn get_value(&self, id: ChannelId) -> i32 {
        (**self).get_value(id)
    }

    fn set_value(&mut self, id: ChannelId, value: i32) {
        (**self).set_value(id, value)
    }

    fn read_hardware(&self, binding: HwBinding) -> i32 {
        (**self).read_hardware(binding)
    }
}

/// [`ChannelBus`] built from a pair of closures
pub struct FnBus<G, S> {
    get: G,
    set: S,
}

impl<G, S> FnBus<G, S>
where
    G: Fn(ChannelId) -> i32,
    S: FnMut(ChannelId, i32),
{
    pub fn new(get: G, set: S) -> Self {
        Self { get, set }
    }
}

impl<G, S> ChannelBus for FnBus<G, S>
where
    G: Fn(ChannelId) -> i32,
    S: FnMut(ChannelId, i32),
{
    fn get_value(&self, id: ChannelId) -> i32 {
        (self.get)(id)
    }

    fn set_value(&mut self, id: ChannelId, value: i32) {
        (self.set)(id, value)
    }
}

/// Executor state for one control loop
pub struct ExecContext<B> {
    bus: B,
    now_ms: u32,
    last_ms: u32,
    dt_ms: u32,
    started: bool,
}

impl<B: ChannelBus> ExecContext<B> {
    pub fn new(bus: B) -> Self {
        Self {
            bus,
            now_ms: 0,
            last_ms: 0,
            dt_ms: 0,
            started: false,
        }
    }

    /// Advance the tick clock
    ///
    /// The first call establishes the time base and yields `dt_ms == 0`.
    /// Wrap-around of the millisecond counter is handled.
    pub fn update_time(&mut self, now_ms: u32) {
        if self.started {
            self.last_ms = self.now_ms;
            self.dt_ms = now_ms.wrapping_sub(self.now_ms);
        } else {
            self.last_ms = now_ms;
            self.dt_ms = 0;
            self.started = true;
        }
        self.now_ms = now_ms;
    }

    pub fn now_ms(&self) -> u32 {
        self.now_ms
    }

    pub fn last_ms(&self) -> u32 {
        self.last_ms
    }

    pub fn dt_ms(&self) -> u32 {
        self.dt_ms
    }

    pub fn bus(&self) -> &B {
        &self.bus
    }

    pub fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }

    pub fn into_bus(self) -> B {
        self.bus
    }

    /// Resolve a reference; unconnected and id 0 read as 0
    pub fn input(&self, r: ChannelRef) -> i32 {
        if is_connected(r) {
            self.bus.get_value(r)
        } else {
            0
        }
    }

    /// Resolve up to [`MAX_INPUTS`] references
    pub fn inputs(&self, refs: &[ChannelRef]) -> ([i32; MAX_INPUTS], usize) {
        let mut values = [0i32; MAX_INPUTS];
        let n = refs.len().min(MAX_INPUTS);
        for (value, &r) in values.iter_mut().zip(refs[..n].iter()) {
            *value = self.input(r);
        }
        (values, n)
    }

    /// Evaluate one channel for the current tick
    ///
    /// Saves the previous value, computes and stores the new one, publishes
    /// it through the bus and returns it. A disabled channel outputs 0 and
    /// its state does not advance.
    pub fn process_channel(&mut self, runtime: &mut ChannelRuntime) -> i32 {
        runtime.prev_value = runtime.value;
        let value = if runtime.flags.is_enabled() {
            self.evaluate(runtime)
        } else {
            0
        };
        runtime.value = value;
        self.bus.set_value(runtime.id, value);
        value
    }

    /// Process runtimes in slice order
    pub fn process_all(&mut self, runtimes: &mut [ChannelRuntime]) {
        for runtime in runtimes.iter_mut() {
            self.process_channel(runtime);
        }
    }

    fn evaluate(&self, runtime: &mut ChannelRuntime) -> i32 {
        let id = runtime.id;
        let flags = runtime.flags;
        let hw = runtime.hw;
        let source = runtime.source_id;
        let current = runtime.value;
        let (config, state) = runtime.parts_mut();

        match (config, state) {
            // Inputs
            (ChannelConfig::DigitalInput(c), ChannelState::Debounce(s)) => {
                self.exec_digital_input(c, s, hw, flags)
            }
            (ChannelConfig::AnalogInput(c), ChannelState::Lpf(s)) => self.exec_analog_input(c, s, hw),
            (ChannelConfig::FrequencyInput(c), _) => self.exec_frequency_input(c, hw),
            (ChannelConfig::CanInput(c), _) => self.exec_can_input(c, hw),

            // Outputs
            (ChannelConfig::PowerOutput(c), _) => self.exec_power_output(c, source, flags),
            (ChannelConfig::PwmOutput(c), _) => self.exec_pwm_output(c, source),
            (ChannelConfig::HBridge(c), _) => self.exec_hbridge(c, source),
            (ChannelConfig::CanOutput(_), _) => self.input(source),

            // Virtual
            (ChannelConfig::Timer(c), ChannelState::Timer(s)) => self.exec_timer(c, s),
            (ChannelConfig::Logic(c), _) => self.exec_logic(c),
            (ChannelConfig::Math(c), _) => self.exec_math(c),
            (ChannelConfig::Table2D(c), _) => self.exec_table_2d(c),
            (ChannelConfig::Table3D(c), _) => self.exec_table_3d(c),
            (ChannelConfig::Filter(c), ChannelState::Sma(s)) => s.update(self.input(c.input_id), c.window_size),
            (ChannelConfig::Filter(c), ChannelState::Ema(s)) => s.update(self.input(c.input_id), c.alpha),
            (ChannelConfig::Filter(c), ChannelState::Lpf(s)) => self.exec_low_pass(c, s),
            (ChannelConfig::Filter(c), ChannelState::Median(s)) => {
                s.update(self.input(c.input_id), c.window_size)
            }
            (ChannelConfig::Filter(c), ChannelState::RateLimiter(s)) => self.exec_rate_limit(c, s),
            (ChannelConfig::Filter(c), ChannelState::Debounce(s)) => self.exec_debounce(c, s),
            (ChannelConfig::Pid(c), ChannelState::Pid(s)) => self.exec_pid(c, s),
            (ChannelConfig::Number(c), _) => math::clamp(current, c.min, c.max),
            (ChannelConfig::Switch(c), _) => self.exec_switch(c),
            (ChannelConfig::Counter(c), ChannelState::Counter(s)) => self.exec_counter(c, s),
            (ChannelConfig::FlipFlop(c), ChannelState::FlipFlop(s)) => self.exec_flipflop(c, s),
            (ChannelConfig::Hysteresis(c), ChannelState::Hysteresis(s)) => {
                s.update(self.input(c.input_id), c.threshold_high, c.threshold_low)
            }
            (ChannelConfig::Hysteresis(c), ChannelState::Window(s)) => s.update(
                self.input(c.input_id),
                c.threshold_low,
                c.threshold_high,
                c.window_hysteresis,
            ),
            (ChannelConfig::Hysteresis(c), ChannelState::MultiLevel(s)) => {
                let (up, down) = c.levels();
                s.update(self.input(c.input_id), up, down)
            }

            (config, state) => {
                error!(
                    "Channel {}: no state for {}, holding value",
                    id,
                    config.channel_type()
                );
                *state = ChannelState::for_config(config);
                current
            }
        }
    }
}

/// Initialise a runtime's state after (re)loading configuration
pub fn init_channel_state(runtime: &mut ChannelRuntime) {
    runtime.init_state();
}

/// Reset a runtime on reconfiguration
pub fn reset_channel_state(runtime: &mut ChannelRuntime) {
    runtime.reset_state();
}
