//! Virtual channel types

use pmu_blocks::counter::CounterState;
use pmu_blocks::filter::{DebounceState, LpfState, RateLimiterState, DEFAULT_LPF_SCALE};
use pmu_blocks::flipflop::FlipFlopState;
use pmu_blocks::pid::PidState;
use pmu_blocks::table::{Table2D, Table3D};
use pmu_blocks::timer::TimerState;

use super::{ChannelBus, ExecContext};
use crate::channel::is_connected;
use crate::config::{
    CfgCounter, CfgFilter, CfgFlipFlop, CfgLogic, CfgMath, CfgPid, CfgSwitch, CfgTable2D, CfgTable3D,
    CfgTimer, MAX_TABLE_3D_POINTS,
};

impl<B: ChannelBus> ExecContext<B> {
    /// A held reset forces the timer idle before the trigger is looked at
    pub(super) fn exec_timer(&self, cfg: &CfgTimer, state: &mut TimerState) -> i32 {
        if is_connected(cfg.reset_id) && self.input(cfg.reset_id) != 0 {
            state.reset();
            return 0;
        }
        let Some(timer) = cfg.timer_config() else {
            return 0;
        };
        state.update(&timer, self.input(cfg.trigger_id), self.now_ms)
    }

    pub(super) fn exec_logic(&self, cfg: &CfgLogic) -> i32 {
        let Some(op) = cfg.op() else {
            return 0;
        };
        let (values, n) = self.inputs(cfg.active_inputs());
        let result = op.apply(&values[..n], cfg.compare_value);
        if cfg.invert_output != 0 {
            (result == 0) as i32
        } else {
            result
        }
    }

    pub(super) fn exec_math(&self, cfg: &CfgMath) -> i32 {
        let Some(op) = cfg.op() else {
            return 0;
        };
        let (values, n) = self.inputs(cfg.active_inputs());
        op.apply(&values[..n], &cfg.params)
    }

    pub(super) fn exec_table_2d(&self, cfg: &CfgTable2D) -> i32 {
        let (x, y, n) = cfg.widened();
        Table2D::new(&x[..n], &y[..n]).lookup(self.input(cfg.x_input))
    }

    pub(super) fn exec_table_3d(&self, cfg: &CfgTable3D) -> i32 {
        let x = cfg.x_values.map(i32::from);
        let y = cfg.y_values.map(i32::from);
        let z = cfg.widened_z();
        Table3D::new(&x[..cfg.x_count()], &y[..cfg.y_count()], &z, MAX_TABLE_3D_POINTS)
            .lookup(self.input(cfg.x_input), self.input(cfg.y_input))
    }

    pub(super) fn exec_low_pass(&self, cfg: &CfgFilter, state: &mut LpfState) -> i32 {
        state.update(
            self.input(cfg.input_id),
            cfg.time_constant_ms as u32,
            self.dt_ms,
            DEFAULT_LPF_SCALE,
        )
    }

    pub(super) fn exec_rate_limit(&self, cfg: &CfgFilter, state: &mut RateLimiterState) -> i32 {
        state.update(self.input(cfg.input_id), cfg.rise_rate, cfg.fall_rate, self.dt_ms)
    }

    pub(super) fn exec_debounce(&self, cfg: &CfgFilter, state: &mut DebounceState) -> i32 {
        state.update(
            self.input(cfg.input_id),
            cfg.debounce_ms as u32,
            cfg.hysteresis as u32,
            self.dt_ms,
        )
    }

    /// Setpoint comes from a channel when one is wired, else the constant
    pub(super) fn exec_pid(&self, cfg: &CfgPid, state: &mut PidState) -> i32 {
        let setpoint = if is_connected(cfg.setpoint_id) {
            self.input(cfg.setpoint_id)
        } else {
            cfg.setpoint_value
        };
        let measurement = self.input(cfg.feedback_id);
        state.update(&cfg.pid_config(), setpoint, measurement, self.dt_ms)
    }

    pub(super) fn exec_switch(&self, cfg: &CfgSwitch) -> i32 {
        let Some(mode) = cfg.switch_mode() else {
            return cfg.default_value;
        };
        let (values, results) = cfg.cases();
        mode.apply(self.input(cfg.input_id), values, results, cfg.default_value)
    }

    pub(super) fn exec_counter(&self, cfg: &CfgCounter, state: &mut CounterState) -> i32 {
        let Some(counter) = cfg.counter_config() else {
            return state.value();
        };
        state.update(
            &counter,
            self.input(cfg.inc_id),
            self.input(cfg.dec_id),
            self.input(cfg.reset_id),
        )
    }

    pub(super) fn exec_flipflop(&self, cfg: &CfgFlipFlop, state: &mut FlipFlopState) -> i32 {
        let Some(kind) = cfg.kind() else {
            return state.q();
        };
        state.update(
            kind,
            cfg.set_priority != 0,
            self.input(cfg.input_a),
            self.input(cfg.input_b),
            self.input(cfg.clock_id),
        )
    }
}
