//! Validators for virtual (logic) channels

use pmu_blocks::filter::FilterType;
use pmu_blocks::flipflop::FlipFlopKind;
use pmu_blocks::hysteresis::HysteresisKind;
use pmu_blocks::logic::LogicOp;
use pmu_blocks::math::MathOp;
use pmu_blocks::switch::SwitchMode;
use pmu_blocks::timer::TimerMode;
use pmu_blocks::EdgeMode;

use super::{
    bounded, code, fail, flag, increasing, nonzero, optional_ref, ordered, range, required_ref,
    ValidationErrorKind, ValidationLimits, ValidationResult,
};
use crate::channel::{is_connected, ChannelRef};
use crate::config::{
    CfgCounter, CfgFilter, CfgFlipFlop, CfgHysteresis, CfgLogic, CfgMath, CfgNumber, CfgPid,
    CfgSwitch, CfgTable2D, CfgTable3D, CfgTimer, MAX_TABLE_2D_POINTS, MAX_TABLE_3D_POINTS,
};

/// Input count in `[1, max_inputs]` and at least what the operation needs,
/// with every used input connected
fn validate_inputs(
    inputs: &[ChannelRef],
    input_count: u8,
    min_inputs: usize,
    limits: &ValidationLimits,
) -> ValidationResult {
    bounded(ValidationErrorKind::InputCount, "input_count", input_count, 1, limits.max_inputs)?;
    bounded(
        ValidationErrorKind::InputCount,
        "input_count",
        input_count,
        min_inputs as i32,
        limits.max_inputs,
    )?;
    inputs
        .iter()
        .try_for_each(|&r| required_ref("inputs", r, limits))
}

pub fn validate_timer(cfg: &CfgTimer, limits: &ValidationLimits) -> ValidationResult {
    required_ref("trigger_id", cfg.trigger_id, limits)?;
    optional_ref("reset_id", cfg.reset_id, limits)?;
    let mode = code("mode", cfg.mode, cfg.timer_mode(), TimerMode::Blink as i32)?;
    code(
        "start_edge",
        cfg.start_edge,
        EdgeMode::from_code(cfg.start_edge),
        EdgeMode::Both.code() as i32,
    )?;
    range("duration_ms", cfg.duration_ms, 0, limits.max_timer_ms)?;

    match mode {
        TimerMode::Blink => range("blink_on_ms", cfg.blink_on_ms, 1, u16::MAX as i32),
        TimerMode::Pulse
        | TimerMode::OneShot
        | TimerMode::Monostable
        | TimerMode::Retriggerable => range("duration_ms", cfg.duration_ms, 1, limits.max_timer_ms),
        TimerMode::DelayOn | TimerMode::DelayOff => Ok(()),
    }
}

pub fn validate_logic(cfg: &CfgLogic, limits: &ValidationLimits) -> ValidationResult {
    let op = code("operation", cfg.operation, cfg.op(), LogicOp::OutsideRange as i32)?;
    validate_inputs(cfg.active_inputs(), cfg.input_count, op.min_inputs(), limits)?;
    flag("invert_output", cfg.invert_output)
}

pub fn validate_math(cfg: &CfgMath, limits: &ValidationLimits) -> ValidationResult {
    let op = code("operation", cfg.operation, cfg.op(), MathOp::Scale as i32)?;
    validate_inputs(cfg.active_inputs(), cfg.input_count, op.min_inputs(), limits)?;

    let p = &cfg.params;
    match op {
        MathOp::Clamp => ordered("params", p[0], p[1]),
        MathOp::Map if p[0] == p[1] => nonzero("params", 0),
        MathOp::Scale => nonzero("params", p[1]),
        _ => Ok(()),
    }
}

pub fn validate_table_2d(cfg: &CfgTable2D, limits: &ValidationLimits) -> ValidationResult {
    required_ref("x_input", cfg.x_input, limits)?;
    range(
        "count",
        cfg.count,
        1,
        limits.max_table_2d.min(MAX_TABLE_2D_POINTS as i32),
    )?;
    let (x, _, n) = cfg.widened();
    increasing("x_values", &x[..n])
}

pub fn validate_table_3d(cfg: &CfgTable3D, limits: &ValidationLimits) -> ValidationResult {
    required_ref("x_input", cfg.x_input, limits)?;
    required_ref("y_input", cfg.y_input, limits)?;
    let max = limits.max_table_3d.min(MAX_TABLE_3D_POINTS as i32);
    range("x_count", cfg.x_count, 1, max)?;
    range("y_count", cfg.y_count, 1, max)?;

    let x = cfg.x_values.map(i32::from);
    let y = cfg.y_values.map(i32::from);
    increasing("x_values", &x[..cfg.x_count()])?;
    increasing("y_values", &y[..cfg.y_count()])
}

pub fn validate_filter(cfg: &CfgFilter, limits: &ValidationLimits) -> ValidationResult {
    required_ref("input_id", cfg.input_id, limits)?;
    let kind = code("filter_type", cfg.filter_type, cfg.kind(), FilterType::Debounce as i32)?;
    match kind {
        FilterType::Sma => range("window_size", cfg.window_size, 1, limits.max_sma_window),
        FilterType::Median => range("window_size", cfg.window_size, 1, limits.max_median_window),
        FilterType::Ema => range("alpha", cfg.alpha, 1, u8::MAX as i32),
        FilterType::LowPass => range("time_constant_ms", cfg.time_constant_ms, 1, limits.max_filter_ms),
        FilterType::RateLimit => {
            range("rise_rate", cfg.rise_rate, 0, i32::MAX)?;
            range("fall_rate", cfg.fall_rate, 0, i32::MAX)
        }
        FilterType::Debounce => range("debounce_ms", cfg.debounce_ms, 0, limits.max_debounce_ms),
    }
}

pub fn validate_pid(cfg: &CfgPid, limits: &ValidationLimits) -> ValidationResult {
    optional_ref("setpoint_id", cfg.setpoint_id, limits)?;
    required_ref("feedback_id", cfg.feedback_id, limits)?;

    let gain = limits.max_pid_gain;
    range("kp", cfg.kp, -gain, gain)?;
    range("ki", cfg.ki, -gain, gain)?;
    range("kd", cfg.kd, -gain, gain)?;
    nonzero("scale", cfg.scale)?;

    ordered("output_min", cfg.output_min, cfg.output_max)?;
    if cfg.integral_min != 0 || cfg.integral_max != 0 {
        ordered("integral_min", cfg.integral_min, cfg.integral_max)?;
    }
    flag("d_on_measurement", cfg.d_on_measurement)?;
    flag("reset_integral_on_setpoint", cfg.reset_integral_on_setpoint)
}

pub fn validate_number(cfg: &CfgNumber, limits: &ValidationLimits) -> ValidationResult {
    ordered("min", cfg.min, cfg.max)?;
    range("value", cfg.value, cfg.min, cfg.max)?;
    let span = (cfg.max as i64 - cfg.min as i64).min(i32::MAX as i64) as i32;
    range("step", cfg.step, 0, span)?;
    range("decimal_places", cfg.decimal_places, 0, limits.max_decimal_places)
}

pub fn validate_switch(cfg: &CfgSwitch, limits: &ValidationLimits) -> ValidationResult {
    required_ref("input_id", cfg.input_id, limits)?;
    let mode = code("mode", cfg.mode, cfg.switch_mode(), SwitchMode::Range as i32)?;
    bounded(
        ValidationErrorKind::CaseCount,
        "case_count",
        cfg.case_count,
        1,
        limits.max_switch_cases,
    )?;
    match mode {
        SwitchMode::Range => increasing("case_values", cfg.cases().0),
        SwitchMode::Select | SwitchMode::Case => Ok(()),
    }
}

pub fn validate_counter(cfg: &CfgCounter, limits: &ValidationLimits) -> ValidationResult {
    optional_ref("inc_id", cfg.inc_id, limits)?;
    optional_ref("dec_id", cfg.dec_id, limits)?;
    optional_ref("reset_id", cfg.reset_id, limits)?;
    if !is_connected(cfg.inc_id) && !is_connected(cfg.dec_id) {
        return fail(
            ValidationErrorKind::InvalidReference,
            "inc_id",
            cfg.inc_id as i64,
            1,
            limits.max_channel_id,
        );
    }
    code(
        "edge_mode",
        cfg.edge_mode,
        EdgeMode::from_code(cfg.edge_mode),
        EdgeMode::Both.code() as i32,
    )?;
    flag("wrap", cfg.wrap)?;
    ordered("min", cfg.min, cfg.max)?;
    range("step", cfg.step, 1, i32::MAX)
}

pub fn validate_flipflop(cfg: &CfgFlipFlop, limits: &ValidationLimits) -> ValidationResult {
    let kind = code("ff_type", cfg.ff_type, cfg.kind(), FlipFlopKind::TLatch as i32)?;
    flag("set_priority", cfg.set_priority)?;
    flag("initial_state", cfg.initial_state)?;
    required_ref("input_a", cfg.input_a, limits)?;

    if matches!(kind, FlipFlopKind::Sr | FlipFlopKind::Jk) {
        required_ref("input_b", cfg.input_b, limits)?;
    } else {
        optional_ref("input_b", cfg.input_b, limits)?;
    }
    if kind.uses_clock() {
        required_ref("clock_id", cfg.clock_id, limits)
    } else {
        optional_ref("clock_id", cfg.clock_id, limits)
    }
}

pub fn validate_hysteresis(cfg: &CfgHysteresis, limits: &ValidationLimits) -> ValidationResult {
    required_ref("input_id", cfg.input_id, limits)?;
    let kind = code("hyst_type", cfg.hyst_type, cfg.kind(), HysteresisKind::MultiLevel as i32)?;
    match kind {
        HysteresisKind::Simple => ordered("threshold_low", cfg.threshold_low, cfg.threshold_high),
        HysteresisKind::Window => {
            ordered("threshold_low", cfg.threshold_low, cfg.threshold_high)?;
            // Entry band [low + h, high - h] must not be empty
            let half_span = (cfg.threshold_high as i64 - cfg.threshold_low as i64) / 2;
            range(
                "window_hysteresis",
                cfg.window_hysteresis,
                0,
                half_span.min(i32::MAX as i64) as i32,
            )
        }
        HysteresisKind::MultiLevel => {
            range("level_count", cfg.level_count, 1, limits.max_mlevels)?;
            let (up, down) = cfg.levels();
            increasing("level_up", up)?;
            up.iter()
                .zip(down.iter())
                .try_for_each(|(&u, &d)| ordered("level_down", d, u))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::DEFAULT_LIMITS;

    fn logic(op: LogicOp, count: u8) -> CfgLogic {
        let mut cfg = CfgLogic {
            operation: op as u8,
            input_count: count,
            ..Default::default()
        };
        for (i, r) in cfg.inputs.iter_mut().take(count as usize).enumerate() {
            *r = i as u16 + 1;
        }
        cfg
    }

    #[test]
    fn test_logic_single_input() {
        for op in [LogicOp::And, LogicOp::Or, LogicOp::Xor] {
            let err = validate_logic(&logic(op, 1), &DEFAULT_LIMITS).unwrap_err();
            assert_eq!(err.kind, ValidationErrorKind::InputCount);
            assert_eq!(err.expected_min, 2);
        }
        for op in [LogicOp::IsTrue, LogicOp::IsFalse] {
            assert_eq!(validate_logic(&logic(op, 1), &DEFAULT_LIMITS), Ok(()));
        }
    }

    #[test]
    fn test_logic_input_bounds() {
        let err = validate_logic(&logic(LogicOp::Or, 0), &DEFAULT_LIMITS).unwrap_err();
        assert_eq!((err.kind, err.expected_min), (ValidationErrorKind::InputCount, 1));

        let mut cfg = logic(LogicOp::Or, 8);
        cfg.input_count = 9;
        assert_eq!(
            validate_logic(&cfg, &DEFAULT_LIMITS).unwrap_err().kind,
            ValidationErrorKind::InputCount
        );

        let mut cfg = logic(LogicOp::And, 2);
        cfg.inputs[1] = crate::channel::CH_REF_NONE;
        assert_eq!(
            validate_logic(&cfg, &DEFAULT_LIMITS).unwrap_err().kind,
            ValidationErrorKind::InvalidReference
        );
    }

    #[test]
    fn test_logic_bad_operation() {
        let mut cfg = logic(LogicOp::And, 2);
        cfg.operation = 15;
        let err = validate_logic(&cfg, &DEFAULT_LIMITS).unwrap_err();
        assert_eq!(err.kind, ValidationErrorKind::InvalidOperation);
        assert_eq!(err.expected_max, 14);
    }

    #[test]
    fn test_math_scale_divisor() {
        let mut cfg = CfgMath {
            operation: MathOp::Scale as u8,
            input_count: 1,
            params: [3, 0, 0, 0],
            ..Default::default()
        };
        cfg.inputs[0] = 1;
        assert_eq!(
            validate_math(&cfg, &DEFAULT_LIMITS).unwrap_err().kind,
            ValidationErrorKind::ZeroDivisor
        );
        cfg.params[1] = 2;
        assert_eq!(validate_math(&cfg, &DEFAULT_LIMITS), Ok(()));
    }

    #[test]
    fn test_table_monotonic() {
        let mut cfg = CfgTable2D {
            x_input: 1,
            count: 3,
            ..Default::default()
        };
        cfg.x_values[..3].copy_from_slice(&[0, 10, 5]);
        let err = validate_table_2d(&cfg, &DEFAULT_LIMITS).unwrap_err();
        assert_eq!(err.kind, ValidationErrorKind::NotMonotonic);
        assert_eq!(err.actual, 5);

        cfg.x_values[2] = 20;
        assert_eq!(validate_table_2d(&cfg, &DEFAULT_LIMITS), Ok(()));

        cfg.count = 17;
        assert_eq!(validate_table_2d(&cfg, &DEFAULT_LIMITS).unwrap_err().field, "count");
    }

    #[test]
    fn test_table_3d_axes() {
        let mut cfg = CfgTable3D {
            x_input: 1,
            y_input: 2,
            x_count: 2,
            y_count: 2,
            ..Default::default()
        };
        cfg.x_values[..2].copy_from_slice(&[0, 100]);
        cfg.y_values[..2].copy_from_slice(&[50, 50]);
        assert_eq!(validate_table_3d(&cfg, &DEFAULT_LIMITS).unwrap_err().field, "y_values");
    }

    #[test]
    fn test_pid_ranges() {
        let mut cfg = CfgPid {
            feedback_id: 4,
            ..Default::default()
        };
        assert_eq!(validate_pid(&cfg, &DEFAULT_LIMITS), Ok(()));

        cfg.output_min = cfg.output_max;
        assert_eq!(
            validate_pid(&cfg, &DEFAULT_LIMITS).unwrap_err().kind,
            ValidationErrorKind::InvalidOrder
        );

        cfg.output_min = 0;
        cfg.integral_min = 10;
        cfg.integral_max = -10;
        assert_eq!(validate_pid(&cfg, &DEFAULT_LIMITS).unwrap_err().field, "integral_min");

        cfg.integral_min = 0;
        cfg.integral_max = 0;
        cfg.kp = 2_000_000;
        assert_eq!(validate_pid(&cfg, &DEFAULT_LIMITS).unwrap_err().field, "kp");
    }

    #[test]
    fn test_switch_case_count() {
        let cfg = CfgSwitch {
            input_id: 1,
            case_count: 0,
            ..Default::default()
        };
        assert_eq!(
            validate_switch(&cfg, &DEFAULT_LIMITS).unwrap_err().kind,
            ValidationErrorKind::CaseCount
        );
        let cfg = CfgSwitch {
            input_id: 1,
            case_count: 17,
            ..Default::default()
        };
        assert_eq!(
            validate_switch(&cfg, &DEFAULT_LIMITS).unwrap_err().kind,
            ValidationErrorKind::CaseCount
        );
    }

    #[test]
    fn test_counter_and_number_ordering() {
        let cfg = CfgCounter {
            inc_id: 1,
            min: 5,
            max: 5,
            ..Default::default()
        };
        assert_eq!(validate_counter(&cfg, &DEFAULT_LIMITS).unwrap_err().field, "min");

        let cfg = CfgCounter::default();
        assert_eq!(validate_counter(&cfg, &DEFAULT_LIMITS).unwrap_err().field, "inc_id");

        let cfg = CfgNumber {
            value: 2000,
            ..Default::default()
        };
        assert_eq!(validate_number(&cfg, &DEFAULT_LIMITS).unwrap_err().field, "value");
    }

    #[test]
    fn test_flipflop_clock_required() {
        let cfg = CfgFlipFlop {
            ff_type: FlipFlopKind::D as u8,
            input_a: 1,
            ..Default::default()
        };
        assert_eq!(validate_flipflop(&cfg, &DEFAULT_LIMITS).unwrap_err().field, "clock_id");

        let cfg = CfgFlipFlop {
            ff_type: FlipFlopKind::Sr as u8,
            input_a: 1,
            input_b: 2,
            ..Default::default()
        };
        assert_eq!(validate_flipflop(&cfg, &DEFAULT_LIMITS), Ok(()));
    }

    #[test]
    fn test_hysteresis_ranges() {
        let cfg = CfgHysteresis {
            input_id: 1,
            threshold_high: 20,
            threshold_low: 80,
            ..Default::default()
        };
        assert_eq!(
            validate_hysteresis(&cfg, &DEFAULT_LIMITS).unwrap_err().kind,
            ValidationErrorKind::InvalidOrder
        );

        let cfg = CfgHysteresis {
            input_id: 1,
            hyst_type: 1,
            threshold_high: 20,
            threshold_low: 10,
            window_hysteresis: 6,
            ..Default::default()
        };
        assert_eq!(
            validate_hysteresis(&cfg, &DEFAULT_LIMITS).unwrap_err().field,
            "window_hysteresis"
        );

        let mut cfg = CfgHysteresis {
            input_id: 1,
            hyst_type: 2,
            level_count: 2,
            ..Default::default()
        };
        cfg.level_up[..2].copy_from_slice(&[10, 20]);
        cfg.level_down[..2].copy_from_slice(&[5, 25]);
        assert_eq!(validate_hysteresis(&cfg, &DEFAULT_LIMITS).unwrap_err().field, "level_down");
    }

    #[test]
    fn test_timer_blink_needs_on_time() {
        let cfg = CfgTimer {
            trigger_id: 1,
            mode: TimerMode::Blink as u8,
            blink_on_ms: 0,
            ..Default::default()
        };
        assert_eq!(validate_timer(&cfg, &DEFAULT_LIMITS).unwrap_err().field, "blink_on_ms");
    }

    #[test]
    fn test_filter_windows() {
        let cfg = CfgFilter {
            input_id: 1,
            filter_type: FilterType::Median as u8,
            window_size: 17,
            ..Default::default()
        };
        assert_eq!(validate_filter(&cfg, &DEFAULT_LIMITS).unwrap_err().field, "window_size");

        let cfg = CfgFilter {
            input_id: 1,
            filter_type: FilterType::Sma as u8,
            window_size: 17,
            ..Default::default()
        };
        assert_eq!(validate_filter(&cfg, &DEFAULT_LIMITS), Ok(()));
    }
}
