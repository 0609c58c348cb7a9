//! Property tests for the primitive blocks

use pmu_blocks::counter::{CounterConfig, CounterState};
use pmu_blocks::edge::EdgeMode;
use pmu_blocks::filter::{
    EmaState, LpfState, MedianState, RateLimiterState, SmaState, DEFAULT_LPF_SCALE,
    MAX_MEDIAN_WINDOW, MAX_SMA_WINDOW,
};
use pmu_blocks::flipflop::FlipFlopState;
use pmu_blocks::math;
use pmu_blocks::pid::{PidConfig, PidState};
use pmu_blocks::table::Table2D;
use pmu_blocks::timer::{TimerConfig, TimerMode, TimerState};
use proptest::prelude::*;

proptest! {
    #[test]
    fn div_and_mod_by_zero_are_zero(a in any::<i32>()) {
        prop_assert_eq!(math::div(a, 0), 0);
        prop_assert_eq!(math::modulo(a, 0), 0);
    }

    #[test]
    fn div_and_mod_never_panic(a in any::<i32>(), b in any::<i32>()) {
        let _ = math::div(a, b);
        let _ = math::modulo(a, b);
        let _ = math::scale(a, b, a);
    }

    #[test]
    fn map_is_monotonic(a in 0i32..=1000, b in 0i32..=1000) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(math::map(lo, 0, 1000, 0, 100) <= math::map(hi, 0, 1000, 0, 100));
    }

    #[test]
    fn sma_of_identical_inputs_is_exact(v in any::<i32>(), window in 1u8..=MAX_SMA_WINDOW as u8) {
        let mut sma = SmaState::new();
        let mut out = 0;
        for _ in 0..window {
            out = sma.update(v, window);
        }
        prop_assert_eq!(out, v);
    }

    #[test]
    fn median_of_identical_inputs_is_exact(v in any::<i32>(), window in 1u8..=MAX_MEDIAN_WINDOW as u8) {
        let mut median = MedianState::new();
        let mut out = 0;
        for _ in 0..window {
            out = median.update(v, window);
        }
        prop_assert_eq!(out, v);
    }

    #[test]
    fn table_hits_breakpoints(start in -10_000i32..10_000, steps in proptest::collection::vec((1i32..500, -5000i32..5000), 2..16)) {
        let mut x = [0i32; 16];
        let mut y = [0i32; 16];
        let mut cursor = start;
        for (i, (dx, yv)) in steps.iter().enumerate() {
            cursor += dx;
            x[i] = cursor;
            y[i] = *yv;
        }
        let n = steps.len();
        let table = Table2D::new(&x[..n], &y[..n]);
        for i in 0..n {
            prop_assert_eq!(table.lookup(x[i]), y[i]);
        }
    }

    #[test]
    fn sr_latch_reset_wins(initial in any::<bool>()) {
        let mut ff = FlipFlopState::new(initial);
        prop_assert_eq!(ff.sr(1, 1), 0);
    }

    #[test]
    fn delay_on_is_low_until_duration(duration in 1u32..100_000, t0 in any::<u32>(), elapsed in 0u32..100_000) {
        let cfg = TimerConfig {
            mode: TimerMode::DelayOn,
            start_edge: EdgeMode::Level,
            duration_ms: duration,
            blink_on_ms: 0,
            blink_off_ms: 0,
        };
        let mut timer = TimerState::new();
        timer.update(&cfg, 1, t0);
        let out = timer.update(&cfg, 1, t0.wrapping_add(elapsed));
        prop_assert_eq!(out, (elapsed >= duration) as i32);
    }
}

// Stateful blocks fed arbitrary samples and tick gaps never trap and stay
// inside their documented bounds.
proptest! {
    #[test]
    fn pid_output_stays_within_limits(
        kp in -1_000_000i32..=1_000_000,
        ki in -1_000_000i32..=1_000_000,
        kd in -1_000_000i32..=1_000_000,
        scale in 1i32..=u16::MAX as i32,
        deadband in 0i32..=u16::MAX as i32,
        limits in (any::<i32>(), any::<i32>()).prop_filter("ordered", |(a, b)| a < b),
        d_on_measurement in any::<bool>(),
        reset_integral_on_setpoint in any::<bool>(),
        steps in proptest::collection::vec((any::<i32>(), any::<i32>(), any::<u32>()), 1..12),
    ) {
        let cfg = PidConfig {
            kp,
            ki,
            kd,
            scale,
            deadband,
            output_min: limits.0,
            output_max: limits.1,
            integral_min: 0,
            integral_max: 0,
            d_on_measurement,
            reset_integral_on_setpoint,
        };
        let mut pid = PidState::new();
        let mut last = None;
        for (setpoint, measurement, dt) in steps {
            let out = pid.update(&cfg, setpoint, measurement, dt);
            if dt == 0 {
                prop_assert_eq!(out, last.unwrap_or(0));
            } else {
                prop_assert!(out >= cfg.output_min && out <= cfg.output_max);
                last = Some(out);
            }
        }
    }

    #[test]
    fn lpf_stays_within_input_hull(
        tau in 0u32..=60_000,
        samples in proptest::collection::vec((any::<i32>(), any::<u32>()), 1..12),
    ) {
        let mut lpf = LpfState::new();
        let (mut lo, mut hi) = (i32::MAX, i32::MIN);
        for (input, dt) in samples {
            lo = lo.min(input);
            hi = hi.max(input);
            let out = lpf.update(input, tau, dt, DEFAULT_LPF_SCALE);
            prop_assert!(out >= lo && out <= hi);
        }
    }

    #[test]
    fn ema_stays_within_input_hull(
        alpha in any::<u8>(),
        samples in proptest::collection::vec(any::<i32>(), 1..12),
    ) {
        let mut ema = EmaState::new();
        let (mut lo, mut hi) = (i32::MAX, i32::MIN);
        for input in samples {
            lo = lo.min(input);
            hi = hi.max(input);
            let out = ema.update(input, alpha);
            prop_assert!(out >= lo && out <= hi);
        }
    }

    #[test]
    fn rate_limiter_moves_toward_input(
        rise in any::<i32>(),
        fall in any::<i32>(),
        first in any::<i32>(),
        samples in proptest::collection::vec((any::<i32>(), any::<u32>()), 1..12),
    ) {
        let mut limiter = RateLimiterState::new();
        let mut prev = limiter.update(first, rise, fall, 0);
        prop_assert_eq!(prev, first);
        for (input, dt) in samples {
            let out = limiter.update(input, rise, fall, dt);
            prop_assert!(out >= prev.min(input) && out <= prev.max(input));
            prev = out;
        }
    }

    #[test]
    fn counter_stays_in_range_or_at_initial(
        edge_mode in prop::sample::select(vec![
            EdgeMode::Level,
            EdgeMode::Rising,
            EdgeMode::Falling,
            EdgeMode::Both,
        ]),
        wrap in any::<bool>(),
        initial_value in any::<i32>(),
        min in any::<i32>(),
        max in any::<i32>(),
        step in any::<i32>(),
        inputs in proptest::collection::vec((any::<i32>(), any::<i32>(), any::<i32>()), 1..24),
    ) {
        let cfg = CounterConfig {
            edge_mode,
            wrap,
            initial_value,
            min,
            max,
            step,
        };
        let mut counter = CounterState::new(initial_value);
        for (inc, dec, reset) in inputs {
            let out = counter.update(&cfg, inc, dec, reset);
            prop_assert_eq!(out, counter.value());
            prop_assert!(out == initial_value || (out >= min.min(max) && out <= max.max(min)));
        }
    }
}

#[test]
fn counter_wraps_once_after_ten_increments() {
    let cfg = CounterConfig {
        edge_mode: EdgeMode::Rising,
        wrap: true,
        initial_value: 0,
        min: 0,
        max: 9,
        step: 1,
    };
    let mut counter = CounterState::new(0);
    let mut wraps = 0;
    let mut prev = counter.value();
    for _ in 0..10 {
        let v = counter.update(&cfg, 1, 0, 0);
        counter.update(&cfg, 0, 0, 0);
        if v < prev {
            wraps += 1;
        }
        prev = v;
    }
    assert_eq!(counter.value(), 0);
    assert_eq!(wraps, 1);
}
