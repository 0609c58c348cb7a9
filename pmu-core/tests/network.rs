//! End-to-end: encode a configuration image, load it back, run ticks

use std::collections::BTreeMap;

use pmu_core::channel::{Channel, ChannelId, ChannelRuntime, HwBinding, HwDevice, LoadError};
use pmu_core::config::{
    CfgAnalogInput, CfgFilter, CfgHysteresis, CfgNumber, CfgPid, CfgPowerOutput, CfgTimer,
    ChannelConfig, Records,
};
use pmu_core::executor::{ChannelBus, ExecContext};
use pmu_core::validation::{validate_filter, validate_pid, ValidationErrorKind, DEFAULT_LIMITS};
use proptest::prelude::*;

#[derive(Default)]
struct MapBus {
    values: BTreeMap<ChannelId, i32>,
    adc: BTreeMap<u8, i32>,
}

impl ChannelBus for MapBus {
    fn get_value(&self, id: ChannelId) -> i32 {
        self.values.get(&id).copied().unwrap_or(0)
    }

    fn set_value(&mut self, id: ChannelId, value: i32) {
        self.values.insert(id, value);
    }

    fn read_hardware(&self, binding: HwBinding) -> i32 {
        match binding.device {
            HwDevice::Adc => self.adc.get(&binding.index).copied().unwrap_or(0),
            _ => 0,
        }
    }
}

/// Coolant sensor -> hysteresis -> delay-on -> fan output
fn fan_network() -> Vec<Channel> {
    let sensor = Channel::new(1, ChannelConfig::AnalogInput(CfgAnalogInput::default()))
        .with_name("coolant")
        .unwrap()
        .with_hw(HwBinding::new(HwDevice::Adc, 2));

    let hot = Channel::new(
        2,
        ChannelConfig::Hysteresis(CfgHysteresis {
            input_id: 1,
            hyst_type: 0,
            threshold_high: 3000,
            threshold_low: 1000,
            ..Default::default()
        }),
    )
    .with_name("coolant_hot")
    .unwrap();

    let delay = Channel::new(
        3,
        ChannelConfig::Timer(CfgTimer {
            trigger_id: 2,
            mode: 0,
            start_edge: 0,
            duration_ms: 50,
            ..Default::default()
        }),
    );

    let fan = Channel::new(4, ChannelConfig::PowerOutput(CfgPowerOutput::default()))
        .with_name("fan")
        .unwrap()
        .with_source(3)
        .with_hw(HwBinding::new(HwDevice::Profet, 0));

    vec![sensor, hot, delay, fan]
}

fn image(channels: &[Channel]) -> Vec<u8> {
    let mut out = Vec::new();
    for channel in channels {
        out.extend_from_slice(&channel.to_record_vec().unwrap());
    }
    out
}

fn load(image: &[u8]) -> Result<Vec<Channel>, LoadError> {
    Records::new(image)
        .map(|record| {
            let record = record?;
            let (channel, used) = Channel::from_record(record, &DEFAULT_LIMITS)?;
            assert_eq!(used, record.len());
            Ok(channel)
        })
        .collect()
}

#[test]
fn image_loads_back_identically() {
    let channels = fan_network();
    let loaded = load(&image(&channels)).unwrap();
    assert_eq!(loaded, channels);
    assert_eq!(loaded[0].name.as_str(), "coolant");
}

#[test]
fn fan_turns_on_after_delay_and_off_below_low_threshold() {
    let channels = load(&image(&fan_network())).unwrap();
    let mut runtimes: Vec<ChannelRuntime> = channels.iter().map(ChannelRuntime::from_channel).collect();
    let mut ctx = ExecContext::new(MapBus::default());

    // 4095 counts maps to 5000 mV, well above the high threshold
    ctx.bus_mut().adc.insert(2, 4095);
    let mut fan = Vec::new();
    for t in (0..=100).step_by(10) {
        ctx.update_time(t);
        ctx.process_all(&mut runtimes);
        fan.push(runtimes[3].value);
    }
    assert_eq!(runtimes[0].value, 5000);
    assert_eq!(runtimes[1].value, 1);
    assert_eq!(&fan[..5], &[0, 0, 0, 0, 0]);
    assert_eq!(fan[5], 1);
    assert_eq!(ctx.bus().get_value(4), 1);

    // Between thresholds the comparator holds
    ctx.bus_mut().adc.insert(2, 1638);
    ctx.update_time(110);
    ctx.process_all(&mut runtimes);
    assert_eq!(runtimes[3].value, 1);

    ctx.bus_mut().adc.insert(2, 0);
    ctx.update_time(120);
    ctx.process_all(&mut runtimes);
    assert_eq!(runtimes[1].value, 0);
    assert_eq!(runtimes[3].value, 0);
}

#[test]
fn unbound_output_is_rejected() {
    let fan = Channel::new(4, ChannelConfig::PowerOutput(CfgPowerOutput::default())).with_source(3);
    let record = fan.to_record_vec().unwrap();
    match Channel::from_record(&record, &DEFAULT_LIMITS) {
        Err(LoadError::Validation(e)) => assert_eq!(e.kind, ValidationErrorKind::MissingHardware),
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[test]
fn truncated_image_stops_iteration() {
    let bytes = image(&fan_network());
    let cut = &bytes[..bytes.len() - 3];
    let results: Vec<_> = Records::new(cut).collect();
    assert_eq!(results.len(), 4);
    assert!(results[3].is_err());
}

#[test]
fn number_write_then_tick_keeps_value() {
    let mut rt = ChannelRuntime::new(
        9,
        ChannelConfig::Number(CfgNumber {
            value: 0,
            min: 0,
            max: 100,
            step: 5,
            ..Default::default()
        }),
    );
    assert_eq!(rt.write_number(42), Ok(40));

    let mut ctx = ExecContext::new(MapBus::default());
    ctx.update_time(0);
    assert_eq!(ctx.process_channel(&mut rt), 40);
    assert_eq!(ctx.bus().get_value(9), 40);
}

proptest! {
    #[test]
    fn arbitrary_records_never_panic(bytes in proptest::collection::vec(any::<u8>(), 0..256)) {
        for record in Records::new(&bytes).flatten() {
            let _ = Channel::from_record(record, &DEFAULT_LIMITS);
        }
    }

    #[test]
    fn analog_input_stays_in_output_range(raw in 0i32..=4095) {
        let sensor = Channel::new(1, ChannelConfig::AnalogInput(CfgAnalogInput::default()))
            .with_hw(HwBinding::new(HwDevice::Adc, 0));
        let mut rt = ChannelRuntime::from_channel(&sensor);
        let mut bus = MapBus::default();
        bus.adc.insert(0, raw);
        let mut ctx = ExecContext::new(bus);
        ctx.update_time(0);
        let v = ctx.process_channel(&mut rt);
        prop_assert!((0..=5000).contains(&v));
    }

    #[test]
    fn pid_channel_respects_output_limits(
        gains in (-1_000_000i32..=1_000_000, -1_000_000i32..=1_000_000, -1_000_000i32..=1_000_000),
        scale in 1u16..=u16::MAX,
        limits in (any::<i32>(), any::<i32>()).prop_filter("ordered", |(a, b)| a < b),
        ticks in proptest::collection::vec((any::<i32>(), any::<i32>(), any::<u32>()), 1..12),
    ) {
        let cfg = CfgPid {
            setpoint_id: 10,
            feedback_id: 11,
            kp: gains.0,
            ki: gains.1,
            kd: gains.2,
            scale,
            output_min: limits.0,
            output_max: limits.1,
            ..Default::default()
        };
        prop_assert_eq!(validate_pid(&cfg, &DEFAULT_LIMITS), Ok(()));
        let mut rt = ChannelRuntime::new(1, ChannelConfig::Pid(cfg));
        let mut ctx = ExecContext::new(MapBus::default());
        let mut now = 0u32;
        ctx.update_time(now);
        ctx.process_channel(&mut rt);
        for (setpoint, feedback, gap) in ticks {
            ctx.bus_mut().set_value(10, setpoint);
            ctx.bus_mut().set_value(11, feedback);
            now = now.wrapping_add(gap);
            ctx.update_time(now);
            let v = ctx.process_channel(&mut rt);
            if gap > 0 {
                prop_assert!(v >= limits.0 && v <= limits.1);
            }
        }
    }

    #[test]
    fn low_pass_channel_tracks_within_inputs(
        tau in 1u16..=60_000,
        ticks in proptest::collection::vec((any::<i32>(), any::<u32>()), 1..12),
    ) {
        let cfg = CfgFilter {
            input_id: 10,
            filter_type: 2,
            time_constant_ms: tau,
            ..Default::default()
        };
        prop_assert_eq!(validate_filter(&cfg, &DEFAULT_LIMITS), Ok(()));
        let mut rt = ChannelRuntime::new(1, ChannelConfig::Filter(cfg));
        let mut ctx = ExecContext::new(MapBus::default());
        let (mut now, mut lo, mut hi) = (0u32, i32::MAX, i32::MIN);
        for (input, gap) in ticks {
            ctx.bus_mut().set_value(10, input);
            lo = lo.min(input);
            hi = hi.max(input);
            now = now.wrapping_add(gap);
            ctx.update_time(now);
            let v = ctx.process_channel(&mut rt);
            prop_assert!(v >= lo && v <= hi);
        }
    }
}
