//! Integration tests: monitors → arbiter → actuators → telemetry,
//! exercised through mock ports.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use vitrine::arbiter::ActuatorArbiter;
use vitrine::config::StationConfig;
use vitrine::error::{Error, ReadError};
use vitrine::monitors::{
    AlarmLevel, ArtifactInfoMonitor, ClimateMonitor, GasMonitor, PerimeterMonitor,
    TheftDetector, VisitorGate,
};
use vitrine::ports::{
    BuzzerPort, GateServoPort, LedPort, ResettableSensorPort, Sample, SensorPort, TelemetrySink,
    Uid,
};
use vitrine::supervisor::{supervise, UnitPolicy};
use vitrine::telemetry::{topic, Payload, QoS, TelemetryMsg};

use futures_lite::future::block_on;

// ── Mock sensor ports ─────────────────────────────────────────

/// Yields a fixed sample forever.
struct ConstSensor(Sample);
impl SensorPort for ConstSensor {
    fn poll(&mut self) -> Result<Sample, ReadError> {
        Ok(self.0.clone())
    }
}

/// Pops scripted results, then falls back to a steady-state sample.
struct SeqSensor {
    script: VecDeque<Result<Sample, ReadError>>,
    then: Sample,
}
impl SeqSensor {
    fn new(script: Vec<Result<Sample, ReadError>>, then: Sample) -> Self {
        Self {
            script: script.into(),
            then,
        }
    }
}
impl SensorPort for SeqSensor {
    fn poll(&mut self) -> Result<Sample, ReadError> {
        self.script.pop_front().unwrap_or(Ok(self.then.clone()))
    }
}

/// Weight source whose value tests can change mid-run.
#[derive(Clone)]
struct SharedWeight(Rc<Cell<f32>>);
impl SensorPort for SharedWeight {
    fn poll(&mut self) -> Result<Sample, ReadError> {
        Ok(Sample::Weight(self.0.get()))
    }
}

/// Climate device with a script and a reinit counter.
struct ScriptedClimate {
    script: VecDeque<Result<Sample, ReadError>>,
    reinits: Rc<Cell<u32>>,
}
impl SensorPort for ScriptedClimate {
    fn poll(&mut self) -> Result<Sample, ReadError> {
        self.script.pop_front().unwrap_or(Err(ReadError::Transient))
    }
}
impl ResettableSensorPort for ScriptedClimate {
    fn reinit(&mut self) -> Result<(), ReadError> {
        self.reinits.set(self.reinits.get() + 1);
        Ok(())
    }
}

fn tag(uid_bytes: &[u8]) -> Sample {
    Sample::TagPresence(Uid::from_slice(uid_bytes).unwrap())
}

fn no_tag() -> Sample {
    Sample::TagPresence(Uid::new())
}

// ── Mock actuators ────────────────────────────────────────────

#[derive(Default)]
struct ActuatorLog {
    angles: Vec<u8>,
    led: Vec<bool>,
    buzzer: Vec<bool>,
    /// Gate sequences in flight (open without matching close).
    open_depth: u8,
    max_open_depth: u8,
}

struct RecServo(Rc<RefCell<ActuatorLog>>);
impl GateServoPort for RecServo {
    fn set_angle(&mut self, degrees: u8) {
        let mut log = self.0.borrow_mut();
        if degrees > 0 {
            log.open_depth += 1;
            log.max_open_depth = log.max_open_depth.max(log.open_depth);
        } else {
            log.open_depth = log.open_depth.saturating_sub(1);
        }
        log.angles.push(degrees);
    }
}

struct RecLed(Rc<RefCell<ActuatorLog>>);
impl LedPort for RecLed {
    fn set(&mut self, on: bool) {
        self.0.borrow_mut().led.push(on);
    }
}

struct RecBuzzer(Rc<RefCell<ActuatorLog>>);
impl BuzzerPort for RecBuzzer {
    fn set(&mut self, on: bool) {
        self.0.borrow_mut().buzzer.push(on);
    }
}

// ── Mock telemetry sink ───────────────────────────────────────

#[derive(Clone, Default)]
struct RecordingSink(Rc<RefCell<Vec<TelemetryMsg>>>);
impl TelemetrySink for RecordingSink {
    fn publish(&mut self, msg: TelemetryMsg) {
        self.0.borrow_mut().push(msg);
    }
}

impl RecordingSink {
    fn on_topic(&self, topic: &str) -> Vec<TelemetryMsg> {
        self.0
            .borrow()
            .iter()
            .filter(|m| m.topic == topic)
            .copied()
            .collect()
    }
}

// ── Fixtures ──────────────────────────────────────────────────

/// Timings shrunk so a full gate sequence is a few milliseconds.
fn fast_config() -> StationConfig {
    StationConfig {
        gate_dwell_ms: 1,
        gate_acquire_timeout_ms: 1,
        gate_led_blinks: 1,
        gate_led_blink_ms: 0,
        buzzer_pulses: 3,
        buzzer_pulse_on_ms: 0,
        buzzer_pulse_off_ms: 0,
        theft_cooldown_ms: 0,
        perimeter_led_hold_ms: 0,
        climate_settle_ms: 0,
        climate_retry_delay_ms: 0,
        climate_reinit_cooldown_ms: 0,
        info_cooldown_ms: 0,
        ..Default::default()
    }
}

fn make_arbiter(log: &Rc<RefCell<ActuatorLog>>, config: &StationConfig) -> Rc<ActuatorArbiter> {
    Rc::new(ActuatorArbiter::new(
        Box::new(RecServo(log.clone())),
        Box::new(RecLed(log.clone())),
        Box::new(RecBuzzer(log.clone())),
        config,
    ))
}

// ══════════════════════════════════════════════════════════════
//  Visitor gate
// ══════════════════════════════════════════════════════════════

#[test]
fn tag_admission_runs_sequence_and_publishes_count() {
    let log = Rc::new(RefCell::new(ActuatorLog::default()));
    let config = fast_config();
    let sink = RecordingSink::default();
    let nfc = SeqSensor::new(vec![Ok(tag(&[0x04, 0xA1, 0x2B, 0x3C]))], no_tag());
    let button = ConstSensor(Sample::ButtonState(false));
    let mut gate = VisitorGate::new(nfc, button, make_arbiter(&log, &config), sink.clone());

    block_on(async {
        gate.poll_once().await.unwrap();
        gate.poll_once().await.unwrap();
    });

    assert_eq!(gate.count(), 1);
    assert_eq!(log.borrow().angles, vec![180, 0], "one full sequence");
    let published = sink.on_topic(topic::VISITOR_COUNT);
    assert_eq!(published.len(), 1);
    assert_eq!(published[0].payload, Payload::Integer(1));
}

#[test]
fn empty_uid_is_not_an_admission() {
    let log = Rc::new(RefCell::new(ActuatorLog::default()));
    let config = fast_config();
    let sink = RecordingSink::default();
    let mut gate = VisitorGate::new(
        ConstSensor(no_tag()),
        ConstSensor(Sample::ButtonState(false)),
        make_arbiter(&log, &config),
        sink.clone(),
    );

    block_on(async {
        for _ in 0..5 {
            gate.poll_once().await.unwrap();
        }
    });

    assert_eq!(gate.count(), 0);
    assert!(log.borrow().angles.is_empty());
    assert!(sink.0.borrow().is_empty());
}

#[test]
fn manual_override_decrements_clamped_at_zero() {
    let log = Rc::new(RefCell::new(ActuatorLog::default()));
    let config = fast_config();
    let sink = RecordingSink::default();
    let mut gate = VisitorGate::new(
        ConstSensor(no_tag()),
        SeqSensor::new(
            vec![Ok(Sample::ButtonState(true))],
            Sample::ButtonState(false),
        ),
        make_arbiter(&log, &config),
        sink.clone(),
    );

    block_on(async {
        gate.poll_once().await.unwrap();
    });

    // The sequence ran for staff, but the count never goes below zero.
    assert_eq!(gate.count(), 0);
    assert_eq!(log.borrow().angles, vec![180, 0]);
    let published = sink.on_topic(topic::VISITOR_COUNT);
    assert_eq!(published.len(), 1);
    assert_eq!(published[0].payload, Payload::Integer(0));
}

#[test]
fn nfc_read_failure_is_contained() {
    let log = Rc::new(RefCell::new(ActuatorLog::default()));
    let config = fast_config();
    let sink = RecordingSink::default();
    let mut gate = VisitorGate::new(
        SeqSensor::new(vec![Err(ReadError::Transient)], no_tag()),
        ConstSensor(Sample::ButtonState(false)),
        make_arbiter(&log, &config),
        sink.clone(),
    );

    block_on(async {
        assert!(gate.poll_once().await.is_ok());
    });
    assert_eq!(gate.count(), 0);
}

#[test]
fn busy_gate_drops_event_without_fabricating_publish() {
    let log = Rc::new(RefCell::new(ActuatorLog::default()));
    let config = StationConfig {
        gate_dwell_ms: 200,
        ..fast_config()
    };
    let sink = RecordingSink::default();
    let arbiter = make_arbiter(&log, &config);
    let gate = Rc::new(RefCell::new(VisitorGate::new(
        ConstSensor(tag(&[0x04, 0xA1, 0x2B, 0x3C])),
        ConstSensor(Sample::ButtonState(false)),
        arbiter.clone(),
        sink.clone(),
    )));

    let ex: edge_executor::LocalExecutor<'_, 8> = edge_executor::LocalExecutor::new();
    let holder = ex.spawn({
        let arb = arbiter.clone();
        async move {
            let mut lease = arb.acquire_gate("holder").await.unwrap();
            lease.open_dwell_close().await;
        }
    });
    let poller = ex.spawn({
        let gate = gate.clone();
        async move {
            // Poll while the holder is mid-dwell: the tag must be dropped.
            async_io_mini::Timer::after(core::time::Duration::from_millis(5)).await;
            gate.borrow_mut().poll_once().await.unwrap();
        }
    });
    block_on(ex.run(futures_lite::future::zip(holder, poller)));

    assert_eq!(gate.borrow().count(), 0, "no count change on Busy");
    assert!(sink.0.borrow().is_empty(), "no event fabricated on Busy");
}

#[test]
fn reset_count_zeroes_and_publishes() {
    let log = Rc::new(RefCell::new(ActuatorLog::default()));
    let config = fast_config();
    let sink = RecordingSink::default();
    let mut gate = VisitorGate::new(
        SeqSensor::new(
            vec![Ok(tag(&[1, 2, 3, 4])), Ok(tag(&[1, 2, 3, 4]))],
            no_tag(),
        ),
        ConstSensor(Sample::ButtonState(false)),
        make_arbiter(&log, &config),
        sink.clone(),
    );

    block_on(async {
        gate.poll_once().await.unwrap();
        gate.poll_once().await.unwrap();
    });
    assert_eq!(gate.count(), 2);

    gate.reset_count();
    assert_eq!(gate.count(), 0);
    let published = sink.on_topic(topic::VISITOR_COUNT);
    assert_eq!(published.last().unwrap().payload, Payload::Integer(0));
}

// ══════════════════════════════════════════════════════════════
//  Theft detector
// ══════════════════════════════════════════════════════════════

fn make_shared_gate(
    log: &Rc<RefCell<ActuatorLog>>,
    config: &StationConfig,
    sink: &RecordingSink,
    nfc_script: Vec<Result<Sample, ReadError>>,
) -> vitrine::monitors::SharedVisitorGate<SeqSensor, ConstSensor, RecordingSink> {
    VisitorGate::new(
        SeqSensor::new(nfc_script, no_tag()),
        ConstSensor(Sample::ButtonState(false)),
        make_arbiter(log, config),
        sink.clone(),
    )
    .into_shared()
}

#[test]
fn calibration_scenario_ratio_and_delegation() {
    let log = Rc::new(RefCell::new(ActuatorLog::default()));
    let config = fast_config();
    let sink = RecordingSink::default();
    let weight = SharedWeight(Rc::new(Cell::new(1000.0)));
    let gate = make_shared_gate(&log, &config, &sink, vec![Ok(tag(&[9, 9, 9, 9]))]);
    let mut theft = TheftDetector::new(weight.clone(), gate.clone(), sink.clone(), &config);

    // Raw mean 1000 against a 500 g reference -> ratio 2.0.
    let ratio = theft.calibrate(500.0).unwrap();
    assert!((ratio - 2.0).abs() < f32::EPSILON);

    // 1000 raw units -> 500 g >= 200 g baseline: object present, so the
    // cycle delegates to the visitor gate, which sees the waiting tag.
    block_on(async {
        theft.poll_once().await.unwrap();
    });
    assert_eq!(block_on(gate.lock()).count(), 1);
    assert!(sink.on_topic(topic::THEFT_DETECTED).is_empty());
}

#[test]
fn weight_below_baseline_publishes_theft_at_least_once() {
    let log = Rc::new(RefCell::new(ActuatorLog::default()));
    let config = fast_config();
    let sink = RecordingSink::default();
    let weight = SharedWeight(Rc::new(Cell::new(1000.0)));
    let gate = make_shared_gate(&log, &config, &sink, vec![]);
    let mut theft = TheftDetector::new(weight.clone(), gate, sink.clone(), &config);

    theft.calibrate(500.0).unwrap();
    weight.0.set(50.0); // 25 g — the exhibit is gone

    block_on(async {
        theft.poll_once().await.unwrap();
    });

    let published = sink.on_topic(topic::THEFT_DETECTED);
    assert_eq!(published.len(), 1);
    assert_eq!(published[0].qos, QoS::AtLeastOnce);
    assert!(log.borrow().angles.is_empty(), "no gate sequence on theft");
}

#[test]
fn poll_before_calibration_is_rejected() {
    let log = Rc::new(RefCell::new(ActuatorLog::default()));
    let config = fast_config();
    let sink = RecordingSink::default();
    let gate = make_shared_gate(&log, &config, &sink, vec![]);
    let mut theft = TheftDetector::new(
        SharedWeight(Rc::new(Cell::new(1000.0))),
        gate,
        sink,
        &config,
    );

    assert!(!theft.is_calibrated());
    let result = block_on(theft.poll_once());
    assert_eq!(result, Err(Error::NotCalibrated));
}

// ══════════════════════════════════════════════════════════════
//  Gas monitor
// ══════════════════════════════════════════════════════════════

#[test]
fn gas_publishes_heartbeat_every_cycle() {
    let log = Rc::new(RefCell::new(ActuatorLog::default()));
    let config = fast_config();
    let sink = RecordingSink::default();
    let mut gas = GasMonitor::new(
        ConstSensor(Sample::GasDigital(false)),
        make_arbiter(&log, &config),
        sink.clone(),
    );

    block_on(async {
        for _ in 0..3 {
            gas.poll_once().await.unwrap();
        }
    });

    let published = sink.on_topic(topic::GAS_LEVEL);
    assert_eq!(published.len(), 3, "one heartbeat per cycle, every cycle");
    assert!(published.iter().all(|m| m.payload == Payload::Text("SAFE")));
    assert!(log.borrow().buzzer.is_empty());
}

#[test]
fn gas_detection_buzzes_once_and_publishes_danger() {
    let log = Rc::new(RefCell::new(ActuatorLog::default()));
    let config = fast_config();
    let pulses = config.buzzer_pulses as usize;
    let sink = RecordingSink::default();
    let mut gas = GasMonitor::new(
        SeqSensor::new(
            vec![Ok(Sample::GasDigital(true))],
            Sample::GasDigital(false),
        ),
        make_arbiter(&log, &config),
        sink.clone(),
    );

    block_on(async {
        gas.poll_once().await.unwrap();
        assert_eq!(gas.level(), AlarmLevel::Alarm);
        gas.poll_once().await.unwrap();
        assert_eq!(gas.level(), AlarmLevel::Safe);
    });

    let published = sink.on_topic(topic::GAS_LEVEL);
    assert_eq!(published.len(), 2);
    assert_eq!(published[0].payload, Payload::Text("DANGER"));
    assert_eq!(published[1].payload, Payload::Text("SAFE"));
    // Exactly one pulse train.
    assert_eq!(log.borrow().buzzer.len(), pulses * 2);
}

#[test]
fn gas_read_failure_skips_heartbeat() {
    let log = Rc::new(RefCell::new(ActuatorLog::default()));
    let config = fast_config();
    let sink = RecordingSink::default();
    let mut gas = GasMonitor::new(
        SeqSensor::new(vec![Err(ReadError::Transient)], Sample::GasDigital(false)),
        make_arbiter(&log, &config),
        sink.clone(),
    );

    block_on(async {
        gas.poll_once().await.unwrap();
        gas.poll_once().await.unwrap();
    });

    // The failed cycle is visible only as an absent heartbeat.
    assert_eq!(sink.on_topic(topic::GAS_LEVEL).len(), 1);
}

// ══════════════════════════════════════════════════════════════
//  Perimeter monitor
// ══════════════════════════════════════════════════════════════

fn corners(meters_each: f32) -> [ConstSensor; 4] {
    core::array::from_fn(|i| {
        ConstSensor(Sample::Distance {
            meters: meters_each,
            sensor: i as u8,
        })
    })
}

#[test]
fn breach_publishes_and_drives_lamp() {
    let log = Rc::new(RefCell::new(ActuatorLog::default()));
    let config = fast_config();
    let sink = RecordingSink::default();
    // 4 × 10 cm = 40 cm aggregate, below the 80 cm threshold.
    let mut perimeter =
        PerimeterMonitor::new(corners(0.10), make_arbiter(&log, &config), sink.clone(), &config);

    block_on(async {
        perimeter.poll_once().await.unwrap();
    });

    assert_eq!(perimeter.level(), AlarmLevel::Alarm);
    let published = sink.on_topic(topic::PERIMETER_BREACH);
    assert_eq!(published.len(), 1);
    assert_eq!(published[0].payload, Payload::Integer(1));
    assert_eq!(log.borrow().led, vec![true, false]);
}

#[test]
fn clear_cycles_publish_nothing() {
    let log = Rc::new(RefCell::new(ActuatorLog::default()));
    let config = fast_config();
    let sink = RecordingSink::default();
    // 4 × 100 cm = 400 cm aggregate, well clear.
    let mut perimeter =
        PerimeterMonitor::new(corners(1.0), make_arbiter(&log, &config), sink.clone(), &config);

    block_on(async {
        for _ in 0..5 {
            perimeter.poll_once().await.unwrap();
        }
    });

    assert!(sink.0.borrow().is_empty(), "edge-triggered: silence on clear");
    assert!(log.borrow().led.is_empty());
}

#[test]
fn breach_still_published_when_gate_is_busy() {
    let log = Rc::new(RefCell::new(ActuatorLog::default()));
    let config = StationConfig {
        gate_dwell_ms: 200,
        ..fast_config()
    };
    let sink = RecordingSink::default();
    let arbiter = make_arbiter(&log, &config);
    let mut perimeter =
        PerimeterMonitor::new(corners(0.10), arbiter.clone(), sink.clone(), &config);

    let ex: edge_executor::LocalExecutor<'_, 8> = edge_executor::LocalExecutor::new();
    let holder = ex.spawn({
        let arb = arbiter.clone();
        async move {
            let mut lease = arb.acquire_gate("holder").await.unwrap();
            lease.open_dwell_close().await;
        }
    });
    let breach = ex.spawn(async move {
        async_io_mini::Timer::after(core::time::Duration::from_millis(5)).await;
        perimeter.poll_once().await.unwrap();
    });
    block_on(ex.run(futures_lite::future::zip(holder, breach)));

    assert_eq!(sink.on_topic(topic::PERIMETER_BREACH).len(), 1);
}

// ══════════════════════════════════════════════════════════════
//  Climate monitor
// ══════════════════════════════════════════════════════════════

#[test]
fn three_transients_then_valid_reads_without_reinit() {
    let config = fast_config();
    let sink = RecordingSink::default();
    let reinits = Rc::new(Cell::new(0));
    let device = ScriptedClimate {
        script: vec![
            Err(ReadError::Transient),
            Err(ReadError::Transient),
            Err(ReadError::Transient),
            Ok(Sample::Temperature(21.0)),
            Ok(Sample::Humidity(45.0)),
        ]
        .into(),
        reinits: reinits.clone(),
    };
    let mut climate = ClimateMonitor::new(device, sink.clone(), &config);

    block_on(async {
        climate.poll_once().await.unwrap();
    });

    assert_eq!(reinits.get(), 0, "transient retries must not reinitialize");
    let temps = sink.on_topic(topic::TEMPERATURE);
    let hums = sink.on_topic(topic::HUMIDITY);
    assert_eq!(temps.len(), 1);
    assert_eq!(hums.len(), 1);
    assert_eq!(temps[0].payload, Payload::Float(21.0));
    assert_eq!(hums[0].payload, Payload::Float(45.0));
    assert_eq!(temps[0].qos, QoS::ExactlyOnceEffective);
}

#[test]
fn device_fault_reinitializes_and_resumes() {
    let config = fast_config();
    let sink = RecordingSink::default();
    let reinits = Rc::new(Cell::new(0));
    let device = ScriptedClimate {
        script: vec![
            Err(ReadError::Device),
            Ok(Sample::Temperature(20.0)),
            Ok(Sample::Humidity(50.0)),
        ]
        .into(),
        reinits: reinits.clone(),
    };
    let mut climate = ClimateMonitor::new(device, sink.clone(), &config);

    block_on(async {
        // Cycle 1: device fault, handle rebuilt, nothing published.
        climate.poll_once().await.unwrap();
        // Cycle 2: healthy pair.
        climate.poll_once().await.unwrap();
    });

    assert_eq!(reinits.get(), 1);
    assert_eq!(sink.on_topic(topic::TEMPERATURE).len(), 1);
    assert_eq!(sink.on_topic(topic::HUMIDITY).len(), 1);
}

#[test]
fn exhausted_retries_escalate_to_reinit() {
    let config = fast_config();
    let sink = RecordingSink::default();
    let reinits = Rc::new(Cell::new(0));
    let device = ScriptedClimate {
        // More consecutive transients than max_retries allows.
        script: VecDeque::new(),
        reinits: reinits.clone(),
    };
    let mut climate = ClimateMonitor::new(device, sink.clone(), &config);

    block_on(async {
        climate.poll_once().await.unwrap();
    });

    assert_eq!(reinits.get(), 1);
    assert!(sink.0.borrow().is_empty());
}

// ══════════════════════════════════════════════════════════════
//  Artifact info button
// ══════════════════════════════════════════════════════════════

#[test]
fn press_publishes_once_idle_publishes_nothing() {
    let config = fast_config();
    let sink = RecordingSink::default();
    let mut info = ArtifactInfoMonitor::new(
        SeqSensor::new(
            vec![Ok(Sample::ButtonState(true))],
            Sample::ButtonState(false),
        ),
        sink.clone(),
        &config,
    );

    block_on(async {
        for _ in 0..4 {
            info.poll_once().await.unwrap();
        }
    });

    let published = sink.on_topic(topic::ARTIFACT_INFO);
    assert_eq!(published.len(), 1);
    assert_eq!(published[0].payload, Payload::Text("BUTTON_PRESSED"));
}

// ══════════════════════════════════════════════════════════════
//  Gate lease exclusivity under concurrent units
// ══════════════════════════════════════════════════════════════

#[test]
fn gate_lease_never_held_by_two_units() {
    let log = Rc::new(RefCell::new(ActuatorLog::default()));
    let config = StationConfig {
        gate_acquire_timeout_ms: 100,
        ..fast_config()
    };
    let sink = RecordingSink::default();
    let arbiter = make_arbiter(&log, &config);

    // Visitor gate sees a tag on every poll.
    let gate = VisitorGate::new(
        ConstSensor(tag(&[7, 7, 7, 7])),
        ConstSensor(Sample::ButtonState(false)),
        arbiter.clone(),
        sink.clone(),
    )
    .into_shared();

    // Theft detector always sees the object present, so every cycle
    // delegates into the same shared gate.
    let weight = SharedWeight(Rc::new(Cell::new(1000.0)));
    let mut theft = TheftDetector::new(weight, gate.clone(), sink.clone(), &config);
    theft.calibrate(500.0).unwrap();

    let ex: edge_executor::LocalExecutor<'_, 8> = edge_executor::LocalExecutor::new();
    let gate_task = ex.spawn({
        let gate = gate.clone();
        async move {
            for _ in 0..10 {
                gate.lock().await.poll_once().await.unwrap();
            }
        }
    });
    let theft_task = ex.spawn(async move {
        for _ in 0..10 {
            theft.poll_once().await.unwrap();
        }
    });
    block_on(ex.run(futures_lite::future::zip(gate_task, theft_task)));

    let log = log.borrow();
    assert_eq!(log.max_open_depth, 1, "two in-flight gate sequences observed");
    assert_eq!(block_on(gate.lock()).count(), 20);
}

// ══════════════════════════════════════════════════════════════
//  Supervisor end-to-end: miswired unit degrades partially
// ══════════════════════════════════════════════════════════════

#[test]
fn miswired_unit_permanently_fails_with_one_fatal_event() {
    let log = Rc::new(RefCell::new(ActuatorLog::default()));
    let config = fast_config();
    let sink = RecordingSink::default();
    // Gas monitor wired to a weight sensor: every poll is a unit fault.
    let gas = GasMonitor::new(
        ConstSensor(Sample::Weight(123.0)),
        make_arbiter(&log, &config),
        sink.clone(),
    );

    block_on(supervise(
        gas,
        UnitPolicy {
            cadence_ms: 0,
            restart_backoff_ms: 0,
            max_restarts: 3,
        },
        Arc::new(AtomicBool::new(false)),
        sink.clone(),
    ));

    let fatals = sink.on_topic(topic::UNIT_FATAL);
    assert_eq!(fatals.len(), 1);
    assert_eq!(fatals[0].payload, Payload::Text("gas"));
}
