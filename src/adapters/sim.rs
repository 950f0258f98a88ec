//! Host simulation adapters.
//!
//! Every sensor port reads from a process-wide atomic that tests (or a
//! demo driver) can set via the `sim_set_*` functions; actuator ports
//! track their state in memory and log transitions. This is what lets the
//! binary run on a development host and lets integration tests inject
//! readings without hardware.
//!
//! Input polarity is normalized here, at the adapter: ports deliver
//! logical values (`pressed`, `detected`), monitors never see electrical
//! levels.

use core::sync::atomic::{AtomicBool, AtomicU8, AtomicU32, Ordering};

use log::debug;

use crate::error::ReadError;
use crate::ports::{
    BuzzerPort, GateServoPort, LedPort, ResettableSensorPort, Sample, SensorPort, Uid,
};

// ───────────────────────────────────────────────────────────────
// Injected state
// ───────────────────────────────────────────────────────────────

static SIM_TAG_PRESENT: AtomicBool = AtomicBool::new(false);
/// Electrical level of the manual-override button (true = high).
static SIM_GATE_BUTTON_LEVEL: AtomicBool = AtomicBool::new(false);
/// Electrical level of the artifact-info button (true = high).
static SIM_INFO_BUTTON_LEVEL: AtomicBool = AtomicBool::new(false);
/// Raw load-cell reading (f32 bits).
static SIM_WEIGHT_RAW: AtomicU32 = AtomicU32::new(0);
/// Electrical level of the MQ-2 digital output (true = high; the stock
/// comparator board idles high and pulls low on gas).
static SIM_GAS_LEVEL: AtomicBool = AtomicBool::new(true);
/// Corner distances in metres (f32 bits), seeded to 1 m each.
static SIM_DISTANCE_M: [AtomicU32; 4] = [
    AtomicU32::new(0x3F80_0000),
    AtomicU32::new(0x3F80_0000),
    AtomicU32::new(0x3F80_0000),
    AtomicU32::new(0x3F80_0000),
];
static SIM_TEMPERATURE_C: AtomicU32 = AtomicU32::new(0);
static SIM_HUMIDITY_PCT: AtomicU32 = AtomicU32::new(0);
/// Climate failure injection: 0 = healthy, 1 = transient, 2 = device fault.
static SIM_CLIMATE_FAULT: AtomicU8 = AtomicU8::new(0);

pub fn sim_set_tag_present(present: bool) {
    SIM_TAG_PRESENT.store(present, Ordering::Relaxed);
}

pub fn sim_set_gate_button_level(high: bool) {
    SIM_GATE_BUTTON_LEVEL.store(high, Ordering::Relaxed);
}

pub fn sim_set_info_button_level(high: bool) {
    SIM_INFO_BUTTON_LEVEL.store(high, Ordering::Relaxed);
}

pub fn sim_set_weight_raw(raw: f32) {
    SIM_WEIGHT_RAW.store(raw.to_bits(), Ordering::Relaxed);
}

pub fn sim_set_gas_level(high: bool) {
    SIM_GAS_LEVEL.store(high, Ordering::Relaxed);
}

pub fn sim_set_distance_m(sensor: usize, meters: f32) {
    SIM_DISTANCE_M[sensor].store(meters.to_bits(), Ordering::Relaxed);
}

pub fn sim_set_climate(celsius: f32, humidity_pct: f32) {
    SIM_TEMPERATURE_C.store(celsius.to_bits(), Ordering::Relaxed);
    SIM_HUMIDITY_PCT.store(humidity_pct.to_bits(), Ordering::Relaxed);
}

/// 0 = healthy, 1 = every read fails transient, 2 = every read is a
/// device fault until [`ResettableSensorPort::reinit`] clears it.
pub fn sim_set_climate_fault(mode: u8) {
    SIM_CLIMATE_FAULT.store(mode, Ordering::Relaxed);
}

fn load_f32(cell: &AtomicU32) -> f32 {
    f32::from_bits(cell.load(Ordering::Relaxed))
}

// ───────────────────────────────────────────────────────────────
// Sensor adapters
// ───────────────────────────────────────────────────────────────

/// PN532 stand-in. Reports a fixed UID while a tag is injected, an empty
/// UID otherwise (antenna polled, nothing in field).
pub struct SimNfcReader;

impl SensorPort for SimNfcReader {
    fn poll(&mut self) -> Result<Sample, ReadError> {
        let uid: Uid = if SIM_TAG_PRESENT.load(Ordering::Relaxed) {
            Uid::from_slice(&[0x04, 0xE1, 0x5C, 0x2A]).unwrap_or_default()
        } else {
            Uid::new()
        };
        Ok(Sample::TagPresence(uid))
    }
}

/// Pushbutton stand-in with configurable polarity.
pub struct SimButton {
    level: &'static AtomicBool,
    active_low: bool,
}

impl SimButton {
    pub fn gate(active_low: bool) -> Self {
        Self {
            level: &SIM_GATE_BUTTON_LEVEL,
            active_low,
        }
    }

    pub fn artifact_info(active_low: bool) -> Self {
        Self {
            level: &SIM_INFO_BUTTON_LEVEL,
            active_low,
        }
    }
}

impl SensorPort for SimButton {
    fn poll(&mut self) -> Result<Sample, ReadError> {
        let level = self.level.load(Ordering::Relaxed);
        let pressed = if self.active_low { !level } else { level };
        Ok(Sample::ButtonState(pressed))
    }
}

/// HX711 stand-in, yielding raw counts.
pub struct SimLoadCell;

impl SensorPort for SimLoadCell {
    fn poll(&mut self) -> Result<Sample, ReadError> {
        Ok(Sample::Weight(load_f32(&SIM_WEIGHT_RAW)))
    }
}

/// MQ-2 digital stand-in with configurable polarity.
pub struct SimGasInput {
    pub active_low: bool,
}

impl SensorPort for SimGasInput {
    fn poll(&mut self) -> Result<Sample, ReadError> {
        let level = SIM_GAS_LEVEL.load(Ordering::Relaxed);
        let detected = if self.active_low { !level } else { level };
        Ok(Sample::GasDigital(detected))
    }
}

/// One ultrasonic corner sensor.
pub struct SimRangeFinder {
    pub index: u8,
}

impl SensorPort for SimRangeFinder {
    fn poll(&mut self) -> Result<Sample, ReadError> {
        Ok(Sample::Distance {
            meters: load_f32(&SIM_DISTANCE_M[self.index as usize]),
            sensor: self.index,
        })
    }
}

/// DHT11 stand-in. Yields Temperature and Humidity on alternating polls
/// (two reads of one device); `reinit` rebuilds the handle, clearing an
/// injected device fault and restarting the phase at temperature.
pub struct SimClimateProbe {
    next_is_humidity: bool,
}

impl SimClimateProbe {
    pub fn new() -> Self {
        Self {
            next_is_humidity: false,
        }
    }
}

impl SensorPort for SimClimateProbe {
    fn poll(&mut self) -> Result<Sample, ReadError> {
        match SIM_CLIMATE_FAULT.load(Ordering::Relaxed) {
            1 => return Err(ReadError::Transient),
            2 => return Err(ReadError::Device),
            _ => {}
        }
        let sample = if self.next_is_humidity {
            Sample::Humidity(load_f32(&SIM_HUMIDITY_PCT))
        } else {
            Sample::Temperature(load_f32(&SIM_TEMPERATURE_C))
        };
        self.next_is_humidity = !self.next_is_humidity;
        Ok(sample)
    }
}

impl ResettableSensorPort for SimClimateProbe {
    fn reinit(&mut self) -> Result<(), ReadError> {
        debug!("sim climate probe reinitialized");
        SIM_CLIMATE_FAULT.store(0, Ordering::Relaxed);
        self.next_is_humidity = false;
        Ok(())
    }
}

// ───────────────────────────────────────────────────────────────
// Actuator adapters
// ───────────────────────────────────────────────────────────────

/// Gate servo stand-in; tracks the last commanded angle.
pub struct SimGateServo {
    angle: u8,
}

impl SimGateServo {
    pub fn new() -> Self {
        Self { angle: 0 }
    }

    pub fn angle(&self) -> u8 {
        self.angle
    }
}

impl GateServoPort for SimGateServo {
    fn set_angle(&mut self, degrees: u8) {
        debug!("servo angle -> {degrees}");
        self.angle = degrees;
    }
}

/// Status LED stand-in.
pub struct SimStatusLed {
    on: bool,
}

impl SimStatusLed {
    pub fn new() -> Self {
        Self { on: false }
    }
}

impl LedPort for SimStatusLed {
    fn set(&mut self, on: bool) {
        if on != self.on {
            debug!("led -> {}", if on { "on" } else { "off" });
        }
        self.on = on;
    }
}

/// Buzzer stand-in.
pub struct SimBuzzer {
    on: bool,
}

impl SimBuzzer {
    pub fn new() -> Self {
        Self { on: false }
    }
}

impl BuzzerPort for SimBuzzer {
    fn set(&mut self, on: bool) {
        if on != self.on {
            debug!("buzzer -> {}", if on { "on" } else { "off" });
        }
        self.on = on;
    }
}

// ═══════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════
