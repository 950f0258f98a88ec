//! Port traits — the hexagonal boundary between the monitoring core and the
//! outside world.
//!
//! ```text
//!   Sensor adapter ──▶ SensorPort ──▶ monitor ──▶ TelemetrySink
//!                                        │
//!                     actuator ports ◀───┘ (via the arbiter)
//! ```
//!
//! Driven adapters (sensor readers, actuator drivers, telemetry sinks)
//! implement these traits. Monitors consume them via generics, so the core
//! never touches a sensor protocol or a broker client directly — only the
//! contracts below.

use crate::error::ReadError;
use crate::telemetry::TelemetryMsg;

/// NFC tag UID bytes. PN532 targets report 4-, 7- or 10-byte UIDs.
pub type Uid = heapless::Vec<u8, 10>;

// ───────────────────────────────────────────────────────────────
// Samples (read-side vocabulary)
// ───────────────────────────────────────────────────────────────

/// A tagged value produced by one poll of a [`SensorPort`].
///
/// Samples are ephemeral: created per poll, classified, discarded.
#[derive(Debug, Clone, PartialEq)]
pub enum Sample {
    /// An NFC target in field. An empty UID means "antenna polled, nothing
    /// readable" and is not a tag read.
    TagPresence(Uid),
    /// Debounced logical state of a pushbutton (`true` = pressed, polarity
    /// already normalized by the adapter).
    ButtonState(bool),
    /// Raw load-cell units (ADC counts). The theft detector's calibration
    /// ratio converts to grams.
    Weight(f32),
    /// Logical gas-detector output (`true` = gas present, polarity already
    /// normalized by the adapter).
    GasDigital(bool),
    /// One ultrasonic range reading.
    Distance { meters: f32, sensor: u8 },
    /// Ambient temperature in degrees Celsius.
    Temperature(f32),
    /// Relative humidity in percent.
    Humidity(f32),
}

impl Sample {
    /// Short variant name for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::TagPresence(_) => "tag-presence",
            Self::ButtonState(_) => "button-state",
            Self::Weight(_) => "weight",
            Self::GasDigital(_) => "gas-digital",
            Self::Distance { .. } => "distance",
            Self::Temperature(_) => "temperature",
            Self::Humidity(_) => "humidity",
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: hardware → monitors)
// ───────────────────────────────────────────────────────────────

/// Read-side port: a monitor calls this to obtain one sample per poll.
///
/// Implemented per physical sensor instance. Which [`Sample`] variant a
/// given port yields is part of its wiring contract; a monitor that
/// receives a variant it does not understand treats that as a unit fault.
pub trait SensorPort {
    fn poll(&mut self) -> Result<Sample, ReadError>;
}

/// A sensor whose device handle can be released and reinitialized after a
/// persistent failure (DHT-style climate probes).
///
/// The climate device yields [`Sample::Temperature`] and
/// [`Sample::Humidity`] on alternating polls — two reads of one device,
/// separated by a settle delay.
pub trait ResettableSensorPort: SensorPort {
    fn reinit(&mut self) -> Result<(), ReadError>;
}

// ───────────────────────────────────────────────────────────────
// Actuator ports (driven adapters: arbiter → hardware)
// ───────────────────────────────────────────────────────────────

/// Gate servo. Angle range 0–180; the station uses two positions
/// (closed and open, both configured).
pub trait GateServoPort {
    fn set_angle(&mut self, degrees: u8);
}

/// Shared status LED (gate feedback and perimeter breach lamp).
pub trait LedPort {
    fn set(&mut self, on: bool);
}

/// Alarm buzzer.
pub trait BuzzerPort {
    fn set(&mut self, on: bool);
}

// ───────────────────────────────────────────────────────────────
// Telemetry sink (driven adapter: monitors → broker boundary)
// ───────────────────────────────────────────────────────────────

/// The monitors emit discrete [`TelemetryMsg`]s through this port.
/// Adapters decide where they go — the bounded channel feeding the broker
/// client in production, a recording vector in tests, a structured log line
/// in the demo binary.
///
/// Delivery, retry and reconnect are entirely the adapter's concern; the
/// requested QoS travels with the message.
pub trait TelemetrySink {
    fn publish(&mut self, msg: TelemetryMsg);
}
