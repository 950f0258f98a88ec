//! Telemetry messages and the unit → publisher channel.
//!
//! Monitoring units publish through a [`TelemetrySink`]; in production that
//! sink is [`ChannelSink`], which pushes into a bounded `embassy-sync`
//! channel shared with the publisher task. The publisher side drains the
//! channel and hands each message to whatever adapter stands in for the
//! broker client.
//!
//! ```text
//! ┌──────────────┐  TelemetryMsg  ┌───────────────┐
//! │ monitor unit │───────────────▶│ publisher task │──▶ broker client
//! │ (producer)   │   (bounded)    │ (consumer)     │
//! └──────────────┘                └───────────────┘
//! ```
//!
//! The producer side never blocks: a full channel drops the message with a
//! warning. Losing one heartbeat under backpressure is preferable to
//! stalling a poll loop mid-cycle.

use core::fmt;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use log::warn;

use crate::ports::TelemetrySink;

// ───────────────────────────────────────────────────────────────
// Topics
// ───────────────────────────────────────────────────────────────

/// Broker topics used by the station.
pub mod topic {
    /// Authoritative visitor count (integer).
    pub const VISITOR_COUNT: &str = "visitor_count";
    /// Exhibit weight dropped below the resting baseline (string).
    pub const THEFT_DETECTED: &str = "theft_detected";
    /// Gas detector heartbeat, `SAFE` or `DANGER` (string).
    pub const GAS_LEVEL: &str = "gas_level";
    /// Perimeter breach confirmed (integer 0/1; only 1 is ever published).
    pub const PERIMETER_BREACH: &str = "perimeter_breach";
    /// Ambient temperature in degrees Celsius (float).
    pub const TEMPERATURE: &str = "temperature";
    /// Relative humidity in percent (float).
    pub const HUMIDITY: &str = "humidity";
    /// Artifact-info pushbutton pressed (string).
    pub const ARTIFACT_INFO: &str = "artifact_info";
    /// A monitoring unit exceeded its restart ceiling (string, unit name).
    pub const UNIT_FATAL: &str = "unit_fatal";
}

// ───────────────────────────────────────────────────────────────
// Message types
// ───────────────────────────────────────────────────────────────

/// Requested delivery guarantee, mapped by the broker adapter onto whatever
/// the transport offers (MQTT QoS 0/1/2 on the deployed broker).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QoS {
    AtMostOnce,
    AtLeastOnce,
    ExactlyOnceEffective,
}

/// Payload of one telemetry message.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Payload {
    Integer(i64),
    Float(f32),
    Text(&'static str),
}

impl fmt::Display for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v:.1}"),
            Self::Text(v) => write!(f, "{v}"),
        }
    }
}

/// One discrete event bound for the telemetry broker.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TelemetryMsg {
    pub topic: &'static str,
    pub payload: Payload,
    pub qos: QoS,
}

impl TelemetryMsg {
    pub fn visitor_count(count: u32) -> Self {
        Self {
            topic: topic::VISITOR_COUNT,
            payload: Payload::Integer(i64::from(count)),
            qos: QoS::AtMostOnce,
        }
    }

    pub fn theft_detected() -> Self {
        Self {
            topic: topic::THEFT_DETECTED,
            payload: Payload::Text("OBJECT_MISSING"),
            qos: QoS::AtLeastOnce,
        }
    }

    pub fn gas_level(danger: bool) -> Self {
        Self {
            topic: topic::GAS_LEVEL,
            payload: Payload::Text(if danger { "DANGER" } else { "SAFE" }),
            qos: QoS::AtMostOnce,
        }
    }

    pub fn perimeter_breach() -> Self {
        Self {
            topic: topic::PERIMETER_BREACH,
            payload: Payload::Integer(1),
            qos: QoS::AtMostOnce,
        }
    }

    pub fn temperature(celsius: f32) -> Self {
        Self {
            topic: topic::TEMPERATURE,
            payload: Payload::Float(celsius),
            qos: QoS::ExactlyOnceEffective,
        }
    }

    pub fn humidity(percent: f32) -> Self {
        Self {
            topic: topic::HUMIDITY,
            payload: Payload::Float(percent),
            qos: QoS::ExactlyOnceEffective,
        }
    }

    pub fn artifact_info() -> Self {
        Self {
            topic: topic::ARTIFACT_INFO,
            payload: Payload::Text("BUTTON_PRESSED"),
            qos: QoS::AtMostOnce,
        }
    }

    pub fn unit_fatal(unit: &'static str) -> Self {
        Self {
            topic: topic::UNIT_FATAL,
            payload: Payload::Text(unit),
            qos: QoS::AtLeastOnce,
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Unit → publisher channel
// ───────────────────────────────────────────────────────────────

/// Channel depth. Sized for a burst of every unit publishing in the same
/// reactor turn with headroom; the consumer drains far faster than units
/// produce.
const TELEMETRY_DEPTH: usize = 32;

/// Bounded channel carrying messages from monitor tasks to the publisher.
pub static TELEMETRY_CHANNEL: Channel<CriticalSectionRawMutex, TelemetryMsg, TELEMETRY_DEPTH> =
    Channel::new();

/// Producer handle handed to every monitoring unit.
#[derive(Debug, Clone, Copy)]
pub struct ChannelSink;

impl TelemetrySink for ChannelSink {
    fn publish(&mut self, msg: TelemetryMsg) {
        if TELEMETRY_CHANNEL.try_send(msg).is_err() {
            warn!("telemetry channel full, dropping '{}'", msg.topic);
        }
    }
}

/// Drain the channel forever, forwarding every message to `publisher`.
/// Runs as its own executor task; wakes instantly on `try_send`.
pub async fn forward_to(publisher: &mut impl TelemetrySink) {
    loop {
        let msg = TELEMETRY_CHANNEL.receive().await;
        publisher.publish(msg);
    }
}

// ═══════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════
