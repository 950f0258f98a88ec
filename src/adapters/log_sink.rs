//! Log-based telemetry publisher adapter.
//!
//! Implements [`TelemetrySink`] by writing each message as a structured
//! log line. The broker-client adapter (MQTT over TLS in the deployed
//! installation) implements the same trait; connection, retry and
//! reconnect are entirely its concern.

use log::info;

use crate::ports::TelemetrySink;
use crate::telemetry::TelemetryMsg;

/// Adapter that logs every telemetry message to the console.
pub struct LogPublisher;

impl LogPublisher {
    pub fn new() -> Self {
        Self
    }
}

impl TelemetrySink for LogPublisher {
    fn publish(&mut self, msg: TelemetryMsg) {
        info!(
            "PUB | {} = {} ({:?})",
            msg.topic, msg.payload, msg.qos
        );
    }
}
