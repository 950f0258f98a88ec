//! Gas monitor — MQ-2 digital watch with buzzer alarm.
//!
//! Publishes `gas_level` on **every** cycle, not just on transitions:
//! downstream dashboards treat the stream as a liveness heartbeat, so a
//! quiet topic means a dead monitor, never "still safe". The perimeter
//! monitor is edge-triggered; do not unify the two without checking what
//! the dashboards expect.
//!
//! On detection the buzzer pulse train runs through the arbiter before the
//! publish, blocking this unit for its duration. Trains never overlap — a
//! detection landing while a train runs coalesces into it.

use std::rc::Rc;

use log::{debug, info, warn};

use crate::arbiter::ActuatorArbiter;
use crate::error::Error;
use crate::ports::{Sample, SensorPort, TelemetrySink};
use crate::supervisor::MonitorUnit;
use crate::telemetry::TelemetryMsg;

use super::AlarmLevel;

pub const UNIT_NAME: &str = "gas";

pub struct GasMonitor<G, K> {
    input: G,
    arbiter: Rc<ActuatorArbiter>,
    sink: K,
    level: AlarmLevel,
}

impl<G, K> GasMonitor<G, K>
where
    G: SensorPort,
    K: TelemetrySink,
{
    pub fn new(input: G, arbiter: Rc<ActuatorArbiter>, sink: K) -> Self {
        Self {
            input,
            arbiter,
            sink,
            level: AlarmLevel::Safe,
        }
    }

    /// Current confirmed alarm level.
    pub fn level(&self) -> AlarmLevel {
        self.level
    }

    pub async fn poll_once(&mut self) -> Result<(), Error> {
        let detected = match self.input.poll() {
            Ok(Sample::GasDigital(d)) => d,
            Ok(other) => {
                return Err(Error::UnexpectedSample {
                    unit: UNIT_NAME,
                    got: other.kind(),
                });
            }
            Err(e) => {
                // No confirmed sample, no level change, no heartbeat —
                // consumers see the gap.
                debug!("gas read failed ({e}), skipping cycle");
                return Ok(());
            }
        };

        if detected {
            if self.level != AlarmLevel::Alarm {
                warn!("gas alarm raised");
            }
            self.level = AlarmLevel::Alarm;
            self.arbiter.pulse_buzzer().await;
            self.sink.publish(TelemetryMsg::gas_level(true));
        } else {
            if self.level != AlarmLevel::Safe {
                info!("gas alarm cleared");
            }
            self.level = AlarmLevel::Safe;
            self.sink.publish(TelemetryMsg::gas_level(false));
        }
        Ok(())
    }
}

impl<G, K> MonitorUnit for GasMonitor<G, K>
where
    G: SensorPort,
    K: TelemetrySink,
{
    fn name(&self) -> &'static str {
        UNIT_NAME
    }

    async fn poll_once(&mut self) -> Result<(), Error> {
        GasMonitor::poll_once(self).await
    }

    fn reset(&mut self) {
        self.level = AlarmLevel::Safe;
    }
}
