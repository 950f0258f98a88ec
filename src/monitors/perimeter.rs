//! Perimeter monitor — four-corner ultrasonic breach detection.
//!
//! The four corner distances are summed into one aggregate proximity score
//! and compared against a single threshold. Cheap fusion, no per-sensor
//! thresholds — and knowingly brittle: a corner failing open (reporting a
//! very large distance) can mask a close breach on another corner. That
//! weakness ships as-is; do not "fix" it here without revisiting the
//! installed geometry.
//!
//! Breach publishing is edge-style: a confirmed breach publishes
//! `perimeter_breach = 1` and lights the shared lamp for the hold period;
//! clear cycles publish nothing. Contrast with the gas heartbeat; the
//! dashboards depend on the difference.

use core::time::Duration;
use std::rc::Rc;

use log::{debug, warn};

use crate::arbiter::ActuatorArbiter;
use crate::error::{ArbiterError, Error};
use crate::ports::{Sample, SensorPort, TelemetrySink};
use crate::supervisor::MonitorUnit;
use crate::telemetry::TelemetryMsg;

use super::AlarmLevel;

pub const UNIT_NAME: &str = "perimeter";

pub struct PerimeterMonitor<D, K> {
    corners: [D; 4],
    arbiter: Rc<ActuatorArbiter>,
    sink: K,
    level: AlarmLevel,
    threshold_cm: f32,
    led_hold_ms: u64,
}

impl<D, K> PerimeterMonitor<D, K>
where
    D: SensorPort,
    K: TelemetrySink,
{
    pub fn new(
        corners: [D; 4],
        arbiter: Rc<ActuatorArbiter>,
        sink: K,
        config: &crate::config::StationConfig,
    ) -> Self {
        Self {
            corners,
            arbiter,
            sink,
            level: AlarmLevel::Safe,
            threshold_cm: config.perimeter_threshold_cm,
            led_hold_ms: config.perimeter_led_hold_ms,
        }
    }

    /// Current confirmed alarm level.
    pub fn level(&self) -> AlarmLevel {
        self.level
    }

    pub async fn poll_once(&mut self) -> Result<(), Error> {
        let mut total_cm = 0.0f32;
        for corner in &mut self.corners {
            match corner.poll() {
                Ok(Sample::Distance { meters, .. }) => total_cm += meters * 100.0,
                Ok(other) => {
                    return Err(Error::UnexpectedSample {
                        unit: UNIT_NAME,
                        got: other.kind(),
                    });
                }
                Err(e) => {
                    // A partial sum would bias the aggregate low and
                    // fabricate a breach; skip the whole cycle instead.
                    debug!("corner read failed ({e}), skipping cycle");
                    return Ok(());
                }
            }
        }

        if total_cm < self.threshold_cm {
            self.level = AlarmLevel::Alarm;
            warn!(
                "perimeter breach: aggregate {total_cm:.1} cm below {:.1} cm",
                self.threshold_cm
            );
            match self.arbiter.acquire_gate(UNIT_NAME).await {
                Ok(mut lease) => {
                    lease.led_set(true);
                    self.sink.publish(TelemetryMsg::perimeter_breach());
                    async_io_mini::Timer::after(Duration::from_millis(self.led_hold_ms)).await;
                    lease.led_set(false);
                }
                Err(ArbiterError::Busy) => {
                    // The breach is real either way; only the lamp is skipped.
                    debug!("gate busy, breach lamp skipped this cycle");
                    self.sink.publish(TelemetryMsg::perimeter_breach());
                }
            }
        } else {
            // Clear cycles publish nothing.
            self.level = AlarmLevel::Safe;
        }
        Ok(())
    }
}

impl<D, K> MonitorUnit for PerimeterMonitor<D, K>
where
    D: SensorPort,
    K: TelemetrySink,
{
    fn name(&self) -> &'static str {
        UNIT_NAME
    }

    async fn poll_once(&mut self) -> Result<(), Error> {
        PerimeterMonitor::poll_once(self).await
    }

    fn reset(&mut self) {
        self.level = AlarmLevel::Safe;
    }
}
