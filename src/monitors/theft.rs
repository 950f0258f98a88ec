//! Theft detector — load-cell watch over the exhibit pedestal.
//!
//! The load cell reads raw ADC units; a one-time startup calibration
//! against a known weight fixes the conversion ratio for the process
//! lifetime. Each live poll averages a burst of raw readings — the
//! averaging is the debounce, no extra timer needed.
//!
//! Classification per cycle:
//!
//! - weight ≥ baseline ⇒ the exhibit is on the pedestal; an object-present
//!   reading is the trigger for evaluating visitor traffic, so the cycle
//!   delegates to the visitor gate's poll. (Deliberate coupling carried
//!   over from the deployed installation.)
//! - weight < baseline ⇒ the exhibit is gone: publish `theft_detected`
//!   at-least-once, then hold a cooldown so a missing object does not
//!   storm the broker every half second.

use core::time::Duration;

use log::{debug, info, warn};

use crate::error::{Error, ReadError};
use crate::ports::{Sample, SensorPort, TelemetrySink};
use crate::supervisor::MonitorUnit;
use crate::telemetry::TelemetryMsg;

use super::visitor_gate::SharedVisitorGate;

pub const UNIT_NAME: &str = "theft";

pub struct TheftDetector<W, N, B, GK, K> {
    scale: W,
    visitor_gate: SharedVisitorGate<N, B, GK>,
    sink: K,
    /// Raw-units-per-gram conversion, fixed by [`calibrate`](Self::calibrate).
    ratio: Option<f32>,
    baseline_g: f32,
    samples_per_read: u32,
    calibration_samples: u32,
    cooldown_ms: u64,
}

impl<W, N, B, GK, K> TheftDetector<W, N, B, GK, K>
where
    W: SensorPort,
    N: SensorPort,
    B: SensorPort,
    GK: TelemetrySink,
    K: TelemetrySink,
{
    pub fn new(
        scale: W,
        visitor_gate: SharedVisitorGate<N, B, GK>,
        sink: K,
        config: &crate::config::StationConfig,
    ) -> Self {
        Self {
            scale,
            visitor_gate,
            sink,
            ratio: None,
            baseline_g: config.theft_baseline_g,
            samples_per_read: config.theft_samples_per_read,
            calibration_samples: config.theft_calibration_samples,
            cooldown_ms: config.theft_cooldown_ms,
        }
    }

    /// Whether calibration has completed.
    pub fn is_calibrated(&self) -> bool {
        self.ratio.is_some()
    }

    /// Operator control: one-time calibration against a known reference
    /// weight sitting on the pedestal. Must complete before the unit is
    /// scheduled; returns the computed ratio.
    pub fn calibrate(&mut self, known_weight_g: f32) -> Result<f32, Error> {
        if known_weight_g <= 0.0 {
            return Err(Error::Config("calibration weight must be positive"));
        }
        let raw_mean = self.raw_mean(self.calibration_samples)?;
        let ratio = raw_mean / known_weight_g;
        self.ratio = Some(ratio);
        info!("scale ratio set to {ratio:.4} ({raw_mean:.1} raw / {known_weight_g:.1} g)");
        Ok(ratio)
    }

    /// One poll cycle: smoothed read, classify, act.
    pub async fn poll_once(&mut self) -> Result<(), Error> {
        let ratio = self.ratio.ok_or(Error::NotCalibrated)?;

        let raw = match self.raw_mean(self.samples_per_read) {
            Ok(raw) => raw,
            Err(Error::Sensor(_)) => {
                debug!("load cell unreadable this cycle, skipping");
                return Ok(());
            }
            Err(e) => return Err(e),
        };
        let grams = raw / ratio;

        if grams >= self.baseline_g {
            // Object present — evaluate visitor traffic this cycle.
            self.visitor_gate.lock().await.poll_once().await
        } else {
            warn!(
                "exhibit weight {grams:.1} g below baseline {:.1} g",
                self.baseline_g
            );
            self.sink.publish(TelemetryMsg::theft_detected());
            async_io_mini::Timer::after(Duration::from_millis(self.cooldown_ms)).await;
            Ok(())
        }
    }

    /// Mean of `n` raw readings. Individual transient misreads are
    /// tolerated up to twice the requested count of attempts; falling
    /// short is reported as a transient failure for the caller to contain.
    fn raw_mean(&mut self, n: u32) -> Result<f32, Error> {
        let mut sum = 0.0f32;
        let mut got = 0u32;
        let mut attempts = 0u32;
        while got < n && attempts < n * 2 {
            attempts += 1;
            match self.scale.poll() {
                Ok(Sample::Weight(raw)) => {
                    sum += raw;
                    got += 1;
                }
                Ok(other) => {
                    return Err(Error::UnexpectedSample {
                        unit: UNIT_NAME,
                        got: other.kind(),
                    });
                }
                Err(ReadError::Transient | ReadError::Device) => {}
            }
        }
        if got < n {
            return Err(Error::Sensor(ReadError::Transient));
        }
        Ok(sum / got as f32)
    }
}

impl<W, N, B, GK, K> MonitorUnit for TheftDetector<W, N, B, GK, K>
where
    W: SensorPort,
    N: SensorPort,
    B: SensorPort,
    GK: TelemetrySink,
    K: TelemetrySink,
{
    fn name(&self) -> &'static str {
        UNIT_NAME
    }

    async fn poll_once(&mut self) -> Result<(), Error> {
        TheftDetector::poll_once(self).await
    }
}
