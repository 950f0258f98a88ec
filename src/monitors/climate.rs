//! Climate monitor — temperature/humidity with retry and device recovery.
//!
//! DHT-class probes are slow and flaky: single-read failures are routine
//! and a wedged device needs its handle released and rebuilt. The policy
//! split is explicit:
//!
//! - transient failure → short delay, retry, bounded by `max_retries`;
//! - retries exhausted or a persistent fault → reinitialize the device
//!   handle, cool down, resume next cycle.
//!
//! Each measurand publishes immediately after its own successful read
//! (temperature first, settle, then humidity) at the elevated delivery
//! guarantee the dashboards rely on.

use core::time::Duration;

use log::{debug, warn};

use crate::error::{Error, ReadError};
use crate::ports::{ResettableSensorPort, Sample, TelemetrySink};
use crate::supervisor::MonitorUnit;
use crate::telemetry::TelemetryMsg;

pub const UNIT_NAME: &str = "climate";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Measurand {
    Temperature,
    Humidity,
}

pub struct ClimateMonitor<C, K> {
    device: C,
    sink: K,
    settle_ms: u64,
    retry_delay_ms: u64,
    max_retries: u32,
    reinit_cooldown_ms: u64,
}

impl<C, K> ClimateMonitor<C, K>
where
    C: ResettableSensorPort,
    K: TelemetrySink,
{
    pub fn new(device: C, sink: K, config: &crate::config::StationConfig) -> Self {
        Self {
            device,
            sink,
            settle_ms: config.climate_settle_ms,
            retry_delay_ms: config.climate_retry_delay_ms,
            max_retries: config.climate_max_retries,
            reinit_cooldown_ms: config.climate_reinit_cooldown_ms,
        }
    }

    pub async fn poll_once(&mut self) -> Result<(), Error> {
        let Some(celsius) = self.read(Measurand::Temperature).await? else {
            return Ok(());
        };
        self.sink.publish(TelemetryMsg::temperature(celsius));

        async_io_mini::Timer::after(Duration::from_millis(self.settle_ms)).await;

        let Some(percent) = self.read(Measurand::Humidity).await? else {
            return Ok(());
        };
        self.sink.publish(TelemetryMsg::humidity(percent));
        Ok(())
    }

    /// Read one measurand with the retry/reinit policy applied.
    /// `Ok(None)` means the read was abandoned and the device recovered —
    /// the cycle ends and polling resumes on the next cadence tick.
    async fn read(&mut self, want: Measurand) -> Result<Option<f32>, Error> {
        let mut retries = 0u32;
        loop {
            match self.device.poll() {
                Ok(sample) => {
                    let value = match (want, sample) {
                        (Measurand::Temperature, Sample::Temperature(c)) => c,
                        (Measurand::Humidity, Sample::Humidity(p)) => p,
                        (_, other) => {
                            return Err(Error::UnexpectedSample {
                                unit: UNIT_NAME,
                                got: other.kind(),
                            });
                        }
                    };
                    return Ok(Some(value));
                }
                Err(ReadError::Transient) => {
                    if retries >= self.max_retries {
                        warn!(
                            "climate: {} transient failures, reinitializing device",
                            retries + 1
                        );
                        self.recover().await;
                        return Ok(None);
                    }
                    retries += 1;
                    debug!("climate {want:?} read retry {retries}/{}", self.max_retries);
                    async_io_mini::Timer::after(Duration::from_millis(self.retry_delay_ms)).await;
                }
                Err(ReadError::Device) => {
                    warn!("climate device fault, reinitializing");
                    self.recover().await;
                    return Ok(None);
                }
            }
        }
    }

    async fn recover(&mut self) {
        if let Err(e) = self.device.reinit() {
            warn!("climate device reinit failed ({e}), retrying next cycle");
        }
        async_io_mini::Timer::after(Duration::from_millis(self.reinit_cooldown_ms)).await;
    }
}

impl<C, K> MonitorUnit for ClimateMonitor<C, K>
where
    C: ResettableSensorPort,
    K: TelemetrySink,
{
    fn name(&self) -> &'static str {
        UNIT_NAME
    }

    async fn poll_once(&mut self) -> Result<(), Error> {
        ClimateMonitor::poll_once(self).await
    }
}
