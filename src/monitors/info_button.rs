//! Artifact-info button — "what is that artifact?" visitor request.
//!
//! A pressed button publishes one `artifact_info` event and then holds a
//! cooldown, so a visitor leaning on the button produces one request, not
//! a stream. The audio playback itself lives behind the broker.

use core::time::Duration;

use log::{debug, info};

use crate::error::Error;
use crate::ports::{Sample, SensorPort, TelemetrySink};
use crate::supervisor::MonitorUnit;
use crate::telemetry::TelemetryMsg;

pub const UNIT_NAME: &str = "artifact-info";

pub struct ArtifactInfoMonitor<B, K> {
    button: B,
    sink: K,
    cooldown_ms: u64,
}

impl<B, K> ArtifactInfoMonitor<B, K>
where
    B: SensorPort,
    K: TelemetrySink,
{
    pub fn new(button: B, sink: K, config: &crate::config::StationConfig) -> Self {
        Self {
            button,
            sink,
            cooldown_ms: config.info_cooldown_ms,
        }
    }

    pub async fn poll_once(&mut self) -> Result<(), Error> {
        let pressed = match self.button.poll() {
            Ok(Sample::ButtonState(p)) => p,
            Ok(other) => {
                return Err(Error::UnexpectedSample {
                    unit: UNIT_NAME,
                    got: other.kind(),
                });
            }
            Err(e) => {
                debug!("info button read failed ({e})");
                false
            }
        };
        if pressed {
            info!("artifact info requested");
            self.sink.publish(TelemetryMsg::artifact_info());
            async_io_mini::Timer::after(Duration::from_millis(self.cooldown_ms)).await;
        }
        Ok(())
    }
}

impl<B, K> MonitorUnit for ArtifactInfoMonitor<B, K>
where
    B: SensorPort,
    K: TelemetrySink,
{
    fn name(&self) -> &'static str {
        UNIT_NAME
    }

    async fn poll_once(&mut self) -> Result<(), Error> {
        ArtifactInfoMonitor::poll_once(self).await
    }
}
