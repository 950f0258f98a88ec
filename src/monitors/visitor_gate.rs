//! Visitor gate detector — NFC admissions, manual-override exits, and the
//! authoritative visitor count.
//!
//! Two independent triggers feed one admission sequence:
//!
//! | Trigger                    | Sequence              | Count   |
//! |----------------------------|-----------------------|---------|
//! | NFC tag with non-empty UID | open → dwell → close  | +1      |
//! | Manual-override press      | open → dwell → close  | −1 (≥0) |
//!
//! The count changes and publishes only after a completed gate sequence.
//! If the gate lease is busy this cycle, the trigger is dropped and the
//! tag/button is naturally re-observed on the next poll — no event is
//! fabricated for a sequence that did not run.
//!
//! The detector instance is shared behind an async mutex
//! ([`SharedVisitorGate`]): its own scheduled unit locks it per cycle, and
//! the theft detector locks it when delegating. That mutex is what keeps
//! count mutations atomic across concurrent tag and button activity.

use std::rc::Rc;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::mutex::Mutex;
use log::{debug, info};

use crate::arbiter::ActuatorArbiter;
use crate::error::{ArbiterError, Error};
use crate::ports::{Sample, SensorPort, TelemetrySink};
use crate::supervisor::MonitorUnit;
use crate::telemetry::TelemetryMsg;

pub const UNIT_NAME: &str = "visitor-gate";

/// The shared handle: the gate's own unit and the theft detector both lock
/// this to run poll cycles; the operator layer locks it to reset the count.
pub type SharedVisitorGate<N, B, K> = Rc<Mutex<CriticalSectionRawMutex, VisitorGate<N, B, K>>>;

enum Admission {
    /// Tag read at the entrance.
    Entry,
    /// Staff let somebody out by hand.
    ManualExit,
}

pub struct VisitorGate<N, B, K> {
    nfc: N,
    button: B,
    arbiter: Rc<ActuatorArbiter>,
    sink: K,
    count: u32,
}

impl<N, B, K> VisitorGate<N, B, K>
where
    N: SensorPort,
    B: SensorPort,
    K: TelemetrySink,
{
    pub fn new(nfc: N, button: B, arbiter: Rc<ActuatorArbiter>, sink: K) -> Self {
        Self {
            nfc,
            button,
            arbiter,
            sink,
            count: 0,
        }
    }

    /// Wrap into the shared handle used by the unit, the theft detector
    /// and the operator layer.
    pub fn into_shared(self) -> SharedVisitorGate<N, B, K> {
        Rc::new(Mutex::new(self))
    }

    /// Current visitor count.
    pub fn count(&self) -> u32 {
        self.count
    }

    /// Operator control: zero the count unconditionally and publish the
    /// new value. Invoked from the operator layer, not polled.
    pub fn reset_count(&mut self) {
        self.count = 0;
        info!("visitor count reset by operator");
        self.sink.publish(TelemetryMsg::visitor_count(0));
    }

    /// One poll cycle: one tag read, one button read, at most one gate
    /// sequence per trigger. Read failures are contained — a flaky antenna
    /// is a no-tag cycle, not a fault.
    pub async fn poll_once(&mut self) -> Result<(), Error> {
        let tag_read = match self.nfc.poll() {
            Ok(Sample::TagPresence(uid)) => !uid.is_empty(),
            Ok(other) => {
                return Err(Error::UnexpectedSample {
                    unit: UNIT_NAME,
                    got: other.kind(),
                });
            }
            Err(e) => {
                debug!("NFC read failed ({e}), no tag this cycle");
                false
            }
        };
        if tag_read {
            self.admit(Admission::Entry).await;
        }

        let pressed = match self.button.poll() {
            Ok(Sample::ButtonState(p)) => p,
            Ok(other) => {
                return Err(Error::UnexpectedSample {
                    unit: UNIT_NAME,
                    got: other.kind(),
                });
            }
            Err(e) => {
                debug!("override button read failed ({e})");
                false
            }
        };
        if pressed {
            self.admit(Admission::ManualExit).await;
        }

        Ok(())
    }

    async fn admit(&mut self, kind: Admission) {
        let mut lease = match self.arbiter.acquire_gate(UNIT_NAME).await {
            Ok(lease) => lease,
            // Dropped for this cycle; the tag/press is re-observed next poll.
            Err(ArbiterError::Busy) => return,
        };
        lease.open_dwell_close().await;
        drop(lease);

        self.count = match kind {
            Admission::Entry => self.count.saturating_add(1),
            Admission::ManualExit => self.count.saturating_sub(1),
        };
        match kind {
            Admission::Entry => info!("visitor admitted, count={}", self.count),
            Admission::ManualExit => info!("manual-override exit, count={}", self.count),
        }
        self.sink.publish(TelemetryMsg::visitor_count(self.count));
    }
}

// ───────────────────────────────────────────────────────────────
// Scheduled unit wrapper
// ───────────────────────────────────────────────────────────────

/// The visitor gate's own scheduling wrapper: locks the shared detector
/// for exactly one poll cycle.
pub struct VisitorGateUnit<N, B, K>(pub SharedVisitorGate<N, B, K>);

impl<N, B, K> MonitorUnit for VisitorGateUnit<N, B, K>
where
    N: SensorPort,
    B: SensorPort,
    K: TelemetrySink,
{
    fn name(&self) -> &'static str {
        UNIT_NAME
    }

    async fn poll_once(&mut self) -> Result<(), Error> {
        self.0.lock().await.poll_once().await
    }
}
