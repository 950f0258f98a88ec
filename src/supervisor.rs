//! Unit supervisor — cadenced scheduling, restart-with-backoff, and
//! permanent-failure containment.
//!
//! Every monitoring unit runs as its own long-lived task:
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────┐
//! │ supervise(unit)                                           │
//! │   loop:                                                   │
//! │     stop requested? ──▶ exit                              │
//! │     unit.poll_once()                                      │
//! │       Ok  ──▶ sleep(cadence)                              │
//! │       Err ──▶ restart counter < ceiling?                  │
//! │                 yes: reset unit, sleep(backoff), continue │
//! │                 no:  publish unit_fatal, exit             │
//! └───────────────────────────────────────────────────────────┘
//! ```
//!
//! A unit that keeps faulting is excluded from scheduling — that unit
//! only. The rest of the station degrades partially instead of crashing,
//! and the one `unit_fatal` event makes the exclusion visible externally.
//!
//! Cancellation is cooperative: the stop flag is checked at the top of
//! each cycle, never mid-dwell.

use core::time::Duration;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use log::{error, info, warn};

use crate::config::StationConfig;
use crate::error::Error;
use crate::ports::TelemetrySink;
use crate::telemetry::TelemetryMsg;

// ───────────────────────────────────────────────────────────────
// Unit contract
// ───────────────────────────────────────────────────────────────

/// A continuously polled monitoring unit.
///
/// `poll_once` runs one complete cycle. Errors it can contain (transient
/// reads, busy actuators) never surface here; an `Err` from `poll_once`
/// is a unit fault and lands in the supervisor's restart path.
pub trait MonitorUnit {
    fn name(&self) -> &'static str;

    fn poll_once(&mut self) -> impl Future<Output = Result<(), Error>>;

    /// Re-arm unit state before a restart (alarm levels back to safe).
    /// Persistent state — visitor count, calibration — is untouched.
    fn reset(&mut self) {}
}

// ───────────────────────────────────────────────────────────────
// Scheduling policy
// ───────────────────────────────────────────────────────────────

/// Per-unit scheduling parameters.
#[derive(Debug, Clone, Copy)]
pub struct UnitPolicy {
    /// Fixed delay between poll cycles (milliseconds).
    pub cadence_ms: u64,
    /// Delay before restarting a faulted unit (milliseconds).
    pub restart_backoff_ms: u64,
    /// Restarts allowed before the unit is marked permanently failed.
    pub max_restarts: u32,
}

// ───────────────────────────────────────────────────────────────
// Supervisor
// ───────────────────────────────────────────────────────────────

/// Owns the shared stop flag and the station-wide restart policy; hands
/// out one supervision future per unit for the executor to drive.
pub struct Supervisor {
    stop: Arc<AtomicBool>,
    restart_backoff_ms: u64,
    max_restarts: u32,
}

impl Supervisor {
    pub fn new(config: &StationConfig) -> Self {
        Self {
            stop: Arc::new(AtomicBool::new(false)),
            restart_backoff_ms: config.restart_backoff_ms,
            max_restarts: config.max_unit_restarts,
        }
    }

    /// Shared stop flag (for signal handlers and tests).
    pub fn stop_flag(&self) -> Arc<AtomicBool> {
        self.stop.clone()
    }

    /// Ask every unit to stop at its next cycle boundary.
    pub fn request_stop(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }

    /// Build the supervision future for one unit. The caller spawns it on
    /// the executor; it completes when the unit stops or permanently fails.
    pub fn unit_task<U, K>(
        &self,
        unit: U,
        cadence_ms: u64,
        sink: K,
    ) -> impl Future<Output = ()>
    where
        U: MonitorUnit,
        K: TelemetrySink,
    {
        supervise(
            unit,
            UnitPolicy {
                cadence_ms,
                restart_backoff_ms: self.restart_backoff_ms,
                max_restarts: self.max_restarts,
            },
            self.stop.clone(),
            sink,
        )
    }
}

/// Drive one unit until it is stopped or permanently failed.
pub async fn supervise<U, K>(mut unit: U, policy: UnitPolicy, stop: Arc<AtomicBool>, mut sink: K)
where
    U: MonitorUnit,
    K: TelemetrySink,
{
    info!(
        "unit '{}' scheduled (cadence {} ms)",
        unit.name(),
        policy.cadence_ms
    );
    let mut restarts = 0u32;

    loop {
        if stop.load(Ordering::Relaxed) {
            info!("unit '{}' stopped", unit.name());
            return;
        }

        match unit.poll_once().await {
            Ok(()) => {
                async_io_mini::Timer::after(Duration::from_millis(policy.cadence_ms)).await;
            }
            Err(fault) => {
                warn!("unit '{}' faulted: {fault}", unit.name());
                if restarts >= policy.max_restarts {
                    error!(
                        "unit '{}' exceeded restart ceiling ({}), permanently failed",
                        unit.name(),
                        policy.max_restarts
                    );
                    sink.publish(TelemetryMsg::unit_fatal(unit.name()));
                    return;
                }
                restarts += 1;
                info!(
                    "unit '{}' restarting ({}/{})",
                    unit.name(),
                    restarts,
                    policy.max_restarts
                );
                unit.reset();
                async_io_mini::Timer::after(Duration::from_millis(policy.restart_backoff_ms))
                    .await;
            }
        }
    }
}

// ═══════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ReadError;
    use crate::telemetry::topic;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Clone, Default)]
    struct TestSink(Rc<RefCell<Vec<TelemetryMsg>>>);
    impl TelemetrySink for TestSink {
        fn publish(&mut self, msg: TelemetryMsg) {
            self.0.borrow_mut().push(msg);
        }
    }

    /// Unit that faults on every poll.
    struct AlwaysFaulting {
        polls: Rc<RefCell<u32>>,
        resets: Rc<RefCell<u32>>,
    }
    impl MonitorUnit for AlwaysFaulting {
        fn name(&self) -> &'static str {
            "always-faulting"
        }
        async fn poll_once(&mut self) -> Result<(), Error> {
            *self.polls.borrow_mut() += 1;
            Err(Error::Sensor(ReadError::Device))
        }
        fn reset(&mut self) {
            *self.resets.borrow_mut() += 1;
        }
    }

    /// Unit that polls fine and raises the stop flag after N cycles.
    struct SelfStopping {
        polls: u32,
        stop_after: u32,
        stop: Arc<AtomicBool>,
    }
    impl MonitorUnit for SelfStopping {
        fn name(&self) -> &'static str {
            "self-stopping"
        }
        async fn poll_once(&mut self) -> Result<(), Error> {
            self.polls += 1;
            if self.polls >= self.stop_after {
                self.stop.store(true, Ordering::Relaxed);
            }
            Ok(())
        }
    }

    fn fast_policy(max_restarts: u32) -> UnitPolicy {
        UnitPolicy {
            cadence_ms: 0,
            restart_backoff_ms: 0,
            max_restarts,
        }
    }

    #[test]
    fn restart_ceiling_then_single_fatal_event() {
        let polls = Rc::new(RefCell::new(0));
        let resets = Rc::new(RefCell::new(0));
        let sink = TestSink::default();
        let unit = AlwaysFaulting {
            polls: polls.clone(),
            resets: resets.clone(),
        };

        futures_lite::future::block_on(supervise(
            unit,
            fast_policy(3),
            Arc::new(AtomicBool::new(false)),
            sink.clone(),
        ));

        // Initial attempt + 3 restarts; the 4th fault produces no restart.
        assert_eq!(*polls.borrow(), 4);
        assert_eq!(*resets.borrow(), 3);
        let events = sink.0.borrow();
        let fatals: Vec<_> = events.iter().filter(|m| m.topic == topic::UNIT_FATAL).collect();
        assert_eq!(fatals.len(), 1, "exactly one fatal-unit event");
    }

    #[test]
    fn stop_flag_halts_unit_between_cycles() {
        let stop = Arc::new(AtomicBool::new(false));
        let sink = TestSink::default();
        let unit = SelfStopping {
            polls: 0,
            stop_after: 5,
            stop: stop.clone(),
        };

        futures_lite::future::block_on(supervise(unit, fast_policy(3), stop, sink.clone()));

        // Clean stop: no fatal event for a healthy unit.
        assert!(sink.0.borrow().is_empty());
    }

    #[test]
    fn pre_set_stop_flag_prevents_any_poll() {
        let polls = Rc::new(RefCell::new(0));
        let resets = Rc::new(RefCell::new(0));
        let unit = AlwaysFaulting {
            polls: polls.clone(),
            resets,
        };

        futures_lite::future::block_on(supervise(
            unit,
            fast_policy(3),
            Arc::new(AtomicBool::new(true)),
            TestSink::default(),
        ));
        assert_eq!(*polls.borrow(), 0);
    }
}
