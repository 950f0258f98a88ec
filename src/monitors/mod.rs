//! Monitoring units — one canonical component per sensor subsystem.
//!
//! Each unit owns its sensor ports and telemetry sink, consumes shared
//! actuators only through the [`ActuatorArbiter`](crate::arbiter), and is
//! scheduled by the supervisor on its own cadence. Units never talk to each
//! other except for the theft detector's delegation to the visitor gate.

pub mod climate;
pub mod gas;
pub mod info_button;
pub mod perimeter;
pub mod theft;
pub mod visitor_gate;

pub use climate::ClimateMonitor;
pub use gas::GasMonitor;
pub use info_button::ArtifactInfoMonitor;
pub use perimeter::PerimeterMonitor;
pub use theft::TheftDetector;
pub use visitor_gate::{SharedVisitorGate, VisitorGate, VisitorGateUnit};

/// Confirmed alarm state of a monitor. Moves only on a confirmed
/// (debounced) sample, never on a failed read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlarmLevel {
    Safe,
    Alarm,
}
