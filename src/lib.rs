//! Vitrine — exhibit-room monitoring station.
//!
//! Fuses five sensor subsystems (NFC admissions, load-cell theft watch,
//! gas detection, ultrasonic perimeter, ambient climate) into one telemetry
//! event stream while arbitrating the shared actuators (gate servo, status
//! LED, buzzer) that the subsystems contend for.
//!
//! ```text
//!  SensorPort ──▶ ┌─────────────────────────────┐ ──▶ TelemetrySink
//!                 │  monitors (one per system)  │
//!  actuators  ◀── │  ActuatorArbiter · counts   │
//!                 └─────────────────────────────┘
//!                        scheduled by Supervisor
//! ```
//!
//! All hardware and broker I/O flows through the port traits in
//! [`ports`], making the entire core testable with mock adapters.

#![deny(unused_must_use)]

pub mod adapters;
pub mod arbiter;
pub mod config;
pub mod error;
pub mod monitors;
pub mod ports;
pub mod supervisor;
pub mod telemetry;
