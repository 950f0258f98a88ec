//! Unified error types for the station.
//!
//! A single `Error` enum that every subsystem can convert into, keeping
//! unit-level error handling uniform. All variants are `Copy` so they can be
//! cheaply passed between poll cycles and the supervisor without allocation.
//!
//! [`ReadError`] separates transient from persistent failures so that
//! retry-next-cycle vs reinitialize-the-handle is an explicit policy
//! decision in each monitor.

use core::fmt;

// ---------------------------------------------------------------------------
// Sensor read errors
// ---------------------------------------------------------------------------

/// Failure modes of a single [`SensorPort::poll`](crate::ports::SensorPort::poll).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadError {
    /// The sensor was temporarily unreadable. Retried this cycle or the
    /// next; never escalated on its own.
    Transient,
    /// The device is wedged and must be released and reinitialized before
    /// further reads can succeed.
    Device,
}

impl fmt::Display for ReadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transient => write!(f, "transient read failure"),
            Self::Device => write!(f, "persistent device failure"),
        }
    }
}

// ---------------------------------------------------------------------------
// Actuator arbitration errors
// ---------------------------------------------------------------------------

/// Failure modes of an actuator acquisition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArbiterError {
    /// Another unit holds the lease and the bounded wait expired. The
    /// caller skips this cycle's actuation and retries next poll.
    Busy,
}

impl fmt::Display for ArbiterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Busy => write!(f, "actuator busy"),
        }
    }
}

// ---------------------------------------------------------------------------
// Top-level station error
// ---------------------------------------------------------------------------

/// Every fallible operation in the station funnels into this type.
///
/// Sensor and actuator errors are normally contained inside the owning
/// monitor; an `Error` that escapes a monitor's `poll_once` is a unit fault
/// and lands in the supervisor's restart path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A sensor could not be read.
    Sensor(ReadError),
    /// A shared actuator could not be acquired.
    Actuator(ArbiterError),
    /// `poll_once` was called on the theft detector before `calibrate`.
    /// Fatal to that call, not to the process.
    NotCalibrated,
    /// A port yielded a sample variant the unit does not understand.
    /// This is a wiring bug, not an operational condition.
    UnexpectedSample {
        unit: &'static str,
        got: &'static str,
    },
    /// Configuration is invalid or could not be loaded.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sensor(e) => write!(f, "sensor: {e}"),
            Self::Actuator(e) => write!(f, "actuator: {e}"),
            Self::NotCalibrated => write!(f, "scale not calibrated"),
            Self::UnexpectedSample { unit, got } => {
                write!(f, "{unit}: unexpected {got} sample")
            }
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<ReadError> for Error {
    fn from(e: ReadError) -> Self {
        Self::Sensor(e)
    }
}

impl From<ArbiterError> for Error {
    fn from(e: ArbiterError) -> Self {
        Self::Actuator(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Station-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
