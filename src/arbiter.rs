//! Actuator arbiter — serialized access to the shared gate and buzzer.
//!
//! Several monitors contend for two pieces of hardware: the gate assembly
//! (servo plus the shared status LED) and the alarm buzzer. The arbiter is
//! their sole owner; every mutation goes through a lease or pulse operation
//! backed by an async mutex per actuator.
//!
//! ```text
//!  visitor gate ──┐
//!  theft (via gate)│──▶ gate mutex ──▶ servo + LED
//!  perimeter ─────┘
//!
//!  gas monitor ──────▶ buzzer mutex ──▶ buzzer
//! ```
//!
//! The two domains are independent: a gas alarm's buzzer train is never
//! blocked by a visitor holding the gate. Gate acquisition waits a bounded
//! interval and then fails with [`ArbiterError::Busy`] — a stuck gate must
//! not wedge the perimeter lamp. Buzzer pulse trains are non-reentrant;
//! a request arriving while a train runs is coalesced into it.

use core::cell::Cell;
use core::time::Duration;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::mutex::{Mutex, MutexGuard};
use log::debug;

use crate::config::StationConfig;
use crate::error::ArbiterError;
use crate::ports::{BuzzerPort, GateServoPort, LedPort};

// ───────────────────────────────────────────────────────────────
// Gate state
// ───────────────────────────────────────────────────────────────

/// Observable phase of the gate assembly. Owned exclusively by the arbiter;
/// monitors may read it but only lease operations move it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    Idle,
    Opening,
    HoldOpen,
    Closing,
}

// ───────────────────────────────────────────────────────────────
// Timing parameters
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
struct GateTimings {
    open_angle: u8,
    closed_angle: u8,
    dwell_ms: u64,
    acquire_timeout_ms: u64,
    led_blinks: u8,
    led_blink_ms: u64,
}

#[derive(Debug, Clone)]
struct BuzzerTimings {
    pulses: u8,
    pulse_on_ms: u64,
    pulse_off_ms: u64,
}

// ───────────────────────────────────────────────────────────────
// Arbiter
// ───────────────────────────────────────────────────────────────

struct GateHw {
    servo: Box<dyn GateServoPort>,
    led: Box<dyn LedPort>,
}

/// Owner of the shared actuators. Shared between monitor tasks via `Rc`.
pub struct ActuatorArbiter {
    gate: Mutex<CriticalSectionRawMutex, GateHw>,
    buzzer: Mutex<CriticalSectionRawMutex, Box<dyn BuzzerPort>>,
    state: Cell<GateState>,
    gate_timings: GateTimings,
    buzzer_timings: BuzzerTimings,
}

impl ActuatorArbiter {
    pub fn new(
        servo: Box<dyn GateServoPort>,
        led: Box<dyn LedPort>,
        buzzer: Box<dyn BuzzerPort>,
        config: &StationConfig,
    ) -> Self {
        Self {
            gate: Mutex::new(GateHw { servo, led }),
            buzzer: Mutex::new(buzzer),
            state: Cell::new(GateState::Idle),
            gate_timings: GateTimings {
                open_angle: config.gate_open_angle,
                closed_angle: config.gate_closed_angle,
                dwell_ms: config.gate_dwell_ms,
                acquire_timeout_ms: config.gate_acquire_timeout_ms,
                led_blinks: config.gate_led_blinks,
                led_blink_ms: config.gate_led_blink_ms,
            },
            buzzer_timings: BuzzerTimings {
                pulses: config.buzzer_pulses,
                pulse_on_ms: config.buzzer_pulse_on_ms,
                pulse_off_ms: config.buzzer_pulse_off_ms,
            },
        }
    }

    /// Current gate phase (read-only observation).
    pub fn gate_state(&self) -> GateState {
        self.state.get()
    }

    /// Acquire the gate lease. Fast path is an uncontended `try_lock`;
    /// under contention the wait is bounded by the configured timeout,
    /// after which the request fails with [`ArbiterError::Busy`] and the
    /// caller retries on its next poll cycle.
    pub async fn acquire_gate(
        &self,
        owner: &'static str,
    ) -> Result<GateLease<'_>, ArbiterError> {
        if let Ok(hw) = self.gate.try_lock() {
            return Ok(GateLease {
                hw,
                arbiter: self,
                owner,
            });
        }

        let wait = async { Ok(self.gate.lock().await) };
        let deadline = async {
            async_io_mini::Timer::after(Duration::from_millis(
                self.gate_timings.acquire_timeout_ms,
            ))
            .await;
            Err(ArbiterError::Busy)
        };
        match futures_lite::future::or(wait, deadline).await {
            Ok(hw) => Ok(GateLease {
                hw,
                arbiter: self,
                owner,
            }),
            Err(e) => {
                debug!("gate busy, '{owner}' request dropped this cycle");
                Err(e)
            }
        }
    }

    /// Run one buzzer pulse train, blocking the caller for its duration.
    /// If a train is already running the call coalesces into it and
    /// returns immediately — pulse trains never overlap.
    pub async fn pulse_buzzer(&self) {
        let Ok(mut buzzer) = self.buzzer.try_lock() else {
            debug!("buzzer pulse train already running, coalescing");
            return;
        };
        let t = &self.buzzer_timings;
        for _ in 0..t.pulses {
            buzzer.set(true);
            async_io_mini::Timer::after(Duration::from_millis(t.pulse_on_ms)).await;
            buzzer.set(false);
            async_io_mini::Timer::after(Duration::from_millis(t.pulse_off_ms)).await;
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Gate lease
// ───────────────────────────────────────────────────────────────

/// Exclusive right to drive the gate assembly. Released on drop; at most
/// one lease is outstanding at any time.
pub struct GateLease<'a> {
    hw: MutexGuard<'a, CriticalSectionRawMutex, GateHw>,
    arbiter: &'a ActuatorArbiter,
    owner: &'static str,
}

impl GateLease<'_> {
    /// Full admission sequence: servo to open, LED blink feedback, hold
    /// for the dwell, servo back to closed. Blocks only the calling unit.
    pub async fn open_dwell_close(&mut self) {
        let t = &self.arbiter.gate_timings;
        debug!("gate sequence start ('{}')", self.owner);

        self.arbiter.state.set(GateState::Opening);
        self.hw.servo.set_angle(t.open_angle);
        for _ in 0..t.led_blinks {
            self.hw.led.set(true);
            async_io_mini::Timer::after(Duration::from_millis(t.led_blink_ms)).await;
            self.hw.led.set(false);
            async_io_mini::Timer::after(Duration::from_millis(t.led_blink_ms)).await;
        }

        self.arbiter.state.set(GateState::HoldOpen);
        async_io_mini::Timer::after(Duration::from_millis(t.dwell_ms)).await;

        self.arbiter.state.set(GateState::Closing);
        self.hw.servo.set_angle(t.closed_angle);
        self.arbiter.state.set(GateState::Idle);
    }

    /// Direct LED control for breach indication. The caller owns the hold
    /// timing; the lamp state follows the lease holder's commands only.
    pub fn led_set(&mut self, on: bool) {
        self.hw.led.set(on);
    }
}

impl Drop for GateLease<'_> {
    fn drop(&mut self) {
        // A lease abandoned mid-sequence must not leave a stale phase.
        self.arbiter.state.set(GateState::Idle);
        debug!("gate lease released ('{}')", self.owner);
    }
}

// ═══════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════
