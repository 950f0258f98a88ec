//! Station configuration parameters.
//!
//! All tunable parameters for the exhibit-room station. Defaults carry the
//! constants used on the deployed installation; a JSON file can override
//! them at startup. Input polarity and timing live here as explicit
//! parameters — one canonical code path per subsystem, configured.

use log::{info, warn};
use serde::{Deserialize, Serialize};

/// Core station configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StationConfig {
    // --- Gate (servo + shared LED) ---
    /// Servo angle for the open position (degrees, 0-180).
    pub gate_open_angle: u8,
    /// Servo angle for the closed position (degrees, 0-180).
    pub gate_closed_angle: u8,
    /// How long the gate holds open before closing (milliseconds).
    pub gate_dwell_ms: u64,
    /// Bounded wait for gate acquisition before reporting Busy (milliseconds).
    pub gate_acquire_timeout_ms: u64,
    /// LED blink count during the gate-open feedback.
    pub gate_led_blinks: u8,
    /// LED blink half-period (milliseconds).
    pub gate_led_blink_ms: u64,

    // --- Buzzer ---
    /// Pulses per alarm train.
    pub buzzer_pulses: u8,
    /// Buzzer on-time per pulse (milliseconds).
    pub buzzer_pulse_on_ms: u64,
    /// Buzzer off-time per pulse (milliseconds).
    pub buzzer_pulse_off_ms: u64,

    // --- Theft detection ---
    /// Expected resting weight of the exhibit (grams).
    pub theft_baseline_g: f32,
    /// Raw readings averaged per live poll (the debounce).
    pub theft_samples_per_read: u32,
    /// Raw readings averaged during calibration.
    pub theft_calibration_samples: u32,
    /// Hold-off after a theft event before the next read (milliseconds).
    pub theft_cooldown_ms: u64,
    /// Operator-supplied known weight for startup calibration (grams).
    pub theft_known_weight_g: f32,

    // --- Perimeter ---
    /// Breach threshold for the summed four-corner distance (centimetres).
    pub perimeter_threshold_cm: f32,
    /// Breach lamp hold time (milliseconds).
    pub perimeter_led_hold_ms: u64,

    // --- Climate ---
    /// Settle delay between the temperature and humidity reads (milliseconds).
    pub climate_settle_ms: u64,
    /// Delay before retrying a transient climate read (milliseconds).
    pub climate_retry_delay_ms: u64,
    /// Transient retries before the device is reinitialized.
    pub climate_max_retries: u32,
    /// Cooldown after a device reinitialization (milliseconds).
    pub climate_reinit_cooldown_ms: u64,

    // --- Artifact info button ---
    /// Hold-off after an artifact-info publish (milliseconds).
    pub info_cooldown_ms: u64,

    // --- Input polarity (one convention, applied consistently) ---
    /// Manual-override button: `true` if a press reads electrically low.
    /// Default wiring is pull-down, press reads high.
    pub gate_button_active_low: bool,
    /// Artifact-info button polarity, same convention.
    pub info_button_active_low: bool,
    /// MQ-2 digital output: `true` if detection reads electrically low
    /// (the stock comparator board pulls low on gas).
    pub gas_active_low: bool,

    // --- Poll cadences (milliseconds between cycles) ---
    pub gate_poll_ms: u64,
    pub theft_poll_ms: u64,
    pub gas_poll_ms: u64,
    pub perimeter_poll_ms: u64,
    pub climate_poll_ms: u64,
    pub info_poll_ms: u64,

    // --- Supervisor ---
    /// Delay before restarting a faulted unit (milliseconds).
    pub restart_backoff_ms: u64,
    /// Restarts allowed per unit before it is marked permanently failed.
    pub max_unit_restarts: u32,
}

impl Default for StationConfig {
    fn default() -> Self {
        Self {
            // Gate
            gate_open_angle: 180,
            gate_closed_angle: 0,
            gate_dwell_ms: 2000,
            gate_acquire_timeout_ms: 250,
            gate_led_blinks: 3,
            gate_led_blink_ms: 100,

            // Buzzer
            buzzer_pulses: 10,
            buzzer_pulse_on_ms: 100,
            buzzer_pulse_off_ms: 100,

            // Theft
            theft_baseline_g: 200.0,
            theft_samples_per_read: 10,
            theft_calibration_samples: 100,
            theft_cooldown_ms: 5000,
            theft_known_weight_g: 500.0,

            // Perimeter
            perimeter_threshold_cm: 80.0,
            perimeter_led_hold_ms: 5000,

            // Climate
            climate_settle_ms: 100,
            climate_retry_delay_ms: 2000,
            climate_max_retries: 3,
            climate_reinit_cooldown_ms: 2000,

            // Artifact info
            info_cooldown_ms: 5000,

            // Polarity
            gate_button_active_low: false,
            info_button_active_low: false,
            gas_active_low: true,

            // Cadences
            gate_poll_ms: 100,
            theft_poll_ms: 500,
            gas_poll_ms: 1000,
            perimeter_poll_ms: 500,
            climate_poll_ms: 2000,
            info_poll_ms: 1000,

            // Supervisor
            restart_backoff_ms: 1000,
            max_unit_restarts: 3,
        }
    }
}

impl StationConfig {
    /// Range-check every field. Invalid configs are rejected with the
    /// offending field named, never silently clamped.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.gate_open_angle > 180 || self.gate_closed_angle > 180 {
            return Err("gate angles must be within 0-180 degrees");
        }
        if self.gate_open_angle == self.gate_closed_angle {
            return Err("gate open and closed angles must differ");
        }
        if self.gate_dwell_ms == 0 {
            return Err("gate_dwell_ms must be positive");
        }
        if self.buzzer_pulses == 0 {
            return Err("buzzer_pulses must be positive");
        }
        if self.theft_baseline_g <= 0.0 {
            return Err("theft_baseline_g must be positive");
        }
        if self.theft_samples_per_read == 0 || self.theft_calibration_samples == 0 {
            return Err("theft sample counts must be positive");
        }
        if self.theft_known_weight_g <= 0.0 {
            return Err("theft_known_weight_g must be positive");
        }
        if self.perimeter_threshold_cm <= 0.0 {
            return Err("perimeter_threshold_cm must be positive");
        }
        let cadences = [
            self.gate_poll_ms,
            self.theft_poll_ms,
            self.gas_poll_ms,
            self.perimeter_poll_ms,
            self.climate_poll_ms,
            self.info_poll_ms,
        ];
        if cadences.contains(&0) {
            return Err("poll cadences must be positive");
        }
        Ok(())
    }

    /// Load from a JSON file, falling back to defaults if the file is
    /// missing or unreadable. A malformed file is a warning, not a crash —
    /// the station must come up on power-on regardless.
    pub fn load_or_default(path: &str) -> Self {
        match std::fs::read_to_string(path) {
            Ok(raw) => match serde_json::from_str(&raw) {
                Ok(cfg) => {
                    info!("config loaded from {path}");
                    cfg
                }
                Err(e) => {
                    warn!("config parse failed ({e}), using defaults");
                    Self::default()
                }
            },
            Err(e) => {
                info!("no config at {path} ({e}), using defaults");
                Self::default()
            }
        }
    }
}
