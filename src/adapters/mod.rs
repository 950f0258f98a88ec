//! Adapters — implementations of the port traits on the outer ring.
//!
//! The register-level drivers (PN532 framing, HX711 sampling, DHT bit
//! decoding, echo-time distance math) live outside this crate; what ships
//! here is the simulation layer that lets the station run and be tested on
//! a development host, plus the structured-log publisher standing in for
//! the broker client.

pub mod log_sink;
pub mod sim;
