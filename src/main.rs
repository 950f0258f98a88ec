//! Vitrine station — main entry point.
//!
//! Bootstrap order: logger → config → actuator arbiter → monitors →
//! one-time scale calibration → supervisor tasks → telemetry drain.
//! Everything after bootstrap runs as cooperative tasks on a single
//! `edge-executor`; the only threads are the reactor's own.
//!
//! On a development host the port adapters are the in-memory simulation
//! layer; swapping in real drivers means constructing different adapters
//! here and touching nothing below the port boundary.

use std::rc::Rc;

use anyhow::{Context, Result};
use log::info;

use vitrine::adapters::log_sink::LogPublisher;
use vitrine::adapters::sim::{
    self, SimBuzzer, SimButton, SimClimateProbe, SimGasInput, SimGateServo, SimLoadCell,
    SimNfcReader, SimRangeFinder, SimStatusLed,
};
use vitrine::arbiter::ActuatorArbiter;
use vitrine::config::StationConfig;
use vitrine::monitors::{
    ArtifactInfoMonitor, ClimateMonitor, GasMonitor, PerimeterMonitor, TheftDetector,
    VisitorGate, VisitorGateUnit,
};
use vitrine::supervisor::Supervisor;
use vitrine::telemetry::{self, ChannelSink};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    info!("vitrine v{} starting", env!("CARGO_PKG_VERSION"));

    // ── 1. Configuration ──────────────────────────────────────
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "station.json".to_string());
    let config = StationConfig::load_or_default(&config_path);
    config
        .validate()
        .map_err(|field| anyhow::anyhow!("invalid config: {field}"))?;

    // ── 2. Seed the simulated room ────────────────────────────
    // Exhibit on the pedestal, mild climate, clear perimeter.
    sim::sim_set_weight_raw(84_000.0);
    sim::sim_set_climate(21.5, 40.0);
    for corner in 0..4 {
        sim::sim_set_distance_m(corner, 1.0);
    }

    // ── 3. Shared actuators ───────────────────────────────────
    let arbiter = Rc::new(ActuatorArbiter::new(
        Box::new(SimGateServo::new()),
        Box::new(SimStatusLed::new()),
        Box::new(SimBuzzer::new()),
        &config,
    ));

    // ── 4. Monitors ───────────────────────────────────────────
    let sink = ChannelSink;

    let gate = VisitorGate::new(
        SimNfcReader,
        SimButton::gate(config.gate_button_active_low),
        arbiter.clone(),
        sink,
    )
    .into_shared();

    let mut theft = TheftDetector::new(SimLoadCell, gate.clone(), sink, &config);
    theft
        .calibrate(config.theft_known_weight_g)
        .context("load-cell calibration failed")?;

    let gas = GasMonitor::new(
        SimGasInput {
            active_low: config.gas_active_low,
        },
        arbiter.clone(),
        sink,
    );

    let perimeter = PerimeterMonitor::new(
        [
            SimRangeFinder { index: 0 },
            SimRangeFinder { index: 1 },
            SimRangeFinder { index: 2 },
            SimRangeFinder { index: 3 },
        ],
        arbiter.clone(),
        sink,
        &config,
    );

    let climate = ClimateMonitor::new(SimClimateProbe::new(), sink, &config);

    let info_button = ArtifactInfoMonitor::new(
        SimButton::artifact_info(config.info_button_active_low),
        sink,
        &config,
    );

    // ── 5. Schedule everything ────────────────────────────────
    let supervisor = Supervisor::new(&config);
    let executor: edge_executor::LocalExecutor<'_, 16> = edge_executor::LocalExecutor::new();

    executor
        .spawn(supervisor.unit_task(VisitorGateUnit(gate.clone()), config.gate_poll_ms, sink))
        .detach();
    executor
        .spawn(supervisor.unit_task(theft, config.theft_poll_ms, sink))
        .detach();
    executor
        .spawn(supervisor.unit_task(gas, config.gas_poll_ms, sink))
        .detach();
    executor
        .spawn(supervisor.unit_task(perimeter, config.perimeter_poll_ms, sink))
        .detach();
    executor
        .spawn(supervisor.unit_task(climate, config.climate_poll_ms, sink))
        .detach();
    executor
        .spawn(supervisor.unit_task(info_button, config.info_poll_ms, sink))
        .detach();

    // Publisher boundary: drain the unit channel into the broker stand-in.
    executor
        .spawn(async {
            let mut publisher = LogPublisher::new();
            telemetry::forward_to(&mut publisher).await;
        })
        .detach();

    info!("station ready, 6 units scheduled");
    futures_lite::future::block_on(executor.run(core::future::pending::<()>()));
    Ok(())
}
