// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Routersim
//!
//! CNC router toolpath simulator. A toolpath of jog and cutting moves is
//! played back tick by tick; every finished cutting segment is turned into
//! a swept tool volume and subtracted from the stock with exact BSP-tree
//! CSG, so the stock mesh always reflects the material removed so far.

pub mod config;
pub mod error;
pub mod geometry;
pub mod io;
pub mod machine;
pub mod motion;
pub mod simulator;
pub mod stock;
pub mod toolpath;

pub use config::{SimulatorConfig, TickTiming};
pub use error::{SimError, ToolpathError};
pub use geometry::{Mesh, Solid};
pub use io::{export_gltf, export_stl, import_toolpath_file, parse_toolpath};
pub use motion::{Command, SchedulerState};
pub use simulator::{RunSummary, Simulator, TickReport};
pub use stock::StockModel;
pub use toolpath::{MotionType, Path, Waypoint};

/// Install the global `tracing` subscriber
///
/// `RUST_LOG` takes precedence over `default_level`. Calling this more than
/// once returns an error from the second call.
pub fn init_logging(default_level: tracing::Level) -> anyhow::Result<()> {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level.as_str().to_lowercase()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to initialize logging: {e}"))
}

/// Run a toolpath headlessly against a fresh stock
pub fn simulate(
    source: &str,
    config: SimulatorConfig,
    max_ticks: u64,
) -> Result<(Simulator, RunSummary), SimError> {
    let mut simulator = Simulator::new(config)?;
    simulator.load_toolpath(source)?;
    let summary = simulator.run_to_completion(max_ticks);
    Ok((simulator, summary))
}
