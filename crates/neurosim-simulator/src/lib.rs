// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # neurosim-simulator
//!
//! Builds a network from a [`SimulationConfig`], runs it to completion or
//! cancellation, and writes state files into the configured output directory.

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod state_writer;

pub use state_writer::{TsvStateWriter, NEURON_FILE_NAME, STATE_FILE_NAME, STATE_HEADER};

use anyhow::{Context, Result};
use neurosim_config::SimulationConfig;
use neurosim_npu_step_engine::{CancellationToken, Network, RunSummary, SimulationRunner};
use tracing::info;

/// Run a full simulation described by `config`
///
/// Steps `config.network.total_steps()` times unless `cancel` fires first;
/// the final state is written either way.
pub fn run_simulation(
    config: &SimulationConfig,
    cancel: &CancellationToken,
) -> Result<RunSummary> {
    let mut network = Network::new(config.network.clone(), config.simulation_params())
        .context("Failed to build network")?;

    let stats = network.stats();
    info!(
        "[SIMULATOR] {} pyramidal + {} inhibitory neurons, {} of {} synapse slots bound",
        stats.num_pyramidal, stats.num_inhibitory, stats.bound_synapses, stats.synapse_slots
    );

    let output_dir = &config.network.output_dir;
    let mut writer = TsvStateWriter::create(output_dir, config.output.neuron_snapshots)
        .with_context(|| format!("Failed to open output files in {}", output_dir.display()))?;

    let runner = SimulationRunner::new(config.output.save_interval);
    let summary = runner
        .run(&mut network, config.network.total_steps(), cancel, &mut writer)
        .context("Simulation run failed")?;

    info!(
        "[SIMULATOR] {} rows written to {}",
        writer.rows(),
        output_dir.join(STATE_FILE_NAME).display()
    );
    Ok(summary)
}
