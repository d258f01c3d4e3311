// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

use anyhow::{Context, Result};
use clap::Parser;
use neurosim_config::load_config_or_default;
use neurosim_npu_step_engine::CancellationToken;
use neurosim_observability::{
    debug_flags_help, init_logging, CrateDebugFlags, LoggingOptions, DEBUG_ENV,
};
use neurosim_simulator::run_simulation;
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::{info, warn};

/// Spiking cortical network simulator
#[derive(Parser, Debug)]
#[command(name = "neurosim-simulator", version, author, after_help = debug_flags_help())]
struct Args {
    /// Configuration file (default: search for neurosim.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output directory for state files
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Simulated duration in ms
    #[arg(long)]
    duration: Option<f64>,

    /// Random seed
    #[arg(long)]
    seed: Option<u64>,

    /// Enable verbose logging
    #[arg(short, long, default_value_t = false)]
    verbose: bool,
}

impl Args {
    fn overrides(&self) -> HashMap<String, String> {
        let mut cli_args = HashMap::new();
        if let Some(dir) = &self.output_dir {
            cli_args.insert("output_dir".to_string(), dir.display().to_string());
        }
        if let Some(duration) = self.duration {
            cli_args.insert("simulation_time".to_string(), duration.to_string());
        }
        if let Some(seed) = self.seed {
            cli_args.insert("seed".to_string(), seed.to_string());
        }
        if self.verbose {
            cli_args.insert("log_level".to_string(), "debug".to_string());
        }
        cli_args
    }
}

fn main() -> Result<()> {
    // --debug-<crate> flags are open-ended, so they are split off before clap sees them
    let (debug_args, args): (Vec<String>, Vec<String>) =
        std::env::args().partition(|arg| arg.starts_with("--debug-"));
    let mut debug_flags = CrateDebugFlags::from_args(debug_args);
    if let Ok(value) = std::env::var(DEBUG_ENV) {
        debug_flags.merge_env_value(&value);
    }
    let args = Args::parse_from(args);

    let config = load_config_or_default(args.config.as_deref(), Some(&args.overrides()))
        .context("Failed to load configuration")?;

    let _logging = init_logging(
        &debug_flags,
        &LoggingOptions {
            level: config.logging.level.clone(),
            log_dir: config.logging.directory.clone(),
            retention_runs: config.logging.retention,
        },
    )?;

    let cancel = CancellationToken::new();
    let handler_token = cancel.clone();
    ctrlc::set_handler(move || handler_token.cancel())
        .context("Failed to install Ctrl-C handler")?;

    info!(
        "neurosim v{}: {} ms at dt={} ms, seed {}",
        neurosim_simulator::VERSION,
        config.network.simulation_time,
        config.network.dt,
        config.network.seed
    );

    let summary = run_simulation(&config, &cancel)?;
    if summary.interrupted {
        warn!(
            "Stopped early at step {}/{}",
            summary.completed_steps, summary.requested_steps
        );
    }
    info!(
        "Simulation complete: {} steps, {} spikes, {:.2}s wall time",
        summary.completed_steps,
        summary.total_spikes,
        summary.wall_time.as_secs_f64()
    );
    Ok(())
}
