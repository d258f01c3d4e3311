// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration file loading with override support
//!
//! Three tiers, later ones win:
//! 1. TOML file (or built-in defaults)
//! 2. Environment variables (`NEUROSIM_*`)
//! 3. CLI arguments (explicit user overrides)

use crate::{validate_config, ConfigError, ConfigResult, SimulationConfig};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// File name searched for when no path is given
pub const CONFIG_FILE_NAME: &str = "neurosim.toml";

/// Environment variable naming an explicit configuration file
pub const CONFIG_PATH_ENV: &str = "NEUROSIM_CONFIG_PATH";

/// Find the neurosim configuration file
///
/// Search order:
/// 1. `NEUROSIM_CONFIG_PATH` environment variable
/// 2. Current working directory: `./neurosim.toml`
/// 3. Up to 5 parent directories
///
/// # Errors
///
/// Returns `ConfigError::FileNotFound` if no config file is found in any location
pub fn find_config_file() -> ConfigResult<PathBuf> {
    if let Ok(env_path) = env::var(CONFIG_PATH_ENV) {
        let path = PathBuf::from(env_path);
        if path.exists() {
            return Ok(path);
        }
        return Err(ConfigError::FileNotFound(format!(
            "Config file specified by {} not found: {}",
            CONFIG_PATH_ENV,
            path.display()
        )));
    }

    let mut search_paths = Vec::new();
    if let Ok(cwd) = env::current_dir() {
        search_paths.push(cwd.join(CONFIG_FILE_NAME));
        let mut current = cwd.as_path();
        for _ in 0..5 {
            match current.parent() {
                Some(parent) => {
                    search_paths.push(parent.join(CONFIG_FILE_NAME));
                    current = parent;
                }
                None => break,
            }
        }
    }

    if let Some(path) = search_paths.iter().find(|p| p.exists()) {
        return Ok(path.clone());
    }

    let search_list = search_paths
        .iter()
        .map(|p| format!("  - {}", p.display()))
        .collect::<Vec<_>>()
        .join("\n");

    Err(ConfigError::FileNotFound(format!(
        "'{}' not found in any of these locations:\n{}\n\nSet {} to specify a custom location.",
        CONFIG_FILE_NAME, search_list, CONFIG_PATH_ENV
    )))
}

/// Load, override and validate configuration
///
/// # Arguments
///
/// * `config_path` - Optional path to config file. If `None`, the file is searched for.
/// * `cli_args` - Optional CLI argument overrides
///
/// # Errors
///
/// Returns an error if the file is missing or unreadable, is invalid TOML, an
/// override cannot be parsed, or the result fails validation
pub fn load_config(
    config_path: Option<&Path>,
    cli_args: Option<&HashMap<String, String>>,
) -> ConfigResult<SimulationConfig> {
    let config_file = match config_path {
        Some(path) => path.to_path_buf(),
        None => find_config_file()?,
    };

    let content = fs::read_to_string(&config_file)?;
    let config: SimulationConfig = toml::from_str(&content)?;
    finish(config, cli_args)
}

/// Like [`load_config`], but fall back to built-in defaults when no file is found
///
/// An explicit `config_path` must exist.
pub fn load_config_or_default(
    config_path: Option<&Path>,
    cli_args: Option<&HashMap<String, String>>,
) -> ConfigResult<SimulationConfig> {
    if config_path.is_some() {
        return load_config(config_path, cli_args);
    }
    match find_config_file() {
        Ok(path) => load_config(Some(&path), cli_args),
        Err(ConfigError::FileNotFound(_)) if env::var(CONFIG_PATH_ENV).is_err() => {
            finish(SimulationConfig::default(), cli_args)
        }
        Err(e) => Err(e),
    }
}

fn finish(
    mut config: SimulationConfig,
    cli_args: Option<&HashMap<String, String>>,
) -> ConfigResult<SimulationConfig> {
    apply_environment_overrides(&mut config)?;
    if let Some(cli) = cli_args {
        apply_cli_overrides(&mut config, cli)?;
    }
    validate_config(&config)?;
    Ok(config)
}

/// Apply environment variable overrides to configuration
///
/// Supported environment variables:
/// - `NEUROSIM_NUM_PYRAMIDAL` -> `network.num_pyramidal`
/// - `NEUROSIM_NUM_INHIBITORY` -> `network.num_inhibitory`
/// - `NEUROSIM_DT` -> `network.dt`
/// - `NEUROSIM_SIMULATION_TIME` -> `network.simulation_time`
/// - `NEUROSIM_CONNECTION_RATE` -> `network.connection_rate`
/// - `NEUROSIM_OUTPUT_DIR` -> `network.output_dir`
/// - `NEUROSIM_SEED` -> `network.seed`
/// - `NEUROSIM_LOG_LEVEL` -> `logging.level`
pub fn apply_environment_overrides(config: &mut SimulationConfig) -> ConfigResult<()> {
    let lookup = |key: &str| env::var(format!("NEUROSIM_{}", key.to_uppercase())).ok();
    apply_overrides(config, lookup, "environment variable NEUROSIM_")
}

/// Apply CLI argument overrides to configuration
///
/// Keys match the environment variables without prefix, in lower case
/// (`num_pyramidal`, `dt`, `output_dir`, `seed`, `log_level`, ...).
pub fn apply_cli_overrides(
    config: &mut SimulationConfig,
    cli_args: &HashMap<String, String>,
) -> ConfigResult<()> {
    let lookup = |key: &str| cli_args.get(key).cloned();
    apply_overrides(config, lookup, "CLI argument ")
}

fn apply_overrides(
    config: &mut SimulationConfig,
    lookup: impl Fn(&str) -> Option<String>,
    source: &str,
) -> ConfigResult<()> {
    let network = &mut config.network;
    if let Some(value) = lookup("num_pyramidal") {
        network.num_pyramidal = parse(source, "num_pyramidal", &value)?;
    }
    if let Some(value) = lookup("num_inhibitory") {
        network.num_inhibitory = parse(source, "num_inhibitory", &value)?;
    }
    if let Some(value) = lookup("dt") {
        network.dt = parse(source, "dt", &value)?;
    }
    if let Some(value) = lookup("simulation_time") {
        network.simulation_time = parse(source, "simulation_time", &value)?;
    }
    if let Some(value) = lookup("connection_rate") {
        network.connection_rate = parse(source, "connection_rate", &value)?;
    }
    if let Some(value) = lookup("output_dir") {
        network.output_dir = PathBuf::from(value);
    }
    if let Some(value) = lookup("seed") {
        network.seed = parse(source, "seed", &value)?;
    }
    if let Some(value) = lookup("log_level") {
        config.logging.level = value;
    }
    Ok(())
}

fn parse<T: FromStr>(source: &str, key: &str, value: &str) -> ConfigResult<T> {
    value.trim().parse::<T>().map_err(|_| {
        let name = if source.starts_with("environment") {
            key.to_uppercase()
        } else {
            key.to_string()
        };
        ConfigError::InvalidValue(format!("{}{} = '{}' cannot be parsed", source, name, value))
    })
}
