// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration type definitions
//!
//! Every section deserializes with defaults, so a partial file (or an empty
//! one) is a valid configuration.

use neurosim_npu_neural::NeuronParams;
use neurosim_npu_plasticity::{HomeostasisParams, NeuromodulationParams, PlasticityParams};
use neurosim_npu_step_engine::{DriveParams, MechanismSchedule, NetworkConfig, SimulationParams};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub network: NetworkConfig,
    pub neurons: NeuronsConfig,
    pub drive: DriveParams,
    pub plasticity: PlasticityParams,
    pub homeostasis: HomeostasisParams,
    pub neuromodulation: NeuromodulationParams,
    pub schedule: MechanismSchedule,
    pub output: OutputConfig,
    pub logging: LoggingConfig,
}

impl SimulationConfig {
    /// Resolve the mechanism and neuron sections into engine parameters
    pub fn simulation_params(&self) -> SimulationParams {
        SimulationParams {
            pyramidal: self.neurons.pyramidal_params(),
            inhibitory: self.neurons.inhibitory_params(),
            drive: self.drive,
            plasticity: self.plasticity,
            homeostasis: self.homeostasis,
            neuromodulation: self.neuromodulation,
            schedule: self.schedule,
        }
    }
}

/// `[neurons.pyramidal]` and `[neurons.inhibitory]`
///
/// Each population starts from its own defaults; only keys present in the
/// file replace them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NeuronsConfig {
    pub pyramidal: NeuronOverrides,
    pub inhibitory: NeuronOverrides,
}

impl NeuronsConfig {
    pub fn pyramidal_params(&self) -> NeuronParams {
        self.pyramidal.apply(NeuronParams::pyramidal())
    }

    pub fn inhibitory_params(&self) -> NeuronParams {
        self.inhibitory.apply(NeuronParams::inhibitory())
    }
}

/// Optional replacements for individual neuron parameters
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NeuronOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub v_resting: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub v_threshold: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub v_reset: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub g_leak: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub c_m: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tau_m: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refractory_period: Option<f64>,
}

impl NeuronOverrides {
    pub fn apply(&self, base: NeuronParams) -> NeuronParams {
        NeuronParams {
            v_resting: self.v_resting.unwrap_or(base.v_resting),
            v_threshold: self.v_threshold.unwrap_or(base.v_threshold),
            v_reset: self.v_reset.unwrap_or(base.v_reset),
            g_leak: self.g_leak.unwrap_or(base.g_leak),
            c_m: self.c_m.unwrap_or(base.c_m),
            tau_m: self.tau_m.unwrap_or(base.tau_m),
            refractory_period: self.refractory_period.unwrap_or(base.refractory_period),
        }
    }
}

/// `[output]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Steps between published snapshots
    pub save_interval: u64,
    /// Also write per-neuron snapshots
    pub neuron_snapshots: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            save_interval: 10,
            neuron_snapshots: false,
        }
    }
}

/// `[logging]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default level for every crate (`error`, `warn`, `info`, `debug`, `trace`)
    pub level: String,
    /// Folder for per-run log files; console only when unset
    pub directory: Option<PathBuf>,
    /// Number of run folders kept in `directory`
    pub retention: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            directory: None,
            retention: 10,
        }
    }
}
