// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Validated inputs consumed by [`crate::Network`]
//!
//! These are plain numeric structs. Text parsing and file discovery live in
//! `neurosim-config`; `Network::new` re-validates everything here and reports
//! problems as configuration errors rather than clamping.

use neurosim_npu_neural::{NeuronParams, Population, Result, SimError};
use neurosim_npu_plasticity::{HomeostasisParams, NeuromodulationParams, PlasticityParams};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Fixed neuron capacity of a network (pyramidal + inhibitory)
pub const MAX_NEURONS: usize = 505;

/// Network shape and integration settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    pub num_pyramidal: usize,
    pub num_inhibitory: usize,
    /// Integration step (ms)
    pub dt: f64,
    /// Total simulated time (ms)
    pub simulation_time: f64,
    /// Probability that a directed edge between two distinct neurons exists
    pub connection_rate: f64,
    pub output_dir: PathBuf,
    pub dendrites_per_neuron: usize,
    pub synapses_per_dendrite: usize,
    pub seed: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            num_pyramidal: 400,
            num_inhibitory: 100,
            dt: 0.1,
            simulation_time: 1000.0,
            connection_rate: 0.1,
            output_dir: PathBuf::from("output"),
            dendrites_per_neuron: 5,
            synapses_per_dendrite: 20,
            seed: 42,
        }
    }
}

impl NetworkConfig {
    pub fn total_neurons(&self) -> usize {
        self.num_pyramidal + self.num_inhibitory
    }

    /// Number of steps covering `simulation_time`
    pub fn total_steps(&self) -> u64 {
        if self.dt > 0.0 && self.simulation_time > 0.0 {
            (self.simulation_time / self.dt).round() as u64
        } else {
            0
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.num_pyramidal == 0 {
            return Err(SimError::EmptyPopulation {
                population: Population::Pyramidal,
            });
        }
        if self.num_inhibitory == 0 {
            return Err(SimError::EmptyPopulation {
                population: Population::Inhibitory,
            });
        }
        let total = self.total_neurons();
        if total > MAX_NEURONS {
            return Err(SimError::CapacityExceeded {
                requested: total,
                capacity: MAX_NEURONS,
            });
        }
        if !(self.dt > 0.0) || !self.dt.is_finite() {
            return Err(SimError::InvalidConfiguration(format!(
                "dt must be > 0, got {}",
                self.dt
            )));
        }
        if !(self.simulation_time >= 0.0) || !self.simulation_time.is_finite() {
            return Err(SimError::InvalidConfiguration(format!(
                "simulation_time must be >= 0, got {}",
                self.simulation_time
            )));
        }
        if !(0.0..=1.0).contains(&self.connection_rate) {
            return Err(SimError::InvalidConfiguration(format!(
                "connection_rate must be within [0, 1], got {}",
                self.connection_rate
            )));
        }
        if self.dendrites_per_neuron == 0 || self.synapses_per_dendrite == 0 {
            return Err(SimError::InvalidConfiguration(
                "dendrites_per_neuron and synapses_per_dendrite must be >= 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Background input current, drawn per neuron per step
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriveParams {
    pub mean: f64,
    pub std: f64,
}

impl Default for DriveParams {
    fn default() -> Self {
        Self {
            mean: 0.55,
            std: 0.3,
        }
    }
}

impl DriveParams {
    /// No background input
    pub fn silent() -> Self {
        Self { mean: 0.0, std: 0.0 }
    }
}

/// Which mechanism passes run, and how often the slow ones do
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MechanismSchedule {
    pub plasticity: bool,
    pub homeostasis: bool,
    pub neuromodulation: bool,
    /// Steps between slow passes (scaling, metaplasticity, consolidation)
    pub slow_update_interval: u64,
}

impl Default for MechanismSchedule {
    fn default() -> Self {
        Self {
            plasticity: true,
            homeostasis: true,
            neuromodulation: true,
            slow_update_interval: 100,
        }
    }
}

impl MechanismSchedule {
    /// Pure integrate-and-fire, no mechanism passes
    pub fn disabled() -> Self {
        Self {
            plasticity: false,
            homeostasis: false,
            neuromodulation: false,
            ..Self::default()
        }
    }
}

/// Everything besides the network shape
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationParams {
    pub pyramidal: NeuronParams,
    pub inhibitory: NeuronParams,
    pub drive: DriveParams,
    pub plasticity: PlasticityParams,
    pub homeostasis: HomeostasisParams,
    pub neuromodulation: NeuromodulationParams,
    pub schedule: MechanismSchedule,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            pyramidal: NeuronParams::pyramidal(),
            inhibitory: NeuronParams::inhibitory(),
            drive: DriveParams::default(),
            plasticity: PlasticityParams::default(),
            homeostasis: HomeostasisParams::default(),
            neuromodulation: NeuromodulationParams::default(),
            schedule: MechanismSchedule::default(),
        }
    }
}

impl SimulationParams {
    pub fn validate(&self) -> Result<()> {
        self.pyramidal.validate()?;
        self.inhibitory.validate()?;
        if !(self.drive.std >= 0.0) || !self.drive.mean.is_finite() || !self.drive.std.is_finite() {
            return Err(SimError::InvalidConfiguration(format!(
                "drive must be finite with std >= 0, got mean {} std {}",
                self.drive.mean, self.drive.std
            )));
        }
        self.plasticity.validate()?;
        self.homeostasis.validate()?;
        self.neuromodulation.validate()?;
        if self.schedule.slow_update_interval == 0 {
            return Err(SimError::InvalidConfiguration(
                "slow_update_interval must be >= 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(NetworkConfig::default().validate().is_ok());
        assert!(SimulationParams::default().validate().is_ok());
        assert_eq!(NetworkConfig::default().total_steps(), 10_000);
    }

    #[test]
    fn test_population_errors() {
        let config = NetworkConfig {
            num_inhibitory: 0,
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(SimError::EmptyPopulation {
                population: Population::Inhibitory
            })
        );

        let config = NetworkConfig {
            num_pyramidal: 500,
            num_inhibitory: 6,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(SimError::CapacityExceeded { requested: 506, .. })
        ));
    }

    #[test]
    fn test_rejects_bad_dt_and_rate() {
        for dt in [0.0, -0.1, f64::NAN] {
            let config = NetworkConfig {
                dt,
                ..Default::default()
            };
            assert!(config.validate().unwrap_err().is_configuration_error());
        }
        let config = NetworkConfig {
            connection_rate: 1.5,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_slow_interval_rejected() {
        let mut params = SimulationParams::default();
        params.schedule.slow_update_interval = 0;
        assert!(params.validate().is_err());
    }
}
