// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Mechanism parameter sets
//!
//! All three deserialize with per-field defaults so partial configuration
//! sections are valid. Times are in milliseconds.

use neurosim_npu_neural::{Result, SimError};
use serde::{Deserialize, Serialize};

/// Synaptic plasticity parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlasticityParams {
    pub learning_rate: f64,
    /// Pairing window (ms); pairs at or beyond it are ignored
    pub stdp_window: f64,
    /// A+
    pub stdp_potentiation: f64,
    /// A−
    pub stdp_depression: f64,
    pub homeostatic_rate: f64,
    /// Calcium set-point for homeostatic weight scaling
    pub target_activity: f64,
    pub consolidation_rate: f64,
    pub meta_rate: f64,
}

impl Default for PlasticityParams {
    fn default() -> Self {
        Self {
            learning_rate: 0.01,
            stdp_window: 20.0,
            stdp_potentiation: 1.0,
            stdp_depression: 1.05,
            homeostatic_rate: 0.001,
            target_activity: 0.1,
            consolidation_rate: 0.01,
            meta_rate: 0.0001,
        }
    }
}

impl PlasticityParams {
    /// Copy with the learning rate scaled by a non-negative gain
    pub fn with_learning_gain(&self, gain: f64) -> Self {
        Self {
            learning_rate: self.learning_rate * gain.max(0.0),
            ..*self
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.stdp_window > 0.0) {
            return Err(invalid("plasticity.stdp_window", "> 0", self.stdp_window));
        }
        non_negative(&[
            ("plasticity.learning_rate", self.learning_rate),
            ("plasticity.stdp_potentiation", self.stdp_potentiation),
            ("plasticity.stdp_depression", self.stdp_depression),
            ("plasticity.homeostatic_rate", self.homeostatic_rate),
            ("plasticity.target_activity", self.target_activity),
            ("plasticity.consolidation_rate", self.consolidation_rate),
            ("plasticity.meta_rate", self.meta_rate),
        ])
    }
}

/// Homeostatic regulation parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HomeostasisParams {
    /// Target firing rate (spikes/ms)
    pub target_rate: f64,
    pub adaptation_rate: f64,
    pub calcium_target: f64,
    pub conductance_scaling: f64,
    pub metabolic_cost: f64,
    pub energy_baseline: f64,
    pub recovery_rate: f64,
    /// Per-step leak/threshold increase while conserving energy
    pub conservation_gain: f64,
}

impl Default for HomeostasisParams {
    fn default() -> Self {
        Self {
            target_rate: 0.005,
            adaptation_rate: 0.1,
            calcium_target: 0.1,
            conductance_scaling: 0.01,
            metabolic_cost: 0.01,
            energy_baseline: 1.0,
            recovery_rate: 0.01,
            conservation_gain: 0.01,
        }
    }
}

impl HomeostasisParams {
    pub fn validate(&self) -> Result<()> {
        if !(self.energy_baseline > 0.0) {
            return Err(invalid(
                "homeostasis.energy_baseline",
                "> 0",
                self.energy_baseline,
            ));
        }
        non_negative(&[
            ("homeostasis.target_rate", self.target_rate),
            ("homeostasis.adaptation_rate", self.adaptation_rate),
            ("homeostasis.calcium_target", self.calcium_target),
            ("homeostasis.conductance_scaling", self.conductance_scaling),
            ("homeostasis.metabolic_cost", self.metabolic_cost),
            ("homeostasis.recovery_rate", self.recovery_rate),
            ("homeostasis.conservation_gain", self.conservation_gain),
        ])
    }
}

/// Neuromodulator baselines and coupling strengths
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NeuromodulationParams {
    pub baseline_dopamine: f64,
    pub baseline_serotonin: f64,
    pub baseline_noradrenaline: f64,
    pub baseline_acetylcholine: f64,
    /// Divides every modulator time constant
    pub decay_rate: f64,
    /// Dopamine gain on the STDP learning rate
    pub learning_modulation: f64,
    /// Acetylcholine/noradrenaline gain on dendritic coupling
    pub attention_modulation: f64,
    /// Dopamine step per unit reward-prediction error
    pub reward_strength: f64,
    /// Adaptation suppression per unit dopamine per ms
    pub dopamine_damping: f64,
}

impl Default for NeuromodulationParams {
    fn default() -> Self {
        Self {
            baseline_dopamine: 1.0,
            baseline_serotonin: 1.0,
            baseline_noradrenaline: 1.0,
            baseline_acetylcholine: 1.0,
            decay_rate: 1.0,
            learning_modulation: 0.5,
            attention_modulation: 0.1,
            reward_strength: 0.1,
            dopamine_damping: 0.1,
        }
    }
}

impl NeuromodulationParams {
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("neuromodulation.baseline_dopamine", self.baseline_dopamine),
            ("neuromodulation.baseline_serotonin", self.baseline_serotonin),
            ("neuromodulation.baseline_noradrenaline", self.baseline_noradrenaline),
            ("neuromodulation.baseline_acetylcholine", self.baseline_acetylcholine),
            ("neuromodulation.decay_rate", self.decay_rate),
        ] {
            if !(value > 0.0) || !value.is_finite() {
                return Err(invalid(name, "> 0", value));
            }
        }
        non_negative(&[
            ("neuromodulation.learning_modulation", self.learning_modulation),
            ("neuromodulation.attention_modulation", self.attention_modulation),
            ("neuromodulation.reward_strength", self.reward_strength),
            ("neuromodulation.dopamine_damping", self.dopamine_damping),
        ])
    }
}

fn invalid(name: &str, rule: &str, value: f64) -> SimError {
    SimError::InvalidConfiguration(format!("{} must be {}, got {}", name, rule, value))
}

fn non_negative(fields: &[(&str, f64)]) -> Result<()> {
    for &(name, value) in fields {
        if !(value >= 0.0) || !value.is_finite() {
            return Err(invalid(name, ">= 0", value));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        assert!(PlasticityParams::default().validate().is_ok());
        assert!(HomeostasisParams::default().validate().is_ok());
        assert!(NeuromodulationParams::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_degenerate_values() {
        let params = PlasticityParams {
            stdp_window: 0.0,
            ..Default::default()
        };
        assert!(params.validate().unwrap_err().is_configuration_error());

        let params = HomeostasisParams {
            recovery_rate: -1.0,
            ..Default::default()
        };
        assert!(params.validate().is_err());

        let params = NeuromodulationParams {
            baseline_dopamine: 0.0,
            ..Default::default()
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_learning_gain() {
        let params = PlasticityParams::default();
        assert!((params.with_learning_gain(2.0).learning_rate - 0.02).abs() < 1e-12);
        assert_eq!(params.with_learning_gain(-1.0).learning_rate, 0.0);
    }
}
