// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration validation
//!
//! Checks every documented range and reports all violations together, so a
//! user fixes a configuration file in one pass.

use crate::{ConfigError, ConfigResult, SimulationConfig};
use neurosim_npu_neural::NeuronParams;
use neurosim_npu_step_engine::MAX_NEURONS;

/// Validation errors that can occur during config validation
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValidationError {
    OutOfRange {
        field: String,
        value: f64,
        rule: &'static str,
    },
    CapacityExceeded {
        requested: usize,
        capacity: usize,
    },
    InvalidValue {
        field: String,
        reason: String,
    },
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OutOfRange { field, value, rule } => {
                write!(f, "{} = {} must be {}", field, value, rule)
            }
            Self::CapacityExceeded {
                requested,
                capacity,
            } => {
                write!(
                    f,
                    "network.num_pyramidal + network.num_inhibitory = {} exceeds capacity {}",
                    requested, capacity
                )
            }
            Self::InvalidValue { field, reason } => {
                write!(f, "Invalid configuration value for {}: {}", field, reason)
            }
        }
    }
}

/// Validate the complete configuration
///
/// # Errors
///
/// Returns `ConfigError::ValidationError` listing every violation
pub fn validate_config(config: &SimulationConfig) -> ConfigResult<()> {
    let mut errors = Vec::new();

    validate_network(config, &mut errors);
    validate_neurons("neurons.pyramidal", &config.neurons.pyramidal_params(), &mut errors);
    validate_neurons("neurons.inhibitory", &config.neurons.inhibitory_params(), &mut errors);
    validate_mechanisms(config, &mut errors);
    validate_output(config, &mut errors);

    if !errors.is_empty() {
        let error_messages = errors
            .iter()
            .map(|e| format!("  - {}", e))
            .collect::<Vec<_>>()
            .join("\n");

        return Err(ConfigError::ValidationError(format!(
            "Configuration validation failed:\n{}",
            error_messages
        )));
    }

    Ok(())
}

fn validate_network(config: &SimulationConfig, errors: &mut Vec<ConfigValidationError>) {
    let network = &config.network;

    if network.num_pyramidal == 0 {
        errors.push(out_of_range("network.num_pyramidal", 0.0, ">= 1"));
    }
    if network.num_inhibitory == 0 {
        errors.push(out_of_range("network.num_inhibitory", 0.0, ">= 1"));
    }
    if network.total_neurons() > MAX_NEURONS {
        errors.push(ConfigValidationError::CapacityExceeded {
            requested: network.total_neurons(),
            capacity: MAX_NEURONS,
        });
    }
    if !(network.dt > 0.0) || !network.dt.is_finite() {
        errors.push(out_of_range("network.dt", network.dt, "> 0 and finite"));
    }
    if !(network.simulation_time >= 0.0) || !network.simulation_time.is_finite() {
        errors.push(out_of_range(
            "network.simulation_time",
            network.simulation_time,
            ">= 0 and finite",
        ));
    }
    if !(0.0..=1.0).contains(&network.connection_rate) {
        errors.push(out_of_range(
            "network.connection_rate",
            network.connection_rate,
            "within [0, 1]",
        ));
    }
    if network.dendrites_per_neuron == 0 {
        errors.push(out_of_range("network.dendrites_per_neuron", 0.0, ">= 1"));
    }
    if network.synapses_per_dendrite == 0 {
        errors.push(out_of_range("network.synapses_per_dendrite", 0.0, ">= 1"));
    }
    if network.output_dir.as_os_str().is_empty() {
        errors.push(ConfigValidationError::InvalidValue {
            field: "network.output_dir".to_string(),
            reason: "must not be empty".to_string(),
        });
    }
}

fn validate_neurons(section: &str, params: &NeuronParams, errors: &mut Vec<ConfigValidationError>) {
    if !(params.c_m > 0.0) {
        errors.push(out_of_range(&format!("{}.c_m", section), params.c_m, "> 0"));
    }
    if !(params.tau_m > 0.0) {
        errors.push(out_of_range(&format!("{}.tau_m", section), params.tau_m, "> 0"));
    }
    if !(params.g_leak >= 0.0) {
        errors.push(out_of_range(&format!("{}.g_leak", section), params.g_leak, ">= 0"));
    }
    if !(params.refractory_period >= 0.0) {
        errors.push(out_of_range(
            &format!("{}.refractory_period", section),
            params.refractory_period,
            ">= 0",
        ));
    }
    if !(params.v_reset < params.v_threshold) {
        errors.push(ConfigValidationError::InvalidValue {
            field: format!("{}.v_reset", section),
            reason: format!(
                "reset {} must be below threshold {}",
                params.v_reset, params.v_threshold
            ),
        });
    }
}

fn validate_mechanisms(config: &SimulationConfig, errors: &mut Vec<ConfigValidationError>) {
    let plasticity = &config.plasticity;
    if !(plasticity.stdp_window > 0.0) {
        errors.push(out_of_range("plasticity.stdp_window", plasticity.stdp_window, "> 0"));
    }
    non_negative(
        &[
            ("plasticity.learning_rate", plasticity.learning_rate),
            ("plasticity.stdp_potentiation", plasticity.stdp_potentiation),
            ("plasticity.stdp_depression", plasticity.stdp_depression),
            ("plasticity.homeostatic_rate", plasticity.homeostatic_rate),
            ("plasticity.target_activity", plasticity.target_activity),
            ("plasticity.consolidation_rate", plasticity.consolidation_rate),
            ("plasticity.meta_rate", plasticity.meta_rate),
        ],
        errors,
    );

    let homeostasis = &config.homeostasis;
    if !(homeostasis.energy_baseline > 0.0) {
        errors.push(out_of_range(
            "homeostasis.energy_baseline",
            homeostasis.energy_baseline,
            "> 0",
        ));
    }
    non_negative(
        &[
            ("homeostasis.target_rate", homeostasis.target_rate),
            ("homeostasis.adaptation_rate", homeostasis.adaptation_rate),
            ("homeostasis.calcium_target", homeostasis.calcium_target),
            ("homeostasis.conductance_scaling", homeostasis.conductance_scaling),
            ("homeostasis.metabolic_cost", homeostasis.metabolic_cost),
            ("homeostasis.recovery_rate", homeostasis.recovery_rate),
            ("homeostasis.conservation_gain", homeostasis.conservation_gain),
        ],
        errors,
    );

    let modulation = &config.neuromodulation;
    for (field, value) in [
        ("neuromodulation.baseline_dopamine", modulation.baseline_dopamine),
        ("neuromodulation.baseline_serotonin", modulation.baseline_serotonin),
        ("neuromodulation.baseline_noradrenaline", modulation.baseline_noradrenaline),
        ("neuromodulation.baseline_acetylcholine", modulation.baseline_acetylcholine),
        ("neuromodulation.decay_rate", modulation.decay_rate),
    ] {
        if !(value > 0.0) {
            errors.push(out_of_range(field, value, "> 0"));
        }
    }
    non_negative(
        &[
            ("neuromodulation.learning_modulation", modulation.learning_modulation),
            ("neuromodulation.attention_modulation", modulation.attention_modulation),
            ("neuromodulation.reward_strength", modulation.reward_strength),
            ("neuromodulation.dopamine_damping", modulation.dopamine_damping),
        ],
        errors,
    );

    if !(config.drive.std >= 0.0) {
        errors.push(out_of_range("drive.std", config.drive.std, ">= 0"));
    }
    if config.schedule.slow_update_interval == 0 {
        errors.push(out_of_range("schedule.slow_update_interval", 0.0, ">= 1"));
    }
}

fn validate_output(config: &SimulationConfig, errors: &mut Vec<ConfigValidationError>) {
    if config.output.save_interval == 0 {
        errors.push(out_of_range("output.save_interval", 0.0, ">= 1"));
    }
    let level = config.logging.level.to_lowercase();
    if !["error", "warn", "info", "debug", "trace"].contains(&level.as_str()) {
        errors.push(ConfigValidationError::InvalidValue {
            field: "logging.level".to_string(),
            reason: format!("unknown level '{}'", config.logging.level),
        });
    }
}

fn out_of_range(field: &str, value: f64, rule: &'static str) -> ConfigValidationError {
    ConfigValidationError::OutOfRange {
        field: field.to_string(),
        value,
        rule,
    }
}

fn non_negative(fields: &[(&str, f64)], errors: &mut Vec<ConfigValidationError>) {
    for &(field, value) in fields {
        if !(value >= 0.0) {
            errors.push(out_of_range(field, value, ">= 0"));
        }
    }
}
