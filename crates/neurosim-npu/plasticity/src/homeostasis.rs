// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Homeostasis
//!
//! Slow negative feedback keeping each neuron near its calcium and firing-rate
//! set-points, plus a metabolic energy budget.
//!
//! The passes are not commutative (several touch `g_leak`, `v_threshold` or
//! conductances), so [`apply_homeostasis`] always runs them in this order:
//! 1. [`update_homeostasis`]: adaptation current tracks calcium and rate error
//! 2. [`regulate_intrinsic_excitability`]: threshold and leak track calcium error
//! 3. [`scale_synaptic_strengths`]: conductances scaled against calcium error
//! 4. [`manage_energy_resources`]: energy accounting, conservation or recovery

use crate::params::HomeostasisParams;
use neurosim_npu_neural::neuron::ADAPTATION_MAX;
use neurosim_npu_neural::Neuron;
use tracing::trace;

/// Maximum threshold excursion from baseline (mV)
pub const MAX_THRESHOLD_SHIFT: f64 = 10.0;
/// Leak conductance is kept within these multiples of baseline
pub const LEAK_RANGE: (f64, f64) = (0.5, 2.0);
/// Per-step conductance scaling factor bounds
pub const CONDUCTANCE_SCALE_RANGE: (f64, f64) = (0.5, 1.5);

/// Metabolic cost weights for calcium, |V| and adaptation
const COST_CALCIUM: f64 = 1.0;
const COST_POTENTIAL: f64 = 0.01;
const COST_ADAPTATION: f64 = 0.5;

/// Run every homeostatic pass in the fixed order
///
/// Returns `true` when the neuron is in the energy-conservation regime.
pub fn apply_homeostasis(neuron: &mut Neuron, params: &HomeostasisParams, dt: f64) -> bool {
    update_homeostasis(neuron, params, dt);
    regulate_intrinsic_excitability(neuron, params, dt);
    scale_synaptic_strengths(neuron, params);
    manage_energy_resources(neuron, params, dt)
}

/// Nudge the adaptation current against calcium and firing-rate error
pub fn update_homeostasis(neuron: &mut Neuron, params: &HomeostasisParams, dt: f64) {
    let current_rate = if neuron.spiked_within(dt) { 1.0 / dt } else { 0.0 };
    let calcium_error = neuron.calcium_concentration - params.calcium_target;
    let rate_error = current_rate - params.target_rate;

    let adaptation =
        neuron.adaptation_current + params.adaptation_rate * (calcium_error + rate_error) * dt;
    neuron.adaptation_current = adaptation.clamp(0.0, ADAPTATION_MAX);
}

/// Move threshold and leak against the calcium error, bounded around baseline
pub fn regulate_intrinsic_excitability(neuron: &mut Neuron, params: &HomeostasisParams, dt: f64) {
    let calcium_error = neuron.calcium_concentration - params.calcium_target;
    let drive = params.adaptation_rate * calcium_error * dt;
    let base = neuron.baseline_params;

    let threshold = neuron.params.v_threshold + drive;
    neuron.params.v_threshold = clamp_threshold(threshold, neuron.params.v_reset, base.v_threshold);

    let g_leak = neuron.params.g_leak * (1.0 + drive);
    neuron.params.g_leak = g_leak.clamp(base.g_leak * LEAK_RANGE.0, base.g_leak * LEAK_RANGE.1);
}

/// Scale active conductances by `1 + scaling·(target − calcium)`
pub fn scale_synaptic_strengths(neuron: &mut Neuron, params: &HomeostasisParams) {
    let factor = (1.0
        + params.conductance_scaling * (params.calcium_target - neuron.calcium_concentration))
        .clamp(CONDUCTANCE_SCALE_RANGE.0, CONDUCTANCE_SCALE_RANGE.1);
    for synapse in neuron.synapses_mut().filter(|s| s.is_active()) {
        synapse.scale_conductance(factor);
    }
}

/// Energy accounting
///
/// ```text
/// cost   = metabolic_cost·(Ca + 0.01·|V| + 0.5·a)
/// energy ← max(0, energy + (recovery·(baseline − energy) − cost)·dt)
/// ```
/// When the next step's cost would overdraw the reserve, leak and threshold
/// rise (capped at 2× baseline leak and baseline + 10 mV). Otherwise both
/// relax toward baseline at `recovery_rate`.
pub fn manage_energy_resources(neuron: &mut Neuron, params: &HomeostasisParams, dt: f64) -> bool {
    let cost = params.metabolic_cost
        * (COST_CALCIUM * neuron.calcium_concentration
            + COST_POTENTIAL * neuron.membrane_potential.abs()
            + COST_ADAPTATION * neuron.adaptation_current);
    let recovery = params.recovery_rate * (params.energy_baseline - neuron.energy);
    neuron.energy = (neuron.energy + (recovery - cost) * dt).max(0.0);

    let base = neuron.baseline_params;
    let conserving = neuron.energy - cost * dt < 0.0;
    if conserving {
        neuron.params.g_leak =
            (neuron.params.g_leak * (1.0 + params.conservation_gain)).min(base.g_leak * LEAK_RANGE.1);
        neuron.params.v_threshold = (neuron.params.v_threshold + params.conservation_gain)
            .min(base.v_threshold + MAX_THRESHOLD_SHIFT);
        trace!(
            "[HOMEOSTASIS] {} conserving energy (reserve {:.4}, cost {:.4})",
            neuron.id,
            neuron.energy,
            cost
        );
    } else {
        neuron.params.g_leak += params.recovery_rate * (base.g_leak - neuron.params.g_leak);
        neuron.params.v_threshold +=
            params.recovery_rate * (base.v_threshold - neuron.params.v_threshold);
    }
    conserving
}

/// Keep the threshold within ±10 mV of baseline and above the reset potential
fn clamp_threshold(threshold: f64, v_reset: f64, baseline: f64) -> f64 {
    let lower = (baseline - MAX_THRESHOLD_SHIFT).max(v_reset + 1.0);
    let upper = baseline + MAX_THRESHOLD_SHIFT;
    threshold.clamp(lower, upper.max(lower))
}

#[cfg(test)]
mod tests {
    use super::*;
    use neurosim_npu_neural::{NeuronId, NeuronParams};

    fn neuron() -> Neuron {
        Neuron::new(NeuronId(0), NeuronParams::pyramidal(), false, 1, 2).unwrap()
    }

    #[test]
    fn test_spiking_raises_adaptation() {
        let params = HomeostasisParams::default();
        let mut n = neuron();
        n.last_spike_time = 0.0;
        update_homeostasis(&mut n, &params, 0.1);
        assert!(n.adaptation_current > 0.0);
    }

    #[test]
    fn test_silence_lowers_adaptation() {
        let params = HomeostasisParams::default();
        let mut n = neuron();
        n.adaptation_current = 1.0;
        update_homeostasis(&mut n, &params, 0.1);
        assert!(n.adaptation_current < 1.0);
        assert!(n.adaptation_current >= 0.0);
    }

    #[test]
    fn test_excitability_bounded_around_baseline() {
        let params = HomeostasisParams {
            adaptation_rate: 100.0,
            ..Default::default()
        };
        let mut n = neuron();
        n.calcium_concentration = 50.0;
        for _ in 0..100 {
            regulate_intrinsic_excitability(&mut n, &params, 1.0);
        }
        assert_eq!(n.params.v_threshold, -45.0);
        assert_eq!(n.params.g_leak, 0.1);

        n.calcium_concentration = 0.0;
        for _ in 0..100 {
            regulate_intrinsic_excitability(&mut n, &params, 1.0);
        }
        assert_eq!(n.params.v_threshold, -65.0);
        assert_eq!(n.params.g_leak, 0.025);
    }

    #[test]
    fn test_conductance_scaling_against_calcium() {
        let params = HomeostasisParams::default();
        let mut n = neuron();
        assert!(n.bind_incoming(NeuronId(1), 1.0, false));
        n.deliver_spikes(&[false, true], 0.0);
        n.calcium_concentration = 5.0;
        scale_synaptic_strengths(&mut n, &params);
        let g = n.synapses().find(|s| s.is_active()).map(|s| s.conductance());
        assert!(g.unwrap() < 1.0);
    }

    #[test]
    fn test_energy_recovers_toward_baseline() {
        let params = HomeostasisParams::default();
        let mut n = neuron();
        n.energy = 0.5;
        n.membrane_potential = 0.0;
        assert!(!manage_energy_resources(&mut n, &params, 1.0));
        assert!(n.energy > 0.5);
    }

    #[test]
    fn test_conservation_regime() {
        let params = HomeostasisParams {
            metabolic_cost: 10.0,
            ..Default::default()
        };
        let mut n = neuron();
        n.energy = 0.01;
        n.adaptation_current = 2.0;
        assert!(manage_energy_resources(&mut n, &params, 1.0));
        assert!(n.energy >= 0.0);
        assert!(n.params.g_leak > n.baseline_params.g_leak);
        assert!(n.params.v_threshold > n.baseline_params.v_threshold);
        assert!(n.params.g_leak <= 2.0 * n.baseline_params.g_leak);
    }

    #[test]
    fn test_parameters_relax_when_energy_is_plentiful() {
        let params = HomeostasisParams::default();
        let mut n = neuron();
        n.params.v_threshold = -50.0;
        n.membrane_potential = 0.0;
        manage_energy_resources(&mut n, &params, 0.1);
        assert!(n.params.v_threshold < -50.0);
    }
}
