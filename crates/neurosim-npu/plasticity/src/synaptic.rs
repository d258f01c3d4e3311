// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Slow synaptic mechanisms: homeostatic weight scaling, metaplasticity and
//! bistable consolidation.

use crate::params::PlasticityParams;
use neurosim_npu_neural::{Neuron, Synapse};

/// Weights above this are stabilised by consolidation
pub const CONSOLIDATION_HIGH: f64 = 0.8;
/// Weights below this are kept plastic by consolidation
pub const CONSOLIDATION_LOW: f64 = 0.2;

/// Scale every active weight of `neuron` by `1 − rate·(calcium − target)`
///
/// Activity above the calcium target shrinks all incoming weights, activity
/// below it grows them.
pub fn homeostatic_plasticity(neuron: &mut Neuron, params: &PlasticityParams) {
    let factor =
        1.0 - params.homeostatic_rate * (neuron.calcium_concentration - params.target_activity);
    for synapse in neuron.synapses_mut().filter(|s| s.is_active()) {
        synapse.scale_weight(factor);
    }
}

/// Sliding-threshold update: `meta += meta_rate·(1 − trace)`
#[inline]
pub fn update_meta_plasticity(synapse: &mut Synapse, params: &PlasticityParams) {
    let meta = synapse.meta_plasticity() + params.meta_rate * (1.0 - synapse.trace());
    synapse.set_meta_plasticity(meta);
}

/// Strong weights become harder to change, weak ones stay plastic
#[inline]
pub fn consolidate(synapse: &mut Synapse, params: &PlasticityParams) {
    if synapse.weight() > CONSOLIDATION_HIGH {
        synapse.scale_meta_plasticity(1.0 - params.consolidation_rate);
    } else if synapse.weight() < CONSOLIDATION_LOW {
        synapse.scale_meta_plasticity(1.0 + params.consolidation_rate);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use neurosim_npu_neural::{NeuronId, NeuronParams};

    fn wired_neuron() -> Neuron {
        let mut neuron = Neuron::new(NeuronId(0), NeuronParams::pyramidal(), false, 1, 4).unwrap();
        assert!(neuron.bind_incoming(NeuronId(1), 1.0, false));
        assert!(neuron.bind_incoming(NeuronId(2), 2.0, false));
        neuron
    }

    #[test]
    fn test_homeostatic_scaling_direction() {
        let params = PlasticityParams {
            homeostatic_rate: 0.1,
            ..Default::default()
        };

        let mut hot = wired_neuron();
        hot.calcium_concentration = 1.1;
        homeostatic_plasticity(&mut hot, &params);
        let weights: Vec<f64> = hot
            .synapses()
            .filter(|s| s.is_active())
            .map(Synapse::weight)
            .collect();
        assert!((weights[0] - 0.9).abs() < 1e-12);
        assert!((weights[1] - 1.8).abs() < 1e-12);

        let mut cold = wired_neuron();
        cold.calcium_concentration = 0.0;
        homeostatic_plasticity(&mut cold, &params);
        assert!(cold.synapses().filter(|s| s.is_active()).all(|s| s.weight() >= 1.0));
    }

    #[test]
    fn test_homeostatic_scaling_skips_unbound_slots() {
        let mut neuron = wired_neuron();
        neuron.calcium_concentration = 0.0;
        homeostatic_plasticity(&mut neuron, &PlasticityParams::default());
        assert!(neuron
            .synapses()
            .filter(|s| !s.is_active())
            .all(|s| s.weight() == 0.0));
    }

    #[test]
    fn test_meta_plasticity_sliding_threshold() {
        let params = PlasticityParams {
            meta_rate: 0.1,
            ..Default::default()
        };
        let mut quiet = Synapse::new(None, None, 1.0);
        update_meta_plasticity(&mut quiet, &params);
        assert!((quiet.meta_plasticity() - 1.1).abs() < 1e-12);

        let mut busy = Synapse::new(None, None, 1.0);
        busy.set_trace(3.0);
        update_meta_plasticity(&mut busy, &params);
        assert!((busy.meta_plasticity() - 0.8).abs() < 1e-12);
    }

    #[test]
    fn test_consolidation_is_bistable() {
        let params = PlasticityParams::default();

        let mut strong = Synapse::new(None, None, 1.0);
        consolidate(&mut strong, &params);
        assert!(strong.meta_plasticity() < 1.0);

        let mut weak = Synapse::new(None, None, 0.1);
        consolidate(&mut weak, &params);
        assert!(weak.meta_plasticity() > 1.0);

        let mut middle = Synapse::new(None, None, 0.5);
        consolidate(&mut middle, &params);
        assert_eq!(middle.meta_plasticity(), 1.0);
    }
}
