// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0
//! Integration tests for mechanism passes acting on wired neurons.

use neurosim_npu_neural::{Neuron, NeuronId, NeuronParams, Synapse};
use neurosim_npu_plasticity::{
    apply_homeostasis, consolidate, learning_gain, stdp, update_meta_plasticity,
    update_neuromodulators, HomeostasisParams, NeuromodulationParams, PlasticityParams,
};
use proptest::prelude::*;

fn wired_neuron(partners: u32) -> Neuron {
    let mut neuron = Neuron::new(NeuronId(0), NeuronParams::pyramidal(), false, 2, 8).unwrap();
    for pre in 1..=partners {
        assert!(neuron.bind_incoming(NeuronId(pre), 1.0, false));
    }
    neuron
}

#[test]
fn test_stdp_sign_for_swapped_spike_order() {
    let params = PlasticityParams::default();

    let mut causal = Synapse::new(Some(NeuronId(1)), Some(NeuronId(0)), 1.0);
    stdp(&mut causal, 10.0, 15.0, &params);
    assert!(causal.weight() > 1.0);

    let mut acausal = Synapse::new(Some(NeuronId(1)), Some(NeuronId(0)), 1.0);
    stdp(&mut acausal, 15.0, 10.0, &params);
    assert!(acausal.weight() < 1.0);
}

#[test]
fn test_dopamine_gates_stdp_magnitude() {
    let plasticity = PlasticityParams::default();
    let modulation = NeuromodulationParams::default();
    let mut neuron = wired_neuron(1);

    neuron.last_spike_time = 0.0;
    update_neuromodulators(&mut neuron, &modulation, 0.1);
    let gain = learning_gain(&neuron.modulators, &modulation);
    assert!(gain > 1.0);

    let mut plain = Synapse::new(None, None, 1.0);
    let mut gated = Synapse::new(None, None, 1.0);
    let a = stdp(&mut plain, 10.0, 12.0, &plasticity);
    let b = stdp(&mut gated, 10.0, 12.0, &plasticity.with_learning_gain(gain));
    assert!(b > a);
}

#[test]
fn test_sustained_homeostasis_stays_bounded() {
    let params = HomeostasisParams::default();
    let mut neuron = wired_neuron(4);
    let dt = 0.1;

    for step in 0..10_000 {
        if step % 50 == 0 {
            neuron.last_spike_time = 0.0;
            neuron.calcium_concentration += 0.1;
        } else {
            neuron.last_spike_time += dt;
        }
        apply_homeostasis(&mut neuron, &params, dt);

        let base = neuron.baseline_params;
        assert!((0.0..=5.0).contains(&neuron.adaptation_current));
        assert!(neuron.energy >= 0.0);
        assert!(neuron.params.v_threshold <= base.v_threshold + 10.0);
        assert!(neuron.params.v_threshold >= base.v_threshold - 10.0);
        assert!(neuron.params.g_leak >= 0.5 * base.g_leak - 1e-12);
        assert!(neuron.params.g_leak <= 2.0 * base.g_leak + 1e-12);
        assert!(neuron.params.v_threshold > neuron.params.v_reset);
    }
}

proptest! {
    #[test]
    fn prop_slow_mechanisms_keep_bounds(
        weight in 0.0f64..5.0,
        trace in 0.0f64..10.0,
        rounds in 1usize..200,
    ) {
        let params = PlasticityParams::default();
        let mut syn = Synapse::new(None, None, weight);
        syn.set_trace(trace);
        for _ in 0..rounds {
            update_meta_plasticity(&mut syn, &params);
            consolidate(&mut syn, &params);
            prop_assert!((0.0..=2.0).contains(&syn.meta_plasticity()));
            prop_assert!((0.0..=5.0).contains(&syn.weight()));
        }
    }
}
