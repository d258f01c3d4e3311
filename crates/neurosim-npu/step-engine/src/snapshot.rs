// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Read-only views of network state handed to publishers

use neurosim_npu_neural::{Neuron, NeuronId, Population};
use serde::{Deserialize, Serialize};

/// Spike counts produced by one step
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepSpikes {
    pub pyramidal: usize,
    pub inhibitory: usize,
}

impl StepSpikes {
    pub fn total(&self) -> usize {
        self.pyramidal + self.inhibitory
    }
}

/// Population-level state at one point in time
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NetworkSnapshot {
    pub step: u64,
    /// Simulated time (ms)
    pub time: f64,
    pub population_freq_p: f64,
    pub population_freq_i: f64,
    pub spikes_p: usize,
    pub spikes_i: usize,
}

/// Per-neuron state at one point in time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NeuronSnapshot {
    pub id: NeuronId,
    pub population: Population,
    pub membrane_potential: f64,
    pub calcium_concentration: f64,
    pub adaptation_current: f64,
    pub energy: f64,
    pub v_threshold: f64,
    pub g_leak: f64,
    pub dopamine: f64,
    pub serotonin: f64,
    pub noradrenaline: f64,
    pub acetylcholine: f64,
    pub mean_weight: f64,
    pub refractory: bool,
}

impl NeuronSnapshot {
    pub fn capture(neuron: &Neuron) -> Self {
        let (sum, count) = neuron
            .synapses()
            .filter(|s| s.is_active())
            .fold((0.0, 0usize), |(sum, n), s| (sum + s.weight(), n + 1));
        Self {
            id: neuron.id,
            population: if neuron.is_inhibitory {
                Population::Inhibitory
            } else {
                Population::Pyramidal
            },
            membrane_potential: neuron.membrane_potential,
            calcium_concentration: neuron.calcium_concentration,
            adaptation_current: neuron.adaptation_current,
            energy: neuron.energy,
            v_threshold: neuron.params.v_threshold,
            g_leak: neuron.params.g_leak,
            dopamine: neuron.modulators.dopamine,
            serotonin: neuron.modulators.serotonin,
            noradrenaline: neuron.modulators.noradrenaline,
            acetylcholine: neuron.modulators.acetylcholine,
            mean_weight: if count == 0 { 0.0 } else { sum / count as f64 },
            refractory: neuron.is_refractory(),
        }
    }
}

/// Structural summary returned by `Network::stats`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkStats {
    pub num_pyramidal: usize,
    pub num_inhibitory: usize,
    pub synapse_slots: usize,
    pub bound_synapses: usize,
    pub permitted_edges: usize,
    /// Realised fraction of the `n·(n − 1)` possible edges
    pub edge_fraction: f64,
    /// Permitted edges with no free synapse slot at the postsynaptic neuron
    pub unrealized_edges: usize,
    pub mean_weight: f64,
}
