// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Dendrite
//!
//! A dendritic compartment owning a fixed pool of synapses.
//!
//! ## Model Dynamics
//! ```text
//! calcium  ← calcium·(1 − dt/τ_Ca)                         τ_Ca = 20 ms
//! nmda     = sigmoid(calcium − θ)       if calcium > θ       θ    = 0.5
//! nmda     ← nmda·(1 − dt/τ_NMDA)       otherwise            τ_NMDA = 100 ms
//! local    = coupling · Σ_active polarity·weight·conductance
//! ```
//!
//! Presynaptic spikes raise the dendritic calcium by `0.1·weight` for each
//! synapse they reach, which is what engages the NMDA boost.

use crate::dynamics::{euler_decay_factor, sigmoid};
use crate::synapse::Synapse;
use crate::types::try_alloc;
use crate::types::Result;
use serde::{Deserialize, Serialize};

/// Dendritic calcium time constant (ms)
pub const TAU_CALCIUM_MS: f64 = 20.0;
/// NMDA relaxation time constant below threshold (ms)
pub const TAU_NMDA_MS: f64 = 100.0;
/// Calcium level above which the NMDA gate opens
pub const NMDA_CALCIUM_THRESHOLD: f64 = 0.5;
/// Calcium influx per delivered spike, per unit of synaptic weight
pub const CALCIUM_INFLUX_PER_WEIGHT: f64 = 0.1;

/// Dendritic compartment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dendrite {
    /// Coupled synaptic drive from the last refresh
    pub local_potential: f64,
    pub calcium_concentration: f64,
    /// NMDA-like gate in `[0, 1]`
    pub nmda_conductance: f64,
    /// Scales this compartment's contribution to the soma
    pub coupling_strength: f64,
    synapses: Vec<Synapse>,
}

impl Dendrite {
    /// Create a dendrite with `num_synapses` unbound slots
    ///
    /// The pool length never changes afterwards.
    pub fn with_capacity(num_synapses: usize) -> Result<Self> {
        let mut synapses = try_alloc(num_synapses, "dendrite synapse pool")?;
        synapses.resize_with(num_synapses, Synapse::unbound);
        Ok(Self {
            local_potential: 0.0,
            calcium_concentration: 0.0,
            nmda_conductance: 0.0,
            coupling_strength: 1.0,
            synapses,
        })
    }

    /// Decay every synapse in the pool
    pub fn decay_and_update_synapses(&mut self, dt: f64) {
        for synapse in &mut self.synapses {
            synapse.decay(dt);
        }
    }

    /// Decay calcium and update the calcium-gated NMDA conductance
    pub fn update_calcium_and_nmda(&mut self, dt: f64) {
        self.calcium_concentration =
            (self.calcium_concentration * euler_decay_factor(dt, TAU_CALCIUM_MS)).max(0.0);

        if self.calcium_concentration > NMDA_CALCIUM_THRESHOLD {
            self.nmda_conductance = sigmoid(self.calcium_concentration - NMDA_CALCIUM_THRESHOLD);
        } else {
            self.nmda_conductance *= euler_decay_factor(dt, TAU_NMDA_MS);
        }
        self.nmda_conductance = self.nmda_conductance.clamp(0.0, 1.0);
    }

    /// Coupled sum of active synaptic drive. Read-only.
    pub fn compute_local_potential(&self) -> f64 {
        let drive: f64 = self.synapses.iter().map(Synapse::contribution).sum();
        drive * self.coupling_strength
    }

    /// Cache `compute_local_potential()` in `local_potential`
    #[inline]
    pub fn refresh_local_potential(&mut self) {
        self.local_potential = self.compute_local_potential();
    }

    /// Full per-step compartment update
    pub fn update(&mut self, dt: f64) {
        self.decay_and_update_synapses(dt);
        self.update_calcium_and_nmda(dt);
        self.refresh_local_potential();
    }

    /// Deliver this step's presynaptic spikes
    ///
    /// `fired` is indexed by neuron id. Returns how many synapses received a spike.
    pub fn deliver_spikes(&mut self, fired: &[bool], time: f64) -> usize {
        let mut delivered = 0;
        for synapse in &mut self.synapses {
            if !synapse.is_active() {
                continue;
            }
            let Some(pre) = synapse.pre_id() else {
                continue;
            };
            if fired.get(pre.index()).copied().unwrap_or(false) {
                synapse.on_presynaptic_spike(time);
                self.calcium_concentration += CALCIUM_INFLUX_PER_WEIGHT * synapse.weight();
                delivered += 1;
            }
        }
        delivered
    }

    pub fn synapses(&self) -> &[Synapse] {
        &self.synapses
    }

    /// Mutable view of the pool. The slice length is fixed.
    pub fn synapses_mut(&mut self) -> &mut [Synapse] {
        &mut self.synapses
    }

    pub fn num_synapses(&self) -> usize {
        self.synapses.len()
    }

    pub fn active_synapse_count(&self) -> usize {
        self.synapses.iter().filter(|s| s.is_active()).count()
    }

    /// First unbound slot, if the pool has room
    pub(crate) fn free_slot(&mut self) -> Option<&mut Synapse> {
        self.synapses.iter_mut().find(|s| !s.is_bound())
    }
}
