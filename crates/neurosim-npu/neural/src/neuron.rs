// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Neuron
//!
//! Point-soma neuron fed by a fixed set of dendritic compartments.
//!
//! ## Model Dynamics
//! ```text
//! I_d   = Σ_dendrites local_potential·(1 + nmda)
//! dV/dt = (−g_leak·(V − V_rest) + I_d + I_ext − a) / C_m
//! Ca    ← Ca·(1 − dt/50)
//! a     ← clamp(a·(1 − dt/100), 0, 5)
//! ```
//!
//! ## State Machine
//! ```text
//!              check_spike() && V ≥ V_th
//! Integrating ───────────────────────────▶ Refractory
//!      ▲                                       │
//!      └──── refractory_time drained to 0 ─────┘
//! ```
//! The update that drains the refractory timer does not integrate, and
//! `check_spike` only fires after an update that did. A neuron therefore
//! cannot re-fire before its refractory period has passed and at least one
//! further integration step has run.
//!
//! `last_spike_time` is the time elapsed since the last spike. It grows by
//! `dt` per update and is reset to 0 by a spike.

use crate::dendrite::Dendrite;
use crate::dynamics::euler_decay_factor;
use crate::synapse::Synapse;
use crate::types::try_alloc;
use crate::types::{NeuronId, Result, SimError};
use serde::{Deserialize, Serialize};

/// Somatic calcium time constant (ms)
pub const TAU_CALCIUM_MS: f64 = 50.0;
/// Adaptation current time constant (ms)
pub const TAU_ADAPTATION_MS: f64 = 100.0;
/// Upper bound of the adaptation current
pub const ADAPTATION_MAX: f64 = 5.0;
/// Calcium added per spike
pub const SPIKE_CALCIUM_INCREMENT: f64 = 0.1;
/// Adaptation added per spike
pub const SPIKE_ADAPTATION_INCREMENT: f64 = 0.2;
/// Elapsed-time value for a neuron that has not spiked yet (ms)
pub const NEVER_SPIKED_MS: f64 = 1000.0;

/// Intrinsic membrane parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NeuronParams {
    /// Resting potential (mV)
    pub v_resting: f64,
    /// Firing threshold (mV)
    pub v_threshold: f64,
    /// Post-spike reset potential (mV)
    pub v_reset: f64,
    /// Leak conductance
    pub g_leak: f64,
    /// Membrane capacitance
    pub c_m: f64,
    /// Membrane time constant (ms)
    pub tau_m: f64,
    /// Refractory period (ms)
    pub refractory_period: f64,
}

impl Default for NeuronParams {
    fn default() -> Self {
        Self::pyramidal()
    }
}

impl NeuronParams {
    /// Excitatory pyramidal cell defaults
    pub fn pyramidal() -> Self {
        Self {
            v_resting: -65.0,
            v_threshold: -55.0,
            v_reset: -75.0,
            g_leak: 0.05,
            c_m: 1.0,
            tau_m: 20.0,
            refractory_period: 2.0,
        }
    }

    /// Fast-spiking interneuron defaults
    pub fn inhibitory() -> Self {
        Self {
            g_leak: 0.1,
            refractory_period: 1.0,
            ..Self::pyramidal()
        }
    }

    /// Reject parameters that would make the membrane equation degenerate
    pub fn validate(&self) -> Result<()> {
        let finite = [
            self.v_resting,
            self.v_threshold,
            self.v_reset,
            self.g_leak,
            self.c_m,
            self.tau_m,
            self.refractory_period,
        ]
        .iter()
        .all(|v| v.is_finite());
        if !finite {
            return Err(SimError::InvalidConfiguration(
                "neuron parameters must be finite".to_string(),
            ));
        }
        if self.c_m <= 0.0 {
            return Err(SimError::InvalidConfiguration(format!(
                "c_m must be > 0, got {}",
                self.c_m
            )));
        }
        if self.tau_m <= 0.0 {
            return Err(SimError::InvalidConfiguration(format!(
                "tau_m must be > 0, got {}",
                self.tau_m
            )));
        }
        if self.g_leak < 0.0 {
            return Err(SimError::InvalidConfiguration(format!(
                "g_leak must be >= 0, got {}",
                self.g_leak
            )));
        }
        if self.v_reset >= self.v_threshold {
            return Err(SimError::InvalidConfiguration(format!(
                "v_reset ({}) must be below v_threshold ({})",
                self.v_reset, self.v_threshold
            )));
        }
        if self.refractory_period < 0.0 {
            return Err(SimError::InvalidConfiguration(format!(
                "refractory_period must be >= 0, got {}",
                self.refractory_period
            )));
        }
        Ok(())
    }
}

/// Per-neuron neuromodulator levels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Neuromodulators {
    pub dopamine: f64,
    pub serotonin: f64,
    pub noradrenaline: f64,
    pub acetylcholine: f64,
}

impl Neuromodulators {
    /// All four levels set to `level`
    pub fn uniform(level: f64) -> Self {
        Self {
            dopamine: level,
            serotonin: level,
            noradrenaline: level,
            acetylcholine: level,
        }
    }
}

impl Default for Neuromodulators {
    fn default() -> Self {
        Self::uniform(1.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NeuronState {
    Integrating,
    Refractory,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Neuron {
    pub id: NeuronId,
    /// Live parameters (homeostasis moves threshold and leak)
    pub params: NeuronParams,
    /// Parameters the neuron was built with
    pub baseline_params: NeuronParams,
    pub membrane_potential: f64,
    pub calcium_concentration: f64,
    pub adaptation_current: f64,
    pub refractory_time: f64,
    /// Time elapsed since the last spike (ms)
    pub last_spike_time: f64,
    pub is_inhibitory: bool,
    pub modulators: Neuromodulators,
    /// Metabolic energy reserve
    pub energy: f64,
    state: NeuronState,
    integrated: bool,
    dendrites: Vec<Dendrite>,
    next_dendrite: usize,
}

impl Neuron {
    /// Create a resting neuron with `num_dendrites × synapses_per_dendrite` unbound slots
    pub fn new(
        id: NeuronId,
        params: NeuronParams,
        is_inhibitory: bool,
        num_dendrites: usize,
        synapses_per_dendrite: usize,
    ) -> Result<Self> {
        params.validate()?;
        if num_dendrites == 0 {
            return Err(SimError::InvalidConfiguration(
                "a neuron needs at least one dendrite".to_string(),
            ));
        }
        let mut dendrites = try_alloc(num_dendrites, "neuron dendrites")?;
        for _ in 0..num_dendrites {
            dendrites.push(Dendrite::with_capacity(synapses_per_dendrite)?);
        }

        Ok(Self {
            id,
            params,
            baseline_params: params,
            membrane_potential: params.v_resting,
            calcium_concentration: 0.0,
            adaptation_current: 0.0,
            refractory_time: 0.0,
            last_spike_time: NEVER_SPIKED_MS,
            is_inhibitory,
            modulators: Neuromodulators::default(),
            energy: 1.0,
            state: NeuronState::Integrating,
            integrated: false,
            dendrites,
            next_dendrite: 0,
        })
    }

    /// Advance one step with no external current
    pub fn update(&mut self, dt: f64) {
        self.update_with_input(dt, 0.0);
    }

    /// Advance one step with an external (background) current
    pub fn update_with_input(&mut self, dt: f64, external_current: f64) {
        self.last_spike_time += dt;
        self.integrated = false;

        for dendrite in &mut self.dendrites {
            dendrite.update(dt);
        }

        if self.state == NeuronState::Refractory {
            self.refractory_time = (self.refractory_time - dt).max(0.0);
            if self.refractory_time <= 0.0 {
                self.state = NeuronState::Integrating;
            }
            return;
        }

        let p = &self.params;
        let dv = (-p.g_leak * (self.membrane_potential - p.v_resting) + self.dendritic_input()
            + external_current
            - self.adaptation_current)
            / p.c_m;
        self.membrane_potential += dt * dv;

        self.calcium_concentration *= euler_decay_factor(dt, TAU_CALCIUM_MS);
        self.adaptation_current = (self.adaptation_current
            * euler_decay_factor(dt, TAU_ADAPTATION_MS))
        .clamp(0.0, ADAPTATION_MAX);
        self.integrated = true;
    }

    /// Fire and reset if the last update integrated past threshold
    ///
    /// `V ≥ v_threshold` alone is not enough: the preceding `update` must
    /// have integrated the membrane. So this returns false on a fresh neuron,
    /// after a step that only drained the refractory period, and on a second
    /// call after a spike (the spike clears the flag until the next
    /// integrating `update`). Calling it again after a sub-threshold update
    /// re-tests the same `V` and fires only if `V` was raised in between.
    pub fn check_spike(&mut self) -> bool {
        if !self.integrated || self.membrane_potential < self.params.v_threshold {
            return false;
        }
        self.membrane_potential = self.params.v_reset;
        self.refractory_time = self.params.refractory_period;
        self.last_spike_time = 0.0;
        self.calcium_concentration += SPIKE_CALCIUM_INCREMENT;
        self.adaptation_current =
            (self.adaptation_current + SPIKE_ADAPTATION_INCREMENT).min(ADAPTATION_MAX);
        self.state = NeuronState::Refractory;
        self.integrated = false;
        true
    }

    /// NMDA-boosted sum of dendritic drive
    pub fn dendritic_input(&self) -> f64 {
        self.dendrites
            .iter()
            .map(|d| d.local_potential * (1.0 + d.nmda_conductance))
            .sum()
    }

    /// True if the last spike happened less than `window` ago
    #[inline]
    pub fn spiked_within(&self, window: f64) -> bool {
        self.last_spike_time < window
    }

    /// Absolute time of the last spike, given the current time
    #[inline]
    pub fn last_spike_at(&self, now: f64) -> f64 {
        now - self.last_spike_time
    }

    pub fn state(&self) -> NeuronState {
        self.state
    }

    pub fn is_refractory(&self) -> bool {
        self.state == NeuronState::Refractory
    }

    /// Whether the most recent update ran membrane integration
    pub fn integrated(&self) -> bool {
        self.integrated
    }

    /// Bind an incoming connection to the next free slot, round-robin over dendrites
    ///
    /// Returns `false` when every slot is already bound.
    pub fn bind_incoming(
        &mut self,
        pre_id: NeuronId,
        weight: f64,
        inhibitory_source: bool,
    ) -> bool {
        let count = self.dendrites.len();
        for offset in 0..count {
            let index = (self.next_dendrite + offset) % count;
            if let Some(slot) = self.dendrites[index].free_slot() {
                slot.bind(pre_id, self.id, weight, inhibitory_source);
                self.next_dendrite = (index + 1) % count;
                return true;
            }
        }
        false
    }

    /// Deliver this step's presynaptic spikes to every dendrite
    pub fn deliver_spikes(&mut self, fired: &[bool], time: f64) -> usize {
        self.dendrites
            .iter_mut()
            .map(|d| d.deliver_spikes(fired, time))
            .sum()
    }

    pub fn dendrites(&self) -> &[Dendrite] {
        &self.dendrites
    }

    pub fn dendrites_mut(&mut self) -> &mut [Dendrite] {
        &mut self.dendrites
    }

    pub fn synapses(&self) -> impl Iterator<Item = &Synapse> {
        self.dendrites.iter().flat_map(|d| d.synapses().iter())
    }

    pub fn synapses_mut(&mut self) -> impl Iterator<Item = &mut Synapse> {
        self.dendrites
            .iter_mut()
            .flat_map(|d| d.synapses_mut().iter_mut())
    }

    /// Number of slots bound to a realised connection
    pub fn bound_synapse_count(&self) -> usize {
        self.synapses().filter(|s| s.is_bound()).count()
    }

    /// Total slot capacity across all dendrites
    pub fn synapse_capacity(&self) -> usize {
        self.dendrites.iter().map(Dendrite::num_synapses).sum()
    }
}
