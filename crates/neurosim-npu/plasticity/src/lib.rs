// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Neurosim Plasticity Mechanisms
//!
//! Stateless, parameterised passes that mutate neuron and synapse state as a
//! function of spiking history:
//! - **STDP**: pairwise spike-timing-dependent weight change
//! - **Synaptic**: homeostatic weight scaling, metaplasticity, consolidation
//! - **Homeostasis**: calcium/rate set-point tracking and the energy budget
//! - **Neuromodulation**: dopamine, serotonin, noradrenaline, acetylcholine
//!
//! Mechanisms only ever receive `&mut` borrows. Scheduling, ordering and
//! parallelism are decided by the step engine.

pub mod homeostasis;
pub mod neuromodulation;
pub mod params;
pub mod stdp;
pub mod synaptic;

pub use homeostasis::{
    apply_homeostasis, manage_energy_resources, regulate_intrinsic_excitability,
    scale_synaptic_strengths, update_homeostasis,
};
pub use neuromodulation::{
    learning_gain, modulate_plasticity, process_reward, update_attention, update_neuromodulators,
};
pub use params::{HomeostasisParams, NeuromodulationParams, PlasticityParams};
pub use stdp::{compute_stdp_delta, stdp};
pub use synaptic::{consolidate, homeostatic_plasticity, update_meta_plasticity};
