// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Neurosim Neural State Models
//!
//! The data model every other neurosim crate operates on:
//! - **Types**: identifiers, populations and the error taxonomy
//! - **Synapse**: a single directed, weighted, plastic connection
//! - **Dendrite**: a fixed pool of synapses with calcium-gated NMDA dynamics
//! - **Neuron**: membrane integration, refractory state machine, spike detection
//! - **Random**: the seeded random source used at construction and for drive
//!
//! ## Ownership
//! ```text
//! Neuron ──owns──▶ [Dendrite; num_dendrites] ──owns──▶ [Synapse; num_synapses]
//! ```
//! Container lengths are fixed at construction. Mechanisms mutate state through
//! `&mut` borrows handed out by the network, never by taking ownership.
//!
//! All times and time constants are in milliseconds.

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod dendrite;
pub mod dynamics;
pub mod neuron;
pub mod random;
pub mod synapse;
pub mod types;

pub use dendrite::Dendrite;
pub use dynamics::{euler_decay_factor, relax_toward, sigmoid};
pub use neuron::{Neuromodulators, Neuron, NeuronParams, NeuronState};
pub use random::{RandomSource, SeededRandom};
pub use synapse::Synapse;
pub use types::{try_alloc, NeuronId, Population, Result, SimError};
