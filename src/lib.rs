// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # neurosim - spiking cortical network simulator
//!
//! A network of pyramidal (excitatory) and inhibitory leaky integrate-and-fire
//! neurons with dendritic compartments, conductance-based synapses, STDP,
//! homeostatic regulation and neuromodulation.
//!
//! ## Feature Flags
//!
//! - **`engine`** (default): [`Network`](step_engine::Network), runner, cancellation
//! - **`config`** (default): TOML loading with environment and CLI overrides
//! - **`observability`** (default): `tracing` setup and per-crate debug flags
//!
//! ## Usage
//!
//! ```rust,no_run
//! use neurosim::prelude::*;
//!
//! let config = NetworkConfig {
//!     simulation_time: 100.0,
//!     ..NetworkConfig::default()
//! };
//! let steps = config.total_steps();
//! let mut network = Network::new(config, SimulationParams::default())?;
//!
//! let summary = SimulationRunner::new(100).run(
//!     &mut network,
//!     steps,
//!     &CancellationToken::new(),
//!     &mut NullPublisher,
//! )?;
//! println!("{} spikes", summary.total_spikes);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Architecture
//!
//! ```text
//! neural       Synapse, Dendrite, Neuron, ids, errors, random source
//!    ↓
//! plasticity   STDP, metaplasticity, consolidation, homeostasis, neuromodulation
//!    ↓
//! step-engine  Network, connectivity, per-step protocol, runner
//!    ↓
//! config / observability / simulator
//! ```

pub use neurosim_npu_neural as neural;
pub use neurosim_npu_plasticity as plasticity;

#[cfg(feature = "engine")]
pub use neurosim_npu_step_engine as step_engine;

#[cfg(feature = "config")]
pub use neurosim_config as config;

#[cfg(feature = "observability")]
pub use neurosim_observability as observability;

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude - commonly used types and traits
pub mod prelude {
    pub use crate::neural::{
        Dendrite, Neuromodulators, Neuron, NeuronId, NeuronParams, NeuronState, Population,
        RandomSource, SeededRandom, SimError, Synapse,
    };
    pub use crate::plasticity::{HomeostasisParams, NeuromodulationParams, PlasticityParams};

    #[cfg(feature = "engine")]
    pub use crate::step_engine::{
        CancellationToken, DriveParams, MechanismSchedule, Network, NetworkConfig,
        NetworkSnapshot, NullPublisher, RunSummary, SimulationParams, SimulationRunner,
        StatePublisher,
    };

    #[cfg(feature = "config")]
    pub use crate::config::{load_config, load_config_or_default, SimulationConfig};
}
