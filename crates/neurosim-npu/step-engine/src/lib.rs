// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Neurosim Step Engine
//!
//! Owns a network of pyramidal and inhibitory neurons and advances it in
//! fixed steps of `dt` milliseconds.
//!
//! ## Architecture
//! - [`Network`]: populations, connection matrix, per-step protocol
//! - [`ConnectionMatrix`]: dense permitted-edge relation (no self-loops)
//! - [`SimulationRunner`]: step loop, cancellation, periodic publishing
//! - [`StatePublisher`]: where snapshots go (files, tests, ...)
//!
//! ## Concurrency
//! Integration runs as a rayon fork-join pass per population with spike
//! counts accumulated atomically. Mechanism passes run after that barrier,
//! one at a time, each parallel over postsynaptic neurons. All random draws
//! happen on the calling thread, so a seed fixes the run.

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod cancellation;
pub mod config;
pub mod connectivity;
pub mod error;
pub mod network;
pub mod runner;
pub mod snapshot;

pub use cancellation::CancellationToken;
pub use config::{DriveParams, MechanismSchedule, NetworkConfig, SimulationParams, MAX_NEURONS};
pub use connectivity::ConnectionMatrix;
pub use error::{EngineError, Result};
pub use network::Network;
pub use runner::{NullPublisher, RunSummary, SimulationRunner, StatePublisher};
pub use snapshot::{NetworkSnapshot, NetworkStats, NeuronSnapshot, StepSpikes};
