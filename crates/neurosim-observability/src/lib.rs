// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # neurosim-observability
//!
//! Logging setup shared by the simulator binaries, with per-crate debug
//! flag support.

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod cli;
pub mod init;

pub use cli::*;
pub use init::*;

/// Known neurosim crate names for debug flags
pub const KNOWN_CRATES: &[&str] = &[
    "neurosim-npu-neural",
    "neurosim-npu-plasticity",
    "neurosim-npu-step-engine",
    "neurosim-config",
    "neurosim-simulator",
];

/// Tracing target for a crate name (`neurosim-npu-neural` -> `neurosim_npu_neural`)
pub fn crate_target(crate_name: &str) -> String {
    crate_name.replace('-', "_")
}
