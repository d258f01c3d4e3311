// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Core type definitions shared by every neurosim crate.

pub mod error;
pub mod ids;

pub use error::{try_alloc, Result, SimError};
pub use ids::{NeuronId, Population};
