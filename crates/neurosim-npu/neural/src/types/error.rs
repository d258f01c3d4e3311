// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Error types for simulation construction and state access
//!
//! Spike detection, refractory transitions and clamping are normal control
//! flow and never surface here.

use super::ids::{NeuronId, Population};

/// Errors raised by the numerical core
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SimError {
    /// A parameter is outside its documented range
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// A population was configured with zero neurons
    #[error("Population '{population}' must contain at least one neuron")]
    EmptyPopulation { population: Population },

    /// The network would exceed the fixed neuron capacity
    #[error("Capacity exceeded: requested {requested} neurons, capacity is {capacity}")]
    CapacityExceeded { requested: usize, capacity: usize },

    /// Storage for neurons, dendrites, synapses or connectivity could not be reserved
    #[error("Memory allocation error: {0}")]
    MemoryAllocation(String),

    #[error("Neuron not found: {0}")]
    NeuronNotFound(NeuronId),
}

impl SimError {
    /// Configuration errors are fatal for the requested network shape.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            SimError::InvalidConfiguration(_)
                | SimError::EmptyPopulation { .. }
                | SimError::CapacityExceeded { .. }
        )
    }

    /// Resource errors may succeed when retried with a smaller network.
    pub fn is_resource_error(&self) -> bool {
        matches!(self, SimError::MemoryAllocation(_))
    }
}

pub type Result<T> = core::result::Result<T, SimError>;

/// Allocate a vector with exactly `len` slots, reporting failure as a resource error.
pub fn try_alloc<T>(len: usize, what: &str) -> Result<Vec<T>> {
    let mut storage = Vec::new();
    storage.try_reserve_exact(len).map_err(|e| {
        SimError::MemoryAllocation(format!("{} ({} elements): {}", what, len, e))
    })?;
    Ok(storage)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classification() {
        assert!(SimError::InvalidConfiguration("dt".into()).is_configuration_error());
        assert!(SimError::EmptyPopulation {
            population: Population::Inhibitory
        }
        .is_configuration_error());
        assert!(SimError::CapacityExceeded {
            requested: 600,
            capacity: 505
        }
        .is_configuration_error());

        let alloc = SimError::MemoryAllocation("synapses".into());
        assert!(alloc.is_resource_error());
        assert!(!alloc.is_configuration_error());
    }

    #[test]
    fn test_error_display() {
        let err = SimError::EmptyPopulation {
            population: Population::Pyramidal,
        };
        assert_eq!(
            err.to_string(),
            "Population 'pyramidal' must contain at least one neuron"
        );
    }

    #[test]
    fn test_try_alloc_reserves_capacity() {
        let storage: Vec<u64> = try_alloc(16, "test").unwrap();
        assert!(storage.capacity() >= 16);
        assert!(storage.is_empty());
    }
}
