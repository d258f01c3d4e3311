// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Step-engine error type

use neurosim_npu_neural::SimError;

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Construction or state-access failure from the numerical core
    #[error(transparent)]
    Sim(#[from] SimError),

    /// The state publisher rejected a snapshot
    #[error("State publisher failed: {0}")]
    Publish(String),
}

impl EngineError {
    pub fn is_configuration_error(&self) -> bool {
        matches!(self, EngineError::Sim(e) if e.is_configuration_error())
    }

    pub fn is_resource_error(&self) -> bool {
        matches!(self, EngineError::Sim(e) if e.is_resource_error())
    }
}

pub type Result<T> = core::result::Result<T, EngineError>;
