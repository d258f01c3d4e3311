// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Identity types for neurons and populations

use core::fmt;
use serde::{Deserialize, Serialize};

/// Neuron ID (index into the network-wide neuron numbering)
///
/// Pyramidal neurons occupy `0..num_pyramidal`, inhibitory neurons follow
/// immediately after. The connection matrix is indexed with the same ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NeuronId(pub u32);

impl NeuronId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NeuronId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Neuron({})", self.0)
    }
}

/// The two neuron populations owned by a network
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Population {
    /// Excitatory pyramidal cells
    Pyramidal,
    /// Inhibitory interneurons
    Inhibitory,
}

impl Population {
    pub fn is_inhibitory(self) -> bool {
        matches!(self, Population::Inhibitory)
    }

    pub fn name(self) -> &'static str {
        match self {
            Population::Pyramidal => "pyramidal",
            Population::Inhibitory => "inhibitory",
        }
    }
}

impl fmt::Display for Population {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
