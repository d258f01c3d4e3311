// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Dense logical connectivity over all neurons
//!
//! `matrix[[pre, post]] == true` means a directed edge `pre → post` is
//! permitted. The diagonal is always false. The matrix is written once at
//! construction and only read afterwards.

use ndarray::Array2;
use neurosim_npu_neural::{try_alloc, NeuronId, RandomSource, Result, SimError};

#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionMatrix {
    edges: Array2<bool>,
}

impl ConnectionMatrix {
    /// All-false matrix over `size` neurons
    pub fn empty(size: usize) -> Result<Self> {
        let cells = size.checked_mul(size).ok_or_else(|| {
            SimError::MemoryAllocation(format!("connection matrix {}x{} overflows", size, size))
        })?;
        let mut storage = try_alloc(cells, "connection matrix")?;
        storage.resize(cells, false);
        let edges = Array2::from_shape_vec((size, size), storage)
            .map_err(|e| SimError::MemoryAllocation(format!("connection matrix shape: {}", e)))?;
        Ok(Self { edges })
    }

    /// Independent Bernoulli(`rate`) edge for every ordered pair `i ≠ j`
    pub fn random(size: usize, rate: f64, rng: &mut dyn RandomSource) -> Result<Self> {
        let mut matrix = Self::empty(size)?;
        for pre in 0..size {
            for post in 0..size {
                if pre != post && rng.draw_uniform() < rate {
                    matrix.edges[[pre, post]] = true;
                }
            }
        }
        Ok(matrix)
    }

    /// Permit `pre → post`. Self-loops are ignored.
    pub fn connect(&mut self, pre: NeuronId, post: NeuronId) {
        if pre != post {
            if let Some(cell) = self.edges.get_mut([pre.index(), post.index()]) {
                *cell = true;
            }
        }
    }

    pub fn is_connected(&self, pre: NeuronId, post: NeuronId) -> bool {
        self.edges
            .get([pre.index(), post.index()])
            .copied()
            .unwrap_or(false)
    }

    /// Number of neurons on each side
    pub fn size(&self) -> usize {
        self.edges.nrows()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.iter().filter(|&&e| e).count()
    }

    /// Realised edges over the `n·(n − 1)` possible ones
    pub fn edge_fraction(&self) -> f64 {
        let n = self.size();
        if n < 2 {
            return 0.0;
        }
        self.edge_count() as f64 / (n * (n - 1)) as f64
    }

    /// Presynaptic partners of `post`, in ascending id order
    pub fn presynaptic(&self, post: NeuronId) -> impl Iterator<Item = NeuronId> + '_ {
        (0..self.size())
            .filter(move |&pre| self.is_connected(NeuronId(pre as u32), post))
            .map(|pre| NeuronId(pre as u32))
    }

    pub fn has_self_loops(&self) -> bool {
        self.edges.diag().iter().any(|&e| e)
    }
}
