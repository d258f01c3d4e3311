// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! File-backed state publisher
//!
//! `network_state.dat` is tab-separated with one row per publication:
//!
//! ```text
//! Time	PopFreqP	PopFreqI
//! 0.100000	0.020000	0.000000
//! ```
//!
//! With neuron snapshots enabled, `neurons.jsonl` receives one JSON object
//! per publication.

use neurosim_npu_step_engine::{NetworkSnapshot, NeuronSnapshot, StatePublisher};
use serde::Serialize;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

pub const STATE_FILE_NAME: &str = "network_state.dat";
pub const NEURON_FILE_NAME: &str = "neurons.jsonl";
pub const STATE_HEADER: &str = "Time\tPopFreqP\tPopFreqI";

#[derive(Serialize)]
struct NeuronRecord<'a> {
    time: f64,
    neurons: &'a [NeuronSnapshot],
}

/// Writes population rates (and optionally neuron states) under an output directory
pub struct TsvStateWriter {
    state: BufWriter<File>,
    neurons: Option<BufWriter<File>>,
    output_dir: PathBuf,
    rows: u64,
}

impl TsvStateWriter {
    /// Create the output directory and files, truncating earlier runs
    pub fn create(output_dir: &Path, neuron_snapshots: bool) -> io::Result<Self> {
        std::fs::create_dir_all(output_dir)?;
        let mut state = BufWriter::new(File::create(output_dir.join(STATE_FILE_NAME))?);
        writeln!(state, "{}", STATE_HEADER)?;

        let neurons = if neuron_snapshots {
            Some(BufWriter::new(File::create(output_dir.join(NEURON_FILE_NAME))?))
        } else {
            None
        };

        Ok(Self {
            state,
            neurons,
            output_dir: output_dir.to_path_buf(),
            rows: 0,
        })
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Rows written to `network_state.dat` so far (header excluded)
    pub fn rows(&self) -> u64 {
        self.rows
    }
}

impl StatePublisher for TsvStateWriter {
    fn publish_state(&mut self, snapshot: &NetworkSnapshot) -> Result<(), String> {
        writeln!(
            self.state,
            "{:.6}\t{:.6}\t{:.6}",
            snapshot.time, snapshot.population_freq_p, snapshot.population_freq_i
        )
        .map_err(|e| format!("Failed to write {}: {}", STATE_FILE_NAME, e))?;
        self.rows += 1;
        Ok(())
    }

    fn publish_neurons(&mut self, time: f64, neurons: &[NeuronSnapshot]) -> Result<(), String> {
        let Some(writer) = self.neurons.as_mut() else {
            return Ok(());
        };
        serde_json::to_writer(&mut *writer, &NeuronRecord { time, neurons })
            .map_err(|e| format!("Failed to serialize neuron snapshots: {}", e))?;
        writeln!(writer).map_err(|e| format!("Failed to write {}: {}", NEURON_FILE_NAME, e))
    }

    fn wants_neuron_snapshots(&self) -> bool {
        self.neurons.is_some()
    }

    fn flush(&mut self) -> Result<(), String> {
        self.state
            .flush()
            .map_err(|e| format!("Failed to flush {}: {}", STATE_FILE_NAME, e))?;
        if let Some(writer) = self.neurons.as_mut() {
            writer
                .flush()
                .map_err(|e| format!("Failed to flush {}: {}", NEURON_FILE_NAME, e))?;
        }
        Ok(())
    }
}
