// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Step loop with cancellation and periodic state publishing
//!
//! The runner owns no simulation state. It steps a borrowed [`Network`],
//! checks the [`CancellationToken`] between completed steps and hands
//! snapshots to a [`StatePublisher`]. The final state is always published,
//! including after an interruption.

use crate::cancellation::CancellationToken;
use crate::error::{EngineError, Result};
use crate::network::Network;
use crate::snapshot::{NetworkSnapshot, NeuronSnapshot};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Sink for simulation state (file writer, test recorder, ...)
///
/// Implementations format and persist; the core never does.
pub trait StatePublisher: Send {
    /// Receive population-level state
    fn publish_state(&mut self, snapshot: &NetworkSnapshot) -> std::result::Result<(), String>;

    /// Receive per-neuron state. Only called when [`Self::wants_neuron_snapshots`] is true.
    fn publish_neurons(
        &mut self,
        _time: f64,
        _neurons: &[NeuronSnapshot],
    ) -> std::result::Result<(), String> {
        Ok(())
    }

    fn wants_neuron_snapshots(&self) -> bool {
        false
    }

    /// Called once when the run ends
    fn flush(&mut self) -> std::result::Result<(), String> {
        Ok(())
    }
}

/// Publisher that discards everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NullPublisher;

impl StatePublisher for NullPublisher {
    fn publish_state(&mut self, _snapshot: &NetworkSnapshot) -> std::result::Result<(), String> {
        Ok(())
    }
}

/// Outcome of [`SimulationRunner::run`]
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub requested_steps: u64,
    pub completed_steps: u64,
    pub interrupted: bool,
    pub publications: u64,
    pub total_spikes: u64,
    pub wall_time: Duration,
    pub final_snapshot: NetworkSnapshot,
}

/// Drives a network for a fixed number of steps
#[derive(Debug, Clone)]
pub struct SimulationRunner {
    save_interval: u64,
}

impl Default for SimulationRunner {
    fn default() -> Self {
        Self { save_interval: 1 }
    }
}

impl SimulationRunner {
    /// Publish every `save_interval` steps (0 is treated as 1)
    pub fn new(save_interval: u64) -> Self {
        Self {
            save_interval: save_interval.max(1),
        }
    }

    pub fn save_interval(&self) -> u64 {
        self.save_interval
    }

    pub fn run(
        &self,
        network: &mut Network,
        steps: u64,
        cancel: &CancellationToken,
        publisher: &mut dyn StatePublisher,
    ) -> Result<RunSummary> {
        let started = Instant::now();
        let progress_every = (steps / 10).max(1);
        let mut completed: u64 = 0;
        let mut publications: u64 = 0;
        let mut total_spikes: u64 = 0;
        let mut published_last = false;
        let mut interrupted = false;

        info!(
            "[RUNNER] Starting run: {} steps of {} ms, publishing every {} steps",
            steps,
            network.config().dt,
            self.save_interval
        );

        while completed < steps {
            if cancel.is_cancelled() {
                interrupted = true;
                warn!(
                    "[RUNNER] Interrupted after {}/{} steps (t={:.3} ms)",
                    completed,
                    steps,
                    network.time()
                );
                break;
            }

            let spikes = network.step();
            completed += 1;
            total_spikes += spikes.total() as u64;
            published_last = false;

            if completed % self.save_interval == 0 {
                network.save_state(network.time(), publisher)?;
                publications += 1;
                published_last = true;
            }

            if completed % progress_every == 0 {
                info!(
                    "[RUNNER] {:>3}% t={:.1} ms rate_p={:.4} rate_i={:.4}",
                    completed * 100 / steps,
                    network.time(),
                    network.population_freq_p(),
                    network.population_freq_i()
                );
            }
        }

        if !published_last {
            network.save_state(network.time(), publisher)?;
            publications += 1;
        }
        publisher.flush().map_err(EngineError::Publish)?;

        let wall_time = started.elapsed();
        debug!(
            "[RUNNER] {} steps in {:.3}s ({} spikes, {} publications)",
            completed,
            wall_time.as_secs_f64(),
            total_spikes,
            publications
        );

        Ok(RunSummary {
            requested_steps: steps,
            completed_steps: completed,
            interrupted,
            publications,
            total_spikes,
            wall_time,
            final_snapshot: network.snapshot(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{NetworkConfig, SimulationParams};

    #[derive(Default)]
    struct Recorder {
        states: Vec<NetworkSnapshot>,
        neuron_batches: usize,
        flushed: bool,
        neurons: bool,
    }

    impl StatePublisher for Recorder {
        fn publish_state(&mut self, snapshot: &NetworkSnapshot) -> std::result::Result<(), String> {
            self.states.push(*snapshot);
            Ok(())
        }

        fn publish_neurons(
            &mut self,
            _time: f64,
            neurons: &[NeuronSnapshot],
        ) -> std::result::Result<(), String> {
            assert_eq!(neurons.len(), 6);
            self.neuron_batches += 1;
            Ok(())
        }

        fn wants_neuron_snapshots(&self) -> bool {
            self.neurons
        }

        fn flush(&mut self) -> std::result::Result<(), String> {
            self.flushed = true;
            Ok(())
        }
    }

    struct Failing;

    impl StatePublisher for Failing {
        fn publish_state(&mut self, _: &NetworkSnapshot) -> std::result::Result<(), String> {
            Err("disk full".to_string())
        }
    }

    fn network() -> Network {
        let config = NetworkConfig {
            num_pyramidal: 4,
            num_inhibitory: 2,
            dendrites_per_neuron: 1,
            synapses_per_dendrite: 4,
            ..Default::default()
        };
        Network::new(config, SimulationParams::default()).unwrap()
    }

    #[test]
    fn test_publishes_on_interval_and_final() {
        let mut net = network();
        let mut recorder = Recorder::default();
        let summary = SimulationRunner::new(4)
            .run(&mut net, 10, &CancellationToken::new(), &mut recorder)
            .unwrap();

        assert_eq!(summary.completed_steps, 10);
        assert!(!summary.interrupted);
        let steps: Vec<u64> = recorder.states.iter().map(|s| s.step).collect();
        assert_eq!(steps, vec![4, 8, 10]);
        assert_eq!(summary.publications, 3);
        assert!(recorder.flushed);
    }

    #[test]
    fn test_no_duplicate_final_publication() {
        let mut net = network();
        let mut recorder = Recorder::default();
        SimulationRunner::new(5)
            .run(&mut net, 10, &CancellationToken::new(), &mut recorder)
            .unwrap();
        assert_eq!(recorder.states.len(), 2);
    }

    #[test]
    fn test_cancelled_run_still_publishes_final_state() {
        let mut net = network();
        let mut recorder = Recorder::default();
        let token = CancellationToken::new();
        token.cancel();

        let summary = SimulationRunner::new(1)
            .run(&mut net, 100, &token, &mut recorder)
            .unwrap();
        assert!(summary.interrupted);
        assert_eq!(summary.completed_steps, 0);
        assert_eq!(recorder.states.len(), 1);
        assert_eq!(recorder.states[0].step, 0);
    }

    #[test]
    fn test_neuron_snapshots_on_request() {
        let mut net = network();
        let mut recorder = Recorder {
            neurons: true,
            ..Default::default()
        };
        SimulationRunner::new(2)
            .run(&mut net, 4, &CancellationToken::new(), &mut recorder)
            .unwrap();
        assert_eq!(recorder.neuron_batches, 2);
    }

    #[test]
    fn test_publisher_failure_propagates() {
        let mut net = network();
        let err = SimulationRunner::new(1)
            .run(&mut net, 3, &CancellationToken::new(), &mut Failing)
            .unwrap_err();
        assert!(matches!(err, EngineError::Publish(msg) if msg == "disk full"));
    }
}
