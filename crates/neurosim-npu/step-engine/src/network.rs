// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Network
//!
//! Owns the pyramidal and inhibitory populations, the connection matrix and
//! the population rate estimators, and drives the per-step protocol:
//!
//! ```text
//! 1. draw background drive               (serial, coordinating thread)
//! 2. integrate + check_spike             (parallel per population, atomic spike count)
//!    ── barrier ──
//! 3. snapshot fired flags / spike times  (serial)
//! 4. spike delivery                      (parallel over postsynaptic neurons)
//! 5. STDP                                (parallel, reads snapshot)
//! 6. neuromodulation + attention         (parallel)
//! 7. homeostasis                         (parallel)
//! 8. every `slow_update_interval` steps:
//!    synaptic scaling → metaplasticity → modulatory gain → consolidation
//! 9. population rate estimators
//! ```
//! Passes run one after another. Each pass only mutates the postsynaptic
//! neuron it is handed and reads other neurons through the step-3 snapshot,
//! so no pass observes a partially updated neighbour.

use crate::config::{NetworkConfig, SimulationParams};
use crate::connectivity::ConnectionMatrix;
use crate::error::Result;
use crate::snapshot::{NetworkSnapshot, NetworkStats, NeuronSnapshot, StepSpikes};
use crate::runner::StatePublisher;
use crate::EngineError;
use neurosim_npu_neural::synapse::INITIAL_WEIGHT_SCALE;
use neurosim_npu_neural::{
    try_alloc, Neuromodulators, Neuron, NeuronId, NeuronParams, RandomSource, SeededRandom,
    SimError,
};
use neurosim_npu_plasticity::{
    apply_homeostasis, consolidate, homeostatic_plasticity, learning_gain, modulate_plasticity,
    process_reward, stdp, update_attention, update_meta_plasticity, update_neuromodulators,
};
use rayon::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, info, warn};

pub struct Network {
    config: NetworkConfig,
    params: SimulationParams,
    pyramidal: Vec<Neuron>,
    inhibitory: Vec<Neuron>,
    connections: ConnectionMatrix,
    population_freq_p: f64,
    population_freq_i: f64,
    time: f64,
    step_count: u64,
    last_spikes: StepSpikes,
    unrealized_edges: usize,
    conserving_neurons: usize,
    rng: Box<dyn RandomSource>,
    // Per-step scratch, indexed by neuron id
    drive: Vec<f64>,
    fired: Vec<bool>,
    spike_times: Vec<f64>,
}

impl Network {
    /// Build a network seeded from `config.seed`
    pub fn new(config: NetworkConfig, params: SimulationParams) -> Result<Self> {
        let rng = Box::new(SeededRandom::new(config.seed));
        Self::with_random(config, params, rng)
    }

    /// Build a network drawing from a caller-supplied random source
    pub fn with_random(
        config: NetworkConfig,
        params: SimulationParams,
        mut rng: Box<dyn RandomSource>,
    ) -> Result<Self> {
        config.validate()?;
        params.validate()?;

        let total = config.total_neurons();
        let pyramidal = build_population(
            &config,
            &params,
            &params.pyramidal,
            0,
            config.num_pyramidal,
            false,
            rng.as_mut(),
        )?;
        let inhibitory = build_population(
            &config,
            &params,
            &params.inhibitory,
            config.num_pyramidal,
            config.num_inhibitory,
            true,
            rng.as_mut(),
        )?;

        let connections = ConnectionMatrix::random(total, config.connection_rate, rng.as_mut())?;

        let mut network = Self {
            drive: zeroed(total, "drive buffer")?,
            fired: zeroed(total, "spike buffer")?,
            spike_times: zeroed(total, "spike time buffer")?,
            config,
            params,
            pyramidal,
            inhibitory,
            connections,
            population_freq_p: 0.0,
            population_freq_i: 0.0,
            time: 0.0,
            step_count: 0,
            last_spikes: StepSpikes::default(),
            unrealized_edges: 0,
            conserving_neurons: 0,
            rng,
        };
        network.bind_synapses();

        let stats = network.stats();
        info!(
            "[NETWORK] Built {} pyramidal + {} inhibitory neurons, {} edges (fraction {:.4}), {}/{} synapse slots bound",
            stats.num_pyramidal,
            stats.num_inhibitory,
            stats.permitted_edges,
            stats.edge_fraction,
            stats.bound_synapses,
            stats.synapse_slots
        );
        if network.unrealized_edges > 0 {
            warn!(
                "[NETWORK] {} permitted edges exceed the synapse pool ({} dendrites x {} synapses per neuron) and stay unrealised",
                network.unrealized_edges,
                network.config.dendrites_per_neuron,
                network.config.synapses_per_dendrite
            );
        }
        Ok(network)
    }

    /// Bind every permitted incoming edge to a synapse slot of its target
    fn bind_synapses(&mut self) {
        let num_pyramidal = self.config.num_pyramidal;
        let total = self.config.total_neurons();
        let mut unrealized = 0;
        for post in 0..total {
            let post_id = NeuronId(post as u32);
            let partners: Vec<NeuronId> = self.connections.presynaptic(post_id).collect();
            for pre in partners {
                let weight = INITIAL_WEIGHT_SCALE * self.rng.draw_uniform();
                let inhibitory_source = pre.index() >= num_pyramidal;
                let neuron = if post < num_pyramidal {
                    &mut self.pyramidal[post]
                } else {
                    &mut self.inhibitory[post - num_pyramidal]
                };
                if !neuron.bind_incoming(pre, weight, inhibitory_source) {
                    unrealized += 1;
                }
            }
        }
        self.unrealized_edges = unrealized;
    }

    /// Advance one step of `dt`
    pub fn step(&mut self) -> StepSpikes {
        let time = self.time + self.config.dt;
        self.update(time)
    }

    /// Run the full per-step protocol, stamping spikes at `time`
    pub fn update(&mut self, time: f64) -> StepSpikes {
        let dt = self.config.dt;
        let num_pyramidal = self.config.num_pyramidal;

        let drive = self.params.drive;
        for current in self.drive.iter_mut() {
            *current = self.rng.draw_normal(drive.mean, drive.std);
        }

        let spikes_p = AtomicUsize::new(0);
        let spikes_i = AtomicUsize::new(0);
        let (drive_p, drive_i) = self.drive.split_at(num_pyramidal);
        integrate_population(&mut self.pyramidal, drive_p, dt, &spikes_p);
        integrate_population(&mut self.inhibitory, drive_i, dt, &spikes_i);
        let spikes = StepSpikes {
            pyramidal: spikes_p.into_inner(),
            inhibitory: spikes_i.into_inner(),
        };

        for (index, neuron) in self.pyramidal.iter().chain(self.inhibitory.iter()).enumerate() {
            self.fired[index] = neuron.spiked_within(dt);
            self.spike_times[index] = neuron.last_spike_at(time);
        }

        self.step_count += 1;
        self.run_mechanisms(time);

        let decay = (1.0 - dt).max(0.0);
        let rate_p = spikes.pyramidal as f64 / self.config.num_pyramidal as f64;
        let rate_i = spikes.inhibitory as f64 / self.config.num_inhibitory as f64;
        self.population_freq_p = self.population_freq_p * decay + rate_p;
        self.population_freq_i = self.population_freq_i * decay + rate_i;

        self.time = time;
        self.last_spikes = spikes;
        spikes
    }

    fn run_mechanisms(&mut self, time: f64) {
        let dt = self.config.dt;
        let schedule = self.params.schedule;
        let plasticity = self.params.plasticity;
        let modulation = self.params.neuromodulation;
        let homeostasis = self.params.homeostasis;
        let fired = self.fired.as_slice();
        let spike_times = self.spike_times.as_slice();

        // Spike delivery
        self.pyramidal
            .par_iter_mut()
            .chain(self.inhibitory.par_iter_mut())
            .for_each(|neuron| {
                neuron.deliver_spikes(fired, time);
            });

        if schedule.plasticity {
            self.pyramidal
                .par_iter_mut()
                .chain(self.inhibitory.par_iter_mut())
                .for_each(|neuron| {
                    let post_fired = neuron.spiked_within(dt);
                    let post_time = neuron.last_spike_at(time);
                    let gain = if schedule.neuromodulation {
                        learning_gain(&neuron.modulators, &modulation)
                    } else {
                        1.0
                    };
                    let params = plasticity.with_learning_gain(gain);
                    for synapse in neuron.synapses_mut().filter(|s| s.is_active()) {
                        let Some(pre) = synapse.pre_id() else {
                            continue;
                        };
                        let pre_fired = fired.get(pre.index()).copied().unwrap_or(false);
                        if !(pre_fired || post_fired) {
                            continue;
                        }
                        let pre_time = spike_times[pre.index()];
                        if stdp(synapse, pre_time, post_time, &params) != 0.0 {
                            synapse.mark_updated(time);
                        }
                    }
                });
        }

        if schedule.neuromodulation {
            self.pyramidal
                .par_iter_mut()
                .chain(self.inhibitory.par_iter_mut())
                .for_each(|neuron| {
                    update_neuromodulators(neuron, &modulation, dt);
                    update_attention(neuron, &modulation);
                });
        }

        if schedule.homeostasis {
            self.conserving_neurons = self
                .pyramidal
                .par_iter_mut()
                .chain(self.inhibitory.par_iter_mut())
                .map(|neuron| apply_homeostasis(neuron, &homeostasis, dt) as usize)
                .sum();
        }

        if self.step_count % schedule.slow_update_interval == 0 {
            debug!(
                "[PLASTICITY] Slow update at step {} (t={:.3} ms)",
                self.step_count, time
            );
            self.pyramidal
                .par_iter_mut()
                .chain(self.inhibitory.par_iter_mut())
                .for_each(|neuron| {
                    if schedule.plasticity {
                        homeostatic_plasticity(neuron, &plasticity);
                    }
                    let modulators = neuron.modulators;
                    for synapse in neuron.synapses_mut().filter(|s| s.is_active()) {
                        if schedule.plasticity {
                            update_meta_plasticity(synapse, &plasticity);
                        }
                        if schedule.neuromodulation {
                            modulate_plasticity(synapse, &modulators);
                        }
                        if schedule.plasticity {
                            consolidate(synapse, &plasticity);
                        }
                    }
                });
        }
    }

    /// Apply a scalar reward to every neuron, returning the mean prediction error
    pub fn deliver_reward(&mut self, reward: f64) -> f64 {
        let modulation = self.params.neuromodulation;
        let total_error: f64 = self
            .pyramidal
            .par_iter_mut()
            .chain(self.inhibitory.par_iter_mut())
            .map(|neuron| process_reward(neuron, &modulation, reward))
            .sum();
        let mean_error = total_error / self.config.total_neurons() as f64;
        debug!(
            "[NETWORK] Reward {:.3} delivered at t={:.3} ms, mean prediction error {:.4}",
            reward, self.time, mean_error
        );
        mean_error
    }

    /// Population-level snapshot of the current state
    pub fn snapshot(&self) -> NetworkSnapshot {
        NetworkSnapshot {
            step: self.step_count,
            time: self.time,
            population_freq_p: self.population_freq_p,
            population_freq_i: self.population_freq_i,
            spikes_p: self.last_spikes.pyramidal,
            spikes_i: self.last_spikes.inhibitory,
        }
    }

    /// Per-neuron snapshots in id order
    pub fn neuron_snapshots(&self) -> Vec<NeuronSnapshot> {
        self.neurons().map(NeuronSnapshot::capture).collect()
    }

    /// Hand the current state to a publisher, stamped with `time`
    pub fn save_state(&self, time: f64, publisher: &mut dyn StatePublisher) -> Result<()> {
        let snapshot = NetworkSnapshot {
            time,
            ..self.snapshot()
        };
        publisher
            .publish_state(&snapshot)
            .map_err(EngineError::Publish)?;
        if publisher.wants_neuron_snapshots() {
            publisher
                .publish_neurons(time, &self.neuron_snapshots())
                .map_err(EngineError::Publish)?;
        }
        Ok(())
    }

    pub fn stats(&self) -> NetworkStats {
        let mut synapse_slots = 0;
        let mut bound_synapses = 0;
        let mut weight_sum = 0.0;
        for neuron in self.neurons() {
            synapse_slots += neuron.synapse_capacity();
            for synapse in neuron.synapses().filter(|s| s.is_bound()) {
                bound_synapses += 1;
                weight_sum += synapse.weight();
            }
        }
        NetworkStats {
            num_pyramidal: self.pyramidal.len(),
            num_inhibitory: self.inhibitory.len(),
            synapse_slots,
            bound_synapses,
            permitted_edges: self.connections.edge_count(),
            edge_fraction: self.connections.edge_fraction(),
            unrealized_edges: self.unrealized_edges,
            mean_weight: if bound_synapses == 0 {
                0.0
            } else {
                weight_sum / bound_synapses as f64
            },
        }
    }

    pub fn neuron(&self, id: NeuronId) -> Result<&Neuron> {
        let index = id.index();
        let num_pyramidal = self.pyramidal.len();
        let neuron = if index < num_pyramidal {
            self.pyramidal.get(index)
        } else {
            self.inhibitory.get(index - num_pyramidal)
        };
        neuron.ok_or(EngineError::Sim(SimError::NeuronNotFound(id)))
    }

    pub fn neuron_mut(&mut self, id: NeuronId) -> Result<&mut Neuron> {
        let index = id.index();
        let num_pyramidal = self.pyramidal.len();
        let neuron = if index < num_pyramidal {
            self.pyramidal.get_mut(index)
        } else {
            self.inhibitory.get_mut(index - num_pyramidal)
        };
        neuron.ok_or(EngineError::Sim(SimError::NeuronNotFound(id)))
    }

    /// All neurons in id order
    pub fn neurons(&self) -> impl Iterator<Item = &Neuron> {
        self.pyramidal.iter().chain(self.inhibitory.iter())
    }

    pub fn pyramidal(&self) -> &[Neuron] {
        &self.pyramidal
    }

    pub fn inhibitory(&self) -> &[Neuron] {
        &self.inhibitory
    }

    pub fn connections(&self) -> &ConnectionMatrix {
        &self.connections
    }

    pub fn config(&self) -> &NetworkConfig {
        &self.config
    }

    pub fn params(&self) -> &SimulationParams {
        &self.params
    }

    /// Simulated time of the last completed step (ms)
    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn step_count(&self) -> u64 {
        self.step_count
    }

    pub fn population_freq_p(&self) -> f64 {
        self.population_freq_p
    }

    pub fn population_freq_i(&self) -> f64 {
        self.population_freq_i
    }

    pub fn last_spikes(&self) -> StepSpikes {
        self.last_spikes
    }

    /// Neurons in the energy-conservation regime after the last homeostasis pass
    pub fn conserving_neurons(&self) -> usize {
        self.conserving_neurons
    }
}

fn integrate_population(neurons: &mut [Neuron], drive: &[f64], dt: f64, spikes: &AtomicUsize) {
    neurons
        .par_iter_mut()
        .zip(drive.par_iter())
        .for_each(|(neuron, &current)| {
            neuron.update_with_input(dt, current);
            if neuron.check_spike() {
                spikes.fetch_add(1, Ordering::Relaxed);
            }
        });
}

fn build_population(
    config: &NetworkConfig,
    params: &SimulationParams,
    neuron_params: &NeuronParams,
    first_id: usize,
    count: usize,
    inhibitory: bool,
    rng: &mut dyn RandomSource,
) -> neurosim_npu_neural::Result<Vec<Neuron>> {
    let label = if inhibitory { "inhibitory population" } else { "pyramidal population" };
    let mut neurons = try_alloc(count, label)?;
    let modulation = &params.neuromodulation;
    for offset in 0..count {
        let mut neuron = Neuron::new(
            NeuronId((first_id + offset) as u32),
            *neuron_params,
            inhibitory,
            config.dendrites_per_neuron,
            config.synapses_per_dendrite,
        )?;
        neuron.membrane_potential = neuron_params.v_resting + rng.draw_normal(0.0, 1.0);
        neuron.energy = params.homeostasis.energy_baseline;
        neuron.modulators = Neuromodulators {
            dopamine: modulation.baseline_dopamine,
            serotonin: modulation.baseline_serotonin,
            noradrenaline: modulation.baseline_noradrenaline,
            acetylcholine: modulation.baseline_acetylcholine,
        };
        neurons.push(neuron);
    }
    Ok(neurons)
}

fn zeroed<T: Default + Clone>(len: usize, what: &str) -> neurosim_npu_neural::Result<Vec<T>> {
    let mut buffer = try_alloc(len, what)?;
    buffer.resize(len, T::default());
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DriveParams, MechanismSchedule};

    fn small_config() -> NetworkConfig {
        NetworkConfig {
            num_pyramidal: 10,
            num_inhibitory: 2,
            dt: 0.1,
            connection_rate: 0.3,
            dendrites_per_neuron: 2,
            synapses_per_dendrite: 4,
            seed: 7,
            ..Default::default()
        }
    }

    #[test]
    fn test_construction_binds_edges() {
        let network = Network::new(small_config(), SimulationParams::default()).unwrap();
        let stats = network.stats();
        assert_eq!(stats.num_pyramidal, 10);
        assert_eq!(stats.num_inhibitory, 2);
        assert_eq!(stats.synapse_slots, 12 * 8);
        assert_eq!(stats.bound_synapses + stats.unrealized_edges, stats.permitted_edges);
        assert!(stats.mean_weight < INITIAL_WEIGHT_SCALE);
        assert!(!network.connections().has_self_loops());
    }

    #[test]
    fn test_bound_synapses_match_matrix() {
        let network = Network::new(small_config(), SimulationParams::default()).unwrap();
        for neuron in network.neurons() {
            for synapse in neuron.synapses().filter(|s| s.is_bound()) {
                let pre = synapse.pre_id().unwrap();
                assert_eq!(synapse.post_id(), Some(neuron.id));
                assert!(network.connections().is_connected(pre, neuron.id));
                let expected = if pre.index() >= 10 { -1.0 } else { 1.0 };
                assert_eq!(synapse.polarity(), expected);
            }
        }
    }

    #[test]
    fn test_configuration_errors_are_reported() {
        let config = NetworkConfig {
            num_pyramidal: 0,
            ..small_config()
        };
        let err = Network::new(config, SimulationParams::default()).err().unwrap();
        assert!(err.is_configuration_error());

        let config = NetworkConfig {
            dt: 0.0,
            ..small_config()
        };
        assert!(Network::new(config, SimulationParams::default()).is_err());
    }

    #[test]
    fn test_same_seed_same_run() {
        let run = || {
            let mut network = Network::new(small_config(), SimulationParams::default()).unwrap();
            let spikes: Vec<usize> = (0..300).map(|_| network.step().total()).collect();
            (spikes, network.population_freq_p(), network.neuron_snapshots())
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn test_time_and_step_advance() {
        let mut network = Network::new(small_config(), SimulationParams::default()).unwrap();
        network.step();
        network.step();
        assert_eq!(network.step_count(), 2);
        assert!((network.time() - 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_silent_network_rates_stay_zero() {
        let mut params = SimulationParams::default();
        params.drive = DriveParams::silent();
        params.schedule = MechanismSchedule::disabled();
        let mut network = Network::new(small_config(), params).unwrap();
        for neuron in network.pyramidal.iter_mut().chain(network.inhibitory.iter_mut()) {
            neuron.membrane_potential = neuron.params.v_resting;
        }
        for _ in 0..100 {
            assert_eq!(network.step().total(), 0);
        }
        assert_eq!(network.population_freq_p(), 0.0);
        assert_eq!(network.population_freq_i(), 0.0);
    }

    #[test]
    fn test_population_rate_leaky_integration() {
        let mut network = Network::new(small_config(), SimulationParams::default()).unwrap();
        for neuron in network.pyramidal.iter_mut() {
            neuron.membrane_potential = 100.0;
        }
        let spikes = network.step();
        assert_eq!(spikes.pyramidal, 10);
        assert!((network.population_freq_p() - 1.0).abs() < 1e-12);

        let before = network.population_freq_p();
        let spikes = network.step();
        assert_eq!(spikes.pyramidal, 0);
        assert!((network.population_freq_p() - before * 0.9).abs() < 1e-12);
    }

    #[test]
    fn test_reward_moves_dopamine() {
        let mut network = Network::new(small_config(), SimulationParams::default()).unwrap();
        let error = network.deliver_reward(2.0);
        assert!((error - 1.0).abs() < 1e-12);
        assert!(network.neurons().all(|n| n.modulators.dopamine > 1.0));
    }

    #[test]
    fn test_neuron_lookup() {
        let network = Network::new(small_config(), SimulationParams::default()).unwrap();
        assert!(network.neuron(NeuronId(11)).unwrap().is_inhibitory);
        assert!(!network.neuron(NeuronId(0)).unwrap().is_inhibitory);
        assert!(matches!(
            network.neuron(NeuronId(12)),
            Err(EngineError::Sim(SimError::NeuronNotFound(NeuronId(12))))
        ));
    }
}
