// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0
//! End-to-end properties of constructed and running networks.

use neurosim_npu_neural::NeuronId;
use neurosim_npu_plasticity::{compute_stdp_delta, PlasticityParams};
use neurosim_npu_step_engine::{
    CancellationToken, DriveParams, MechanismSchedule, Network, NetworkConfig, NullPublisher,
    SimulationParams, SimulationRunner,
};

fn config(
    num_pyramidal: usize,
    num_inhibitory: usize,
    connection_rate: f64,
    seed: u64,
) -> NetworkConfig {
    NetworkConfig {
        num_pyramidal,
        num_inhibitory,
        connection_rate,
        seed,
        ..Default::default()
    }
}

#[test]
fn test_small_network_rates_stay_finite_and_bounded() {
    let dt = 0.0001;
    let cfg = NetworkConfig {
        dt,
        ..config(10, 2, 0.1, 1234)
    };
    let mut network = Network::new(cfg, SimulationParams::default()).unwrap();

    for _ in 0..1_000 {
        network.step();
        for rate in [network.population_freq_p(), network.population_freq_i()] {
            assert!(rate.is_finite());
            assert!(rate >= 0.0);
            assert!(rate < 1.0 / dt);
        }
    }
    assert_eq!(network.step_count(), 1_000);
}

#[test]
fn test_connection_rate_concentrates() {
    let network = Network::new(config(400, 100, 0.3, 99), SimulationParams::default()).unwrap();
    let fraction = network.connections().edge_fraction();
    assert!((fraction - 0.3).abs() < 0.05, "edge fraction {}", fraction);
}

#[test]
fn test_no_self_loops_for_any_size() {
    for (p, i) in [(1, 1), (3, 2), (50, 10), (400, 105)] {
        let network = Network::new(config(p, i, 1.0, 5), SimulationParams::default()).unwrap();
        let matrix = network.connections();
        for n in 0..(p + i) {
            assert!(!matrix.is_connected(NeuronId(n as u32), NeuronId(n as u32)));
        }
    }
}

#[test]
fn test_capacity_is_enforced() {
    let err = Network::new(config(500, 6, 0.1, 1), SimulationParams::default())
        .err()
        .unwrap();
    assert!(err.is_configuration_error());
}

#[test]
fn test_refractory_exclusivity_in_network() {
    let mut params = SimulationParams::default();
    params.drive.mean = 50.0;
    params.schedule = MechanismSchedule::disabled();
    let mut network = Network::new(config(8, 2, 0.2, 3), params).unwrap();
    let dt = network.config().dt;

    let mut last_spike_step: Vec<Option<u64>> = vec![None; 10];
    let mut spikes_seen = 0;
    for _ in 0..2_000 {
        network.step();
        let step = network.step_count();
        for (index, neuron) in network.neurons().enumerate() {
            if neuron.last_spike_time == 0.0 {
                spikes_seen += 1;
                if let Some(previous) = last_spike_step[index] {
                    let min_gap = (neuron.params.refractory_period / dt).round() as u64 + 1;
                    assert!(step - previous >= min_gap);
                }
                last_spike_step[index] = Some(step);
            }
        }
    }
    assert!(spikes_seen > 0);
}

#[test]
fn test_mechanisms_keep_state_bounded() {
    let mut params = SimulationParams::default();
    params.drive.mean = 5.0;
    params.schedule.slow_update_interval = 10;
    let mut network = Network::new(config(40, 10, 0.2, 11), params).unwrap();

    for step in 0..3_000 {
        network.step();
        if step % 500 == 0 {
            network.deliver_reward(1.5);
        }
    }
    for neuron in network.neurons() {
        assert!(neuron.membrane_potential.is_finite());
        assert!((0.0..=5.0).contains(&neuron.adaptation_current));
        assert!(neuron.energy >= 0.0);
        for synapse in neuron.synapses() {
            assert!((0.0..=5.0).contains(&synapse.weight()));
            assert!((0.0..=2.0).contains(&synapse.meta_plasticity()));
        }
        for dendrite in neuron.dendrites() {
            assert!((0.5..=2.0).contains(&dendrite.coupling_strength));
        }
    }
}

#[test]
fn test_run_full_simulation_time() {
    let cfg = NetworkConfig {
        simulation_time: 10.0,
        ..config(20, 5, 0.1, 8)
    };
    let steps = cfg.total_steps();
    let mut network = Network::new(cfg, SimulationParams::default()).unwrap();
    let summary = SimulationRunner::new(10)
        .run(&mut network, steps, &CancellationToken::new(), &mut NullPublisher)
        .unwrap();
    assert_eq!(summary.completed_steps, 100);
    assert!((summary.final_snapshot.time - 10.0).abs() < 1e-9);
}

/// One pyramidal (0) and one inhibitory (1) neuron wired both ways, silent
/// drive, STDP as the only mechanism.
fn stdp_pair() -> Network {
    let params = SimulationParams {
        drive: DriveParams::silent(),
        schedule: MechanismSchedule {
            plasticity: true,
            homeostasis: false,
            neuromodulation: false,
            slow_update_interval: 1_000_000,
        },
        ..SimulationParams::default()
    };
    Network::new(config(1, 1, 1.0, 17), params).unwrap()
}

/// Weight of the 0 -> 1 synapse held by neuron 1
fn forward_weight(network: &Network) -> f64 {
    network
        .neuron(NeuronId(1))
        .unwrap()
        .synapses()
        .find(|s| s.pre_id() == Some(NeuronId(0)))
        .map(|s| s.weight())
        .unwrap()
}

/// Push a neuron far above threshold so it fires on the next step
fn force_spike(network: &mut Network, id: u32) {
    network.neuron_mut(NeuronId(id)).unwrap().membrane_potential = 0.0;
}

/// Step once with the given neurons forced, then `gap` silent steps
fn spike_then_wait(network: &mut Network, ids: &[u32], gap: usize) {
    for &id in ids {
        force_spike(network, id);
    }
    let spikes = network.step();
    assert_eq!(spikes.total(), ids.len());
    for _ in 0..gap {
        assert_eq!(network.step().total(), 0);
    }
}

#[test]
fn test_network_stdp_pre_then_post_potentiates() {
    let mut network = stdp_pair();
    let before = forward_weight(&network);

    spike_then_wait(&mut network, &[0], 49);
    assert_eq!(forward_weight(&network), before, "a lone spike must not change the weight");
    spike_then_wait(&mut network, &[1], 0);

    let after = forward_weight(&network);
    let params = PlasticityParams::default();
    let expected = compute_stdp_delta(5.0, &params) * params.learning_rate;
    assert!(after > before, "{} -> {}", before, after);
    assert!(((after - before) - expected).abs() < 1e-6, "change {}", after - before);
}

#[test]
fn test_network_stdp_post_then_pre_depresses() {
    let mut network = stdp_pair();
    let before = forward_weight(&network);

    spike_then_wait(&mut network, &[1], 49);
    spike_then_wait(&mut network, &[0], 0);

    let after = forward_weight(&network);
    let params = PlasticityParams::default();
    let expected = compute_stdp_delta(-5.0, &params) * params.learning_rate;
    assert!(after < before, "{} -> {}", before, after);
    assert!(((after - before) - expected).abs() < 1e-6, "change {}", after - before);
}

#[test]
fn test_network_stdp_coincident_spikes_leave_weight() {
    let mut network = stdp_pair();
    let before = forward_weight(&network);

    spike_then_wait(&mut network, &[0, 1], 10);

    assert_eq!(forward_weight(&network), before);
}
