// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Neuromodulation
//!
//! Four per-neuron modulator levels, each bumped on a qualifying spike and
//! relaxing exponentially toward its baseline:
//!
//! | Modulator      | Bump | Qualifying spike | τ (ms) |
//! |----------------|------|------------------|--------|
//! | dopamine       | 0.10 | any              | 1000   |
//! | serotonin      | 0.05 | inhibitory only  | 2000   |
//! | noradrenaline  | 0.20 | any              | 500    |
//! | acetylcholine  | 0.15 | excitatory only  | 1500   |
//!
//! Levels feed back into the neuron through adaptation damping, the STDP
//! learning gain, metaplastic gain and dendritic coupling (attention).

use crate::params::NeuromodulationParams;
use neurosim_npu_neural::neuron::ADAPTATION_MAX;
use neurosim_npu_neural::{relax_toward, Neuromodulators, Neuron, Synapse};

pub const TAU_DOPAMINE_MS: f64 = 1000.0;
pub const TAU_SEROTONIN_MS: f64 = 2000.0;
pub const TAU_NORADRENALINE_MS: f64 = 500.0;
pub const TAU_ACETYLCHOLINE_MS: f64 = 1500.0;

const DOPAMINE_BUMP: f64 = 0.1;
const SEROTONIN_BUMP: f64 = 0.05;
const NORADRENALINE_BUMP: f64 = 0.2;
const ACETYLCHOLINE_BUMP: f64 = 0.15;

/// Levels never drop below this
pub const MODULATOR_FLOOR: f64 = 1e-6;
/// Dendritic coupling range under attention
pub const COUPLING_RANGE: (f64, f64) = (0.5, 2.0);

/// Spike bumps, relaxation toward baseline, then dopamine damping of adaptation
pub fn update_neuromodulators(neuron: &mut Neuron, params: &NeuromodulationParams, dt: f64) {
    let spiked = neuron.spiked_within(dt);
    let inhibitory = neuron.is_inhibitory;
    let m = &mut neuron.modulators;

    if spiked {
        m.dopamine += DOPAMINE_BUMP;
        m.noradrenaline += NORADRENALINE_BUMP;
        if inhibitory {
            m.serotonin += SEROTONIN_BUMP;
        } else {
            m.acetylcholine += ACETYLCHOLINE_BUMP;
        }
    }

    let rate = params.decay_rate;
    m.dopamine = floor(relax_toward(
        m.dopamine,
        params.baseline_dopamine,
        dt,
        TAU_DOPAMINE_MS / rate,
    ));
    m.serotonin =
        floor(relax_toward(m.serotonin, params.baseline_serotonin, dt, TAU_SEROTONIN_MS / rate));
    m.noradrenaline = floor(relax_toward(
        m.noradrenaline,
        params.baseline_noradrenaline,
        dt,
        TAU_NORADRENALINE_MS / rate,
    ));
    m.acetylcholine = floor(relax_toward(
        m.acetylcholine,
        params.baseline_acetylcholine,
        dt,
        TAU_ACETYLCHOLINE_MS / rate,
    ));

    let damping = (1.0 - params.dopamine_damping * m.dopamine * dt).clamp(0.0, 1.0);
    neuron.adaptation_current *= damping;
}

/// Apply a scalar reward, returning the reward-prediction error
///
/// ```text
/// rpe        = reward − dopamine
/// dopamine  += strength·rpe
/// serotonin += strength·rpe
/// noradr.   += 2·strength·|rpe|
/// adaptation ×= 0.9 if rpe > 0, 1.1 if rpe < 0
/// ```
pub fn process_reward(neuron: &mut Neuron, params: &NeuromodulationParams, reward: f64) -> f64 {
    let m = &mut neuron.modulators;
    let rpe = reward - m.dopamine;
    let strength = params.reward_strength;

    m.dopamine = floor(m.dopamine + strength * rpe);
    m.serotonin = floor(m.serotonin + strength * rpe);
    m.noradrenaline = floor(m.noradrenaline + 2.0 * strength * rpe.abs());

    let factor = if rpe > 0.0 {
        0.9
    } else if rpe < 0.0 {
        1.1
    } else {
        1.0
    };
    neuron.adaptation_current = (neuron.adaptation_current * factor).clamp(0.0, ADAPTATION_MAX);
    rpe
}

/// Scale the metaplastic gain by `(dopamine / acetylcholine)·sqrt(noradrenaline)`
#[inline]
pub fn modulate_plasticity(synapse: &mut Synapse, modulators: &Neuromodulators) {
    let factor = (modulators.dopamine / modulators.acetylcholine.max(MODULATOR_FLOOR))
        * modulators.noradrenaline.max(0.0).sqrt();
    synapse.scale_meta_plasticity(factor);
}

/// Dopamine gain on the STDP learning rate, `max(0, 1 + k·(DA − baseline))`
#[inline]
pub fn learning_gain(modulators: &Neuromodulators, params: &NeuromodulationParams) -> f64 {
    (1.0 + params.learning_modulation * (modulators.dopamine - params.baseline_dopamine)).max(0.0)
}

/// Couple acetylcholine/noradrenaline excess to dendritic coupling strength
pub fn update_attention(neuron: &mut Neuron, params: &NeuromodulationParams) {
    let m = neuron.modulators;
    let excess = (m.acetylcholine - params.baseline_acetylcholine)
        + (m.noradrenaline - params.baseline_noradrenaline);
    let coupling =
        (1.0 + params.attention_modulation * excess).clamp(COUPLING_RANGE.0, COUPLING_RANGE.1);
    for dendrite in neuron.dendrites_mut() {
        dendrite.coupling_strength = coupling;
    }
}

#[inline]
fn floor(level: f64) -> f64 {
    level.max(MODULATOR_FLOOR)
}
