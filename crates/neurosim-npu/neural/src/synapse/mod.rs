// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Synapse
//!
//! A single directed, weighted, plastic connection `pre_id → post_id`.
//!
//! ```text
//! decay:           trace       ← trace·(1 − dt/τ_trace)        τ_trace = 20 ms
//!                  conductance ← conductance·(1 − dt/τ_syn)    τ_syn   = 5 ms
//! weight change:   weight      ← clamp(weight + Δw, 0, 5)
//!                  meta        ← clamp(meta·(1 + 0.1·Δw), 0, 2)
//! ```
//!
//! Fields are private so the weight and metaplasticity bounds hold after every
//! mutation. A synapse lives exactly as long as the dendrite that owns it.

pub mod weight;

pub use weight::*;

use crate::dynamics::euler_decay_factor;
use crate::random::RandomSource;
use crate::types::NeuronId;
use serde::{Deserialize, Serialize};

/// Trace time constant (ms)
pub const TAU_TRACE_MS: f64 = 20.0;
/// Synaptic conductance time constant (ms)
pub const TAU_SYN_MS: f64 = 5.0;
/// Conductance and trace added per presynaptic spike
pub const SPIKE_INCREMENT: f64 = 1.0;

/// Directed plastic connection between two neurons
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Synapse {
    pre_id: Option<NeuronId>,
    post_id: Option<NeuronId>,
    weight: f64,
    conductance: f64,
    trace: f64,
    meta_plasticity: f64,
    active: bool,
    last_update_time: f64,
    /// +1 for excitatory sources, -1 for inhibitory sources
    polarity: f64,
}

impl Synapse {
    /// Create an active synapse with an explicit initial weight
    pub fn new(pre_id: Option<NeuronId>, post_id: Option<NeuronId>, weight: f64) -> Self {
        Self {
            pre_id,
            post_id,
            weight: clamp_weight(weight),
            conductance: 0.0,
            trace: 0.0,
            meta_plasticity: 1.0,
            active: true,
            last_update_time: 0.0,
            polarity: 1.0,
        }
    }

    /// Create an active synapse with a small positive random weight
    ///
    /// # Example
    /// ```
    /// use neurosim_npu_neural::{NeuronId, SeededRandom, Synapse};
    ///
    /// let mut rng = SeededRandom::new(1);
    /// let syn = Synapse::create(Some(NeuronId(0)), Some(NeuronId(1)), &mut rng);
    /// assert!(syn.weight() >= 0.0 && syn.weight() < 0.1);
    /// assert_eq!(syn.meta_plasticity(), 1.0);
    /// assert!(syn.is_active());
    /// ```
    pub fn create(
        pre_id: Option<NeuronId>,
        post_id: Option<NeuronId>,
        rng: &mut dyn RandomSource,
    ) -> Self {
        Self::new(pre_id, post_id, INITIAL_WEIGHT_SCALE * rng.draw_uniform())
    }

    /// Empty pool slot: unbound and inactive
    pub fn unbound() -> Self {
        Self {
            active: false,
            weight: 0.0,
            ..Self::new(None, None, 0.0)
        }
    }

    /// Bind a pool slot to a realised connection and activate it
    pub fn bind(
        &mut self,
        pre_id: NeuronId,
        post_id: NeuronId,
        weight: f64,
        inhibitory_source: bool,
    ) {
        self.pre_id = Some(pre_id);
        self.post_id = Some(post_id);
        self.weight = clamp_weight(weight);
        self.conductance = 0.0;
        self.trace = 0.0;
        self.meta_plasticity = 1.0;
        self.active = true;
        self.polarity = if inhibitory_source { -1.0 } else { 1.0 };
    }

    /// Exponential decay of trace and conductance (explicit Euler)
    #[inline]
    pub fn decay(&mut self, dt: f64) {
        self.trace *= euler_decay_factor(dt, TAU_TRACE_MS);
        self.conductance *= euler_decay_factor(dt, TAU_SYN_MS);
    }

    /// Apply a weight change and feed it back into the metaplastic gain
    ///
    /// # Example
    /// ```
    /// use neurosim_npu_neural::Synapse;
    ///
    /// let mut syn = Synapse::new(None, None, 4.9);
    /// syn.apply_weight_change(1.0);
    /// assert_eq!(syn.weight(), 5.0); // Clamped
    /// assert!((syn.meta_plasticity() - 1.1).abs() < 1e-12);
    /// ```
    pub fn apply_weight_change(&mut self, delta_w: f64) {
        self.weight = clamp_weight(self.weight + delta_w);
        self.meta_plasticity = clamp_meta(self.meta_plasticity * (1.0 + META_FEEDBACK * delta_w));
    }

    /// Multiply the weight by `factor`, reclamped to `[0, 5]`
    #[inline]
    pub fn scale_weight(&mut self, factor: f64) {
        self.weight = clamp_weight(self.weight * factor);
    }

    pub fn set_weight(&mut self, weight: f64) {
        self.weight = clamp_weight(weight);
    }

    pub fn set_meta_plasticity(&mut self, meta: f64) {
        self.meta_plasticity = clamp_meta(meta);
    }

    /// Multiply the metaplastic gain by `factor`, reclamped to `[0, 2]`
    #[inline]
    pub fn scale_meta_plasticity(&mut self, factor: f64) {
        self.meta_plasticity = clamp_meta(self.meta_plasticity * factor);
    }

    pub fn set_conductance(&mut self, conductance: f64) {
        self.conductance = conductance.max(0.0);
    }

    /// Multiply the conductance by a non-negative factor
    #[inline]
    pub fn scale_conductance(&mut self, factor: f64) {
        self.conductance = (self.conductance * factor.max(0.0)).max(0.0);
    }

    pub fn set_trace(&mut self, trace: f64) {
        self.trace = trace.max(0.0);
    }

    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    /// Register a presynaptic spike arriving at `time`
    #[inline]
    pub fn on_presynaptic_spike(&mut self, time: f64) {
        self.conductance += SPIKE_INCREMENT;
        self.trace += SPIKE_INCREMENT;
        self.last_update_time = time;
    }

    /// Record that plasticity touched this synapse at `time`
    #[inline]
    pub fn mark_updated(&mut self, time: f64) {
        self.last_update_time = time;
    }

    /// Signed drive `polarity · weight · conductance`, zero when inactive
    #[inline]
    pub fn contribution(&self) -> f64 {
        if self.active {
            self.polarity * self.weight * self.conductance
        } else {
            0.0
        }
    }

    pub fn pre_id(&self) -> Option<NeuronId> {
        self.pre_id
    }

    pub fn post_id(&self) -> Option<NeuronId> {
        self.post_id
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn conductance(&self) -> f64 {
        self.conductance
    }

    pub fn trace(&self) -> f64 {
        self.trace
    }

    pub fn meta_plasticity(&self) -> f64 {
        self.meta_plasticity
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Bound to a realised connection (both endpoints set)
    pub fn is_bound(&self) -> bool {
        self.pre_id.is_some() && self.post_id.is_some()
    }

    pub fn last_update_time(&self) -> f64 {
        self.last_update_time
    }

    pub fn polarity(&self) -> f64 {
        self.polarity
    }
}

impl Default for Synapse {
    fn default() -> Self {
        Self::unbound()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::SeededRandom;
    use proptest::prelude::*;

    #[test]
    fn test_create_initial_state() {
        let mut rng = SeededRandom::new(3);
        let syn = Synapse::create(Some(NeuronId(2)), Some(NeuronId(5)), &mut rng);
        assert_eq!(syn.pre_id(), Some(NeuronId(2)));
        assert_eq!(syn.post_id(), Some(NeuronId(5)));
        assert!(syn.weight() >= 0.0 && syn.weight() < INITIAL_WEIGHT_SCALE);
        assert_eq!(syn.conductance(), 0.0);
        assert_eq!(syn.trace(), 0.0);
        assert_eq!(syn.meta_plasticity(), 1.0);
        assert!(syn.is_active());
        assert_eq!(syn.polarity(), 1.0);
    }

    #[test]
    fn test_unbound_slot_is_inactive() {
        let syn = Synapse::unbound();
        assert!(!syn.is_active());
        assert!(!syn.is_bound());
        assert_eq!(syn.contribution(), 0.0);
    }

    #[test]
    fn test_decay_time_constants() {
        let mut syn = Synapse::new(None, None, 1.0);
        syn.set_trace(1.0);
        syn.set_conductance(1.0);
        syn.decay(1.0);
        assert!((syn.trace() - (1.0 - 1.0 / TAU_TRACE_MS)).abs() < 1e-12);
        assert!((syn.conductance() - (1.0 - 1.0 / TAU_SYN_MS)).abs() < 1e-12);
    }

    #[test]
    fn test_presynaptic_spike_drives_contribution() {
        let mut syn = Synapse::new(Some(NeuronId(0)), Some(NeuronId(1)), 2.0);
        assert_eq!(syn.contribution(), 0.0);
        syn.on_presynaptic_spike(3.5);
        assert_eq!(syn.contribution(), 2.0);
        assert_eq!(syn.last_update_time(), 3.5);
    }

    #[test]
    fn test_inhibitory_binding_flips_sign() {
        let mut syn = Synapse::unbound();
        syn.bind(NeuronId(9), NeuronId(1), 1.5, true);
        syn.on_presynaptic_spike(0.0);
        assert!(syn.is_active());
        assert_eq!(syn.contribution(), -1.5);
    }

    #[test]
    fn test_weight_change_depression_shrinks_meta() {
        let mut syn = Synapse::new(None, None, 1.0);
        syn.apply_weight_change(-0.5);
        assert_eq!(syn.weight(), 0.5);
        assert!((syn.meta_plasticity() - 0.95).abs() < 1e-12);
    }

    proptest! {
        #[test]
        fn prop_weight_and_meta_stay_bounded(
            initial in -10.0f64..10.0,
            deltas in proptest::collection::vec(-20.0f64..20.0, 0..64),
        ) {
            let mut syn = Synapse::new(None, None, initial);
            for dw in deltas {
                syn.apply_weight_change(dw);
                prop_assert!(syn.weight() >= WEIGHT_MIN && syn.weight() <= WEIGHT_MAX);
                prop_assert!((META_MIN..=META_MAX).contains(&syn.meta_plasticity()));
            }
        }
    }
}
