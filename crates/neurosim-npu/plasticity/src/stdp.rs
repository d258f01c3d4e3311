// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Pairwise spike-timing-dependent plasticity
//!
//! ```text
//! Δt = t_post − t_pre
//! Δw = +A+·exp(−Δt/W)     0 < Δt < W    (causal, potentiation)
//! Δw = −A−·exp(+Δt/W)    −W < Δt < 0    (acausal, depression)
//! Δw = 0                  otherwise, including Δt = 0
//! ```
//! The raw change is scaled by the synapse's metaplastic gain and the
//! learning rate before it is applied.

use crate::params::PlasticityParams;
use neurosim_npu_neural::Synapse;

/// Raw STDP kernel for a spike-time difference `post − pre`
///
/// # Example
/// ```
/// use neurosim_npu_plasticity::{compute_stdp_delta, PlasticityParams};
///
/// let params = PlasticityParams::default();
/// assert!(compute_stdp_delta(5.0, &params) > 0.0);
/// assert!(compute_stdp_delta(-5.0, &params) < 0.0);
/// assert_eq!(compute_stdp_delta(0.0, &params), 0.0);
/// assert_eq!(compute_stdp_delta(25.0, &params), 0.0); // Outside window
/// ```
#[inline]
pub fn compute_stdp_delta(delta_t: f64, params: &PlasticityParams) -> f64 {
    if delta_t == 0.0 || !(delta_t.abs() < params.stdp_window) {
        return 0.0;
    }
    if delta_t > 0.0 {
        params.stdp_potentiation * (-delta_t / params.stdp_window).exp()
    } else {
        -params.stdp_depression * (delta_t / params.stdp_window).exp()
    }
}

/// Apply STDP for one pre/post spike pairing
///
/// Spike times are absolute (ms). Returns the weight change requested of the
/// synapse (before clamping).
pub fn stdp(
    synapse: &mut Synapse,
    pre_last_spike: f64,
    post_last_spike: f64,
    params: &PlasticityParams,
) -> f64 {
    let raw = compute_stdp_delta(post_last_spike - pre_last_spike, params);
    if raw == 0.0 {
        return 0.0;
    }
    let delta_w = raw * synapse.meta_plasticity() * params.learning_rate;
    synapse.apply_weight_change(delta_w);
    delta_w
}

#[cfg(test)]
mod tests {
    use super::*;

    fn synapse() -> Synapse {
        Synapse::new(None, None, 1.0)
    }

    #[test]
    fn test_causal_pairing_potentiates() {
        let params = PlasticityParams::default();
        let mut syn = synapse();
        let dw = stdp(&mut syn, 10.0, 15.0, &params);
        assert!(dw > 0.0);
        assert!(syn.weight() > 1.0);
    }

    #[test]
    fn test_acausal_pairing_depresses() {
        let params = PlasticityParams::default();
        let mut syn = synapse();
        let dw = stdp(&mut syn, 15.0, 10.0, &params);
        assert!(dw < 0.0);
        assert!(syn.weight() < 1.0);
    }

    #[test]
    fn test_simultaneous_spikes_are_a_no_op() {
        let params = PlasticityParams::default();
        let mut syn = synapse();
        assert_eq!(stdp(&mut syn, 12.0, 12.0, &params), 0.0);
        assert_eq!(syn.weight(), 1.0);
        assert_eq!(syn.meta_plasticity(), 1.0);
    }

    #[test]
    fn test_window_edge_is_excluded() {
        let params = PlasticityParams::default();
        assert_eq!(compute_stdp_delta(params.stdp_window, &params), 0.0);
        assert_eq!(compute_stdp_delta(-params.stdp_window, &params), 0.0);
    }

    #[test]
    fn test_meta_gain_scales_change() {
        let params = PlasticityParams::default();
        let mut plain = synapse();
        let mut boosted = synapse();
        boosted.set_meta_plasticity(2.0);
        let a = stdp(&mut plain, 10.0, 15.0, &params);
        let b = stdp(&mut boosted, 10.0, 15.0, &params);
        assert!((b - 2.0 * a).abs() < 1e-12);
    }

    #[test]
    fn test_kernel_decays_with_distance() {
        let params = PlasticityParams::default();
        assert!(compute_stdp_delta(1.0, &params) > compute_stdp_delta(10.0, &params));
        assert!(compute_stdp_delta(-1.0, &params) < compute_stdp_delta(-10.0, &params));
    }
}
