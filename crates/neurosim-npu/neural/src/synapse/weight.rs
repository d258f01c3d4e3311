// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Synaptic weight and metaplasticity bounds
//!
//! Pure functions for clamping plastic state.

/// Lower weight bound
pub const WEIGHT_MIN: f64 = 0.0;
/// Upper weight bound
pub const WEIGHT_MAX: f64 = 5.0;
/// Lower metaplastic gain bound
pub const META_MIN: f64 = 0.0;
/// Upper metaplastic gain bound
pub const META_MAX: f64 = 2.0;
/// Initial weights are drawn from `[0, INITIAL_WEIGHT_SCALE)`
pub const INITIAL_WEIGHT_SCALE: f64 = 0.1;
/// How strongly a weight change feeds back into the metaplastic gain
pub const META_FEEDBACK: f64 = 0.1;

/// Clamp a weight into `[0, 5]`
///
/// # Example
/// ```
/// use neurosim_npu_neural::synapse::clamp_weight;
///
/// assert_eq!(clamp_weight(2.5), 2.5);
/// assert_eq!(clamp_weight(7.0), 5.0);
/// assert_eq!(clamp_weight(-1.0), 0.0);
/// ```
#[inline]
pub fn clamp_weight(weight: f64) -> f64 {
    clamp_finite(weight, WEIGHT_MIN, WEIGHT_MAX)
}

/// Clamp a metaplastic gain into `[0, 2]`
#[inline]
pub fn clamp_meta(meta: f64) -> f64 {
    clamp_finite(meta, META_MIN, META_MAX)
}

/// `f64::clamp` passes NaN through; bounded state maps NaN to the lower bound.
#[inline]
fn clamp_finite(value: f64, min: f64, max: f64) -> f64 {
    if value.is_nan() {
        min
    } else {
        value.clamp(min, max)
    }
}
