// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Shared integration primitives
//!
//! Every decaying quantity in the simulator follows `dx/dt = -x/τ`. The
//! explicit-Euler step is `x ← x·(1 − dt/τ)`, which is only accurate while
//! `dt ≪ τ`; the factor is floored at zero so an oversized step collapses the
//! quantity instead of flipping its sign.

/// Explicit-Euler decay factor `max(0, 1 − dt/τ)`
///
/// # Example
/// ```
/// use neurosim_npu_neural::euler_decay_factor;
///
/// assert!((euler_decay_factor(0.1, 20.0) - 0.995).abs() < 1e-12);
/// assert_eq!(euler_decay_factor(50.0, 20.0), 0.0); // Oversized step
/// ```
#[inline(always)]
pub fn euler_decay_factor(dt: f64, tau: f64) -> f64 {
    (1.0 - dt / tau).max(0.0)
}

/// Exact exponential relaxation of `level` toward `baseline`
///
/// `baseline + (level − baseline)·exp(−dt/τ)`
///
/// # Example
/// ```
/// use neurosim_npu_neural::relax_toward;
///
/// let level = relax_toward(2.0, 1.0, 1000.0, 1000.0);
/// assert!((level - (1.0 + (-1.0f64).exp())).abs() < 1e-12);
/// ```
#[inline(always)]
pub fn relax_toward(level: f64, baseline: f64, dt: f64, tau: f64) -> f64 {
    baseline + (level - baseline) * (-dt / tau).exp()
}

/// Logistic function, saturating at 1
#[inline(always)]
pub fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}
