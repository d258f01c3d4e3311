// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Seeded random source
//!
//! The core only needs two primitives, a uniform draw on `[0, 1)` and a normal
//! draw; exponential and Poisson draws are available for sparse event timing.
//! Distributions come from `rand_distr`.
//! All draws are made on the coordinating thread so that a fixed seed yields an
//! identical run regardless of how many worker threads rayon uses.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Exp, Normal, Poisson};

/// Random-number capability consumed by network construction and drive.
pub trait RandomSource: Send {
    /// Uniform draw on `[0, 1)`
    fn draw_uniform(&mut self) -> f64;

    /// Normal draw with the given mean and standard deviation
    fn draw_normal(&mut self, mean: f64, std: f64) -> f64;

    /// Exponential draw with rate `lambda`
    fn draw_exponential(&mut self, lambda: f64) -> f64;

    /// Poisson draw with mean `lambda`
    fn draw_poisson(&mut self, lambda: f64) -> u32;
}

/// [`RandomSource`] backed by `StdRng`, seeded from a single integer
#[derive(Debug, Clone)]
pub struct SeededRandom {
    rng: StdRng,
    seed: u64,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            seed,
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl RandomSource for SeededRandom {
    #[inline]
    fn draw_uniform(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }

    /// A negative or non-finite `std` degenerates to `mean`
    fn draw_normal(&mut self, mean: f64, std: f64) -> f64 {
        match Normal::new(mean, std) {
            Ok(normal) => normal.sample(&mut self.rng),
            Err(_) => mean,
        }
    }

    /// A non-positive or non-finite rate never fires: `f64::INFINITY`
    fn draw_exponential(&mut self, lambda: f64) -> f64 {
        if !(lambda > 0.0) {
            return f64::INFINITY;
        }
        match Exp::new(lambda) {
            Ok(exp) => exp.sample(&mut self.rng),
            Err(_) => f64::INFINITY,
        }
    }

    /// A non-positive or non-finite mean yields 0
    fn draw_poisson(&mut self, lambda: f64) -> u32 {
        match Poisson::new(lambda) {
            Ok(poisson) => {
                let count: f64 = poisson.sample(&mut self.rng);
                count as u32
            }
            Err(_) => 0,
        }
    }
}
