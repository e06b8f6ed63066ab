use rand::Rng;
use rand_distr::{Distribution, Uniform};

use super::ParamGen;
use crate::{NnErr, Result};

/// A parameter generator that follows a certain probabilistic distribution.
pub struct RandParamGen<'r, R: Rng, D: Distribution<f64>> {
    rng: &'r mut R,
    distribution: D,
    remaining: usize,
}

impl<'r, R: Rng, D: Distribution<f64>> RandParamGen<'r, R, D> {
    /// Creates a new `RandParamGen` generator.
    ///
    /// # Arguments
    /// * `rng` - A random number generator.
    /// * `distribution` - The distribution to sample the random numbers from.
    /// * `limit` - The maximum amount of numbers to generate.
    pub fn new(rng: &'r mut R, distribution: D, limit: usize) -> Self {
        Self {
            rng,
            distribution,
            remaining: limit,
        }
    }
}

impl<'r, R: Rng> RandParamGen<'r, R, Uniform<f64>> {
    /// Creates a new `RandParamGen` generator with an inclusive uniform distribution.
    ///
    /// # Arguments
    /// * `rng` - A random number generator.
    /// * `limit` - The maximum amount of numbers to generate.
    /// * `low` - The inclusive lower limit.
    /// * `high` - The inclusive upper limit.
    ///
    /// # Returns
    /// An error if the range is invalid (low > high).
    pub fn uniform(rng: &'r mut R, limit: usize, low: f64, high: f64) -> Result<Self> {
        let distribution =
            Uniform::new_inclusive(low, high).map_err(|e| NnErr::Init(e.to_string()))?;

        Ok(Self::new(rng, distribution, limit))
    }

    /// Creates a new `RandParamGen` generator using Xavier uniform initialization, that is,
    /// sampling from `[-sqrt(6 / (fan_in + fan_out)), sqrt(6 / (fan_in + fan_out))]`.
    ///
    /// # Arguments
    /// * `rng` - A random number generator.
    /// * `limit` - The maximum amount of numbers to generate.
    /// * `fan_in` - The width of the layer feeding the transition.
    /// * `fan_out` - The width of the layer fed by the transition.
    ///
    /// # Returns
    /// An error if the calculated range is invalid.
    pub fn xavier_uniform(
        rng: &'r mut R,
        limit: usize,
        fan_in: usize,
        fan_out: usize,
    ) -> Result<Self> {
        let range = (6. / (fan_in + fan_out) as f64).sqrt();
        Self::uniform(rng, limit, -range, range)
    }
}

impl<R: Rng, D: Distribution<f64>> ParamGen for RandParamGen<'_, R, D> {
    fn sample(&mut self, mut n: usize) -> Option<Vec<f64>> {
        if self.remaining == 0 {
            return None;
        }

        n = n.min(self.remaining);
        self.remaining -= n;

        let sample = (0..n)
            .map(|_| self.distribution.sample(&mut *self.rng))
            .collect();

        Some(sample)
    }
}
