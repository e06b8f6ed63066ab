use ndarray::{Array1, ArrayView1};

use super::LossFn;

/// Mean squared error loss function.
///
/// The sample cost is the mean of `(y - y_pred)^2` over the output elements, while the
/// derivative is taken per element as `2 * (y_pred - y)`, without the `1 / n` factor.
#[derive(Default, Clone, Copy, Debug)]
pub struct Mse;

impl Mse {
    /// Returns a new `Mse`.
    pub fn new() -> Self {
        Self
    }
}

impl LossFn for Mse {
    fn loss(&self, y_pred: ArrayView1<f64>, y: ArrayView1<f64>) -> f64 {
        (&y - &y_pred)
            .mapv(|x| x.powi(2))
            .mean()
            .unwrap_or_default()
    }

    fn loss_prime(&self, y_pred: ArrayView1<f64>, y: ArrayView1<f64>) -> Array1<f64> {
        (&y_pred - &y) * 2.
    }
}
