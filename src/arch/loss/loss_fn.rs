use ndarray::{Array1, ArrayView1};
use serde::{Deserialize, Serialize};

use super::Mse;

pub trait LossFn {
    /// The cost of a single sample.
    fn loss(&self, y_pred: ArrayView1<f64>, y: ArrayView1<f64>) -> f64;

    /// The derivative of the element-wise cost with respect to each predicted element.
    fn loss_prime(&self, y_pred: ArrayView1<f64>, y: ArrayView1<f64>) -> Array1<f64>;
}

/// The configurable cost functions, only the mean squared error exists for now.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LossKind {
    #[default]
    Mse,
}

impl LossFn for LossKind {
    fn loss(&self, y_pred: ArrayView1<f64>, y: ArrayView1<f64>) -> f64 {
        match self {
            LossKind::Mse => Mse.loss(y_pred, y),
        }
    }

    fn loss_prime(&self, y_pred: ArrayView1<f64>, y: ArrayView1<f64>) -> Array1<f64> {
        match self {
            LossKind::Mse => Mse.loss_prime(y_pred, y),
        }
    }
}
