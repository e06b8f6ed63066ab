use serde::{Deserialize, Serialize};

use crate::{
    NnErr, Result,
    arch::{activations::ActFn, loss::LossKind},
};

/// The architecture of a network. A network never outlives a change of its config,
/// a new one has to be built instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkConfig {
    pub layer_sizes: Vec<usize>,
    #[serde(default)]
    pub activation: ActFn,
    #[serde(default)]
    pub loss: LossKind,
}

impl NetworkConfig {
    /// Creates a new `NetworkConfig` using the mean squared error.
    ///
    /// # Arguments
    /// * `layer_sizes` - The width of every layer, input and output included.
    /// * `activation` - The activation used on the hidden layers.
    pub fn new<S>(layer_sizes: S, activation: ActFn) -> Self
    where
        S: Into<Vec<usize>>,
    {
        Self {
            layer_sizes: layer_sizes.into(),
            activation,
            loss: LossKind::Mse,
        }
    }

    /// Checks there are at least two layers and none of them is empty.
    pub fn validate(&self) -> Result<()> {
        if self.layer_sizes.len() < 2 || self.layer_sizes.contains(&0) {
            return Err(NnErr::InvalidLayerSizes {
                sizes: self.layer_sizes.clone(),
            });
        }

        Ok(())
    }

    pub fn input_size(&self) -> usize {
        self.layer_sizes.first().copied().unwrap_or_default()
    }

    pub fn output_size(&self) -> usize {
        self.layer_sizes.last().copied().unwrap_or_default()
    }

    /// Returns the amount of weight/bias pairs connecting the layers.
    pub fn transitions(&self) -> usize {
        self.layer_sizes.len().saturating_sub(1)
    }
}
