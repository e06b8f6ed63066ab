use std::num::NonZeroUsize;

use serde::{Deserialize, Serialize};

use crate::{NnErr, Result, gradient::GradientMethod};

const DEFAULT_STEPS: usize = 30;
const DEFAULT_LEARNING_RATE: f64 = 0.01;

/// The optimizers a user can pick. Every one of them updates parameters through plain
/// gradient descent, the label is kept for display purposes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptimizerKind {
    #[default]
    GradientDescent,
}

/// How a training run is carried out.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    pub steps: NonZeroUsize,
    pub learning_rate: f64,
    pub method: GradientMethod,
    pub optimizer: OptimizerKind,
}

impl TrainingConfig {
    /// Creates a new `TrainingConfig`.
    ///
    /// # Arguments
    /// * `steps` - The amount of full-batch training steps.
    /// * `learning_rate` - The length of each gradient descent step.
    /// * `method` - How the gradient is computed.
    ///
    /// # Returns
    /// The config or an error if any of the values is out of range.
    pub fn new(steps: usize, learning_rate: f64, method: GradientMethod) -> Result<Self> {
        let steps = NonZeroUsize::new(steps).ok_or_else(|| {
            NnErr::InvalidTrainingConfig("steps must be greater than zero".into())
        })?;

        let config = Self {
            steps,
            learning_rate,
            method,
            optimizer: OptimizerKind::GradientDescent,
        };

        config.validate()?;
        Ok(config)
    }

    /// Checks the learning rate is a positive finite number.
    pub fn validate(&self) -> Result<()> {
        if !self.learning_rate.is_finite() || self.learning_rate <= 0. {
            return Err(NnErr::InvalidTrainingConfig(format!(
                "learning rate must be positive and finite, got {}",
                self.learning_rate
            )));
        }

        Ok(())
    }
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            steps: NonZeroUsize::new(DEFAULT_STEPS).unwrap_or(NonZeroUsize::MIN),
            learning_rate: DEFAULT_LEARNING_RATE,
            method: GradientMethod::Backpropagation,
            optimizer: OptimizerKind::GradientDescent,
        }
    }
}
