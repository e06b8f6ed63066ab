use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

use super::TrainingConfig;
use crate::{
    Result,
    arch::{activations::ActFn, loss::LossKind},
};

/// The inline samples of a session, one row per sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetConfig {
    pub x: Vec<Vec<f64>>,
    pub y: Vec<Vec<f64>>,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        let x: Vec<_> = (1..=5).map(|i| vec![i as f64]).collect();
        let y = x.iter().map(|x| vec![2. * x[0]]).collect();
        Self { x, y }
    }
}

/// Everything a `Session` is started from. The input and output widths of the network are
/// taken from the dataset, only the hidden layers are configured here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub hidden_layers: Vec<usize>,
    pub activation: ActFn,
    pub loss: LossKind,
    pub training: TrainingConfig,
    pub dataset: DatasetConfig,
    pub prediction_input: Vec<f64>,
    pub seed: Option<u64>,
}

impl SessionConfig {
    /// Loads a `SessionConfig` from a JSON file, missing fields take their default value.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_json<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// Parses a `SessionConfig` from a JSON string.
    pub fn from_json_str(content: &str) -> Result<Self> {
        let config = serde_json::from_str(content)?;
        Ok(config)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            hidden_layers: vec![1],
            activation: ActFn::Relu,
            loss: LossKind::Mse,
            training: TrainingConfig::default(),
            dataset: DatasetConfig::default(),
            prediction_input: vec![7.],
            seed: None,
        }
    }
}
