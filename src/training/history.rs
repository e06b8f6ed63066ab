use serde::{Deserialize, Serialize};

/// The average cost over the whole dataset after a training step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub step: usize,
    pub loss: f64,
}
