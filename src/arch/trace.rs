use ndarray::Array1;

/// Everything a forward pass computed, kept around for the backward pass.
///
/// `activations[0]` is the input and `activations[t + 1]` is the output of transition `t`,
/// whose pre-activation is `pre_activations[t]`.
#[derive(Debug, Clone, PartialEq)]
pub struct ForwardTrace {
    pub activations: Vec<Array1<f64>>,
    pub pre_activations: Vec<Array1<f64>>,
}

impl ForwardTrace {
    /// Returns the network's prediction.
    pub fn output(&self) -> &Array1<f64> {
        &self.activations[self.activations.len() - 1]
    }

    /// Drops the intermediate values and keeps the prediction.
    pub fn into_output(mut self) -> Array1<f64> {
        self.activations.pop().unwrap_or_default()
    }
}
