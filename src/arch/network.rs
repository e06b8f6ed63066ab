use log::debug;
use ndarray::{Array1, Array2};
use rand::Rng;

use super::{ForwardTrace, activations::ActFn, loss::LossKind};
use crate::{
    NnErr, Result,
    configs::NetworkConfig,
    initialization::{BIAS_RANGE, ParamGen, RandParamGen},
    parameters::Parameters,
};

/// A dense feed-forward network. Every hidden layer applies the configured activation and
/// the output layer is linear, so predictions are unbounded real values.
#[derive(Debug, Clone)]
pub struct Network {
    config: NetworkConfig,
    params: Parameters,
}

impl Network {
    /// Creates a new `Network` with randomly initialized parameters.
    ///
    /// # Arguments
    /// * `config` - The architecture of the network.
    ///
    /// # Returns
    /// The network or an error if the layer sizes are invalid.
    pub fn new(config: NetworkConfig) -> Result<Self> {
        Self::with_rng(config, &mut rand::rng())
    }

    /// Creates a new `Network` drawing its initial parameters from `rng`. Weights follow a
    /// Xavier uniform distribution and biases a uniform one in `[-0.1, 0.1]`.
    ///
    /// # Arguments
    /// * `config` - The architecture of the network.
    /// * `rng` - A random number generator.
    ///
    /// # Returns
    /// The network or an error if the layer sizes are invalid.
    pub fn with_rng<R: Rng>(config: NetworkConfig, rng: &mut R) -> Result<Self> {
        config.validate()?;

        let transitions = config.transitions();
        let mut weights = Vec::with_capacity(transitions);
        let mut biases = Vec::with_capacity(transitions);

        for pair in config.layer_sizes.windows(2) {
            let (fan_in, fan_out) = (pair[0], pair[1]);
            let size = fan_in * fan_out;

            let mut param_gen = RandParamGen::xavier_uniform(rng, size, fan_in, fan_out)?;
            let w = param_gen.sample(size).ok_or_else(exhausted)?;
            weights.push(Array2::from_shape_vec((fan_out, fan_in), w)?);

            let mut param_gen = RandParamGen::uniform(rng, fan_out, -BIAS_RANGE, BIAS_RANGE)?;
            let b = param_gen.sample(fan_out).ok_or_else(exhausted)?;
            biases.push(Array1::from_vec(b));
        }

        let params = Parameters::new(weights, biases)?;

        debug!(
            "built network: layers={:?} act_fn={:?} params={}",
            config.layer_sizes,
            config.activation,
            params.len()
        );

        Ok(Self { config, params })
    }

    /// Creates a new `Network` around previously captured parameters.
    ///
    /// # Arguments
    /// * `config` - The architecture of the network.
    /// * `params` - Parameters shaped after `config`.
    ///
    /// # Returns
    /// The network or an error if the config is invalid or the shapes don't match.
    pub fn from_parameters(config: NetworkConfig, params: Parameters) -> Result<Self> {
        config.validate()?;
        Parameters::zeros(&config.layer_sizes).check_shape(&params)?;
        Ok(Self { config, params })
    }

    pub fn config(&self) -> &NetworkConfig {
        &self.config
    }

    pub fn layer_sizes(&self) -> &[usize] {
        &self.config.layer_sizes
    }

    pub fn input_size(&self) -> usize {
        self.config.input_size()
    }

    pub fn output_size(&self) -> usize {
        self.config.output_size()
    }

    pub fn act_fn(&self) -> ActFn {
        self.config.activation
    }

    pub fn loss_fn(&self) -> LossKind {
        self.config.loss
    }

    /// Borrows the live parameters.
    pub fn params(&self) -> &Parameters {
        &self.params
    }

    pub(crate) fn params_mut(&mut self) -> &mut Parameters {
        &mut self.params
    }

    /// Returns a deep copy of the current parameters.
    pub fn parameters(&self) -> Parameters {
        self.params.clone()
    }

    /// Replaces the parameters with a previously captured snapshot.
    ///
    /// # Arguments
    /// * `params` - The new parameters, shaped after this network's config.
    ///
    /// # Returns
    /// An error if the shapes don't match, in which case nothing is modified.
    pub fn set_parameters(&mut self, params: Parameters) -> Result<()> {
        self.params.check_shape(&params)?;
        self.params = params;
        debug!("parameters restored");
        Ok(())
    }

    /// Makes a forward pass through the network.
    ///
    /// # Arguments
    /// * `x` - The input, as wide as the first layer.
    ///
    /// # Returns
    /// The activations and pre-activations of every layer or an error if the width of `x` is
    /// wrong.
    pub fn forward(&self, x: &[f64]) -> Result<ForwardTrace> {
        if x.len() != self.input_size() {
            return Err(NnErr::SizeMismatch {
                what: "input",
                got: x.len(),
                expected: self.input_size(),
            });
        }

        let transitions = self.params.transitions();
        let act_fn = self.config.activation;

        let mut activations = Vec::with_capacity(transitions + 1);
        let mut pre_activations = Vec::with_capacity(transitions);
        activations.push(Array1::from(x.to_vec()));

        for (t, (w, b)) in self.params.weights.iter().zip(&self.params.biases).enumerate() {
            let z = w.dot(&activations[t]) + b;

            let a = if t + 1 == transitions {
                z.clone()
            } else {
                z.mapv(|z| act_fn.f(z))
            };

            pre_activations.push(z);
            activations.push(a);
        }

        Ok(ForwardTrace {
            activations,
            pre_activations,
        })
    }

    /// Predicts the output for `x` without modifying the network.
    pub fn predict(&self, x: &[f64]) -> Result<Array1<f64>> {
        Ok(self.forward(x)?.into_output())
    }
}

fn exhausted() -> NnErr {
    NnErr::Init("parameter generator ran out of values".into())
}
