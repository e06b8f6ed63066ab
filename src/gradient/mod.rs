mod backprop;
mod finite_difference;

use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

pub use backprop::backprop;
pub use finite_difference::{EPSILON, finite_difference};

use crate::{
    NnErr, Result,
    arch::{ForwardTrace, Network},
    dataset::Sample,
    parameters::Parameters,
};

/// How the per-sample gradient of the cost is computed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GradientMethod {
    #[default]
    Backpropagation,
    FiniteDifference,
}

impl GradientMethod {
    /// Computes the gradient of the cost of a single sample with respect to every parameter.
    ///
    /// # Arguments
    /// * `network` - The network, finite differences perturb it and put every value back.
    /// * `sample` - The sample the cost is measured on.
    /// * `trace` - The forward pass of `sample.input()` through `network`.
    ///
    /// # Returns
    /// The gradient, shaped as the network's parameters, or an error if the target is not as
    /// wide as the network's output.
    pub fn compute(
        &self,
        network: &mut Network,
        sample: &Sample,
        trace: &ForwardTrace,
    ) -> Result<Parameters> {
        if sample.target().len() != network.output_size() {
            return Err(NnErr::SizeMismatch {
                what: "target",
                got: sample.target().len(),
                expected: network.output_size(),
            });
        }

        match self {
            GradientMethod::Backpropagation => Ok(backprop(network, sample, trace)),
            GradientMethod::FiniteDifference => finite_difference(network, sample, trace),
        }
    }
}

impl Display for GradientMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GradientMethod::Backpropagation => write!(f, "backpropagation"),
            GradientMethod::FiniteDifference => write!(f, "finite difference"),
        }
    }
}
