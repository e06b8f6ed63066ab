use ndarray::ArrayView1;

use crate::{
    Result,
    arch::{ForwardTrace, Network, loss::LossFn},
    dataset::Sample,
    parameters::Parameters,
};

/// The perturbation added to each parameter.
pub const EPSILON: f64 = 1e-5;

#[derive(Clone, Copy)]
enum Slot {
    Weight(usize, usize, usize),
    Bias(usize, usize),
}

impl Slot {
    fn value_mut(self, params: &mut Parameters) -> &mut f64 {
        match self {
            Slot::Weight(t, i, j) => &mut params.weights[t][[i, j]],
            Slot::Bias(t, i) => &mut params.biases[t][i],
        }
    }
}

/// Estimates the gradient of a sample's cost with forward differences, one extra forward pass
/// per parameter.
///
/// The differentiated objective is the summed squared error of the sample, the mean cost
/// times the output width, which is the objective backpropagation's output error stands for.
/// Every perturbed value is put back before returning, errors included.
///
/// # Arguments
/// * `network` - The network, temporarily perturbed.
/// * `sample` - The sample the cost is measured on.
/// * `trace` - The unperturbed forward pass of `sample.input()`.
///
/// # Returns
/// The gradient, shaped as the network's parameters.
pub fn finite_difference(
    network: &mut Network,
    sample: &Sample,
    trace: &ForwardTrace,
) -> Result<Parameters> {
    let base = summed_cost(network, trace.output().view(), sample);
    let mut grad = network.params().zeros_like();

    for t in 0..grad.transitions() {
        let (rows, cols) = grad.weights[t].dim();

        for i in 0..rows {
            for j in 0..cols {
                let slot = Slot::Weight(t, i, j);
                *slot.value_mut(&mut grad) = slope(network, sample, base, slot)?;
            }

            let slot = Slot::Bias(t, i);
            *slot.value_mut(&mut grad) = slope(network, sample, base, slot)?;
        }
    }

    Ok(grad)
}

fn slope(network: &mut Network, sample: &Sample, base: f64, slot: Slot) -> Result<f64> {
    let value = slot.value_mut(network.params_mut());
    let original = *value;
    *value = original + EPSILON;

    let perturbed = network.predict(sample.input());
    *slot.value_mut(network.params_mut()) = original;

    let perturbed = summed_cost(network, perturbed?.view(), sample);
    Ok((perturbed - base) / EPSILON)
}

fn summed_cost(network: &Network, y_pred: ArrayView1<f64>, sample: &Sample) -> f64 {
    let y = ArrayView1::from(sample.target());
    network.loss_fn().loss(y_pred, y) * y_pred.len() as f64
}
