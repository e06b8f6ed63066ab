use ndarray::{ArrayView1, Axis, linalg};

use crate::{
    arch::{ForwardTrace, Network, loss::LossFn},
    dataset::Sample,
    parameters::Parameters,
};

/// Computes the gradient of a sample's cost by propagating the output error backwards.
///
/// For transition `t` with error `delta`, the weight gradient is the outer product of `delta`
/// and the layer's input `a[t]`, and the bias gradient is `delta` itself. The error handed to
/// the previous transition is `W[t]^T · delta`, scaled by the activation's derivative at the
/// stored pre-activation.
///
/// # Arguments
/// * `network` - The network the trace was computed with.
/// * `sample` - The sample whose target is compared against the prediction.
/// * `trace` - The forward pass of `sample.input()`.
///
/// # Returns
/// The gradient, shaped as the network's parameters.
pub fn backprop(network: &Network, sample: &Sample, trace: &ForwardTrace) -> Parameters {
    let params = network.params();
    let act_fn = network.act_fn();
    let mut grad = params.zeros_like();

    let y = ArrayView1::from(sample.target());
    let mut delta = network.loss_fn().loss_prime(trace.output().view(), y);

    for t in (0..params.transitions()).rev() {
        let d = delta.view().insert_axis(Axis(1));
        let a = trace.activations[t].view().insert_axis(Axis(0));
        linalg::general_mat_mul(1., &d, &a, 0., &mut grad.weights[t]);
        grad.biases[t].assign(&delta);

        if t > 0 {
            let mut next = params.weights[t].t().dot(&delta);
            next.zip_mut_with(&trace.pre_activations[t - 1], |d, &z| *d *= act_fn.df(z));
            delta = next;
        }
    }

    grad
}

#[cfg(test)]
mod tests {
    use ndarray::array;

    use super::*;
    use crate::{arch::activations::ActFn, configs::NetworkConfig};

    #[test]
    fn dead_relu_units_get_no_gradient() {
        let config = NetworkConfig::new([1, 2, 1], ActFn::Relu);
        let params = Parameters::new(
            vec![array![[1.], [-1.]], array![[1., 1.]]],
            vec![array![0., 0.], array![0.]],
        )
        .unwrap();
        let net = Network::from_parameters(config, params).unwrap();

        let sample = Sample::new(vec![2.], vec![0.]);
        let trace = net.forward(sample.input()).unwrap();
        let grad = backprop(&net, &sample, &trace);

        // pred = 2, delta = 4, the second hidden unit is off
        assert_eq!(grad.weights()[1], array![[8., 0.]]);
        assert_eq!(grad.biases()[1], array![4.]);
        assert_eq!(grad.weights()[0], array![[8.], [0.]]);
        assert_eq!(grad.biases()[0], array![4., 0.]);
    }

    #[test]
    fn perfect_prediction_has_zero_gradient() {
        let config = NetworkConfig::new([2, 1], ActFn::Sigmoid);
        let params = Parameters::new(vec![array![[1., 2.]]], vec![array![0.5]]).unwrap();
        let net = Network::from_parameters(config, params).unwrap();

        let sample = Sample::new(vec![1., 1.], vec![3.5]);
        let trace = net.forward(sample.input()).unwrap();
        let grad = backprop(&net, &sample, &trace);

        assert_eq!(grad, net.params().zeros_like());
    }
}
