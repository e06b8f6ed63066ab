use std::future::{Ready, ready};

use ndarray::array;
use neural_playground::{
    BoxErr, Network, NnErr, Parameters,
    arch::activations::ActFn,
    configs::{NetworkConfig, TrainingConfig},
    dataset::Dataset,
    gradient::GradientMethod,
    training::NoopObserver,
};
use rand::{SeedableRng, rngs::StdRng};
use tokio_util::sync::CancellationToken;

fn ok() -> Ready<Result<(), BoxErr>> {
    ready(Ok(()))
}

fn doubling(range: std::ops::RangeInclusive<u32>) -> Dataset {
    let x: Vec<_> = range.map(|i| vec![i as f64]).collect();
    let y = x.iter().map(|x| vec![2. * x[0]]).collect();
    Dataset::new(x, y).unwrap()
}

fn xor() -> Dataset {
    Dataset::new(
        vec![vec![0., 0.], vec![0., 1.], vec![1., 0.], vec![1., 1.]],
        vec![vec![0.], vec![1.], vec![1.], vec![0.]],
    )
    .unwrap()
}

fn seeded(sizes: &[usize], act_fn: ActFn, seed: u64) -> Network {
    let mut rng = StdRng::seed_from_u64(seed);
    Network::with_rng(NetworkConfig::new(sizes, act_fn), &mut rng).unwrap()
}

fn training(steps: usize, lr: f64, method: GradientMethod) -> TrainingConfig {
    TrainingConfig::new(steps, lr, method).unwrap()
}

#[tokio::test]
async fn learns_a_line() {
    for seed in 0..5 {
        let mut net = seeded(&[1, 1], ActFn::Relu, seed);
        let config = training(500, 0.05, GradientMethod::Backpropagation);

        let history = net
            .train(&doubling(1..=5), &config, &mut NoopObserver, &CancellationToken::new())
            .await
            .unwrap();

        let params = net.parameters();
        assert!((params.weights()[0][[0, 0]] - 2.).abs() < 0.1);
        assert!(params.biases()[0][0].abs() < 0.1);
        assert_eq!(history.len(), 500);
        assert!(history[499].loss < 0.01);
    }
}

#[tokio::test]
async fn finite_differences_learn_a_line_too() {
    let mut net = seeded(&[1, 1], ActFn::Relu, 1);
    let config = training(500, 0.05, GradientMethod::FiniteDifference);

    let history = net
        .train(&doubling(1..=5), &config, &mut NoopObserver, &CancellationToken::new())
        .await
        .unwrap();

    let params = net.parameters();
    assert!((params.weights()[0][[0, 0]] - 2.).abs() < 0.1);
    assert!(history[499].loss < 0.01);
}

#[tokio::test]
async fn loss_drops_on_a_deeper_line() {
    let config = NetworkConfig::new([1, 1, 1], ActFn::Relu);
    let params = Parameters::new(
        vec![array![[0.5]], array![[0.5]]],
        vec![array![0.], array![0.]],
    )
    .unwrap();
    let mut net = Network::from_parameters(config, params).unwrap();

    let history = net
        .train(
            &doubling(1..=8),
            &training(200, 0.005, GradientMethod::Backpropagation),
            &mut NoopObserver,
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    assert!(history[199].loss < history[0].loss * 0.01);
}

#[tokio::test]
async fn hidden_layer_solves_xor() {
    let config = NetworkConfig::new([2, 2, 1], ActFn::Sigmoid);
    let mut net = Network::new(config).unwrap();
    let params = Parameters::new(
        vec![array![[-0.64, 0.11], [-0.32, 0.25]], array![[0.36, -1.23]]],
        vec![array![-0.1, 0.07], array![-0.05]],
    )
    .unwrap();
    net.set_parameters(params).unwrap();

    let dataset = xor();
    net.train(
        &dataset,
        &training(5000, 0.5, GradientMethod::Backpropagation),
        &mut NoopObserver,
        &CancellationToken::new(),
    )
    .await
    .unwrap();

    for sample in dataset.iter() {
        let out = net.predict(sample.input()).unwrap();
        assert!((out[0] - sample.target()[0]).abs() < 0.1);
    }
}

#[tokio::test]
async fn no_hidden_layer_cannot_solve_xor() {
    let config = NetworkConfig::new([2, 1], ActFn::Sigmoid);
    let params = Parameters::new(vec![array![[0.3, -0.2]]], vec![array![0.05]]).unwrap();
    let mut net = Network::from_parameters(config, params).unwrap();

    let dataset = xor();
    net.train(
        &dataset,
        &training(5000, 0.5, GradientMethod::Backpropagation),
        &mut NoopObserver,
        &CancellationToken::new(),
    )
    .await
    .unwrap();

    let worst = dataset
        .iter()
        .map(|s| (net.predict(s.input()).unwrap()[0] - s.target()[0]).abs())
        .fold(0., f64::max);

    assert!(worst > 0.1);
}

#[tokio::test]
async fn cancelling_keeps_completed_steps() {
    let mut net = seeded(&[1, 1], ActFn::Relu, 2);
    let cancel = CancellationToken::new();
    let mut calls = 0;

    let mut observer = |step: usize, _: f64, _: Parameters| {
        calls += 1;
        if step == 9 {
            cancel.cancel();
        }
        ok()
    };

    let history = net
        .train(
            &doubling(1..=5),
            &training(100, 0.05, GradientMethod::Backpropagation),
            &mut observer,
            &cancel,
        )
        .await
        .unwrap();

    let steps: Vec<_> = history.iter().map(|e| e.step).collect();
    assert_eq!(steps, (0..10).collect::<Vec<_>>());
    assert_eq!(calls, 10);
    assert!(net.predict(&[3.]).unwrap()[0].is_finite());
}

#[tokio::test]
async fn observer_sees_every_step_in_order() {
    let mut net = seeded(&[1, 2, 1], ActFn::Relu, 3);
    let mut seen: Vec<(usize, f64, Parameters)> = Vec::new();

    let mut observer = |step: usize, loss: f64, mut params: Parameters| {
        seen.push((step, loss, params.clone()));
        params.scale(0.);
        ok()
    };

    let history = net
        .train(
            &doubling(1..=5),
            &training(20, 0.01, GradientMethod::Backpropagation),
            &mut observer,
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(seen.len(), 20);
    assert!(seen.windows(2).all(|w| w[0].0 < w[1].0));

    for ((step, loss, _), entry) in seen.iter().zip(&history) {
        assert_eq!(*step, entry.step);
        assert_eq!(*loss, entry.loss);
    }

    let last = &seen[19].2;
    assert_eq!(last, &net.parameters());
    assert_ne!(&seen[0].2, last);
}

#[tokio::test]
async fn snapshots_serve_predictions_mid_training() {
    let mut net = seeded(&[1, 3, 1], ActFn::Relu, 4);
    let config = net.config().clone();
    let mut previews = Vec::new();

    let mut observer = |_: usize, _: f64, params: Parameters| {
        let preview = Network::from_parameters(config.clone(), params)
            .and_then(|net| net.predict(&[7.]))
            .map(|out| out[0]);
        previews.push(preview);
        ok()
    };

    net.train(
        &doubling(1..=5),
        &training(10, 0.01, GradientMethod::Backpropagation),
        &mut observer,
        &CancellationToken::new(),
    )
    .await
    .unwrap();

    assert_eq!(previews.len(), 10);
    let last = previews.pop().unwrap().unwrap();
    assert_eq!(last, net.predict(&[7.]).unwrap()[0]);
}

#[tokio::test]
async fn observer_errors_abort_training() {
    let mut net = seeded(&[1, 1], ActFn::Relu, 5);
    let mut calls = 0;

    let mut observer = |step: usize, _: f64, _: Parameters| {
        calls += 1;
        let res = if step == 3 {
            Err(BoxErr::from("render failed"))
        } else {
            Ok(())
        };
        ready(res)
    };

    let res = net
        .train(
            &doubling(1..=5),
            &training(50, 0.05, GradientMethod::Backpropagation),
            &mut observer,
            &CancellationToken::new(),
        )
        .await;

    assert!(matches!(res, Err(NnErr::Observer { step: 3, .. })));
    assert_eq!(calls, 4);
}

#[tokio::test]
async fn mismatched_dataset_fails_before_any_step() {
    let mut net = seeded(&[2, 1], ActFn::Relu, 6);
    let before = net.parameters();
    let mut calls = 0;

    let mut observer = |_: usize, _: f64, _: Parameters| {
        calls += 1;
        ok()
    };

    let res = net
        .train(
            &doubling(1..=5),
            &training(10, 0.05, GradientMethod::Backpropagation),
            &mut observer,
            &CancellationToken::new(),
        )
        .await;

    assert!(matches!(
        res,
        Err(NnErr::SizeMismatch {
            what: "dataset inputs",
            ..
        })
    ));
    assert_eq!(calls, 0);
    assert_eq!(net.parameters(), before);
}

#[tokio::test]
async fn diverging_training_reports_non_finite_values() {
    let config = NetworkConfig::new([1, 1], ActFn::Relu);
    let params = Parameters::new(vec![array![[1e200]]], vec![array![0.]]).unwrap();
    let mut net = Network::from_parameters(config, params).unwrap();

    let dataset = Dataset::new(vec![vec![1e200]], vec![vec![1.]]).unwrap();
    let res = net
        .train(
            &dataset,
            &training(10, 0.05, GradientMethod::Backpropagation),
            &mut NoopObserver,
            &CancellationToken::new(),
        )
        .await;

    assert!(matches!(res, Err(NnErr::NonFinite { step: 0, .. })));
}
