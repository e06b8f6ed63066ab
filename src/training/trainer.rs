use std::num::NonZeroUsize;

use log::{debug, info};
use ndarray::ArrayView1;
use tokio::task;
use tokio_util::sync::CancellationToken;

use super::{HistoryEntry, StepObserver};
use crate::{
    NnErr, Result,
    arch::{Network, loss::LossFn},
    configs::TrainingConfig,
    dataset::Dataset,
    gradient::GradientMethod,
    optimization::{GradientDescent, Optimizer},
};

/// Runs full-batch gradient descent over a network.
#[derive(Debug, Clone)]
pub struct Trainer {
    method: GradientMethod,
    optimizer: GradientDescent,
    steps: NonZeroUsize,
}

impl Trainer {
    /// Creates a new `Trainer`.
    ///
    /// # Arguments
    /// * `config` - The step count, learning rate and gradient method of the run.
    ///
    /// # Returns
    /// The trainer or an error if the learning rate is invalid.
    pub fn new(config: &TrainingConfig) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            method: config.method,
            optimizer: GradientDescent::new(config.learning_rate),
            steps: config.steps,
        })
    }

    /// Performs a single training step over every sample of `dataset`.
    ///
    /// The gradients of every sample are averaged and applied once. If the average loss, any
    /// gradient value or any updated parameter is not finite the parameters are left untouched.
    ///
    /// # Arguments
    /// * `network` - The network being trained.
    /// * `dataset` - The samples, as wide as the network's input and output.
    /// * `step` - The index of this step, used for error reporting.
    ///
    /// # Returns
    /// The average loss of the step.
    pub fn step(&mut self, network: &mut Network, dataset: &Dataset, step: usize) -> Result<f64> {
        let loss_fn = network.loss_fn();
        let mut grad = network.params().zeros_like();
        let mut loss = 0.;

        for sample in dataset.iter() {
            let trace = network.forward(sample.input())?;
            loss += loss_fn.loss(trace.output().view(), ArrayView1::from(sample.target()));

            let sample_grad = self.method.compute(network, sample, &trace)?;
            grad.scaled_add(1., &sample_grad);
        }

        let n = dataset.len() as f64;
        loss /= n;
        grad.scale(1. / n);

        if !loss.is_finite() {
            return Err(NnErr::NonFinite { step, what: "loss" });
        }

        if !grad.is_finite() {
            return Err(NnErr::NonFinite {
                step,
                what: "gradient",
            });
        }

        let mut params = network.parameters();
        self.optimizer.update_params(&mut params, &grad);

        if !params.is_finite() {
            return Err(NnErr::NonFinite {
                step,
                what: "parameters",
            });
        }

        *network.params_mut() = params;
        Ok(loss)
    }

    /// Trains `network` for the configured amount of steps.
    ///
    /// After every step the loop yields to the runtime and then awaits `observer`. `cancel` is
    /// checked before every step, a cancelled run keeps the steps it already completed.
    ///
    /// # Arguments
    /// * `network` - The network being trained.
    /// * `dataset` - The samples, as wide as the network's input and output.
    /// * `observer` - Gets every step's loss along with a snapshot of the parameters.
    /// * `cancel` - Stops the run at the next step boundary.
    ///
    /// # Returns
    /// The loss of every completed step, or the first error found.
    pub async fn run<O: StepObserver>(
        &mut self,
        network: &mut Network,
        dataset: &Dataset,
        observer: &mut O,
        cancel: &CancellationToken,
    ) -> Result<Vec<HistoryEntry>> {
        dataset.check_widths(network.input_size(), network.output_size())?;

        let steps = self.steps.get();
        info!(
            "training started: steps={steps} lr={} method={} samples={}",
            self.optimizer.learning_rate(),
            self.method,
            dataset.len()
        );

        let mut history = Vec::with_capacity(steps);

        for step in 0..steps {
            if cancel.is_cancelled() {
                info!("training cancelled after {step} steps");
                return Ok(history);
            }

            let loss = self.step(network, dataset, step)?;
            history.push(HistoryEntry { step, loss });
            debug!(step = step, loss = loss; "step done");

            task::yield_now().await;

            observer
                .on_step(step, loss, network.parameters())
                .await
                .map_err(|source| NnErr::Observer { step, source })?;
        }

        info!(
            "training finished: final_loss={}",
            history.last().map_or(f64::NAN, |e| e.loss)
        );

        Ok(history)
    }
}

impl Network {
    /// Trains this network, see `Trainer::run`.
    pub async fn train<O: StepObserver>(
        &mut self,
        dataset: &Dataset,
        config: &TrainingConfig,
        observer: &mut O,
        cancel: &CancellationToken,
    ) -> Result<Vec<HistoryEntry>> {
        Trainer::new(config)?.run(self, dataset, observer, cancel).await
    }
}
