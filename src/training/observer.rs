use std::future::{self, Future};

use crate::{BoxErr, parameters::Parameters};

/// Gets notified after every training step. The training loop awaits it before starting the
/// next step, so notifications arrive in order and never overlap.
pub trait StepObserver {
    /// Called once per completed step.
    ///
    /// # Arguments
    /// * `step` - The index of the step, starting at zero.
    /// * `loss` - The average cost of the step.
    /// * `params` - A deep copy of the parameters right after the update.
    ///
    /// # Returns
    /// An error to abort the training.
    fn on_step(
        &mut self,
        step: usize,
        loss: f64,
        params: Parameters,
    ) -> impl Future<Output = Result<(), BoxErr>>;
}

impl<F, Fut> StepObserver for F
where
    F: FnMut(usize, f64, Parameters) -> Fut,
    Fut: Future<Output = Result<(), BoxErr>>,
{
    fn on_step(
        &mut self,
        step: usize,
        loss: f64,
        params: Parameters,
    ) -> impl Future<Output = Result<(), BoxErr>> {
        self(step, loss, params)
    }
}

/// Ignores every step.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl StepObserver for NoopObserver {
    fn on_step(
        &mut self,
        _step: usize,
        _loss: f64,
        _params: Parameters,
    ) -> impl Future<Output = Result<(), BoxErr>> {
        future::ready(Ok(()))
    }
}
