use std::{collections::VecDeque, future::Future};

use log::{info, trace, warn};
use rand::{SeedableRng, rngs::StdRng};
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::{
    BoxErr, NnErr, Result,
    arch::{Network, activations::ActFn},
    configs::{DatasetConfig, NetworkConfig, SessionConfig, TrainingConfig},
    dataset::Dataset,
    parameters::Parameters,
    training::{HistoryEntry, StepObserver, Trainer},
};

/// The amount of history entries a session keeps around.
pub const HISTORY_WINDOW: usize = 100;

/// Steps are logged at `info` level every this many steps, the rest go to `trace`.
const LOG_EVERY: usize = 10;

/// Where a session stands regarding training.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    #[default]
    Idle,
    Running,
    Completed,
    Cancelled,
    Failed,
}

/// A network together with the data it's trained on and the state of its last run.
///
/// The network's input and output widths always follow the dataset, only the hidden layers
/// and the activation are configurable.
#[derive(Debug)]
pub struct Session {
    config: SessionConfig,
    dataset: Dataset,
    network: Network,
    rng: StdRng,

    phase: SessionPhase,
    current_step: usize,
    is_trained: bool,
    window: VecDeque<HistoryEntry>,
    latest: Option<Parameters>,
    prediction: Option<Vec<f64>>,
}

impl Session {
    /// Creates a new `Session`.
    ///
    /// # Arguments
    /// * `config` - The architecture, training settings, dataset and prediction input.
    ///
    /// # Returns
    /// The session or an error if any part of the config is invalid.
    pub fn new(config: SessionConfig) -> Result<Self> {
        config.training.validate()?;
        let dataset = dataset_from(&config.dataset)?;

        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        let network_config =
            network_config(&config.hidden_layers, config.activation, &config, &dataset);
        let network = Network::with_rng(network_config, &mut rng)?;
        check_prediction_input(&config.prediction_input, &network)?;

        info!(
            "session created: layers={:?} samples={}",
            network.layer_sizes(),
            dataset.len()
        );

        Ok(Self {
            config,
            dataset,
            network,
            rng,
            phase: SessionPhase::Idle,
            current_step: 0,
            is_trained: false,
            window: VecDeque::with_capacity(HISTORY_WINDOW),
            latest: None,
            prediction: None,
        })
    }

    /// Rebuilds the network with new hidden layers and activation, discarding everything
    /// learned so far.
    ///
    /// # Returns
    /// An error if the hidden layers are invalid, in which case the session is left as is.
    pub fn reconfigure(&mut self, hidden_layers: Vec<usize>, activation: ActFn) -> Result<()> {
        let network_config =
            network_config(&hidden_layers, activation, &self.config, &self.dataset);
        self.network = Network::with_rng(network_config, &mut self.rng)?;

        self.config.hidden_layers = hidden_layers;
        self.config.activation = activation;
        self.reset();

        info!("session reconfigured: layers={:?}", self.network.layer_sizes());
        Ok(())
    }

    /// Replaces the training settings used by the next run.
    pub fn set_training_config(&mut self, training: TrainingConfig) -> Result<()> {
        training.validate()?;
        self.config.training = training;
        Ok(())
    }

    /// Replaces the dataset. If its widths differ from the current ones the network is
    /// rebuilt and its training discarded.
    ///
    /// The prediction input is kept as is, after an input width change `predict` fails until
    /// `set_prediction_input` is called with an input of the new width.
    pub fn set_dataset(&mut self, dataset: DatasetConfig) -> Result<()> {
        let new = dataset_from(&dataset)?;

        if new.x_size() != self.dataset.x_size() || new.y_size() != self.dataset.y_size() {
            let network_config = network_config(
                &self.config.hidden_layers,
                self.config.activation,
                &self.config,
                &new,
            );
            self.network = Network::with_rng(network_config, &mut self.rng)?;
            self.reset();

            info!(
                "dataset widths changed, network rebuilt: layers={:?}",
                self.network.layer_sizes()
            );
        }

        self.dataset = new;
        self.config.dataset = dataset;
        Ok(())
    }

    /// Replaces the input `predict` runs on.
    pub fn set_prediction_input(&mut self, input: Vec<f64>) -> Result<()> {
        check_prediction_input(&input, &self.network)?;
        self.config.prediction_input = input;
        self.prediction = None;
        Ok(())
    }

    /// Trains the network with the current training settings.
    ///
    /// Every step is recorded in the session before it reaches `observer`.
    ///
    /// # Arguments
    /// * `observer` - Gets every step's loss and a snapshot of the parameters.
    /// * `cancel` - Stops the run at the next step boundary.
    ///
    /// # Returns
    /// The loss of every completed step or the error that stopped the run.
    pub async fn train<O: StepObserver>(
        &mut self,
        observer: &mut O,
        cancel: &CancellationToken,
    ) -> Result<Vec<HistoryEntry>> {
        let mut trainer = Trainer::new(&self.config.training)?;
        let steps = self.config.training.steps.get();

        self.phase = SessionPhase::Running;
        self.current_step = 0;
        self.is_trained = false;
        self.window.clear();
        self.latest = None;

        let mut recorder = Recorder {
            steps,
            current_step: &mut self.current_step,
            window: &mut self.window,
            latest: &mut self.latest,
            inner: observer,
        };

        let res = trainer
            .run(&mut self.network, &self.dataset, &mut recorder, cancel)
            .await;

        match res {
            Ok(history) if history.len() < steps => {
                self.phase = SessionPhase::Cancelled;
                info!("session cancelled after {} of {steps} steps", history.len());
                Ok(history)
            }
            Ok(history) => {
                self.phase = SessionPhase::Completed;
                self.is_trained = true;
                Ok(history)
            }
            Err(e) => {
                self.phase = SessionPhase::Failed;
                warn!("training failed: {e}");
                Err(e)
            }
        }
    }

    /// Runs the prediction input through the network and keeps the output.
    pub fn predict(&mut self) -> Result<Vec<f64>> {
        let output = self.network.predict(&self.config.prediction_input)?.to_vec();
        self.prediction = Some(output.clone());
        Ok(output)
    }

    /// Returns a deep copy of the current parameters.
    pub fn parameters(&self) -> Parameters {
        self.network.parameters()
    }

    /// Puts back a snapshot taken from this session's network.
    pub fn restore(&mut self, snapshot: Parameters) -> Result<()> {
        self.network.set_parameters(snapshot)?;
        self.prediction = None;
        Ok(())
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// The last `HISTORY_WINDOW` entries of the current or last run.
    pub fn history(&self) -> &VecDeque<HistoryEntry> {
        &self.window
    }

    pub fn current_step(&self) -> usize {
        self.current_step
    }

    pub fn is_trained(&self) -> bool {
        self.is_trained
    }

    /// The parameters handed to the observer on the last recorded step.
    pub fn latest_parameters(&self) -> Option<&Parameters> {
        self.latest.as_ref()
    }

    pub fn prediction(&self) -> Option<&[f64]> {
        self.prediction.as_deref()
    }

    pub fn network(&self) -> &Network {
        &self.network
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    fn reset(&mut self) {
        self.phase = SessionPhase::Idle;
        self.current_step = 0;
        self.is_trained = false;
        self.window.clear();
        self.latest = None;
        self.prediction = None;
    }
}

/// Keeps the session's progress up to date before forwarding a step to the caller.
struct Recorder<'a, O> {
    steps: usize,
    current_step: &'a mut usize,
    window: &'a mut VecDeque<HistoryEntry>,
    latest: &'a mut Option<Parameters>,
    inner: &'a mut O,
}

impl<O: StepObserver> StepObserver for Recorder<'_, O> {
    fn on_step(
        &mut self,
        step: usize,
        loss: f64,
        params: Parameters,
    ) -> impl Future<Output = std::result::Result<(), BoxErr>> {
        *self.current_step = step;

        if self.window.len() == HISTORY_WINDOW {
            self.window.pop_front();
        }
        self.window.push_back(HistoryEntry { step, loss });

        if logs_at_info(step, self.steps) {
            info!("step {step}: loss={loss:.6} {params:.3}");
        } else {
            trace!("step {step}: loss={loss:.6}");
        }

        *self.latest = Some(params.clone());
        self.inner.on_step(step, loss, params)
    }
}

/// Whether a step is logged at `info` level, the rest go to `trace`.
fn logs_at_info(step: usize, steps: usize) -> bool {
    step % LOG_EVERY == 0 || step + 1 == steps
}

fn dataset_from(config: &DatasetConfig) -> Result<Dataset> {
    Dataset::new(config.x.clone(), config.y.clone())
}

fn network_config(
    hidden_layers: &[usize],
    activation: ActFn,
    config: &SessionConfig,
    dataset: &Dataset,
) -> NetworkConfig {
    let mut layer_sizes = Vec::with_capacity(hidden_layers.len() + 2);
    layer_sizes.push(dataset.x_size());
    layer_sizes.extend_from_slice(hidden_layers);
    layer_sizes.push(dataset.y_size());

    NetworkConfig {
        layer_sizes,
        activation,
        loss: config.loss,
    }
}

fn check_prediction_input(input: &[f64], network: &Network) -> Result<()> {
    if input.len() != network.input_size() {
        return Err(NnErr::SizeMismatch {
            what: "prediction input",
            got: input.len(),
            expected: network.input_size(),
        });
    }

    Ok(())
}
