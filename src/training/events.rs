use std::future::Future;

use tokio::sync::mpsc;

use super::{HistoryEntry, StepObserver};
use crate::{BoxErr, parameters::Parameters};

/// What a `ChannelObserver` forwards to its receiver.
#[derive(Debug, Clone, PartialEq)]
pub enum TrainingEvent {
    Step {
        step: usize,
        loss: f64,
        params: Parameters,
    },
    Finished {
        history: Vec<HistoryEntry>,
    },
}

/// Forwards every training step through a bounded channel, so a consumer running on the same
/// runtime can render progress while the network trains.
#[derive(Debug, Clone)]
pub struct ChannelObserver {
    tx: mpsc::Sender<TrainingEvent>,
}

impl ChannelObserver {
    pub fn new(tx: mpsc::Sender<TrainingEvent>) -> Self {
        Self { tx }
    }

    /// Creates a new `ChannelObserver` along with the receiving end of its channel.
    ///
    /// # Arguments
    /// * `buffer` - The amount of events that can be queued before the training waits.
    pub fn channel(buffer: usize) -> (Self, mpsc::Receiver<TrainingEvent>) {
        let (tx, rx) = mpsc::channel(buffer);
        (Self::new(tx), rx)
    }

    /// Sends the final history and closes this end of the channel.
    ///
    /// # Errors
    /// Fails if the receiver was dropped.
    pub async fn finish(self, history: Vec<HistoryEntry>) -> Result<(), BoxErr> {
        self.tx
            .send(TrainingEvent::Finished { history })
            .await
            .map_err(|_| BoxErr::from("training event receiver dropped"))
    }
}

impl StepObserver for ChannelObserver {
    fn on_step(
        &mut self,
        step: usize,
        loss: f64,
        params: Parameters,
    ) -> impl Future<Output = Result<(), BoxErr>> {
        let event = TrainingEvent::Step { step, loss, params };

        async move {
            self.tx
                .send(event)
                .await
                .map_err(|_| BoxErr::from("training event receiver dropped"))
        }
    }
}
