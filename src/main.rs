use std::env;

use anyhow::Context;
use log::{debug, info, warn};
use neural_playground::{
    Network, Session,
    configs::SessionConfig,
    training::{ChannelObserver, TrainingEvent},
};
use tokio::signal;
use tokio_util::sync::CancellationToken;

const EVENT_BUFFER: usize = 16;
const PRINT_EVERY: usize = 10;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = match env::args().nth(1) {
        Some(path) => SessionConfig::from_json(&path)
            .with_context(|| format!("failed to load session config from {path}"))?,
        None => SessionConfig::default(),
    };

    let mut session = Session::new(config)?;
    let network_config = session.network().config().clone();
    let input = session.config().prediction_input.clone();

    let (mut observer, mut rx) = ChannelObserver::channel(EVENT_BUFFER);
    let cancel = CancellationToken::new();

    let session_ref = &mut session;
    let cancel_ref = &cancel;

    let training = async move {
        let res = session_ref.train(&mut observer, cancel_ref).await;

        if let Ok(history) = &res {
            if let Err(e) = observer.finish(history.clone()).await {
                warn!("failed to publish the final history: {e}");
            }
        }

        res
    };

    let progress = async {
        loop {
            tokio::select! {
                event = rx.recv() => match event {
                    Some(TrainingEvent::Step { step, loss, params }) => {
                        let preview = Network::from_parameters(network_config.clone(), params)
                            .and_then(|net| net.predict(&input));

                        match preview {
                            Ok(out) => debug!("step {step}: loss={loss:.6} prediction={out}"),
                            Err(e) => warn!("failed to preview step {step}: {e}"),
                        }
                    }
                    Some(TrainingEvent::Finished { history }) => {
                        info!("training produced {} history entries", history.len());
                    }
                    None => break,
                },
                _ = signal::ctrl_c() => {
                    info!("received SIGINT, cancelling training");
                    cancel.cancel();
                }
            }
        }
    };

    let (history, ()) = tokio::join!(training, progress);
    let history = history?;

    for entry in history.iter().filter(|e| e.step % PRINT_EVERY == 0) {
        println!("step {:>5}  loss {:.6}", entry.step, entry.loss);
    }

    if let Some(last) = history.last() {
        println!("final loss {:.6} after {} steps", last.loss, last.step + 1);
    }

    println!("phase: {:?}", session.phase());
    println!("parameters: {:.3}", session.parameters());

    let output = session.predict()?;
    println!("prediction for {input:?}: {output:?}");

    Ok(())
}
