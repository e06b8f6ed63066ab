mod network;
mod session;
mod training;

pub use network::NetworkConfig;
pub use session::{DatasetConfig, SessionConfig};
pub use training::{OptimizerKind, TrainingConfig};
