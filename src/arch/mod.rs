pub mod activations;
pub mod loss;
mod network;
mod trace;

pub use network::Network;
pub use trace::ForwardTrace;
