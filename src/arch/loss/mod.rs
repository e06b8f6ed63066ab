mod loss_fn;
mod mse;

pub use loss_fn::{LossFn, LossKind};
pub use mse::Mse;
