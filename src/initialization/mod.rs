mod param_gen;
mod random;

pub use param_gen::ParamGen;
pub use random::RandParamGen;

/// The symmetric range biases are drawn from.
pub const BIAS_RANGE: f64 = 0.1;
