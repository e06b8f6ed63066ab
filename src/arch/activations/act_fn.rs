use serde::{Deserialize, Serialize};

use super::{Relu, Sigmoid};

/// The activation applied on every hidden layer. The output layer is always linear.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActFn {
    #[default]
    Relu,
    Sigmoid,
}

impl ActFn {
    pub fn f(&self, x: f64) -> f64 {
        match self {
            ActFn::Relu => Relu.f(x),
            ActFn::Sigmoid => Sigmoid.f(x),
        }
    }

    pub fn df(&self, x: f64) -> f64 {
        match self {
            ActFn::Relu => Relu.df(x),
            ActFn::Sigmoid => Sigmoid.df(x),
        }
    }
}
