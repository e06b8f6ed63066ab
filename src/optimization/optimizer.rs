use crate::parameters::Parameters;

pub trait Optimizer {
    fn update_params(&mut self, params: &mut Parameters, grad: &Parameters);
}
