/// The logistic function, `1 / (1 + e^-z)`.
#[derive(Clone, Copy, Debug, Default)]
pub struct Sigmoid;

impl Sigmoid {
    pub fn f(&self, z: f64) -> f64 {
        1. / (1. + (-z).exp())
    }

    /// Recomputed from `z` on every call, nothing is cached between the passes.
    pub fn df(&self, z: f64) -> f64 {
        let s = self.f(z);
        s * (1. - s)
    }
}
