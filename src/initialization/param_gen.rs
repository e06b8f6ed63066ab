/// A source of initial parameter values.
pub trait ParamGen {
    /// Generates the next `n` values.
    ///
    /// # Arguments
    /// * `n` - The amount of values to generate.
    ///
    /// # Returns
    /// At most `n` values, or `None` if the generator is exhausted.
    fn sample(&mut self, n: usize) -> Option<Vec<f64>>;
}
