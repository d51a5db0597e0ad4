/// Defines a blackbox optimization problem.
///
/// A blackbox problem maps solver variables to a model input, then reads the
/// raw outputs (objective and constraints) from the model input and output.
/// How each output is used is described separately by an
/// [`OutputSpec`](crate::OutputSpec).
pub trait BlackboxProblem {
    type Input;
    type Output;
    type Error: std::error::Error + Send + Sync + 'static;

    /// Maps solver variables (`x`) into a model input.
    ///
    /// # Errors
    ///
    /// Returns [`Self::Error`] if the input cannot be constructed from `x`.
    fn input(&self, x: &[f64]) -> Result<Self::Input, Self::Error>;

    /// Extracts the raw output vector from model input/output.
    ///
    /// # Errors
    ///
    /// Returns [`Self::Error`] if the outputs cannot be computed.
    fn outputs(&self, input: &Self::Input, output: &Self::Output) -> Result<Vec<f64>, Self::Error>;
}
