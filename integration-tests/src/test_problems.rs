use std::convert::Infallible;

use mads_core::{BlackboxProblem, Model, OutputSpec, OutputType};

/// A paraboloid with its minimum at `center`.
pub struct Bowl {
    pub center: [f64; 2],
}

impl Model for Bowl {
    type Input = [f64; 2];
    type Output = f64;
    type Error = Infallible;

    fn call(&self, x: &[f64; 2]) -> Result<f64, Self::Error> {
        let [cx, cy] = self.center;
        Ok((x[0] - cx).powi(2) + (x[1] - cy).powi(2))
    }
}

/// Objective only: the model output.
pub struct Unconstrained;

impl BlackboxProblem for Unconstrained {
    type Input = [f64; 2];
    type Output = f64;
    type Error = Infallible;

    fn input(&self, x: &[f64]) -> Result<[f64; 2], Self::Error> {
        Ok([x[0], x[1]])
    }

    fn outputs(&self, _input: &[f64; 2], output: &f64) -> Result<Vec<f64>, Self::Error> {
        Ok(vec![*output])
    }
}

/// The model output under the progressive-barrier constraint `x₀ + x₁ ≤ 1`.
pub struct HalfPlane;

impl HalfPlane {
    /// Objective first, then the constraint.
    #[must_use]
    pub fn spec() -> OutputSpec {
        // Known-good values, unwrap is safe
        OutputSpec::new(vec![OutputType::Objective, OutputType::ProgressiveBarrier]).unwrap()
    }
}

impl BlackboxProblem for HalfPlane {
    type Input = [f64; 2];
    type Output = f64;
    type Error = Infallible;

    fn input(&self, x: &[f64]) -> Result<[f64; 2], Self::Error> {
        Ok([x[0], x[1]])
    }

    fn outputs(&self, input: &[f64; 2], output: &f64) -> Result<Vec<f64>, Self::Error> {
        Ok(vec![*output, input[0] + input[1] - 1.0])
    }
}
