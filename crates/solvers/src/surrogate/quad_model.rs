//! Quadratic models of the blackbox outputs.
//!
//! # Algorithm
//!
//! Samples are first scaled so that each variable spans `[-r, r]` around the
//! midpoint of its range; variables with no spread are fixed and left out of
//! the model, as are variables the caller marks fixed. With `nfree` free
//! variables a quadratic has `nα = (nfree + 1)(nfree + 2) / 2` coefficients,
//! and the fit depends on the number of samples `p + 1`:
//!
//! - `p + 1 < nα`: minimum Frobenius norm interpolation ([`FitKind::Mfn`]),
//!   which needs more than `nfree` samples
//! - `p + 1 > nα` with [`Config::with_well_poised`]: a Lagrange basis on the
//!   best-poised subset ([`FitKind::WellPoised`]), falling back to regression
//! - otherwise least-squares regression ([`FitKind::Regression`])
//!
//! All linear systems are solved through the SVD pseudo-inverse, so nearly
//! singular sample sets produce a regularized fit rather than an error.
//!
//! # Coordinates
//!
//! [`QuadModel::eval`], [`QuadModel::eval_hf`] and [`QuadModel::gradient`]
//! take points in scaled coordinates. [`QuadModel::predict`] takes raw
//! coordinates and scales them first.
//!
//! # Errors
//!
//! A sample set the model cannot use is reported through [`Error`] and leaves
//! the model not ready. [`Error::is_numerical`] separates the failures of the
//! method itself (SVD non-convergence, hard sample caps), which callers usually
//! treat as "skip the model this iteration".

mod basis;
mod config;
mod diagnostics;
mod error;
mod evaluator;
mod mfn;
mod regression;
mod scaling;
mod training;
mod well_poised;

#[cfg(test)]
mod tests;

pub use config::{Config, ConfigError};
pub use diagnostics::ModelErrorStats;
pub use error::{Error, SampleError};
pub use evaluator::{ModelEvaluator, rank_by_model};
pub use scaling::Scaling;
pub use training::TrainingSet;

use mads_core::{Eval, EvalPoint, EvalType, HNorm, OutputSpec, Point};
use ndarray::{Array1, Array2};

#[cfg(feature = "serde-derive")]
use serde::{Deserialize, Serialize};

use basis::Basis;

/// Outputs above this magnitude are not used for fitting.
pub const MAX_OUTPUT: f64 = 1e20;

/// Hard cap on samples for a regression fit.
pub const MAX_REGRESSION_SAMPLES: usize = 500;

/// Hard cap on samples for a minimum Frobenius norm fit.
pub const MAX_MFN_SAMPLES: usize = 250;

/// How the coefficients of a [`QuadModel`] were obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde-derive", derive(Serialize, Deserialize))]
pub enum FitKind {
    /// Minimum Frobenius norm interpolation.
    Mfn,

    /// Lagrange interpolation on a well-poised subset.
    WellPoised,

    /// Least-squares regression.
    Regression,
}

/// One quadratic polynomial per blackbox output, fitted to evaluated samples.
///
/// The model is rebuilt from scratch whenever its samples change: replacing
/// the samples or redefining the scaling discards any previous fit.
#[derive(Debug, Clone)]
pub struct QuadModel {
    n: usize,
    spec: OutputSpec,
    user_fixed: Vec<bool>,
    samples: Vec<EvalPoint>,
    data: Option<Scaled>,
    fit: Option<Fit>,
}

/// Samples in scaled coordinates and the basis they induce.
#[derive(Debug, Clone)]
struct Scaled {
    scaling: Scaling,
    fixed: Vec<bool>,
    basis: Basis,
    ys: Vec<Vec<f64>>,
    outputs: Array2<f64>,
}

#[derive(Debug, Clone)]
struct Fit {
    kind: FitKind,
    alpha: Vec<Array1<f64>>,
    cond: Option<f64>,
}

impl QuadModel {
    /// Creates an empty model of dimension `n` for outputs described by `spec`.
    #[must_use]
    pub fn new(n: usize, spec: OutputSpec) -> Self {
        Self {
            n,
            spec,
            user_fixed: vec![false; n],
            samples: Vec::new(),
            data: None,
            fit: None,
        }
    }

    /// Marks variables to leave out of the model, such as categorical slots.
    #[must_use]
    pub fn with_fixed(mut self, fixed: Vec<bool>) -> Self {
        self.user_fixed = fixed;
        self.data = None;
        self.fit = None;
        self
    }

    /// Replaces the samples, discarding the scaling and any fit.
    pub fn set_samples(&mut self, samples: Vec<EvalPoint>) {
        self.samples = samples;
        self.data = None;
        self.fit = None;
    }

    #[must_use]
    pub fn samples(&self) -> &[EvalPoint] {
        &self.samples
    }

    #[must_use]
    pub fn dim(&self) -> usize {
        self.n
    }

    #[must_use]
    pub fn output_spec(&self) -> &OutputSpec {
        &self.spec
    }

    /// Checks that every sample can be used for fitting.
    ///
    /// # Errors
    ///
    /// Returns the first problem found: no samples, undefined coordinates,
    /// a blackbox evaluation that is missing or not `Ok`, undefined outputs,
    /// a wrong output count or dimension, or an output above [`MAX_OUTPUT`].
    pub fn check_samples(&self) -> Result<(), SampleError> {
        if self.samples.is_empty() {
            return Err(SampleError::Empty);
        }
        let m = self.spec.len();
        for (index, point) in self.samples.iter().enumerate() {
            if point.dim() != self.n {
                return Err(SampleError::Dimension {
                    index,
                    expected: self.n,
                    found: point.dim(),
                });
            }
            if !point.x().is_complete() {
                return Err(SampleError::Incomplete(index));
            }
            let Some(eval) = point.eval(EvalType::Blackbox).filter(|e| e.is_ok()) else {
                return Err(SampleError::EvalNotOk(index));
            };
            if eval.outputs().len() != m {
                return Err(SampleError::OutputCount {
                    index,
                    expected: m,
                    found: eval.outputs().len(),
                });
            }
            let Some(values) = eval.output_values() else {
                return Err(SampleError::MissingOutputs(index));
            };
            if values.iter().any(|v| v.abs() > MAX_OUTPUT) {
                return Err(SampleError::OutputTooLarge(index));
            }
        }
        Ok(())
    }

    /// Scales the samples into `[-radius, radius]` per variable.
    ///
    /// Variables with no spread across the samples become fixed.
    ///
    /// # Errors
    ///
    /// Returns an error if the samples are unusable, the fixed mask has the
    /// wrong length, or every variable ends up fixed.
    pub fn define_scaling(&mut self, radius: f64) -> Result<(), Error> {
        self.data = None;
        self.fit = None;

        if self.user_fixed.len() != self.n {
            return Err(Error::FixedMask {
                expected: self.n,
                found: self.user_fixed.len(),
            });
        }
        self.check_samples()?;

        let raw: Vec<Vec<f64>> = self
            .samples
            .iter()
            .filter_map(|p| p.x().values())
            .collect();
        let scaling = Scaling::fit(&raw, self.n, radius);
        let fixed: Vec<bool> = (0..self.n)
            .map(|i| self.user_fixed[i] || scaling.is_degenerate(i))
            .collect();
        if fixed.iter().all(|f| *f) {
            return Err(Error::AllFixed);
        }

        let ys = raw.iter().map(|y| scaling.scale(y)).collect();
        let m = self.spec.len();
        let mut outputs = Array2::<f64>::zeros((self.samples.len(), m));
        for (k, point) in self.samples.iter().enumerate() {
            let values = point
                .eval(EvalType::Blackbox)
                .and_then(Eval::output_values)
                .unwrap_or_default();
            for (j, v) in values.into_iter().enumerate() {
                outputs[[k, j]] = v;
            }
        }

        self.data = Some(Scaled {
            basis: Basis::new(&fixed),
            scaling,
            fixed,
            ys,
            outputs,
        });
        Ok(())
    }

    /// Fits the model to the current samples.
    ///
    /// Defines the scaling with [`Config::radius`] first if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the samples are unusable, too few or too many for
    /// the selected fit, or the SVD fails.
    pub fn construct(&mut self, config: &Config) -> Result<FitKind, Error> {
        self.fit = None;
        if self.data.is_none() {
            self.define_scaling(config.radius())?;
        }
        let Some(data) = &self.data else {
            return Err(SampleError::Empty.into());
        };

        let p1 = data.ys.len();
        let na = data.basis.len();
        let nfree = data.basis.nfree();
        if p1 > config.max_samples() {
            return Err(Error::SampleCount {
                count: p1,
                max: config.max_samples(),
            });
        }

        let mut m = Array2::<f64>::zeros((p1, na));
        for (k, y) in data.ys.iter().enumerate() {
            m.row_mut(k).assign(&data.basis.row(y));
        }

        let fit = if p1 < na {
            if p1 <= nfree {
                return Err(Error::TooFewSamples {
                    count: p1,
                    min: nfree + 1,
                });
            }
            if p1 > MAX_MFN_SAMPLES {
                return Err(Error::TooManySamples {
                    count: p1,
                    max: MAX_MFN_SAMPLES,
                });
            }
            let nl = data.basis.linear_len();
            let linear = m.slice(ndarray::s![.., ..nl]).to_owned();
            let quadratic = m.slice(ndarray::s![.., nl..]).to_owned();
            let (alpha, cond) = mfn::fit(
                &linear,
                &quadratic,
                &data.outputs,
                config.eps(),
                config.max_condition_dim(),
            )?;
            Fit {
                kind: FitKind::Mfn,
                alpha,
                cond: Some(cond),
            }
        } else {
            if p1 > MAX_REGRESSION_SAMPLES {
                return Err(Error::TooManySamples {
                    count: p1,
                    max: MAX_REGRESSION_SAMPLES,
                });
            }
            let well_poised = (config.use_well_poised() && p1 > na)
                .then(|| well_poised::fit(&data.basis, &data.ys, &data.outputs))
                .flatten();
            match well_poised {
                Some(alpha) => Fit {
                    kind: FitKind::WellPoised,
                    alpha,
                    cond: None,
                },
                None => {
                    let (alpha, cond) =
                        regression::fit(&m, &data.outputs, config.eps(), config.max_condition_dim())?;
                    Fit {
                        kind: FitKind::Regression,
                        alpha,
                        cond: Some(cond),
                    }
                }
            }
        };

        log::debug!(
            "quadratic model: {:?} fit on {p1} samples, {nfree} free variables, cond = {:?}",
            fit.kind,
            fit.cond
        );
        let kind = fit.kind;
        self.fit = Some(fit);
        Ok(kind)
    }

    /// Returns true if the model has been fitted and every coefficient is finite.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.fit
            .as_ref()
            .is_some_and(|fit| fit.alpha.iter().all(|a| a.iter().all(|c| c.is_finite())))
    }

    #[must_use]
    pub fn fit_kind(&self) -> Option<FitKind> {
        self.fit.as_ref().map(|fit| fit.kind)
    }

    /// Condition number of the last solved system.
    ///
    /// Undefined before a fit and for well-poised fits, which solve no system.
    #[must_use]
    pub fn cond(&self) -> Option<f64> {
        self.fit.as_ref().and_then(|fit| fit.cond)
    }

    /// Number of coefficients per output, once the scaling is defined.
    #[must_use]
    pub fn n_alpha(&self) -> Option<usize> {
        self.data.as_ref().map(|d| d.basis.len())
    }

    /// Number of variables in the model, once the scaling is defined.
    #[must_use]
    pub fn nfree(&self) -> Option<usize> {
        self.data.as_ref().map(|d| d.basis.nfree())
    }

    /// Variables left out of the model, once the scaling is defined.
    #[must_use]
    pub fn fixed_variables(&self) -> Option<&[bool]> {
        self.data.as_ref().map(|d| d.fixed.as_slice())
    }

    #[must_use]
    pub fn scaling(&self) -> Option<&Scaling> {
        self.data.as_ref().map(|d| &d.scaling)
    }

    /// Coefficients of output `j`.
    #[must_use]
    pub fn alpha(&self, j: usize) -> Option<&Array1<f64>> {
        self.fit.as_ref().and_then(|fit| fit.alpha.get(j))
    }

    /// Maps a raw point to scaled coordinates.
    #[must_use]
    pub fn scale(&self, x: &Point) -> Option<Point> {
        let scaling = self.scaling()?;
        let values = self.complete(x)?;
        Some(Point::from(scaling.scale(&values)))
    }

    /// Maps a scaled point back to raw coordinates.
    #[must_use]
    pub fn unscale(&self, x: &Point) -> Option<Point> {
        let scaling = self.scaling()?;
        let values = self.complete(x)?;
        Some(Point::from(scaling.unscale(&values)))
    }

    /// Maps a gradient computed in scaled coordinates back to raw coordinates.
    #[must_use]
    pub fn unscale_grad(&self, g: &[f64]) -> Option<Vec<f64>> {
        let scaling = self.scaling()?;
        (g.len() == self.n).then(|| scaling.unscale_grad(g))
    }

    /// Returns true if the scaled point lies within the scaling radius and
    /// every fixed variable sits at its reference value.
    #[must_use]
    pub fn is_within_trust_radius(&self, x: &Point) -> bool {
        let (Some(data), Some(values)) = (&self.data, self.complete(x)) else {
            return false;
        };
        let radius = data.scaling.radius();
        values
            .iter()
            .zip(&data.fixed)
            .all(|(v, fixed)| if *fixed { *v == 0.0 } else { v.abs() <= radius })
    }

    /// Evaluates the quadratic with coefficients `alpha` at the scaled point `x`.
    #[must_use]
    pub fn eval(&self, x: &Point, alpha: &Array1<f64>) -> Option<f64> {
        let data = self.data.as_ref()?;
        if alpha.len() != data.basis.len() {
            return None;
        }
        let values = self.complete(x)?;
        Some(data.basis.value(&values, alpha.view())).filter(|v| v.is_finite())
    }

    /// Every output model evaluated at the scaled point `x`.
    #[must_use]
    pub fn eval_outputs(&self, x: &Point) -> Option<Vec<f64>> {
        let fit = self.fit.as_ref()?;
        fit.alpha.iter().map(|a| self.eval(x, a)).collect()
    }

    /// Predicted `(f, h)` at the scaled point `x`.
    ///
    /// Outputs are reduced as the [`OutputSpec`] does, with the given
    /// violation threshold and norm. Both values are undefined when a
    /// prediction is undefined or an extreme-barrier constraint is violated.
    #[must_use]
    pub fn eval_hf(&self, x: &Point, h_min: f64, h_norm: HNorm) -> (Option<f64>, Option<f64>) {
        let Some(outputs) = self.eval_outputs(x) else {
            return (None, None);
        };
        let Ok(spec) = self.spec.clone().with_h_norm(h_norm).with_h_min(h_min) else {
            return (None, None);
        };
        let outputs: Vec<Option<f64>> = outputs.into_iter().map(Some).collect();
        spec.f_and_h(&outputs)
    }

    /// Predicted outputs at the raw point `x`.
    #[must_use]
    pub fn predict(&self, x: &Point) -> Option<Vec<f64>> {
        self.eval_outputs(&self.scale(x)?)
    }

    /// Gradient of output `j` at the scaled point `x`, in scaled coordinates.
    #[must_use]
    pub fn gradient(&self, x: &Point, j: usize) -> Option<Vec<f64>> {
        let data = self.data.as_ref()?;
        let alpha = self.alpha(j)?;
        let values = self.complete(x)?;
        Some(data.basis.gradient(&values, alpha.view()))
    }

    /// Largest relative error over all outputs and samples with a nonzero value.
    #[must_use]
    pub fn compute_max_rel_err(&self) -> Option<f64> {
        let (data, fit) = (self.data.as_ref()?, self.fit.as_ref()?);
        diagnostics::max_relative_error(&data.basis, &data.ys, &data.outputs, &fit.alpha)
    }

    /// Error statistics of output `j` over the samples.
    #[must_use]
    pub fn compute_model_error(&self, j: usize) -> Option<ModelErrorStats> {
        let (data, alpha) = (self.data.as_ref()?, self.alpha(j)?);
        diagnostics::model_error(&data.basis, &data.ys, &data.outputs, alpha, j)
    }

    fn complete(&self, x: &Point) -> Option<Vec<f64>> {
        x.values().filter(|v| v.len() == self.n)
    }
}
