use thiserror::Error;

#[cfg(feature = "serde-derive")]
use serde::{Deserialize, Serialize};

/// Outcome of evaluating a point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde-derive", derive(Serialize, Deserialize))]
pub enum EvalStatus {
    /// The point has not been evaluated.
    #[default]
    NotEvaluated,

    /// The evaluation completed and produced outputs.
    Ok,

    /// The evaluation failed.
    Failed,
}

/// Source of an evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-derive", derive(Serialize, Deserialize))]
pub enum EvalType {
    /// The true (expensive) blackbox.
    Blackbox,

    /// A surrogate model of the blackbox.
    Model,
}

/// How a blackbox output contributes to `f` and `h`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde-derive", derive(Serialize, Deserialize))]
pub enum OutputType {
    /// The objective to minimize.
    Objective,

    /// A constraint `c(x) <= 0` whose violation makes the point unusable.
    ExtremeBarrier,

    /// A constraint `c(x) <= 0` whose violation is aggregated into `h`.
    ProgressiveBarrier,

    /// An output carried along but not used.
    Ignored,
}

/// Norm used to aggregate progressive-barrier violations into `h`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde-derive", derive(Serialize, Deserialize))]
pub enum HNorm {
    L1,
    #[default]
    L2,
    LInf,
}

/// Describes the blackbox outputs and how to reduce them to `(f, h)`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde-derive", derive(Serialize, Deserialize))]
pub struct OutputSpec {
    types: Vec<OutputType>,
    h_norm: HNorm,
    h_min: f64,
}

/// Errors that can occur when building an [`OutputSpec`].
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum OutputSpecError {
    #[error("exactly one objective output is required, found {0}")]
    ObjectiveCount(usize),

    #[error("h_min must be finite and non-negative")]
    HMin,
}

impl OutputSpec {
    /// Creates an output spec with the default `L2` norm and `h_min = 0`.
    ///
    /// # Errors
    ///
    /// Returns an error unless exactly one output is an objective.
    pub fn new(types: Vec<OutputType>) -> Result<Self, OutputSpecError> {
        let objectives = types
            .iter()
            .filter(|t| matches!(t, OutputType::Objective))
            .count();
        if objectives != 1 {
            return Err(OutputSpecError::ObjectiveCount(objectives));
        }
        Ok(Self {
            types,
            h_norm: HNorm::default(),
            h_min: 0.0,
        })
    }

    /// An unconstrained single-objective spec.
    #[must_use]
    pub fn objective_only() -> Self {
        Self {
            types: vec![OutputType::Objective],
            h_norm: HNorm::default(),
            h_min: 0.0,
        }
    }

    /// Sets the norm used to aggregate violations.
    #[must_use]
    pub fn with_h_norm(mut self, h_norm: HNorm) -> Self {
        self.h_norm = h_norm;
        self
    }

    /// Sets the violation threshold below which a constraint counts as satisfied.
    ///
    /// # Errors
    ///
    /// Returns an error if `h_min` is negative or non-finite.
    pub fn with_h_min(mut self, h_min: f64) -> Result<Self, OutputSpecError> {
        if !h_min.is_finite() || h_min < 0.0 {
            return Err(OutputSpecError::HMin);
        }
        self.h_min = h_min;
        Ok(self)
    }

    #[must_use]
    pub fn types(&self) -> &[OutputType] {
        &self.types
    }

    /// Returns the number of outputs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    #[must_use]
    pub fn h_norm(&self) -> HNorm {
        self.h_norm
    }

    #[must_use]
    pub fn h_min(&self) -> f64 {
        self.h_min
    }

    /// Reduces raw outputs to `(f, h)`.
    ///
    /// Both are undefined when any output is undefined, when the output count
    /// does not match, or when an extreme-barrier constraint is violated.
    #[must_use]
    pub fn f_and_h(&self, outputs: &[Option<f64>]) -> (Option<f64>, Option<f64>) {
        if outputs.len() != self.types.len() {
            return (None, None);
        }

        let mut f = None;
        let mut h = 0.0_f64;
        for (ty, value) in self.types.iter().zip(outputs) {
            let Some(v) = *value else {
                return (None, None);
            };
            match ty {
                OutputType::Objective => f = Some(v),
                OutputType::ExtremeBarrier if v > self.h_min => return (None, None),
                OutputType::ProgressiveBarrier if v > self.h_min => match self.h_norm {
                    HNorm::L1 => h += v,
                    HNorm::L2 => h += v * v,
                    HNorm::LInf => h = h.max(v),
                },
                _ => {}
            }
        }
        if self.h_norm == HNorm::L2 {
            h = h.sqrt();
        }
        (f, Some(h))
    }
}

/// One evaluation of a point: status, raw outputs, and the derived `f` and `h`.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde-derive", derive(Serialize, Deserialize))]
pub struct Eval {
    status: EvalStatus,
    outputs: Vec<Option<f64>>,
    f: Option<f64>,
    h: Option<f64>,
}

impl Eval {
    /// Creates a successful evaluation from raw outputs.
    ///
    /// Non-finite outputs are stored as undefined.
    #[must_use]
    pub fn from_outputs(outputs: &[f64], spec: &OutputSpec) -> Self {
        let outputs: Vec<Option<f64>> = outputs
            .iter()
            .map(|&v| v.is_finite().then_some(v))
            .collect();
        let (f, h) = spec.f_and_h(&outputs);
        Self {
            status: EvalStatus::Ok,
            outputs,
            f,
            h,
        }
    }

    /// Creates a successful evaluation with precomputed `f` and `h`.
    #[must_use]
    pub fn with_fh(outputs: Vec<Option<f64>>, f: Option<f64>, h: Option<f64>) -> Self {
        Self {
            status: EvalStatus::Ok,
            outputs,
            f,
            h,
        }
    }

    /// Creates a failed evaluation.
    #[must_use]
    pub fn failed() -> Self {
        Self {
            status: EvalStatus::Failed,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn status(&self) -> EvalStatus {
        self.status
    }

    /// Returns true if the status is [`EvalStatus::Ok`].
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.status == EvalStatus::Ok
    }

    #[must_use]
    pub fn outputs(&self) -> &[Option<f64>] {
        &self.outputs
    }

    /// Returns the outputs as plain values if every one is defined.
    #[must_use]
    pub fn output_values(&self) -> Option<Vec<f64>> {
        self.outputs.iter().copied().collect()
    }

    #[must_use]
    pub fn f(&self) -> Option<f64> {
        self.f
    }

    #[must_use]
    pub fn h(&self) -> Option<f64> {
        self.h
    }

    /// Returns true if `h` is defined and zero.
    #[must_use]
    pub fn is_feasible(&self) -> bool {
        self.h.is_some_and(|h| h <= 0.0)
    }

    /// Pareto dominance over `(f, h)`.
    ///
    /// False whenever either evaluation is not `Ok` or has an undefined `f` or `h`.
    #[must_use]
    pub fn dominates(&self, other: &Eval) -> bool {
        if !self.is_ok() || !other.is_ok() {
            return false;
        }
        let (Some(f1), Some(h1), Some(f2), Some(h2)) = (self.f, self.h, other.f, other.h) else {
            return false;
        };
        (h1 <= h2 && f1 <= f2) && (h1 < h2 || f1 < f2)
    }
}
