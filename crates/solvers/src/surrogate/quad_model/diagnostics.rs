use ndarray::{Array1, Array2};

#[cfg(feature = "serde-derive")]
use serde::{Deserialize, Serialize};

use super::basis::Basis;

/// How well one output's model reproduces its training samples.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde-derive", derive(Serialize, Deserialize))]
pub struct ModelErrorStats {
    /// Root of the summed squared errors.
    pub error: f64,

    pub min_rel_err: f64,
    pub max_rel_err: f64,
    pub avg_rel_err: f64,
}

/// Largest relative error over every output and sample with a nonzero value.
///
/// Undefined when every training value is zero or a prediction is not finite.
pub(super) fn max_relative_error(
    basis: &Basis,
    samples: &[Vec<f64>],
    outputs: &Array2<f64>,
    alpha: &[Array1<f64>],
) -> Option<f64> {
    let mut max = None;
    for (j, a) in alpha.iter().enumerate() {
        for (k, y) in samples.iter().enumerate() {
            let truth = outputs[[k, j]];
            let model = basis.value(y, a.view());
            if !model.is_finite() || truth == 0.0 {
                continue;
            }
            let rel = (truth - model).abs() / truth.abs();
            if max.is_none_or(|m| rel > m) {
                max = Some(rel);
            }
        }
    }
    max
}

/// Error statistics for the output in column `j`.
///
/// A zero training value counts as no relative error when the model matches
/// it exactly, and as infinite otherwise.
pub(super) fn model_error(
    basis: &Basis,
    samples: &[Vec<f64>],
    outputs: &Array2<f64>,
    alpha: &Array1<f64>,
    j: usize,
) -> Option<ModelErrorStats> {
    if samples.is_empty() {
        return None;
    }
    let mut squared = 0.0;
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    let mut sum = 0.0;
    for (k, y) in samples.iter().enumerate() {
        let truth = outputs[[k, j]];
        let model = basis.value(y, alpha.view());
        if !model.is_finite() {
            return None;
        }
        let rel = if truth != 0.0 {
            (truth - model).abs() / truth.abs()
        } else if model.abs() == 0.0 {
            0.0
        } else {
            f64::INFINITY
        };
        min = min.min(rel);
        max = max.max(rel);
        sum += rel;
        squared += (model - truth).powi(2);
    }

    #[allow(clippy::cast_precision_loss)]
    let count = samples.len() as f64;
    Some(ModelErrorStats {
        error: squared.sqrt(),
        min_rel_err: min,
        max_rel_err: max,
        avg_rel_err: sum / count,
    })
}
