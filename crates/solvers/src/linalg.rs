//! Dense linear algebra used by the simplex and the quadratic models.
//!
//! Everything is built on a single Golub–Reinsch SVD ([`decompose`]), which
//! provides numerical rank, determinants, condition numbers, and least-squares
//! solves through the pseudo-inverse.

mod svd;

pub use svd::{MAX_ITERATIONS, Svd, decompose};

use ndarray::{Array1, Array2, ArrayView1};
use thiserror::Error;

/// Errors that can occur while computing an SVD.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SvdError {
    /// The matrix exceeds the configured size cap.
    #[error("matrix too large for SVD: m + n = {size} exceeds {max}")]
    TooLarge { size: usize, max: usize },

    /// A singular value did not converge.
    #[error("SVD did not converge within {iterations} iterations")]
    NoConvergence { iterations: usize },
}

/// Returns the singular values of `a`, transposing wide matrices first.
///
/// # Errors
///
/// Returns an error if the decomposition fails.
pub fn singular_values(a: &Array2<f64>) -> Result<Array1<f64>, SvdError> {
    let (m, n) = a.dim();
    let tall = if m < n {
        a.t().to_owned()
    } else {
        a.clone()
    };
    Ok(decompose(tall, None)?.w)
}

/// Numerical rank: the number of singular values strictly above `eps`.
///
/// An empty matrix has rank zero.
///
/// # Errors
///
/// Returns an error if the decomposition fails.
pub fn rank(a: &Array2<f64>, eps: f64) -> Result<usize, SvdError> {
    if a.is_empty() {
        return Ok(0);
    }
    Ok(singular_values(a)?.iter().filter(|w| **w > eps).count())
}

/// Absolute determinant of a square matrix, as the product of its singular values.
///
/// # Errors
///
/// Returns an error if the decomposition fails.
pub fn abs_determinant(a: &Array2<f64>) -> Result<f64, SvdError> {
    Ok(singular_values(a)?.product())
}

/// Ratio of the largest to the smallest singular value.
///
/// The smallest value is clamped below at `eps`, so a singular matrix yields
/// a large but finite number instead of dividing by zero.
#[must_use]
pub fn condition_number(w: ArrayView1<'_, f64>, eps: f64) -> f64 {
    let max = w.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let min = w.iter().copied().fold(f64::INFINITY, f64::min);
    max / min.max(eps)
}

/// Solves `A x = b` in the least-squares sense through the SVD pseudo-inverse.
///
/// Singular values at or below `eps` are treated as zero.
#[must_use]
pub fn pseudo_solve(svd: &Svd, b: ArrayView1<'_, f64>, eps: f64) -> Array1<f64> {
    let n = svd.w.len();
    let mut tmp = Array1::<f64>::zeros(n);
    for i in 0..n {
        if svd.w[i] > eps {
            tmp[i] = svd.u.column(i).dot(&b) / svd.w[i];
        }
    }
    svd.v.dot(&tmp)
}
