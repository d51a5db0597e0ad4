use ndarray::{Array1, Array2};

use crate::linalg::{SvdError, condition_number, decompose, pseudo_solve};

/// Least-squares fit through the normal equations `(MᵀM) α = Mᵀ f`.
///
/// `m` holds one basis row per sample and `outputs` one column per output.
/// Returns one coefficient vector per output and the condition number of `MᵀM`.
pub(super) fn fit(
    m: &Array2<f64>,
    outputs: &Array2<f64>,
    eps: f64,
    max_dim: usize,
) -> Result<(Vec<Array1<f64>>, f64), SvdError> {
    let svd = decompose(m.t().dot(m), Some(max_dim))?;
    let cond = condition_number(svd.w.view(), eps);

    let alpha = outputs
        .columns()
        .into_iter()
        .map(|f| pseudo_solve(&svd, m.t().dot(&f).view(), eps))
        .collect();
    Ok((alpha, cond))
}
