use ndarray::{Array1, Array2, s};

use crate::linalg::{SvdError, condition_number, decompose, pseudo_solve};

/// Minimum Frobenius norm interpolation.
///
/// Among the quadratics interpolating the samples, picks the one whose
/// quadratic coefficients have the smallest norm. `linear` holds the constant
/// and linear basis terms of each sample and `quadratic` the remaining terms.
/// Solves
///
/// ```text
/// [ Q Qᵀ  L ] [ μ ]   [ f ]
/// [ Lᵀ    0 ] [ a ] = [ 0 ]
/// ```
///
/// and returns `[a, Qᵀμ]` per output, with the condition number of the system.
pub(super) fn fit(
    linear: &Array2<f64>,
    quadratic: &Array2<f64>,
    outputs: &Array2<f64>,
    eps: f64,
    max_dim: usize,
) -> Result<(Vec<Array1<f64>>, f64), SvdError> {
    let p1 = linear.nrows();
    let nl = linear.ncols();
    let size = p1 + nl;

    let mut f = Array2::<f64>::zeros((size, size));
    f.slice_mut(s![..p1, ..p1])
        .assign(&quadratic.dot(&quadratic.t()));
    f.slice_mut(s![..p1, p1..]).assign(linear);
    f.slice_mut(s![p1.., ..p1]).assign(&linear.t());

    let svd = decompose(f, Some(max_dim))?;
    let cond = condition_number(svd.w.view(), eps);

    let alpha = outputs
        .columns()
        .into_iter()
        .map(|values| {
            let mut rhs = Array1::<f64>::zeros(size);
            rhs.slice_mut(s![..p1]).assign(&values);
            let sol = pseudo_solve(&svd, rhs.view(), eps);

            let mu = sol.slice(s![..p1]);
            let mut alpha = Array1::<f64>::zeros(nl + quadratic.ncols());
            alpha.slice_mut(s![..nl]).assign(&sol.slice(s![p1..]));
            alpha.slice_mut(s![nl..]).assign(&quadratic.t().dot(&mu));
            alpha
        })
        .collect();
    Ok((alpha, cond))
}
