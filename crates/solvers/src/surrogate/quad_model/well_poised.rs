use ndarray::{Array1, Array2};

use super::{basis::Basis, diagnostics::max_relative_error};

/// Lagrange values below this magnitude are treated as zero.
const POISED_TOL: f64 = 1e-15;

/// Pivot swaps attempted after the initial selection.
const MAX_SWAPS: usize = 10;

/// Fits on a well-poised subset of exactly `basis.len()` samples.
///
/// Lagrange polynomials are built one at a time, each anchored at the remaining
/// sample where it is largest in magnitude. Afterwards, anchors are swapped for
/// unused samples as long as the largest relative error over all samples
/// decreases. Returns `None` if the samples are not poised.
pub(super) fn fit(
    basis: &Basis,
    samples: &[Vec<f64>],
    outputs: &Array2<f64>,
) -> Option<Vec<Array1<f64>>> {
    let na = basis.len();
    let rows: Vec<Array1<f64>> = samples.iter().map(|y| basis.row(y)).collect();

    let mut lagrange: Vec<Array1<f64>> = (0..na)
        .map(|i| {
            let mut e = Array1::zeros(na);
            e[i] = 1.0;
            e
        })
        .collect();

    let mut pool: Vec<usize> = (0..samples.len()).collect();
    let mut anchors = vec![pool.swap_remove(0)];

    for i in 0..na {
        if i > 0 {
            let (k, _) = argmax(&lagrange[i], &pool, &rows)?;
            anchors.push(pool.swap_remove(k));
        }

        let yi = &rows[anchors[i]];
        let liyi = lagrange[i].dot(yi);
        if liyi.abs() < POISED_TOL {
            log::debug!("well-poised fit: samples are not poised");
            return None;
        }
        lagrange[i].mapv_inplace(|c| flush(c / liyi));

        let li = lagrange[i].clone();
        for (j, lj) in lagrange.iter_mut().enumerate() {
            if j != i {
                let ljyi = lj.dot(yi);
                lj.zip_mut_with(&li, |a, b| *a = flush(*a - ljyi * b));
            }
        }
    }

    let mut alpha = combine(&lagrange, &anchors, outputs);

    let Some(mut current) = max_relative_error(basis, samples, outputs, &alpha)
        .filter(|e| *e > POISED_TOL)
    else {
        return Some(alpha);
    };

    for _ in 0..MAX_SWAPS {
        let mut best: Option<(usize, usize, f64)> = None;
        for (i, li) in lagrange.iter().enumerate() {
            if let Some((k, v)) = argmax(li, &pool, &rows)
                && best.is_none_or(|(_, _, max)| v > max)
            {
                best = Some((i, k, v));
            }
        }
        let Some((ik, k, _)) = best else {
            break;
        };

        anchors[ik] = pool.swap_remove(k);
        let yk = &rows[anchors[ik]];
        let lkyk = lagrange[ik].dot(yk);
        if lkyk.abs() <= POISED_TOL {
            break;
        }
        lagrange[ik] /= lkyk;

        let lk = lagrange[ik].clone();
        for (j, lj) in lagrange.iter_mut().enumerate() {
            if j != ik {
                let ljyk = lj.dot(yk);
                lj.zip_mut_with(&lk, |a, b| *a -= ljyk * b);
            }
        }

        let candidate = combine(&lagrange, &anchors, outputs);
        match max_relative_error(basis, samples, outputs, &candidate) {
            Some(err) if err < current => {
                log::debug!("well-poised fit: swap improved max relative error to {err:e}");
                alpha = candidate;
                current = err;
            }
            _ => break,
        }
    }

    Some(alpha)
}

fn flush(c: f64) -> f64 {
    if c.abs() < POISED_TOL { 0.0 } else { c }
}

/// Position in `pool` of the sample where `|l|` is largest, with that value.
fn argmax(l: &Array1<f64>, pool: &[usize], rows: &[Array1<f64>]) -> Option<(usize, f64)> {
    let mut best: Option<(usize, f64)> = None;
    for (k, &s) in pool.iter().enumerate() {
        let v = l.dot(&rows[s]).abs();
        if v > best.map_or(-1.0, |(_, max)| max) {
            best = Some((k, v));
        }
    }
    best
}

/// Coefficients `α_j = Σ_k f(y_k) l_k` for every output column `j`.
fn combine(lagrange: &[Array1<f64>], anchors: &[usize], outputs: &Array2<f64>) -> Vec<Array1<f64>> {
    outputs
        .columns()
        .into_iter()
        .map(|f| {
            let mut alpha = Array1::<f64>::zeros(lagrange.len());
            for (l, &s) in lagrange.iter().zip(anchors) {
                alpha.scaled_add(f[s], l);
            }
            alpha
        })
        .collect()
}
