use ndarray::{Array1, Array2};

use super::SvdError;

/// Maximum QR sweeps per singular value before giving up.
pub const MAX_ITERATIONS: usize = 30;

/// Singular value decomposition `A = U · diag(W) · Vᵀ`.
///
/// Singular values are non-negative but not sorted.
#[derive(Debug, Clone)]
pub struct Svd {
    /// Left singular vectors, `m × n`.
    pub u: Array2<f64>,

    /// Singular values, length `n`.
    pub w: Array1<f64>,

    /// Right singular vectors, `n × n`.
    pub v: Array2<f64>,
}

/// Householder bidiagonalization followed by implicit-shift QR (Golub–Reinsch).
///
/// `max_size` bounds `m + n`; larger matrices are rejected before any work.
///
/// # Errors
///
/// Returns [`SvdError::TooLarge`] above the size cap and
/// [`SvdError::NoConvergence`] if a singular value needs more than
/// [`MAX_ITERATIONS`] sweeps.
#[allow(clippy::too_many_lines, clippy::many_single_char_names)]
pub fn decompose(mut a: Array2<f64>, max_size: Option<usize>) -> Result<Svd, SvdError> {
    let (m, n) = a.dim();
    if let Some(max) = max_size
        && m + n > max
    {
        return Err(SvdError::TooLarge { size: m + n, max });
    }

    let mut w = Array1::<f64>::zeros(n);
    let mut v = Array2::<f64>::zeros((n, n));
    let mut rv1 = vec![0.0; n];

    let mut g = 0.0_f64;
    let mut scale = 0.0_f64;
    let mut anorm = 0.0_f64;
    let mut l = 0;

    // Householder reduction to bidiagonal form.
    for i in 0..n {
        l = i + 1;
        rv1[i] = scale * g;
        g = 0.0;
        scale = 0.0;
        if i < m {
            for k in i..m {
                scale += a[[k, i]].abs();
            }
            if scale != 0.0 {
                let mut s = 0.0;
                for k in i..m {
                    a[[k, i]] /= scale;
                    s += a[[k, i]] * a[[k, i]];
                }
                let f = a[[i, i]];
                g = if f >= 0.0 { -s.sqrt() } else { s.sqrt() };
                let h = f * g - s;
                a[[i, i]] = f - g;
                for j in l..n {
                    let mut s = 0.0;
                    for k in i..m {
                        s += a[[k, i]] * a[[k, j]];
                    }
                    let f = s / h;
                    for k in i..m {
                        a[[k, j]] += f * a[[k, i]];
                    }
                }
                for k in i..m {
                    a[[k, i]] *= scale;
                }
            }
        }
        w[i] = scale * g;

        g = 0.0;
        scale = 0.0;
        if i < m && i + 1 != n {
            for k in l..n {
                scale += a[[i, k]].abs();
            }
            if scale != 0.0 {
                let mut s = 0.0;
                for k in l..n {
                    a[[i, k]] /= scale;
                    s += a[[i, k]] * a[[i, k]];
                }
                let f = a[[i, l]];
                g = if f >= 0.0 { -s.sqrt() } else { s.sqrt() };
                let h = f * g - s;
                a[[i, l]] = f - g;
                for k in l..n {
                    rv1[k] = a[[i, k]] / h;
                }
                for j in l..m {
                    let mut s = 0.0;
                    for k in l..n {
                        s += a[[j, k]] * a[[i, k]];
                    }
                    for k in l..n {
                        a[[j, k]] += s * rv1[k];
                    }
                }
                for k in l..n {
                    a[[i, k]] *= scale;
                }
            }
        }
        anorm = anorm.max(w[i].abs() + rv1[i].abs());
    }

    // Accumulation of right-hand transformations.
    for i in (0..n).rev() {
        if i + 1 < n {
            if g != 0.0 {
                for j in l..n {
                    v[[j, i]] = (a[[i, j]] / a[[i, l]]) / g;
                }
                for j in l..n {
                    let mut s = 0.0;
                    for k in l..n {
                        s += a[[i, k]] * v[[k, j]];
                    }
                    for k in l..n {
                        v[[k, j]] += s * v[[k, i]];
                    }
                }
            }
            for j in l..n {
                v[[i, j]] = 0.0;
                v[[j, i]] = 0.0;
            }
        }
        v[[i, i]] = 1.0;
        g = rv1[i];
        l = i;
    }

    // Accumulation of left-hand transformations.
    for i in (0..m.min(n)).rev() {
        let l = i + 1;
        let mut g = w[i];
        for j in l..n {
            a[[i, j]] = 0.0;
        }
        if g != 0.0 {
            g = 1.0 / g;
            for j in l..n {
                let mut s = 0.0;
                for k in l..m {
                    s += a[[k, i]] * a[[k, j]];
                }
                let f = (s / a[[i, i]]) * g;
                for k in i..m {
                    a[[k, j]] += f * a[[k, i]];
                }
            }
            for j in i..m {
                a[[j, i]] *= g;
            }
        } else {
            for j in i..m {
                a[[j, i]] = 0.0;
            }
        }
        a[[i, i]] += 1.0;
    }

    // Diagonalization of the bidiagonal form.
    for k in (0..n).rev() {
        for its in 1..=MAX_ITERATIONS {
            // Test for splitting.
            let mut split_at_zero_w = true;
            let mut l = k;
            let mut nm = 0;
            loop {
                if l == 0 || rv1[l].abs() + anorm == anorm {
                    split_at_zero_w = false;
                    break;
                }
                nm = l - 1;
                if w[nm].abs() + anorm == anorm {
                    break;
                }
                l -= 1;
            }

            // Cancellation of rv1[l] when w[nm] is negligible.
            if split_at_zero_w {
                let mut c = 0.0;
                let mut s = 1.0;
                for i in l..=k {
                    let f = s * rv1[i];
                    rv1[i] *= c;
                    if f.abs() + anorm == anorm {
                        break;
                    }
                    let g = w[i];
                    let h = f.hypot(g);
                    w[i] = h;
                    let h = 1.0 / h;
                    c = g * h;
                    s = -f * h;
                    for j in 0..m {
                        let y = a[[j, nm]];
                        let z = a[[j, i]];
                        a[[j, nm]] = y * c + z * s;
                        a[[j, i]] = z * c - y * s;
                    }
                }
            }

            let z = w[k];
            if l == k {
                // Converged; make the singular value non-negative.
                if z < 0.0 {
                    w[k] = -z;
                    for j in 0..n {
                        v[[j, k]] = -v[[j, k]];
                    }
                }
                break;
            }
            if its == MAX_ITERATIONS {
                return Err(SvdError::NoConvergence {
                    iterations: MAX_ITERATIONS,
                });
            }

            // Shift from the bottom 2x2 minor.
            let mut x = w[l];
            let nm = k - 1;
            let mut y = w[nm];
            let mut g = rv1[nm];
            let mut h = rv1[k];
            let mut f = ((y - z) * (y + z) + (g - h) * (g + h)) / (2.0 * h * y);
            g = f.hypot(1.0);
            let signed_g = if f >= 0.0 { g.abs() } else { -g.abs() };
            f = ((x - z) * (x + z) + h * ((y / (f + signed_g)) - h)) / x;

            // Next QR transformation.
            let mut c = 1.0;
            let mut s = 1.0;
            for j in l..=nm {
                let i = j + 1;
                g = rv1[i];
                y = w[i];
                h = s * g;
                g *= c;
                let mut z = f.hypot(h);
                rv1[j] = z;
                c = f / z;
                s = h / z;
                f = x * c + g * s;
                g = g * c - x * s;
                h = y * s;
                y *= c;
                for jj in 0..n {
                    let x = v[[jj, j]];
                    let z = v[[jj, i]];
                    v[[jj, j]] = x * c + z * s;
                    v[[jj, i]] = z * c - x * s;
                }
                z = f.hypot(h);
                w[j] = z;
                if z != 0.0 {
                    let inv = 1.0 / z;
                    c = f * inv;
                    s = h * inv;
                }
                f = c * g + s * y;
                x = c * y - s * g;
                for jj in 0..m {
                    let y = a[[jj, j]];
                    let z = a[[jj, i]];
                    a[[jj, j]] = y * c + z * s;
                    a[[jj, i]] = z * c - y * s;
                }
            }
            rv1[l] = 0.0;
            rv1[k] = f;
            w[k] = x;
        }
    }

    Ok(Svd { u: a, w, v })
}
