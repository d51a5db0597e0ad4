use ndarray::{Array1, ArrayView1};

/// Monomial basis of a quadratic in the free variables.
///
/// Terms are ordered as the constant, the linear terms, the halved squares,
/// then the cross products `y_i y_j` (`i < j`) in lexicographic order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct Basis {
    n: usize,
    free: Vec<usize>,
}

impl Basis {
    pub(super) fn new(fixed: &[bool]) -> Self {
        Self {
            n: fixed.len(),
            free: (0..fixed.len()).filter(|&i| !fixed[i]).collect(),
        }
    }

    pub(super) fn nfree(&self) -> usize {
        self.free.len()
    }

    /// Number of coefficients, `(nfree + 1)(nfree + 2) / 2`.
    pub(super) fn len(&self) -> usize {
        let q = self.nfree();
        (q + 1) * (q + 2) / 2
    }

    /// Number of constant and linear terms.
    pub(super) fn linear_len(&self) -> usize {
        self.nfree() + 1
    }

    pub(super) fn row(&self, y: &[f64]) -> Array1<f64> {
        let mut row = Vec::with_capacity(self.len());
        row.push(1.0);
        row.extend(self.free.iter().map(|&i| y[i]));
        row.extend(self.free.iter().map(|&i| 0.5 * y[i] * y[i]));
        for (a, &i) in self.free.iter().enumerate() {
            for &j in &self.free[a + 1..] {
                row.push(y[i] * y[j]);
            }
        }
        Array1::from(row)
    }

    pub(super) fn value(&self, y: &[f64], alpha: ArrayView1<'_, f64>) -> f64 {
        self.row(y).dot(&alpha)
    }

    /// Gradient in all `n` variables; fixed variables get zero.
    pub(super) fn gradient(&self, y: &[f64], alpha: ArrayView1<'_, f64>) -> Vec<f64> {
        let q = self.nfree();
        let mut g = vec![0.0; self.n];
        for (a, &i) in self.free.iter().enumerate() {
            g[i] = alpha[1 + a] + alpha[1 + q + a] * y[i];
        }
        let mut k = 1 + 2 * q;
        for (a, &i) in self.free.iter().enumerate() {
            for &j in &self.free[a + 1..] {
                g[i] += alpha[k] * y[j];
                g[j] += alpha[k] * y[i];
                k += 1;
            }
        }
        g
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    fn row_skips_fixed_variables() {
        let basis = Basis::new(&[false, true, false]);
        assert_eq!(basis.nfree(), 2);
        assert_eq!(basis.len(), 6);

        let row = basis.row(&[2.0, 100.0, 3.0]);
        assert_eq!(row, array![1.0, 2.0, 3.0, 2.0, 4.5, 6.0]);
    }

    #[test]
    fn gradient_matches_finite_differences() {
        let basis = Basis::new(&[false, false]);
        let alpha = array![0.5, 1.0, -2.0, 3.0, 0.25, -1.5];
        let y = [0.3, -0.7];

        let g = basis.gradient(&y, alpha.view());
        let h = 1e-6;
        for i in 0..2 {
            let mut up = y;
            let mut down = y;
            up[i] += h;
            down[i] -= h;
            let fd = (basis.value(&up, alpha.view()) - basis.value(&down, alpha.view())) / (2.0 * h);
            assert_relative_eq!(g[i], fd, epsilon = 1e-8);
        }
    }
}
