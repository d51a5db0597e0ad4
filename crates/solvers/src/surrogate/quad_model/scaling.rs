#[cfg(feature = "serde-derive")]
use serde::{Deserialize, Serialize};

/// Affine map between raw coordinates and the model's scaled coordinates.
///
/// Each dimension is centered at the midpoint of the sample range and divided
/// by a factor that puts the farthest sample at the configured radius. A zero
/// factor marks a dimension with no spread; it is only shifted.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde-derive", derive(Serialize, Deserialize))]
pub struct Scaling {
    reference: Vec<f64>,
    factor: Vec<f64>,
    radius: f64,
}

impl Scaling {
    pub(super) fn fit(samples: &[Vec<f64>], n: usize, radius: f64) -> Self {
        let mut reference = vec![0.0; n];
        let mut factor = vec![0.0; n];
        for i in 0..n {
            let min = samples.iter().map(|y| y[i]).fold(f64::INFINITY, f64::min);
            let max = samples.iter().map(|y| y[i]).fold(f64::NEG_INFINITY, f64::max);
            let center = (min + max) / 2.0;
            let spread = samples
                .iter()
                .map(|y| (y[i] - center).abs())
                .fold(0.0, f64::max);
            reference[i] = center;
            factor[i] = spread / radius;
        }
        Self {
            reference,
            factor,
            radius,
        }
    }

    #[must_use]
    pub fn reference(&self) -> &[f64] {
        &self.reference
    }

    #[must_use]
    pub fn factor(&self) -> &[f64] {
        &self.factor
    }

    /// Half-width of the scaled box the samples were mapped into.
    #[must_use]
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Returns true if dimension `i` had no spread in the samples.
    #[must_use]
    pub fn is_degenerate(&self, i: usize) -> bool {
        self.factor[i] == 0.0
    }

    #[must_use]
    pub fn scale(&self, x: &[f64]) -> Vec<f64> {
        x.iter()
            .zip(self.reference.iter().zip(&self.factor))
            .map(|(v, (r, s))| if *s == 0.0 { v - r } else { (v - r) / s })
            .collect()
    }

    #[must_use]
    pub fn unscale(&self, x: &[f64]) -> Vec<f64> {
        x.iter()
            .zip(self.reference.iter().zip(&self.factor))
            .map(|(v, (r, s))| if *s == 0.0 { v + r } else { v * s + r })
            .collect()
    }

    /// Multiplies each gradient component by its scaling factor.
    #[must_use]
    pub fn unscale_grad(&self, g: &[f64]) -> Vec<f64> {
        g.iter().zip(&self.factor).map(|(v, s)| v * s).collect()
    }
}
