use thiserror::Error;

#[cfg(feature = "serde-derive")]
use serde::{Deserialize, Serialize};

/// Configuration for fitting a quadratic model.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde-derive", derive(Serialize, Deserialize))]
pub struct Config {
    use_well_poised: bool,
    eps: f64,
    max_condition_dim: usize,
    max_samples: usize,
    radius: f64,
    box_factor: f64,
    min_points: usize,
}

/// Errors that can occur when validating a quadratic model config.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    #[error("eps must be finite and positive")]
    Eps,

    #[error("max_condition_dim must be at least 2")]
    ConditionDim,

    #[error("max_samples must be positive")]
    MaxSamples,

    #[error("radius must be finite and positive")]
    Radius,

    #[error("box_factor must be finite and positive")]
    BoxFactor,
}

impl Default for Config {
    fn default() -> Self {
        // Known-good values, unwrap is safe
        Self::new(1e-13, 1500, 500).unwrap()
    }
}

impl Config {
    /// Creates a config with the given SVD threshold and size caps.
    ///
    /// Singular values at or below `eps` are treated as zero. The SVD is
    /// refused for matrices with more than `max_condition_dim` rows plus
    /// columns, and construction is refused above `max_samples` samples.
    ///
    /// # Errors
    ///
    /// Returns an error if `eps` is not positive or a cap is too small.
    pub fn new(eps: f64, max_condition_dim: usize, max_samples: usize) -> Result<Self, ConfigError> {
        if !eps.is_finite() || eps <= 0.0 {
            return Err(ConfigError::Eps);
        }
        if max_condition_dim < 2 {
            return Err(ConfigError::ConditionDim);
        }
        if max_samples == 0 {
            return Err(ConfigError::MaxSamples);
        }

        Ok(Self {
            use_well_poised: false,
            eps,
            max_condition_dim,
            max_samples,
            radius: 1.0,
            box_factor: 4.0,
            min_points: 1,
        })
    }

    /// Enables the well-poised Lagrange fit for over-determined sample sets.
    #[must_use]
    pub fn with_well_poised(mut self, use_well_poised: bool) -> Self {
        self.use_well_poised = use_well_poised;
        self
    }

    /// Sets the half-width of the scaled sample box.
    ///
    /// # Errors
    ///
    /// Returns an error if `radius` is not finite and positive.
    pub fn with_radius(mut self, radius: f64) -> Result<Self, ConfigError> {
        if !radius.is_finite() || radius <= 0.0 {
            return Err(ConfigError::Radius);
        }
        self.radius = radius;
        Ok(self)
    }

    /// Sets the training box size as a multiple of the frame size.
    ///
    /// # Errors
    ///
    /// Returns an error if `box_factor` is not finite and positive.
    pub fn with_box_factor(mut self, box_factor: f64) -> Result<Self, ConfigError> {
        if !box_factor.is_finite() || box_factor <= 0.0 {
            return Err(ConfigError::BoxFactor);
        }
        self.box_factor = box_factor;
        Ok(self)
    }

    /// Sets the fewest training points a model may be built from.
    #[must_use]
    pub fn with_min_points(mut self, min_points: usize) -> Self {
        self.min_points = min_points;
        self
    }

    #[must_use]
    pub fn use_well_poised(&self) -> bool {
        self.use_well_poised
    }

    /// Returns the singular value threshold.
    #[must_use]
    pub fn eps(&self) -> f64 {
        self.eps
    }

    /// Returns the cap on `rows + columns` of any decomposed matrix.
    #[must_use]
    pub fn max_condition_dim(&self) -> usize {
        self.max_condition_dim
    }

    /// Returns the maximum number of samples, also the training set size.
    #[must_use]
    pub fn max_samples(&self) -> usize {
        self.max_samples
    }

    #[must_use]
    pub fn radius(&self) -> f64 {
        self.radius
    }

    #[must_use]
    pub fn box_factor(&self) -> f64 {
        self.box_factor
    }

    #[must_use]
    pub fn min_points(&self) -> usize {
        self.min_points
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validates_fields() {
        assert_eq!(Config::new(0.0, 1500, 500), Err(ConfigError::Eps));
        assert_eq!(Config::new(1e-13, 1, 500), Err(ConfigError::ConditionDim));
        assert_eq!(Config::new(1e-13, 1500, 0), Err(ConfigError::MaxSamples));
        assert_eq!(
            Config::default().with_radius(f64::NAN),
            Err(ConfigError::Radius)
        );
        assert_eq!(
            Config::default().with_box_factor(-1.0),
            Err(ConfigError::BoxFactor)
        );
    }
}
