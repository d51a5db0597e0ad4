use thiserror::Error;

#[cfg(feature = "serde-derive")]
use serde::{Deserialize, Serialize};

/// Reflection factor. Fixed, unlike the other step factors.
pub const DELTA_R: f64 = 1.0;

/// Rank threshold when Nelder-Mead runs as a search step.
pub const SEARCH_RANK_EPS: f64 = 0.01;

/// Rank threshold when Nelder-Mead runs as a standalone optimizer.
pub const STANDALONE_RANK_EPS: f64 = 1e-13;

/// Who drives the Nelder-Mead iterations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde-derive", derive(Serialize, Deserialize))]
pub enum Role {
    /// Nelder-Mead is the optimizer; it shrinks its simplex when stuck.
    Standalone,

    /// Nelder-Mead proposes points for an enclosing direct search, which owns
    /// the mesh; a needed shrink ends the pass instead.
    Search,
}

/// What an insertion does with the simplex when the rank check fails.
///
/// The insertion reports failure either way and the simplex size is unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde-derive", derive(Serialize, Deserialize))]
pub enum RankFailurePolicy {
    /// Restore the simplex to its contents before the insertion.
    #[default]
    Revert,

    /// Keep the new contents and mark the simplex degenerate.
    Keep,
}

/// Configuration for the Nelder-Mead solver.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde-derive", derive(Serialize, Deserialize))]
pub struct Config {
    role: Role,
    delta_e: f64,
    delta_oc: f64,
    delta_ic: f64,
    gamma: f64,
    rank_eps: f64,
    include_factor: usize,
    include_length: f64,
    trial_factor: usize,
    stop_on_success: bool,
    max_steps: usize,
    max_iters: usize,
    rank_failure: RankFailurePolicy,
    initial_step: f64,
}

/// Errors that can occur when validating a Nelder-Mead config.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    #[error("delta_e must be finite and greater than 1")]
    DeltaE,

    #[error("delta_oc must be in [0, 1]")]
    DeltaOc,

    #[error("delta_ic must be finite and non-positive")]
    DeltaIc,

    #[error("gamma must be in (0, 1)")]
    Gamma,

    #[error("rank_eps must be finite and positive")]
    RankEps,

    #[error("include_length must be positive")]
    IncludeLength,

    #[error("initial_step must be finite and positive")]
    InitialStep,
}

impl Default for Config {
    fn default() -> Self {
        // Known-good values, unwrap is safe
        Self::new(Role::Standalone, 2.0, 0.5, -0.5).unwrap()
    }
}

impl Config {
    /// Creates a config with validated step factors.
    ///
    /// The rank threshold defaults to the value suited to `role`; the other
    /// settings start at their defaults and can be changed with the `with_*`
    /// methods.
    ///
    /// # Errors
    ///
    /// Returns an error if `delta_e <= 1`, `delta_oc` is outside `[0, 1]`, or
    /// `delta_ic > 0`.
    pub fn new(role: Role, delta_e: f64, delta_oc: f64, delta_ic: f64) -> Result<Self, ConfigError> {
        if !delta_e.is_finite() || delta_e <= 1.0 {
            return Err(ConfigError::DeltaE);
        }
        if !(0.0..=1.0).contains(&delta_oc) {
            return Err(ConfigError::DeltaOc);
        }
        if !delta_ic.is_finite() || delta_ic > 0.0 {
            return Err(ConfigError::DeltaIc);
        }

        let rank_eps = match role {
            Role::Standalone => STANDALONE_RANK_EPS,
            Role::Search => SEARCH_RANK_EPS,
        };
        Ok(Self {
            role,
            delta_e,
            delta_oc,
            delta_ic,
            gamma: 0.5,
            rank_eps,
            include_factor: 8,
            include_length: f64::INFINITY,
            trial_factor: 80,
            stop_on_success: false,
            max_steps: 100,
            max_iters: 1000,
            rank_failure: RankFailurePolicy::Revert,
            initial_step: 1.0,
        })
    }

    /// The default config for running as a search step.
    #[must_use]
    pub fn search() -> Self {
        // Known-good values, unwrap is safe
        Self::new(Role::Search, 2.0, 0.5, -0.5).unwrap()
    }

    /// Sets the shrink factor `γ`.
    ///
    /// # Errors
    ///
    /// Returns an error unless `0 < gamma < 1`.
    pub fn with_gamma(mut self, gamma: f64) -> Result<Self, ConfigError> {
        if !(gamma > 0.0 && gamma < 1.0) {
            return Err(ConfigError::Gamma);
        }
        self.gamma = gamma;
        Ok(self)
    }

    /// Sets the singular value threshold for rank checks.
    ///
    /// # Errors
    ///
    /// Returns an error if `rank_eps` is not finite and positive.
    pub fn with_rank_eps(mut self, rank_eps: f64) -> Result<Self, ConfigError> {
        if !rank_eps.is_finite() || rank_eps <= 0.0 {
            return Err(ConfigError::RankEps);
        }
        self.rank_eps = rank_eps;
        Ok(self)
    }

    /// Sets the inclusion box for the initial simplex to `factor` frame sizes.
    ///
    /// Zero disables the frame-based box in favor of the include length.
    #[must_use]
    pub fn with_include_factor(mut self, factor: usize) -> Self {
        self.include_factor = factor;
        self
    }

    /// Sets the inclusion box half-width used when there is no frame.
    ///
    /// # Errors
    ///
    /// Returns an error unless `length > 0`. Infinity is allowed.
    pub fn with_include_length(mut self, length: f64) -> Result<Self, ConfigError> {
        if length.is_nan() || length <= 0.0 {
            return Err(ConfigError::IncludeLength);
        }
        self.include_length = length;
        Ok(self)
    }

    /// Sets the per-pass budget of a search to `factor × n` evaluations.
    #[must_use]
    pub fn with_trial_factor(mut self, factor: usize) -> Self {
        self.trial_factor = factor;
        self
    }

    #[must_use]
    pub fn with_stop_on_success(mut self, stop_on_success: bool) -> Self {
        self.stop_on_success = stop_on_success;
        self
    }

    /// Sets the ceiling on reflective steps within one iteration.
    #[must_use]
    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    /// Sets the maximum number of iterations in one pass.
    #[must_use]
    pub fn with_max_iters(mut self, max_iters: usize) -> Self {
        self.max_iters = max_iters;
        self
    }

    #[must_use]
    pub fn with_rank_failure(mut self, policy: RankFailurePolicy) -> Self {
        self.rank_failure = policy;
        self
    }

    /// Sets the edge length of the initial simplex built around `x0`.
    ///
    /// # Errors
    ///
    /// Returns an error if `step` is not finite and positive.
    pub fn with_initial_step(mut self, step: f64) -> Result<Self, ConfigError> {
        if !step.is_finite() || step <= 0.0 {
            return Err(ConfigError::InitialStep);
        }
        self.initial_step = step;
        Ok(self)
    }

    #[must_use]
    pub fn role(&self) -> Role {
        self.role
    }

    #[must_use]
    pub fn delta_e(&self) -> f64 {
        self.delta_e
    }

    #[must_use]
    pub fn delta_oc(&self) -> f64 {
        self.delta_oc
    }

    #[must_use]
    pub fn delta_ic(&self) -> f64 {
        self.delta_ic
    }

    #[must_use]
    pub fn gamma(&self) -> f64 {
        self.gamma
    }

    #[must_use]
    pub fn rank_eps(&self) -> f64 {
        self.rank_eps
    }

    #[must_use]
    pub fn include_factor(&self) -> usize {
        self.include_factor
    }

    #[must_use]
    pub fn include_length(&self) -> f64 {
        self.include_length
    }

    #[must_use]
    pub fn trial_factor(&self) -> usize {
        self.trial_factor
    }

    #[must_use]
    pub fn stop_on_success(&self) -> bool {
        self.stop_on_success
    }

    #[must_use]
    pub fn max_steps(&self) -> usize {
        self.max_steps
    }

    #[must_use]
    pub fn max_iters(&self) -> usize {
        self.max_iters
    }

    #[must_use]
    pub fn rank_failure(&self) -> RankFailurePolicy {
        self.rank_failure
    }

    #[must_use]
    pub fn initial_step(&self) -> f64 {
        self.initial_step
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_invalid_deltas() {
        let role = Role::Standalone;
        assert_eq!(Config::new(role, 1.0, 0.5, -0.5), Err(ConfigError::DeltaE));
        assert_eq!(Config::new(role, 2.0, 1.5, -0.5), Err(ConfigError::DeltaOc));
        assert_eq!(Config::new(role, 2.0, -0.1, -0.5), Err(ConfigError::DeltaOc));
        assert_eq!(Config::new(role, 2.0, 0.5, 0.1), Err(ConfigError::DeltaIc));
    }

    #[test]
    fn accepts_boundary_deltas() {
        let role = Role::Standalone;
        assert!(Config::new(role, 1.000_001, 0.0, 0.0).is_ok());
        assert!(Config::new(role, 2.0, 1.0, -1.0).is_ok());
    }

    #[test]
    fn rank_eps_follows_role() {
        assert_eq!(Config::default().rank_eps(), STANDALONE_RANK_EPS);
        assert_eq!(Config::search().rank_eps(), SEARCH_RANK_EPS);
        assert_eq!(Config::search().role(), Role::Search);
    }

    #[test]
    fn setters_validate() {
        let config = Config::default();
        assert_eq!(config.with_gamma(1.0), Err(ConfigError::Gamma));
        assert_eq!(config.with_rank_eps(0.0), Err(ConfigError::RankEps));
        assert_eq!(config.with_include_length(-1.0), Err(ConfigError::IncludeLength));
        assert_eq!(config.with_initial_step(f64::NAN), Err(ConfigError::InitialStep));
        assert!(config.with_include_length(f64::INFINITY).is_ok());
    }
}
