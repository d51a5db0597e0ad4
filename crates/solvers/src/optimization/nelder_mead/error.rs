/// Errors that can occur when starting a Nelder-Mead pass.
///
/// Problems found while iterating are not errors: they end the pass with a
/// [`StopReason`](super::StopReason).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    /// The barrier has neither a feasible nor an infeasible incumbent.
    #[error("no frame center: the barrier holds no incumbent")]
    NoFrameCenter,

    /// A point, domain, or mesh does not have the problem dimension.
    #[error("dimension mismatch: expected {expected}, found {found}")]
    Dimension { expected: usize, found: usize },

    /// No evaluation succeeded, so there is nothing to report.
    #[error("no successful evaluation")]
    NoSuccessfulEvaluation,
}
