use mads_core::{EvalPoint, Snapshot, Success};

use super::{Simplex, StepType, StopReason};

/// The outcome of a Nelder-Mead pass driven through an
/// [`Evaluator`](mads_core::Evaluator).
#[derive(Debug, Clone)]
pub struct Report {
    /// Why the pass stopped.
    pub stop: StopReason,

    /// The best success over every evaluation of the pass.
    pub success: Success,

    /// Iterations completed or started.
    pub iters: usize,

    /// Reflective steps executed over all iterations.
    pub steps: usize,

    /// Evaluations that were not served from the cache.
    pub evals: usize,

    /// The simplex when the pass stopped.
    pub simplex: Simplex,
}

/// The result of a standalone Nelder-Mead minimization.
#[derive(Debug, Clone)]
pub struct Solution<I, O> {
    /// Why the solver stopped.
    pub status: StopReason,

    /// The best point found.
    pub x: Vec<f64>,

    /// Objective value at `x`.
    pub f: f64,

    /// Constraint violation at `x`.
    pub h: f64,

    /// Model snapshot at `x`.
    pub snapshot: Snapshot<I, O>,

    /// Iteration count when the solver finished.
    pub iters: usize,

    /// Blackbox evaluations made.
    pub evals: usize,
}

/// Trial points of one simplex, generated without evaluation.
#[derive(Debug, Clone)]
pub struct TrialPoints {
    /// Distinct trial points with the step that generated each.
    pub points: Vec<(StepType, EvalPoint)>,

    /// [`StopReason::SingleCompleted`], or why no point could be generated.
    pub stop: StopReason,
}
