use crate::{Cache, EvalPoint, EvalType, StopSignal};

/// The result of asking an [`Evaluator`] for a point.
#[derive(Debug, Clone)]
pub struct Evaluation {
    /// The point with its evaluation attached.
    pub point: EvalPoint,

    /// False if the evaluation was served from the cache.
    pub needed_eval: bool,
}

/// Evaluates points and remembers the results.
///
/// Implementations decide what "evaluate" means: calling the true blackbox or
/// querying a surrogate. Evaluation failures are reported through the point's
/// [`EvalStatus`](crate::EvalStatus), not as errors.
pub trait Evaluator {
    /// The kind of evaluation this evaluator produces.
    fn eval_type(&self) -> EvalType;

    /// Points evaluated so far.
    fn cache(&self) -> &Cache;

    /// The signal raised when the evaluation budget is spent.
    fn stop_signal(&self) -> &StopSignal;

    /// Evaluates `point`, or returns the cached result for the same coordinates.
    ///
    /// Returns `None` without evaluating when a stop has been requested.
    fn evaluate(&mut self, point: EvalPoint) -> Option<Evaluation>;
}
