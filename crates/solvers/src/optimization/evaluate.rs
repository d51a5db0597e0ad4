use thiserror::Error;

use mads_core::{
    BlackboxProblem, Cache, Eval, EvalPoint, EvalType, Evaluation, Evaluator, Model, OutputSpec,
    Snapshot, StopSignal,
};

/// The result of evaluating a blackbox problem at a given `x`.
#[derive(Debug, Clone)]
pub struct Sample<I, O> {
    pub x: Vec<f64>,

    /// Raw outputs, in the order described by the [`OutputSpec`].
    pub outputs: Vec<f64>,

    pub snapshot: Snapshot<I, O>,
}

/// Errors that can occur when evaluating a blackbox problem.
#[derive(Debug, Error)]
pub enum EvalError<ME, PE> {
    /// The model call failed.
    #[error("model call failed")]
    Model(#[source] ME),

    /// Failed to construct input or compute the outputs.
    #[error("problem error")]
    Problem(#[source] PE),
}

/// Type alias for the result of [`evaluate`].
pub type EvaluateResult<M, P> = Result<
    Sample<<M as Model>::Input, <M as Model>::Output>,
    EvalError<<M as Model>::Error, <P as BlackboxProblem>::Error>,
>;

/// Evaluates the model in the context of a blackbox problem.
///
/// This function maps `x` to model input, calls the model, then reads the
/// raw outputs from the input and output.
///
/// # Errors
///
/// Returns an error if input mapping, model call, or output extraction fails.
pub fn evaluate<M, P>(model: &M, problem: &P, x: &[f64]) -> EvaluateResult<M, P>
where
    M: Model,
    P: BlackboxProblem<Input = M::Input, Output = M::Output>,
{
    let input = problem.input(x).map_err(EvalError::Problem)?;
    let output = model.call(&input).map_err(EvalError::Model)?;
    let outputs = problem
        .outputs(&input, &output)
        .map_err(EvalError::Problem)?;

    Ok(Sample {
        x: x.to_vec(),
        outputs,
        snapshot: Snapshot::new(input, output),
    })
}

/// Evaluates points by calling the true blackbox.
///
/// Results are stored as [`EvalType::Blackbox`] evaluations in a [`Cache`],
/// so a point is never evaluated twice. A failed model or problem call is
/// logged and recorded as a failed evaluation rather than returned as an
/// error; the solvers treat it like any other unusable point.
///
/// With a budget, the evaluator raises its [`StopSignal`] once the budget is
/// spent, and refuses further work while the signal is up.
pub struct BlackboxEvaluator<'a, M, P>
where
    M: Model,
{
    model: &'a M,
    problem: &'a P,
    spec: OutputSpec,
    cache: Cache,
    stop: StopSignal,
    budget: Option<usize>,
    evals: usize,
    best: Best<M::Input, M::Output>,
}

impl<'a, M, P> BlackboxEvaluator<'a, M, P>
where
    M: Model,
    P: BlackboxProblem<Input = M::Input, Output = M::Output>,
{
    #[must_use]
    pub fn new(model: &'a M, problem: &'a P, spec: OutputSpec) -> Self {
        Self {
            model,
            problem,
            spec,
            cache: Cache::new(),
            stop: StopSignal::new(),
            budget: None,
            evals: 0,
            best: Best::empty(),
        }
    }

    /// Starts from an existing cache of evaluated points.
    #[must_use]
    pub fn with_cache(mut self, cache: Cache) -> Self {
        self.cache = cache;
        self
    }

    /// Raises the stop signal once `budget` blackbox calls have been made.
    #[must_use]
    pub fn with_budget(mut self, budget: usize) -> Self {
        self.budget = Some(budget);
        self
    }

    /// Shares an existing stop signal.
    #[must_use]
    pub fn with_stop_signal(mut self, stop: StopSignal) -> Self {
        self.stop = stop;
        self
    }

    #[must_use]
    pub fn output_spec(&self) -> &OutputSpec {
        &self.spec
    }

    /// Number of blackbox calls made so far.
    #[must_use]
    pub fn evals(&self) -> usize {
        self.evals
    }

    /// The best point evaluated by this evaluator, if any.
    #[must_use]
    pub fn best(&self) -> Option<&EvalPoint> {
        self.best.point.as_ref()
    }

    /// Consumes the evaluator, returning the best point with its model snapshot.
    #[must_use]
    pub fn into_best(self) -> Option<(EvalPoint, Snapshot<M::Input, M::Output>)> {
        self.best.into_parts()
    }

    /// Consumes the evaluator, returning its cache.
    #[must_use]
    pub fn into_cache(self) -> Cache {
        self.cache
    }

    fn call(&mut self, point: &EvalPoint) -> Eval {
        let Some(x) = point.x().values() else {
            log::warn!("cannot evaluate incomplete point {}", point.x());
            return Eval::failed();
        };
        match evaluate(self.model, self.problem, &x) {
            Ok(sample) if sample.outputs.len() == self.spec.len() => {
                let eval = Eval::from_outputs(&sample.outputs, &self.spec);
                let mut evaluated = point.clone();
                evaluated.set_eval(EvalType::Blackbox, eval.clone());
                self.best.update(evaluated, sample.snapshot);
                eval
            }
            Ok(sample) => {
                log::warn!(
                    "blackbox returned {} outputs at {}, expected {}",
                    sample.outputs.len(),
                    point.x(),
                    self.spec.len()
                );
                Eval::failed()
            }
            Err(error) => {
                log::warn!("blackbox evaluation failed at {}: {error}", point.x());
                Eval::failed()
            }
        }
    }
}

impl<M, P> Evaluator for BlackboxEvaluator<'_, M, P>
where
    M: Model,
    P: BlackboxProblem<Input = M::Input, Output = M::Output>,
{
    fn eval_type(&self) -> EvalType {
        EvalType::Blackbox
    }

    fn cache(&self) -> &Cache {
        &self.cache
    }

    fn stop_signal(&self) -> &StopSignal {
        &self.stop
    }

    fn evaluate(&mut self, mut point: EvalPoint) -> Option<Evaluation> {
        if self.stop.is_requested() {
            return None;
        }
        if let Some(cached) = self.cache.get(point.x())
            && cached.eval(EvalType::Blackbox).is_some()
        {
            let mut cached = cached.clone();
            if let Some(from) = point.point_from() {
                cached.set_point_from(from.clone());
            }
            return Some(Evaluation {
                point: cached,
                needed_eval: false,
            });
        }

        let eval = self.call(&point);
        point.set_eval(EvalType::Blackbox, eval);
        let from = point.point_from().cloned();
        let mut stored = self.cache.insert(point).clone();
        if let Some(from) = from {
            stored.set_point_from(from);
        }

        self.evals += 1;
        if self.budget.is_some_and(|budget| self.evals >= budget) {
            log::debug!("evaluation budget of {} spent", self.evals);
            self.stop.request();
        }
        Some(Evaluation {
            point: stored,
            needed_eval: true,
        })
    }
}

/// Tracks the best evaluated point and its snapshot.
///
/// Points compare by `h` first and `f` second, so any feasible point beats
/// every infeasible one. Points without a defined `f` and `h` are ignored.
struct Best<I, O> {
    point: Option<EvalPoint>,
    snapshot: Option<Snapshot<I, O>>,
}

impl<I, O> Best<I, O> {
    fn empty() -> Self {
        Self {
            point: None,
            snapshot: None,
        }
    }

    fn update(&mut self, point: EvalPoint, snapshot: Snapshot<I, O>) {
        let et = EvalType::Blackbox;
        let (Some(f), Some(h)) = (point.f(et), point.h(et)) else {
            return;
        };
        if let Some(best) = self.point.as_ref()
            && let (Some(best_f), Some(best_h)) = (best.f(et), best.h(et))
            && (best_h, best_f) <= (h, f)
        {
            return;
        }
        self.point = Some(point);
        self.snapshot = Some(snapshot);
    }

    fn into_parts(self) -> Option<(EvalPoint, Snapshot<I, O>)> {
        self.point.zip(self.snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::convert::Infallible;

    use approx::assert_relative_eq;
    use mads_core::{OutputType, Point};
    use thiserror::Error;

    /// Outputs `[x0² + x1², x0 - 1]`.
    struct Paraboloid;

    impl Model for Paraboloid {
        type Input = [f64; 2];
        type Output = [f64; 2];
        type Error = Infallible;

        fn call(&self, x: &[f64; 2]) -> Result<[f64; 2], Self::Error> {
            Ok([x[0] * x[0] + x[1] * x[1], x[0] - 1.0])
        }
    }

    #[derive(Debug, Error)]
    #[error("expected two variables")]
    struct WrongDimension;

    struct Outputs;

    impl BlackboxProblem for Outputs {
        type Input = [f64; 2];
        type Output = [f64; 2];
        type Error = WrongDimension;

        fn input(&self, x: &[f64]) -> Result<[f64; 2], Self::Error> {
            x.try_into().map_err(|_| WrongDimension)
        }

        fn outputs(&self, _: &[f64; 2], output: &[f64; 2]) -> Result<Vec<f64>, Self::Error> {
            Ok(output.to_vec())
        }
    }

    fn spec() -> OutputSpec {
        OutputSpec::new(vec![OutputType::Objective, OutputType::ProgressiveBarrier]).unwrap()
    }

    #[test]
    fn evaluate_returns_outputs_and_snapshot() {
        let sample = evaluate(&Paraboloid, &Outputs, &[2.0, 1.0]).expect("should evaluate");
        assert_eq!(sample.outputs, vec![5.0, 1.0]);
        assert_eq!(sample.snapshot.input, [2.0, 1.0]);
    }

    #[test]
    fn evaluate_reports_problem_errors() {
        let result = evaluate(&Paraboloid, &Outputs, &[1.0]);
        assert!(matches!(result, Err(EvalError::Problem(WrongDimension))));
    }

    #[test]
    fn caches_results() {
        let mut evaluator = BlackboxEvaluator::new(&Paraboloid, &Outputs, spec());

        let first = evaluator
            .evaluate(EvalPoint::new(Point::from([0.5, 0.0])))
            .unwrap();
        assert!(first.needed_eval);
        assert_relative_eq!(first.point.f(EvalType::Blackbox).unwrap(), 0.25);
        assert_relative_eq!(first.point.h(EvalType::Blackbox).unwrap(), 0.0);

        let again = evaluator
            .evaluate(EvalPoint::new(Point::from([0.5, 0.0])))
            .unwrap();
        assert!(!again.needed_eval);
        assert_eq!(again.point.tag(), first.point.tag());
        assert_eq!(evaluator.evals(), 1);
    }

    #[test]
    fn failures_become_failed_evaluations() {
        let mut evaluator = BlackboxEvaluator::new(&Paraboloid, &Outputs, spec());
        let result = evaluator
            .evaluate(EvalPoint::new(Point::from([1.0, 2.0, 3.0])))
            .unwrap();
        assert!(!result.point.is_eval_ok(EvalType::Blackbox));
        assert!(evaluator.best().is_none());
    }

    #[test]
    fn budget_raises_stop_signal() {
        let mut evaluator = BlackboxEvaluator::new(&Paraboloid, &Outputs, spec()).with_budget(2);
        let stop = evaluator.stop_signal().clone();

        assert!(evaluator.evaluate(EvalPoint::new(Point::from([0.0, 0.0]))).is_some());
        assert!(!stop.is_requested());
        assert!(evaluator.evaluate(EvalPoint::new(Point::from([1.0, 0.0]))).is_some());
        assert!(stop.is_requested());
        assert!(evaluator.evaluate(EvalPoint::new(Point::from([2.0, 0.0]))).is_none());
        assert_eq!(evaluator.evals(), 2);
    }

    #[test]
    fn keeps_best_snapshot() {
        let mut evaluator = BlackboxEvaluator::new(&Paraboloid, &Outputs, spec());
        for x in [[2.0, 0.0], [0.5, 0.5], [-1.0, 0.0], [3.0, 3.0]] {
            evaluator.evaluate(EvalPoint::new(Point::from(x)));
        }

        // [2, 0] violates the constraint; [0.5, 0.5] is the best feasible point.
        let (point, snapshot) = evaluator.into_best().expect("best point");
        assert_eq!(point.x(), &Point::from([0.5, 0.5]));
        assert_eq!(snapshot.input, [0.5, 0.5]);
        assert_relative_eq!(snapshot.output[0], 0.5);
    }
}
