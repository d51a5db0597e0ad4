use mads_core::{Cache, Eval, EvalPoint, EvalType, Evaluation, Evaluator, StopSignal};

use super::QuadModel;

/// Evaluates points with a fitted [`QuadModel`] instead of the blackbox.
///
/// Predictions are stored as [`EvalType::Model`] evaluations in the
/// evaluator's own cache. A point the model cannot predict gets a failed
/// evaluation.
#[derive(Debug)]
pub struct ModelEvaluator<'a> {
    model: &'a QuadModel,
    cache: Cache,
    stop: StopSignal,
    budget: Option<usize>,
    evals: usize,
}

impl<'a> ModelEvaluator<'a> {
    #[must_use]
    pub fn new(model: &'a QuadModel) -> Self {
        Self {
            model,
            cache: Cache::new(),
            stop: StopSignal::new(),
            budget: None,
            evals: 0,
        }
    }

    /// Raises the stop signal once `budget` predictions have been made.
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

    /// Number of predictions made so far.
    #[must_use]
    pub fn evals(&self) -> usize {
        self.evals
    }
}

impl Evaluator for ModelEvaluator<'_> {
    fn eval_type(&self) -> EvalType {
        EvalType::Model
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
            && cached.eval(EvalType::Model).is_some()
        {
            return Some(Evaluation {
                point: cached.clone(),
                needed_eval: false,
            });
        }

        point.set_eval(EvalType::Model, predict(self.model, &point));
        let stored = self.cache.insert(point).clone();
        self.evals += 1;
        if self.budget.is_some_and(|budget| self.evals >= budget) {
            self.stop.request();
        }
        Some(Evaluation {
            point: stored,
            needed_eval: true,
        })
    }
}

fn predict(model: &QuadModel, point: &EvalPoint) -> Eval {
    match model.predict(point.x()) {
        Some(outputs) => Eval::from_outputs(&outputs, model.output_spec()),
        None => Eval::failed(),
    }
}

/// Attaches model predictions to `points` and sorts them best first.
///
/// Points are ordered by predicted `h`, then `f`; points with an undefined
/// prediction go last. The sort is stable.
#[must_use]
pub fn rank_by_model(points: Vec<EvalPoint>, model: &QuadModel) -> Vec<EvalPoint> {
    let mut points: Vec<EvalPoint> = points
        .into_iter()
        .map(|mut p| {
            let eval = predict(model, &p);
            p.set_eval(EvalType::Model, eval);
            p
        })
        .collect();
    points.sort_by(|a, b| a.cmp_hf(b, EvalType::Model));
    points
}
