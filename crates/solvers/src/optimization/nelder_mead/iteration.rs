use mads_core::{Barrier, EvalPoint, Evaluation, Evaluator, Observer, SearchContext, Success};

use super::{
    Action, Config, Event, Frame, Reflective, Role, Simplex, StepType, StopReason,
};

/// State shared by the iterations of one Nelder-Mead pass.
pub(super) struct Run<'a, E, Obs> {
    pub(super) config: Config,
    pub(super) evaluator: &'a mut E,
    pub(super) barrier: &'a mut Barrier,
    pub(super) context: &'a mut SearchContext,
    pub(super) observer: Obs,
    pub(super) budget: Option<usize>,
    pub(super) success: Success,
    pub(super) evals: usize,
    pub(super) steps: usize,
}

enum EvalOutcome {
    Evaluated(Evaluation),
    Stop(StopReason),
}

impl<E, Obs> Run<'_, E, Obs>
where
    E: Evaluator,
    Obs: for<'e> Observer<Event<'e>, Action>,
{
    /// Runs one iteration: reflect, then expand or contract until the
    /// simplex is updated or must shrink.
    ///
    /// Returns `None` when the iteration completed and another may follow.
    pub(super) fn iterate(&mut self, frame: &Frame<'_>, simplex: &mut Simplex) -> Option<StopReason> {
        let mut engine = Reflective::new(self.config, frame);
        let mut step = StepType::Reflect;

        for _ in 0..self.config.max_steps() {
            if self.evaluator.stop_signal().is_requested() {
                return Some(StopReason::Cancelled);
            }
            engine.set_current_step(step);
            self.steps += 1;

            match engine.generate_trial_point(simplex) {
                Some(point) => match self.evaluate(step, point) {
                    EvalOutcome::Evaluated(evaluation) => {
                        engine.record_trial(Some(evaluation.point), evaluation.needed_eval);
                    }
                    EvalOutcome::Stop(reason) => return Some(reason),
                },
                None => engine.record_trial(None, false),
            }

            let next = engine.set_next_step(simplex);
            if let Some(reason) = engine.stop_reason() {
                return match self.config.role() {
                    Role::Standalone if reason.is_step_failure() => self.shrink(frame, simplex),
                    _ => Some(reason),
                };
            }
            match next {
                StepType::Continue => return None,
                StepType::Shrink => {
                    return match self.config.role() {
                        Role::Standalone => self.shrink(frame, simplex),
                        Role::Search => Some(StopReason::NoShrink),
                    };
                }
                _ => step = next,
            }
        }

        log::debug!("iteration reached {} steps", self.config.max_steps());
        Some(StopReason::StepLimit)
    }

    /// Shrinks every vertex toward the best one: `yi ← y0 + γ (yi - y0)`.
    ///
    /// The shrunk vertices are evaluated and must again form a simplex of
    /// full rank.
    fn shrink(&mut self, frame: &Frame<'_>, simplex: &mut Simplex) -> Option<StopReason> {
        let Some(best) = simplex.best().cloned() else {
            return Some(StopReason::ShrinkFailed);
        };
        let gamma = self.config.gamma();
        log::debug!("shrinking the simplex toward {best} with factor {gamma}");

        let targets: Vec<_> = simplex
            .points()
            .iter()
            .skip(1)
            .map(|y| {
                let x = best.x().offset(&(y.x() - best.x()), gamma);
                frame.trial_point(frame.snap_and_project(&x))
            })
            .collect();

        let mut shrunk = vec![best];
        for point in targets {
            match self.evaluate(StepType::Shrink, point) {
                EvalOutcome::Evaluated(evaluation) => shrunk.push(evaluation.point),
                EvalOutcome::Stop(reason) => return Some(reason),
            }
        }

        simplex.clear();
        if shrunk.into_iter().any(|p| simplex.add(p).is_none()) {
            log::debug!("shrunk simplex has a failed or duplicate vertex");
            return Some(StopReason::ShrinkFailed);
        }
        let full_rank = simplex
            .rank(frame.frame_size(), self.config.rank_eps())
            .is_ok_and(|rank| rank == simplex.dim());
        if !full_rank {
            log::debug!("shrunk simplex lost rank");
            return Some(StopReason::ShrinkFailed);
        }
        simplex.update_characteristics();

        match self.observer.observe(&Event::Shrunk { simplex: &*simplex }) {
            Some(Action::StopEarly) => Some(StopReason::StoppedByObserver),
            None => None,
        }
    }

    /// Evaluates `point`, updates the incumbents, and notifies the observer.
    fn evaluate(&mut self, step: StepType, point: EvalPoint) -> EvalOutcome {
        if self.budget.is_some_and(|budget| self.evals >= budget) {
            return EvalOutcome::Stop(StopReason::EvalBudget);
        }
        let Some(evaluation) = self.evaluator.evaluate(point) else {
            return EvalOutcome::Stop(StopReason::Cancelled);
        };
        if evaluation.needed_eval {
            self.evals += 1;
        }

        let success = self.barrier.update(&evaluation.point);
        self.context.record(&evaluation.point, success);
        self.success = self.success.max(success);

        let event = Event::Evaluated {
            step,
            point: &evaluation.point,
            success,
        };
        if let Some(Action::StopEarly) = self.observer.observe(&event) {
            return EvalOutcome::Stop(StopReason::StoppedByObserver);
        }
        if self.config.stop_on_success() && success == Success::Full {
            log::debug!("full success at {}", evaluation.point);
            return EvalOutcome::Stop(StopReason::StopOnSuccess);
        }
        EvalOutcome::Evaluated(evaluation)
    }
}
