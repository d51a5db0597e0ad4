//! An observer that records the objective and violation of every event.
//!
//! See [`History`] for usage.

use mads_core::Observer;

use crate::traits::{CanStopEarly, HasObjective, HasViolation};

/// One recorded event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Record {
    /// Position of the event, starting at zero.
    pub index: usize,

    /// Objective reported by the event, `NaN` when undefined.
    pub objective: f64,

    /// Constraint violation reported by the event, `NaN` when undefined.
    pub violation: f64,
}

/// Collects a [`Record`] per solver event and tracks the best feasible
/// objective seen.
///
/// With a target, the observer asks the solver to stop once a feasible
/// objective at or below the target is reported.
///
/// # Example
///
/// ```ignore
/// let mut history = History::new().with_target(1e-8);
/// nelder_mead::minimize(&model, &problem, spec, &domain, &x0, &config, &mut history)?;
/// println!("best f after {} events: {:?}", history.len(), history.best());
/// ```
#[derive(Debug, Clone, Default)]
pub struct History {
    records: Vec<Record>,
    best: Option<f64>,
    target: Option<f64>,
}

impl History {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stops the solver once a feasible objective reaches `target`.
    #[must_use]
    pub fn with_target(mut self, target: f64) -> Self {
        self.target = Some(target);
        self
    }

    #[must_use]
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Best objective among the feasible records (`h == 0`), if any.
    #[must_use]
    pub fn best(&self) -> Option<f64> {
        self.best
    }

    /// Records one event and reports whether the target has been reached.
    pub fn record(&mut self, objective: f64, violation: f64) -> bool {
        let index = self.records.len();
        self.records.push(Record {
            index,
            objective,
            violation,
        });
        log::trace!("event {index}: f = {objective}, h = {violation}");

        if violation != 0.0 || objective.is_nan() {
            return false;
        }
        if self.best.is_none_or(|best| objective < best) {
            self.best = Some(objective);
        }
        self.target.is_some_and(|target| objective <= target)
    }
}

impl<E, A> Observer<E, A> for History
where
    E: HasObjective + HasViolation,
    A: CanStopEarly,
{
    fn observe(&mut self, event: &E) -> Option<A> {
        if self.record(event.objective(), event.violation()) {
            log::debug!("target reached after {} events", self.records.len());
            return Some(A::stop_early());
        }
        None
    }
}

impl<E, A> Observer<E, A> for &mut History
where
    E: HasObjective + HasViolation,
    A: CanStopEarly,
{
    fn observe(&mut self, event: &E) -> Option<A> {
        (**self).observe(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use mads_solvers::optimization::nelder_mead::Action;

    struct Sample(f64, f64);

    impl HasObjective for Sample {
        fn objective(&self) -> f64 {
            self.0
        }
    }

    impl HasViolation for Sample {
        fn violation(&self) -> f64 {
            self.1
        }
    }

    #[test]
    fn tracks_best_feasible_objective() {
        let mut history = History::new();
        for sample in [Sample(3.0, 0.0), Sample(1.0, 0.2), Sample(2.0, 0.0), Sample(f64::NAN, 0.0)] {
            let action: Option<Action> = history.observe(&sample);
            assert!(action.is_none());
        }
        assert_eq!(history.len(), 4);
        assert_eq!(history.best(), Some(2.0));
        assert_eq!(history.records()[1].violation, 0.2);
    }

    #[test]
    fn stops_at_target() {
        let mut history = History::new().with_target(0.5);
        let action: Option<Action> = history.observe(&Sample(1.0, 0.0));
        assert!(action.is_none());
        let action: Option<Action> = history.observe(&Sample(0.4, 0.0));
        assert_eq!(action, Some(Action::StopEarly));
    }
}
