use crate::{Direction, EvalPoint, Success};

/// Kind of the most recent full success.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuccessKind {
    /// The successful direction left every categorical variable unchanged.
    Quantitative,

    /// The successful direction changed at least one categorical variable.
    Categorical,
}

/// Optimization state shared across search and poll steps of one run.
///
/// Owned by the driver and passed by reference to the steps that report
/// successes.
#[derive(Debug, Clone, Default)]
pub struct SearchContext {
    categorical: usize,
    last_success: Option<SuccessKind>,
}

impl SearchContext {
    /// Creates a context for points whose first `categorical` slots are categorical.
    #[must_use]
    pub fn new(categorical: usize) -> Self {
        Self {
            categorical,
            last_success: None,
        }
    }

    /// Records the outcome of evaluating `point`.
    ///
    /// Only full successes with a known origin point change the state.
    pub fn record(&mut self, point: &EvalPoint, success: Success) {
        if success != Success::Full {
            return;
        }
        if let Some(direction) = point.direction() {
            self.record_direction(&direction);
        }
    }

    /// Records a full success along `direction`.
    pub fn record_direction(&mut self, direction: &Direction) {
        let moved_category = (0..self.categorical)
            .any(|i| direction.get(i).is_some_and(|d| d != 0.0));
        self.last_success = Some(if moved_category {
            SuccessKind::Categorical
        } else {
            SuccessKind::Quantitative
        });
    }

    #[must_use]
    pub fn last_success(&self) -> Option<SuccessKind> {
        self.last_success
    }

    #[must_use]
    pub fn last_success_is_quantitative(&self) -> bool {
        self.last_success == Some(SuccessKind::Quantitative)
    }

    #[must_use]
    pub fn last_success_is_categorical(&self) -> bool {
        self.last_success == Some(SuccessKind::Categorical)
    }

    pub fn reset(&mut self) {
        self.last_success = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::{Eval, EvalType, Point};

    fn success_from(from: [f64; 3], to: [f64; 3]) -> EvalPoint {
        let mut p = EvalPoint::evaluated(
            Point::from(to),
            EvalType::Blackbox,
            Eval::with_fh(vec![], Some(0.0), Some(0.0)),
        );
        p.set_point_from(Point::from(from));
        p
    }

    #[test]
    fn classifies_by_categorical_components() {
        let mut ctx = SearchContext::new(1);
        assert!(ctx.last_success().is_none());

        ctx.record(&success_from([1.0, 0.0, 0.0], [1.0, 0.5, 0.0]), Success::Full);
        assert!(ctx.last_success_is_quantitative());

        ctx.record(&success_from([1.0, 0.0, 0.0], [2.0, 0.0, 0.0]), Success::Full);
        assert!(ctx.last_success_is_categorical());
        assert!(!ctx.last_success_is_quantitative());
    }

    #[test]
    fn ignores_partial_successes() {
        let mut ctx = SearchContext::new(1);
        ctx.record(&success_from([1.0, 0.0, 0.0], [2.0, 0.0, 0.0]), Success::Partial);
        assert!(ctx.last_success().is_none());
    }
}
