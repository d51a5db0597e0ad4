use crate::{EvalPoint, EvalType, Success};

/// Tracks the best feasible and best infeasible points found so far.
///
/// A trial point is compared against both incumbents and the better of the two
/// outcomes is reported. The violation cap `h_max` is fixed for the lifetime of
/// the barrier; infeasible points above it are never kept.
#[derive(Debug, Clone)]
pub struct Barrier {
    eval_type: EvalType,
    h_max: f64,
    feasible: Option<EvalPoint>,
    infeasible: Option<EvalPoint>,
}

impl Barrier {
    /// Creates an empty barrier with `h_max = ∞`.
    #[must_use]
    pub fn new(eval_type: EvalType) -> Self {
        Self {
            eval_type,
            h_max: f64::INFINITY,
            feasible: None,
            infeasible: None,
        }
    }

    /// Sets the violation cap.
    #[must_use]
    pub fn with_h_max(mut self, h_max: f64) -> Self {
        self.h_max = h_max;
        self
    }

    /// Creates a barrier seeded with already evaluated points.
    #[must_use]
    pub fn from_points<'a>(
        eval_type: EvalType,
        points: impl IntoIterator<Item = &'a EvalPoint>,
    ) -> Self {
        let mut barrier = Self::new(eval_type);
        for point in points {
            barrier.update(point);
        }
        barrier
    }

    #[must_use]
    pub fn eval_type(&self) -> EvalType {
        self.eval_type
    }

    #[must_use]
    pub fn h_max(&self) -> f64 {
        self.h_max
    }

    #[must_use]
    pub fn incumbent_feasible(&self) -> Option<&EvalPoint> {
        self.feasible.as_ref()
    }

    #[must_use]
    pub fn incumbent_infeasible(&self) -> Option<&EvalPoint> {
        self.infeasible.as_ref()
    }

    /// The feasible incumbent if there is one, else the infeasible incumbent.
    #[must_use]
    pub fn first_point(&self) -> Option<&EvalPoint> {
        self.feasible.as_ref().or(self.infeasible.as_ref())
    }

    /// Success of `point` relative to the current incumbents, without updating.
    #[must_use]
    pub fn success_of(&self, point: &EvalPoint) -> Success {
        if self.feasible.is_none() && self.infeasible.is_none() {
            return Success::compute(point, None, self.eval_type, self.h_max);
        }
        [self.feasible.as_ref(), self.infeasible.as_ref()]
            .into_iter()
            .flatten()
            .map(|inc| Success::compute(point, Some(inc), self.eval_type, self.h_max))
            .max()
            .unwrap_or_default()
    }

    /// Compares `point` to the incumbents and replaces them when it improves.
    pub fn update(&mut self, point: &EvalPoint) -> Success {
        let et = self.eval_type;
        let Some(eval) = point.eval(et).filter(|e| e.is_ok()) else {
            return Success::Unsuccessful;
        };
        if eval.f().is_none() || eval.h().is_none_or(|h| !h.is_finite() || h > self.h_max) {
            return Success::Unsuccessful;
        }
        let success = self.success_of(point);

        if eval.is_feasible() {
            let better = self
                .feasible
                .as_ref()
                .is_none_or(|inc| point.dominates(inc, et));
            if better {
                log::debug!("new feasible incumbent {point}");
                self.feasible = Some(point.clone());
            }
        } else {
            let better = self.infeasible.as_ref().is_none_or(|inc| {
                point.dominates(inc, et)
                    || matches!((point.h(et), inc.h(et)), (Some(a), Some(b)) if a < b)
            });
            if better {
                log::debug!("new infeasible incumbent {point}");
                self.infeasible = Some(point.clone());
            }
        }
        success
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::{Eval, Point};

    fn point(x: f64, f: f64, h: f64) -> EvalPoint {
        EvalPoint::evaluated(
            Point::from([x]),
            EvalType::Blackbox,
            Eval::with_fh(vec![], Some(f), Some(h)),
        )
    }

    #[test]
    fn keeps_best_feasible_and_infeasible() {
        let mut barrier = Barrier::new(EvalType::Blackbox);

        assert_eq!(barrier.update(&point(0.0, 3.0, 0.0)), Success::Full);
        assert_eq!(barrier.update(&point(1.0, 4.0, 0.0)), Success::Unsuccessful);
        assert_eq!(barrier.update(&point(2.0, 2.0, 0.0)), Success::Full);
        assert_eq!(barrier.update(&point(3.0, 1.0, 0.7)), Success::Unsuccessful);
        assert_eq!(barrier.update(&point(4.0, 1.5, 0.3)), Success::Partial);

        assert_eq!(barrier.incumbent_feasible().unwrap().x(), &Point::from([2.0]));
        assert_eq!(barrier.incumbent_infeasible().unwrap().x(), &Point::from([4.0]));
        assert_eq!(barrier.first_point().unwrap().x(), &Point::from([2.0]));
    }

    #[test]
    fn rejects_points_above_h_max() {
        let mut barrier = Barrier::new(EvalType::Blackbox).with_h_max(0.5);
        assert_eq!(barrier.update(&point(0.0, 1.0, 0.8)), Success::Unsuccessful);
        assert!(barrier.first_point().is_none());
    }
}
