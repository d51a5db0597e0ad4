#[cfg(feature = "serde-derive")]
use serde::{Deserialize, Serialize};

use crate::{EvalPoint, EvalType};

/// How much a trial point improved on the incumbents.
///
/// Ordered so that `Unsuccessful < Partial < Full`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde-derive", derive(Serialize, Deserialize))]
pub enum Success {
    #[default]
    Unsuccessful,

    /// An infeasible point that reduces the constraint violation.
    Partial,

    /// A point that dominates the incumbent.
    Full,
}

impl Success {
    /// Compares `point` to an optional `incumbent` under the violation cap `h_max`.
    ///
    /// Without an incumbent, any point with `h <= h_max` is a success:
    /// full if feasible, partial otherwise.
    #[must_use]
    pub fn compute(
        point: &EvalPoint,
        incumbent: Option<&EvalPoint>,
        eval_type: EvalType,
        h_max: f64,
    ) -> Self {
        let Some(eval) = point.eval(eval_type).filter(|e| e.is_ok()) else {
            return Self::Unsuccessful;
        };
        let Some(h) = eval.h().filter(|h| *h <= h_max && h.is_finite()) else {
            return Self::Unsuccessful;
        };
        if eval.f().is_none() {
            return Self::Unsuccessful;
        }

        let Some(incumbent) = incumbent else {
            return if eval.is_feasible() {
                Self::Full
            } else {
                Self::Partial
            };
        };

        if point.dominates(incumbent, eval_type) {
            return Self::Full;
        }
        match incumbent.h(eval_type) {
            Some(h_inc) if h_inc > 0.0 && h < h_inc => Self::Partial,
            _ => Self::Unsuccessful,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::{Eval, Point};

    fn point(f: f64, h: f64) -> EvalPoint {
        EvalPoint::evaluated(
            Point::from([f, h]),
            EvalType::Blackbox,
            Eval::with_fh(vec![], Some(f), Some(h)),
        )
    }

    #[test]
    fn success_levels_are_ordered() {
        assert!(Success::Unsuccessful < Success::Partial);
        assert!(Success::Partial < Success::Full);
    }

    #[test]
    fn no_incumbent() {
        let et = EvalType::Blackbox;
        assert_eq!(Success::compute(&point(1.0, 0.0), None, et, 1.0), Success::Full);
        assert_eq!(Success::compute(&point(1.0, 0.5), None, et, 1.0), Success::Partial);
        assert_eq!(
            Success::compute(&point(1.0, 2.0), None, et, 1.0),
            Success::Unsuccessful
        );
    }

    #[test]
    fn against_incumbent() {
        let et = EvalType::Blackbox;
        let feasible = point(1.0, 0.0);
        let infeasible = point(1.0, 0.5);

        assert_eq!(
            Success::compute(&point(0.5, 0.0), Some(&feasible), et, f64::INFINITY),
            Success::Full
        );
        assert_eq!(
            Success::compute(&point(2.0, 0.0), Some(&feasible), et, f64::INFINITY),
            Success::Unsuccessful
        );
        assert_eq!(
            Success::compute(&point(3.0, 0.2), Some(&infeasible), et, f64::INFINITY),
            Success::Partial
        );
    }
}
