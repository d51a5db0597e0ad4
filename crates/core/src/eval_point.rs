use std::{cmp::Ordering, fmt};

#[cfg(feature = "serde-derive")]
use serde::{Deserialize, Serialize};

use crate::{Direction, Eval, EvalType, Point};

/// A point together with its evaluations.
///
/// Each [`EvalType`] has its own optional [`Eval`], so a point can carry both a
/// blackbox result and a model prediction. The tag records cache insertion
/// order and breaks ordering ties in favor of older points.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde-derive", derive(Serialize, Deserialize))]
pub struct EvalPoint {
    x: Point,
    tag: u64,
    blackbox: Option<Eval>,
    model: Option<Eval>,
    from: Option<Point>,
}

impl EvalPoint {
    /// Creates an unevaluated point with tag zero.
    #[must_use]
    pub fn new(x: Point) -> Self {
        Self {
            x,
            tag: 0,
            blackbox: None,
            model: None,
            from: None,
        }
    }

    /// Creates a point with an evaluation already attached.
    #[must_use]
    pub fn evaluated(x: Point, eval_type: EvalType, eval: Eval) -> Self {
        let mut point = Self::new(x);
        point.set_eval(eval_type, eval);
        point
    }

    #[must_use]
    pub fn x(&self) -> &Point {
        &self.x
    }

    #[must_use]
    pub fn dim(&self) -> usize {
        self.x.dim()
    }

    #[must_use]
    pub fn tag(&self) -> u64 {
        self.tag
    }

    pub fn set_tag(&mut self, tag: u64) {
        self.tag = tag;
    }

    /// Returns the evaluation of the given type, if any.
    #[must_use]
    pub fn eval(&self, eval_type: EvalType) -> Option<&Eval> {
        match eval_type {
            EvalType::Blackbox => self.blackbox.as_ref(),
            EvalType::Model => self.model.as_ref(),
        }
    }

    pub fn set_eval(&mut self, eval_type: EvalType, eval: Eval) {
        match eval_type {
            EvalType::Blackbox => self.blackbox = Some(eval),
            EvalType::Model => self.model = Some(eval),
        }
    }

    /// Returns true if the evaluation of the given type exists and is `Ok`.
    #[must_use]
    pub fn is_eval_ok(&self, eval_type: EvalType) -> bool {
        self.eval(eval_type).is_some_and(Eval::is_ok)
    }

    #[must_use]
    pub fn f(&self, eval_type: EvalType) -> Option<f64> {
        self.eval(eval_type).and_then(Eval::f)
    }

    #[must_use]
    pub fn h(&self, eval_type: EvalType) -> Option<f64> {
        self.eval(eval_type).and_then(Eval::h)
    }

    /// The point this one was generated from (typically the frame center).
    #[must_use]
    pub fn point_from(&self) -> Option<&Point> {
        self.from.as_ref()
    }

    pub fn set_point_from(&mut self, from: Point) {
        self.from = Some(from);
    }

    /// Direction from the generating point to this one.
    #[must_use]
    pub fn direction(&self) -> Option<Direction> {
        self.from.as_ref().map(|from| &self.x - from)
    }

    /// Returns true if this point dominates `other` for the given evaluation type.
    ///
    /// A point never dominates itself, and a missing evaluation on either
    /// side makes the comparison false.
    #[must_use]
    pub fn dominates(&self, other: &EvalPoint, eval_type: EvalType) -> bool {
        if std::ptr::eq(self, other) {
            return false;
        }
        match (self.eval(eval_type), other.eval(eval_type)) {
            (Some(a), Some(b)) => a.dominates(b),
            _ => false,
        }
    }

    /// Orders points by `h`, then `f`, for the given evaluation type.
    ///
    /// An undefined value sorts after every defined one.
    #[must_use]
    pub fn cmp_hf(&self, other: &EvalPoint, eval_type: EvalType) -> Ordering {
        defined_first(self.h(eval_type), other.h(eval_type))
            .then_with(|| defined_first(self.f(eval_type), other.f(eval_type)))
    }
}

fn defined_first(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.total_cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

impl fmt::Display for EvalPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} {}", self.tag, self.x)?;
        if let Some(eval) = &self.blackbox {
            write!(f, " f={:?} h={:?}", eval.f(), eval.h())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(x: [f64; 2], f: f64, h: f64) -> EvalPoint {
        EvalPoint::evaluated(
            Point::from(x),
            EvalType::Blackbox,
            Eval::with_fh(vec![Some(f)], Some(f), Some(h)),
        )
    }

    #[test]
    fn dominance_respects_eval_type() {
        let a = point([0.0, 0.0], 1.0, 0.0);
        let b = point([1.0, 0.0], 2.0, 0.0);

        assert!(a.dominates(&b, EvalType::Blackbox));
        assert!(!b.dominates(&a, EvalType::Blackbox));
        assert!(!a.dominates(&b, EvalType::Model));
        assert!(!a.dominates(&a, EvalType::Blackbox));
    }

    #[test]
    fn direction_from_origin_point() {
        let mut p = point([2.0, 1.0], 0.0, 0.0);
        assert!(p.direction().is_none());

        p.set_point_from(Point::from([1.0, 1.0]));
        assert_eq!(p.direction(), Some(Direction::from([1.0, 0.0])));
    }

    #[test]
    fn orders_by_violation_then_objective() {
        let feasible = point([0.0, 0.0], 5.0, 0.0);
        let better = point([1.0, 0.0], 1.0, 0.0);
        let infeasible = point([2.0, 0.0], 0.0, 0.5);
        let failed = EvalPoint::evaluated(Point::from([3.0, 0.0]), EvalType::Blackbox, Eval::failed());

        let et = EvalType::Blackbox;
        assert_eq!(better.cmp_hf(&feasible, et), Ordering::Less);
        assert_eq!(feasible.cmp_hf(&infeasible, et), Ordering::Less);
        assert_eq!(infeasible.cmp_hf(&failed, et), Ordering::Less);
        assert_eq!(failed.cmp_hf(&failed.clone(), et), Ordering::Equal);
        assert_eq!(better.cmp_hf(&infeasible, EvalType::Model), Ordering::Equal);
    }
}
