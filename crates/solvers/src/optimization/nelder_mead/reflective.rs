use mads_core::{EvalPoint, Point};

use super::{Config, Frame, RankFailurePolicy, Simplex, StepType, StopReason};

/// One reflective step of a Nelder-Mead iteration and the transitions
/// between steps.
///
/// The engine remembers the trial point of each step (`xr`, `xe`, `xoc`,
/// `xic`) for the current iteration, because expansion and contraction
/// compare their point against the reflect point before inserting.
pub struct Reflective<'f> {
    config: Config,
    frame: &'f Frame<'f>,
    current: StepType,
    next: StepType,
    xr: Option<EvalPoint>,
    xe: Option<EvalPoint>,
    xoc: Option<EvalPoint>,
    xic: Option<EvalPoint>,
    needed_eval: bool,
    stop: Option<StopReason>,
}

impl<'f> Reflective<'f> {
    #[must_use]
    pub fn new(config: Config, frame: &'f Frame<'f>) -> Self {
        Self {
            config,
            frame,
            current: StepType::Unset,
            next: StepType::Unset,
            xr: None,
            xe: None,
            xoc: None,
            xic: None,
            needed_eval: false,
            stop: None,
        }
    }

    /// Forgets the trial points and step of the previous iteration.
    pub fn reset(&mut self) {
        self.current = StepType::Unset;
        self.next = StepType::Unset;
        self.xr = None;
        self.xe = None;
        self.xoc = None;
        self.xic = None;
        self.needed_eval = false;
        self.stop = None;
    }

    #[must_use]
    pub fn current_step(&self) -> StepType {
        self.current
    }

    #[must_use]
    pub fn next_step(&self) -> StepType {
        self.next
    }

    /// The reason the iteration cannot proceed, if one was recorded.
    #[must_use]
    pub fn stop_reason(&self) -> Option<StopReason> {
        self.stop
    }

    /// The trial point recorded for `step`, if any.
    #[must_use]
    pub fn trial(&self, step: StepType) -> Option<&EvalPoint> {
        match step {
            StepType::Reflect => self.xr.as_ref(),
            StepType::Expand => self.xe.as_ref(),
            StepType::OutsideContraction => self.xoc.as_ref(),
            StepType::InsideContraction => self.xic.as_ref(),
            _ => None,
        }
    }

    /// Starts `step`, which must be one of the four reflective steps.
    pub fn set_current_step(&mut self, step: StepType) {
        if !step.is_reflective() {
            log::debug!("cannot start the {step} step");
            self.stop = Some(StopReason::UndefinedStep);
        }
        self.current = step;
        self.needed_eval = false;
    }

    /// Generates the trial point of the current step.
    ///
    /// With `yc` the centroid of all vertices but the worst `yn`, the point
    /// is `yc + δ (yc - yn)`, snapped to the domain and projected on the mesh.
    /// Returns `None` when the simplex has fewer than `n + 1` vertices, the
    /// step generates no point, or the point lands back on `yn`.
    #[must_use]
    pub fn generate_trial_point(&self, simplex: &Simplex) -> Option<EvalPoint> {
        let delta = self.current.delta(&self.config)?;
        if !simplex.is_ready() {
            log::debug!("cannot generate a trial point: the simplex is not ready");
            return None;
        }
        let (others, worst) = simplex.points().split_at(simplex.len() - 1);
        let yn = worst.first()?.x();

        let centroid = centroid(others, simplex.dim());
        let xt = centroid.offset(&(&centroid - yn), delta);
        let xt = self.frame.snap_and_project(&xt);
        if &xt == yn {
            log::debug!("{} point collapsed onto the worst vertex", self.current);
            return None;
        }
        Some(self.frame.trial_point(xt))
    }

    /// Records the evaluated trial point of the current step.
    ///
    /// `needed_eval` is false when no point was generated or the point was
    /// already evaluated.
    pub fn record_trial(&mut self, point: Option<EvalPoint>, needed_eval: bool) {
        self.needed_eval = needed_eval;
        let Some(point) = point else {
            return;
        };
        match self.current {
            StepType::Reflect => self.xr = Some(point),
            StepType::Expand => self.xe = Some(point),
            StepType::OutsideContraction => self.xoc = Some(point),
            StepType::InsideContraction => self.xic = Some(point),
            _ => {}
        }
    }

    /// Classifies the recorded trial point and decides the next step,
    /// inserting into the simplex when the classification calls for it.
    pub fn set_next_step(&mut self, simplex: &mut Simplex) -> StepType {
        self.next = match self.current {
            StepType::Reflect => self.after_reflect(simplex),
            StepType::Expand => self.after_expand(simplex),
            StepType::OutsideContraction => self.after_outside_contraction(simplex),
            StepType::InsideContraction => self.after_inside_contraction(simplex),
            _ => self.fail(),
        };
        log::debug!("after {}: next step is {}", self.current, self.next);
        self.next
    }

    fn after_reflect(&mut self, simplex: &mut Simplex) -> StepType {
        if !self.needed_eval {
            return StepType::InsideContraction;
        }
        let Some(xr) = self.xr.clone() else {
            log::debug!("reflect point is undefined");
            return self.fail();
        };

        if simplex.point_dominates_y0(&xr) {
            StepType::Expand
        } else if simplex.yn_dominates_point(&xr) {
            StepType::InsideContraction
        } else if simplex.dominated_count(&xr, 2) == 2 {
            self.current = StepType::InsertInY;
            if self.insert_in_y(simplex, &xr) {
                StepType::Continue
            } else {
                StepType::Shrink
            }
        } else if xr.is_eval_ok(simplex.eval_type()) {
            StepType::OutsideContraction
        } else {
            self.fail()
        }
    }

    fn after_expand(&mut self, simplex: &mut Simplex) -> StepType {
        let (Some(xr), Some(xe)) = (self.xr.clone(), self.xe.clone()) else {
            log::debug!("reflect or expand point is undefined");
            return self.fail();
        };
        self.current = StepType::InsertInY;
        if self.insert_in_y_best(simplex, &xr, &xe) {
            StepType::Continue
        } else {
            StepType::Shrink
        }
    }

    fn after_outside_contraction(&mut self, simplex: &mut Simplex) -> StepType {
        let Some(xr) = self.xr.clone() else {
            log::debug!("reflect point is undefined");
            return self.fail();
        };
        if !self.needed_eval {
            return if self.insert_in_y(simplex, &xr) {
                StepType::Reflect
            } else {
                self.fail()
            };
        }
        let Some(xoc) = self.xoc.clone() else {
            log::debug!("outside contraction point is undefined");
            return self.fail();
        };
        self.current = StepType::InsertInY;
        if self.insert_in_y_best(simplex, &xr, &xoc) {
            StepType::Continue
        } else {
            StepType::Shrink
        }
    }

    fn after_inside_contraction(&mut self, simplex: &mut Simplex) -> StepType {
        let Some(xic) = self.xic.clone() else {
            log::debug!("inside contraction point is undefined");
            return self.fail();
        };
        if simplex.yn_dominates_point(&xic) {
            return StepType::Shrink;
        }
        self.current = StepType::InsertInY;
        if self.insert_in_y(simplex, &xic) {
            StepType::Continue
        } else {
            StepType::Shrink
        }
    }

    /// Records the failure of the current step and ends the iteration.
    fn fail(&mut self) -> StepType {
        let reason = self.current.failure();
        log::debug!("{} step failed: {reason}", self.current);
        self.stop = Some(reason);
        StepType::Continue
    }

    /// Replaces the worst vertex with `x`.
    ///
    /// Fails when `x` has no successful evaluation, duplicates a vertex, would
    /// itself be the worst vertex, or leaves the simplex without full rank.
    /// The simplex size never changes; on a rank failure the contents follow
    /// the configured [`RankFailurePolicy`].
    pub fn insert_in_y(&self, simplex: &mut Simplex, x: &EvalPoint) -> bool {
        if !x.is_eval_ok(simplex.eval_type()) {
            return false;
        }
        let saved = simplex.points().to_vec();
        let Some(position) = simplex.add(x.clone()) else {
            return false;
        };
        let last = simplex.len() - 1;
        simplex.remove(last);
        if position == last {
            log::debug!("{x} would be the worst vertex; not inserted");
            return false;
        }
        simplex.update_characteristics();
        self.check_rank(simplex, saved)
    }

    /// Inserts the better of `x1` and `x2`, evicting the worst vertex.
    ///
    /// `x2` is ignored unless it has a successful evaluation and differs from
    /// `x1`. Fails when `x1` has no successful evaluation, when `x2`
    /// duplicates a vertex, when neither point improves on the worst vertex,
    /// or on a rank failure. On failure the simplex keeps its size.
    pub fn insert_in_y_best(&self, simplex: &mut Simplex, x1: &EvalPoint, x2: &EvalPoint) -> bool {
        let et = simplex.eval_type();
        if !x1.is_eval_ok(et) {
            return false;
        }
        let saved = simplex.points().to_vec();
        let Some(worst) = simplex.worst().map(|p| p.x().clone()) else {
            return false;
        };
        if simplex.add(x1.clone()).is_none() {
            return false;
        }

        let use_x2 = x2.is_eval_ok(et) && x2.x() != x1.x();
        if use_x2 && simplex.add(x2.clone()).is_none() {
            log::debug!("{x2} duplicates a vertex");
            simplex.restore(saved);
            return false;
        }

        let position = |y: &Simplex, x: &Point| y.position(x).unwrap_or(usize::MAX);
        let worst_at = position(simplex, &worst);
        let x1_at = position(simplex, x1.x());
        let x2_at = if use_x2 {
            position(simplex, x2.x())
        } else {
            x1_at
        };
        if x1_at > worst_at && x2_at > worst_at {
            log::debug!("neither {x1} nor {x2} improves on the worst vertex");
            simplex.restore(saved);
            return false;
        }

        if use_x2 {
            simplex.remove(x1_at.max(x2_at));
        }
        simplex.remove_at(&worst);
        simplex.update_characteristics();
        self.check_rank(simplex, saved)
    }

    fn check_rank(&self, simplex: &mut Simplex, saved: Vec<EvalPoint>) -> bool {
        let full = simplex
            .rank(self.frame.frame_size(), self.config.rank_eps())
            .is_ok_and(|rank| rank + 1 == simplex.len());
        if full {
            simplex.set_degenerate(false);
            return true;
        }

        match self.config.rank_failure() {
            RankFailurePolicy::Revert => {
                log::debug!("insertion loses rank; simplex restored");
                simplex.restore(saved);
            }
            RankFailurePolicy::Keep => {
                log::debug!("insertion loses rank; simplex kept as degenerate");
                simplex.set_degenerate(true);
            }
        }
        false
    }
}

/// Mean of the vertices, component by component.
fn centroid(points: &[EvalPoint], n: usize) -> Point {
    let mut sum = vec![Some(0.0); n];
    for p in points {
        for (i, s) in sum.iter_mut().enumerate() {
            *s = s.zip(p.x().get(i)).map(|(a, b)| a + b);
        }
    }
    let count = points.len() as f64;
    Point::new(sum.into_iter().map(|s| s.map(|v| v / count)).collect())
}
