use std::cmp::Ordering;

use mads_core::{EvalPoint, EvalType, Point};
use ndarray::Array2;

use crate::linalg::{self, SvdError};

/// Geometry of a full simplex.
#[derive(Debug, Clone, PartialEq)]
pub struct Characteristics {
    /// Largest distance between two vertices.
    pub diameter: f64,

    /// The two vertices achieving the diameter.
    pub diameter_pair: (Point, Point),

    /// `|det(y_i - y_0)| / n!`.
    pub volume: f64,

    /// `volume / diameter^n`, or zero for a collapsed simplex.
    pub normalized_volume: f64,
}

/// The working simplex `Y` of a Nelder-Mead pass.
///
/// Vertices are kept sorted best first by `(h, f)`, with points that have no
/// `h` or no `f` after those that do and ties broken by cache tag, so the
/// last vertex is always the worst. A vertex that dominates another always
/// sorts before it. Vertices have distinct coordinates and a complete,
/// successful evaluation.
///
/// The views [`y0`](Self::y0) (vertices no other vertex dominates) and
/// [`yn`](Self::yn) (vertices that dominate no other vertex) are recomputed
/// whenever the membership changes. The geometric characteristics are
/// cleared on every change and recomputed by
/// [`update_characteristics`](Self::update_characteristics).
#[derive(Debug, Clone)]
pub struct Simplex {
    n: usize,
    eval_type: EvalType,
    points: Vec<EvalPoint>,
    y0: Vec<usize>,
    yn: Vec<usize>,
    characteristics: Option<Characteristics>,
    degenerate: bool,
}

impl Simplex {
    /// Creates an empty simplex for `n` variables, ordered by `eval_type`.
    #[must_use]
    pub fn new(n: usize, eval_type: EvalType) -> Self {
        Self {
            n,
            eval_type,
            points: Vec::with_capacity(n + 2),
            y0: Vec::new(),
            yn: Vec::new(),
            characteristics: None,
            degenerate: false,
        }
    }

    #[must_use]
    pub fn dim(&self) -> usize {
        self.n
    }

    #[must_use]
    pub fn eval_type(&self) -> EvalType {
        self.eval_type
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Returns true once the simplex holds `n + 1` vertices.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.points.len() > self.n
    }

    /// Returns true if a rank check failed and the contents were kept anyway.
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        self.degenerate
    }

    pub(super) fn set_degenerate(&mut self, degenerate: bool) {
        self.degenerate = degenerate;
    }

    /// Vertices, best first.
    #[must_use]
    pub fn points(&self) -> &[EvalPoint] {
        &self.points
    }

    #[must_use]
    pub fn best(&self) -> Option<&EvalPoint> {
        self.points.first()
    }

    #[must_use]
    pub fn worst(&self) -> Option<&EvalPoint> {
        self.points.last()
    }

    /// Position of the vertex at `x`.
    #[must_use]
    pub fn position(&self, x: &Point) -> Option<usize> {
        self.points.iter().position(|p| p.x() == x)
    }

    /// Indices of the vertices no other vertex dominates, in simplex order.
    #[must_use]
    pub fn y0(&self) -> &[usize] {
        &self.y0
    }

    /// Indices of the vertices that dominate no other vertex, in simplex order.
    #[must_use]
    pub fn yn(&self) -> &[usize] {
        &self.yn
    }

    /// The characteristics from the last update, if the simplex has not
    /// changed since.
    #[must_use]
    pub fn characteristics(&self) -> Option<&Characteristics> {
        self.characteristics.as_ref()
    }

    /// Adds `x` and evicts the worst vertex if the simplex grows past `n + 1`.
    ///
    /// Returns true if the simplex changed: false when `x` is rejected or is
    /// itself the vertex evicted.
    pub fn insert(&mut self, x: EvalPoint) -> bool {
        let Some(position) = self.add(x) else {
            return false;
        };
        if self.points.len() > self.n + 1 {
            let last = self.points.len() - 1;
            self.remove(last);
            return position != last;
        }
        true
    }

    /// Adds `x` at its sorted position without evicting anything.
    ///
    /// Returns `None` if `x` duplicates a vertex or lacks a complete,
    /// successful evaluation. A point tied with existing vertices goes after
    /// them.
    pub(super) fn add(&mut self, x: EvalPoint) -> Option<usize> {
        if !x.is_eval_ok(self.eval_type) || !x.x().is_complete() || x.dim() != self.n {
            log::debug!("not adding {x} to the simplex: incomplete or not evaluated");
            return None;
        }
        if self.position(x.x()).is_some() {
            log::debug!("not adding {x} to the simplex: duplicate vertex");
            return None;
        }
        let et = self.eval_type;
        let position = self
            .points
            .partition_point(|p| compare(p, &x, et) != Ordering::Greater);
        self.points.insert(position, x);
        self.membership_changed();
        Some(position)
    }

    /// Removes and returns the vertex at `index`.
    pub(super) fn remove(&mut self, index: usize) -> EvalPoint {
        let point = self.points.remove(index);
        self.membership_changed();
        point
    }

    /// Removes the vertex at `x`, if present.
    pub(super) fn remove_at(&mut self, x: &Point) -> Option<EvalPoint> {
        let index = self.position(x)?;
        Some(self.remove(index))
    }

    /// Replaces every vertex, keeping the sort order.
    pub(super) fn restore(&mut self, points: Vec<EvalPoint>) {
        self.points = points;
        let et = self.eval_type;
        self.points.sort_by(|a, b| compare(a, b, et));
        self.membership_changed();
        self.update_characteristics();
    }

    pub(super) fn clear(&mut self) {
        self.points.clear();
        self.degenerate = false;
        self.membership_changed();
    }

    /// Recomputes diameter, volume, and normalized volume.
    ///
    /// Returns `None`, and clears any previous values, while the simplex has
    /// fewer than `n + 1` vertices.
    pub fn update_characteristics(&mut self) -> Option<&Characteristics> {
        self.characteristics = None;
        if !self.is_ready() {
            return None;
        }

        let mut diameter = 0.0;
        let mut pair = (0, 0);
        for i in 0..self.points.len() {
            for j in (i + 1)..self.points.len() {
                let d = self.points[i]
                    .x()
                    .distance(self.points[j].x())
                    .unwrap_or_default();
                if d > diameter {
                    diameter = d;
                    pair = (i, j);
                }
            }
        }

        let volume = match linalg::singular_values(&self.edges(None)) {
            Ok(w) => w.product() / factorial(self.n),
            Err(error) => {
                log::warn!("simplex volume unavailable: {error}");
                0.0
            }
        };
        let normalized_volume = if diameter > 0.0 {
            volume / diameter.powi(i32::try_from(self.n).unwrap_or(i32::MAX))
        } else {
            0.0
        };

        self.characteristics = Some(Characteristics {
            diameter,
            diameter_pair: (
                self.points[pair.0].x().clone(),
                self.points[pair.1].x().clone(),
            ),
            volume,
            normalized_volume,
        });
        self.characteristics.as_ref()
    }

    /// Numerical rank of the edge matrix `[(y_i - y_0) / Δ]`.
    ///
    /// Edges are divided by the frame size `Δ` per dimension when one is
    /// given. Singular values at or below `eps` count as zero.
    ///
    /// # Errors
    ///
    /// Returns an error if the SVD fails.
    pub fn rank(&self, frame_size: Option<&[f64]>, eps: f64) -> Result<usize, SvdError> {
        if self.points.len() < 2 {
            return Ok(0);
        }
        linalg::rank(&self.edges(frame_size), eps)
    }

    /// Returns true if `x` dominates some vertex of [`y0`](Self::y0).
    #[must_use]
    pub fn point_dominates_y0(&self, x: &EvalPoint) -> bool {
        x.is_eval_ok(self.eval_type)
            && self
                .y0
                .iter()
                .any(|&i| x.dominates(&self.points[i], self.eval_type))
    }

    /// Returns true if [`yn`](Self::yn) dominates `x`.
    ///
    /// Besides plain dominance by a vertex of `yn`, `x` also counts as
    /// dominated when the last vertex of `yn` has a defined `h` and `x` has
    /// either no `h` or a larger one.
    #[must_use]
    pub fn yn_dominates_point(&self, x: &EvalPoint) -> bool {
        let et = self.eval_type;
        if !x.is_eval_ok(et) {
            return false;
        }
        if self.yn.iter().any(|&i| self.points[i].dominates(x, et)) {
            return true;
        }
        let Some(h_last) = self.yn.last().and_then(|&i| self.points[i].h(et)) else {
            return false;
        };
        x.h(et).is_none_or(|h| h_last < h)
    }

    /// Counts the vertices `x` dominates, scanning best first and stopping
    /// at `cap`.
    #[must_use]
    pub fn dominated_count(&self, x: &EvalPoint, cap: usize) -> usize {
        if !x.is_eval_ok(self.eval_type) {
            return 0;
        }
        let mut count = 0;
        for point in &self.points {
            if count >= cap {
                break;
            }
            if x.dominates(point, self.eval_type) {
                count += 1;
            }
        }
        count
    }

    /// The `(len - 1) × n` matrix of edges from the first vertex.
    fn edges(&self, frame_size: Option<&[f64]>) -> Array2<f64> {
        let rows = self.points.len().saturating_sub(1);
        let mut dz = Array2::zeros((rows, self.n));
        let Some(y0) = self.points.first() else {
            return dz;
        };
        for (r, y) in self.points.iter().skip(1).enumerate() {
            for j in 0..self.n {
                let scale = frame_size
                    .and_then(|delta| delta.get(j).copied())
                    .filter(|d| *d > 0.0)
                    .unwrap_or(1.0);
                let edge = y.x().get(j).unwrap_or_default() - y0.x().get(j).unwrap_or_default();
                dz[[r, j]] = edge / scale;
            }
        }
        dz
    }

    fn membership_changed(&mut self) {
        self.characteristics = None;
        let et = self.eval_type;
        let points = &self.points;
        self.y0 = (0..points.len())
            .filter(|&i| !points.iter().any(|p| p.dominates(&points[i], et)))
            .collect();
        self.yn = (0..points.len())
            .filter(|&i| !points.iter().any(|p| points[i].dominates(p, et)))
            .collect();
    }
}

/// Simplex order: `(h undefined, h, f undefined, f, tag)`.
pub(super) fn compare(a: &EvalPoint, b: &EvalPoint, et: EvalType) -> Ordering {
    a.cmp_hf(b, et).then_with(|| a.tag().cmp(&b.tag()))
}

fn factorial(n: usize) -> f64 {
    (1..=n).map(|k| k as f64).product()
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;
    use mads_core::Eval;

    fn vertex(x: [f64; 2], f: f64, h: f64, tag: u64) -> EvalPoint {
        let mut p = EvalPoint::evaluated(
            Point::from(x),
            EvalType::Blackbox,
            Eval::with_fh(vec![Some(f)], Some(f), Some(h)),
        );
        p.set_tag(tag);
        p
    }

    fn triangle() -> Simplex {
        let mut y = Simplex::new(2, EvalType::Blackbox);
        assert!(y.insert(vertex([0.0, 0.0], 3.0, 0.0, 0)));
        assert!(y.insert(vertex([1.0, 0.0], 2.0, 0.0, 1)));
        assert!(y.insert(vertex([0.0, 1.0], 1.0, 0.0, 2)));
        y
    }

    #[test]
    fn keeps_best_first() {
        let y = triangle();
        let fs: Vec<f64> = y
            .points()
            .iter()
            .map(|p| p.f(EvalType::Blackbox).unwrap())
            .collect();
        assert_eq!(fs, vec![1.0, 2.0, 3.0]);
        assert_eq!(y.worst().unwrap().x(), &Point::from([0.0, 0.0]));
    }

    #[test]
    fn feasible_before_infeasible() {
        let mut y = Simplex::new(2, EvalType::Blackbox);
        y.insert(vertex([0.0, 0.0], -5.0, 0.5, 0));
        y.insert(vertex([1.0, 0.0], 4.0, 0.0, 1));
        assert_eq!(y.best().unwrap().x(), &Point::from([1.0, 0.0]));
    }

    #[test]
    fn ties_go_after_existing_vertices() {
        let mut y = Simplex::new(2, EvalType::Blackbox);
        y.insert(vertex([0.0, 0.0], 1.0, 0.0, 5));
        y.insert(vertex([1.0, 0.0], 1.0, 0.0, 5));
        assert_eq!(y.points()[1].x(), &Point::from([1.0, 0.0]));
    }

    #[test]
    fn insert_rejects_duplicates_and_evicts_worst() {
        let mut y = triangle();
        assert!(!y.insert(vertex([0.0, 1.0], 0.0, 0.0, 3)));
        assert_eq!(y.len(), 3);

        // Worse than every vertex: bounces in and out.
        assert!(!y.insert(vertex([1.0, 1.0], 9.0, 0.0, 4)));
        assert_eq!(y.len(), 3);

        assert!(y.insert(vertex([1.0, 1.0], 0.5, 0.0, 5)));
        assert_eq!(y.len(), 3);
        assert!(y.position(&Point::from([0.0, 0.0])).is_none());
    }

    #[test]
    fn rejects_failed_evaluations() {
        let mut y = Simplex::new(1, EvalType::Blackbox);
        let failed = EvalPoint::evaluated(Point::from([0.0]), EvalType::Blackbox, Eval::failed());
        assert!(!y.insert(failed));
        assert!(y.is_empty());
    }

    #[test]
    fn characteristics_need_full_simplex() {
        let mut y = Simplex::new(2, EvalType::Blackbox);
        y.insert(vertex([0.0, 0.0], 1.0, 0.0, 0));
        y.insert(vertex([1.0, 0.0], 2.0, 0.0, 1));
        assert!(!y.is_ready());
        assert!(y.update_characteristics().is_none());
    }

    #[test]
    fn characteristics_of_unit_triangle() {
        let mut y = triangle();
        let c = y.update_characteristics().unwrap().clone();
        assert_relative_eq!(c.diameter, 2.0_f64.sqrt(), epsilon = 1e-12);
        assert_relative_eq!(c.volume, 0.5, epsilon = 1e-12);
        assert_relative_eq!(c.normalized_volume, 0.25, epsilon = 1e-12);

        let mut pair = [c.diameter_pair.0.clone(), c.diameter_pair.1.clone()];
        pair.sort_by(|a, b| a.get(0).unwrap().total_cmp(&b.get(0).unwrap()));
        assert_eq!(pair, [Point::from([0.0, 1.0]), Point::from([1.0, 0.0])]);
    }

    #[test]
    fn update_characteristics_is_idempotent() {
        let mut y = triangle();
        let first = y.update_characteristics().cloned();
        let second = y.update_characteristics().cloned();
        assert_eq!(first, second);
    }

    #[test]
    fn membership_change_clears_characteristics() {
        let mut y = triangle();
        y.update_characteristics();
        y.insert(vertex([1.0, 1.0], 0.0, 0.0, 3));
        assert!(y.characteristics().is_none());
    }

    #[test]
    fn rank_scales_by_frame_size() {
        let y = triangle();
        assert_eq!(y.rank(None, 1e-13).unwrap(), 2);

        // Edges of length 1 shrink to 1e-3 under a frame of 1000.
        assert_eq!(y.rank(Some(&[1000.0, 1000.0]), 0.01).unwrap(), 0);
        assert_eq!(y.rank(Some(&[1.0, 1.0]), 0.01).unwrap(), 2);
    }

    #[test]
    fn collinear_simplex_loses_rank() {
        let mut y = Simplex::new(2, EvalType::Blackbox);
        y.insert(vertex([0.0, 0.0], 1.0, 0.0, 0));
        y.insert(vertex([1.0, 1.0], 2.0, 0.0, 1));
        y.insert(vertex([2.0, 2.0], 3.0, 0.0, 2));
        assert_eq!(y.rank(None, 1e-10).unwrap(), 1);
    }

    #[test]
    fn views_are_consistent() {
        let mut y = Simplex::new(2, EvalType::Blackbox);
        y.insert(vertex([0.0, 0.0], 1.0, 0.2, 0));
        y.insert(vertex([1.0, 0.0], 3.0, 0.0, 1));
        y.insert(vertex([0.0, 1.0], 2.0, 0.3, 2));
        let et = EvalType::Blackbox;

        // Sorted by h: (f=3, h=0), (f=1, h=0.2), (f=2, h=0.3). The second
        // dominates the third; the first is tied with both.
        assert_eq!(y.y0(), &[0, 1]);
        assert_eq!(y.yn(), &[0, 2]);

        for &i in y.y0() {
            assert!(!y.points().iter().any(|p| p.dominates(&y.points()[i], et)));
        }
        for &i in y.yn() {
            assert!(!y.points().iter().any(|p| y.points()[i].dominates(p, et)));
        }
    }

    #[test]
    fn classifies_trial_points() {
        let y = triangle();

        let best = vertex([0.5, 0.5], 0.5, 0.0, 10);
        assert!(y.point_dominates_y0(&best));
        assert_eq!(y.dominated_count(&best, 2), 2);
        assert_eq!(y.dominated_count(&best, 5), 3);

        let middle = vertex([0.5, 0.5], 2.5, 0.0, 10);
        assert!(!y.point_dominates_y0(&middle));
        assert!(!y.yn_dominates_point(&middle));
        assert_eq!(y.dominated_count(&middle, 2), 1);

        let worst = vertex([0.5, 0.5], 4.0, 0.0, 10);
        assert!(y.yn_dominates_point(&worst));

        let infeasible = vertex([0.5, 0.5], -1.0, 0.1, 10);
        assert!(y.yn_dominates_point(&infeasible));
    }
}
