use mads_core::{Cache, EvalPoint, EvalType, Point};

use super::{Config, Error, MAX_OUTPUT};

/// Cache points selected to fit a model around a center.
#[derive(Debug, Clone)]
pub struct TrainingSet {
    points: Vec<EvalPoint>,
    box_size: Vec<f64>,
}

impl TrainingSet {
    /// Selects blackbox-evaluated cache points in a box around `center`.
    ///
    /// The box spans `box_factor × frame_size` (unbounded without a frame
    /// size). If it holds fewer than `n` points it is doubled once. Of the
    /// points found, the [`Config::max_samples`] closest to `center` are kept.
    ///
    /// A point qualifies when its blackbox evaluation is `Ok` with complete
    /// outputs and its `f` and `h` are defined and at most [`MAX_OUTPUT`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::TooFewSamples`] if fewer than two points, or fewer
    /// than [`Config::min_points`], qualify.
    pub fn select(
        cache: &Cache,
        center: &Point,
        frame_size: Option<&[f64]>,
        config: &Config,
    ) -> Result<Self, Error> {
        let n = center.dim();
        let mut box_size: Vec<f64> = match frame_size {
            Some(frame) => frame.iter().map(|d| d * config.box_factor()).collect(),
            None => vec![f64::INFINITY; n],
        };

        let mut points = find_in_box(cache, center, &box_size);
        if points.len() < n {
            box_size.iter_mut().for_each(|d| *d *= 2.0);
            points = find_in_box(cache, center, &box_size);
        }

        let found = points.len();
        if found > config.max_samples() {
            points.sort_by(|a, b| {
                let da = a.x().distance(center).unwrap_or(f64::INFINITY);
                let db = b.x().distance(center).unwrap_or(f64::INFINITY);
                da.total_cmp(&db)
            });
            points.truncate(config.max_samples());
            log::debug!("training set: kept {} of {found} points", points.len());
        }

        let min = config.min_points().max(2);
        if points.len() < min {
            return Err(Error::TooFewSamples {
                count: points.len(),
                min,
            });
        }

        Ok(Self {
            points: points.into_iter().cloned().collect(),
            box_size,
        })
    }

    #[must_use]
    pub fn points(&self) -> &[EvalPoint] {
        &self.points
    }

    /// Full width of the selection box per dimension.
    #[must_use]
    pub fn box_size(&self) -> &[f64] {
        &self.box_size
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    #[must_use]
    pub fn into_points(self) -> Vec<EvalPoint> {
        self.points
    }
}

fn find_in_box<'c>(cache: &'c Cache, center: &Point, box_size: &[f64]) -> Vec<&'c EvalPoint> {
    cache.find(|p| is_valid_sample(p) && in_box(p.x(), center, box_size))
}

fn is_valid_sample(point: &EvalPoint) -> bool {
    let Some(eval) = point.eval(EvalType::Blackbox).filter(|e| e.is_ok()) else {
        return false;
    };
    let bounded = |v: Option<f64>| v.is_some_and(|v| v <= MAX_OUTPUT);
    eval.output_values().is_some() && bounded(eval.f()) && bounded(eval.h())
}

/// Whether `x` is within half the box size of `center` in every dimension.
fn in_box(x: &Point, center: &Point, box_size: &[f64]) -> bool {
    x.dim() == center.dim()
        && (0..x.dim()).all(|i| match (x.get(i), center.get(i), box_size.get(i)) {
            (Some(v), Some(c), Some(size)) => 2.0 * (v - c).abs() <= *size,
            _ => false,
        })
}
