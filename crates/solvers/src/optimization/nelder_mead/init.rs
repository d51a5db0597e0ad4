use mads_core::{Cache, EvalPoint, EvalType};

use super::{Config, Frame, Simplex, StopReason, simplex::compare};

/// Builds the initial simplex from cached points around the frame center.
///
/// A cached point is a candidate when its evaluation is `Ok` with complete
/// outputs, it has the problem dimension, and it lies in the inclusion box:
/// `include_factor` frame sizes around the center when there is a mesh,
/// `include_length` otherwise. The center itself is always a candidate.
/// Candidates are tried best first and kept only when they raise the rank.
///
/// # Errors
///
/// Returns [`StopReason::InitialFailed`] unless `n + 1` affinely independent
/// points are found.
pub(super) fn build(
    simplex: &mut Simplex,
    cache: &Cache,
    frame: &Frame<'_>,
    config: &Config,
) -> Result<(), StopReason> {
    let n = frame.dim();
    let et = simplex.eval_type();
    let center = frame.center();

    let half_width = match frame.frame_size() {
        Some(frame_size) if config.include_factor() > 0 => frame_size
            .iter()
            .map(|d| d * config.include_factor() as f64)
            .collect(),
        _ => vec![config.include_length(); n],
    };
    let inside = |p: &EvalPoint| {
        (0..n).all(|i| match (p.x().get(i), center.x().get(i)) {
            (Some(x), Some(c)) => (x - c).abs() <= half_width[i],
            _ => false,
        })
    };

    let mut candidates: Vec<&EvalPoint> = cache.find(|p| {
        usable(p, et, n) && (p.x() == center.x() || inside(p))
    });
    if usable(center, et, n) && cache.get(center.x()).is_none() {
        candidates.push(center);
    }
    candidates.sort_by(|a, b| compare(a, b, et));
    log::debug!("{} candidate points for the initial simplex", candidates.len());

    if candidates.len() < n + 1 {
        return Err(StopReason::InitialFailed);
    }

    simplex.clear();
    for candidate in candidates {
        if simplex.len() == n + 1 {
            break;
        }
        if simplex.add(candidate.clone()).is_none() {
            continue;
        }
        let rank = simplex
            .rank(frame.frame_size(), config.rank_eps())
            .map_err(|_| StopReason::InitialFailed)?;
        if rank + 1 != simplex.len() {
            log::debug!("{candidate} not kept: no rank increase");
            simplex.remove_at(candidate.x());
        }
    }

    let full_rank = simplex
        .rank(frame.frame_size(), config.rank_eps())
        .is_ok_and(|rank| rank == n);
    if simplex.len() < n + 1 || !full_rank {
        log::debug!("initial simplex has {} of {} points", simplex.len(), n + 1);
        return Err(StopReason::InitialFailed);
    }
    simplex.update_characteristics();
    Ok(())
}

fn usable(p: &EvalPoint, et: EvalType, n: usize) -> bool {
    p.dim() == n
        && p
            .eval(et)
            .is_some_and(|e| e.is_ok() && e.outputs().iter().all(Option::is_some))
}

#[cfg(test)]
mod tests {
    use super::*;

    use mads_core::{Domain, Eval, FixedMesh, Point};

    fn cached(cache: &mut Cache, x: [f64; 2], f: f64) -> EvalPoint {
        cache
            .insert(EvalPoint::evaluated(
                Point::from(x),
                EvalType::Blackbox,
                Eval::with_fh(vec![Some(f)], Some(f), Some(0.0)),
            ))
            .clone()
    }

    #[test]
    fn skips_points_that_do_not_raise_rank() {
        let mut cache = Cache::new();
        let center = cached(&mut cache, [0.0, 0.0], 0.0);
        cached(&mut cache, [1.0, 0.0], 1.0);
        cached(&mut cache, [2.0, 0.0], 2.0);
        cached(&mut cache, [0.0, 3.0], 3.0);

        let domain = Domain::continuous(2);
        let frame = Frame::new(center, &domain);
        let mut simplex = Simplex::new(2, EvalType::Blackbox);
        build(&mut simplex, &cache, &frame, &Config::default()).expect("simplex");

        assert_eq!(simplex.len(), 3);
        assert!(simplex.position(&Point::from([2.0, 0.0])).is_none());
        assert!(simplex.characteristics().is_some());
    }

    #[test]
    fn respects_inclusion_box() {
        let mut cache = Cache::new();
        let center = cached(&mut cache, [0.0, 0.0], 0.0);
        cached(&mut cache, [0.1, 0.0], 1.0);
        cached(&mut cache, [0.0, 5.0], 2.0);

        let domain = Domain::continuous(2);
        let mesh = FixedMesh::uniform(2, 0.01, 0.1).unwrap();
        let frame = Frame::new(center.clone(), &domain).with_mesh(&mesh);
        let mut simplex = Simplex::new(2, EvalType::Blackbox);

        // The box is 8 × 0.1 wide on each side: [0, 5] is out.
        let result = build(&mut simplex, &cache, &frame, &Config::search());
        assert_eq!(result, Err(StopReason::InitialFailed));

        // Without a mesh the include length is infinite.
        let frame = Frame::new(center, &domain);
        assert!(build(&mut simplex, &cache, &frame, &Config::search()).is_ok());
    }

    #[test]
    fn fails_on_failed_evaluations() {
        let mut cache = Cache::new();
        let center = cached(&mut cache, [0.0, 0.0], 0.0);
        cached(&mut cache, [1.0, 0.0], 1.0);
        cache.insert(EvalPoint::evaluated(
            Point::from([0.0, 1.0]),
            EvalType::Blackbox,
            Eval::failed(),
        ));

        let domain = Domain::continuous(2);
        let frame = Frame::new(center, &domain);
        let mut simplex = Simplex::new(2, EvalType::Blackbox);
        let result = build(&mut simplex, &cache, &frame, &Config::default());
        assert_eq!(result, Err(StopReason::InitialFailed));
    }
}
