use mads_core::{
    Barrier, BlackboxProblem, Cache, Domain, EvalPoint, EvalType, Evaluator, Mesh, Model,
    Observer, OutputSpec, Point, SearchContext, Success,
};

use crate::optimization::BlackboxEvaluator;

use super::{
    Action, Config, Error, Event, Frame, Reflective, Report, Role, Simplex, Solution, StepType,
    StopReason, TrialPoints, init, iteration::Run,
};

/// Runs Nelder-Mead iterations until a stop reason is reached.
///
/// The frame center is the barrier's first incumbent. In the standalone role
/// the center follows the barrier as it improves; in the search role it stays
/// fixed for the whole pass and evaluations are capped at
/// `n × trial_factor`.
pub(super) fn run<E, Obs>(
    evaluator: &mut E,
    barrier: &mut Barrier,
    domain: &Domain,
    mesh: Option<&dyn Mesh>,
    context: &mut SearchContext,
    config: &Config,
    observer: Obs,
) -> Result<Report, Error>
where
    E: Evaluator,
    Obs: for<'a> Observer<Event<'a>, Action>,
{
    let n = domain.dim();
    let mut frame = frame_around(barrier, domain, mesh)?;
    let mut simplex = Simplex::new(n, evaluator.eval_type());

    if let Err(stop) = init::build(&mut simplex, evaluator.cache(), &frame, config) {
        log::info!("Nelder-Mead stopped before iterating: {stop}");
        return Ok(Report {
            stop,
            success: Success::Unsuccessful,
            iters: 0,
            steps: 0,
            evals: 0,
            simplex,
        });
    }

    let budget = match config.role() {
        Role::Standalone => None,
        Role::Search => Some(n * config.trial_factor()),
    };
    let mut run = Run {
        config: *config,
        evaluator,
        barrier,
        context,
        observer,
        budget,
        success: Success::Unsuccessful,
        evals: 0,
        steps: 0,
    };

    let mut iters = 0;
    let stop = loop {
        if iters >= config.max_iters() {
            break StopReason::StepLimit;
        }
        iters += 1;

        if config.role() == Role::Standalone
            && let Some(best) = run.barrier.first_point()
            && best.x() != frame.center().x()
        {
            frame.set_center(best.clone());
        }
        if let Some(stop) = run.iterate(&frame, &mut simplex) {
            break stop;
        }
    };

    log::info!(
        "Nelder-Mead stopped after {iters} iterations and {} evaluations: {stop}",
        run.evals
    );
    Ok(Report {
        stop,
        success: run.success,
        iters,
        steps: run.steps,
        evals: run.evals,
        simplex,
    })
}

/// Minimizes a blackbox from `x0` with the standalone driver.
pub(super) fn minimize<M, P, Obs>(
    model: &M,
    problem: &P,
    spec: OutputSpec,
    domain: &Domain,
    x0: &[f64],
    config: &Config,
    observer: Obs,
) -> Result<Solution<M::Input, M::Output>, Error>
where
    M: Model,
    P: BlackboxProblem<Input = M::Input, Output = M::Output>,
    Obs: for<'a> Observer<Event<'a>, Action>,
{
    check_dim(domain.dim(), x0.len())?;

    let mut evaluator = BlackboxEvaluator::new(model, problem, spec);
    let seeded = seed(&mut evaluator, domain, x0, config.initial_step());
    log::debug!("{seeded} seed points evaluated");

    let mut barrier = Barrier::from_points(EvalType::Blackbox, evaluator.cache().iter());
    let mut context = SearchContext::new(domain.categorical_count());
    let report = run(
        &mut evaluator,
        &mut barrier,
        domain,
        None,
        &mut context,
        config,
        observer,
    )?;

    let evals = evaluator.evals();
    let (point, snapshot) = evaluator
        .into_best()
        .ok_or(Error::NoSuccessfulEvaluation)?;
    let et = EvalType::Blackbox;
    let (Some(x), Some(f), Some(h)) = (point.x().values(), point.f(et), point.h(et)) else {
        return Err(Error::NoSuccessfulEvaluation);
    };

    Ok(Solution {
        status: report.stop,
        x,
        f,
        h,
        snapshot,
        iters: report.iters,
        evals,
    })
}

/// Evaluates `x0` and one neighbor per coordinate, giving the initial simplex
/// its `n + 1` points.
///
/// The neighbor along `i` is `x0 + step eᵢ`, or `x0 - step eᵢ` when the
/// bounds snap the first one back onto `x0`. Seeding ends early if the
/// evaluator refuses work. Returns the number of points evaluated.
pub(super) fn seed<E: Evaluator>(
    evaluator: &mut E,
    domain: &Domain,
    x0: &[f64],
    step: f64,
) -> usize {
    let origin = domain.snap(&Point::from(x0));
    let mut seeds = vec![EvalPoint::new(origin.clone())];

    for i in 0..origin.dim() {
        let neighbor = [step, -step].into_iter().find_map(|s| {
            let mut x = origin.clone();
            x.set(i, origin.get(i).map(|v| v + s));
            let x = domain.snap(&x);
            (x != origin).then_some(x)
        });
        match neighbor {
            Some(x) => {
                let mut point = EvalPoint::new(x);
                point.set_point_from(origin.clone());
                seeds.push(point);
            }
            None => log::warn!("no seed point along coordinate {i}"),
        }
    }

    let total = seeds.len();
    let mut evaluated = 0;
    for point in seeds {
        if evaluator.evaluate(point).is_none() {
            log::warn!("seeding stopped after {evaluated} of {total} points");
            break;
        }
        evaluated += 1;
    }
    evaluated
}

/// Generates the four reflective trial points of the simplex around the
/// barrier's incumbent without evaluating them.
pub(super) fn trial_points(
    cache: &Cache,
    barrier: &Barrier,
    domain: &Domain,
    mesh: Option<&dyn Mesh>,
    config: &Config,
) -> Result<TrialPoints, Error> {
    let frame = frame_around(barrier, domain, mesh)?;
    let mut simplex = Simplex::new(domain.dim(), barrier.eval_type());
    if let Err(stop) = init::build(&mut simplex, cache, &frame, config) {
        return Ok(TrialPoints {
            points: Vec::new(),
            stop,
        });
    }

    let mut engine = Reflective::new(*config, &frame);
    let mut points: Vec<(StepType, EvalPoint)> = Vec::new();
    for step in StepType::REFLECTIVE {
        engine.set_current_step(step);
        if let Some(point) = engine.generate_trial_point(&simplex)
            && points.iter().all(|(_, p)| p.x() != point.x())
        {
            points.push((step, point));
        }
    }
    log::debug!("generated {} reflective trial points", points.len());

    Ok(TrialPoints {
        points,
        stop: StopReason::SingleCompleted,
    })
}

/// Builds the frame around the barrier's first incumbent.
fn frame_around<'a>(
    barrier: &Barrier,
    domain: &'a Domain,
    mesh: Option<&'a dyn Mesh>,
) -> Result<Frame<'a>, Error> {
    let n = domain.dim();
    let center = barrier.first_point().cloned().ok_or(Error::NoFrameCenter)?;
    check_dim(n, center.dim())?;

    let frame = Frame::new(center, domain);
    match mesh {
        Some(mesh) => {
            check_dim(n, mesh.frame_size().len())?;
            Ok(frame.with_mesh(mesh))
        }
        None => Ok(frame),
    }
}

fn check_dim(expected: usize, found: usize) -> Result<(), Error> {
    if expected == found {
        Ok(())
    } else {
        Err(Error::Dimension { expected, found })
    }
}
