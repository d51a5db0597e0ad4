//! Nelder-Mead simplex search for mesh adaptive direct search.
//!
//! # Algorithm
//!
//! The solver keeps a simplex of `n + 1` evaluated points sorted from best to
//! worst. Each iteration reflects the worst vertex through the centroid of the
//! others, then expands, contracts outside, or contracts inside depending on
//! how the reflect point compares to the best vertices (`Y0`) and the worst
//! ones (`Yn`). The iteration ends when a trial point replaces the worst
//! vertex, or when the simplex must shrink toward its best vertex.
//!
//! Points are compared by dominance on `(f, h)`, so constraints are handled
//! the way the progressive barrier handles them.
//!
//! # Roles
//!
//! - [`Role::Standalone`]: Nelder-Mead is the optimizer. It shrinks its
//!   simplex when no trial point helps and its frame center follows the best
//!   point. Use [`minimize`] with a blackbox model.
//! - [`Role::Search`]: Nelder-Mead proposes points for an enclosing direct
//!   search. Trial points are projected on that search's mesh, the pass is
//!   capped at `n × trial_factor` evaluations, and a needed shrink ends the
//!   pass with [`StopReason::NoShrink`]. Use [`run`] with any
//!   [`Evaluator`], blackbox or surrogate.
//!
//! [`trial_points`] generates the four reflective points of one simplex
//! without evaluating them, so a caller can rank them with a model first.
//!
//! # Observer Events
//!
//! The solver emits:
//!
//! - [`Event::Evaluated`] for every trial point, including cache hits
//! - [`Event::Shrunk`] after a successful shrink
//!
//! Observers can return [`Action::StopEarly`] to end the pass with
//! [`StopReason::StoppedByObserver`].

mod action;
mod config;
mod error;
mod event;
mod frame;
mod init;
mod iteration;
mod reflective;
mod search;
mod simplex;
mod solution;
mod step;
mod stop;


pub use action::Action;
pub use config::{
    Config, ConfigError, DELTA_R, RankFailurePolicy, Role, SEARCH_RANK_EPS, STANDALONE_RANK_EPS,
};
pub use error::Error;
pub use event::Event;
pub use frame::Frame;
pub use reflective::Reflective;
pub use simplex::{Characteristics, Simplex};
pub use solution::{Report, Solution, TrialPoints};
pub use step::StepType;
pub use stop::StopReason;

use mads_core::{
    Barrier, BlackboxProblem, Cache, Domain, Evaluator, Mesh, Model, Observer, OutputSpec,
    SearchContext,
};

/// Minimizes a blackbox with the standalone Nelder-Mead driver.
///
/// The initial simplex is `x0` (snapped to `domain`) plus one point per
/// coordinate at `initial_step` from it. Iterations run until a stop reason
/// is reached; the best point evaluated is returned with its model snapshot.
///
/// # Errors
///
/// Returns [`Error::Dimension`] if `x0` does not match `domain`, and
/// [`Error::NoFrameCenter`] or [`Error::NoSuccessfulEvaluation`] if no seed
/// point evaluates successfully.
pub fn minimize<M, P, Obs>(
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
    search::minimize(model, problem, spec, domain, x0, config, observer)
}

/// Minimizes a blackbox without observer support.
///
/// This is a convenience wrapper around [`minimize`] that uses a no-op observer.
///
/// # Errors
///
/// See [`minimize`].
pub fn minimize_unobserved<M, P>(
    model: &M,
    problem: &P,
    spec: OutputSpec,
    domain: &Domain,
    x0: &[f64],
    config: &Config,
) -> Result<Solution<M::Input, M::Output>, Error>
where
    M: Model,
    P: BlackboxProblem<Input = M::Input, Output = M::Output>,
{
    minimize(model, problem, spec, domain, x0, config, ())
}

/// Runs one Nelder-Mead pass around the barrier's incumbent.
///
/// The simplex is built from points already in the evaluator's cache. Every
/// evaluation updates `barrier` and `context`. Stopping is never an error:
/// the returned [`Report`] says why the pass ended.
///
/// # Errors
///
/// Returns [`Error::NoFrameCenter`] if the barrier has no incumbent, and
/// [`Error::Dimension`] if the incumbent or mesh does not match `domain`.
pub fn run<E, Obs>(
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
    search::run(evaluator, barrier, domain, mesh, context, config, observer)
}

/// Runs one Nelder-Mead pass without observer support.
///
/// This is a convenience wrapper around [`run`] that uses a no-op observer.
///
/// # Errors
///
/// See [`run`].
pub fn run_unobserved<E: Evaluator>(
    evaluator: &mut E,
    barrier: &mut Barrier,
    domain: &Domain,
    mesh: Option<&dyn Mesh>,
    context: &mut SearchContext,
    config: &Config,
) -> Result<Report, Error> {
    run(evaluator, barrier, domain, mesh, context, config, ())
}

/// Generates the reflect, expand, and contraction points of the simplex
/// around the barrier's incumbent, without evaluating them.
///
/// Duplicate points are dropped. The result ends with
/// [`StopReason::SingleCompleted`], or [`StopReason::InitialFailed`] with no
/// points when the cache holds no usable simplex.
///
/// # Errors
///
/// Returns [`Error::NoFrameCenter`] if the barrier has no incumbent, and
/// [`Error::Dimension`] if the incumbent or mesh does not match `domain`.
pub fn trial_points(
    cache: &Cache,
    barrier: &Barrier,
    domain: &Domain,
    mesh: Option<&dyn Mesh>,
    config: &Config,
) -> Result<TrialPoints, Error> {
    search::trial_points(cache, barrier, domain, mesh, config)
}
