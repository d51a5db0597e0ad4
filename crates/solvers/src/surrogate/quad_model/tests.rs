use super::*;

use approx::assert_relative_eq;
use mads_core::{Cache, Evaluator, OutputType};

fn objective_only() -> OutputSpec {
    OutputSpec::objective_only()
}

fn sample(x: &[f64], outputs: &[f64], spec: &OutputSpec) -> EvalPoint {
    EvalPoint::evaluated(
        Point::from(x),
        EvalType::Blackbox,
        Eval::from_outputs(outputs, spec),
    )
}

/// `1 + 2x - y + 1.5x² - 0.5y² + 0.5xy`, i.e. coefficients `[1, 2, -1, 3, -1, 0.5]`.
fn quadratic(x: &[f64]) -> f64 {
    let (a, b) = (x[0], x[1]);
    1.0 + 2.0 * a - b + 1.5 * a * a - 0.5 * b * b + 0.5 * a * b
}

const EXPECTED_ALPHA: [f64; 6] = [1.0, 2.0, -1.0, 3.0, -1.0, 0.5];

/// Six poised points spanning `[-1, 1]²`, so the scaling is the identity.
const SIX: [[f64; 2]; 6] = [
    [-1.0, -1.0],
    [1.0, -1.0],
    [-1.0, 1.0],
    [1.0, 1.0],
    [0.0, 0.0],
    [1.0, 0.0],
];

fn model_on(points: &[[f64; 2]], spec: &OutputSpec) -> QuadModel {
    let mut model = QuadModel::new(2, spec.clone());
    model.set_samples(
        points
            .iter()
            .map(|x| sample(x, &[quadratic(x)], spec))
            .collect(),
    );
    model
}

#[test]
fn regression_reproduces_exact_quadratic() {
    let spec = objective_only();
    let mut model = model_on(&SIX, &spec);

    let kind = model.construct(&Config::default()).unwrap();
    assert_eq!(kind, FitKind::Regression);
    assert!(model.is_ready());
    assert_eq!(model.n_alpha(), Some(6));

    let scaling = model.scaling().unwrap();
    assert_eq!(scaling.reference(), &[0.0, 0.0]);
    assert_eq!(scaling.factor(), &[1.0, 1.0]);

    let alpha = model.alpha(0).unwrap();
    for (a, expected) in alpha.iter().zip(EXPECTED_ALPHA) {
        assert_relative_eq!(*a, expected, epsilon = 1e-9);
    }
    for x in SIX {
        let scaled = model.scale(&Point::from(x)).unwrap();
        assert_relative_eq!(model.eval(&scaled, alpha).unwrap(), quadratic(&x), epsilon = 1e-9);
    }

    let cond = model.cond().unwrap();
    assert!(cond.is_finite() && cond >= 1.0);
}

#[test]
fn mfn_interpolates_samples() {
    let spec = objective_only();
    let corners = [[0.0, 0.0], [1.0, 0.0], [0.0, 1.0], [1.0, 1.0]];
    fn truth(x: &[f64]) -> f64 {
        x[0] * x[0] + 3.0 * x[1] - x[0] * x[1]
    }

    let mut model = QuadModel::new(2, spec.clone());
    model.set_samples(corners.iter().map(|x| sample(x, &[truth(x)], &spec)).collect());

    assert_eq!(model.construct(&Config::default()).unwrap(), FitKind::Mfn);
    assert_eq!(model.scaling().unwrap().reference(), &[0.5, 0.5]);
    for x in corners {
        let predicted = model.predict(&Point::from(x)).unwrap();
        assert_relative_eq!(predicted[0], truth(&x), epsilon = 1e-9);
    }
}

#[test]
fn well_poised_fit_recovers_quadratic() {
    let spec = objective_only();
    let mut points = SIX.to_vec();
    points.push([0.0, 1.0]);
    let mut model = model_on(&points, &spec);

    let config = Config::default().with_well_poised(true);
    assert_eq!(model.construct(&config).unwrap(), FitKind::WellPoised);
    assert!(model.cond().is_none());

    let alpha = model.alpha(0).unwrap();
    for (a, expected) in alpha.iter().zip(EXPECTED_ALPHA) {
        assert_relative_eq!(*a, expected, epsilon = 1e-9);
    }
}

#[test]
fn diagnostics_on_exact_fit() {
    let spec = objective_only();
    let mut model = model_on(&SIX, &spec);
    model.construct(&Config::default()).unwrap();

    let stats = model.compute_model_error(0).unwrap();
    assert!(stats.error < 1e-9);
    assert!(stats.max_rel_err < 1e-9);
    assert!(stats.min_rel_err <= stats.avg_rel_err);
    assert!(stats.avg_rel_err <= stats.max_rel_err);
    assert!(model.compute_max_rel_err().unwrap() < 1e-9);
    assert!(model.compute_model_error(1).is_none());
}

#[test]
fn gradient_in_scaled_coordinates() {
    let spec = objective_only();
    let mut model = model_on(&SIX, &spec);
    model.construct(&Config::default()).unwrap();

    // d/dx = 2 + 3x + 0.5y, d/dy = -1 - y + 0.5x
    let g = model.gradient(&Point::from([0.5, -0.5]), 0).unwrap();
    assert_relative_eq!(g[0], 3.25, epsilon = 1e-9);
    assert_relative_eq!(g[1], -0.25, epsilon = 1e-9);
    assert_eq!(model.unscale_grad(&g).unwrap(), g);
}

#[test]
fn eval_hf_aggregates_constraints() {
    let spec = OutputSpec::new(vec![
        OutputType::Objective,
        OutputType::ProgressiveBarrier,
        OutputType::ExtremeBarrier,
    ])
    .unwrap();
    let mut model = QuadModel::new(2, spec.clone());
    // Constraints are linear: c1 = x, c2 = y - 0.5.
    model.set_samples(
        SIX.iter()
            .map(|x| sample(x, &[quadratic(x), x[0], x[1] - 0.5], &spec))
            .collect(),
    );
    model.construct(&Config::default()).unwrap();

    let (f, h) = model.eval_hf(&Point::from([0.5, 0.0]), 0.0, HNorm::L2);
    assert_relative_eq!(f.unwrap(), quadratic(&[0.5, 0.0]), epsilon = 1e-9);
    assert_relative_eq!(h.unwrap(), 0.5, epsilon = 1e-9);

    let (f, h) = model.eval_hf(&Point::from([-0.5, 0.0]), 0.0, HNorm::L1);
    assert!(f.is_some());
    assert_relative_eq!(h.unwrap(), 0.0, epsilon = 1e-9);

    // Extreme-barrier violation.
    assert_eq!(
        model.eval_hf(&Point::from([0.0, 1.0]), 0.0, HNorm::L2),
        (None, None)
    );
}

#[test]
fn trust_radius_and_fixed_variables() {
    let spec = objective_only();
    let mut model = QuadModel::new(3, spec.clone());
    model.set_samples(
        SIX.iter()
            .map(|x| sample(&[x[0], x[1], 7.0], &[quadratic(x)], &spec))
            .collect(),
    );
    model.construct(&Config::default()).unwrap();

    assert_eq!(model.fixed_variables(), Some(&[false, false, true][..]));
    assert_eq!(model.nfree(), Some(2));
    assert!(model.is_within_trust_radius(&Point::from([1.0, -0.5, 0.0])));
    assert!(!model.is_within_trust_radius(&Point::from([1.5, 0.0, 0.0])));
    assert!(!model.is_within_trust_radius(&Point::from([0.0, 0.0, 0.1])));

    let raw = Point::from([0.25, 0.5, 7.0]);
    assert_eq!(model.unscale(&model.scale(&raw).unwrap()), Some(raw));
}

#[test]
fn trust_radius_follows_scaling_radius() {
    let spec = objective_only();
    let mut model = model_on(&SIX, &spec);
    let config = Config::default().with_radius(2.0).unwrap();
    model.construct(&config).unwrap();

    assert_relative_eq!(model.scaling().unwrap().radius(), 2.0);
    assert!(model.is_within_trust_radius(&Point::from([1.5, -2.0])));
    assert!(!model.is_within_trust_radius(&Point::from([2.5, 0.0])));
}

#[test]
fn malformed_samples_leave_model_not_ready() {
    let spec = objective_only();
    let mut points: Vec<EvalPoint> = SIX.iter().map(|x| sample(x, &[quadratic(x)], &spec)).collect();
    points[1] = EvalPoint::evaluated(Point::from([1.0, -1.0]), EvalType::Blackbox, Eval::failed());

    let mut model = QuadModel::new(2, spec.clone());
    model.set_samples(points);
    let err = model.construct(&Config::default()).unwrap_err();
    assert_eq!(err, Error::Samples(SampleError::EvalNotOk(1)));
    assert!(!err.is_numerical());
    assert!(!model.is_ready());

    model.set_samples(vec![sample(&[1.0, 1.0, 1.0], &[0.0], &spec)]);
    assert_eq!(
        model.construct(&Config::default()),
        Err(Error::Samples(SampleError::Dimension {
            index: 0,
            expected: 2,
            found: 3
        }))
    );

    model.set_samples(Vec::new());
    assert_eq!(
        model.construct(&Config::default()),
        Err(Error::Samples(SampleError::Empty))
    );
}

#[test]
fn degenerate_sample_sets() {
    let spec = objective_only();

    let mut model = model_on(&[[1.0, 1.0], [1.0, 1.0]], &spec);
    assert_eq!(model.construct(&Config::default()), Err(Error::AllFixed));

    let mut model = model_on(&[[0.0, 0.0], [1.0, 1.0]], &spec);
    assert_eq!(
        model.construct(&Config::default()),
        Err(Error::TooFewSamples { count: 2, min: 3 })
    );
}

#[test]
fn sample_caps() {
    let spec = objective_only();
    let roomy = Config::new(1e-13, 1500, 1000).unwrap();

    let mut model = QuadModel::new(1, spec.clone());
    model.set_samples(
        (0..501)
            .map(|k| {
                let x = f64::from(k);
                sample(&[x], &[x * x], &spec)
            })
            .collect(),
    );
    let err = model.construct(&roomy).unwrap_err();
    assert_eq!(err, Error::TooManySamples { count: 501, max: 500 });
    assert!(err.is_numerical());

    // The regression cap holds even when a well-poised subset could be fitted.
    let err = model
        .construct(&roomy.with_well_poised(true))
        .unwrap_err();
    assert_eq!(err, Error::TooManySamples { count: 501, max: 500 });
    assert!(!model.is_ready());

    // 21 free variables need 253 coefficients, so 252 samples select MFN.
    let n = 21;
    let mut model = QuadModel::new(n, spec.clone());
    model.set_samples(
        (0..252_u32)
            .map(|k| {
                let x: Vec<f64> = (0..n as u32)
                    .map(|i| f64::from((k * (i + 1) * 7919) % 97))
                    .collect();
                sample(&x, &[1.0], &spec)
            })
            .collect(),
    );
    assert_eq!(
        model.construct(&roomy),
        Err(Error::TooManySamples { count: 252, max: 250 })
    );

    let tight = Config::new(1e-13, 1500, 5).unwrap();
    let mut model = model_on(&SIX, &spec);
    assert_eq!(
        model.construct(&tight),
        Err(Error::SampleCount { count: 6, max: 5 })
    );
}

#[test]
fn svd_size_cap_is_numerical() {
    let spec = objective_only();
    let mut model = model_on(&SIX, &spec);
    let config = Config::new(1e-13, 8, 500).unwrap();

    let err = model.construct(&config).unwrap_err();
    assert!(matches!(err, Error::Svd(_)));
    assert!(err.is_numerical());
}

#[test]
fn changing_samples_invalidates_fit() {
    let spec = objective_only();
    let mut model = model_on(&SIX, &spec);
    model.construct(&Config::default()).unwrap();
    assert!(model.is_ready());

    model.set_samples(model.samples()[..5].to_vec());
    assert!(!model.is_ready());
    assert!(model.alpha(0).is_none());

    model.construct(&Config::default()).unwrap();
    model.define_scaling(2.0).unwrap();
    assert!(!model.is_ready());
}

fn cache_with(points: &[[f64; 2]]) -> Cache {
    let spec = objective_only();
    let mut cache = Cache::new();
    for x in points {
        cache.insert(sample(x, &[quadratic(x)], &spec));
    }
    cache
}

#[test]
fn training_set_keeps_closest_points() {
    let cache = cache_with(&[[1.0, 1.0], [3.0, 0.0], [0.5, 0.0], [0.0, -1.5]]);
    let center = Point::from([0.0, 0.0]);
    let config = Config::new(1e-13, 1500, 2).unwrap();

    let set = TrainingSet::select(&cache, &center, Some(&[1.0, 1.0]), &config).unwrap();
    assert_eq!(set.box_size(), &[4.0, 4.0]);
    let kept: Vec<&Point> = set.points().iter().map(EvalPoint::x).collect();
    assert_eq!(kept, vec![&Point::from([0.5, 0.0]), &Point::from([1.0, 1.0])]);
}

#[test]
fn training_set_doubles_box_once() {
    let cache = cache_with(&[[1.0, 1.0], [3.0, 0.0], [0.5, 0.0]]);
    let center = Point::from([0.0, 0.0]);

    let set = TrainingSet::select(&cache, &center, Some(&[0.25, 0.25]), &Config::default()).unwrap();
    assert_eq!(set.box_size(), &[2.0, 2.0]);
    assert_eq!(set.len(), 2);

    let far = Point::from([50.0, 50.0]);
    assert_eq!(
        TrainingSet::select(&cache, &far, Some(&[0.25, 0.25]), &Config::default()).unwrap_err(),
        Error::TooFewSamples { count: 0, min: 2 }
    );
}

#[test]
fn training_set_skips_failed_points() {
    let mut cache = cache_with(&[[0.5, 0.0], [0.0, 0.5]]);
    cache.insert(EvalPoint::evaluated(
        Point::from([0.1, 0.1]),
        EvalType::Blackbox,
        Eval::failed(),
    ));

    let set = TrainingSet::select(&cache, &Point::from([0.0, 0.0]), None, &Config::default()).unwrap();
    assert_eq!(set.len(), 2);
    assert!(set.box_size().iter().all(|d| d.is_infinite()));
}

#[test]
fn model_evaluator_predicts_and_caches() {
    let spec = objective_only();
    let mut model = model_on(&SIX, &spec);
    model.construct(&Config::default()).unwrap();

    let mut evaluator = ModelEvaluator::new(&model).with_budget(2);
    assert_eq!(evaluator.eval_type(), EvalType::Model);

    let x = [0.3, -0.2];
    let first = evaluator.evaluate(EvalPoint::new(Point::from(x))).unwrap();
    assert!(first.needed_eval);
    assert_relative_eq!(first.point.f(EvalType::Model).unwrap(), quadratic(&x), epsilon = 1e-9);
    assert_eq!(first.point.h(EvalType::Model), Some(0.0));

    let again = evaluator.evaluate(EvalPoint::new(Point::from(x))).unwrap();
    assert!(!again.needed_eval);
    assert_eq!(evaluator.evals(), 1);

    evaluator.evaluate(EvalPoint::new(Point::from([0.0, 0.1]))).unwrap();
    assert!(evaluator.stop_signal().is_requested());
    assert!(evaluator.evaluate(EvalPoint::new(Point::from([0.0, 0.2]))).is_none());
}

#[test]
fn rank_by_model_orders_by_prediction() {
    let spec = objective_only();
    let mut model = model_on(&SIX, &spec);
    model.construct(&Config::default()).unwrap();

    let candidates = vec![
        EvalPoint::new(Point::from([1.0, 0.0])),
        EvalPoint::new(Point::undefined(2)),
        EvalPoint::new(Point::from([-0.5, 1.0])),
        EvalPoint::new(Point::from([0.0, 0.0])),
    ];
    let ranked = rank_by_model(candidates, &model);

    // quadratic: (1, 0) -> 4.5, (-0.5, 1) -> -1.375, (0, 0) -> 1
    let order: Vec<&Point> = ranked.iter().map(EvalPoint::x).collect();
    assert_eq!(order[0], &Point::from([-0.5, 1.0]));
    assert_eq!(order[1], &Point::from([0.0, 0.0]));
    assert_eq!(order[2], &Point::from([1.0, 0.0]));
    assert!(!ranked[3].is_eval_ok(EvalType::Model));
}
