//! Derivative-free optimization of blackbox problems.
//!
//! A [`BlackboxProblem`] maps solver variables `x` to model inputs, and reads
//! the raw outputs (objective and constraints) back from the model. An
//! [`OutputSpec`] then reduces those outputs to an objective `f` and a
//! constraint violation `h`.
//!
//! [`BlackboxEvaluator`] connects a model and a problem to the solvers: it
//! implements [`Evaluator`], caches every result, enforces an evaluation
//! budget, and remembers the model snapshot of the best point.
//!
//! # Solvers
//!
//! - [`nelder_mead`] — the Nelder-Mead simplex method, either as a standalone
//!   optimizer or as a search step around a direct-search frame center
//!
//! [`BlackboxProblem`]: mads_core::BlackboxProblem
//! [`OutputSpec`]: mads_core::OutputSpec
//! [`Evaluator`]: mads_core::Evaluator

mod evaluate;

pub use evaluate::{BlackboxEvaluator, EvalError, EvaluateResult, Sample, evaluate};

pub mod nelder_mead;
