//! Core types and collaborator contracts for mesh adaptive direct search.
//!
//! This crate defines the shared abstractions that solvers, observers, and
//! models build on:
//!
//! - [`Point`], [`Direction`] — vectors whose components may be undefined
//! - [`Eval`], [`EvalPoint`] — evaluation records and the dominance relation
//! - [`OutputSpec`] — how raw outputs reduce to an objective `f` and a
//!   constraint violation `h`
//! - [`Cache`], [`Barrier`], [`Mesh`], [`Domain`] — the state a direct search
//!   keeps around its trial points
//! - [`Evaluator`] — evaluates points and reports status
//! - [`Model`], [`BlackboxProblem`] — the expensive function and its adapter
//! - [`Observer`] — receives solver events and optionally returns control actions
//! - [`StopSignal`], [`SearchContext`] — state shared across the steps of a run

mod barrier;
mod cache;
mod context;
mod domain;
mod eval;
mod eval_point;
mod evaluator;
mod mesh;
mod model;
mod observer;
mod point;
mod problem;
mod stop;
mod success;

pub use barrier::Barrier;
pub use cache::Cache;
pub use context::{SearchContext, SuccessKind};
pub use domain::{Domain, DomainError, VariableType};
pub use eval::{Eval, EvalStatus, EvalType, HNorm, OutputSpec, OutputSpecError, OutputType};
pub use eval_point::EvalPoint;
pub use evaluator::{Evaluation, Evaluator};
pub use mesh::{FixedMesh, Mesh, MeshError};
pub use observer::Observer;
pub use point::{Direction, Point};
pub use problem::BlackboxProblem;
pub use stop::StopSignal;
pub use success::Success;
pub use {model::Model, model::Snapshot};
