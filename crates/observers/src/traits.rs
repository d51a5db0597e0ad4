//! Capability traits for cross-solver observers.
//!
//! These traits abstract over solver-specific event and action types, enabling
//! observers to work generically across different solvers.
//!
//! # Event traits
//!
//! - [`HasObjective`] — events that carry an objective value
//! - [`HasViolation`] — events that carry a constraint violation
//!
//! # Action traits
//!
//! - [`CanStopEarly`] — actions that can signal early termination
//!
//! # Example
//!
//! ```rust
//! use mads_core::Observer;
//! use mads_observers::traits::{CanStopEarly, HasObjective};
//!
//! struct GoodEnough {
//!     target: f64,
//! }
//!
//! impl<E: HasObjective, A: CanStopEarly> Observer<E, A> for GoodEnough {
//!     fn observe(&mut self, event: &E) -> Option<A> {
//!         (event.objective() <= self.target).then(A::stop_early)
//!     }
//! }
//! ```

use mads_core::EvalType;
use mads_solvers::optimization::nelder_mead;

/// An event that carries an objective value.
pub trait HasObjective {
    /// Returns the objective for this event.
    ///
    /// Returns `f64::NAN` when the event carries no evaluated point or the
    /// objective is undefined.
    fn objective(&self) -> f64;
}

/// An event that carries a constraint violation `h`.
pub trait HasViolation {
    /// Returns the constraint violation for this event.
    ///
    /// Returns `f64::NAN` when the event carries no evaluated point or the
    /// violation is undefined.
    fn violation(&self) -> f64;
}

/// An action type that can signal early termination.
pub trait CanStopEarly {
    /// Returns the action that stops the solver early.
    fn stop_early() -> Self;
}

// --- nelder_mead::Event ---

/// Reads a value from the blackbox evaluation, falling back to the model one.
fn first_defined(read: impl Fn(EvalType) -> Option<f64>) -> f64 {
    read(EvalType::Blackbox)
        .or_else(|| read(EvalType::Model))
        .unwrap_or(f64::NAN)
}

impl HasObjective for nelder_mead::Event<'_> {
    fn objective(&self) -> f64 {
        first_defined(|et| self.point().and_then(|p| p.f(et)))
    }
}

impl HasViolation for nelder_mead::Event<'_> {
    fn violation(&self) -> f64 {
        first_defined(|et| self.point().and_then(|p| p.h(et)))
    }
}

// --- CanStopEarly impls ---

impl CanStopEarly for nelder_mead::Action {
    fn stop_early() -> Self {
        Self::StopEarly
    }
}
