//! Search steps and surrogate models for mesh adaptive direct search.
//!
//! - [`optimization`] — trial-point generators driven by a blackbox evaluator,
//!   currently a reflective Nelder–Mead search
//! - [`surrogate`] — quadratic models fitted to cached evaluations
//! - [`linalg`] — the SVD-based dense linear algebra both rely on

pub mod linalg;
pub mod optimization;
pub mod surrogate;
