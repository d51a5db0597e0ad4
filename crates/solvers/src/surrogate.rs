//! Surrogate models of the blackbox outputs.
//!
//! A surrogate is fitted to points already in the [`Cache`](mads_core::Cache)
//! and evaluated in their place, so a search step can rank or screen trial
//! points without spending blackbox evaluations.
//!
//! # Models
//!
//! - [`quad_model`] — one quadratic polynomial per output, fitted by
//!   regression, minimum Frobenius norm interpolation, or a well-poised
//!   Lagrange basis depending on how many samples are available

pub mod quad_model;
