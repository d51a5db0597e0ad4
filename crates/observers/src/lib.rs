//! Reusable observers for the mads solvers.
//!
//! This crate provides [`Observer`] implementations and capability traits that
//! work across the solvers in [`mads_solvers`].
//!
//! # Modules
//!
//! - [`traits`] — Capability traits for cross-solver observers
//!   ([`HasObjective`], [`HasViolation`], [`CanStopEarly`])
//! - [`history`] — [`History`], which records every event and can stop the
//!   solver at a target objective
//!
//! [`Observer`]: mads_core::Observer
//! [`HasObjective`]: traits::HasObjective
//! [`HasViolation`]: traits::HasViolation
//! [`CanStopEarly`]: traits::CanStopEarly

pub mod history;
pub mod traits;

pub use history::History;
