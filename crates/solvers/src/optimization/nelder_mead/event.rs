use mads_core::{EvalPoint, Success};

use super::{Simplex, StepType};

/// Events emitted by the Nelder-Mead solver.
pub enum Event<'a> {
    /// A trial point was evaluated (or served from the cache).
    Evaluated {
        /// The step that generated the point.
        step: StepType,

        /// The point with its evaluation.
        point: &'a EvalPoint,

        /// How the point compares to the barrier incumbents.
        success: Success,
    },

    /// The simplex was shrunk toward its best vertex.
    Shrunk {
        /// The simplex after the shrink.
        simplex: &'a Simplex,
    },
}

impl Event<'_> {
    /// Returns the evaluated point, if this event carries one.
    #[must_use]
    pub fn point(&self) -> Option<&EvalPoint> {
        match self {
            Self::Evaluated { point, .. } => Some(point),
            Self::Shrunk { .. } => None,
        }
    }

    /// Returns the step that produced this event.
    #[must_use]
    pub fn step(&self) -> StepType {
        match self {
            Self::Evaluated { step, .. } => *step,
            Self::Shrunk { .. } => StepType::Shrink,
        }
    }
}
