use std::fmt;

#[cfg(feature = "serde-derive")]
use serde::{Deserialize, Serialize};

/// Why a Nelder-Mead pass stopped.
///
/// Every reason ends the current pass only; none of them is an error for the
/// enclosing optimization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde-derive", derive(Serialize, Deserialize))]
pub enum StopReason {
    /// No simplex of `n + 1` affinely independent points could be built.
    InitialFailed,
    ReflectFailed,
    ExpansionFailed,
    OutsideContractionFailed,
    InsideContractionFailed,

    /// The shrunk simplex could not be evaluated or lost rank.
    ShrinkFailed,
    InsertionFailed,

    /// The state machine reached a step it cannot act on.
    UndefinedStep,

    /// All reflective trial points of one simplex were generated.
    SingleCompleted,

    /// A full success was found and the pass stops on success.
    StopOnSuccess,

    /// A shrink was needed but shrinking is not allowed in a search.
    NoShrink,

    /// The per-pass evaluation budget is spent.
    EvalBudget,

    /// The step ceiling of one iteration was reached.
    StepLimit,

    /// The shared stop signal was raised.
    Cancelled,

    /// An observer returned [`Action::StopEarly`](super::Action::StopEarly).
    StoppedByObserver,
}

impl StopReason {
    /// Returns true if the pass stopped because a step failed.
    #[must_use]
    pub fn is_step_failure(self) -> bool {
        matches!(
            self,
            Self::ReflectFailed
                | Self::ExpansionFailed
                | Self::OutsideContractionFailed
                | Self::InsideContractionFailed
                | Self::InsertionFailed
                | Self::UndefinedStep
        )
    }
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::InitialFailed => "initialization has failed",
            Self::ReflectFailed => "reflect step has failed",
            Self::ExpansionFailed => "expansion step has failed",
            Self::OutsideContractionFailed => "outside contraction step has failed",
            Self::InsideContractionFailed => "inside contraction step has failed",
            Self::ShrinkFailed => "shrink step has failed",
            Self::InsertionFailed => "insertion of points has failed",
            Self::UndefinedStep => "unknown step",
            Self::SingleCompleted => "single pass on all reflective steps completed",
            Self::StopOnSuccess => "stopped on evaluation success",
            Self::NoShrink => "stopped without shrink",
            Self::EvalBudget => "evaluation budget spent",
            Self::StepLimit => "step limit reached",
            Self::Cancelled => "stop requested",
            Self::StoppedByObserver => "stopped by observer",
        };
        f.write_str(text)
    }
}
