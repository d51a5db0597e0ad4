use std::fmt;

#[cfg(feature = "serde-derive")]
use serde::{Deserialize, Serialize};

use super::{Config, StopReason};

/// Phase of a Nelder-Mead iteration.
///
/// The four reflective steps generate one trial point each. `Continue` and
/// `Shrink` end an iteration, and `InsertInY` marks an insertion in progress
/// so that a failure there is reported as such.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde-derive", derive(Serialize, Deserialize))]
pub enum StepType {
    #[default]
    Unset,
    Reflect,
    Expand,
    OutsideContraction,
    InsideContraction,
    InsertInY,

    /// The iteration is complete and the simplex was updated.
    Continue,

    /// The simplex must be shrunk toward its best point.
    Shrink,
}

impl StepType {
    /// The four steps that generate a trial point, in generation order.
    pub const REFLECTIVE: [StepType; 4] = [
        StepType::Reflect,
        StepType::Expand,
        StepType::OutsideContraction,
        StepType::InsideContraction,
    ];

    /// Returns true for the steps that generate a trial point.
    #[must_use]
    pub fn is_reflective(self) -> bool {
        Self::REFLECTIVE.contains(&self)
    }

    /// The factor `δ` placing the trial point at `yc + δ (yc - yn)`.
    #[must_use]
    pub fn delta(self, config: &Config) -> Option<f64> {
        match self {
            Self::Reflect => Some(super::config::DELTA_R),
            Self::Expand => Some(config.delta_e()),
            Self::OutsideContraction => Some(config.delta_oc()),
            Self::InsideContraction => Some(config.delta_ic()),
            _ => None,
        }
    }

    /// The stop reason recorded when this step cannot proceed.
    #[must_use]
    pub fn failure(self) -> StopReason {
        match self {
            Self::Reflect => StopReason::ReflectFailed,
            Self::Expand => StopReason::ExpansionFailed,
            Self::OutsideContraction => StopReason::OutsideContractionFailed,
            Self::InsideContraction => StopReason::InsideContractionFailed,
            Self::Shrink => StopReason::ShrinkFailed,
            Self::InsertInY => StopReason::InsertionFailed,
            Self::Unset | Self::Continue => StopReason::UndefinedStep,
        }
    }
}

impl fmt::Display for StepType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Unset => "unset",
            Self::Reflect => "reflect",
            Self::Expand => "expand",
            Self::OutsideContraction => "outside contraction",
            Self::InsideContraction => "inside contraction",
            Self::InsertInY => "insert in Y",
            Self::Continue => "continue",
            Self::Shrink => "shrink",
        };
        f.write_str(name)
    }
}
