use thiserror::Error;

use crate::linalg::SvdError;

/// Why a sample set cannot be used to fit a model.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SampleError {
    #[error("no samples")]
    Empty,

    #[error("sample {0} has undefined coordinates")]
    Incomplete(usize),

    #[error("sample {0} has no successful blackbox evaluation")]
    EvalNotOk(usize),

    #[error("sample {0} has undefined outputs")]
    MissingOutputs(usize),

    #[error("sample {index} has {found} outputs, expected {expected}")]
    OutputCount {
        index: usize,
        expected: usize,
        found: usize,
    },

    #[error("sample {index} has dimension {found}, expected {expected}")]
    Dimension {
        index: usize,
        expected: usize,
        found: usize,
    },

    #[error("sample {0} has an output too large to model")]
    OutputTooLarge(usize),
}

/// Errors that can occur while building a quadratic model.
///
/// Most variants describe a sample set the model cannot use; callers typically
/// skip the model for this iteration. [`Error::is_numerical`] identifies the
/// failures of the numerical method itself.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    #[error("invalid samples: {0}")]
    Samples(#[from] SampleError),

    #[error("fixed-variable mask has length {found}, expected {expected}")]
    FixedMask { expected: usize, found: usize },

    #[error("every variable is fixed")]
    AllFixed,

    #[error("{count} samples is not enough, need at least {min}")]
    TooFewSamples { count: usize, min: usize },

    #[error("{count} samples exceeds the configured maximum of {max}")]
    SampleCount { count: usize, max: usize },

    #[error("{count} samples exceeds the limit of {max} for this fit")]
    TooManySamples { count: usize, max: usize },

    #[error(transparent)]
    Svd(#[from] SvdError),
}

impl Error {
    /// Returns true for failures of the numerical method rather than of the data.
    #[must_use]
    pub fn is_numerical(&self) -> bool {
        matches!(self, Self::Svd(_) | Self::TooManySamples { .. })
    }
}
