use thiserror::Error;

#[cfg(feature = "serde-derive")]
use serde::{Deserialize, Serialize};

use crate::Point;

/// Kind of a decision variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde-derive", derive(Serialize, Deserialize))]
pub enum VariableType {
    #[default]
    Continuous,

    /// Restricted to integer values.
    Integer,

    /// An integer-coded category with no meaningful order.
    Categorical,
}

/// Variable bounds and types.
///
/// Categorical variables, when present, occupy the leading slots of a point.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde-derive", derive(Serialize, Deserialize))]
pub struct Domain {
    lower: Vec<Option<f64>>,
    upper: Vec<Option<f64>>,
    types: Vec<VariableType>,
}

/// Errors that can occur when building a [`Domain`].
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum DomainError {
    #[error("bounds and types have different dimensions")]
    Dimension,

    #[error("lower bound exceeds upper bound for variable {0}")]
    Inverted(usize),

    #[error("categorical variables must precede all others")]
    CategoricalOrder,
}

impl Domain {
    /// An unbounded continuous domain of dimension `n`.
    #[must_use]
    pub fn continuous(n: usize) -> Self {
        Self {
            lower: vec![None; n],
            upper: vec![None; n],
            types: vec![VariableType::Continuous; n],
        }
    }

    /// Creates a domain from bounds and variable types.
    ///
    /// # Errors
    ///
    /// Returns an error if the dimensions differ, a lower bound exceeds its
    /// upper bound, or a categorical variable follows a non-categorical one.
    pub fn new(
        lower: Vec<Option<f64>>,
        upper: Vec<Option<f64>>,
        types: Vec<VariableType>,
    ) -> Result<Self, DomainError> {
        if lower.len() != upper.len() || lower.len() != types.len() {
            return Err(DomainError::Dimension);
        }
        for (i, (lb, ub)) in lower.iter().zip(&upper).enumerate() {
            if let (Some(lb), Some(ub)) = (lb, ub)
                && lb > ub
            {
                return Err(DomainError::Inverted(i));
            }
        }
        let leading = types
            .iter()
            .take_while(|t| **t == VariableType::Categorical)
            .count();
        if types[leading..].contains(&VariableType::Categorical) {
            return Err(DomainError::CategoricalOrder);
        }
        Ok(Self {
            lower,
            upper,
            types,
        })
    }

    /// A continuous domain with the given bounds.
    ///
    /// # Errors
    ///
    /// Returns an error if the dimensions differ or a bound pair is inverted.
    pub fn bounded(lower: Vec<f64>, upper: Vec<f64>) -> Result<Self, DomainError> {
        let n = lower.len();
        Self::new(
            lower.into_iter().map(Some).collect(),
            upper.into_iter().map(Some).collect(),
            vec![VariableType::Continuous; n],
        )
    }

    #[must_use]
    pub fn dim(&self) -> usize {
        self.types.len()
    }

    #[must_use]
    pub fn types(&self) -> &[VariableType] {
        &self.types
    }

    #[must_use]
    pub fn lower(&self) -> &[Option<f64>] {
        &self.lower
    }

    #[must_use]
    pub fn upper(&self) -> &[Option<f64>] {
        &self.upper
    }

    /// Number of leading categorical variables.
    #[must_use]
    pub fn categorical_count(&self) -> usize {
        self.types
            .iter()
            .take_while(|t| **t == VariableType::Categorical)
            .count()
    }

    /// Clamps `x` to the bounds and rounds integer and categorical components.
    #[must_use]
    pub fn snap(&self, x: &Point) -> Point {
        let coords = x
            .coords()
            .iter()
            .enumerate()
            .map(|(i, c)| {
                let mut v = (*c)?;
                if self.types.get(i).is_some_and(|t| *t != VariableType::Continuous) {
                    v = v.round();
                }
                if let Some(Some(lb)) = self.lower.get(i) {
                    v = v.max(*lb);
                }
                if let Some(Some(ub)) = self.upper.get(i) {
                    v = v.min(*ub);
                }
                Some(v)
            })
            .collect();
        Point::new(coords)
    }

    /// Returns true if every defined component of `x` is within bounds.
    #[must_use]
    pub fn contains(&self, x: &Point) -> bool {
        x.coords().iter().enumerate().all(|(i, c)| {
            let Some(v) = *c else { return true };
            let above = self.lower.get(i).copied().flatten().is_none_or(|lb| v >= lb);
            let below = self.upper.get(i).copied().flatten().is_none_or(|ub| v <= ub);
            above && below
        })
    }
}
