use std::{
    fmt,
    ops::{Add, Index, Mul, Sub},
};

#[cfg(feature = "serde-derive")]
use serde::{Deserialize, Serialize};

/// A point in the variable space whose components may be undefined.
///
/// An undefined component means "not computed" or "not applicable".
/// Arithmetic propagates undefined components instead of failing.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde-derive", derive(Serialize, Deserialize))]
pub struct Point {
    coords: Vec<Option<f64>>,
}

/// The difference between two points.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde-derive", derive(Serialize, Deserialize))]
pub struct Direction {
    coords: Vec<Option<f64>>,
}

impl Point {
    /// Creates a point from possibly undefined components.
    #[must_use]
    pub fn new(coords: Vec<Option<f64>>) -> Self {
        Self { coords }
    }

    /// Creates a point of dimension `n` with every component undefined.
    #[must_use]
    pub fn undefined(n: usize) -> Self {
        Self {
            coords: vec![None; n],
        }
    }

    /// Returns the number of components.
    #[must_use]
    pub fn dim(&self) -> usize {
        self.coords.len()
    }

    /// Returns component `i`, or `None` if it is undefined or out of range.
    #[must_use]
    pub fn get(&self, i: usize) -> Option<f64> {
        self.coords.get(i).copied().flatten()
    }

    /// Sets component `i`.
    ///
    /// # Panics
    ///
    /// Panics if `i` is out of range.
    pub fn set(&mut self, i: usize, value: Option<f64>) {
        self.coords[i] = value;
    }

    /// Returns the raw components.
    #[must_use]
    pub fn coords(&self) -> &[Option<f64>] {
        &self.coords
    }

    /// Returns true if every component is defined.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.coords.iter().all(Option::is_some)
    }

    /// Returns the components as plain values if every one is defined.
    #[must_use]
    pub fn values(&self) -> Option<Vec<f64>> {
        self.coords.iter().copied().collect()
    }

    /// Euclidean distance to `other`.
    ///
    /// Undefined if the dimensions differ or any component is undefined.
    #[must_use]
    pub fn distance(&self, other: &Point) -> Option<f64> {
        (self - other).norm()
    }

    /// Returns this point translated by `direction` scaled by `factor`.
    #[must_use]
    pub fn offset(&self, direction: &Direction, factor: f64) -> Point {
        self + &(direction * factor)
    }

    /// Bit-level key used for exact-equality lookups.
    ///
    /// Negative zero is folded into positive zero so that `-0.0 == 0.0` holds
    /// for keys as it does for `PartialEq`.
    pub(crate) fn key(&self) -> Vec<Option<u64>> {
        self.coords
            .iter()
            .map(|c| c.map(|v| (v + 0.0).to_bits()))
            .collect()
    }
}

impl Direction {
    /// Creates a direction from possibly undefined components.
    #[must_use]
    pub fn new(coords: Vec<Option<f64>>) -> Self {
        Self { coords }
    }

    /// Returns the number of components.
    #[must_use]
    pub fn dim(&self) -> usize {
        self.coords.len()
    }

    /// Returns component `i`, or `None` if it is undefined or out of range.
    #[must_use]
    pub fn get(&self, i: usize) -> Option<f64> {
        self.coords.get(i).copied().flatten()
    }

    /// Returns the raw components.
    #[must_use]
    pub fn coords(&self) -> &[Option<f64>] {
        &self.coords
    }

    /// Euclidean norm, undefined if any component is undefined.
    #[must_use]
    pub fn norm(&self) -> Option<f64> {
        self.dot(self).map(f64::sqrt)
    }

    /// Dot product, undefined on a dimension mismatch or undefined component.
    #[must_use]
    pub fn dot(&self, other: &Direction) -> Option<f64> {
        if self.dim() != other.dim() {
            return None;
        }
        self.coords
            .iter()
            .zip(&other.coords)
            .map(|(a, b)| Some((*a)? * (*b)?))
            .sum()
    }
}

fn zip_with(
    lhs: &[Option<f64>],
    rhs: &[Option<f64>],
    op: impl Fn(f64, f64) -> f64,
) -> Vec<Option<f64>> {
    if lhs.len() != rhs.len() {
        return vec![None; lhs.len().max(rhs.len())];
    }
    lhs.iter()
        .zip(rhs)
        .map(|(a, b)| Some(op((*a)?, (*b)?)))
        .collect()
}

impl Sub for &Point {
    type Output = Direction;

    fn sub(self, rhs: &Point) -> Direction {
        Direction::new(zip_with(&self.coords, &rhs.coords, |a, b| a - b))
    }
}

impl Add<&Direction> for &Point {
    type Output = Point;

    fn add(self, rhs: &Direction) -> Point {
        Point::new(zip_with(&self.coords, &rhs.coords, |a, b| a + b))
    }
}

impl Add for &Direction {
    type Output = Direction;

    fn add(self, rhs: &Direction) -> Direction {
        Direction::new(zip_with(&self.coords, &rhs.coords, |a, b| a + b))
    }
}

impl Mul<f64> for &Direction {
    type Output = Direction;

    fn mul(self, rhs: f64) -> Direction {
        Direction::new(self.coords.iter().map(|c| c.map(|v| v * rhs)).collect())
    }
}

impl Mul<f64> for &Point {
    type Output = Point;

    fn mul(self, rhs: f64) -> Point {
        Point::new(self.coords.iter().map(|c| c.map(|v| v * rhs)).collect())
    }
}

impl Index<usize> for Point {
    type Output = Option<f64>;

    fn index(&self, i: usize) -> &Option<f64> {
        &self.coords[i]
    }
}

impl From<Vec<f64>> for Point {
    fn from(values: Vec<f64>) -> Self {
        Self::new(values.into_iter().map(Some).collect())
    }
}

impl From<&[f64]> for Point {
    fn from(values: &[f64]) -> Self {
        Self::new(values.iter().copied().map(Some).collect())
    }
}

impl<const N: usize> From<[f64; N]> for Point {
    fn from(values: [f64; N]) -> Self {
        Self::new(values.into_iter().map(Some).collect())
    }
}

impl<const N: usize> From<[f64; N]> for Direction {
    fn from(values: [f64; N]) -> Self {
        Self::new(values.into_iter().map(Some).collect())
    }
}

fn write_coords(f: &mut fmt::Formatter<'_>, coords: &[Option<f64>]) -> fmt::Result {
    write!(f, "(")?;
    for (i, c) in coords.iter().enumerate() {
        if i > 0 {
            write!(f, " ")?;
        }
        match c {
            Some(v) => write!(f, "{v}")?,
            None => write!(f, "-")?,
        }
    }
    write!(f, ")")
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_coords(f, &self.coords)
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_coords(f, &self.coords)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    #[test]
    fn arithmetic_propagates_undefined() {
        let a = Point::new(vec![Some(1.0), None, Some(3.0)]);
        let b = Point::from([0.5, 2.0, 1.0]);

        let d = &a - &b;
        assert_eq!(d.coords(), &[Some(0.5), None, Some(2.0)]);

        let moved = b.offset(&d, 2.0);
        assert_eq!(moved.coords(), &[Some(1.5), None, Some(5.0)]);
        assert!(!moved.is_complete());
        assert!(moved.values().is_none());
    }

    #[test]
    fn distance_and_norm() {
        let a = Point::from([0.0, 0.0]);
        let b = Point::from([3.0, 4.0]);
        assert_relative_eq!(a.distance(&b).unwrap(), 5.0);

        let d = &b - &a;
        assert_relative_eq!(d.dot(&Direction::from([1.0, 1.0])).unwrap(), 7.0);
        assert!(Point::undefined(2).distance(&a).is_none());
    }

    #[test]
    fn mismatched_dimensions_are_undefined() {
        let a = Point::from([1.0, 2.0]);
        let b = Point::from([1.0]);
        assert!((&a - &b).norm().is_none());
    }

    #[test]
    fn negative_zero_shares_key_with_zero() {
        let a = Point::from([0.0, 1.0]);
        let b = Point::from([-0.0, 1.0]);
        assert_eq!(a, b);
        assert_eq!(a.key(), b.key());
    }

    #[test]
    fn display_marks_undefined() {
        let p = Point::new(vec![Some(1.5), None]);
        assert_eq!(p.to_string(), "(1.5 -)");
    }
}
