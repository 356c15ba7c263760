//! Points - Non-negative integer quantity of reward points
//!
//! Balances and supply counters can never go below zero.
//! This is enforced at the type level by the unsigned representation.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur when working with point quantities
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PointsError {
    #[error("Quantity must be a positive integer, got {0}")]
    NotPositive(String),

    #[error("Invalid point quantity: {0}")]
    Invalid(String),

    #[error("Point quantity overflow")]
    Overflow,
}

/// A non-negative quantity of reward points.
///
/// # Example
/// ```
/// use loyalty_core::Points;
///
/// let points: Points = "100".parse().unwrap();
/// assert_eq!(points.value(), 100);
///
/// // Negative and fractional quantities are rejected
/// assert!("-5".parse::<Points>().is_err());
/// assert!("1.5".parse::<Points>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct Points(u64);

impl Points {
    /// Zero points constant
    pub const ZERO: Self = Self(0);

    /// Wrap a raw value (zero allowed)
    #[inline]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Create a quantity that must be strictly positive.
    ///
    /// Used for request, transfer and burn quantities.
    pub fn positive(value: u64) -> Result<Self, PointsError> {
        if value == 0 {
            Err(PointsError::NotPositive(value.to_string()))
        } else {
            Ok(Self(value))
        }
    }

    /// Parse a strictly positive quantity from caller input
    pub fn parse_positive(s: &str) -> Result<Self, PointsError> {
        let points: Points = s.parse()?;
        Self::positive(points.0)
    }

    /// Get the inner value
    #[inline]
    pub const fn value(&self) -> u64 {
        self.0
    }

    /// Check if the quantity is zero
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checked addition - returns None on overflow
    pub fn checked_add(&self, other: Points) -> Option<Points> {
        self.0.checked_add(other.0).map(Points)
    }

    /// Checked subtraction - returns None if the result would be negative
    pub fn checked_sub(&self, other: Points) -> Option<Points> {
        self.0.checked_sub(other.0).map(Points)
    }
}

impl fmt::Display for Points {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Points {
    type Err = PointsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.starts_with('-') {
            return Err(PointsError::NotPositive(trimmed.to_string()));
        }
        trimmed
            .parse::<u64>()
            .map(Points)
            .map_err(|_| PointsError::Invalid(s.to_string()))
    }
}

impl From<u64> for Points {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl From<Points> for u64 {
    fn from(points: Points) -> Self {
        points.0
    }
}
