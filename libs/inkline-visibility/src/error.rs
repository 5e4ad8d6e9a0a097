//! # Visibility Errors
//!
//! The engine's only fallible surface is configuration validation; geometry
//! "not found" conditions are ordinary empty results.

use thiserror::Error;

/// Errors raised before any visibility work starts.
#[derive(Debug, Error, PartialEq)]
pub enum VisibilityError {
    /// Density size factor must be positive and finite.
    #[error("invalid size factor: {value}")]
    InvalidSizeFactor {
        /// The rejected factor.
        value: f64,
    },

    /// The arbitrary density policy needs at least one target cell.
    #[error("invalid cell target: must be at least 1")]
    InvalidCellTarget,

    /// The ray/plane coincidence epsilon must be positive and finite.
    #[error("invalid coincidence epsilon: {value}")]
    InvalidEpsilon {
        /// The rejected epsilon.
        value: f64,
    },
}

impl VisibilityError {
    /// Creates an invalid size factor error.
    pub fn invalid_size_factor(value: f64) -> Self {
        Self::InvalidSizeFactor { value }
    }

    /// Creates an invalid epsilon error.
    pub fn invalid_epsilon(value: f64) -> Self {
        Self::InvalidEpsilon { value }
    }
}
