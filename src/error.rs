//! Error types for the categorization engine.
//!
//! Every fallible operation is checked before it touches the
//! [`CategoryStore`](crate::store::CategoryStore), so an `Err` always means
//! nothing was mutated.

use thiserror::Error;

/// Coarse classification of an [`RmcError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed input: bad stimulus, bad configuration, unknown category.
    Validation,
    /// The posterior normalizer was zero or non-finite.
    NumericDegeneracy,
    /// API misuse or a poisoned lock.
    State,
}

/// Errors raised by the categorization engine.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RmcError {
    /// Stimulus or cue length differs from the feature space dimensionality.
    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch {
        /// Dimensionality of the feature space.
        expected: usize,
        /// Length that was supplied.
        got: usize,
    },

    /// A dimension index past the end of the feature space.
    #[error("unknown dimension {dimension} (feature space has {dimensions})")]
    UnknownDimension {
        /// Requested dimension.
        dimension: usize,
        /// Dimensionality of the feature space.
        dimensions: usize,
    },

    /// A feature value lies outside its dimension's alphabet.
    #[error("value {value} out of range on dimension {dimension} (arity {arity})")]
    ValueOutOfRange {
        /// Offending dimension.
        dimension: usize,
        /// Offending value.
        value: usize,
        /// Alphabet size of that dimension.
        arity: usize,
    },

    /// Coupling probability outside the open interval (0, 1).
    #[error("invalid coupling probability {0}: must lie strictly between 0 and 1")]
    InvalidCoupling(f64),

    /// A dimension was declared with an empty alphabet.
    #[error("invalid arity {arity} on dimension {dimension}: must be at least 1")]
    InvalidArity {
        /// Offending dimension.
        dimension: usize,
        /// Declared alphabet size.
        arity: usize,
    },

    /// A feature space needs at least one dimension.
    #[error("feature space has no dimensions")]
    EmptyFeatureSpace,

    /// A category index that does not exist in the store.
    #[error("unknown category {index} ({count} categories exist)")]
    UnknownCategory {
        /// Requested index.
        index: usize,
        /// Number of categories currently in the store.
        count: usize,
    },

    /// `commit` was called without a preceding `begin`.
    #[error("no evaluation is pending")]
    NoPendingEvaluation,

    /// A restored partition is not a total, non-overlapping cover of its stimuli.
    #[error("corrupt partition: {0}")]
    CorruptPartition(String),

    /// Posterior normalization failed.
    #[error("numeric degeneracy: {0}")]
    NumericDegeneracy(String),

    /// A writer panicked while holding the shared model lock.
    #[error("shared model lock poisoned")]
    LockPoisoned,
}

impl RmcError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::DimensionMismatch { .. }
            | Self::UnknownDimension { .. }
            | Self::ValueOutOfRange { .. }
            | Self::InvalidCoupling(_)
            | Self::InvalidArity { .. }
            | Self::EmptyFeatureSpace
            | Self::UnknownCategory { .. }
            | Self::CorruptPartition(_) => ErrorKind::Validation,
            Self::NumericDegeneracy(_) => ErrorKind::NumericDegeneracy,
            Self::NoPendingEvaluation | Self::LockPoisoned => ErrorKind::State,
        }
    }

    /// True for malformed-input errors.
    pub fn is_validation(&self) -> bool {
        self.kind() == ErrorKind::Validation
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, RmcError>;
