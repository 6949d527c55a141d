//! Run configuration: dimensionality, arity vector and coupling probability.
//!
//! The configuration is plain data. [`RmcConfig::validate`] turns it into the
//! checked [`FeatureSpace`] and [`Coupling`] that the engines take. Nothing is
//! read from globals.

use crate::error::{Result, RmcError};
use crate::space::FeatureSpace;

/// Default coupling probability.
pub const DEFAULT_COUPLING: f64 = 0.5;

// ─── Coupling ───────────────────────────────────────────────────────────────

/// Coupling probability `c`: the prior probability that two objects share a
/// category. Always strictly inside (0, 1).
///
/// `c → 1` concentrates prior mass on existing categories; `c → 0` favours
/// opening a new category for every stimulus.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "f64", into = "f64"))]
pub struct Coupling(f64);

impl Coupling {
    /// Validate and wrap a coupling probability.
    pub fn new(c: f64) -> Result<Self> {
        if c.is_finite() && c > 0.0 && c < 1.0 {
            Ok(Self(c))
        } else {
            Err(RmcError::InvalidCoupling(c))
        }
    }

    /// The raw probability.
    pub fn value(self) -> f64 {
        self.0
    }
}

impl Default for Coupling {
    fn default() -> Self {
        Self(DEFAULT_COUPLING)
    }
}

impl TryFrom<f64> for Coupling {
    type Error = RmcError;

    fn try_from(c: f64) -> Result<Self> {
        Self::new(c)
    }
}

impl From<Coupling> for f64 {
    fn from(c: Coupling) -> f64 {
        c.0
    }
}

// ─── RmcConfig ──────────────────────────────────────────────────────────────

/// Configuration of one categorization run.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RmcConfig {
    /// Fixed stimulus length `N`. Must equal `arities.len()`.
    pub dimensions: usize,
    /// Alphabet size `m[i]` of each dimension.
    pub arities: Vec<usize>,
    /// Coupling probability in (0, 1). Default 0.5.
    pub coupling: f64,
}

impl RmcConfig {
    /// Configuration for the given arities with the default coupling.
    pub fn new(arities: Vec<usize>) -> Self {
        Self {
            dimensions: arities.len(),
            arities,
            coupling: DEFAULT_COUPLING,
        }
    }

    /// Replace the coupling probability.
    pub fn with_coupling(mut self, coupling: f64) -> Self {
        self.coupling = coupling;
        self
    }

    /// Check every field and build the validated feature space and coupling.
    pub fn validate(&self) -> Result<(FeatureSpace, Coupling)> {
        if self.dimensions == 0 {
            return Err(RmcError::EmptyFeatureSpace);
        }
        if self.arities.len() != self.dimensions {
            return Err(RmcError::DimensionMismatch {
                expected: self.dimensions,
                got: self.arities.len(),
            });
        }
        let coupling = Coupling::new(self.coupling)?;
        let space = FeatureSpace::new(self.arities.clone())?;
        Ok((space, coupling))
    }
}
