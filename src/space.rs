//! Discrete feature space: dimensionality, per-dimension alphabets, stimuli and cues.
//!
//! A [`FeatureSpace`] fixes the number of dimensions `N` and the alphabet size
//! `m[i]` of every dimension. Values on dimension `i` are the integers
//! `0..m[i]`. A [`Stimulus`] is a fully observed point in that space; a [`Cue`]
//! is a point where some dimensions are unknown (used to predict held-out
//! features).
//!
//! ```rust
//! use rmc_core::space::{Cue, FeatureSpace, Stimulus};
//!
//! let space = FeatureSpace::new(vec![2, 2, 3]).unwrap();
//! let s = Stimulus::from([1, 0, 2]);
//! assert!(space.check_stimulus(&s).is_ok());
//!
//! let cue = Cue::from(&s).hide(2);
//! assert_eq!(cue.get(2), None);
//! ```

use crate::error::{Result, RmcError};

// ─── FeatureSpace ───────────────────────────────────────────────────────────

/// Dimensionality and per-dimension alphabet sizes, fixed for a store's lifetime.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FeatureSpace {
    arities: Vec<usize>,
}

impl FeatureSpace {
    /// Build a feature space from its arity vector `m`.
    ///
    /// Fails if `arities` is empty or any arity is zero.
    pub fn new(arities: Vec<usize>) -> Result<Self> {
        if arities.is_empty() {
            return Err(RmcError::EmptyFeatureSpace);
        }
        if let Some((dimension, &arity)) = arities.iter().enumerate().find(|(_, &a)| a == 0) {
            return Err(RmcError::InvalidArity { dimension, arity });
        }
        Ok(Self { arities })
    }

    /// Number of dimensions `N`.
    pub fn dimensions(&self) -> usize {
        self.arities.len()
    }

    /// Alphabet size of every dimension.
    pub fn arities(&self) -> &[usize] {
        &self.arities
    }

    /// Alphabet size of `dimension`.
    pub fn arity(&self, dimension: usize) -> Result<usize> {
        self.arities
            .get(dimension)
            .copied()
            .ok_or(RmcError::UnknownDimension {
                dimension,
                dimensions: self.arities.len(),
            })
    }

    /// Probability of any single stimulus under a category with no members:
    /// the product of `1 / m[i]` over the given dimensions.
    pub(crate) fn uniform_likelihood<I>(&self, dimensions: I) -> f64
    where
        I: IntoIterator<Item = usize>,
    {
        dimensions
            .into_iter()
            .map(|i| 1.0 / self.arities[i] as f64)
            .product()
    }

    /// Check that `value` is a legal value on `dimension`.
    pub fn check_value(&self, dimension: usize, value: usize) -> Result<()> {
        let arity = self.arity(dimension)?;
        if value >= arity {
            return Err(RmcError::ValueOutOfRange { dimension, value, arity });
        }
        Ok(())
    }

    /// Check length and value ranges of a stimulus.
    pub fn check_stimulus(&self, stimulus: &Stimulus) -> Result<()> {
        self.check_len(stimulus.len())?;
        stimulus
            .values()
            .iter()
            .enumerate()
            .try_for_each(|(i, &v)| self.check_value(i, v))
    }

    /// Check length and the ranges of the known values of a cue.
    pub fn check_cue(&self, cue: &Cue) -> Result<()> {
        self.check_len(cue.len())?;
        cue.known().try_for_each(|(i, v)| self.check_value(i, v))
    }

    fn check_len(&self, got: usize) -> Result<()> {
        if got != self.dimensions() {
            return Err(RmcError::DimensionMismatch {
                expected: self.dimensions(),
                got,
            });
        }
        Ok(())
    }
}

// ─── Stimulus ───────────────────────────────────────────────────────────────

/// A fully observed item: one discrete value per dimension.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Stimulus(Vec<usize>);

impl Stimulus {
    /// Wrap a feature vector.
    pub fn new(values: Vec<usize>) -> Self {
        Self(values)
    }

    /// Feature values in dimension order.
    pub fn values(&self) -> &[usize] {
        &self.0
    }

    /// Value on `dimension`, if the dimension exists.
    pub fn get(&self, dimension: usize) -> Option<usize> {
        self.0.get(dimension).copied()
    }

    /// Number of dimensions.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True for a zero-length stimulus (never valid in a feature space).
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<usize>> for Stimulus {
    fn from(values: Vec<usize>) -> Self {
        Self(values)
    }
}

impl From<&[usize]> for Stimulus {
    fn from(values: &[usize]) -> Self {
        Self(values.to_vec())
    }
}

impl<const N: usize> From<[usize; N]> for Stimulus {
    fn from(values: [usize; N]) -> Self {
        Self(values.to_vec())
    }
}

// ─── Cue ────────────────────────────────────────────────────────────────────

/// A partially observed item. `None` marks a dimension whose value is unknown.
///
/// Unknown dimensions are marginalized out of every likelihood product:
/// each per-dimension likelihood sums to one over its alphabet, so dropping
/// the factor is exact.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Cue(Vec<Option<usize>>);

impl Cue {
    /// Wrap a partially known feature vector.
    pub fn new(values: Vec<Option<usize>>) -> Self {
        Self(values)
    }

    /// Return this cue with `dimension` marked unknown. Out-of-range
    /// dimensions are left alone.
    pub fn hide(mut self, dimension: usize) -> Self {
        if let Some(slot) = self.0.get_mut(dimension) {
            *slot = None;
        }
        self
    }

    /// Value on `dimension`, `None` if unknown or out of range.
    pub fn get(&self, dimension: usize) -> Option<usize> {
        self.0.get(dimension).copied().flatten()
    }

    /// Iterate `(dimension, value)` over the known dimensions.
    pub fn known(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.0
            .iter()
            .enumerate()
            .filter_map(|(i, v)| v.map(|v| (i, v)))
    }

    /// Number of dimensions, known or not.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True for a zero-length cue.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&Stimulus> for Cue {
    fn from(stimulus: &Stimulus) -> Self {
        Self(stimulus.values().iter().copied().map(Some).collect())
    }
}

impl From<Vec<Option<usize>>> for Cue {
    fn from(values: Vec<Option<usize>>) -> Self {
        Self(values)
    }
}
