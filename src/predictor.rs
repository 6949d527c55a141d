//! Predicting a feature value for a novel item by marginalizing over categories.
//!
//! ```text
//! P(j on i | F) = Σ_k P(k | F) · P(j | i, k)
//! ```
//!
//! summed over existing categories. The remaining posterior mass sits on the
//! new-category option, under which every value of dimension `i` has
//! probability `1 / m[i]`; [`Prediction::with_novel`] adds that term back so the
//! per-value probabilities sum to one.
//!
//! A [`Predictor`] only borrows its store, so the borrow checker keeps it from
//! overlapping an [`Assigner`](crate::assigner::Assigner) commit on the same
//! store. Many predictors may share one store.

use crate::config::Coupling;
use crate::error::Result;
use crate::posterior::PosteriorEngine;
use crate::space::Cue;
use crate::store::{CategoryStore, Choice};

// ─── Prediction ─────────────────────────────────────────────────────────────

/// Predicted distribution over the values of one dimension.
#[derive(Clone, Debug, PartialEq)]
pub struct Prediction {
    /// The predicted dimension.
    pub dimension: usize,
    /// `existing[j]`: mass on value `j` contributed by existing categories.
    pub existing: Vec<f64>,
    /// Posterior mass of the new-category option.
    pub novel_mass: f64,
}

impl Prediction {
    /// Existing-category probability of `value` (0.0 outside the alphabet).
    pub fn probability(&self, value: usize) -> f64 {
        self.existing.get(value).copied().unwrap_or(0.0)
    }

    /// Probability of `value` including the new-category term `novel_mass / m[i]`.
    pub fn with_novel(&self, value: usize) -> f64 {
        if value >= self.existing.len() {
            return 0.0;
        }
        self.existing[value] + self.novel_mass / self.existing.len() as f64
    }

    /// Value with the highest probability; lowest value on ties.
    pub fn most_likely(&self) -> usize {
        let mut best = 0;
        for (j, &p) in self.existing.iter().enumerate().skip(1) {
            if p > self.existing[best] {
                best = j;
            }
        }
        best
    }
}

// ─── Predictor ──────────────────────────────────────────────────────────────

/// Read-only predictor over a trained store.
#[derive(Clone, Copy, Debug)]
pub struct Predictor<'a> {
    store: &'a CategoryStore,
    engine: PosteriorEngine<'a>,
}

impl<'a> Predictor<'a> {
    /// Predict from `store` using coupling `coupling`, which may differ from
    /// the coupling used during training.
    pub fn new(store: &'a CategoryStore, coupling: Coupling) -> Self {
        Self {
            store,
            engine: PosteriorEngine::new(store, coupling),
        }
    }

    /// Probability that `cue` shows `value` on `dimension`.
    ///
    /// The cue's own entry on `dimension`, if known, takes part in the
    /// category posterior; hide it with [`Cue::hide`] to treat the dimension as
    /// held out.
    pub fn predict_value(&self, dimension: usize, value: usize, cue: &Cue) -> Result<f64> {
        self.store.space().check_value(dimension, value)?;
        let posterior = self.engine.joint_posterior_cue(cue)?;
        Ok(self.marginal(&posterior.normalized(), dimension, value))
    }

    /// Full predicted distribution over the values of `dimension`.
    pub fn predict(&self, dimension: usize, cue: &Cue) -> Result<Prediction> {
        let arity = self.store.space().arity(dimension)?;
        let posterior = self.engine.joint_posterior_cue(cue)?;
        let weights = posterior.normalized();
        let existing = (0..arity)
            .map(|j| self.marginal(&weights, dimension, j))
            .collect();
        Ok(Prediction {
            dimension,
            existing,
            novel_mass: posterior.posterior_of(Choice::New)?,
        })
    }

    /// `weights` are the normalized posteriors, new-category last.
    fn marginal(&self, weights: &[f64], dimension: usize, value: usize) -> f64 {
        let likelihood = self.engine.likelihood();
        (0..self.store.category_count())
            .map(|k| weights[k] * likelihood.feature_likelihood_unchecked(dimension, value, k))
            .sum()
    }
}
