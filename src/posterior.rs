//! Joint posterior over {existing categories} ∪ {new category}.
//!
//! For a cue `F` the unnormalized score of existing category `k` is
//! `P(k) · P(F | k)`; the trailing entry is `P(new) · Π 1/m[i]`. The vector is
//! always ordered `[cat_0, …, cat_{K-1}, new]`, and [`JointPosterior::best`]
//! returns the first maximal entry, so ties go to the lowest existing index
//! and "new" only wins strictly.
//!
//! # Underflow
//!
//! Scores are products of up to `N + 1` probabilities and underflow for large
//! `N`. They are first computed in linear space in a fixed order (prior, then
//! dimensions 0..N) so exact ties are reproduced. If any score is not a normal
//! `f64`, the whole vector is recomputed from log terms and stored as
//! `exp(ln score - max ln score)` together with that offset. Argmax and
//! normalized posteriors are unaffected by the shift.

use crate::config::Coupling;
use crate::error::{Result, RmcError};
use crate::likelihood::LikelihoodEngine;
use crate::prior::PriorEngine;
use crate::space::{Cue, Stimulus};
use crate::store::{CategoryId, CategoryStore, Choice};

// ─── JointPosterior ─────────────────────────────────────────────────────────

/// Unnormalized joint scores for one query against one store state.
#[derive(Clone, Debug, PartialEq)]
pub struct JointPosterior {
    /// Scores scaled by `exp(-ln_scale)`; last entry is the new-category option.
    scores: Vec<f64>,
    /// Natural-log offset of `scores` (0.0 in linear mode).
    ln_scale: f64,
    log_scaled: bool,
    /// Sum of `scores`, finite and positive.
    total: f64,
}

impl JointPosterior {
    fn from_scores(scores: Vec<f64>, ln_scale: Option<f64>) -> Result<Self> {
        let total: f64 = scores.iter().sum();
        if !total.is_finite() || total <= 0.0 {
            return Err(RmcError::NumericDegeneracy(format!(
                "posterior normalizer is {total} over {} options",
                scores.len()
            )));
        }
        Ok(Self {
            scores,
            ln_scale: ln_scale.unwrap_or(0.0),
            log_scaled: ln_scale.is_some(),
            total,
        })
    }

    /// Number of existing categories scored.
    pub fn category_count(&self) -> usize {
        self.scores.len() - 1
    }

    /// Number of options, `K + 1`.
    pub fn len(&self) -> usize {
        self.scores.len()
    }

    /// Always false: the new-category option is always present.
    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    /// True when the scores were produced from log terms.
    pub fn is_log_scaled(&self) -> bool {
        self.log_scaled
    }

    /// Unnormalized joint probabilities `[cat_0, …, cat_{K-1}, new]`.
    ///
    /// In log-scaled mode the values may underflow to zero; use
    /// [`JointPosterior::ln_unnormalized`] for exact magnitudes.
    pub fn unnormalized(&self) -> Vec<f64> {
        if !self.log_scaled {
            self.scores.clone()
        } else {
            let scale = self.ln_scale.exp();
            self.scores.iter().map(|s| s * scale).collect()
        }
    }

    /// Natural log of each unnormalized joint probability.
    pub fn ln_unnormalized(&self) -> Vec<f64> {
        self.scores.iter().map(|s| s.ln() + self.ln_scale).collect()
    }

    /// Normalized posterior `P(choice | F)`.
    pub fn posterior_of(&self, choice: Choice) -> Result<f64> {
        let idx = self.slot(choice)?;
        Ok(self.scores[idx] / self.total)
    }

    /// All normalized posteriors, new-category last. Sums to one.
    pub fn normalized(&self) -> Vec<f64> {
        self.scores.iter().map(|s| s / self.total).collect()
    }

    /// The maximizing option, first occurrence winning ties.
    pub fn best(&self) -> Choice {
        let mut best = 0;
        for (idx, &score) in self.scores.iter().enumerate().skip(1) {
            if score > self.scores[best] {
                best = idx;
            }
        }
        self.choice_at(best)
    }

    /// Scaled score of the winning option (linear-mode value when not log-scaled).
    pub(crate) fn best_score(&self) -> f64 {
        self.scores.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    }

    fn choice_at(&self, idx: usize) -> Choice {
        if idx == self.category_count() {
            Choice::New
        } else {
            Choice::Existing(CategoryId::new(idx))
        }
    }

    fn slot(&self, choice: Choice) -> Result<usize> {
        match choice {
            Choice::New => Ok(self.category_count()),
            Choice::Existing(id) if id.index() < self.category_count() => Ok(id.index()),
            Choice::Existing(id) => Err(RmcError::UnknownCategory {
                index: id.index(),
                count: self.category_count(),
            }),
        }
    }
}

// ─── PosteriorEngine ────────────────────────────────────────────────────────

/// Combines [`PriorEngine`] and [`LikelihoodEngine`] over one store snapshot.
#[derive(Clone, Copy, Debug)]
pub struct PosteriorEngine<'a> {
    store: &'a CategoryStore,
    prior: PriorEngine<'a>,
    likelihood: LikelihoodEngine<'a>,
}

impl<'a> PosteriorEngine<'a> {
    /// Posterior view over `store` at coupling `coupling`.
    pub fn new(store: &'a CategoryStore, coupling: Coupling) -> Self {
        Self {
            store,
            prior: PriorEngine::new(store, coupling),
            likelihood: LikelihoodEngine::new(store),
        }
    }

    /// The prior half of the engine.
    pub fn prior(&self) -> &PriorEngine<'a> {
        &self.prior
    }

    /// The likelihood half of the engine.
    pub fn likelihood(&self) -> &LikelihoodEngine<'a> {
        &self.likelihood
    }

    /// Joint posterior of a fully observed stimulus.
    pub fn joint_posterior(&self, stimulus: &Stimulus) -> Result<JointPosterior> {
        self.store.space().check_stimulus(stimulus)?;
        self.score(&Cue::from(stimulus))
    }

    /// Joint posterior of a cue; unknown dimensions are marginalized.
    pub fn joint_posterior_cue(&self, cue: &Cue) -> Result<JointPosterior> {
        self.store.space().check_cue(cue)?;
        self.score(cue)
    }

    /// Normalized `P(choice | stimulus)`.
    pub fn posterior_of(&self, stimulus: &Stimulus, choice: Choice) -> Result<f64> {
        self.joint_posterior(stimulus)?.posterior_of(choice)
    }

    fn score(&self, cue: &Cue) -> Result<JointPosterior> {
        let k_count = self.store.category_count();
        let mut scores = Vec::with_capacity(k_count + 1);
        for (k, category) in self.store.categories().iter().enumerate() {
            let prior = self.prior.prior_for_occupancy(category.occupancy());
            scores.push(prior * self.likelihood.joint_unchecked(cue, k));
        }
        scores.push(self.prior.prior_new() * self.likelihood.novel_unchecked(cue));

        if scores.iter().all(|s| s.is_normal()) {
            return JointPosterior::from_scores(scores, None);
        }

        tracing::warn!(
            options = scores.len(),
            "linear posterior underflowed, rescoring in log space"
        );
        self.score_ln(cue)
    }

    fn score_ln(&self, cue: &Cue) -> Result<JointPosterior> {
        let mut ln_scores: Vec<f64> = self
            .store
            .categories()
            .iter()
            .enumerate()
            .map(|(k, category)| {
                self.prior.prior_for_occupancy(category.occupancy()).ln()
                    + self.likelihood.ln_joint_unchecked(cue, k)
            })
            .collect();
        ln_scores.push(self.prior.prior_new().ln() + self.likelihood.ln_novel_unchecked(cue));

        let max = ln_scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        if !max.is_finite() {
            return Err(RmcError::NumericDegeneracy(format!(
                "largest log score is {max}"
            )));
        }
        let scores = ln_scores.iter().map(|l| (l - max).exp()).collect();
        JointPosterior::from_scores(scores, Some(max))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::space::FeatureSpace;

    fn binary(n: usize) -> CategoryStore {
        CategoryStore::new(FeatureSpace::new(vec![2; n]).unwrap())
    }

    #[test]
    fn test_empty_store_only_new_option() {
        let s = binary(3);
        let engine = PosteriorEngine::new(&s, Coupling::new(0.3).unwrap());
        let jp = engine.joint_posterior(&Stimulus::from([1, 0, 1])).unwrap();
        assert_eq!(jp.len(), 1);
        assert_eq!(jp.best(), Choice::New);
        assert!((jp.posterior_of(Choice::New).unwrap() - 1.0).abs() < 1e-12);
        // P(new) = 1, likelihood = 1/8
        assert!((jp.unnormalized()[0] - 0.125).abs() < 1e-15);
    }

    #[test]
    fn test_scores_match_prior_times_likelihood() {
        let mut s = binary(2);
        let k = s.commit(Stimulus::from([1, 1]), Choice::New).unwrap();
        s.commit(Stimulus::from([1, 0]), Choice::Existing(k)).unwrap();
        let engine = PosteriorEngine::new(&s, Coupling::new(0.5).unwrap());
        let jp = engine.joint_posterior(&Stimulus::from([1, 1])).unwrap();
        // denominator 0.5 + 0.5*2 = 1.5
        // existing: (0.5*2/1.5) * (3/4) * (2/4) = 0.25
        // new:      (0.5/1.5) * 1/4 = 1/12
        let raw = jp.unnormalized();
        assert!((raw[0] - 0.25).abs() < 1e-12);
        assert!((raw[1] - 1.0 / 12.0).abs() < 1e-12);
        assert!((jp.posterior_of(Choice::Existing(k)).unwrap() - 0.75).abs() < 1e-12);
        assert_eq!(jp.best(), Choice::Existing(k));
    }

    #[test]
    fn test_normalized_sums_to_one() {
        let mut s = binary(3);
        s.commit(Stimulus::from([1, 1, 1]), Choice::New).unwrap();
        s.commit(Stimulus::from([0, 0, 0]), Choice::New).unwrap();
        s.commit(Stimulus::from([0, 0, 1]), Choice::Existing(CategoryId::new(1)))
            .unwrap();
        let engine = PosteriorEngine::new(&s, Coupling::new(0.4).unwrap());
        let jp = engine.joint_posterior(&Stimulus::from([0, 1, 1])).unwrap();
        assert!((jp.normalized().iter().sum::<f64>() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_repeat_query_is_identical() {
        let mut s = binary(3);
        s.commit(Stimulus::from([1, 0, 1]), Choice::New).unwrap();
        let engine = PosteriorEngine::new(&s, Coupling::default());
        let q = Stimulus::from([1, 1, 1]);
        assert_eq!(engine.joint_posterior(&q).unwrap(), engine.joint_posterior(&q).unwrap());
    }

    #[test]
    fn test_degenerate_normalizer_rejected() {
        for scores in [vec![0.0, 0.0], vec![f64::NAN], vec![f64::INFINITY, 1.0]] {
            let err = JointPosterior::from_scores(scores.clone(), None).unwrap_err();
            assert!(matches!(err, RmcError::NumericDegeneracy(_)), "{scores:?}: {err:?}");
            assert_eq!(err.kind(), crate::error::ErrorKind::NumericDegeneracy);
        }
        assert!(JointPosterior::from_scores(vec![0.0, 1e-300], None).is_ok());
    }

    #[test]
    fn test_exact_tie_with_new_goes_to_existing() {
        let mut s = CategoryStore::new(FeatureSpace::new(vec![1]).unwrap());
        s.commit(Stimulus::from([0]), Choice::New).unwrap();
        let engine = PosteriorEngine::new(&s, Coupling::new(0.5).unwrap());
        let jp = engine.joint_posterior(&Stimulus::from([0])).unwrap();
        assert_eq!(jp.unnormalized(), vec![0.5, 0.5]);
        assert_eq!(jp.best(), Choice::Existing(CategoryId::new(0)));
        assert_eq!(engine.prior().prior_new(), 0.5);
    }

    #[test]
    fn test_tie_prefers_lowest_existing_index() {
        // Two identical singleton categories score identically.
        let mut s = binary(2);
        s.commit(Stimulus::from([1, 1]), Choice::New).unwrap();
        s.commit(Stimulus::from([1, 1]), Choice::New).unwrap();
        let engine = PosteriorEngine::new(&s, Coupling::new(0.9).unwrap());
        let jp = engine.joint_posterior(&Stimulus::from([1, 1])).unwrap();
        let raw = jp.unnormalized();
        assert_eq!(raw[0], raw[1]);
        assert_eq!(jp.best(), Choice::Existing(CategoryId::new(0)));
    }

    #[test]
    fn test_log_space_fallback_for_many_dimensions() {
        // 1/2^1200 underflows f64; the log path keeps the posterior usable.
        let n = 1200;
        let mut s = binary(n);
        let ones = Stimulus::new(vec![1; n]);
        s.commit(ones.clone(), Choice::New).unwrap();
        let engine = PosteriorEngine::new(&s, Coupling::new(0.5).unwrap());
        let jp = engine.joint_posterior(&ones).unwrap();
        assert!(jp.is_log_scaled());
        // the matching category beats the uniform new category by (4/3)^n
        assert_eq!(jp.best(), Choice::Existing(CategoryId::new(0)));
        let p = jp.posterior_of(Choice::Existing(CategoryId::new(0))).unwrap();
        assert!((p - 1.0).abs() < 1e-9);
        let ln = jp.ln_unnormalized();
        let expected_new = (0.5f64 / 1.0).ln() - n as f64 * 2f64.ln();
        assert!((ln[1] - expected_new).abs() < 1e-6);
    }

    #[test]
    fn test_unknown_choice_rejected() {
        let s = binary(1);
        let engine = PosteriorEngine::new(&s, Coupling::default());
        let jp = engine.joint_posterior(&Stimulus::from([0])).unwrap();
        assert_eq!(
            jp.posterior_of(Choice::Existing(CategoryId::new(0))),
            Err(RmcError::UnknownCategory { index: 0, count: 0 })
        );
    }

    #[test]
    fn test_wrong_length_rejected() {
        let s = binary(3);
        let engine = PosteriorEngine::new(&s, Coupling::default());
        assert_eq!(
            engine.joint_posterior(&Stimulus::from([0, 1])),
            Err(RmcError::DimensionMismatch { expected: 3, got: 2 })
        );
    }
}
