//! Per-dimension feature likelihoods under a category.
//!
//! For category `k`, dimension `i` and value `j`:
//!
//! ```text
//! P(j | i, k) = (count of members of k with value j on i + 1) / (nk + m[i])
//! ```
//!
//! the posterior mean of a Dirichlet-multinomial with a uniform concentration-1
//! prior over the `m[i]` values. Dimensions are conditionally independent given
//! the category, so the likelihood of a whole stimulus is the product over
//! dimensions.
//!
//! Nothing is cached: every call scans the category's current members.

use crate::error::Result;
use crate::space::Cue;
use crate::store::{CategoryId, CategoryStore};

/// Read-only likelihood view over a [`CategoryStore`].
#[derive(Clone, Copy, Debug)]
pub struct LikelihoodEngine<'a> {
    store: &'a CategoryStore,
}

impl<'a> LikelihoodEngine<'a> {
    /// View the current partition of `store`.
    pub fn new(store: &'a CategoryStore) -> Self {
        Self { store }
    }

    /// Probability that a member of `category` shows `value` on `dimension`.
    ///
    /// Always in (0, 1]. Fails on an unknown category, dimension, or value.
    pub fn feature_likelihood(
        &self,
        dimension: usize,
        value: usize,
        category: CategoryId,
    ) -> Result<f64> {
        self.store.category(category)?;
        self.store.space().check_value(dimension, value)?;
        Ok(self.feature_likelihood_unchecked(dimension, value, category.index()))
    }

    /// Product of feature likelihoods over the known dimensions of `cue`.
    pub fn joint_feature_likelihood(&self, cue: &Cue, category: CategoryId) -> Result<f64> {
        self.store.category(category)?;
        self.store.space().check_cue(cue)?;
        Ok(self.joint_unchecked(cue, category.index()))
    }

    /// Likelihood of `cue` under a category with no members: `Π 1/m[i]`
    /// over the known dimensions.
    pub fn novel_likelihood(&self, cue: &Cue) -> Result<f64> {
        self.store.space().check_cue(cue)?;
        Ok(self.novel_unchecked(cue))
    }

    pub(crate) fn feature_likelihood_unchecked(&self, dimension: usize, value: usize, k: usize) -> f64 {
        let nk = self.store.categories()[k].occupancy();
        let arity = self.store.space().arities()[dimension];
        let count = self.store.count_matching(k, dimension, value);
        (count + 1) as f64 / (nk + arity) as f64
    }

    pub(crate) fn joint_unchecked(&self, cue: &Cue, k: usize) -> f64 {
        cue.known()
            .map(|(i, j)| self.feature_likelihood_unchecked(i, j, k))
            .product()
    }

    pub(crate) fn ln_joint_unchecked(&self, cue: &Cue, k: usize) -> f64 {
        cue.known()
            .map(|(i, j)| self.feature_likelihood_unchecked(i, j, k).ln())
            .sum()
    }

    pub(crate) fn novel_unchecked(&self, cue: &Cue) -> f64 {
        self.store.space().uniform_likelihood(cue.known().map(|(i, _)| i))
    }

    pub(crate) fn ln_novel_unchecked(&self, cue: &Cue) -> f64 {
        let arities = self.store.space().arities();
        cue.known().map(|(i, _)| -(arities[i] as f64).ln()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RmcError;
    use crate::space::{FeatureSpace, Stimulus};
    use crate::store::Choice;

    /// One category {[1,0,2], [1,1,2], [0,1,2]} over arities [2, 2, 3].
    fn store() -> CategoryStore {
        let mut s = CategoryStore::new(FeatureSpace::new(vec![2, 2, 3]).unwrap());
        let k = s.commit(Stimulus::from([1, 0, 2]), Choice::New).unwrap();
        s.commit(Stimulus::from([1, 1, 2]), Choice::Existing(k)).unwrap();
        s.commit(Stimulus::from([0, 1, 2]), Choice::Existing(k)).unwrap();
        s
    }

    #[test]
    fn test_laplace_smoothed_frequency() {
        let s = store();
        let engine = LikelihoodEngine::new(&s);
        let k = CategoryId::new(0);
        // two of three members have value 1 on dim 0: (2 + 1) / (3 + 2)
        assert!((engine.feature_likelihood(0, 1, k).unwrap() - 0.6).abs() < 1e-12);
        // no member has value 0 on dim 2: (0 + 1) / (3 + 3)
        assert!((engine.feature_likelihood(2, 0, k).unwrap() - 1.0 / 6.0).abs() < 1e-12);
    }

    #[test]
    fn test_likelihoods_sum_to_one_per_dimension() {
        let s = store();
        let engine = LikelihoodEngine::new(&s);
        let k = CategoryId::new(0);
        for (i, &arity) in s.space().arities().iter().enumerate() {
            let total: f64 = (0..arity)
                .map(|j| engine.feature_likelihood(i, j, k).unwrap())
                .sum();
            assert!((total - 1.0).abs() < 1e-9, "dim {i} sums to {total}");
        }
    }

    #[test]
    fn test_joint_is_product_over_dimensions() {
        let s = store();
        let engine = LikelihoodEngine::new(&s);
        let k = CategoryId::new(0);
        let stimulus = Stimulus::from([1, 1, 2]);
        let expected: f64 = (0..3)
            .map(|i| engine.feature_likelihood(i, stimulus.values()[i], k).unwrap())
            .product();
        let joint = engine
            .joint_feature_likelihood(&Cue::from(&stimulus), k)
            .unwrap();
        assert!((joint - expected).abs() < 1e-15);
        let ln = engine.ln_joint_unchecked(&Cue::from(&stimulus), 0);
        assert!((ln.exp() - expected).abs() < 1e-12);
    }

    #[test]
    fn test_hidden_dimension_is_marginalized() {
        let s = store();
        let engine = LikelihoodEngine::new(&s);
        let k = CategoryId::new(0);
        let cue = Cue::new(vec![Some(1), None, Some(2)]);
        let expected = engine.feature_likelihood(0, 1, k).unwrap()
            * engine.feature_likelihood(2, 2, k).unwrap();
        assert!((engine.joint_feature_likelihood(&cue, k).unwrap() - expected).abs() < 1e-15);
        assert!((engine.novel_likelihood(&cue).unwrap() - 1.0 / 6.0).abs() < 1e-15);
    }

    #[test]
    fn test_rejects_bad_queries() {
        let s = store();
        let engine = LikelihoodEngine::new(&s);
        assert_eq!(
            engine.feature_likelihood(0, 0, CategoryId::new(1)),
            Err(RmcError::UnknownCategory { index: 1, count: 1 })
        );
        assert_eq!(
            engine.feature_likelihood(3, 0, CategoryId::new(0)),
            Err(RmcError::UnknownDimension { dimension: 3, dimensions: 3 })
        );
        assert!(engine.feature_likelihood(2, 3, CategoryId::new(0)).is_err());
    }
}
