//! Category-membership priors from occupancy counts.
//!
//! With coupling `c`, total stimuli `n` and occupancy `nk`:
//!
//! ```text
//! P(k)   = c · nk / (1 - c + c · n)
//! P(new) = (1 - c) / (1 - c + c · n)
//! ```
//!
//! These sum to one for every `c` in (0, 1) and every occupancy vector. On an
//! empty store `P(new) = 1`.

use crate::config::Coupling;
use crate::error::Result;
use crate::store::{CategoryId, CategoryStore};

/// Read-only prior view over a [`CategoryStore`] at a fixed coupling.
#[derive(Clone, Copy, Debug)]
pub struct PriorEngine<'a> {
    store: &'a CategoryStore,
    coupling: Coupling,
}

impl<'a> PriorEngine<'a> {
    /// Priors for the current occupancies of `store`.
    pub fn new(store: &'a CategoryStore, coupling: Coupling) -> Self {
        Self { store, coupling }
    }

    /// The coupling probability in use.
    pub fn coupling(&self) -> Coupling {
        self.coupling
    }

    /// Prior probability that the next stimulus joins `category`.
    pub fn prior_existing(&self, category: CategoryId) -> Result<f64> {
        let nk = self.store.occupancy(category)?;
        Ok(self.prior_for_occupancy(nk))
    }

    /// Prior probability that the next stimulus opens a new category.
    pub fn prior_new(&self) -> f64 {
        (1.0 - self.coupling.value()) / self.denominator()
    }

    /// Prior of every existing category, in id order.
    pub fn priors_existing(&self) -> Vec<f64> {
        self.store
            .categories()
            .iter()
            .map(|c| self.prior_for_occupancy(c.occupancy()))
            .collect()
    }

    pub(crate) fn prior_for_occupancy(&self, nk: usize) -> f64 {
        self.coupling.value() * nk as f64 / self.denominator()
    }

    fn denominator(&self) -> f64 {
        let c = self.coupling.value();
        // n is the number of categorized stimuli, i.e. the sum of occupancies.
        1.0 - c + c * self.store.len() as f64
    }
}
