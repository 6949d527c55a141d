//! Online assignment loop: one stimulus in, one category decision out.
//!
//! Each step runs through three phases:
//!
//! ```text
//!   Idle ──begin()──▶ Evaluating ──commit()──▶ Committed ──begin()──▶ Evaluating …
//!                         │
//!                         └──abandon()──▶ Idle
//! ```
//!
//! `begin` validates the stimulus and scores it against the store *as it is*,
//! i.e. without the incoming stimulus counted in any occupancy. `commit` appends
//! the stimulus and places it in the maximizing option; ties go to the lowest
//! existing category, then to "new". Because the `Assigner` owns its store
//! exclusively, nothing can mutate the partition between the two phases.
//!
//! A failed `begin` leaves both the phase and the store untouched.

use crate::config::Coupling;
use crate::error::{Result, RmcError};
use crate::posterior::{JointPosterior, PosteriorEngine};
use crate::space::{FeatureSpace, Stimulus};
use crate::store::{CategoryId, CategoryStore};

// ─── Assignment / Phase ─────────────────────────────────────────────────────

/// Outcome of one committed step.
#[derive(Clone, Debug, PartialEq)]
pub struct Assignment {
    /// Index of the stimulus in the store.
    pub stimulus_index: usize,
    /// Category that received the stimulus.
    pub category: CategoryId,
    /// True if the category was created by this step.
    pub created: bool,
    /// Normalized posterior of the chosen option at decision time.
    pub posterior: f64,
}

/// Where the assigner is in its step cycle.
#[derive(Clone, Debug, PartialEq)]
pub enum Phase {
    /// No step in flight and none committed since the last reset.
    Idle,
    /// A stimulus has been scored and awaits `commit`.
    Evaluating {
        /// The stimulus under evaluation.
        stimulus: Stimulus,
        /// Its joint posterior against the current store.
        posterior: JointPosterior,
    },
    /// The last step was committed.
    Committed(Assignment),
}

// ─── Assigner ───────────────────────────────────────────────────────────────

/// Owns a [`CategoryStore`] and grows it one stimulus at a time.
#[derive(Debug, Clone)]
pub struct Assigner {
    store: CategoryStore,
    coupling: Coupling,
    phase: Phase,
}

impl Assigner {
    /// Fresh assigner over an empty store.
    pub fn new(space: FeatureSpace, coupling: Coupling) -> Self {
        Self::with_store(CategoryStore::new(space), coupling)
    }

    /// Continue learning on an existing store (e.g. one restored from a snapshot).
    pub fn with_store(store: CategoryStore, coupling: Coupling) -> Self {
        Self {
            store,
            coupling,
            phase: Phase::Idle,
        }
    }

    /// The store built so far.
    pub fn store(&self) -> &CategoryStore {
        &self.store
    }

    /// Give up the assigner and keep the store.
    pub fn into_store(self) -> CategoryStore {
        self.store
    }

    /// Current coupling probability.
    pub fn coupling(&self) -> Coupling {
        self.coupling
    }

    /// Current phase.
    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    /// Change the coupling between epochs.
    ///
    /// A pending evaluation was scored with the old coupling and is discarded.
    pub fn set_coupling(&mut self, coupling: Coupling) {
        if matches!(self.phase, Phase::Evaluating { .. }) {
            tracing::debug!("coupling changed mid-step, discarding pending evaluation");
            self.phase = Phase::Idle;
        }
        self.coupling = coupling;
    }

    /// Posterior view over the current store.
    pub fn engine(&self) -> PosteriorEngine<'_> {
        PosteriorEngine::new(&self.store, self.coupling)
    }

    /// Idle/Committed → Evaluating: score `stimulus` against the current store.
    ///
    /// Replaces any evaluation already pending.
    pub fn begin(&mut self, stimulus: Stimulus) -> Result<JointPosterior> {
        let posterior = self.engine().joint_posterior(&stimulus)?;
        tracing::trace!(
            stimulus_index = self.store.len(),
            scores = ?posterior.unnormalized(),
            "evaluated joint posterior"
        );
        self.phase = Phase::Evaluating {
            stimulus,
            posterior: posterior.clone(),
        };
        Ok(posterior)
    }

    /// Evaluating → Committed: place the pending stimulus in its best option.
    pub fn commit(&mut self) -> Result<Assignment> {
        // Resolve the decision while the evaluation is still pending.
        let (choice, chosen_posterior) = match &self.phase {
            Phase::Evaluating { posterior, .. } => {
                let choice = posterior.best();
                (choice, posterior.posterior_of(choice)?)
            }
            _ => return Err(RmcError::NoPendingEvaluation),
        };
        let (stimulus, posterior) = match core::mem::replace(&mut self.phase, Phase::Idle) {
            Phase::Evaluating { stimulus, posterior } => (stimulus, posterior),
            other => {
                self.phase = other;
                return Err(RmcError::NoPendingEvaluation);
            }
        };

        let stimulus_index = self.store.len();
        let category = match self.store.commit(stimulus.clone(), choice) {
            Ok(category) => category,
            Err(e) => {
                self.phase = Phase::Evaluating { stimulus, posterior };
                return Err(e);
            }
        };

        let assignment = Assignment {
            stimulus_index,
            category,
            created: choice.is_new(),
            posterior: chosen_posterior,
        };
        tracing::debug!(
            stimulus_index,
            category = category.index(),
            created = assignment.created,
            posterior = chosen_posterior,
            score = posterior.best_score(),
            "assigned stimulus"
        );
        self.phase = Phase::Committed(assignment.clone());
        Ok(assignment)
    }

    /// Evaluating → Idle without touching the store.
    pub fn abandon(&mut self) {
        if matches!(self.phase, Phase::Evaluating { .. }) {
            self.phase = Phase::Idle;
        }
    }

    /// One full step: `begin` then `commit`.
    pub fn assign(&mut self, stimulus: Stimulus) -> Result<Assignment> {
        self.begin(stimulus)?;
        self.commit()
    }

    /// Assign a sequence in order.
    ///
    /// Stops at the first failing stimulus; earlier steps stay committed.
    pub fn train<I, S>(&mut self, stimuli: I) -> Result<Vec<Assignment>>
    where
        I: IntoIterator<Item = S>,
        S: Into<Stimulus>,
    {
        let mut assignments = Vec::new();
        for stimulus in stimuli {
            assignments.push(self.assign(stimulus.into())?);
        }
        tracing::info!(
            assigned = assignments.len(),
            stimuli = self.store.len(),
            categories = self.store.category_count(),
            coupling = self.coupling.value(),
            "training pass complete"
        );
        Ok(assignments)
    }

    /// Start a new run: empty store, same feature space and coupling.
    pub fn reset(&mut self) {
        tracing::info!(
            stimuli = self.store.len(),
            categories = self.store.category_count(),
            "resetting category store"
        );
        self.store.reset();
        self.phase = Phase::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assigner(c: f64) -> Assigner {
        Assigner::new(
            FeatureSpace::new(vec![2, 2, 2]).unwrap(),
            Coupling::new(c).unwrap(),
        )
    }

    #[test]
    fn test_first_stimulus_opens_category() {
        let mut a = assigner(0.5);
        let out = a.assign(Stimulus::from([1, 0, 1])).unwrap();
        assert_eq!(out.category, CategoryId::new(0));
        assert!(out.created);
        assert!((out.posterior - 1.0).abs() < 1e-12);
        assert_eq!(a.store().occupancies(), vec![1]);
    }

    #[test]
    fn test_phase_transitions() {
        let mut a = assigner(0.5);
        assert_eq!(a.phase(), &Phase::Idle);

        a.begin(Stimulus::from([1, 1, 1])).unwrap();
        assert!(matches!(a.phase(), Phase::Evaluating { .. }));
        assert!(a.store().is_empty(), "begin must not mutate the store");

        let out = a.commit().unwrap();
        assert_eq!(a.phase(), &Phase::Committed(out));
        assert_eq!(a.store().len(), 1);
    }

    #[test]
    fn test_commit_without_begin() {
        let mut a = assigner(0.5);
        assert_eq!(a.commit(), Err(RmcError::NoPendingEvaluation));
        a.assign(Stimulus::from([0, 0, 0])).unwrap();
        assert_eq!(a.commit(), Err(RmcError::NoPendingEvaluation));
        assert!(matches!(a.phase(), Phase::Committed(_)));
    }

    #[test]
    fn test_abandon_leaves_store_untouched() {
        let mut a = assigner(0.5);
        a.begin(Stimulus::from([1, 1, 0])).unwrap();
        a.abandon();
        assert_eq!(a.phase(), &Phase::Idle);
        assert!(a.store().is_empty());
    }

    #[test]
    fn test_wrong_length_is_atomic() {
        let mut a = assigner(0.5);
        a.assign(Stimulus::from([1, 1, 0])).unwrap();
        let before = a.store().partition();
        let err = a.assign(Stimulus::from([1, 1])).unwrap_err();
        assert!(err.is_validation());
        assert_eq!(a.store().len(), 1);
        assert_eq!(a.store().partition(), before);
        assert_eq!(a.store().occupancies(), vec![1]);
        assert!(matches!(a.phase(), Phase::Committed(_)));
    }

    #[test]
    fn test_out_of_range_value_is_atomic() {
        let mut a = assigner(0.5);
        assert!(a.assign(Stimulus::from([1, 2, 0])).is_err());
        assert!(a.store().is_empty());
        assert_eq!(a.phase(), &Phase::Idle);
    }

    #[test]
    fn test_identical_stimuli_share_category_at_high_coupling() {
        let mut a = assigner(0.9);
        for _ in 0..5 {
            a.assign(Stimulus::from([1, 0, 1])).unwrap();
        }
        assert_eq!(a.store().partition(), vec![vec![0, 1, 2, 3, 4]]);
    }

    #[test]
    fn test_low_coupling_creates_singletons_for_distinct_items() {
        let mut a = assigner(0.05);
        a.train([[0, 0, 0], [1, 1, 1], [0, 1, 0]]).unwrap();
        assert_eq!(a.store().category_count(), 3);
    }

    #[test]
    fn test_train_stops_at_first_error() {
        let mut a = assigner(0.5);
        let batch = vec![
            Stimulus::from([0, 0, 0]),
            Stimulus::from([0, 0]),
            Stimulus::from([1, 1, 1]),
        ];
        assert!(a.train(batch).is_err());
        assert_eq!(a.store().len(), 1);
    }

    #[test]
    fn test_tie_with_new_category_joins_existing() {
        // Unary dimension, c = 0.5: the second [0] scores exactly 0.5 both ways.
        let mut a = Assigner::new(FeatureSpace::new(vec![1]).unwrap(), Coupling::new(0.5).unwrap());
        a.assign(Stimulus::from([0])).unwrap();
        let posterior = a.begin(Stimulus::from([0])).unwrap();
        assert_eq!(posterior.unnormalized(), vec![0.5, 0.5]);
        let out = a.commit().unwrap();
        assert!(!out.created);
        assert_eq!(out.category, CategoryId::new(0));
        assert_eq!(a.store().partition(), vec![vec![0, 1]]);
    }

    #[test]
    fn test_commit_keeps_pending_step_until_store_accepts() {
        let mut a = assigner(0.5);
        a.begin(Stimulus::from([0, 1, 1])).unwrap();
        let out = a.commit().unwrap();
        assert_eq!(out.posterior, 1.0);
        assert_eq!(a.commit(), Err(RmcError::NoPendingEvaluation));
        assert_eq!(a.phase(), &Phase::Committed(out));
    }

    #[test]
    fn test_set_coupling_discards_pending() {
        let mut a = assigner(0.5);
        a.begin(Stimulus::from([0, 1, 0])).unwrap();
        a.set_coupling(Coupling::new(0.2).unwrap());
        assert_eq!(a.phase(), &Phase::Idle);
        assert_eq!(a.coupling().value(), 0.2);
    }

    #[test]
    fn test_reset_starts_fresh_run() {
        let mut a = assigner(0.5);
        a.train([[0, 0, 0], [1, 1, 1]]).unwrap();
        a.reset();
        assert!(a.store().is_empty());
        assert_eq!(a.phase(), &Phase::Idle);
        let out = a.assign(Stimulus::from([1, 1, 1])).unwrap();
        assert!(out.created);
        assert_eq!(out.stimulus_index, 0);
    }
}
