//! Thread-shareable model: one writer, many readers.
//!
//! Each [`SharedModel::assign`] holds the write lock across the whole
//! evaluate-and-commit step, so no reader ever sees a half-applied step and no
//! other writer can slip in between scoring and committing. Predictions and
//! reporting take the read lock and may run concurrently with each other.
//!
//! Independent runs (different stimuli, different couplings) should use
//! separate models; they share nothing.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::assigner::{Assigner, Assignment};
use crate::config::Coupling;
use crate::error::{Result, RmcError};
use crate::predictor::{Prediction, Predictor};
use crate::space::{Cue, Stimulus};
use crate::store::CategoryStore;

/// An [`Assigner`] behind `Arc<RwLock<_>>`.
#[derive(Clone, Debug)]
pub struct SharedModel {
    inner: Arc<RwLock<Assigner>>,
}

impl SharedModel {
    /// Share `assigner` between threads.
    pub fn new(assigner: Assigner) -> Self {
        Self {
            inner: Arc::new(RwLock::new(assigner)),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Assigner>> {
        self.inner.read().map_err(|_| RmcError::LockPoisoned)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Assigner>> {
        self.inner.write().map_err(|_| RmcError::LockPoisoned)
    }

    /// Assign one stimulus under the write lock.
    pub fn assign(&self, stimulus: Stimulus) -> Result<Assignment> {
        self.write()?.assign(stimulus)
    }

    /// Assign a sequence under a single write lock.
    pub fn train<I, S>(&self, stimuli: I) -> Result<Vec<Assignment>>
    where
        I: IntoIterator<Item = S>,
        S: Into<Stimulus>,
    {
        self.write()?.train(stimuli)
    }

    /// Change the training coupling.
    pub fn set_coupling(&self, coupling: Coupling) -> Result<()> {
        self.write()?.set_coupling(coupling);
        Ok(())
    }

    /// Start a new run.
    pub fn reset(&self) -> Result<()> {
        self.write()?.reset();
        Ok(())
    }

    /// Predicted distribution over `dimension` under the read lock.
    pub fn predict(&self, dimension: usize, cue: &Cue, coupling: Coupling) -> Result<Prediction> {
        let guard = self.read()?;
        Predictor::new(guard.store(), coupling).predict(dimension, cue)
    }

    /// Predicted probability of `value` on `dimension` under the read lock.
    pub fn predict_value(
        &self,
        dimension: usize,
        value: usize,
        cue: &Cue,
        coupling: Coupling,
    ) -> Result<f64> {
        let guard = self.read()?;
        Predictor::new(guard.store(), coupling).predict_value(dimension, value, cue)
    }

    /// Current partition under the read lock.
    pub fn partition(&self) -> Result<Vec<Vec<usize>>> {
        Ok(self.read()?.store().partition())
    }

    /// Run `f` against a consistent view of the store.
    pub fn with_store<R>(&self, f: impl FnOnce(&CategoryStore) -> R) -> Result<R> {
        Ok(f(self.read()?.store()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::space::FeatureSpace;
    use std::thread;

    fn model() -> SharedModel {
        SharedModel::new(Assigner::new(
            FeatureSpace::new(vec![2, 2, 2, 2]).unwrap(),
            Coupling::new(0.5).unwrap(),
        ))
    }

    #[test]
    fn test_concurrent_readers_and_writer_keep_partition_total() {
        let model = model();
        model.assign(Stimulus::from([1, 1, 1, 1])).unwrap();

        let writer = {
            let model = model.clone();
            thread::spawn(move || {
                for i in 0..40usize {
                    let bits = [i & 1, (i >> 1) & 1, (i >> 2) & 1, (i >> 3) & 1];
                    model.assign(Stimulus::from(bits)).unwrap();
                }
            })
        };
        let readers: Vec<_> = (0..4)
            .map(|_| {
                let model = model.clone();
                thread::spawn(move || {
                    let cue = Cue::new(vec![Some(1), Some(1), Some(1), None]);
                    for _ in 0..40 {
                        let p = model.predict(3, &cue, Coupling::new(0.45).unwrap()).unwrap();
                        assert!(p.existing.iter().all(|x| x.is_finite() && *x >= 0.0));
                        model
                            .with_store(|s| s.check_partition())
                            .unwrap()
                            .unwrap();
                    }
                })
            })
            .collect();

        writer.join().unwrap();
        for r in readers {
            r.join().unwrap();
        }
        assert_eq!(model.with_store(|s| s.len()).unwrap(), 41);
    }

    #[test]
    fn test_reset_and_partition() {
        let model = model();
        model.train([[0, 0, 0, 0], [0, 0, 0, 0]]).unwrap();
        assert_eq!(model.partition().unwrap(), vec![vec![0, 1]]);
        model.reset().unwrap();
        assert!(model.partition().unwrap().is_empty());
    }
}
