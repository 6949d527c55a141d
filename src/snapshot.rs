//! Portable snapshot of a [`CategoryStore`] for persistence and reporting.
//!
//! The snapshot stores the arity vector, every stimulus in arrival order, and
//! the partition as ordered lists of stimulus indices. Restoring re-validates
//! everything, so a hand-edited or truncated snapshot cannot produce a store
//! that violates the partition invariant.
//!
//! Requires the `serde` feature.
//!
//! ```rust,ignore
//! use rmc_core::snapshot::StoreSnapshot;
//!
//! let snapshot = StoreSnapshot::from_store(assigner.store());
//! let json = serde_json::to_string(&snapshot).unwrap();
//! let restored = serde_json::from_str::<StoreSnapshot>(&json).unwrap().into_store().unwrap();
//! ```

use crate::error::{Result, RmcError};
use crate::space::{FeatureSpace, Stimulus};
use crate::store::CategoryStore;

/// Current snapshot format version.
pub const SNAPSHOT_VERSION: u16 = 1;

/// Serializable form of a [`CategoryStore`].
#[derive(serde::Serialize, serde::Deserialize, Clone, Debug, PartialEq)]
pub struct StoreSnapshot {
    /// Format version; always [`SNAPSHOT_VERSION`] for new snapshots.
    pub version: u16,
    /// Alphabet size of each dimension.
    pub arities: Vec<usize>,
    /// Stimuli in arrival order.
    pub stimuli: Vec<Stimulus>,
    /// Categories in creation order, each as its member stimulus indices.
    pub categories: Vec<Vec<usize>>,
}

impl StoreSnapshot {
    /// Capture the current state of `store`.
    pub fn from_store(store: &CategoryStore) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            arities: store.space().arities().to_vec(),
            stimuli: store.stimuli().to_vec(),
            categories: store.partition(),
        }
    }

    /// Number of categories recorded.
    pub fn category_count(&self) -> usize {
        self.categories.len()
    }

    /// Rebuild the store, validating the feature space, every stimulus, and
    /// the partition.
    pub fn into_store(self) -> Result<CategoryStore> {
        if self.version != SNAPSHOT_VERSION {
            return Err(RmcError::CorruptPartition(format!(
                "unsupported snapshot version {}",
                self.version
            )));
        }
        let space = FeatureSpace::new(self.arities)?;
        CategoryStore::from_partition(space, self.stimuli, self.categories)
    }
}

impl From<&CategoryStore> for StoreSnapshot {
    fn from(store: &CategoryStore) -> Self {
        Self::from_store(store)
    }
}
