//! The category store: append-only stimulus history plus its partition into categories.
//!
//! # Invariants
//!
//! - Stimuli are append-only; a stored stimulus never changes.
//! - Categories are an arena addressed by [`CategoryId`]. They are created in
//!   order, never removed, merged, or emptied, so an id stays valid until
//!   [`CategoryStore::reset`].
//! - Every stimulus index `0..len()` belongs to exactly one category
//!   (total, non-overlapping partition). Occupancy is the member count and is
//!   never stored separately, so it cannot drift from membership.
//! - A failed [`CategoryStore::commit`] leaves the store untouched.

use core::fmt;

use crate::error::{Result, RmcError};
use crate::space::{FeatureSpace, Stimulus};

// ─── CategoryId / Choice ────────────────────────────────────────────────────

/// Stable 0-based index of a category within one store.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CategoryId(usize);

impl CategoryId {
    /// Wrap a raw index. Whether it exists is checked by the store.
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    /// The raw index.
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for CategoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Destination of a stimulus: an existing category or a freshly created one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Choice {
    /// Join an existing category.
    Existing(CategoryId),
    /// Open a new category.
    New,
}

impl Choice {
    /// True for [`Choice::New`].
    pub fn is_new(self) -> bool {
        matches!(self, Self::New)
    }
}

// ─── Category ───────────────────────────────────────────────────────────────

/// One discovered category: the indices of its member stimuli.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Category {
    members: Vec<usize>,
}

impl Category {
    /// Member stimulus indices, in the order they joined.
    pub fn members(&self) -> &[usize] {
        &self.members
    }

    /// Number of members, `nk`.
    pub fn occupancy(&self) -> usize {
        self.members.len()
    }

    /// True if stimulus `index` is a member.
    pub fn contains(&self, index: usize) -> bool {
        self.members.contains(&index)
    }
}

// ─── CategoryStore ──────────────────────────────────────────────────────────

/// Stimulus history and category partition for one run.
#[derive(Clone)]
pub struct CategoryStore {
    space: FeatureSpace,
    stimuli: Vec<Stimulus>,
    categories: Vec<Category>,
    /// `assignments[i]` is the category of stimulus `i`.
    assignments: Vec<CategoryId>,
}

impl CategoryStore {
    /// Empty store over `space`: no stimuli, no categories.
    pub fn new(space: FeatureSpace) -> Self {
        Self {
            space,
            stimuli: Vec::new(),
            categories: Vec::new(),
            assignments: Vec::new(),
        }
    }

    /// Rebuild a store from a stimulus list and a partition of its indices.
    ///
    /// Every stimulus is re-validated and the partition must be total,
    /// non-overlapping and free of empty categories.
    pub fn from_partition(
        space: FeatureSpace,
        stimuli: Vec<Stimulus>,
        partition: Vec<Vec<usize>>,
    ) -> Result<Self> {
        for stimulus in &stimuli {
            space.check_stimulus(stimulus)?;
        }
        let mut slots: Vec<Option<CategoryId>> = vec![None; stimuli.len()];
        for (k, members) in partition.iter().enumerate() {
            if members.is_empty() {
                return Err(RmcError::CorruptPartition(format!("category {k} is empty")));
            }
            for &index in members {
                match slots.get_mut(index) {
                    None => {
                        return Err(RmcError::CorruptPartition(format!(
                            "category {k} references stimulus {index} of {}",
                            stimuli.len()
                        )))
                    }
                    Some(Some(other)) => {
                        return Err(RmcError::CorruptPartition(format!(
                            "stimulus {index} is in categories {} and {k}",
                            other.index()
                        )))
                    }
                    Some(slot) => *slot = Some(CategoryId(k)),
                }
            }
        }
        let assignments = slots
            .into_iter()
            .enumerate()
            .map(|(index, slot)| {
                slot.ok_or_else(|| {
                    RmcError::CorruptPartition(format!("stimulus {index} has no category"))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            space,
            stimuli,
            categories: partition
                .into_iter()
                .map(|members| Category { members })
                .collect(),
            assignments,
        })
    }

    // ── Read accessors ─────────────────────────────────────────────────────

    /// The feature space every stimulus belongs to.
    pub fn space(&self) -> &FeatureSpace {
        &self.space
    }

    /// Number of stimuli seen, `n`.
    pub fn len(&self) -> usize {
        self.stimuli.len()
    }

    /// True before the first stimulus.
    pub fn is_empty(&self) -> bool {
        self.stimuli.is_empty()
    }

    /// All stimuli in arrival order.
    pub fn stimuli(&self) -> &[Stimulus] {
        &self.stimuli
    }

    /// Stimulus at `index`.
    pub fn stimulus(&self, index: usize) -> Option<&Stimulus> {
        self.stimuli.get(index)
    }

    /// Number of categories, `K`.
    pub fn category_count(&self) -> usize {
        self.categories.len()
    }

    /// All categories in creation order.
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// Category `id`, or `UnknownCategory`.
    pub fn category(&self, id: CategoryId) -> Result<&Category> {
        self.categories.get(id.0).ok_or(RmcError::UnknownCategory {
            index: id.0,
            count: self.categories.len(),
        })
    }

    /// Iterate the ids of all categories.
    pub fn category_ids(&self) -> impl Iterator<Item = CategoryId> {
        (0..self.categories.len()).map(CategoryId)
    }

    /// Occupancy `nk` of category `id`.
    pub fn occupancy(&self, id: CategoryId) -> Result<usize> {
        self.category(id).map(Category::occupancy)
    }

    /// Occupancy of every category, in id order.
    pub fn occupancies(&self) -> Vec<usize> {
        self.categories.iter().map(Category::occupancy).collect()
    }

    /// Category holding stimulus `index`.
    pub fn category_of(&self, index: usize) -> Option<CategoryId> {
        self.assignments.get(index).copied()
    }

    /// The partition as an ordered list of member-index lists.
    pub fn partition(&self) -> Vec<Vec<usize>> {
        self.categories.iter().map(|c| c.members.clone()).collect()
    }

    /// Member stimuli of category `id`.
    pub fn stimuli_in(&self, id: CategoryId) -> Result<impl Iterator<Item = &Stimulus> + '_> {
        let category = self.category(id)?;
        Ok(category.members.iter().map(move |&i| &self.stimuli[i]))
    }

    /// Number of members of category `k` whose value on `dimension` equals `value`.
    ///
    /// Callers validate `k` and `dimension`.
    pub(crate) fn count_matching(&self, k: usize, dimension: usize, value: usize) -> usize {
        self.categories[k]
            .members
            .iter()
            .filter(|&&i| self.stimuli[i].values()[dimension] == value)
            .count()
    }

    /// Verify the total, non-overlapping partition invariant.
    pub fn check_partition(&self) -> Result<()> {
        let mut seen = vec![false; self.stimuli.len()];
        for (k, category) in self.categories.iter().enumerate() {
            if category.members.is_empty() {
                return Err(RmcError::CorruptPartition(format!("category {k} is empty")));
            }
            for &index in &category.members {
                match seen.get_mut(index) {
                    Some(flag) if *flag => {
                        return Err(RmcError::CorruptPartition(format!(
                            "stimulus {index} appears twice"
                        )))
                    }
                    Some(flag) => *flag = true,
                    None => {
                        return Err(RmcError::CorruptPartition(format!(
                            "unknown stimulus {index}"
                        )))
                    }
                }
                if self.assignments.get(index) != Some(&CategoryId(k)) {
                    return Err(RmcError::CorruptPartition(format!(
                        "assignment of stimulus {index} disagrees with category {k}"
                    )));
                }
            }
        }
        match seen.iter().position(|&s| !s) {
            Some(index) => Err(RmcError::CorruptPartition(format!(
                "stimulus {index} has no category"
            ))),
            None => Ok(()),
        }
    }

    // ── Mutation ───────────────────────────────────────────────────────────

    /// Append `stimulus` and place it according to `choice`.
    ///
    /// The stimulus and the target category are validated first; on error
    /// nothing changes. Returns the id of the category that received it.
    pub fn commit(&mut self, stimulus: Stimulus, choice: Choice) -> Result<CategoryId> {
        self.space.check_stimulus(&stimulus)?;
        if let Choice::Existing(id) = choice {
            self.category(id)?;
        }

        let index = self.stimuli.len();
        self.stimuli.push(stimulus);
        let id = match choice {
            Choice::Existing(id) => {
                self.categories[id.0].members.push(index);
                id
            }
            Choice::New => {
                self.categories.push(Category { members: vec![index] });
                CategoryId(self.categories.len() - 1)
            }
        };
        self.assignments.push(id);
        Ok(id)
    }

    /// Drop all stimuli and categories, keeping the feature space.
    pub fn reset(&mut self) {
        self.stimuli.clear();
        self.categories.clear();
        self.assignments.clear();
    }
}

impl fmt::Debug for CategoryStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CategoryStore")
            .field("dimensions", &self.space.dimensions())
            .field("stimuli", &self.stimuli.len())
            .field("occupancies", &self.occupancies())
            .finish()
    }
}
