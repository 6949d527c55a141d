//! Medin & Schaffer (1978), experiment 1: the reference stimulus set.
//!
//! Five binary dimensions. The first four are the physical features of the
//! items; the fifth encodes category membership (1 = category A, 0 = category
//! B). Training presents six labelled items; the test phase presents twelve
//! items with the label dimension to be predicted.
//!
//! This module ships the data so that demos and tests can reproduce the
//! classic fit without any file loading. Your own experiments follow the same
//! shape: an arity vector plus ordered training and test lists.
//!
//! ```rust
//! use rmc_core::medin;
//!
//! let space = medin::feature_space().unwrap();
//! assert_eq!(space.dimensions(), 5);
//! assert_eq!(medin::training_set().len(), 6);
//! ```

use crate::error::Result;
use crate::space::{Cue, FeatureSpace, Stimulus};

/// Alphabet size of each of the five dimensions.
pub const ARITIES: [usize; 5] = [2, 2, 2, 2, 2];

/// The dimension holding the category label.
pub const LABEL_DIMENSION: usize = 4;

/// Coupling used for the training phase.
pub const TRAINING_COUPLING: f64 = 0.5;

/// Coupling used when predicting test items.
pub const TEST_COUPLING: f64 = 0.45;

const TRAINING: [[usize; 5]; 6] = [
    [1, 1, 1, 1, 1],
    [1, 0, 1, 0, 1],
    [0, 1, 0, 1, 1],
    [0, 0, 0, 0, 0],
    [0, 1, 0, 0, 0],
    [1, 0, 1, 1, 0],
];

const TEST: [[usize; 5]; 12] = [
    [1, 1, 1, 1, 1],
    [0, 1, 0, 1, 1],
    [1, 0, 1, 0, 1],
    [1, 1, 0, 1, 1],
    [0, 1, 1, 1, 1],
    [0, 0, 0, 1, 1],
    [1, 1, 1, 0, 1],
    [1, 0, 0, 0, 1],
    [0, 0, 1, 0, 1],
    [1, 0, 1, 1, 1],
    [0, 1, 0, 0, 1],
    [0, 0, 0, 0, 1],
];

/// Short labels of the test items: the four physical features, label unknown.
pub const TEST_LABELS: [&str; 12] = [
    "1111_", "0101_", "1010_", "1101_", "0111_", "0001_", "1110_", "1000_", "0010_", "1011_",
    "0100_", "0000_",
];

/// The five-dimensional binary feature space.
pub fn feature_space() -> Result<FeatureSpace> {
    FeatureSpace::new(ARITIES.to_vec())
}

/// The six training items in presentation order.
pub fn training_set() -> Vec<Stimulus> {
    TRAINING.iter().map(|s| Stimulus::from(*s)).collect()
}

/// The twelve test items as recorded (label dimension set to 1).
pub fn test_set() -> Vec<Stimulus> {
    TEST.iter().map(|s| Stimulus::from(*s)).collect()
}

/// The twelve test items with the label dimension hidden.
pub fn test_cues() -> Vec<Cue> {
    test_set()
        .iter()
        .map(|s| Cue::from(s).hide(LABEL_DIMENSION))
        .collect()
}
