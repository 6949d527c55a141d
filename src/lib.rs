//! # rmc-core
//!
//! Rational Model of Categorization: online Bayesian category formation over
//! discrete feature spaces (Anderson, 1990).
//!
//! ---
//!
//! ## Online, greedy, one stimulus at a time
//!
//! Stimuli arrive in sequence. Each one is scored against every existing
//! category and against the option of founding a new one, then committed to the
//! highest-scoring option. Assignments are never revisited: the final
//! partition depends on presentation order.
//!
//! **Prior.** A single coupling probability `c` decides how readily stimuli
//! join existing categories. With `n` stimuli seen and `n_k` in category `k`:
//!
//! ```text
//! P(k)   = c·n_k / ((1 − c) + c·n)
//! P(new) = (1 − c) / ((1 − c) + c·n)
//! ```
//!
//! **Likelihood.** Each dimension is an independent Laplace-smoothed
//! multinomial inside a category, `(count + 1) / (n_k + m_i)`, and the
//! dimensions multiply. A new category is empty, so every value has
//! probability `1 / m_i`.
//!
//! **Prediction.** A held-out dimension is filled by averaging each
//! category's value distribution, weighted by how strongly the known
//! dimensions point at that category.
//!
//! ---
//!
//! ## The pipeline
//!
//! ```text
//! Stimulus → PosteriorEngine ──→ JointPosterior → Assigner → CategoryStore
//!               ↑        ↑                                        │
//!         PriorEngine  LikelihoodEngine  ←────────────────────────┘
//!                                                                  │
//! Cue (some dims hidden) → Predictor ←─────────────────────────────┘
//! ```
//!
//! ## Module overview
//!
//! | Module | Key types | What it does |
//! |--------|-----------|--------------|
//! | [`space`] | [`FeatureSpace`], [`Stimulus`], [`Cue`] | Arity vector, stimuli, partially known cues |
//! | [`config`] | [`RmcConfig`], [`Coupling`] | Validated model parameters |
//! | [`store`] | [`CategoryStore`], [`CategoryId`], [`Choice`] | Stimuli plus the partition into categories |
//! | [`likelihood`] | [`LikelihoodEngine`] | Smoothed per-dimension and joint feature likelihoods |
//! | [`prior`] | [`PriorEngine`] | Coupling-driven category priors |
//! | [`posterior`] | [`PosteriorEngine`], [`JointPosterior`] | Unnormalized and normalized category scores |
//! | [`assigner`] | [`Assigner`], [`Assignment`], [`Phase`] | Evaluate-then-commit assignment loop |
//! | [`predictor`] | [`Predictor`], [`Prediction`] | Held-out feature prediction |
//! | [`shared`] | [`SharedModel`] | `Arc<RwLock<_>>` wrapper for multi-threaded use |
//! | [`medin`] | | Medin & Schaffer (1978) reference stimuli |
//! | `snapshot` | `StoreSnapshot` | Serializable store (requires `serde` feature) |
//! | `ffi` | `RationalModel` | Python bindings (requires `python-ffi` feature) |
//!
//! ## Quick start
//!
//! ```rust
//! use rmc_core::{Assigner, Coupling, Cue, FeatureSpace, Predictor, medin};
//!
//! let space = medin::feature_space().unwrap();
//! let mut model = Assigner::new(space, Coupling::new(medin::TRAINING_COUPLING).unwrap());
//! model.train(medin::training_set()).unwrap();
//! assert_eq!(model.store().len(), 6);
//!
//! let predictor = Predictor::new(model.store(), Coupling::new(medin::TEST_COUPLING).unwrap());
//! let cue = Cue::new(vec![Some(1), Some(1), Some(1), Some(1), None]);
//! let p = predictor.predict_value(medin::LABEL_DIMENSION, 1, &cue).unwrap();
//! assert!(p > 0.0 && p < 1.0);
//! # let _ = FeatureSpace::new(vec![2]).unwrap();
//! ```
//!
//! ## Logging
//!
//! The crate emits `tracing` events (assignment decisions at `debug`, scoring
//! at `trace`, log-space fallbacks at `warn`). Install any subscriber to see
//! them.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod error;
pub mod space;
pub mod config;
pub mod store;
pub mod likelihood;
pub mod prior;
pub mod posterior;
pub mod assigner;
pub mod predictor;
pub mod shared;
pub mod medin;

/// Serializable store snapshots.
///
/// Enabled by `features = ["serde"]`.
#[cfg(feature = "serde")]
#[cfg_attr(docsrs, doc(cfg(feature = "serde")))]
pub mod snapshot;

#[cfg(feature = "python-ffi")]
pub mod ffi;

pub use assigner::{Assigner, Assignment, Phase};
pub use config::{Coupling, RmcConfig, DEFAULT_COUPLING};
pub use error::{ErrorKind, Result, RmcError};
pub use likelihood::LikelihoodEngine;
pub use posterior::{JointPosterior, PosteriorEngine};
pub use predictor::{Prediction, Predictor};
pub use prior::PriorEngine;
pub use shared::SharedModel;
pub use space::{Cue, FeatureSpace, Stimulus};
pub use store::{Category, CategoryId, CategoryStore, Choice};
