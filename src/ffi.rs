//! Python FFI bindings via PyO3.
//!
//! Exposes the online categorizer to Python with plain lists of integers for
//! stimuli and `None` for unknown dimensions in prediction cues.
//!
//! # Building the Python extension
//!
//! ```bash
//! pip install maturin
//! maturin develop --features python-ffi
//! ```
//!
//! # Usage
//!
//! ```python
//! from rmc_core import RationalModel
//!
//! model = RationalModel(arities=[2, 2, 2, 2, 2], coupling=0.5)
//! model.train([[1, 1, 1, 1, 1], [1, 0, 1, 0, 1], [0, 1, 0, 1, 1]])
//! print(model.categories())                      # [[0, 1], [2]] etc.
//! p = model.predict_value(4, 1, [1, 1, 1, 1, None], coupling=0.45)
//! ```

use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;

use crate::assigner::Assigner;
use crate::config::{Coupling, RmcConfig};
use crate::error::{ErrorKind, RmcError};
use crate::predictor::Predictor;
use crate::space::{Cue, Stimulus};

fn to_py_err(e: RmcError) -> PyErr {
    match e.kind() {
        ErrorKind::Validation => PyValueError::new_err(e.to_string()),
        ErrorKind::NumericDegeneracy | ErrorKind::State => PyRuntimeError::new_err(e.to_string()),
    }
}

/// Online Rational Model of Categorization.
///
/// Args:
///     arities:  alphabet size of each dimension
///     coupling: coupling probability in (0, 1), default 0.5
#[pyclass(name = "RationalModel")]
pub struct PyRationalModel {
    inner: Assigner,
}

#[pymethods]
impl PyRationalModel {
    /// Create an empty model.
    #[new]
    #[pyo3(signature = (arities, coupling=0.5))]
    pub fn new(arities: Vec<usize>, coupling: f64) -> PyResult<Self> {
        let (space, coupling) = RmcConfig::new(arities)
            .with_coupling(coupling)
            .validate()
            .map_err(to_py_err)?;
        Ok(Self {
            inner: Assigner::new(space, coupling),
        })
    }

    /// Assign one stimulus and return the index of its category.
    pub fn assign(&mut self, stimulus: Vec<usize>) -> PyResult<usize> {
        self.inner
            .assign(Stimulus::new(stimulus))
            .map(|a| a.category.index())
            .map_err(to_py_err)
    }

    /// Assign a list of stimuli in order and return their category indices.
    pub fn train(&mut self, stimuli: Vec<Vec<usize>>) -> PyResult<Vec<usize>> {
        self.inner
            .train(stimuli)
            .map(|v| v.into_iter().map(|a| a.category.index()).collect())
            .map_err(to_py_err)
    }

    /// Probability of `value` on `dimension` for a cue (use None for unknown entries).
    ///
    /// Args:
    ///     coupling: coupling for prediction; defaults to the training coupling
    #[pyo3(signature = (dimension, value, cue, coupling=None))]
    pub fn predict_value(
        &self,
        dimension: usize,
        value: usize,
        cue: Vec<Option<usize>>,
        coupling: Option<f64>,
    ) -> PyResult<f64> {
        let coupling = match coupling {
            Some(c) => Coupling::new(c).map_err(to_py_err)?,
            None => self.inner.coupling(),
        };
        Predictor::new(self.inner.store(), coupling)
            .predict_value(dimension, value, &Cue::new(cue))
            .map_err(to_py_err)
    }

    /// Category structure as lists of stimulus indices.
    pub fn categories(&self) -> Vec<Vec<usize>> {
        self.inner.store().partition()
    }

    /// Change the training coupling.
    pub fn set_coupling(&mut self, coupling: f64) -> PyResult<()> {
        let coupling = Coupling::new(coupling).map_err(to_py_err)?;
        self.inner.set_coupling(coupling);
        Ok(())
    }

    /// Forget all stimuli and categories.
    pub fn reset(&mut self) {
        self.inner.reset();
    }

    /// Number of stimuli seen.
    pub fn __len__(&self) -> usize {
        self.inner.store().len()
    }

    /// Python repr string.
    pub fn __repr__(&self) -> String {
        format!(
            "RationalModel(stimuli={}, categories={}, coupling={:.3})",
            self.inner.store().len(),
            self.inner.store().category_count(),
            self.inner.coupling().value(),
        )
    }
}

/// Rational Model of Categorization Python bindings.
#[pymodule]
pub fn rmc_core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyRationalModel>()?;
    m.add("__version__", env!("CARGO_PKG_VERSION"))?;
    Ok(())
}
