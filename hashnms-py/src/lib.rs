//! Python bindings for the hashnms box-suppression library.
//!
//! Boxes cross the boundary as contiguous `float32` arrays of shape `(N, 4)`
//! in `(x, y, w, h)` center format, scores as `float32` arrays of shape
//! `(N,)`. Kept indices come back as `int64` arrays.

use numpy::{PyArray1, PyReadonlyArray1, PyReadonlyArray2, PyUntypedArrayMethods};
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

use hashnms::{
    ChainConfig, HashNmsError, MultiHashChain as RustMultiHashChain, OwnedBoxSet,
    SingleHashStage as RustSingleHashStage,
};

/// Convert a HashNmsError to a Python exception.
fn to_py_err(err: HashNmsError) -> PyErr {
    PyValueError::new_err(err.to_string())
}

/// Copy numpy inputs into an owned box set.
fn box_set_from_arrays(
    boxes: &PyReadonlyArray2<'_, f32>,
    scores: &PyReadonlyArray1<'_, f32>,
) -> PyResult<OwnedBoxSet> {
    let shape = boxes.shape();
    if shape[1] != 4 {
        return Err(PyValueError::new_err("boxes must have shape (N, 4)"));
    }
    OwnedBoxSet::from_flat(boxes.as_slice()?, scores.as_slice()?).map_err(to_py_err)
}

fn to_index_array(py: Python<'_>, keep: Vec<usize>) -> Bound<'_, PyArray1<i64>> {
    let keep: Vec<i64> = keep.into_iter().map(|idx| idx as i64).collect();
    PyArray1::from_vec(py, keep)
}

/// Exact greedy NMS.
///
/// Args:
///     boxes: float32 array (N x 4), (x, y, w, h) with (x, y) the box center
///     scores: float32 array (N,)
///     iou_threshold: Suppress boxes with IoU strictly above this (default: 0.5)
///
/// Returns:
///     int64 array of kept indices, best score first
#[pyfunction]
#[pyo3(signature = (boxes, scores, iou_threshold = 0.5))]
fn nms<'py>(
    py: Python<'py>,
    boxes: PyReadonlyArray2<'py, f32>,
    scores: PyReadonlyArray1<'py, f32>,
    iou_threshold: f32,
) -> PyResult<Bound<'py, PyArray1<i64>>> {
    let set = box_set_from_arrays(&boxes, &scores)?;
    let keep = hashnms::nms(set.view(), iou_threshold).map_err(to_py_err)?;
    Ok(to_index_array(py, keep))
}

/// Hashed NMS with a single grid.
///
/// Args:
///     boxes: float32 array (N x 4)
///     scores: float32 array (N,)
///     w0, h0: Reference cell size (> 0)
///     alpha: Scale decay (> 0, != 1)
///     bx, by: Grid offsets in cells (default: 0.5)
#[pyfunction]
#[pyo3(signature = (boxes, scores, w0, h0, alpha, bx = 0.5, by = 0.5))]
#[allow(clippy::too_many_arguments)]
fn hnms<'py>(
    py: Python<'py>,
    boxes: PyReadonlyArray2<'py, f32>,
    scores: PyReadonlyArray1<'py, f32>,
    w0: f32,
    h0: f32,
    alpha: f32,
    bx: f32,
    by: f32,
) -> PyResult<Bound<'py, PyArray1<i64>>> {
    let set = box_set_from_arrays(&boxes, &scores)?;
    let keep =
        hashnms::hnms_with_params(set.view(), w0, h0, alpha, bx, by).map_err(to_py_err)?;
    Ok(to_index_array(py, keep))
}

/// One hashed suppression stage with a fixed grid.
#[pyclass]
#[derive(Clone)]
pub struct SingleHashNms {
    inner: RustSingleHashStage,
}

#[pymethods]
impl SingleHashNms {
    /// Create a stage; parameters are validated once here.
    #[new]
    #[pyo3(signature = (w0, h0, alpha, bx = 0.5, by = 0.5))]
    fn new(w0: f32, h0: f32, alpha: f32, bx: f32, by: f32) -> PyResult<Self> {
        let inner = RustSingleHashStage::new(w0, h0, alpha, bx, by).map_err(to_py_err)?;
        Ok(Self { inner })
    }

    /// Suppress boxes; returns indices local to the given arrays.
    fn __call__<'py>(
        &self,
        py: Python<'py>,
        boxes: PyReadonlyArray2<'py, f32>,
        scores: PyReadonlyArray1<'py, f32>,
    ) -> PyResult<Bound<'py, PyArray1<i64>>> {
        let set = box_set_from_arrays(&boxes, &scores)?;
        Ok(to_index_array(py, self.inner.apply(set.view())))
    }

    fn __repr__(&self) -> String {
        let grid = self.inner.grid();
        format!(
            "SingleHashNms(w0={}, h0={}, alpha={}, bx={}, by={})",
            grid.w0(),
            grid.h0(),
            grid.alpha(),
            grid.bx(),
            grid.by()
        )
    }
}

/// Chain of hashed stages with geometrically growing cells.
#[pyclass]
pub struct MultiHashNms {
    inner: RustMultiHashChain,
}

#[pymethods]
impl MultiHashNms {
    /// Create a chain.
    ///
    /// Args:
    ///     num: Number of stages (>= 1)
    ///     alpha: Scale decay shared by all stages (> 0, != 1)
    ///     parallel: Parallel bucket reduction (default: False)
    #[new]
    #[pyo3(signature = (num, alpha, parallel = false))]
    fn new(num: usize, alpha: f32, parallel: bool) -> PyResult<Self> {
        let inner = RustMultiHashChain::new(ChainConfig {
            num_stages: num,
            alpha,
            parallel,
        })
        .map_err(to_py_err)?;
        Ok(Self { inner })
    }

    /// Number of stages.
    #[getter]
    fn num_stages(&self) -> usize {
        self.inner.len()
    }

    /// Stages in application order.
    fn stages(&self) -> Vec<SingleHashNms> {
        self.inner
            .stages()
            .iter()
            .map(|stage| SingleHashNms { inner: *stage })
            .collect()
    }

    /// Suppress boxes; returns indices into the given arrays.
    fn __call__<'py>(
        &self,
        py: Python<'py>,
        boxes: PyReadonlyArray2<'py, f32>,
        scores: PyReadonlyArray1<'py, f32>,
    ) -> PyResult<Bound<'py, PyArray1<i64>>> {
        let set = box_set_from_arrays(&boxes, &scores)?;
        Ok(to_index_array(py, self.inner.apply(set.view())))
    }

    fn __len__(&self) -> usize {
        self.inner.len()
    }

    fn __repr__(&self) -> String {
        let cfg = self.inner.config();
        format!(
            "MultiHashNms(num={}, alpha={}, parallel={})",
            cfg.num_stages, cfg.alpha, cfg.parallel
        )
    }
}

/// IoU of two boxes given as (x, y, w, h) tuples.
#[pyfunction]
fn iou(a: (f32, f32, f32, f32), b: (f32, f32, f32, f32)) -> f32 {
    let a = hashnms::Rect::new(a.0, a.1, a.2, a.3);
    let b = hashnms::Rect::new(b.0, b.1, b.2, b.3);
    hashnms::iou(&a, &b)
}

/// Python module for hashnms box suppression.
#[pymodule]
fn _hashnms(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<SingleHashNms>()?;
    m.add_class::<MultiHashNms>()?;
    m.add_function(wrap_pyfunction!(nms, m)?)?;
    m.add_function(wrap_pyfunction!(hnms, m)?)?;
    m.add_function(wrap_pyfunction!(iou, m)?)?;

    m.add("__version__", env!("CARGO_PKG_VERSION"))?;

    Ok(())
}
