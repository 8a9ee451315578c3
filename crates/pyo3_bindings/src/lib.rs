//! PyO3 bindings for the round reconstruction pipeline.
//!
//! Exposes match processing to Python training pipelines:
//! - Round summaries for a single match file
//! - Parallel batch runs with accepted rows and failed paths

use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;

use rounds_batch::{BatchOutput, BatchRunner, Rejection as RustRejection};
use rounds_core::{Config as RustConfig, Error as RustError, RoundSummary as RustRoundSummary};
use rounds_ingestion::JsonDumpDecoder;
use std::path::{Path, PathBuf};
use std::sync::Arc;

fn to_py_err(err: RustError) -> PyErr {
    match &err {
        RustError::Config(_) | RustError::Io(_) | RustError::Json(_) => {
            PyRuntimeError::new_err(err.to_string())
        }
        _ => PyValueError::new_err(err.to_string()),
    }
}

// ============================================================================
// Python-exposed Types
// ============================================================================

/// One reconstructed round of an accepted match.
#[pyclass]
#[derive(Clone)]
pub struct RoundSummary {
    #[pyo3(get)]
    pub round: u32,
    #[pyo3(get)]
    pub round_winner: i32,
    #[pyo3(get)]
    pub round_reason: i32,
    #[pyo3(get)]
    pub team_ct_name: String,
    #[pyo3(get)]
    pub team_t_name: String,
    #[pyo3(get)]
    pub team_ct_players: Vec<String>,
    #[pyo3(get)]
    pub team_t_players: Vec<String>,
    #[pyo3(get)]
    pub team_ct_current_equip_value: Option<u64>,
    #[pyo3(get)]
    pub team_t_current_equip_value: Option<u64>,
    #[pyo3(get)]
    pub map_name: Option<String>,
}

#[pymethods]
impl RoundSummary {
    fn __repr__(&self) -> String {
        format!(
            "RoundSummary(round={}, winner={}, reason={}, ct_equip={:?}, t_equip={:?}, map={:?})",
            self.round,
            self.round_winner,
            self.round_reason,
            self.team_ct_current_equip_value,
            self.team_t_current_equip_value,
            self.map_name
        )
    }
}

impl From<RustRoundSummary> for RoundSummary {
    fn from(r: RustRoundSummary) -> Self {
        RoundSummary {
            round: r.round,
            round_winner: r.round_winner,
            round_reason: r.round_reason,
            team_ct_name: r.team_ct_name,
            team_t_name: r.team_t_name,
            team_ct_players: r.team_ct_players,
            team_t_players: r.team_t_players,
            team_ct_current_equip_value: r.team_ct_current_equip_value,
            team_t_current_equip_value: r.team_t_current_equip_value,
            map_name: r.map_name,
        }
    }
}

/// A match file that contributed no rows.
#[pyclass]
#[derive(Clone)]
pub struct Rejection {
    #[pyo3(get)]
    pub path: String,
    /// Failure kind, e.g. `"decode_failure"` or `"invalid_opening_economy"`.
    #[pyo3(get)]
    pub kind: String,
    #[pyo3(get)]
    pub message: String,
}

#[pymethods]
impl Rejection {
    fn __repr__(&self) -> String {
        format!("Rejection(path={:?}, kind={}, message={:?})", self.path, self.kind, self.message)
    }
}

impl From<RustRejection> for Rejection {
    fn from(r: RustRejection) -> Self {
        Rejection {
            path: r.path.display().to_string(),
            kind: r.kind.as_str().to_string(),
            message: r.message,
        }
    }
}

/// Result of a batch run.
#[pyclass]
pub struct BatchResult {
    #[pyo3(get)]
    pub accepted: Vec<RoundSummary>,
    #[pyo3(get)]
    pub failed: Vec<String>,
    #[pyo3(get)]
    pub rejections: Vec<Rejection>,
    #[pyo3(get)]
    pub rounds_emitted: usize,
    #[pyo3(get)]
    pub elapsed_seconds: f64,
}

#[pymethods]
impl BatchResult {
    fn __repr__(&self) -> String {
        format!(
            "BatchResult(accepted_rounds={}, failed_files={}, elapsed={:.2}s)",
            self.accepted.len(),
            self.failed.len(),
            self.elapsed_seconds
        )
    }
}

impl From<BatchOutput> for BatchResult {
    fn from(out: BatchOutput) -> Self {
        BatchResult {
            rounds_emitted: out.report.rounds_emitted,
            elapsed_seconds: out.report.elapsed_seconds(),
            accepted: out.accepted.into_iter().map(Into::into).collect(),
            failed: out.failed.iter().map(|p| p.display().to_string()).collect(),
            rejections: out.rejections.into_iter().map(Into::into).collect(),
        }
    }
}

// ============================================================================
// Pipeline Class
// ============================================================================

/// Reusable pipeline over JSON tick dumps.
#[pyclass]
pub struct PyRoundPipeline {
    inner: BatchRunner,
}

impl PyRoundPipeline {
    fn build(config_path: Option<&str>, workers: Option<usize>) -> PyResult<Self> {
        let mut config = match config_path {
            Some(path) => RustConfig::from_json_file(path).map_err(to_py_err)?,
            None => RustConfig::default(),
        };
        if let Some(workers) = workers {
            config.batch.workers = workers;
        }
        let inner = BatchRunner::from_config(Arc::new(JsonDumpDecoder::new()), &config)
            .map_err(to_py_err)?;
        Ok(PyRoundPipeline { inner })
    }
}

#[pymethods]
impl PyRoundPipeline {
    #[new]
    #[pyo3(signature = (config_path=None, workers=None))]
    fn new(config_path: Option<&str>, workers: Option<usize>) -> PyResult<Self> {
        Self::build(config_path, workers)
    }

    /// Round summaries of one match. Raises `ValueError` if the match is rejected.
    fn process_demo(&self, py: Python<'_>, path: &str) -> PyResult<Vec<RoundSummary>> {
        let rounds = py
            .allow_threads(|| self.inner.pipeline().run(Path::new(path)))
            .map_err(to_py_err)?;
        Ok(rounds.into_iter().map(Into::into).collect())
    }

    /// Process many matches in parallel. Never raises for per-file failures.
    fn run_batch(&self, py: Python<'_>, paths: Vec<String>) -> BatchResult {
        let paths: Vec<PathBuf> = paths.into_iter().map(PathBuf::from).collect();
        py.allow_threads(|| self.inner.run(&paths)).into()
    }

    /// Number of worker threads.
    fn workers(&self) -> usize {
        self.inner.workers()
    }
}

// ============================================================================
// Module Functions
// ============================================================================

/// Round summaries of one match using the default configuration.
#[pyfunction]
#[pyo3(signature = (path, config_path=None))]
fn process_demo(
    py: Python<'_>,
    path: &str,
    config_path: Option<&str>,
) -> PyResult<Vec<RoundSummary>> {
    PyRoundPipeline::build(config_path, Some(1))?.process_demo(py, path)
}

/// Process many matches in parallel (`workers = 0` uses every core).
#[pyfunction]
#[pyo3(signature = (paths, workers=0, config_path=None))]
fn run_batch(
    py: Python<'_>,
    paths: Vec<String>,
    workers: usize,
    config_path: Option<&str>,
) -> PyResult<BatchResult> {
    Ok(PyRoundPipeline::build(config_path, Some(workers))?.run_batch(py, paths))
}

// ============================================================================
// Module Definition
// ============================================================================

/// Round reconstruction for match telemetry.
#[pymodule]
fn round_recon(m: &Bound<'_, PyModule>) -> PyResult<()> {
    // Types
    m.add_class::<RoundSummary>()?;
    m.add_class::<Rejection>()?;
    m.add_class::<BatchResult>()?;

    // Pipeline
    m.add_class::<PyRoundPipeline>()?;
    m.add_function(wrap_pyfunction!(process_demo, m)?)?;
    m.add_function(wrap_pyfunction!(run_batch, m)?)?;

    Ok(())
}
