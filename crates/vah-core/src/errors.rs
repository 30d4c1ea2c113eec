//! Structured error types shared across the VAH crates.
//!
//! Every fatal numerical failure carries enough context to identify the
//! failing component and the approximate location (row, iteration, step).

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure while loading the quadrature resource. Fatal at startup; no
/// partially populated table is ever observable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Error)]
pub enum LoadError {
    /// The resource file could not be opened.
    #[error("quadrature resource missing: {path} ({detail})")]
    ResourceMissing {
        /// Path that was attempted.
        path: String,
        /// Underlying I/O diagnostic.
        detail: String,
    },
    /// A logical row did not parse into an index plus two real numbers.
    #[error("malformed quadrature entry at row {row} (order {order}, point {point})")]
    MalformedEntry {
        /// One-based row number within the resource.
        row: usize,
        /// Order block the row belongs to.
        order: usize,
        /// Point index within the order block.
        point: usize,
    },
}

/// Failure of the anisotropic-variable Newton solve. Fatal to the run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Error)]
pub enum SolveError {
    /// The iteration budget was exhausted before the tolerance was met.
    #[error("anisotropic solve did not converge after {iterations} iterations (residual {residual:.3e})")]
    NoConvergence {
        /// Iterations consumed.
        iterations: usize,
        /// Scaled residual norm at exit.
        residual: f64,
    },
    /// An iterate drove the anisotropy descriptor out of its physical domain.
    #[error(
        "non-physical iterate at iteration {iteration}: lambda = {lambda:.6e}, ax = {ax:.6e}, az = {az:.6e}"
    )]
    NonPhysical {
        /// Iteration at which the domain was left.
        iteration: usize,
        /// Offending scale parameter.
        lambda: f64,
        /// Offending transverse shape parameter.
        ax: f64,
        /// Offending longitudinal shape parameter.
        az: f64,
    },
}

/// Failure of the inferred-variable reconstruction. Fatal to the run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Error)]
pub enum ReconstructError {
    /// The energy-density root find did not reach its tolerance.
    #[error("energy-density reconstruction did not converge after {iterations} iterations (residual {residual:.3e})")]
    NoConvergence {
        /// Iterations consumed.
        iterations: usize,
        /// Relative update size at exit.
        residual: f64,
    },
}

/// Evolution stage in which a fatal failure occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStage {
    /// Before the first step, while preparing the initial state.
    Initialization,
    /// The predictor (first Euler) half of a step.
    Predictor,
    /// The corrector (second Euler plus averaging) half of a step.
    Corrector,
}

impl std::fmt::Display for StepStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StepStage::Initialization => write!(f, "initialization"),
            StepStage::Predictor => write!(f, "predictor stage"),
            StepStage::Corrector => write!(f, "corrector stage"),
        }
    }
}

/// Canonical error type for the VAH engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Error)]
#[serde(tag = "family", content = "detail")]
pub enum VahError {
    /// Quadrature table loading errors.
    #[error("quadrature error: {0}")]
    Quadrature(#[from] LoadError),
    /// Anisotropic-variable solver errors.
    #[error("solver error: {0}")]
    Solver(#[from] SolveError),
    /// Inferred-variable reconstruction errors.
    #[error("reconstruction error: {0}")]
    Reconstruct(#[from] ReconstructError),
    /// A solver or reconstruction failure during evolution, tagged with the
    /// step index and proper time at which it surfaced.
    #[error("step {step} (t = {time:.4} fm), {stage}: {source}")]
    Step {
        /// Zero-based index of the failing step.
        step: usize,
        /// Proper time at which the stage ran.
        time: f64,
        /// Stage that failed.
        stage: StepStage,
        /// Underlying failure.
        #[source]
        source: Box<VahError>,
    },
    /// Run configuration errors.
    #[error("config error: {detail}")]
    Config {
        /// Human readable diagnostic.
        detail: String,
    },
    /// Output artifact errors.
    #[error("output error at {path}: {detail}")]
    Output {
        /// Path being written.
        path: String,
        /// Underlying I/O diagnostic.
        detail: String,
    },
}

impl VahError {
    /// Wraps a failure with its evolution-step location.
    pub fn at_step(step: usize, time: f64, stage: StepStage, source: impl Into<VahError>) -> Self {
        VahError::Step {
            step,
            time,
            stage,
            source: Box::new(source.into()),
        }
    }
}
