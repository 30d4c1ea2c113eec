#![deny(missing_docs)]
#![doc = "Core data types, error taxonomy and the equation-of-state contract for the VAH engine."]

pub mod eos;
pub mod errors;
mod state;

pub use eos::EquationOfState;
pub use errors::{LoadError, ReconstructError, SolveError, StepStage, VahError};
pub use state::{AnisoVars, HydroState, InferredVars, StateDerivative, Thermodynamics};

/// Conversion factor from GeV to inverse femtometres (natural units).
pub const GEV_TO_INVERSE_FM: f64 = 5.067731;

/// Floor substituted for denominators that are numerically at zero.
///
/// Expected only at pathological parameter boundaries; substituting keeps the
/// evaluation total instead of propagating an error.
pub const DENOM_FLOOR: f64 = 1.0e-16;
