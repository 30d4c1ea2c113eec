#![deny(missing_docs)]
#![doc = "Boost-invariant evolution of the VAH state: constitutive right-hand sides, the Heun predictor-corrector stepper and the time-series recorder."]

mod flux;
mod init;
mod recorder;
mod stepper;

pub use flux::{FluxContext, FluxSystem, VahFlux};
pub use init::{initial_state, InitialCondition};
pub use recorder::{StateSample, TimeSeriesRecorder};
pub use stepper::{Evolution, EvolutionOpts, EvolutionSummary};
