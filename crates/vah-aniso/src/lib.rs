#![deny(missing_docs)]
#![doc = "Reconstruction of primary variables from the conserved VAH state: the anisotropic-descriptor Newton solver and the inferred-variable root find."]

mod inferred;
mod solver;

pub use inferred::{ReconstructOpts, ReconstructionMethod, Reconstructor};
pub use solver::{AnisoSolver, SolverOpts};
