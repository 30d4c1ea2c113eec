use std::sync::Arc;

use serde::{Deserialize, Serialize};

use vah_core::{EquationOfState, HydroState, InferredVars, ReconstructError, DENOM_FLOOR};

// Clamp applied when a Newton update drives the candidate energy density
// out of the positive domain.
const ENERGY_FLOOR: f64 = 1.0e-7;

fn default_max_iters() -> usize {
    100
}

fn default_tolerance() -> f64 {
    1.0e-7
}

/// Strategy for recovering the primary variables from the conserved
/// components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ReconstructionMethod {
    /// Damped Newton root find on the energy-density consistency equation;
    /// supports nonzero transverse momentum.
    #[default]
    GeneralNewton,
    /// Degenerate boost-invariant closure: trivial flow, `e` read directly
    /// off the energy component. Valid for purely longitudinal expansion
    /// with no transverse dynamics; ignores the momentum components and the
    /// mean-field variable entirely.
    BoostInvariant,
}

/// Controls for the inferred-variable reconstruction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReconstructOpts {
    /// Strategy to apply.
    #[serde(default)]
    pub method: ReconstructionMethod,
    /// Maximum root-find iterations.
    #[serde(default = "default_max_iters")]
    pub max_iters: usize,
    /// Relative tolerance on the energy-density update.
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
}

impl Default for ReconstructOpts {
    fn default() -> Self {
        Self {
            method: ReconstructionMethod::default(),
            max_iters: default_max_iters(),
            tolerance: default_tolerance(),
        }
    }
}

/// Recovers `(ut, ux, uy, un, e, p)` from the conserved state, consistent
/// with the ideal-fluid decomposition.
#[derive(Clone)]
pub struct Reconstructor {
    eos: Arc<dyn EquationOfState>,
    opts: ReconstructOpts,
}

impl std::fmt::Debug for Reconstructor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reconstructor")
            .field("opts", &self.opts)
            .finish_non_exhaustive()
    }
}

impl Reconstructor {
    /// Creates a reconstructor over the shared medium.
    pub fn new(eos: Arc<dyn EquationOfState>, opts: ReconstructOpts) -> Self {
        Self { eos, opts }
    }

    /// Strategy in effect.
    pub fn method(&self) -> ReconstructionMethod {
        self.opts.method
    }

    /// Recovers the inferred variables at proper time `time`.
    pub fn reconstruct(
        &self,
        state: &HydroState,
        time: f64,
    ) -> Result<InferredVars, ReconstructError> {
        match self.opts.method {
            ReconstructionMethod::BoostInvariant => Ok(self.boost_invariant(state)),
            ReconstructionMethod::GeneralNewton => self.general_newton(state, time),
        }
    }

    fn boost_invariant(&self, state: &HydroState) -> InferredVars {
        let e = state.ttt.max(ENERGY_FLOOR);
        InferredVars::at_rest(e, self.eos.equilibrium_pressure(e))
    }

    fn general_newton(
        &self,
        state: &HydroState,
        time: f64,
    ) -> Result<InferredVars, ReconstructError> {
        let m0 = state.ttt;
        let mvec2 =
            state.ttx * state.ttx + state.tty * state.tty + time * time * state.ttn * state.ttn;
        if mvec2 < DENOM_FLOOR {
            // no transverse momentum: the consistency equation collapses to
            // the degenerate closure
            return Ok(self.boost_invariant(state));
        }

        let mut estar = m0.max(ENERGY_FLOOR);
        let mut rel = f64::MAX;
        for _ in 0..self.opts.max_iters {
            let p = self.eos.equilibrium_pressure(estar);
            let cs2 = self.eos.speed_of_sound_squared(estar);
            let bulk = (state.pl + 2.0 * state.pt) / 3.0 - p;
            let mut denom = m0 + p + bulk;
            if denom.abs() < DENOM_FLOOR {
                denom = DENOM_FLOOR.copysign(denom);
            }
            let f = estar + mvec2 / denom - m0;
            let mut fprime = 1.0 - cs2 * mvec2 / (denom * denom);
            if fprime.abs() < DENOM_FLOOR {
                fprime = DENOM_FLOOR;
            }
            let de = -f / fprime;
            estar += de;
            if estar <= 0.0 {
                estar = ENERGY_FLOOR;
            }
            rel = (de / estar).abs();
            if rel <= self.opts.tolerance {
                return Ok(self.extract_flow(state, time, estar));
            }
        }

        Err(ReconstructError::NoConvergence {
            iterations: self.opts.max_iters,
            residual: rel,
        })
    }

    fn extract_flow(&self, state: &HydroState, time: f64, e: f64) -> InferredVars {
        let p = self.eos.equilibrium_pressure(e);
        let denom = (e + state.pt).max(DENOM_FLOOR);
        let ut = ((state.ttt + state.pt) / denom).max(1.0).sqrt();
        let ux = state.ttx / (denom * ut);
        let uy = state.tty / (denom * ut);
        let un = state.ttn / (denom * ut * (time * time).max(DENOM_FLOOR));
        InferredVars {
            ut,
            ux,
            uy,
            un,
            e,
            p,
        }
    }
}
