use serde::{Deserialize, Serialize};

use vah_core::{EquationOfState, HydroState, Thermodynamics};

// Glasma runs start the mean field at 15% of its equilibrium-consistent
// value.
const GLASMA_MEAN_FIELD_FACTOR: f64 = 0.15;

/// Initial-condition families supported by the stepper.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum InitialCondition {
    /// Isotropic equilibrium: `pl = pt = p(e0)`, mean field at its
    /// asymptotic value.
    Equilibrium,
    /// Glasma-like pressure asymmetry at fixed energy density.
    Glasma {
        /// Target `pl / pt` ratio of the initial state.
        pl_pt_ratio: f64,
    },
}

impl Default for InitialCondition {
    fn default() -> Self {
        InitialCondition::Equilibrium
    }
}

/// Builds the conserved state at `t0` for the given initial temperature
/// (in fm^-1) and condition. Transverse momenta vanish in both families.
pub fn initial_state(
    eos: &dyn EquationOfState,
    temperature: f64,
    t0: f64,
    condition: InitialCondition,
) -> HydroState {
    let e = eos.equilibrium_energy_density(temperature);
    let p = eos.equilibrium_pressure(e);

    let (pl, pt) = match condition {
        InitialCondition::Equilibrium => (p, p),
        InitialCondition::Glasma { pl_pt_ratio } => {
            // trace-consistent split with pl/pt equal to the requested ratio
            let pt = 3.0 / (2.0 + pl_pt_ratio) * e / 3.0;
            let pl = (3.0 - 6.0 / (2.0 + pl_pt_ratio)) * e / 3.0;
            (pl, pt)
        }
    };

    let thermo = Thermodynamics::compute(eos, e, pl, pt, t0);
    let mut b = thermo.beq + thermo.dbasy;
    if matches!(condition, InitialCondition::Glasma { .. }) {
        b *= GLASMA_MEAN_FIELD_FACTOR;
    }

    HydroState {
        ttt: e,
        ttx: 0.0,
        tty: 0.0,
        ttn: 0.0,
        pl,
        pt,
        b,
    }
}
