#![deny(missing_docs)]
#![doc = "Equation-of-state implementations for the VAH engine: a conformal massless gas and a constant-z quasiparticle gas."]

use std::f64::consts::PI;

use vah_core::{EquationOfState, DENOM_FLOOR};
use vah_quad::MomentEvaluator;

/// Default degeneracy factor of the deconfined medium: gluons plus three
/// light quark flavors, `2 (Nc^2 - 1) + 7/2 Nc Nf`.
pub const DEFAULT_DEGENERACY: f64 = 47.5;

/// Massless ideal (conformal) gas with classical statistics.
///
/// `e = 3 g T^4 / pi^2`, `p = e/3`, `cs^2 = 1/3`; the quasiparticle sector
/// is empty (`z = 0`, vanishing mean field). Viscosity-to-entropy ratios are
/// constants supplied at construction, so the zero-viscosity ideal limit is
/// one configuration away.
#[derive(Debug, Clone)]
pub struct ConformalEos {
    degeneracy: f64,
    eta_over_s: f64,
    zeta_over_s: f64,
}

impl ConformalEos {
    /// Creates the conformal medium with the given degeneracy and constant
    /// viscosity ratios.
    pub fn new(degeneracy: f64, eta_over_s: f64, zeta_over_s: f64) -> Self {
        Self {
            degeneracy,
            eta_over_s,
            zeta_over_s,
        }
    }

    /// Ideal (non-dissipative) conformal medium.
    pub fn ideal(degeneracy: f64) -> Self {
        Self::new(degeneracy, 0.0, 0.0)
    }

    fn energy_coefficient(&self) -> f64 {
        3.0 * self.degeneracy / (PI * PI)
    }
}

impl Default for ConformalEos {
    fn default() -> Self {
        Self::new(DEFAULT_DEGENERACY, 0.2, 0.0)
    }
}

impl EquationOfState for ConformalEos {
    fn equilibrium_energy_density(&self, t: f64) -> f64 {
        self.energy_coefficient() * t.powi(4)
    }

    fn equilibrium_pressure(&self, e: f64) -> f64 {
        e / 3.0
    }

    fn speed_of_sound_squared(&self, _e: f64) -> f64 {
        1.0 / 3.0
    }

    fn effective_temperature(&self, e: f64) -> f64 {
        (e.max(0.0) / self.energy_coefficient()).powf(0.25)
    }

    fn equilibrium_bquasi(&self, _t: f64) -> f64 {
        0.0
    }

    fn shear_viscosity_to_entropy(&self, _t: f64) -> f64 {
        self.eta_over_s
    }

    fn bulk_viscosity_to_entropy(&self, _t: f64) -> f64 {
        self.zeta_over_s
    }

    fn beta_shear(&self, t: f64) -> f64 {
        // RTA value: eta / tau_pi = (e + p) / 5
        let e = self.equilibrium_energy_density(t);
        4.0 * e / 15.0
    }

    fn beta_bulk(&self, _t: f64) -> f64 {
        // vanishes with (1/3 - cs^2)^2 in a conformal medium
        0.0
    }

    fn z_quasiparticle(&self, _t: f64) -> f64 {
        0.0
    }

    fn mdmde_quasiparticle(&self, _e: f64) -> f64 {
        0.0
    }
}

/// Quasiparticle gas with a temperature-proportional effective mass
/// `m = z0 T`.
///
/// A constant mass-to-temperature ratio keeps the medium scale invariant:
/// every equilibrium quantity is a pure power of `T` with coefficients fixed
/// by the isotropic quadrature moments at `mbar = z0`, and the speed of
/// sound is a constant below `1/3`. The mean-field reference `B_eq` follows
/// from thermodynamic consistency of the running mass.
#[derive(Debug, Clone)]
pub struct QuasiparticleEos {
    z0: f64,
    eta_over_s: f64,
    zeta_over_s: f64,
    energy_coefficient: f64,
    pressure_coefficient: f64,
    inverse_energy_coefficient: f64,
}

impl QuasiparticleEos {
    /// Creates the quasiparticle medium, fixing the dimensionless
    /// equilibrium coefficients by quadrature at `mbar = z0`.
    pub fn new(z0: f64, eta_over_s: f64, zeta_over_s: f64, evaluator: &MomentEvaluator) -> Self {
        Self {
            z0,
            eta_over_s,
            zeta_over_s,
            energy_coefficient: evaluator.i20(1.0, z0),
            pressure_coefficient: evaluator.i21(1.0, z0),
            inverse_energy_coefficient: evaluator.i00(1.0, z0),
        }
    }
}

impl EquationOfState for QuasiparticleEos {
    fn equilibrium_energy_density(&self, t: f64) -> f64 {
        self.energy_coefficient * t.powi(4)
    }

    fn equilibrium_pressure(&self, e: f64) -> f64 {
        self.pressure_coefficient / self.energy_coefficient * e
    }

    fn speed_of_sound_squared(&self, _e: f64) -> f64 {
        self.pressure_coefficient / self.energy_coefficient
    }

    fn effective_temperature(&self, e: f64) -> f64 {
        (e.max(0.0) / self.energy_coefficient).powf(0.25)
    }

    fn equilibrium_bquasi(&self, t: f64) -> f64 {
        // dB/dT = -z0^2 T I00(T) integrates to -(z0^2/4) I00-coefficient T^4
        -0.25 * self.z0 * self.z0 * self.inverse_energy_coefficient * t.powi(4)
    }

    fn shear_viscosity_to_entropy(&self, _t: f64) -> f64 {
        self.eta_over_s
    }

    fn bulk_viscosity_to_entropy(&self, _t: f64) -> f64 {
        self.zeta_over_s
    }

    fn beta_shear(&self, t: f64) -> f64 {
        let e = self.equilibrium_energy_density(t);
        let p = self.equilibrium_pressure(e);
        (e + p) / 5.0
    }

    fn beta_bulk(&self, t: f64) -> f64 {
        let e = self.equilibrium_energy_density(t);
        let p = self.equilibrium_pressure(e);
        let deviation = 1.0 / 3.0 - self.speed_of_sound_squared(e);
        15.0 * deviation * deviation * (e + p)
    }

    fn z_quasiparticle(&self, _t: f64) -> f64 {
        self.z0
    }

    fn mdmde_quasiparticle(&self, e: f64) -> f64 {
        // m dm/de for m = z0 T and e = c_e T^4
        self.z0 * self.z0 / (4.0 * (self.energy_coefficient * e).sqrt().max(DENOM_FLOOR))
    }
}
