use serde::{Deserialize, Serialize};

use crate::eos::EquationOfState;
use crate::DENOM_FLOOR;

/// Conserved state advanced by the evolution stepper: four energy-momentum
/// components, the two anisotropic pressures and the mean-field deviation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HydroState {
    /// Energy-like component `T^{tt}` of the stress-energy tensor.
    pub ttt: f64,
    /// Transverse momentum component `T^{tx}`.
    pub ttx: f64,
    /// Transverse momentum component `T^{ty}`.
    pub tty: f64,
    /// Rapidity-direction momentum component `T^{tn}`.
    pub ttn: f64,
    /// Longitudinal pressure.
    pub pl: f64,
    /// Transverse pressure.
    pub pt: f64,
    /// Generalized mean-field (bulk/quasiparticle) pressure-deviation variable.
    pub b: f64,
}

impl HydroState {
    /// Shear-stress measure `2 (pt - pl) / 3`.
    pub fn shear(&self) -> f64 {
        2.0 * (self.pt - self.pl) / 3.0
    }

    /// Bulk-pressure measure `(pl + 2 pt)/3 - p` relative to the equilibrium
    /// pressure `p`.
    pub fn bulk(&self, equilibrium_pressure: f64) -> f64 {
        (self.pl + 2.0 * self.pt) / 3.0 - equilibrium_pressure
    }

    /// Pressure anisotropy ratio `pl / pt`.
    pub fn plpt_ratio(&self) -> f64 {
        let denom = if self.pt.abs() < DENOM_FLOOR {
            DENOM_FLOOR.copysign(self.pt)
        } else {
            self.pt
        };
        self.pl / denom
    }

    /// Takes one explicit Euler step of size `dt` along `derivative`.
    pub fn euler(&self, derivative: &StateDerivative, dt: f64) -> HydroState {
        HydroState {
            ttt: self.ttt + dt * derivative.dttt,
            ttx: self.ttx + dt * derivative.dttx,
            tty: self.tty + dt * derivative.dtty,
            ttn: self.ttn + dt * derivative.dttn,
            pl: self.pl + dt * derivative.dpl,
            pt: self.pt + dt * derivative.dpt,
            b: self.b + dt * derivative.db,
        }
    }

    /// Component-wise arithmetic mean with `other` (the Heun average).
    pub fn average(&self, other: &HydroState) -> HydroState {
        HydroState {
            ttt: 0.5 * (self.ttt + other.ttt),
            ttx: 0.5 * (self.ttx + other.ttx),
            tty: 0.5 * (self.tty + other.tty),
            ttn: 0.5 * (self.ttn + other.ttn),
            pl: 0.5 * (self.pl + other.pl),
            pt: 0.5 * (self.pt + other.pt),
            b: 0.5 * (self.b + other.b),
        }
    }
}

/// Proper-time derivatives of the seven conserved components.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StateDerivative {
    /// Derivative of `T^{tt}`.
    pub dttt: f64,
    /// Derivative of `T^{tx}`.
    pub dttx: f64,
    /// Derivative of `T^{ty}`.
    pub dtty: f64,
    /// Derivative of `T^{tn}`.
    pub dttn: f64,
    /// Derivative of the longitudinal pressure.
    pub dpl: f64,
    /// Derivative of the transverse pressure.
    pub dpt: f64,
    /// Derivative of the mean-field deviation variable.
    pub db: f64,
}

/// Momentum-space anisotropy descriptor: scale parameter and the two shape
/// parameters squeezing the distribution along its principal directions.
///
/// Always recomputed from the macroscopic targets; the previous step's values
/// act only as the next solve's initial guess.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnisoVars {
    /// Momentum scale parameter (positive).
    pub lambda: f64,
    /// Transverse shape parameter (positive).
    pub ax: f64,
    /// Longitudinal shape parameter (positive).
    pub az: f64,
}

impl AnisoVars {
    /// Equilibrium-consistent seed: `lambda = T`, unit shape parameters.
    pub fn equilibrium_seed(temperature: f64) -> Self {
        Self {
            lambda: temperature,
            ax: 1.0,
            az: 1.0,
        }
    }

    /// Reduced effective mass `m / lambda` fed to the moment integrals.
    pub fn mbar(&self, mass: f64) -> f64 {
        mass / self.lambda
    }

    /// Whether all three parameters sit strictly inside the physical domain.
    pub fn is_physical(&self) -> bool {
        self.lambda > 0.0 && self.ax > 0.0 && self.az > 0.0
    }
}

/// Primary hydrodynamic variables recovered from the conserved components.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InferredVars {
    /// Time component of the four-velocity.
    pub ut: f64,
    /// Transverse `x` component of the four-velocity.
    pub ux: f64,
    /// Transverse `y` component of the four-velocity.
    pub uy: f64,
    /// Rapidity component of the four-velocity.
    pub un: f64,
    /// Local-rest-frame energy density.
    pub e: f64,
    /// Equilibrium pressure at that energy density.
    pub p: f64,
}

impl InferredVars {
    /// Static fluid cell: unit time component, vanishing spatial flow.
    pub fn at_rest(e: f64, p: f64) -> Self {
        Self {
            ut: 1.0,
            ux: 0.0,
            uy: 0.0,
            un: 0.0,
            e,
            p,
        }
    }
}

/// Derived thermodynamic and transport quantities, recomputed from the
/// accepted state after every step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thermodynamics {
    /// Effective temperature `T(e)`.
    pub temperature: f64,
    /// Speed of sound squared.
    pub cs2: f64,
    /// Entropy density `(e + p) / T`.
    pub entropy: f64,
    /// Equilibrium mean-field reference `B_eq(T)`.
    pub beq: f64,
    /// Quasiparticle effective mass `T z(T)`.
    pub mass: f64,
    /// Shear relaxation time.
    pub taupi: f64,
    /// Bulk relaxation time.
    pub taubulk: f64,
    /// Navier-Stokes shear reference value.
    pub pi_ns: f64,
    /// Navier-Stokes bulk reference value.
    pub bulk_ns: f64,
    /// Asymptotic mean-field deviation.
    pub dbasy: f64,
}

impl Thermodynamics {
    /// Computes the full derived set from the energy density, the anisotropic
    /// pressures and the proper time.
    pub fn compute(
        eos: &dyn EquationOfState,
        e: f64,
        pl: f64,
        pt: f64,
        time: f64,
    ) -> Thermodynamics {
        let p = eos.equilibrium_pressure(e);
        let temperature = eos.effective_temperature(e);
        let t_safe = temperature.max(DENOM_FLOOR);
        let entropy = (e + p) / t_safe;
        let cs2 = eos.speed_of_sound_squared(e);

        let etas = eos.shear_viscosity_to_entropy(temperature);
        let zetas = eos.bulk_viscosity_to_entropy(temperature);
        let taupi = entropy * etas / eos.beta_shear(temperature).max(DENOM_FLOOR);
        let taubulk = entropy * zetas / eos.beta_bulk(temperature).max(DENOM_FLOOR);

        let pi_ns = 4.0 * (e + p) / (3.0 * t_safe * time) * etas;
        let bulk_ns = -(e + p) / (time * t_safe) * zetas;

        let beq = eos.equilibrium_bquasi(temperature);
        let mass = temperature * eos.z_quasiparticle(temperature);

        let msq = mass * mass;
        let dbasy = if msq > DENOM_FLOOR {
            let mdmde = eos.mdmde_quasiparticle(e);
            let bulk = (pl + 2.0 * pt) / 3.0 - p;
            -3.0 * taubulk * mdmde * (e + pl) * bulk
                / (time * msq)
                / (1.0 + 4.0 * taubulk * mdmde * (e + pl) / (time * msq))
        } else {
            0.0
        };

        Thermodynamics {
            temperature,
            cs2,
            entropy,
            beq,
            mass,
            taupi,
            taubulk,
            pi_ns,
            bulk_ns,
            dbasy,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heun_average_is_component_wise() {
        let a = HydroState {
            ttt: 2.0,
            ttx: 0.0,
            tty: 1.0,
            ttn: 0.5,
            pl: 0.4,
            pt: 0.8,
            b: -0.1,
        };
        let b = HydroState {
            ttt: 4.0,
            ttx: 2.0,
            tty: 0.0,
            ttn: 1.5,
            pl: 0.6,
            pt: 0.2,
            b: 0.3,
        };
        let mid = a.average(&b);
        assert_eq!(mid.ttt, 3.0);
        assert_eq!(mid.ttx, 1.0);
        assert_eq!(mid.pl, 0.5);
        assert_eq!(mid.b, 0.1);
    }

    #[test]
    fn shear_and_bulk_vanish_at_isotropy() {
        let state = HydroState {
            ttt: 1.0,
            ttx: 0.0,
            tty: 0.0,
            ttn: 0.0,
            pl: 0.25,
            pt: 0.25,
            b: 0.0,
        };
        assert_eq!(state.shear(), 0.0);
        assert!(state.bulk(0.25).abs() < 1e-15);
        assert_eq!(state.plpt_ratio(), 1.0);
    }
}
