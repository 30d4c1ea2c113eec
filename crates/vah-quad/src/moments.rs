use std::f64::consts::PI;
use std::sync::Arc;

use crate::table::{QuadratureTable, QUADRATURE_POINTS};

// Radial Laguerre order per integral family, matched to the integrand's
// large-momentum power once the angular factor is split off.
const ORDER_ENERGY: usize = 2;
const ORDER_PRESSURE: usize = 3;
const ORDER_MASS_COUPLING: usize = 1;

// Below this ratio of the anisotropy combination to the radial scale the
// closed-form angular factors lose too many digits to cancellation; switch
// to their series expansions.
const ANGULAR_SERIES_THRESHOLD: f64 = 1.0e-4;

/// Evaluator for the momentum-space moment integrals of a squeezed
/// quasiparticle distribution.
///
/// All moments are weighted sums over the shared quadrature table: the
/// radial integral is a generalized Gauss-Laguerre sum at a fixed order, the
/// angular integral is folded in analytically per node. Calls are pure; the
/// table is read-only for the process lifetime.
#[derive(Debug, Clone)]
pub struct MomentEvaluator {
    table: Arc<QuadratureTable>,
    degeneracy: f64,
}

impl MomentEvaluator {
    /// Creates an evaluator over the shared table with the medium's
    /// degeneracy factor.
    pub fn new(table: Arc<QuadratureTable>, degeneracy: f64) -> Self {
        Self { table, degeneracy }
    }

    /// Degeneracy factor carried into every moment.
    pub fn degeneracy(&self) -> f64 {
        self.degeneracy
    }

    fn sum(&self, order: usize, integrand: impl Fn(f64) -> f64) -> f64 {
        let mut total = 0.0;
        for point in 0..QUADRATURE_POINTS {
            total += self.table.weight(order, point) * integrand(self.table.node(order, point));
        }
        total
    }

    /// Energy moment of the anisotropic distribution.
    pub fn ea(&self, lambda: f64, ax: f64, az: f64, mbar: f64) -> f64 {
        let prefactor = self.degeneracy * ax * ax * az * lambda.powi(4) / (4.0 * PI * PI);
        prefactor * self.sum(ORDER_ENERGY, |p| {
            let (c, d) = anisotropy_split(p, ax, az, mbar);
            boltzmann_tail(p, mbar) * angular_energy(c, d)
        })
    }

    /// Longitudinal-pressure moment of the anisotropic distribution.
    pub fn pla(&self, lambda: f64, ax: f64, az: f64, mbar: f64) -> f64 {
        let prefactor = self.degeneracy * ax * ax * az.powi(3) * lambda.powi(4) / (4.0 * PI * PI);
        prefactor * self.sum(ORDER_PRESSURE, |p| {
            let (c, d) = anisotropy_split(p, ax, az, mbar);
            p * boltzmann_tail(p, mbar) * angular_longitudinal(c, d)
        })
    }

    /// Transverse-pressure moment of the anisotropic distribution.
    pub fn pta(&self, lambda: f64, ax: f64, az: f64, mbar: f64) -> f64 {
        let prefactor = self.degeneracy * ax.powi(4) * az * lambda.powi(4) / (8.0 * PI * PI);
        prefactor * self.sum(ORDER_PRESSURE, |p| {
            let (c, d) = anisotropy_split(p, ax, az, mbar);
            p * boltzmann_tail(p, mbar) * (angular_inverse(c, d) - angular_longitudinal(c, d))
        })
    }

    /// Auxiliary moment `I240` (fourth longitudinal power over cubed energy);
    /// the free-streaming coupling of the longitudinal pressure.
    pub fn i240(&self, lambda: f64, ax: f64, az: f64, mbar: f64) -> f64 {
        let prefactor = self.degeneracy * ax * ax * az.powi(5) * lambda.powi(4) / (4.0 * PI * PI);
        prefactor * self.sum(ORDER_PRESSURE, |p| {
            let (c, d) = anisotropy_split(p, ax, az, mbar);
            p.powi(3) * boltzmann_tail(p, mbar) * angular_l4_cubed(c, d)
        })
    }

    /// Auxiliary moment `I221` (mixed longitudinal-transverse over cubed
    /// energy); the free-streaming coupling of the transverse pressure.
    pub fn i221(&self, lambda: f64, ax: f64, az: f64, mbar: f64) -> f64 {
        let prefactor = self.degeneracy * ax.powi(4) * az.powi(3) * lambda.powi(4) / (8.0 * PI * PI);
        prefactor * self.sum(ORDER_PRESSURE, |p| {
            let (c, d) = anisotropy_split(p, ax, az, mbar);
            p.powi(3) * boltzmann_tail(p, mbar) * (angular_l2_cubed(c, d) - angular_l4_cubed(c, d))
        })
    }

    /// Auxiliary moment `I020`; the quasiparticle mass coupling of the
    /// longitudinal pressure.
    pub fn i020(&self, lambda: f64, ax: f64, az: f64, mbar: f64) -> f64 {
        let prefactor = self.degeneracy * ax * ax * az.powi(3) * lambda * lambda / (4.0 * PI * PI);
        prefactor * self.sum(ORDER_MASS_COUPLING, |p| {
            let (c, d) = anisotropy_split(p, ax, az, mbar);
            p.powi(3) * boltzmann_tail(p, mbar) * angular_l2_cubed(c, d)
        })
    }

    /// Auxiliary moment `I001`; the quasiparticle mass coupling of the
    /// transverse pressure.
    pub fn i001(&self, lambda: f64, ax: f64, az: f64, mbar: f64) -> f64 {
        let prefactor = self.degeneracy * ax.powi(4) * az * lambda * lambda / (8.0 * PI * PI);
        prefactor * self.sum(ORDER_MASS_COUPLING, |p| {
            let (c, d) = anisotropy_split(p, ax, az, mbar);
            p.powi(3) * boltzmann_tail(p, mbar) * (angular_inv_cubed(c, d) - angular_l2_cubed(c, d))
        })
    }

    /// Auxiliary moment `I000` (inverse-energy moment); the mean-field
    /// coupling.
    pub fn i000(&self, lambda: f64, ax: f64, az: f64, mbar: f64) -> f64 {
        let prefactor = self.degeneracy * ax * ax * az * lambda * lambda / (4.0 * PI * PI);
        prefactor * self.sum(ORDER_MASS_COUPLING, |p| {
            let (c, d) = anisotropy_split(p, ax, az, mbar);
            p * boltzmann_tail(p, mbar) * angular_inverse(c, d)
        })
    }

    /// Isotropic energy moment at temperature `t`; the `ax = az = 1` limit
    /// of [`Self::ea`].
    pub fn i20(&self, t: f64, mbar: f64) -> f64 {
        let prefactor = self.degeneracy * t.powi(4) / (4.0 * PI * PI);
        prefactor * self.sum(ORDER_ENERGY, |p| {
            let omega = (p * p + mbar * mbar).sqrt();
            boltzmann_tail(p, mbar) * 2.0 * omega
        })
    }

    /// Isotropic pressure moment at temperature `t`; the `ax = az = 1` limit
    /// of [`Self::pla`] and [`Self::pta`].
    pub fn i21(&self, t: f64, mbar: f64) -> f64 {
        let prefactor = self.degeneracy * t.powi(4) / (4.0 * PI * PI);
        prefactor * self.sum(ORDER_PRESSURE, |p| {
            let omega = (p * p + mbar * mbar).sqrt();
            p * boltzmann_tail(p, mbar) * 2.0 / (3.0 * omega)
        })
    }

    /// Isotropic inverse-energy moment at temperature `t`; the `ax = az = 1`
    /// limit of [`Self::i000`].
    pub fn i00(&self, t: f64, mbar: f64) -> f64 {
        let prefactor = self.degeneracy * t * t / (4.0 * PI * PI);
        prefactor * self.sum(ORDER_MASS_COUPLING, |p| {
            let omega = (p * p + mbar * mbar).sqrt();
            p * boltzmann_tail(p, mbar) * 2.0 / omega
        })
    }
}

/// Splits a node into the angular quadratic `E(x)^2 = c + d x^2` along the
/// polar cosine `x`.
fn anisotropy_split(p: f64, ax: f64, az: f64, mbar: f64) -> (f64, f64) {
    let c = ax * ax * p * p + mbar * mbar;
    let d = (az * az - ax * ax) * p * p;
    (c, d)
}

/// Ratio of the deformed Boltzmann factor to the Laguerre weight.
fn boltzmann_tail(p: f64, mbar: f64) -> f64 {
    (p - (p * p + mbar * mbar).sqrt()).exp()
}

/// `int_{-1}^{1} sqrt(c + d x^2) dx`.
fn angular_energy(c: f64, d: f64) -> f64 {
    let r = d / c;
    if r.abs() < ANGULAR_SERIES_THRESHOLD {
        2.0 * c.sqrt() * (1.0 + r * (1.0 / 6.0 + r * (-1.0 / 40.0 + r * (1.0 / 112.0))))
    } else if d > 0.0 {
        let s = d.sqrt();
        (c + d).sqrt() + (c / s) * (s / c.sqrt()).asinh()
    } else {
        let q = (-d).sqrt();
        (c + d).sqrt() + (c / q) * (q / c.sqrt()).min(1.0).asin()
    }
}

/// `int_{-1}^{1} dx / sqrt(c + d x^2)`.
fn angular_inverse(c: f64, d: f64) -> f64 {
    let r = d / c;
    if r.abs() < ANGULAR_SERIES_THRESHOLD {
        2.0 / c.sqrt() * (1.0 + r * (-1.0 / 6.0 + r * (3.0 / 40.0 + r * (-5.0 / 112.0))))
    } else if d > 0.0 {
        let s = d.sqrt();
        2.0 * (s / c.sqrt()).asinh() / s
    } else {
        let q = (-d).sqrt();
        2.0 * (q / c.sqrt()).min(1.0).asin() / q
    }
}

/// `int_{-1}^{1} x^2 dx / sqrt(c + d x^2)`.
fn angular_longitudinal(c: f64, d: f64) -> f64 {
    let r = d / c;
    if r.abs() < ANGULAR_SERIES_THRESHOLD {
        2.0 / c.sqrt() * (1.0 / 3.0 + r * (-1.0 / 10.0 + r * (3.0 / 56.0 + r * (-5.0 / 144.0))))
    } else {
        ((c + d).sqrt() - 0.5 * c * angular_inverse(c, d)) / d
    }
}

/// `int_{-1}^{1} dx / (c + d x^2)^{3/2}`.
fn angular_inv_cubed(c: f64, d: f64) -> f64 {
    let r = d / c;
    if r.abs() < ANGULAR_SERIES_THRESHOLD {
        2.0 / (c * c.sqrt()) * (1.0 + r * (-0.5 + r * (3.0 / 8.0 + r * (-5.0 / 16.0))))
    } else {
        2.0 / (c * (c + d).sqrt())
    }
}

/// `int_{-1}^{1} x^2 dx / (c + d x^2)^{3/2}`.
fn angular_l2_cubed(c: f64, d: f64) -> f64 {
    let r = d / c;
    if r.abs() < ANGULAR_SERIES_THRESHOLD {
        2.0 / (c * c.sqrt())
            * (1.0 / 3.0 + r * (-3.0 / 10.0 + r * (15.0 / 56.0 + r * (-35.0 / 144.0))))
    } else {
        (angular_inverse(c, d) - c * angular_inv_cubed(c, d)) / d
    }
}

/// `int_{-1}^{1} x^4 dx / (c + d x^2)^{3/2}`.
fn angular_l4_cubed(c: f64, d: f64) -> f64 {
    let r = d / c;
    if r.abs() < ANGULAR_SERIES_THRESHOLD {
        2.0 / (c * c.sqrt())
            * (1.0 / 5.0 + r * (-3.0 / 14.0 + r * (5.0 / 24.0 + r * (-35.0 / 176.0))))
    } else {
        (angular_longitudinal(c, d) - c * angular_l2_cubed(c, d)) / d
    }
}
