use std::sync::Arc;

use proptest::prelude::*;

use vah_aniso::{AnisoSolver, SolverOpts};
use vah_core::{AnisoVars, EquationOfState, SolveError};
use vah_eos::{ConformalEos, DEFAULT_DEGENERACY};
use vah_quad::{MomentEvaluator, QuadratureTable};

fn evaluator() -> MomentEvaluator {
    MomentEvaluator::new(Arc::new(QuadratureTable::generate()), DEFAULT_DEGENERACY)
}

/// Conformal thermodynamics carrying a fixed quasiparticle mass, so moment
/// targets can be generated at an arbitrary reduced mass without a
/// self-consistency loop.
#[derive(Debug, Clone)]
struct FixedMassEos {
    base: ConformalEos,
    mass: f64,
}

impl FixedMassEos {
    fn new(mass: f64) -> Self {
        Self {
            base: ConformalEos::ideal(DEFAULT_DEGENERACY),
            mass,
        }
    }
}

impl EquationOfState for FixedMassEos {
    fn equilibrium_energy_density(&self, t: f64) -> f64 {
        self.base.equilibrium_energy_density(t)
    }
    fn equilibrium_pressure(&self, e: f64) -> f64 {
        self.base.equilibrium_pressure(e)
    }
    fn speed_of_sound_squared(&self, e: f64) -> f64 {
        self.base.speed_of_sound_squared(e)
    }
    fn effective_temperature(&self, e: f64) -> f64 {
        self.base.effective_temperature(e)
    }
    fn equilibrium_bquasi(&self, _t: f64) -> f64 {
        0.0
    }
    fn shear_viscosity_to_entropy(&self, t: f64) -> f64 {
        self.base.shear_viscosity_to_entropy(t)
    }
    fn bulk_viscosity_to_entropy(&self, t: f64) -> f64 {
        self.base.bulk_viscosity_to_entropy(t)
    }
    fn beta_shear(&self, t: f64) -> f64 {
        self.base.beta_shear(t)
    }
    fn beta_bulk(&self, t: f64) -> f64 {
        self.base.beta_bulk(t)
    }
    fn z_quasiparticle(&self, t: f64) -> f64 {
        self.mass / t.max(1.0e-12)
    }
    fn mdmde_quasiparticle(&self, _e: f64) -> f64 {
        0.0
    }
}

fn targets(ev: &MomentEvaluator, truth: &AnisoVars, mass: f64) -> (f64, f64, f64) {
    let mbar = truth.mbar(mass);
    (
        ev.ea(truth.lambda, truth.ax, truth.az, mbar),
        ev.pla(truth.lambda, truth.ax, truth.az, mbar),
        ev.pta(truth.lambda, truth.ax, truth.az, mbar),
    )
}

fn rel(a: f64, b: f64) -> f64 {
    ((a - b) / b).abs()
}

// An exact seed must already satisfy the tolerance within a couple of
// Newton iterations.
#[test]
fn exact_seed_converges_immediately() {
    let ev = evaluator();
    let mass = 0.9;
    let truth = AnisoVars {
        lambda: 1.3,
        ax: 0.85,
        az: 1.2,
    };
    let (e, pl, pt) = targets(&ev, &truth, mass);

    let solver = AnisoSolver::new(
        ev,
        Arc::new(FixedMassEos::new(mass)),
        SolverOpts {
            max_iters: 3,
            ..SolverOpts::default()
        },
    );
    let solved = solver.solve(e, pl, pt, 0.0, truth).expect("exact seed");
    assert!(rel(solved.lambda, truth.lambda) < 1e-9);
    assert!(rel(solved.ax, truth.ax) < 1e-9);
    assert!(rel(solved.az, truth.az) < 1e-9);
}

#[test]
fn perturbed_seed_recovers_the_descriptor() {
    let ev = evaluator();
    let mass = 1.1;
    let truth = AnisoVars {
        lambda: 0.9,
        ax: 1.15,
        az: 0.7,
    };
    let (e, pl, pt) = targets(&ev, &truth, mass);

    let solver = AnisoSolver::new(
        ev,
        Arc::new(FixedMassEos::new(mass)),
        SolverOpts::default(),
    );
    let seed = AnisoVars {
        lambda: 1.05 * truth.lambda,
        ax: 0.9 * truth.ax,
        az: 1.1 * truth.az,
    };
    let solved = solver.solve(e, pl, pt, 0.0, seed).expect("perturbed seed");
    assert!(rel(solved.lambda, truth.lambda) < 1e-8);
    assert!(rel(solved.ax, truth.ax) < 1e-8);
    assert!(rel(solved.az, truth.az) < 1e-8);
}

// In the massless limit the transverse shape is a gauge direction: the
// solve holds it fixed and recovers scale and longitudinal squeezing.
#[test]
fn massless_round_trip_recovers_scale_and_squeezing() {
    let ev = evaluator();
    let truth = AnisoVars {
        lambda: 1.1,
        ax: 1.0,
        az: 0.75,
    };
    let (e, pl, pt) = targets(&ev, &truth, 0.0);

    let solver = AnisoSolver::new(
        ev.clone(),
        Arc::new(ConformalEos::ideal(DEFAULT_DEGENERACY)),
        SolverOpts::default(),
    );
    let seed = AnisoVars {
        lambda: 1.3,
        ax: 1.0,
        az: 0.9,
    };
    let solved = solver.solve(e, pl, pt, 0.0, seed).expect("massless solve");
    assert!(rel(solved.lambda, truth.lambda) < 1e-8);
    assert_eq!(solved.ax, 1.0);
    assert!(rel(solved.az, truth.az) < 1e-8);

    // the transverse residual follows from tracelessness
    assert!(rel(ev.pta(solved.lambda, solved.ax, solved.az, 0.0), pt) < 1e-8);
}

#[test]
fn exhausted_iteration_budget_is_reported() {
    let ev = evaluator();
    let mass = 0.8;
    let truth = AnisoVars {
        lambda: 1.0,
        ax: 1.0,
        az: 1.0,
    };
    let (e, pl, pt) = targets(&ev, &truth, mass);

    let solver = AnisoSolver::new(
        ev,
        Arc::new(FixedMassEos::new(mass)),
        SolverOpts {
            max_iters: 1,
            tolerance: 1.0e-14,
            residual_tolerance: 1.0e-15,
        },
    );
    let seed = AnisoVars {
        lambda: 2.0,
        ax: 0.5,
        az: 1.8,
    };
    let err = solver.solve(e, pl, pt, 0.0, seed).unwrap_err();
    assert!(matches!(err, SolveError::NoConvergence { iterations: 1, .. }));
}

#[test]
fn non_physical_guess_is_rejected_up_front() {
    let ev = evaluator();
    let solver = AnisoSolver::new(
        ev,
        Arc::new(FixedMassEos::new(0.8)),
        SolverOpts::default(),
    );
    let err = solver
        .solve(
            1.0,
            0.3,
            0.35,
            0.0,
            AnisoVars {
                lambda: 1.0,
                ax: -0.2,
                az: 1.0,
            },
        )
        .unwrap_err();
    assert!(matches!(err, SolveError::NonPhysical { iteration: 0, .. }));
}

// Longitudinal pressure above the energy density has no kinetic solution;
// the solve must fail rather than fabricate a descriptor.
#[test]
fn unreachable_targets_fail() {
    let ev = evaluator();
    let mass = 0.8;
    let truth = AnisoVars {
        lambda: 1.0,
        ax: 1.0,
        az: 1.0,
    };
    let (e, _, pt) = targets(&ev, &truth, mass);

    let solver = AnisoSolver::new(
        ev,
        Arc::new(FixedMassEos::new(mass)),
        SolverOpts::default(),
    );
    assert!(solver.solve(e, 1.2 * e, pt, 0.0, truth).is_err());
}

proptest! {
    // each case costs a handful of quadrature sweeps; keep the suite quick
    #![proptest_config(ProptestConfig::with_cases(16))]
    #[test]
    fn round_trip_recovers_random_descriptors(
        lambda in 0.6f64..2.0,
        ax in 0.7f64..1.4,
        az in 0.6f64..1.5,
        mass in 0.4f64..1.5,
    ) {
        let ev = evaluator();
        let truth = AnisoVars { lambda, ax, az };
        let (e, pl, pt) = targets(&ev, &truth, mass);
        let solver = AnisoSolver::new(
            ev,
            Arc::new(FixedMassEos::new(mass)),
            SolverOpts::default(),
        );
        let seed = AnisoVars {
            lambda: 0.97 * truth.lambda,
            ax: 1.03 * truth.ax,
            az: 0.97 * truth.az,
        };
        let solved = solver.solve(e, pl, pt, 0.0, seed).expect("round trip");
        prop_assert!(rel(solved.lambda, truth.lambda) < 1e-6);
        prop_assert!(rel(solved.ax, truth.ax) < 1e-6);
        prop_assert!(rel(solved.az, truth.az) < 1e-6);
    }
}
