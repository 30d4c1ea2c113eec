use std::f64::consts::PI;
use std::sync::Arc;

use vah_quad::{MomentEvaluator, QuadratureTable};

const DEGENERACY: f64 = 47.5;

fn evaluator() -> MomentEvaluator {
    MomentEvaluator::new(Arc::new(QuadratureTable::generate()), DEGENERACY)
}

fn rel(a: f64, b: f64) -> f64 {
    ((a - b) / b).abs()
}

// At unit shape parameters every anisotropic moment must collapse onto its
// isotropic counterpart evaluated at T = lambda.
#[test]
fn unit_shape_parameters_reproduce_the_isotropic_moments() {
    let ev = evaluator();
    for lambda in [0.6, 1.0, 2.5337] {
        for mbar in [0.0, 0.5, 1.3] {
            assert!(rel(ev.ea(lambda, 1.0, 1.0, mbar), ev.i20(lambda, mbar)) < 1e-13);
            assert!(rel(ev.pla(lambda, 1.0, 1.0, mbar), ev.i21(lambda, mbar)) < 1e-13);
            assert!(rel(ev.pta(lambda, 1.0, 1.0, mbar), ev.i21(lambda, mbar)) < 1e-13);
            assert!(rel(ev.i000(lambda, 1.0, 1.0, mbar), ev.i00(lambda, mbar)) < 1e-13);
        }
    }
}

// Massless closed forms of the classical gas: e = 3 g T^4 / pi^2,
// p = e / 3, and the inverse-energy moment g T^2 / (2 pi^2).
#[test]
fn massless_isotropic_moments_match_their_closed_forms() {
    let ev = evaluator();
    for t in [0.8f64, 1.0, 1.9] {
        let energy = 3.0 * DEGENERACY * t.powi(4) / (PI * PI);
        assert!(rel(ev.i20(t, 0.0), energy) < 1e-12);
        assert!(rel(ev.i21(t, 0.0), energy / 3.0) < 1e-12);
        assert!(rel(ev.i00(t, 0.0), DEGENERACY * t * t / (2.0 * PI * PI)) < 1e-12);
    }
}

// Massless particles are traceless: Ea = PLa + 2 PTa for any squeezing.
#[test]
fn massless_moments_satisfy_the_traceless_identity() {
    let ev = evaluator();
    for (ax, az) in [(1.0, 0.7), (0.85, 1.25), (1.2, 0.4)] {
        let ea = ev.ea(1.3, ax, az, 0.0);
        let pla = ev.pla(1.3, ax, az, 0.0);
        let pta = ev.pta(1.3, ax, az, 0.0);
        assert!(rel(ea, pla + 2.0 * pta) < 1e-12, "ax={ax}, az={az}");
    }
}

// A mass breaks tracelessness downward: Ea exceeds PLa + 2 PTa.
#[test]
fn mass_produces_a_positive_trace() {
    let ev = evaluator();
    let ea = ev.ea(1.0, 0.9, 1.1, 0.8);
    let pla = ev.pla(1.0, 0.9, 1.1, 0.8);
    let pta = ev.pta(1.0, 0.9, 1.1, 0.8);
    assert!(ea > pla + 2.0 * pta);
}

// Free-streaming identity behind longitudinal momentum conservation:
// I240 + 2 I221 = PLa in the massless limit.
#[test]
fn massless_auxiliary_moments_close_onto_the_longitudinal_pressure() {
    let ev = evaluator();
    for (ax, az) in [(1.0, 0.6), (0.9, 1.3)] {
        let pla = ev.pla(1.1, ax, az, 0.0);
        let i240 = ev.i240(1.1, ax, az, 0.0);
        let i221 = ev.i221(1.1, ax, az, 0.0);
        assert!(rel(i240 + 2.0 * i221, pla) < 1e-12, "ax={ax}, az={az}");
    }
}

// Squeezing the longitudinal direction must suppress the longitudinal
// pressure relative to the transverse one, and vice versa.
#[test]
fn shape_parameters_order_the_pressures() {
    let ev = evaluator();
    let oblate_pl = ev.pla(1.0, 1.0, 0.6, 0.4);
    let oblate_pt = ev.pta(1.0, 1.0, 0.6, 0.4);
    assert!(oblate_pl < oblate_pt);

    let prolate_pl = ev.pla(1.0, 0.6, 1.0, 0.4);
    let prolate_pt = ev.pta(1.0, 0.6, 1.0, 0.4);
    assert!(prolate_pl > prolate_pt);
}
