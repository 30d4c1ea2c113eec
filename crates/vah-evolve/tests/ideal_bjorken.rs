use std::sync::Arc;

use vah_aniso::{AnisoSolver, ReconstructOpts, Reconstructor, SolverOpts};
use vah_core::{EquationOfState, GEV_TO_INVERSE_FM};
use vah_eos::{ConformalEos, DEFAULT_DEGENERACY};
use vah_evolve::{initial_state, Evolution, EvolutionOpts, InitialCondition, TimeSeriesRecorder, VahFlux};
use vah_quad::{MomentEvaluator, QuadratureTable};

// With zero viscosities and a constant speed of sound the stepper must
// reproduce ideal Bjorken scaling e(t) = e0 (t0/t)^(1 + cs2).
#[test]
fn zero_viscosity_run_reproduces_bjorken_scaling() {
    let eos: Arc<dyn EquationOfState> = Arc::new(ConformalEos::ideal(DEFAULT_DEGENERACY));
    let evaluator = MomentEvaluator::new(Arc::new(QuadratureTable::generate()), DEFAULT_DEGENERACY);
    let solver = AnisoSolver::new(evaluator.clone(), eos.clone(), SolverOpts::default());
    let reconstructor = Reconstructor::new(eos.clone(), ReconstructOpts::default());
    let flux = Arc::new(VahFlux::new(evaluator, eos.clone()));

    let opts = EvolutionOpts {
        initial_time: 0.25,
        final_time: 5.0,
        time_step: 0.001,
        write_interval: 50,
    };
    let t0 = opts.initial_time;
    let evolution = Evolution::new(eos.clone(), flux, solver, reconstructor, opts);

    let temperature = 0.5 * GEV_TO_INVERSE_FM;
    let initial = initial_state(&*eos, temperature, t0, InitialCondition::Equilibrium);
    let mut recorder = TimeSeriesRecorder::new(initial.ttt);
    let summary = evolution.run(initial, &mut recorder).expect("ideal run");

    assert_eq!(summary.steps, 4750);
    for sample in recorder.samples() {
        let expected = (t0 / sample.time).powf(4.0 / 3.0);
        assert!(
            ((sample.energy_ratio - expected) / expected).abs() < 1e-4,
            "t = {}: {} vs {}",
            sample.time,
            sample.energy_ratio,
            expected
        );
        // the pressures track the equilibrium pressure exactly
        assert!((sample.plpt_ratio - 1.0).abs() < 1e-6, "t = {}", sample.time);
        assert!(sample.rpi_inv.abs() < 1e-6);
        assert!(sample.rbulk_inv.abs() < 1e-6);
    }

    // T falls as t^(-1/3)
    let expected_temperature = temperature * (t0 / 5.0_f64).powf(1.0 / 3.0);
    let final_temperature = summary.final_thermo.temperature;
    assert!(((final_temperature - expected_temperature) / expected_temperature).abs() < 1e-4);

    // the anisotropy descriptor stays at its equilibrium seed
    assert!((summary.final_aniso.az - 1.0).abs() < 1e-5);
    assert!(((summary.final_aniso.lambda - final_temperature) / final_temperature).abs() < 1e-5);
}
