use std::path::PathBuf;
use std::sync::Arc;

use clap::Args as ClapArgs;

use vah_aniso::{AnisoSolver, Reconstructor};
use vah_core::{VahError, GEV_TO_INVERSE_FM};
use vah_evolve::{initial_state, Evolution, TimeSeriesRecorder, VahFlux};
use vah_quad::{MomentEvaluator, QuadratureTable};

use crate::config::RunConfig;
use crate::manifest::{self, RunManifest};

#[derive(ClapArgs, Debug)]
pub struct RunArgs {
    /// YAML configuration describing the evolution run; defaults apply when
    /// omitted.
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Output directory for run artefacts.
    #[arg(long)]
    pub out: PathBuf,
}

pub fn execute(args: &RunArgs) -> Result<(), VahError> {
    let config = match &args.config {
        Some(path) => RunConfig::load(path)?,
        None => RunConfig::default(),
    };

    let table = Arc::new(QuadratureTable::load(&config.quadrature_table)?);
    let evaluator = MomentEvaluator::new(table, config.eos.degeneracy());
    let eos = config.eos.build(&evaluator);
    let solver = AnisoSolver::new(evaluator.clone(), eos.clone(), config.solver.clone());
    let reconstructor = Reconstructor::new(eos.clone(), config.reconstruction.clone());
    let flux = Arc::new(VahFlux::new(evaluator, eos.clone()));
    let evolution = Evolution::new(
        eos.clone(),
        flux,
        solver,
        reconstructor,
        config.evolution.clone(),
    );

    let temperature = config.initial_temperature_gev * GEV_TO_INVERSE_FM;
    let initial = initial_state(
        &*eos,
        temperature,
        config.evolution.initial_time,
        config.initial_condition,
    );
    println!("T = {temperature:.6} fm^-1");
    println!("e0 = {:.6} fm^-4", initial.ttt);

    let mut recorder = TimeSeriesRecorder::new(initial.ttt);
    let summary = evolution.run(initial, &mut recorder)?;
    println!("lambda = {:.6} fm^-1", summary.final_aniso.lambda);
    println!("ax = {:.6}", summary.final_aniso.ax);
    println!("az = {:.6}", summary.final_aniso.az);
    println!("PL/PT = {:.6}", summary.final_state.plpt_ratio());
    println!("...done after {} steps", summary.steps);

    let results_dir = args.out.join("results");
    recorder
        .write_tables(&results_dir)
        .map_err(|err| VahError::Output {
            path: results_dir.display().to_string(),
            detail: err.to_string(),
        })?;
    write_combined_csv(&recorder, args.out.join("samples.csv"))?;

    let final_time =
        config.evolution.initial_time + summary.steps as f64 * config.evolution.time_step;
    let run_manifest = RunManifest {
        config_hash: manifest::config_hash(&config)?,
        config,
        steps: summary.steps,
        samples: recorder.len(),
        final_time,
    };
    run_manifest.write(&args.out.join("manifest.json"))
}

fn write_combined_csv(recorder: &TimeSeriesRecorder, path: PathBuf) -> Result<(), VahError> {
    let output_error = |detail: String| VahError::Output {
        path: path.display().to_string(),
        detail,
    };
    let mut writer = csv::Writer::from_path(&path).map_err(|err| output_error(err.to_string()))?;
    for sample in recorder.samples() {
        writer
            .serialize(sample)
            .map_err(|err| output_error(err.to_string()))?;
    }
    writer.flush().map_err(|err| output_error(err.to_string()))
}
