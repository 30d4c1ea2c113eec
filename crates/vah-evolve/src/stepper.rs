use std::sync::Arc;

use serde::{Deserialize, Serialize};

use vah_aniso::{AnisoSolver, Reconstructor};
use vah_core::{
    AnisoVars, EquationOfState, HydroState, InferredVars, StepStage, Thermodynamics, VahError,
};

use crate::flux::{FluxContext, FluxSystem};
use crate::recorder::TimeSeriesRecorder;

fn default_initial_time() -> f64 {
    0.25
}

fn default_final_time() -> f64 {
    100.0
}

fn default_time_step() -> f64 {
    0.005
}

fn default_write_interval() -> usize {
    10
}

/// Fixed-step controls for the evolution loop.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EvolutionOpts {
    /// Proper time at which evolution starts, in fm.
    #[serde(default = "default_initial_time")]
    pub initial_time: f64,
    /// Proper time at which evolution stops, in fm.
    #[serde(default = "default_final_time")]
    pub final_time: f64,
    /// Fixed step size, in fm.
    #[serde(default = "default_time_step")]
    pub time_step: f64,
    /// Accepted steps between recorded samples.
    #[serde(default = "default_write_interval")]
    pub write_interval: usize,
}

impl Default for EvolutionOpts {
    fn default() -> Self {
        Self {
            initial_time: default_initial_time(),
            final_time: default_final_time(),
            time_step: default_time_step(),
            write_interval: default_write_interval(),
        }
    }
}

impl EvolutionOpts {
    fn validate(&self) -> Result<(), VahError> {
        if !self.time_step.is_finite() || self.time_step <= 0.0 {
            return Err(VahError::Config {
                detail: "time step must be positive and finite".to_string(),
            });
        }
        if self.final_time <= self.initial_time {
            return Err(VahError::Config {
                detail: "final time must exceed initial time".to_string(),
            });
        }
        if self.write_interval == 0 {
            return Err(VahError::Config {
                detail: "write interval must be at least one step".to_string(),
            });
        }
        Ok(())
    }

    /// Number of fixed-size steps the loop will run.
    pub fn step_count(&self) -> usize {
        ((self.final_time - self.initial_time) / self.time_step).floor() as usize
    }
}

/// Terminal report of a completed evolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvolutionSummary {
    /// Accepted steps executed.
    pub steps: usize,
    /// Conserved state at the final time.
    pub final_state: HydroState,
    /// Inferred variables at the final time.
    pub final_inferred: InferredVars,
    /// Anisotropy descriptor at the final time.
    pub final_aniso: AnisoVars,
    /// Derived thermodynamics at the final time.
    pub final_thermo: Thermodynamics,
}

/// Two-stage Heun (predictor-corrector) stepper over the conserved state.
///
/// The stepper owns the canonical state for the duration of a run; the
/// solver and reconstructor are pure functions of their inputs plus the
/// shared quadrature table. Every accepted state is fully self-consistent:
/// inferred variables, the anisotropy descriptor and the derived
/// thermodynamics are recomputed from it before it is exposed to the next
/// iteration or to the recorder.
pub struct Evolution {
    eos: Arc<dyn EquationOfState>,
    flux: Arc<dyn FluxSystem>,
    solver: AnisoSolver,
    reconstructor: Reconstructor,
    opts: EvolutionOpts,
}

impl Evolution {
    /// Assembles a stepper from its collaborators.
    pub fn new(
        eos: Arc<dyn EquationOfState>,
        flux: Arc<dyn FluxSystem>,
        solver: AnisoSolver,
        reconstructor: Reconstructor,
        opts: EvolutionOpts,
    ) -> Self {
        Self {
            eos,
            flux,
            solver,
            reconstructor,
            opts,
        }
    }

    /// Evolution controls in effect.
    pub fn opts(&self) -> &EvolutionOpts {
        &self.opts
    }

    /// Runs the fixed-step loop from `initial`, recording samples at the
    /// configured cadence. Any solver or reconstruction failure aborts the
    /// run with its step index and stage attached.
    pub fn run(
        &self,
        initial: HydroState,
        recorder: &mut TimeSeriesRecorder,
    ) -> Result<EvolutionSummary, VahError> {
        self.opts.validate()?;

        let dt = self.opts.time_step;
        let mut time = self.opts.initial_time;
        let mut state = initial;

        let mut inferred = self
            .reconstructor
            .reconstruct(&state, time)
            .map_err(|err| VahError::at_step(0, time, StepStage::Initialization, err))?;
        let seed = AnisoVars::equilibrium_seed(self.eos.effective_temperature(inferred.e));
        let mut aniso = self
            .solver
            .solve(inferred.e, state.pl, state.pt, state.b, seed)
            .map_err(|err| VahError::at_step(0, time, StepStage::Initialization, err))?;
        let mut thermo = Thermodynamics::compute(&*self.eos, inferred.e, state.pl, state.pt, time);
        recorder.record(time, &state, &inferred, &aniso, &thermo);

        let steps = self.opts.step_count();
        for step in 0..steps {
            // predictor: full Euler step to the midpoint state
            let derivative = self.flux.derivatives(&FluxContext {
                state: &state,
                inferred: &inferred,
                aniso: &aniso,
                thermo: &thermo,
                time,
            });
            let mid = state.euler(&derivative, dt);
            let mid_inferred = self
                .reconstructor
                .reconstruct(&mid, time + dt)
                .map_err(|err| VahError::at_step(step, time, StepStage::Predictor, err))?;
            let mid_aniso = self
                .solver
                .solve(mid_inferred.e, mid.pl, mid.pt, mid.b, aniso)
                .map_err(|err| VahError::at_step(step, time, StepStage::Predictor, err))?;
            let mid_thermo =
                Thermodynamics::compute(&*self.eos, mid_inferred.e, mid.pl, mid.pt, time + dt);

            // corrector: Euler step from the midpoint at the advanced time,
            // then the Heun average against the original state
            let mid_derivative = self.flux.derivatives(&FluxContext {
                state: &mid,
                inferred: &mid_inferred,
                aniso: &mid_aniso,
                thermo: &mid_thermo,
                time: time + dt,
            });
            let end = mid.euler(&mid_derivative, dt);
            time += dt;
            state = state.average(&end);

            inferred = self
                .reconstructor
                .reconstruct(&state, time)
                .map_err(|err| VahError::at_step(step, time, StepStage::Corrector, err))?;
            aniso = self
                .solver
                .solve(inferred.e, state.pl, state.pt, state.b, mid_aniso)
                .map_err(|err| VahError::at_step(step, time, StepStage::Corrector, err))?;
            thermo = Thermodynamics::compute(&*self.eos, inferred.e, state.pl, state.pt, time);

            if (step + 1) % self.opts.write_interval == 0 {
                recorder.record(time, &state, &inferred, &aniso, &thermo);
            }
        }

        Ok(EvolutionSummary {
            steps,
            final_state: state,
            final_inferred: inferred,
            final_aniso: aniso,
            final_thermo: thermo,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_count_is_the_floored_quotient() {
        let opts = EvolutionOpts::default();
        assert_eq!(opts.step_count(), 19950);

        let ragged = EvolutionOpts {
            initial_time: 0.25,
            final_time: 1.0,
            time_step: 0.4,
            write_interval: 1,
        };
        assert_eq!(ragged.step_count(), 1);
    }

    #[test]
    fn invalid_controls_are_rejected() {
        let zero_dt = EvolutionOpts {
            time_step: 0.0,
            ..EvolutionOpts::default()
        };
        assert!(zero_dt.validate().is_err());

        let backwards = EvolutionOpts {
            initial_time: 2.0,
            final_time: 1.0,
            ..EvolutionOpts::default()
        };
        assert!(backwards.validate().is_err());

        let no_writes = EvolutionOpts {
            write_interval: 0,
            ..EvolutionOpts::default()
        };
        assert!(no_writes.validate().is_err());
        assert!(EvolutionOpts::default().validate().is_ok());
    }
}
