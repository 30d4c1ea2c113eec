use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use vah_aniso::{ReconstructOpts, SolverOpts};
use vah_core::{EquationOfState, VahError};
use vah_eos::{ConformalEos, QuasiparticleEos, DEFAULT_DEGENERACY};
use vah_evolve::{EvolutionOpts, InitialCondition};
use vah_quad::{MomentEvaluator, QuadratureTable};

fn default_initial_temperature_gev() -> f64 {
    0.5
}

fn default_table_path() -> PathBuf {
    PathBuf::from(QuadratureTable::resource_name())
}

fn default_degeneracy() -> f64 {
    DEFAULT_DEGENERACY
}

fn default_eta_over_s() -> f64 {
    0.2
}

fn default_zeta_over_s() -> f64 {
    0.05
}

fn default_z0() -> f64 {
    1.0
}

/// YAML-configurable parameters governing an evolution run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunConfig {
    /// Initial temperature in GeV.
    #[serde(default = "default_initial_temperature_gev")]
    pub initial_temperature_gev: f64,
    /// Evolution window and step controls.
    #[serde(default)]
    pub evolution: EvolutionOpts,
    /// Path to the quadrature resource file.
    #[serde(default = "default_table_path")]
    pub quadrature_table: PathBuf,
    /// Medium selection.
    #[serde(default)]
    pub eos: EosConfig,
    /// Initial-condition selection.
    #[serde(default)]
    pub initial_condition: InitialCondition,
    /// Inferred-variable reconstruction controls.
    #[serde(default)]
    pub reconstruction: ReconstructOpts,
    /// Anisotropic solver controls.
    #[serde(default)]
    pub solver: SolverOpts,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            initial_temperature_gev: default_initial_temperature_gev(),
            evolution: EvolutionOpts::default(),
            quadrature_table: default_table_path(),
            eos: EosConfig::default(),
            initial_condition: InitialCondition::default(),
            reconstruction: ReconstructOpts::default(),
            solver: SolverOpts::default(),
        }
    }
}

impl RunConfig {
    /// Loads a run configuration from a YAML file.
    pub fn load(path: &Path) -> Result<RunConfig, VahError> {
        let contents = fs::read_to_string(path).map_err(|err| VahError::Config {
            detail: format!("cannot read {}: {err}", path.display()),
        })?;
        serde_yaml::from_str(&contents).map_err(|err| VahError::Config {
            detail: format!("cannot parse {}: {err}", path.display()),
        })
    }
}

/// Supported media.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum EosConfig {
    /// Massless conformal gas with constant viscosity ratios.
    Conformal {
        /// Degeneracy factor of the medium.
        #[serde(default = "default_degeneracy")]
        degeneracy: f64,
        /// Constant shear viscosity to entropy density ratio.
        #[serde(default = "default_eta_over_s")]
        eta_over_s: f64,
        /// Constant bulk viscosity to entropy density ratio.
        #[serde(default)]
        zeta_over_s: f64,
    },
    /// Quasiparticle gas with mass-to-temperature ratio `z0`.
    Quasiparticle {
        /// Degeneracy factor of the medium.
        #[serde(default = "default_degeneracy")]
        degeneracy: f64,
        /// Quasiparticle mass-to-temperature ratio.
        #[serde(default = "default_z0")]
        z0: f64,
        /// Constant shear viscosity to entropy density ratio.
        #[serde(default = "default_eta_over_s")]
        eta_over_s: f64,
        /// Constant bulk viscosity to entropy density ratio.
        #[serde(default = "default_zeta_over_s")]
        zeta_over_s: f64,
    },
}

impl Default for EosConfig {
    fn default() -> Self {
        EosConfig::Quasiparticle {
            degeneracy: default_degeneracy(),
            z0: default_z0(),
            eta_over_s: default_eta_over_s(),
            zeta_over_s: default_zeta_over_s(),
        }
    }
}

impl EosConfig {
    /// Degeneracy factor carried into the moment evaluator.
    pub fn degeneracy(&self) -> f64 {
        match self {
            EosConfig::Conformal { degeneracy, .. } => *degeneracy,
            EosConfig::Quasiparticle { degeneracy, .. } => *degeneracy,
        }
    }

    /// Builds the configured medium.
    pub fn build(&self, evaluator: &MomentEvaluator) -> Arc<dyn EquationOfState> {
        match self {
            EosConfig::Conformal {
                degeneracy,
                eta_over_s,
                zeta_over_s,
            } => Arc::new(ConformalEos::new(*degeneracy, *eta_over_s, *zeta_over_s)),
            EosConfig::Quasiparticle {
                z0,
                eta_over_s,
                zeta_over_s,
                ..
            } => Arc::new(QuasiparticleEos::new(
                *z0,
                *eta_over_s,
                *zeta_over_s,
                evaluator,
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_the_default_run() {
        let config: RunConfig = serde_yaml::from_str("{}").expect("defaults");
        assert_eq!(config.initial_temperature_gev, 0.5);
        assert_eq!(config.evolution.initial_time, 0.25);
        assert_eq!(config.evolution.final_time, 100.0);
        assert_eq!(config.evolution.time_step, 0.005);
        assert_eq!(config.evolution.write_interval, 10);
        assert!(matches!(config.eos, EosConfig::Quasiparticle { .. }));
    }

    #[test]
    fn eos_selection_parses_from_yaml() {
        let config: RunConfig = serde_yaml::from_str(
            "eos:\n  type: conformal\n  eta_over_s: 0.0\ninitial_condition:\n  type: glasma\n  pl_pt_ratio: 0.01\n",
        )
        .expect("parse");
        match config.eos {
            EosConfig::Conformal { eta_over_s, .. } => assert_eq!(eta_over_s, 0.0),
            _ => panic!("expected conformal medium"),
        }
        assert!(matches!(
            config.initial_condition,
            InitialCondition::Glasma { .. }
        ));
    }
}
