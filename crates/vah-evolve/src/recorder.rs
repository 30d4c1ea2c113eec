use std::fs;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};

use vah_core::{AnisoVars, HydroState, InferredVars, Thermodynamics, DENOM_FLOOR};

/// Per-sample diagnostics recorded along the evolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateSample {
    /// Proper time of the sample, in fm.
    pub time: f64,
    /// Energy density over its initial value.
    pub energy_ratio: f64,
    /// Shear-stress measure `2 (pt - pl)/3`.
    pub shear: f64,
    /// Bulk-pressure measure `(pl + 2 pt)/3 - p`.
    pub bulk: f64,
    /// Pressure anisotropy ratio `pl/pt`.
    pub plpt_ratio: f64,
    /// Effective temperature, in fm^-1.
    pub temperature: f64,
    /// Anisotropy scale parameter, in fm^-1.
    pub lambda: f64,
    /// Transverse shape parameter.
    pub ax: f64,
    /// Longitudinal shape parameter.
    pub az: f64,
    /// Inverse Reynolds number of the shear stress.
    pub rpi_inv: f64,
    /// Inverse Reynolds number of the bulk pressure.
    pub rbulk_inv: f64,
    /// Navier-Stokes shear reference over the equilibrium pressure.
    pub rpi_ns_inv: f64,
    /// Navier-Stokes bulk reference over the equilibrium pressure.
    pub rbulk_ns_inv: f64,
    /// Shear relaxation time, in fm.
    pub taupi: f64,
    /// Bulk relaxation time, in fm.
    pub taubulk: f64,
    /// Mean-field deviation variable.
    pub b: f64,
    /// Equilibrium mean-field reference.
    pub beq: f64,
    /// Asymptotic mean-field deviation.
    pub dbasy: f64,
}

/// Per-quantity output tables: file name, column header, sample accessor.
static TABLES: [(&str, &str, fn(&StateSample) -> f64); 17] = [
    ("eplot_vah.dat", "e/e0", |s| s.energy_ratio),
    ("piplot_vah.dat", "pi [fm^-4]", |s| s.shear),
    ("bulkplot_vah.dat", "Pi [fm^-4]", |s| s.bulk),
    ("plptplot_vah.dat", "PL/PT", |s| s.plpt_ratio),
    ("Tplot_vah.dat", "T [fm^-1]", |s| s.temperature),
    ("lambdaplot_vah.dat", "lambda [fm^-1]", |s| s.lambda),
    ("axplot_vah.dat", "ax", |s| s.ax),
    ("azplot_vah.dat", "az", |s| s.az),
    ("RpiInvplot_vah.dat", "R_pi^-1", |s| s.rpi_inv),
    ("RbulkInvplot_vah.dat", "R_Pi^-1", |s| s.rbulk_inv),
    ("piNSplot_vah.dat", "R_piNS^-1", |s| s.rpi_ns_inv),
    ("bulkNSplot_vah.dat", "R_bulkNS^-1", |s| s.rbulk_ns_inv),
    ("taupiplot_vah.dat", "tau_pi", |s| s.taupi),
    ("taubulkplot_vah.dat", "tau_Pi", |s| s.taubulk),
    ("Bplot_vah.dat", "B", |s| s.b),
    ("Beqplot_vah.dat", "Beq", |s| s.beq),
    ("dBasyplot_vah.dat", "dB2nd", |s| s.dbasy),
];

/// Collects per-step samples and writes the per-quantity time-series
/// tables.
#[derive(Debug, Clone)]
pub struct TimeSeriesRecorder {
    reference_energy: f64,
    samples: Vec<StateSample>,
}

impl TimeSeriesRecorder {
    /// Creates a recorder normalizing energies against `reference_energy`.
    pub fn new(reference_energy: f64) -> Self {
        Self {
            reference_energy: reference_energy.max(DENOM_FLOOR),
            samples: Vec::new(),
        }
    }

    /// Records one sample from the accepted state and its derived
    /// quantities.
    pub fn record(
        &mut self,
        time: f64,
        state: &HydroState,
        inferred: &InferredVars,
        aniso: &AnisoVars,
        thermo: &Thermodynamics,
    ) {
        let p = inferred.p.max(DENOM_FLOOR);
        let shear = state.shear();
        let bulk = state.bulk(inferred.p);
        self.samples.push(StateSample {
            time,
            energy_ratio: inferred.e / self.reference_energy,
            shear,
            bulk,
            plpt_ratio: state.plpt_ratio(),
            temperature: thermo.temperature,
            lambda: aniso.lambda,
            ax: aniso.ax,
            az: aniso.az,
            rpi_inv: 1.5_f64.sqrt() * shear / p,
            rbulk_inv: bulk / p,
            rpi_ns_inv: 1.5_f64.sqrt() * thermo.pi_ns / p,
            rbulk_ns_inv: thermo.bulk_ns / p,
            taupi: thermo.taupi,
            taubulk: thermo.taubulk,
            b: state.b,
            beq: thermo.beq,
            dbasy: thermo.dbasy,
        });
    }

    /// Recorded samples in time order.
    pub fn samples(&self) -> &[StateSample] {
        &self.samples
    }

    /// Number of recorded samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether nothing has been recorded yet.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Writes one two-column `(time, value)` table per recorded quantity
    /// into `dir`, creating it if needed.
    pub fn write_tables(&self, dir: &Path) -> std::io::Result<()> {
        fs::create_dir_all(dir)?;
        for (name, header, accessor) in TABLES.iter() {
            let mut file = File::create(dir.join(name))?;
            writeln!(file, "t [fm]\t\t{header}")?;
            for sample in &self.samples {
                writeln!(file, "{:.4}\t\t{:.6e}", sample.time, accessor(sample))?;
            }
        }
        Ok(())
    }
}
