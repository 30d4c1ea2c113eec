use std::sync::Arc;

use vah_core::{AnisoVars, EquationOfState, HydroState, InferredVars, StateDerivative, Thermodynamics};
use vah_quad::MomentEvaluator;

// Relaxation times below this floor signal a non-dissipative medium; the
// corresponding relaxation terms are dropped rather than divided through.
const RELAXATION_FLOOR: f64 = 1.0e-10;

/// Everything a constitutive right-hand side may depend on at one stage:
/// the full state tuple, the derived thermodynamics, the anisotropy
/// descriptor and the proper time.
#[derive(Debug, Clone, Copy)]
pub struct FluxContext<'a> {
    /// Conserved state at the stage.
    pub state: &'a HydroState,
    /// Inferred primary variables at the stage.
    pub inferred: &'a InferredVars,
    /// Anisotropy descriptor at the stage.
    pub aniso: &'a AnisoVars,
    /// Derived thermodynamics at the stage.
    pub thermo: &'a Thermodynamics,
    /// Proper time of the stage.
    pub time: f64,
}

/// Proper-time derivatives of the seven conserved components; invoked
/// exactly twice per stepper iteration (predictor and corrector).
pub trait FluxSystem: Send + Sync {
    /// Derivative of the energy component `T^{tt}`.
    fn dttt(&self, ctx: &FluxContext<'_>) -> f64;

    /// Derivative of the transverse momentum component `T^{tx}`.
    fn dttx(&self, ctx: &FluxContext<'_>) -> f64;

    /// Derivative of the transverse momentum component `T^{ty}`.
    fn dtty(&self, ctx: &FluxContext<'_>) -> f64;

    /// Derivative of the rapidity momentum component `T^{tn}`.
    fn dttn(&self, ctx: &FluxContext<'_>) -> f64;

    /// Derivative of the longitudinal pressure.
    fn dpl(&self, ctx: &FluxContext<'_>) -> f64;

    /// Derivative of the transverse pressure.
    fn dpt(&self, ctx: &FluxContext<'_>) -> f64;

    /// Derivative of the mean-field deviation variable.
    fn db(&self, ctx: &FluxContext<'_>) -> f64;

    /// All seven derivatives assembled.
    fn derivatives(&self, ctx: &FluxContext<'_>) -> StateDerivative {
        StateDerivative {
            dttt: self.dttt(ctx),
            dttx: self.dttx(ctx),
            dtty: self.dtty(ctx),
            dttn: self.dttn(ctx),
            dpl: self.dpl(ctx),
            dpt: self.dpt(ctx),
            db: self.db(ctx),
        }
    }
}

/// Boost-invariant VAH right-hand sides from the kinetic moments of the
/// quasiparticle distribution.
///
/// Free streaming couples the pressures to the auxiliary moments `I240` and
/// `I221`; the running quasiparticle mass couples them to `I020`, `I001`
/// and (for the mean field) `I000`. Shear and bulk deviations relax on
/// their respective relaxation times. When both relaxation times vanish the
/// pressures track the equilibrium pressure exactly instead (the ideal
/// limit).
#[derive(Clone)]
pub struct VahFlux {
    evaluator: MomentEvaluator,
    eos: Arc<dyn EquationOfState>,
}

impl std::fmt::Debug for VahFlux {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VahFlux").finish_non_exhaustive()
    }
}

impl VahFlux {
    /// Creates the flux system over the shared evaluator and medium.
    pub fn new(evaluator: MomentEvaluator, eos: Arc<dyn EquationOfState>) -> Self {
        Self { evaluator, eos }
    }

    fn is_ideal(thermo: &Thermodynamics) -> bool {
        thermo.taupi < RELAXATION_FLOOR && thermo.taubulk < RELAXATION_FLOOR
    }
}

impl FluxSystem for VahFlux {
    fn dttt(&self, ctx: &FluxContext<'_>) -> f64 {
        -(ctx.inferred.e + ctx.state.pl) / ctx.time
    }

    fn dttx(&self, ctx: &FluxContext<'_>) -> f64 {
        -ctx.state.ttx / ctx.time
    }

    fn dtty(&self, ctx: &FluxContext<'_>) -> f64 {
        -ctx.state.tty / ctx.time
    }

    fn dttn(&self, ctx: &FluxContext<'_>) -> f64 {
        -3.0 * ctx.state.ttn / ctx.time
    }

    fn dpl(&self, ctx: &FluxContext<'_>) -> f64 {
        let e = ctx.inferred.e;
        let pl = ctx.state.pl;
        if Self::is_ideal(ctx.thermo) {
            return -ctx.thermo.cs2 * (e + pl) / ctx.time;
        }

        let mbar = ctx.aniso.mbar(ctx.thermo.mass);
        let i240 = self
            .evaluator
            .i240(ctx.aniso.lambda, ctx.aniso.ax, ctx.aniso.az, mbar);
        let i020 = self
            .evaluator
            .i020(ctx.aniso.lambda, ctx.aniso.ax, ctx.aniso.az, mbar);
        let mdmde = self.eos.mdmde_quasiparticle(e);

        let mut total = (i240 - 3.0 * pl) / ctx.time + mdmde * (e + pl) * i020 / ctx.time;
        if ctx.thermo.taubulk > RELAXATION_FLOOR {
            total -= ctx.state.bulk(ctx.inferred.p) / ctx.thermo.taubulk;
        }
        if ctx.thermo.taupi > RELAXATION_FLOOR {
            total += ctx.state.shear() / ctx.thermo.taupi;
        }
        total
    }

    fn dpt(&self, ctx: &FluxContext<'_>) -> f64 {
        let e = ctx.inferred.e;
        let pt = ctx.state.pt;
        if Self::is_ideal(ctx.thermo) {
            return -ctx.thermo.cs2 * (e + ctx.state.pl) / ctx.time;
        }

        let mbar = ctx.aniso.mbar(ctx.thermo.mass);
        let i221 = self
            .evaluator
            .i221(ctx.aniso.lambda, ctx.aniso.ax, ctx.aniso.az, mbar);
        let i001 = self
            .evaluator
            .i001(ctx.aniso.lambda, ctx.aniso.ax, ctx.aniso.az, mbar);
        let mdmde = self.eos.mdmde_quasiparticle(e);

        let mut total =
            (i221 - pt) / ctx.time + mdmde * (e + ctx.state.pl) * i001 / ctx.time;
        if ctx.thermo.taubulk > RELAXATION_FLOOR {
            total -= ctx.state.bulk(ctx.inferred.p) / ctx.thermo.taubulk;
        }
        if ctx.thermo.taupi > RELAXATION_FLOOR {
            total -= 0.5 * ctx.state.shear() / ctx.thermo.taupi;
        }
        total
    }

    fn db(&self, ctx: &FluxContext<'_>) -> f64 {
        let e = ctx.inferred.e;
        let mbar = ctx.aniso.mbar(ctx.thermo.mass);
        let i000 = self
            .evaluator
            .i000(ctx.aniso.lambda, ctx.aniso.ax, ctx.aniso.az, mbar);
        let mdmde = self.eos.mdmde_quasiparticle(e);

        let mut total = mdmde * (e + ctx.state.pl) * i000 / ctx.time;
        if ctx.thermo.taubulk > RELAXATION_FLOOR {
            total -= (ctx.state.b - ctx.thermo.beq) / ctx.thermo.taubulk;
        }
        total
    }
}
