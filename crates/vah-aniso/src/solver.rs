use std::sync::Arc;

use serde::{Deserialize, Serialize};

use vah_core::{AnisoVars, EquationOfState, SolveError, DENOM_FLOOR};
use vah_quad::MomentEvaluator;

fn default_max_iters() -> usize {
    100
}

fn default_tolerance() -> f64 {
    1.0e-10
}

fn default_residual_tolerance() -> f64 {
    1.0e-11
}

// Below this mass-to-temperature ratio the three-parameter matching is
// degenerate (the massless descriptor has a redundant scaling direction);
// the solve drops to two unknowns with the transverse shape held fixed.
const MASSLESS_Z_FLOOR: f64 = 1.0e-4;

// A Newton step may be halved this many times to stay inside the physical
// domain before the iterate is declared non-physical.
const MAX_STEP_HALVINGS: usize = 10;

// Change-based convergence is only accepted once the scaled residual has
// also dropped below this gate, so a stalled iteration cannot masquerade as
// a converged one.
const RESIDUAL_GATE: f64 = 1.0e-6;

/// Newton-iteration controls for the anisotropic-variable solve.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SolverOpts {
    /// Maximum Newton iterations.
    #[serde(default = "default_max_iters")]
    pub max_iters: usize,
    /// Relative-change tolerance on all three unknowns.
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
    /// Scaled residual level at which the targets count as already matched.
    #[serde(default = "default_residual_tolerance")]
    pub residual_tolerance: f64,
}

impl Default for SolverOpts {
    fn default() -> Self {
        Self {
            max_iters: default_max_iters(),
            tolerance: default_tolerance(),
            residual_tolerance: default_residual_tolerance(),
        }
    }
}

/// Solves the macroscopic targets `(e, pl, pt)` for the anisotropy
/// descriptor `(lambda, ax, az)` by multivariate Newton iteration.
///
/// The residual vector is `(Ea - e, PLa - pl, PTa - pt)`; the analytic
/// Jacobian is assembled from the auxiliary moments at fixed reduced mass,
/// which is recomputed from the equation of state between iterations. The
/// solver is stateless: the previous solution enters only as the initial
/// guess.
#[derive(Clone)]
pub struct AnisoSolver {
    evaluator: MomentEvaluator,
    eos: Arc<dyn EquationOfState>,
    opts: SolverOpts,
}

impl std::fmt::Debug for AnisoSolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnisoSolver")
            .field("opts", &self.opts)
            .finish_non_exhaustive()
    }
}

impl AnisoSolver {
    /// Creates a solver over the shared moment evaluator and medium.
    pub fn new(evaluator: MomentEvaluator, eos: Arc<dyn EquationOfState>, opts: SolverOpts) -> Self {
        Self {
            evaluator,
            eos,
            opts,
        }
    }

    /// Shared moment evaluator.
    pub fn evaluator(&self) -> &MomentEvaluator {
        &self.evaluator
    }

    /// Recovers the anisotropy descriptor matching the targets.
    ///
    /// `b` is carried for interface completeness: it influences the solve
    /// only through the effective mass, which the quasiparticle model ties
    /// to `e`. Fails with [`SolveError::NoConvergence`] when the iteration
    /// budget is exhausted and [`SolveError::NonPhysical`] when an iterate
    /// cannot be kept inside the positive domain.
    pub fn solve(
        &self,
        e: f64,
        pl: f64,
        pt: f64,
        b: f64,
        guess: AnisoVars,
    ) -> Result<AnisoVars, SolveError> {
        debug_assert!(b.is_finite());
        if !guess.is_physical() {
            return Err(SolveError::NonPhysical {
                iteration: 0,
                lambda: guess.lambda,
                ax: guess.ax,
                az: guess.az,
            });
        }

        let temperature = self.eos.effective_temperature(e);
        let mass = self.eos.effective_mass(temperature);
        let massless = self.eos.z_quasiparticle(temperature) < MASSLESS_Z_FLOOR;
        let scale = e.abs().max(DENOM_FLOOR);

        let mut x = guess;
        let mut residual = f64::MAX;

        for iteration in 1..=self.opts.max_iters {
            let mbar = x.mbar(mass);
            let ea = self.evaluator.ea(x.lambda, x.ax, x.az, mbar);
            let pla = self.evaluator.pla(x.lambda, x.ax, x.az, mbar);
            let pta = self.evaluator.pta(x.lambda, x.ax, x.az, mbar);
            let f = [ea - e, pla - pl, pta - pt];
            residual = f.iter().fold(0.0_f64, |acc, fi| acc.max(fi.abs())) / scale;
            if residual < self.opts.residual_tolerance {
                return Ok(x);
            }

            let delta = if massless {
                self.massless_step(&x, mbar, ea, pla, &f)
            } else {
                self.massive_step(&x, mbar, mass, ea, pla, pta, &f)
            };
            let Some(mut delta) = delta else {
                return Err(SolveError::NoConvergence {
                    iterations: iteration,
                    residual,
                });
            };

            let mut halvings = 0;
            while !step_stays_physical(&x, &delta) {
                if halvings == MAX_STEP_HALVINGS {
                    return Err(SolveError::NonPhysical {
                        iteration,
                        lambda: x.lambda + delta[0],
                        ax: x.ax + delta[1],
                        az: x.az + delta[2],
                    });
                }
                for component in delta.iter_mut() {
                    *component *= 0.5;
                }
                halvings += 1;
            }

            x = AnisoVars {
                lambda: x.lambda + delta[0],
                ax: x.ax + delta[1],
                az: x.az + delta[2],
            };
            let change = (delta[0] / x.lambda)
                .abs()
                .max((delta[1] / x.ax).abs())
                .max((delta[2] / x.az).abs());
            if change < self.opts.tolerance && residual < RESIDUAL_GATE {
                return Ok(x);
            }
        }

        Err(SolveError::NoConvergence {
            iterations: self.opts.max_iters,
            residual,
        })
    }

    /// Full three-parameter Newton step from the analytic Jacobian.
    fn massive_step(
        &self,
        x: &AnisoVars,
        mbar: f64,
        mass: f64,
        ea: f64,
        pla: f64,
        pta: f64,
        f: &[f64; 3],
    ) -> Option<[f64; 3]> {
        let i240 = self.evaluator.i240(x.lambda, x.ax, x.az, mbar);
        let i221 = self.evaluator.i221(x.lambda, x.ax, x.az, mbar);
        let i001 = self.evaluator.i001(x.lambda, x.ax, x.az, mbar);
        let msq = mass * mass;
        let jacobian = [
            [
                4.0 * ea / x.lambda,
                2.0 * (ea + pta) / x.ax,
                (ea + pla) / x.az,
            ],
            [
                4.0 * pla / x.lambda,
                2.0 * (pla - i221) / x.ax,
                (3.0 * pla - i240) / x.az,
            ],
            [
                4.0 * pta / x.lambda,
                (3.0 * pta + i221 + msq * i001) / x.ax,
                (pta - i221) / x.az,
            ],
        ];
        solve3(&jacobian, &[-f[0], -f[1], -f[2]])
    }

    /// Two-parameter step for the massless limit: `ax` is held fixed (the
    /// redundant scaling direction) and only `(lambda, az)` are updated; the
    /// transverse residual then follows from the traceless identity.
    fn massless_step(
        &self,
        x: &AnisoVars,
        mbar: f64,
        ea: f64,
        pla: f64,
        f: &[f64; 3],
    ) -> Option<[f64; 3]> {
        let i240 = self.evaluator.i240(x.lambda, x.ax, x.az, mbar);
        let j00 = 4.0 * ea / x.lambda;
        let j01 = (ea + pla) / x.az;
        let j10 = 4.0 * pla / x.lambda;
        let j11 = (3.0 * pla - i240) / x.az;
        let det = j00 * j11 - j01 * j10;
        let norm = (j00.abs() + j01.abs()) * (j10.abs() + j11.abs());
        if det.abs() < 1.0e-13 * norm.max(DENOM_FLOOR) {
            return None;
        }
        let dl = (-f[0] * j11 + f[1] * j01) / det;
        let daz = (-f[1] * j00 + f[0] * j10) / det;
        Some([dl, 0.0, daz])
    }
}

fn step_stays_physical(x: &AnisoVars, delta: &[f64; 3]) -> bool {
    x.lambda + delta[0] > 0.0 && x.ax + delta[1] > 0.0 && x.az + delta[2] > 0.0
}

/// Cramer solve of a 3x3 system; `None` when the matrix is numerically
/// singular relative to its row magnitudes.
fn solve3(a: &[[f64; 3]; 3], rhs: &[f64; 3]) -> Option<[f64; 3]> {
    let minor = |r0: usize, r1: usize, c0: usize, c1: usize| {
        a[r0][c0] * a[r1][c1] - a[r0][c1] * a[r1][c0]
    };
    let det = a[0][0] * minor(1, 2, 1, 2) - a[0][1] * minor(1, 2, 0, 2) + a[0][2] * minor(1, 2, 0, 1);
    let norm: f64 = a
        .iter()
        .map(|row| row.iter().map(|v| v.abs()).sum::<f64>())
        .product();
    if det.abs() < 1.0e-13 * norm.max(DENOM_FLOOR) {
        return None;
    }

    let mut solution = [0.0; 3];
    for (column, slot) in solution.iter_mut().enumerate() {
        let mut replaced = *a;
        for row in 0..3 {
            replaced[row][column] = rhs[row];
        }
        let d = replaced[0][0] * (replaced[1][1] * replaced[2][2] - replaced[1][2] * replaced[2][1])
            - replaced[0][1] * (replaced[1][0] * replaced[2][2] - replaced[1][2] * replaced[2][0])
            + replaced[0][2] * (replaced[1][0] * replaced[2][1] - replaced[1][1] * replaced[2][0]);
        *slot = d / det;
    }
    Some(solution)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn solve3_inverts_a_known_system() {
        let a = [[2.0, 0.0, 0.0], [0.0, 4.0, 0.0], [1.0, 0.0, 1.0]];
        let x = solve3(&a, &[2.0, 8.0, 4.0]).expect("regular system");
        assert!((x[0] - 1.0).abs() < 1e-14);
        assert!((x[1] - 2.0).abs() < 1e-14);
        assert!((x[2] - 3.0).abs() < 1e-14);
    }

    #[test]
    fn solve3_rejects_singular_systems() {
        let a = [[1.0, 2.0, 3.0], [2.0, 4.0, 6.0], [0.5, 1.0, 1.5]];
        assert!(solve3(&a, &[1.0, 2.0, 0.5]).is_none());
    }
}
