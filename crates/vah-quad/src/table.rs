use std::fs;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use vah_core::LoadError;

/// Number of generalized-Laguerre orders held by the table.
pub const QUADRATURE_ORDERS: usize = 21;

/// Number of quadrature points per order.
pub const QUADRATURE_POINTS: usize = 64;

const NEWTON_EPS: f64 = 1.0e-14;
const NEWTON_MAX: usize = 100;

/// Immutable table of generalized Gauss-Laguerre nodes and weights for
/// orders `0..21` at 64 points each.
///
/// Loaded once at process startup (or generated in place); never mutated
/// afterwards, so it is shared freely across evaluator call sites.
#[derive(Debug, Clone, PartialEq)]
pub struct QuadratureTable {
    nodes: Vec<f64>,
    weights: Vec<f64>,
}

impl QuadratureTable {
    /// Canonical resource file name for the compiled-in point count.
    pub fn resource_name() -> String {
        format!("gla_roots_weights_{QUADRATURE_POINTS}_points.txt")
    }

    /// Loads the table from its fixed-format text resource.
    ///
    /// Each logical row is an order index followed by a node and a weight;
    /// rows are laid out for orders `0..21` consecutively, 64 rows per order.
    /// Loading fails atomically: a missing file yields
    /// [`LoadError::ResourceMissing`], any row that does not parse into an
    /// index plus two reals yields [`LoadError::MalformedEntry`] naming the
    /// offending row, and no partial table is ever returned.
    pub fn load(path: impl AsRef<Path>) -> Result<QuadratureTable, LoadError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|err| LoadError::ResourceMissing {
            path: path.display().to_string(),
            detail: err.to_string(),
        })?;

        let mut tokens = contents.split_whitespace();
        let total = QUADRATURE_ORDERS * QUADRATURE_POINTS;
        let mut nodes = Vec::with_capacity(total);
        let mut weights = Vec::with_capacity(total);

        for row in 1..=total {
            let malformed = || LoadError::MalformedEntry {
                row,
                order: (row - 1) / QUADRATURE_POINTS,
                point: (row - 1) % QUADRATURE_POINTS,
            };
            let index = tokens.next().ok_or_else(malformed)?;
            index.parse::<i64>().map_err(|_| malformed())?;
            let node = tokens
                .next()
                .and_then(|tok| tok.parse::<f64>().ok())
                .ok_or_else(malformed)?;
            let weight = tokens
                .next()
                .and_then(|tok| tok.parse::<f64>().ok())
                .ok_or_else(malformed)?;
            nodes.push(node);
            weights.push(weight);
        }

        Ok(QuadratureTable { nodes, weights })
    }

    /// Computes the table in place, without an on-disk resource.
    ///
    /// Nodes are found by Newton iteration on the generalized-Laguerre
    /// recurrence; weights follow from the derivative at each root.
    pub fn generate() -> QuadratureTable {
        let total = QUADRATURE_ORDERS * QUADRATURE_POINTS;
        let mut nodes = vec![0.0; total];
        let mut weights = vec![0.0; total];
        for order in 0..QUADRATURE_ORDERS {
            let offset = order * QUADRATURE_POINTS;
            gauss_laguerre(
                order,
                &mut nodes[offset..offset + QUADRATURE_POINTS],
                &mut weights[offset..offset + QUADRATURE_POINTS],
            );
        }
        QuadratureTable { nodes, weights }
    }

    /// Writes the table in the resource format accepted by [`Self::load`].
    pub fn write(&self, path: impl AsRef<Path>) -> std::io::Result<()> {
        let mut file = File::create(path)?;
        for order in 0..QUADRATURE_ORDERS {
            for point in 0..QUADRATURE_POINTS {
                writeln!(
                    file,
                    "{} {:.16e} {:.16e}",
                    order,
                    self.node(order, point),
                    self.weight(order, point)
                )?;
            }
        }
        Ok(())
    }

    /// Quadrature node for the given order and point.
    ///
    /// Panics if either index is out of range; both are compile-time-known
    /// loop bounds at every call site.
    pub fn node(&self, order: usize, point: usize) -> f64 {
        assert!(order < QUADRATURE_ORDERS && point < QUADRATURE_POINTS);
        self.nodes[order * QUADRATURE_POINTS + point]
    }

    /// Quadrature weight for the given order and point.
    ///
    /// Panics if either index is out of range.
    pub fn weight(&self, order: usize, point: usize) -> f64 {
        assert!(order < QUADRATURE_ORDERS && point < QUADRATURE_POINTS);
        self.weights[order * QUADRATURE_POINTS + point]
    }
}

/// Nodes and weights for `int_0^inf x^alpha e^{-x} f(x) dx` at the slice's
/// point count, via Newton iteration with the classical initial guesses.
fn gauss_laguerre(order: usize, nodes: &mut [f64], weights: &mut [f64]) {
    let n = nodes.len();
    let nf = n as f64;
    let alpha = order as f64;
    let mut z = 0.0;

    for i in 0..n {
        if i == 0 {
            z = (1.0 + alpha) * (3.0 + 0.92 * alpha) / (1.0 + 2.4 * nf + 1.8 * alpha);
        } else if i == 1 {
            z += (15.0 + 6.25 * alpha) / (1.0 + 0.9 * alpha + 2.5 * nf);
        } else {
            let ai = (i - 1) as f64;
            z += ((1.0 + 2.55 * ai) / (1.9 * ai) + 1.26 * ai * alpha / (1.0 + 3.5 * ai))
                * (z - nodes[i - 2])
                / (1.0 + 0.3 * alpha);
        }

        let mut below = 0.0;
        let mut derivative = 1.0;
        for _ in 0..NEWTON_MAX {
            let mut value = 1.0;
            let mut prev = 0.0;
            for j in 0..n {
                let jf = j as f64;
                let older = prev;
                prev = value;
                value = ((2.0 * jf + 1.0 + alpha - z) * prev - (jf + alpha) * older) / (jf + 1.0);
            }
            below = prev;
            derivative = (nf * value - (nf + alpha) * prev) / z;
            let z1 = z;
            z = z1 - value / derivative;
            if (z - z1).abs() <= NEWTON_EPS * z.abs().max(1.0) {
                break;
            }
        }

        nodes[i] = z;
        weights[i] = -gamma_ratio(n, order) / (derivative * nf * below);
    }
}

/// `Gamma(n + alpha) / Gamma(n)` for integer `alpha`.
fn gamma_ratio(n: usize, alpha: usize) -> f64 {
    let mut ratio = 1.0;
    for k in 0..alpha {
        ratio *= (n + k) as f64;
    }
    ratio
}
