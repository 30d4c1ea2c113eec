#![deny(missing_docs)]
#![doc = "Generalized Gauss-Laguerre quadrature table and the momentum-space moment integrals of the squeezed quasiparticle distribution."]

mod moments;
mod table;

pub use moments::MomentEvaluator;
pub use table::{QuadratureTable, QUADRATURE_ORDERS, QUADRATURE_POINTS};
