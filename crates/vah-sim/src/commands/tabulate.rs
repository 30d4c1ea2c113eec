use std::path::PathBuf;

use clap::Args as ClapArgs;

use vah_core::VahError;
use vah_quad::{QuadratureTable, QUADRATURE_ORDERS, QUADRATURE_POINTS};

#[derive(ClapArgs, Debug)]
pub struct TabulateArgs {
    /// Output path for the resource file; defaults to the canonical name in
    /// the working directory.
    #[arg(long)]
    pub out: Option<PathBuf>,
}

pub fn execute(args: &TabulateArgs) -> Result<(), VahError> {
    let path = args
        .out
        .clone()
        .unwrap_or_else(|| PathBuf::from(QuadratureTable::resource_name()));
    let table = QuadratureTable::generate();
    table.write(&path).map_err(|err| VahError::Output {
        path: path.display().to_string(),
        detail: err.to_string(),
    })?;
    println!(
        "wrote {QUADRATURE_ORDERS} orders x {QUADRATURE_POINTS} points to {}",
        path.display()
    );
    Ok(())
}
