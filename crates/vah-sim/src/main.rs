use clap::{Parser, Subcommand};

mod commands;
mod config;
mod manifest;

use commands::{run, tabulate};

#[derive(Parser, Debug)]
#[command(name = "vah-sim", about = "Boost-invariant anisotropic hydrodynamics runner")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Evolve the medium from a YAML configuration and write the
    /// time-series tables.
    Run(run::RunArgs),
    /// Generate the Gauss-Laguerre quadrature resource file.
    Tabulate(tabulate::TabulateArgs),
}

fn main() {
    let cli = Cli::parse();
    let result = match cli.command {
        Command::Run(args) => run::execute(&args),
        Command::Tabulate(args) => tabulate::execute(&args),
    };
    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
