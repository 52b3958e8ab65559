use std::error::Error;

use clap::{Parser, Subcommand};
use commands::{
    couplings::{self, CouplingsArgs},
    metropolis::{self, MetropolisArgs},
    neural::{self, NeuralArgs},
    reweight::{self, ReweightArgs},
};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser, Debug)]
#[command(name = "sg-sim", about = "Spin-glass lattice generator and sampler CLI")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Draw a coupling graph and write it as a coupling file.
    Couplings(CouplingsArgs),
    /// Reweight a model sample archive toward the Boltzmann distribution.
    Reweight(ReweightArgs),
    /// Run a single-spin-flip Metropolis chain.
    Metropolis(MetropolisArgs),
    /// Run an independent-proposal chain over a model sample archive.
    NeuralMcmc(NeuralArgs),
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("sg_sim=info".parse()?)
                .add_directive("sg_mcmc=info".parse()?),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Couplings(args) => couplings::run(&args),
        Command::Reweight(args) => reweight::run(&args),
        Command::Metropolis(args) => metropolis::run(&args),
        Command::NeuralMcmc(args) => neural::run(&args),
    }
}
