use std::path::PathBuf;
use std::process::ExitCode;
use anyhow::Result;
use clap::{Parser, Subcommand};
use flusvd::prelude::*;

#[derive(Parser)]
#[command(name = "flusvd")]
#[command(about = "Influenza season matrices on the MMWR calendar and their SVD factors")]
struct Args
{
    /// Root directory of `data/` inputs and `analysis_data/` outputs
    #[arg(long, global = true, default_value = ".")]
    root: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command
{
    /// Format raw admissions onto the season calendar
    Format,
    /// Admissions per 100 000 residents
    Popnorm,
    /// Per-location z-scores
    Zscore,
    /// SVD of the population-normalized and z-score matrices
    Svd {
        /// Max number of kept components
        #[arg(long)]
        n_components: Option<usize>,
    },
    /// Every step, writing only after all of them succeed
    All {
        /// Max number of kept components
        #[arg(long)]
        n_components: Option<usize>,
    },
}

fn run(args: Args) -> Result<Vec<Written>>
{
    let n_components = match args.command {
        Command::Svd {n_components} | Command::All {n_components} => n_components,
        _ => None,
    };

    let pipeline = Pipeline::new().par(|p| {
        p.root = args.root;
        p.n_components = n_components;
    });
    log::debug!("{:?}", pipeline.par);

    let written = match args.command {
        Command::Format => pipeline.format()?,
        Command::Popnorm => pipeline.popnorm()?,
        Command::Zscore => pipeline.zscore()?,
        Command::Svd {..} => pipeline.svd()?,
        Command::All {..} => pipeline.all()?,
    };

    Ok(written)
}

/// main
fn main() -> ExitCode
{
    env_logger::init();

    match run(Args::parse()) {
        Ok(written) => {
            for w in written {
                println!("{}", w);
            }
            ExitCode::SUCCESS
        },
        Err(e) => {
            eprintln!("ERROR: {}", e);
            ExitCode::FAILURE
        },
    }
}
