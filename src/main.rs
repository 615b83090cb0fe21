//! scquant - single-cell quantification ingestion
//!
//! scquant consumes the text-encoded equivalence-class dump (BFH) emitted by
//! an upstream alignment stage and aggregates it into the per-cell, per-UMI
//! count structures consumed by a downstream per-cell optimizer, together
//! with the transcript-to-gene index mapping.
//!
//! # Usage
//!
//! ```bash
//! # Aggregate a BFH dump with a transcript-to-gene map
//! scquant quant --bfh counts.bfh --tgmap t2g.tsv
//!
//! # Report whitelist overlap and override the protocol geometry
//! scquant quant --bfh counts.bfh.gz --tgmap t2g.tsv \
//!     --whitelist barcodes.txt --barcode-length 16 --umi-length 10
//! ```
//!
//! For more detailed usage information, see the documentation for the
//! subcommand.

pub mod commands;

use anyhow::Result;
use env_logger::Env;
use log::*;
use scquant_lib::utils;
use structopt::StructOpt;

#[derive(StructOpt)]
#[structopt(rename_all = "kebab-case", about)]
/// Commands for aggregating single-cell equivalence-class files
struct Args {
    #[structopt(subcommand)]
    subcommand: Subcommand,
}

#[derive(StructOpt)]
enum Subcommand {
    /// Aggregate a BFH equivalence-class dump into per-cell UMI counts
    Quant(commands::QuantArgs),
}

impl Subcommand {
    fn run(self) -> Result<()> {
        match self {
            Subcommand::Quant(args) => commands::run_quant(args)?,
        }
        Ok(())
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    if let Err(err) = Args::from_args().subcommand.run() {
        if utils::is_broken_pipe(&err) {
            std::process::exit(0);
        }
        error!("{}", err);
        std::process::exit(1);
    }
    Ok(())
}
