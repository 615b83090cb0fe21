//! The `quant` subcommand: BFH ingestion and aggregation.

mod args;
mod workflow;

pub use args::QuantArgs;
pub use workflow::run_quant;
