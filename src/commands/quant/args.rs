use std::path::PathBuf;
use structopt::StructOpt;

/// Arguments for the `quant` command.
#[derive(Debug, Clone, StructOpt)]
#[structopt(
    name = "quant",
    about = "Aggregate an equivalence-class (BFH) dump into per-cell UMI counts"
)]
pub struct QuantArgs {
    /// Path to the BFH equivalence-class file (may be gzipped).
    #[structopt(short, long, parse(from_os_str))]
    pub bfh: PathBuf,

    /// Path to the transcript-to-gene map (two whitespace-separated columns, no header).
    #[structopt(short, long, parse(from_os_str))]
    pub tgmap: PathBuf,

    /// Optional cell barcode whitelist; only reported in diagnostics.
    #[structopt(short, long, parse(from_os_str))]
    pub whitelist: Option<PathBuf>,

    /// Cell barcode length for the protocol in use.
    #[structopt(long = "barcode-length", default_value = "16")]
    pub barcode_length: usize,

    /// UMI length for the protocol in use.
    #[structopt(long = "umi-length", default_value = "12")]
    pub umi_length: usize,

    /// Number of threads for the downstream optimization stage (default: 10).
    #[structopt(short = "p", long, default_value = "10")]
    pub threads: usize,
}
