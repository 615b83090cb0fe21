use anyhow::Result;
use log::info;

use scquant_lib::bfh::ProtocolConfig;
use scquant_lib::quant::{self, QuantOpts};

use super::args::QuantArgs;
use crate::commands::common;

/// Entry point for the `quant` command.
///
/// Ingests the BFH and the gene map, then reports the bundle that flows to
/// the downstream per-cell optimization stage.
pub fn run_quant(args: QuantArgs) -> Result<()> {
    let active_threads = common::configure_global_thread_pool(args.threads)?;
    info!("Using {} worker threads for downstream stages", active_threads);

    let opts = QuantOpts {
        bfh: args.bfh,
        tgmap: args.tgmap,
        whitelist: args.whitelist,
        protocol: ProtocolConfig {
            barcode_length: args.barcode_length,
            umi_length: args.umi_length,
        },
    };

    info!("Reading BFH from {:?}", opts.bfh);
    let (input, summary) = quant::prepare(&opts)?;

    info!(
        "Found {} reads across {} equivalence classes",
        summary.num_reads, summary.num_eqclasses
    );
    info!(
        "{} barcodes, {} transcripts, {} genes",
        summary.num_barcodes, summary.num_transcripts, summary.num_genes
    );
    if let Some((size, overlap)) = summary.whitelisted {
        info!(
            "{} of {} parsed barcodes appear in the {}-entry whitelist",
            overlap, summary.num_barcodes, size
        );
    }
    info!(
        "Frequency table covers {} barcodes totalling {} deduplicatable counts",
        input.barcode_freq.len(),
        input.barcode_freq.total()
    );

    // `input` is the handoff bundle; the optimization stage that consumes it
    // is a separate component and becomes its last owner.
    Ok(())
}
