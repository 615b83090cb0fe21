//! Orchestration: BFH parse, gene mapping, and the downstream handoff.

use std::path::PathBuf;

use log::info;

use crate::bfh::{self, BarcodeFreqTable, BfhData, ProtocolConfig};
use crate::catalog::BarcodeCatalog;
use crate::eqclass::EqClassMap;
use crate::error::{QuantError, Result};
use crate::tgmap::{self, GeneMap};
use crate::whitelist;

/// Inputs for one quantification run.
#[derive(Debug, Clone)]
pub struct QuantOpts {
    /// Path to the equivalence-class (BFH) file.
    pub bfh: PathBuf,
    /// Path to the transcript-to-gene mapping source.
    pub tgmap: PathBuf,
    /// Optional external whitelist, reported in diagnostics only.
    pub whitelist: Option<PathBuf>,
    /// Barcode and UMI geometry of the protocol in use.
    pub protocol: ProtocolConfig,
}

/// The aggregate bundle handed to the downstream per-cell optimizer.
///
/// Ownership moves with the value; once handed over, the optimizer is the
/// last owner of the class map and frequency table.
#[derive(Debug)]
pub struct QuantInput {
    pub eqclasses: EqClassMap,
    pub barcodes: BarcodeCatalog,
    pub gene_map: GeneMap,
    pub barcode_freq: BarcodeFreqTable,
}

/// Seam for the external optimization stage that resolves multi-transcript
/// classes into per-gene estimates. This crate declares the interface only.
pub trait CellOptimizer {
    fn optimize(&mut self, input: QuantInput) -> Result<()>;
}

/// Diagnostic counters reported after ingestion.
#[derive(Debug, Clone, Copy, Default)]
pub struct QuantSummary {
    pub num_reads: u64,
    pub num_transcripts: usize,
    pub num_barcodes: usize,
    pub num_eqclasses: usize,
    pub num_genes: usize,
    /// Whitelist size and its overlap with parsed barcodes, when given.
    pub whitelisted: Option<(usize, usize)>,
}

/// Run ingestion end to end and assemble the downstream handoff bundle.
///
/// Sequence: optional whitelist diagnostics, the BFH parse (zero parsed reads
/// is fatal), then gene mapping against the parsed transcript catalog.
pub fn prepare(opts: &QuantOpts) -> Result<(QuantInput, QuantSummary)> {
    let whitelist = match &opts.whitelist {
        Some(path) => {
            let barcodes = whitelist::read_whitelist(path)?;
            info!("imported {} whitelisted barcodes", barcodes.len());
            Some(barcodes)
        }
        None => None,
    };

    let BfhData {
        transcripts,
        barcodes,
        eqclasses,
        barcode_freq,
        num_reads,
    } = bfh::read_bfh(&opts.bfh, &opts.protocol)?;

    if num_reads == 0 {
        return Err(QuantError::EmptyBfh);
    }

    let whitelisted = whitelist.map(|wl| {
        let overlap = barcodes
            .names()
            .iter()
            .filter(|bc| wl.contains(bc.as_str()))
            .count();
        (wl.len(), overlap)
    });

    let gene_map = tgmap::read_tx_to_gene(&opts.tgmap, &transcripts)?;

    let summary = QuantSummary {
        num_reads,
        num_transcripts: transcripts.len(),
        num_barcodes: barcodes.len(),
        num_eqclasses: eqclasses.len(),
        num_genes: gene_map.num_genes(),
        whitelisted,
    };

    Ok((
        QuantInput {
            eqclasses,
            barcodes,
            gene_map,
            barcode_freq,
        },
        summary,
    ))
}
