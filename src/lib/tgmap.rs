//! Transcript→gene mapping built from a two-column text source.

use std::io::BufRead;
use std::path::Path;

use log::info;
use rustc_hash::FxHashMap;

use crate::catalog::TranscriptCatalog;
use crate::error::{QuantError, Result};
use crate::io::{open_text_reader, TokenReader};

/// Gene index assignment plus the transcript-index → gene-index map.
///
/// Gene indices are handed out in first-seen order starting at zero, so the
/// map also fixes the gene ordering the downstream optimizer reports in.
#[derive(Debug, Default)]
pub struct GeneMap {
    txp_to_gene: FxHashMap<u32, u32>,
    gene_index: FxHashMap<String, u32>,
    gene_names: Vec<String>,
}

impl GeneMap {
    /// Gene index for a transcript index, if mapped.
    #[inline]
    pub fn gene_of(&self, txp: u32) -> Option<u32> {
        self.txp_to_gene.get(&txp).copied()
    }

    /// Index previously assigned to a gene name.
    #[inline]
    pub fn index_of(&self, gene: &str) -> Option<u32> {
        self.gene_index.get(gene).copied()
    }

    /// Gene name for an assigned index.
    #[inline]
    pub fn gene_name(&self, index: u32) -> Option<&str> {
        self.gene_names.get(index as usize).map(|s| s.as_str())
    }

    pub fn num_genes(&self) -> usize {
        self.gene_names.len()
    }

    /// Number of mapped transcripts.
    pub fn len(&self) -> usize {
        self.txp_to_gene.len()
    }

    pub fn is_empty(&self) -> bool {
        self.txp_to_gene.is_empty()
    }

    fn assign(&mut self, txp: u32, gene: String) {
        let next = self.gene_names.len() as u32;
        let gid = match self.gene_index.get(&gene) {
            Some(&gid) => gid,
            None => {
                self.gene_index.insert(gene.clone(), next);
                self.gene_names.push(gene);
                next
            }
        };
        self.txp_to_gene.insert(txp, gid);
    }
}

/// Build the gene map from whitespace-separated `(transcript, gene)` pairs.
///
/// Pairs naming transcripts outside the catalog are skipped — the mapping
/// source may cover a wider universe than the quantified transcripts. After
/// the full pass every catalog transcript must be mapped; otherwise the build
/// fails reporting how many are missing.
pub fn read_tx_to_gene<P: AsRef<Path>>(
    path: P,
    transcripts: &TranscriptCatalog,
) -> Result<GeneMap> {
    let reader = open_text_reader(path.as_ref())?;
    read_tx_to_gene_from(reader, transcripts)
}

/// Build the gene map from an already-open token stream.
pub fn read_tx_to_gene_from<R: BufRead>(
    reader: R,
    transcripts: &TranscriptCatalog,
) -> Result<GeneMap> {
    let mut tokens = TokenReader::new(reader);
    let mut map = GeneMap::default();

    while let Some(tname) = tokens.next_token()? {
        let gname = tokens.expect_token("gene name")?;
        let Some(tid) = transcripts.index_of(&tname) else {
            continue;
        };
        map.assign(tid, gname);
    }

    if map.len() < transcripts.len() {
        return Err(QuantError::UnmappedTranscripts {
            missing: transcripts.len() - map.len(),
        });
    }

    info!("mapped {} transcripts onto {} genes", map.len(), map.num_genes());
    Ok(map)
}
