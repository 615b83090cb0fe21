//! Sequential reader for the BFH equivalence-class format.
//!
//! The file is a whitespace-delimited token stream in this order: three
//! counts (`num_txps num_bcs num_eqclasses`), the transcript names, the
//! barcode strings, then one block per equivalence class: label size, label
//! transcript indices, declared read count, barcode-group count, and per
//! barcode group the barcode index, UMI-group count, and `(umi, count)`
//! pairs. Class, group, and entry boundaries are only discoverable by reading
//! the preceding fields, so the parse is a single sequential pass.

use std::io::BufRead;
use std::path::Path;

use log::{debug, info};
use rustc_hash::FxHashMap;
use smartstring::alias::String as CompactString;

use crate::catalog::{BarcodeCatalog, TranscriptCatalog};
use crate::eqclass::{EqClassCounts, EqClassMap, TranscriptGroup};
use crate::error::{QuantError, Result};
use crate::io::{open_text_reader, TokenReader};
use crate::umi;
use crate::utils::PercentLogger;

/// Protocol geometry supplied by the caller.
///
/// One parser serves every chemistry; the lengths arrive as values instead of
/// one compiled specialization per protocol.
#[derive(Debug, Clone, Copy)]
pub struct ProtocolConfig {
    /// Expected length of every cell barcode string.
    pub barcode_length: usize,
    /// Expected length of every UMI sequence.
    pub umi_length: usize,
}

/// Running per-barcode total of deduplicatable UMI counts.
///
/// Grown monotonically during the parse; consumed downstream by the
/// cell-calling stage.
#[derive(Debug, Default)]
pub struct BarcodeFreqTable {
    counts: FxHashMap<CompactString, u64>,
}

impl BarcodeFreqTable {
    pub fn add(&mut self, barcode: &str, count: u64) {
        *self.counts.entry(CompactString::from(barcode)).or_insert(0) += count;
    }

    pub fn get(&self, barcode: &str) -> u64 {
        self.counts.get(barcode).copied().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.counts.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Sum over all barcodes.
    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }
}

/// Everything produced by one pass over a BFH file.
#[derive(Debug)]
pub struct BfhData {
    pub transcripts: TranscriptCatalog,
    pub barcodes: BarcodeCatalog,
    pub eqclasses: EqClassMap,
    pub barcode_freq: BarcodeFreqTable,
    pub num_reads: u64,
}

/// Parse a BFH file into catalogs plus the aggregated class map.
///
/// Any structural anomaly — wrong barcode length, per-class count mismatch,
/// out-of-range index, truncation — fails the whole parse. Downstream
/// quantification assumes a fully consistent input, so there is no partial
/// success mode.
pub fn read_bfh<P: AsRef<Path>>(path: P, protocol: &ProtocolConfig) -> Result<BfhData> {
    let reader = open_text_reader(path.as_ref())?;
    read_bfh_from(reader, protocol)
}

/// Parse an already-open BFH token stream.
///
/// Split out from [`read_bfh`] so embedders and tests can feed in-memory
/// buffers.
pub fn read_bfh_from<R: BufRead>(reader: R, protocol: &ProtocolConfig) -> Result<BfhData> {
    let mut tokens = TokenReader::new(reader);

    let num_txps: usize = tokens.expect_parsed("transcript count")?;
    let num_bcs: usize = tokens.expect_parsed("barcode count")?;
    let num_eqclasses: usize = tokens.expect_parsed("equivalence class count")?;

    let mut txp_names = Vec::with_capacity(num_txps);
    for _ in 0..num_txps {
        txp_names.push(tokens.expect_token("transcript name")?);
    }

    let mut bc_names = Vec::with_capacity(num_bcs);
    for _ in 0..num_bcs {
        let barcode = tokens.expect_token("barcode")?;
        if barcode.len() != protocol.barcode_length {
            return Err(QuantError::BarcodeLength {
                found: barcode.len(),
                expected: protocol.barcode_length,
                barcode,
            });
        }
        bc_names.push(barcode);
    }

    let eqclasses = EqClassMap::with_capacity(num_eqclasses);
    let mut barcode_freq = BarcodeFreqTable::default();
    let mut num_reads = 0u64;
    let mut dropped_umis = 0u64;
    let mut progress = PercentLogger::new("reading equivalence classes", num_eqclasses);

    for class in 0..num_eqclasses {
        let label_size: usize = tokens.expect_parsed("label size")?;
        let mut label = Vec::with_capacity(label_size);
        for _ in 0..label_size {
            let tid: u32 = tokens.expect_parsed("transcript index")?;
            if tid as usize >= num_txps {
                return Err(QuantError::TranscriptIndexOutOfRange {
                    class,
                    index: tid,
                    limit: num_txps,
                });
            }
            label.push(tid);
        }
        let group = TranscriptGroup::new(label);

        let declared: u64 = tokens.expect_parsed("class count")?;
        let bgroup_count: usize = tokens.expect_parsed("barcode group count")?;

        let mut validator = 0u64;
        for _ in 0..bgroup_count {
            let bc: u32 = tokens.expect_parsed("barcode index")?;
            if bc as usize >= num_bcs {
                return Err(QuantError::BarcodeIndexOutOfRange {
                    class,
                    index: bc,
                    limit: num_bcs,
                });
            }
            let ugroup_count: usize = tokens.expect_parsed("UMI group count")?;

            for _ in 0..ugroup_count {
                let umi_seq = tokens.expect_token("UMI sequence")?;
                let count: u32 = tokens.expect_parsed("UMI count")?;

                let encoded = if umi_seq.len() == protocol.umi_length {
                    umi::encode_umi(&umi_seq)
                } else {
                    None
                };

                match encoded {
                    Some(packed) => {
                        eqclasses.upsert(
                            group.clone(),
                            EqClassCounts::new(count, bc, packed),
                            |counts| counts.merge(bc, packed, count),
                        );
                        barcode_freq.add(&bc_names[bc as usize], u64::from(count));
                    }
                    None => dropped_umis += 1,
                }
                // Unencodable entries still count toward the declared total.
                validator += u64::from(count);
            }
        }

        if validator != declared {
            return Err(QuantError::CountMismatch {
                class,
                declared,
                observed: validator,
            });
        }
        num_reads += validator;
        progress.tick(1);
    }

    if dropped_umis > 0 {
        debug!("dropped {} UMI entries that could not be encoded", dropped_umis);
    }
    info!(
        "read {} reads across {} equivalence classes",
        num_reads,
        eqclasses.len()
    );

    Ok(BfhData {
        transcripts: TranscriptCatalog::from_names(txp_names),
        barcodes: BarcodeCatalog::from_names(bc_names),
        eqclasses,
        barcode_freq,
        num_reads,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eqclass::TranscriptGroup;
    use std::io::Cursor;
    use std::io::Write;

    fn protocol(barcode_length: usize, umi_length: usize) -> ProtocolConfig {
        ProtocolConfig {
            barcode_length,
            umi_length,
        }
    }

    const SMALL_BFH: &str = "\
2 1 1
T1
T2
AACCGGTT
2
0 1
3 1
0 2
AAAA 2
CCCC 1
";

    #[test]
    fn parses_the_small_example_end_to_end() {
        let data = read_bfh_from(Cursor::new(SMALL_BFH), &protocol(8, 4)).unwrap();

        assert_eq!(data.num_reads, 3);
        assert_eq!(data.transcripts.names(), &["T1".to_string(), "T2".to_string()]);
        assert_eq!(data.barcodes.names(), &["AACCGGTT".to_string()]);
        assert_eq!(data.eqclasses.len(), 1);

        let counts = data
            .eqclasses
            .get(&TranscriptGroup::new(vec![0, 1]))
            .unwrap();
        assert_eq!(counts.total, 3);
        let umis = &counts.barcode_groups[&0];
        assert_eq!(umis.len(), 2);
        let mut observed: Vec<u32> = umis.values().copied().collect();
        observed.sort_unstable();
        assert_eq!(observed, vec![1, 2]);

        assert_eq!(data.barcode_freq.get("AACCGGTT"), 3);
        assert_eq!(data.barcode_freq.total(), 3);
    }

    #[test]
    fn parses_from_a_file_on_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SMALL_BFH.as_bytes()).unwrap();
        file.flush().unwrap();

        let data = read_bfh(file.path(), &protocol(8, 4)).unwrap();
        assert_eq!(data.num_reads, 3);
    }

    #[test]
    fn parses_gzipped_input() {
        use flate2::write::GzEncoder;
        use flate2::Compression;

        let file = tempfile::Builder::new().suffix(".gz").tempfile().unwrap();
        let mut encoder = GzEncoder::new(file.reopen().unwrap(), Compression::default());
        encoder.write_all(SMALL_BFH.as_bytes()).unwrap();
        encoder.finish().unwrap();

        let data = read_bfh(file.path(), &protocol(8, 4)).unwrap();
        assert_eq!(data.num_reads, 3);
        assert_eq!(data.eqclasses.len(), 1);
    }

    #[test]
    fn declared_count_mismatch_fails_the_whole_parse() {
        let input = SMALL_BFH.replace("3 1", "4 1");
        let err = read_bfh_from(Cursor::new(input), &protocol(8, 4)).unwrap_err();
        match err {
            QuantError::CountMismatch {
                class,
                declared,
                observed,
            } => {
                assert_eq!(class, 0);
                assert_eq!(declared, 4);
                assert_eq!(observed, 3);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn wrong_barcode_length_aborts_immediately() {
        let input = SMALL_BFH.replace("AACCGGTT", "AACC");
        let err = read_bfh_from(Cursor::new(input), &protocol(8, 4)).unwrap_err();
        match err {
            QuantError::BarcodeLength {
                barcode,
                expected,
                found,
            } => {
                assert_eq!(barcode, "AACC");
                assert_eq!(expected, 8);
                assert_eq!(found, 4);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn unencodable_umi_still_counts_toward_the_declared_total() {
        let input = SMALL_BFH.replace("AAAA 2", "AANA 2");
        let data = read_bfh_from(Cursor::new(input), &protocol(8, 4)).unwrap();

        // The entry is excluded from aggregation but its count is accounted
        // for by the per-class validator and the grand total.
        assert_eq!(data.num_reads, 3);
        let counts = data
            .eqclasses
            .get(&TranscriptGroup::new(vec![0, 1]))
            .unwrap();
        assert_eq!(counts.total, 1);
        assert_eq!(counts.barcode_groups[&0].len(), 1);
        assert_eq!(data.barcode_freq.get("AACCGGTT"), 1);
    }

    #[test]
    fn umi_of_the_wrong_length_is_treated_as_unencodable() {
        let input = SMALL_BFH.replace("AAAA 2", "AAAAA 2");
        let data = read_bfh_from(Cursor::new(input), &protocol(8, 4)).unwrap();
        assert_eq!(data.num_reads, 3);
        let counts = data
            .eqclasses
            .get(&TranscriptGroup::new(vec![0, 1]))
            .unwrap();
        assert_eq!(counts.total, 1);
    }

    #[test]
    fn transcript_index_out_of_range_is_rejected() {
        let input = SMALL_BFH.replace("0 1\n3 1", "0 5\n3 1");
        let err = read_bfh_from(Cursor::new(input), &protocol(8, 4)).unwrap_err();
        assert!(matches!(
            err,
            QuantError::TranscriptIndexOutOfRange {
                class: 0,
                index: 5,
                limit: 2
            }
        ));
    }

    #[test]
    fn barcode_index_out_of_range_is_rejected() {
        let input = SMALL_BFH.replace("0 2\nAAAA", "3 2\nAAAA");
        let err = read_bfh_from(Cursor::new(input), &protocol(8, 4)).unwrap_err();
        assert!(matches!(
            err,
            QuantError::BarcodeIndexOutOfRange {
                class: 0,
                index: 3,
                limit: 1
            }
        ));
    }

    #[test]
    fn truncated_input_fails_with_the_missing_field() {
        let input = "2 1 1\nT1\nT2\nAACCGGTT\n2\n0 1\n3 1\n0 2\nAAAA";
        let err = read_bfh_from(Cursor::new(input), &protocol(8, 4)).unwrap_err();
        assert!(matches!(err, QuantError::UnexpectedEof("UMI count")));
    }

    #[test]
    fn repeated_class_labels_merge_into_one_entry() {
        let input = "\
2 1 2
T1
T2
AACCGGTT
2
0 1
1 1
0 1
AAAA 1
2
1 0
1 1
0 1
AAAA 1
";
        let data = read_bfh_from(Cursor::new(input), &protocol(8, 4)).unwrap();
        assert_eq!(data.num_reads, 2);
        assert_eq!(data.eqclasses.len(), 1);

        let counts = data
            .eqclasses
            .get(&TranscriptGroup::new(vec![0, 1]))
            .unwrap();
        assert_eq!(counts.total, 2);
        // Same barcode and UMI observed in both blocks: counts accumulate.
        assert_eq!(counts.barcode_groups[&0][&umi::encode_umi("AAAA").unwrap()], 2);
    }

    #[test]
    fn empty_class_list_yields_zero_reads() {
        let input = "1 1 0\nT1\nAACCGGTT\n";
        let data = read_bfh_from(Cursor::new(input), &protocol(8, 4)).unwrap();
        assert_eq!(data.num_reads, 0);
        assert!(data.eqclasses.is_empty());
    }
}
