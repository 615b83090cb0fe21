//! External barcode whitelist, loaded only for diagnostic reporting.
//!
//! Error correction against the whitelist and cell calling both live in
//! downstream components; this crate just counts overlap.

use std::io::BufRead;
use std::path::Path;

use rustc_hash::FxHashSet;

use crate::error::Result;
use crate::io::open_text_reader;

/// Read a newline-delimited barcode whitelist into a set.
pub fn read_whitelist<P: AsRef<Path>>(path: P) -> Result<FxHashSet<String>> {
    let reader = open_text_reader(path.as_ref())?;
    let mut barcodes = FxHashSet::default();

    for line in reader.lines() {
        let line = line?;
        let barcode = line.trim();
        if !barcode.is_empty() {
            barcodes.insert(barcode.to_string());
        }
    }

    Ok(barcodes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn reads_trimmed_unique_barcodes() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "AACC\nGGTT \n\nAACC\n").unwrap();
        file.flush().unwrap();

        let barcodes = read_whitelist(file.path()).unwrap();
        assert_eq!(barcodes.len(), 2);
        assert!(barcodes.contains("AACC"));
        assert!(barcodes.contains("GGTT"));
    }
}
