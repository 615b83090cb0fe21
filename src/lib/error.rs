//! Error types for the scquant library

use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum QuantError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("unexpected end of input while reading {0}")]
    UnexpectedEof(&'static str),

    #[error("invalid {field} token '{token}'")]
    InvalidToken { field: &'static str, token: String },

    #[error("barcode '{barcode}' has length {found}, expected {expected}")]
    BarcodeLength {
        barcode: String,
        expected: usize,
        found: usize,
    },

    #[error("equivalence class {class}: declared count {declared} disagrees with observed {observed}")]
    CountMismatch {
        class: usize,
        declared: u64,
        observed: u64,
    },

    #[error("equivalence class {class}: transcript index {index} out of range for {limit} transcripts")]
    TranscriptIndexOutOfRange {
        class: usize,
        index: u32,
        limit: usize,
    },

    #[error("equivalence class {class}: barcode index {index} out of range for {limit} barcodes")]
    BarcodeIndexOutOfRange {
        class: usize,
        index: u32,
        limit: usize,
    },

    #[error("transcript to gene map not found for {missing} transcripts")]
    UnmappedTranscripts { missing: usize },

    #[error("equivalence class file contains no reads")]
    EmptyBfh,
}

pub type Result<T> = std::result::Result<T, QuantError>;
