//! Input plumbing: gz-aware readers and a whitespace token stream.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::str::FromStr;

use flate2::read::GzDecoder;

use crate::error::{QuantError, Result};

const READER_CAPACITY: usize = 256 * 1024;

/// Open a text input, transparently decompressing when the path ends in `.gz`.
pub fn open_text_reader<P: AsRef<Path>>(path: P) -> Result<Box<dyn BufRead + Send>> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let reader: Box<dyn BufRead + Send> = if path
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| s.eq_ignore_ascii_case("gz"))
        .unwrap_or(false)
    {
        Box::new(BufReader::with_capacity(READER_CAPACITY, GzDecoder::new(file)))
    } else {
        Box::new(BufReader::with_capacity(READER_CAPACITY, file))
    };

    Ok(reader)
}

/// Streaming whitespace tokenizer over a buffered reader.
///
/// Tokens may span line boundaries; any run of ASCII whitespace separates
/// them. This matches the extraction semantics of the upstream tools that
/// emit the equivalence-class and gene-map formats.
pub struct TokenReader<R: BufRead> {
    inner: R,
}

impl<R: BufRead> TokenReader<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    /// Next whitespace-delimited token, or `None` at end of stream.
    pub fn next_token(&mut self) -> Result<Option<String>> {
        loop {
            let buf = self.inner.fill_buf()?;
            if buf.is_empty() {
                return Ok(None);
            }
            match buf.iter().position(|b| !b.is_ascii_whitespace()) {
                Some(start) => {
                    self.inner.consume(start);
                    break;
                }
                None => {
                    let len = buf.len();
                    self.inner.consume(len);
                }
            }
        }

        let mut token = Vec::new();
        loop {
            let buf = self.inner.fill_buf()?;
            if buf.is_empty() {
                break;
            }
            match buf.iter().position(|b| b.is_ascii_whitespace()) {
                Some(end) => {
                    token.extend_from_slice(&buf[..end]);
                    self.inner.consume(end + 1);
                    break;
                }
                None => {
                    token.extend_from_slice(buf);
                    let len = buf.len();
                    self.inner.consume(len);
                }
            }
        }

        match String::from_utf8(token) {
            Ok(token) => Ok(Some(token)),
            Err(err) => Err(QuantError::InvalidToken {
                field: "token",
                token: String::from_utf8_lossy(err.as_bytes()).into_owned(),
            }),
        }
    }

    /// Read a required token, naming the field in the truncation error.
    pub fn expect_token(&mut self, field: &'static str) -> Result<String> {
        self.next_token()?.ok_or(QuantError::UnexpectedEof(field))
    }

    /// Read a required token and parse it, naming the field on failure.
    pub fn expect_parsed<T: FromStr>(&mut self, field: &'static str) -> Result<T> {
        let token = self.expect_token(field)?;
        token
            .parse::<T>()
            .map_err(|_| QuantError::InvalidToken { field, token })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn tokens_span_lines_and_tabs() {
        let mut tokens = TokenReader::new(Cursor::new("alpha\tbeta\n  gamma\n\n7"));
        assert_eq!(tokens.next_token().unwrap().as_deref(), Some("alpha"));
        assert_eq!(tokens.next_token().unwrap().as_deref(), Some("beta"));
        assert_eq!(tokens.next_token().unwrap().as_deref(), Some("gamma"));
        assert_eq!(tokens.expect_parsed::<u32>("number").unwrap(), 7);
        assert!(tokens.next_token().unwrap().is_none());
    }

    #[test]
    fn empty_stream_yields_none() {
        let mut tokens = TokenReader::new(Cursor::new("  \n\t "));
        assert!(tokens.next_token().unwrap().is_none());
    }

    #[test]
    fn missing_required_token_names_the_field() {
        let mut tokens = TokenReader::new(Cursor::new(""));
        let err = tokens.expect_token("barcode count").unwrap_err();
        assert!(matches!(err, QuantError::UnexpectedEof("barcode count")));
    }

    #[test]
    fn non_numeric_token_names_the_field() {
        let mut tokens = TokenReader::new(Cursor::new("xyz"));
        let err = tokens.expect_parsed::<u64>("class count").unwrap_err();
        match err {
            QuantError::InvalidToken { field, token } => {
                assert_eq!(field, "class count");
                assert_eq!(token, "xyz");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
