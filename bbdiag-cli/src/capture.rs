//! Text capture reader.
//!
//! A capture holds one diagnostic record per line, hex encoded, check bytes
//! included. Whitespace inside a line is ignored so byte-spaced dumps work
//! as well. Blank lines and lines starting with `#` are skipped.

use std::io::BufRead;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("Failed to read capture: {0}")]
    Io(#[from] std::io::Error),

    #[error("Line {line}: invalid hex record: {source}")]
    InvalidHex {
        line: usize,
        source: hex::FromHexError,
    },

    #[error("Line {line}: not a text line: {source}")]
    InvalidText {
        line: usize,
        source: std::str::Utf8Error,
    },
}

impl CaptureError {
    /// True for a bad line that was skipped; reading goes on after it.
    pub fn is_invalid_line(&self) -> bool {
        matches!(
            self,
            CaptureError::InvalidHex { .. } | CaptureError::InvalidText { .. }
        )
    }
}

/// Iterates over the records of a capture.
///
/// I/O errors end the capture; a line that is not hex text is reported and
/// reading continues with the next one.
pub struct CaptureReader<R> {
    reader: R,
    line: usize,
    buf: Vec<u8>,
    failed: bool,
}

impl<R: BufRead> CaptureReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line: 0,
            buf: Vec::new(),
            failed: false,
        }
    }

    /// Number of the last line read, starting at 1
    pub fn line(&self) -> usize {
        self.line
    }
}

impl<R: BufRead> Iterator for CaptureReader<R> {
    type Item = Result<Vec<u8>, CaptureError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        loop {
            self.buf.clear();
            match self.reader.read_until(b'\n', &mut self.buf) {
                Ok(0) => return None,
                Ok(_) => self.line += 1,
                Err(e) => {
                    self.failed = true;
                    return Some(Err(e.into()));
                }
            }

            let text = match std::str::from_utf8(&self.buf) {
                Ok(text) => text.trim(),
                Err(source) => {
                    return Some(Err(CaptureError::InvalidText {
                        line: self.line,
                        source,
                    }))
                }
            };
            if text.is_empty() || text.starts_with('#') {
                continue;
            }

            let compact: String = text.chars().filter(|c| !c.is_ascii_whitespace()).collect();
            return Some(hex::decode(compact).map_err(|source| CaptureError::InvalidHex {
                line: self.line,
                source,
            }));
        }
    }
}
