use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use super::tokenize::{split_fields, FIELD_DELIMITERS};
use super::Error;

/// Samples collected from one or more text files, in file-then-line order.
///
/// Problems that do not stop the run are kept alongside the data: files
/// that could not be opened or read end up in [Dataset::failures], data
/// lines whose column is missing or not a number in [Dataset::rejected].
#[derive(Debug, Default)]
pub struct Dataset {
    pub(crate) samples: Vec<f64>,
    pub(crate) failures: Vec<Error>,
    pub(crate) rejected: Vec<Error>,
    pub(crate) comment_lines: usize,
    pub(crate) blank_lines: usize,
}

impl Dataset {
    pub fn new() -> Dataset {
        Dataset::default()
    }
    pub fn samples(&self) -> &[f64] {
        &self.samples
    }
    pub fn len(&self) -> usize {
        self.samples.len()
    }
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
    pub fn failures(&self) -> &[Error] {
        &self.failures
    }
    pub fn rejected(&self) -> &[Error] {
        &self.rejected
    }
    pub fn comment_lines(&self) -> usize {
        self.comment_lines
    }
    pub fn blank_lines(&self) -> usize {
        self.blank_lines
    }
    /// Give up ownership of the samples.
    pub fn into_samples(self) -> Vec<f64> {
        self.samples
    }

    /// Read every file in `paths`, taking the value from `column`.
    ///
    /// A file that cannot be opened is recorded and skipped; the remaining
    /// files are still read.
    pub fn load<P: AsRef<Path>>(paths: &[P], column: usize) -> Dataset {
        let mut ds = Dataset::new();
        for path in paths {
            let path = path.as_ref();
            match File::open(path) {
                Err(source) => {
                    tracing::debug!(path = %path.display(), error = %source, "cannot open");
                    ds.failures.push(Error::FileOpen { path: path.to_path_buf(), source });
                }
                Ok(fp) => {
                    let before = ds.samples.len();
                    ds.read_from(BufReader::new(fp), path, column);
                    tracing::info!(path = %path.display(), samples = ds.samples.len() - before, "file read");
                }
            }
            // the handle is dropped here, before the next file is opened
        }
        ds.samples.shrink_to_fit();
        ds
    }

    /// Append the samples found in `reader`; `source` only labels
    /// diagnostics.
    ///
    /// Lines beginning with `#` or `!` are comments, lines without any
    /// field are blank.  Bytes that are not UTF-8 are replaced rather than
    /// aborting the file, and a trailing carriage return is ignored.
    pub fn read_from<R: BufRead>(&mut self, mut reader: R, source: &Path, column: usize) {
        let mut buf = Vec::new();
        let mut lineno = 0usize;
        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf) {
                Ok(0) => break,
                Ok(_) => {}
                Err(source_err) => {
                    self.failures.push(Error::FileRead { path: source.to_path_buf(), source: source_err });
                    break;
                }
            }
            lineno += 1;
            let text = String::from_utf8_lossy(&buf);
            let line = text.trim_end_matches(['\n', '\r']);

            if line.starts_with(['#', '!']) {
                self.comment_lines += 1;
                continue;
            }
            let mut fields = Vec::new();
            if split_fields(line, FIELD_DELIMITERS, &mut fields) == 0 {
                self.blank_lines += 1;
                continue;
            }
            tracing::trace!(line = lineno, ?fields, "fields");

            match parse_column(&fields, column, source, lineno) {
                Ok(v) => self.samples.push(v),
                Err(e) => {
                    tracing::debug!(error = %e, "line rejected");
                    self.rejected.push(e);
                }
            }
        }
    }
}

fn parse_column(fields: &[&str], column: usize, source: &Path, line: usize) -> Result<f64, Error> {
    let token = fields.get(column).ok_or_else(|| Error::MissingColumn {
        path: PathBuf::from(source),
        line,
        column,
        found: fields.len(),
    })?;
    match token.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(Error::InvalidValue {
            path: PathBuf::from(source),
            line,
            token: token.to_string(),
        }),
    }
}
