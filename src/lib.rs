//! Build fixed-width histograms from columns of plain-text data files.
//!
//! Values are read from one column of whitespace-separated text, binned
//! over a range taken from the data (or overridden), given counting
//! statistics errors and optionally normalized to unit sum.  Every row
//! comes out as bin center, value and uncertainty.
//!
//! # Examples
//!
//! ```no_run
//! let config = makehist::Config::builder()
//!     .lower(1.0)
//!     .upper(5.0)
//!     .bins(4)
//!     .file("data.txt")
//!     .build()?;
//! let summary = makehist::run(&config, &mut std::io::stdout())?;
//! println!("{} samples in {} bins", summary.entries, summary.nbins);
//! # Ok::<(), makehist::Error>(())
//! ```
use std::io::Write;
use std::path::PathBuf;

pub mod tokenize;
pub mod config;
mod loader;
mod plan;
#[macro_use]
mod histogram;
pub mod emit;
mod serde;

pub use config::{Binning, Config, ConfigBuilder, DEFAULT_BINS};
pub use loader::Dataset;
pub use plan::{BinPlan, Range};
pub use histogram::{Histogram, Normalization, Row};
#[cfg(feature = "serde")]
pub use crate::serde::rows_to_json;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("specified x1 = {x1} is >= x2 = {x2}")]
    InvertedBounds { x1: f64, x2: f64 },
    #[error("bin width {0} is negative")]
    NegativeBinWidth(f64),
    #[error("column to use has negative index {0}")]
    NegativeColumn(i64),
    #[error("no files to process")]
    NoFiles,
    #[error("cannot open file {}: {source}", .path.display())]
    FileOpen { path: PathBuf, source: std::io::Error },
    #[error("cannot read file {}: {source}", .path.display())]
    FileRead { path: PathBuf, source: std::io::Error },
    #[error("{}:{line}: column {column} requested but only {found} present", .path.display())]
    MissingColumn { path: PathBuf, line: usize, column: usize, found: usize },
    #[error("{}:{line}: '{token}' is not a finite number", .path.display())]
    InvalidValue { path: PathBuf, line: usize, token: String },
    #[error("there are no data lines to process")]
    EmptyDataset,
    #[error("number of bins is negative for xmax = {xmax} and xmin = {xmin} and bin width {binw}")]
    InvertedRange { xmin: f64, xmax: f64, binw: f64 },
    #[error("number of bins exceeds the upper numerical limit for xmax = {xmax} and xmin = {xmin} and bin width {binw}")]
    BinCountOverflow { xmin: f64, xmax: f64, binw: f64 },
    #[error("bin index {index} is negative for x = {value} for xmax = {xmax} and xmin = {xmin} and bin width {binw}")]
    BinIndexNegative { index: f64, value: f64, xmin: f64, xmax: f64, binw: f64 },
    #[error("bin index {index} is too large for x = {value} for xmax = {xmax} and xmin = {xmin} and bin width {binw}")]
    BinIndexTooLarge { index: f64, value: f64, xmin: f64, xmax: f64, binw: f64 },
    #[error("encoding error: {0}")]
    Encode(String),
    #[error("write error")]
    Write(#[from] std::io::Error),
}

/// Broad classes of [Error], used to decide how a failure is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad flag combination; nothing has been read yet.
    Config,
    /// One input file could not be used; the others still are.
    FileOpen,
    /// One data line could not be used.
    Line,
    /// No usable data at all.
    EmptyDataset,
    /// The bin arithmetic is inconsistent.
    Domain,
    /// Output could not be produced.
    Io,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvertedBounds { .. }
            | Error::NegativeBinWidth(_)
            | Error::NegativeColumn(_)
            | Error::NoFiles => ErrorKind::Config,
            Error::FileOpen { .. } | Error::FileRead { .. } => ErrorKind::FileOpen,
            Error::MissingColumn { .. } | Error::InvalidValue { .. } => ErrorKind::Line,
            Error::EmptyDataset => ErrorKind::EmptyDataset,
            Error::InvertedRange { .. }
            | Error::BinCountOverflow { .. }
            | Error::BinIndexNegative { .. }
            | Error::BinIndexTooLarge { .. } => ErrorKind::Domain,
            Error::Encode(_) | Error::Write(_) => ErrorKind::Io,
        }
    }
    /// Whether processing stops on this error.
    pub fn is_fatal(&self) -> bool {
        !matches!(self.kind(), ErrorKind::FileOpen | ErrorKind::Line)
    }
}

/// The outcome of [run], for reporting.
#[derive(Debug)]
pub struct Summary {
    /// Files that could not be opened or read.
    pub failures: Vec<Error>,
    /// Data lines that were skipped.
    pub rejected: Vec<Error>,
    pub samples: usize,
    pub entries: u64,
    pub excluded: u64,
    pub nbins: usize,
    pub bin_width: f64,
    pub range: Range,
    pub normalization: Normalization,
}

/// Load the configured files into a [Dataset].
pub fn load(config: &Config) -> Dataset {
    Dataset::load(config.files(), config.column())
}

/// Resolve the range and plan the bins for `samples`, then fill, estimate
/// uncertainties and normalize.
///
/// Fails with [Error::EmptyDataset] when `samples` is empty.
pub fn build(config: &Config, samples: &[f64]) -> Result<Histogram> {
    let range = Range::resolve(samples, config.lower(), config.upper()).ok_or(Error::EmptyDataset)?;
    let plan = BinPlan::new(range, config.binning())?;
    tracing::info!(range = %range, nbins = plan.nbins(), binw = plan.bin_width(), "bins planned");
    let mut hist = Histogram::from_samples(plan, samples)?;
    let norm = hist.normalize(config.normalize());
    tracing::debug!(?norm, "normalization");
    Ok(hist)
}

/// Run the whole pipeline and write the rows to `out`.
///
/// Unreadable files and unusable lines do not stop the run; they are handed
/// back in the [Summary].  Those problems are lost when an error is
/// returned, so callers wanting them should use [load] and [build] directly.
pub fn run<W: Write>(config: &Config, out: &mut W) -> Result<Summary> {
    let data = load(config);
    let hist = build(config, data.samples())?;
    emit::write_rows(&hist, out)?;
    Ok(Summary {
        samples: data.len(),
        entries: hist.entries(),
        excluded: hist.excluded(),
        nbins: hist.plan().nbins(),
        bin_width: hist.plan().bin_width(),
        range: hist.plan().range(),
        normalization: hist.normalization(),
        failures: data.failures,
        rejected: data.rejected,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn config_for(path: &std::path::Path) -> ConfigBuilder {
        Config::builder().file(path)
    }

    fn scratch(name: &str, text: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("makehist-lib-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        std::fs::write(&path, text).unwrap();
        path
    }

    #[test]
    fn four_samples_four_bins() -> Result<()> {
        let path = scratch("four.txt", "1.0\n2.0\n3.0\n4.0\n");
        let config = config_for(&path).bins(4).lower(1.0).upper(5.0).build()?;
        let mut out = Vec::new();
        let summary = run(&config, &mut out)?;
        assert_eq!(summary.samples, 4);
        assert_eq!(summary.nbins, 4);
        assert_eq!(summary.normalization, Normalization::Applied(4.0));
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.lines().count(), 4);
        for line in text.lines() {
            let cols: Vec<f64> = line.split_whitespace().map(|t| t.parse().unwrap()).collect();
            assert_relative_eq!(cols[1], 0.25);
            assert_relative_eq!(cols[2], 0.25);
        }
        Ok(())
    }

    #[test]
    fn comments_only_is_empty() -> Result<()> {
        let path = scratch("comments.txt", "# a\n! b\n\n");
        let config = config_for(&path).build()?;
        let mut out = Vec::new();
        let e = run(&config, &mut out).unwrap_err();
        assert_eq!(e.kind(), ErrorKind::EmptyDataset);
        assert!(out.is_empty());
        Ok(())
    }

    #[test]
    fn width_mode_rows() -> Result<()> {
        let samples: Vec<f64> = (0..=10).map(f64::from).collect();
        let config = Config::builder().width(1.0).normalize(false).file("unused").build()?;
        let h = build(&config, &samples)?;
        assert_eq!(h.len(), 10);
        // 9.0 and 10.0 share the last bin
        assert_eq!(h.values()[9], 2.0);
        assert_eq!(h.normalization(), Normalization::Disabled);
        Ok(())
    }

    #[test]
    fn inverted_single_override_is_domain_error() -> Result<()> {
        let config = Config::builder().width(0.5).lower(20.0).file("unused").build()?;
        let e = build(&config, &[1.0, 2.0]).unwrap_err();
        assert_eq!(e.kind(), ErrorKind::Domain);
        assert!(e.is_fatal());
        Ok(())
    }

    #[test]
    fn error_kinds() {
        assert_eq!(Error::NoFiles.kind(), ErrorKind::Config);
        let e = Error::InvalidValue { path: "f".into(), line: 3, token: "x".into() };
        assert_eq!(e.kind(), ErrorKind::Line);
        assert!(!e.is_fatal());
        assert_eq!(e.to_string(), "f:3: 'x' is not a finite number");
        assert_eq!(Error::InvertedBounds { x1: 2.0, x2: 1.5 }.to_string(), "specified x1 = 2 is >= x2 = 1.5");
    }
}
