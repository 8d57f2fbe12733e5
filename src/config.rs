use std::path::PathBuf;

use super::{Error, Result};

/// Number of bins used when neither a count nor a width is requested.
pub const DEFAULT_BINS: usize = 100;

/// How the bin plan is driven.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Binning {
    /// A fixed number of bins spanning the range; the width follows.
    Count(usize),
    /// A fixed bin width; the number of bins follows.
    Width(f64),
}

impl Default for Binning {
    fn default() -> Self {
        Binning::Count(DEFAULT_BINS)
    }
}

/// The validated, immutable settings for one histogram run.
///
/// A [Config] can only be obtained from [ConfigBuilder::build], so every
/// stage downstream may assume the flag combination is consistent.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    lower: Option<f64>,
    upper: Option<f64>,
    normalize: bool,
    column: usize,
    binning: Binning,
    files: Vec<PathBuf>,
}

impl Config {
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }
    /// Lower bound override (`-x1`).
    pub fn lower(&self) -> Option<f64> {
        self.lower
    }
    /// Upper bound override (`-x2`).
    pub fn upper(&self) -> Option<f64> {
        self.upper
    }
    pub fn normalize(&self) -> bool {
        self.normalize
    }
    /// 0-based column holding the value of interest.
    pub fn column(&self) -> usize {
        self.column
    }
    pub fn binning(&self) -> Binning {
        self.binning
    }
    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }
}

/// Collects raw command-line settings and validates them into a [Config].
///
/// The column is taken as a signed value so that a negative request can be
/// reported instead of silently wrapping.
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
    lower: Option<f64>,
    upper: Option<f64>,
    normalize: bool,
    column: i64,
    bins: usize,
    width: Option<f64>,
    files: Vec<PathBuf>,
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        ConfigBuilder {
            lower: None,
            upper: None,
            normalize: true,
            column: 0,
            bins: DEFAULT_BINS,
            width: None,
            files: vec![],
        }
    }
}

impl ConfigBuilder {
    pub fn lower(mut self, x1: f64) -> Self {
        self.lower = Some(x1);
        self
    }
    pub fn upper(mut self, x2: f64) -> Self {
        self.upper = Some(x2);
        self
    }
    pub fn normalize(mut self, yes: bool) -> Self {
        self.normalize = yes;
        self
    }
    pub fn column(mut self, col: i64) -> Self {
        self.column = col;
        self
    }
    pub fn bins(mut self, n: usize) -> Self {
        self.bins = n;
        self
    }
    /// Requesting a width switches the planner to width-driven mode and
    /// makes any bin count irrelevant.
    pub fn width(mut self, binw: f64) -> Self {
        self.width = Some(binw);
        self
    }
    pub fn file<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.files.push(path.into());
        self
    }
    pub fn files<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.files.extend(paths.into_iter().map(Into::into));
        self
    }

    /// Validate the settings.
    ///
    /// Checks run in a fixed order and the first failure is returned:
    /// inverted bounds, negative bin width, negative column, no files.
    pub fn build(self) -> Result<Config> {
        if let (Some(x1), Some(x2)) = (self.lower, self.upper) {
            if x1 >= x2 {
                return Err(Error::InvertedBounds { x1, x2 });
            }
        }
        if let Some(binw) = self.width {
            if binw < 0.0 {
                return Err(Error::NegativeBinWidth(binw));
            }
        }
        let column = usize::try_from(self.column).map_err(|_| Error::NegativeColumn(self.column))?;
        if self.files.is_empty() {
            return Err(Error::NoFiles);
        }
        let binning = match self.width {
            Some(binw) => Binning::Width(binw),
            None => Binning::Count(self.bins),
        };
        Ok(Config {
            lower: self.lower,
            upper: self.upper,
            normalize: self.normalize,
            column,
            binning,
            files: self.files,
        })
    }
}
