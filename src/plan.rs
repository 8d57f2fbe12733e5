use std::fmt;

use super::config::Binning;
use super::{Error, Result};

/// The effective value range `[xmin, xmax]` of a histogram.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Range {
    pub xmin: f64,
    pub xmax: f64,
}

impl Range {
    /// Take the extrema of `samples`, then let `lower`/`upper` replace the
    /// corresponding end unconditionally, even when the result excludes
    /// every sample.  Returns `None` for an empty sample set.
    pub fn resolve(samples: &[f64], lower: Option<f64>, upper: Option<f64>) -> Option<Range> {
        let (&first, rest) = samples.split_first()?;
        let (xmin, xmax) = rest.iter().fold((first, first), |(lo, hi), &x| {
            (if x < lo { x } else { lo }, if x > hi { x } else { hi })
        });
        let r = Range {
            xmin: lower.unwrap_or(xmin),
            xmax: upper.unwrap_or(xmax),
        };
        tracing::debug!(data_min = xmin, data_max = xmax, xmin = r.xmin, xmax = r.xmax, "range resolved");
        Some(r)
    }
    pub fn span(&self) -> f64 {
        self.xmax - self.xmin
    }
    pub fn contains(&self, x: f64) -> bool {
        x >= self.xmin && x <= self.xmax
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.xmin, self.xmax)
    }
}

/// A consistent pairing of bin count and bin width over a [Range].
///
/// Bin `i` covers `[xmin + i*binw, xmin + (i+1)*binw]`; a value on an
/// interior edge belongs to the upper bin and a value at `xmax` to the
/// last one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BinPlan {
    range: Range,
    nbins: usize,
    binw: f64,
}

impl BinPlan {
    /// Reconcile bin count and width for `range`.
    ///
    /// In count-driven mode a request for 0 bins becomes 1.  In width-driven
    /// mode the count is `floor(span / binw)`, stepped down while the bins
    /// would overshoot the span through rounding, and raised to 1 when the
    /// width exceeds the whole span.
    pub fn new(range: Range, binning: Binning) -> Result<BinPlan> {
        let span = range.span();
        let plan = match binning {
            Binning::Count(n) => {
                if span < 0.0 {
                    return Err(Error::InvertedRange { xmin: range.xmin, xmax: range.xmax, binw: span / n.max(1) as f64 });
                }
                let nbins = n.max(1);
                BinPlan { range, nbins, binw: span / nbins as f64 }
            }
            Binning::Width(binw) => {
                let mut n = (span / binw).floor();
                if n < 0.0 {
                    return Err(Error::InvertedRange { xmin: range.xmin, xmax: range.xmax, binw });
                }
                if !n.is_finite() || n >= usize::MAX as f64 {
                    return Err(Error::BinCountOverflow { xmin: range.xmin, xmax: range.xmax, binw });
                }
                while n > 0.0 && n * binw > span {
                    // above 2^53 a step of one is lost to rounding
                    if n - 1.0 == n {
                        break;
                    }
                    n -= 1.0;
                }
                BinPlan { range, nbins: (n as usize).max(1), binw }
            }
        };
        tracing::debug!(nbins = plan.nbins, binw = plan.binw, "bin plan");
        Ok(plan)
    }
    pub fn range(&self) -> Range {
        self.range
    }
    pub fn nbins(&self) -> usize {
        self.nbins
    }
    pub fn bin_width(&self) -> f64 {
        self.binw
    }
    /// The midpoint of bin `i`.
    pub fn center(&self, i: usize) -> f64 {
        self.range.xmin + (i as f64 + 0.5) * self.binw
    }

    /// Find the bin holding `x`, or `None` when `x` lies outside the range.
    ///
    /// The raw index `floor((x - xmin) / binw)` is corrected by one step in
    /// either direction to absorb rounding at the two outer edges; a sample
    /// exactly at `xmax` therefore lands in the last bin.  Needing more than
    /// one step means the plan itself is inconsistent and is an error.
    pub fn index_of(&self, x: f64) -> Result<Option<usize>> {
        if !self.range.contains(x) {
            return Ok(None);
        }
        let mut idx = ((x - self.range.xmin) / self.binw).floor();
        if idx.is_nan() {
            // zero-width range: x == xmin == xmax
            return Ok(Some(0));
        }
        if idx < 0.0 {
            idx += 1.0;
            if idx < 0.0 {
                return Err(self.index_error(x, idx, true));
            }
        }
        if idx >= usize::MAX as f64 {
            return Err(Error::BinCountOverflow { xmin: self.range.xmin, xmax: self.range.xmax, binw: self.binw });
        }
        let nbins = self.nbins as f64;
        if idx >= nbins {
            idx -= 1.0;
            if idx >= nbins {
                return Err(self.index_error(x, idx, false));
            }
        }
        Ok(Some(idx as usize))
    }

    fn index_error(&self, value: f64, index: f64, negative: bool) -> Error {
        let (xmin, xmax, binw) = (self.range.xmin, self.range.xmax, self.binw);
        if negative {
            Error::BinIndexNegative { index, value, xmin, xmax, binw }
        } else {
            Error::BinIndexTooLarge { index, value, xmin, xmax, binw }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::prelude::*;

    fn range(xmin: f64, xmax: f64) -> Range {
        Range { xmin, xmax }
    }

    #[test]
    fn resolve_extrema_and_overrides() {
        let data = [3.0, -1.5, 7.25, 0.0];
        assert_eq!(Range::resolve(&data, None, None), Some(range(-1.5, 7.25)));
        assert_eq!(Range::resolve(&data, Some(0.0), None), Some(range(0.0, 7.25)));
        assert_eq!(Range::resolve(&data, None, Some(100.0)), Some(range(-1.5, 100.0)));
        // overrides may exclude everything
        assert_eq!(Range::resolve(&data, Some(50.0), Some(60.0)), Some(range(50.0, 60.0)));
        assert_eq!(Range::resolve(&[], None, None), None);
    }

    #[test]
    fn count_and_width_modes_agree() -> Result<()> {
        let r = range(0.0, 10.0);
        let by_count = BinPlan::new(r, Binning::Count(10))?;
        assert_eq!(by_count.bin_width(), 1.0);
        let by_width = BinPlan::new(r, Binning::Width(1.0))?;
        assert_eq!(by_width.nbins(), 10);
        assert_eq!(by_count, by_width);
        Ok(())
    }

    #[test]
    fn zero_bins_become_one() -> Result<()> {
        let p = BinPlan::new(range(2.0, 4.0), Binning::Count(0))?;
        assert_eq!(p.nbins(), 1);
        assert_eq!(p.bin_width(), 2.0);
        Ok(())
    }

    #[test]
    fn width_overshoot_is_corrected() -> Result<()> {
        // 0.3 / 0.1 is 2.9999999999999996 in binary floating point
        let p = BinPlan::new(range(0.0, 0.3), Binning::Width(0.1))?;
        assert_eq!(p.nbins(), 2);
        // floor alone never overshoots here, but the product check must hold
        let p = BinPlan::new(range(-1.0, 2.5), Binning::Width(0.7))?;
        assert_eq!(p.nbins(), 5);
        assert!(p.nbins() as f64 * p.bin_width() <= 3.5);
        Ok(())
    }

    #[test]
    fn width_wider_than_range() -> Result<()> {
        let p = BinPlan::new(range(0.0, 1.0), Binning::Width(5.0))?;
        assert_eq!(p.nbins(), 1);
        assert_eq!(p.bin_width(), 5.0);
        assert_eq!(p.index_of(1.0)?, Some(0));
        Ok(())
    }

    #[test]
    fn plan_errors() {
        let e = BinPlan::new(range(5.0, 1.0), Binning::Width(1.0)).unwrap_err();
        assert!(matches!(e, Error::InvertedRange { .. }));
        let e = BinPlan::new(range(5.0, 1.0), Binning::Count(10)).unwrap_err();
        assert!(matches!(e, Error::InvertedRange { .. }));
        let e = BinPlan::new(range(0.0, 1e300), Binning::Width(1e-300)).unwrap_err();
        assert!(matches!(e, Error::BinCountOverflow { .. }));
        let e = BinPlan::new(range(0.0, 1.0), Binning::Width(0.0)).unwrap_err();
        assert!(matches!(e, Error::BinCountOverflow { .. }));
        let e = BinPlan::new(range(1.0, 1.0), Binning::Width(0.0)).unwrap_err();
        assert!(matches!(e, Error::BinCountOverflow { .. }));
    }

    #[test]
    fn huge_bin_counts_terminate() {
        let e = BinPlan::new(range(0.0, 1e300), Binning::Width(1e-300)).unwrap_err();
        assert!(matches!(e, Error::BinCountOverflow { .. }));
        assert_eq!(e.kind(), crate::ErrorKind::Domain);
        let e = BinPlan::new(range(-1e308, 1e308), Binning::Width(1e-10)).unwrap_err();
        assert!(matches!(e, Error::BinCountOverflow { .. }));
        // beyond 2^53 but still representable
        let p = BinPlan::new(range(0.0, 2f64.powi(60)), Binning::Width(1.0 + f64::EPSILON)).unwrap();
        assert!(p.nbins() > 1usize << 59);
        let p = BinPlan::new(range(0.0, 2f64.powi(60)), Binning::Width(1.0)).unwrap();
        assert_eq!(p.nbins(), 1usize << 60);
    }

    #[test]
    fn edges() -> Result<()> {
        let p = BinPlan::new(range(1.0, 5.0), Binning::Count(4))?;
        assert_eq!(p.index_of(1.0)?, Some(0));
        assert_eq!(p.index_of(2.0)?, Some(1));
        assert_eq!(p.index_of(4.999)?, Some(3));
        assert_eq!(p.index_of(5.0)?, Some(3));
        assert_eq!(p.index_of(0.999)?, None);
        assert_eq!(p.index_of(5.001)?, None);
        assert_eq!(p.index_of(f64::NAN)?, None);
        Ok(())
    }

    #[test]
    fn xmax_lands_in_last_bin() -> Result<()> {
        for n in [1usize, 3, 7, 10, 33, 100, 1000] {
            let p = BinPlan::new(range(-0.1, 0.7), Binning::Count(n))?;
            assert_eq!(p.index_of(0.7)?, Some(n - 1));
            assert_eq!(p.index_of(-0.1)?, Some(0));
        }
        Ok(())
    }

    #[test]
    fn degenerate_range() -> Result<()> {
        let p = BinPlan::new(range(3.0, 3.0), Binning::Count(10))?;
        assert_eq!(p.bin_width(), 0.0);
        assert_eq!(p.index_of(3.0)?, Some(0));
        assert_eq!(p.index_of(3.5)?, None);
        Ok(())
    }

    #[test]
    fn centers_are_evenly_spaced() -> Result<()> {
        let p = BinPlan::new(range(-2.0, 3.0), Binning::Count(20))?;
        assert_relative_eq!(p.center(0), -1.875);
        assert_relative_eq!(p.center(19), 2.875);
        for i in 1..p.nbins() {
            assert!(p.center(i) > p.center(i - 1));
            assert_relative_eq!(p.center(i) - p.center(i - 1), p.bin_width(), epsilon = 1e-12);
        }
        Ok(())
    }

    #[test]
    fn random_samples_land_in_their_bin() -> Result<()> {
        let mut rng = rand::rng();
        for _ in 0..50 {
            let xmin = rng.random_range(-1e3..1e3);
            let xmax = xmin + rng.random_range(1e-3..1e3);
            let n = rng.random_range(1..500usize);
            let p = BinPlan::new(range(xmin, xmax), Binning::Count(n))?;
            for _ in 0..200 {
                let x = rng.random_range(xmin..=xmax);
                let i = p.index_of(x)?.expect("in range");
                assert!(i < n);
                // allow one ulp-scale slack at the shared edges
                let slack = 1e-9 * (xmax - xmin);
                assert!(x >= xmin + i as f64 * p.bin_width() - slack);
                assert!(x <= xmin + (i + 1) as f64 * p.bin_width() + slack);
            }
        }
        Ok(())
    }
}
