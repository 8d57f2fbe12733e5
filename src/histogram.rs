use super::plan::BinPlan;
use super::Result;

#[allow(unused_macros)]
/// hist! macro will fill a histogram over `plan` with a list of values.
///
/// Panics if a value cannot be binned; meant for tests.
macro_rules! hist {
    ($plan:expr) => ( Histogram::new($plan) );
    ($plan:expr; $($v:expr),+ $(,)?) => ( {
        let mut h = Histogram::new($plan);
        [$($v as f64),+].iter().for_each(|x| { h.insert(*x).unwrap(); });
        h
    } )
}

/// What [Histogram::normalize] did to the bin values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Normalization {
    /// Not attempted yet.
    Raw,
    /// Values and uncertainties were divided by this total.
    Applied(f64),
    /// Normalization was switched off.
    Disabled,
    /// A single bin is never normalized.
    SingleBin,
    /// The total was below machine epsilon; raw values were kept.
    NearZero(f64),
}

/// One output row: the bin center, its value and its uncertainty.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Row {
    pub center: f64,
    pub value: f64,
    pub uncertainty: f64,
}

#[derive(Debug, Clone, PartialEq)]
/// A fixed-width histogram over a [BinPlan].
///
/// Values start out as raw sample counts.  [Histogram::estimate_uncertainty]
/// derives the counting-statistics error of every bin from those raw
/// counts, after which [Histogram::normalize] may rescale both.
pub struct Histogram {
    pub(crate) plan: BinPlan,
    pub(crate) values: Vec<f64>,
    pub(crate) uncertainty: Vec<f64>,
    pub(crate) entries: u64,
    pub(crate) excluded: u64,
    pub(crate) normalization: Normalization,
}

impl Histogram {
    /// This function creates a new, empty histogram with `plan.nbins()` bins.
    pub fn new(plan: BinPlan) -> Histogram {
        Histogram {
            plan,
            values: vec![0.0; plan.nbins()],
            uncertainty: vec![0.0; plan.nbins()],
            entries: 0,
            excluded: 0,
            normalization: Normalization::Raw,
        }
    }
    /// Bin every sample and estimate the uncertainties.
    pub fn from_samples(plan: BinPlan, samples: &[f64]) -> Result<Histogram> {
        let mut h = Histogram::new(plan);
        h.fill(samples)?;
        h.estimate_uncertainty();
        tracing::info!(entries = h.entries, excluded = h.excluded, nbins = plan.nbins(), "histogram filled");
        Ok(h)
    }
    /// This function will record one sample.
    ///
    /// Returns `false` when the sample lies outside the range and was
    /// dropped.  An error means the bin plan cannot place an in-range value.
    pub fn insert(&mut self, x: f64) -> Result<bool> {
        match self.plan.index_of(x)? {
            Some(idx) => {
                self.values[idx] += 1.0;
                self.entries += 1;
                Ok(true)
            }
            None => {
                self.excluded += 1;
                Ok(false)
            }
        }
    }
    /// This function will record every sample in `samples`, stopping at the
    /// first one that cannot be binned.
    pub fn fill(&mut self, samples: &[f64]) -> Result<()> {
        for &x in samples {
            self.insert(x)?;
        }
        Ok(())
    }
    /// Set every bin's uncertainty to the square root of its raw count.
    pub fn estimate_uncertainty(&mut self) {
        self.values.iter().zip(self.uncertainty.iter_mut()).for_each(|(count, err)| {
            *err = count.sqrt();
        });
    }
    /// Rescale values and uncertainties so the values sum to 1.
    ///
    /// Nothing happens when `enabled` is false or there is only one bin.
    /// A total smaller than machine epsilon leaves the raw values in place.
    pub fn normalize(&mut self, enabled: bool) -> Normalization {
        self.normalization = if !enabled {
            Normalization::Disabled
        } else if self.plan.nbins() <= 1 {
            Normalization::SingleBin
        } else {
            let total = self.values.iter().sum::<f64>().abs();
            if total < f64::EPSILON {
                Normalization::NearZero(total)
            } else {
                let inorm = 1.0 / total;
                self.values.iter_mut().for_each(|v| *v *= inorm);
                self.uncertainty.iter_mut().for_each(|e| *e *= inorm);
                Normalization::Applied(total)
            }
        };
        self.normalization
    }
    pub fn plan(&self) -> &BinPlan {
        &self.plan
    }
    pub fn values(&self) -> &[f64] {
        &self.values
    }
    pub fn uncertainties(&self) -> &[f64] {
        &self.uncertainty
    }
    /// The number of samples that landed in a bin.
    pub fn entries(&self) -> u64 {
        self.entries
    }
    /// The number of samples dropped for lying outside the range.
    pub fn excluded(&self) -> u64 {
        self.excluded
    }
    pub fn normalization(&self) -> Normalization {
        self.normalization
    }
    pub fn len(&self) -> usize {
        self.values.len()
    }
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
    /// Rows in ascending bin order.
    pub fn rows(&self) -> impl Iterator<Item = Row> + '_ {
        self.values.iter().zip(self.uncertainty.iter()).enumerate().map(|(i, (&value, &uncertainty))| Row {
            center: self.plan.center(i),
            value,
            uncertainty,
        })
    }
}
