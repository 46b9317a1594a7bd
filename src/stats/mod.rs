//! Descriptive statistics for dataset exploration.
//!
//! Quantiles use the R-7 method (Hyndman & Fan 1996), the default in R and
//! NumPy: `h = (n - 1) * q`, interpolating linearly between the neighbouring
//! order statistics.
//!
//! # Examples
//!
//! ```
//! use sorting_hat::stats::DescriptiveStats;
//!
//! let stats = DescriptiveStats::new(&[5.0, 1.0, 4.0, 2.0, 3.0]);
//! assert_eq!(stats.quantile(0.5).expect("median of non-empty data"), 3.0);
//! assert_eq!(stats.quantile(0.0).expect("min of non-empty data"), 1.0);
//! assert_eq!(stats.quantile(1.0).expect("max of non-empty data"), 5.0);
//! ```

use std::fmt::Write as _;

use serde::Serialize;

use crate::data::DataFrame;
use crate::error::{HatError, Result};

/// Order statistics over a sample, sorted once on construction.
#[derive(Debug, Clone)]
pub struct DescriptiveStats {
    sorted: Vec<f64>,
}

impl DescriptiveStats {
    /// Copies and sorts `data`.
    #[must_use]
    pub fn new(data: &[f64]) -> Self {
        let mut sorted = data.to_vec();
        sorted.sort_by(f64::total_cmp);
        Self { sorted }
    }

    /// Number of values.
    #[must_use]
    pub fn count(&self) -> usize {
        self.sorted.len()
    }

    /// Arithmetic mean; NaN when empty.
    #[must_use]
    pub fn mean(&self) -> f64 {
        if self.sorted.is_empty() {
            return f64::NAN;
        }
        self.sorted.iter().sum::<f64>() / self.sorted.len() as f64
    }

    /// Sample standard deviation (`n - 1` denominator); NaN below two values.
    #[must_use]
    pub fn std(&self) -> f64 {
        let n = self.sorted.len();
        if n < 2 {
            return f64::NAN;
        }
        let mean = self.mean();
        let ss: f64 = self.sorted.iter().map(|v| (v - mean).powi(2)).sum();
        (ss / (n - 1) as f64).sqrt()
    }

    /// R-7 quantile.
    ///
    /// # Errors
    ///
    /// Returns an error if there are no values or `q` is outside `[0, 1]`.
    pub fn quantile(&self, q: f64) -> Result<f64> {
        if self.sorted.is_empty() {
            return Err(HatError::empty_input("quantile of no values"));
        }
        if !(0.0..=1.0).contains(&q) {
            return Err(HatError::InvalidHyperparameter {
                param: "q".to_string(),
                value: q.to_string(),
                constraint: "in [0, 1]".to_string(),
            });
        }

        let h = (self.sorted.len() - 1) as f64 * q;
        let lo = h.floor() as usize;
        let hi = h.ceil() as usize;
        let (a, b) = (self.sorted[lo], self.sorted[hi]);
        if lo == hi {
            return Ok(a);
        }
        Ok(a + (h - lo as f64) * (b - a))
    }
}

/// Summary of one numeric column, ignoring missing cells.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureSummary {
    /// Column name.
    pub name: String,
    /// Number of non-missing cells.
    pub count: usize,
    /// Mean.
    pub mean: f64,
    /// Sample standard deviation.
    pub std: f64,
    /// Minimum.
    pub min: f64,
    /// First quartile.
    pub q25: f64,
    /// Median.
    pub q50: f64,
    /// Third quartile.
    pub q75: f64,
    /// Maximum.
    pub max: f64,
}

impl FeatureSummary {
    /// Summarises `values` (missing cells are skipped).
    #[must_use]
    pub fn new(name: &str, values: &[Option<f64>]) -> Self {
        let observed: Vec<f64> = values.iter().flatten().copied().collect();
        let stats = DescriptiveStats::new(&observed);
        let q = |p| stats.quantile(p).unwrap_or(f64::NAN);
        Self {
            name: name.to_string(),
            count: stats.count(),
            mean: stats.mean(),
            std: stats.std(),
            min: q(0.0),
            q25: q(0.25),
            q50: q(0.5),
            q75: q(0.75),
            max: q(1.0),
        }
    }
}

/// Summarises every numeric column of `table`, in column order.
///
/// # Errors
///
/// Returns an error if a numeric column cannot be read.
pub fn describe(table: &DataFrame) -> Result<Vec<FeatureSummary>> {
    table
        .numeric_column_names()
        .into_iter()
        .map(|name| Ok(FeatureSummary::new(name, &table.numeric_column(name)?)))
        .collect()
}

/// Renders summaries as a table with one column per feature.
#[must_use]
pub fn format_summary_table(summaries: &[FeatureSummary]) -> String {
    const ROWS: [&str; 9] = ["", "Count", "Mean", "Std", "Min", "25%", "50%", "75%", "Max"];
    let width = summaries
        .iter()
        .map(|s| s.name.len())
        .max()
        .unwrap_or(0)
        .max(12);

    let mut out = String::new();
    for (r, label) in ROWS.iter().enumerate() {
        let _ = write!(out, "{label:<6}");
        for s in summaries {
            let cell = match r {
                0 => format!("{:>width$}", s.name),
                1 => format!("{:>width$}", s.count),
                _ => {
                    let v = [s.mean, s.std, s.min, s.q25, s.q50, s.q75, s.max][r - 2];
                    format!("{v:>width$.6}")
                }
            };
            let _ = write!(out, " {cell}");
        }
        out.push('\n');
    }
    out
}
