//! How often each genre justified a candidate edge within one batch.

use std::collections::HashMap;

use shelfnet_core::{Error, Result};

/// Per-batch tally of candidate edges by justifying genre.
///
/// Filled while candidates are generated, read-only during admission.
/// Genres keep their first-recorded order so ties rank deterministically.
#[derive(Debug, Clone, Default)]
pub struct GenreFrequencyIndex {
    counts: Vec<(String, usize)>,
    positions: HashMap<String, usize>,
    total: usize,
}

impl GenreFrequencyIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, genre: &str) {
        match self.positions.get(genre) {
            Some(&position) => self.counts[position].1 += 1,
            None => {
                self.positions.insert(genre.to_string(), self.counts.len());
                self.counts.push((genre.to_string(), 1));
            }
        }
        self.total += 1;
    }

    /// Candidate edges justified by `genre`; 0 when never recorded.
    pub fn count(&self, genre: &str) -> usize {
        self.positions
            .get(genre)
            .map(|&position| self.counts[position].1)
            .unwrap_or(0)
    }

    /// Sum of all counts.
    pub fn total(&self) -> usize {
        self.total
    }

    /// Number of distinct genres recorded.
    pub fn distinct(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// `total() * p`.
    pub fn percentile_bound(&self, p: f64) -> f64 {
        self.total as f64 * p
    }

    /// Median of the counts minus and plus their sample standard deviation.
    pub fn median_stdev_bounds(&self) -> Result<(f64, f64)> {
        if self.counts.len() < 2 {
            return Err(Error::InsufficientData(format!(
                "standard deviation needs at least 2 genres, {} recorded",
                self.counts.len()
            )));
        }

        let mut values: Vec<f64> = self.counts.iter().map(|(_, c)| *c as f64).collect();
        values.sort_by(|a, b| a.total_cmp(b));

        let n = values.len();
        let median = if n % 2 == 1 {
            values[n / 2]
        } else {
            (values[n / 2 - 1] + values[n / 2]) / 2.0
        };

        let mean = values.iter().sum::<f64>() / n as f64;
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
        let stdev = variance.sqrt();

        Ok((median - stdev, median + stdev))
    }

    /// Genres by count, most frequent first. Ties keep first-recorded order.
    pub fn ranked(&self) -> Vec<(String, usize)> {
        let mut ranked = self.counts.clone();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked
    }
}
