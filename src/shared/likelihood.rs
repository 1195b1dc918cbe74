//! Observed (mRNA count x promoter configuration) histograms and their
//! log-likelihood under a model distribution.
//!
//! Row `m` of a histogram counts the cells with `m` mRNA molecules, column `c`
//! the cells whose two transcription sites are in configuration `c`:
//! {OFF,OFF}, {OFF,ON}, {ON,ON} and, for the three promoter family,
//! {OFF,ONs}, {ON,ONs}, {ONs,ONs}. Read column by column, the histogram has
//! the layout of the state space.
use crate::shared::distributions::ProbabilityVector;
use crate::shared::errors::ModelError;
use crate::shared::state_space::{ModelFamily, PromoterState};
use ndarray::Array2;

/// Number of promoter configuration columns, N + N(N-1)/2.
pub fn bucket_count(family: ModelFamily) -> usize {
    family.configurations()
}

/// Column of the histogram associated with a promoter configuration.
pub fn bucket_index(family: ModelFamily, promoter: &PromoterState) -> Option<usize> {
    family.configuration_index(promoter)
}

#[derive(Clone, Debug, PartialEq)]
pub struct ObservedHistogram {
    counts: Array2<u64>,
}

impl ObservedHistogram {
    pub fn new(
        counts: Array2<u64>,
        family: ModelFamily,
        max_mrna: usize,
    ) -> Result<ObservedHistogram, ModelError> {
        let expected = (max_mrna + 1, bucket_count(family));
        if counts.dim() != expected {
            return Err(ModelError::DataUnavailable(format!(
                "histogram of shape {:?}, expected {:?}",
                counts.dim(),
                expected
            )));
        }
        Ok(ObservedHistogram { counts })
    }

    pub fn zeros(family: ModelFamily, max_mrna: usize) -> ObservedHistogram {
        ObservedHistogram {
            counts: Array2::zeros((max_mrna + 1, bucket_count(family))),
        }
    }

    /// Record one more cell with `mrna` molecules in configuration `bucket`.
    pub fn record(&mut self, mrna: usize, bucket: usize) -> Result<(), ModelError> {
        let (rows, cols) = self.counts.dim();
        if mrna >= rows || bucket >= cols {
            return Err(ModelError::DataUnavailable(format!(
                "cell ({}, {}) outside a {}x{} histogram",
                mrna, bucket, rows, cols
            )));
        }
        self.counts[[mrna, bucket]] += 1;
        Ok(())
    }

    pub fn counts(&self) -> &Array2<u64> {
        &self.counts
    }

    pub fn total(&self) -> u64 {
        self.counts.sum()
    }
}

/// Natural logarithm clamped to the range of positive normal doubles, so that
/// a null probability gives a large but finite penalty.
pub fn truncated_ln(x: f64) -> f64 {
    if x <= f64::MIN_POSITIVE {
        f64::MIN_POSITIVE.ln()
    } else if x.is_infinite() {
        f64::MAX.ln()
    } else {
        x.ln()
    }
}

/// Sum over bins of `count * ln(P)`. Empty bins contribute exactly zero,
/// whatever the model probability.
pub fn score(x: &ObservedHistogram, p: &ProbabilityVector) -> Result<f64, ModelError> {
    let (rows, cols) = x.counts.dim();
    if p.len() != rows * cols {
        return Err(ModelError::DataUnavailable(format!(
            "histogram with {} bins for a distribution over {} states",
            rows * cols,
            p.len()
        )));
    }
    Ok(x.counts
        .indexed_iter()
        .filter(|(_, count)| **count > 0)
        .map(|((m, c), &count)| count as f64 * truncated_ln(p[c * rows + m]))
        .sum())
}
