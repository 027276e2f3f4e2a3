//! Batch evaluation of labelled shapes.
//!
//! Forward passes are independent, so samples run in parallel. A sample whose
//! pass fails is logged and skipped; the rest of the batch still counts.

use ndarray::{Array2, ArrayView4};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::api::ShapeRecognizer;

/// Rendered views of one shape together with its true class index.
#[derive(Debug, Clone, Copy)]
pub struct LabelledViews<'a> {
    pub views: ArrayView4<'a, f32>,
    pub label: usize,
}

/// Counts of `(truth, prediction)` pairs; rows are truth, columns prediction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    counts: Array2<u64>,
}

impl ConfusionMatrix {
    #[must_use]
    pub fn new(num_classes: usize) -> Self {
        Self {
            counts: Array2::zeros((num_classes, num_classes)),
        }
    }

    #[must_use]
    pub fn num_classes(&self) -> usize {
        self.counts.nrows()
    }

    /// Count one outcome. Returns `false` and records nothing when either
    /// index is outside the class range.
    pub fn record(&mut self, truth: usize, predicted: usize) -> bool {
        match self.counts.get_mut((truth, predicted)) {
            Some(count) => {
                *count += 1;
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub fn get(&self, truth: usize, predicted: usize) -> u64 {
        self.counts.get((truth, predicted)).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn total(&self) -> u64 {
        self.counts.sum()
    }

    /// Number of correct predictions (the diagonal).
    #[must_use]
    pub fn correct(&self) -> u64 {
        self.counts.diag().sum()
    }

    /// Top-1 accuracy, or `None` before anything has been recorded.
    #[must_use]
    #[expect(clippy::float_arithmetic, reason = "accuracy ratio")]
    #[expect(clippy::cast_precision_loss, reason = "sample counts fit in f64")]
    pub fn accuracy(&self) -> Option<f64> {
        let total = self.total();
        (total > 0).then(|| self.correct() as f64 / total as f64)
    }

    /// Add another matrix of the same size into this one. Returns `false` and
    /// leaves `self` untouched when the class counts differ.
    #[must_use = "a size mismatch drops the other tally"]
    pub fn merge(&mut self, other: &Self) -> bool {
        if self.counts.dim() != other.counts.dim() {
            return false;
        }
        self.counts += &other.counts;
        true
    }

    #[must_use]
    pub fn rows(&self) -> Vec<Vec<u64>> {
        self.counts.rows().into_iter().map(|row| row.to_vec()).collect()
    }
}

/// Outcome of evaluating a batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub confusion: ConfusionMatrix,
    /// Samples whose pass succeeded and whose label was in range.
    pub evaluated: usize,
    /// Samples dropped because the pass failed or the label was invalid.
    pub skipped: usize,
}

impl EvaluationReport {
    #[must_use]
    pub fn top1_accuracy(&self) -> Option<f64> {
        self.confusion.accuracy()
    }
}

/// Recognise every sample and tally predictions against labels.
///
/// Failing samples are skipped with a warning instead of aborting the batch.
pub fn evaluate<R>(
    recognizer: &R,
    num_classes: usize,
    samples: &[LabelledViews<'_>],
) -> EvaluationReport
where
    R: ShapeRecognizer + Sync,
{
    let outcomes: Vec<Option<(usize, usize)>> = samples
        .par_iter()
        .enumerate()
        .map(|(index, sample)| match recognizer.recognise(sample.views) {
            Ok(recognition) => Some((sample.label, recognition.class_index)),
            Err(error) => {
                warn!(sample = index, %error, "skipping sample after failed pass");
                None
            }
        })
        .collect();

    let mut confusion = ConfusionMatrix::new(num_classes);
    let mut skipped = 0;
    for (index, outcome) in outcomes.into_iter().enumerate() {
        match outcome {
            Some((truth, predicted)) if confusion.record(truth, predicted) => {}
            Some((truth, predicted)) => {
                warn!(sample = index, truth, predicted, "skipping sample with out-of-range class");
                skipped += 1;
            }
            None => skipped += 1,
        }
    }
    let evaluated = samples.len() - skipped;
    EvaluationReport {
        confusion,
        evaluated,
        skipped,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn records_truth_by_prediction() {
        let mut matrix = ConfusionMatrix::new(3);
        assert!(matrix.record(0, 0));
        assert!(matrix.record(0, 2));
        assert!(matrix.record(1, 1));
        assert!(!matrix.record(3, 0));
        assert_eq!(matrix.get(0, 2), 1);
        assert_eq!(matrix.total(), 3);
        assert_eq!(matrix.correct(), 2);
        assert_eq!(matrix.rows(), vec![vec![1, 0, 1], vec![0, 1, 0], vec![0, 0, 0]]);
    }

    #[rstest]
    fn accuracy_is_none_when_empty() {
        assert_eq!(ConfusionMatrix::new(2).accuracy(), None);
    }

    #[rstest]
    fn merge_adds_counts() {
        let mut left = ConfusionMatrix::new(2);
        left.record(0, 0);
        let mut right = ConfusionMatrix::new(2);
        right.record(0, 0);
        right.record(1, 0);
        assert!(left.merge(&right));
        assert_eq!(left.get(0, 0), 2);
        assert_eq!(left.get(1, 0), 1);
    }

    #[rstest]
    fn merge_reports_size_mismatch() {
        let mut small = ConfusionMatrix::new(2);
        small.record(0, 0);
        small.record(1, 1);
        let mut big = ConfusionMatrix::new(3);
        assert!(!big.merge(&small));
        assert_eq!(big.total(), 0);
        assert_eq!(small.total(), 2);
    }
}
