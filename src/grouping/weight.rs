//! Per-group weights derived from member discrimination scores.

use ndarray::Array1;

use super::{errors::GroupingError, scheme::GroupScheme};

/// Mean discrimination score of each group; `0` for empty groups.
///
/// Groups holding more discriminative views receive larger weights and so
/// contribute more to the fused shape descriptor.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupWeights(Array1<f32>);

impl GroupWeights {
    /// Average the member scores of every group in `scheme`.
    ///
    /// # Errors
    ///
    /// Returns [`GroupingError::ViewCountMismatch`] when `scores` does not hold
    /// one entry per view of the scheme.
    ///
    /// # Examples
    ///
    /// ```
    /// use gvcnn::grouping::{GroupScheme, GroupWeights};
    ///
    /// let scores = [0.1, 0.5, 0.9, 0.5];
    /// let scheme = GroupScheme::build(&scores, 5).unwrap();
    /// let weights = GroupWeights::compute(&scheme, &scores).unwrap();
    /// assert_eq!(weights.as_slice(), &[0.1, 0.0, 0.5, 0.0, 0.9]);
    /// ```
    #[expect(clippy::float_arithmetic, reason = "mean of member scores")]
    #[expect(clippy::cast_precision_loss, reason = "member counts are small")]
    pub fn compute(scheme: &GroupScheme, scores: &[f32]) -> Result<Self, GroupingError> {
        if scores.len() != scheme.num_views() {
            return Err(GroupingError::ViewCountMismatch {
                expected: scheme.num_views(),
                actual: scores.len(),
            });
        }

        let mut sums = vec![0.0_f32; scheme.num_groups()];
        let mut counts = vec![0_usize; scheme.num_groups()];
        for (&group, &score) in scheme.assignment().iter().zip(scores) {
            if let (Some(sum), Some(count)) = (sums.get_mut(group), counts.get_mut(group)) {
                *sum += score;
                *count += 1;
            }
        }

        let weights = sums
            .into_iter()
            .zip(counts)
            .map(|(sum, count)| if count == 0 { 0.0 } else { sum / count as f32 })
            .collect();
        Ok(Self(weights))
    }

    /// Build weights directly, e.g. for fusing externally pooled groups.
    ///
    /// Values are not checked here; [`crate::grouping::fuse_groups`] rejects
    /// negative and non-finite weights.
    #[must_use]
    pub fn from_vec(weights: Vec<f32>) -> Self {
        Self(Array1::from(weights))
    }

    /// Weight of `group`, or `None` when out of range.
    #[must_use]
    pub fn get(&self, group: usize) -> Option<f32> {
        self.0.get(group).copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Sum of all group weights; the fusion denominator.
    #[must_use]
    pub fn total(&self) -> f32 {
        self.0.sum()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[f32] {
        self.0.as_slice().unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = f32> + '_ {
        self.0.iter().copied()
    }
}
