//! Assignment of views to equal-width discrimination buckets.

use ndarray::{Array2, ArrayView2};

use super::errors::GroupingError;

/// Binary `groups × views` matrix assigning every view to exactly one group.
///
/// Group `g` covers scores in `[g / G, (g + 1) / G)`; the topmost bucket also
/// owns `1.0`. Rows may be empty, columns never are.
///
/// # Examples
///
/// ```
/// use gvcnn::grouping::GroupScheme;
///
/// let scheme = GroupScheme::build(&[0.1, 0.5, 0.9, 0.5], 5).unwrap();
/// assert_eq!(scheme.assignment(), &[0, 2, 4, 2]);
/// assert!(scheme.is_empty_group(1));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct GroupScheme {
    matrix: Array2<u8>,
    assignment: Vec<usize>,
}

impl GroupScheme {
    /// Assign each score to its bucket.
    ///
    /// Bucketing computes `floor(score * G)` in `f32`. For every `G` up to 21
    /// a boundary score `k / G` lands in the upper bucket `k`. From `G = 22`
    /// some boundaries round one bucket low (for example `1 / 61` with
    /// `G = 61` lands in bucket 0); scores strictly inside a bucket are
    /// unaffected.
    ///
    /// # Errors
    ///
    /// Returns [`GroupingError::ZeroGroups`] when `num_groups` is zero,
    /// [`GroupingError::NoViews`] when `scores` is empty and
    /// [`GroupingError::InvalidScore`] for the first score that is NaN or lies
    /// outside `[0, 1]`.
    pub fn build(scores: &[f32], num_groups: usize) -> Result<Self, GroupingError> {
        if num_groups == 0 {
            return Err(GroupingError::ZeroGroups);
        }
        if scores.is_empty() {
            return Err(GroupingError::NoViews);
        }
        if let Some((view, &score)) = scores
            .iter()
            .enumerate()
            .find(|(_, score)| !(0.0..=1.0).contains(*score))
        {
            return Err(GroupingError::InvalidScore { view, score });
        }

        let assignment: Vec<usize> = scores
            .iter()
            .map(|&score| bucket_index(score, num_groups))
            .collect();
        let mut matrix = Array2::zeros((num_groups, scores.len()));
        for (view, &group) in assignment.iter().enumerate() {
            if let Some(cell) = matrix.get_mut((group, view)) {
                *cell = 1;
            }
        }
        Ok(Self { matrix, assignment })
    }

    #[must_use]
    pub fn num_groups(&self) -> usize {
        self.matrix.nrows()
    }

    #[must_use]
    pub fn num_views(&self) -> usize {
        self.matrix.ncols()
    }

    /// Group index of every view, in view order.
    #[must_use]
    pub fn assignment(&self) -> &[usize] {
        &self.assignment
    }

    /// Group that owns `view`, or `None` when the view index is out of range.
    #[must_use]
    pub fn group_of(&self, view: usize) -> Option<usize> {
        self.assignment.get(view).copied()
    }

    /// View indices belonging to `group`, in ascending order.
    pub fn members(&self, group: usize) -> impl Iterator<Item = usize> + '_ {
        self.assignment
            .iter()
            .enumerate()
            .filter_map(move |(view, &owner)| (owner == group).then_some(view))
    }

    #[must_use]
    pub fn member_count(&self, group: usize) -> usize {
        self.members(group).count()
    }

    #[must_use]
    pub fn is_empty_group(&self, group: usize) -> bool {
        self.members(group).next().is_none()
    }

    /// Borrow the underlying `groups × views` matrix.
    #[must_use]
    pub fn as_array(&self) -> ArrayView2<'_, u8> {
        self.matrix.view()
    }

    /// Matrix rows as nested vectors, used by [`crate::GroupingTrace`].
    #[must_use]
    pub fn rows(&self) -> Vec<Vec<u8>> {
        self.matrix.rows().into_iter().map(|row| row.to_vec()).collect()
    }
}

/// Bucket for a score already known to lie in `[0, 1]`.
#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss,
    reason = "score is in [0, 1] and group counts are small"
)]
#[expect(clippy::float_arithmetic, reason = "bucket index scales the score")]
fn bucket_index(score: f32, num_groups: usize) -> usize {
    let scaled = (score * num_groups as f32).floor() as usize;
    scaled.min(num_groups - 1)
}
