//! Weighted fusion of group descriptors into one shape descriptor.

use ndarray::ArrayD;

use super::{errors::GroupingError, weight::GroupWeights};

/// Combine group descriptors into `Σ w_g · d_g / Σ w_g`.
///
/// Zero-weight groups are skipped, so an empty group's zero tensor never
/// touches the accumulator.
///
/// # Errors
///
/// Returns [`GroupingError::GroupCountMismatch`] when the descriptor and
/// weight counts differ, [`GroupingError::ZeroGroups`] when both are empty,
/// [`GroupingError::DescriptorShapeMismatch`] for inconsistent group shapes,
/// [`GroupingError::InvalidWeight`] for the first negative or non-finite
/// weight and [`GroupingError::DegenerateGrouping`] when the total weight is
/// not a positive finite number.
///
/// # Examples
///
/// ```
/// use gvcnn::grouping::{fuse_groups, GroupWeights};
/// use ndarray::arr1;
///
/// let groups = vec![arr1(&[4.0_f32]).into_dyn(), arr1(&[1.0_f32]).into_dyn()];
/// let weights = GroupWeights::from_vec(vec![0.25, 0.75]);
/// let fused = fuse_groups(&groups, &weights).unwrap();
/// assert_eq!(fused, arr1(&[1.75]).into_dyn());
/// ```
#[expect(clippy::float_arithmetic, reason = "weighted mean")]
#[expect(clippy::float_cmp, reason = "exactly zero weights mark empty groups")]
pub fn fuse_groups(
    group_descriptors: &[ArrayD<f32>],
    weights: &GroupWeights,
) -> Result<ArrayD<f32>, GroupingError> {
    if group_descriptors.len() != weights.len() {
        return Err(GroupingError::GroupCountMismatch {
            expected: weights.len(),
            actual: group_descriptors.len(),
        });
    }
    let first = group_descriptors.first().ok_or(GroupingError::ZeroGroups)?;
    if let Some((index, descriptor)) = group_descriptors
        .iter()
        .enumerate()
        .find(|(_, descriptor)| descriptor.shape() != first.shape())
    {
        return Err(GroupingError::DescriptorShapeMismatch {
            index,
            expected: first.shape().to_vec(),
            actual: descriptor.shape().to_vec(),
        });
    }

    if let Some((group, weight)) = weights
        .iter()
        .enumerate()
        .find(|(_, weight)| !weight.is_finite() || *weight < 0.0)
    {
        return Err(GroupingError::InvalidWeight { group, weight });
    }

    let total_weight = weights.total();
    if !total_weight.is_finite() || total_weight <= 0.0 {
        return Err(GroupingError::DegenerateGrouping { total_weight });
    }

    let mut fused = ArrayD::<f32>::zeros(first.raw_dim());
    for (descriptor, weight) in group_descriptors.iter().zip(weights.iter()) {
        if weight == 0.0 {
            continue;
        }
        fused.scaled_add(weight, descriptor);
    }
    fused.mapv_inplace(|value| value / total_weight);
    Ok(fused)
}
