//! Intra-group view pooling.

use ndarray::{ArrayD, ArrayViewD};

use super::{errors::GroupingError, scheme::GroupScheme};

/// Check that every descriptor has the shape of the first one.
///
/// # Errors
///
/// Returns [`GroupingError::NoViews`] for an empty slice and
/// [`GroupingError::DescriptorShapeMismatch`] naming the first offending view.
pub fn check_descriptor_shapes(descriptors: &[ArrayViewD<'_, f32>]) -> Result<(), GroupingError> {
    let first = descriptors.first().ok_or(GroupingError::NoViews)?;
    match descriptors
        .iter()
        .enumerate()
        .find(|(_, descriptor)| descriptor.shape() != first.shape())
    {
        Some((index, descriptor)) => Err(GroupingError::DescriptorShapeMismatch {
            index,
            expected: first.shape().to_vec(),
            actual: descriptor.shape().to_vec(),
        }),
        None => Ok(()),
    }
}

/// Average the descriptors of each group's member views.
///
/// Returns one descriptor per group, in group order. Empty groups yield an
/// all-zero tensor shaped like a single view descriptor. Members are summed in
/// ascending view order, so repeated calls are bit-identical.
///
/// # Errors
///
/// Returns [`GroupingError::NoViews`], [`GroupingError::ViewCountMismatch`]
/// when the descriptor count differs from the scheme's view count, and
/// [`GroupingError::DescriptorShapeMismatch`] for inconsistent shapes.
///
/// # Examples
///
/// ```
/// use gvcnn::grouping::{pool_groups, GroupScheme};
/// use ndarray::{arr1, ArrayD};
///
/// let descriptors: Vec<ArrayD<f32>> = vec![
///     arr1(&[1.0, 2.0]).into_dyn(),
///     arr1(&[3.0, 6.0]).into_dyn(),
/// ];
/// let views: Vec<_> = descriptors.iter().map(ArrayD::view).collect();
/// let scheme = GroupScheme::build(&[0.5, 0.55], 2).unwrap();
/// let pooled = pool_groups(&views, &scheme).unwrap();
/// assert_eq!(pooled[0], arr1(&[0.0, 0.0]).into_dyn());
/// assert_eq!(pooled[1], arr1(&[2.0, 4.0]).into_dyn());
/// ```
#[expect(clippy::float_arithmetic, reason = "element-wise mean")]
#[expect(clippy::cast_precision_loss, reason = "member counts are small")]
pub fn pool_groups(
    descriptors: &[ArrayViewD<'_, f32>],
    scheme: &GroupScheme,
) -> Result<Vec<ArrayD<f32>>, GroupingError> {
    check_descriptor_shapes(descriptors)?;
    if descriptors.len() != scheme.num_views() {
        return Err(GroupingError::ViewCountMismatch {
            expected: scheme.num_views(),
            actual: descriptors.len(),
        });
    }
    let dim = descriptors
        .first()
        .ok_or(GroupingError::NoViews)?
        .raw_dim();

    let pooled = (0..scheme.num_groups())
        .map(|group| {
            let mut sum = ArrayD::<f32>::zeros(dim.clone());
            let mut count = 0_usize;
            for descriptor in scheme.members(group).filter_map(|view| descriptors.get(view)) {
                sum += descriptor;
                count += 1;
            }
            if count > 0 {
                let n = count as f32;
                sum.mapv_inplace(|value| value / n);
            }
            sum
        })
        .collect();
    Ok(pooled)
}
