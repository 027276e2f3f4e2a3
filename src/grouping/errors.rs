use thiserror::Error;

/// Errors raised by the grouping and fusion stages.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum GroupingError {
    #[error("discrimination score {score} for view {view} lies outside [0, 1]")]
    InvalidScore { view: usize, score: f32 },
    #[error("grouping requires at least one group")]
    ZeroGroups,
    #[error("grouping requires at least one view")]
    NoViews,
    #[error("expected {expected} views but found {actual}")]
    ViewCountMismatch { expected: usize, actual: usize },
    #[error("expected {expected} groups but found {actual}")]
    GroupCountMismatch { expected: usize, actual: usize },
    /// `index` is a view index during pooling and a group index during fusion.
    #[error("descriptor {index} has shape {actual:?} but expected {expected:?}")]
    DescriptorShapeMismatch {
        index: usize,
        expected: Vec<usize>,
        actual: Vec<usize>,
    },
    #[error("group {group} has weight {weight}; weights must be finite and non-negative")]
    InvalidWeight { group: usize, weight: f32 },
    #[error("total group weight {total_weight} cannot normalise the shape descriptor")]
    DegenerateGrouping { total_weight: f32 },
}
