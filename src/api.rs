use ndarray::{ArrayD, ArrayView4, IxDyn, ShapeError};
use serde::{Deserialize, Serialize};

use crate::grouping::{GroupScheme, GroupWeights};

/// Output of a view extractor for a single rendered view.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewFeatures {
    /// Feature tensor, e.g. `[H', W', C]`. Every view of a shape shares it.
    pub descriptor: ArrayD<f32>,
    /// Raw scalar logit later turned into a discrimination score.
    pub logit: f32,
}

impl ViewFeatures {
    #[must_use]
    pub fn new(descriptor: ArrayD<f32>, logit: f32) -> Self {
        Self { descriptor, logit }
    }
}

/// Serialised form of [`ViewFeatures`] for pre-extracted view dumps.
///
/// # Examples
///
/// ```
/// use gvcnn::api::ViewRecord;
///
/// let record: ViewRecord =
///     serde_json::from_str(r#"{"shape":[1,2],"values":[0.5,1.5],"logit":-2.0}"#).unwrap();
/// let features = record.into_features().unwrap();
/// assert_eq!(features.descriptor.shape(), &[1, 2]);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ViewRecord {
    pub shape: Vec<usize>,
    pub values: Vec<f32>,
    pub logit: f32,
}

impl ViewRecord {
    /// Rebuild the descriptor tensor.
    ///
    /// # Errors
    ///
    /// Returns a [`ShapeError`] if `values` does not fill `shape` exactly.
    pub fn into_features(self) -> Result<ViewFeatures, ShapeError> {
        let descriptor = ArrayD::from_shape_vec(IxDyn(&self.shape), self.values)?;
        Ok(ViewFeatures::new(descriptor, self.logit))
    }
}

/// Diagnostic trace of the grouping decisions for one shape.
///
/// # Examples
///
/// ```
/// use gvcnn::api::GroupingTrace;
///
/// let trace = GroupingTrace {
///     scores: vec![0.9],
///     assignment: vec![1],
///     scheme: vec![vec![0], vec![1]],
///     weights: vec![0.0, 0.9],
/// };
/// assert_eq!(trace.num_groups(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupingTrace {
    /// Discrimination score per view, after the score policy.
    pub scores: Vec<f32>,
    /// Group index per view.
    pub assignment: Vec<usize>,
    /// Rows of the `groups × views` scheme matrix.
    pub scheme: Vec<Vec<u8>>,
    /// Weight per group.
    pub weights: Vec<f32>,
}

impl GroupingTrace {
    #[must_use]
    pub fn new(scores: Vec<f32>, scheme: &GroupScheme, weights: &GroupWeights) -> Self {
        Self {
            scores,
            assignment: scheme.assignment().to_vec(),
            scheme: scheme.rows(),
            weights: weights.as_slice().to_vec(),
        }
    }

    #[must_use]
    pub fn num_groups(&self) -> usize {
        self.scheme.len()
    }
}

/// Result of recognising one shape.
#[derive(Debug, Clone, PartialEq)]
pub struct Recognition {
    /// Raw class logits from the classifier head.
    pub logits: Vec<f32>,
    /// Index of the highest logit.
    pub class_index: usize,
    /// Name of the predicted class when the label set covers it.
    pub label: Option<String>,
    /// Fused shape descriptor fed to the classifier.
    pub shape_descriptor: ArrayD<f32>,
    pub trace: GroupingTrace,
}

/// Trait for recognising a shape from its rendered views.
pub trait ShapeRecognizer {
    /// Error type returned when recognition fails.
    type Error: std::error::Error + Send + Sync;

    /// Recognise a shape from `[V, H, W, C]` views.
    ///
    /// # Errors
    ///
    /// Returns an error if any stage of the forward pass fails; no partial
    /// result is produced.
    fn recognise(&self, views: ArrayView4<'_, f32>) -> Result<Recognition, Self::Error>;

    /// Produce only the grouping trace for a shape.
    ///
    /// # Errors
    ///
    /// Returns an error if recognition fails.
    fn trace(&self, views: ArrayView4<'_, f32>) -> Result<GroupingTrace, Self::Error> {
        self.recognise(views).map(|recognition| recognition.trace)
    }
}
