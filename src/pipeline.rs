//! End-to-end forward pass: extraction, grouping, fusion and classification.
//!
//! A pass moves through [`PipelineStage`] strictly in order. Any failure
//! aborts the pass and nothing partial is returned.

use std::fmt;

use ndarray::{ArrayD, ArrayView4, ArrayViewD, Axis};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::api::{GroupingTrace, Recognition, ShapeRecognizer, ViewFeatures};
use crate::config::{ConfigError, GroupingConfig, ModelConfig};
use crate::grouping::{
    GroupScheme, GroupWeights, GroupingError, check_descriptor_shapes, fuse_groups, pool_groups,
};
use crate::providers::{ClassifierHead, ViewExtractor};
use crate::score::discrimination_scores;

/// States of a single forward pass, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    ViewsIngested,
    ScoresComputed,
    SchemeBuilt,
    WeightsComputed,
    GroupsPooled,
    Fused,
    Classified,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::ViewsIngested => "views_ingested",
            Self::ScoresComputed => "scores_computed",
            Self::SchemeBuilt => "scheme_built",
            Self::WeightsComputed => "weights_computed",
            Self::GroupsPooled => "groups_pooled",
            Self::Fused => "fused",
            Self::Classified => "classified",
        };
        f.write_str(name)
    }
}

/// A grouping failure tagged with the stage that could not be reached.
#[derive(Debug, Clone, Error, PartialEq)]
#[error("pass failed before reaching {stage}: {source}")]
pub struct StageError {
    pub stage: PipelineStage,
    #[source]
    pub source: GroupingError,
}

impl StageError {
    fn at(stage: PipelineStage) -> impl FnOnce(GroupingError) -> Self {
        move |source| Self { stage, source }
    }
}

/// Errors returned by [`Gvcnn`].
#[derive(Debug, Error)]
pub enum PipelineError<X, C> {
    #[error("expected {expected} views but received {actual}")]
    ViewCount { expected: usize, actual: usize },
    #[error("feature extraction failed for view {view}: {source}")]
    Extract {
        view: usize,
        #[source]
        source: X,
    },
    #[error(transparent)]
    Grouping(#[from] StageError),
    #[error("classification failed: {0}")]
    Classify(#[source] C),
    #[error("classifier head returned no logits")]
    NoLogits,
}

/// Every intermediate product of grouping and fusion for one shape.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupedShape {
    pub scores: Vec<f32>,
    pub scheme: GroupScheme,
    pub weights: GroupWeights,
    /// One pooled descriptor per group; zero tensors for empty groups.
    pub group_descriptors: Vec<ArrayD<f32>>,
    pub shape_descriptor: ArrayD<f32>,
}

impl GroupedShape {
    #[must_use]
    pub fn trace(&self) -> GroupingTrace {
        GroupingTrace::new(self.scores.clone(), &self.scheme, &self.weights)
    }
}

/// Group extractor outputs and fuse them into a shape descriptor.
///
/// Runs the scoring, scheme, weight, pooling and fusion stages in order on
/// the current thread.
///
/// # Errors
///
/// Returns a [`StageError`] naming the stage that failed: a view count other
/// than `config.num_views` or mismatched descriptor shapes fail ingestion, NaN
/// or out-of-range scores fail scoring or scheme construction, and a zero
/// total weight fails fusion.
///
/// # Examples
///
/// ```
/// use gvcnn::{group_and_fuse, GroupingConfig, ViewFeatures};
/// use ndarray::arr1;
///
/// let config = GroupingConfig { num_views: 2, ..GroupingConfig::default() };
/// let features = vec![
///     ViewFeatures::new(arr1(&[1.0, 2.0]).into_dyn(), 9.0),
///     ViewFeatures::new(arr1(&[3.0, 6.0]).into_dyn(), -9.0),
/// ];
/// let grouped = group_and_fuse(&features, &config).unwrap();
/// assert_eq!(grouped.scheme.assignment(), &[4, 4]);
/// assert_eq!(grouped.shape_descriptor, arr1(&[2.0, 4.0]).into_dyn());
/// ```
#[expect(clippy::float_cmp, reason = "only an exactly zero logit is degenerate")]
pub fn group_and_fuse(
    features: &[ViewFeatures],
    config: &GroupingConfig,
) -> Result<GroupedShape, StageError> {
    if features.len() != config.num_views {
        return Err(StageError {
            stage: PipelineStage::ViewsIngested,
            source: GroupingError::ViewCountMismatch {
                expected: config.num_views,
                actual: features.len(),
            },
        });
    }
    let descriptors: Vec<ArrayViewD<'_, f32>> = features
        .iter()
        .map(|view| view.descriptor.view())
        .collect();
    check_descriptor_shapes(&descriptors).map_err(StageError::at(PipelineStage::ViewsIngested))?;
    debug!(stage = %PipelineStage::ViewsIngested, views = features.len());

    let logits: Vec<f32> = features.iter().map(|view| view.logit).collect();
    for (view, _) in logits.iter().enumerate().filter(|(_, logit)| **logit == 0.0) {
        warn!(view, "zero logit gives a degenerate discrimination score of 0");
    }
    let mut scores = discrimination_scores(&logits);
    config
        .score_policy
        .sanitise(&mut scores)
        .map_err(StageError::at(PipelineStage::ScoresComputed))?;
    debug!(stage = %PipelineStage::ScoresComputed, ?scores);

    let scheme = GroupScheme::build(&scores, config.num_groups)
        .map_err(StageError::at(PipelineStage::SchemeBuilt))?;
    debug!(stage = %PipelineStage::SchemeBuilt, assignment = ?scheme.assignment());

    let weights = GroupWeights::compute(&scheme, &scores)
        .map_err(StageError::at(PipelineStage::WeightsComputed))?;
    debug!(stage = %PipelineStage::WeightsComputed, weights = ?weights.as_slice());

    let group_descriptors = pool_groups(&descriptors, &scheme)
        .map_err(StageError::at(PipelineStage::GroupsPooled))?;
    debug!(stage = %PipelineStage::GroupsPooled, groups = group_descriptors.len());

    let shape_descriptor = fuse_groups(&group_descriptors, &weights)
        .map_err(StageError::at(PipelineStage::Fused))?;
    debug!(stage = %PipelineStage::Fused, shape = ?shape_descriptor.shape());

    Ok(GroupedShape {
        scores,
        scheme,
        weights,
        group_descriptors,
        shape_descriptor,
    })
}

/// Group-view CNN: a view extractor and classifier head around the grouping
/// core.
#[derive(Debug)]
pub struct Gvcnn<E, H> {
    extractor: E,
    head: H,
    config: ModelConfig,
}

impl<E, H> Gvcnn<E, H>
where
    E: ViewExtractor + Sync,
    H: ClassifierHead,
{
    /// Assemble a pipeline after validating `config`.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the configuration is invalid.
    pub fn new(extractor: E, head: H, config: ModelConfig) -> Result<Self, ConfigError> {
        let config = config.validate()?;
        Ok(Self {
            extractor,
            head,
            config,
        })
    }

    #[must_use]
    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    /// Run the extractor over every view in parallel, keeping view order.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::ViewCount`] when the number of views differs
    /// from the configuration and [`PipelineError::Extract`] when any view
    /// fails.
    pub fn extract_views(
        &self,
        views: ArrayView4<'_, f32>,
    ) -> Result<Vec<ViewFeatures>, PipelineError<E::Error, H::Error>> {
        let expected = self.config.grouping.num_views;
        let actual = views.len_of(Axis(0));
        if actual != expected {
            return Err(PipelineError::ViewCount { expected, actual });
        }
        let extractor = &self.extractor;
        (0..actual)
            .into_par_iter()
            .map(|view| {
                extractor
                    .extract(views.index_axis(Axis(0), view))
                    .map_err(|source| PipelineError::Extract { view, source })
            })
            .collect()
    }
}

impl<E, H> ShapeRecognizer for Gvcnn<E, H>
where
    E: ViewExtractor + Sync,
    H: ClassifierHead,
{
    type Error = PipelineError<E::Error, H::Error>;

    fn recognise(&self, views: ArrayView4<'_, f32>) -> Result<Recognition, Self::Error> {
        let features = self.extract_views(views)?;
        let grouped = group_and_fuse(&features, &self.config.grouping)?;

        let logits = self
            .head
            .classify(grouped.shape_descriptor.view())
            .map_err(PipelineError::Classify)?;
        let class_index = argmax(&logits).ok_or(PipelineError::NoLogits)?;
        let label = self.config.label(class_index).map(str::to_owned);
        debug!(stage = %PipelineStage::Classified, class_index, label = ?label);

        let trace = grouped.trace();
        Ok(Recognition {
            logits,
            class_index,
            label,
            shape_descriptor: grouped.shape_descriptor,
            trace,
        })
    }
}

/// Index of the largest value; the first one wins ties.
fn argmax(values: &[f32]) -> Option<usize> {
    values
        .iter()
        .enumerate()
        .fold(None, |best: Option<(usize, f32)>, (index, &value)| match best {
            Some((_, top)) if value.total_cmp(&top).is_le() => best,
            _ => Some((index, value)),
        })
        .map(|(index, _)| index)
}
