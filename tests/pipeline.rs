//! End-to-end tests for `Gvcnn` with a stub extractor and a linear head.

use gvcnn::grouping::GroupingError;
use gvcnn::providers::{LinearHead, ViewExtractor};
use gvcnn::{
    GroupingConfig, Gvcnn, ModelConfig, PipelineError, PipelineStage, ShapeRecognizer,
    StageError, ViewFeatures, group_and_fuse,
};
use ndarray::{Array4, ArrayView3, arr1, arr2};
use rstest::{fixture, rstest};
use thiserror::Error;

mod support;
use support::approx_eq;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("view contains a negative pixel")]
struct NegativePixel;

/// Uses the view itself as its descriptor and the pixel sum as its logit.
struct PixelSumExtractor;

impl ViewExtractor for PixelSumExtractor {
    type Error = NegativePixel;

    fn extract(&self, view: ArrayView3<'_, f32>) -> Result<ViewFeatures, Self::Error> {
        if view.iter().any(|&pixel| pixel < 0.0) {
            return Err(NegativePixel);
        }
        Ok(ViewFeatures::new(view.to_owned().into_dyn(), view.sum()))
    }
}

type Pipeline = Gvcnn<PixelSumExtractor, LinearHead>;

#[fixture]
fn pipeline() -> Pipeline {
    let head = LinearHead::new(arr2(&[[1.0, 0.0], [0.0, 1.0]]), arr1(&[0.0, 0.0]))
        .unwrap_or_else(|e| panic!("valid head: {e}"));
    let config = ModelConfig {
        grouping: GroupingConfig {
            num_views: 4,
            ..GroupingConfig::default()
        },
        labels: vec!["flat".into(), "tall".into()],
    };
    Gvcnn::new(PixelSumExtractor, head, config).unwrap_or_else(|e| panic!("valid config: {e}"))
}

/// Four `1 × 1 × 2` views built from `(a, b)` pixel pairs.
fn views(pixels: [[f32; 2]; 4]) -> Array4<f32> {
    let flat: Vec<f32> = pixels.iter().flatten().copied().collect();
    Array4::from_shape_vec((4, 1, 1, 2), flat).unwrap_or_else(|e| panic!("view shape: {e}"))
}

#[rstest]
fn recognises_the_dominant_channel(pipeline: Pipeline) {
    // Logits 1, 3, 9, 1 score 0.5, 0.75, 0.9, 0.5.
    let batch = views([[1.0, 0.0], [0.0, 3.0], [0.0, 9.0], [1.0, 0.0]]);
    let recognition = pipeline
        .recognise(batch.view())
        .unwrap_or_else(|e| panic!("recognition failed: {e}"));

    assert_eq!(recognition.trace.assignment, vec![2, 3, 4, 2]);
    assert_eq!(recognition.class_index, 1);
    assert_eq!(recognition.label.as_deref(), Some("tall"));

    let total = 0.5 + 0.75 + 0.9;
    let fused: Vec<f32> = recognition.shape_descriptor.iter().copied().collect();
    assert!(approx_eq(fused[0], 0.5 / total, 1e-5));
    assert!(approx_eq(fused[1], (0.75 * 3.0 + 0.9 * 9.0) / total, 1e-5));
    assert_eq!(recognition.logits.len(), 2);
}

#[rstest]
fn reruns_are_bit_identical(pipeline: Pipeline) {
    let batch = views([[0.2, 0.1], [4.0, 1.0], [0.5, 0.5], [7.0, 0.0]]);
    let run = || {
        pipeline
            .recognise(batch.view())
            .unwrap_or_else(|e| panic!("recognition failed: {e}"))
    };
    let bits = |values: &[f32]| values.iter().map(|value| value.to_bits()).collect::<Vec<u32>>();
    let (first, second) = (run(), run());

    assert_eq!(first.trace.assignment, second.trace.assignment);
    assert_eq!(first.trace.scheme, second.trace.scheme);
    assert_eq!(bits(&first.trace.weights), bits(&second.trace.weights));
    assert_eq!(bits(&first.logits), bits(&second.logits));
    let descriptor = |recognition: &gvcnn::Recognition| {
        recognition.shape_descriptor.iter().copied().collect::<Vec<f32>>()
    };
    assert_eq!(bits(&descriptor(&first)), bits(&descriptor(&second)));
}

#[rstest]
fn zero_logits_fail_at_fusion(pipeline: Pipeline) {
    let batch = views([[0.0, 0.0]; 4]);
    match pipeline.recognise(batch.view()) {
        Err(PipelineError::Grouping(StageError {
            stage: PipelineStage::Fused,
            source: GroupingError::DegenerateGrouping { .. },
        })) => {}
        other => panic!("expected a degenerate grouping, got {other:?}"),
    }
}

#[rstest]
fn nan_logit_fails_at_scoring(pipeline: Pipeline) {
    let batch = views([[1.0, 0.0], [f32::NAN, 0.0], [1.0, 0.0], [1.0, 0.0]]);
    match pipeline.recognise(batch.view()) {
        Err(PipelineError::Grouping(StageError {
            stage: PipelineStage::ScoresComputed,
            source: GroupingError::InvalidScore { view: 1, .. },
        })) => {}
        other => panic!("expected an invalid score, got {other:?}"),
    }
}

#[rstest]
fn extraction_errors_name_the_view(pipeline: Pipeline) {
    let batch = views([[1.0, 0.0], [1.0, 0.0], [-1.0, 0.0], [1.0, 0.0]]);
    match pipeline.recognise(batch.view()) {
        Err(PipelineError::Extract { view: 2, source }) => assert_eq!(source, NegativePixel),
        other => panic!("expected an extraction failure, got {other:?}"),
    }
}

#[rstest]
fn wrong_view_count_is_rejected(pipeline: Pipeline) {
    let batch = Array4::<f32>::ones((3, 1, 1, 2));
    assert!(matches!(
        pipeline.recognise(batch.view()),
        Err(PipelineError::ViewCount {
            expected: 4,
            actual: 3
        })
    ));
}

#[rstest]
fn trace_matches_recognition(pipeline: Pipeline) {
    let batch = views([[1.0, 0.0], [0.0, 3.0], [0.0, 9.0], [1.0, 0.0]]);
    let trace = pipeline
        .trace(batch.view())
        .unwrap_or_else(|e| panic!("trace failed: {e}"));
    assert_eq!(trace.num_groups(), 5);
    assert_eq!(trace.scheme[1], vec![0, 0, 0, 0]);
    assert_eq!(trace.scheme[2], vec![1, 0, 0, 1]);
}

#[rstest]
fn invalid_model_config_is_rejected() {
    let head = LinearHead::new(arr2(&[[1.0]]), arr1(&[0.0]))
        .unwrap_or_else(|e| panic!("valid head: {e}"));
    let config = ModelConfig {
        labels: Vec::new(),
        ..ModelConfig::default()
    };
    assert!(Gvcnn::new(PixelSumExtractor, head, config).is_err());
}

#[rstest]
fn mismatched_descriptors_fail_at_ingestion() {
    let config = GroupingConfig {
        num_views: 2,
        ..GroupingConfig::default()
    };
    let features = vec![
        ViewFeatures::new(arr1(&[1.0, 2.0]).into_dyn(), 1.0),
        ViewFeatures::new(arr1(&[1.0]).into_dyn(), 1.0),
    ];
    let err = group_and_fuse(&features, &config)
        .err()
        .unwrap_or_else(|| panic!("mismatched shapes should fail"));
    assert_eq!(err.stage, PipelineStage::ViewsIngested);
    assert!(matches!(
        err.source,
        GroupingError::DescriptorShapeMismatch { index: 1, .. }
    ));
}

#[rstest]
fn clamp_policy_still_rejects_nan() {
    let config = GroupingConfig {
        num_views: 1,
        score_policy: gvcnn::ScorePolicy::Clamp,
        ..GroupingConfig::default()
    };
    let features = vec![ViewFeatures::new(arr1(&[1.0]).into_dyn(), f32::NAN)];
    let err = group_and_fuse(&features, &config)
        .err()
        .unwrap_or_else(|| panic!("NaN logit should fail"));
    assert_eq!(err.stage, PipelineStage::ScoresComputed);
}
