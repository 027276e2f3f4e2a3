use gvcnn::{GroupingConfig, GroupingTrace, ViewFeatures, group_and_fuse};
use ndarray::arr1;
use serde::Deserialize;
use serde_json::from_str;
use std::error::Error;

mod support;
use support::approx_eq;

const TRACES_JSONL: &str = include_str!("golden/traces.jsonl");

#[derive(Deserialize)]
struct GoldenTrace {
    id: u32,
    num_groups: usize,
    logits: Vec<f32>,
    #[serde(flatten)]
    trace: GroupingTrace,
}

fn assert_close(actual: &[f32], expected: &[f32], what: &str, id: u32) {
    assert_eq!(actual.len(), expected.len(), "{what} length for id {id}");
    for (a, e) in actual.iter().zip(expected) {
        assert!(approx_eq(*a, *e, 1e-5), "{what} mismatch for id {id}: {a} vs {e}");
    }
}

#[test]
fn golden_traces() -> Result<(), Box<dyn Error>> {
    for line in TRACES_JSONL.lines() {
        let expected: GoldenTrace = from_str(line)?;
        let config = GroupingConfig {
            num_groups: expected.num_groups,
            num_views: expected.logits.len(),
            ..GroupingConfig::default()
        };
        let features: Vec<ViewFeatures> = expected
            .logits
            .iter()
            .map(|&logit| ViewFeatures::new(arr1(&[logit]).into_dyn(), logit))
            .collect();
        let actual = group_and_fuse(&features, &config)?.trace();
        assert_eq!(
            actual.assignment, expected.trace.assignment,
            "assignment mismatch for id {}",
            expected.id
        );
        assert_eq!(
            actual.scheme, expected.trace.scheme,
            "scheme mismatch for id {}",
            expected.id
        );
        assert_close(&actual.scores, &expected.trace.scores, "scores", expected.id);
        assert_close(&actual.weights, &expected.trace.weights, "weights", expected.id);
    }
    Ok(())
}
