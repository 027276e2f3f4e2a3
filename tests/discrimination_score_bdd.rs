//! BDD tests for the discrimination scorer.

use gvcnn::{discrimination_score, tests::support::approx_eq};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use std::cell::RefCell;

#[derive(Default)]
struct ScoreContext {
    logit: RefCell<Option<f32>>,
    score: RefCell<Option<f32>>,
}

#[fixture]
fn score_context() -> ScoreContext {
    ScoreContext::default()
}

#[given("a raw logit of {logit:f32}")]
fn given_logit(logit: f32, #[from(score_context)] ctx: &ScoreContext) {
    ctx.logit.replace(Some(logit));
}

#[when("the discrimination score is computed")]
fn when_scored(#[from(score_context)] ctx: &ScoreContext) {
    let logit = ctx
        .logit
        .borrow()
        .unwrap_or_else(|| panic!("logit to be set"));
    ctx.score.replace(Some(discrimination_score(logit)));
}

#[then("the score is {expected:f32}")]
fn then_score(expected: f32, #[from(score_context)] ctx: &ScoreContext) {
    let score = ctx
        .score
        .borrow()
        .unwrap_or_else(|| panic!("score to be set"));
    assert!((0.0..=1.0).contains(&score));
    assert!(approx_eq(score, expected, 1e-6));
}

#[scenario(path = "tests/features/discrimination_score.feature", index = 0)]
fn unit_logit(score_context: ScoreContext) {
    let _ = score_context;
}

#[scenario(path = "tests/features/discrimination_score.feature", index = 1)]
fn sign_is_ignored(score_context: ScoreContext) {
    let _ = score_context;
}

#[scenario(path = "tests/features/discrimination_score.feature", index = 2)]
fn zero_logit(score_context: ScoreContext) {
    let _ = score_context;
}

#[scenario(path = "tests/features/discrimination_score.feature", index = 3)]
fn large_logit(score_context: ScoreContext) {
    let _ = score_context;
}
