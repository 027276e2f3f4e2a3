//! Discrimination scoring for raw per-view logits.
//!
//! A view's raw logit is mapped onto `[0, 1]` with `sigmoid(ln |logit|)`.
//! Taking the logarithm of the magnitude discards the sign and makes the score
//! monotonic in `|logit|`:
//! - `logit == 0` yields `sigmoid(-inf) = 0`, the degenerate low end.
//! - very small magnitudes collapse towards `0`.
//! - a NaN logit propagates as a NaN score.
//!
//! Scores are then passed through [`ScorePolicy::sanitise`] before grouping so
//! that nothing outside `[0, 1]` reaches the bucket assignment.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::grouping::GroupingError;

/// Logistic sigmoid function mapping any real number to `[0, 1]`.
#[expect(clippy::float_arithmetic, reason = "sigmoid uses floats")]
#[inline]
#[must_use]
pub fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

/// Convert one raw logit into a discrimination score.
///
/// # Examples
///
/// ```rust
/// use gvcnn::score::discrimination_score;
///
/// assert_eq!(discrimination_score(0.0), 0.0);
/// assert!((discrimination_score(1.0) - 0.5).abs() < 1e-6);
/// assert_eq!(discrimination_score(-3.0), discrimination_score(3.0));
/// ```
#[inline]
#[must_use]
pub fn discrimination_score(logit: f32) -> f32 {
    sigmoid(logit.abs().ln())
}

/// Score every logit in view order.
#[must_use]
pub fn discrimination_scores(logits: &[f32]) -> Vec<f32> {
    logits.iter().copied().map(discrimination_score).collect()
}

/// How scores outside `[0, 1]` are treated before grouping.
///
/// NaN is rejected under every policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScorePolicy {
    /// Leave scores untouched; out-of-range values fail at the scheme builder.
    #[default]
    Reject,
    /// Clamp finite and infinite scores into `[0, 1]`.
    Clamp,
}

impl ScorePolicy {
    /// Apply the policy to `scores` in place.
    ///
    /// # Errors
    ///
    /// Returns [`GroupingError::InvalidScore`] for the first NaN score.
    pub fn sanitise(self, scores: &mut [f32]) -> Result<(), GroupingError> {
        for (view, score) in scores.iter_mut().enumerate() {
            if score.is_nan() {
                return Err(GroupingError::InvalidScore {
                    view,
                    score: *score,
                });
            }
            if self == Self::Clamp {
                *score = score.clamp(0.0, 1.0);
            }
        }
        Ok(())
    }
}

/// Error returned when a score policy name is not recognised.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown score policy \"{0}\"; expected \"reject\" or \"clamp\"")]
pub struct UnknownScorePolicy(pub String);

impl FromStr for ScorePolicy {
    type Err = UnknownScorePolicy;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name.trim().to_ascii_lowercase().as_str() {
            "reject" => Ok(Self::Reject),
            "clamp" => Ok(Self::Clamp),
            _ => Err(UnknownScorePolicy(name.to_owned())),
        }
    }
}

impl fmt::Display for ScorePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Reject => "reject",
            Self::Clamp => "clamp",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::support::approx_eq;
    use rstest::rstest;

    #[rstest]
    #[case(1.0, 0.5)]
    #[case(-1.0, 0.5)]
    #[case(3.0, 0.75)]
    #[case(-0.25, 0.2)]
    #[case(9.0, 0.9)]
    fn matches_magnitude_ratio(#[case] logit: f32, #[case] expected: f32) {
        assert!(approx_eq(discrimination_score(logit), expected, 1e-6));
    }

    #[rstest]
    fn zero_logit_scores_zero() {
        assert!(discrimination_score(0.0).abs() < f32::EPSILON);
        assert!(discrimination_score(-0.0).abs() < f32::EPSILON);
    }

    #[rstest]
    fn nan_logit_propagates() {
        assert!(discrimination_score(f32::NAN).is_nan());
    }

    #[rstest]
    fn huge_logit_saturates() {
        assert!(approx_eq(discrimination_score(f32::INFINITY), 1.0, 1e-6));
    }

    #[rstest]
    fn scores_preserve_view_order() {
        let scores = discrimination_scores(&[1.0, 0.0, -3.0]);
        assert_eq!(scores.len(), 3);
        assert!(approx_eq(scores[0], 0.5, 1e-6));
        assert!(scores[1].abs() < f32::EPSILON);
        assert!(approx_eq(scores[2], 0.75, 1e-6));
    }

    #[rstest]
    fn reject_leaves_scores_untouched() {
        let mut scores = [1.5, -0.5, 0.3];
        assert!(ScorePolicy::Reject.sanitise(&mut scores).is_ok());
        assert_eq!(scores, [1.5, -0.5, 0.3]);
    }

    #[rstest]
    fn clamp_bounds_scores() {
        let mut scores = [1.5, -0.5, 0.3];
        assert!(ScorePolicy::Clamp.sanitise(&mut scores).is_ok());
        assert_eq!(scores, [1.0, 0.0, 0.3]);
    }

    #[rstest]
    #[case(ScorePolicy::Reject)]
    #[case(ScorePolicy::Clamp)]
    fn nan_is_rejected(#[case] policy: ScorePolicy) {
        let mut scores = [0.1, f32::NAN];
        assert!(matches!(
            policy.sanitise(&mut scores),
            Err(GroupingError::InvalidScore { view: 1, .. })
        ));
    }

    #[rstest]
    fn policy_serialises_snake_case() {
        #[expect(clippy::expect_used, reason = "test should fail loudly")]
        let json = serde_json::to_string(&ScorePolicy::Clamp).expect("serialise policy");
        assert_eq!(json, r#""clamp""#);
    }

    #[rstest]
    #[case("reject", Ok(ScorePolicy::Reject))]
    #[case("Clamp", Ok(ScorePolicy::Clamp))]
    #[case("wrap", Err(UnknownScorePolicy("wrap".into())))]
    fn policy_parses_from_name(
        #[case] name: &str,
        #[case] expected: Result<ScorePolicy, UnknownScorePolicy>,
    ) {
        assert_eq!(name.parse::<ScorePolicy>(), expected);
    }
}
