//! Grouping and model configuration types and serialisation.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::score::ScorePolicy;

/// Default number of discrimination groups.
pub const DEFAULT_NUM_GROUPS: usize = 5;

/// Default number of rendered views per shape.
pub const DEFAULT_NUM_VIEWS: usize = 8;

/// Class names of the ModelNet10 benchmark, used when no labels are given.
pub const MODELNET10_LABELS: [&str; 10] = [
    "bathtub",
    "bed",
    "chair",
    "desk",
    "dresser",
    "monitor",
    "night_stand",
    "sofa",
    "table",
    "toilet",
];

/// Errors returned when a configuration fails validation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("num_groups must be greater than 0")]
    ZeroGroups,
    #[error("num_views must be greater than 0")]
    ZeroViews,
    #[error("at least one class label is required")]
    NoLabels,
    #[error("class label \"{0}\" appears more than once")]
    DuplicateLabel(String),
}

/// Configuration for the grouping module.
///
/// Buckets always partition `[0, 1]` into `num_groups` equal-width intervals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GroupingConfig {
    /// Number of discrimination buckets; must be greater than zero.
    #[serde(default = "default_num_groups")]
    pub num_groups: usize,
    /// Views per shape; every forward pass must supply exactly this many.
    #[serde(default = "default_num_views")]
    pub num_views: usize,
    /// Treatment of scores outside `[0, 1]`.
    #[serde(default)]
    pub score_policy: ScorePolicy,
}

impl Default for GroupingConfig {
    fn default() -> Self {
        Self {
            num_groups: DEFAULT_NUM_GROUPS,
            num_views: DEFAULT_NUM_VIEWS,
            score_policy: ScorePolicy::default(),
        }
    }
}

impl GroupingConfig {
    /// Ensure the configuration values are within acceptable bounds.
    ///
    /// # Errors
    ///
    /// Returns an error if `num_groups` or `num_views` is zero.
    #[must_use = "Validation should not be ignored"]
    pub fn validate(self) -> Result<Self, ConfigError> {
        if self.num_groups == 0 {
            Err(ConfigError::ZeroGroups)
        } else if self.num_views == 0 {
            Err(ConfigError::ZeroViews)
        } else {
            Ok(self)
        }
    }
}

/// Full model configuration: grouping plus the classifier's label set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModelConfig {
    #[serde(default)]
    pub grouping: GroupingConfig,
    /// Class names indexed by classifier output position.
    #[serde(default = "default_labels")]
    pub labels: Vec<String>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            grouping: GroupingConfig::default(),
            labels: default_labels(),
        }
    }
}

impl ModelConfig {
    /// Validate the grouping section and the label set.
    ///
    /// # Errors
    ///
    /// Returns an error for invalid grouping values, an empty label list or a
    /// repeated label.
    #[must_use = "Validation should not be ignored"]
    pub fn validate(self) -> Result<Self, ConfigError> {
        let grouping = self.grouping.validate()?;
        if self.labels.is_empty() {
            return Err(ConfigError::NoLabels);
        }
        for (index, label) in self.labels.iter().enumerate() {
            if self.labels.iter().skip(index + 1).any(|other| other == label) {
                return Err(ConfigError::DuplicateLabel(label.clone()));
            }
        }
        Ok(Self {
            grouping,
            labels: self.labels,
        })
    }

    #[must_use]
    pub fn num_classes(&self) -> usize {
        self.labels.len()
    }

    /// Label for a class index, if one exists.
    #[must_use]
    pub fn label(&self, class_index: usize) -> Option<&str> {
        self.labels.get(class_index).map(String::as_str)
    }
}

const fn default_num_groups() -> usize {
    DEFAULT_NUM_GROUPS
}

const fn default_num_views() -> usize {
    DEFAULT_NUM_VIEWS
}

fn default_labels() -> Vec<String> {
    MODELNET10_LABELS.iter().map(|label| (*label).to_owned()).collect()
}
