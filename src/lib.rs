//! Group-view convolutional networks for multi-view 3D shape recognition.
//!
//! Views of a shape are scored for how discriminative they are, bucketed into
//! groups by score, pooled within each group and fused into a single shape
//! descriptor weighted by group quality.
//!
//! # Examples
//!
//! ```
//! use gvcnn::{GroupingConfig, ViewFeatures, group_and_fuse};
//! use ndarray::arr1;
//!
//! let config = GroupingConfig { num_views: 3, ..GroupingConfig::default() };
//! let features: Vec<ViewFeatures> = [0.05_f32, 3.0, 12.0]
//!     .into_iter()
//!     .map(|logit| ViewFeatures::new(arr1(&[logit]).into_dyn(), logit))
//!     .collect();
//! let grouped = group_and_fuse(&features, &config).expect("grouping succeeds");
//! assert_eq!(grouped.scheme.num_groups(), 5);
//! assert_eq!(grouped.trace().assignment.len(), 3);
//! ```

pub mod api;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod evaluation;
pub mod grouping;
pub mod pipeline;
pub mod providers;
pub mod score;

pub use api::{GroupingTrace, Recognition, ShapeRecognizer, ViewFeatures, ViewRecord};
#[cfg(feature = "cli")]
pub use cli::GvcnnArgs;
pub use config::{ConfigError, GroupingConfig, ModelConfig};
pub use evaluation::{ConfusionMatrix, EvaluationReport, LabelledViews, evaluate};
pub use grouping::{GroupScheme, GroupWeights, GroupingError};
pub use pipeline::{GroupedShape, Gvcnn, PipelineError, PipelineStage, StageError, group_and_fuse};
pub use providers::{ClassifierHead, LinearHead, ViewExtractor};
pub use score::{ScorePolicy, discrimination_score};

pub mod tests;
