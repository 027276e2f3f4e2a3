//! CLI argument types and layered configuration for the `gvcnn` binary.
//! Values come from CLI flags, environment variables (prefix `GVCNN_`) and
//! an optional TOML file.

use figment::{
    Figment,
    providers::{Env, Format, Toml},
};
use ortho_config::OrthoError;
use serde::Deserialize;
use std::path::PathBuf;

use crate::config::{ConfigError, DEFAULT_NUM_GROUPS, DEFAULT_NUM_VIEWS, GroupingConfig};
use crate::score::ScorePolicy;

/// Command-line arguments for the `gvcnn` binary.
///
/// # Examples
///
/// Parse flags directly:
/// ```
/// use gvcnn::cli::GvcnnArgs;
/// use ortho_config::OrthoConfig;
///
/// let args = GvcnnArgs::load_from_iter(["gvcnn", "--num-groups", "3", "--num-views", "12"])
///     .expect("load args from CLI iterator");
/// assert_eq!(args.num_groups, 3);
/// assert_eq!(args.grouping_config().expect("valid").num_views, 12);
/// ```
///
/// Load from a configuration file:
/// ```
/// use gvcnn::cli::GvcnnArgs;
/// use ortho_config::OrthoConfig;
/// use std::io::Write;
/// use tempfile::NamedTempFile;
///
/// let mut file = NamedTempFile::new().expect("create temp file");
/// writeln!(file, "score_policy = \"clamp\"").expect("write config");
/// let path = file.path().to_str().expect("path str");
/// let args = GvcnnArgs::load_from_iter(["gvcnn", "--config-path", path])
///     .expect("load args from config path");
/// assert_eq!(args.score_policy, Some(gvcnn::ScorePolicy::Clamp));
/// ```
#[derive(Debug, Deserialize, ortho_config::OrthoConfig)]
#[ortho_config(prefix = "GVCNN")]
pub struct GvcnnArgs {
    /// Number of discrimination groups.
    #[ortho_config(default = 5)]
    #[serde(default = "default_num_groups")]
    pub num_groups: usize,

    /// Views rendered per shape.
    #[ortho_config(default = 8)]
    #[serde(default = "default_num_views")]
    pub num_views: usize,

    /// Treatment of out-of-range scores, `reject` or `clamp`. Left unset on the
    /// command line so file and environment values still apply.
    #[serde(default)]
    pub score_policy: Option<ScorePolicy>,

    /// JSON file holding one `ViewRecord` per view.
    #[serde(default)]
    pub features_path: Option<PathBuf>,

    /// Optional path to a configuration file.
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

fn default_num_groups() -> usize {
    DEFAULT_NUM_GROUPS
}

fn default_num_views() -> usize {
    DEFAULT_NUM_VIEWS
}

impl GvcnnArgs {
    /// Load configuration solely from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an [`OrthoError`] if any variable cannot be parsed.
    pub fn load_from_env() -> Result<Self, OrthoError> {
        Figment::new()
            .merge(Env::prefixed("GVCNN_"))
            .extract()
            .map_err(Into::into)
    }

    /// Load configuration from a file path.
    ///
    /// # Errors
    ///
    /// Returns an [`OrthoError`] if the file cannot be read or parsed.
    pub fn load_from_config(path: &str) -> Result<Self, OrthoError> {
        Figment::new()
            .merge(Toml::file(path))
            .extract()
            .map_err(Into::into)
    }

    /// Load configuration from a file path, overridden by the environment.
    ///
    /// # Errors
    ///
    /// Returns an [`OrthoError`] if either source contains invalid values.
    pub fn load_from_env_and_config(path: &str) -> Result<Self, OrthoError> {
        Figment::new()
            .merge(Toml::file(path))
            .merge(Env::prefixed("GVCNN_"))
            .extract()
            .map_err(Into::into)
    }

    /// Grouping configuration described by these arguments.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the group or view count is zero.
    pub fn grouping_config(&self) -> Result<GroupingConfig, ConfigError> {
        GroupingConfig {
            num_groups: self.num_groups,
            num_views: self.num_views,
            score_policy: self.score_policy.unwrap_or_default(),
        }
        .validate()
    }
}
