//! Provider interfaces for the collaborators around the grouping core.
//!
//! A [`ViewExtractor`] turns one rendered view into a descriptor and a raw
//! logit; a [`ClassifierHead`] maps the fused shape descriptor to class
//! logits. Backbones live behind these traits so the core stays a pure
//! function of their outputs.

mod linear;
#[cfg(feature = "onnx")]
pub mod onnx;

pub use linear::{LinearHead, LinearHeadError};

use ndarray::{ArrayView3, ArrayViewD};

use crate::api::ViewFeatures;

/// Extracts per-view features from a single `[H, W, C]` view.
///
/// Views are extracted in parallel, so implementations must be `Sync`.
pub trait ViewExtractor {
    /// Error type returned when extraction fails.
    ///
    /// Errors must be `Send + Sync + 'static` so they can cross the worker
    /// threads that run extraction.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Extract the descriptor and raw logit for one view.
    ///
    /// # Errors
    ///
    /// Returns an error if extraction fails.
    fn extract(&self, view: ArrayView3<'_, f32>) -> Result<ViewFeatures, Self::Error>;
}

/// Maps a shape descriptor to class logits.
pub trait ClassifierHead {
    /// Error type returned when classification fails.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Produce one logit per class.
    ///
    /// # Errors
    ///
    /// Returns an error if the descriptor cannot be classified.
    fn classify(&self, descriptor: ArrayViewD<'_, f32>) -> Result<Vec<f32>, Self::Error>;
}
