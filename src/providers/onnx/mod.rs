//! ONNX-backed view extractor with artefact verification.
mod artefact;
mod config;
mod errors;
mod extractor;

pub use artefact::{ModelArtefact, sha256_hex};
pub use config::OnnxExtractorConfig;
pub use errors::OnnxExtractorError;

use ndarray::ArrayView3;

use crate::api::ViewFeatures;
use crate::providers::ViewExtractor;
use extractor::OnnxBackbone;

/// View extractor running a convolutional backbone exported to ONNX.
///
/// The graph takes one `[1, H, W, C]` view and exposes two outputs: the view
/// descriptor (batch axis dropped) and the raw discrimination logit.
#[derive(Debug)]
pub struct OnnxViewExtractor {
    inner: OnnxBackbone,
}

impl OnnxViewExtractor {
    /// Verifies the model checksum and opens an ONNX session.
    ///
    /// # Errors
    ///
    /// Returns [`OnnxExtractorError`] when the configuration is invalid, the
    /// checksum does not match, or ONNX initialisation fails.
    ///
    /// # Examples
    /// ```no_run
    /// use gvcnn::providers::onnx::{ModelArtefact, OnnxExtractorConfig, OnnxExtractorError, OnnxViewExtractor};
    /// use gvcnn::providers::ViewExtractor;
    /// use ndarray::Array3;
    ///
    /// # fn main() -> Result<(), OnnxExtractorError> {
    /// let config = OnnxExtractorConfig {
    ///     model: ModelArtefact {
    ///         path: std::path::PathBuf::from("/models/resnet_v2_50_views.onnx"),
    ///         sha256: "0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef".into(),
    ///     },
    ///     input_name: "views".into(),
    ///     descriptor_output: "block4".into(),
    ///     logit_output: "discrimination_logit".into(),
    ///     view_shape: [299, 299, 3],
    /// };
    /// let extractor = OnnxViewExtractor::new(config)?;
    /// let view = Array3::<f32>::zeros((299, 299, 3));
    /// let features = extractor.extract(view.view())?;
    /// # println!("{}", features.logit);
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(config: OnnxExtractorConfig) -> Result<Self, OnnxExtractorError> {
        OnnxBackbone::new(config).map(|inner| Self { inner })
    }
}

impl ViewExtractor for OnnxViewExtractor {
    type Error = OnnxExtractorError;

    fn extract(&self, view: ArrayView3<'_, f32>) -> Result<ViewFeatures, Self::Error> {
        self.inner.run(view)
    }
}
