//! Configuration for ONNX-backed view extractors.

use super::{artefact::ModelArtefact, errors::OnnxExtractorError};

/// Configuration for an [`super::OnnxViewExtractor`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OnnxExtractorConfig {
    /// Backbone graph to load.
    pub model: ModelArtefact,
    /// Name of the `[1, H, W, C]` image input.
    pub input_name: String,
    /// Output holding the per-view feature map, e.g. the last residual block.
    pub descriptor_output: String,
    /// Output holding the raw discrimination logit. When it has more than one
    /// element the mean is used.
    pub logit_output: String,
    /// Expected `[H, W, C]` of every view.
    pub view_shape: [usize; 3],
}

impl OnnxExtractorConfig {
    /// Check names and the view shape before any artefact is touched.
    ///
    /// # Errors
    ///
    /// Returns [`OnnxExtractorError::MissingName`] for a blank input or output
    /// name and [`OnnxExtractorError::EmptyViewShape`] for a zero dimension.
    pub fn validate(&self) -> Result<(), OnnxExtractorError> {
        for (what, name) in [
            ("input", &self.input_name),
            ("descriptor output", &self.descriptor_output),
            ("logit output", &self.logit_output),
        ] {
            if name.trim().is_empty() {
                return Err(OnnxExtractorError::MissingName(what));
            }
        }
        if self.view_shape.contains(&0) {
            return Err(OnnxExtractorError::EmptyViewShape(self.view_shape));
        }
        Ok(())
    }
}
