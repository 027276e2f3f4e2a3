use std::path::PathBuf;

use thiserror::Error;

/// Errors produced by [`super::OnnxViewExtractor`].
#[derive(Debug, Error)]
pub enum OnnxExtractorError {
    #[error("failed to read model at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("model at {path} expected SHA-256 {expected} but found {actual}")]
    ChecksumMismatch {
        path: PathBuf,
        expected: String,
        actual: String,
    },
    #[error("failed to construct ONNX session builder: {0}")]
    CreateSessionBuilder(#[source] ort::Error),
    #[error("failed to create ONNX session: {0}")]
    CreateSession(#[source] ort::Error),
    #[error("extractor requires non-empty {0} name")]
    MissingName(&'static str),
    #[error("extractor requires a non-zero view shape but got {0:?}")]
    EmptyViewShape([usize; 3]),
    #[error("view has shape {actual:?} but the model expects {expected:?}")]
    ViewShape {
        expected: [usize; 3],
        actual: Vec<usize>,
    },
    #[error("failed to convert view into tensor: {0}")]
    EncodeTensor(#[source] ort::Error),
    #[error("session mutex was poisoned by a previous panic")]
    SessionPoisoned,
    #[error("failed to run inference: {0}")]
    Inference(#[source] ort::Error),
    #[error("ONNX output \"{name}\" missing from session results")]
    OutputMissing { name: String },
    #[error("ONNX output \"{name}\" has invalid shape {shape:?}")]
    OutputShape { name: String, shape: Vec<i64> },
    #[error("ONNX output \"{name}\" is empty")]
    EmptyOutput { name: String },
}
