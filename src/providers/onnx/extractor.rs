use std::sync::Mutex;

use ndarray::{ArrayD, ArrayView3, IxDyn};
use ort::{session::Session, value::TensorRef};
use tracing::info;

use super::{config::OnnxExtractorConfig, errors::OnnxExtractorError};
use crate::api::ViewFeatures;

/// Runs a backbone graph over one view and reads its descriptor and logit.
#[derive(Debug)]
pub struct OnnxBackbone {
    session: Mutex<Session>,
    input_name: String,
    descriptor_output: String,
    logit_output: String,
    view_shape: [usize; 3],
}

impl OnnxBackbone {
    pub fn new(config: OnnxExtractorConfig) -> Result<Self, OnnxExtractorError> {
        config.validate()?;
        config.model.verify()?;

        let session = Session::builder()
            .map_err(OnnxExtractorError::CreateSessionBuilder)?
            .commit_from_file(&config.model.path)
            .map_err(OnnxExtractorError::CreateSession)?;
        info!(model = %config.model.path.display(), "loaded ONNX backbone");

        Ok(Self {
            session: Mutex::new(session),
            input_name: config.input_name,
            descriptor_output: config.descriptor_output,
            logit_output: config.logit_output,
            view_shape: config.view_shape,
        })
    }

    pub fn run(&self, view: ArrayView3<'_, f32>) -> Result<ViewFeatures, OnnxExtractorError> {
        if view.shape() != self.view_shape {
            return Err(OnnxExtractorError::ViewShape {
                expected: self.view_shape,
                actual: view.shape().to_vec(),
            });
        }
        let [height, width, channels] = self.view_shape;
        let pixels: Vec<f32> = view.iter().copied().collect();
        let input = TensorRef::from_array_view(([1usize, height, width, channels], pixels.as_slice()))
            .map_err(OnnxExtractorError::EncodeTensor)?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| OnnxExtractorError::SessionPoisoned)?;
        let outputs = session
            .run(ort::inputs! { self.input_name.as_str() => input })
            .map_err(OnnxExtractorError::Inference)?;

        let descriptor_value = outputs.get(self.descriptor_output.as_str()).ok_or_else(|| {
            OnnxExtractorError::OutputMissing {
                name: self.descriptor_output.clone(),
            }
        })?;
        let (shape, values) = descriptor_value
            .try_extract_tensor::<f32>()
            .map_err(OnnxExtractorError::Inference)?;
        let descriptor = descriptor_from_batch(&self.descriptor_output, shape, values)?;

        let logit_value = outputs.get(self.logit_output.as_str()).ok_or_else(|| {
            OnnxExtractorError::OutputMissing {
                name: self.logit_output.clone(),
            }
        })?;
        let (_, logits) = logit_value
            .try_extract_tensor::<f32>()
            .map_err(OnnxExtractorError::Inference)?;
        let logit = mean(logits).ok_or_else(|| OnnxExtractorError::EmptyOutput {
            name: self.logit_output.clone(),
        })?;

        Ok(ViewFeatures::new(descriptor, logit))
    }
}

/// Drop the leading batch axis of a `[1, ...]` output.
fn descriptor_from_batch(
    name: &str,
    shape: &[i64],
    values: &[f32],
) -> Result<ArrayD<f32>, OnnxExtractorError> {
    let shape_error = || OnnxExtractorError::OutputShape {
        name: name.to_owned(),
        shape: shape.to_vec(),
    };
    let (&batch, dims) = shape.split_first().ok_or_else(shape_error)?;
    if batch != 1 {
        return Err(shape_error());
    }
    let dims = dims
        .iter()
        .map(|&dim| usize::try_from(dim).map_err(|_| shape_error()))
        .collect::<Result<Vec<_>, _>>()?;
    ArrayD::from_shape_vec(IxDyn(&dims), values.to_vec()).map_err(|_| shape_error())
}

#[expect(clippy::float_arithmetic, reason = "mean of logits")]
#[expect(clippy::cast_precision_loss, reason = "logit tensors are small")]
fn mean(values: &[f32]) -> Option<f32> {
    (!values.is_empty()).then(|| values.iter().sum::<f32>() / values.len() as f32)
}
