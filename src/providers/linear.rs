//! Global-average-pool plus dense projection classifier head.

use ndarray::{Array1, Array2, ArrayViewD, Axis, ShapeError};
use thiserror::Error;

use super::ClassifierHead;

/// Errors returned by [`LinearHead`].
#[derive(Debug, Error, PartialEq)]
pub enum LinearHeadError {
    #[error("linear head requires at least one class and one channel")]
    EmptyWeights,
    #[error("bias has {actual} entries but the head has {expected} classes")]
    BiasLength { expected: usize, actual: usize },
    #[error("descriptor must have a channel axis")]
    ScalarDescriptor,
    #[error("descriptor has {actual} channels but the head expects {expected}")]
    ChannelMismatch { expected: usize, actual: usize },
    #[error("descriptor has no spatial positions to pool")]
    EmptyDescriptor,
    #[error("failed to flatten descriptor: {0}")]
    Reshape(#[from] ShapeError),
}

/// Classifier head that averages every axis but the last (channels) and
/// applies `weights · pooled + bias`.
///
/// # Examples
///
/// ```
/// use gvcnn::providers::{ClassifierHead, LinearHead};
/// use ndarray::{arr1, arr2, Array3};
///
/// let head = LinearHead::new(arr2(&[[1.0, 0.0], [0.0, 1.0]]), arr1(&[0.0, 0.5])).unwrap();
/// let descriptor = Array3::<f32>::ones((2, 2, 2)).into_dyn();
/// let logits = head.classify(descriptor.view()).unwrap();
/// assert_eq!(logits, vec![1.0, 1.5]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct LinearHead {
    weights: Array2<f32>,
    bias: Array1<f32>,
}

impl LinearHead {
    /// Build a head from `[num_classes, channels]` weights and a
    /// `[num_classes]` bias.
    ///
    /// # Errors
    ///
    /// Returns [`LinearHeadError::EmptyWeights`] for a zero-sized weight matrix
    /// and [`LinearHeadError::BiasLength`] when the bias length differs from the
    /// class count.
    pub fn new(weights: Array2<f32>, bias: Array1<f32>) -> Result<Self, LinearHeadError> {
        if weights.is_empty() {
            return Err(LinearHeadError::EmptyWeights);
        }
        if bias.len() != weights.nrows() {
            return Err(LinearHeadError::BiasLength {
                expected: weights.nrows(),
                actual: bias.len(),
            });
        }
        Ok(Self { weights, bias })
    }

    #[must_use]
    pub fn num_classes(&self) -> usize {
        self.weights.nrows()
    }

    #[must_use]
    pub fn channels(&self) -> usize {
        self.weights.ncols()
    }

    /// Average `descriptor` over every axis except the last.
    ///
    /// # Errors
    ///
    /// Returns an error for scalar or empty descriptors and for a channel count
    /// that differs from the head's.
    pub fn pool(&self, descriptor: ArrayViewD<'_, f32>) -> Result<Array1<f32>, LinearHeadError> {
        let channels = *descriptor
            .shape()
            .last()
            .ok_or(LinearHeadError::ScalarDescriptor)?;
        if channels != self.channels() {
            return Err(LinearHeadError::ChannelMismatch {
                expected: self.channels(),
                actual: channels,
            });
        }
        let positions = descriptor.len() / channels;
        descriptor
            .to_shape((positions, channels))?
            .mean_axis(Axis(0))
            .ok_or(LinearHeadError::EmptyDescriptor)
    }
}

impl ClassifierHead for LinearHead {
    type Error = LinearHeadError;

    fn classify(&self, descriptor: ArrayViewD<'_, f32>) -> Result<Vec<f32>, Self::Error> {
        let pooled = self.pool(descriptor)?;
        let logits = self.weights.dot(&pooled) + &self.bias;
        Ok(logits.to_vec())
    }
}
