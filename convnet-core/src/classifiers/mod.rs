//! Fixed-architecture convolutional classifiers.
//!
//! Both networks expose the same dual-mode surface: `loss(x, None)` returns
//! class scores, `loss(x, Some(labels))` returns the regularized loss and a
//! gradient for every parameter.

pub mod new_convnet;
pub mod three_layer;

pub use new_convnet::{NewConvNet, NewConvNetConfig, NewConvParams};
pub use three_layer::{ThreeLayerConvNet, ThreeLayerConvNetConfig, ThreeLayerParams};

use crate::error::ConvNetError;
use crate::nn::parameters::NamedParameters;
use crate::ops::traits::ConvNumeric;
use crate::tensor::Tensor;
use std::fmt::Debug;

/// Result of [`Classifier::loss`].
#[derive(Debug, Clone, PartialEq)]
pub enum LossOutput<T, P> {
    /// Class scores of shape `(N, num_classes)`, returned when no labels are given.
    Scores(Tensor<T>),
    /// Regularized loss and one gradient per parameter.
    LossAndGrads { loss: T, grads: P },
}

impl<T, P> LossOutput<T, P> {
    pub fn into_scores(self) -> Option<Tensor<T>> {
        match self {
            LossOutput::Scores(scores) => Some(scores),
            LossOutput::LossAndGrads { .. } => None,
        }
    }

    pub fn into_loss_and_grads(self) -> Option<(T, P)> {
        match self {
            LossOutput::Scores(_) => None,
            LossOutput::LossAndGrads { loss, grads } => Some((loss, grads)),
        }
    }
}

/// An image classifier with a persistent parameter store.
///
/// Evaluating a classifier never mutates its parameters; only an external
/// optimizer does, through [`params_mut`](Classifier::params_mut).
pub trait Classifier<T: ConvNumeric> {
    /// Typed parameter store. Gradients are returned in the same type.
    type Params: NamedParameters<T> + Clone + Debug;

    fn params(&self) -> &Self::Params;

    fn params_mut(&mut self) -> &mut Self::Params;

    fn num_classes(&self) -> usize;

    /// Class scores of shape `(N, num_classes)` for a batch `x` of shape
    /// `(N, C, H, W)`.
    fn scores(&self, x: &Tensor<T>) -> Result<Tensor<T>, ConvNetError>;

    /// Regularized softmax loss and the gradient of every parameter.
    fn loss_and_grads(
        &self,
        x: &Tensor<T>,
        labels: &[usize],
    ) -> Result<(T, Self::Params), ConvNetError>;

    /// Scores without labels, loss and gradients with labels.
    fn loss(
        &self,
        x: &Tensor<T>,
        labels: Option<&[usize]>,
    ) -> Result<LossOutput<T, Self::Params>, ConvNetError> {
        match labels {
            None => self.scores(x).map(LossOutput::Scores),
            Some(labels) => {
                let (loss, grads) = self.loss_and_grads(x, labels)?;
                Ok(LossOutput::LossAndGrads { loss, grads })
            }
        }
    }

    /// Index of the highest score for each sample.
    fn predict(&self, x: &Tensor<T>) -> Result<Vec<usize>, ConvNetError> {
        let scores = self.scores(x)?;
        let num_classes = self.num_classes();
        Ok(scores
            .data()
            .chunks(num_classes)
            .map(|row| {
                row.iter()
                    .enumerate()
                    .fold((0, T::neg_infinity()), |best, (k, &s)| {
                        if s > best.1 {
                            (k, s)
                        } else {
                            best
                        }
                    })
                    .0
            })
            .collect())
    }

    /// Fraction of samples whose prediction matches its label.
    fn accuracy(&self, x: &Tensor<T>, labels: &[usize]) -> Result<f64, ConvNetError> {
        let predictions = self.predict(x)?;
        if predictions.len() != labels.len() {
            return Err(ConvNetError::BatchSizeMismatch {
                inputs: predictions.len(),
                labels: labels.len(),
            });
        }
        let correct = predictions
            .iter()
            .zip(labels)
            .filter(|(p, l)| p == l)
            .count();
        Ok(correct as f64 / labels.len() as f64)
    }
}

/// Checks that `x` is a non-empty `(N, C, H, W)` batch matching the
/// configured input dimensions and returns `N`.
pub(crate) fn validate_batch<T: ConvNumeric>(
    x: &Tensor<T>,
    input_dim: (usize, usize, usize),
) -> Result<usize, ConvNetError> {
    x.expect_rank(4, "classifier input")?;
    let (c, h, w) = input_dim;
    let shape = x.shape();
    if shape[1] != c {
        return Err(ConvNetError::ChannelMismatch {
            expected: c,
            actual: shape[1],
        });
    }
    if shape[2] != h || shape[3] != w {
        return Err(ConvNetError::ShapeMismatch {
            expected: vec![shape[0], c, h, w],
            actual: shape.to_vec(),
            operation: "classifier input".to_string(),
        });
    }
    if shape[0] == 0 {
        return Err(ConvNetError::EmptyBatch);
    }
    Ok(shape[0])
}

/// Shared checks for the configuration fields both networks have.
pub(crate) fn validate_common_config(
    input_dim: (usize, usize, usize),
    hidden_dim: usize,
    num_classes: usize,
    weight_scale: f64,
    reg: f64,
) -> Result<(), ConvNetError> {
    let (c, h, w) = input_dim;
    if c == 0 || h == 0 || w == 0 {
        return Err(ConvNetError::InvalidConfig(format!(
            "input_dim must be positive, got {:?}",
            input_dim
        )));
    }
    if h % 2 != 0 || w % 2 != 0 {
        return Err(ConvNetError::InvalidConfig(format!(
            "input height and width must be even for 2x2 pooling, got {}x{}",
            h, w
        )));
    }
    if hidden_dim == 0 || num_classes == 0 {
        return Err(ConvNetError::InvalidConfig(
            "hidden_dim and num_classes must be positive".to_string(),
        ));
    }
    if !weight_scale.is_finite() || weight_scale < 0.0 {
        return Err(ConvNetError::InvalidConfig(format!(
            "weight_scale must be finite and non-negative, got {}",
            weight_scale
        )));
    }
    if !reg.is_finite() || reg < 0.0 {
        return Err(ConvNetError::InvalidConfig(format!(
            "reg must be finite and non-negative, got {}",
            reg
        )));
    }
    Ok(())
}

pub(crate) fn validate_filter(num_filters: usize, filter_size: usize, which: &str) -> Result<(), ConvNetError> {
    if num_filters == 0 {
        return Err(ConvNetError::InvalidConfig(format!(
            "{} needs at least one filter",
            which
        )));
    }
    if filter_size % 2 == 0 {
        return Err(ConvNetError::InvalidConfig(format!(
            "{} filter size must be odd to preserve spatial size, got {}",
            which, filter_size
        )));
    }
    Ok(())
}

/// Adds `2 * reg * w` to `dw`, the gradient of `reg * ||w||^2`.
pub(crate) fn add_l2_grad<T: ConvNumeric>(
    dw: &mut Tensor<T>,
    w: &Tensor<T>,
    reg: T,
) -> Result<(), ConvNetError> {
    dw.add_scaled_(w, (T::one() + T::one()) * reg)
}
