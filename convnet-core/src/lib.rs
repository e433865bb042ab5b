//! # convnet-core
//!
//! Small convolutional network classifiers assembled by hand from
//! forward/backward layer primitives.
//!
//! - [`tensor`]: dense row-major `Tensor<T>` used by every kernel.
//! - [`nn`]: layer primitives (affine, ReLU, convolution, max-pooling), the
//!   softmax loss and the sandwich layers that chain them.
//! - [`classifiers`]: `ThreeLayerConvNet` and `NewConvNet`, each exposing the
//!   dual-mode `loss` surface through the [`Classifier`] trait.
//! - [`grad_check`]: finite-difference gradient checking.

pub mod classifiers;
pub mod error;
pub mod grad_check;
pub mod nn;
pub mod ops;
pub mod tensor;
pub mod types;
pub mod utils;

pub use classifiers::{
    Classifier, LossOutput, NewConvNet, NewConvNetConfig, ThreeLayerConvNet,
    ThreeLayerConvNetConfig,
};
pub use error::ConvNetError;
pub use ops::traits::ConvNumeric;
pub use tensor::Tensor;
pub use types::DType;
