// src/nn/mod.rs
// Layer primitives, losses and the sandwich layers that chain them.

pub mod init;
pub mod layer_utils;
pub mod layers;
pub mod losses;
pub mod param;
pub mod parameters;

// Re-export common items
pub use layer_utils::{
    affine_relu_backward, affine_relu_forward, conv_relu_backward, conv_relu_forward,
    conv_relu_pool_backward, conv_relu_pool_forward,
};
pub use layers::{
    affine_backward, affine_forward, conv_backward, conv_forward, max_pool_backward,
    max_pool_forward, relu_backward, relu_forward,
};
pub use losses::softmax_loss;
pub use param::{ConvParam, PoolParam};
pub use parameters::NamedParameters;
