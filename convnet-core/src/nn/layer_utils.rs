//! Sandwich layers: common sequences of primitives fused behind a single
//! forward/backward pair.

use crate::error::ConvNetError;
use crate::nn::layers::{
    affine_backward, affine_forward, conv_backward, conv_forward, max_pool_backward,
    max_pool_forward, relu_backward, relu_forward, AffineCache, ConvCache, PoolCache, ReluCache,
};
use crate::nn::param::{ConvParam, PoolParam};
use crate::ops::traits::ConvNumeric;
use crate::tensor::Tensor;

#[derive(Debug, Clone)]
pub struct AffineReluCache<T> {
    fc: AffineCache<T>,
    relu: ReluCache<T>,
}

/// Affine transform followed by a ReLU.
pub fn affine_relu_forward<T: ConvNumeric>(
    x: &Tensor<T>,
    w: &Tensor<T>,
    b: &Tensor<T>,
) -> Result<(Tensor<T>, AffineReluCache<T>), ConvNetError> {
    let (a, fc) = affine_forward(x, w, b)?;
    let (out, relu) = relu_forward(&a);
    Ok((out, AffineReluCache { fc, relu }))
}

/// Backward pass for [`affine_relu_forward`], returning `(dx, dw, db)`.
pub fn affine_relu_backward<T: ConvNumeric>(
    dout: &Tensor<T>,
    cache: AffineReluCache<T>,
) -> Result<(Tensor<T>, Tensor<T>, Tensor<T>), ConvNetError> {
    let da = relu_backward(dout, cache.relu)?;
    affine_backward(&da, cache.fc)
}

#[derive(Debug, Clone)]
pub struct ConvReluCache<T> {
    conv: ConvCache<T>,
    relu: ReluCache<T>,
}

/// Convolution followed by a ReLU.
pub fn conv_relu_forward<T: ConvNumeric>(
    x: &Tensor<T>,
    w: &Tensor<T>,
    b: &Tensor<T>,
    conv_param: ConvParam,
) -> Result<(Tensor<T>, ConvReluCache<T>), ConvNetError> {
    let (a, conv) = conv_forward(x, w, b, conv_param)?;
    let (out, relu) = relu_forward(&a);
    Ok((out, ConvReluCache { conv, relu }))
}

/// Backward pass for [`conv_relu_forward`], returning `(dx, dw, db)`.
pub fn conv_relu_backward<T: ConvNumeric>(
    dout: &Tensor<T>,
    cache: ConvReluCache<T>,
) -> Result<(Tensor<T>, Tensor<T>, Tensor<T>), ConvNetError> {
    let da = relu_backward(dout, cache.relu)?;
    conv_backward(&da, cache.conv)
}

#[derive(Debug, Clone)]
pub struct ConvReluPoolCache<T> {
    conv: ConvCache<T>,
    relu: ReluCache<T>,
    pool: PoolCache,
}

/// Convolution, ReLU, then max-pooling.
pub fn conv_relu_pool_forward<T: ConvNumeric>(
    x: &Tensor<T>,
    w: &Tensor<T>,
    b: &Tensor<T>,
    conv_param: ConvParam,
    pool_param: PoolParam,
) -> Result<(Tensor<T>, ConvReluPoolCache<T>), ConvNetError> {
    let (a, conv) = conv_forward(x, w, b, conv_param)?;
    let (s, relu) = relu_forward(&a);
    let (out, pool) = max_pool_forward(&s, pool_param)?;
    Ok((out, ConvReluPoolCache { conv, relu, pool }))
}

/// Backward pass for [`conv_relu_pool_forward`], returning `(dx, dw, db)`.
pub fn conv_relu_pool_backward<T: ConvNumeric>(
    dout: &Tensor<T>,
    cache: ConvReluPoolCache<T>,
) -> Result<(Tensor<T>, Tensor<T>, Tensor<T>), ConvNetError> {
    let ds = max_pool_backward(dout, cache.pool)?;
    let da = relu_backward(&ds, cache.relu)?;
    conv_backward(&da, cache.conv)
}

#[cfg(test)]
#[path = "layer_utils_test.rs"]
mod tests;
