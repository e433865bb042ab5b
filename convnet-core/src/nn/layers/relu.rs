use crate::error::ConvNetError;
use crate::ops::traits::ConvNumeric;
use crate::tensor::Tensor;

/// Values saved by [`relu_forward`] for [`relu_backward`].
#[derive(Debug, Clone)]
pub struct ReluCache<T> {
    x: Tensor<T>,
}

/// Applies `max(0, x)` element-wise.
pub fn relu_forward<T: ConvNumeric>(x: &Tensor<T>) -> (Tensor<T>, ReluCache<T>) {
    let out = x.map(|v| if v > T::zero() { v } else { T::zero() });
    (out, ReluCache { x: x.clone() })
}

/// Backward pass for [`relu_forward`]: passes `dout` where the input was
/// positive and zero elsewhere.
pub fn relu_backward<T: ConvNumeric>(
    dout: &Tensor<T>,
    cache: ReluCache<T>,
) -> Result<Tensor<T>, ConvNetError> {
    let ReluCache { x } = cache;
    dout.expect_shape(x.shape(), "relu_backward")?;
    let data = x
        .data()
        .iter()
        .zip(dout.data())
        .map(|(&v, &g)| if v > T::zero() { g } else { T::zero() })
        .collect();
    Tensor::new(data, x.shape().to_vec())
}
