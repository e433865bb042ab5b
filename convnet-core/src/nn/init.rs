use crate::error::ConvNetError;
use crate::ops::traits::ConvNumeric;
use crate::tensor::{randn, zeros, Tensor};
use rand::Rng;

/// Fills the input `Tensor` with the scalar value 0.
///
/// Operates in-place.
pub fn zeros_<T: ConvNumeric>(tensor: &mut Tensor<T>) {
    tensor.data_mut().fill(T::zero());
}

/// Fills the input `Tensor` with samples from a zero-mean Gaussian with
/// standard deviation `std`.
///
/// Operates in-place. Samples are drawn in `f64` and cast to the tensor's
/// precision.
pub fn normal_<T, R>(tensor: &mut Tensor<T>, std: f64, rng: &mut R) -> Result<(), ConvNetError>
where
    T: ConvNumeric,
    R: Rng + ?Sized,
{
    let sampled: Tensor<T> = randn(tensor.shape(), std, rng)?;
    tensor.data_mut().copy_from_slice(sampled.data());
    Ok(())
}

/// Allocates a weight tensor of `shape` drawn from `N(0, weight_scale^2)`.
pub fn gaussian_weight<T, R>(
    shape: &[usize],
    weight_scale: f64,
    rng: &mut R,
) -> Result<Tensor<T>, ConvNetError>
where
    T: ConvNumeric,
    R: Rng + ?Sized,
{
    let mut weight = zeros(shape)?;
    normal_(&mut weight, weight_scale, rng)?;
    Ok(weight)
}

/// Allocates a zero bias vector of length `len`.
pub fn zero_bias<T: ConvNumeric>(len: usize) -> Result<Tensor<T>, ConvNetError> {
    zeros(&[len])
}

#[cfg(test)]
#[path = "init_test.rs"]
mod tests;
