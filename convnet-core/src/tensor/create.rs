use super::Tensor;
use crate::error::ConvNetError;
use crate::ops::traits::ConvNumeric;
use rand::Rng;
use rand_distr::{Distribution, StandardNormal};

/// Creates a tensor filled with zeros.
pub fn zeros<T: ConvNumeric>(shape: &[usize]) -> Result<Tensor<T>, ConvNetError> {
    full(shape, T::zero())
}

/// Creates a tensor filled with `value`.
pub fn full<T: ConvNumeric>(shape: &[usize], value: T) -> Result<Tensor<T>, ConvNetError> {
    let numel = shape.iter().product();
    Tensor::new(vec![value; numel], shape.to_vec())
}

/// Creates a zero tensor with the same shape as `tensor`.
pub fn zeros_like<T: ConvNumeric>(tensor: &Tensor<T>) -> Result<Tensor<T>, ConvNetError> {
    zeros(tensor.shape())
}

/// Creates a tensor whose entries are drawn independently from a zero-mean
/// Gaussian with standard deviation `std`.
///
/// Samples are drawn in `f64` and cast to `T`. The random source is passed
/// explicitly so that initialization is reproducible under a fixed seed.
pub fn randn<T, R>(shape: &[usize], std: f64, rng: &mut R) -> Result<Tensor<T>, ConvNetError>
where
    T: ConvNumeric,
    R: Rng + ?Sized,
{
    let numel = shape.iter().product();
    let data_vec: Vec<T> = (0..numel)
        .map(|_| {
            let z: f64 = StandardNormal.sample(&mut *rng);
            T::from_f64(std * z)
        })
        .collect();
    Tensor::new(data_vec, shape.to_vec())
}

#[cfg(test)]
#[path = "create_test.rs"]
mod tests;
