// src/tensor/mod.rs

use crate::error::ConvNetError;
use crate::ops::traits::ConvNumeric;
use crate::types::DType;

pub mod create;
mod debug;
mod linalg;

pub use create::{full, randn, zeros, zeros_like};

/// A dense, contiguous, row-major multi-dimensional array.
///
/// The tensor owns its buffer; cloning copies the data. Layer caches hold
/// clones so every forward call gets an independent cache set.
#[derive(Clone, PartialEq)]
pub struct Tensor<T> {
    data: Vec<T>,
    shape: Vec<usize>,
}

impl<T: ConvNumeric> Tensor<T> {
    /// Creates a new tensor from row-major data and a shape.
    ///
    /// Fails with `TensorCreationError` if `data.len()` is not the product of
    /// `shape`.
    pub fn new(data: Vec<T>, shape: Vec<usize>) -> Result<Self, ConvNetError> {
        let numel: usize = shape.iter().product();
        if data.len() != numel {
            return Err(ConvNetError::TensorCreationError {
                data_len: data.len(),
                shape,
            });
        }
        Ok(Tensor { data, shape })
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn numel(&self) -> usize {
        self.data.len()
    }

    pub fn rank(&self) -> usize {
        self.shape.len()
    }

    pub fn dtype(&self) -> DType {
        T::DTYPE
    }

    /// Contiguous strides for the current shape, in elements.
    pub fn strides(&self) -> Vec<usize> {
        let mut strides = vec![1; self.shape.len()];
        for i in (0..self.shape.len().saturating_sub(1)).rev() {
            strides[i] = strides[i + 1] * self.shape[i + 1];
        }
        strides
    }

    pub fn data(&self) -> &[T] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [T] {
        &mut self.data
    }

    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    /// Returns the element at a multi-dimensional index, or `None` if the
    /// index has the wrong rank or is out of bounds.
    pub fn get(&self, index: &[usize]) -> Option<T> {
        if index.len() != self.shape.len() {
            return None;
        }
        let mut offset = 0;
        for ((&i, &dim), stride) in index.iter().zip(&self.shape).zip(self.strides()) {
            if i >= dim {
                return None;
            }
            offset += i * stride;
        }
        self.data.get(offset).copied()
    }

    /// Returns a copy of the tensor with a new shape holding the same number
    /// of elements.
    pub fn reshape(&self, shape: Vec<usize>) -> Result<Self, ConvNetError> {
        self.clone().into_reshape(shape)
    }

    /// Reinterprets the buffer with a new shape without copying.
    pub fn into_reshape(self, shape: Vec<usize>) -> Result<Self, ConvNetError> {
        let numel: usize = shape.iter().product();
        if numel != self.data.len() {
            return Err(ConvNetError::ShapeMismatch {
                expected: self.shape,
                actual: shape,
                operation: "reshape".to_string(),
            });
        }
        Ok(Tensor {
            data: self.data,
            shape,
        })
    }

    /// Applies `f` element-wise, producing a tensor of the same shape.
    pub fn map<F>(&self, f: F) -> Self
    where
        F: Fn(T) -> T,
    {
        Tensor {
            data: self.data.iter().map(|&x| f(x)).collect(),
            shape: self.shape.clone(),
        }
    }

    pub fn sum(&self) -> T {
        self.data.iter().copied().sum()
    }

    /// Sum of squared elements, i.e. the squared Frobenius norm.
    pub fn sum_squares(&self) -> T {
        self.data.iter().map(|&x| x * x).sum()
    }

    /// Largest absolute value, zero for an empty tensor.
    pub fn max_abs(&self) -> T {
        self.data
            .iter()
            .fold(T::zero(), |acc, &x| if x.abs() > acc { x.abs() } else { acc })
    }

    /// In-place `self += alpha * other`.
    pub fn add_scaled_(&mut self, other: &Tensor<T>, alpha: T) -> Result<(), ConvNetError> {
        if self.shape != other.shape {
            return Err(ConvNetError::ShapeMismatch {
                expected: self.shape.clone(),
                actual: other.shape.clone(),
                operation: "add_scaled_".to_string(),
            });
        }
        for (a, &b) in self.data.iter_mut().zip(&other.data) {
            *a += alpha * b;
        }
        Ok(())
    }

    pub(crate) fn expect_rank(&self, rank: usize, operation: &str) -> Result<(), ConvNetError> {
        if self.rank() != rank {
            return Err(ConvNetError::RankMismatch {
                expected: rank,
                actual: self.rank(),
                operation: operation.to_string(),
            });
        }
        Ok(())
    }

    pub(crate) fn expect_shape(&self, shape: &[usize], operation: &str) -> Result<(), ConvNetError> {
        if self.shape != shape {
            return Err(ConvNetError::ShapeMismatch {
                expected: shape.to_vec(),
                actual: self.shape.clone(),
                operation: operation.to_string(),
            });
        }
        Ok(())
    }
}
