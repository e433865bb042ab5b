use crate::types::DType;
use num_traits::{Float, NumAssignOps, NumOps};
use std::fmt::Debug;
use std::iter::Sum;

/// A trait representing the floating-point element types usable by the
/// tensor, the layer kernels and the classifiers.
///
/// Implemented for `f32` and `f64`.
pub trait ConvNumeric:
    Float // Includes Num + Copy + Bounded + Signed + etc.
    + NumAssignOps
    + NumOps
    + Sum
    + Debug
    + Default
    + Send
    + Sync
    + 'static
{
    /// Runtime tag for this element type.
    const DTYPE: DType;

    /// Converts from `f64`, rounding to the nearest representable value.
    fn from_f64(value: f64) -> Self;

    /// Widens (or copies) the value to `f64`.
    fn as_f64(self) -> f64;

    /// Converts a count, e.g. a batch size, to this element type.
    fn from_usize(value: usize) -> Self {
        Self::from_f64(value as f64)
    }
}

impl ConvNumeric for f32 {
    const DTYPE: DType = DType::F32;

    fn from_f64(value: f64) -> Self {
        value as f32
    }

    fn as_f64(self) -> f64 {
        self as f64
    }
}

impl ConvNumeric for f64 {
    const DTYPE: DType = DType::F64;

    fn from_f64(value: f64) -> Self {
        value
    }

    fn as_f64(self) -> f64 {
        self
    }
}
