//! Numeric traits shared by the tensor and layer kernels.

pub mod traits;
