// src/nn/layers/mod.rs
// Forward/backward primitives. Every forward returns `(out, cache)`; the
// matching backward consumes the cache.

pub mod affine;
pub mod conv;
pub mod pool;
pub mod relu;

// Re-export key layer functions
pub use affine::{affine_backward, affine_forward, AffineCache};
pub use conv::{conv_backward, conv_forward, ConvCache};
pub use pool::{max_pool_backward, max_pool_forward, PoolCache};
pub use relu::{relu_backward, relu_forward, ReluCache};
