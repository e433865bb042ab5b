use thiserror::Error;

/// Error type for tensor construction, layer kernels and classifiers.
#[derive(Error, Debug, PartialEq, Clone)]
pub enum ConvNetError {
    #[error("Shape mismatch: expected {expected:?}, got {actual:?} during operation {operation}")]
    ShapeMismatch {
        expected: Vec<usize>,
        actual: Vec<usize>,
        operation: String,
    },

    #[error("Rank mismatch in {operation}: expected rank {expected}, got {actual}")]
    RankMismatch {
        expected: usize,
        actual: usize,
        operation: String,
    },

    #[error("Tensor creation error: data length {data_len} does not match shape {shape:?}")]
    TensorCreationError { data_len: usize, shape: Vec<usize> },

    #[error("Input has {actual} channels but the network was configured for {expected}")]
    ChannelMismatch { expected: usize, actual: usize },

    #[error("Batch size mismatch: {inputs} inputs but {labels} labels")]
    BatchSizeMismatch { inputs: usize, labels: usize },

    #[error("Cannot evaluate an empty batch")]
    EmptyBatch,

    #[error("Label {label} at index {index} is out of range for {num_classes} classes")]
    LabelOutOfRange {
        index: usize,
        label: usize,
        num_classes: usize,
    },

    #[error("Zero-sized dimension in {operation}: shape {shape:?}")]
    ZeroSizedDimension { shape: Vec<usize>, operation: String },

    #[error("Invalid convolution geometry: {0}")]
    ConvGeometry(String),

    #[error("Invalid pooling geometry: {0}")]
    PoolGeometry(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
