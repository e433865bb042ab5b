// src/nn/losses/mod.rs

pub mod softmax;

pub use softmax::softmax_loss;

use crate::error::ConvNetError;

/// Checks that `labels` holds one label per sample, each in `[0, num_classes)`.
pub fn validate_labels(
    labels: &[usize],
    batch_size: usize,
    num_classes: usize,
) -> Result<(), ConvNetError> {
    if labels.len() != batch_size {
        return Err(ConvNetError::BatchSizeMismatch {
            inputs: batch_size,
            labels: labels.len(),
        });
    }
    if let Some((index, &label)) = labels.iter().enumerate().find(|(_, &l)| l >= num_classes) {
        return Err(ConvNetError::LabelOutOfRange {
            index,
            label,
            num_classes,
        });
    }
    Ok(())
}
