use super::validate_labels;
use crate::error::ConvNetError;
use crate::ops::traits::ConvNumeric;
use crate::tensor::Tensor;

/// Softmax cross-entropy loss averaged over the batch.
///
/// # Arguments
/// * `scores`: class scores of shape `(N, C)`.
/// * `labels`: `N` labels, each in `[0, C)`.
///
/// # Returns
/// `(loss, dscores)` where `dscores` is the gradient of the loss with respect
/// to `scores`.
///
/// Each row is shifted by its maximum before exponentiation, so large scores
/// do not overflow.
pub fn softmax_loss<T: ConvNumeric>(
    scores: &Tensor<T>,
    labels: &[usize],
) -> Result<(T, Tensor<T>), ConvNetError> {
    scores.expect_rank(2, "softmax_loss")?;
    let (n, c) = (scores.shape()[0], scores.shape()[1]);
    if n == 0 {
        return Err(ConvNetError::EmptyBatch);
    }
    validate_labels(labels, n, c)?;

    let batch = T::from_usize(n);
    let mut loss = T::zero();
    let mut dscores = Vec::with_capacity(n * c);
    for (row, &label) in scores.data().chunks(c).zip(labels) {
        let max = row.iter().copied().fold(T::neg_infinity(), T::max);
        let shifted: Vec<T> = row.iter().map(|&s| s - max).collect();
        let sum_exp: T = shifted.iter().map(|&s| s.exp()).sum();
        let log_sum_exp = sum_exp.ln();

        loss -= shifted[label] - log_sum_exp;
        for (k, &s) in shifted.iter().enumerate() {
            let prob = (s - log_sum_exp).exp();
            let target = if k == label { T::one() } else { T::zero() };
            dscores.push((prob - target) / batch);
        }
    }
    Ok((loss / batch, Tensor::new(dscores, vec![n, c])?))
}

#[cfg(test)]
#[path = "softmax_test.rs"]
mod tests;
