use crate::error::ConvNetError;
use crate::ops::traits::ConvNumeric;
use crate::tensor::Tensor;
use log::trace;

/// Values saved by [`affine_forward`] for [`affine_backward`].
#[derive(Debug, Clone)]
pub struct AffineCache<T> {
    x: Tensor<T>,
    w: Tensor<T>,
}

/// Computes `out = x.reshape(N, D) · w + b`.
///
/// # Arguments
/// * `x`: input of shape `(N, d_1, ..., d_k)`, flattened to `(N, D)` with
///   `D = d_1 * ... * d_k`.
/// * `w`: weights of shape `(D, M)`.
/// * `b`: biases of shape `(M)`.
///
/// # Returns
/// `(out, cache)` where `out` has shape `(N, M)`.
pub fn affine_forward<T: ConvNumeric>(
    x: &Tensor<T>,
    w: &Tensor<T>,
    b: &Tensor<T>,
) -> Result<(Tensor<T>, AffineCache<T>), ConvNetError> {
    if x.rank() < 2 {
        return Err(ConvNetError::RankMismatch {
            expected: 2,
            actual: x.rank(),
            operation: "affine_forward".to_string(),
        });
    }
    w.expect_rank(2, "affine_forward")?;
    let n = x.shape()[0];
    let d: usize = x.shape()[1..].iter().product();
    let m = w.shape()[1];
    if m == 0 {
        return Err(ConvNetError::ZeroSizedDimension {
            shape: w.shape().to_vec(),
            operation: "affine_forward".to_string(),
        });
    }
    if w.shape()[0] != d {
        return Err(ConvNetError::ShapeMismatch {
            expected: vec![d, m],
            actual: w.shape().to_vec(),
            operation: "affine_forward".to_string(),
        });
    }
    b.expect_shape(&[m], "affine_forward")?;

    let mut out = x.reshape(vec![n, d])?.matmul(w)?;
    for row in out.data_mut().chunks_mut(m) {
        for (o, &bias) in row.iter_mut().zip(b.data()) {
            *o += bias;
        }
    }
    trace!("affine_forward: {:?} -> {:?}", x.shape(), out.shape());

    let cache = AffineCache {
        x: x.clone(),
        w: w.clone(),
    };
    Ok((out, cache))
}

/// Backward pass for [`affine_forward`].
///
/// # Returns
/// `(dx, dw, db)`, shaped like `x`, `w` and `b`.
pub fn affine_backward<T: ConvNumeric>(
    dout: &Tensor<T>,
    cache: AffineCache<T>,
) -> Result<(Tensor<T>, Tensor<T>, Tensor<T>), ConvNetError> {
    let AffineCache { x, w } = cache;
    let n = x.shape()[0];
    let (d, m) = (w.shape()[0], w.shape()[1]);
    dout.expect_shape(&[n, m], "affine_backward")?;

    let dx = dout.matmul(&w.transpose()?)?.into_reshape(x.shape().to_vec())?;
    let dw = x.into_reshape(vec![n, d])?.transpose()?.matmul(dout)?;

    let mut db = vec![T::zero(); m];
    for row in dout.data().chunks(m) {
        for (acc, &g) in db.iter_mut().zip(row) {
            *acc += g;
        }
    }
    Ok((dx, dw, Tensor::new(db, vec![m])?))
}

#[cfg(test)]
#[path = "affine_test.rs"]
mod tests;
