use crate::error::ConvNetError;
use crate::nn::param::PoolParam;
use crate::ops::traits::ConvNumeric;
use crate::tensor::Tensor;
use log::trace;

/// Values saved by [`max_pool_forward`] for [`max_pool_backward`].
#[derive(Debug, Clone)]
pub struct PoolCache {
    x_shape: Vec<usize>,
    out_shape: Vec<usize>,
    // Flat input offset of the maximum of each output window.
    argmax: Vec<usize>,
}

/// Naive max-pooling forward pass over an `(N, C, H, W)` input.
///
/// The output has shape `(N, C, 1 + (H - pool_height) / stride,
/// 1 + (W - pool_width) / stride)`; trailing rows/columns that do not fill a
/// window are dropped. The first maximum in row-major window order wins ties.
pub fn max_pool_forward<T: ConvNumeric>(
    x: &Tensor<T>,
    pool_param: PoolParam,
) -> Result<(Tensor<T>, PoolCache), ConvNetError> {
    x.expect_rank(4, "max_pool_forward")?;
    let (n, c, h, w) = (x.shape()[0], x.shape()[1], x.shape()[2], x.shape()[3]);
    let (h_out, w_out) = pool_param.output_size(h, w)?;
    let PoolParam {
        pool_height,
        pool_width,
        stride,
    } = pool_param;

    let data = x.data();
    let mut out = Vec::with_capacity(n * c * h_out * w_out);
    let mut argmax = Vec::with_capacity(n * c * h_out * w_out);
    for plane in 0..n * c {
        let base = plane * h * w;
        for i in 0..h_out {
            for j in 0..w_out {
                let mut best = base + i * stride * w + j * stride;
                for pi in 0..pool_height {
                    for pj in 0..pool_width {
                        let idx = base + (i * stride + pi) * w + j * stride + pj;
                        if data[idx] > data[best] {
                            best = idx;
                        }
                    }
                }
                out.push(data[best]);
                argmax.push(best);
            }
        }
    }
    let out = Tensor::new(out, vec![n, c, h_out, w_out])?;
    trace!("max_pool_forward: {:?} -> {:?}", x.shape(), out.shape());

    let cache = PoolCache {
        x_shape: x.shape().to_vec(),
        out_shape: out.shape().to_vec(),
        argmax,
    };
    Ok((out, cache))
}

/// Backward pass for [`max_pool_forward`]: each upstream value flows to the
/// input position that was the maximum of its window.
pub fn max_pool_backward<T: ConvNumeric>(
    dout: &Tensor<T>,
    cache: PoolCache,
) -> Result<Tensor<T>, ConvNetError> {
    dout.expect_shape(&cache.out_shape, "max_pool_backward")?;
    let numel: usize = cache.x_shape.iter().product();
    let mut dx = vec![T::zero(); numel];
    for (&idx, &g) in cache.argmax.iter().zip(dout.data()) {
        dx[idx] += g;
    }
    Tensor::new(dx, cache.x_shape)
}

#[cfg(test)]
#[path = "pool_test.rs"]
mod tests;
