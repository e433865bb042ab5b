use crate::error::ConvNetError;
use crate::nn::param::ConvParam;
use crate::ops::traits::ConvNumeric;
use crate::tensor::Tensor;
use log::trace;

/// Values saved by [`conv_forward`] for [`conv_backward`].
///
/// Holds the zero-padded input rather than the raw one so the backward pass
/// can index it directly.
#[derive(Debug, Clone)]
pub struct ConvCache<T> {
    x_padded: Tensor<T>,
    w: Tensor<T>,
    x_shape: [usize; 4],
    out_hw: (usize, usize),
    conv_param: ConvParam,
}

/// Naive convolution forward pass.
///
/// # Arguments
/// * `x`: input of shape `(N, C, H, W)`.
/// * `w`: filters of shape `(F, C, HH, WW)`.
/// * `b`: biases of shape `(F)`.
/// * `conv_param`: stride and zero padding.
///
/// # Returns
/// `(out, cache)` where `out` has shape `(N, F, H', W')` with
/// `H' = 1 + (H + 2 * pad - HH) / stride` and likewise for `W'`.
pub fn conv_forward<T: ConvNumeric>(
    x: &Tensor<T>,
    w: &Tensor<T>,
    b: &Tensor<T>,
    conv_param: ConvParam,
) -> Result<(Tensor<T>, ConvCache<T>), ConvNetError> {
    x.expect_rank(4, "conv_forward")?;
    w.expect_rank(4, "conv_forward")?;
    let (n, c, h, wd) = (x.shape()[0], x.shape()[1], x.shape()[2], x.shape()[3]);
    let (f, wc, hh, ww) = (w.shape()[0], w.shape()[1], w.shape()[2], w.shape()[3]);
    if wc != c {
        return Err(ConvNetError::ShapeMismatch {
            expected: vec![f, c, hh, ww],
            actual: w.shape().to_vec(),
            operation: "conv_forward".to_string(),
        });
    }
    b.expect_shape(&[f], "conv_forward")?;
    let (h_out, w_out) = conv_param.output_size(h, wd, hh, ww)?;

    let x_padded = pad_spatial(x, conv_param.pad)?;
    let (hp, wp) = (x_padded.shape()[2], x_padded.shape()[3]);
    let stride = conv_param.stride;
    let xp = x_padded.data();
    let wdata = w.data();

    let mut out = vec![T::zero(); n * f * h_out * w_out];
    for ni in 0..n {
        for fi in 0..f {
            let bias = b.data()[fi];
            for i in 0..h_out {
                for j in 0..w_out {
                    let mut acc = bias;
                    for ci in 0..c {
                        let x_base = (ni * c + ci) * hp * wp;
                        let w_base = (fi * c + ci) * hh * ww;
                        for ki in 0..hh {
                            let x_row = x_base + (i * stride + ki) * wp + j * stride;
                            let w_row = w_base + ki * ww;
                            for kj in 0..ww {
                                acc += xp[x_row + kj] * wdata[w_row + kj];
                            }
                        }
                    }
                    out[((ni * f + fi) * h_out + i) * w_out + j] = acc;
                }
            }
        }
    }
    let out = Tensor::new(out, vec![n, f, h_out, w_out])?;
    trace!("conv_forward: {:?} -> {:?}", x.shape(), out.shape());

    let cache = ConvCache {
        x_padded,
        w: w.clone(),
        x_shape: [n, c, h, wd],
        out_hw: (h_out, w_out),
        conv_param,
    };
    Ok((out, cache))
}

/// Naive convolution backward pass.
///
/// # Returns
/// `(dx, dw, db)`, shaped like `x`, `w` and `b`.
pub fn conv_backward<T: ConvNumeric>(
    dout: &Tensor<T>,
    cache: ConvCache<T>,
) -> Result<(Tensor<T>, Tensor<T>, Tensor<T>), ConvNetError> {
    let ConvCache {
        x_padded,
        w,
        x_shape,
        out_hw: (h_out, w_out),
        conv_param,
    } = cache;
    let [n, c, h, wd] = x_shape;
    let (f, hh, ww) = (w.shape()[0], w.shape()[2], w.shape()[3]);
    dout.expect_shape(&[n, f, h_out, w_out], "conv_backward")?;

    let (hp, wp) = (x_padded.shape()[2], x_padded.shape()[3]);
    let stride = conv_param.stride;
    let xp = x_padded.data();
    let wdata = w.data();
    let g = dout.data();

    let mut dxp = vec![T::zero(); x_padded.numel()];
    let mut dw = vec![T::zero(); w.numel()];
    let mut db = vec![T::zero(); f];
    for ni in 0..n {
        for fi in 0..f {
            for i in 0..h_out {
                for j in 0..w_out {
                    let upstream = g[((ni * f + fi) * h_out + i) * w_out + j];
                    db[fi] += upstream;
                    for ci in 0..c {
                        let x_base = (ni * c + ci) * hp * wp;
                        let w_base = (fi * c + ci) * hh * ww;
                        for ki in 0..hh {
                            let x_row = x_base + (i * stride + ki) * wp + j * stride;
                            let w_row = w_base + ki * ww;
                            for kj in 0..ww {
                                dw[w_row + kj] += upstream * xp[x_row + kj];
                                dxp[x_row + kj] += upstream * wdata[w_row + kj];
                            }
                        }
                    }
                }
            }
        }
    }

    let dx = crop_spatial(&dxp, [n, c, hp, wp], conv_param.pad, h, wd)?;
    Ok((
        dx,
        Tensor::new(dw, w.shape().to_vec())?,
        Tensor::new(db, vec![f])?,
    ))
}

/// Zero-pads the two trailing (spatial) dimensions of an `(N, C, H, W)` tensor.
fn pad_spatial<T: ConvNumeric>(x: &Tensor<T>, pad: usize) -> Result<Tensor<T>, ConvNetError> {
    if pad == 0 {
        return Ok(x.clone());
    }
    let (n, c, h, w) = (x.shape()[0], x.shape()[1], x.shape()[2], x.shape()[3]);
    let (hp, wp) = (h + 2 * pad, w + 2 * pad);
    let mut out = vec![T::zero(); n * c * hp * wp];
    for plane in 0..n * c {
        for i in 0..h {
            let src = &x.data()[(plane * h + i) * w..(plane * h + i + 1) * w];
            let dst_start = (plane * hp + i + pad) * wp + pad;
            out[dst_start..dst_start + w].copy_from_slice(src);
        }
    }
    Tensor::new(out, vec![n, c, hp, wp])
}

/// Inverse of [`pad_spatial`]: drops the padded border.
fn crop_spatial<T: ConvNumeric>(
    padded: &[T],
    padded_shape: [usize; 4],
    pad: usize,
    h: usize,
    w: usize,
) -> Result<Tensor<T>, ConvNetError> {
    let [n, c, hp, wp] = padded_shape;
    let mut out = Vec::with_capacity(n * c * h * w);
    for plane in 0..n * c {
        for i in 0..h {
            let start = (plane * hp + i + pad) * wp + pad;
            out.extend_from_slice(&padded[start..start + w]);
        }
    }
    Tensor::new(out, vec![n, c, h, w])
}

#[cfg(test)]
#[path = "conv_test.rs"]
mod tests;
