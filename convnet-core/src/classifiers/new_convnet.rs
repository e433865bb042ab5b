use super::{add_l2_grad, validate_batch, validate_common_config, validate_filter, Classifier};
use crate::error::ConvNetError;
use crate::nn::init::{gaussian_weight, zero_bias};
use crate::nn::layer_utils::{
    affine_relu_backward, affine_relu_forward, conv_relu_pool_backward, conv_relu_pool_forward,
    AffineReluCache, ConvReluPoolCache,
};
use crate::nn::layers::{affine_backward, affine_forward, AffineCache};
use crate::nn::losses::softmax_loss;
use crate::nn::param::{ConvParam, PoolParam};
use crate::nn::parameters::NamedParameters;
use crate::ops::traits::ConvNumeric;
use crate::tensor::Tensor;
use crate::types::DType;
use log::{debug, trace};
use rand::Rng;

/// Hyperparameters of a [`NewConvNet`].
#[derive(Debug, Clone, PartialEq)]
pub struct NewConvNetConfig {
    /// `(C, H, W)` of each input image. `H` and `W` must be even.
    pub input_dim: (usize, usize, usize),
    pub num_filters_1: usize,
    pub num_filters_2: usize,
    pub filter_size_1: usize,
    pub filter_size_2: usize,
    pub hidden_dim: usize,
    pub num_classes: usize,
    pub weight_scale: f64,
    pub reg: f64,
}

impl Default for NewConvNetConfig {
    fn default() -> Self {
        NewConvNetConfig {
            input_dim: (3, 32, 32),
            num_filters_1: 32,
            num_filters_2: 24,
            filter_size_1: 7,
            filter_size_2: 5,
            hidden_dim: 100,
            num_classes: 10,
            weight_scale: 1e-3,
            reg: 0.0,
        }
    }
}

impl NewConvNetConfig {
    pub fn validate(&self) -> Result<(), ConvNetError> {
        validate_common_config(
            self.input_dim,
            self.hidden_dim,
            self.num_classes,
            self.weight_scale,
            self.reg,
        )?;
        validate_filter(self.num_filters_1, self.filter_size_1, "first conv layer")?;
        validate_filter(self.num_filters_2, self.filter_size_2, "second conv layer")
    }

    /// Expected shape of every parameter, in `named_parameters` order.
    pub fn parameter_shapes(&self) -> [(&'static str, Vec<usize>); 8] {
        let (c, h, w) = self.input_dim;
        let (f1, fs1) = (self.num_filters_1, self.filter_size_1);
        let (f2, fs2) = (self.num_filters_2, self.filter_size_2);
        [
            ("W0", vec![f1, c, fs1, fs1]),
            ("b0", vec![f1]),
            ("W1", vec![f2, f1, fs2, fs2]),
            ("b1", vec![f2]),
            // only the second stage pools
            ("W2", vec![f2 * (h / 2) * (w / 2), self.hidden_dim]),
            ("b2", vec![self.hidden_dim]),
            ("W3", vec![self.hidden_dim, self.num_classes]),
            ("b3", vec![self.num_classes]),
        ]
    }
}

/// Parameters (or gradients) of a [`NewConvNet`].
#[derive(Debug, Clone, PartialEq)]
pub struct NewConvParams<T> {
    pub w0: Tensor<T>,
    pub b0: Tensor<T>,
    pub w1: Tensor<T>,
    pub b1: Tensor<T>,
    pub w2: Tensor<T>,
    pub b2: Tensor<T>,
    pub w3: Tensor<T>,
    pub b3: Tensor<T>,
}

impl<T: ConvNumeric> NamedParameters<T> for NewConvParams<T> {
    fn named_parameters(&self) -> Vec<(&'static str, &Tensor<T>)> {
        vec![
            ("W0", &self.w0),
            ("b0", &self.b0),
            ("W1", &self.w1),
            ("b1", &self.b1),
            ("W2", &self.w2),
            ("b2", &self.b2),
            ("W3", &self.w3),
            ("b3", &self.b3),
        ]
    }

    fn named_parameters_mut(&mut self) -> Vec<(&'static str, &mut Tensor<T>)> {
        vec![
            ("W0", &mut self.w0),
            ("b0", &mut self.b0),
            ("W1", &mut self.w1),
            ("b1", &mut self.b1),
            ("W2", &mut self.w2),
            ("b2", &mut self.b2),
            ("W3", &mut self.w3),
            ("b3", &mut self.b3),
        ]
    }
}

/// A four-layer convolutional network with two conv stages:
///
/// `conv - relu - 1x1 pool - conv - relu - 2x2 max pool - affine - relu - affine - softmax`
///
/// The first stage uses a 1x1 stride-1 pool, which leaves its input
/// unchanged; only the second stage halves the spatial size.
#[derive(Debug, Clone)]
pub struct NewConvNet<T = f32> {
    config: NewConvNetConfig,
    params: NewConvParams<T>,
    reg: T,
}

struct ForwardCaches<T> {
    conv0: ConvReluPoolCache<T>,
    conv1: ConvReluPoolCache<T>,
    hidden: AffineReluCache<T>,
    output: AffineCache<T>,
}

impl<T: ConvNumeric> NewConvNet<T> {
    pub fn new<R: Rng + ?Sized>(config: NewConvNetConfig, rng: &mut R) -> Result<Self, ConvNetError> {
        config.validate()?;
        let [w0, b0, w1, b1, w2, b2, w3, b3] = config.parameter_shapes();
        let scale = config.weight_scale;
        let params = NewConvParams {
            w0: gaussian_weight(&w0.1, scale, rng)?,
            b0: zero_bias(b0.1[0])?,
            w1: gaussian_weight(&w1.1, scale, rng)?,
            b1: zero_bias(b1.1[0])?,
            w2: gaussian_weight(&w2.1, scale, rng)?,
            b2: zero_bias(b2.1[0])?,
            w3: gaussian_weight(&w3.1, scale, rng)?,
            b3: zero_bias(b3.1[0])?,
        };
        debug!(
            "NewConvNet<{:?}>: {} parameters, filters {}x{} then {}x{}",
            T::DTYPE,
            params.num_parameters(),
            config.num_filters_1,
            config.filter_size_1,
            config.num_filters_2,
            config.filter_size_2
        );
        Ok(NewConvNet {
            reg: T::from_f64(config.reg),
            config,
            params,
        })
    }

    pub fn from_params(config: NewConvNetConfig, params: NewConvParams<T>) -> Result<Self, ConvNetError> {
        config.validate()?;
        for ((name, expected), (_, actual)) in config
            .parameter_shapes()
            .iter()
            .zip(params.named_parameters())
        {
            actual.expect_shape(expected, name)?;
        }
        Ok(NewConvNet {
            reg: T::from_f64(config.reg),
            config,
            params,
        })
    }

    pub fn config(&self) -> &NewConvNetConfig {
        &self.config
    }

    pub fn dtype(&self) -> DType {
        T::DTYPE
    }

    fn forward(&self, x: &Tensor<T>) -> Result<(Tensor<T>, ForwardCaches<T>), ConvNetError> {
        validate_batch(x, self.config.input_dim)?;
        let p = &self.params;

        let conv0_param = ConvParam::same(self.config.filter_size_1);
        let conv1_param = ConvParam::same(self.config.filter_size_2);

        let (out0, conv0) =
            conv_relu_pool_forward(x, &p.w0, &p.b0, conv0_param, PoolParam::identity())?;
        let (out1, conv1) =
            conv_relu_pool_forward(&out0, &p.w1, &p.b1, conv1_param, PoolParam::halving())?;
        trace!(
            "NewConvNet forward: stage shapes {:?} -> {:?}",
            out0.shape(),
            out1.shape()
        );
        let (out2, hidden) = affine_relu_forward(&out1, &p.w2, &p.b2)?;
        let (scores, output) = affine_forward(&out2, &p.w3, &p.b3)?;
        Ok((
            scores,
            ForwardCaches {
                conv0,
                conv1,
                hidden,
                output,
            },
        ))
    }
}

impl<T: ConvNumeric> Classifier<T> for NewConvNet<T> {
    type Params = NewConvParams<T>;

    fn params(&self) -> &NewConvParams<T> {
        &self.params
    }

    fn params_mut(&mut self) -> &mut NewConvParams<T> {
        &mut self.params
    }

    fn num_classes(&self) -> usize {
        self.config.num_classes
    }

    fn scores(&self, x: &Tensor<T>) -> Result<Tensor<T>, ConvNetError> {
        let (scores, _) = self.forward(x)?;
        Ok(scores)
    }

    fn loss_and_grads(
        &self,
        x: &Tensor<T>,
        labels: &[usize],
    ) -> Result<(T, NewConvParams<T>), ConvNetError> {
        let (scores, caches) = self.forward(x)?;
        let p = &self.params;
        let reg = self.reg;

        let (data_loss, dscores) = softmax_loss(&scores, labels)?;
        let weight_norm = p.w0.sum_squares()
            + p.w1.sum_squares()
            + p.w2.sum_squares()
            + p.w3.sum_squares();
        let loss = data_loss + reg * weight_norm;

        let (dout, mut w3, b3) = affine_backward(&dscores, caches.output)?;
        add_l2_grad(&mut w3, &p.w3, reg)?;
        let (dout, mut w2, b2) = affine_relu_backward(&dout, caches.hidden)?;
        add_l2_grad(&mut w2, &p.w2, reg)?;
        let (dout, mut w1, b1) = conv_relu_pool_backward(&dout, caches.conv1)?;
        add_l2_grad(&mut w1, &p.w1, reg)?;
        let (_, mut w0, b0) = conv_relu_pool_backward(&dout, caches.conv0)?;
        add_l2_grad(&mut w0, &p.w0, reg)?;

        debug!(
            "NewConvNet loss: batch {}, data loss {:?}, total {:?}",
            labels.len(),
            data_loss,
            loss
        );
        Ok((
            loss,
            NewConvParams {
                w0,
                b0,
                w1,
                b1,
                w2,
                b2,
                w3,
                b3,
            },
        ))
    }
}

#[cfg(test)]
#[path = "new_convnet_test.rs"]
mod tests;
