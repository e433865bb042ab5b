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
use log::debug;
use rand::Rng;

/// Hyperparameters of a [`ThreeLayerConvNet`].
#[derive(Debug, Clone, PartialEq)]
pub struct ThreeLayerConvNetConfig {
    /// `(C, H, W)` of each input image. `H` and `W` must be even.
    pub input_dim: (usize, usize, usize),
    pub num_filters: usize,
    /// Odd, so that "same" padding preserves the spatial size.
    pub filter_size: usize,
    pub hidden_dim: usize,
    pub num_classes: usize,
    /// Standard deviation of the Gaussian weight initialization.
    pub weight_scale: f64,
    /// L2 regularization strength.
    pub reg: f64,
}

impl Default for ThreeLayerConvNetConfig {
    fn default() -> Self {
        ThreeLayerConvNetConfig {
            input_dim: (3, 32, 32),
            num_filters: 32,
            filter_size: 7,
            hidden_dim: 100,
            num_classes: 10,
            weight_scale: 1e-3,
            reg: 0.0,
        }
    }
}

impl ThreeLayerConvNetConfig {
    pub fn validate(&self) -> Result<(), ConvNetError> {
        validate_common_config(
            self.input_dim,
            self.hidden_dim,
            self.num_classes,
            self.weight_scale,
            self.reg,
        )?;
        validate_filter(self.num_filters, self.filter_size, "conv layer")
    }

    /// Expected shape of every parameter, in `named_parameters` order.
    pub fn parameter_shapes(&self) -> [(&'static str, Vec<usize>); 6] {
        let (c, h, w) = self.input_dim;
        let (f, fs) = (self.num_filters, self.filter_size);
        [
            ("W1", vec![f, c, fs, fs]),
            ("b1", vec![f]),
            // conv keeps HxW, the 2x2 pool halves it
            ("W2", vec![f * (h / 2) * (w / 2), self.hidden_dim]),
            ("b2", vec![self.hidden_dim]),
            ("W3", vec![self.hidden_dim, self.num_classes]),
            ("b3", vec![self.num_classes]),
        ]
    }
}

/// Parameters (or gradients) of a [`ThreeLayerConvNet`].
#[derive(Debug, Clone, PartialEq)]
pub struct ThreeLayerParams<T> {
    pub w1: Tensor<T>,
    pub b1: Tensor<T>,
    pub w2: Tensor<T>,
    pub b2: Tensor<T>,
    pub w3: Tensor<T>,
    pub b3: Tensor<T>,
}

impl<T: ConvNumeric> NamedParameters<T> for ThreeLayerParams<T> {
    fn named_parameters(&self) -> Vec<(&'static str, &Tensor<T>)> {
        vec![
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
            ("W1", &mut self.w1),
            ("b1", &mut self.b1),
            ("W2", &mut self.w2),
            ("b2", &mut self.b2),
            ("W3", &mut self.w3),
            ("b3", &mut self.b3),
        ]
    }
}

/// A three-layer convolutional network:
///
/// `conv - relu - 2x2 max pool - affine - relu - affine - softmax`
///
/// operating on minibatches of shape `(N, C, H, W)`. The element type `T` is
/// the network's precision.
#[derive(Debug, Clone)]
pub struct ThreeLayerConvNet<T = f32> {
    config: ThreeLayerConvNetConfig,
    params: ThreeLayerParams<T>,
    reg: T,
}

struct ForwardCaches<T> {
    conv: ConvReluPoolCache<T>,
    hidden: AffineReluCache<T>,
    output: AffineCache<T>,
}

impl<T: ConvNumeric> ThreeLayerConvNet<T> {
    /// Creates a network with Gaussian weights (std `weight_scale`) and zero
    /// biases, drawing from `rng`.
    pub fn new<R: Rng + ?Sized>(
        config: ThreeLayerConvNetConfig,
        rng: &mut R,
    ) -> Result<Self, ConvNetError> {
        config.validate()?;
        let [w1, b1, w2, b2, w3, b3] = config.parameter_shapes();
        let scale = config.weight_scale;
        let params = ThreeLayerParams {
            w1: gaussian_weight(&w1.1, scale, rng)?,
            b1: zero_bias(b1.1[0])?,
            w2: gaussian_weight(&w2.1, scale, rng)?,
            b2: zero_bias(b2.1[0])?,
            w3: gaussian_weight(&w3.1, scale, rng)?,
            b3: zero_bias(b3.1[0])?,
        };
        debug!(
            "ThreeLayerConvNet<{:?}>: {} parameters, shapes {:?}",
            T::DTYPE,
            params.num_parameters(),
            params
                .named_parameters()
                .iter()
                .map(|(n, t)| (*n, t.shape().to_vec()))
                .collect::<Vec<_>>()
        );
        Ok(ThreeLayerConvNet {
            reg: T::from_f64(config.reg),
            config,
            params,
        })
    }

    /// Creates a network from existing parameters, checking their shapes
    /// against `config`.
    pub fn from_params(
        config: ThreeLayerConvNetConfig,
        params: ThreeLayerParams<T>,
    ) -> Result<Self, ConvNetError> {
        config.validate()?;
        for ((name, expected), (_, actual)) in config
            .parameter_shapes()
            .iter()
            .zip(params.named_parameters())
        {
            actual.expect_shape(expected, name)?;
        }
        Ok(ThreeLayerConvNet {
            reg: T::from_f64(config.reg),
            config,
            params,
        })
    }

    pub fn config(&self) -> &ThreeLayerConvNetConfig {
        &self.config
    }

    pub fn dtype(&self) -> DType {
        T::DTYPE
    }

    fn forward(&self, x: &Tensor<T>) -> Result<(Tensor<T>, ForwardCaches<T>), ConvNetError> {
        validate_batch(x, self.config.input_dim)?;
        let p = &self.params;

        // Padding and stride chosen to preserve the input spatial size
        let conv_param = ConvParam::same(self.config.filter_size);
        let pool_param = PoolParam::halving();

        let (out1, conv) = conv_relu_pool_forward(x, &p.w1, &p.b1, conv_param, pool_param)?;
        let (out2, hidden) = affine_relu_forward(&out1, &p.w2, &p.b2)?;
        let (scores, output) = affine_forward(&out2, &p.w3, &p.b3)?;
        Ok((
            scores,
            ForwardCaches {
                conv,
                hidden,
                output,
            },
        ))
    }
}

impl<T: ConvNumeric> Classifier<T> for ThreeLayerConvNet<T> {
    type Params = ThreeLayerParams<T>;

    fn params(&self) -> &ThreeLayerParams<T> {
        &self.params
    }

    fn params_mut(&mut self) -> &mut ThreeLayerParams<T> {
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
    ) -> Result<(T, ThreeLayerParams<T>), ConvNetError> {
        let (scores, caches) = self.forward(x)?;
        let p = &self.params;
        let reg = self.reg;

        let (data_loss, dscores) = softmax_loss(&scores, labels)?;
        let loss =
            data_loss + reg * (p.w1.sum_squares() + p.w2.sum_squares() + p.w3.sum_squares());

        let (dout, mut w3, b3) = affine_backward(&dscores, caches.output)?;
        add_l2_grad(&mut w3, &p.w3, reg)?;
        let (dout, mut w2, b2) = affine_relu_backward(&dout, caches.hidden)?;
        add_l2_grad(&mut w2, &p.w2, reg)?;
        let (_, mut w1, b1) = conv_relu_pool_backward(&dout, caches.conv)?;
        add_l2_grad(&mut w1, &p.w1, reg)?;

        debug!(
            "ThreeLayerConvNet loss: batch {}, data loss {:?}, total {:?}",
            labels.len(),
            data_loss,
            loss
        );
        Ok((
            loss,
            ThreeLayerParams {
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
#[path = "three_layer_test.rs"]
mod tests;
