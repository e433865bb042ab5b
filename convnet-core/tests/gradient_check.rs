use convnet_core::classifiers::{
    NewConvNet, NewConvNetConfig, ThreeLayerConvNet, ThreeLayerConvNetConfig, ThreeLayerParams,
};
use convnet_core::grad_check::{
    check_classifier_gradients, numerical_parameter_gradient, GradCheckError,
};
use convnet_core::{Classifier, ConvNetError, Tensor};

mod common;
use common::{init_logger, random_batch, seeded_rng};

const H: f64 = 1e-6;

// Convolution parameters accumulate over many windows, so their
// finite-difference estimates are noisier than the affine ones.
fn new_convnet_tolerance(name: &str) -> f64 {
    match name {
        "W0" | "b0" | "W1" | "b1" => 1e-2,
        _ => 1e-5,
    }
}

fn three_layer_tolerance(name: &str) -> f64 {
    match name {
        "W1" | "b1" => 1e-2,
        _ => 1e-5,
    }
}

#[test]
fn test_three_layer_gradients_without_regularization() {
    init_logger();
    let mut rng = seeded_rng(231);
    let config = ThreeLayerConvNetConfig {
        input_dim: (3, 4, 4),
        num_filters: 2,
        filter_size: 3,
        hidden_dim: 5,
        num_classes: 3,
        weight_scale: 0.3,
        reg: 0.0,
    };
    let mut net: ThreeLayerConvNet<f64> = ThreeLayerConvNet::new(config.clone(), &mut rng).unwrap();
    let (x, labels) = random_batch::<f64>(&mut rng, 2, config.input_dim, config.num_classes);

    let report = check_classifier_gradients(&mut net, &x, &labels, H, three_layer_tolerance).unwrap();
    let names: Vec<&str> = report.iter().map(|(n, _)| *n).collect();
    assert_eq!(names, vec!["W1", "b1", "W2", "b2", "W3", "b3"]);
}

#[test]
fn test_three_layer_gradients_with_regularization() {
    init_logger();
    let mut rng = seeded_rng(7);
    let config = ThreeLayerConvNetConfig {
        input_dim: (2, 4, 4),
        num_filters: 3,
        filter_size: 3,
        hidden_dim: 4,
        num_classes: 4,
        weight_scale: 0.3,
        reg: 0.05,
    };
    let mut net: ThreeLayerConvNet<f64> = ThreeLayerConvNet::new(config.clone(), &mut rng).unwrap();
    let (x, labels) = random_batch::<f64>(&mut rng, 3, config.input_dim, config.num_classes);

    let before = net.params().clone();
    check_classifier_gradients(&mut net, &x, &labels, H, three_layer_tolerance).unwrap();
    // Perturbations are undone entry by entry
    assert_eq!(net.params(), &before);
}

#[test]
fn test_new_convnet_gradients() {
    init_logger();
    let mut rng = seeded_rng(42);
    let config = NewConvNetConfig {
        input_dim: (2, 4, 4),
        num_filters_1: 2,
        num_filters_2: 3,
        filter_size_1: 3,
        filter_size_2: 3,
        hidden_dim: 4,
        num_classes: 3,
        weight_scale: 0.3,
        reg: 0.05,
    };
    let mut net: NewConvNet<f64> = NewConvNet::new(config.clone(), &mut rng).unwrap();
    let (x, labels) = random_batch::<f64>(&mut rng, 2, config.input_dim, config.num_classes);

    let report = check_classifier_gradients(&mut net, &x, &labels, H, new_convnet_tolerance).unwrap();
    assert_eq!(report.len(), 8);
    for (name, error) in report {
        assert!(error <= new_convnet_tolerance(name), "{} relative error {:e}", name, error);
    }
}

#[test]
fn test_unknown_parameter_is_reported() {
    let mut rng = seeded_rng(3);
    let config = NewConvNetConfig {
        input_dim: (1, 2, 2),
        num_filters_1: 1,
        num_filters_2: 1,
        filter_size_1: 1,
        filter_size_2: 1,
        hidden_dim: 2,
        num_classes: 2,
        weight_scale: 0.1,
        reg: 0.0,
    };
    let mut net: NewConvNet<f64> = NewConvNet::new(config.clone(), &mut rng).unwrap();
    let (x, labels) = random_batch::<f64>(&mut rng, 1, config.input_dim, config.num_classes);
    let err = numerical_parameter_gradient(&mut net, "W9", &x, &labels, H).unwrap_err();
    assert_eq!(err, GradCheckError::UnknownParameter("W9".to_string()));
}

// Wraps a network and drops the `2 * reg * W3` term from its W3 gradient.
struct MissingRegularizationGrad {
    inner: ThreeLayerConvNet<f64>,
    reg: f64,
}

impl Classifier<f64> for MissingRegularizationGrad {
    type Params = ThreeLayerParams<f64>;

    fn params(&self) -> &ThreeLayerParams<f64> {
        self.inner.params()
    }

    fn params_mut(&mut self) -> &mut ThreeLayerParams<f64> {
        self.inner.params_mut()
    }

    fn num_classes(&self) -> usize {
        self.inner.num_classes()
    }

    fn scores(&self, x: &Tensor<f64>) -> Result<Tensor<f64>, ConvNetError> {
        self.inner.scores(x)
    }

    fn loss_and_grads(
        &self,
        x: &Tensor<f64>,
        labels: &[usize],
    ) -> Result<(f64, ThreeLayerParams<f64>), ConvNetError> {
        let (loss, mut grads) = self.inner.loss_and_grads(x, labels)?;
        grads.w3.add_scaled_(&self.inner.params().w3, -2.0 * self.reg)?;
        Ok((loss, grads))
    }
}

#[test]
fn test_wrong_gradient_is_caught() {
    init_logger();
    let mut rng = seeded_rng(7);
    let config = ThreeLayerConvNetConfig {
        input_dim: (2, 4, 4),
        num_filters: 3,
        filter_size: 3,
        hidden_dim: 4,
        num_classes: 4,
        weight_scale: 0.3,
        reg: 0.05,
    };
    let inner: ThreeLayerConvNet<f64> = ThreeLayerConvNet::new(config.clone(), &mut rng).unwrap();
    let (x, labels) = random_batch::<f64>(&mut rng, 3, config.input_dim, config.num_classes);
    let mut net = MissingRegularizationGrad {
        inner,
        reg: config.reg,
    };

    let result = check_classifier_gradients(&mut net, &x, &labels, H, three_layer_tolerance);
    match result {
        Err(GradCheckError::GradientMismatch {
            parameter,
            relative_error,
            ..
        }) => {
            assert_eq!(parameter, "W3");
            assert!(relative_error > 1e-3, "relative error {:e}", relative_error);
        }
        other => panic!("Expected GradientMismatch, got {:?}", other),
    }
}

#[test]
fn test_failed_loss_leaves_parameters_unchanged() {
    let mut rng = seeded_rng(11);
    let config = ThreeLayerConvNetConfig {
        input_dim: (1, 2, 2),
        num_filters: 1,
        filter_size: 1,
        hidden_dim: 2,
        num_classes: 2,
        weight_scale: 0.5,
        reg: 0.0,
    };
    let mut net: ThreeLayerConvNet<f64> = ThreeLayerConvNet::new(config.clone(), &mut rng).unwrap();
    let (x, _) = random_batch::<f64>(&mut rng, 1, config.input_dim, config.num_classes);
    let before = net.params().clone();

    let err = numerical_parameter_gradient(&mut net, "W1", &x, &[5], 1e-3).unwrap_err();
    assert!(matches!(
        err,
        GradCheckError::TensorError(ConvNetError::LabelOutOfRange { label: 5, .. })
    ));
    assert_eq!(net.params(), &before);

    assert!(check_classifier_gradients(&mut net, &x, &[5], 1e-3, three_layer_tolerance).is_err());
    assert_eq!(net.params(), &before);
}
