use convnet_core::classifiers::{
    LossOutput, NewConvNet, NewConvNetConfig, ThreeLayerConvNet, ThreeLayerConvNetConfig,
};
use convnet_core::nn::{softmax_loss, NamedParameters};
use convnet_core::tensor::zeros;
use convnet_core::utils::testing::check_tensor_near;
use convnet_core::{Classifier, ConvNetError, DType, Tensor};
use approx::assert_relative_eq;

mod common;
use common::{init_logger, random_batch, seeded_rng};

fn small_three_layer() -> ThreeLayerConvNetConfig {
    ThreeLayerConvNetConfig {
        input_dim: (3, 8, 8),
        num_filters: 2,
        filter_size: 3,
        hidden_dim: 5,
        num_classes: 3,
        weight_scale: 1e-2,
        reg: 0.0,
    }
}

#[test]
fn test_untrained_net_loss_is_near_log_num_classes() {
    init_logger();
    let mut rng = seeded_rng(0);
    let net: ThreeLayerConvNet<f32> = ThreeLayerConvNet::new(small_three_layer(), &mut rng).unwrap();
    let x: Tensor<f32> = zeros(&[3, 3, 8, 8]).unwrap();
    let (loss, _) = net
        .loss(&x, Some(&[0, 1, 2]))
        .unwrap()
        .into_loss_and_grads()
        .unwrap();
    assert_relative_eq!(loss, 3.0_f32.ln(), epsilon = 1e-5);
}

#[test]
fn test_scores_mode_matches_unregularized_loss() {
    let mut rng = seeded_rng(1);
    let net: ThreeLayerConvNet<f64> = ThreeLayerConvNet::new(small_three_layer(), &mut rng).unwrap();
    let (x, labels) = random_batch::<f64>(&mut rng, 4, (3, 8, 8), 3);

    let scores = net.loss(&x, None).unwrap().into_scores().unwrap();
    assert_eq!(scores.shape(), &[4, 3]);
    let (expected, _) = softmax_loss(&scores, &labels).unwrap();
    let (loss, _) = net.loss_and_grads(&x, &labels).unwrap();
    assert_relative_eq!(loss, expected, epsilon = 1e-12);
}

#[test]
fn test_regularization_increases_loss() {
    let (x, labels) = random_batch::<f64>(&mut seeded_rng(2), 2, (3, 8, 8), 3);
    let mut previous = f64::NEG_INFINITY;
    for reg in [0.0, 0.1, 1.0] {
        // Same seed, same weights: only the penalty differs
        let config = ThreeLayerConvNetConfig {
            reg,
            ..small_three_layer()
        };
        let net: ThreeLayerConvNet<f64> = ThreeLayerConvNet::new(config, &mut seeded_rng(9)).unwrap();
        let (loss, _) = net.loss_and_grads(&x, &labels).unwrap();
        assert!(loss > previous, "loss {} at reg {} not above {}", loss, reg, previous);
        previous = loss;
    }
}

#[test]
fn test_construction_is_deterministic_for_a_seed() {
    let a: NewConvNet<f32> = NewConvNet::new(NewConvNetConfig::default(), &mut seeded_rng(17)).unwrap();
    let b: NewConvNet<f32> = NewConvNet::new(NewConvNetConfig::default(), &mut seeded_rng(17)).unwrap();
    let c: NewConvNet<f32> = NewConvNet::new(NewConvNetConfig::default(), &mut seeded_rng(18)).unwrap();
    assert_eq!(a.params(), b.params());
    assert_ne!(a.params(), c.params());
    assert_eq!(a.dtype(), DType::F32);
}

#[test]
fn test_precision_follows_type_parameter() {
    let mut rng = seeded_rng(4);
    let net: ThreeLayerConvNet<f64> = ThreeLayerConvNet::new(small_three_layer(), &mut rng).unwrap();
    assert_eq!(net.dtype(), DType::F64);
    for (_, p) in net.params().named_parameters() {
        assert_eq!(p.dtype(), DType::F64);
    }
    let (x, _) = random_batch::<f64>(&mut rng, 2, (3, 8, 8), 3);
    assert_eq!(net.scores(&x).unwrap().dtype(), DType::F64);
}

#[test]
fn test_gradient_step_reduces_loss() {
    let mut rng = seeded_rng(5);
    let config = NewConvNetConfig {
        input_dim: (2, 4, 4),
        num_filters_1: 2,
        num_filters_2: 2,
        filter_size_1: 3,
        filter_size_2: 3,
        hidden_dim: 6,
        num_classes: 3,
        weight_scale: 0.2,
        reg: 0.01,
    };
    let mut net: NewConvNet<f64> = NewConvNet::new(config, &mut rng).unwrap();
    let (x, labels) = random_batch::<f64>(&mut rng, 4, (2, 4, 4), 3);

    let (before, grads) = net.loss_and_grads(&x, &labels).unwrap();
    for ((_, p), (_, g)) in net
        .params_mut()
        .named_parameters_mut()
        .into_iter()
        .zip(grads.named_parameters())
    {
        p.add_scaled_(g, -1e-3).unwrap();
    }
    let (after, _) = net.loss_and_grads(&x, &labels).unwrap();
    assert!(after < before, "loss went from {} to {}", before, after);
}

#[test]
fn test_predict_and_accuracy() {
    // Hand-set parameters: the class is decided by the sign of the input mean.
    let config = ThreeLayerConvNetConfig {
        input_dim: (1, 2, 2),
        num_filters: 1,
        filter_size: 1,
        hidden_dim: 2,
        num_classes: 2,
        weight_scale: 0.0,
        reg: 0.0,
    };
    let mut net: ThreeLayerConvNet<f64> = ThreeLayerConvNet::new(config, &mut seeded_rng(0)).unwrap();
    {
        let p = net.params_mut();
        p.w1 = Tensor::new(vec![1.0], vec![1, 1, 1, 1]).unwrap();
        p.w2 = Tensor::new(vec![1.0, 0.0], vec![1, 2]).unwrap();
        p.w3 = Tensor::new(vec![-1.0, 1.0, 0.0, 0.0], vec![2, 2]).unwrap();
    }
    // Positive samples score (-m, m) for their pooled max m, negative ones (0, 0)
    let x = Tensor::new(
        vec![1.0, 2.0, 3.0, 4.0, -1.0, -2.0, -3.0, -4.0, 0.5, 0.0, 0.0, 0.0],
        vec![3, 1, 2, 2],
    )
    .unwrap();
    let scores = net.scores(&x).unwrap();
    check_tensor_near(&scores, &[3, 2], &[-4.0, 4.0, 0.0, 0.0, -0.5, 0.5], 1e-12);
    assert_eq!(net.predict(&x).unwrap(), vec![1, 0, 1]);
    assert_relative_eq!(net.accuracy(&x, &[1, 0, 0]).unwrap(), 2.0 / 3.0);
    assert_eq!(
        net.accuracy(&x, &[1]).unwrap_err(),
        ConvNetError::BatchSizeMismatch { inputs: 3, labels: 1 }
    );
}

#[test]
fn test_loss_output_accessors() {
    let scores: LossOutput<f32, ()> = LossOutput::Scores(zeros(&[1, 2]).unwrap());
    assert!(scores.clone().into_loss_and_grads().is_none());
    assert_eq!(scores.into_scores().unwrap().shape(), &[1, 2]);
    let loss: LossOutput<f32, ()> = LossOutput::LossAndGrads { loss: 1.5, grads: () };
    assert_eq!(loss.into_loss_and_grads(), Some((1.5, ())));
}
