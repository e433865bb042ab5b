use super::*;
use crate::tensor::full;
use crate::types::DType;
use rand::rngs::StdRng;
use rand::SeedableRng;

#[test]
fn test_zeros_() {
    let mut t: Tensor<f32> = full(&[2, 3], 1.0).unwrap();
    zeros_(&mut t);
    assert_eq!(t.dtype(), DType::F32);
    assert!(t.data().iter().all(|&x| x == 0.0));
}

#[test]
fn test_normal_keeps_shape_and_changes_values() {
    let mut rng = StdRng::seed_from_u64(1);
    let mut t: Tensor<f64> = full(&[4, 5], 0.0).unwrap();
    normal_(&mut t, 1.0, &mut rng).unwrap();
    assert_eq!(t.shape(), &[4, 5]);
    assert!(t.data().iter().any(|&x| x != 0.0));
}

#[test]
fn test_gaussian_weight_scale() {
    let mut rng = StdRng::seed_from_u64(2);
    let w: Tensor<f64> = gaussian_weight(&[50, 40], 1e-3, &mut rng).unwrap();
    assert_eq!(w.shape(), &[50, 40]);
    assert!(w.max_abs() < 1e-2);
    let std = (w.sum_squares() / w.numel() as f64).sqrt();
    assert!((std - 1e-3).abs() < 1e-4, "std {}", std);
}

#[test]
fn test_zero_bias() {
    let b: Tensor<f32> = zero_bias(7).unwrap();
    assert_eq!(b.shape(), &[7]);
    assert_eq!(b.sum(), 0.0);
}
