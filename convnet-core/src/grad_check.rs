//! Finite-difference gradient checking for layers and classifiers.

use crate::classifiers::Classifier;
use crate::error::ConvNetError;
use crate::nn::parameters::NamedParameters;
use crate::ops::traits::ConvNumeric;
use crate::tensor::{zeros_like, Tensor};
use log::debug;
use thiserror::Error;

/// Error type specifically for gradient checking failures.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GradCheckError {
    #[error("Gradient check failed for parameter {parameter} at element {element_index}: analytical {analytical_grad:?} != numerical {numerical_grad:?} (relative error {relative_error:e})")]
    GradientMismatch {
        parameter: String,
        element_index: usize,
        analytical_grad: f64,
        numerical_grad: f64,
        relative_error: f64,
    },

    #[error("Unknown parameter {0}")]
    UnknownParameter(String),

    #[error("Numerical gradient is NaN or infinite for parameter {parameter}, element {element_index}. Loss+: {loss_plus:?}, Loss-: {loss_minus:?}")]
    NumericalGradNaNOrInfinite {
        parameter: String,
        element_index: usize,
        loss_plus: f64,
        loss_minus: f64,
    },

    #[error("Tensor error during gradient check: {0}")]
    TensorError(ConvNetError),
}

impl From<ConvNetError> for GradCheckError {
    fn from(err: ConvNetError) -> Self {
        GradCheckError::TensorError(err)
    }
}

/// Maximum element-wise relative error `|a - b| / max(1e-8, |a| + |b|)`.
///
/// Tensors of different shapes compare as infinitely far apart.
pub fn rel_error<T: ConvNumeric>(a: &Tensor<T>, b: &Tensor<T>) -> f64 {
    if a.shape() != b.shape() {
        return f64::INFINITY;
    }
    a.data()
        .iter()
        .zip(b.data())
        .map(|(&x, &y)| element_rel_error(x.as_f64(), y.as_f64()))
        .fold(0.0, f64::max)
}

fn element_rel_error(a: f64, b: f64) -> f64 {
    (a - b).abs() / (a.abs() + b.abs()).max(1e-8)
}

/// Centered finite-difference gradient of a scalar function `f` at `x`.
pub fn eval_numerical_gradient<T, F>(
    mut f: F,
    x: &Tensor<T>,
    h: f64,
) -> Result<Tensor<T>, ConvNetError>
where
    T: ConvNumeric,
    F: FnMut(&Tensor<T>) -> Result<T, ConvNetError>,
{
    let mut probe = x.clone();
    let mut grad = zeros_like(x)?;
    let step = T::from_f64(h);
    let two_h = T::from_f64(2.0 * h);
    for i in 0..x.numel() {
        let original = probe.data()[i];
        probe.data_mut()[i] = original + step;
        let plus = f(&probe)?;
        probe.data_mut()[i] = original - step;
        let minus = f(&probe)?;
        probe.data_mut()[i] = original;
        grad.data_mut()[i] = (plus - minus) / two_h;
    }
    Ok(grad)
}

/// Centered finite-difference gradient of a tensor-valued function `f`,
/// contracted with the upstream gradient `dout`.
pub fn eval_numerical_gradient_array<T, F>(
    mut f: F,
    x: &Tensor<T>,
    dout: &Tensor<T>,
    h: f64,
) -> Result<Tensor<T>, ConvNetError>
where
    T: ConvNumeric,
    F: FnMut(&Tensor<T>) -> Result<Tensor<T>, ConvNetError>,
{
    let mut probe = x.clone();
    let mut grad = zeros_like(x)?;
    let step = T::from_f64(h);
    let two_h = T::from_f64(2.0 * h);
    for i in 0..x.numel() {
        let original = probe.data()[i];
        probe.data_mut()[i] = original + step;
        let plus = f(&probe)?;
        probe.data_mut()[i] = original - step;
        let minus = f(&probe)?;
        probe.data_mut()[i] = original;
        plus.expect_shape(dout.shape(), "eval_numerical_gradient_array")?;
        let directional: T = plus
            .data()
            .iter()
            .zip(minus.data())
            .zip(dout.data())
            .map(|((&p, &m), &g)| (p - m) * g)
            .sum();
        grad.data_mut()[i] = directional / two_h;
    }
    Ok(grad)
}

/// Numerical gradient of a classifier's regularized loss with respect to the
/// parameter `name`.
///
/// Each entry is perturbed in place and restored before the next one, so the
/// network is unchanged on return.
pub fn numerical_parameter_gradient<T, C>(
    net: &mut C,
    name: &str,
    x: &Tensor<T>,
    labels: &[usize],
    h: f64,
) -> Result<Tensor<T>, GradCheckError>
where
    T: ConvNumeric,
    C: Classifier<T>,
{
    let numel = net
        .params()
        .parameter(name)
        .ok_or_else(|| GradCheckError::UnknownParameter(name.to_string()))?
        .numel();
    let step = T::from_f64(h);
    let mut grad = Vec::with_capacity(numel);
    for i in 0..numel {
        let original = set_entry(net, name, i, None)?;
        set_entry(net, name, i, Some(original + step))?;
        let plus = net.loss_and_grads(x, labels);
        set_entry(net, name, i, Some(original - step))?;
        let minus = net.loss_and_grads(x, labels);
        // Restore before any error is propagated
        set_entry(net, name, i, Some(original))?;
        let ((loss_plus, _), (loss_minus, _)) = (plus?, minus?);

        let numerical = (loss_plus.as_f64() - loss_minus.as_f64()) / (2.0 * h);
        if !numerical.is_finite() {
            return Err(GradCheckError::NumericalGradNaNOrInfinite {
                parameter: name.to_string(),
                element_index: i,
                loss_plus: loss_plus.as_f64(),
                loss_minus: loss_minus.as_f64(),
            });
        }
        grad.push(T::from_f64(numerical));
    }
    let shape = net
        .params()
        .parameter(name)
        .map(|p| p.shape().to_vec())
        .unwrap_or_default();
    Ok(Tensor::new(grad, shape)?)
}

// Returns entry `index` of parameter `name`, overwriting it with `value` when given.
fn set_entry<T, C>(
    net: &mut C,
    name: &str,
    index: usize,
    value: Option<T>,
) -> Result<T, GradCheckError>
where
    T: ConvNumeric,
    C: Classifier<T>,
{
    let param = net
        .params_mut()
        .parameter_mut(name)
        .ok_or_else(|| GradCheckError::UnknownParameter(name.to_string()))?;
    let slot = &mut param.data_mut()[index];
    let previous = *slot;
    if let Some(v) = value {
        *slot = v;
    }
    Ok(previous)
}

/// Compares every parameter's analytic gradient against a numerical one.
///
/// `tolerance` maps a parameter name to the largest acceptable relative
/// error. Returns the relative error of each parameter, in parameter order,
/// or a `GradientMismatch` naming the worst element of the first parameter
/// over its tolerance.
pub fn check_classifier_gradients<T, C, Tol>(
    net: &mut C,
    x: &Tensor<T>,
    labels: &[usize],
    h: f64,
    tolerance: Tol,
) -> Result<Vec<(&'static str, f64)>, GradCheckError>
where
    T: ConvNumeric,
    C: Classifier<T>,
    Tol: Fn(&str) -> f64,
{
    let (_, grads) = net.loss_and_grads(x, labels)?;
    let names: Vec<&'static str> = net
        .params()
        .named_parameters()
        .into_iter()
        .map(|(n, _)| n)
        .collect();

    let mut report = Vec::with_capacity(names.len());
    for name in names {
        let analytic = grads
            .parameter(name)
            .ok_or_else(|| GradCheckError::UnknownParameter(name.to_string()))?;
        let numerical = numerical_parameter_gradient(net, name, x, labels, h)?;
        let error = rel_error(analytic, &numerical);
        debug!("grad check {}: relative error {:e}", name, error);

        if error > tolerance(name) {
            let (element_index, analytical_grad, numerical_grad, relative_error) = analytic
                .data()
                .iter()
                .zip(numerical.data())
                .enumerate()
                .map(|(i, (&a, &n))| {
                    let (a, n) = (a.as_f64(), n.as_f64());
                    (i, a, n, element_rel_error(a, n))
                })
                .fold((0, 0.0, 0.0, f64::NEG_INFINITY), |worst, cur| {
                    if cur.3 > worst.3 {
                        cur
                    } else {
                        worst
                    }
                });
            return Err(GradCheckError::GradientMismatch {
                parameter: name.to_string(),
                element_index,
                analytical_grad,
                numerical_grad,
                relative_error,
            });
        }
        report.push((name, error));
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_rel_error() {
        let a = Tensor::new(vec![1.0_f64, 2.0, 0.0], vec![3]).unwrap();
        let b = Tensor::new(vec![1.0_f64, 2.2, 0.0], vec![3]).unwrap();
        assert_relative_eq!(rel_error(&a, &b), 0.2 / 4.2, epsilon = 1e-15);
        assert_eq!(rel_error(&a, &a), 0.0);
        let c = Tensor::new(vec![1.0_f64, 2.0, 0.0], vec![3, 1]).unwrap();
        assert_eq!(rel_error(&a, &c), f64::INFINITY);
    }

    #[test]
    fn test_eval_numerical_gradient_of_sum_of_squares() {
        let x = Tensor::new(vec![-1.5_f64, 0.0, 2.0, 0.25], vec![2, 2]).unwrap();
        let grad = eval_numerical_gradient(|t| Ok(t.sum_squares()), &x, 1e-5).unwrap();
        let expected = x.map(|v| 2.0 * v);
        assert!(rel_error(&grad, &expected) < 1e-8);
        // The probe is restored between entries
        assert_eq!(x.data(), &[-1.5, 0.0, 2.0, 0.25]);
    }

    #[test]
    fn test_eval_numerical_gradient_array_contracts_with_dout() {
        let x = Tensor::new(vec![1.0_f64, -2.0, 3.0], vec![3]).unwrap();
        let dout = Tensor::new(vec![0.5_f64, 1.0, -1.0], vec![3]).unwrap();
        // f(x) = 3x element-wise, so the contracted gradient is 3 * dout
        let grad =
            eval_numerical_gradient_array(|t| Ok(t.map(|v| 3.0 * v)), &x, &dout, 1e-5).unwrap();
        for (g, d) in grad.data().iter().zip(dout.data()) {
            assert_relative_eq!(*g, 3.0 * d, epsilon = 1e-8);
        }
    }

    #[test]
    fn test_eval_numerical_gradient_array_shape_check() {
        let x = Tensor::new(vec![1.0_f64, 2.0], vec![2]).unwrap();
        let dout = Tensor::new(vec![1.0_f64; 3], vec![3]).unwrap();
        let result = eval_numerical_gradient_array(|t| Ok(t.clone()), &x, &dout, 1e-5);
        assert!(matches!(result, Err(ConvNetError::ShapeMismatch { .. })));
    }
}
