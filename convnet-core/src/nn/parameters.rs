use crate::ops::traits::ConvNumeric;
use crate::tensor::Tensor;

/// Access to a network's learnable tensors by their conventional names
/// (`"W1"`, `"b1"`, ...).
///
/// Implemented by the typed parameter structs, which double as gradient
/// stores: a gradient struct yields the same names in the same order as the
/// parameters it belongs to.
pub trait NamedParameters<T: ConvNumeric> {
    /// All tensors with their names, in a stable order.
    fn named_parameters(&self) -> Vec<(&'static str, &Tensor<T>)>;

    /// Mutable variant of [`named_parameters`](Self::named_parameters).
    fn named_parameters_mut(&mut self) -> Vec<(&'static str, &mut Tensor<T>)>;

    fn parameter(&self, name: &str) -> Option<&Tensor<T>> {
        self.named_parameters()
            .into_iter()
            .find(|(n, _)| *n == name)
            .map(|(_, t)| t)
    }

    fn parameter_mut(&mut self, name: &str) -> Option<&mut Tensor<T>> {
        self.named_parameters_mut()
            .into_iter()
            .find(|(n, _)| *n == name)
            .map(|(_, t)| t)
    }

    /// Total number of scalar entries.
    fn num_parameters(&self) -> usize {
        self.named_parameters().iter().map(|(_, t)| t.numel()).sum()
    }
}
