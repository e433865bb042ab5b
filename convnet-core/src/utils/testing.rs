use crate::ops::traits::ConvNumeric;
use crate::tensor::Tensor;

/// Checks that two tensors are approximately equal (shape and data within
/// an absolute tolerance).
/// Panics if shapes differ or any element differs by more than `tolerance`.
pub fn check_tensor_near<T: ConvNumeric>(
    actual: &Tensor<T>,
    expected_shape: &[usize],
    expected_data: &[T],
    tolerance: T,
) {
    assert_eq!(actual.shape(), expected_shape, "Shape mismatch");
    assert_eq!(
        actual.numel(),
        expected_data.len(),
        "Data length mismatch"
    );

    for (i, (a, e)) in actual.data().iter().zip(expected_data.iter()).enumerate() {
        let diff = (*a - *e).abs();
        if !(diff <= tolerance) {
            panic!(
                "Data mismatch at index {}: actual={:?}, expected={:?}, diff={:?}, tolerance={:?}",
                i, a, e, diff, tolerance
            );
        }
    }
}
