use super::Tensor;
use crate::error::ConvNetError;
use crate::ops::traits::ConvNumeric;

impl<T: ConvNumeric> Tensor<T> {
    /// Matrix product of two rank-2 tensors: `[m, k] x [k, n] -> [m, n]`.
    pub fn matmul(&self, other: &Tensor<T>) -> Result<Tensor<T>, ConvNetError> {
        self.expect_rank(2, "matmul")?;
        other.expect_rank(2, "matmul")?;
        let (m, k) = (self.shape()[0], self.shape()[1]);
        let (k2, n) = (other.shape()[0], other.shape()[1]);
        if k != k2 {
            return Err(ConvNetError::ShapeMismatch {
                expected: vec![k, n],
                actual: other.shape().to_vec(),
                operation: "matmul".to_string(),
            });
        }

        let a = self.data();
        let b = other.data();
        let mut out = vec![T::zero(); m * n];
        for i in 0..m {
            let row = &mut out[i * n..(i + 1) * n];
            for p in 0..k {
                let a_ip = a[i * k + p];
                let b_row = &b[p * n..(p + 1) * n];
                for (o, &b_pj) in row.iter_mut().zip(b_row) {
                    *o += a_ip * b_pj;
                }
            }
        }
        Tensor::new(out, vec![m, n])
    }

    /// Transpose of a rank-2 tensor.
    pub fn transpose(&self) -> Result<Tensor<T>, ConvNetError> {
        self.expect_rank(2, "transpose")?;
        let (rows, cols) = (self.shape()[0], self.shape()[1]);
        let src = self.data();
        let mut out = vec![T::zero(); rows * cols];
        for r in 0..rows {
            for c in 0..cols {
                out[c * rows + r] = src[r * cols + c];
            }
        }
        Tensor::new(out, vec![cols, rows])
    }
}
