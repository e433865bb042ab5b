use super::Tensor;
use std::any::type_name;
use std::fmt;

const PREVIEW_LEN: usize = 8;

impl<T: fmt::Debug> fmt::Debug for Tensor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let preview = &self.data[..self.data.len().min(PREVIEW_LEN)];
        write!(
            f,
            "Tensor(shape={:?}, dtype={}, data={:?}{})",
            self.shape,
            type_name::<T>(),
            preview,
            if self.data.len() > PREVIEW_LEN { " ..." } else { "" }
        )
    }
}
