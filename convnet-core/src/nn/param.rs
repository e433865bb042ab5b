use crate::error::ConvNetError;

/// Convolution options: stride and symmetric zero padding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConvParam {
    pub stride: usize,
    pub pad: usize,
}

impl ConvParam {
    /// Stride 1 with padding `(filter_size - 1) / 2`, which preserves the
    /// spatial size for odd filter sizes.
    pub fn same(filter_size: usize) -> Self {
        ConvParam {
            stride: 1,
            pad: filter_size.saturating_sub(1) / 2,
        }
    }

    /// Output `(height, width)` of a convolution with a `filter_h x filter_w`
    /// kernel over an `height x width` input.
    pub fn output_size(
        &self,
        height: usize,
        width: usize,
        filter_h: usize,
        filter_w: usize,
    ) -> Result<(usize, usize), ConvNetError> {
        if self.stride == 0 {
            return Err(ConvNetError::ConvGeometry("stride must be positive".to_string()));
        }
        let padded_h = height + 2 * self.pad;
        let padded_w = width + 2 * self.pad;
        if filter_h == 0 || filter_w == 0 || filter_h > padded_h || filter_w > padded_w {
            return Err(ConvNetError::ConvGeometry(format!(
                "filter {}x{} does not fit padded input {}x{}",
                filter_h, filter_w, padded_h, padded_w
            )));
        }
        if (padded_h - filter_h) % self.stride != 0 || (padded_w - filter_w) % self.stride != 0 {
            return Err(ConvNetError::ConvGeometry(format!(
                "stride {} does not tile padded input {}x{} with filter {}x{}",
                self.stride, padded_h, padded_w, filter_h, filter_w
            )));
        }
        Ok((
            1 + (padded_h - filter_h) / self.stride,
            1 + (padded_w - filter_w) / self.stride,
        ))
    }
}

/// Max-pooling window and stride.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolParam {
    pub pool_height: usize,
    pub pool_width: usize,
    pub stride: usize,
}

impl PoolParam {
    /// 2x2 window, stride 2: halves both spatial dimensions.
    pub fn halving() -> Self {
        PoolParam {
            pool_height: 2,
            pool_width: 2,
            stride: 2,
        }
    }

    /// 1x1 window, stride 1: passes the input through unchanged.
    pub fn identity() -> Self {
        PoolParam {
            pool_height: 1,
            pool_width: 1,
            stride: 1,
        }
    }

    /// Output `(height, width)`, flooring when the window does not tile the
    /// input exactly.
    pub fn output_size(&self, height: usize, width: usize) -> Result<(usize, usize), ConvNetError> {
        if self.stride == 0 || self.pool_height == 0 || self.pool_width == 0 {
            return Err(ConvNetError::PoolGeometry(format!(
                "window {}x{} and stride {} must be positive",
                self.pool_height, self.pool_width, self.stride
            )));
        }
        if self.pool_height > height || self.pool_width > width {
            return Err(ConvNetError::PoolGeometry(format!(
                "window {}x{} is larger than input {}x{}",
                self.pool_height, self.pool_width, height, width
            )));
        }
        Ok((
            1 + (height - self.pool_height) / self.stride,
            1 + (width - self.pool_width) / self.stride,
        ))
    }
}
