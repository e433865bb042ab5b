/// Element precision of a tensor.
///
/// Networks are generic over their element type; `DType` is the runtime tag
/// reported by tensors and networks for that type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DType {
    /// 32-bit floating-point type.
    F32,
    /// 64-bit floating-point type.
    F64,
}
