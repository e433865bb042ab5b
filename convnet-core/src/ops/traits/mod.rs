pub mod numeric;

pub use numeric::ConvNumeric;
