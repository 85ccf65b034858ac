pub mod error;
pub mod fixed_point;
pub mod normal_cdf;
pub mod types;

#[cfg(feature = "pricing")]
pub mod pricing;

pub use error::FortMathError;
pub use types::*;

/// Standard result type for all fort-math operations
pub type FortMathResult<T> = Result<T, FortMathError>;
