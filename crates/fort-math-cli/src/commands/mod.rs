pub mod cdf;
pub mod fixed_point;
pub mod pricing;
