use serde::{Deserialize, Serialize};

/// Spot and strike prices in human units. Pricing math runs in f64 to stay
/// bit-compatible with the off-chain scripts that drive the contracts.
pub type Price = f64;

/// Per-unit-time rates (volatility, drift), expressed as decimals.
pub type Rate = f64;

/// Time to expiry in the same unit the rates are quoted in.
pub type Horizon = f64;

/// Fractional digits used by ERC-20 style token amounts unless told otherwise.
pub const DEFAULT_DECIMALS: u32 = 18;

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "f64 pricing, i256 fixed-point".to_string(),
        },
    }
}
