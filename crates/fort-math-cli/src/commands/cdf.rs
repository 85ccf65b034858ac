use clap::Args;
use serde_json::Value;

use fort_math_core::normal_cdf::{self, CdfInput, CdfMethod};

use crate::input;

/// Arguments for the standard normal CDF
#[derive(Args)]
pub struct CdfArgs {
    /// Point to evaluate Phi at
    #[arg(long, allow_negative_numbers = true)]
    pub x: Option<f64>,

    /// Evaluate a single method (table or brute_force); both when omitted
    #[arg(long)]
    pub method: Option<CdfMethod>,

    /// Path to JSON or YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_cdf(args: CdfArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let method = args.method;
    let cdf_input: CdfInput = input::resolve(
        args.input.as_deref(),
        || Ok(args.x.map(|x| CdfInput { x, method })),
        "--x <number>, --input <file> or stdin required for cdf",
    )?;
    let result = normal_cdf::evaluate_cdf(&cdf_input)?;
    Ok(serde_json::to_value(result)?)
}
