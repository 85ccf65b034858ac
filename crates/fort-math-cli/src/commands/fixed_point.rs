use clap::Args;
use serde_json::Value;

use fort_math_core::fixed_point::{self, FixedPointInput, NumericValue};
use fort_math_core::DEFAULT_DECIMALS;

use crate::input;

/// Arguments for encoding a human value as a raw integer
#[derive(Args)]
pub struct ToFixedArgs {
    /// Human decimal value (e.g. 2450.5)
    #[arg(long, allow_hyphen_values = true)]
    pub value: Option<String>,

    /// Fractional digits of the target token
    #[arg(long, env = "FORTM_DECIMALS", default_value_t = DEFAULT_DECIMALS)]
    pub decimals: u32,

    /// Scale the decimal text exactly instead of capturing six digits
    #[arg(long)]
    pub exact: bool,

    /// Path to JSON or YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for decoding a raw integer to a decimal string
#[derive(Args)]
pub struct ToDecimalArgs {
    /// Raw integer amount (e.g. 1500000000000000000)
    #[arg(long, allow_hyphen_values = true)]
    pub raw: Option<String>,

    /// Fractional digits of the source token
    #[arg(long, env = "FORTM_DECIMALS", default_value_t = DEFAULT_DECIMALS)]
    pub decimals: u32,

    /// Path to JSON or YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_to_fixed(args: ToFixedArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let decimals = args.decimals;
    let exact = args.exact;
    let conv_input: FixedPointInput = input::resolve(
        args.input.as_deref(),
        || {
            Ok(args.value.map(|v| FixedPointInput::Encode {
                value: NumericValue::Text(v),
                decimals,
                exact,
            }))
        },
        "--value <number>, --input <file> or stdin required for to-fixed",
    )?;
    if !matches!(conv_input, FixedPointInput::Encode { .. }) {
        return Err("to-fixed expects \"direction\": \"encode\"; use to-decimal to decode".into());
    }
    let result = fixed_point::convert(&conv_input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_to_decimal(args: ToDecimalArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let decimals = args.decimals;
    let conv_input: FixedPointInput = input::resolve(
        args.input.as_deref(),
        || Ok(args.raw.map(|raw| FixedPointInput::Decode { raw, decimals })),
        "--raw <integer>, --input <file> or stdin required for to-decimal",
    )?;
    if !matches!(conv_input, FixedPointInput::Decode { .. }) {
        return Err("to-decimal expects \"direction\": \"decode\"; use to-fixed to encode".into());
    }
    let result = fixed_point::convert(&conv_input)?;
    Ok(serde_json::to_value(result)?)
}
