use clap::Args;
use serde_json::Value;

use fort_math_core::normal_cdf::CdfMethod;
use fort_math_core::pricing::channel::{self, OptionQuoteInput};
use fort_math_core::pricing::options::{self, OptionValueInput};

use crate::input;

/// Arguments for drift-adjusted option values
#[derive(Args)]
pub struct PriceArgs {
    /// Spot price S0
    #[arg(long, allow_negative_numbers = true)]
    pub spot: Option<f64>,

    /// Strike price K
    #[arg(long, allow_negative_numbers = true)]
    pub strike: Option<f64>,

    /// Volatility sigma per unit of time
    #[arg(long, alias = "sigma")]
    pub volatility: Option<f64>,

    /// Drift miu per unit of time
    #[arg(long, alias = "miu", default_value_t = 0.0, allow_negative_numbers = true)]
    pub drift: f64,

    /// Time to expiry, in the unit sigma and miu are quoted in
    #[arg(long)]
    pub time: Option<f64>,

    /// Normal CDF approximation
    #[arg(long, env = "FORTM_CDF_METHOD", default_value = "table")]
    pub method: CdfMethod,

    /// Path to JSON or YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for quoting an option against a pricing channel
#[derive(Args)]
pub struct QuoteArgs {
    /// Path to JSON or YAML input file with spot, strike, amount and channel
    #[arg(long)]
    pub input: Option<String>,
}

fn price_from_flags(args: PriceArgs) -> Result<Option<OptionValueInput>, Box<dyn std::error::Error>> {
    if args.spot.is_none() && args.strike.is_none() && args.volatility.is_none() && args.time.is_none() {
        return Ok(None);
    }
    Ok(Some(OptionValueInput {
        spot_price: args.spot.ok_or("--spot is required (or provide --input)")?,
        strike_price: args.strike.ok_or("--strike is required (or provide --input)")?,
        volatility: args
            .volatility
            .ok_or("--volatility is required (or provide --input)")?,
        drift: args.drift,
        time_to_expiry: args.time.ok_or("--time is required (or provide --input)")?,
        cdf_method: args.method,
    }))
}

pub fn run_price(args: PriceArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let path = args.input.clone();
    let opt_input: OptionValueInput = input::resolve(
        path.as_deref(),
        || price_from_flags(args),
        "--spot/--strike/--volatility/--time, --input <file> or stdin required for price",
    )?;
    let result = options::price_option(&opt_input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_quote(args: QuoteArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let quote_input: OptionQuoteInput = input::resolve(
        args.input.as_deref(),
        || Ok(None),
        "--input <file> or stdin required for quote",
    )?;
    let result = channel::quote_option(&quote_input)?;
    Ok(serde_json::to_value(result)?)
}
