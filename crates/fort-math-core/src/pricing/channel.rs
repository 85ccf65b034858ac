//! Quotes in the units the option contracts use.
//!
//! A token is registered with a pricing channel carrying `sigmaSQ`,
//! `miuLong` and `miuShort`, each an 18-decimal fixed-point number per
//! second. Options are opened with a raw strike, a call/put flag, an expiry
//! counted in blocks and a raw amount. This module turns those into the
//! human values [`super::options`] prices with.

use alloy_primitives::{I256, U256};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::debug;

use super::options::{self, OptionType, OptionValueInput};
use crate::error::FortMathError;
use crate::fixed_point::{encode_captured, FixedPointValue, NumericValue, CAPTURED_DIGITS};
use crate::normal_cdf::CdfMethod;
use crate::types::*;
use crate::FortMathResult;

/// Decimals of the channel's sigma and miu parameters.
pub const CHANNEL_DECIMALS: u32 = 18;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelParams {
    #[serde(default)]
    pub channel_id: u16,
    #[serde(default)]
    pub pair_index: u16,
    /// Variance per second, 18 decimals.
    pub sigma_sq: u64,
    /// Drift per second applied to calls, 18 decimals.
    pub miu_long: u64,
    /// Drift per second applied to puts, 18 decimals.
    #[serde(default)]
    pub miu_short: u64,
}

fn channel_value(raw: u64) -> FortMathResult<f64> {
    FixedPointValue::new(I256::from_raw(U256::from(raw)), CHANNEL_DECIMALS).to_f64()
}

impl ChannelParams {
    /// Volatility per square-root second.
    pub fn sigma(&self) -> FortMathResult<Rate> {
        Ok(channel_value(self.sigma_sq)?.sqrt())
    }

    /// Drift per second for the given side.
    pub fn miu(&self, option_type: OptionType) -> FortMathResult<Rate> {
        match option_type {
            OptionType::Call => channel_value(self.miu_long),
            OptionType::Put => channel_value(self.miu_short),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionQuoteInput {
    pub spot_price: NumericValue,
    pub strike: FixedPointValue,
    pub option_type: OptionType,
    pub expiry_blocks: u64,
    pub block_time_secs: f64,
    pub amount: FixedPointValue,
    pub channel: ChannelParams,
    #[serde(default)]
    pub cdf_method: CdfMethod,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionQuoteOutput {
    pub option_type: OptionType,
    pub sigma: Rate,
    pub miu: Rate,
    pub time_to_expiry_secs: Horizon,
    pub spot_price: Price,
    pub strike_price: Price,
    pub d1: f64,
    pub unit_value: Price,
    pub amount: f64,
    pub total_value: Price,
    /// `total_value` encoded at 18 decimals.
    pub total_value_fixed: FixedPointValue,
}

fn validate_quote_input(input: &OptionQuoteInput) -> FortMathResult<()> {
    if input.expiry_blocks == 0 {
        return Err(FortMathError::invalid("expiry_blocks", "must be positive"));
    }
    if !(input.block_time_secs.is_finite() && input.block_time_secs > 0.0) {
        return Err(FortMathError::invalid("block_time_secs", "must be positive"));
    }
    if input.channel.sigma_sq == 0 {
        return Err(FortMathError::invalid("channel.sigma_sq", "must be positive"));
    }
    if input.amount.is_negative() {
        return Err(FortMathError::invalid("amount", "must not be negative"));
    }
    Ok(())
}

pub fn quote_option(
    input: &OptionQuoteInput,
) -> FortMathResult<ComputationOutput<OptionQuoteOutput>> {
    let start = Instant::now();
    validate_quote_input(input)?;

    let sigma = input.channel.sigma()?;
    let miu = input.channel.miu(input.option_type)?;
    let t = input.expiry_blocks as f64 * input.block_time_secs;
    let spot = input.spot_price.as_f64()?;
    let strike = input.strike.to_f64()?;
    let amount = input.amount.to_f64()?;

    let pricing = OptionValueInput {
        spot_price: spot,
        strike_price: strike,
        volatility: sigma,
        drift: miu,
        time_to_expiry: t,
        cdf_method: input.cdf_method,
    };
    options::validate_pricing_input(&pricing)?;
    let (priced, mut warnings) = options::compute(&pricing)?;

    let unit_value = match input.option_type {
        OptionType::Call => priced.call_value,
        OptionType::Put => priced.put_value,
    };
    let total_value = unit_value * amount;
    let (total_value_fixed, total_lossy) = encode_captured(total_value, DEFAULT_DECIMALS)?;

    if total_lossy {
        warnings.push(format!(
            "total_value_fixed keeps {CAPTURED_DIGITS} fractional digits of {total_value}"
        ));
    }
    if input.strike.decimals() != input.amount.decimals() {
        warnings.push(format!(
            "Strike uses {} decimals and amount uses {}; total value is in strike units",
            input.strike.decimals(),
            input.amount.decimals()
        ));
    }

    debug!(
        option_type = ?input.option_type,
        sigma,
        miu,
        t,
        unit_value,
        total_value,
        "quoted option"
    );

    let output = OptionQuoteOutput {
        option_type: input.option_type,
        sigma,
        miu,
        time_to_expiry_secs: t,
        spot_price: spot,
        strike_price: strike,
        d1: priced.d1,
        unit_value,
        amount,
        total_value,
        total_value_fixed,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Channel parameters per second, drift-adjusted Black-Scholes",
        input,
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // ETH channel as registered on the test networks
    fn eth_channel() -> ChannelParams {
        ChannelParams {
            channel_id: 0,
            pair_index: 1,
            sigma_sq: 45_659_142_400,
            miu_long: 64_051_194_700,
            miu_short: 0,
        }
    }

    fn sample_quote(option_type: OptionType) -> OptionQuoteInput {
        OptionQuoteInput {
            spot_price: NumericValue::Integer(2450),
            strike: FixedPointValue::from_raw_str("2450000000", 6).unwrap(),
            option_type,
            expiry_blocks: 1000,
            block_time_secs: 3.0,
            amount: FixedPointValue::from_raw_str("1000000000000000000", 18).unwrap(),
            channel: eth_channel(),
            cdf_method: CdfMethod::Table,
        }
    }

    #[test]
    fn test_channel_sigma_and_miu() {
        let ch = eth_channel();
        assert!((ch.sigma().unwrap() - 0.00021368).abs() < 1e-12);
        assert!((ch.miu(OptionType::Call).unwrap() - 6.40511947e-8).abs() < 1e-18);
        assert_eq!(ch.miu(OptionType::Put).unwrap(), 0.0);
    }

    #[test]
    fn test_quote_call_and_put() {
        let call = quote_option(&sample_quote(OptionType::Call)).unwrap();
        let put = quote_option(&sample_quote(OptionType::Put)).unwrap();
        assert_eq!(call.result.time_to_expiry_secs, 3000.0);
        assert_eq!(call.result.strike_price, 2450.0);
        assert!(call.result.unit_value > 0.0);
        assert!(put.result.unit_value > 0.0);
        // the call carries the long drift, so it is worth more at the money
        assert!(call.result.unit_value > put.result.unit_value);
        assert_eq!(call.result.amount, 1.0);
        assert_eq!(call.result.total_value, call.result.unit_value);
        assert_eq!(call.result.total_value_fixed.decimals(), 18);
        // strike (6) and amount (18) decimals differ
        assert!(call.warnings.iter().any(|w| w.contains("decimals")));
    }

    #[test]
    fn test_quote_flags_truncated_total() {
        let out = quote_option(&sample_quote(OptionType::Call)).unwrap();
        let total = out.result.total_value;
        // the unit value carries far more than six fractional digits
        assert_ne!((total * 1e6).round() / 1e6, total);
        assert!(out
            .warnings
            .iter()
            .any(|w| w.contains("total_value_fixed keeps 6 fractional digits")));
        let fixed = out.result.total_value_fixed.to_decimal_string();
        assert!(fixed.ends_with("000000000000"), "got {fixed}");
    }

    #[test]
    fn test_quote_exact_total_has_no_precision_warning() {
        // deep in the money with the table saturated: call = S*(1+miu*T) - K
        let input = OptionQuoteInput {
            spot_price: NumericValue::Integer(1000),
            strike: FixedPointValue::from_raw_str("10000000000000000000", 18).unwrap(),
            channel: ChannelParams {
                miu_long: 0,
                ..eth_channel()
            },
            ..sample_quote(OptionType::Call)
        };
        let out = quote_option(&input).unwrap();
        assert_eq!(out.result.total_value, 990.0);
        assert!(out.warnings.iter().all(|w| !w.contains("total_value_fixed")));
        assert_eq!(
            out.result.total_value_fixed.raw().to_string(),
            "990000000000000000000"
        );
    }

    #[test]
    fn test_quote_rejects_zero_expiry() {
        let input = OptionQuoteInput {
            expiry_blocks: 0,
            ..sample_quote(OptionType::Call)
        };
        assert!(matches!(
            quote_option(&input),
            Err(FortMathError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_quote_rejects_negative_amount() {
        let input = OptionQuoteInput {
            amount: FixedPointValue::from_raw_str("-1", 18).unwrap(),
            ..sample_quote(OptionType::Put)
        };
        assert!(quote_option(&input).is_err());
    }

    #[test]
    fn test_quote_input_from_json() {
        let json = r#"{
            "spot_price": "2450.5",
            "strike": { "raw": "2450000000", "decimals": 6 },
            "option_type": "call",
            "expiry_blocks": 1000,
            "block_time_secs": 3,
            "amount": { "raw": "1000000000000000000", "decimals": 18 },
            "channel": { "sigma_sq": 45659142400, "miu_long": 64051194700 }
        }"#;
        let input: OptionQuoteInput = serde_json::from_str(json).unwrap();
        assert_eq!(input.channel.miu_short, 0);
        assert_eq!(input.cdf_method, CdfMethod::Table);
        let out = quote_option(&input).unwrap();
        assert_eq!(out.result.spot_price, 2450.5);
    }
}
