use napi::Result as NapiResult;
use napi_derive::napi;

use fort_math_core::fixed_point::{self, FixedPointValue, NumericValue};
use fort_math_core::normal_cdf;
use fort_math_core::pricing::{channel, options};
use fort_math_core::DEFAULT_DECIMALS;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

// ---------------------------------------------------------------------------
// Fixed point
// ---------------------------------------------------------------------------

/// `toFixedPoint("2450.5", 6)` -> `"2450500000"`. Accepts the same decimal
/// text the scripts pass around; the raw amount comes back as a string so
/// 256-bit values survive the trip into JavaScript.
#[napi]
pub fn to_fixed_point(value: String, decimals: Option<u32>) -> NapiResult<String> {
    let fixed = fixed_point::to_fixed_point(
        NumericValue::Text(value),
        decimals.unwrap_or(DEFAULT_DECIMALS),
    )
    .map_err(to_napi_error)?;
    Ok(fixed.raw().to_string())
}

#[napi]
pub fn to_decimal(raw: String, decimals: Option<u32>) -> NapiResult<String> {
    let fixed = FixedPointValue::from_raw_str(&raw, decimals.unwrap_or(DEFAULT_DECIMALS))
        .map_err(to_napi_error)?;
    Ok(fixed.to_decimal_string())
}

#[napi]
pub fn convert_fixed_point(input_json: String) -> NapiResult<String> {
    let input: fixed_point::FixedPointInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = fixed_point::convert(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Normal CDF
// ---------------------------------------------------------------------------

#[napi]
pub fn table_cdf(x: f64) -> f64 {
    normal_cdf::table_cdf(x)
}

/// Integrates up to `|x| = 40` and saturates beyond, so a stray argument
/// from JavaScript cannot stall the event loop.
#[napi]
pub fn brute_force_cdf(x: f64) -> f64 {
    normal_cdf::capped_brute_force_cdf(x)
}

#[napi]
pub fn evaluate_cdf(input_json: String) -> NapiResult<String> {
    let input: normal_cdf::CdfInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = normal_cdf::evaluate_cdf(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Option values
// ---------------------------------------------------------------------------

#[napi]
pub fn d1(s0: f64, k: f64, sigma: f64, miu: f64, t: f64) -> f64 {
    options::d1(s0, k, sigma, miu, t)
}

#[napi]
pub fn call_value(s0: f64, k: f64, sigma: f64, miu: f64, t: f64) -> f64 {
    options::call_value(s0, k, sigma, miu, t)
}

#[napi]
pub fn put_value(s0: f64, k: f64, sigma: f64, miu: f64, t: f64) -> f64 {
    options::put_value(s0, k, sigma, miu, t)
}

#[napi]
pub fn price_option(input_json: String) -> NapiResult<String> {
    let input: options::OptionValueInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = options::price_option(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn quote_option(input_json: String) -> NapiResult<String> {
    let input: channel::OptionQuoteInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = channel::quote_option(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}
