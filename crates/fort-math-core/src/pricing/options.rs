use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, warn};

use crate::error::FortMathError;
use crate::normal_cdf::{CdfMethod, BRUTE_FORCE_LIMIT, TABLE_INTERVALS, TABLE_STEP};
use crate::types::*;
use crate::FortMathResult;

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptionType {
    Call,
    Put,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionValueInput {
    pub spot_price: Price,
    pub strike_price: Price,
    pub volatility: Rate,
    #[serde(default, alias = "miu")]
    pub drift: Rate,
    pub time_to_expiry: Horizon,
    #[serde(default)]
    pub cdf_method: CdfMethod,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionValueOutput {
    pub d1: f64,
    pub call_value: Price,
    pub put_value: Price,
    /// `S0 * (1 + miu * T)`
    pub forward_price: Price,
    /// `(call - put) - (forward - K)`; zero up to rounding.
    pub parity_residual: f64,
    pub call_intrinsic: Price,
    pub put_intrinsic: Price,
    pub moneyness: String,
}

// ---------------------------------------------------------------------------
// Formulas
// ---------------------------------------------------------------------------

/// `(ln(K/S0) + (sigma^2/2 - miu) * T) / sigma`
///
/// Unchecked: `S0 <= 0`, `K <= 0`, `sigma == 0` or `T <= 0` give NaN or
/// infinite output rather than an error. [`price_option`] validates first.
#[inline]
pub fn d1(s0: Price, k: Price, sigma: Rate, miu: Rate, t: Horizon) -> f64 {
    ((k / s0).ln() + (sigma * sigma / 2.0 - miu) * t) / sigma
}

/// The pieces shared by the call and put values.
struct DriftTerms {
    forward: f64,
    /// `d1/sqrt(T) - sigma*sqrt(T)`, the spot-leg CDF argument
    spot_arg: f64,
    /// `d1/sqrt(T)`, the strike-leg CDF argument
    strike_arg: f64,
}

fn drift_terms(s0: Price, k: Price, sigma: Rate, miu: Rate, t: Horizon) -> DriftTerms {
    let d1v = d1(s0, k, sigma, miu, t);
    let sqrt_t = t.sqrt();
    DriftTerms {
        forward: s0 * (1.0 + miu * t),
        spot_arg: d1v / sqrt_t - sigma * sqrt_t,
        strike_arg: d1v / sqrt_t,
    }
}

/// Drift-adjusted call value with the table CDF.
///
/// `S0*(1 + miu*T)*(1 - N(d1/sqrt(T) - sigma*sqrt(T))) - K*(1 - N(d1/sqrt(T)))`
///
/// The drift enters as a linear multiplier on the forward price, matching
/// the contracts' own formula rather than risk-neutral discounting.
pub fn call_value(s0: Price, k: Price, sigma: Rate, miu: Rate, t: Horizon) -> Price {
    call_value_with(CdfMethod::Table, s0, k, sigma, miu, t)
}

/// Drift-adjusted put value with the table CDF.
///
/// `K*N(d1/sqrt(T)) - S0*(1 + miu*T)*N(d1/sqrt(T) - sigma*sqrt(T))`
pub fn put_value(s0: Price, k: Price, sigma: Rate, miu: Rate, t: Horizon) -> Price {
    put_value_with(CdfMethod::Table, s0, k, sigma, miu, t)
}

pub fn call_value_with(
    method: CdfMethod,
    s0: Price,
    k: Price,
    sigma: Rate,
    miu: Rate,
    t: Horizon,
) -> Price {
    let terms = drift_terms(s0, k, sigma, miu, t);
    terms.forward * (1.0 - method.evaluate(terms.spot_arg))
        - k * (1.0 - method.evaluate(terms.strike_arg))
}

pub fn put_value_with(
    method: CdfMethod,
    s0: Price,
    k: Price,
    sigma: Rate,
    miu: Rate,
    t: Horizon,
) -> Price {
    let terms = drift_terms(s0, k, sigma, miu, t);
    k * method.evaluate(terms.strike_arg) - terms.forward * method.evaluate(terms.spot_arg)
}

// ---------------------------------------------------------------------------
// Validation helpers
// ---------------------------------------------------------------------------

fn require_positive(field: &str, v: f64) -> FortMathResult<()> {
    if !v.is_finite() {
        return Err(FortMathError::invalid(field, "must be finite"));
    }
    if v <= 0.0 {
        return Err(FortMathError::invalid(field, "must be positive"));
    }
    Ok(())
}

pub(crate) fn validate_pricing_input(input: &OptionValueInput) -> FortMathResult<()> {
    require_positive("spot_price", input.spot_price)?;
    require_positive("strike_price", input.strike_price)?;
    require_positive("volatility", input.volatility)?;
    require_positive("time_to_expiry", input.time_to_expiry)?;
    if !input.drift.is_finite() {
        return Err(FortMathError::invalid("drift", "must be finite"));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Moneyness and intrinsic value helpers
// ---------------------------------------------------------------------------

fn classify_moneyness(s: f64, k: f64) -> String {
    let ratio = s / k;
    // ATM band: within 1% of strike, labelled from the call side
    if ratio > 1.01 {
        "ITM call / OTM put".into()
    } else if ratio < 0.99 {
        "OTM call / ITM put".into()
    } else {
        "ATM".into()
    }
}

fn intrinsic_value(s: f64, k: f64, option_type: OptionType) -> f64 {
    match option_type {
        OptionType::Call => (s - k).max(0.0),
        OptionType::Put => (k - s).max(0.0),
    }
}

// ---------------------------------------------------------------------------
// Public API: price_option
// ---------------------------------------------------------------------------

/// Prices an input that already passed [`validate_pricing_input`].
pub(crate) fn compute(
    input: &OptionValueInput,
) -> FortMathResult<(OptionValueOutput, Vec<String>)> {
    let s = input.spot_price;
    let k = input.strike_price;
    let sigma = input.volatility;
    let miu = input.drift;
    let t = input.time_to_expiry;
    let method = input.cdf_method;

    let mut warnings = Vec::new();

    let d1v = d1(s, k, sigma, miu, t);
    let call = call_value_with(method, s, k, sigma, miu, t);
    let put = put_value_with(method, s, k, sigma, miu, t);
    let forward = s * (1.0 + miu * t);

    if !(d1v.is_finite() && call.is_finite() && put.is_finite()) {
        warn!(s, k, sigma, miu, t, "option value is not finite");
        return Err(FortMathError::NonFinite {
            context: "option value".into(),
        });
    }
    if forward <= 0.0 {
        warnings.push(format!(
            "Drift term 1 + miu*T = {} is not positive; forward price is {}",
            1.0 + miu * t,
            forward
        ));
    }
    if call < 0.0 || put < 0.0 {
        warnings.push("Negative option value from table interpolation error".into());
    }
    let z = d1v / t.sqrt();
    if method == CdfMethod::Table && z.abs() >= TABLE_INTERVALS as f64 * TABLE_STEP {
        warnings.push(format!(
            "CDF argument {z:.4} is past the table range; values are saturated"
        ));
    }
    if method == CdfMethod::BruteForce && z.abs() > BRUTE_FORCE_LIMIT {
        warnings.push(format!(
            "CDF argument {z:.4} is past the integration limit {BRUTE_FORCE_LIMIT}; values are saturated"
        ));
    }

    let parity_residual = (call - put) - (forward - k);

    debug!(s, k, sigma, miu, t, d1 = d1v, call, put, "priced option");

    let output = OptionValueOutput {
        d1: d1v,
        call_value: call,
        put_value: put,
        forward_price: forward,
        parity_residual,
        call_intrinsic: intrinsic_value(s, k, OptionType::Call),
        put_intrinsic: intrinsic_value(s, k, OptionType::Put),
        moneyness: classify_moneyness(s, k),
    };
    Ok((output, warnings))
}

pub fn price_option(
    input: &OptionValueInput,
) -> FortMathResult<ComputationOutput<OptionValueOutput>> {
    let start = Instant::now();
    validate_pricing_input(input)?;

    let (output, warnings) = compute(input)?;

    let methodology = match input.cdf_method {
        CdfMethod::Table => "Drift-adjusted Black-Scholes, table-interpolated normal CDF",
        CdfMethod::BruteForce => "Drift-adjusted Black-Scholes, integrated normal CDF",
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(methodology, input, warnings, elapsed, output))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() < tol
    }

    fn default_input() -> OptionValueInput {
        OptionValueInput {
            spot_price: 100.0,
            strike_price: 100.0,
            volatility: 0.2,
            drift: 0.0,
            time_to_expiry: 1.0,
            cdf_method: CdfMethod::Table,
        }
    }

    #[test]
    fn test_d1_textbook_point() {
        let v = d1(100.0, 100.0, 0.2, 0.0, 1.0);
        assert!(approx_eq(v, 0.1, 1e-12), "d1 = {v}");
    }

    #[test]
    fn test_d1_unchecked_zero_sigma() {
        assert!(!d1(100.0, 100.0, 0.0, 0.0, 1.0).is_finite());
    }

    #[test]
    fn test_atm_call_equals_put_without_drift() {
        let c = call_value(100.0, 100.0, 0.2, 0.0, 1.0);
        let p = put_value(100.0, 100.0, 0.2, 0.0, 1.0);
        assert!(approx_eq(c, p, 1e-9));
        // textbook r = 0 value is 7.9656
        assert!(approx_eq(c, 7.966, 1e-3), "call = {c}");
    }

    #[test]
    fn test_parity_with_drift() {
        let (s, k, sigma, miu, t) = (100.0, 90.0, 0.2, 0.05, 1.0);
        let c = call_value(s, k, sigma, miu, t);
        let p = put_value(s, k, sigma, miu, t);
        assert!(approx_eq(c - p, s * (1.0 + miu * t) - k, 1e-9));
    }

    #[test]
    fn test_brute_force_method_close_to_table() {
        let c_table = call_value_with(CdfMethod::Table, 100.0, 100.0, 0.2, 0.0, 1.0);
        let c_brute = call_value_with(CdfMethod::BruteForce, 100.0, 100.0, 0.2, 0.0, 1.0);
        assert!(approx_eq(c_table, c_brute, 1e-2));
    }

    #[test]
    fn test_price_option_envelope() {
        let out = price_option(&default_input()).unwrap();
        assert!(out.result.parity_residual.abs() < 1e-9);
        assert_eq!(out.result.moneyness, "ATM");
        assert_eq!(out.result.call_intrinsic, 0.0);
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn test_price_option_rejects_bad_inputs() {
        let cases = [
            OptionValueInput {
                spot_price: 0.0,
                ..default_input()
            },
            OptionValueInput {
                strike_price: -1.0,
                ..default_input()
            },
            OptionValueInput {
                volatility: 0.0,
                ..default_input()
            },
            OptionValueInput {
                time_to_expiry: 0.0,
                ..default_input()
            },
            OptionValueInput {
                drift: f64::NAN,
                ..default_input()
            },
        ];
        for input in &cases {
            match price_option(input) {
                Err(FortMathError::InvalidInput { .. }) => {}
                other => panic!("expected InvalidInput, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_brute_force_huge_cdf_argument_is_bounded() {
        // z = d1 / sqrt(T) is about -2.3e7 here
        let input = OptionValueInput {
            spot_price: 1000.0,
            strike_price: 10.0,
            volatility: 0.2,
            drift: 0.0,
            time_to_expiry: 1e-12,
            cdf_method: CdfMethod::BruteForce,
        };
        let out = price_option(&input).unwrap();
        assert_eq!(out.result.call_value, 990.0);
        assert_eq!(out.result.put_value, 0.0);
        assert!(out
            .warnings
            .iter()
            .any(|w| w.contains("integration limit")));
    }

    #[test]
    fn test_miu_alias_in_json() {
        let input: OptionValueInput = serde_json::from_str(
            r#"{"spot_price": 100, "strike_price": 100, "volatility": 0.2,
                "miu": 0.01, "time_to_expiry": 1}"#,
        )
        .unwrap();
        assert_eq!(input.drift, 0.01);
        assert_eq!(input.cdf_method, CdfMethod::Table);
    }
}
