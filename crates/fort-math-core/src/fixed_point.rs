use alloy_primitives::{I256, U256};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Instant;
use tracing::{debug, warn};

use crate::error::FortMathError;
use crate::types::*;
use crate::FortMathResult;

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// Digits kept when a float is captured into an integer. Everything past the
/// sixth fractional digit is rounded away before scaling to `decimals`.
pub const CAPTURED_DIGITS: u32 = 6;

const CAPTURE_SCALE: f64 = 1_000_000.0;

/// A numeric-like value as it arrives from configuration, scripts or JSON:
/// an integer, a float, or a decimal string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NumericValue {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl NumericValue {
    /// Normalize to a finite `f64`.
    pub fn as_f64(&self) -> FortMathResult<f64> {
        let v = match self {
            NumericValue::Integer(i) => *i as f64,
            NumericValue::Float(f) => *f,
            NumericValue::Text(s) => s.trim().parse::<f64>().map_err(|e| {
                FortMathError::invalid("value", format!("'{s}' is not numeric: {e}"))
            })?,
        };
        if !v.is_finite() {
            return Err(FortMathError::invalid("value", "must be finite"));
        }
        Ok(v)
    }

    /// Normalize to a `Decimal` without passing through binary floating point
    /// when the source is an integer or a string.
    pub fn as_decimal(&self) -> FortMathResult<Decimal> {
        match self {
            NumericValue::Integer(i) => Ok(Decimal::from(*i)),
            NumericValue::Float(f) => Decimal::try_from(*f)
                .map_err(|e| FortMathError::invalid("value", format!("{f}: {e}"))),
            NumericValue::Text(s) => {
                let s = s.trim();
                Decimal::from_str(s)
                    .or_else(|_| Decimal::from_scientific(s))
                    .map_err(|e| FortMathError::invalid("value", format!("'{s}': {e}")))
            }
        }
    }
}

impl From<i64> for NumericValue {
    fn from(v: i64) -> Self {
        NumericValue::Integer(v)
    }
}

impl From<f64> for NumericValue {
    fn from(v: f64) -> Self {
        NumericValue::Float(v)
    }
}

impl From<&str> for NumericValue {
    fn from(v: &str) -> Self {
        NumericValue::Text(v.to_string())
    }
}

impl From<String> for NumericValue {
    fn from(v: String) -> Self {
        NumericValue::Text(v)
    }
}

/// An integer carrying an explicit count of fractional digits, e.g. a token
/// amount of `1.5` with 18 decimals is `raw = 1_500_000_000_000_000_000`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "FixedPointRepr", into = "FixedPointRepr")]
pub struct FixedPointValue {
    raw: I256,
    decimals: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct FixedPointRepr {
    raw: String,
    decimals: u32,
}

impl TryFrom<FixedPointRepr> for FixedPointValue {
    type Error = FortMathError;

    fn try_from(repr: FixedPointRepr) -> Result<Self, Self::Error> {
        FixedPointValue::from_raw_str(&repr.raw, repr.decimals)
    }
}

impl From<FixedPointValue> for FixedPointRepr {
    fn from(v: FixedPointValue) -> Self {
        FixedPointRepr {
            raw: v.raw.to_string(),
            decimals: v.decimals,
        }
    }
}

impl FixedPointValue {
    pub const fn new(raw: I256, decimals: u32) -> Self {
        Self { raw, decimals }
    }

    /// Parse a raw integer string such as `"2450000000"` (as passed to the
    /// contracts) together with the decimals it was encoded with.
    pub fn from_raw_str(raw: &str, decimals: u32) -> FortMathResult<Self> {
        let raw = I256::from_dec_str(raw.trim())
            .map_err(|e| FortMathError::invalid("raw", format!("'{raw}': {e}")))?;
        Ok(Self { raw, decimals })
    }

    pub const fn raw(&self) -> I256 {
        self.raw
    }

    pub const fn decimals(&self) -> u32 {
        self.decimals
    }

    pub fn is_negative(&self) -> bool {
        self.raw.is_negative()
    }

    /// Human decimal rendering, see [`to_decimal`].
    pub fn to_decimal_string(&self) -> String {
        to_decimal(self.raw, self.decimals)
    }

    /// Lossy conversion to `f64` for use in pricing math.
    pub fn to_f64(&self) -> FortMathResult<f64> {
        let text = self.to_decimal_string();
        let v = text
            .trim_end_matches('.')
            .parse::<f64>()
            .map_err(|e| FortMathError::invalid("raw", format!("'{text}': {e}")))?;
        if !v.is_finite() {
            return Err(FortMathError::NonFinite {
                context: format!("fixed-point {} to f64", self.raw),
            });
        }
        Ok(v)
    }
}

impl fmt::Display for FixedPointValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_decimal_string())
    }
}

// ---------------------------------------------------------------------------
// Codec
// ---------------------------------------------------------------------------

fn ten() -> I256 {
    I256::from_raw(U256::from(10u64))
}

fn rescale(mut raw: I256, from: u32, to: u32, context: &str) -> FortMathResult<(I256, bool)> {
    let ten = ten();
    let mut truncated = false;
    for _ in from..to {
        raw = raw.checked_mul(ten).ok_or_else(|| FortMathError::Overflow {
            context: context.to_string(),
        })?;
    }
    for _ in to..from {
        truncated |= raw % ten != I256::ZERO;
        raw = raw / ten;
    }
    Ok((raw, truncated))
}

/// Captures `human` to six fractional digits and rescales. Reports whether
/// any of the input was lost on the way.
pub(crate) fn encode_captured(human: f64, decimals: u32) -> FortMathResult<(FixedPointValue, bool)> {
    let micros = (human * CAPTURE_SCALE).round();
    if !micros.is_finite() || micros.abs() >= i128::MAX as f64 {
        return Err(FortMathError::Overflow {
            context: format!("{human} x 10^{CAPTURED_DIGITS}"),
        });
    }
    let captured_lossy =
        (micros / CAPTURE_SCALE - human).abs() > 4.0 * f64::EPSILON * human.abs().max(1.0);

    let raw = I256::try_from(micros as i128).map_err(|_| FortMathError::Overflow {
        context: format!("{human} x 10^{CAPTURED_DIGITS}"),
    })?;
    let (raw, truncated) = rescale(raw, CAPTURED_DIGITS, decimals, "to_fixed_point")?;
    Ok((FixedPointValue { raw, decimals }, captured_lossy || truncated))
}

/// Convert a human value to a fixed-point integer with `decimals` fractional
/// digits.
///
/// The value is normalized to `f64` and captured at six fractional digits,
/// so at most six fractional digits survive regardless of `decimals`. With
/// `decimals > 6` the captured integer is multiplied up; with `decimals < 6`
/// it is divided down, truncating toward zero.
///
/// # Errors
///
/// `InvalidInput` for non-numeric or non-finite input, `Overflow` when the
/// result leaves the signed 256-bit range.
pub fn to_fixed_point(
    value: impl Into<NumericValue>,
    decimals: u32,
) -> FortMathResult<FixedPointValue> {
    let human = value.into().as_f64()?;
    let (fixed, lossy) = encode_captured(human, decimals)?;
    if lossy {
        warn!(human, decimals, "precision lost while encoding fixed-point value");
    }
    debug!(human, decimals, raw = %fixed.raw, "encoded fixed-point value");
    Ok(fixed)
}

/// Exact variant of [`to_fixed_point`]: scales a `Decimal` without the
/// six-digit capture, truncating toward zero past `decimals`.
pub fn to_fixed_point_exact(value: Decimal, decimals: u32) -> FortMathResult<FixedPointValue> {
    let raw = I256::try_from(value.mantissa()).map_err(|_| FortMathError::Overflow {
        context: format!("mantissa of {value}"),
    })?;
    let (raw, truncated) = rescale(raw, value.scale(), decimals, "to_fixed_point_exact")?;
    if truncated {
        warn!(%value, decimals, "fractional digits truncated while encoding");
    }
    Ok(FixedPointValue { raw, decimals })
}

/// Render `raw` with exactly `decimals` fractional digits.
///
/// Digits are peeled off the least significant end one at a time, so the
/// output is an exact inverse of the scaling: no rounding and no trimming of
/// trailing zeros. `decimals == 0` renders as `"<int>."`. Negative values
/// render with a leading `-`.
pub fn to_decimal(raw: I256, decimals: u32) -> String {
    let ten = U256::from(10u64);
    let mut rest = raw.unsigned_abs();
    let mut fraction = Vec::with_capacity(decimals as usize);
    for _ in 0..decimals {
        let digit = (rest % ten).as_limbs()[0] as u8;
        fraction.push(char::from(b'0' + digit));
        rest /= ten;
    }

    let mut out = String::with_capacity(decimals as usize + 80);
    if raw.is_negative() {
        out.push('-');
    }
    out.push_str(&rest.to_string());
    out.push('.');
    out.extend(fraction.iter().rev());
    out
}

// ---------------------------------------------------------------------------
// Envelope operation
// ---------------------------------------------------------------------------

fn default_decimals() -> u32 {
    DEFAULT_DECIMALS
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "direction", rename_all = "snake_case")]
pub enum FixedPointInput {
    /// Human value to raw integer.
    Encode {
        value: NumericValue,
        #[serde(default = "default_decimals")]
        decimals: u32,
        /// Skip the six-digit capture and scale the decimal text exactly.
        #[serde(default)]
        exact: bool,
    },
    /// Raw integer to human decimal string.
    Decode {
        raw: String,
        #[serde(default = "default_decimals")]
        decimals: u32,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixedPointOutput {
    pub raw: String,
    pub decimals: u32,
    pub decimal: String,
    pub precision_lost: bool,
}

pub fn convert(input: &FixedPointInput) -> FortMathResult<ComputationOutput<FixedPointOutput>> {
    let start = Instant::now();
    let mut warnings = Vec::new();

    let (fixed, precision_lost, methodology) = match input {
        FixedPointInput::Encode {
            value,
            decimals,
            exact: false,
        } => {
            let human = value.as_f64()?;
            let (fixed, lossy) = encode_captured(human, *decimals)?;
            (fixed, lossy, "Six-digit float capture, scaled by repeated x10")
        }
        FixedPointInput::Encode {
            value,
            decimals,
            exact: true,
        } => {
            let d = value.as_decimal()?;
            let fixed = to_fixed_point_exact(d, *decimals)?;
            let lossy = d.normalize().scale() > *decimals;
            (fixed, lossy, "Exact decimal scaling, truncated toward zero")
        }
        FixedPointInput::Decode { raw, decimals } => (
            FixedPointValue::from_raw_str(raw, *decimals)?,
            false,
            "Digit-by-digit decimal rendering",
        ),
    };

    if precision_lost {
        warnings.push(format!(
            "Input carries more precision than retained at {} decimals",
            fixed.decimals
        ));
    }
    if let FixedPointInput::Encode {
        decimals,
        exact: false,
        ..
    } = input
    {
        if *decimals > CAPTURED_DIGITS {
            warnings.push(format!(
                "Only {CAPTURED_DIGITS} fractional digits are captured from the input"
            ));
        }
    }

    let output = FixedPointOutput {
        raw: fixed.raw.to_string(),
        decimals: fixed.decimals,
        decimal: fixed.to_decimal_string(),
        precision_lost,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(methodology, input, warnings, elapsed, output))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
