use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Instant;
use tracing::{debug, trace};

use crate::error::FortMathError;
use crate::types::*;
use crate::FortMathResult;

// ---------------------------------------------------------------------------
// Lookup table
// ---------------------------------------------------------------------------

/// Spacing between table samples.
pub const TABLE_STEP: f64 = 0.01;

/// Number of interpolation intervals. Index `i` interpolates between
/// `CDF_TABLE[i]` and `CDF_TABLE[i + 1]`, so the table holds one more sample.
pub const TABLE_INTERVALS: usize = 447;

/// Phi(x) sampled at x = 0.00, 0.01, ..., 4.47, five significant digits.
#[rustfmt::skip]
pub static CDF_TABLE: [f64; TABLE_INTERVALS + 1] = [
    0.50000, 0.50399, 0.50798, 0.51197, 0.51595, 0.51994, 0.52392, 0.52790, 0.53188, 0.53586,
    0.53983, 0.54380, 0.54776, 0.55172, 0.55567, 0.55962, 0.56356, 0.56749, 0.57142, 0.57535,
    0.57926, 0.58317, 0.58706, 0.59095, 0.59483, 0.59871, 0.60257, 0.60642, 0.61026, 0.61409,
    0.61791, 0.62172, 0.62552, 0.62930, 0.63307, 0.63683, 0.64058, 0.64431, 0.64803, 0.65173,
    0.65542, 0.65910, 0.66276, 0.66640, 0.67003, 0.67364, 0.67724, 0.68082, 0.68439, 0.68793,
    0.69146, 0.69497, 0.69847, 0.70194, 0.70540, 0.70884, 0.71226, 0.71566, 0.71904, 0.72240,
    0.72575, 0.72907, 0.73237, 0.73565, 0.73891, 0.74215, 0.74537, 0.74857, 0.75175, 0.75490,
    0.75804, 0.76115, 0.76424, 0.76730, 0.77035, 0.77337, 0.77637, 0.77935, 0.78230, 0.78524,
    0.78814, 0.79103, 0.79389, 0.79673, 0.79955, 0.80234, 0.80511, 0.80785, 0.81057, 0.81327,
    0.81594, 0.81859, 0.82121, 0.82381, 0.82639, 0.82894, 0.83147, 0.83398, 0.83646, 0.83891,
    0.84134, 0.84375, 0.84614, 0.84849, 0.85083, 0.85314, 0.85543, 0.85769, 0.85993, 0.86214,
    0.86433, 0.86650, 0.86864, 0.87076, 0.87286, 0.87493, 0.87698, 0.87900, 0.88100, 0.88298,
    0.88493, 0.88686, 0.88877, 0.89065, 0.89251, 0.89435, 0.89617, 0.89796, 0.89973, 0.90147,
    0.90320, 0.90490, 0.90658, 0.90824, 0.90988, 0.91149, 0.91309, 0.91466, 0.91621, 0.91774,
    0.91924, 0.92073, 0.92220, 0.92364, 0.92507, 0.92647, 0.92785, 0.92922, 0.93056, 0.93189,
    0.93319, 0.93448, 0.93574, 0.93699, 0.93822, 0.93943, 0.94062, 0.94179, 0.94295, 0.94408,
    0.94520, 0.94630, 0.94738, 0.94845, 0.94950, 0.95053, 0.95154, 0.95254, 0.95352, 0.95449,
    0.95543, 0.95637, 0.95728, 0.95818, 0.95907, 0.95994, 0.96080, 0.96164, 0.96246, 0.96327,
    0.96407, 0.96485, 0.96562, 0.96638, 0.96712, 0.96784, 0.96856, 0.96926, 0.96995, 0.97062,
    0.97128, 0.97193, 0.97257, 0.97320, 0.97381, 0.97441, 0.97500, 0.97558, 0.97615, 0.97670,
    0.97725, 0.97778, 0.97831, 0.97882, 0.97932, 0.97982, 0.98030, 0.98077, 0.98124, 0.98169,
    0.98214, 0.98257, 0.98300, 0.98341, 0.98382, 0.98422, 0.98461, 0.98500, 0.98537, 0.98574,
    0.98610, 0.98645, 0.98679, 0.98713, 0.98745, 0.98778, 0.98809, 0.98840, 0.98870, 0.98899,
    0.98928, 0.98956, 0.98983, 0.99010, 0.99036, 0.99061, 0.99086, 0.99111, 0.99134, 0.99158,
    0.99180, 0.99202, 0.99224, 0.99245, 0.99266, 0.99286, 0.99305, 0.99324, 0.99343, 0.99361,
    0.99379, 0.99396, 0.99413, 0.99430, 0.99446, 0.99461, 0.99477, 0.99492, 0.99506, 0.99520,
    0.99534, 0.99547, 0.99560, 0.99573, 0.99585, 0.99598, 0.99609, 0.99621, 0.99632, 0.99643,
    0.99653, 0.99664, 0.99674, 0.99683, 0.99693, 0.99702, 0.99711, 0.99720, 0.99728, 0.99736,
    0.99744, 0.99752, 0.99760, 0.99767, 0.99774, 0.99781, 0.99788, 0.99795, 0.99801, 0.99807,
    0.99813, 0.99819, 0.99825, 0.99831, 0.99836, 0.99841, 0.99846, 0.99851, 0.99856, 0.99861,
    0.99865, 0.99869, 0.99874, 0.99878, 0.99882, 0.99886, 0.99889, 0.99893, 0.99896, 0.99900,
    0.99903, 0.99906, 0.99910, 0.99913, 0.99916, 0.99918, 0.99921, 0.99924, 0.99926, 0.99929,
    0.99931, 0.99934, 0.99936, 0.99938, 0.99940, 0.99942, 0.99944, 0.99946, 0.99948, 0.99950,
    0.99952, 0.99953, 0.99955, 0.99957, 0.99958, 0.99960, 0.99961, 0.99962, 0.99964, 0.99965,
    0.99966, 0.99968, 0.99969, 0.99970, 0.99971, 0.99972, 0.99973, 0.99974, 0.99975, 0.99976,
    0.99977, 0.99978, 0.99978, 0.99979, 0.99980, 0.99981, 0.99981, 0.99982, 0.99983, 0.99983,
    0.99984, 0.99985, 0.99985, 0.99986, 0.99986, 0.99987, 0.99987, 0.99988, 0.99988, 0.99989,
    0.99989, 0.99990, 0.99990, 0.99990, 0.99991, 0.99991, 0.99992, 0.99992, 0.99992, 0.99992,
    0.99993, 0.99993, 0.99993, 0.99994, 0.99994, 0.99994, 0.99994, 0.99995, 0.99995, 0.99995,
    0.99995, 0.99995, 0.99996, 0.99996, 0.99996, 0.99996, 0.99996, 0.99996, 0.99997, 0.99997,
    0.99997, 0.99997, 0.99997, 0.99997, 0.99997, 0.99997, 0.99998, 0.99998, 0.99998, 0.99998,
    0.99998, 0.99998, 0.99998, 0.99998, 0.99998, 0.99998, 0.99998, 0.99998, 0.99999, 0.99999,
    0.99999, 0.99999, 0.99999, 0.99999, 0.99999, 0.99999, 0.99999, 0.99999, 0.99999, 0.99999,
    0.99999, 0.99999, 0.99999, 0.99999, 0.99999, 0.99999, 0.99999, 0.99999, 0.99999, 0.99999,
    0.99999, 0.99999, 1.00000, 1.00000, 1.00000, 1.00000, 1.00000, 1.00000,
];

/// Step width of the rectangle-rule integration.
pub const INTEGRATION_STEP: f64 = 0.00001;

const SQRT_2PI: f64 = 2.506_628_274_631_000_2;

/// Largest `|x|` [`capped_brute_force_cdf`] integrates up to. Phi is 1.0 in
/// f64 long before this, and past about 1e12 the `t += step` loop in
/// [`brute_force_cdf`] stops advancing altogether.
pub const BRUTE_FORCE_LIMIT: f64 = 40.0;

// ---------------------------------------------------------------------------
// Approximations
// ---------------------------------------------------------------------------

/// Standard normal CDF by brute-force integration of the density from 0 to
/// `|x|` in steps of [`INTEGRATION_STEP`].
///
/// Cost grows linearly with `|x|` (about 100k density evaluations per unit)
/// with no iteration cap. Use [`table_cdf`] on hot paths.
pub fn brute_force_cdf(x: f64) -> f64 {
    if x.is_nan() {
        return f64::NAN;
    }
    if x.is_infinite() {
        return if x > 0.0 { 1.0 } else { 0.0 };
    }

    let ux = x.abs();
    let mut sum = 0.0;
    let mut t = 0.0;
    while t < ux {
        sum += (-t * t / 2.0).exp() * INTEGRATION_STEP / SQRT_2PI;
        t += INTEGRATION_STEP;
    }

    if x < 0.0 {
        0.5 - sum
    } else {
        0.5 + sum
    }
}

/// [`brute_force_cdf`] with bounded cost: beyond [`BRUTE_FORCE_LIMIT`] it
/// returns the saturated tail (1.0, or 0.0 for negative `x`) instead of
/// integrating.
pub fn capped_brute_force_cdf(x: f64) -> f64 {
    if x.abs() > BRUTE_FORCE_LIMIT {
        trace!(x, "brute-force cdf capped");
        return if x > 0.0 { 1.0 } else { 0.0 };
    }
    brute_force_cdf(x)
}

/// Standard normal CDF by linear interpolation in [`CDF_TABLE`].
///
/// Beyond the last interval (`|x| >= 4.47`) the result saturates at 1.0
/// (0.0 for negative `x`) without touching the table.
pub fn table_cdf(x: f64) -> f64 {
    if x.is_nan() {
        return f64::NAN;
    }

    let ux = x.abs();
    // float-to-int casts saturate, so +inf lands past the table as well
    let i = (ux / TABLE_STEP) as usize;

    let v = if i < TABLE_INTERVALS {
        let v0 = CDF_TABLE[i];
        let v1 = CDF_TABLE[i + 1];
        v0 + (v1 - v0) * (ux - i as f64 * TABLE_STEP) / TABLE_STEP
    } else {
        trace!(x, "table cdf saturated");
        1.0
    };

    if x < 0.0 {
        1.0 - v
    } else {
        v
    }
}

/// Which approximation of Phi to use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CdfMethod {
    #[default]
    Table,
    BruteForce,
}

impl CdfMethod {
    /// Brute force goes through [`capped_brute_force_cdf`].
    #[inline]
    pub fn evaluate(self, x: f64) -> f64 {
        match self {
            CdfMethod::Table => table_cdf(x),
            CdfMethod::BruteForce => capped_brute_force_cdf(x),
        }
    }
}

impl fmt::Display for CdfMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CdfMethod::Table => f.write_str("table"),
            CdfMethod::BruteForce => f.write_str("brute_force"),
        }
    }
}

impl FromStr for CdfMethod {
    type Err = FortMathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "table" => Ok(CdfMethod::Table),
            "brute_force" | "brute" => Ok(CdfMethod::BruteForce),
            other => Err(FortMathError::invalid(
                "method",
                format!("unknown cdf method '{other}' (expected table or brute_force)"),
            )),
        }
    }
}

// ---------------------------------------------------------------------------
// Envelope operation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CdfInput {
    pub x: f64,
    /// Evaluate only this method; both when absent.
    #[serde(default)]
    pub method: Option<CdfMethod>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CdfOutput {
    pub x: f64,
    pub table: Option<f64>,
    pub brute_force: Option<f64>,
    /// `table - brute_force` when both were evaluated.
    pub difference: Option<f64>,
    pub table_saturated: bool,
}

/// Above this magnitude the brute-force sum is flagged as slow.
const BRUTE_FORCE_SLOW_ABOVE: f64 = 10.0;

pub fn evaluate_cdf(input: &CdfInput) -> FortMathResult<ComputationOutput<CdfOutput>> {
    let start = Instant::now();
    let x = input.x;
    if !x.is_finite() {
        return Err(FortMathError::invalid("x", "must be finite"));
    }

    let mut warnings = Vec::new();
    let run_table = input.method != Some(CdfMethod::BruteForce);
    let run_brute = input.method != Some(CdfMethod::Table);

    let table = run_table.then(|| table_cdf(x));
    let brute_force = run_brute.then(|| capped_brute_force_cdf(x));
    let difference = table.zip(brute_force).map(|(t, b)| t - b);

    let table_saturated = run_table && (x.abs() / TABLE_STEP) as usize >= TABLE_INTERVALS;
    if table_saturated {
        warnings.push(format!(
            "|x| = {} is past the table range; table value saturated",
            x.abs()
        ));
    }
    if run_brute && x.abs() > BRUTE_FORCE_LIMIT {
        warnings.push(format!(
            "|x| = {} is past the integration limit {BRUTE_FORCE_LIMIT}; brute-force value saturated",
            x.abs()
        ));
    } else if run_brute && x.abs() > BRUTE_FORCE_SLOW_ABOVE {
        warnings.push(format!(
            "Brute-force integration ran {:.0} steps",
            x.abs() / INTEGRATION_STEP
        ));
    }

    debug!(x, ?table, ?brute_force, "evaluated normal cdf");

    let methodology = match input.method {
        Some(CdfMethod::Table) => "Linear interpolation in 0.01-step Phi table",
        Some(CdfMethod::BruteForce) => "Rectangle-rule integration of the normal density",
        None => "Table interpolation compared against rectangle-rule integration",
    };

    let output = CdfOutput {
        x,
        table,
        brute_force,
        difference,
        table_saturated,
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

    #[test]
    fn test_table_shape() {
        assert_eq!(CDF_TABLE.len(), TABLE_INTERVALS + 1);
        assert_eq!(CDF_TABLE[0], 0.5);
        assert_eq!(CDF_TABLE[TABLE_INTERVALS], 1.0);
        for w in CDF_TABLE.windows(2) {
            assert!(w[0] <= w[1], "table not monotone at {:?}", w);
        }
        assert!(CDF_TABLE.iter().all(|v| (0.5..=1.0).contains(v)));
    }

    #[test]
    fn test_both_exactly_half_at_zero() {
        assert_eq!(table_cdf(0.0), 0.5);
        assert_eq!(brute_force_cdf(0.0), 0.5);
    }

    #[test]
    fn test_table_hits_knots() {
        assert!((table_cdf(1.0) - 0.84134).abs() < 1e-12);
        assert!((table_cdf(-1.0) - 0.15866).abs() < 1e-12);
        assert!((table_cdf(1.96) - 0.97500).abs() < 1e-12);
    }

    #[test]
    fn test_table_interpolates_between_knots() {
        // halfway between 0.84134 (1.00) and 0.84375 (1.01)
        let v = table_cdf(1.005);
        assert!((v - 0.842545).abs() < 1e-9, "got {v}");
    }

    #[test]
    fn test_table_last_interval_and_saturation() {
        let v = table_cdf(4.46);
        assert!((0.999..=1.0).contains(&v));
        assert_eq!(table_cdf(4.47), 1.0);
        assert_eq!(table_cdf(4.475), 1.0);
        assert_eq!(table_cdf(1e6), 1.0);
        assert_eq!(table_cdf(-1e6), 0.0);
        assert_eq!(table_cdf(f64::INFINITY), 1.0);
        assert_eq!(table_cdf(f64::NEG_INFINITY), 0.0);
    }

    #[test]
    fn test_nan_passes_through() {
        assert!(table_cdf(f64::NAN).is_nan());
        assert!(brute_force_cdf(f64::NAN).is_nan());
    }

    #[test]
    fn test_brute_force_infinite_limits() {
        assert_eq!(brute_force_cdf(f64::INFINITY), 1.0);
        assert_eq!(brute_force_cdf(f64::NEG_INFINITY), 0.0);
    }

    #[test]
    fn test_method_parse_and_evaluate() {
        assert_eq!("table".parse::<CdfMethod>().unwrap(), CdfMethod::Table);
        assert_eq!(
            "brute-force".parse::<CdfMethod>().unwrap(),
            CdfMethod::BruteForce
        );
        assert!("simpson".parse::<CdfMethod>().is_err());
        assert_eq!(CdfMethod::Table.evaluate(0.5), table_cdf(0.5));
    }

    #[test]
    fn test_evaluate_cdf_reports_difference() {
        let out = evaluate_cdf(&CdfInput { x: 1.0, method: None }).unwrap();
        let diff = out.result.difference.unwrap();
        assert!(diff.abs() < 1e-3);
        assert!(!out.result.table_saturated);
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn test_evaluate_cdf_flags_saturation() {
        let out = evaluate_cdf(&CdfInput {
            x: -5.0,
            method: Some(CdfMethod::Table),
        })
        .unwrap();
        assert_eq!(out.result.table, Some(0.0));
        assert!(out.result.brute_force.is_none());
        assert!(out.result.table_saturated);
        assert_eq!(out.warnings.len(), 1);
    }

    #[test]
    fn test_capped_brute_force() {
        assert_eq!(capped_brute_force_cdf(1e11), 1.0);
        assert_eq!(capped_brute_force_cdf(-1e15), 0.0);
        assert_eq!(capped_brute_force_cdf(0.5), brute_force_cdf(0.5));
        assert!(capped_brute_force_cdf(f64::NAN).is_nan());
        assert_eq!(CdfMethod::BruteForce.evaluate(-1e12), 0.0);
    }

    #[test]
    fn test_evaluate_cdf_brute_force_huge_argument() {
        let out = evaluate_cdf(&CdfInput {
            x: 1e11,
            method: Some(CdfMethod::BruteForce),
        })
        .unwrap();
        assert_eq!(out.result.brute_force, Some(1.0));
        assert_eq!(out.warnings.len(), 1);
        assert!(out.warnings[0].contains("integration limit"));
    }

    #[test]
    fn test_evaluate_cdf_rejects_non_finite() {
        assert!(evaluate_cdf(&CdfInput {
            x: f64::NAN,
            method: None
        })
        .is_err());
    }
}
