use fort_math_core::normal_cdf::{brute_force_cdf, table_cdf, CDF_TABLE, TABLE_STEP};
use proptest::prelude::*;
use statrs::distribution::{ContinuousCDF, Normal};

// ===========================================================================
// Normal CDF tests
// The table variant prices options; the brute-force variant is the slow
// reference. Both are checked against each other and against statrs.
// ===========================================================================

fn exact_cdf(x: f64) -> f64 {
    Normal::standard().cdf(x)
}

// ---------------------------------------------------------------------------
// Agreement
// ---------------------------------------------------------------------------

#[test]
fn test_table_and_brute_force_agree() {
    for x in [-3.0, -1.0, -0.5, 0.0, 0.5, 1.0, 3.0] {
        let t = table_cdf(x);
        let b = brute_force_cdf(x);
        assert!((t - b).abs() < 1e-3, "x = {}: table {} vs brute {}", x, t, b);
    }
    assert_eq!(table_cdf(0.0), 0.5);
    assert_eq!(brute_force_cdf(0.0), 0.5);
}

#[test]
fn test_brute_force_close_to_exact() {
    for x in [-2.0, -0.25, 0.75, 1.5, 2.5] {
        let b = brute_force_cdf(x);
        assert!((b - exact_cdf(x)).abs() < 1e-5, "x = {}: {}", x, b);
    }
}

#[test]
fn test_table_knots_close_to_exact() {
    // five-digit rounding of the published table
    for (i, v) in CDF_TABLE.iter().enumerate().step_by(37) {
        let x = i as f64 * TABLE_STEP;
        assert!((v - exact_cdf(x)).abs() < 1e-5, "knot {}: {}", i, v);
    }
}

// ---------------------------------------------------------------------------
// Shape
// ---------------------------------------------------------------------------

#[test]
fn test_table_monotone_across_saturation() {
    let xs = [-5.0, -4.47, -1.0, 0.0, 1.0, 4.46, 4.47, 5.0, 10.0];
    let vs: Vec<f64> = xs.iter().map(|&x| table_cdf(x)).collect();
    for w in vs.windows(2) {
        assert!(w[0] <= w[1], "not monotone: {:?}", vs);
    }
    assert_eq!(table_cdf(-5.0), 0.0);
    assert_eq!(table_cdf(-4.47), 0.0);
    assert_eq!(table_cdf(5.0), 1.0);
    assert_eq!(table_cdf(10.0), 1.0);
}

#[test]
fn test_table_boundary() {
    let v = table_cdf(4.46);
    assert!((0.999..=1.0).contains(&v), "table_cdf(4.46) = {}", v);
    assert_eq!(table_cdf(4.47), CDF_TABLE[CDF_TABLE.len() - 1]);
}

#[test]
fn test_brute_force_symmetry() {
    for x in [0.3, 1.7, 2.9] {
        let sum = brute_force_cdf(x) + brute_force_cdf(-x);
        assert!((sum - 1.0).abs() < 1e-12);
    }
}

proptest! {
    #[test]
    fn prop_table_monotone(a in -6.0f64..6.0, b in -6.0f64..6.0) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(table_cdf(lo) <= table_cdf(hi) + 1e-15);
    }

    #[test]
    fn prop_table_symmetric(x in 0.0f64..6.0) {
        prop_assert!((table_cdf(x) + table_cdf(-x) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn prop_table_in_unit_interval(x in -100.0f64..100.0) {
        let v = table_cdf(x);
        prop_assert!((0.0..=1.0).contains(&v));
    }

    #[test]
    fn prop_table_close_to_exact(x in -4.4f64..4.4) {
        prop_assert!((table_cdf(x) - exact_cdf(x)).abs() < 5e-4);
    }
}
