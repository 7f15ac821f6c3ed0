//! Statistical primitives shared across the trail engine: sample pairs,
//! fuzzy floating-point comparison and the outlier limit constants.

pub mod quantile;
pub mod regression;
pub mod section;

use std::cmp::Ordering;

/// A sample pair of independent variable `x` and response `y`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spot<T> {
    pub x: T,
    pub y: T,
}

impl<T> Spot<T> {
    pub fn new(x: T, y: T) -> Self {
        Self { x, y }
    }
}

/// Tolerance for value comparisons across the whole engine.
pub const FUZZY_TOLERANCE: f64 = 1e-9;

/// Sigma factor for standard outlier detection.
/// Allows 1 lower and 1 upper outlier for a log with 740 measurements.
pub const OUTLIER_SIGMA_DEFAULT: f64 = 3.;
/// Outlier distance limit factor applied to the tolerance interval.
/// Outliers are identified only if they lie beyond this limit.
pub const OUTLIER_RANGE_FACTOR_DEFAULT: f64 = 2.;
/// Outlier detection for the summary graphics. Allows 1 outlier for 6 vaults.
pub const SUMMARY_OUTLIER_SIGMA: f64 = 1.36;
/// Outlier distance limit factor for the summary graphics.
pub const SUMMARY_OUTLIER_RANGE_FACTOR: f64 = 9.;
/// The sigma value covering the inner 50% of the population
/// (interquartile range `0.25 < p < 0.75`).
pub const INTER_QUARTILE_SIGMA_FACTOR: f64 = 0.674489694;
/// Tukey whisker distance as a multiple of the interquartile range.
pub const BOXPLOT_OUTLIER_FACTOR: f64 = 1.5;

/// Returns true if `a` and `b` are within [`FUZZY_TOLERANCE`] of each other.
/// All NaNs compare fuzzily equal, as do positive and negative zero.
pub fn fuzzy_equals(a: f64, b: f64) -> bool {
    (a - b).abs() <= FUZZY_TOLERANCE || a == b || (a.is_nan() && b.is_nan())
}

/// Compares `a` and `b` with a tolerance for nearly-equal values.
/// Not a total ordering; NaN compares greater than any number.
pub fn fuzzy_compare(a: f64, b: f64) -> Ordering {
    if fuzzy_equals(a, b) {
        Ordering::Equal
    } else if a < b {
        Ordering::Less
    } else if a > b {
        Ordering::Greater
    } else {
        a.is_nan().cmp(&b.is_nan())
    }
}

/// Gauss error function, Chebyshev fitting formula (Numerical Recipes 6.2).
/// Fractional error less than 1.2e-7.
pub(crate) fn erf(z: f64) -> f64 {
    let t = 1.0 / (1.0 + 0.5 * z.abs());
    let ans = 1.0
        - t * (-z * z - 1.26551223
            + t * (1.00002368
                + t * (0.37409196
                    + t * (0.09678418
                        + t * (-0.18628806
                            + t * (0.27886807
                                + t * (-1.13520398
                                    + t * (1.48851587
                                        + t * (-0.82215223 + t * 0.17087277)))))))))
            .exp();
    if z >= 0.0 {
        ans
    } else {
        -ans
    }
}

/// Probability that a normal deviate lies within `sigma_factor` sigmas.
pub(crate) fn probability_within(sigma_factor: f64) -> f64 {
    erf(sigma_factor / 2f64.sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn erf_matches_reference_values() {
        assert!((erf(1.0) - 0.8427007877600067).abs() < 1e-12);
        assert!((erf(-1.0) + 0.8427007877600067).abs() < 1e-12);
        assert!((erf(30.0) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn fuzzy_equals_tolerates_tiny_differences() {
        assert!(fuzzy_equals(1.0, 1.0 + 1e-10));
        assert!(!fuzzy_equals(1.0, 1.0 + 1e-6));
        assert!(fuzzy_equals(f64::NAN, f64::NAN));
    }

    #[test]
    fn fuzzy_compare_orders_distinct_values() {
        assert_eq!(fuzzy_compare(1.0, 2.0), Ordering::Less);
        assert_eq!(fuzzy_compare(2.0, 1.0), Ordering::Greater);
        assert_eq!(fuzzy_compare(1.0, 1.0 + 1e-12), Ordering::Equal);
    }
}
