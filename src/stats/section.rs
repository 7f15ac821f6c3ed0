//! Record sections: statistics over a closed time range of one trail record.
//!
//! A section carries two estimators: the display quantile over the unfiltered
//! samples, and a quadratic trend fit over the samples left after removing
//! close outliers. The same raw sample can appear in the box plot and still
//! be excluded from the trend as noise.

use crate::stats::quantile::OutlierQuantile;
use crate::stats::regression::{RegressionType, SingleResponseRegression};
use crate::stats::{Spot, OUTLIER_RANGE_FACTOR_DEFAULT, SUMMARY_OUTLIER_SIGMA};
use crate::trail::record::TrailRecord;
use crate::trail::record_set::TimeSteps;

/// Statistics over the sample pairs of one record between two timestamps,
/// both bounds inclusive.
#[derive(Debug)]
pub struct RecordSection {
    /// (timestamp ms, decoded value) pairs within the bounds, without gaps.
    spots: Vec<Spot<f64>>,
    index_first: usize,
    index_last: usize,
    display_quantile: Option<OutlierQuantile>,
    regression: Option<SingleResponseRegression>,
}

impl RecordSection {
    /// Cut the section between the two timestamps. The bounds are resolved to
    /// the closest time steps; equal timestamps yield a single-index section.
    pub fn new(
        record: &TrailRecord,
        time_steps: &TimeSteps,
        timestamp1_ms: i64,
        timestamp2_ms: i64,
    ) -> Self {
        let (index_first, index_last) =
            record.define_range_indices(time_steps, timestamp1_ms, timestamp2_ms);
        let spots = record.sub_points(time_steps, index_first, index_last);

        let display_quantile =
            if spots.is_empty() { None } else { Some(OutlierQuantile::from_spots(&spots)) };

        let regression = if spots.is_empty() {
            None
        } else {
            // a tighter outlier pass for the trend input only
            let values: Vec<f64> = spots.iter().map(|s| s.y).collect();
            let close_quantile = OutlierQuantile::new(
                values,
                true,
                SUMMARY_OUTLIER_SIGMA,
                OUTLIER_RANGE_FACTOR_DEFAULT,
                Vec::new(),
            );
            let outliers = close_quantile.outliers();
            let trend_spots: Vec<Spot<f64>> =
                spots.iter().copied().filter(|s| !outliers.contains(&s.y)).collect();
            if trend_spots.is_empty() {
                None
            } else {
                Some(SingleResponseRegression::new(&trend_spots, RegressionType::Quadratic))
            }
        };

        Self { spots, index_first, index_last, display_quantile, regression }
    }

    /// False if the bounds hold no samples; value accessors must not be
    /// called on an invalid section.
    pub fn is_valid_bounds(&self) -> bool {
        !self.spots.is_empty()
    }

    /// The first/last time-step indices of the section bounds.
    pub fn index_first_last(&self) -> (usize, usize) {
        (self.index_first, self.index_last)
    }

    pub fn spots(&self) -> &[Spot<f64>] {
        &self.spots
    }

    fn regression(&self) -> &SingleResponseRegression {
        self.regression.as_ref().expect("value access on an invalid section")
    }

    /// The display quantile over the unfiltered samples.
    pub fn quantile(&self) -> &OutlierQuantile {
        self.display_quantile.as_ref().expect("value access on an invalid section")
    }

    /// The average of the decoded values within the bounds.
    pub fn bounded_avg(&self) -> f64 {
        self.regression().avg()
    }

    /// The linear trend value at the timestamp.
    pub fn bounded_slope_value(&self, timestamp_ms: i64) -> f64 {
        let regression = self.regression();
        regression.slope() * timestamp_ms as f64 + regression.intercept()
    }

    /// True if the trend degenerates to a parabola worth drawing; false means
    /// the fit is effectively linear (tiny sample count or genuinely linear).
    pub fn is_bounded_parabola(&self) -> bool {
        self.regression.as_ref().map(|r| r.gamma() != 0.).unwrap_or(false)
    }

    /// The parabola responses, one spot per trend input sample.
    pub fn bounded_parabola_values(&self) -> Vec<Spot<f64>> {
        self.regression().responses()
    }

    /// The delta between the last and the first decoded sample value.
    pub fn bounded_delta(&self) -> f64 {
        self.regression().delta()
    }

    /// The seven Tukey box plot values over the unfiltered samples.
    pub fn bounded_boxplot_values(&self) -> [f64; 7] {
        self.quantile().quantile().tukey_box_plot()
    }
}
