//! Quantile estimators over decoded sample populations.
//!
//! [`Quantile`] is the plain estimator used for box plots and scale extrema.
//! [`OutlierQuantile`] additionally eliminates outcasts and sigma-based
//! outliers before the quantiles are taken; the removed values stay
//! accessible for outlier display.

use tracing::trace;

use super::{probability_within, Spot, BOXPLOT_OUTLIER_FACTOR};

/// Index names for the values returned by [`Quantile::tukey_box_plot`] and
/// [`Quantile::tukey_with_quartile_tolerances`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoxplotItem {
    Quartile0,
    LowerWhisker,
    Quartile1,
    Quartile2,
    Quartile3,
    UpperWhisker,
    Quartile4,
    LowerTolerance,
    UpperTolerance,
}

impl BoxplotItem {
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// How the tolerance interval around the median is derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ToleranceMode {
    /// Half the interquantile range on both sides.
    Canonical,
    /// Half range on both sides, sigma-based fallback for degenerate quartiles.
    Symmetric,
    /// Separate lower/upper ranges, sigma-based fallback for degenerate quartiles.
    #[default]
    Asymmetric,
}

/// Quantile estimator over a sorted value trunk; the population is sorted
/// once at construction and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct Quantile {
    trunk: Vec<f64>,
    is_sample: bool,
    mode: ToleranceMode,
}

impl Quantile {
    /// `is_sample` true calculates sample statistics (R-6 quantile rule).
    pub fn new(mut population: Vec<f64>, is_sample: bool) -> Self {
        population.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        Self { trunk: population, is_sample, mode: ToleranceMode::default() }
    }

    pub fn with_mode(mut self, mode: ToleranceMode) -> Self {
        self.mode = mode;
        self
    }

    pub(crate) fn from_sorted(trunk: Vec<f64>, is_sample: bool) -> Self {
        Self { trunk, is_sample, mode: ToleranceMode::default() }
    }

    /// The population size.
    pub fn size(&self) -> usize {
        self.trunk.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trunk.is_empty()
    }

    pub fn sum_figure(&self) -> f64 {
        self.trunk.iter().sum()
    }

    pub fn avg_figure(&self) -> f64 {
        self.trunk.iter().sum::<f64>() / self.trunk.len() as f64
    }

    /// Running (Welford) standard deviation over the trunk.
    pub fn sigma_figure(&self) -> f64 {
        let mut avg = 0.;
        let mut var_times_n = 0.;
        let mut count = 0usize;
        for &value in &self.trunk {
            var_times_n += (value - avg) * (value - avg) * count as f64 / (count + 1) as f64;
            count += 1;
            avg += (value - avg) / count as f64;
        }
        let divisor = if self.is_sample { count.saturating_sub(1) } else { count };
        if divisor > 0 {
            (var_times_n / divisor as f64).sqrt()
        } else {
            0.
        }
    }

    /// The quantile at `probability_cut_point` (between 0 and 1). Samples
    /// interpolate linearly per the symmetric R-6 rule; full populations use
    /// the midpoint rule instead.
    pub fn quantile(&self, probability_cut_point: f64) -> f64 {
        let p_size = self.trunk.len();
        assert!(p_size > 0, "quantile over an empty population");
        if self.is_sample {
            if probability_cut_point >= 1. / (p_size + 1) as f64
                && probability_cut_point < p_size as f64 / (p_size + 1) as f64
            {
                let position = (p_size + 1) as f64 * probability_cut_point;
                let base = position as usize - 1;
                self.trunk[base] + (position - position.trunc()) * (self.trunk[base + 1] - self.trunk[base])
            } else if probability_cut_point < 1. / (p_size + 1) as f64 {
                self.trunk[0]
            } else {
                self.trunk[p_size - 1]
            }
        } else if probability_cut_point > 0. && probability_cut_point < 1. {
            let position = p_size as f64 * probability_cut_point;
            if position % 2. == 0. {
                let base = (position as usize).min(p_size - 1);
                let next = (base + 1).min(p_size - 1);
                (self.trunk[base] + self.trunk[next]) / 2.
            } else {
                self.trunk[(position as usize).min(p_size - 1)]
            }
        } else if probability_cut_point == 0. {
            self.trunk[0]
        } else {
            self.trunk[p_size - 1]
        }
    }

    pub fn quartile0(&self) -> f64 {
        self.trunk[0]
    }

    pub fn quartile1(&self) -> f64 {
        self.quantile(0.25)
    }

    pub fn quartile2(&self) -> f64 {
        self.quantile(0.5)
    }

    pub fn quartile3(&self) -> f64 {
        self.quantile(0.75)
    }

    pub fn quartile4(&self) -> f64 {
        self.trunk[self.trunk.len() - 1]
    }

    /// The interquantile ranges or equivalent intervals based on a normal
    /// distribution, as a `[lower, upper]` pair.
    pub fn quantile_tolerance_lower_upper(&self, sigma_factor: f64) -> [f64; 2] {
        let outlier_probability = (1. - probability_within(sigma_factor)) / 2.;
        let q1 = self.quantile(outlier_probability);
        let q2 = self.quartile2();
        let q3 = self.quantile(1. - outlier_probability);
        match self.mode {
            ToleranceMode::Canonical => {
                let half = (q3 - q1) / 2.;
                [half, half]
            }
            ToleranceMode::Symmetric => {
                if super::fuzzy_equals(q3 - q1, 0.)
                    // all-zero quartiles mark event counters, not flat data
                    && !super::fuzzy_equals(q3, 0.)
                    && !super::fuzzy_equals(q1, 0.)
                {
                    // sigma-based interval for a collapsed quartile range
                    let half = self.sigma_figure() * sigma_factor;
                    trace!(avg = self.avg_figure(), sigma = self.sigma_figure(), "degenerate quartiles");
                    [half, half]
                } else {
                    let half = (q3 - q1) / 2.;
                    [half, half]
                }
            }
            ToleranceMode::Asymmetric => {
                if (super::fuzzy_equals(q3 - q1, 0.)
                    || super::fuzzy_equals(q2 - q1, 0.)
                    || super::fuzzy_equals(q3 - q2, 0.))
                    && !super::fuzzy_equals(q3, 0.)
                    && !super::fuzzy_equals(q1, 0.)
                {
                    let half = self.sigma_figure() * sigma_factor;
                    trace!(avg = self.avg_figure(), sigma = self.sigma_figure(), "degenerate quartiles");
                    [half, half]
                } else {
                    [q2 - q1, q3 - q2]
                }
            }
        }
    }

    /// Tolerance intervals for the interquartile sigma factor.
    pub fn quartile_tolerance_lower_upper(&self) -> [f64; 2] {
        self.quantile_tolerance_lower_upper(super::INTER_QUARTILE_SIGMA_FACTOR)
    }

    /// The outmost trunk value within the range spanned by `outlier_factor`
    /// tolerance intervals beyond the quartiles. A negative factor scans from
    /// the lower end, a positive factor from the upper end.
    pub fn extremum_from_range(&self, sigma_factor: f64, outlier_factor: f64) -> f64 {
        assert!(outlier_factor != 0., "outlier factor must not be zero");
        let tolerance = self.quantile_tolerance_lower_upper(sigma_factor);
        if super::fuzzy_equals(tolerance[0] + tolerance[1], 0.) {
            self.quartile2()
        } else if outlier_factor < 0. {
            let min_limit = self.quartile1() + outlier_factor * 2. * tolerance[0];
            for &value in &self.trunk {
                if value >= min_limit {
                    return value;
                }
            }
            unreachable!("trunk holds no value above its own minimum limit");
        } else {
            let max_limit = self.quartile3() + outlier_factor * 2. * tolerance[1];
            for &value in self.trunk.iter().rev() {
                if value <= max_limit {
                    return value;
                }
            }
            unreachable!("trunk holds no value below its own maximum limit");
        }
    }

    pub fn quantile_lower_whisker(&self) -> f64 {
        let probability_cut_point = 0.25;
        let whisker_start = self.quantile(probability_cut_point);
        let whisker_limit =
            whisker_start - self.quartile_tolerance_lower_upper()[0] * 2. * BOXPLOT_OUTLIER_FACTOR;
        let mut value = whisker_start;
        let mut i = 0usize;
        while (i as f64) < self.trunk.len() as f64 * probability_cut_point {
            if self.trunk[i] >= whisker_limit {
                // re-estimate at the index midpoint so sample interpolation
                // stays within 0<p<1
                value = self.quantile((0.5 + i as f64) / self.trunk.len() as f64);
                // never report a whisker beyond its own limit
                value = if value < whisker_limit { whisker_limit } else { value };
                break;
            }
            i += 1;
        }
        value
    }

    pub fn quantile_upper_whisker(&self) -> f64 {
        let probability_cut_point = 0.75;
        let whisker_start = self.quantile(probability_cut_point);
        let whisker_limit =
            whisker_start + self.quartile_tolerance_lower_upper()[1] * 2. * BOXPLOT_OUTLIER_FACTOR;
        let mut value = whisker_start;
        let mut i = self.trunk.len() as i64 - 1;
        while i as f64 >= self.trunk.len() as f64 * probability_cut_point {
            if self.trunk[i as usize] <= whisker_limit {
                value = self.quantile((0.5 + i as f64) / self.trunk.len() as f64);
                value = if value > whisker_limit { whisker_limit } else { value };
                break;
            }
            i -= 1;
        }
        value
    }

    /// The seven Tukey box plot values indexed by [`BoxplotItem`].
    pub fn tukey_box_plot(&self) -> [f64; 7] {
        [
            self.quartile0(),
            self.quantile_lower_whisker(),
            self.quartile1(),
            self.quartile2(),
            self.quartile3(),
            self.quantile_upper_whisker(),
            self.quartile4(),
        ]
    }

    /// The Tukey box plot extended by the lower/upper quartile tolerances.
    pub fn tukey_with_quartile_tolerances(&self) -> [f64; 9] {
        let tolerance = self.quartile_tolerance_lower_upper();
        let box_plot = self.tukey_box_plot();
        [
            box_plot[0], box_plot[1], box_plot[2], box_plot[3], box_plot[4], box_plot[5],
            box_plot[6], tolerance[0], tolerance[1],
        ]
    }
}

/// Quantile calculation after eliminating outcast members and removing
/// outliers beyond the sigma-based tolerance interval.
#[derive(Debug, Clone)]
pub struct OutlierQuantile {
    quantile: Quantile,
    outcasts: Vec<f64>,
    /// Outlier and outcast members not contained in the trunk.
    castaways: Vec<f64>,
    first_valid: Option<f64>,
    last_valid: Option<f64>,
}

impl OutlierQuantile {
    /// Does not remove outliers. The population is taken as a sample.
    pub fn from_spots(population: &[Spot<f64>]) -> Self {
        assert!(!population.is_empty(), "empty population");
        let values: Vec<f64> = population.iter().map(|s| s.y).collect();
        let first = values[0];
        let last = values[values.len() - 1];
        let mut sorted = values;
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        Self {
            quantile: Quantile::from_sorted(sorted, true),
            outcasts: Vec::new(),
            castaways: Vec::new(),
            first_valid: Some(first),
            last_valid: Some(last),
        }
    }

    /// `sigma_factor` spans the tolerance interval, `outlier_factor` the
    /// outlier distance limit beyond it. `outcasts` are eliminated before the
    /// quantile calculation.
    pub fn new(
        population: Vec<f64>,
        is_sample: bool,
        sigma_factor: f64,
        outlier_factor: f64,
        outcasts: Vec<f64>,
    ) -> Self {
        assert!(!population.is_empty(), "empty population");
        let mut castaways = Vec::new();
        let mut trunk = Vec::with_capacity(population.len());
        for &element in &population {
            if outcasts.contains(&element) {
                castaways.push(element);
            } else {
                trunk.push(element);
            }
        }
        trunk.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        // trim one extreme per pass; the limits re-derive from the
        // remaining trunk after every removal
        let outlier_probability = (1. - probability_within(sigma_factor)) / 2.;
        loop {
            let quantile = Quantile::from_sorted(trunk.clone(), is_sample);
            if quantile.is_empty() {
                break;
            }
            let extremum_range = (quantile.quantile(1. - outlier_probability)
                - quantile.quantile(outlier_probability))
                * outlier_factor;
            if trunk[0] < quantile.quantile(outlier_probability) - extremum_range {
                castaways.push(trunk.remove(0));
            } else if trunk[trunk.len() - 1]
                > quantile.quantile(1. - outlier_probability) + extremum_range
            {
                castaways.push(trunk.remove(trunk.len() - 1));
            } else {
                break;
            }
        }
        assert!(!trunk.is_empty(), "empty trunk after outlier removal");

        let first_valid = population.iter().copied().find(|v| !castaways.contains(v));
        let last_valid = population.iter().rev().copied().find(|v| !castaways.contains(v));

        Self {
            quantile: Quantile::from_sorted(trunk, is_sample),
            outcasts,
            castaways,
            first_valid,
            last_valid,
        }
    }

    /// The quantile estimator over the remaining population.
    pub fn quantile(&self) -> &Quantile {
        &self.quantile
    }

    /// The value of the first element after eliminations and outlier removal.
    pub fn first_figure(&self) -> f64 {
        self.first_valid.expect("no valid element")
    }

    /// The value of the last element after eliminations and outlier removal.
    pub fn last_figure(&self) -> f64 {
        self.last_valid.expect("no valid element")
    }

    /// The maximum of the population before eliminations and outlier removal.
    pub fn population_max_figure(&self) -> f64 {
        self.castaways.iter().fold(self.quantile.quartile4(), |max, &v| max.max(v))
    }

    /// The minimum of the population before eliminations and outlier removal.
    pub fn population_min_figure(&self) -> f64 {
        self.castaways.iter().fold(self.quantile.quartile0(), |min, &v| min.min(v))
    }

    /// The outliers based on the sigma factor and the outlier factor,
    /// excluding the outcast members.
    pub fn outliers(&self) -> Vec<f64> {
        self.castaways.iter().copied().filter(|v| !self.outcasts.contains(v)).collect()
    }

    pub fn size(&self) -> usize {
        self.quantile.size()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quartiles_of_a_small_sample() {
        let q = Quantile::new(vec![1., 2., 3., 4., 5., 6., 7., 8., 9.], true);
        assert_eq!(q.quartile0(), 1.);
        assert_eq!(q.quartile2(), 5.);
        assert_eq!(q.quartile4(), 9.);
        assert_eq!(q.quartile1(), 2.5);
        assert_eq!(q.quartile3(), 7.5);
    }

    #[test]
    fn single_element_population_is_degenerate_but_safe() {
        let q = Quantile::new(vec![42.], true);
        assert_eq!(q.quartile0(), 42.);
        assert_eq!(q.quartile1(), 42.);
        assert_eq!(q.quartile2(), 42.);
        assert_eq!(q.quartile3(), 42.);
        assert_eq!(q.quartile4(), 42.);
        let plot = q.tukey_box_plot();
        assert!(plot.iter().all(|&v| v == 42.));
    }

    fn noisy_population() -> Vec<f64> {
        (0..100).map(|i| 10. + (i % 20) as f64 * 0.1).collect()
    }

    #[test]
    fn outlier_quantile_removes_far_values() {
        let mut population = noisy_population();
        population.push(1000.);
        let oq = OutlierQuantile::new(population, true, crate::stats::SUMMARY_OUTLIER_SIGMA, 2., Vec::new());
        assert_eq!(oq.outliers(), vec![1000.]);
        assert_eq!(oq.size(), 100);
        assert_eq!(oq.population_max_figure(), 1000.);
    }

    #[test]
    fn outlier_filtering_is_idempotent() {
        let mut population = noisy_population();
        population.insert(50, 1000.);
        let first = OutlierQuantile::new(
            population.clone(),
            true,
            crate::stats::SUMMARY_OUTLIER_SIGMA,
            2.,
            Vec::new(),
        );
        let second =
            OutlierQuantile::new(population, true, crate::stats::SUMMARY_OUTLIER_SIGMA, 2., Vec::new());
        assert_eq!(first.outliers(), second.outliers());
        assert_eq!(first.outliers(), vec![1000.]);
    }

    #[test]
    fn repeated_low_extremes_are_each_removed() {
        let mut population = noisy_population();
        population.push(0.);
        population.push(0.);
        let oq = OutlierQuantile::new(population, true, crate::stats::SUMMARY_OUTLIER_SIGMA, 2., Vec::new());
        assert_eq!(oq.size(), 100);
        assert_eq!(oq.outliers(), vec![0., 0.]);
    }

    #[test]
    fn outcasts_are_not_reported_as_outliers() {
        let population = vec![1., 2., 3., 4., 100.];
        let oq = OutlierQuantile::new(population, true, 3., 2., vec![100.]);
        assert!(oq.outliers().is_empty());
        assert_eq!(oq.size(), 4);
    }
}
