//! The trail taxonomy: a closed enumeration of the per-recording aggregate
//! kinds a record can display, with the static metadata driving selection,
//! population and display ordering.

use once_cell::sync::Lazy;

/// Every trail kind the engine knows. Legacy trails carry the statistics of
/// the measurement evaluation; smart trails carry quantile statistics. Suites
/// bundle several related trails into one display (box plots, range bands).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrailType {
    // legacy primitives
    RealAvg,
    RealMin,
    RealMax,
    RealSd,
    RealFirst,
    RealLast,
    RealSumTriggered,
    RealTimeSumTriggered,
    RealCountTriggered,
    RealAvgRatioTriggered,
    RealMaxRatioTriggered,
    // smart primitives
    Avg,
    Min,
    Max,
    Sd,
    Q0,
    Q1,
    Q2,
    Q3,
    Q4,
    QLowerWhisker,
    QUpperWhisker,
    First,
    Last,
    // suites
    SuiteRealAvgSd,
    SuiteRealAvgMinMax,
    SuiteAvgSd,
    SuiteQuartiles,
    SuiteBoxPlot,
}

/// All trail types in ordinal order.
pub const TRAIL_TYPES: [TrailType; 29] = [
    TrailType::RealAvg,
    TrailType::RealMin,
    TrailType::RealMax,
    TrailType::RealSd,
    TrailType::RealFirst,
    TrailType::RealLast,
    TrailType::RealSumTriggered,
    TrailType::RealTimeSumTriggered,
    TrailType::RealCountTriggered,
    TrailType::RealAvgRatioTriggered,
    TrailType::RealMaxRatioTriggered,
    TrailType::Avg,
    TrailType::Min,
    TrailType::Max,
    TrailType::Sd,
    TrailType::Q0,
    TrailType::Q1,
    TrailType::Q2,
    TrailType::Q3,
    TrailType::Q4,
    TrailType::QLowerWhisker,
    TrailType::QUpperWhisker,
    TrailType::First,
    TrailType::Last,
    TrailType::SuiteRealAvgSd,
    TrailType::SuiteRealAvgMinMax,
    TrailType::SuiteAvgSd,
    TrailType::SuiteQuartiles,
    TrailType::SuiteBoxPlot,
];

static PRIMITIVES: Lazy<Vec<TrailType>> =
    Lazy::new(|| TRAIL_TYPES.iter().copied().filter(|t| !t.is_suite()).collect());

static SUITES: Lazy<Vec<TrailType>> =
    Lazy::new(|| TRAIL_TYPES.iter().copied().filter(|t| t.is_suite()).collect());

impl TrailType {
    pub fn ordinal(self) -> usize {
        self as usize
    }

    /// Panics on an ordinal outside the taxonomy.
    pub fn from_ordinal(ordinal: usize) -> TrailType {
        TRAIL_TYPES[ordinal]
    }

    /// The non-suite trail types in ordinal order.
    pub fn primitives() -> &'static [TrailType] {
        &PRIMITIVES
    }

    /// The suite trail types in ordinal order.
    pub fn suites() -> &'static [TrailType] {
        &SUITES
    }

    /// The fallback trail guaranteeing at least one applicable entry.
    pub fn substitute(smart_statistics: bool) -> TrailType {
        if smart_statistics {
            TrailType::Q2
        } else {
            TrailType::RealAvg
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            TrailType::RealAvg => "real avg",
            TrailType::RealMin => "real min",
            TrailType::RealMax => "real max",
            TrailType::RealSd => "real sd",
            TrailType::RealFirst => "real first",
            TrailType::RealLast => "real last",
            TrailType::RealSumTriggered => "sum (trigger)",
            TrailType::RealTimeSumTriggered => "time sum (trigger)",
            TrailType::RealCountTriggered => "count (trigger)",
            TrailType::RealAvgRatioTriggered => "avg ratio (trigger)",
            TrailType::RealMaxRatioTriggered => "max ratio (trigger)",
            TrailType::Avg => "avg",
            TrailType::Min => "min",
            TrailType::Max => "max",
            TrailType::Sd => "sd",
            TrailType::Q0 => "q0",
            TrailType::Q1 => "q1",
            TrailType::Q2 => "q2 (median)",
            TrailType::Q3 => "q3",
            TrailType::Q4 => "q4",
            TrailType::QLowerWhisker => "lower whisker",
            TrailType::QUpperWhisker => "upper whisker",
            TrailType::First => "first",
            TrailType::Last => "last",
            TrailType::SuiteRealAvgSd => "real avg +- sd",
            TrailType::SuiteRealAvgMinMax => "real avg/min/max",
            TrailType::SuiteAvgSd => "avg +- sd",
            TrailType::SuiteQuartiles => "quartiles",
            TrailType::SuiteBoxPlot => "box plot",
        }
    }

    /// True for trails based on quantile statistics.
    pub fn is_smart_statistics(self) -> bool {
        !matches!(
            self,
            TrailType::RealAvg
                | TrailType::RealMin
                | TrailType::RealMax
                | TrailType::RealSd
                | TrailType::RealFirst
                | TrailType::RealLast
                | TrailType::RealSumTriggered
                | TrailType::RealTimeSumTriggered
                | TrailType::RealCountTriggered
                | TrailType::RealAvgRatioTriggered
                | TrailType::RealMaxRatioTriggered
                | TrailType::SuiteRealAvgSd
                | TrailType::SuiteRealAvgMinMax
        )
    }

    /// True for legacy trails conditional on a device trigger declaration.
    pub fn is_triggered(self) -> bool {
        matches!(
            self,
            TrailType::RealSumTriggered
                | TrailType::RealTimeSumTriggered
                | TrailType::RealCountTriggered
                | TrailType::RealAvgRatioTriggered
                | TrailType::RealMaxRatioTriggered
        )
    }

    /// True for trails with a number range alien to the measurement values
    /// (deviations, counters, sums, ratios). Alien suite members take the
    /// alternating summation treatment; alien records are excluded from
    /// summary scale synchronization.
    pub fn is_alien_value(self) -> bool {
        matches!(
            self,
            TrailType::RealSd
                | TrailType::Sd
                | TrailType::RealSumTriggered
                | TrailType::RealTimeSumTriggered
                | TrailType::RealCountTriggered
                | TrailType::RealAvgRatioTriggered
                | TrailType::RealMaxRatioTriggered
        )
    }

    pub fn is_suite(self) -> bool {
        !self.suite_members().is_empty()
    }

    /// The member trails of a suite in their logical order; empty for
    /// primitive trails.
    pub fn suite_members(self) -> &'static [TrailType] {
        match self {
            TrailType::SuiteRealAvgSd => {
                &[TrailType::RealAvg, TrailType::RealSd, TrailType::RealSd]
            }
            TrailType::SuiteRealAvgMinMax => {
                &[TrailType::RealAvg, TrailType::RealMin, TrailType::RealMax]
            }
            TrailType::SuiteAvgSd => &[TrailType::Avg, TrailType::Sd, TrailType::Sd],
            TrailType::SuiteQuartiles => &[TrailType::Q1, TrailType::Q2, TrailType::Q3],
            TrailType::SuiteBoxPlot => &[
                TrailType::Q0,
                TrailType::QLowerWhisker,
                TrailType::Q1,
                TrailType::Q2,
                TrailType::Q3,
                TrailType::QUpperWhisker,
                TrailType::Q4,
            ],
            _ => &[],
        }
    }

    /// True for suites whose members are drawn as a box plot (raw values).
    pub fn is_box_plot(self) -> bool {
        matches!(self, TrailType::SuiteQuartiles | TrailType::SuiteBoxPlot)
    }

    /// True for suites drawn as a band around a master curve.
    pub fn is_range_plot(self) -> bool {
        matches!(
            self,
            TrailType::SuiteRealAvgSd | TrailType::SuiteRealAvgMinMax | TrailType::SuiteAvgSd
        )
    }

    /// Member index of the suite master (the representative single value).
    pub fn suite_master_index(self) -> usize {
        match self {
            TrailType::SuiteQuartiles => 1,
            TrailType::SuiteBoxPlot => 3,
            _ => 0,
        }
    }

    /// Member index of the lower band/box value.
    pub fn suite_lower_index(self) -> usize {
        match self {
            TrailType::SuiteQuartiles => 0,
            _ => 1,
        }
    }

    /// Member index of the upper band/box value.
    pub fn suite_upper_index(self) -> usize {
        match self {
            TrailType::SuiteQuartiles => 2,
            TrailType::SuiteBoxPlot => 5,
            _ => 2,
        }
    }

    /// Priority for the default trail selection; lower is preferred.
    pub fn display_sequence(self) -> u32 {
        match self {
            TrailType::Q2 => 1,
            TrailType::Avg => 2,
            TrailType::RealAvg => 3,
            TrailType::Max => 4,
            TrailType::Min => 5,
            TrailType::RealMax => 6,
            TrailType::RealMin => 7,
            TrailType::Q1 => 8,
            TrailType::Q3 => 9,
            TrailType::Q0 => 10,
            TrailType::Q4 => 11,
            TrailType::QLowerWhisker => 12,
            TrailType::QUpperWhisker => 13,
            TrailType::Sd => 14,
            TrailType::RealSd => 15,
            TrailType::First => 16,
            TrailType::Last => 17,
            TrailType::RealFirst => 18,
            TrailType::RealLast => 19,
            TrailType::RealSumTriggered => 20,
            TrailType::RealTimeSumTriggered => 21,
            TrailType::RealCountTriggered => 22,
            TrailType::RealAvgRatioTriggered => 23,
            TrailType::RealMaxRatioTriggered => 24,
            TrailType::SuiteAvgSd => 25,
            TrailType::SuiteQuartiles => 26,
            TrailType::SuiteBoxPlot => 27,
            TrailType::SuiteRealAvgSd => 28,
            TrailType::SuiteRealAvgMinMax => 29,
        }
    }
}
