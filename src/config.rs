//! Engine configuration.
//!
//! The display switches travel explicitly with the record set instead of
//! living in a process-wide settings singleton, so behavior is testable
//! with different configurations side by side.

use crate::stats::quantile::ToleranceMode;

#[derive(Debug, Clone)]
pub struct HistoDisplaySettings {
    /// True if the history analysis uses quantile values instead of legacy statistics.
    pub smart_statistics: bool,
    /// True displays the most recent recording on the left.
    pub x_axis_reversed: bool,
    /// False suppresses all settlement records.
    pub display_settlements: bool,
    /// False suppresses all score records.
    pub display_scores: bool,
    /// True restricts data tables to visible records.
    pub partial_data_table: bool,
    /// Additional scale margin for the summary extrema, in tolerance interval steps.
    pub summary_scale_spread: i32,
    /// Outlier warning category threshold; -1 disables warnings.
    pub warning_level: i32,
    /// Number of most recent recordings checked for warnings.
    pub warning_count: usize,
    /// Cluster radius for GPS location assignment.
    pub gps_location_radius_km: f64,
    /// Boxplot size setting (0 = small .. 2 = large).
    pub boxplot_scale_ordinal: usize,
    /// False reduces the summary strip to the warning markers.
    pub summary_spots_visible: bool,
    /// Tolerance interval derivation for quantile statistics.
    pub tolerance_mode: ToleranceMode,
}

impl Default for HistoDisplaySettings {
    fn default() -> Self {
        Self {
            smart_statistics: true,
            x_axis_reversed: true,
            display_settlements: true,
            display_scores: true,
            partial_data_table: false,
            summary_scale_spread: 4,
            warning_level: 0,
            warning_count: 3,
            gps_location_radius_km: 0.75,
            boxplot_scale_ordinal: 1,
            summary_spots_visible: true,
            tolerance_mode: ToleranceMode::Asymmetric,
        }
    }
}
