//! Summary strip layout: lays out each record's per-time-step values into a
//! compact 2D marker map for the summary visualization.
//!
//! x/y values define the lower left corner of a square marker element; the
//! drawing itself belongs to the display layer.

use std::collections::BTreeMap;

use tracing::trace;

use crate::config::HistoDisplaySettings;
use crate::format::{decode_delta_value, encode_vault_value};
use crate::stats::quantile::Quantile;
use crate::trail::record::TrailRecord;

/// Category of an outlier warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutlierWarning {
    Far,
    Close,
    Whisker,
}

impl OutlierWarning {
    /// True if the warning level setting enables this category.
    pub fn is_included(self, warning_level: i32) -> bool {
        warning_level >= self as i32
    }
}

/// Marker element size derived from the marker count per strip width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Density {
    Extreme,
    High,
    Medium,
    Low,
}

impl Density {
    /// Number of pixels for comparison with the average pixel distance,
    /// corresponding to the extreme density threshold at the medium boxplot
    /// scale setting.
    const DISTANCE_THRESHOLD: i32 = 25;

    pub fn marker_width(self) -> i32 {
        match self {
            Density::Extreme => 2,
            Density::High => 3,
            Density::Medium => 4,
            Density::Low => 5,
        }
    }

    fn threshold_distance(self, boxplot_scale_ordinal: usize) -> i32 {
        self.marker_width() * Self::DISTANCE_THRESHOLD / (1 + boxplot_scale_ordinal as i32)
    }

    /// Choose the density from the strip width and the marker count.
    pub fn from_extent(draw_area_width: i32, marker_count: usize, boxplot_scale_ordinal: usize) -> Density {
        let avg_distance = draw_area_width / marker_count.max(1) as i32;
        let density = if avg_distance > Density::Low.threshold_distance(boxplot_scale_ordinal) {
            Density::Low
        } else if avg_distance > Density::Medium.threshold_distance(boxplot_scale_ordinal) {
            Density::Medium
        } else if avg_distance > Density::High.threshold_distance(boxplot_scale_ordinal) {
            Density::High
        } else {
            Density::Extreme
        };
        trace!(?density, avg_distance, "density");
        density
    }
}

/// Plain pixel rectangle of the drawing strip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }
}

/// Marker elements for one x axis position in the summary record row.
/// The value is the record's data point index, keeping a back reference to
/// the vault data; null entries belong to markers which are not drawn.
#[derive(Debug, Clone)]
pub struct PosMarkers {
    record_indices: Vec<Option<usize>>,
    /// Measured downwards from the top of the strip.
    y_positions: Vec<Option<i32>>,
    element_width: i32,
    y_step: i32,
    half_drawing_height: i32,
    /// Completed walk cycles over the strip height.
    cycle_number: i32,
    /// Offset from the strip midline for the marker placed next.
    next_relative_y_pos: i32,
}

impl PosMarkers {
    fn new(strip_height: i32, element_width: i32) -> Self {
        Self {
            record_indices: Vec::new(),
            y_positions: Vec::new(),
            element_width,
            y_step: element_width + 1,
            // one pixel row stays free at the strip border
            half_drawing_height: (strip_height - 1) / 2,
            cycle_number: 0,
            next_relative_y_pos: 0,
        }
    }

    /// Append a marker for the record's data point index. Stacked markers
    /// walk away from the midline, alternating between the halves.
    fn add(&mut self, record_index: usize) {
        let y_position = -self.next_relative_y_pos + self.half_drawing_height;
        self.y_positions.push(Some(y_position));

        if (self.record_indices.len() as i32 - 1) % 2 == 0 && self.next_relative_y_pos != 0 {
            self.next_relative_y_pos = -self.next_relative_y_pos.abs(); // mirror below
        } else {
            self.next_relative_y_pos = self.next_relative_y_pos.abs() + self.y_step; // step outward
        }
        if self.next_relative_y_pos > self.half_drawing_height - self.element_width / 2 {
            self.cycle_number += 1;
            // the walk left the strip: restart near the midline, offset per
            // cycle so markers do not pile on the same pixel
            self.next_relative_y_pos = self.y_step - self.cycle_number % self.y_step - 1;
        }
        self.record_indices.push(Some(record_index));
    }

    /// Blank the marker at `index`, keeping the layout of the others.
    pub fn set_to_null(&mut self, index: usize) {
        if index < self.record_indices.len() {
            self.record_indices[index] = None;
            self.y_positions[index] = None;
        }
    }

    pub fn len(&self) -> usize {
        self.record_indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.record_indices.is_empty()
    }

    pub fn record_indices(&self) -> &[Option<usize>] {
        &self.record_indices
    }

    pub fn y_positions(&self) -> &[Option<i32>] {
        &self.y_positions
    }
}

/// The displayable marker objects of one record row. The key is the x axis
/// position with a step distance defined by the element size.
#[derive(Debug)]
pub struct SummarySpots {
    strip: Rect,
    element_width: i32,
    /// Start position for the first marker.
    strip_net_x0: i32,
    /// Relative start position for the last marker.
    strip_net_width: i32,
    x_value_scale_factor: f64,
    x_value_offset: f64,
    x_point_scale_factor: f64,
    x_point_offset: f64,
    positions: BTreeMap<i32, PosMarkers>,
}

impl SummarySpots {
    /// Lay out the markers of `record` into the strip. `scale_min`/`scale_max`
    /// are the decoded scale bounds; the marker count is limited to the most
    /// recent recordings unless the settings ask for all spots.
    pub fn new(
        record: &TrailRecord,
        strip: Rect,
        density: Density,
        scale_min: f64,
        scale_max: f64,
        settings: &HistoDisplaySettings,
    ) -> Self {
        let element_width = density.marker_width();
        let strip_net_x0 = strip.x + element_width / 2;
        // margins absorb marker overlap; the net width snaps to the element grid
        let tmp_width = strip.width - element_width;
        let strip_net_width = tmp_width - tmp_width % element_width;

        let scale_delta = scale_max - scale_min;
        let x_value_scale_factor = strip_net_width as f64 / scale_delta;
        let x_value_offset = scale_min * x_value_scale_factor - 0.5;

        let x_point_scale_factor = decode_delta_value(record.data_type(), record.factor(), 1. / 1000.)
            / (scale_delta / strip_net_width as f64);
        let x_point_offset = encode_vault_value(
            record.data_type(),
            record.factor(),
            record.offset(),
            record.reduction(),
            scale_min,
        ) * 1000.
            * x_point_scale_factor
            - 0.5;

        let mut spots = Self {
            strip,
            element_width,
            strip_net_x0,
            strip_net_width,
            x_value_scale_factor,
            x_value_offset,
            x_point_scale_factor,
            x_point_offset,
            positions: BTreeMap::new(),
        };
        let limit = if settings.summary_spots_visible { usize::MAX } else { settings.warning_count };
        spots.define_x_positions(record, limit);
        spots
    }

    /// Rebuild from the record or suite master data, taking the upmost
    /// timestamps only when limited.
    fn define_x_positions(&mut self, record: &TrailRecord, limit: usize) {
        let points = record.master_points();
        let actual_limit = if limit > 0 && limit < points.len() { limit } else { points.len() };
        for (i, point) in points.iter().take(actual_limit).enumerate() {
            if let Some(point) = point {
                let x_pos = self.x_pos_point(*point);
                let x_drawer = x_pos - x_pos % self.element_width;
                self.positions
                    .entry(x_drawer)
                    .or_insert_with(|| PosMarkers::new(self.strip.height, self.element_width))
                    .add(i);
            }
        }
    }

    /// The x axis position for a decoded measurement value, not restricted to
    /// the drawing area.
    pub fn x_pos_value(&self, value: f64) -> i32 {
        (value * self.x_value_scale_factor - self.x_value_offset) as i32
    }

    /// The x axis position for a raw record point value.
    fn x_pos_point(&self, point: i32) -> i32 {
        (point as f64 * self.x_point_scale_factor - self.x_point_offset) as i32
    }

    pub fn positions(&self) -> &BTreeMap<i32, PosMarkers> {
        &self.positions
    }

    pub fn element_width(&self) -> i32 {
        self.element_width
    }

    /// The x positions of the seven Tukey box plot values.
    pub fn tukey_x_positions(&self, quantile: &Quantile) -> [i32; 7] {
        let tukey = quantile.tukey_box_plot();
        let mut result = [0; 7];
        for (i, value) in tukey.iter().enumerate() {
            result[i] = self.x_pos_value(*value);
        }
        result
    }

    /// The x positions for avg - 2 sigma, avg and avg + 2 sigma.
    pub fn spread_x_positions(&self, quantile: &Quantile) -> [i32; 3] {
        let avg = quantile.avg_figure();
        let sigma = quantile.sigma_figure();
        [
            self.x_pos_value(avg - 2. * sigma),
            self.x_pos_value(avg),
            self.x_pos_value(avg + 2. * sigma),
        ]
    }

    /// Vertical grid line positions over the strip, ten segments.
    pub fn grid(&self, inner_only: bool) -> Vec<i32> {
        let x_step = (self.strip_net_width + 1) as f64 / 10.; // + 1 narrows the right gap
        let range = if inner_only { 1..10 } else { 0..11 };
        range.map(|i| self.strip_net_x0 + (x_step * i as f64 + 0.5) as i32).collect()
    }
}
