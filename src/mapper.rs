//! Trail record data mapping for the table view and for chart pixel space.

use chrono::{Local, TimeZone};

use crate::format::ValueFormatter;
use crate::trail::record::TrailRecord;
use crate::trail::record_set::TrailRecordSet;
use crate::trail::tags::{DataTag, DisplayTag};

/// Timestamp text for table headers.
fn format_timestamp_ms(timestamp_ms: i64) -> String {
    match Local.timestamp_millis_opt(timestamp_ms) {
        chrono::LocalResult::Single(datetime) => datetime.format("%Y-%m-%d %H:%M:%S").to_string(),
        _ => String::new(),
    }
}

/// The column headers starting with the first data column (two cells shorter
/// than a value row).
pub fn table_header_row(set: &TrailRecordSet) -> Vec<String> {
    let size = set.time_step_size();
    let reversed = set.settings().x_axis_reversed;
    (0..size)
        .map(|i| format_timestamp_ms(set.time_steps().display_time_ms(i, reversed)))
        .collect()
}

/// All formatted data table points of one record: record name and trail text
/// followed by one formatted value per time step.
pub fn table_row(set: &TrailRecordSet, record: &TrailRecord) -> Vec<String> {
    let size = set.time_step_size();
    let formatter = ValueFormatter::new(record);
    let is_suite = record.selector().is_trail_suite();
    let value_at = |index: usize| -> String {
        if is_suite {
            let trail_type = record.selector().trail_type();
            let master_index = trail_type.suite_master_index();
            if record.suite_records().suite_value(master_index, index).is_some() {
                formatter.table_suite_value(index, trail_type)
            } else {
                String::new()
            }
        } else {
            formatter.table_value_at(index)
        }
    };

    let mut row = Vec::with_capacity(size + 2);
    row.push(record.table_row_header());
    row.push(record.selector().trail_text().to_string());
    if set.settings().x_axis_reversed {
        for i in 0..size {
            row.push(value_at(i));
        }
    } else {
        for i in (0..size).rev() {
            row.push(value_at(i));
        }
    }
    row
}

/// The tag row for one display tag: an empty record name cell, the tag label
/// slot and one value per tag entry. GPS location tags are filled in
/// asynchronously and may initially be absent.
pub fn table_tag_row(set: &TrailRecordSet, display_tag: DisplayTag) -> Vec<String> {
    let tags = set.data_tags();
    let size = tags.len();
    let value_at = |index: usize| -> String {
        match display_tag {
            DisplayTag::FileName => {
                let path = tags.text(index, DataTag::FilePath);
                std::path::Path::new(&path)
                    .file_name()
                    .map(|f| f.to_string_lossy().into_owned())
                    .unwrap_or_default()
            }
            DisplayTag::DirectoryName => {
                let path = tags.text(index, DataTag::FilePath);
                std::path::Path::new(&path)
                    .parent()
                    .and_then(std::path::Path::file_name)
                    .map(|f| f.to_string_lossy().into_owned())
                    .unwrap_or_default()
            }
            DisplayTag::BasePath => {
                let path = tags.text(index, DataTag::FilePath);
                std::path::Path::new(&path)
                    .parent()
                    .and_then(std::path::Path::parent)
                    .map(|f| f.to_string_lossy().into_owned())
                    .unwrap_or_default()
            }
            DisplayTag::ChannelNumber => tags.text(index, DataTag::ChannelNumber),
            DisplayTag::RectifiedObjectKey => tags.text(index, DataTag::RectifiedObjectKey),
            DisplayTag::RecordsetBaseName => tags.text(index, DataTag::RecordsetBaseName),
            DisplayTag::GpsLocation => tags.text(index, DataTag::GpsLocation),
        }
    };

    let mut row = Vec::with_capacity(size + 2);
    row.push(String::new());
    row.push(format!("{display_tag:?}"));
    if set.settings().x_axis_reversed {
        for i in 0..size {
            row.push(value_at(i));
        }
    } else {
        for i in (0..size).rev() {
            row.push(value_at(i));
        }
    }
    row
}

/// Maps decoded record values into vertical pixel positions of a chart area.
#[derive(Debug, Clone, Copy)]
pub struct GraphicsMapper {
    height: i32,
    decoded_min: f64,
    decoded_max: f64,
}

impl GraphicsMapper {
    pub fn new(height: i32, decoded_min: f64, decoded_max: f64) -> Self {
        Self { height, decoded_min, decoded_max }
    }

    /// The y position measured from the top of the curve area; the maximum
    /// maps to 0, the minimum to the full height.
    pub fn vertical_display_pos(&self, decoded_value: f64) -> i32 {
        let delta = self.decoded_max - self.decoded_min;
        if delta == 0. {
            return self.height / 2;
        }
        let relative = (self.decoded_max - decoded_value) / delta;
        (relative * self.height as f64 + 0.5) as i32
    }

    /// One y position per time step; gaps stay gaps.
    pub fn display_points(&self, record: &TrailRecord) -> Vec<Option<i32>> {
        record
            .master_points()
            .iter()
            .map(|point| point.map(|p| self.vertical_display_pos(record.decode(p))))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertical_positions_span_the_height() {
        let mapper = GraphicsMapper::new(100, 0., 10.);
        assert_eq!(mapper.vertical_display_pos(10.), 0);
        assert_eq!(mapper.vertical_display_pos(0.), 100);
        assert_eq!(mapper.vertical_display_pos(5.), 50);
    }
}
