//! Value decoding and display formatting for trail record data.

use crate::device::DataType;
use crate::trail::record::TrailRecord;
use crate::trail::types::TrailType;

/// Decode a normalized vault value into the device value domain.
/// GPS coordinates use a fixed 1/1000 scaling; everything else applies the
/// device factor/offset/reduction. `value` is the raw integer divided by 1000.
pub fn decode_vault_value(
    data_type: DataType,
    factor: f64,
    offset: f64,
    reduction: f64,
    value: f64,
) -> f64 {
    match data_type {
        DataType::GpsLatitude | DataType::GpsLongitude => value / 1000.,
        DataType::Default => (value - reduction) * factor + offset,
    }
}

/// Decode a value that represents a difference; offsets do not apply.
pub fn decode_delta_value(data_type: DataType, factor: f64, value: f64) -> f64 {
    match data_type {
        DataType::GpsLatitude | DataType::GpsLongitude => value / 1000.,
        DataType::Default => value * factor,
    }
}

/// Reverse translate a display value into a normalized vault value.
pub fn encode_vault_value(
    data_type: DataType,
    factor: f64,
    offset: f64,
    reduction: f64,
    value: f64,
) -> f64 {
    match data_type {
        DataType::GpsLatitude | DataType::GpsLongitude => value * 1000.,
        DataType::Default => (value - offset) / factor + reduction,
    }
}

/// Decimal places based on the magnitude and the delta span of the values.
pub fn decimal_places_for_range(value1: f64, value2: f64) -> usize {
    let range = (value1 - value2).abs();
    if value1.abs() < 10. && value2.abs() < 10. {
        if range < 0.01 {
            4
        } else if range < 0.1 {
            3
        } else {
            2
        }
    } else if value1.abs() < 100. && value2.abs() < 100. {
        if range < 0.1 {
            3
        } else if range < 1. {
            2
        } else {
            1
        }
    } else if value1.abs() < 1000. && value2.abs() < 1000. {
        if range < 1. {
            2
        } else if range < 10. {
            1
        } else {
            0
        }
    } else if value1.abs() < 10000. && value2.abs() < 10000. {
        if range < 10. {
            1
        } else {
            0
        }
    } else {
        0
    }
}

/// Decimal places for an explicit number format code, falling back to the
/// range based selection for the automatic code -1.
pub fn decimal_places_for_format(number_format: i32, scale_min: f64, scale_max: f64) -> usize {
    match number_format {
        -1 => decimal_places_for_range(scale_max, scale_min),
        0 => 0,
        1 => 1,
        3 => 3,
        _ => 2,
    }
}

/// Degree value formatted as full degrees plus decimal minutes.
pub fn format_with_minutes(value: f64, fraction_digits: usize) -> String {
    let degrees = value.trunc() as i64;
    let minutes = (value - degrees as f64).abs() * 60.;
    format!("{degrees:2} {minutes:0width$.prec$}", width = fraction_digits + 3, prec = fraction_digits)
}

/// Output formatting based on one trail record's state.
pub struct ValueFormatter<'a> {
    record: &'a TrailRecord,
}

impl<'a> ValueFormatter<'a> {
    pub fn new(record: &'a TrailRecord) -> Self {
        Self { record }
    }

    fn decimal_places(&self) -> usize {
        let template = self.record.template();
        decimal_places_for_format(
            template.number_format,
            template.min_scale_value,
            template.max_scale_value,
        )
    }

    /// Format a decoded value for the scale, honoring GPS minute units.
    pub fn scale_value(&self, final_value: f64) -> String {
        if self.record.data_type().is_gps_coordinate() && self.record.unit().ends_with('\'') {
            format_with_minutes(final_value, 1)
        } else {
            format!("{:.*}", self.decimal_places(), final_value)
        }
    }

    /// Format an untranslated value (`raw / 1000`) for the data table.
    pub fn table_value(&self, value_over_1000: f64) -> String {
        let decoded = decode_vault_value(
            self.record.data_type(),
            self.record.factor(),
            self.record.offset(),
            self.record.reduction(),
            value_over_1000,
        );
        if self.record.data_type().is_gps_coordinate() {
            if self.record.unit().ends_with('\'') {
                format_with_minutes(decoded, 4).trim().to_string()
            } else {
                format!("{decoded:8.6}")
            }
        } else {
            format!("{:.*}", self.decimal_places(), decoded)
        }
    }

    /// The formatted value of the record's own sequence at `index`.
    pub fn table_value_at(&self, index: usize) -> String {
        match self.record.element_at(index) {
            Some(value) => self.table_value(value as f64 / 1000.),
            None => String::new(),
        }
    }

    /// Supports suites and null values; null renders as a placeholder glyph.
    pub fn measure_value(&self, index: usize) -> String {
        match self.record.master_points().get(index).copied().flatten() {
            Some(value) => self.table_value(value as f64 / 1000.),
            None => "*".to_string(),
        }
    }

    /// Suite cell text: lower, master and upper member values joined by a
    /// separator.
    pub fn table_suite_value(&self, index: usize, trail_type: TrailType) -> String {
        let mut text = self.truncated_suite_value(trail_type.suite_lower_index(), index, 8);
        let separator = if text.len() > 3 { "\u{b7}" } else { " : " }; // middle dot
        text.push_str(separator);
        text.push_str(&self.truncated_suite_value(trail_type.suite_master_index(), index, 8));
        text.push_str(separator);
        text.push_str(&self.truncated_suite_value(trail_type.suite_upper_index(), index, 8));
        text
    }

    fn truncated_suite_value(&self, member_index: usize, index: usize, max_length: usize) -> String {
        match self.record.suite_records().suite_value(member_index, index) {
            Some(value) => {
                let formatted = self.table_value(value as f64 / 1000.);
                formatted.chars().take(max_length).collect()
            }
            None => String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_based_decimal_places() {
        assert_eq!(decimal_places_for_range(0.5, 0.504), 4);
        assert_eq!(decimal_places_for_range(1., 5.), 2);
        assert_eq!(decimal_places_for_range(50., 90.), 1);
        assert_eq!(decimal_places_for_range(500., 900.), 0);
        assert_eq!(decimal_places_for_range(50000., 90000.), 0);
    }

    #[test]
    fn decode_applies_factor_offset_reduction() {
        let decoded = decode_vault_value(DataType::Default, 2., 1., 0.5, 10.);
        assert!((decoded - 20.).abs() < 1e-12);
        let encoded = encode_vault_value(DataType::Default, 2., 1., 0.5, decoded);
        assert!((encoded - 10.).abs() < 1e-12);
    }

    #[test]
    fn gps_values_scale_by_thousand() {
        let decoded = decode_vault_value(DataType::GpsLatitude, 1., 0., 0., 48_123.456);
        assert!((decoded - 48.123456).abs() < 1e-9);
    }

    #[test]
    fn minutes_format_splits_degrees() {
        let formatted = format_with_minutes(48.5, 1);
        assert_eq!(formatted, "48 30.0");
    }
}
