use histotrail::mapper::{table_header_row, table_row, table_tag_row, GraphicsMapper};
use histotrail::trail::tags::DisplayTag;
use histotrail::{
    ChannelConfig, HistoDisplaySettings, HistoTemplate, MeasurementConfig, TrailRecordSet,
    TrailType, Vault, VaultMap,
};

fn channel() -> ChannelConfig {
    let mut channel = ChannelConfig::new(1);
    channel.measurements.push(MeasurementConfig::new("Voltage", "V"));
    channel
}

fn stats_vault(timestamp_ms: i64, base: i32) -> Vault {
    let mut vault = Vault::new("UniLog2", 1, timestamp_ms, format!("logs/flight{timestamp_ms}.bin"));
    for (trail, value) in [
        (TrailType::Min, base - 100),
        (TrailType::Q0, base - 80),
        (TrailType::Q2, base),
        (TrailType::Q4, base + 80),
        (TrailType::Max, base + 100),
    ] {
        vault = vault.with_measurement_point(0, trail.ordinal(), value);
    }
    vault
}

fn populated_set(settings: HistoDisplaySettings) -> TrailRecordSet {
    let mut set =
        TrailRecordSet::create("UniLog2", &channel(), settings, HistoTemplate::new()).unwrap();
    let mut map = VaultMap::new();
    map.add(stats_vault(1_000, 5_000));
    map.add(stats_vault(2_000, 6_000));
    map.add(stats_vault(3_000, 4_000));
    set.initialize_from_vaults(map);
    set
}

#[test]
fn header_row_has_one_cell_per_time_step() {
    let set = populated_set(HistoDisplaySettings::default());
    let header = table_header_row(&set);
    assert_eq!(header.len(), 3);
    assert!(header.iter().all(|cell| !cell.is_empty()));
}

#[test]
fn record_row_carries_name_trail_text_and_values() {
    let set = populated_set(HistoDisplaySettings::default());
    let record = set.get("Voltage").unwrap();
    let row = table_row(&set, record);

    assert_eq!(row.len(), set.time_step_size() + 2);
    assert_eq!(row[0], "Voltage [V]");
    assert_eq!(row[1], "q2 (median)");
    // newest first with the default reversed x axis; two decimals for the
    // automatic number format on this scale
    assert_eq!(row[2], "4.00");
    assert_eq!(row[3], "6.00");
    assert_eq!(row[4], "5.00");
}

#[test]
fn x_axis_direction_reverses_the_presentation_order_only() {
    let mut settings = HistoDisplaySettings::default();
    settings.x_axis_reversed = false;
    let set = populated_set(settings);
    let record = set.get("Voltage").unwrap();
    let row = table_row(&set, record);

    assert_eq!(row[2], "5.00");
    assert_eq!(row[3], "6.00");
    assert_eq!(row[4], "4.00");
    // the stored order is untouched
    assert_eq!(record.master_points()[0], Some(4_000));
}

#[test]
fn null_points_render_as_empty_cells() {
    let mut set = TrailRecordSet::create(
        "UniLog2",
        &channel(),
        HistoDisplaySettings::default(),
        HistoTemplate::new(),
    )
    .unwrap();
    let mut map = VaultMap::new();
    map.add(stats_vault(1_000, 5_000));
    map.add(Vault::new("UniLog2", 1, 2_000, "logs/flight2000.bin"));
    set.initialize_from_vaults(map);

    let record = set.get("Voltage").unwrap();
    let row = table_row(&set, record);
    assert_eq!(row[2], "");
    // flat data keeps the automatic format at its finest granularity
    assert_eq!(row[3], "5.0000");
}

#[test]
fn file_name_tag_row_strips_the_directories() {
    let set = populated_set(HistoDisplaySettings::default());
    let row = table_tag_row(&set, DisplayTag::FileName);
    assert_eq!(row.len(), set.data_tags().len() + 2);
    assert_eq!(row[2], "flight3000.bin");
    assert_eq!(row[4], "flight1000.bin");
}

#[test]
fn suite_cells_join_lower_master_and_upper_values() {
    let mut set = populated_set(HistoDisplaySettings::default());
    let index = set
        .get("Voltage")
        .unwrap()
        .selector()
        .applicable_ordinals()
        .iter()
        .position(|&o| o == TrailType::SuiteBoxPlot.ordinal())
        .unwrap();
    set.refill_record("Voltage", index);

    let record = set.get("Voltage").unwrap();
    let row = table_row(&set, record);
    // lower whisker is absent in the fixture, master and upper are present
    assert!(row[2].contains("4.00"));
    assert_eq!(row[1], "box plot");
}

#[test]
fn graphics_mapper_scales_records_into_pixel_space() {
    let set = populated_set(HistoDisplaySettings::default());
    let record = set.get("Voltage").unwrap();
    let mapper = GraphicsMapper::new(200, 4., 6.);
    let points = mapper.display_points(record);
    assert_eq!(points.len(), 3);
    assert_eq!(points[0], Some(200)); // 4.0 at the bottom
    assert_eq!(points[1], Some(0)); // 6.0 at the top
    assert_eq!(points[2], Some(100)); // 5.0 in the middle
}
