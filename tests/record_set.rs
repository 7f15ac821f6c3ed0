use histotrail::{
    ChannelConfig, HistoDisplaySettings, HistoTemplate, MeasurementConfig, ScoreConfig,
    ScoreGroupConfig, SettlementConfig, TrailRecordSet, TrailType, Vault, VaultMap,
};
use histotrail::trail::tags::{DataTag, DisplayTag};

const SETTLEMENT_ID: usize = 7;

fn channel() -> ChannelConfig {
    let mut channel = ChannelConfig::new(1);
    channel.measurements.push(MeasurementConfig::new("Voltage", "V"));
    channel.measurements.push(MeasurementConfig::new("Current", "A"));
    channel.settlements.push(SettlementConfig::new("Capacity", "mAh", SETTLEMENT_ID));
    channel.score_groups.push(ScoreGroupConfig::new(
        "Summary",
        "",
        vec![ScoreConfig {
            label: "duration".to_string(),
            trail_ordinal: 0,
            text: "duration".to_string(),
        }],
    ));
    channel
}

fn add_quantile_family(mut vault: Vault, ordinal: usize, base: i32) -> Vault {
    for (trail, value) in [
        (TrailType::Min, base - 100),
        (TrailType::Q0, base - 80),
        (TrailType::Q1, base - 40),
        (TrailType::Q2, base),
        (TrailType::Q3, base + 40),
        (TrailType::Q4, base + 80),
        (TrailType::Max, base + 100),
        (TrailType::Avg, base),
    ] {
        vault = vault.with_measurement_point(ordinal, trail.ordinal(), value);
    }
    vault
}

fn stats_vault(timestamp_ms: i64, base: i32) -> Vault {
    let mut vault = Vault::new("UniLog2", 1, timestamp_ms, format!("logs/{timestamp_ms}.bin"))
        .with_object_key("glider")
        .with_recordset_base_name("1) flight")
        .with_duration_mm(11);
    vault = add_quantile_family(vault, 0, base);
    vault = add_quantile_family(vault, 1, base * 2);
    for (trail, value) in [
        (TrailType::Min, base - 100),
        (TrailType::Q0, base - 80),
        (TrailType::Q2, base),
        (TrailType::Q4, base + 80),
        (TrailType::Max, base + 100),
    ] {
        vault = vault.with_settlement_point(SETTLEMENT_ID, trail.ordinal(), value);
    }
    vault.with_score_point(0, 11_000)
}

fn vault_map(bases: &[(i64, i32)]) -> VaultMap {
    bases.iter().map(|&(ts, base)| stats_vault(ts, base)).collect()
}

fn populated_set(bases: &[(i64, i32)]) -> TrailRecordSet {
    let mut set = TrailRecordSet::create(
        "UniLog2",
        &channel(),
        HistoDisplaySettings::default(),
        HistoTemplate::new(),
    )
    .unwrap();
    set.initialize_from_vaults(vault_map(bases));
    set
}

#[test]
fn every_record_length_equals_the_time_step_count() {
    let set = populated_set(&[(1_000, 5_000), (2_000, 6_000), (3_000, 4_000)]);
    assert_eq!(set.time_step_size(), 3);
    for record in set.records() {
        assert_eq!(record.len(), 3, "record {}", record.name());
    }
}

#[test]
fn time_steps_are_ordered_newest_first() {
    let set = populated_set(&[(2_000, 6_000), (1_000, 5_000), (3_000, 4_000)]);
    let steps: Vec<i64> = (0..set.time_step_size()).map(|i| set.time_steps().time_ms(i)).collect();
    assert_eq!(steps, vec![3_000, 2_000, 1_000]);
    // reversing the x axis changes the presentation order only
    assert_eq!(set.time_steps().display_time_ms(0, true), 3_000);
    assert_eq!(set.time_steps().display_time_ms(0, false), 1_000);
}

#[test]
fn refilling_twice_produces_identical_point_sequences() {
    let mut set = populated_set(&[(1_000, 5_000), (2_000, 6_000)]);
    let first: Vec<Vec<Option<i32>>> =
        set.records().iter().map(|r| r.master_points().to_vec()).collect();
    set.refill_record_set();
    let second: Vec<Vec<Option<i32>>> =
        set.records().iter().map(|r| r.master_points().to_vec()).collect();
    assert_eq!(first, second);
}

#[test]
fn duplicate_start_timestamps_are_skipped_with_a_warning() {
    let set = populated_set(&[(1_000, 5_000), (1_000, 9_000), (2_000, 6_000)]);
    // distinct timestamps only
    assert_eq!(set.time_step_size(), 2);
    for record in set.records() {
        assert_eq!(record.len(), 2, "record {}", record.name());
    }
    // the duplicate still contributes its tag row
    assert_eq!(set.data_tags().len(), 3);
}

#[test]
fn display_sequence_pins_top_placement_records_first() {
    let mut channel = channel();
    channel.score_groups[0].base.top_placement = true;
    channel.settlements[0].base.top_placement = true;
    let set = TrailRecordSet::create(
        "UniLog2",
        &channel,
        HistoDisplaySettings::default(),
        HistoTemplate::new(),
    )
    .unwrap();

    let names: Vec<&str> = set.records().iter().map(|r| r.name()).collect();
    assert_eq!(names, vec!["Summary", "Capacity", "Voltage", "Current"]);
    // ordinals stay category based regardless of the display position
    assert_eq!(set.get("Voltage").unwrap().ordinal(), 0);
    assert_eq!(set.get("Capacity").unwrap().ordinal(), 2);
    assert_eq!(set.get("Summary").unwrap().ordinal(), 3);
}

#[test]
fn score_records_are_gated_by_the_display_setting() {
    let mut settings = HistoDisplaySettings::default();
    settings.display_scores = false;
    let mut set =
        TrailRecordSet::create("UniLog2", &channel(), settings, HistoTemplate::new()).unwrap();
    set.initialize_from_vaults(vault_map(&[(1_000, 5_000), (2_000, 6_000)]));

    let display_names: Vec<&str> =
        set.display_records().iter().map(|&i| set.records()[i].name()).collect();
    assert!(!display_names.contains(&"Summary"));
    assert!(display_names.contains(&"Voltage"));
}

#[test]
fn all_zero_records_are_not_displayable() {
    let mut set = TrailRecordSet::create(
        "UniLog2",
        &channel(),
        HistoDisplaySettings::default(),
        HistoTemplate::new(),
    )
    .unwrap();
    let mut map = VaultMap::new();
    for ts in [1_000, 2_000] {
        let mut vault = Vault::new("UniLog2", 1, ts, format!("logs/{ts}.bin"));
        vault = add_quantile_family(vault, 0, 0);
        // constant zero placeholder data for measurement 0
        vault = vault
            .with_measurement_point(0, TrailType::Min.ordinal(), 0)
            .with_measurement_point(0, TrailType::Q0.ordinal(), 0)
            .with_measurement_point(0, TrailType::Q4.ordinal(), 0)
            .with_measurement_point(0, TrailType::Max.ordinal(), 0)
            .with_measurement_point(0, TrailType::Q2.ordinal(), 0);
        vault = add_quantile_family(vault, 1, 4_000);
        map.add(vault);
    }
    set.initialize_from_vaults(map);

    assert!(!set.get("Voltage").unwrap().is_displayable());
    assert!(set.get("Current").unwrap().is_displayable());
}

#[test]
fn tag_rows_mirror_the_vault_metadata() {
    let set = populated_set(&[(1_000, 5_000), (2_000, 6_000)]);
    let tags = set.data_tags();
    assert_eq!(tags.len(), 2);
    // newest first
    assert_eq!(tags.text(0, DataTag::FilePath), "logs/2000.bin");
    assert_eq!(tags.text(1, DataTag::FilePath), "logs/1000.bin");
    assert_eq!(tags.text(0, DataTag::RectifiedObjectKey), "glider");
    assert_eq!(tags.text(0, DataTag::ChannelNumber), "1");
}

#[test]
fn constant_tag_rows_are_pruned_from_the_display_tags() {
    let set = populated_set(&[(1_000, 5_000), (2_000, 6_000)]);
    let active = set.data_tags().active_display_tags(1);
    assert!(active.contains(&DisplayTag::FileName));
    // same directory, object key and channel for every vault
    assert!(!active.contains(&DisplayTag::DirectoryName));
    assert!(!active.contains(&DisplayTag::RectifiedObjectKey));
    assert!(!active.contains(&DisplayTag::ChannelNumber));
}

#[test]
fn durations_follow_the_accepted_vaults() {
    let set = populated_set(&[(1_000, 5_000), (2_000, 6_000), (3_000, 4_000)]);
    assert_eq!(set.durations_mm(), &[11, 11, 11]);
}

#[test]
fn template_round_trips_the_view_state() {
    let mut set = populated_set(&[(1_000, 5_000), (2_000, 6_000)]);
    {
        let record = set.get_mut("Voltage").unwrap();
        record.set_visible(false);
        record.template_mut().color = [12, 34, 56];
        record.template_mut().line_width = 3;
        record.template_mut().number_format = 2;
        record.template_mut().is_round_out = true;
        record.set_start_end_defined(true, -1.5, 9.5);
        record.selector_mut().select(2);
    }
    set.save_template();
    let store = set.template().clone();

    let mut restored =
        TrailRecordSet::create("UniLog2", &channel(), HistoDisplaySettings::default(), store)
            .unwrap();
    restored.apply_template(false);

    let record = restored.get("Voltage").unwrap();
    assert!(!record.is_visible());
    assert_eq!(record.template().color, [12, 34, 56]);
    assert_eq!(record.template().line_width, 3);
    assert_eq!(record.template().number_format, 2);
    assert!(record.template().is_round_out);
    assert!(record.template().is_start_end_defined);
    assert_eq!(record.template().min_scale_value, -1.5);
    assert_eq!(record.template().max_scale_value, 9.5);
    assert_eq!(record.selector().selected_index(), Some(2));
}

#[test]
fn template_selection_survives_initialization() {
    let mut set = populated_set(&[(1_000, 5_000), (2_000, 6_000)]);
    set.get_mut("Voltage").unwrap().selector_mut().select(3);
    set.save_template();
    let store = set.template().clone();

    let mut restored =
        TrailRecordSet::create("UniLog2", &channel(), HistoDisplaySettings::default(), store)
            .unwrap();
    restored.initialize_from_vaults(vault_map(&[(1_000, 5_000), (2_000, 6_000)]));
    assert_eq!(restored.get("Voltage").unwrap().selector().selected_index(), Some(3));
}
