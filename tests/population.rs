use histotrail::{
    ChannelConfig, ChannelItem, HistoDisplaySettings, HistoTemplate, MeasurementConfig, TrailRecord,
    TrailRecordSet, TrailType, Vault, VaultMap,
};
use histotrail::trail::selector::TrailSelector;

fn channel() -> ChannelConfig {
    let mut channel = ChannelConfig::new(1);
    channel.measurements.push(MeasurementConfig::new("Voltage", "V"));
    channel
}

fn measurement_record() -> TrailRecord {
    let channel = channel();
    let measurement = channel.measurements[0].clone();
    let mut selector = TrailSelector::for_measurement(&measurement, &channel, true).unwrap();
    selector.set_most_applicable();
    TrailRecord::new(0, ChannelItem::Measurement(measurement), selector)
}

/// Vault carrying the quantile family for measurement 0 around `base`.
fn stats_vault(timestamp_ms: i64, base: i32, sd: Option<i32>) -> Vault {
    let mut vault = Vault::new("UniLog2", 1, timestamp_ms, format!("logs/{timestamp_ms}.bin"))
        .with_measurement_point(0, TrailType::Min.ordinal(), base - 100)
        .with_measurement_point(0, TrailType::Q0.ordinal(), base - 80)
        .with_measurement_point(0, TrailType::Q1.ordinal(), base - 40)
        .with_measurement_point(0, TrailType::Q2.ordinal(), base)
        .with_measurement_point(0, TrailType::Q3.ordinal(), base + 40)
        .with_measurement_point(0, TrailType::Q4.ordinal(), base + 80)
        .with_measurement_point(0, TrailType::Max.ordinal(), base + 100)
        .with_measurement_point(0, TrailType::QLowerWhisker.ordinal(), base - 60)
        .with_measurement_point(0, TrailType::QUpperWhisker.ordinal(), base + 60)
        .with_measurement_point(0, TrailType::Avg.ordinal(), base);
    if let Some(sd) = sd {
        vault = vault.with_measurement_point(0, TrailType::Sd.ordinal(), sd);
    }
    vault
}

fn populated_set(bases: &[(i64, i32)]) -> TrailRecordSet {
    let mut set = TrailRecordSet::create(
        "UniLog2",
        &channel(),
        HistoDisplaySettings::default(),
        HistoTemplate::new(),
    )
    .unwrap();
    let mut map = VaultMap::new();
    for &(ts, base) in bases {
        map.add(stats_vault(ts, base, Some(20)));
    }
    set.initialize_from_vaults(map);
    set
}

fn select_suite(set: &mut TrailRecordSet, suite: TrailType) {
    let index = set
        .get("Voltage")
        .unwrap()
        .selector()
        .applicable_ordinals()
        .iter()
        .position(|&o| o == suite.ordinal())
        .unwrap();
    set.refill_record("Voltage", index);
}

#[test]
fn min_max_tracking_ignores_null_points() {
    let mut record = measurement_record();
    record.add_element(Some(100));
    record.add_element(None);
    record.add_element(Some(300));
    record.add_element(Some(50));

    assert_eq!(record.len(), 4);
    assert_eq!(record.min_value(), 50);
    assert_eq!(record.max_value(), 300);
}

#[test]
fn null_only_population_keeps_undefined_extremes() {
    let mut record = measurement_record();
    record.add_element(None);
    record.add_element(None);
    // the widening getters operate on the sentinels
    assert_eq!(record.len(), 2);
    assert!(record.decoded_not_null_values().is_empty());
}

#[test]
fn flat_data_widens_the_exposed_range_only() {
    let mut record = measurement_record();
    record.add_element(Some(500));
    record.add_element(Some(500));
    assert_eq!(record.max_value(), 600);
    assert_eq!(record.min_value(), 400);
    assert_eq!(record.master_points(), &[Some(500), Some(500)]);
}

#[test]
fn range_plot_suite_applies_the_alternating_summation() {
    let mut set = populated_set(&[(1_000, 5_000)]);
    select_suite(&mut set, TrailType::SuiteAvgSd);

    let record = set.get("Voltage").unwrap();
    let suite = record.suite_records();
    // master + factor * point * 2, the factor starting at -1 and flipping
    assert_eq!(suite.suite_value(0, 0), Some(5_000));
    assert_eq!(suite.suite_value(1, 0), Some(5_000 - 2 * 20));
    assert_eq!(suite.suite_value(2, 0), Some(5_000 + 2 * 20));
}

#[test]
fn missing_deviation_does_not_disturb_the_master_state() {
    let mut set = TrailRecordSet::create(
        "UniLog2",
        &channel(),
        HistoDisplaySettings::default(),
        HistoTemplate::new(),
    )
    .unwrap();
    let mut map = VaultMap::new();
    map.add(stats_vault(1_000, 5_000, None));
    map.add(stats_vault(2_000, 6_000, Some(30)));
    set.initialize_from_vaults(map);
    select_suite(&mut set, TrailType::SuiteAvgSd);

    let record = set.get("Voltage").unwrap();
    let suite = record.suite_records();
    // newest first: the vault with a deviation comes first
    assert_eq!(suite.suite_value(0, 0), Some(6_000));
    assert_eq!(suite.suite_value(1, 0), Some(6_000 - 60));
    assert_eq!(suite.suite_value(2, 0), Some(6_000 + 60));
    // the vault without deviations keeps its master and null bands
    assert_eq!(suite.suite_value(0, 1), Some(5_000));
    assert_eq!(suite.suite_value(1, 1), None);
    assert_eq!(suite.suite_value(2, 1), None);
}

#[test]
fn box_plot_suite_stores_raw_member_values() {
    let mut set = populated_set(&[(1_000, 5_000)]);
    select_suite(&mut set, TrailType::SuiteBoxPlot);

    let record = set.get("Voltage").unwrap();
    let suite = record.suite_records();
    let expected = [
        5_000 - 80, // q0
        5_000 - 60, // lower whisker
        5_000 - 40, // q1
        5_000,      // q2
        5_000 + 40, // q3
        5_000 + 60, // upper whisker
        5_000 + 80, // q4
    ];
    for (member, expected) in expected.iter().enumerate() {
        assert_eq!(suite.suite_value(member, 0), Some(*expected), "member {member}");
    }
}

#[test]
fn suite_members_share_one_length() {
    let mut set = populated_set(&[(1_000, 5_000), (2_000, 6_000), (3_000, 4_500)]);
    select_suite(&mut set, TrailType::SuiteBoxPlot);

    let record = set.get("Voltage").unwrap();
    let suite = record.suite_records();
    assert_eq!(suite.real_size(), 3);
    for member in 0..suite.len() {
        assert_eq!(suite.get(member).unwrap().len(), 3, "member {member}");
    }
    assert_eq!(record.len(), set.time_step_size());
}
