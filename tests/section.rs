use histotrail::{
    ChannelConfig, HistoDisplaySettings, HistoTemplate, MeasurementConfig, RecordSection,
    TrailRecordSet, TrailType, Vault, VaultMap,
};

fn channel() -> ChannelConfig {
    let mut channel = ChannelConfig::new(1);
    channel.measurements.push(MeasurementConfig::new("Voltage", "V"));
    channel
}

fn stats_vault(timestamp_ms: i64, base: i32) -> Vault {
    let mut vault = Vault::new("UniLog2", 1, timestamp_ms, format!("logs/{timestamp_ms}.bin"));
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

fn populated_set(bases: &[(i64, i32)]) -> TrailRecordSet {
    let mut set = TrailRecordSet::create(
        "UniLog2",
        &channel(),
        HistoDisplaySettings::default(),
        HistoTemplate::new(),
    )
    .unwrap();
    set.initialize_from_vaults(bases.iter().map(|&(ts, base)| stats_vault(ts, base)).collect::<VaultMap>());
    set
}

#[test]
fn section_over_the_full_range_collects_all_samples() {
    let set = populated_set(&[(1_000, 5_000), (2_000, 6_000), (3_000, 4_000)]);
    let record = set.get("Voltage").unwrap();
    let section = RecordSection::new(record, set.time_steps(), 1_000, 3_000);

    assert!(section.is_valid_bounds());
    assert_eq!(section.spots().len(), 3);
    assert_eq!(section.index_first_last(), (0, 2));
    // decoded values: raw / 1000
    let boxplot = section.bounded_boxplot_values();
    assert!((boxplot[0] - 4.).abs() < 1e-9);
    assert!((boxplot[6] - 6.).abs() < 1e-9);
}

#[test]
fn single_sample_section_degenerates_to_a_flat_response() {
    let set = populated_set(&[(1_000, 5_000), (2_000, 6_000)]);
    let record = set.get("Voltage").unwrap();
    let section = RecordSection::new(record, set.time_steps(), 2_000, 2_000);

    assert!(section.is_valid_bounds());
    assert_eq!(section.spots().len(), 1);
    assert!((section.bounded_avg() - 6.).abs() < 1e-9);
    assert!((section.bounded_slope_value(2_000) - 6.).abs() < 1e-9);
    assert!(!section.is_bounded_parabola());
    let boxplot = section.bounded_boxplot_values();
    assert!(boxplot.iter().all(|v| (*v - 6.).abs() < 1e-9));
}

#[test]
fn gaps_are_excluded_from_the_samples() {
    let mut set = TrailRecordSet::create(
        "UniLog2",
        &channel(),
        HistoDisplaySettings::default(),
        HistoTemplate::new(),
    )
    .unwrap();
    let mut map = VaultMap::new();
    map.add(stats_vault(1_000, 5_000));
    // a vault without any voltage data yields a null point
    map.add(Vault::new("UniLog2", 1, 2_000, "logs/2000.bin"));
    map.add(stats_vault(3_000, 6_000));
    set.initialize_from_vaults(map);

    let record = set.get("Voltage").unwrap();
    let section = RecordSection::new(record, set.time_steps(), 1_000, 3_000);
    assert!(section.is_valid_bounds());
    assert_eq!(section.spots().len(), 2);
}

#[test]
fn quadratic_trend_follows_curved_data() {
    // a parabola in the decoded domain: value = (t/1000)^2
    let bases: Vec<(i64, i32)> =
        (1..=9).map(|i| (i * 1_000, (i * i * 1_000) as i32)).collect();
    let set = populated_set(&bases);
    let record = set.get("Voltage").unwrap();
    let section = RecordSection::new(record, set.time_steps(), 1_000, 9_000);

    assert!(section.is_valid_bounds());
    assert!(section.is_bounded_parabola());
    let responses = section.bounded_parabola_values();
    assert_eq!(responses.len(), 9);
    for spot in responses {
        let expected = (spot.x / 1_000.).powi(2);
        assert!((spot.y - expected).abs() < 1e-6, "at {}", spot.x);
    }
}

#[test]
fn far_off_samples_are_removed_from_the_trend_input_only() {
    // linear data with one wild value in the middle
    let mut bases: Vec<(i64, i32)> = (1..=40).map(|i| (i * 1_000, (i * 100) as i32)).collect();
    bases[20].1 = 1_000_000;
    let set = populated_set(&bases);
    let record = set.get("Voltage").unwrap();
    let section = RecordSection::new(record, set.time_steps(), 1_000, 40_000);

    assert!(section.is_valid_bounds());
    // the box plot still sees the full population
    assert_eq!(section.spots().len(), 40);
    let boxplot = section.bounded_boxplot_values();
    assert!((boxplot[6] - 1_000.).abs() < 1e-9);
    // the trend ignores the outlier: the average stays near the line
    assert!(section.bounded_avg() < 10.);
}

#[test]
fn empty_bounds_are_reported_as_invalid() {
    let mut set = TrailRecordSet::create(
        "UniLog2",
        &channel(),
        HistoDisplaySettings::default(),
        HistoTemplate::new(),
    )
    .unwrap();
    let mut map = VaultMap::new();
    map.add(Vault::new("UniLog2", 1, 1_000, "logs/1000.bin"));
    set.initialize_from_vaults(map);

    let record = set.get("Voltage").unwrap();
    let section = RecordSection::new(record, set.time_steps(), 1_000, 1_000);
    assert!(!section.is_valid_bounds());
}
