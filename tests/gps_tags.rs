use std::sync::mpsc;
use std::time::Duration;

use histotrail::{
    ChannelConfig, HistoDisplaySettings, HistoTemplate, MeasurementConfig, TrailRecordSet,
    TrailType, Vault, VaultMap,
};
use histotrail::trail::tags::DataTag;

fn gps_channel() -> ChannelConfig {
    let mut channel = ChannelConfig::new(1);
    channel.measurements.push(MeasurementConfig::new("Voltage", "V"));
    channel.measurements.push(MeasurementConfig::new("Latitude", "°"));
    channel.measurements.push(MeasurementConfig::new("Longitude", "°"));
    channel
}

/// Latitude/longitude medians are stored as degrees scaled twice by 1000.
fn gps_vault(timestamp_ms: i64, latitude: f64, longitude: f64) -> Vault {
    Vault::new("GPS-Logger", 1, timestamp_ms, format!("logs/{timestamp_ms}.bin"))
        .with_measurement_point(1, TrailType::Q2.ordinal(), (latitude * 1_000_000.) as i32)
        .with_measurement_point(2, TrailType::Q2.ordinal(), (longitude * 1_000_000.) as i32)
}

fn populated_set() -> TrailRecordSet {
    let mut set = TrailRecordSet::create(
        "GPS-Logger",
        &gps_channel(),
        HistoDisplaySettings::default(),
        HistoTemplate::new(),
    )
    .unwrap();
    let mut map = VaultMap::new();
    map.add(gps_vault(1_000, 48.1, 11.5));
    map.add(gps_vault(2_000, 48.1002, 11.5002));
    // a vault without GPS medians keeps its position in the sequence
    map.add(Vault::new("GPS-Logger", 1, 3_000, "logs/3000.bin"));
    set.initialize_from_vaults(map);
    set
}

#[test]
fn location_tags_arrive_after_the_background_task() {
    let mut set = populated_set();
    let task = set.take_gps_task().expect("task started");
    task.join();

    let tags = set.data_tags();
    assert!(tags.has_gps_locations());
    // newest first: the vault without coordinates yields an empty tag
    assert_eq!(tags.text(0, DataTag::GpsLocation), "");
    assert!(!tags.text(1, DataTag::GpsLocation).is_empty());
    // both coordinate-carrying vaults fall into one cluster
    assert_eq!(tags.text(1, DataTag::GpsLocation), tags.text(2, DataTag::GpsLocation));
}

#[test]
fn completion_callback_fires_with_custom_locations() {
    let mut set = populated_set();
    if let Some(task) = set.take_gps_task() {
        task.join();
    }

    let (sender, receiver) = mpsc::channel();
    set.set_gps_location_tags_with(
        |_center| "airfield".to_string(),
        move || {
            let _ = sender.send(());
        },
    );
    receiver.recv_timeout(Duration::from_secs(5)).expect("completion notification");
    if let Some(task) = set.take_gps_task() {
        task.join();
    }

    assert_eq!(set.data_tags().text(1, DataTag::GpsLocation), "airfield");
}

#[test]
fn missing_coordinate_records_skip_the_tagging() {
    let mut channel = ChannelConfig::new(1);
    channel.measurements.push(MeasurementConfig::new("Voltage", "V"));
    let mut set = TrailRecordSet::create(
        "UniLog2",
        &channel,
        HistoDisplaySettings::default(),
        HistoTemplate::new(),
    )
    .unwrap();
    let mut map = VaultMap::new();
    map.add(Vault::new("UniLog2", 1, 1_000, "logs/1000.bin"));
    set.initialize_from_vaults(map);

    assert!(set.take_gps_task().is_none());
    assert!(!set.data_tags().has_gps_locations());
}
