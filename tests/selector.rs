use histotrail::{
    ChannelConfig, HistoError, MeasurementConfig, ScoreConfig, ScoreGroupConfig, SettlementConfig,
    TrailDisplayConfig, TrailType,
};
use histotrail::trail::selector::TrailSelector;

fn channel_with(measurement: MeasurementConfig) -> ChannelConfig {
    let mut channel = ChannelConfig::new(1);
    channel.measurements.push(measurement);
    channel
}

#[test]
fn legacy_measurement_without_overrides_offers_all_primitive_trails() {
    let measurement = MeasurementConfig::new("Voltage", "V");
    let channel = channel_with(measurement.clone());
    let selector = TrailSelector::for_measurement(&measurement, &channel, false).unwrap();

    assert_eq!(selector.applicable_ordinals().len(), selector.applicable_texts().len());
    assert!(!selector.applicable_ordinals().is_empty());
    for trail in [
        TrailType::RealAvg,
        TrailType::RealMin,
        TrailType::RealMax,
        TrailType::RealSd,
        TrailType::RealFirst,
        TrailType::RealLast,
    ] {
        assert!(
            selector.applicable_ordinals().contains(&trail.ordinal()),
            "missing {trail:?}"
        );
    }
    // no triggered trails without statistics declarations
    assert!(!selector.applicable_ordinals().contains(&TrailType::RealSumTriggered.ordinal()));
    // the mode-matching suites follow the primitives
    assert!(selector.applicable_ordinals().contains(&TrailType::SuiteRealAvgSd.ordinal()));
    assert!(!selector.applicable_ordinals().contains(&TrailType::SuiteBoxPlot.ordinal()));
}

#[test]
fn smart_measurement_offers_quantile_trails_and_suites() {
    let measurement = MeasurementConfig::new("Voltage", "V");
    let channel = channel_with(measurement.clone());
    let selector = TrailSelector::for_measurement(&measurement, &channel, true).unwrap();

    for trail in [TrailType::Avg, TrailType::Q0, TrailType::Q2, TrailType::Q4] {
        assert!(selector.applicable_ordinals().contains(&trail.ordinal()));
    }
    assert!(selector.applicable_ordinals().contains(&TrailType::SuiteBoxPlot.ordinal()));
    assert!(!selector.applicable_ordinals().contains(&TrailType::RealAvg.ordinal()));
}

#[test]
fn suite_default_trail_is_a_configuration_error() {
    let mut measurement = MeasurementConfig::new("Voltage", "V");
    measurement.base.trail_display = Some(TrailDisplayConfig {
        default_trail: Some(TrailType::SuiteBoxPlot),
        ..Default::default()
    });
    let channel = channel_with(measurement.clone());
    let result = TrailSelector::for_measurement(&measurement, &channel, true);
    assert!(matches!(result, Err(HistoError::SuiteDefaultTrail { .. })));
}

#[test]
fn transition_amount_settlement_is_a_configuration_error() {
    let mut settlement = SettlementConfig::new("Capacity", "mAh", 7);
    settlement.has_transition_amount = true;
    let result = TrailSelector::for_settlement(&settlement, true);
    assert!(matches!(result, Err(HistoError::TransitionAmountUnsupported(_))));
}

#[test]
fn disclose_all_restricts_to_exposed_trails() {
    let mut measurement = MeasurementConfig::new("Voltage", "V");
    measurement.base.trail_display = Some(TrailDisplayConfig {
        disclose_all: true,
        exposed: vec![TrailType::Avg, TrailType::Max],
        ..Default::default()
    });
    let channel = channel_with(measurement.clone());
    let selector = TrailSelector::for_measurement(&measurement, &channel, true).unwrap();
    assert_eq!(
        selector.applicable_ordinals(),
        &[TrailType::Avg.ordinal(), TrailType::Max.ordinal()]
    );
}

#[test]
fn disclosed_trails_are_hidden_and_fallback_guarantees_one_trail() {
    let mut measurement = MeasurementConfig::new("Voltage", "V");
    measurement.base.trail_display = Some(TrailDisplayConfig {
        disclose_all: true,
        ..Default::default()
    });
    let channel = channel_with(measurement.clone());
    let selector = TrailSelector::for_measurement(&measurement, &channel, true).unwrap();
    // nothing exposed: the substitute keeps the combo box non-empty
    assert_eq!(selector.applicable_ordinals(), &[TrailType::Q2.ordinal()]);
}

#[test]
fn most_applicable_selection_prefers_the_median() {
    let measurement = MeasurementConfig::new("Voltage", "V");
    let channel = channel_with(measurement.clone());
    let mut selector = TrailSelector::for_measurement(&measurement, &channel, true).unwrap();
    selector.set_most_applicable();
    assert_eq!(selector.trail_type(), TrailType::Q2);
}

#[test]
fn extremum_ordinals_prefer_interquartile_extremes() {
    let measurement = MeasurementConfig::new("Voltage", "V");
    let channel = channel_with(measurement.clone());
    let smart = TrailSelector::for_measurement(&measurement, &channel, true).unwrap();
    assert_eq!(smart.extremum_ordinals(), [TrailType::Q0.ordinal(), TrailType::Q4.ordinal()]);

    let legacy = TrailSelector::for_measurement(&measurement, &channel, false).unwrap();
    assert_eq!(
        legacy.extremum_ordinals(),
        [TrailType::RealMin.ordinal(), TrailType::RealMax.ordinal()]
    );
}

#[test]
fn triggered_trails_require_declared_trigger_texts() {
    let mut measurement = MeasurementConfig::new("Height", "m");
    measurement.statistics = Some(histotrail::StatisticsConfig {
        sum_by_trigger_ref_ordinal: Some(0),
        sum_trigger_text: Some("climb sum".to_string()),
        has_trigger: true,
        sum_trigger_time_text: Some("motor time".to_string()),
        count_by_trigger: Some(true),
        ..Default::default()
    });
    let channel = channel_with(measurement.clone());
    let selector = TrailSelector::for_measurement(&measurement, &channel, false).unwrap();

    assert!(selector.applicable_ordinals().contains(&TrailType::RealSumTriggered.ordinal()));
    assert!(selector.applicable_ordinals().contains(&TrailType::RealTimeSumTriggered.ordinal()));
    assert!(selector.applicable_ordinals().contains(&TrailType::RealCountTriggered.ordinal()));
    // the combo box shows the device texts for triggered trails
    let sum_index = selector
        .applicable_ordinals()
        .iter()
        .position(|&o| o == TrailType::RealSumTriggered.ordinal())
        .unwrap();
    assert_eq!(selector.applicable_texts()[sum_index], "climb sum");
}

#[test]
fn score_group_selector_offers_the_declared_scores() {
    let group = ScoreGroupConfig::new(
        "Summary",
        "",
        vec![
            ScoreConfig { label: "duration".to_string(), trail_ordinal: 0, text: "duration".to_string() },
            ScoreConfig { label: "height_min".to_string(), trail_ordinal: 1, text: "min height".to_string() },
            ScoreConfig { label: "height_max".to_string(), trail_ordinal: 2, text: "max height".to_string() },
        ],
    );
    let mut selector = TrailSelector::for_score_group(&group).unwrap();
    assert_eq!(selector.applicable_ordinals(), &[0, 1, 2]);
    selector.set_most_applicable();
    assert_eq!(selector.selected_index(), Some(0));
    // min/max labels resolve the extremum scores
    assert_eq!(selector.extremum_ordinals(), [1, 2]);
}
