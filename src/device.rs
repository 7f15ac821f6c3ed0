//! Device configuration model: the read-only channel item definitions the
//! trail engine consumes.
//!
//! A channel item is a tagged variant over three plain configuration
//! structs (measurement, settlement, score group) sharing
//! [`ItemProperties`].

use crate::trail::types::TrailType;

/// Data category of a channel item, used for special value decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DataType {
    #[default]
    Default,
    GpsLatitude,
    GpsLongitude,
}

impl DataType {
    /// Guess the data type from the item name.
    pub fn guess(name: &str) -> Option<DataType> {
        let lower = name.to_lowercase();
        if lower.contains("latitud") {
            Some(DataType::GpsLatitude)
        } else if lower.contains("longitud") {
            Some(DataType::GpsLongitude)
        } else {
            None
        }
    }

    pub fn is_gps_coordinate(self) -> bool {
        matches!(self, DataType::GpsLatitude | DataType::GpsLongitude)
    }
}

/// Device-declared trail visibility overrides for one channel item.
#[derive(Debug, Clone, Default)]
pub struct TrailDisplayConfig {
    /// Trail forced when nothing else is applicable.
    pub default_trail: Option<TrailType>,
    /// Trails forced visible even if normally excluded.
    pub exposed: Vec<TrailType>,
    /// Trails forced hidden even if normally included.
    pub disclosed: Vec<TrailType>,
    /// True starts from nothing and only adds exposed trails.
    pub disclose_all: bool,
}

/// Legacy trigger statistics declarations of a measurement.
#[derive(Debug, Clone, Default)]
pub struct StatisticsConfig {
    pub sum_by_trigger_ref_ordinal: Option<usize>,
    pub sum_trigger_text: Option<String>,
    pub ratio_text: Option<String>,
    pub ratio_ref_ordinal: Option<usize>,
    pub has_trigger: bool,
    pub sum_trigger_time_text: Option<String>,
    pub count_by_trigger: Option<bool>,
    /// True if this statistics entry evaluates an average.
    pub is_avg: bool,
    /// True if this statistics entry evaluates a maximum.
    pub is_max: bool,
}

/// Properties shared by all channel item categories.
#[derive(Debug, Clone)]
pub struct ItemProperties {
    pub name: String,
    pub symbol: String,
    pub unit: String,
    pub factor: f64,
    pub offset: f64,
    pub reduction: f64,
    pub is_active: bool,
    pub data_type: DataType,
    pub trail_display: Option<TrailDisplayConfig>,
    /// Ordinal of the scale sync master record, if scale-synced.
    pub scale_sync_ref_ordinal: Option<usize>,
    /// True pins the record at the top of the display sequence.
    pub top_placement: bool,
}

impl ItemProperties {
    pub fn new(name: &str, unit: &str) -> Self {
        Self {
            name: name.to_string(),
            symbol: String::new(),
            unit: unit.to_string(),
            factor: 1.,
            offset: 0.,
            reduction: 0.,
            is_active: true,
            data_type: DataType::guess(name).unwrap_or_default(),
            trail_display: None,
            scale_sync_ref_ordinal: None,
            top_placement: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct MeasurementConfig {
    pub base: ItemProperties,
    pub statistics: Option<StatisticsConfig>,
}

impl MeasurementConfig {
    pub fn new(name: &str, unit: &str) -> Self {
        Self { base: ItemProperties::new(name, unit), statistics: None }
    }
}

#[derive(Debug, Clone)]
pub struct SettlementConfig {
    pub base: ItemProperties,
    /// Key for the settlement value lookup in the vault.
    pub settlement_id: usize,
    /// Set for settlements evaluated from a transition amount (unsupported).
    pub has_transition_amount: bool,
}

impl SettlementConfig {
    pub fn new(name: &str, unit: &str, settlement_id: usize) -> Self {
        Self { base: ItemProperties::new(name, unit), settlement_id, has_transition_amount: false }
    }
}

/// A single score entry of a score group.
#[derive(Debug, Clone)]
pub struct ScoreConfig {
    /// Internal label, checked for "min"/"max" markers.
    pub label: String,
    /// Ordinal for the score value lookup in the vault.
    pub trail_ordinal: usize,
    /// Display text.
    pub text: String,
}

#[derive(Debug, Clone)]
pub struct ScoreGroupConfig {
    pub base: ItemProperties,
    pub scores: Vec<ScoreConfig>,
}

impl ScoreGroupConfig {
    pub fn new(name: &str, unit: &str, scores: Vec<ScoreConfig>) -> Self {
        Self { base: ItemProperties::new(name, unit), scores }
    }
}

/// One channel item definition; the variant selects the vault lookup and
/// the trail selection strategy.
#[derive(Debug, Clone)]
pub enum ChannelItem {
    Measurement(MeasurementConfig),
    Settlement(SettlementConfig),
    ScoreGroup(ScoreGroupConfig),
}

impl ChannelItem {
    pub fn base(&self) -> &ItemProperties {
        match self {
            ChannelItem::Measurement(m) => &m.base,
            ChannelItem::Settlement(s) => &s.base,
            ChannelItem::ScoreGroup(g) => &g.base,
        }
    }

    pub fn name(&self) -> &str {
        &self.base().name
    }

    pub fn is_measurement(&self) -> bool {
        matches!(self, ChannelItem::Measurement(_))
    }

    pub fn is_settlement(&self) -> bool {
        matches!(self, ChannelItem::Settlement(_))
    }

    pub fn is_score_group(&self) -> bool {
        matches!(self, ChannelItem::ScoreGroup(_))
    }
}

/// The channel configuration loaded from the device properties.
#[derive(Debug, Clone)]
pub struct ChannelConfig {
    pub number: usize,
    pub measurements: Vec<MeasurementConfig>,
    pub settlements: Vec<SettlementConfig>,
    pub score_groups: Vec<ScoreGroupConfig>,
}

impl ChannelConfig {
    pub fn new(number: usize) -> Self {
        Self { number, measurements: Vec::new(), settlements: Vec::new(), score_groups: Vec::new() }
    }

    /// Number of channel items over all categories.
    pub fn item_count(&self) -> usize {
        self.measurements.len() + self.settlements.len() + self.score_groups.len()
    }

    /// Statistics declaration of the measurement at `ordinal`.
    pub fn measurement_statistics(&self, ordinal: usize) -> Option<&StatisticsConfig> {
        self.measurements.get(ordinal).and_then(|m| m.statistics.as_ref())
    }
}
