//! Trail records: the per-channel-item time series of aggregated values, one
//! point per historical recording.
//!
//! A record holds either a plain point sequence (primitive trails) or a set
//! of suite member records (box/range plots). Values are fixed-point integers
//! (×1000); decoding applies the device factor/offset/reduction or the GPS
//! scaling.

use tracing::{debug, trace};

use crate::config::HistoDisplaySettings;
use crate::device::{ChannelItem, DataType};
use crate::format::decode_vault_value;
use crate::stats::quantile::{BoxplotItem, Quantile};
use crate::stats::{fuzzy_compare, Spot};
use crate::summary::OutlierWarning;
use crate::template::{self, HistoTemplate};
use crate::trail::record_set::TimeSteps;
use crate::trail::selector::TrailSelector;
use crate::trail::suite::{SuiteRecord, SuiteRecords};
use crate::trail::types::TrailType;
use crate::vault::Vault;

/// Default curve colors, cycled by record ordinal.
pub const COLOR_PALETTE: [[u8; 3]; 16] = [
    [0, 0, 255],
    [0, 128, 0],
    [128, 0, 0],
    [255, 0, 255],
    [64, 0, 64],
    [0, 128, 128],
    [128, 128, 0],
    [128, 0, 128],
    [0, 128, 255],
    [128, 255, 0],
    [255, 0, 128],
    [0, 64, 128],
    [64, 128, 0],
    [128, 0, 64],
    [128, 64, 0],
    [0, 128, 64],
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineStyle {
    #[default]
    Solid,
    Dash,
    Dot,
}

impl LineStyle {
    pub fn code(self) -> i32 {
        match self {
            LineStyle::Solid => 0,
            LineStyle::Dash => 1,
            LineStyle::Dot => 2,
        }
    }

    pub fn from_code(code: i32) -> LineStyle {
        match code {
            1 => LineStyle::Dash,
            2 => LineStyle::Dot,
            _ => LineStyle::Solid,
        }
    }
}

/// Per-record view state, persisted through the graphics template.
#[derive(Debug, Clone)]
pub struct ChartTemplate {
    pub is_visible: bool,
    pub is_position_left: bool,
    pub color: [u8; 3],
    pub line_width: u32,
    pub line_style: LineStyle,
    pub is_round_out: bool,
    pub is_startpoint_zero: bool,
    pub is_start_end_defined: bool,
    /// -1 = automatic, 0 = 0000, 1 = 000.0, 2 = 00.00, 3 = 0.000
    pub number_format: i32,
    /// Overwrite the calculated scale boundaries.
    pub max_scale_value: f64,
    pub min_scale_value: f64,
}

impl Default for ChartTemplate {
    fn default() -> Self {
        Self {
            is_visible: true,
            is_position_left: true,
            color: [0, 0, 0],
            line_width: 1,
            line_style: LineStyle::Solid,
            is_round_out: false,
            is_startpoint_zero: false,
            is_start_end_defined: false,
            number_format: -1,
            max_scale_value: 0.,
            min_scale_value: 0.,
        }
    }
}

impl ChartTemplate {
    pub fn set_position_left(&mut self, record_ordinal: usize) {
        self.is_position_left = record_ordinal % 2 == 0;
    }

    pub fn set_color_defaults(&mut self, record_ordinal: usize) {
        self.color = COLOR_PALETTE[record_ordinal % COLOR_PALETTE.len()];
    }
}

/// Outliers data related to one warning category. Vaults may hold additional
/// exceptional outliers beyond the far category; those are not part of the
/// record set and not part of this object.
#[derive(Debug, Clone)]
pub struct Outliers {
    warning_type: OutlierWarning,
    far_limit: f64,
    close_limit: f64,
    decoded_values: Vec<f64>,
    indices: Vec<usize>,
    select_index: usize,
    select_text: String,
}

impl Outliers {
    fn new(
        warning_type: OutlierWarning,
        far_limit: f64,
        close_limit: f64,
        select_index: usize,
        select_text: String,
    ) -> Self {
        Self {
            warning_type,
            far_limit,
            close_limit,
            decoded_values: Vec::new(),
            indices: Vec::new(),
            select_index,
            select_text,
        }
    }

    fn add(&mut self, decoded_value: f64, index: usize) {
        self.indices.push(index);
        self.decoded_values.push(decoded_value);
    }

    pub fn warning_type(&self) -> OutlierWarning {
        self.warning_type
    }

    pub fn far_limit(&self) -> f64 {
        self.far_limit
    }

    pub fn close_limit(&self) -> f64 {
        self.close_limit
    }

    pub fn decoded_values(&self) -> &[f64] {
        &self.decoded_values
    }

    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn select_index(&self) -> usize {
        self.select_index
    }

    pub fn select_text(&self) -> &str {
        &self.select_text
    }
}

/// Aggregated time series of one measurement, settlement or score group:
/// one value per historical recording under the selected trail. Suites store
/// their member values in subordinate records instead.
#[derive(Debug)]
pub struct TrailRecord {
    ordinal: usize,
    item: ChannelItem,
    data_type: DataType,
    template: ChartTemplate,
    selector: TrailSelector,
    /// If a suite trail is chosen the values go to the suite records and the
    /// record's own sequence stays empty.
    suite_records: SuiteRecords,
    points: Vec<Option<i32>>,
    min_value: i32,
    max_value: i32,
    sync_min: i32,
    sync_max: i32,
    is_displayable: bool,
    quantile: Option<Quantile>,
}

impl TrailRecord {
    pub fn new(ordinal: usize, item: ChannelItem, selector: TrailSelector) -> Self {
        let base = item.base();
        let data_type = if base.data_type != DataType::Default {
            base.data_type
        } else {
            DataType::guess(&base.name).unwrap_or_default()
        };
        let mut template = ChartTemplate::default();
        template.set_color_defaults(ordinal);
        template.set_position_left(ordinal);
        Self {
            ordinal,
            item,
            data_type,
            template,
            selector,
            suite_records: SuiteRecords::new(),
            points: Vec::new(),
            min_value: i32::MAX,
            max_value: i32::MIN,
            sync_min: 0,
            sync_max: 0,
            is_displayable: false,
            quantile: None,
        }
    }

    pub fn ordinal(&self) -> usize {
        self.ordinal
    }

    pub fn item(&self) -> &ChannelItem {
        &self.item
    }

    pub fn name(&self) -> &str {
        self.item.name()
    }

    pub fn unit(&self) -> &str {
        &self.item.base().unit
    }

    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    pub fn factor(&self) -> f64 {
        self.item.base().factor
    }

    pub fn offset(&self) -> f64 {
        self.item.base().offset
    }

    pub fn reduction(&self) -> f64 {
        self.item.base().reduction
    }

    pub fn scale_sync_ref_ordinal(&self) -> Option<usize> {
        self.item.base().scale_sync_ref_ordinal
    }

    pub fn template(&self) -> &ChartTemplate {
        &self.template
    }

    pub fn template_mut(&mut self) -> &mut ChartTemplate {
        &mut self.template
    }

    pub fn selector(&self) -> &TrailSelector {
        &self.selector
    }

    pub fn selector_mut(&mut self) -> &mut TrailSelector {
        &mut self.selector
    }

    pub fn suite_records(&self) -> &SuiteRecords {
        &self.suite_records
    }

    /// Header cell text: record name plus unit.
    pub fn table_row_header(&self) -> String {
        if self.unit().is_empty() {
            self.name().to_string()
        } else {
            format!("{} [{}]", self.name(), self.unit())
        }
    }

    /// Decode a raw fixed-point value into the device value domain.
    pub fn decode(&self, raw: i32) -> f64 {
        decode_vault_value(
            self.data_type,
            self.factor(),
            self.offset(),
            self.reduction(),
            raw as f64 / 1000.,
        )
    }

    // ── population ─────────────────────────────────────────────────────────

    /// Add a data point and track minimum and maximum over non-null values.
    pub fn add_element(&mut self, point: Option<i32>) {
        match point {
            None => {
                if self.points.is_empty() {
                    self.min_value = i32::MAX;
                    self.max_value = i32::MIN;
                }
            }
            Some(value) => {
                if self.min_value == i32::MAX && self.max_value == i32::MIN {
                    self.min_value = value;
                    self.max_value = value;
                } else {
                    if value > self.max_value {
                        self.max_value = value;
                    }
                    if value < self.min_value {
                        self.min_value = value;
                    }
                }
            }
        }
        self.points.push(point);
        trace!(record = self.name(), ?point, min = self.min_value, max = self.max_value, "added point");
    }

    /// Drop the data contents and the subordinate objects.
    pub fn clear(&mut self) {
        self.points.clear();
        self.suite_records.clear();
        self.quantile = None;
        self.min_value = i32::MAX;
        self.max_value = i32::MIN;
    }

    /// Fresh suite records for the selected suite trail.
    pub fn set_suite(&mut self, initial_capacity: usize) {
        self.suite_records.clear();
        for member in self.selector.trail_type().suite_members() {
            self.suite_records.push(SuiteRecord::new(member.ordinal(), initial_capacity));
        }
    }

    /// (Re)build the data contents from the chronological vault sequence.
    pub fn initialize_from_vaults(&mut self, vaults: &[&Vault]) {
        self.clear();
        if !self.selector.is_trail_suite() {
            let trail_ordinal = self.selector.trail_ordinal();
            for vault in vaults {
                let point = self.vault_point(vault, trail_ordinal);
                self.add_element(point);
            }
        } else {
            self.set_suite(vaults.len());
            for vault in vaults {
                self.add_vault_to_suite(vault);
            }
        }
        debug!(record = self.name(), size = self.len(), "populated");
    }

    /// Take the data points assigned to the selected suite trail from one vault.
    fn add_vault_to_suite(&mut self, vault: &Vault) {
        let trail = self.selector.trail_type();
        let members = trail.suite_members();

        if trail.is_box_plot() {
            for (i, member) in members.iter().enumerate() {
                let point = self.vault_point(vault, member.ordinal());
                if let Some(record) = self.suite_records.get_mut(i) {
                    record.add_element(point);
                }
            }
        } else {
            let mut summation_factor = 0;
            // deviation members band symmetrically around the last master
            let mut master_point = 0;
            for (i, member) in members.iter().enumerate() {
                let point = self.vault_point(vault, member.ordinal());
                let stored = match point {
                    None => None,
                    Some(mut value) => {
                        summation_factor = next_summation_factor(*member, summation_factor);
                        if summation_factor == 0 {
                            // a non-deviation member opens a new band
                            master_point = value;
                        } else {
                            value = master_point + summation_factor * value * 2;
                        }
                        Some(value)
                    }
                };
                if let Some(record) = self.suite_records.get_mut(i) {
                    record.add_element(stored);
                }
            }
        }
    }

    /// The vault value for this channel item and the requested trail ordinal,
    /// which may differ from the selected trail (e.g. suite members).
    pub fn vault_point(&self, vault: &Vault, trail_ordinal: usize) -> Option<i32> {
        match &self.item {
            ChannelItem::Measurement(_) => vault.measurement_point(self.ordinal, trail_ordinal),
            ChannelItem::Settlement(settlement) => {
                vault.settlement_point(settlement.settlement_id, trail_ordinal)
            }
            ChannelItem::ScoreGroup(_) => vault.score_point(trail_ordinal),
        }
    }

    /// The points for the q0/q4 respective min/max trails; score groups
    /// without min/max scores fall back to the first score.
    pub fn extremum_trail_points(&self, vault: &Vault) -> [Option<i32>; 2] {
        let ordinals = self.selector.extremum_ordinals();
        [self.vault_point(vault, ordinals[0]), self.vault_point(vault, ordinals[1])]
    }

    // ── sizes and extremes ─────────────────────────────────────────────────

    /// The point count of the single curve or the suite.
    pub fn len(&self) -> usize {
        if self.selector.is_trail_suite() {
            self.suite_records.real_size()
        } else {
            self.points.len()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The point count of the record's own sequence.
    pub fn real_size(&self) -> usize {
        self.points.len()
    }

    /// The uncloned point values of the record or the suite master.
    pub fn master_points(&self) -> &[Option<i32>] {
        if self.selector.is_trail_suite() {
            self.suite_records
                .get(self.selector.suite_master_index())
                .map(SuiteRecord::points)
                .unwrap_or(&[])
        } else {
            &self.points
        }
    }

    /// The point value of the record's own sequence at `index`.
    pub fn element_at(&self, index: usize) -> Option<i32> {
        self.points.get(index).copied().flatten()
    }

    /// Raw maximum, cosmetically widened for flat data.
    pub fn max_value(&self) -> i32 {
        if self.max_value == self.min_value {
            self.max_value + 100
        } else {
            self.max_value
        }
    }

    /// Raw minimum, cosmetically widened for flat data.
    pub fn min_value(&self) -> i32 {
        if self.min_value == self.max_value {
            self.min_value - 100
        } else {
            self.min_value
        }
    }

    pub fn suite_max_value(&self) -> i32 {
        self.suite_records.suite_max_value()
    }

    pub fn suite_min_value(&self) -> i32 {
        self.suite_records.suite_min_value()
    }

    pub fn set_sync_min_max(&mut self, min: i32, max: i32) {
        self.sync_min = min;
        self.sync_max = max;
    }

    pub fn sync_min(&self) -> i32 {
        self.sync_min
    }

    pub fn sync_max(&self) -> i32 {
        self.sync_max
    }

    // ── display eligibility ────────────────────────────────────────────────

    /// True if the record is active and holds data values.
    pub fn is_active(&self) -> bool {
        self.item.base().is_active && self.len() > 0
    }

    /// True if the record is not suppressed by the histo display settings.
    pub fn is_allowed_by_setting(&self, settings: &HistoDisplaySettings) -> bool {
        match &self.item {
            ChannelItem::Measurement(_) => true,
            ChannelItem::Settlement(_) => settings.display_settlements,
            ChannelItem::ScoreGroup(_) => settings.display_scores,
        }
    }

    /// True if the record or the suite contains reasonable data for display:
    /// non-constant or at least away from zero.
    pub fn has_reasonable_data(&self, vaults: &[&Vault], settings: &HistoDisplaySettings) -> bool {
        if self.len() == 0 {
            return false;
        }
        let extrema = self.define_extrema(vaults, settings);
        let reasonable = !crate::stats::fuzzy_equals(extrema[0], extrema[1])
            || !crate::stats::fuzzy_equals(extrema[0], 0.);
        debug!(record = self.name(), reasonable, "reasonable data");
        reasonable
    }

    /// Update the displayable state from the category gate, the device active
    /// flag and the data contents.
    pub fn set_displayable(&mut self, vaults: &[&Vault], settings: &HistoDisplaySettings) {
        self.is_displayable =
            self.is_active() && self.is_allowed_by_setting(settings) && self.has_reasonable_data(vaults, settings);
    }

    pub fn is_displayable(&self) -> bool {
        self.is_displayable
    }

    pub fn is_visible(&self) -> bool {
        self.template.is_visible
    }

    pub fn set_visible(&mut self, enabled: bool) {
        self.template.is_visible = enabled;
    }

    // ── derived statistics ─────────────────────────────────────────────────

    /// All decoded non-null record values of the single curve or suite master.
    pub fn decoded_not_null_values(&self) -> Vec<f64> {
        self.master_points().iter().flatten().map(|&v| self.decode(v)).collect()
    }

    /// The quantile over the decoded values, built lazily and dropped on
    /// [`clear`](Self::clear).
    pub fn quantile(&mut self, settings: &HistoDisplaySettings) -> &Quantile {
        if self.quantile.is_none() {
            let quantile = Quantile::new(self.decoded_not_null_values(), true)
                .with_mode(settings.tolerance_mode);
            trace!(record = self.name(), size = quantile.size(), "defined quantile");
            self.quantile = Some(quantile);
        }
        self.quantile.as_ref().expect("quantile was just defined")
    }

    /// The start/end indices fitting the two timestamps, in ascending order.
    pub fn define_range_indices(
        &self,
        time_steps: &TimeSteps,
        timestamp1_ms: i64,
        timestamp2_ms: i64,
    ) -> (usize, usize) {
        let index1 = time_steps.best_index(timestamp1_ms);
        let index2 = time_steps.best_index(timestamp2_ms);
        (index1.min(index2), index1.max(index2))
    }

    /// The range of spots (timestamp ms, decoded value) for the index range,
    /// both bounds inclusive. Supports suites via the master record.
    pub fn sub_points(
        &self,
        time_steps: &TimeSteps,
        from_index: usize,
        to_index: usize,
    ) -> Vec<Spot<f64>> {
        let points = self.master_points();
        if points.is_empty() || from_index >= points.len() {
            return Vec::new();
        }
        let mut result = Vec::with_capacity(to_index.saturating_sub(from_index) + 1);
        for index in from_index..=to_index.min(points.len() - 1) {
            if let Some(value) = points[index] {
                result.push(Spot::new(time_steps.time_ms(index) as f64, self.decode(value)));
            }
        }
        result
    }

    // ── extrema over the vault population ──────────────────────────────────

    /// The lower/upper scale values for this record over all vaults.
    pub fn define_extrema(&self, vaults: &[&Vault], settings: &HistoDisplaySettings) -> [f64; 2] {
        match &self.item {
            ChannelItem::ScoreGroup(group) => {
                let ordinals: Vec<usize> = group.scores.iter().map(|s| s.trail_ordinal).collect();
                self.define_score_extrema(vaults, &ordinals, settings)
            }
            _ => {
                let trail = self.selector.trail_type();
                if trail.is_alien_value() {
                    self.define_alien_extrema(vaults, trail, settings)
                } else {
                    self.define_standard_extrema(vaults, settings)
                }
            }
        }
    }

    /// The min/max values from the most recent recordings.
    pub fn define_recent_min_max(
        &self,
        vaults: &[&Vault],
        limit: usize,
    ) -> [f64; 2] {
        match &self.item {
            ChannelItem::ScoreGroup(group) => {
                let ordinals: Vec<usize> = group.scores.iter().map(|s| s.trail_ordinal).collect();
                let mut min = f64::MAX;
                let mut max = -f64::MAX;
                for vault in vaults.iter().take(limit) {
                    for &ordinal in &ordinals {
                        if let Some(point) = self.vault_point(vault, ordinal) {
                            let decoded = self.decode(point);
                            min = min.min(decoded);
                            max = max.max(decoded);
                        }
                    }
                }
                if min == f64::MAX || max == -f64::MAX {
                    [0., 0.]
                } else {
                    [min, max]
                }
            }
            _ => {
                let trail = self.selector.trail_type();
                if trail.is_alien_value() {
                    let decoded: Vec<f64> = vaults
                        .iter()
                        .take(limit)
                        .filter_map(|v| self.vault_point(v, trail.ordinal()))
                        .map(|p| self.decode(p))
                        .collect();
                    if decoded.is_empty() {
                        [0., 0.]
                    } else {
                        [
                            decoded.iter().copied().fold(f64::MAX, f64::min),
                            decoded.iter().copied().fold(-f64::MAX, f64::max),
                        ]
                    }
                } else {
                    let mut min = f64::MAX;
                    let mut max = -f64::MAX;
                    for vault in vaults.iter().take(limit) {
                        if let Some(point) = self.vault_point(vault, TrailType::Min.ordinal()) {
                            min = min.min(self.decode(point));
                        }
                        if let Some(point) = self.vault_point(vault, TrailType::Max.ordinal()) {
                            max = max.max(self.decode(point));
                        }
                    }
                    if min == f64::MAX || max == -f64::MAX {
                        [0., 0.]
                    } else {
                        [min, max]
                    }
                }
            }
        }
    }

    /// The lower/upper values based on the q0/q4 distribution, corrected by
    /// the min/max whiskers when those fall outside the scale.
    fn define_standard_extrema(&self, vaults: &[&Vault], settings: &HistoDisplaySettings) -> [f64; 2] {
        let mut decoded_mins = Vec::new();
        let mut decoded_lows = Vec::new();
        let mut decoded_highs = Vec::new();
        let mut decoded_maxs = Vec::new();
        for vault in vaults {
            if let Some(point) = self.vault_point(vault, TrailType::Min.ordinal()) {
                decoded_mins.push(self.decode(point));
            }
            if let Some(point) = self.vault_point(vault, TrailType::Q0.ordinal()) {
                decoded_lows.push(self.decode(point));
            }
            if let Some(point) = self.vault_point(vault, TrailType::Q4.ordinal()) {
                decoded_highs.push(self.decode(point));
            }
            if let Some(point) = self.vault_point(vault, TrailType::Max.ordinal()) {
                decoded_maxs.push(self.decode(point));
            }
        }
        if decoded_lows.is_empty() || decoded_highs.is_empty() {
            return [0., 0.];
        }
        let mut result = self.scale_extrema(&decoded_lows, &decoded_highs, settings);

        // whiskers outside the q0/q4 span widen the scale
        if !decoded_mins.is_empty() {
            let lower_whisker = Quantile::new(decoded_mins, true)
                .with_mode(settings.tolerance_mode)
                .quantile_lower_whisker();
            if lower_whisker < result[0] {
                result[0] = lower_whisker;
                trace!(record = self.name(), lower_whisker, "lower corrected");
            }
        }
        if !decoded_maxs.is_empty() {
            let upper_whisker = Quantile::new(decoded_maxs, true)
                .with_mode(settings.tolerance_mode)
                .quantile_upper_whisker();
            if upper_whisker > result[1] {
                result[1] = upper_whisker;
                trace!(record = self.name(), upper_whisker, "upper corrected");
            }
        }
        result
    }

    /// The lower/upper values for trails with a number range alien to the
    /// measurement values (e.g. SD, counters).
    fn define_alien_extrema(
        &self,
        vaults: &[&Vault],
        trail: TrailType,
        settings: &HistoDisplaySettings,
    ) -> [f64; 2] {
        let decoded: Vec<f64> = vaults
            .iter()
            .filter_map(|v| self.vault_point(v, trail.ordinal()))
            .map(|p| self.decode(p))
            .collect();
        if decoded.is_empty() {
            [0., 0.]
        } else {
            self.scale_extrema(&decoded, &decoded, settings)
        }
    }

    /// The lower/upper values over all score group members.
    fn define_score_extrema(
        &self,
        vaults: &[&Vault],
        score_ordinals: &[usize],
        settings: &HistoDisplaySettings,
    ) -> [f64; 2] {
        let mut decoded_lows = Vec::new();
        let mut decoded_highs = Vec::new();
        for vault in vaults {
            let decoded: Vec<f64> = score_ordinals
                .iter()
                .filter_map(|&ordinal| self.vault_point(vault, ordinal))
                .map(|p| self.decode(p))
                .collect();
            if !decoded.is_empty() {
                decoded_lows.push(decoded.iter().copied().fold(f64::MAX, f64::min));
                decoded_highs.push(decoded.iter().copied().fold(-f64::MAX, f64::max));
            }
        }
        if decoded_lows.is_empty() || decoded_highs.is_empty() {
            [0., 0.]
        } else {
            self.scale_extrema(&decoded_lows, &decoded_highs, settings)
        }
    }

    /// Whisker- and spread-based scale bounds from low/high distributions.
    fn scale_extrema(
        &self,
        decoded_lows: &[f64],
        decoded_highs: &[f64],
        settings: &HistoDisplaySettings,
    ) -> [f64; 2] {
        let min_quantile =
            Quantile::new(decoded_lows.to_vec(), true).with_mode(settings.tolerance_mode);
        let max_quantile =
            Quantile::new(decoded_highs.to_vec(), true).with_mode(settings.tolerance_mode);
        let spread = settings.summary_scale_spread.max(1) as f64;
        let scale_min = min_quantile
            .extremum_from_range(crate::stats::INTER_QUARTILE_SIGMA_FACTOR, -spread);
        let scale_max =
            max_quantile.extremum_from_range(crate::stats::INTER_QUARTILE_SIGMA_FACTOR, spread);
        let result = [
            min_quantile.quantile_lower_whisker().min(scale_min),
            max_quantile.quantile_upper_whisker().max(scale_max),
        ];
        trace!(record = self.name(), ?result, "scale extrema");
        result
    }

    /// The extended Tukey tolerance arrays for the extremum trails, or `None`
    /// when the vaults hold no extremum values.
    pub fn define_extremum_quantiles(
        &self,
        vaults: &[&Vault],
        settings: &HistoDisplaySettings,
    ) -> Option<[[f64; 9]; 2]> {
        let ordinals = self.selector.extremum_ordinals();
        let decoded_mins: Vec<f64> = vaults
            .iter()
            .filter_map(|v| self.vault_point(v, ordinals[0]))
            .map(|p| self.decode(p))
            .collect();
        let decoded_maxs: Vec<f64> = vaults
            .iter()
            .filter_map(|v| self.vault_point(v, ordinals[1]))
            .map(|p| self.decode(p))
            .collect();
        if decoded_mins.is_empty() || decoded_maxs.is_empty() {
            return None;
        }
        let min_quantile = Quantile::new(decoded_mins, true).with_mode(settings.tolerance_mode);
        let max_quantile = Quantile::new(decoded_maxs, true).with_mode(settings.tolerance_mode);
        Some([
            min_quantile.tukey_with_quartile_tolerances(),
            max_quantile.tukey_with_quartile_tolerances(),
        ])
    }

    /// Determine the outliers of the most significant category: far outliers,
    /// or close outliers when no far outliers are present, or whisker
    /// transgressions when enabled. `log_limit` restricts the check to the
    /// most recent recordings.
    pub fn define_min_max_warning(
        &self,
        vaults: &[&Vault],
        log_limit: usize,
        settings: &HistoDisplaySettings,
    ) -> [Option<Outliers>; 2] {
        let warning_level = settings.warning_level;
        if warning_level == -1 {
            return [None, None];
        }
        let Some(min_max_quantiles) = self.define_extremum_quantiles(vaults, settings) else {
            return [None, None];
        };

        let min_whisker_limit = min_max_quantiles[0][BoxplotItem::Quartile1.index()];
        let max_whisker_limit = min_max_quantiles[1][BoxplotItem::Quartile3.index()];
        let close_min_limit = min_max_quantiles[0][BoxplotItem::LowerWhisker.index()];
        let close_max_limit = min_max_quantiles[1][BoxplotItem::UpperWhisker.index()];
        let far_min_limit = min_max_quantiles[0][BoxplotItem::Quartile1.index()]
            - 3. * 2. * min_max_quantiles[0][BoxplotItem::LowerTolerance.index()];
        let far_max_limit = min_max_quantiles[1][BoxplotItem::Quartile3.index()]
            + 3. * 2. * min_max_quantiles[1][BoxplotItem::UpperTolerance.index()];
        let extremum_indices = self.selector.extremum_indices();
        let select_texts = self.selector.extremum_texts();

        let mut min_warning: Option<Outliers> = None;
        let mut max_warning: Option<Outliers> = None;

        let actual_limit = if log_limit > 0 && log_limit < vaults.len() { log_limit } else { vaults.len() };
        for (i, vault) in vaults.iter().take(actual_limit).enumerate() {
            let trail_points = self.extremum_trail_points(vault);
            let (Some(min_point), Some(max_point)) = (trail_points[0], trail_points[1]) else {
                continue;
            };

            let min_value = self.decode(min_point);
            if fuzzy_compare(min_value, far_min_limit) == std::cmp::Ordering::Less {
                if !matches!(min_warning.as_ref().map(Outliers::warning_type), Some(OutlierWarning::Far)) {
                    // a far outlier supersedes any lower category warning
                    min_warning = Some(Outliers::new(
                        OutlierWarning::Far,
                        far_min_limit,
                        close_min_limit,
                        extremum_indices[0],
                        select_texts[0].clone(),
                    ));
                }
                if let Some(warning) = min_warning.as_mut() {
                    warning.add(min_value, i);
                }
            } else if OutlierWarning::Close.is_included(warning_level)
                && fuzzy_compare(min_value, close_min_limit) == std::cmp::Ordering::Less
            {
                match min_warning.as_ref().map(Outliers::warning_type) {
                    None | Some(OutlierWarning::Whisker) => {
                        let mut warning = Outliers::new(
                            OutlierWarning::Close,
                            far_min_limit,
                            close_min_limit,
                            extremum_indices[0],
                            select_texts[0].clone(),
                        );
                        warning.add(min_value, i);
                        min_warning = Some(warning);
                    }
                    Some(OutlierWarning::Close) => {
                        if let Some(warning) = min_warning.as_mut() {
                            warning.add(min_value, i);
                        }
                    }
                    Some(OutlierWarning::Far) => {} // far warnings take precedence
                }
            } else if OutlierWarning::Whisker.is_included(warning_level)
                && fuzzy_compare(min_value, min_whisker_limit) == std::cmp::Ordering::Less
            {
                match min_warning.as_ref().map(Outliers::warning_type) {
                    None => {
                        let mut warning = Outliers::new(
                            OutlierWarning::Whisker,
                            far_min_limit,
                            close_min_limit,
                            extremum_indices[0],
                            select_texts[0].clone(),
                        );
                        warning.add(min_value, i);
                        min_warning = Some(warning);
                    }
                    Some(OutlierWarning::Whisker) => {
                        if let Some(warning) = min_warning.as_mut() {
                            warning.add(min_value, i);
                        }
                    }
                    _ => {}
                }
            }

            let max_value = self.decode(max_point);
            if fuzzy_compare(max_value, far_max_limit) == std::cmp::Ordering::Greater {
                if !matches!(max_warning.as_ref().map(Outliers::warning_type), Some(OutlierWarning::Far)) {
                    max_warning = Some(Outliers::new(
                        OutlierWarning::Far,
                        far_max_limit,
                        close_max_limit,
                        extremum_indices[1],
                        select_texts[1].clone(),
                    ));
                }
                if let Some(warning) = max_warning.as_mut() {
                    warning.add(max_value, i);
                }
            } else if OutlierWarning::Close.is_included(warning_level)
                && fuzzy_compare(max_value, close_max_limit) == std::cmp::Ordering::Greater
            {
                match max_warning.as_ref().map(Outliers::warning_type) {
                    None | Some(OutlierWarning::Whisker) => {
                        let mut warning = Outliers::new(
                            OutlierWarning::Close,
                            far_max_limit,
                            close_max_limit,
                            extremum_indices[1],
                            select_texts[1].clone(),
                        );
                        warning.add(max_value, i);
                        max_warning = Some(warning);
                    }
                    Some(OutlierWarning::Close) => {
                        if let Some(warning) = max_warning.as_mut() {
                            warning.add(max_value, i);
                        }
                    }
                    Some(OutlierWarning::Far) => {}
                }
            } else if OutlierWarning::Whisker.is_included(warning_level)
                && fuzzy_compare(max_value, max_whisker_limit) == std::cmp::Ordering::Greater
            {
                match max_warning.as_ref().map(Outliers::warning_type) {
                    None => {
                        let mut warning = Outliers::new(
                            OutlierWarning::Whisker,
                            far_max_limit,
                            close_max_limit,
                            extremum_indices[1],
                            select_texts[1].clone(),
                        );
                        warning.add(max_value, i);
                        max_warning = Some(warning);
                    }
                    Some(OutlierWarning::Whisker) => {
                        if let Some(warning) = max_warning.as_mut() {
                            warning.add(max_value, i);
                        }
                    }
                    _ => {}
                }
            }
        }
        [min_warning, max_warning]
    }

    // ── template round trip ────────────────────────────────────────────────

    /// Write the record's view state into the template store.
    pub fn save_template(&self, store: &mut HistoTemplate) {
        let t = &self.template;
        store.set_record_property(self.ordinal, template::KEY_IS_VISIBLE, t.is_visible);
        store.set_record_property(self.ordinal, template::KEY_IS_POSITION_LEFT, t.is_position_left);
        store.set_record_property(
            self.ordinal,
            template::KEY_COLOR,
            format!("{},{},{}", t.color[0], t.color[1], t.color[2]),
        );
        store.set_record_property(self.ordinal, template::KEY_LINE_WIDTH, t.line_width);
        store.set_record_property(self.ordinal, template::KEY_LINE_STYLE, t.line_style.code());
        store.set_record_property(self.ordinal, template::KEY_IS_ROUND_OUT, t.is_round_out);
        store.set_record_property(self.ordinal, template::KEY_IS_START_POINT_ZERO, t.is_startpoint_zero);
        store.set_record_property(self.ordinal, template::KEY_NUMBER_FORMAT, t.number_format);
        store.set_record_property(self.ordinal, template::KEY_IS_START_END_DEFINED, t.is_start_end_defined);
        store.set_record_property(self.ordinal, template::KEY_DEFINED_MAX_VALUE, t.max_scale_value);
        store.set_record_property(self.ordinal, template::KEY_DEFINED_MIN_VALUE, t.min_scale_value);
        let selection = self.selector.selected_index().map(|i| i as i64).unwrap_or(-1);
        store.set_record_property(self.ordinal, template::KEY_TRAIL_TEXT_ORDINAL, selection);
    }

    /// Apply the view state from the template store.
    pub fn apply_template(&mut self, store: &HistoTemplate) {
        let ordinal = self.ordinal;
        let parse_bool = |value: Option<&str>, default: bool| {
            value.map(|v| v == "true").unwrap_or(default)
        };
        self.template.is_visible =
            parse_bool(store.record_property(ordinal, template::KEY_IS_VISIBLE), self.template.is_visible);
        self.template.is_position_left = parse_bool(
            store.record_property(ordinal, template::KEY_IS_POSITION_LEFT),
            self.template.is_position_left,
        );
        if let Some(rgb) = store.record_property(ordinal, template::KEY_COLOR) {
            let parts: Vec<u8> =
                rgb.split(',').filter_map(|p| p.trim().parse().ok()).collect();
            if parts.len() == 3 {
                self.template.color = [parts[0], parts[1], parts[2]];
            }
        }
        if let Some(width) = store.record_property(ordinal, template::KEY_LINE_WIDTH) {
            if let Ok(width) = width.parse() {
                self.template.line_width = width;
            }
        }
        if let Some(style) = store.record_property(ordinal, template::KEY_LINE_STYLE) {
            if let Ok(code) = style.parse() {
                self.template.line_style = LineStyle::from_code(code);
            }
        }
        self.template.is_round_out =
            parse_bool(store.record_property(ordinal, template::KEY_IS_ROUND_OUT), self.template.is_round_out);
        self.template.is_startpoint_zero = parse_bool(
            store.record_property(ordinal, template::KEY_IS_START_POINT_ZERO),
            self.template.is_startpoint_zero,
        );
        if let Some(format) = store.record_property(ordinal, template::KEY_NUMBER_FORMAT) {
            if let Ok(format) = format.parse() {
                self.template.number_format = format;
            }
        }
        self.template.is_start_end_defined = parse_bool(
            store.record_property(ordinal, template::KEY_IS_START_END_DEFINED),
            self.template.is_start_end_defined,
        );
        if let Some(max) = store.record_property(ordinal, template::KEY_DEFINED_MAX_VALUE) {
            if let Ok(max) = max.parse() {
                self.template.max_scale_value = max;
            }
        }
        if let Some(min) = store.record_property(ordinal, template::KEY_DEFINED_MIN_VALUE) {
            if let Ok(min) = min.parse() {
                self.template.min_scale_value = min;
            }
        }
        let selection = store
            .record_property(ordinal, template::KEY_TRAIL_TEXT_ORDINAL)
            .and_then(|v| v.parse().ok())
            .unwrap_or(-1);
        self.selector.select_template_ordinal(selection);
    }

    /// Refresh the calculated scale boundaries from the populated extremes,
    /// unless the template defines them explicitly.
    pub fn update_scale_values(&mut self) {
        if self.template.is_start_end_defined {
            return;
        }
        let (min, max) = if self.selector.is_trail_suite() {
            (self.suite_min_value(), self.suite_max_value())
        } else {
            (self.min_value, self.max_value)
        };
        if min != i32::MAX && max != i32::MIN {
            self.template.min_scale_value = self.decode(min);
            self.template.max_scale_value = self.decode(max);
        }
    }

    /// Set the scale min/max values as displayed.
    pub fn set_start_end_defined(&mut self, enabled: bool, min_scale: f64, max_scale: f64) {
        self.template.is_start_end_defined = enabled;
        if enabled {
            self.template.max_scale_value = max_scale;
            self.template.min_scale_value = min_scale;
        } else {
            self.template.max_scale_value = self.decode(self.max_value);
            self.template.min_scale_value = self.decode(self.min_value);
        }
    }
}

/// The alternating -1/+1 factor applied to deviation members of a range
/// suite; non-deviation members reset the factor to 0.
fn next_summation_factor(trail: TrailType, previous_factor: i32) -> i32 {
    if trail.is_alien_value() {
        if previous_factor == 0 {
            -1
        } else {
            -previous_factor
        }
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summation_factor_alternates_starting_negative() {
        let factor0 = next_summation_factor(TrailType::RealAvg, 0);
        assert_eq!(factor0, 0);
        let factor1 = next_summation_factor(TrailType::RealSd, factor0);
        assert_eq!(factor1, -1);
        let factor2 = next_summation_factor(TrailType::RealSd, factor1);
        assert_eq!(factor2, 1);
        let factor3 = next_summation_factor(TrailType::RealSd, factor2);
        assert_eq!(factor3, -1);
    }
}
