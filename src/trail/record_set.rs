//! The trail record set: all trail records for one device/channel
//! configuration, the time-step sequence, the tag table and the population
//! orchestration over the picked vaults.

use std::collections::BTreeMap;
use std::collections::HashMap;

use tracing::{debug, warn};

use crate::config::HistoDisplaySettings;
use crate::device::{ChannelConfig, ChannelItem};
use crate::error::HistoError;
use crate::gps::{GpsCluster, GpsCoordinate, GpsLocationTask};
use crate::template::{self, HistoTemplate};
use crate::trail::record::TrailRecord;
use crate::trail::selector::TrailSelector;
use crate::trail::synchronizer;
use crate::trail::tags::TrailDataTags;
use crate::trail::types::TrailType;
use crate::vault::{Vault, VaultMap};

/// The time-step sequence: one entry per accepted recording, newest first.
/// Values are stored in tenths of milliseconds.
#[derive(Debug, Clone, Default)]
pub struct TimeSteps {
    steps_tenth_ms: Vec<i64>,
}

impl TimeSteps {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.steps_tenth_ms.clear();
    }

    /// Append a raw tenth-millisecond timestamp; false on a duplicate.
    pub fn add_raw(&mut self, tenth_ms: i64) -> bool {
        if self.steps_tenth_ms.contains(&tenth_ms) {
            false
        } else {
            self.steps_tenth_ms.push(tenth_ms);
            true
        }
    }

    pub fn len(&self) -> usize {
        self.steps_tenth_ms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps_tenth_ms.is_empty()
    }

    pub fn time_ms(&self, index: usize) -> i64 {
        self.steps_tenth_ms[index] / 10
    }

    pub fn first_time_ms(&self) -> Option<i64> {
        self.steps_tenth_ms.first().map(|t| t / 10)
    }

    pub fn last_time_ms(&self) -> Option<i64> {
        self.steps_tenth_ms.last().map(|t| t / 10)
    }

    /// The index of the time step closest to the timestamp.
    pub fn best_index(&self, timestamp_ms: i64) -> usize {
        let mut best = 0;
        let mut best_distance = i64::MAX;
        for (i, step) in self.steps_tenth_ms.iter().enumerate() {
            let distance = (step / 10 - timestamp_ms).abs();
            if distance < best_distance {
                best_distance = distance;
                best = i;
            }
        }
        best
    }

    /// The display timestamp, honoring the X axis direction.
    pub fn display_time_ms(&self, index: usize, x_axis_reversed: bool) -> i64 {
        if x_axis_reversed {
            self.time_ms(index)
        } else {
            self.time_ms(self.len() - 1 - index)
        }
    }
}

/// The data source of the record set: the initial vault map plus the indexed
/// subset which contributed time steps (duplicate start timestamps are
/// skipped).
#[derive(Debug, Default)]
pub struct PickedVaults {
    map: VaultMap,
    /// (bucket timestamp, position in bucket) of each accepted vault, in
    /// time-step order.
    accepted: Vec<(i64, usize)>,
}

impl PickedVaults {
    fn new(map: VaultMap) -> Self {
        Self { map, accepted: Vec::new() }
    }

    fn clear_index(&mut self) {
        self.accepted.clear();
    }

    /// All vaults newest first, including the ones without a time step.
    pub fn all_vaults(&self) -> Vec<&Vault> {
        self.map.vaults_newest_first().collect()
    }

    /// The vaults backing the time-step sequence, in time-step order.
    pub fn indexed_vaults(&self) -> Vec<&Vault> {
        (0..self.accepted.len()).filter_map(|i| self.vault_at(i)).collect()
    }

    /// The vault backing the time step at `index`.
    pub fn vault_at(&self, index: usize) -> Option<&Vault> {
        let &(ts, pos) = self.accepted.get(index)?;
        self.map
            .buckets_newest_first()
            .find(|&(bucket_ts, _)| bucket_ts == ts)
            .and_then(|(_, vaults)| vaults.get(pos))
    }
}

/// All trail records of one device/channel configuration. The vector order
/// is the display sequence; the ordinals refer to the sequence of
/// measurements + settlements + score groups.
#[derive(Debug)]
pub struct TrailRecordSet {
    device_name: String,
    channel_number: usize,
    settings: HistoDisplaySettings,
    records: Vec<TrailRecord>,
    name_index: HashMap<String, usize>,
    time_steps: TimeSteps,
    /// Individual durations for all recordings, in minutes.
    durations_mm: Vec<i32>,
    data_tags: TrailDataTags,
    picked: PickedVaults,
    template: HistoTemplate,
    /// Master record ordinal mapped to the synced record ordinals, master first.
    scale_synced_records: BTreeMap<usize, Vec<usize>>,
    visible_and_displayable: Vec<usize>,
    display_records: Vec<usize>,
    value_grid_record_name: String,
    gps_task: Option<GpsLocationTask>,
}

impl TrailRecordSet {
    /// Create a record set containing empty records according to the channel
    /// configuration. The display sequence pins score groups and settlements
    /// with the top placement property before the measurements.
    pub fn create(
        device_name: &str,
        channel: &ChannelConfig,
        settings: HistoDisplaySettings,
        template: HistoTemplate,
    ) -> Result<Self, HistoError> {
        let mut set = Self {
            device_name: device_name.to_string(),
            channel_number: channel.number,
            settings,
            records: Vec::with_capacity(channel.item_count()),
            name_index: HashMap::new(),
            time_steps: TimeSteps::new(),
            durations_mm: Vec::new(),
            data_tags: TrailDataTags::new(),
            picked: PickedVaults::default(),
            template,
            scale_synced_records: BTreeMap::new(),
            visible_and_displayable: Vec::new(),
            display_records: Vec::new(),
            value_grid_record_name: String::new(),
            gps_task: None,
        };

        let measurement_count = channel.measurements.len();
        let settlement_count = channel.settlements.len();

        // display section 0: score groups pinned at the top; their ordinals
        // start after measurements + settlements for template compatibility
        for (i, group) in channel.score_groups.iter().enumerate() {
            if group.base.top_placement {
                let ordinal = measurement_count + settlement_count + i;
                let selector = TrailSelector::for_score_group(group)?;
                set.put_record(TrailRecord::new(ordinal, ChannelItem::ScoreGroup(group.clone()), selector));
            }
        }
        // display section 1: settlements pinned at the top
        for (i, settlement) in channel.settlements.iter().enumerate() {
            if settlement.base.top_placement {
                let ordinal = measurement_count + i;
                let selector = TrailSelector::for_settlement(settlement, set.settings.smart_statistics)?;
                set.put_record(TrailRecord::new(ordinal, ChannelItem::Settlement(settlement.clone()), selector));
            }
        }
        // display section 2: all measurements
        for (i, measurement) in channel.measurements.iter().enumerate() {
            let selector =
                TrailSelector::for_measurement(measurement, channel, set.settings.smart_statistics)?;
            set.put_record(TrailRecord::new(i, ChannelItem::Measurement(measurement.clone()), selector));
        }
        // display section 3: the remaining settlements
        for (i, settlement) in channel.settlements.iter().enumerate() {
            if !settlement.base.top_placement {
                let ordinal = measurement_count + i;
                let selector = TrailSelector::for_settlement(settlement, set.settings.smart_statistics)?;
                set.put_record(TrailRecord::new(ordinal, ChannelItem::Settlement(settlement.clone()), selector));
            }
        }
        // display section 4: the remaining score groups
        for (i, group) in channel.score_groups.iter().enumerate() {
            if !group.base.top_placement {
                let ordinal = measurement_count + settlement_count + i;
                let selector = TrailSelector::for_score_group(group)?;
                set.put_record(TrailRecord::new(ordinal, ChannelItem::ScoreGroup(group.clone()), selector));
            }
        }

        if let Some(first) = set.records.first() {
            set.value_grid_record_name = first.name().to_string();
        }
        debug!(records = set.records.len(), "created record set");
        Ok(set)
    }

    fn put_record(&mut self, record: TrailRecord) {
        self.name_index.insert(record.name().to_string(), self.records.len());
        self.records.push(record);
    }

    pub fn name(&self) -> String {
        format!("{}_{}", self.device_name, self.channel_number)
    }

    pub fn settings(&self) -> &HistoDisplaySettings {
        &self.settings
    }

    pub fn channel_number(&self) -> usize {
        self.channel_number
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[TrailRecord] {
        &self.records
    }

    pub fn records_mut(&mut self) -> &mut [TrailRecord] {
        &mut self.records
    }

    pub fn record_names(&self) -> Vec<&str> {
        self.records.iter().map(TrailRecord::name).collect()
    }

    pub fn get(&self, record_name: &str) -> Option<&TrailRecord> {
        self.name_index.get(record_name).map(|&i| &self.records[i])
    }

    pub fn get_mut(&mut self, record_name: &str) -> Option<&mut TrailRecord> {
        self.name_index.get(record_name).copied().map(move |i| &mut self.records[i])
    }

    pub fn get_by_ordinal(&self, ordinal: usize) -> Option<&TrailRecord> {
        self.records.iter().find(|r| r.ordinal() == ordinal)
    }

    pub fn get_by_ordinal_mut(&mut self, ordinal: usize) -> Option<&mut TrailRecord> {
        self.records.iter_mut().find(|r| r.ordinal() == ordinal)
    }

    pub fn index_of_ordinal(&self, ordinal: usize) -> Option<usize> {
        self.records.iter().position(|r| r.ordinal() == ordinal)
    }

    // ── population ─────────────────────────────────────────────────────────

    /// Build the data contents after building the records list. Applies the
    /// template trail selections before population.
    pub fn initialize_from_vaults(&mut self, vaults: VaultMap) {
        self.picked = PickedVaults::new(vaults);
        self.cleanup();
        self.collect_vaults();

        let accepted = self.picked.indexed_vaults();
        for record in &mut self.records {
            let template_value = self
                .template
                .record_property(record.ordinal(), template::KEY_TRAIL_TEXT_ORDINAL)
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(-1);
            record.selector_mut().select_template_ordinal(template_value);
            if record.selector().selected_index().is_none() {
                record.selector_mut().set_most_applicable();
            }
            record.initialize_from_vaults(&accepted);
        }
        drop(accepted);

        self.after_population();
    }

    /// Refill the data contents, keeping the current trail selections.
    pub fn refill_from_vaults(&mut self, vaults: VaultMap) {
        self.picked = PickedVaults::new(vaults);
        self.refill_record_set();
    }

    /// Clear all records and tag tables and repopulate from the picked
    /// vaults. Refilling twice produces identical point sequences.
    pub fn refill_record_set(&mut self) {
        self.cleanup();
        self.collect_vaults();

        let accepted = self.picked.indexed_vaults();
        for record in &mut self.records {
            if record.selector().selected_index().is_none() {
                record.selector_mut().set_most_applicable();
            }
            record.initialize_from_vaults(&accepted);
        }
        drop(accepted);

        self.after_population();
    }

    /// Rebuild one record based on a new trail selection.
    pub fn refill_record(&mut self, record_name: &str, trail_text_index: usize) {
        let accepted = self.picked.indexed_vaults();
        if let Some(&index) = self.name_index.get(record_name) {
            let record = &mut self.records[index];
            record.selector_mut().select(trail_text_index);
            record.initialize_from_vaults(&accepted);
            record.update_scale_values();
        }
        drop(accepted);
        synchronizer::sync_scales(self);
    }

    /// Set the time steps, durations and data tags from the vault sequence.
    /// Tag rows are written for every vault; a vault with a duplicate start
    /// timestamp contributes neither a time step nor record points.
    fn collect_vaults(&mut self) {
        let mut accepted = Vec::new();
        for (bucket_ts, vaults) in self.picked.map.buckets_newest_first() {
            for (pos, vault) in vaults.iter().enumerate() {
                self.data_tags.add(vault);
                if self.time_steps.add_raw(vault.start_timestamp_ms() * 10) {
                    self.durations_mm.push(vault.duration_mm());
                    accepted.push((bucket_ts, pos));
                } else {
                    warn!(
                        start_timestamp_ms = vault.start_timestamp_ms(),
                        file = %vault.log_file_path().display(),
                        "duplicate recordset start timestamp"
                    );
                }
            }
        }
        self.picked.accepted = accepted;
    }

    fn after_population(&mut self) {
        for record in &mut self.records {
            record.update_scale_values();
        }
        self.set_displayable();
        self.update_visible_and_displayable();
        self.set_gps_location_tags();
        synchronizer::sync_scales(self);
    }

    /// Revert adding vault data to the record set. Does not clear the records
    /// or the template.
    pub fn cleanup(&mut self) {
        self.time_steps.clear();
        self.durations_mm.clear();
        self.picked.clear_index();
        self.data_tags.clear();
    }

    // ── GPS location tagging ───────────────────────────────────────────────

    /// Locate the latitude/longitude records and start the asynchronous
    /// location tagging with the default coordinate label resolver.
    pub fn set_gps_location_tags(&mut self) {
        self.set_gps_location_tags_with(|center| center.format_degrees(), || {});
    }

    /// Start the asynchronous location tagging with an explicit location
    /// resolver and completion callback. A no-op unless both coordinate
    /// records exist and at least one vault carries both medians.
    pub fn set_gps_location_tags_with(
        &mut self,
        locator: impl Fn(&GpsCoordinate) -> String + Send + 'static,
        on_complete: impl FnOnce() + Send + 'static,
    ) {
        let latitude_record = self
            .records
            .iter()
            .find(|r| r.data_type() == crate::device::DataType::GpsLatitude);
        let longitude_record = self
            .records
            .iter()
            .find(|r| r.data_type() == crate::device::DataType::GpsLongitude);
        let (Some(latitude_record), Some(longitude_record)) = (latitude_record, longitude_record)
        else {
            return;
        };

        // median coordinates per vault, gaps preserve the vault sequence
        let mut coordinates = Vec::new();
        for vault in self.picked.map.vaults_newest_first() {
            let latitude = latitude_record.vault_point(vault, TrailType::Q2.ordinal());
            let longitude = longitude_record.vault_point(vault, TrailType::Q2.ordinal());
            match (latitude, longitude) {
                (Some(latitude), Some(longitude)) => coordinates.push(Some(GpsCoordinate::new(
                    latitude_record.decode(latitude),
                    longitude_record.decode(longitude),
                ))),
                _ => coordinates.push(None),
            }
        }

        let cluster = GpsCluster::from_coordinates(coordinates);
        if cluster.real_count() > 0 {
            self.gps_task = GpsLocationTask::spawn(
                cluster,
                self.settings.gps_location_radius_km,
                locator,
                self.data_tags.gps_locations(),
                on_complete,
            );
        }
    }

    /// Take the handle of the running GPS task, e.g. to await it in tests.
    pub fn take_gps_task(&mut self) -> Option<GpsLocationTask> {
        self.gps_task.take()
    }

    // ── display bookkeeping ────────────────────────────────────────────────

    /// Update the displayable state of every record.
    pub fn set_displayable(&mut self) {
        let vaults = self.picked.all_vaults();
        let settings = self.settings.clone();
        for record in &mut self.records {
            record.set_displayable(&vaults, &settings);
        }
    }

    /// Update the collections of displayable records, kept in record
    /// insertion order.
    pub fn update_visible_and_displayable(&mut self) {
        self.visible_and_displayable.clear();
        self.display_records.clear();
        for (i, record) in self.records.iter().enumerate() {
            if record.is_displayable() {
                self.display_records.push(i);
                if record.is_visible() {
                    self.visible_and_displayable.push(i);
                }
            }
        }
    }

    /// All records for display, as indices into [`records`](Self::records).
    pub fn display_records(&self) -> &[usize] {
        &self.display_records
    }

    /// Visible and displayable records, e.g. for the partial data table.
    pub fn visible_and_displayable_records(&self) -> &[usize] {
        &self.visible_and_displayable
    }

    /// The records for the data table, honoring the partial table setting.
    pub fn records_for_table(&self) -> &[usize] {
        if self.settings.partial_data_table {
            &self.visible_and_displayable
        } else {
            &self.display_records
        }
    }

    /// Record indices sorted for display: the grid record first, then the
    /// visible scale sync masters, then all remaining display records.
    pub fn records_sorted_for_display(&self) -> Vec<usize> {
        let mut result = Vec::new();
        for &i in &self.display_records {
            if self.is_value_grid_record(&self.records[i]) {
                result.push(i);
            }
        }
        for &i in &self.display_records {
            let record = &self.records[i];
            if !self.is_value_grid_record(record) {
                if let Some(master_ordinal) = record.scale_sync_ref_ordinal() {
                    if let Some(master_index) = self.index_of_ordinal(master_ordinal) {
                        if !result.contains(&master_index) && self.is_one_syncable_visible(master_ordinal) {
                            result.push(master_index);
                        }
                    }
                }
            }
        }
        for &i in &self.display_records {
            let record = &self.records[i];
            if !self.is_value_grid_record(record) && !self.is_scale_sync_master(record.ordinal()) {
                result.push(i);
            }
        }
        result
    }

    pub fn is_value_grid_record(&self, record: &TrailRecord) -> bool {
        self.value_grid_record_name == record.name()
    }

    pub fn value_grid_record_name(&self) -> &str {
        &self.value_grid_record_name
    }

    pub fn set_value_grid_record_name(&mut self, record_name: &str) {
        let name = if self.name_index.contains_key(record_name) {
            record_name.to_string()
        } else {
            self.records.first().map(|r| r.name().to_string()).unwrap_or_default()
        };
        // a synced record delegates the grid to its sync master
        self.value_grid_record_name = match self
            .get(&name)
            .and_then(TrailRecord::scale_sync_ref_ordinal)
            .and_then(|ordinal| self.get_by_ordinal(ordinal))
        {
            Some(master) => master.name().to_string(),
            None => name,
        };
    }

    // ── scale synchronization ──────────────────────────────────────────────

    pub(crate) fn scale_synced_records(&self) -> &BTreeMap<usize, Vec<usize>> {
        &self.scale_synced_records
    }

    pub(crate) fn scale_synced_records_mut(&mut self) -> &mut BTreeMap<usize, Vec<usize>> {
        &mut self.scale_synced_records
    }

    /// The synced record ordinals of a master, master first.
    pub fn synced_record_ordinals(&self, master_ordinal: usize) -> Option<&[usize]> {
        self.scale_synced_records.get(&master_ordinal).map(Vec::as_slice)
    }

    pub fn is_scale_sync_master(&self, ordinal: usize) -> bool {
        self.scale_synced_records.contains_key(&ordinal)
    }

    /// True if the record participates in any sync group.
    pub fn is_one_of_syncable_records(&self, record_name: &str) -> bool {
        let Some(record) = self.get(record_name) else { return false };
        self.scale_synced_records.values().any(|group| group.contains(&record.ordinal()))
    }

    /// True if any member of the master's group is visible and displayable.
    pub fn is_one_syncable_visible(&self, master_ordinal: usize) -> bool {
        self.scale_synced_records
            .get(&master_ordinal)
            .map(|group| {
                group.iter().any(|&ordinal| {
                    self.get_by_ordinal(ordinal)
                        .map(|r| r.is_visible() && r.is_displayable())
                        .unwrap_or(false)
                })
            })
            .unwrap_or(false)
    }

    /// The sync master ordinal of a record, if scale synced.
    pub fn sync_master_record_ordinal(&self, record_name: &str) -> Option<usize> {
        self.get(record_name).and_then(TrailRecord::scale_sync_ref_ordinal)
    }

    // ── timesteps, tags, vaults ────────────────────────────────────────────

    /// The number of time steps; equals the length of all trail records.
    pub fn time_step_size(&self) -> usize {
        self.time_steps.len()
    }

    pub fn time_steps(&self) -> &TimeSteps {
        &self.time_steps
    }

    /// The position of the time step closest to the timestamp.
    pub fn index_of_timestamp(&self, timestamp_ms: i64) -> usize {
        self.time_steps.best_index(timestamp_ms)
    }

    pub fn durations_mm(&self) -> &[i32] {
        &self.durations_mm
    }

    pub fn data_tags(&self) -> &TrailDataTags {
        &self.data_tags
    }

    pub fn picked_vaults(&self) -> &PickedVaults {
        &self.picked
    }

    /// The vault backing the time step at `index`.
    pub fn vault_at(&self, index: usize) -> Option<&Vault> {
        self.picked.vault_at(index)
    }

    // ── template round trip ────────────────────────────────────────────────

    pub fn template(&self) -> &HistoTemplate {
        &self.template
    }

    /// Save the view configuration of all records into the template store.
    pub fn save_template(&mut self) {
        let mut store = std::mem::take(&mut self.template);
        for record in &self.records {
            record.save_template(&mut store);
        }
        store.set_property(template::KEY_SMART_STATISTICS, self.settings.smart_statistics);
        if !self.value_grid_record_name.is_empty() {
            store.set_property(template::KEY_VALUE_GRID_RECORD_NAME, &self.value_grid_record_name);
        }
        store.set_comment(&self.name());
        self.template = store;
    }

    /// Apply the template definition to all records and update the display
    /// status. No-op for an unavailable (empty) template.
    pub fn apply_template(&mut self, do_update_visibility: bool) {
        if !self.template.is_available() {
            return;
        }
        let store = std::mem::take(&mut self.template);
        for record in &mut self.records {
            record.apply_template(&store);
        }
        let grid_default = self
            .records
            .iter()
            .find(|r| r.is_visible())
            .or(self.records.first())
            .map(|r| r.name().to_string())
            .unwrap_or_default();
        let grid_name = store
            .property(template::KEY_VALUE_GRID_RECORD_NAME)
            .unwrap_or(&grid_default)
            .to_string();
        self.template = store;
        let grid_visible = self.get(&grid_name).map(TrailRecord::is_visible).unwrap_or(false);
        self.set_value_grid_record_name(if grid_visible { &grid_name } else { &grid_default });

        if do_update_visibility {
            self.set_displayable();
            self.update_visible_and_displayable();
        }
    }
}
