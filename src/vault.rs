//! Vault input records.
//!
//! A vault holds the pre-aggregated statistics of one logged session: per
//! channel item and trail type one optional fixed-point value (×1000), plus
//! the session metadata. Vaults are immutable once built; the engine never
//! writes them.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

/// Read-only per-session statistics record supplied by the data source layer.
#[derive(Debug, Clone)]
pub struct Vault {
    device_name: String,
    channel_number: usize,
    log_file_path: PathBuf,
    log_link_path: PathBuf,
    rectified_object_key: String,
    recordset_base_name: String,
    recordset_ordinal: usize,
    start_timestamp_ms: i64,
    /// Recording duration in minutes, carried as a score.
    duration_mm: i32,
    measurements: HashMap<(usize, usize), i32>,
    settlements: HashMap<(usize, usize), i32>,
    scores: HashMap<usize, i32>,
}

impl Vault {
    pub fn new(
        device_name: &str,
        channel_number: usize,
        start_timestamp_ms: i64,
        log_file_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            device_name: device_name.to_string(),
            channel_number,
            log_file_path: log_file_path.into(),
            log_link_path: PathBuf::new(),
            rectified_object_key: String::new(),
            recordset_base_name: String::new(),
            recordset_ordinal: 0,
            start_timestamp_ms,
            duration_mm: 0,
            measurements: HashMap::new(),
            settlements: HashMap::new(),
            scores: HashMap::new(),
        }
    }

    pub fn with_link_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.log_link_path = path.into();
        self
    }

    pub fn with_object_key(mut self, key: &str) -> Self {
        self.rectified_object_key = key.to_string();
        self
    }

    pub fn with_recordset_base_name(mut self, name: &str) -> Self {
        self.recordset_base_name = name.to_string();
        self
    }

    pub fn with_recordset_ordinal(mut self, ordinal: usize) -> Self {
        self.recordset_ordinal = ordinal;
        self
    }

    pub fn with_duration_mm(mut self, duration_mm: i32) -> Self {
        self.duration_mm = duration_mm;
        self
    }

    pub fn with_measurement_point(mut self, ordinal: usize, trail_ordinal: usize, point: i32) -> Self {
        self.measurements.insert((ordinal, trail_ordinal), point);
        self
    }

    pub fn with_settlement_point(mut self, settlement_id: usize, trail_ordinal: usize, point: i32) -> Self {
        self.settlements.insert((settlement_id, trail_ordinal), point);
        self
    }

    pub fn with_score_point(mut self, score_ordinal: usize, point: i32) -> Self {
        self.scores.insert(score_ordinal, point);
        self
    }

    /// The fixed-point value for a measurement item and trail, if recorded.
    pub fn measurement_point(&self, ordinal: usize, trail_ordinal: usize) -> Option<i32> {
        self.measurements.get(&(ordinal, trail_ordinal)).copied()
    }

    /// The fixed-point value for a settlement and trail, if recorded.
    pub fn settlement_point(&self, settlement_id: usize, trail_ordinal: usize) -> Option<i32> {
        self.settlements.get(&(settlement_id, trail_ordinal)).copied()
    }

    /// The fixed-point value for a score entry, if recorded.
    pub fn score_point(&self, score_ordinal: usize) -> Option<i32> {
        self.scores.get(&score_ordinal).copied()
    }

    pub fn device_name(&self) -> &str {
        &self.device_name
    }

    pub fn channel_number(&self) -> usize {
        self.channel_number
    }

    pub fn log_file_path(&self) -> &Path {
        &self.log_file_path
    }

    pub fn log_link_path(&self) -> &Path {
        &self.log_link_path
    }

    pub fn rectified_object_key(&self) -> &str {
        &self.rectified_object_key
    }

    pub fn recordset_base_name(&self) -> &str {
        &self.recordset_base_name
    }

    pub fn recordset_ordinal(&self) -> usize {
        self.recordset_ordinal
    }

    pub fn start_timestamp_ms(&self) -> i64 {
        self.start_timestamp_ms
    }

    pub fn duration_mm(&self) -> i32 {
        self.duration_mm
    }
}

/// Chronologically keyed multimap of vaults. One timestamp may bundle several
/// vaults originating from linked multi-outlet logs. Iteration is newest
/// first, matching the display order of the history views.
#[derive(Debug, Clone, Default)]
pub struct VaultMap {
    buckets: BTreeMap<i64, Vec<Vault>>,
}

impl VaultMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, vault: Vault) {
        self.buckets.entry(vault.start_timestamp_ms()).or_default().push(vault);
    }

    /// Number of distinct timestamps.
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Number of vaults over all buckets.
    pub fn vault_count(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Buckets ordered newest first.
    pub fn buckets_newest_first(&self) -> impl Iterator<Item = (i64, &[Vault])> {
        self.buckets.iter().rev().map(|(ts, vaults)| (*ts, vaults.as_slice()))
    }

    /// All vaults ordered newest first, bucket members in insertion order.
    pub fn vaults_newest_first(&self) -> impl Iterator<Item = &Vault> {
        self.buckets.values().rev().flatten()
    }
}

impl FromIterator<Vault> for VaultMap {
    fn from_iter<T: IntoIterator<Item = Vault>>(iter: T) -> Self {
        let mut map = VaultMap::new();
        for vault in iter {
            map.add(vault);
        }
        map
    }
}
