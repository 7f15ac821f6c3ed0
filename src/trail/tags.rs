//! Per-vault tag table backing the data table's metadata rows: one row per
//! vault, so a timestamp bundling linked logs yields several tag rows.
//!
//! The GPS location list is filled asynchronously by the location task and is
//! therefore shared behind a mutex; all other lists are populated
//! synchronously during collection.

use std::path::Path;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::vault::Vault;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataTag {
    LinkPath,
    FilePath,
    ChannelNumber,
    RectifiedObjectKey,
    RecordsetBaseName,
    RecordsetOrdinal,
    GpsLocation,
}

/// Tag rows offered to the data table, before pruning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DisplayTag {
    FileName,
    DirectoryName,
    BasePath,
    ChannelNumber,
    RectifiedObjectKey,
    RecordsetBaseName,
    GpsLocation,
}

pub const DISPLAY_TAGS: [DisplayTag; 7] = [
    DisplayTag::FileName,
    DisplayTag::DirectoryName,
    DisplayTag::BasePath,
    DisplayTag::ChannelNumber,
    DisplayTag::RectifiedObjectKey,
    DisplayTag::RecordsetBaseName,
    DisplayTag::GpsLocation,
];

#[derive(Debug, Default)]
pub struct TrailDataTags {
    link_paths: Vec<String>,
    file_paths: Vec<String>,
    channel_numbers: Vec<String>,
    rectified_object_keys: Vec<String>,
    recordset_base_names: Vec<String>,
    recordset_ordinals: Vec<String>,
    gps_locations: Arc<Mutex<Vec<String>>>,
}

impl TrailDataTags {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.link_paths.clear();
        self.file_paths.clear();
        self.channel_numbers.clear();
        self.rectified_object_keys.clear();
        self.recordset_base_names.clear();
        self.recordset_ordinals.clear();
        self.gps_locations.lock().clear();
    }

    pub fn add(&mut self, vault: &Vault) {
        self.link_paths.push(vault.log_link_path().to_string_lossy().into_owned());
        self.file_paths.push(vault.log_file_path().to_string_lossy().into_owned());
        self.channel_numbers.push(vault.channel_number().to_string());
        self.rectified_object_keys.push(vault.rectified_object_key().to_string());
        self.recordset_base_names.push(vault.recordset_base_name().to_string());
        self.recordset_ordinals.push(vault.recordset_ordinal().to_string());
    }

    pub fn len(&self) -> usize {
        self.file_paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.file_paths.is_empty()
    }

    /// The tag value at `index`, empty when the list is not (yet) filled.
    pub fn text(&self, index: usize, tag: DataTag) -> String {
        let list = match tag {
            DataTag::LinkPath => &self.link_paths,
            DataTag::FilePath => &self.file_paths,
            DataTag::ChannelNumber => &self.channel_numbers,
            DataTag::RectifiedObjectKey => &self.rectified_object_keys,
            DataTag::RecordsetBaseName => &self.recordset_base_names,
            DataTag::RecordsetOrdinal => &self.recordset_ordinals,
            DataTag::GpsLocation => return self.gps_locations.lock().get(index).cloned().unwrap_or_default(),
        };
        list.get(index).cloned().unwrap_or_default()
    }

    pub fn file_paths(&self) -> &[String] {
        &self.file_paths
    }

    /// Handle shared with the background GPS location task.
    pub fn gps_locations(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.gps_locations)
    }

    /// True once the asynchronous GPS tagging delivered any location.
    pub fn has_gps_locations(&self) -> bool {
        !self.gps_locations.lock().is_empty()
    }

    /// The tags worth a table row. Rows constant over all vaults (directory,
    /// base path, channel, object key) are dropped.
    pub fn active_display_tags(&self, active_channel_number: usize) -> Vec<DisplayTag> {
        let mut result: Vec<DisplayTag> = DISPLAY_TAGS.to_vec();
        if self.file_paths.is_empty() {
            return result;
        }
        if !self.has_gps_locations() {
            result.retain(|t| *t != DisplayTag::GpsLocation);
        }
        {
            let directory = Path::new(&self.file_paths[0]).parent();
            let base = directory.and_then(Path::parent);
            let mut same_directory = true;
            let mut same_base = true;
            for file_path in &self.file_paths {
                let path = Path::new(file_path);
                if path.parent() != directory {
                    same_directory = false;
                }
                if path.parent().and_then(Path::parent) != base {
                    same_base = false;
                }
                if !same_directory && !same_base {
                    break;
                }
            }
            if same_directory {
                result.retain(|t| *t != DisplayTag::DirectoryName);
            }
            if same_base {
                result.retain(|t| *t != DisplayTag::BasePath);
            }
        }
        {
            let channel = &self.channel_numbers[0];
            let same_channel = self.channel_numbers.iter().all(|tmp| {
                tmp == channel && tmp.parse::<usize>().map(|n| n == active_channel_number).unwrap_or(false)
            });
            if same_channel {
                result.retain(|t| *t != DisplayTag::ChannelNumber);
            }
        }
        {
            let object_key = &self.rectified_object_keys[0];
            if self.rectified_object_keys.iter().all(|tmp| tmp == object_key) {
                result.retain(|t| *t != DisplayTag::RectifiedObjectKey);
            }
        }
        result
    }
}
