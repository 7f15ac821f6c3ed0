//! Scale synchronization for measurements, settlements and scores: groups of
//! scale-linked records share one min/max so visually comparable channels use
//! one scale.

use std::collections::BTreeMap;

use tracing::{debug, trace};

use crate::trail::record_set::TrailRecordSet;

/// Summary scale state of one record, synchronized separately from the
/// graphics scale.
#[derive(Debug, Clone, Copy, Default)]
pub struct SummaryScale {
    sync_min: Option<f64>,
    sync_max: Option<f64>,
}

impl SummaryScale {
    pub fn new(sync_min: f64, sync_max: f64) -> Self {
        Self { sync_min: Some(sync_min), sync_max: Some(sync_max) }
    }

    pub fn is_defined(&self) -> bool {
        self.sync_min.is_some() && self.sync_max.is_some()
    }

    pub fn reset(&mut self) {
        self.sync_min = None;
        self.sync_max = None;
    }

    pub fn set(&mut self, sync_min: f64, sync_max: f64) {
        self.sync_min = Some(sync_min);
        self.sync_max = Some(sync_max);
    }

    pub fn sync_min(&self) -> Option<f64> {
        self.sync_min
    }

    pub fn sync_max(&self) -> Option<f64> {
        self.sync_max
    }
}

/// Rebuild the sync groups from the device-declared scale sync reference
/// ordinals. Members sort by ordinal distance from the master, nearer ones
/// inserted earlier; the master leads its group.
pub fn sync_scales(set: &mut TrailRecordSet) {
    let mut groups: BTreeMap<usize, Vec<usize>> = BTreeMap::new();

    let memberships: Vec<(usize, usize)> = set
        .records()
        .iter()
        .filter_map(|record| {
            record.scale_sync_ref_ordinal().map(|master| (record.ordinal(), master))
        })
        .collect();
    for (ordinal, master_ordinal) in memberships {
        if set.get_by_ordinal(master_ordinal).is_none() {
            continue;
        }
        let group = groups.entry(master_ordinal).or_insert_with(|| {
            if let Some(master) = set.get_by_ordinal_mut(master_ordinal) {
                master.set_sync_min_max(i32::MAX, i32::MIN);
            }
            vec![master_ordinal]
        });
        if !group.contains(&ordinal) {
            let distance = ordinal.abs_diff(master_ordinal);
            if distance >= group.len() {
                group.push(ordinal);
            } else {
                // nearer members insert ahead of farther ones
                group.insert(distance, ordinal);
            }
        }
    }

    *set.scale_synced_records_mut() = groups;
    debug!(groups = ?set.scale_synced_records(), "synced scales");
}

/// Refresh every visible record's own sync min/max (suite extremes for suite
/// trails), then propagate the group-wide pair.
pub fn update_all_sync_scales(set: &mut TrailRecordSet) {
    let updates: Vec<(usize, i32, i32)> = set
        .records()
        .iter()
        .filter(|record| record.is_visible() && record.is_displayable())
        .map(|record| {
            let factor = sync_master_factor(set, record.ordinal());
            let (min, max) = if !record.selector().is_trail_suite() {
                (record.min_value(), record.max_value())
            } else {
                (record.suite_min_value(), record.suite_max_value())
            };
            (record.ordinal(), (min as f64 * factor) as i32, (max as f64 * factor) as i32)
        })
        .collect();
    for (ordinal, sync_min, sync_max) in updates {
        if let Some(record) = set.get_by_ordinal_mut(ordinal) {
            record.set_sync_min_max(sync_min, sync_max);
            trace!(ordinal, sync_min, sync_max, "record sync scale");
        }
    }

    update_sync_record_scale(set);
}

/// The factor aligning a synced record's values with its master's unit.
fn sync_master_factor(set: &TrailRecordSet, record_ordinal: usize) -> f64 {
    let Some(record) = set.get_by_ordinal(record_ordinal) else { return 1. };
    match record.scale_sync_ref_ordinal().and_then(|m| set.get_by_ordinal(m)) {
        Some(master) if master.factor() != 0. => record.factor() / master.factor(),
        _ => 1.,
    }
}

/// For each sync group compute the min/max over the visible and displayable
/// members and broadcast the pair to all members, including currently hidden
/// ones so they are ready if shown later. A group with no visible member is
/// left untouched.
pub fn update_sync_record_scale(set: &mut TrailRecordSet) {
    let groups: Vec<(usize, Vec<usize>)> = set
        .scale_synced_records()
        .iter()
        .map(|(master, members)| (*master, members.clone()))
        .collect();

    for (master_ordinal, members) in groups {
        let mut tmp_min = i32::MAX;
        let mut tmp_max = i32::MIN;
        let mut is_affected = false;
        for &ordinal in &members {
            let Some(record) = set.get_by_ordinal(ordinal) else { continue };
            if record.is_visible() && record.is_displayable() {
                is_affected = true;
                tmp_min = tmp_min.min(record.sync_min());
                tmp_max = tmp_max.max(record.sync_max());
                trace!(ordinal, tmp_min, tmp_max, "group scan");
            }
        }
        if !is_affected {
            continue;
        }
        for &ordinal in &members {
            if let Some(record) = set.get_by_ordinal_mut(ordinal) {
                record.set_sync_min_max(tmp_min, tmp_max);
            }
        }
        debug!(master_ordinal, tmp_min, tmp_max, "group sync scale");
    }
}

/// Build the per-record summary scales for the display records. Records not
/// in the display set get an explicit undefined scale, so a later group
/// propagation starts from reset values.
pub fn define_summary_scales(set: &TrailRecordSet) -> BTreeMap<usize, SummaryScale> {
    let vaults = set.picked_vaults().all_vaults();
    let mut scales = BTreeMap::new();
    for record in set.records() {
        let mut scale = SummaryScale::default();
        if set.display_records().contains(&set.index_of_ordinal(record.ordinal()).unwrap_or(usize::MAX)) {
            let extrema = record.define_extrema(&vaults, set.settings());
            scale.set(extrema[0], extrema[1]);
        }
        scales.insert(record.ordinal(), scale);
    }
    scales
}

/// Update the summary min/max values for synced records. Records with alien
/// value trails are excluded from synchronizing; a group with no defined
/// member resets all members' summary scales to undefined.
pub fn update_sync_summary(set: &TrailRecordSet, scales: &mut BTreeMap<usize, SummaryScale>) {
    for (_, members) in set.scale_synced_records().iter() {
        let mut tmp_min = f64::MAX;
        let mut tmp_max = -f64::MAX;
        let mut is_affected = false;
        for &ordinal in members {
            let Some(record) = set.get_by_ordinal(ordinal) else { continue };
            // alien value ranges never share a summary scale
            if record.selector().is_alien_trail() {
                continue;
            }
            if let Some(scale) = scales.get(&ordinal) {
                if let (Some(min), Some(max)) = (scale.sync_min(), scale.sync_max()) {
                    is_affected = true;
                    tmp_min = tmp_min.min(min);
                    tmp_max = tmp_max.max(max);
                }
            }
        }

        for &ordinal in members {
            let Some(record) = set.get_by_ordinal(ordinal) else { continue };
            if record.selector().is_alien_trail() {
                continue;
            }
            let scale = scales.entry(ordinal).or_default();
            if is_affected {
                scale.set(tmp_min, tmp_max);
            } else {
                scale.reset();
            }
        }
    }
}
