//! Trail selection: computes which trail types are applicable for a channel
//! item and tracks the user's current choice.

use tracing::debug;

use crate::device::{
    ChannelConfig, MeasurementConfig, ScoreGroupConfig, SettlementConfig, StatisticsConfig,
    TrailDisplayConfig,
};
use crate::error::HistoError;
use crate::trail::types::TrailType;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SelectorKind {
    Measurement,
    Settlement,
    ScoreGroup,
}

/// Per-record trail selection state. The applicable lists are built once at
/// record construction; the selected index changes on user interaction or
/// template load.
#[derive(Debug, Clone)]
pub struct TrailSelector {
    item_name: String,
    kind: SelectorKind,
    /// Ordered trail type ordinals the user may select; mirrors the combo box.
    applicable_ordinals: Vec<usize>,
    /// Display strings parallel to the ordinals.
    applicable_texts: Vec<String>,
    selected_index: Option<usize>,
    smart_statistics: bool,
    /// Score labels for min/max resolution; empty for other kinds.
    score_labels: Vec<String>,
}

impl TrailSelector {
    /// Build the applicable trails for a measurement. Legacy triggered trails
    /// join in when the device statistics declare the matching trigger texts.
    pub fn for_measurement(
        measurement: &MeasurementConfig,
        channel: &ChannelConfig,
        smart_statistics: bool,
    ) -> Result<Self, HistoError> {
        let trail_display = measurement.base.trail_display.as_ref();
        check_default_trail(trail_display, &measurement.base.name)?;

        let mut applicable = vec![false; TrailType::primitives().len()];
        let disclose_all = trail_display.map(|d| d.disclose_all).unwrap_or(false);
        if !disclose_all {
            set_legacy_trails(&mut applicable, measurement.statistics.as_ref(), channel, smart_statistics);
            for trail in TrailType::primitives() {
                if !trail.is_triggered() && trail.is_smart_statistics() == smart_statistics {
                    applicable[trail.ordinal()] = true;
                }
            }
        }
        apply_visibility_overrides(&mut applicable, trail_display);
        apply_substitute(&mut applicable, trail_display, smart_statistics);

        let mut selector = Self {
            item_name: measurement.base.name.clone(),
            kind: SelectorKind::Measurement,
            applicable_ordinals: Vec::new(),
            applicable_texts: Vec::new(),
            selected_index: None,
            smart_statistics,
            score_labels: Vec::new(),
        };
        for (ordinal, flag) in applicable.iter().enumerate() {
            if *flag {
                let trail = TrailType::from_ordinal(ordinal);
                selector.applicable_ordinals.push(ordinal);
                selector
                    .applicable_texts
                    .push(display_text_with_trigger(trail, measurement.statistics.as_ref()));
            }
        }
        selector.append_applicable_suites(trail_display);
        debug!(item = %selector.item_name, ordinals = ?selector.applicable_ordinals, "applicable trails");
        Ok(selector)
    }

    /// Build the applicable trails for a settlement. Triggered trails are not
    /// supported; a transition amount evaluation is a configuration error.
    pub fn for_settlement(
        settlement: &SettlementConfig,
        smart_statistics: bool,
    ) -> Result<Self, HistoError> {
        let trail_display = settlement.base.trail_display.as_ref();
        check_default_trail(trail_display, &settlement.base.name)?;
        if settlement.has_transition_amount {
            return Err(HistoError::TransitionAmountUnsupported(settlement.base.name.clone()));
        }

        let mut applicable = vec![false; TrailType::primitives().len()];
        let disclose_all = trail_display.map(|d| d.disclose_all).unwrap_or(false);
        if !disclose_all {
            for trail in TrailType::primitives() {
                if !trail.is_triggered() && trail.is_smart_statistics() == smart_statistics {
                    applicable[trail.ordinal()] = true;
                }
            }
        }
        apply_visibility_overrides(&mut applicable, trail_display);
        apply_substitute(&mut applicable, trail_display, smart_statistics);

        let mut selector = Self {
            item_name: settlement.base.name.clone(),
            kind: SelectorKind::Settlement,
            applicable_ordinals: Vec::new(),
            applicable_texts: Vec::new(),
            selected_index: None,
            smart_statistics,
            score_labels: Vec::new(),
        };
        for (ordinal, flag) in applicable.iter().enumerate() {
            if *flag {
                selector.applicable_ordinals.push(ordinal);
                selector.applicable_texts.push(TrailType::from_ordinal(ordinal).display_name().to_string());
            }
        }
        selector.append_applicable_suites(trail_display);
        debug!(item = %selector.item_name, ordinals = ?selector.applicable_ordinals, "applicable trails");
        Ok(selector)
    }

    /// Build the applicable trails for a score group: one entry per declared
    /// score. Score groups never select suites.
    pub fn for_score_group(group: &ScoreGroupConfig) -> Result<Self, HistoError> {
        let mut selector = Self {
            item_name: group.base.name.clone(),
            kind: SelectorKind::ScoreGroup,
            applicable_ordinals: Vec::new(),
            applicable_texts: Vec::new(),
            selected_index: None,
            smart_statistics: false,
            score_labels: Vec::new(),
        };
        for score in &group.scores {
            selector.applicable_ordinals.push(score.trail_ordinal);
            selector.applicable_texts.push(score.text.clone());
            selector.score_labels.push(score.label.clone());
        }
        Ok(selector)
    }

    /// Suites applicable for display, appended after the primitives.
    fn append_applicable_suites(&mut self, trail_display: Option<&TrailDisplayConfig>) {
        if trail_display.map(|d| d.disclose_all).unwrap_or(false) {
            return;
        }
        let exposed = trail_display.map(|d| d.exposed.as_slice()).unwrap_or(&[]);
        let disclosed = trail_display.map(|d| d.disclosed.as_slice()).unwrap_or(&[]);
        for suite in TrailType::suites() {
            if (suite.is_smart_statistics() == self.smart_statistics || exposed.contains(suite))
                && !disclosed.contains(suite)
            {
                self.applicable_ordinals.push(suite.ordinal());
                self.applicable_texts.push(suite.display_name().to_string());
            }
        }
    }

    pub fn applicable_ordinals(&self) -> &[usize] {
        &self.applicable_ordinals
    }

    pub fn applicable_texts(&self) -> &[String] {
        &self.applicable_texts
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.selected_index
    }

    /// Set the selection to a position in the applicable list. Out-of-range
    /// positions clear the selection.
    pub fn select(&mut self, index: usize) {
        self.selected_index = if index < self.applicable_ordinals.len() { Some(index) } else { None };
    }

    /// Apply a template selection value; -1 clears the selection.
    pub fn select_template_ordinal(&mut self, template_value: i64) {
        if template_value >= 0 && (template_value as usize) < self.applicable_ordinals.len() {
            self.selected_index = Some(template_value as usize);
        } else {
            self.selected_index = None;
        }
    }

    /// Select the applicable trail with the best display sequence priority.
    pub fn set_most_applicable(&mut self) {
        if self.kind == SelectorKind::ScoreGroup {
            self.selected_index = if self.applicable_ordinals.is_empty() { None } else { Some(0) };
            return;
        }
        let mut display_sequence = u32::MAX;
        for (i, &ordinal) in self.applicable_ordinals.iter().enumerate() {
            let sequence = TrailType::from_ordinal(ordinal).display_sequence();
            if sequence < display_sequence {
                display_sequence = sequence;
                self.selected_index = Some(i);
            }
        }
    }

    /// The trail ordinal of the current selection.
    /// Panics when no selection exists; callers are guaranteed a selection by
    /// the at-least-one-applicable-trail fallback plus `set_most_applicable`.
    pub fn trail_ordinal(&self) -> usize {
        let index = self
            .selected_index
            .unwrap_or_else(|| panic!("no trail selected for {}", self.item_name));
        self.applicable_ordinals[index]
    }

    /// The trail type of the current selection; panics when unset.
    pub fn trail_type(&self) -> TrailType {
        TrailType::from_ordinal(self.trail_ordinal())
    }

    /// Display text for the current selection.
    pub fn trail_text(&self) -> &str {
        match self.selected_index {
            Some(index) => &self.applicable_texts[index],
            None => "",
        }
    }

    pub fn is_trail_suite(&self) -> bool {
        self.kind != SelectorKind::ScoreGroup && self.trail_type().is_suite()
    }

    pub fn is_box_plot_suite(&self) -> bool {
        self.kind != SelectorKind::ScoreGroup && self.trail_type().is_box_plot()
    }

    pub fn is_range_plot_suite(&self) -> bool {
        self.kind != SelectorKind::ScoreGroup && self.trail_type().is_range_plot()
    }

    /// True for selections with a number range alien to the measurement
    /// values; score selections are never alien.
    pub fn is_alien_trail(&self) -> bool {
        self.kind != SelectorKind::ScoreGroup && self.trail_type().is_alien_value()
    }

    /// Member index of the suite master for the current selection.
    pub fn suite_master_index(&self) -> usize {
        self.trail_type().suite_master_index()
    }

    /// The trail ordinals holding the extremum values for display scaling:
    /// the interquartile extremes if both are applicable, the real min/max
    /// otherwise, degenerating to the first applicable trail for both.
    pub fn extremum_ordinals(&self) -> [usize; 2] {
        if self.kind == SelectorKind::ScoreGroup {
            return self.score_extremum_ordinals();
        }
        let has = |t: TrailType| self.applicable_ordinals.contains(&t.ordinal());
        if has(TrailType::Q0) && has(TrailType::Q4) {
            [TrailType::Q0.ordinal(), TrailType::Q4.ordinal()]
        } else if has(TrailType::RealMin) && has(TrailType::RealMax) {
            [TrailType::RealMin.ordinal(), TrailType::RealMax.ordinal()]
        } else {
            let first = self.applicable_ordinals.first().copied().unwrap_or(0);
            [first, first]
        }
    }

    /// Score ordinals whose labels carry min/max markers, or the first score.
    fn score_extremum_ordinals(&self) -> [usize; 2] {
        let mut index_min = None;
        let mut index_max = None;
        for (i, label) in self.score_labels.iter().enumerate() {
            if label.contains("min") {
                index_min = Some(i);
            }
            if label.contains("max") {
                index_max = Some(i);
            }
        }
        match (index_min, index_max) {
            (Some(min), Some(max)) => {
                [self.applicable_ordinals[min], self.applicable_ordinals[max]]
            }
            _ => {
                let first = self.applicable_ordinals.first().copied().unwrap_or(0);
                [first, first]
            }
        }
    }

    /// Positions of the extremum trails in the applicable list, 0 when absent.
    pub fn extremum_indices(&self) -> [usize; 2] {
        let ordinals = self.extremum_ordinals();
        let position = |ordinal: usize| {
            self.applicable_ordinals.iter().position(|&o| o == ordinal).unwrap_or(0)
        };
        [position(ordinals[0]), position(ordinals[1])]
    }

    /// Display texts of the extremum trails.
    pub fn extremum_texts(&self) -> [String; 2] {
        let indices = self.extremum_indices();
        [
            self.applicable_texts.get(indices[0]).cloned().unwrap_or_default(),
            self.applicable_texts.get(indices[1]).cloned().unwrap_or_default(),
        ]
    }
}

impl std::fmt::Display for TrailSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "selected trail for {:>22} type='{:<11}' index={:?}",
            self.item_name,
            self.trail_text(),
            self.selected_index
        )
    }
}

/// A suite trail as the device default is an invalid device configuration.
fn check_default_trail(
    trail_display: Option<&TrailDisplayConfig>,
    item_name: &str,
) -> Result<(), HistoError> {
    if let Some(default_trail) = trail_display.and_then(|d| d.default_trail) {
        if default_trail.is_suite() {
            return Err(HistoError::SuiteDefaultTrail {
                item: item_name.to_string(),
                trail: default_trail.display_name(),
            });
        }
    }
    Ok(())
}

/// Legacy triggered trails join in when the device declares the matching
/// trigger texts; quantile mode has no triggered trails.
fn set_legacy_trails(
    applicable: &mut [bool],
    statistics: Option<&StatisticsConfig>,
    channel: &ChannelConfig,
    smart_statistics: bool,
) {
    if smart_statistics {
        return;
    }
    let Some(statistics) = statistics else { return };
    if statistics.sum_by_trigger_ref_ordinal.is_some() {
        applicable[TrailType::RealSumTriggered.ordinal()] =
            statistics.sum_trigger_text.as_ref().map(|t| t.len() > 1).unwrap_or(false);
        if statistics.ratio_text.as_ref().map(|t| t.len() > 1).unwrap_or(false) {
            if let Some(ratio_ref) = statistics.ratio_ref_ordinal {
                if let Some(referenced) = channel.measurement_statistics(ratio_ref) {
                    applicable[TrailType::RealAvgRatioTriggered.ordinal()] = referenced.is_avg;
                    applicable[TrailType::RealMaxRatioTriggered.ordinal()] = referenced.is_max;
                }
            }
        }
    }
    applicable[TrailType::RealTimeSumTriggered.ordinal()] = statistics.has_trigger
        && statistics.sum_trigger_time_text.as_ref().map(|t| t.len() > 1).unwrap_or(false);
    applicable[TrailType::RealCountTriggered.ordinal()] = statistics.count_by_trigger.is_some();
}

/// Exposed trails are forced visible, disclosed trails forced hidden.
fn apply_visibility_overrides(applicable: &mut [bool], trail_display: Option<&TrailDisplayConfig>) {
    if let Some(display) = trail_display {
        for trail in display.exposed.iter().filter(|t| !t.is_suite()) {
            applicable[trail.ordinal()] = true;
        }
        for trail in display.disclosed.iter().filter(|t| !t.is_suite()) {
            applicable[trail.ordinal()] = false;
        }
    }
}

/// Guarantee at least one applicable trail per channel item.
fn apply_substitute(
    applicable: &mut [bool],
    trail_display: Option<&TrailDisplayConfig>,
    smart_statistics: bool,
) {
    if !applicable.iter().any(|&flag| flag) {
        let fallback = trail_display
            .and_then(|d| d.default_trail)
            .unwrap_or_else(|| TrailType::substitute(smart_statistics));
        applicable[fallback.ordinal()] = true;
    }
}

/// The display text for a trail, using the trigger texts the device declares
/// for legacy triggered trails.
fn display_text_with_trigger(trail: TrailType, statistics: Option<&StatisticsConfig>) -> String {
    let configured = statistics.and_then(|s| match trail {
        TrailType::RealSumTriggered => s.sum_trigger_text.clone(),
        TrailType::RealTimeSumTriggered => s.sum_trigger_time_text.clone(),
        TrailType::RealAvgRatioTriggered | TrailType::RealMaxRatioTriggered => s.ratio_text.clone(),
        _ => None,
    });
    configured.unwrap_or_else(|| trail.display_name().to_string())
}
