//! Secondary storage for suite trails: one record per suite member, each
//! holding the per-recording values plus a running min/max.

/// Value sequence of one suite member. Insertion order is chronological.
#[derive(Debug, Clone)]
pub struct SuiteRecord {
    trail_ordinal: usize,
    points: Vec<Option<i32>>,
    min_value: i32,
    max_value: i32,
}

impl SuiteRecord {
    pub fn new(trail_ordinal: usize, initial_capacity: usize) -> Self {
        Self {
            trail_ordinal,
            points: Vec::with_capacity(initial_capacity),
            min_value: i32::MAX,
            max_value: i32::MIN,
        }
    }

    /// Append a point and track minimum and maximum over non-null values.
    pub fn add_element(&mut self, point: Option<i32>) {
        match point {
            None => {
                if self.points.is_empty() {
                    self.min_value = i32::MAX;
                    self.max_value = i32::MIN;
                }
            }
            Some(value) => {
                if self.is_value_empty() {
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
    }

    fn is_value_empty(&self) -> bool {
        self.min_value == i32::MAX && self.max_value == i32::MIN
    }

    pub fn trail_ordinal(&self) -> usize {
        self.trail_ordinal
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<i32> {
        self.points.get(index).copied().flatten()
    }

    pub fn points(&self) -> &[Option<i32>] {
        &self.points
    }

    /// Minimum over the non-null values; `i32::MAX` while undefined.
    pub fn min_record_value(&self) -> i32 {
        self.min_value
    }

    /// Maximum over the non-null values; `i32::MIN` while undefined.
    pub fn max_record_value(&self) -> i32 {
        self.max_value
    }
}

/// The suite member records addressed by member index.
#[derive(Debug, Clone, Default)]
pub struct SuiteRecords {
    members: Vec<SuiteRecord>,
}

impl SuiteRecords {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.members.clear();
    }

    pub fn push(&mut self, record: SuiteRecord) {
        self.members.push(record);
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn get(&self, member_index: usize) -> Option<&SuiteRecord> {
        self.members.get(member_index)
    }

    pub fn get_mut(&mut self, member_index: usize) -> Option<&mut SuiteRecord> {
        self.members.get_mut(member_index)
    }

    /// The per-member point count; members are kept at equal length except
    /// transiently during population.
    pub fn real_size(&self) -> usize {
        self.members.first().map_or(0, SuiteRecord::len)
    }

    pub fn suite_value(&self, member_index: usize, index: usize) -> Option<i32> {
        self.members.get(member_index).and_then(|m| m.get(index))
    }

    /// Minimum over all members' non-null values; `i32::MAX` while undefined.
    pub fn suite_min_value(&self) -> i32 {
        self.members.iter().map(SuiteRecord::min_record_value).min().unwrap_or(i32::MAX)
    }

    /// Maximum over all members' non-null values; `i32::MIN` while undefined.
    pub fn suite_max_value(&self) -> i32 {
        self.members.iter().map(SuiteRecord::max_record_value).max().unwrap_or(i32::MIN)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn min_max_ignores_nulls() {
        let mut record = SuiteRecord::new(0, 4);
        record.add_element(Some(100));
        record.add_element(None);
        record.add_element(Some(300));
        record.add_element(Some(50));
        assert_eq!(record.len(), 4);
        assert_eq!(record.min_record_value(), 50);
        assert_eq!(record.max_record_value(), 300);
    }

    #[test]
    fn all_null_sequence_keeps_undefined_sentinels() {
        let mut record = SuiteRecord::new(0, 2);
        record.add_element(None);
        record.add_element(None);
        assert_eq!(record.min_record_value(), i32::MAX);
        assert_eq!(record.max_record_value(), i32::MIN);
    }
}
