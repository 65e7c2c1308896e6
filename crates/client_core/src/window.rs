use shared::domain::VitalRecord;

/// Maximum number of records exposed for display.
pub const WINDOW_CAPACITY: usize = 10;

/// Bounded, surname-sorted record window. Arrival recency decides which
/// records are retained; surname order decides how they are displayed. The
/// two axes are independent: on overflow the sorted sequence is truncated
/// from the front, so the alphabetically-first surplus records drop out.
#[derive(Debug, Clone, Default)]
pub struct DisplayWindow {
    records: Vec<VitalRecord>,
}

impl DisplayWindow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[VitalRecord] {
        &self.records
    }

    /// Owned copy handed to presentation consumers.
    pub fn snapshot(&self) -> Vec<VitalRecord> {
        self.records.clone()
    }

    /// Accepts one record: append, sort by surname key, keep the last
    /// [`WINDOW_CAPACITY`] elements of the sorted sequence.
    pub fn merge(&mut self, record: VitalRecord) {
        self.records.push(record);
        self.resort();
    }

    /// Swaps in re-derived copies of the current contents, e.g. after a
    /// whole-window accumulator pass. Count must be unchanged; order is
    /// re-established here.
    pub fn replace_all(&mut self, records: Vec<VitalRecord>) {
        debug_assert_eq!(records.len(), self.records.len());
        self.records = records;
        self.resort();
    }

    fn resort(&mut self) {
        self.records
            .sort_by(|a, b| a.surname_sort_key().cmp(&b.surname_sort_key()));
        if self.records.len() > WINDOW_CAPACITY {
            let excess = self.records.len() - WINDOW_CAPACITY;
            self.records.drain(..excess);
        }
    }
}
