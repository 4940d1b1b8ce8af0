use chrono::{DateTime, Utc};

/// One bar of the tabular series fed to and returned by the forecasters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameRecord {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    pub amount: f64,
}

/// Ordered sequence of bars. Order is whatever the producer emitted; nothing
/// here sorts or deduplicates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frame {
    records: Vec<FrameRecord>,
}

impl Frame {
    pub fn new(records: Vec<FrameRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[FrameRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn last(&self) -> Option<&FrameRecord> {
        self.records.last()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.close).collect()
    }

    /// The last `n` records (all of them when `n >= len`).
    pub fn tail(&self, n: usize) -> &[FrameRecord] {
        let start = self.records.len().saturating_sub(n);
        &self.records[start..]
    }
}
