use std::collections::VecDeque;

use frenzy_core::history::{GameRecord, HistoryStore, PlayerStats};

/// Default maximum number of game records kept before oldest are evicted.
pub const DEFAULT_MAX_RECORDS: usize = 50;

/// In-memory, bounded history store, newest record first.
///
/// Stands in for whatever persistence the host application injects
/// (browser storage, a file, a database); the engine only sees the
/// `HistoryStore` trait.
pub struct MemoryHistory {
    records: VecDeque<GameRecord>,
    stats: PlayerStats,
    max_records: usize,
}

impl Default for MemoryHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryHistory {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_MAX_RECORDS)
    }

    pub fn with_capacity(max_records: usize) -> Self {
        Self {
            records: VecDeque::new(),
            stats: PlayerStats::default(),
            max_records,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl HistoryStore for MemoryHistory {
    fn append(&mut self, record: GameRecord) {
        self.records.push_front(record);
        while self.records.len() > self.max_records {
            self.records.pop_back();
        }
    }

    fn recent(&self, limit: usize) -> Vec<GameRecord> {
        self.records.iter().take(limit).cloned().collect()
    }

    fn read_stats(&self) -> PlayerStats {
        self.stats.clone()
    }

    fn write_stats(&mut self, stats: PlayerStats) {
        self.stats = stats;
    }
}
