//! Aggregated profiling data and end-of-window snapshots

use chrono::{DateTime, Utc};
use indexmap::IndexMap;

/// Bytes in one mebibyte
const BYTES_PER_MIB: f64 = 1024.0 * 1024.0;

/// Count and cumulative time for one instruction kind
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct InstructionStats {
    /// Number of executions recorded
    count: u64,

    /// Sum of recorded durations (seconds)
    total_secs: f64,
}

impl InstructionStats {
    /// Get the execution count
    #[must_use]
    pub const fn count(&self) -> u64 {
        self.count
    }

    /// Get the cumulative time in seconds
    #[must_use]
    pub const fn total_secs(&self) -> f64 {
        self.total_secs
    }

    /// Mean time per execution, or zero when nothing was recorded
    #[must_use]
    #[allow(clippy::cast_precision_loss)] // Counts beyond 2^53 are not realistic
    pub fn average_secs(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.total_secs / self.count as f64
        }
    }

    fn record(&mut self, duration_secs: f64) {
        self.count = self.count.saturating_add(1);
        self.total_secs += duration_secs;
    }
}

/// Peak and mean of the recorded memory samples
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MemoryStats {
    peak_bytes: u64,
    mean_bytes: f64,
}

impl MemoryStats {
    /// Compute statistics over `samples`; `None` when there are none
    #[must_use]
    #[allow(clippy::cast_precision_loss)] // Display-only figures
    pub fn from_samples(samples: &[u64]) -> Option<Self> {
        let peak_bytes = samples.iter().copied().max()?;
        let total: u128 = samples.iter().map(|&bytes| u128::from(bytes)).sum();

        Some(Self {
            peak_bytes,
            mean_bytes: total as f64 / samples.len() as f64,
        })
    }

    /// Get the largest sample in bytes
    #[must_use]
    pub const fn peak_bytes(&self) -> u64 {
        self.peak_bytes
    }

    /// Get the mean sample in bytes
    #[must_use]
    pub const fn mean_bytes(&self) -> f64 {
        self.mean_bytes
    }

    /// Get the largest sample in mebibytes
    #[must_use]
    #[allow(clippy::cast_precision_loss)] // Display-only figure
    pub fn peak_mib(&self) -> f64 {
        self.peak_bytes as f64 / BYTES_PER_MIB
    }

    /// Get the mean sample in mebibytes
    #[must_use]
    pub fn mean_mib(&self) -> f64 {
        self.mean_bytes / BYTES_PER_MIB
    }
}

/// The aggregates owned by a profiling session.
///
/// Instruction kinds and variable names keep first-seen order, which is the
/// order the report lists them in.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProfileData {
    instructions: IndexMap<String, InstructionStats>,
    variable_accesses: IndexMap<String, u64>,
    memory_usage: Vec<u64>,
}

impl ProfileData {
    /// Create empty aggregates
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn clear(&mut self) {
        self.instructions.clear();
        self.variable_accesses.clear();
        self.memory_usage.clear();
    }

    pub(crate) fn record_instruction(&mut self, kind: &str, duration_secs: f64) {
        match self.instructions.get_mut(kind) {
            Some(stats) => stats.record(duration_secs),
            None => {
                let mut stats = InstructionStats::default();
                stats.record(duration_secs);
                self.instructions.insert(kind.to_string(), stats);
            }
        }
    }

    pub(crate) fn record_variable_access(&mut self, name: &str) {
        match self.variable_accesses.get_mut(name) {
            Some(count) => *count = count.saturating_add(1),
            None => {
                self.variable_accesses.insert(name.to_string(), 1);
            }
        }
    }

    pub(crate) fn record_memory(&mut self, bytes: u64) {
        self.memory_usage.push(bytes);
    }

    /// Iterate instruction kinds with their statistics in first-seen order
    pub fn instructions(&self) -> impl Iterator<Item = (&str, &InstructionStats)> {
        self.instructions
            .iter()
            .map(|(kind, stats)| (kind.as_str(), stats))
    }

    /// Statistics for one instruction kind
    #[must_use]
    pub fn instruction(&self, kind: &str) -> Option<&InstructionStats> {
        self.instructions.get(kind)
    }

    /// Execution count per instruction kind
    #[must_use]
    pub fn instruction_counts(&self) -> IndexMap<String, u64> {
        self.instructions
            .iter()
            .map(|(kind, stats)| (kind.clone(), stats.count()))
            .collect()
    }

    /// Cumulative seconds per instruction kind
    #[must_use]
    pub fn instruction_times(&self) -> IndexMap<String, f64> {
        self.instructions
            .iter()
            .map(|(kind, stats)| (kind.clone(), stats.total_secs()))
            .collect()
    }

    /// Access count per variable name
    #[must_use]
    pub const fn variable_accesses(&self) -> &IndexMap<String, u64> {
        &self.variable_accesses
    }

    /// Access count for one variable, zero if never accessed
    #[must_use]
    pub fn variable_access_count(&self, name: &str) -> u64 {
        self.variable_accesses.get(name).copied().unwrap_or(0)
    }

    /// Memory samples in bytes, oldest first
    #[must_use]
    pub fn memory_usage(&self) -> &[u64] {
        &self.memory_usage
    }

    /// Peak and mean memory, if any samples were taken
    #[must_use]
    pub fn memory_stats(&self) -> Option<MemoryStats> {
        MemoryStats::from_samples(&self.memory_usage)
    }

    /// True when nothing has been recorded
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
            && self.variable_accesses.is_empty()
            && self.memory_usage.is_empty()
    }
}

/// Immutable copy of a session's aggregates at the end of a window
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileSnapshot {
    /// Wall time between start and end of the window (seconds)
    total_time_secs: f64,

    /// When the window was started
    started_at: DateTime<Utc>,

    data: ProfileData,
}

impl ProfileSnapshot {
    pub(crate) const fn new(
        total_time_secs: f64,
        started_at: DateTime<Utc>,
        data: ProfileData,
    ) -> Self {
        Self {
            total_time_secs,
            started_at,
            data,
        }
    }

    /// Get the elapsed window time in seconds
    #[must_use]
    pub const fn total_time_secs(&self) -> f64 {
        self.total_time_secs
    }

    /// Get the window start timestamp
    #[must_use]
    pub const fn started_at(&self) -> &DateTime<Utc> {
        &self.started_at
    }

    /// Get the captured aggregates
    #[must_use]
    pub const fn data(&self) -> &ProfileData {
        &self.data
    }

    /// Execution count per instruction kind
    #[must_use]
    pub fn instruction_counts(&self) -> IndexMap<String, u64> {
        self.data.instruction_counts()
    }

    /// Cumulative seconds per instruction kind
    #[must_use]
    pub fn instruction_times(&self) -> IndexMap<String, f64> {
        self.data.instruction_times()
    }

    /// Access count per variable name
    #[must_use]
    pub const fn variable_accesses(&self) -> &IndexMap<String, u64> {
        self.data.variable_accesses()
    }

    /// Memory samples in bytes, oldest first
    #[must_use]
    pub fn memory_usage(&self) -> &[u64] {
        self.data.memory_usage()
    }

    /// Consume the snapshot, keeping only the aggregates
    #[must_use]
    pub fn into_data(self) -> ProfileData {
        self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_instruction_accumulates() {
        let mut data = ProfileData::new();
        data.record_instruction("ADD", 0.1);
        data.record_instruction("ADD", 0.3);

        let stats = data.instruction("ADD").copied().unwrap_or_default();
        assert_eq!(stats.count(), 2);
        assert!((stats.total_secs() - 0.4).abs() < 1e-12);
        assert!((stats.average_secs() - 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_average_of_empty_stats_is_zero() {
        assert!(InstructionStats::default().average_secs().abs() < f64::EPSILON);
    }

    #[test]
    fn test_counts_and_times_share_keys_in_first_seen_order() {
        let mut data = ProfileData::new();
        data.record_instruction("MUL", 0.5);
        data.record_instruction("ADD", 0.1);
        data.record_instruction("MUL", 0.5);

        let counts: Vec<_> = data.instruction_counts().into_iter().collect();
        assert_eq!(counts, vec![("MUL".to_string(), 2), ("ADD".to_string(), 1)]);

        let time_keys: Vec<_> = data.instruction_times().into_keys().collect();
        assert_eq!(time_keys, vec!["MUL".to_string(), "ADD".to_string()]);
    }

    #[test]
    fn test_variable_accesses() {
        let mut data = ProfileData::new();
        data.record_variable_access(":x");
        data.record_variable_access(":y");
        data.record_variable_access(":x");

        assert_eq!(data.variable_access_count(":x"), 2);
        assert_eq!(data.variable_access_count(":y"), 1);
        assert_eq!(data.variable_access_count(":z"), 0);
        let names: Vec<_> = data.variable_accesses().keys().cloned().collect();
        assert_eq!(names, vec![":x".to_string(), ":y".to_string()]);
    }

    #[test]
    fn test_memory_stats() {
        assert_eq!(MemoryStats::from_samples(&[]), None);

        let stats = MemoryStats::from_samples(&[1_048_576, 3_145_728]);
        assert_eq!(stats.map(|s| s.peak_bytes()), Some(3_145_728));
        assert!(stats.is_some_and(|s| (s.peak_mib() - 3.0).abs() < 1e-12));
        assert!(stats.is_some_and(|s| (s.mean_mib() - 2.0).abs() < 1e-12));
    }

    #[test]
    fn test_memory_stats_do_not_overflow() {
        let stats = MemoryStats::from_samples(&[u64::MAX, u64::MAX]);
        assert_eq!(stats.map(|s| s.peak_bytes()), Some(u64::MAX));
    }

    #[test]
    fn test_clear_empties_everything() {
        let mut data = ProfileData::new();
        data.record_instruction("ADD", 0.1);
        data.record_variable_access(":x");
        data.record_memory(4096);
        assert!(!data.is_empty());

        data.clear();
        assert!(data.is_empty());
        assert_eq!(data, ProfileData::default());
    }

    #[test]
    fn test_snapshot_accessors() {
        let mut data = ProfileData::new();
        data.record_instruction("JMP", 0.25);
        data.record_memory(2048);
        let started_at = Utc::now();

        let snapshot = ProfileSnapshot::new(1.5, started_at, data.clone());
        assert!((snapshot.total_time_secs() - 1.5).abs() < f64::EPSILON);
        assert_eq!(snapshot.started_at(), &started_at);
        assert_eq!(snapshot.instruction_counts().get("JMP"), Some(&1));
        assert_eq!(snapshot.memory_usage(), &[2048]);
        assert_eq!(snapshot.into_data(), data);
    }
}
