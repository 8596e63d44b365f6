//! Immutable progress records produced once per evaluation cycle.

use serde::{Deserialize, Serialize};

/// Lifecycle phase of a monitoring run.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Evaluations continue.
    Running,
    /// Every producer delivered all of its artifacts.
    Completed,
    /// The cycle budget ran out with at least one artifact missing.
    TimedOut,
}

/// Completion state of a single producer at one point in time.
///
/// Always replaced wholesale on each evaluation, never partially updated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProducerProgress {
    /// Producer name (registry key).
    pub producer: String,
    /// How many expected artifacts are present.
    pub completed: u32,
    /// How many artifacts are expected in total. Fixed for the run.
    pub total: u32,
    /// `round(100 * completed / total)`, half rounded up.
    pub percentage: u8,
}

impl ProducerProgress {
    /// Builds a progress record, computing the rounded percentage.
    pub fn new(producer: impl Into<String>, completed: u32, total: u32) -> Self {
        Self {
            producer: producer.into(),
            completed,
            total,
            percentage: percent(completed, total),
        }
    }

    /// True when every expected artifact is present.
    pub fn is_complete(&self) -> bool {
        self.completed == self.total
    }
}

/// One self-consistent progress record. The status store holds at most one
/// current snapshot; each cycle's snapshot supersedes the previous one.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Snapshot {
    /// Evaluation time, unix epoch milliseconds.
    pub timestamp_ms: i64,
    /// Per-producer progress, in registry order.
    pub per_producer: Vec<ProducerProgress>,
    /// Rounded unweighted mean of per-producer percentages.
    pub overall_percentage: u8,
    /// Evaluations performed so far, counting from 1.
    pub cycles_elapsed: u32,
    /// Lifecycle phase.
    pub phase: Phase,
}

/// Unweighted mean of per-producer percentages, half rounded up.
///
/// Deliberately NOT weighted by artifact count: a producer expecting two
/// files counts the same as one expecting fifty, so a single large
/// producer cannot dominate the aggregate. An empty slice is vacuously
/// complete and reported as 100.
pub fn overall_percentage(per_producer: &[ProducerProgress]) -> u8 {
    if per_producer.is_empty() {
        return 100;
    }
    let sum: u64 = per_producer.iter().map(|p| p.percentage as u64).sum();
    let n = per_producer.len() as u64;
    ((2 * sum + n) / (2 * n)) as u8
}

/// Integer round-half-up of `100 * completed / total`.
fn percent(completed: u32, total: u32) -> u8 {
    if total == 0 {
        return 100;
    }
    let c = completed.min(total) as u64;
    let t = total as u64;
    ((200 * c + t) / (2 * t)) as u8
}
