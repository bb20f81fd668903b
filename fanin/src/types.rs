//! Core data types flowing through the pipeline.

use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};

/// Unique identifier of a pipeline run.
pub type PipelineId = u64;

/// Identifier of a work item, unique within a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaskId(pub u64);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a worker within the pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WorkerId(pub u64);

impl fmt::Display for WorkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single unit of work.
///
/// [`WorkItem`] is immutable after creation, which keeps it safe to hand between
/// the queue and whichever worker dequeues it without extra synchronization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkItem {
    /// Identifier of the item, unique within a run.
    pub id: TaskId,
    /// Opaque payload carried through to the result record.
    pub payload: String,
}

impl WorkItem {
    /// Creates a new work item.
    pub fn new(id: TaskId, payload: impl Into<String>) -> Self {
        Self {
            id,
            payload: payload.into(),
        }
    }
}

/// The record produced after a work item has been processed.
///
/// Produced exactly once per item that was successfully dequeued and processed.
/// [`fmt::Display`] renders the exact persisted line (without the trailing
/// newline), so the on-disk format lives in one place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultRecord {
    /// Point in time at which processing completed.
    pub completed_at: DateTime<Utc>,
    /// Worker that produced the record.
    pub worker_id: WorkerId,
    /// Echoes the processed item's id.
    pub task_id: TaskId,
    /// Echoes the processed item's payload.
    pub payload: String,
}

impl ResultRecord {
    /// Creates a record for `item` completed by `worker_id` now.
    pub fn completed_now(worker_id: WorkerId, item: WorkItem) -> Self {
        Self {
            completed_at: Utc::now(),
            worker_id,
            task_id: item.id,
            payload: item.payload,
        }
    }
}

impl fmt::Display for ResultRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] Worker-{} processed Task-{} payload='{}'",
            self.completed_at
                .to_rfc3339_opts(SecondsFormat::Nanos, true),
            self.worker_id,
            self.task_id,
            self.payload
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn result_record_renders_a_single_well_formed_line() {
        let record = ResultRecord {
            completed_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 45).unwrap(),
            worker_id: WorkerId(3),
            task_id: TaskId(17),
            payload: "data-17".to_string(),
        };

        assert_eq!(
            record.to_string(),
            "[2024-05-01T12:30:45.000000000Z] Worker-3 processed Task-17 payload='data-17'"
        );
        assert!(!record.to_string().contains('\n'));
    }
}
