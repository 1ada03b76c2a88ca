use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Timestamp in epoch milliseconds
pub type Millis = i64;

/// Display name for idle time in timelines and reports
pub const IDLE_NAME: &str = "Idle";

/// A contiguous span of active time. `end == None` means the interval
/// is still open (running).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interval {
    pub start: Millis,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<Millis>,
}

impl Interval {
    pub fn open(start: Millis) -> Self {
        Self { start, end: None }
    }

    pub fn closed(start: Millis, end: Millis) -> Self {
        Self { start, end: Some(end) }
    }

    pub fn is_open(&self) -> bool {
        self.end.is_none()
    }

    /// Length of this interval, charging an open end up to `now`
    pub fn length(&self, now: Millis) -> Millis {
        self.end.unwrap_or(now) - self.start
    }
}

/// Sum the lengths of a set of intervals, open ends charged up to `now`
pub fn duration(intervals: &[Interval], now: Millis) -> Millis {
    intervals.iter().map(|iv| iv.length(now)).sum()
}

/// A tracked task for one day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Unique ID, immutable after creation
    pub id: String,
    /// Task name shown in lists and timelines
    pub name: String,
    /// Work intervals, chronological by start
    #[serde(default)]
    pub intervals: Vec<Interval>,
    /// Estimated time to completion, in minutes
    pub estimated_minutes: u32,
    /// Tags for categorization and filtering
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Task {
    pub fn new(name: String, estimated_minutes: u32, tags: Vec<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name,
            intervals: Vec::new(),
            estimated_minutes,
            tags,
        }
    }

    /// A task is active iff its most recent interval exists and is open
    pub fn is_active(&self) -> bool {
        self.intervals.last().is_some_and(Interval::is_open)
    }

    /// Total time accumulated across all intervals
    pub fn duration(&self, now: Millis) -> Millis {
        duration(&self.intervals, now)
    }

    /// Whether accumulated time has surpassed the estimate
    pub fn exceeded(&self, now: Millis) -> bool {
        self.duration(now) as f64 / 60_000.0 > self.estimated_minutes as f64
    }
}

/// One day's record: the user's tasks plus the idle intervals that
/// accumulate whenever no task is running. Idle lives in its own field
/// rather than as a reserved task in the list, so user-facing task
/// views never have to filter it out.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DayRecord {
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub idle: Vec<Interval>,
}

impl DayRecord {
    pub fn task(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Whether the idle clock is currently running
    pub fn idle_active(&self) -> bool {
        self.idle.last().is_some_and(Interval::is_open)
    }

    /// Whether any real task is currently running
    pub fn any_task_active(&self) -> bool {
        self.tasks.iter().any(Task::is_active)
    }
}

/// The full multi-day record, keyed by date string (YYYY-MM-DD)
pub type DailyTasks = BTreeMap<String, DayRecord>;
