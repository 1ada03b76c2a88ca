use super::task::{duration, DailyTasks, Millis, Task, IDLE_NAME};

/// One row of the chronological activity log (derived, never stored)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimelineEntry {
    pub task_name: String,
    pub start: Millis,
    pub end: Millis,
    pub is_idle: bool,
    /// Whether the owning task is over its estimate; `None` for idle rows
    pub exceeded: Option<bool>,
}

/// Build the day's timeline: one entry per interval, idle included,
/// open ends substituted with `now`. `exceeded` is computed once from
/// the task's total duration, so every entry of an over-estimate task
/// carries the flag. Sorted by start, then task name, then end.
pub fn timeline(data: &DailyTasks, date: &str, now: Millis) -> Vec<TimelineEntry> {
    let mut entries = Vec::new();

    if let Some(day) = data.get(date) {
        for task in &day.tasks {
            let exceeded = task.exceeded(now);
            for iv in &task.intervals {
                entries.push(TimelineEntry {
                    task_name: task.name.clone(),
                    start: iv.start,
                    end: iv.end.unwrap_or(now),
                    is_idle: false,
                    exceeded: Some(exceeded),
                });
            }
        }
        for iv in &day.idle {
            entries.push(TimelineEntry {
                task_name: IDLE_NAME.to_string(),
                start: iv.start,
                end: iv.end.unwrap_or(now),
                is_idle: true,
                exceeded: None,
            });
        }
    }

    entries.sort_by(|a, b| {
        a.start
            .cmp(&b.start)
            .then_with(|| a.task_name.cmp(&b.task_name))
            .then_with(|| a.end.cmp(&b.end))
    });
    entries
}

/// Total tracked time across tasks as an interval union: overlapping or
/// adjacent spans are merged before summing, so concurrent intervals
/// (possible with imported or hand-edited data) are never double-counted.
pub fn total_tracked(tasks: &[Task], now: Millis) -> Millis {
    let mut spans: Vec<(Millis, Millis)> = tasks
        .iter()
        .flat_map(|t| t.intervals.iter())
        .map(|iv| (iv.start, iv.end.unwrap_or(now)))
        .collect();
    spans.sort_by_key(|&(start, _)| start);

    let mut merged: Vec<(Millis, Millis)> = Vec::new();
    for (start, end) in spans {
        match merged.last_mut() {
            Some((_, last_end)) if start <= *last_end => {
                *last_end = (*last_end).max(end);
            }
            _ => merged.push((start, end)),
        }
    }

    merged.iter().map(|(start, end)| end - start).sum()
}

/// Total idle time for a date. A single interval list never overlaps
/// itself, so a plain sum suffices.
pub fn total_idle(data: &DailyTasks, date: &str, now: Millis) -> Millis {
    data.get(date).map_or(0, |day| duration(&day.idle, now))
}

/// Union of all task tags, first-seen order, deduplicated
pub fn all_tags(tasks: &[Task]) -> Vec<String> {
    let mut tags = Vec::new();
    for task in tasks {
        for tag in &task.tags {
            if !tags.contains(tag) {
                tags.push(tag.clone());
            }
        }
    }
    tags
}

/// Sum of durations over tasks carrying `tag`. Deliberately simpler
/// than `total_tracked`: no union merge, same-tag tasks are assumed
/// not to overlap in practice.
pub fn total_time_for_tag(tasks: &[Task], tag: &str, now: Millis) -> Millis {
    tasks
        .iter()
        .filter(|t| t.tags.iter().any(|candidate| candidate == tag))
        .map(|t| t.duration(now))
        .sum()
}

/// Tasks carrying `tag`; identity when no tag is selected
pub fn filter_by_tag<'a>(tasks: &'a [Task], tag: Option<&str>) -> Vec<&'a Task> {
    match tag {
        None => tasks.iter().collect(),
        Some(tag) => tasks
            .iter()
            .filter(|t| t.tags.iter().any(|candidate| candidate == tag))
            .collect(),
    }
}

/// Format milliseconds as MM:SS, or HH:MM:SS once hours are nonzero
pub fn format_clock(ms: Millis) -> String {
    let total_sec = ms / 1_000;
    let h = total_sec / 3_600;
    let m = (total_sec % 3_600) / 60;
    let s = total_sec % 60;
    if h > 0 {
        format!("{:02}:{:02}:{:02}", h, m, s)
    } else {
        format!("{:02}:{:02}", m, s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::task::{DayRecord, Interval};
    use pretty_assertions::assert_eq;

    fn task(name: &str, estimate: u32, intervals: Vec<Interval>, tags: &[&str]) -> Task {
        let mut t = Task::new(
            name.to_string(),
            estimate,
            tags.iter().map(|s| s.to_string()).collect(),
        );
        t.intervals = intervals;
        t
    }

    #[test]
    fn test_timeline_one_entry_per_interval_sorted() {
        let mut data = DailyTasks::new();
        let day = DayRecord {
            tasks: vec![
                task("Write", 60, vec![Interval::closed(0, 100), Interval::open(500)], &[]),
                task("Review", 60, vec![Interval::closed(200, 300)], &[]),
            ],
            idle: vec![Interval::closed(100, 200), Interval::closed(300, 500)],
        };
        data.insert("2026-08-30".to_string(), day);

        let entries = timeline(&data, "2026-08-30", 900);
        assert_eq!(entries.len(), 5);
        let starts: Vec<Millis> = entries.iter().map(|e| e.start).collect();
        assert_eq!(starts, vec![0, 100, 200, 300, 500]);
        // Open interval charged up to now
        assert_eq!(entries[4].end, 900);
    }

    #[test]
    fn test_timeline_exceeded_flag_per_task_total() {
        let mut data = DailyTasks::new();
        let day = DayRecord {
            // Two intervals of 40s each against a 1-minute estimate:
            // each alone is under, the total is over
            tasks: vec![task(
                "Write",
                1,
                vec![Interval::closed(0, 40_000), Interval::closed(50_000, 90_000)],
                &[],
            )],
            idle: vec![Interval::closed(40_000, 50_000)],
        };
        data.insert("2026-08-30".to_string(), day);

        let entries = timeline(&data, "2026-08-30", 100_000);
        assert_eq!(entries.len(), 3);
        for entry in &entries {
            if entry.is_idle {
                assert_eq!(entry.exceeded, None);
            } else {
                assert_eq!(entry.exceeded, Some(true));
            }
        }
    }

    #[test]
    fn test_timeline_tie_break_by_name() {
        let mut data = DailyTasks::new();
        let day = DayRecord {
            tasks: vec![
                task("Beta", 60, vec![Interval::closed(100, 200)], &[]),
                task("Alpha", 60, vec![Interval::closed(100, 150)], &[]),
            ],
            idle: Vec::new(),
        };
        data.insert("2026-08-30".to_string(), day);

        let entries = timeline(&data, "2026-08-30", 500);
        assert_eq!(entries[0].task_name, "Alpha");
        assert_eq!(entries[1].task_name, "Beta");
    }

    #[test]
    fn test_timeline_missing_date_is_empty() {
        let data = DailyTasks::new();
        assert!(timeline(&data, "2026-08-30", 0).is_empty());
    }

    #[test]
    fn test_total_tracked_merges_overlap() {
        let tasks = vec![
            task("A", 60, vec![Interval::closed(0, 100)], &[]),
            task("B", 60, vec![Interval::closed(50, 150)], &[]),
        ];
        assert_eq!(total_tracked(&tasks, 1_000), 150);
    }

    #[test]
    fn test_total_tracked_merges_adjacent_keeps_gaps() {
        let tasks = vec![
            task("A", 60, vec![Interval::closed(0, 100), Interval::closed(100, 200)], &[]),
            task("B", 60, vec![Interval::closed(300, 400)], &[]),
        ];
        assert_eq!(total_tracked(&tasks, 1_000), 300);
    }

    #[test]
    fn test_total_tracked_open_interval_uses_now() {
        let tasks = vec![task("A", 60, vec![Interval::open(100)], &[])];
        assert_eq!(total_tracked(&tasks, 600), 500);
    }

    #[test]
    fn test_total_idle() {
        let mut data = DailyTasks::new();
        let day = DayRecord {
            tasks: Vec::new(),
            idle: vec![Interval::closed(0, 100), Interval::open(200)],
        };
        data.insert("2026-08-30".to_string(), day);

        assert_eq!(total_idle(&data, "2026-08-30", 350), 250);
        assert_eq!(total_idle(&data, "2026-08-31", 350), 0);
    }

    #[test]
    fn test_all_tags_first_seen_order() {
        let tasks = vec![
            task("A", 60, vec![], &["work", "deep"]),
            task("B", 60, vec![], &["deep", "review"]),
        ];
        assert_eq!(all_tags(&tasks), vec!["work", "deep", "review"]);
    }

    #[test]
    fn test_total_time_for_tag_no_merge() {
        // Overlapping intervals on same-tag tasks are double-counted on
        // purpose; this aggregate is a plain sum
        let tasks = vec![
            task("A", 60, vec![Interval::closed(0, 100)], &["work"]),
            task("B", 60, vec![Interval::closed(50, 150)], &["work"]),
            task("C", 60, vec![Interval::closed(0, 999)], &["other"]),
        ];
        assert_eq!(total_time_for_tag(&tasks, "work", 1_000), 200);
    }

    #[test]
    fn test_filter_by_tag() {
        let tasks = vec![
            task("A", 60, vec![], &["work"]),
            task("B", 60, vec![], &["home"]),
        ];
        assert_eq!(filter_by_tag(&tasks, None).len(), 2);
        let filtered = filter_by_tag(&tasks, Some("home"));
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].name, "B");
    }

    #[test]
    fn test_format_clock() {
        assert_eq!(format_clock(0), "00:00");
        assert_eq!(format_clock(65_000), "01:05");
        assert_eq!(format_clock(3_600_000), "01:00:00");
        assert_eq!(format_clock(3_725_000), "01:02:05");
    }
}
