use crate::domain::{all_tags, timeline, total_idle, total_time_for_tag, total_tracked, DailyTasks, Millis};
use crate::persistence::{atomic_write, report_file};
use anyhow::Result;
use chrono::{Local, NaiveDate, TimeZone};
use std::path::{Path, PathBuf};

/// Format a millisecond duration as "Xh Ym" or "Xm" for display
fn format_duration(ms: Millis) -> String {
    let total_mins = ms / 60_000;
    if total_mins < 60 {
        format!("{}m", total_mins)
    } else {
        let hours = total_mins / 60;
        let mins = total_mins % 60;
        if mins == 0 {
            format!("{}h", hours)
        } else {
            format!("{}h {}m", hours, mins)
        }
    }
}

/// Format an epoch-millisecond timestamp as a local wall-clock time
fn format_time(ms: Millis) -> String {
    match Local.timestamp_millis_opt(ms).single() {
        Some(t) => t.format("%H:%M:%S").to_string(),
        None => "??:??:??".to_string(),
    }
}

/// Render the markdown report for one day
pub fn render_report(data: &DailyTasks, date: NaiveDate, now: Millis) -> String {
    let key = date.format("%Y-%m-%d").to_string();
    let tasks = data.get(&key).map(|day| day.tasks.as_slice()).unwrap_or(&[]);

    let tracked = total_tracked(tasks, now);
    let idle = total_idle(data, &key, now);
    let entries = timeline(data, &key, now);

    let mut report = String::new();
    report.push_str(&format!("# Daily Report - {}\n\n", key));

    // Summary
    report.push_str("## Summary\n\n");
    report.push_str(&format!("- **Tasks:** {}\n", tasks.len()));
    report.push_str(&format!("- **Tracked:** {}\n", format_duration(tracked)));
    report.push_str(&format!("- **Idle:** {}\n\n", format_duration(idle)));

    // Per-task breakdown
    if !tasks.is_empty() {
        report.push_str("## Tasks\n\n");
        for task in tasks {
            let spent = task.duration(now);
            let mark = if task.exceeded(now) { " **(over estimate)**" } else { "" };
            let tags = if task.tags.is_empty() {
                String::new()
            } else {
                format!(" [{}]", task.tags.join(", "))
            };
            report.push_str(&format!(
                "- **{}**: {} / {}m estimated{}{}\n",
                task.name,
                format_duration(spent),
                task.estimated_minutes,
                mark,
                tags
            ));
        }
        report.push('\n');
    }

    // Tag totals
    let tags = all_tags(tasks);
    if !tags.is_empty() {
        report.push_str("## Tags\n\n");
        for tag in &tags {
            let time = total_time_for_tag(tasks, tag, now);
            report.push_str(&format!("- **{}:** {}\n", tag, format_duration(time)));
        }
        report.push('\n');
    }

    // Chronological log, idle periods in italics
    if !entries.is_empty() {
        report.push_str("## Timeline\n\n");
        for entry in &entries {
            let name = if entry.is_idle {
                format!("*{}*", entry.task_name)
            } else {
                entry.task_name.clone()
            };
            report.push_str(&format!(
                "- {} - {} {}\n",
                format_time(entry.start),
                format_time(entry.end),
                name
            ));
        }
        report.push('\n');
    }

    report
}

/// Generate a daily report file for the specified date. Returns the
/// path written.
pub fn generate_report(
    data: &DailyTasks,
    date: NaiveDate,
    now: Millis,
    dir: &Path,
    output_path: Option<PathBuf>,
) -> Result<PathBuf> {
    let path = output_path.unwrap_or_else(|| report_file(dir, date));
    let report = render_report(data, date, now);
    atomic_write(&path, &report)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DayRecord, Interval, Task};

    fn sample_data() -> DailyTasks {
        let mut write = Task::new("Write".to_string(), 25, vec!["work".to_string()]);
        write.intervals.push(Interval::closed(0, 1_800_000));
        let mut data = DailyTasks::new();
        data.insert(
            "2026-08-30".to_string(),
            DayRecord {
                tasks: vec![write],
                idle: vec![Interval::closed(1_800_000, 2_100_000)],
            },
        );
        data
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0), "0m");
        assert_eq!(format_duration(45 * 60_000), "45m");
        assert_eq!(format_duration(60 * 60_000), "1h");
        assert_eq!(format_duration(90 * 60_000), "1h 30m");
    }

    #[test]
    fn test_render_report_sections() {
        let data = sample_data();
        let date = NaiveDate::from_ymd_opt(2026, 8, 30).unwrap();
        let report = render_report(&data, date, 2_100_000);

        assert!(report.contains("# Daily Report - 2026-08-30"));
        assert!(report.contains("- **Tracked:** 30m"));
        assert!(report.contains("- **Idle:** 5m"));
        // 30 minutes against a 25-minute estimate
        assert!(report.contains("**(over estimate)**"));
        assert!(report.contains("- **work:** 30m"));
        assert!(report.contains("*Idle*"));
    }

    #[test]
    fn test_render_report_empty_day() {
        let data = DailyTasks::new();
        let date = NaiveDate::from_ymd_opt(2026, 8, 30).unwrap();
        let report = render_report(&data, date, 0);

        assert!(report.contains("- **Tasks:** 0"));
        assert!(!report.contains("## Timeline"));
    }

    #[test]
    fn test_generate_report_writes_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let data = sample_data();
        let date = NaiveDate::from_ymd_opt(2026, 8, 30).unwrap();

        let path = generate_report(&data, date, 2_100_000, temp_dir.path(), None).unwrap();
        assert_eq!(path, temp_dir.path().join("report-2026-08-30.md"));

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("Write"));
    }
}
