use super::task::{DayRecord, Interval, Millis};

/// Apply one start/stop transition to a day's record.
///
/// Every open task interval is closed at `now`. If the target task was
/// not the one running, it gets a fresh open interval, so toggling a
/// stopped task starts it and implicitly stops whatever else ran, while
/// toggling the running task just stops it. The idle clock is then
/// reconciled: it closes when a task takes over, and (when `auto_idle`
/// is on) opens when the toggle leaves no task running.
///
/// Returns a new record; the input is never mutated. An unknown
/// `target_id` appends nothing but the close sweep still applies.
pub fn toggle(day: &DayRecord, target_id: &str, now: Millis, auto_idle: bool) -> DayRecord {
    let mut next = day.clone();
    let mut toggled_active = false;

    for task in &mut next.tasks {
        let was_open = task.is_active();
        if was_open {
            if let Some(last) = task.intervals.last_mut() {
                *last = Interval::closed(last.start, now);
            }
        } else if task.id == target_id {
            task.intervals.push(Interval::open(now));
            toggled_active = true;
        }
    }

    let idle_was_running = day.idle_active();
    if idle_was_running && toggled_active {
        if let Some(last) = next.idle.last_mut() {
            *last = Interval::closed(last.start, now);
        }
    } else if !idle_was_running && !toggled_active && auto_idle && !next.any_task_active() {
        next.idle.push(Interval::open(now));
    }

    next
}
