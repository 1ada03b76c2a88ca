pub mod task;
pub mod toggle;
pub mod views;

pub use task::{duration, DailyTasks, DayRecord, Interval, Millis, Task, IDLE_NAME};
pub use toggle::toggle;
pub use views::{
    all_tags, filter_by_tag, format_clock, timeline, total_idle, total_time_for_tag,
    total_tracked, TimelineEntry,
};
