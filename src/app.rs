use crate::domain::{
    all_tags, filter_by_tag, timeline, toggle, total_idle, total_tracked, DailyTasks, DayRecord,
    Millis, Task, TimelineEntry,
};
use crate::persistence::{Settings, Store};
use chrono::{Local, NaiveDate, Utc};
use thiserror::Error;

/// Rejected command input. The record is left untouched; the caller is
/// responsible for prompting the user again.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("task name cannot be empty")]
    EmptyName,
    #[error("estimate must be a positive number of minutes")]
    InvalidEstimate,
}

/// Display-ready projection of the selected day, rebuilt after every
/// command and on every tick
#[derive(Debug, Clone)]
pub struct DayView {
    pub date: String,
    /// The instant this view was assembled at
    pub now: Millis,
    /// The day's tasks after the tag filter
    pub tasks: Vec<Task>,
    pub timeline: Vec<TimelineEntry>,
    pub total_tracked: Millis,
    pub total_idle: Millis,
    /// All tags on the day, unfiltered
    pub tags: Vec<String>,
    pub tag_filter: Option<String>,
    pub auto_idle_enabled: bool,
}

/// Main application state: the in-memory record plus view settings.
/// Every mutating command writes the record back through the store
/// before returning; write failures are logged and tracking continues
/// in memory.
pub struct AppState {
    data: DailyTasks,
    selected_date: NaiveDate,
    settings: Settings,
    store: Store,
}

/// Current wall-clock time in epoch milliseconds
pub fn now_millis() -> Millis {
    Utc::now().timestamp_millis()
}

impl AppState {
    /// Load state from a store, selecting today's date
    pub fn load(store: Store) -> Self {
        let data = store.load_tasks();
        let settings = store.load_settings();
        let mut app = Self {
            data,
            selected_date: Local::now().date_naive(),
            settings,
            store,
        };
        app.ensure_day();
        app
    }

    pub fn selected_date(&self) -> NaiveDate {
        self.selected_date
    }

    pub fn data(&self) -> &DailyTasks {
        &self.data
    }

    fn date_key(&self) -> String {
        self.selected_date.format("%Y-%m-%d").to_string()
    }

    /// Materialize the selected day's record if missing
    fn ensure_day(&mut self) -> &mut DayRecord {
        let key = self.date_key();
        self.data.entry(key).or_default()
    }

    /// Mirror the in-memory record to the store. An empty record is
    /// never written; a failed write is logged and otherwise ignored.
    fn persist(&self) {
        if self.data.is_empty() {
            return;
        }
        if let Err(e) = self.store.save_tasks(&self.data) {
            eprintln!("Warning: failed to save task data: {}", e);
        }
    }

    fn persist_settings(&self) {
        if let Err(e) = self.store.save_settings(&self.settings) {
            eprintln!("Warning: failed to save settings: {}", e);
        }
    }

    /// Switch the active day
    pub fn select_date(&mut self, date: NaiveDate) -> DayView {
        self.selected_date = date;
        self.ensure_day();
        self.persist();
        self.view_at(now_millis())
    }

    /// Create a new task on the selected day
    pub fn add_task(
        &mut self,
        name: &str,
        estimated_minutes: u32,
        tags: Vec<String>,
    ) -> Result<DayView, CommandError> {
        let name = validate_name(name)?;
        validate_estimate(estimated_minutes)?;

        let task = Task::new(name, estimated_minutes, tags);
        self.ensure_day().tasks.push(task);
        self.persist();
        Ok(self.view_at(now_millis()))
    }

    /// Start or stop tracking a task
    pub fn toggle_task(&mut self, id: &str) -> DayView {
        self.toggle_task_at(id, now_millis())
    }

    pub fn toggle_task_at(&mut self, id: &str, now: Millis) -> DayView {
        let auto_idle = self.settings.auto_idle_enabled;
        let day = self.ensure_day();
        // Single atomic replace of the day's record
        *day = toggle(day, id, now, auto_idle);
        self.persist();
        self.view_at(now)
    }

    /// Update a task's name, estimate, and tags. Identity and intervals
    /// are untouched.
    pub fn edit_task(
        &mut self,
        id: &str,
        name: &str,
        estimated_minutes: u32,
        tags: Vec<String>,
    ) -> Result<DayView, CommandError> {
        let name = validate_name(name)?;
        validate_estimate(estimated_minutes)?;

        let day = self.ensure_day();
        if let Some(task) = day.tasks.iter_mut().find(|t| t.id == id) {
            task.name = name;
            task.estimated_minutes = estimated_minutes;
            task.tags = tags;
        }
        self.persist();
        Ok(self.view_at(now_millis()))
    }

    /// Remove a task outright, open interval and all. Idle is not
    /// adjusted; only toggling moves time to idle.
    pub fn delete_task(&mut self, id: &str) -> DayView {
        let day = self.ensure_day();
        day.tasks.retain(|t| t.id != id);
        self.persist();
        self.view_at(now_millis())
    }

    /// Reset the selected day to an empty record
    pub fn clear_day(&mut self) -> DayView {
        let key = self.date_key();
        self.data.insert(key, DayRecord::default());
        self.persist();
        self.view_at(now_millis())
    }

    /// Enable or disable idle auto-tracking. Takes effect on future
    /// toggles only; a running idle interval is left as it is.
    pub fn set_auto_idle(&mut self, enabled: bool) -> DayView {
        self.settings.auto_idle_enabled = enabled;
        self.persist_settings();
        self.view_at(now_millis())
    }

    /// Set or clear the tag filter applied to task views
    pub fn select_tag_filter(&mut self, tag: Option<String>) -> DayView {
        self.settings.tag_filter = tag;
        self.persist_settings();
        self.view_at(now_millis())
    }

    /// Resolve a user-supplied task reference: an exact id, or a unique
    /// case-insensitive name match among the selected day's tasks
    pub fn resolve_task(&self, reference: &str) -> Option<String> {
        let key = self.date_key();
        let day = self.data.get(&key)?;

        if let Some(task) = day.tasks.iter().find(|t| t.id == reference) {
            return Some(task.id.clone());
        }

        let needle = reference.to_lowercase();
        let mut matches = day
            .tasks
            .iter()
            .filter(|t| t.name.to_lowercase() == needle);
        match (matches.next(), matches.next()) {
            (Some(task), None) => Some(task.id.clone()),
            _ => None,
        }
    }

    pub fn view(&self) -> DayView {
        self.view_at(now_millis())
    }

    /// Assemble the derived view of the selected day at time `now`
    pub fn view_at(&self, now: Millis) -> DayView {
        let key = self.date_key();
        let empty = DayRecord::default();
        let day = self.data.get(&key).unwrap_or(&empty);

        let tag_filter = self.settings.tag_filter.clone();
        let tasks = filter_by_tag(&day.tasks, tag_filter.as_deref())
            .into_iter()
            .cloned()
            .collect();

        DayView {
            date: key.clone(),
            now,
            tasks,
            timeline: timeline(&self.data, &key, now),
            total_tracked: total_tracked(&day.tasks, now),
            total_idle: total_idle(&self.data, &key, now),
            tags: all_tags(&day.tasks),
            tag_filter,
            auto_idle_enabled: self.settings.auto_idle_enabled,
        }
    }
}

fn validate_name(name: &str) -> Result<String, CommandError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(CommandError::EmptyName);
    }
    Ok(trimmed.to_string())
}

fn validate_estimate(estimated_minutes: u32) -> Result<(), CommandError> {
    if estimated_minutes == 0 {
        return Err(CommandError::InvalidEstimate);
    }
    Ok(())
}
