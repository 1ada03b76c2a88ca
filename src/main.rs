mod app;
mod domain;
mod persistence;
mod report;
mod ticker;

use anyhow::{anyhow, Result};
use app::{now_millis, AppState, DayView};
use clap::{Parser, Subcommand};
use domain::{format_clock, total_time_for_tag};
use persistence::{ensure_stint_dir, init_local_stint, Store};

#[derive(Parser)]
#[command(name = "stint")]
#[command(about = "A minimal command-line time tracker with automatic idle accounting", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a local .stint directory in the current directory
    Init,
    /// Add a new task to the day
    Add {
        /// Task name
        name: String,
        /// Estimated minutes to completion
        #[arg(short, long)]
        estimate: u32,
        /// Comma-separated tags
        #[arg(short, long)]
        tags: Option<String>,
        /// Day to add to (YYYY-MM-DD format). Defaults to today.
        #[arg(short, long)]
        date: Option<String>,
    },
    /// Start or stop tracking a task. Starting one task stops whichever
    /// was running.
    Toggle {
        /// Task id or unique task name
        task: String,
        #[arg(short, long)]
        date: Option<String>,
    },
    /// Edit a task's name, estimate, or tags
    Edit {
        /// Task id or unique task name
        task: String,
        /// New task name
        #[arg(long)]
        name: Option<String>,
        /// New estimate in minutes
        #[arg(short, long)]
        estimate: Option<u32>,
        /// New comma-separated tags (replaces the old set)
        #[arg(short, long)]
        tags: Option<String>,
        #[arg(short, long)]
        date: Option<String>,
    },
    /// Delete a task and its recorded intervals
    Delete {
        /// Task id or unique task name
        task: String,
        #[arg(short, long)]
        date: Option<String>,
    },
    /// Remove every task and interval for the day
    Clear {
        #[arg(short, long)]
        date: Option<String>,
    },
    /// Show the day's tasks and totals
    Status {
        #[arg(short, long)]
        date: Option<String>,
    },
    /// Show the chronological activity log for the day
    Timeline {
        #[arg(short, long)]
        date: Option<String>,
    },
    /// List the day's tags with their tracked time
    Tags {
        #[arg(short, long)]
        date: Option<String>,
    },
    /// Filter task views by tag; omit the tag to clear the filter
    Filter {
        tag: Option<String>,
    },
    /// Enable or disable automatic idle tracking
    AutoIdle {
        #[arg(value_parser = ["on", "off"])]
        state: String,
    },
    /// Redraw the day's status every second
    Watch {
        #[arg(short, long)]
        date: Option<String>,
    },
    /// Generate a daily markdown report
    Report {
        /// Date to generate the report for (YYYY-MM-DD format). Defaults to today.
        #[arg(short, long)]
        date: Option<String>,
        /// Output file path. Defaults to <stint-dir>/report-YYYY-MM-DD.md
        #[arg(short, long)]
        output: Option<String>,
    },
}

fn parse_date(date: &str) -> Result<chrono::NaiveDate> {
    chrono::NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|e| anyhow!("Invalid date format. Use YYYY-MM-DD: {}", e))
}

fn parse_tags(tags: Option<String>) -> Vec<String> {
    tags.map(|list| {
        list.split(',')
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect()
    })
    .unwrap_or_default()
}

/// Apply a `--date` argument before running a command
fn select_date(app: &mut AppState, date: Option<String>) -> Result<()> {
    if let Some(date) = date {
        app.select_date(parse_date(&date)?);
    }
    Ok(())
}

fn resolve(app: &AppState, reference: &str) -> Result<String> {
    app.resolve_task(reference)
        .ok_or_else(|| anyhow!("No unique task matching '{}' on {}", reference, app.selected_date()))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(Commands::Init) = cli.command {
        let stint_dir = init_local_stint()?;
        println!("Initialized stint directory: {}", stint_dir.display());
        println!();
        println!("Stint will now use this local directory for task storage.");
        return Ok(());
    }

    let stint_dir = ensure_stint_dir()?;
    let store = Store::new(&stint_dir);
    let mut app = AppState::load(store);

    match cli.command {
        Some(Commands::Init) => unreachable!("handled above"),
        Some(Commands::Add { name, estimate, tags, date }) => {
            select_date(&mut app, date)?;
            let view = app.add_task(&name, estimate, parse_tags(tags))?;
            println!("Added '{}' ({} min estimate)", name.trim(), estimate);
            print_status(&view);
        }
        Some(Commands::Toggle { task, date }) => {
            select_date(&mut app, date)?;
            let id = resolve(&app, &task)?;
            let view = app.toggle_task(&id);
            match view.tasks.iter().find(|t| t.id == id) {
                Some(t) if t.is_active() => println!("Started '{}'", t.name),
                Some(t) => println!("Stopped '{}'", t.name),
                None => {}
            }
            print_status(&view);
        }
        Some(Commands::Edit { task, name, estimate, tags, date }) => {
            select_date(&mut app, date)?;
            let id = resolve(&app, &task)?;
            // Missing fields keep their current values
            let date_key = app.selected_date().format("%Y-%m-%d").to_string();
            let current = app
                .data()
                .get(&date_key)
                .and_then(|day| day.task(&id))
                .cloned()
                .ok_or_else(|| anyhow!("No task matching '{}'", task))?;
            let view = app.edit_task(
                &id,
                name.as_deref().unwrap_or(&current.name),
                estimate.unwrap_or(current.estimated_minutes),
                if tags.is_some() { parse_tags(tags) } else { current.tags },
            )?;
            println!("Updated task");
            print_status(&view);
        }
        Some(Commands::Delete { task, date }) => {
            select_date(&mut app, date)?;
            let id = resolve(&app, &task)?;
            let view = app.delete_task(&id);
            println!("Deleted task");
            print_status(&view);
        }
        Some(Commands::Clear { date }) => {
            select_date(&mut app, date)?;
            let view = app.clear_day();
            println!("Cleared {}", view.date);
        }
        Some(Commands::Timeline { date }) => {
            select_date(&mut app, date)?;
            print_timeline(&app.view());
        }
        Some(Commands::Tags { date }) => {
            select_date(&mut app, date)?;
            print_tags(&app);
        }
        Some(Commands::Filter { tag }) => {
            let view = app.select_tag_filter(tag);
            match &view.tag_filter {
                Some(tag) => println!("Filtering by tag '{}'", tag),
                None => println!("Tag filter cleared"),
            }
            print_status(&view);
        }
        Some(Commands::AutoIdle { state }) => {
            let enabled = state == "on";
            app.set_auto_idle(enabled);
            println!(
                "Automatic idle tracking {}",
                if enabled { "enabled" } else { "disabled" }
            );
        }
        Some(Commands::Watch { date }) => {
            select_date(&mut app, date)?;
            watch(&app);
        }
        Some(Commands::Report { date, output }) => {
            select_date(&mut app, date)?;
            let report_date = app.selected_date();
            let output_path = output.map(std::path::PathBuf::from);
            let path = report::generate_report(
                app.data(),
                report_date,
                now_millis(),
                &stint_dir,
                output_path,
            )?;
            println!("Report generated: {}", path.display());
        }
        Some(Commands::Status { date }) => {
            select_date(&mut app, date)?;
            print_status(&app.view());
        }
        None => print_status(&app.view()),
    }

    Ok(())
}

fn print_status(view: &DayView) {
    println!();
    match &view.tag_filter {
        Some(tag) => println!("{} (tag: {})", view.date, tag),
        None => println!("{}", view.date),
    }

    if view.tasks.is_empty() {
        println!("  no tasks");
    }
    for task in &view.tasks {
        let marker = if task.is_active() { ">" } else { " " };
        let spent = task.duration(view.now);
        let over = if task.exceeded(view.now) { " !" } else { "" };
        let tags = if task.tags.is_empty() {
            String::new()
        } else {
            format!("  [{}]", task.tags.join(", "))
        };
        println!(
            "{} {}  {} / {}m{}{}",
            marker,
            task.name,
            format_clock(spent),
            task.estimated_minutes,
            over,
            tags
        );
    }

    println!();
    println!(
        "tracked {}   idle {}{}",
        format_clock(view.total_tracked),
        format_clock(view.total_idle),
        if view.auto_idle_enabled { "" } else { "   (auto-idle off)" }
    );
}

fn print_timeline(view: &DayView) {
    use chrono::TimeZone;

    println!();
    println!("{}", view.date);
    if view.timeline.is_empty() {
        println!("  no activity");
        return;
    }
    for entry in &view.timeline {
        let clock = |ms: i64| {
            chrono::Local
                .timestamp_millis_opt(ms)
                .single()
                .map(|t| t.format("%H:%M:%S").to_string())
                .unwrap_or_else(|| "??:??:??".to_string())
        };
        let flag = match entry.exceeded {
            Some(true) => " !",
            _ => "",
        };
        println!(
            "  {} - {}  {} ({}){}",
            clock(entry.start),
            clock(entry.end),
            entry.task_name,
            format_clock(entry.end - entry.start),
            flag
        );
    }
}

fn print_tags(app: &AppState) {
    let view = app.view();
    let now = view.now;
    // Tag totals ignore the view filter
    let empty = Vec::new();
    let tasks = app
        .data()
        .get(&view.date)
        .map(|day| &day.tasks)
        .unwrap_or(&empty);

    println!();
    if view.tags.is_empty() {
        println!("no tags on {}", view.date);
        return;
    }
    for tag in &view.tags {
        let time = total_time_for_tag(tasks, tag, now);
        println!("  {}  {}", tag, format_clock(time));
    }
}

/// Redraw the status view once per tick. Stored data is never mutated
/// here; only `now` advances.
fn watch(app: &AppState) {
    loop {
        // Clear screen and move the cursor home
        print!("\x1b[2J\x1b[H");
        print_status(&app.view_at(now_millis()));
        std::thread::sleep(ticker::tick_duration());
    }
}
