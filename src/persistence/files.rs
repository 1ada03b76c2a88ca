use anyhow::{Context, Result};
use std::env;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Get the stint directory - checks for a local .stint first, then falls
/// back to the global ~/.stint
pub fn get_stint_dir() -> Result<PathBuf> {
    let current_dir = env::current_dir().context("Could not determine current directory")?;
    if let Some(local_dir) = find_local_stint(&current_dir) {
        return Ok(local_dir);
    }

    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(".stint"))
}

/// Find a local .stint directory by walking up the directory tree
fn find_local_stint(start_dir: &Path) -> Option<PathBuf> {
    let mut current = start_dir;

    loop {
        let stint_dir = current.join(".stint");
        if stint_dir.is_dir() {
            return Some(stint_dir);
        }
        current = current.parent()?;
    }
}

/// Ensure the stint directory exists
pub fn ensure_stint_dir() -> Result<PathBuf> {
    let dir = get_stint_dir()?;
    if !dir.exists() {
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
    }
    Ok(dir)
}

/// Initialize a local .stint directory in the current directory
pub fn init_local_stint() -> Result<PathBuf> {
    let current_dir = env::current_dir().context("Could not determine current directory")?;
    let stint_dir = current_dir.join(".stint");

    if stint_dir.exists() {
        anyhow::bail!("Stint directory already exists: {}", stint_dir.display());
    }

    fs::create_dir_all(&stint_dir)
        .with_context(|| format!("Failed to create directory: {}", stint_dir.display()))?;

    Ok(stint_dir)
}

/// Path to the full multi-day task record
pub fn tasks_file(dir: &Path) -> PathBuf {
    dir.join("tasks.json")
}

/// Path to the settings file (auto-idle flag, tag filter)
pub fn meta_file(dir: &Path) -> PathBuf {
    dir.join("meta.json")
}

/// Path to the report file for a date
pub fn report_file(dir: &Path, date: chrono::NaiveDate) -> PathBuf {
    dir.join(format!("report-{}.md", date.format("%Y-%m-%d")))
}

/// Atomically write content to a file using temp file + rename
pub fn atomic_write<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
    let path = path.as_ref();
    let dir = path.parent().context("File path has no parent directory")?;

    // Temp file must live in the same directory for the rename to be atomic
    let mut temp_file =
        NamedTempFile::new_in(dir).context("Failed to create temporary file")?;

    temp_file
        .write_all(content.as_bytes())
        .context("Failed to write to temporary file")?;

    temp_file
        .as_file()
        .sync_all()
        .context("Failed to sync temporary file")?;

    temp_file
        .persist(path)
        .with_context(|| format!("Failed to persist file: {}", path.display()))?;

    Ok(())
}
