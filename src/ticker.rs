use std::time::Duration;

/// Tick interval for watch mode, in milliseconds. One second matches
/// the clock granularity shown in duration displays.
pub const DEFAULT_TICK_MS: u64 = 1000;

/// Get tick duration
pub fn tick_duration() -> Duration {
    Duration::from_millis(DEFAULT_TICK_MS)
}
