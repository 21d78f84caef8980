use std::time::Duration;

/// Default quiet period before pending edits are sent.
pub const DEFAULT_FLUSH_DELAY: Duration = Duration::from_millis(100);

/// Session configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncConfig {
    /// How long local edits must be quiet before they are flushed. Every
    /// edit restarts the wait.
    pub flush_delay: Duration,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            flush_delay: DEFAULT_FLUSH_DELAY,
        }
    }
}
