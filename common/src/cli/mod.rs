//! Command line helpers
pub mod client;
pub mod log;

/// Per-command defaults for common CLI behavior.
pub trait CommandDefaults {
    /// Whether the command shows a progress bar by default.
    fn progress(&self) -> bool {
        true
    }
}
