//! Small helpers

use std::time::{Duration, SystemTime};
use url::Url;

/// Get a URL from something
pub trait Urlify {
    fn url(&self) -> &Url;
}

impl<T, E> Urlify for Result<T, E>
where
    T: Urlify,
    E: Urlify,
{
    fn url(&self) -> &Url {
        match self {
            Ok(something) => something.url(),
            Err(something) => something.url(),
        }
    }
}

/// Logs the wall-clock time of an operation when dropped.
pub struct MeasureTime(SystemTime);

impl MeasureTime {
    pub fn new() -> Self {
        Self(SystemTime::now())
    }
}

impl Default for MeasureTime {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for MeasureTime {
    fn drop(&mut self) {
        match self.0.elapsed() {
            // seconds resolution is plenty here
            Ok(duration) => log::info!(
                "Processing took {}",
                humantime::format_duration(Duration::from_secs(duration.as_secs()))
            ),
            Err(err) => log::warn!("Unable to measure processing time: {err}"),
        }
    }
}
