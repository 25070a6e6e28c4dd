use std::env;
use std::time::Duration;

use crate::staleness::DEFAULT_FRESH_WINDOW;

const DEFAULT_POLL_INTERVAL_SECS: u64 = 30;

/// Tracking session settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackingConfig {
    /// Fixed delay between position polls. There is no backoff on failure.
    pub poll_interval: Duration,

    /// Maximum age of a position still considered current.
    pub fresh_window: Duration,
}

impl TrackingConfig {
    /// Read settings from `TRACKING_POLL_INTERVAL_SECS` and
    /// `TRACKING_FRESH_WINDOW_SECS`, falling back to 30s and 45s.
    #[must_use]
    pub fn from_env() -> Self {
        let poll_interval =
            Duration::from_secs(env_u64("TRACKING_POLL_INTERVAL_SECS", DEFAULT_POLL_INTERVAL_SECS));
        let fresh_window = Duration::from_secs(env_u64(
            "TRACKING_FRESH_WINDOW_SECS",
            DEFAULT_FRESH_WINDOW.as_secs(),
        ));

        let config = Self { poll_interval, fresh_window };
        config.check();
        config
    }

    fn check(&self) {
        if self.fresh_window < self.poll_interval {
            tracing::warn!(
                poll_interval_secs = self.poll_interval.as_secs(),
                fresh_window_secs = self.fresh_window.as_secs(),
                "fresh window shorter than poll interval: a single missed poll will flag staleness"
            );
        }
    }
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

fn env_u64(key: &str, default: u64) -> u64 {
    env::var(key)
        .ok()
        .and_then(|value| value.trim().parse::<u64>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    // Both scenarios share one test; the environment is process global.
    #[test]
    fn from_env() {
        // SAFETY:
        // No other test in this crate reads or writes these variables.
        unsafe {
            env::remove_var("TRACKING_POLL_INTERVAL_SECS");
            env::remove_var("TRACKING_FRESH_WINDOW_SECS");
        };
        let config = TrackingConfig::from_env();
        assert_eq!(config.poll_interval, Duration::from_secs(30));
        assert_eq!(config.fresh_window, Duration::from_secs(45));

        // SAFETY:
        // As above.
        unsafe {
            env::set_var("TRACKING_POLL_INTERVAL_SECS", "10");
            env::set_var("TRACKING_FRESH_WINDOW_SECS", "not-a-number");
        };
        let config = TrackingConfig::from_env();
        assert_eq!(config.poll_interval, Duration::from_secs(10));
        assert_eq!(config.fresh_window, Duration::from_secs(45));

        // SAFETY:
        // As above.
        unsafe {
            env::remove_var("TRACKING_POLL_INTERVAL_SECS");
            env::remove_var("TRACKING_FRESH_WINDOW_SECS");
        };
    }
}
