use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Accuracy {
    High,
    Balanced,
    Low,
}

/// What the location source is asked for when a session subscribes. The
/// driver decides the actual cadence, these are lower bounds.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchOptions {
    pub min_distance_m: f64,
    pub min_interval_ms: u64,
    pub fastest_interval_ms: u64,
    pub accuracy: Accuracy,
}

impl Default for WatchOptions {
    fn default() -> Self {
        WatchOptions {
            min_distance_m: 10.0,
            min_interval_ms: 5000,
            fastest_interval_ms: 3000,
            accuracy: Accuracy::High,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    pub watch: WatchOptions,
    pub current_position_timeout_ms: u64,
    pub current_position_max_age_ms: u64,
    pub tick_interval_ms: u64,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        TrackerConfig {
            watch: WatchOptions::default(),
            current_position_timeout_ms: 15000,
            current_position_max_age_ms: 10000,
            tick_interval_ms: 1000,
        }
    }
}

impl TrackerConfig {
    /// Missing keys fall back to the defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: TrackerConfig =
            serde_json::from_str(json).context("failed to parse tracker config")?;
        if config.tick_interval_ms == 0 {
            bail!("`tick_interval_ms` must be positive");
        }
        Ok(config)
    }

    pub fn current_position_timeout(&self) -> Duration {
        Duration::from_millis(self.current_position_timeout_ms)
    }

    pub fn current_position_max_age(&self) -> Duration {
        Duration::from_millis(self.current_position_max_age_ms)
    }

    pub fn tick_interval(&self) -> Duration {
        // a zero period would make the ticker panic
        Duration::from_millis(self.tick_interval_ms.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json() {
        let config =
            TrackerConfig::from_json_str(r#"{"watch": {"min_distance_m": 25.0, "accuracy": "low"}}"#)
                .unwrap();
        assert_eq!(config.watch.min_distance_m, 25.0);
        assert_eq!(config.watch.accuracy, Accuracy::Low);
        assert_eq!(config.watch.min_interval_ms, 5000);
        assert_eq!(config.current_position_timeout(), Duration::from_secs(15));
        assert_eq!(config.tick_interval(), Duration::from_secs(1));
    }

    #[test]
    fn empty_json_is_default() {
        assert_eq!(
            TrackerConfig::from_json_str("{}").unwrap(),
            TrackerConfig::default()
        );
    }

    #[test]
    fn rejects_zero_tick() {
        assert!(TrackerConfig::from_json_str(r#"{"tick_interval_ms": 0}"#).is_err());
        assert!(TrackerConfig::from_json_str("not json").is_err());
    }
}
