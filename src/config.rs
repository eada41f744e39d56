//! Engine configuration (§6), `serde`/`toml`-backed in the style of
//! `lithos-config`/`onyx-config` in the wider pack (`serde` + `toml` +
//! `thiserror`).

use serde::{Deserialize, Serialize};

use crate::core::price::Percent;

fn default_partitions() -> usize {
    0
}

fn default_channel_capacity() -> usize {
    100_000
}

fn default_moving_average_window() -> usize {
    64
}

fn default_anomaly_threshold_percent() -> f64 {
    2.0
}

fn default_sliding_window_milliseconds() -> u64 {
    1_000
}

fn default_recent_anomalies_capacity() -> usize {
    10_000
}

/// Top-level configuration recognized by the engine (§6).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Number of partitions. `0` means "auto" — `max(1, cpu_count)`.
    pub partitions: usize,
    /// Per-partition bounded queue size.
    pub channel_capacity: usize,
    /// Moving-average window length `W`.
    pub moving_average_window: usize,
    /// Base anomaly threshold `T`, as a percentage.
    #[serde(with = "percent_as_f64")]
    pub anomaly_threshold_percent: Percent,
    /// Sliding-window retention horizon in milliseconds.
    pub sliding_window_milliseconds: u64,
    /// Capacity of the recent-anomalies ring.
    pub recent_anomalies_capacity: usize,
    /// Producer-side simulation knobs (§6) — consumed only by the
    /// synthetic feed adapter, never by the engine core.
    pub simulation: SimulationConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            partitions: default_partitions(),
            channel_capacity: default_channel_capacity(),
            moving_average_window: default_moving_average_window(),
            anomaly_threshold_percent: Percent::from_f64(default_anomaly_threshold_percent()),
            sliding_window_milliseconds: default_sliding_window_milliseconds(),
            recent_anomalies_capacity: default_recent_anomalies_capacity(),
            simulation: SimulationConfig::default(),
        }
    }
}

impl EngineConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(raw)
    }

    pub fn from_toml_file(path: &std::path::Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Ok(Self::from_toml_str(&raw)?)
    }

    /// Resolves `partitions == 0` to the CPU count (§4.7 `Start`).
    pub fn resolved_partitions(&self) -> usize {
        if self.partitions > 0 {
            self.partitions
        } else {
            num_cpus::get().max(1)
        }
    }
}

/// Producer-side simulation sub-config (§6). The engine core never
/// reads this directly; it's consumed by `simulate::SimulatedFeed`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub enabled: bool,
    pub symbols: Vec<String>,
    pub ticks_per_second: u32,
    pub initial_price: f64,
    pub max_jitter_percent: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            symbols: vec!["AAPL".to_string(), "MSFT".to_string(), "GOOG".to_string()],
            ticks_per_second: 10,
            initial_price: 100.0,
            max_jitter_percent: 0.5,
        }
    }
}

mod percent_as_f64 {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use crate::core::price::Percent;

    pub fn serialize<S: Serializer>(value: &Percent, serializer: S) -> Result<S::Ok, S::Error> {
        value.as_f64().serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Percent, D::Error> {
        let raw = f64::deserialize(deserializer)?;
        Ok(Percent::from_f64(raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_section_six() {
        let cfg = EngineConfig::default();
        assert_eq!(cfg.partitions, 0);
        assert_eq!(cfg.channel_capacity, 100_000);
        assert_eq!(cfg.moving_average_window, 64);
        assert_eq!(cfg.anomaly_threshold_percent.as_f64(), 2.0);
        assert_eq!(cfg.sliding_window_milliseconds, 1_000);
        assert_eq!(cfg.recent_anomalies_capacity, 10_000);
    }

    #[test]
    fn partial_toml_keeps_remaining_defaults() {
        let cfg = EngineConfig::from_toml_str("partitions = 4\nchannel_capacity = 2048\n").unwrap();
        assert_eq!(cfg.partitions, 4);
        assert_eq!(cfg.channel_capacity, 2048);
        assert_eq!(cfg.moving_average_window, 64);
    }

    #[test]
    fn resolved_partitions_falls_back_to_cpu_count() {
        let cfg = EngineConfig::default();
        assert_eq!(cfg.resolved_partitions(), num_cpus::get().max(1));
    }

    #[test]
    fn resolved_partitions_honors_explicit_value() {
        let mut cfg = EngineConfig::default();
        cfg.partitions = 7;
        assert_eq!(cfg.resolved_partitions(), 7);
    }
}
