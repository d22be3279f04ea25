//! Configuration models and loaders for Orbit Engine.
//!
//! Defaults cover every setting; an optional TOML file overrides them and
//! the launcher's CLI flags override both.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// Top-level runtime settings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub server: ServerSettings,
    pub simulation: SimulationSettings,
    pub planner: PlannerSettings,
    pub journal: JournalSettings,
}

/// Listener settings for the HTTP/WebSocket surface.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        ServerSettings {
            host: "127.0.0.1".to_string(),
            port: 8000,
        }
    }
}

/// Tick-loop and snapshot fan-out settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationSettings {
    /// Target tick cadence in Hz.
    pub tick_hz: f64,
    /// Per-session egress ring depth; lagging observers drop the oldest.
    pub snapshot_queue: usize,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        SimulationSettings {
            tick_hz: 20.0,
            snapshot_queue: 4,
        }
    }
}

/// Porkchop worker settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlannerSettings {
    /// Grid deadline in seconds; expiry returns a partial grid.
    pub deadline_s: f64,
    /// Default grid resolution `[departure, arrival]`.
    pub default_grid: [usize; 2],
    /// Upper bound on either grid axis.
    pub max_grid: usize,
}

impl Default for PlannerSettings {
    fn default() -> Self {
        PlannerSettings {
            deadline_s: 30.0,
            default_grid: [30, 30],
            max_grid: 200,
        }
    }
}

/// Journal writer settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct JournalSettings {
    pub enabled: bool,
    pub dir: PathBuf,
    /// Records per journal file.
    pub batch_size: usize,
    /// Bounded queue depth between the tick loop and the writer.
    pub queue_depth: usize,
}

impl Default for JournalSettings {
    fn default() -> Self {
        JournalSettings {
            enabled: true,
            dir: PathBuf::from("simulation_logs"),
            batch_size: 10_000,
            queue_depth: 1_024,
        }
    }
}

/// Errors that can occur while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid configuration: {reason}")]
    Invalid { reason: String },
}

/// Load settings from an optional TOML file; `None` yields the defaults.
pub fn load(path: Option<&Path>) -> Result<Settings, ConfigError> {
    let settings = match path {
        Some(path) => {
            let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            toml::from_str(&contents)?
        }
        None => Settings::default(),
    };
    settings.validate()?;
    Ok(settings)
}

impl Settings {
    /// Reject settings the engine or server cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.host.parse::<std::net::IpAddr>().is_err() {
            return Err(invalid(format!(
                "server host must be an IP address (got `{}`)",
                self.server.host
            )));
        }
        if !(self.simulation.tick_hz.is_finite() && self.simulation.tick_hz > 0.0) {
            return Err(invalid(format!(
                "tick_hz must be positive (got {})",
                self.simulation.tick_hz
            )));
        }
        if self.simulation.snapshot_queue == 0 {
            return Err(invalid("snapshot_queue must be at least 1".to_string()));
        }
        if !(self.planner.deadline_s.is_finite() && self.planner.deadline_s > 0.0) {
            return Err(invalid(format!(
                "planner deadline must be positive (got {})",
                self.planner.deadline_s
            )));
        }
        if self.planner.max_grid == 0 {
            return Err(invalid("max_grid must be at least 1".to_string()));
        }
        for (axis, &cells) in ["departure", "arrival"]
            .iter()
            .zip(self.planner.default_grid.iter())
        {
            if cells == 0 || cells > self.planner.max_grid {
                return Err(invalid(format!(
                    "default {axis} grid axis must be in 1..={} (got {cells})",
                    self.planner.max_grid
                )));
            }
        }
        if self.journal.batch_size == 0 {
            return Err(invalid("journal batch_size must be at least 1".to_string()));
        }
        if self.journal.queue_depth == 0 {
            return Err(invalid("journal queue_depth must be at least 1".to_string()));
        }
        Ok(())
    }
}

fn invalid(reason: String) -> ConfigError {
    ConfigError::Invalid { reason }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        let settings = load(None).unwrap();
        assert_eq!(settings.server.port, 8000);
        assert_eq!(settings.simulation.tick_hz, 20.0);
        assert_eq!(settings.simulation.snapshot_queue, 4);
        assert_eq!(settings.journal.batch_size, 10_000);
    }

    #[test]
    fn toml_overrides_merge_over_defaults() {
        let parsed: Settings = toml::from_str(
            r#"
            [server]
            port = 9100

            [simulation]
            tick_hz = 50.0
            "#,
        )
        .unwrap();
        assert_eq!(parsed.server.port, 9100);
        assert_eq!(parsed.server.host, "127.0.0.1");
        assert_eq!(parsed.simulation.tick_hz, 50.0);
        assert_eq!(parsed.simulation.snapshot_queue, 4);
    }

    #[test]
    fn zero_tick_rate_is_rejected() {
        let mut settings = Settings::default();
        settings.simulation.tick_hz = 0.0;
        assert!(matches!(
            settings.validate(),
            Err(ConfigError::Invalid { .. })
        ));
    }

    #[test]
    fn oversized_default_grid_is_rejected() {
        let mut settings = Settings::default();
        settings.planner.default_grid = [500, 30];
        assert!(settings.validate().is_err());
    }

    #[test]
    fn unknown_keys_are_parse_errors() {
        let result: Result<Settings, _> = toml::from_str("[server]\nportt = 1");
        assert!(result.is_err());
    }
}
