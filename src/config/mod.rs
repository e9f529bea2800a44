use serde::Deserialize;

use std::path::{Path, PathBuf};
use std::time::Duration;

mod general;
mod log;

use general::General;
use log::Log;

pub use log::LogLevel;

fn poll_interval() -> String {
    "2s".into()
}

fn report_interval() -> String {
    "10s".into()
}

fn address() -> String {
    "localhost:8080".into()
}

fn buffer_capacity() -> usize {
    100
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("unable to read config file {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("{name} couldn't be parsed from {value:?}: {source}")]
    Duration {
        name: &'static str,
        value: String,
        source: humantime::DurationError,
    },
    #[error("{0} must be greater than zero")]
    ZeroDuration(&'static str),
    #[error("buffer capacity must be a positive integer, got {0:?}")]
    Capacity(String),
    #[error("unknown log level {0:?}")]
    LogLevel(String),
}

/// Values layered on top of the config file. Empty strings are treated as
/// absent so that an exported-but-empty variable falls through to the layer
/// below it.
#[derive(Clone, Debug, Default)]
pub struct Overrides {
    pub poll_interval: Option<String>,
    pub report_interval: Option<String>,
    pub address: Option<String>,
    pub buffer_capacity: Option<String>,
    pub log_level: Option<String>,
}

impl Overrides {
    /// Reads `POLL_INTERVAL`, `REPORT_INTERVAL`, `ADDRESS`, `BUFFER_CAPACITY`
    /// and `LOG_LEVEL` from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            poll_interval: lookup("POLL_INTERVAL"),
            report_interval: lookup("REPORT_INTERVAL"),
            address: lookup("ADDRESS"),
            buffer_capacity: lookup("BUFFER_CAPACITY"),
            log_level: lookup("LOG_LEVEL"),
        }
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

#[derive(Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    #[serde(default)]
    general: General,
    #[serde(default)]
    log: Log,
}

impl ConfigFile {
    fn read(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        Ok(toml::from_str(&content)?)
    }

    fn apply(&mut self, overrides: &Overrides) {
        self.general.apply(overrides);
        self.log.apply(overrides);
    }
}

/// Runtime parameters of the agent. Validated once when built and never
/// mutated afterwards; share it behind an `Arc`.
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    poll_interval: Duration,
    report_interval: Duration,
    address: String,
    buffer_capacity: usize,
    log_level: LogLevel,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(2),
            report_interval: Duration::from_secs(10),
            address: address(),
            buffer_capacity: buffer_capacity(),
            log_level: LogLevel::default(),
        }
    }
}

impl Config {
    /// Builds the configuration from an optional TOML file with each set of
    /// overrides applied in order, later ones taking precedence.
    pub fn load(path: Option<&Path>, layers: &[Overrides]) -> Result<Self, ConfigError> {
        let mut file = match path {
            Some(path) => ConfigFile::read(path)?,
            None => ConfigFile::default(),
        };

        for overrides in layers {
            file.apply(overrides);
        }

        Ok(Self {
            poll_interval: file.general.poll_interval()?,
            report_interval: file.general.report_interval()?,
            address: file.general.address(),
            buffer_capacity: file.general.buffer_capacity()?,
            log_level: file.log.level()?,
        })
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_report_interval(mut self, interval: Duration) -> Self {
        self.report_interval = interval;
        self
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = address.into();
        self
    }

    pub fn with_buffer_capacity(mut self, capacity: usize) -> Self {
        self.buffer_capacity = capacity.max(1);
        self
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    pub fn report_interval(&self) -> Duration {
        self.report_interval
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn buffer_capacity(&self) -> usize {
        self.buffer_capacity
    }

    pub fn log_level(&self) -> LogLevel {
        self.log_level
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn env(vars: &[(&str, &str)]) -> Overrides {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Overrides::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = Config::load(None, &[env(&[])]).unwrap();
        assert_eq!(config.poll_interval(), Duration::from_secs(2));
        assert_eq!(config.report_interval(), Duration::from_secs(10));
        assert_eq!(config.address(), "localhost:8080");
        assert_eq!(config.buffer_capacity(), 100);
        assert_eq!(config.log_level(), LogLevel::Info);
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_env_overrides() {
        let config = Config::load(
            None,
            &[env(&[
                ("POLL_INTERVAL", "10ms"),
                ("REPORT_INTERVAL", "1m"),
                ("ADDRESS", "example.test:9000"),
                ("BUFFER_CAPACITY", "4"),
                ("LOG_LEVEL", "debug"),
            ])],
        )
        .unwrap();

        assert_eq!(config.poll_interval(), Duration::from_millis(10));
        assert_eq!(config.report_interval(), Duration::from_secs(60));
        assert_eq!(config.address(), "example.test:9000");
        assert_eq!(config.buffer_capacity(), 4);
        assert_eq!(config.log_level(), LogLevel::Debug);
    }

    #[test]
    fn test_duration_suffixes() {
        for (text, expected) in [
            ("250ns", Duration::from_nanos(250)),
            ("250us", Duration::from_micros(250)),
            ("250ms", Duration::from_millis(250)),
            ("3s", Duration::from_secs(3)),
            ("2m", Duration::from_secs(120)),
            ("1h", Duration::from_secs(3600)),
        ] {
            let config = Config::load(None, &[env(&[("POLL_INTERVAL", text)])]).unwrap();
            assert_eq!(config.poll_interval(), expected, "{text}");
        }
    }

    #[test]
    fn test_empty_values_fall_back_to_defaults() {
        let config = Config::load(
            None,
            &[env(&[
                ("POLL_INTERVAL", ""),
                ("REPORT_INTERVAL", "  "),
                ("ADDRESS", ""),
            ])],
        )
        .unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_invalid_duration_is_an_error() {
        let err = Config::load(None, &[env(&[("POLL_INTERVAL", "soon")])]).unwrap_err();
        assert!(matches!(err, ConfigError::Duration { name: "poll interval", .. }));

        let err = Config::load(None, &[env(&[("REPORT_INTERVAL", "10")])]).unwrap_err();
        assert!(matches!(err, ConfigError::Duration { name: "report interval", .. }));
    }

    #[test]
    fn test_zero_duration_is_an_error() {
        let err = Config::load(None, &[env(&[("REPORT_INTERVAL", "0s")])]).unwrap_err();
        assert!(matches!(err, ConfigError::ZeroDuration("report interval")));
    }

    #[test]
    fn test_invalid_capacity_and_level() {
        let err = Config::load(None, &[env(&[("BUFFER_CAPACITY", "0")])]).unwrap_err();
        assert!(matches!(err, ConfigError::Capacity(_)));

        let err = Config::load(None, &[env(&[("LOG_LEVEL", "loud")])]).unwrap_err();
        assert!(matches!(err, ConfigError::LogLevel(_)));
    }

    #[test]
    fn test_file_then_layers() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[general]
poll_interval = "500ms"
report_interval = "5s"
address = "collector.local:7000"
buffer_capacity = 16

[log]
level = "warn"
"#
        )
        .unwrap();

        let config = Config::load(Some(file.path()), &[]).unwrap();
        assert_eq!(config.poll_interval(), Duration::from_millis(500));
        assert_eq!(config.report_interval(), Duration::from_secs(5));
        assert_eq!(config.address(), "collector.local:7000");
        assert_eq!(config.buffer_capacity(), 16);
        assert_eq!(config.log_level(), LogLevel::Warn);

        let cli = Overrides {
            address: Some("https://cli.local".into()),
            ..Default::default()
        };
        let config = Config::load(
            Some(file.path()),
            &[env(&[("ADDRESS", "env.local"), ("POLL_INTERVAL", "1s")]), cli],
        )
        .unwrap();
        assert_eq!(config.poll_interval(), Duration::from_secs(1));
        assert_eq!(config.report_interval(), Duration::from_secs(5));
        assert_eq!(config.address(), "https://cli.local");
    }

    #[test]
    fn test_unknown_file_section_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[samplers]\nenabled = true").unwrap();
        let err = Config::load(Some(file.path()), &[]).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_example_config_matches_defaults() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("config/agent.toml");
        let config = Config::load(Some(&path), &[]).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_missing_file() {
        let err = Config::load(Some(Path::new("/nonexistent/agent.toml")), &[]).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
