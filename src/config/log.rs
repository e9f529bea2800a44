use super::*;

use std::str::FromStr;

#[derive(Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct Log {
    #[serde(default)]
    level: Option<String>,
}

impl Log {
    pub fn apply(&mut self, overrides: &Overrides) {
        if let Some(v) = present(&overrides.log_level) {
            self.level = Some(v.to_string());
        }
    }

    pub fn level(&self) -> Result<LogLevel, ConfigError> {
        match present(&self.level) {
            Some(level) => level.parse(),
            None => Ok(LogLevel::default()),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl FromStr for LogLevel {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "error" => Ok(Self::Error),
            "warn" | "warning" => Ok(Self::Warn),
            "info" => Ok(Self::Info),
            "debug" => Ok(Self::Debug),
            "trace" => Ok(Self::Trace),
            _ => Err(ConfigError::LogLevel(s.to_string())),
        }
    }
}

impl From<LogLevel> for tracing::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}
