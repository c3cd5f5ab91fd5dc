use std::fs;
use std::path::{Path, PathBuf};

use color_eyre::eyre::{bail, Result};
use serde::{Deserialize, Serialize};
use tracing::Level;
use wattprobe_platform::ReaderConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Off,
    Error,
    #[default]
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "off" => Some(LogLevel::Off),
            "error" => Some(LogLevel::Error),
            "warn" | "warning" => Some(LogLevel::Warn),
            "info" => Some(LogLevel::Info),
            "debug" => Some(LogLevel::Debug),
            "trace" => Some(LogLevel::Trace),
            _ => None,
        }
    }

    pub fn as_tracing_level(&self) -> Option<Level> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some(Level::ERROR),
            LogLevel::Warn => Some(Level::WARN),
            LogLevel::Info => Some(Level::INFO),
            LogLevel::Debug => Some(Level::DEBUG),
            LogLevel::Trace => Some(Level::TRACE),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UserConfig {
    pub log_level: LogLevel,
    pub reader: ReaderConfig,
}

pub fn config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("~/.config"))
        .join("wattprobe")
}

pub fn runtime_dir() -> PathBuf {
    dirs::runtime_dir()
        .or_else(dirs::cache_dir)
        .unwrap_or_else(|| PathBuf::from("/tmp"))
        .join("wattprobe")
}

pub fn config_path() -> PathBuf {
    config_dir().join("config.toml")
}

impl UserConfig {
    /// Load the config file, falling back to defaults if it is missing or
    /// does not parse.
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).unwrap_or_default(),
            Err(_) => Self::default(),
        }
    }

    pub fn merge_with_args(
        &mut self,
        root: Option<PathBuf>,
        prefix: Option<String>,
        delay_ms: Option<u64>,
    ) {
        if let Some(root) = root {
            self.reader.root = root;
        }
        if let Some(prefix) = prefix {
            self.reader.prefix = prefix;
        }
        if let Some(ms) = delay_ms {
            self.reader.measure_delay_ms = ms;
        }
    }

    /// Reject settings the reader cannot sample with. A zero window turns
    /// every sample into NaN or infinity.
    pub fn validate(&self) -> Result<()> {
        if self.reader.measure_delay_ms == 0 {
            bail!("reader.measure_delay_ms must be at least 1");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_is_default() {
        let tmp = TempDir::new().unwrap();
        let config = UserConfig::load_from(&tmp.path().join("config.toml"));
        assert_eq!(config.log_level, LogLevel::Warn);
        assert_eq!(config.reader, ReaderConfig::default());
    }

    #[test]
    fn test_load_reader_table() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        fs::write(
            &path,
            "log_level = \"debug\"\n\n[reader]\nroot = \"/tmp/powercap\"\nmeasure_delay_ms = 500\n",
        )
        .unwrap();

        let config = UserConfig::load_from(&path);
        assert_eq!(config.log_level, LogLevel::Debug);
        assert_eq!(config.reader.root, PathBuf::from("/tmp/powercap"));
        assert_eq!(config.reader.prefix, "intel-rapl");
        assert_eq!(config.reader.measure_delay_ms, 500);
    }

    #[test]
    fn test_invalid_file_is_default() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        fs::write(&path, "reader = 3").unwrap();
        assert_eq!(UserConfig::load_from(&path).reader, ReaderConfig::default());
    }

    #[test]
    fn test_args_override_file() {
        let mut config = UserConfig::default();
        config.merge_with_args(Some(PathBuf::from("/fake")), None, Some(20));
        assert_eq!(config.reader.root, PathBuf::from("/fake"));
        assert_eq!(config.reader.prefix, "intel-rapl");
        assert_eq!(config.reader.measure_delay_ms, 20);
    }

    #[test]
    fn test_zero_delay_from_file_is_rejected() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        fs::write(&path, "[reader]\nmeasure_delay_ms = 0\n").unwrap();

        let config = UserConfig::load_from(&path);
        assert_eq!(config.reader.measure_delay_ms, 0);
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("measure_delay_ms"));
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(UserConfig::default().validate().is_ok());
    }

    #[test]
    fn test_log_level_parsing() {
        assert_eq!(LogLevel::from_str("DEBUG"), Some(LogLevel::Debug));
        assert_eq!(LogLevel::from_str("warning"), Some(LogLevel::Warn));
        assert_eq!(LogLevel::from_str("loud"), None);
        assert_eq!(LogLevel::Off.as_tracing_level(), None);
    }
}
