use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_PATTERNS: [&str; 6] =
    ["ERROR", "WARNING", "WARN", "FAILED", "TIMEOUT", "EXCEPTION"];

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default = "default_logs_dir")]
    pub logs_dir: PathBuf,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default = "default_patterns")]
    pub patterns: Vec<String>,
    #[serde(default)]
    pub thresholds: Thresholds,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct Thresholds {
    #[serde(default = "default_cpu_thresholds")]
    pub cpu: ResourceThresholds,
    #[serde(default = "default_memory_thresholds")]
    pub memory: ResourceThresholds,
    #[serde(default = "default_disk_thresholds")]
    pub disk: ResourceThresholds,
}

/// Warn level plus an optional critical tier, both in percent.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct ResourceThresholds {
    pub warn: f64,
    #[serde(default)]
    pub critical: Option<f64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            logs_dir: default_logs_dir(),
            output_dir: default_output_dir(),
            patterns: default_patterns(),
            thresholds: Thresholds::default(),
        }
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            cpu: default_cpu_thresholds(),
            memory: default_memory_thresholds(),
            disk: default_disk_thresholds(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse YAML in {path}: {source}")]
    Parse {
        path: String,
        source: serde_yaml::Error,
    },
    #[error("invalid configuration: {0}")]
    Validation(String),
}

impl Config {
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path_ref = path.as_ref();
        let path_display = path_ref.display().to_string();
        let text = fs::read_to_string(path_ref).map_err(|source| ConfigError::Read {
            path: path_display.clone(),
            source,
        })?;

        let cfg: Config = serde_yaml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path_display,
            source,
        })?;

        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.logs_dir.as_os_str().is_empty() {
            return Err(ConfigError::Validation(
                "logs_dir must not be empty".to_string(),
            ));
        }
        if self.output_dir.as_os_str().is_empty() {
            return Err(ConfigError::Validation(
                "output_dir must not be empty".to_string(),
            ));
        }

        validate_patterns(&self.patterns)?;
        validate_resource("cpu", &self.thresholds.cpu)?;
        validate_resource("memory", &self.thresholds.memory)?;
        validate_resource("disk", &self.thresholds.disk)?;

        Ok(())
    }

    pub fn example_yaml() -> &'static str {
        include_str!("../config.yaml.example")
    }
}

fn validate_patterns(patterns: &[String]) -> Result<(), ConfigError> {
    if patterns.is_empty() {
        return Err(ConfigError::Validation(
            "patterns must contain at least one keyword".to_string(),
        ));
    }
    let mut seen = HashSet::new();
    for pattern in patterns {
        if pattern.trim().is_empty() {
            return Err(ConfigError::Validation(
                "patterns[*] must not be empty".to_string(),
            ));
        }
        if !seen.insert(pattern.as_str()) {
            return Err(ConfigError::Validation(format!(
                "pattern '{}' is listed more than once",
                pattern
            )));
        }
    }
    Ok(())
}

fn validate_resource(name: &str, t: &ResourceThresholds) -> Result<(), ConfigError> {
    if !is_percent(t.warn) {
        return Err(ConfigError::Validation(format!(
            "thresholds.{name}.warn must be in the range 0..100, got {}",
            t.warn
        )));
    }
    if let Some(critical) = t.critical {
        if !is_percent(critical) {
            return Err(ConfigError::Validation(format!(
                "thresholds.{name}.critical must be in the range 0..100, got {}",
                critical
            )));
        }
        if critical < t.warn {
            tracing::warn!(
                resource = name,
                warn = t.warn,
                critical,
                "critical threshold is below warn threshold; values above critical skip WARN"
            );
        }
    }
    Ok(())
}

pub fn is_percent(value: f64) -> bool {
    value.is_finite() && (0.0..=100.0).contains(&value)
}

/// clap value parser for the `--*-warn` / `--*-critical` flags.
pub fn parse_percent(raw: &str) -> Result<f64, String> {
    let value: f64 = raw
        .trim()
        .parse()
        .map_err(|_| format!("'{raw}' is not a number"))?;
    if !is_percent(value) {
        return Err(format!("{value} is outside the range 0..100"));
    }
    Ok(value)
}

fn default_logs_dir() -> PathBuf {
    PathBuf::from("logs")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("reports")
}

fn default_patterns() -> Vec<String> {
    DEFAULT_PATTERNS.iter().map(|p| p.to_string()).collect()
}

const fn default_cpu_thresholds() -> ResourceThresholds {
    ResourceThresholds {
        warn: 70.0,
        critical: Some(90.0),
    }
}

const fn default_memory_thresholds() -> ResourceThresholds {
    ResourceThresholds {
        warn: 70.0,
        critical: Some(90.0),
    }
}

const fn default_disk_thresholds() -> ResourceThresholds {
    ResourceThresholds {
        warn: 80.0,
        critical: Some(95.0),
    }
}
