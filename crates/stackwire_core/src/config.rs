//! Runtime settings.
//!
//! Settings come from an optional YAML file and are then overridden by CLI
//! flags. They are built once per process and passed by reference; nothing in
//! the workspace reads ambient global state.
//!
//! ```yaml
//! region: eu-west-1
//! parameter_file: src/parameters_cloudformation.json
//! outpath: out
//! functions_dir: src/functions
//! request_timeout_secs: 30
//! max_retries: 3
//! initial_backoff_ms: 200
//! max_backoff_ms: 5000
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{CoreError, CoreResult};
use crate::retry::{Backoff, RetryPolicy};

const DEFAULT_REGION: &str = "eu-west-1";
const DEFAULT_PARAMETER_FILE: &str = "parameters.json";
const DEFAULT_OUTPATH: &str = "out";
const DEFAULT_FUNCTIONS_DIR: &str = "functions";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
const DEFAULT_MAX_RETRIES: u32 = 3;
const DEFAULT_INITIAL_BACKOFF_MS: u64 = 200;
const DEFAULT_MAX_BACKOFF_MS: u64 = 5_000;

/// Deployment settings shared by every command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// AWS region all clients are bound to.
    pub region: String,
    /// JSON parameter file (`[{ParameterKey, ParameterValue}]`).
    pub parameter_file: PathBuf,
    /// Directory generated artifacts are written to.
    pub outpath: PathBuf,
    /// Directory whose sub-directories are packaged as functions.
    pub functions_dir: PathBuf,
    /// Per-attempt timeout for remote calls (0 = no timeout).
    pub request_timeout_secs: u64,
    /// Retries after the first attempt for read-only calls.
    pub max_retries: u32,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            region: DEFAULT_REGION.to_string(),
            parameter_file: PathBuf::from(DEFAULT_PARAMETER_FILE),
            outpath: PathBuf::from(DEFAULT_OUTPATH),
            functions_dir: PathBuf::from(DEFAULT_FUNCTIONS_DIR),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            max_retries: DEFAULT_MAX_RETRIES,
            initial_backoff_ms: DEFAULT_INITIAL_BACKOFF_MS,
            max_backoff_ms: DEFAULT_MAX_BACKOFF_MS,
        }
    }
}

impl Settings {
    /// Load settings from a YAML file.
    pub fn load(path: &Path) -> CoreResult<Self> {
        debug!("Reading settings from {:?}", path);
        let content = fs::read_to_string(path)?;
        serde_yaml::from_str(&content).map_err(|e| CoreError::MalformedSettings {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Load settings from a YAML file, falling back to defaults if it does not exist.
    pub fn load_or_default(path: &Path) -> CoreResult<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            debug!("No settings file at {:?}, using defaults", path);
            Ok(Self::default())
        }
    }

    /// Parse settings from YAML content.
    pub fn from_yaml_str(content: &str) -> CoreResult<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }

    pub fn with_parameter_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.parameter_file = path.into();
        self
    }

    pub fn with_outpath(mut self, path: impl Into<PathBuf>) -> Self {
        self.outpath = path.into();
        self
    }

    pub fn with_functions_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.functions_dir = path.into();
        self
    }

    /// Check the settings for values no command can work with.
    pub fn validate(&self) -> CoreResult<()> {
        if self.region.trim().is_empty() {
            return Err(CoreError::InvalidSettings("region must not be empty".to_string()));
        }
        if self.initial_backoff_ms > self.max_backoff_ms {
            return Err(CoreError::InvalidSettings(format!(
                "initial_backoff_ms ({}) exceeds max_backoff_ms ({})",
                self.initial_backoff_ms, self.max_backoff_ms
            )));
        }
        Ok(())
    }

    /// Retry policy for remote calls derived from these settings.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_retries.saturating_add(1))
            .with_timeout(Duration::from_secs(self.request_timeout_secs))
            .with_backoff(Backoff::Exponential {
                initial: Duration::from_millis(self.initial_backoff_ms),
                max: Duration::from_millis(self.max_backoff_ms),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let settings = Settings::from_yaml_str("region: us-east-1\nmax_retries: 1\n").unwrap();
        assert_eq!(settings.region, "us-east-1");
        assert_eq!(settings.max_retries, 1);
        assert_eq!(settings.parameter_file, PathBuf::from("parameters.json"));
        assert_eq!(settings.request_timeout_secs, 30);
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let dir = tempdir().unwrap();
        let settings = Settings::load_or_default(&dir.path().join("absent.yaml")).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_load_malformed_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("stackwire.yaml");
        fs::write(&path, "region: [unclosed").unwrap();

        let err = Settings::load(&path).unwrap_err();
        assert!(matches!(err, CoreError::MalformedSettings { .. }));
    }

    #[test]
    fn test_validate() {
        assert!(Settings::default().validate().is_ok());
        assert!(Settings::default().with_region("  ").validate().is_err());

        let settings = Settings {
            initial_backoff_ms: 10_000,
            max_backoff_ms: 100,
            ..Settings::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_retry_policy_from_settings() {
        let settings = Settings {
            max_retries: 0,
            ..Settings::default()
        };
        assert_eq!(settings.retry_policy().max_attempts(), 1);
        assert_eq!(Settings::default().retry_policy().max_attempts(), 4);
    }

    #[test]
    fn test_retry_policy_with_max_retries_at_limit() {
        let settings = Settings::from_yaml_str("max_retries: 4294967295\n").unwrap();
        assert_eq!(settings.retry_policy().max_attempts(), u32::MAX);
    }
}
