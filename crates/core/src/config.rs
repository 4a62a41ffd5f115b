//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and passed into the core. Nothing in the
//! core reads environment variables itself, which keeps tests independent of the process
//! environment.

use crate::constants::DEFAULT_REPORT_DIR;
use crate::{TiltError, TiltResult};
use std::path::{Path, PathBuf};

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    report_dir: PathBuf,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    ///
    /// # Errors
    ///
    /// Returns `TiltError::InvalidInput` if `report_dir` is an empty path.
    pub fn new(report_dir: PathBuf) -> TiltResult<Self> {
        if report_dir.as_os_str().is_empty() {
            return Err(TiltError::InvalidInput(
                "report_dir cannot be empty".into(),
            ));
        }
        Ok(Self { report_dir })
    }

    /// Directory where written reports are placed.
    pub fn report_dir(&self) -> &Path {
        &self.report_dir
    }
}

/// Resolve the report directory from an optional environment value.
///
/// `None` or a blank value falls back to [`DEFAULT_REPORT_DIR`].
pub fn report_dir_from_env_value(value: Option<String>) -> PathBuf {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_REPORT_DIR))
}
