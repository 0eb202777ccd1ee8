//! Configuration for profiling sessions

use crate::error::{ProfilingError, Result};
use crate::report::ReportFormat;
use crate::sampler::DEFAULT_PROC_ROOT;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Title printed in the report header
pub const DEFAULT_REPORT_TITLE: &str = "Chiron Profiling Report";

/// Decimal places used for instruction times
pub const DEFAULT_TIME_PRECISION: usize = 4;

/// Decimal places used for memory figures
pub const DEFAULT_MEMORY_PRECISION: usize = 2;

/// Upper bound on either precision (nanosecond resolution)
const MAX_PRECISION: usize = 9;

/// Configuration for a profiling session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProfilingConfig {
    /// Title printed between the `===` markers of the report
    report_title: String,

    /// Decimal places for total and average instruction times
    time_precision: usize,

    /// Decimal places for peak and average memory
    memory_precision: usize,

    /// Mount point of the proc filesystem used for memory sampling
    proc_root: PathBuf,
}

impl Default for ProfilingConfig {
    fn default() -> Self {
        Self {
            report_title: DEFAULT_REPORT_TITLE.to_string(),
            time_precision: DEFAULT_TIME_PRECISION,
            memory_precision: DEFAULT_MEMORY_PRECISION,
            proc_root: PathBuf::from(DEFAULT_PROC_ROOT),
        }
    }
}

impl ProfilingConfig {
    /// Create a new profiling configuration with validation
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - The report title is blank
    /// - Either precision exceeds 9 decimal places
    /// - The proc root is empty
    ///
    /// # Examples
    ///
    /// ```
    /// # use chiron_profiling::ProfilingConfig;
    /// let config = ProfilingConfig::new("Loop Benchmark", 6, 1, "/proc");
    /// assert!(config.is_ok());
    /// ```
    pub fn new(
        report_title: impl Into<String>,
        time_precision: usize,
        memory_precision: usize,
        proc_root: impl Into<PathBuf>,
    ) -> Result<Self> {
        let config = Self {
            report_title: report_title.into(),
            time_precision,
            memory_precision,
            proc_root: proc_root.into(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a TOML document
    ///
    /// Missing keys fall back to their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ProfilingError::InvalidConfig`] if the document is not valid
    /// TOML, contains unknown keys, or fails validation.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: Self = toml::from_str(source)
            .map_err(|e| ProfilingError::InvalidConfig(format!("failed to parse TOML: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Replace the report title
    ///
    /// # Errors
    ///
    /// Returns error if the title is blank
    pub fn with_report_title(mut self, title: impl Into<String>) -> Result<Self> {
        self.report_title = title.into();
        Self::validate_title(&self.report_title)?;
        Ok(self)
    }

    /// Replace the proc root used for memory sampling
    ///
    /// # Errors
    ///
    /// Returns error if the path is empty
    pub fn with_proc_root(mut self, proc_root: impl Into<PathBuf>) -> Result<Self> {
        self.proc_root = proc_root.into();
        Self::validate_proc_root(&self.proc_root)?;
        Ok(self)
    }

    /// Get the report title
    #[must_use]
    pub fn report_title(&self) -> &str {
        &self.report_title
    }

    /// Get the time precision
    #[must_use]
    pub const fn time_precision(&self) -> usize {
        self.time_precision
    }

    /// Get the memory precision
    #[must_use]
    pub const fn memory_precision(&self) -> usize {
        self.memory_precision
    }

    /// Get the proc root
    #[must_use]
    pub fn proc_root(&self) -> &Path {
        &self.proc_root
    }

    /// Formatting options derived from this configuration
    #[must_use]
    pub fn report_format(&self) -> ReportFormat {
        ReportFormat::new(
            self.report_title.clone(),
            self.time_precision,
            self.memory_precision,
        )
    }

    fn validate(&self) -> Result<()> {
        Self::validate_title(&self.report_title)?;
        Self::validate_precision("time_precision", self.time_precision)?;
        Self::validate_precision("memory_precision", self.memory_precision)?;
        Self::validate_proc_root(&self.proc_root)
    }

    fn validate_title(title: &str) -> Result<()> {
        if title.trim().is_empty() {
            Err(ProfilingError::InvalidConfig(
                "report title cannot be empty".to_string(),
            ))
        } else {
            Ok(())
        }
    }

    fn validate_precision(name: &str, precision: usize) -> Result<()> {
        if precision > MAX_PRECISION {
            Err(ProfilingError::InvalidConfig(format!(
                "{name} must be at most {MAX_PRECISION}, got {precision}"
            )))
        } else {
            Ok(())
        }
    }

    fn validate_proc_root(path: &Path) -> Result<()> {
        if path.as_os_str().is_empty() {
            Err(ProfilingError::InvalidConfig(
                "proc root cannot be empty".to_string(),
            ))
        } else {
            Ok(())
        }
    }
}
