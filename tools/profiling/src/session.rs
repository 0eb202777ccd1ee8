//! Profiling session lifecycle and tracking operations

use crate::config::ProfilingConfig;
use crate::error::{ProfilingError, Result};
use crate::report::{render, ReportFormat};
use crate::sampler::{MemorySampler, ProcMemorySampler};
use crate::snapshot::{ProfileData, ProfileSnapshot};
use chrono::{DateTime, Utc};
use std::fmt;
use std::time::{Duration, Instant};
use tracing::{debug, trace, warn};

/// Start of the current measurement window
#[derive(Debug, Clone, Copy)]
struct Window {
    /// Monotonic start, used for elapsed time
    started: Instant,

    /// Wall-clock start, reported in snapshots
    started_at: DateTime<Utc>,
}

/// Accumulates instruction timings, variable accesses and memory samples
/// for one measurement window.
///
/// Tracking calls work before [`start_profiling`](Self::start_profiling);
/// starting a window discards everything recorded so far.
///
/// A session holds unsynchronized mutable state. Callers sharing one across
/// threads must wrap it in their own lock.
///
/// # Examples
///
/// ```
/// # use chiron_profiling::ProfilingSession;
/// # fn main() -> chiron_profiling::Result<()> {
/// let mut session = ProfilingSession::new();
/// session.start_profiling();
/// session.track_instruction("ADD", 0.1)?;
/// session.track_instruction("ADD", 0.3)?;
/// session.track_variable_access(":x")?;
///
/// let snapshot = session.end_profiling()?;
/// assert_eq!(snapshot.instruction_counts().get("ADD"), Some(&2));
/// assert!(session.get_report().contains("Total Time: 0.4000s"));
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ProfilingSession<S = ProcMemorySampler> {
    config: ProfilingConfig,
    sampler: S,
    window: Option<Window>,
    data: ProfileData,
}

impl ProfilingSession<ProcMemorySampler> {
    /// Create a session bound to the current process
    #[must_use]
    pub fn new() -> Self {
        Self::from_config(ProfilingConfig::default())
    }

    /// Create a session bound to the current process, sampling memory under
    /// the configured proc root
    #[must_use]
    pub fn from_config(config: ProfilingConfig) -> Self {
        let sampler = ProcMemorySampler::with_proc_root(config.proc_root(), std::process::id());
        Self::with_config(config, sampler)
    }
}

impl Default for ProfilingSession<ProcMemorySampler> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: MemorySampler> ProfilingSession<S> {
    /// Create a session with the default configuration and a custom sampler
    #[must_use]
    pub fn with_sampler(sampler: S) -> Self {
        Self::with_config(ProfilingConfig::default(), sampler)
    }

    /// Create a session with an explicit configuration and sampler
    #[must_use]
    pub fn with_config(config: ProfilingConfig, sampler: S) -> Self {
        Self {
            config,
            sampler,
            window: None,
            data: ProfileData::new(),
        }
    }

    /// Begin a fresh measurement window.
    ///
    /// Records the start time and clears every aggregate. Calling this again
    /// discards the previous window.
    pub fn start_profiling(&mut self) {
        self.data.clear();
        let window = Window {
            started: Instant::now(),
            started_at: Utc::now(),
        };
        self.window = Some(window);
        debug!(started_at = %window.started_at, "profiling window started");
    }

    /// Close the current window and return a copy of the aggregates.
    ///
    /// The aggregates are left in place, so tracking may continue and the
    /// report still reflects them until the next
    /// [`start_profiling`](Self::start_profiling).
    ///
    /// # Errors
    ///
    /// Returns [`ProfilingError::InvalidState`] if no window was started.
    pub fn end_profiling(&self) -> Result<ProfileSnapshot> {
        let window = self.window.ok_or_else(ProfilingError::not_started)?;
        let total_time_secs = window.started.elapsed().as_secs_f64();

        debug!(
            total_time_secs,
            instruction_kinds = self.data.instructions().count(),
            variables = self.data.variable_accesses().len(),
            memory_samples = self.data.memory_usage().len(),
            "profiling window ended"
        );

        Ok(ProfileSnapshot::new(
            total_time_secs,
            window.started_at,
            self.data.clone(),
        ))
    }

    /// Record one execution of `kind` taking `duration_secs` seconds
    ///
    /// # Errors
    ///
    /// Returns [`ProfilingError::InvalidArgument`] if `kind` is blank or the
    /// duration is negative or not finite.
    pub fn track_instruction(&mut self, kind: &str, duration_secs: f64) -> Result<()> {
        validate_label("kind", kind)?;
        validate_duration(duration_secs)?;

        self.data.record_instruction(kind, duration_secs);
        trace!(kind, duration_secs, "tracked instruction");
        Ok(())
    }

    /// Record one execution of `kind` taking `duration`
    ///
    /// # Errors
    ///
    /// Returns [`ProfilingError::InvalidArgument`] if `kind` is blank.
    pub fn track_instruction_duration(&mut self, kind: &str, duration: Duration) -> Result<()> {
        self.track_instruction(kind, duration.as_secs_f64())
    }

    /// Run `f`, recording its wall time as one execution of `kind`
    ///
    /// # Errors
    ///
    /// Returns [`ProfilingError::InvalidArgument`] if `kind` is blank, in
    /// which case `f` is not run.
    pub fn measure<T>(&mut self, kind: &str, f: impl FnOnce() -> T) -> Result<T> {
        validate_label("kind", kind)?;

        let started = Instant::now();
        let value = f();
        self.track_instruction_duration(kind, started.elapsed())?;
        Ok(value)
    }

    /// Record one access to the variable `name`
    ///
    /// # Errors
    ///
    /// Returns [`ProfilingError::InvalidArgument`] if `name` is blank.
    pub fn track_variable_access(&mut self, name: &str) -> Result<()> {
        validate_label("name", name)?;

        self.data.record_variable_access(name);
        trace!(name, "tracked variable access");
        Ok(())
    }

    /// Sample resident memory and append it to the memory series
    ///
    /// Returns the sampled value in bytes. Nothing is appended on failure.
    ///
    /// # Errors
    ///
    /// Returns [`ProfilingError::CollectorUnavailable`] if the sampler fails.
    pub fn track_memory(&mut self) -> Result<u64> {
        let bytes = self.sampler.sample().inspect_err(|e| {
            warn!(error = %e, "memory sample failed");
        })?;

        self.data.record_memory(bytes);
        trace!(bytes, "tracked memory sample");
        Ok(bytes)
    }

    /// Render a report from the current aggregates
    #[must_use]
    pub fn get_report(&self) -> String {
        render(&self.data, &self.report_format())
    }

    /// Formatting options used by [`get_report`](Self::get_report)
    #[must_use]
    pub fn report_format(&self) -> ReportFormat {
        self.config.report_format()
    }

    /// True once [`start_profiling`](Self::start_profiling) has been called
    #[must_use]
    pub const fn is_started(&self) -> bool {
        self.window.is_some()
    }

    /// Wall-clock start of the current window
    #[must_use]
    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.window.map(|window| window.started_at)
    }

    /// Get the current aggregates
    #[must_use]
    pub const fn data(&self) -> &ProfileData {
        &self.data
    }

    /// Get the configuration
    #[must_use]
    pub const fn config(&self) -> &ProfilingConfig {
        &self.config
    }

    /// Get the memory sampler
    #[must_use]
    pub const fn sampler(&self) -> &S {
        &self.sampler
    }
}

impl<S: MemorySampler> fmt::Display for ProfilingSession<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.get_report())
    }
}

fn validate_label(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        Err(ProfilingError::invalid_argument(field, "must not be empty"))
    } else {
        Ok(())
    }
}

fn validate_duration(duration_secs: f64) -> Result<()> {
    if !duration_secs.is_finite() {
        Err(ProfilingError::invalid_argument(
            "duration",
            format!("must be finite, got {duration_secs}"),
        ))
    } else if duration_secs < 0.0 {
        Err(ProfilingError::invalid_argument(
            "duration",
            format!("must be non-negative, got {duration_secs}"),
        ))
    } else {
        Ok(())
    }
}
