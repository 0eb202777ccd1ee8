//! Resident memory sampling

use crate::error::{ProfilingError, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Default mount point of the proc filesystem
pub const DEFAULT_PROC_ROOT: &str = "/proc";

/// Source of resident memory readings for a process.
///
/// Implementations report the resident set size in bytes. A session holds
/// exactly one sampler, bound to one process when it is constructed.
pub trait MemorySampler {
    /// Query the current resident set size in bytes
    ///
    /// # Errors
    ///
    /// Returns [`ProfilingError::CollectorUnavailable`] if the process
    /// cannot be queried.
    fn sample(&self) -> Result<u64>;
}

impl<S: MemorySampler + ?Sized> MemorySampler for &S {
    fn sample(&self) -> Result<u64> {
        (**self).sample()
    }
}

impl<S: MemorySampler + ?Sized> MemorySampler for Box<S> {
    fn sample(&self) -> Result<u64> {
        (**self).sample()
    }
}

/// Samples `VmRSS` from `/proc/[pid]/status`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcMemorySampler {
    /// Process ID being sampled
    pid: u32,

    /// Resolved path of the status file
    status_path: PathBuf,
}

impl ProcMemorySampler {
    /// Bind a sampler to the current process
    #[must_use]
    pub fn current_process() -> Self {
        Self::for_pid(std::process::id())
    }

    /// Bind a sampler to `pid` under the default proc root
    #[must_use]
    pub fn for_pid(pid: u32) -> Self {
        Self::with_proc_root(DEFAULT_PROC_ROOT, pid)
    }

    /// Bind a sampler to `pid` under an arbitrary proc root
    ///
    /// # Examples
    ///
    /// ```
    /// # use chiron_profiling::ProcMemorySampler;
    /// let sampler = ProcMemorySampler::with_proc_root("/proc", 1);
    /// assert_eq!(sampler.status_path().to_str(), Some("/proc/1/status"));
    /// ```
    #[must_use]
    pub fn with_proc_root(proc_root: impl AsRef<Path>, pid: u32) -> Self {
        let status_path = proc_root.as_ref().join(pid.to_string()).join("status");
        tracing::debug!(pid, path = %status_path.display(), "bound memory sampler");
        Self { pid, status_path }
    }

    /// Get the process ID
    #[must_use]
    pub const fn pid(&self) -> u32 {
        self.pid
    }

    /// Get the status file path
    #[must_use]
    pub fn status_path(&self) -> &Path {
        &self.status_path
    }

    /// Extract `VmRSS` in kilobytes from the contents of a status file
    fn rss_kb_from_status(&self, content: &str) -> Result<u64> {
        content
            .lines()
            .find_map(|line| parse_vm_rss_line(line).transpose())
            .ok_or_else(|| ProfilingError::collector_unavailable(self.pid, "VmRSS not found"))?
            .map_err(|e| ProfilingError::collector_unavailable(self.pid, e.to_string()))
    }
}

impl MemorySampler for ProcMemorySampler {
    fn sample(&self) -> Result<u64> {
        let content = fs::read_to_string(&self.status_path).map_err(|e| {
            ProfilingError::collector_unavailable(
                self.pid,
                format!("failed to read {}: {e}", self.status_path.display()),
            )
        })?;

        let rss_kb = self.rss_kb_from_status(&content)?;

        rss_kb.checked_mul(1024).ok_or_else(|| {
            ProfilingError::collector_unavailable(self.pid, format!("VmRSS overflow: {rss_kb} kB"))
        })
    }
}

/// Parse a `VmRSS` status line
/// Format: "`VmRSS`:    12345 kB"
///
/// Returns None for any other field
fn parse_vm_rss_line(line: &str) -> Result<Option<u64>> {
    if !line.starts_with("VmRSS:") {
        return Ok(None);
    }

    line.split_whitespace()
        .nth(1)
        .ok_or_else(|| ProfilingError::MetricsParseError(format!("missing value in line: {line}")))?
        .parse::<u64>()
        .map(Some)
        .map_err(|e| {
            ProfilingError::MetricsParseError(format!("failed to parse value in '{line}': {e}"))
        })
}
