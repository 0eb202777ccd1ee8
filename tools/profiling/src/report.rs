//! Text rendering of profiling data

use crate::config::{DEFAULT_MEMORY_PRECISION, DEFAULT_REPORT_TITLE, DEFAULT_TIME_PRECISION};
use crate::snapshot::ProfileData;

/// Formatting options for [`render`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportFormat {
    title: String,
    time_precision: usize,
    memory_precision: usize,
}

impl Default for ReportFormat {
    fn default() -> Self {
        Self::new(
            DEFAULT_REPORT_TITLE.to_string(),
            DEFAULT_TIME_PRECISION,
            DEFAULT_MEMORY_PRECISION,
        )
    }
}

impl ReportFormat {
    /// Create a report format
    #[must_use]
    pub const fn new(title: String, time_precision: usize, memory_precision: usize) -> Self {
        Self {
            title,
            time_precision,
            memory_precision,
        }
    }

    /// Get the title
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
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
}

/// Render `data` as a human-readable report.
///
/// Sections appear in a fixed order: instruction statistics, variable
/// access statistics, then memory statistics when at least one sample was
/// taken. Lines are joined with `\n` with no trailing newline.
///
/// # Examples
///
/// ```
/// # use chiron_profiling::{render, ProfileData, ReportFormat};
/// let report = render(&ProfileData::new(), &ReportFormat::default());
/// assert_eq!(
///     report,
///     "=== Chiron Profiling Report ===\n\nInstruction Statistics:\n\nVariable Access Statistics:"
/// );
/// ```
#[must_use]
pub fn render(data: &ProfileData, format: &ReportFormat) -> String {
    let time_prec = format.time_precision;
    let mem_prec = format.memory_precision;

    let mut lines = vec![
        format!("=== {} ===", format.title),
        String::new(),
        "Instruction Statistics:".to_string(),
    ];

    for (kind, stats) in data.instructions() {
        lines.push(format!("  {kind}:"));
        lines.push(format!("    Count: {}", stats.count()));
        lines.push(format!(
            "    Total Time: {:.time_prec$}s",
            stats.total_secs()
        ));
        lines.push(format!(
            "    Average Time: {:.time_prec$}s",
            stats.average_secs()
        ));
    }

    lines.push(String::new());
    lines.push("Variable Access Statistics:".to_string());
    lines.extend(
        data.variable_accesses()
            .iter()
            .map(|(name, count)| format!("  {name}: {count} accesses")),
    );

    if let Some(memory) = data.memory_stats() {
        lines.push(String::new());
        lines.push("Memory Statistics:".to_string());
        lines.push(format!("  Peak Memory: {:.mem_prec$} MB", memory.peak_mib()));
        lines.push(format!(
            "  Average Memory: {:.mem_prec$} MB",
            memory.mean_mib()
        ));
    }

    lines.join("\n")
}
