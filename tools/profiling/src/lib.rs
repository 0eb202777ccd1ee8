//! In-process profiler for the Chiron interpreter.
//!
//! An execution engine drives a [`ProfilingSession`] while it runs a
//! program: it reports each executed instruction with its duration, each
//! variable access, and asks for memory samples at points of interest. The
//! session aggregates these signals and renders a text report.
//!
//! - **Session**: lifecycle (`start_profiling` / `end_profiling`) and tracking calls
//! - **Sampler**: resident memory source, `/proc` backed by default, injectable for tests
//! - **Snapshot**: insertion-ordered aggregates and derived statistics
//! - **Report**: pure rendering of aggregates into text
//! - **Config**: report title, precisions, proc root (TOML loadable)
//!
//! The library emits `tracing` events and never installs a subscriber.
//!
//! # Example
//!
//! ```
//! use chiron_profiling::{MemorySampler, ProfilingSession, Result};
//!
//! struct FixedSampler(u64);
//!
//! impl MemorySampler for FixedSampler {
//!     fn sample(&self) -> Result<u64> {
//!         Ok(self.0)
//!     }
//! }
//!
//! # fn main() -> Result<()> {
//! let mut session = ProfilingSession::with_sampler(FixedSampler(2 * 1024 * 1024));
//! session.start_profiling();
//! session.track_instruction("MOVE", 0.002)?;
//! session.track_variable_access(":angle")?;
//! session.track_memory()?;
//!
//! let snapshot = session.end_profiling()?;
//! assert_eq!(snapshot.memory_usage(), &[2 * 1024 * 1024]);
//! assert!(session.get_report().contains("Peak Memory: 2.00 MB"));
//! # Ok(())
//! # }
//! ```

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod config;
pub mod error;
pub mod report;
pub mod sampler;
pub mod session;
pub mod snapshot;

pub use config::ProfilingConfig;
pub use error::{ProfilingError, Result};
pub use report::{render, ReportFormat};
pub use sampler::{MemorySampler, ProcMemorySampler};
pub use session::ProfilingSession;
pub use snapshot::{InstructionStats, MemoryStats, ProfileData, ProfileSnapshot};
