//! Property-based tests for session aggregation using proptest.
//!
//! Properties verified:
//! - Instruction counts and summed durations match the call sequence
//! - Reported averages equal total / count
//! - Variable access counts match the call sequence
//! - Starting a window always empties every aggregate

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

use std::collections::HashMap;

use chiron_profiling::{MemorySampler, ProfilingError, ProfilingSession, Result};
use proptest::prelude::*;

const KINDS: [&str; 4] = ["ADD", "MOVE", "PEN", "GOTO"];
const VARIABLES: [&str; 3] = [":x", ":y", ":angle"];

/// Sampler that always reports the same number of bytes
struct ConstantSampler(u64);

impl MemorySampler for ConstantSampler {
    fn sample(&self) -> Result<u64> {
        Ok(self.0)
    }
}

fn check(result: std::result::Result<(), ProfilingError>) -> std::result::Result<(), TestCaseError> {
    result.map_err(|e| TestCaseError::fail(e.to_string()))
}

fn pick<'a>(names: &[&'a str], index: usize) -> &'a str {
    names.get(index % names.len()).copied().unwrap_or("ADD")
}

proptest! {
    /// Property: counts equal the number of calls per kind and times equal
    /// the sum of their durations.
    #[test]
    fn prop_instruction_totals_match_calls(
        calls in prop::collection::vec((0usize..4, 0.0f64..5.0), 0..200),
    ) {
        let mut session = ProfilingSession::with_sampler(ConstantSampler(0));
        session.start_profiling();

        let mut expected: HashMap<&str, (u64, f64)> = HashMap::new();
        for (index, secs) in &calls {
            let kind = pick(&KINDS, *index);
            check(session.track_instruction(kind, *secs))?;
            let entry = expected.entry(kind).or_insert((0, 0.0));
            entry.0 += 1;
            entry.1 += secs;
        }

        let data = session.data();
        prop_assert_eq!(data.instruction_counts().len(), expected.len());
        for (kind, (count, total)) in &expected {
            let stats = data.instruction(kind).copied().unwrap_or_default();
            prop_assert_eq!(stats.count(), *count);
            prop_assert!((stats.total_secs() - total).abs() < 1e-9);
            prop_assert!((stats.average_secs() - total / *count as f64).abs() < 1e-9);
        }
    }

    /// Property: variable access counts equal the number of calls per name.
    #[test]
    fn prop_variable_counts_match_calls(
        calls in prop::collection::vec(0usize..3, 0..200),
    ) {
        let mut session = ProfilingSession::with_sampler(ConstantSampler(0));

        let mut expected: HashMap<&str, u64> = HashMap::new();
        for index in &calls {
            let name = pick(&VARIABLES, *index);
            check(session.track_variable_access(name))?;
            *expected.entry(name).or_insert(0) += 1;
        }

        prop_assert_eq!(session.data().variable_accesses().len(), expected.len());
        for (name, count) in &expected {
            prop_assert_eq!(session.data().variable_access_count(name), *count);
        }
    }

    /// Property: listing order is first-seen order, regardless of counts.
    #[test]
    fn prop_report_order_is_first_seen(
        calls in prop::collection::vec(0usize..4, 1..50),
    ) {
        let mut session = ProfilingSession::with_sampler(ConstantSampler(0));
        let mut first_seen: Vec<&str> = Vec::new();
        for index in &calls {
            let kind = pick(&KINDS, *index);
            if !first_seen.contains(&kind) {
                first_seen.push(kind);
            }
            check(session.track_instruction(kind, 0.001))?;
        }

        let listed: Vec<String> = session.data().instruction_counts().into_keys().collect();
        prop_assert_eq!(listed, first_seen.iter().map(ToString::to_string).collect::<Vec<_>>());
    }

    /// Property: start_profiling resets all aggregates regardless of content.
    #[test]
    fn prop_start_resets_everything(
        instructions in prop::collection::vec((0usize..4, 0.0f64..1.0), 0..30),
        variables in prop::collection::vec(0usize..3, 0..30),
        samples in 0usize..10,
    ) {
        let mut session = ProfilingSession::with_sampler(ConstantSampler(8192));
        for (index, secs) in &instructions {
            check(session.track_instruction(pick(&KINDS, *index), *secs))?;
        }
        for index in &variables {
            check(session.track_variable_access(pick(&VARIABLES, *index)))?;
        }
        for _ in 0..samples {
            check(session.track_memory().map(|_| ()))?;
        }

        session.start_profiling();
        prop_assert!(session.data().is_empty());
        prop_assert!(session.data().memory_stats().is_none());
    }

    /// Property: negative durations never enter the aggregates.
    #[test]
    fn prop_negative_durations_rejected(secs in -1.0e6f64..-1.0e-9) {
        let mut session = ProfilingSession::with_sampler(ConstantSampler(0));
        let result = session.track_instruction("ADD", secs);
        let is_invalid_argument = matches!(result, Err(ProfilingError::InvalidArgument { .. }));
        prop_assert!(is_invalid_argument);
        prop_assert!(session.data().is_empty());
    }
}
