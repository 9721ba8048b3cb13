//! Trace driver: threads the clock through one expansion per record.

use thiserror::Error;
use tracing::{debug, warn};

use crate::diag::RunStats;
use crate::expand::{expand, DispatchTables};
use crate::fault::DispatchError;
use crate::operation::TraceRecord;
use crate::split::ServiceSplitter;
use crate::timeline::Timeline;
use crate::timing::TimingProfile;

/// Fatal failure attributed to one trace line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("line {line}: {source}")]
pub struct TraceError {
    /// 1-based trace line of the failing record.
    pub line: usize,
    /// Expansion failure.
    pub source: DispatchError,
}

/// Owns the clock and timeline for one run.
#[derive(Debug)]
pub struct TraceDriver<S> {
    tables: DispatchTables,
    timing: TimingProfile,
    splitter: S,
    clock: u64,
    timeline: Timeline,
    stats: RunStats,
}

impl<S: ServiceSplitter> TraceDriver<S> {
    /// Creates a driver at clock 0 with an empty timeline.
    pub fn new(tables: DispatchTables, timing: TimingProfile, splitter: S) -> Self {
        Self {
            tables,
            timing,
            splitter,
            clock: 0,
            timeline: Timeline::new(),
            stats: RunStats::new(),
        }
    }

    /// Expands one record and appends its steps.
    ///
    /// # Errors
    ///
    /// Returns [`TraceError`] when expansion fails. The clock and timeline
    /// are left exactly as they were before the call.
    pub fn feed(&mut self, record: &TraceRecord) -> Result<(), TraceError> {
        let expansion = expand(
            &record.operation,
            self.clock,
            &self.tables,
            &self.timing,
            &mut self.splitter,
        )
        .map_err(|source| TraceError {
            line: record.line,
            source,
        })?;

        debug!(
            line = record.line,
            operation = %record.operation,
            start = self.clock,
            end = expansion.clock,
            steps = expansion.steps.len(),
            "expanded record"
        );

        self.stats
            .record_expansion(record.operation.kind(), self.clock, &expansion);
        self.clock = expansion.clock;
        self.timeline.extend(expansion.steps);
        Ok(())
    }

    /// Notes a trace line that produced no record. The clock does not move.
    pub fn skip(&mut self, line: usize, reason: &dyn std::fmt::Display) {
        warn!(line, %reason, "skipping trace line");
        self.stats.record_skipped();
    }

    /// Feeds every record in order, stopping at the first failure.
    ///
    /// # Errors
    ///
    /// Returns the first [`TraceError`]; records after it are not processed.
    pub fn run<'a>(
        &mut self,
        records: impl IntoIterator<Item = &'a TraceRecord>,
    ) -> Result<(), TraceError> {
        records.into_iter().try_for_each(|record| self.feed(record))
    }

    /// Current clock value.
    #[must_use]
    pub const fn clock(&self) -> u64 {
        self.clock
    }

    /// Timeline built so far.
    #[must_use]
    pub const fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    /// Diagnostics gathered so far.
    #[must_use]
    pub const fn stats(&self) -> &RunStats {
        &self.stats
    }

    /// Lookup tables in use.
    #[must_use]
    pub const fn tables(&self) -> &DispatchTables {
        &self.tables
    }

    /// Ends the run, returning the timeline and diagnostics.
    #[must_use]
    pub fn finish(self) -> (Timeline, RunStats) {
        (self.timeline, self.stats)
    }
}
