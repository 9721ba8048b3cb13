//! Run diagnostics gathered while a trace is driven.

use std::fmt;

use crate::expand::Expansion;
use crate::operation::OperationKind;

/// Counters for one run. All counters saturate instead of wrapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct RunStats {
    /// Expanded CPU records.
    pub cpu_records: u64,
    /// Expanded SYSCALL records.
    pub syscall_records: u64,
    /// Expanded END_IO records.
    pub end_io_records: u64,
    /// Trace lines skipped as malformed or unrecognized.
    pub skipped_lines: u64,
    /// Ticks attributed to SYSCALL ISR execution.
    pub isr_ticks: u64,
    /// Ticks attributed to SYSCALL data transfer.
    pub transfer_ticks: u64,
    /// Ticks attributed to END_IO device service.
    pub end_io_service_ticks: u64,
    /// Ticks spent in CPU bursts.
    pub cpu_ticks: u64,
    /// Timeline steps emitted.
    pub steps: u64,
}

impl RunStats {
    /// Creates zeroed counters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one successful expansion of `kind` that started at `clock`.
    pub fn record_expansion(&mut self, kind: OperationKind, clock: u64, expansion: &Expansion) {
        let advance = expansion.clock.saturating_sub(clock);
        match kind {
            OperationKind::Cpu => {
                self.cpu_records = self.cpu_records.saturating_add(1);
                self.cpu_ticks = self.cpu_ticks.saturating_add(advance);
            }
            OperationKind::Syscall => {
                self.syscall_records = self.syscall_records.saturating_add(1);
                if let Some(split) = expansion.split {
                    self.isr_ticks = self.isr_ticks.saturating_add(split.isr());
                    self.transfer_ticks = self.transfer_ticks.saturating_add(split.transfer());
                }
            }
            OperationKind::EndIo => {
                self.end_io_records = self.end_io_records.saturating_add(1);
                if let Some(service) = expansion.service {
                    self.end_io_service_ticks = self.end_io_service_ticks.saturating_add(service);
                }
            }
        }
        let emitted = u64::try_from(expansion.steps.len()).unwrap_or(u64::MAX);
        self.steps = self.steps.saturating_add(emitted);
    }

    /// Records a skipped trace line.
    #[allow(clippy::missing_const_for_fn)]
    pub fn record_skipped(&mut self) {
        self.skipped_lines = self.skipped_lines.saturating_add(1);
    }

    /// Expanded records of every kind.
    #[must_use]
    pub const fn records(&self) -> u64 {
        self.cpu_records
            .saturating_add(self.syscall_records)
            .saturating_add(self.end_io_records)
    }
}

impl fmt::Display for RunStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "records: {} (CPU {}, SYSCALL {}, END_IO {})",
            self.records(),
            self.cpu_records,
            self.syscall_records,
            self.end_io_records
        )?;
        writeln!(f, "skipped lines: {}", self.skipped_lines)?;
        writeln!(f, "steps: {}", self.steps)?;
        writeln!(f, "cpu ticks: {}", self.cpu_ticks)?;
        writeln!(
            f,
            "syscall service ticks: {} (isr {}, transfer {})",
            self.isr_ticks.saturating_add(self.transfer_ticks),
            self.isr_ticks,
            self.transfer_ticks
        )?;
        write!(f, "end_io service ticks: {}", self.end_io_service_ticks)
    }
}

#[cfg(test)]
mod tests {
    use super::RunStats;
    use crate::expand::Expansion;
    use crate::operation::OperationKind;
    use crate::split::ServiceSplit;
    use crate::timeline::TimelineStep;

    fn expansion(clock: u64, service: Option<u64>, split: Option<ServiceSplit>) -> Expansion {
        Expansion {
            steps: vec![TimelineStep::new(0, clock, "step")],
            clock,
            service,
            split,
        }
    }

    #[test]
    fn counts_records_by_kind() {
        let mut stats = RunStats::new();
        stats.record_expansion(OperationKind::Cpu, 0, &expansion(500, None, None));
        stats.record_expansion(
            OperationKind::Syscall,
            500,
            &expansion(700, Some(110), Some(ServiceSplit::clamped(110, 60))),
        );
        stats.record_expansion(OperationKind::EndIo, 700, &expansion(767, Some(40), None));
        stats.record_skipped();

        assert_eq!(stats.records(), 3);
        assert_eq!(stats.cpu_ticks, 500);
        assert_eq!(stats.isr_ticks, 60);
        assert_eq!(stats.transfer_ticks, 50);
        assert_eq!(stats.end_io_service_ticks, 40);
        assert_eq!(stats.skipped_lines, 1);
        assert_eq!(stats.steps, 3);
    }

    #[test]
    fn counters_saturate() {
        let mut stats = RunStats {
            skipped_lines: u64::MAX,
            ..RunStats::default()
        };
        stats.record_skipped();
        assert_eq!(stats.skipped_lines, u64::MAX);
    }

    #[test]
    fn display_lists_every_counter() {
        let stats = RunStats {
            cpu_records: 2,
            syscall_records: 1,
            isr_ticks: 70,
            transfer_ticks: 40,
            ..RunStats::default()
        };
        let text = stats.to_string();
        assert!(text.starts_with("records: 3 (CPU 2, SYSCALL 1, END_IO 0)\n"));
        assert!(text.contains("syscall service ticks: 110 (isr 70, transfer 40)"));
        assert!(text.ends_with("end_io service ticks: 0"));
    }
}
