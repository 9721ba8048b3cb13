use std::fmt;
use std::io;

/// One timed micro-step.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct TimelineStep {
    /// Clock value when the step begins.
    pub start: u64,
    /// Ticks the step takes.
    pub duration: u64,
    /// Human-readable description.
    pub label: String,
}

impl TimelineStep {
    /// Creates a step.
    #[must_use]
    pub fn new(start: u64, duration: u64, label: impl Into<String>) -> Self {
        Self {
            start,
            duration,
            label: label.into(),
        }
    }

    /// Clock value when the step ends.
    #[must_use]
    pub const fn end(&self) -> u64 {
        self.start.saturating_add(self.duration)
    }
}

/// Output line format: `start, duration, label`.
impl fmt::Display for TimelineStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}, {}", self.start, self.duration, self.label)
    }
}

/// Append-only, gap-free sequence of steps.
///
/// Every appended step starts where the previous one ended; the first step
/// may start anywhere.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Timeline {
    steps: Vec<TimelineStep>,
}

impl Timeline {
    /// Creates an empty timeline.
    #[must_use]
    pub const fn new() -> Self {
        Self { steps: Vec::new() }
    }

    /// Appends steps produced by one expansion.
    pub fn extend(&mut self, steps: impl IntoIterator<Item = TimelineStep>) {
        for step in steps {
            debug_assert!(
                self.steps.last().map_or(true, |last| last.end() == step.start),
                "timeline step at {} does not continue from {}",
                step.start,
                self.end_time()
            );
            self.steps.push(step);
        }
    }

    /// Steps in emission order.
    #[must_use]
    pub fn steps(&self) -> &[TimelineStep] {
        &self.steps
    }

    /// Number of steps.
    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Returns `true` when no step has been appended.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// End of the last step, or 0 for an empty timeline.
    #[must_use]
    pub fn end_time(&self) -> u64 {
        self.steps.last().map_or(0, TimelineStep::end)
    }

    /// Writes one line per step.
    ///
    /// # Errors
    ///
    /// Propagates any error from `writer`.
    pub fn write_to<W: io::Write>(&self, mut writer: W) -> io::Result<()> {
        for step in &self.steps {
            writeln!(writer, "{step}")?;
        }
        writer.flush()
    }

    /// Renders the whole timeline as output text.
    #[must_use]
    pub fn render(&self) -> String {
        self.steps.iter().map(|step| format!("{step}\n")).collect()
    }

    /// Consumes the timeline, returning its steps.
    #[must_use]
    pub fn into_steps(self) -> Vec<TimelineStep> {
        self.steps
    }
}
