//! Expansion of one operation into timed micro-steps.

use crate::delay::DeviceDelayTable;
use crate::fault::DispatchError;
use crate::operation::Operation;
use crate::sequence::{sequence_for, StepOperands};
use crate::split::{ServiceSplit, ServiceSplitter};
use crate::timeline::TimelineStep;
use crate::timing::TimingProfile;
use crate::vector::VectorDirectory;

/// Lookup tables consulted during expansion, built once per run.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DispatchTables {
    /// Call number to vector.
    pub vectors: VectorDirectory,
    /// Device number to base service time.
    pub delays: DeviceDelayTable,
}

impl DispatchTables {
    /// Bundles the two tables.
    #[must_use]
    pub const fn new(vectors: VectorDirectory, delays: DeviceDelayTable) -> Self {
        Self { vectors, delays }
    }
}

/// Result of expanding one operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expansion {
    /// Steps in emission order, starting at the input clock.
    pub steps: Vec<TimelineStep>,
    /// Clock after the last step.
    pub clock: u64,
    /// Base service time charged, for SYSCALL and END_IO.
    pub service: Option<u64>,
    /// ISR/transfer split, for SYSCALL only.
    pub split: Option<ServiceSplit>,
}

/// Expands `operation` starting at `clock`.
///
/// All lookups happen before any step is produced and the splitter is only
/// consulted once they succeed, so a failed expansion emits nothing and
/// leaves the splitter's sequence untouched.
///
/// # Errors
///
/// Returns [`DispatchError::OutOfRange`] for an unbuilt call or device number
/// and [`DispatchError::ClockOverflow`] if a step would overflow the clock.
pub fn expand<S: ServiceSplitter + ?Sized>(
    operation: &Operation,
    clock: u64,
    tables: &DispatchTables,
    timing: &TimingProfile,
    splitter: &mut S,
) -> Result<Expansion, DispatchError> {
    let (operands, service, split) = match *operation {
        Operation::Cpu { burst } => (
            StepOperands {
                burst,
                ..StepOperands::default()
            },
            None,
            None,
        ),
        Operation::Syscall { call } => {
            let vector = tables.vectors.lookup(call)?;
            let service = tables.delays.lookup(call)?;
            let split = splitter.split(service);
            (
                StepOperands {
                    vector,
                    service,
                    split,
                    ..StepOperands::default()
                },
                Some(service),
                Some(split),
            )
        }
        Operation::EndIo { device } => {
            let vector = tables.vectors.lookup(device)?;
            let service = tables.delays.lookup(device)?;
            (
                StepOperands {
                    vector,
                    service,
                    ..StepOperands::default()
                },
                Some(service),
                None,
            )
        }
    };

    let sequence = sequence_for(operation.kind());
    let mut steps = Vec::with_capacity(sequence.len());
    let mut now = clock;
    for template in sequence {
        let duration = template.duration.ticks(timing, &operands);
        let end = now
            .checked_add(duration)
            .ok_or(DispatchError::ClockOverflow {
                clock: now,
                duration,
            })?;
        steps.push(TimelineStep::new(now, duration, template.label.render(&operands)));
        now = end;
    }

    Ok(Expansion {
        steps,
        clock: now,
        service,
        split,
    })
}
