//! Interrupt dispatch timeline engine.
//!
//! Expands CPU, SYSCALL and END_IO trace records into the timed micro-steps
//! of an interrupt dispatch and accumulates them into a gap-free timeline.

/// Error taxonomy for table building and record expansion.
pub mod fault;
pub use fault::{ConfigMismatch, DispatchError, ErrorClass, TableKind};

/// Fixed step costs and named timing presets.
pub mod timing;
pub use timing::{StepCostKind, TimingPreset, TimingProfile, UnknownNameError, STEP_COST_KINDS};

/// Vector directory built from the vector source.
pub mod vector;
pub use vector::{VectorDirectory, VectorEntry, VECTOR_MEMORY_ADDRESSES, VECTOR_SLOT_COUNT};

/// Device service-time table.
pub mod delay;
pub use delay::DeviceDelayTable;

/// ISR/transfer split policies.
pub mod split;
pub use split::{
    HalvedSplitter, RandomizedSplitter, ServiceSplit, ServiceSplitter, SplitStrategy,
};

/// Trace operation records.
pub mod operation;
pub use operation::{Operation, OperationKind, TraceRecord};

/// Per-kind micro-step tables.
pub mod sequence;
pub use sequence::{
    sequence_for, StepDuration, StepLabel, StepOperands, StepTemplate, CPU_SEQUENCE,
    END_IO_SEQUENCE, SYSCALL_SEQUENCE,
};

/// Timed step output.
pub mod timeline;
pub use timeline::{Timeline, TimelineStep};

/// Single-record expansion.
pub mod expand;
pub use expand::{expand, DispatchTables, Expansion};

/// Run diagnostics counters.
pub mod diag;
pub use diag::RunStats;

/// Record-by-record trace driver.
pub mod driver;
pub use driver::{TraceDriver, TraceError};

#[cfg(test)]
use proptest as _;
