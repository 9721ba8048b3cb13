//! Ordered micro-step tables for each operation kind.
//!
//! The expander walks these tables; it has no per-kind step logic of its own.

use crate::operation::OperationKind;
use crate::split::ServiceSplit;
use crate::timing::{StepCostKind, TimingProfile};
use crate::vector::VectorEntry;

/// Where a step's duration comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepDuration {
    /// Fixed cost from the [`TimingProfile`].
    Fixed(StepCostKind),
    /// CPU burst operand.
    Burst,
    /// ISR share of the split service time.
    IsrShare,
    /// Transfer share of the split service time.
    TransferShare,
    /// Whole, unsplit device service time.
    DeviceService,
}

/// Step description written to the timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepLabel {
    /// `CPU execution`.
    CpuExecution,
    /// `check priority of interrupt`.
    CheckPriority,
    /// `check if masked`.
    CheckMasked,
    /// `switch to kernel mode`.
    SwitchToKernel,
    /// `context saved`.
    ContextSaved,
    /// `find vector <n> in memory position 0x<addr>`.
    FindVector,
    /// `load address 0x<target> into the PC`.
    LoadAddress,
    /// `SYSCALL: run the ISR`.
    SyscallIsr,
    /// `transfer data`.
    TransferData,
    /// `END_IO`.
    EndIo,
    /// `context returned`.
    ContextReturned,
    /// `switch to user mode`.
    SwitchToUser,
    /// `IRET`.
    Iret,
}

/// One entry of a micro-step table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StepTemplate {
    /// Duration source.
    pub duration: StepDuration,
    /// Label to render.
    pub label: StepLabel,
}

const fn step(duration: StepDuration, label: StepLabel) -> StepTemplate {
    StepTemplate { duration, label }
}

const fn fixed(kind: StepCostKind, label: StepLabel) -> StepTemplate {
    step(StepDuration::Fixed(kind), label)
}

/// CPU burst: a single step.
pub const CPU_SEQUENCE: &[StepTemplate] = &[step(StepDuration::Burst, StepLabel::CpuExecution)];

/// System call dispatch.
pub const SYSCALL_SEQUENCE: &[StepTemplate] = &[
    fixed(StepCostKind::SwitchMode, StepLabel::SwitchToKernel),
    fixed(StepCostKind::ContextSave, StepLabel::ContextSaved),
    fixed(StepCostKind::FindVector, StepLabel::FindVector),
    fixed(StepCostKind::LoadAddress, StepLabel::LoadAddress),
    step(StepDuration::IsrShare, StepLabel::SyscallIsr),
    step(StepDuration::TransferShare, StepLabel::TransferData),
    fixed(StepCostKind::ContextSave, StepLabel::ContextReturned),
    fixed(StepCostKind::SwitchMode, StepLabel::SwitchToUser),
    fixed(StepCostKind::Iret, StepLabel::Iret),
];

/// End-of-I/O interrupt dispatch.
pub const END_IO_SEQUENCE: &[StepTemplate] = &[
    fixed(StepCostKind::PriorityCheck, StepLabel::CheckPriority),
    fixed(StepCostKind::MaskCheck, StepLabel::CheckMasked),
    fixed(StepCostKind::SwitchMode, StepLabel::SwitchToKernel),
    fixed(StepCostKind::ContextSave, StepLabel::ContextSaved),
    fixed(StepCostKind::FindVector, StepLabel::FindVector),
    fixed(StepCostKind::LoadAddress, StepLabel::LoadAddress),
    step(StepDuration::DeviceService, StepLabel::EndIo),
    fixed(StepCostKind::ContextSave, StepLabel::ContextReturned),
    fixed(StepCostKind::SwitchMode, StepLabel::SwitchToUser),
    fixed(StepCostKind::Iret, StepLabel::Iret),
];

/// Returns the micro-step table for an operation kind.
#[must_use]
pub const fn sequence_for(kind: OperationKind) -> &'static [StepTemplate] {
    match kind {
        OperationKind::Cpu => CPU_SEQUENCE,
        OperationKind::Syscall => SYSCALL_SEQUENCE,
        OperationKind::EndIo => END_IO_SEQUENCE,
    }
}

/// Values a template needs to become a concrete step.
///
/// Fields that an operation kind never references stay at their defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StepOperands {
    /// CPU burst ticks.
    pub burst: u64,
    /// Resolved vector for SYSCALL and END_IO.
    pub vector: VectorEntry,
    /// Device base service time.
    pub service: u64,
    /// ISR/transfer split of `service`.
    pub split: ServiceSplit,
}

impl StepDuration {
    /// Resolves the duration in ticks.
    #[must_use]
    pub const fn ticks(self, timing: &TimingProfile, operands: &StepOperands) -> u64 {
        match self {
            Self::Fixed(kind) => timing.cost(kind),
            Self::Burst => operands.burst,
            Self::IsrShare => operands.split.isr(),
            Self::TransferShare => operands.split.transfer(),
            Self::DeviceService => operands.service,
        }
    }
}

impl StepLabel {
    /// Renders the label text.
    #[must_use]
    pub fn render(self, operands: &StepOperands) -> String {
        match self {
            Self::CpuExecution => "CPU execution".to_string(),
            Self::CheckPriority => "check priority of interrupt".to_string(),
            Self::CheckMasked => "check if masked".to_string(),
            Self::SwitchToKernel => "switch to kernel mode".to_string(),
            Self::ContextSaved => "context saved".to_string(),
            Self::FindVector => format!(
                "find vector {} in memory position 0x{:04X}",
                operands.vector.call_number, operands.vector.memory_address
            ),
            Self::LoadAddress => format!(
                "load address 0x{:04X} into the PC",
                operands.vector.target_address
            ),
            Self::SyscallIsr => "SYSCALL: run the ISR".to_string(),
            Self::TransferData => "transfer data".to_string(),
            Self::EndIo => "END_IO".to_string(),
            Self::ContextReturned => "context returned".to_string(),
            Self::SwitchToUser => "switch to user mode".to_string(),
            Self::Iret => "IRET".to_string(),
        }
    }
}
