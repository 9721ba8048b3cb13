use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Dispatch micro-steps that have fixed tick costs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum StepCostKind {
    /// User/kernel mode switch, paid on entry and on exit.
    SwitchMode,
    /// Context save, also charged for the matching restore.
    ContextSave,
    /// Vector lookup in the vector directory.
    FindVector,
    /// Loading the ISR address into the PC.
    LoadAddress,
    /// Interrupt priority check before END_IO dispatch.
    PriorityCheck,
    /// Interrupt mask check before END_IO dispatch.
    MaskCheck,
    /// Return from interrupt.
    Iret,
}

/// Every fixed-cost kind, in dispatch order.
pub const STEP_COST_KINDS: [StepCostKind; 7] = [
    StepCostKind::PriorityCheck,
    StepCostKind::MaskCheck,
    StepCostKind::SwitchMode,
    StepCostKind::ContextSave,
    StepCostKind::FindVector,
    StepCostKind::LoadAddress,
    StepCostKind::Iret,
];

/// Tick costs for every fixed-duration dispatch step.
///
/// Revisions of the dispatch model differ only in these numbers, so each one
/// is reproduced by picking a [`TimingPreset`] or overriding fields here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct TimingProfile {
    /// Cost of one mode switch.
    pub switch_mode: u64,
    /// Cost of one context save or restore.
    pub context_save: u64,
    /// Cost of the vector lookup.
    pub find_vector: u64,
    /// Cost of loading the ISR address.
    pub load_address: u64,
    /// Cost of the priority check.
    pub priority_check: u64,
    /// Cost of the mask check.
    pub mask_check: u64,
    /// Cost of the return from interrupt.
    pub iret: u64,
}

impl TimingProfile {
    /// Single-tick vector lookup.
    pub const STANDARD: Self = Self {
        switch_mode: 1,
        context_save: 10,
        find_vector: 1,
        load_address: 1,
        priority_check: 1,
        mask_check: 1,
        iret: 1,
    };

    /// Vector lookup modelled as a 25-tick memory fetch.
    pub const SLOW_VECTOR: Self = Self {
        find_vector: 25,
        ..Self::STANDARD
    };

    /// Looks up the tick cost of a fixed-cost step.
    #[must_use]
    pub const fn cost(&self, kind: StepCostKind) -> u64 {
        match kind {
            StepCostKind::SwitchMode => self.switch_mode,
            StepCostKind::ContextSave => self.context_save,
            StepCostKind::FindVector => self.find_vector,
            StepCostKind::LoadAddress => self.load_address,
            StepCostKind::PriorityCheck => self.priority_check,
            StepCostKind::MaskCheck => self.mask_check,
            StepCostKind::Iret => self.iret,
        }
    }

    /// Replaces the tick cost of a fixed-cost step.
    pub fn set_cost(&mut self, kind: StepCostKind, ticks: u64) {
        match kind {
            StepCostKind::SwitchMode => self.switch_mode = ticks,
            StepCostKind::ContextSave => self.context_save = ticks,
            StepCostKind::FindVector => self.find_vector = ticks,
            StepCostKind::LoadAddress => self.load_address = ticks,
            StepCostKind::PriorityCheck => self.priority_check = ticks,
            StepCostKind::MaskCheck => self.mask_check = ticks,
            StepCostKind::Iret => self.iret = ticks,
        }
    }
}

impl Default for TimingProfile {
    fn default() -> Self {
        Self::STANDARD
    }
}

/// Named timing profiles for the known revisions of the dispatch model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Deserialize, serde::Serialize),
    serde(rename_all = "kebab-case")
)]
pub enum TimingPreset {
    /// [`TimingProfile::STANDARD`].
    #[default]
    Standard,
    /// [`TimingProfile::SLOW_VECTOR`].
    SlowVector,
}

impl TimingPreset {
    /// Every preset, in declaration order.
    pub const ALL: [Self; 2] = [Self::Standard, Self::SlowVector];

    /// Returns the timing profile this preset names.
    #[must_use]
    pub const fn profile(self) -> TimingProfile {
        match self {
            Self::Standard => TimingProfile::STANDARD,
            Self::SlowVector => TimingProfile::SLOW_VECTOR,
        }
    }

    /// Stable name used on the command line and in config files.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::SlowVector => "slow-vector",
        }
    }
}

impl fmt::Display for TimingPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A preset or strategy name that matches nothing known.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {what} '{name}' (expected one of: {expected})")]
pub struct UnknownNameError {
    /// What was being named.
    pub what: &'static str,
    /// The rejected name.
    pub name: String,
    /// Comma-separated accepted names.
    pub expected: String,
}

impl FromStr for TimingPreset {
    type Err = UnknownNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|preset| preset.name() == s)
            .ok_or_else(|| UnknownNameError {
                what: "timing preset",
                name: s.to_string(),
                expected: Self::ALL.map(Self::name).join(", "),
            })
    }
}
