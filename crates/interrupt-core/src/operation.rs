use std::fmt;
use std::str::FromStr;

use crate::timing::UnknownNameError;

/// Operation kinds accepted in a trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum OperationKind {
    /// CPU burst.
    Cpu,
    /// System call dispatched through the vector table.
    Syscall,
    /// End-of-I/O interrupt from a device.
    EndIo,
}

impl OperationKind {
    /// Every kind, in declaration order.
    pub const ALL: [Self; 3] = [Self::Cpu, Self::Syscall, Self::EndIo];

    /// Keyword used in trace files.
    #[must_use]
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::Cpu => "CPU",
            Self::Syscall => "SYSCALL",
            Self::EndIo => "END_IO",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

impl FromStr for OperationKind {
    type Err = UnknownNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.keyword() == s)
            .ok_or_else(|| UnknownNameError {
                what: "operation kind",
                name: s.to_string(),
                expected: Self::ALL.map(Self::keyword).join(", "),
            })
    }
}

/// One tokenized trace operation.
///
/// A CPU operand is a duration. SYSCALL and END_IO operands are 1-based table
/// numbers and stay signed so that zero or negative values reach the lookup
/// and fail there.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum Operation {
    /// Run on the CPU for `burst` ticks.
    Cpu {
        /// Burst duration in ticks.
        burst: u64,
    },
    /// Dispatch system call `call`.
    Syscall {
        /// 1-based call number.
        call: i64,
    },
    /// Service end-of-I/O interrupt from `device`.
    EndIo {
        /// 1-based device number.
        device: i64,
    },
}

impl Operation {
    /// Returns the trace keyword kind of this operation.
    #[must_use]
    pub const fn kind(&self) -> OperationKind {
        match self {
            Self::Cpu { .. } => OperationKind::Cpu,
            Self::Syscall { .. } => OperationKind::Syscall,
            Self::EndIo { .. } => OperationKind::EndIo,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cpu { burst } => write!(f, "{}, {burst}", self.kind()),
            Self::Syscall { call } => write!(f, "{}, {call}", self.kind()),
            Self::EndIo { device } => write!(f, "{}, {device}", self.kind()),
        }
    }
}

/// Operation together with the 1-based trace line it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct TraceRecord {
    /// 1-based line number in the trace source.
    pub line: usize,
    /// The operation on that line.
    pub operation: Operation,
}

impl TraceRecord {
    /// Creates a record for `operation` read from `line`.
    #[must_use]
    pub const fn new(line: usize, operation: Operation) -> Self {
        Self { line, operation }
    }
}
