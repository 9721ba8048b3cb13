use std::fmt;

use thiserror::Error;

/// Error classes used for diagnostics aggregation and abort decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum ErrorClass {
    /// Vector source and address slot counts disagree.
    ConfigMismatch,
    /// Call or device number has no entry in a built table.
    OutOfRange,
    /// Trace line could not be turned into an operation record.
    MalformedRecord,
    /// Clock arithmetic left the representable range.
    Overflow,
}

impl ErrorClass {
    /// Classes that abort the run instead of being logged and skipped.
    #[must_use]
    pub const fn is_fatal(self) -> bool {
        matches!(self, Self::OutOfRange | Self::Overflow)
    }
}

/// Lookup table a call or device number is resolved against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum TableKind {
    /// Interrupt vector directory.
    Vector,
    /// Device service-time table.
    Delay,
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Vector => f.write_str("vector table"),
            Self::Delay => f.write_str("device delay table"),
        }
    }
}

/// Vector source held a different number of entries than there are address slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
#[error("number of vectors read ({read}) does not match number of addresses ({slots})")]
pub struct ConfigMismatch {
    /// Vectors successfully parsed from the source.
    pub read: usize,
    /// Predefined memory address slots.
    pub slots: usize,
}

impl ConfigMismatch {
    /// Always [`ErrorClass::ConfigMismatch`]; kept for symmetry with [`DispatchError::class`].
    #[must_use]
    pub const fn class(self) -> ErrorClass {
        ErrorClass::ConfigMismatch
    }
}

/// Failure while expanding a single operation record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum DispatchError {
    /// Number is zero, negative, or beyond the built table.
    #[error("{table} has no entry for number {number} (table holds {len} entries)")]
    OutOfRange {
        /// Table the lookup went to.
        table: TableKind,
        /// Requested 1-based number.
        number: i64,
        /// Number of built entries.
        len: usize,
    },
    /// Advancing the clock would overflow.
    #[error("clock overflow advancing {clock} by {duration} ticks")]
    ClockOverflow {
        /// Clock before the step.
        clock: u64,
        /// Duration of the step that overflowed.
        duration: u64,
    },
}

impl DispatchError {
    /// Returns the diagnostics class for this error.
    #[must_use]
    pub const fn class(&self) -> ErrorClass {
        match self {
            Self::OutOfRange { .. } => ErrorClass::OutOfRange,
            Self::ClockOverflow { .. } => ErrorClass::Overflow,
        }
    }
}

/// Maps a 1-based number onto a 0-based index into a table of `len` entries.
pub(crate) fn one_based_index(number: i64, len: usize) -> Option<usize> {
    usize::try_from(number)
        .ok()
        .and_then(|n| n.checked_sub(1))
        .filter(|index| *index < len)
}

#[cfg(test)]
mod tests {
    use super::{one_based_index, ConfigMismatch, DispatchError, ErrorClass, TableKind};

    #[test]
    fn fatal_classes_match_abort_contract() {
        assert!(ErrorClass::OutOfRange.is_fatal());
        assert!(ErrorClass::Overflow.is_fatal());
        assert!(!ErrorClass::ConfigMismatch.is_fatal());
        assert!(!ErrorClass::MalformedRecord.is_fatal());
    }

    #[test]
    fn class_mapping_matches_taxonomy() {
        let out_of_range = DispatchError::OutOfRange {
            table: TableKind::Vector,
            number: 0,
            len: 25,
        };
        assert_eq!(out_of_range.class(), ErrorClass::OutOfRange);

        let overflow = DispatchError::ClockOverflow {
            clock: u64::MAX,
            duration: 1,
        };
        assert_eq!(overflow.class(), ErrorClass::Overflow);

        let mismatch = ConfigMismatch { read: 20, slots: 25 };
        assert_eq!(mismatch.class(), ErrorClass::ConfigMismatch);
    }

    #[test]
    fn out_of_range_message_names_table_and_number() {
        let error = DispatchError::OutOfRange {
            table: TableKind::Delay,
            number: 42,
            len: 20,
        };
        assert_eq!(
            error.to_string(),
            "device delay table has no entry for number 42 (table holds 20 entries)"
        );
    }

    #[test]
    fn one_based_index_rejects_zero_negative_and_past_end() {
        assert_eq!(one_based_index(1, 3), Some(0));
        assert_eq!(one_based_index(3, 3), Some(2));
        assert_eq!(one_based_index(0, 3), None);
        assert_eq!(one_based_index(-1, 3), None);
        assert_eq!(one_based_index(4, 3), None);
        assert_eq!(one_based_index(1, 0), None);
    }
}
