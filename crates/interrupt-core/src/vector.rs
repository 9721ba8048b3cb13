//! Interrupt vector directory and its fixed memory address slots.

use tracing::warn;

use crate::fault::{one_based_index, ConfigMismatch, DispatchError, TableKind};

/// Number of predefined vector memory address slots.
pub const VECTOR_SLOT_COUNT: usize = 25;

/// Memory address of each vector slot: `0x0002`, `0x0004`, ... `0x0032`.
pub const VECTOR_MEMORY_ADDRESSES: [u16; VECTOR_SLOT_COUNT] = vector_memory_addresses();

#[allow(clippy::cast_possible_truncation)]
const fn vector_memory_addresses() -> [u16; VECTOR_SLOT_COUNT] {
    let mut addresses = [0; VECTOR_SLOT_COUNT];
    let mut index = 0;
    while index < VECTOR_SLOT_COUNT {
        addresses[index] = ((index + 1) * 2) as u16;
        index += 1;
    }
    addresses
}

/// One resolved interrupt vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct VectorEntry {
    /// 1-based call or device number.
    pub call_number: u32,
    /// Memory position the vector is stored at.
    pub memory_address: u16,
    /// ISR address loaded into the PC.
    pub target_address: u16,
}

/// Immutable map from call number to [`VectorEntry`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VectorDirectory {
    entries: Vec<VectorEntry>,
    mismatch: Option<ConfigMismatch>,
}

impl VectorDirectory {
    /// Builds the directory from vector values in source order.
    ///
    /// Only the prefix shared by `targets` and [`VECTOR_MEMORY_ADDRESSES`] is
    /// populated. A count mismatch is logged and kept in [`Self::mismatch`].
    #[must_use]
    pub fn build(targets: &[u16]) -> Self {
        let mismatch = (targets.len() != VECTOR_SLOT_COUNT).then_some(ConfigMismatch {
            read: targets.len(),
            slots: VECTOR_SLOT_COUNT,
        });
        if let Some(mismatch) = mismatch {
            warn!(read = mismatch.read, slots = mismatch.slots, "{mismatch}");
        }

        let entries = (1..)
            .zip(targets.iter().zip(VECTOR_MEMORY_ADDRESSES))
            .map(|(call_number, (&target_address, memory_address))| VectorEntry {
                call_number,
                memory_address,
                target_address,
            })
            .collect();

        Self { entries, mismatch }
    }

    /// Resolves a 1-based call number.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::OutOfRange`] when `call_number` is below 1 or
    /// past the last populated entry.
    pub fn lookup(&self, call_number: i64) -> Result<VectorEntry, DispatchError> {
        one_based_index(call_number, self.entries.len())
            .map(|index| self.entries[index])
            .ok_or(DispatchError::OutOfRange {
                table: TableKind::Vector,
                number: call_number,
                len: self.entries.len(),
            })
    }

    /// Number of populated entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when no entry was populated.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Populated entries in call-number order.
    #[must_use]
    pub fn entries(&self) -> &[VectorEntry] {
        &self.entries
    }

    /// Count mismatch detected at build time, if any.
    #[must_use]
    pub const fn mismatch(&self) -> Option<ConfigMismatch> {
        self.mismatch
    }
}
