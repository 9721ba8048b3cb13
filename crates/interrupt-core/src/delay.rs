use crate::fault::{one_based_index, DispatchError, TableKind};

/// Immutable map from 1-based device number to base service time.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DeviceDelayTable {
    service_times: Vec<u64>,
}

impl DeviceDelayTable {
    /// Builds the table; position `i` holds device `i + 1`.
    #[must_use]
    pub fn build(service_times: impl IntoIterator<Item = u64>) -> Self {
        Self {
            service_times: service_times.into_iter().collect(),
        }
    }

    /// Returns the base service time of a device.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::OutOfRange`] when `device_number` is below 1
    /// or past the last entry.
    pub fn lookup(&self, device_number: i64) -> Result<u64, DispatchError> {
        one_based_index(device_number, self.service_times.len())
            .map(|index| self.service_times[index])
            .ok_or(DispatchError::OutOfRange {
                table: TableKind::Delay,
                number: device_number,
                len: self.service_times.len(),
            })
    }

    /// Number of devices in the table.
    #[must_use]
    pub fn len(&self) -> usize {
        self.service_times.len()
    }

    /// Returns `true` when the table has no devices.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.service_times.is_empty()
    }
}
