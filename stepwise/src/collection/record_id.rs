use crate::ID_GENERATOR;
use std::fmt::{Debug, Display};

/// Identity of a stored document.
///
/// Storage adapters assign a `RecordId` to every document they insert and
/// keep it in the `_id` field. Ids come from a process-wide snowflake
/// generator, so ids created later compare greater.
///
/// # Examples
///
/// ```rust
/// use stepwise::collection::RecordId;
///
/// let first = RecordId::new();
/// let second = RecordId::new();
/// assert!(first < second);
/// assert_eq!(RecordId::from_value(first.id_value()), first);
/// ```
#[derive(PartialEq, Eq, Ord, PartialOrd, Hash, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RecordId {
    id_value: u64,
}

impl RecordId {
    /// Generates a new unique `RecordId`.
    pub fn new() -> Self {
        RecordId {
            id_value: ID_GENERATOR.get_id(),
        }
    }

    /// Rebuilds an id from its numeric value, e.g. when decoding a storage key.
    pub fn from_value(id_value: u64) -> Self {
        RecordId { id_value }
    }

    pub fn id_value(&self) -> u64 {
        self.id_value
    }

    /// Big-endian bytes, so byte order equals numeric order in ordered key spaces.
    pub fn to_be_bytes(&self) -> [u8; 8] {
        self.id_value.to_be_bytes()
    }
}

impl Default for RecordId {
    fn default() -> Self {
        RecordId::new()
    }
}

impl Debug for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "RecordId({})", self.id_value)
    }
}

impl Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id_value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_ids_are_unique_and_ordered() {
        let a = RecordId::new();
        let b = RecordId::new();
        assert_ne!(a, b);
        assert!(a < b);
    }

    #[test]
    fn from_value_round_trips_numeric_value() {
        let id = RecordId::from_value(42);
        assert_eq!(id.id_value(), 42);
        assert_eq!(id.to_string(), "42");
        assert_eq!(format!("{:?}", id), "RecordId(42)");
    }

    #[test]
    fn big_endian_bytes_preserve_order() {
        let small = RecordId::from_value(255);
        let large = RecordId::from_value(256);
        assert!(small.to_be_bytes() < large.to_be_bytes());
    }
}
