use std::cmp::Ordering;

/// Specifies the direction for sorting documents.
///
/// # Variants
/// - `Ascending`: Sort from smallest to largest value (0 to 9, oldest to newest)
/// - `Descending`: Sort from largest to smallest value (9 to 0, newest to oldest)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    /// Sort in ascending order (smallest to largest, A-Z, oldest to newest)
    Ascending,
    /// Sort in descending order (largest to smallest, Z-A, newest to oldest)
    Descending,
}

impl SortOrder {
    /// Orients an ascending comparison result according to this order.
    #[inline]
    pub fn apply(&self, ordering: Ordering) -> Ordering {
        match self {
            SortOrder::Ascending => ordering,
            SortOrder::Descending => ordering.reverse(),
        }
    }
}

/// Sort specification handed to [crate::store::DocumentCollectionProvider::find_one].
///
/// Documents missing the field sort as [crate::common::Value::Null], which is
/// smaller than every other value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    field: String,
    order: SortOrder,
}

impl SortSpec {
    pub fn new(field: &str, order: SortOrder) -> Self {
        SortSpec {
            field: field.to_string(),
            order,
        }
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn order(&self) -> SortOrder {
        self.order
    }
}

/// Shorthand for `SortSpec::new(field, order)`.
///
/// ```rust
/// use stepwise::common::{order_by, SortOrder};
///
/// let sort = order_by("version", SortOrder::Descending);
/// assert_eq!(sort.field(), "version");
/// ```
#[inline]
pub fn order_by(field: &str, order: SortOrder) -> SortSpec {
    SortSpec::new(field, order)
}
