use crate::common::Value;

use super::Filter;

/// Creates a fluent filter builder for the specified field name.
pub fn field(field_name: &str) -> FluentFilter {
    FluentFilter {
        field_name: field_name.to_string(),
    }
}

/// A filter that matches every document.
#[inline]
pub fn all() -> Filter {
    Filter::All
}

/// A fluent builder for constructing filters on a specific field.
pub struct FluentFilter {
    field_name: String,
}

impl FluentFilter {
    #[inline]
    pub fn eq<T: Into<Value>>(self, value: T) -> Filter {
        Filter::Eq(self.field_name, value.into())
    }
}
