use crate::collection::Document;
use crate::common::Value;
use std::fmt::{Display, Formatter};

/// A predicate over a [Document].
///
/// A missing field reads as [Value::Null], so `Eq(field, Value::Null)`
/// matches documents without that field.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    All,
    Eq(String, Value),
}

impl Filter {
    /// Evaluates this filter against `document`.
    pub fn apply(&self, document: &Document) -> bool {
        match self {
            Filter::All => true,
            Filter::Eq(field, operand) => document.get(field) == *operand,
        }
    }
}

impl Display for Filter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Filter::All => write!(f, "All"),
            Filter::Eq(field, value) => write!(f, "({} == {})", field, value),
        }
    }
}
