use crate::collection::RecordId;
use crate::common::{Value, DOC_ID};
use crate::errors::{ErrorKind, MigrateError, MigrateResult};
use im::OrdMap;
use std::borrow::Cow;
use std::fmt::{Debug, Display};

/// A document exchanged with storage adapters.
///
/// A document is an ordered set of `String` keys mapped to [Value]s. The
/// `_id` field is reserved: it can only hold a [RecordId] and is normally
/// filled in by the storage adapter during insertion.
///
/// Backed by `im::OrdMap`, so cloning a document is O(1) and the clone is
/// independent of the original once either is mutated.
#[derive(Clone, Eq, PartialEq, Hash, Default, Ord, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Document {
    data: OrdMap<String, Value>,
}

impl Document {
    /// Creates a new empty document.
    pub fn new() -> Self {
        Document {
            data: OrdMap::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Associates `value` with `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// * the key is empty
    /// * the key is `_id` and the value is not a [Value::RecordId]
    ///
    /// # Examples
    ///
    /// ```rust
    /// use stepwise::collection::Document;
    /// use stepwise::common::Value;
    ///
    /// let mut doc = Document::new();
    /// doc.put("version", 3i64).unwrap();
    /// assert_eq!(doc.get("version"), Value::I64(3));
    /// assert!(doc.put("_id", "not an id").is_err());
    /// ```
    pub fn put<'a, T: Into<Value>>(&mut self, key: impl Into<Cow<'a, str>>, value: T) -> MigrateResult<()> {
        let key = key.into();
        if key.is_empty() {
            log::error!("Document does not support empty key");
            return Err(MigrateError::new(
                "Document does not support empty key",
                ErrorKind::InvalidConfiguration,
            ));
        }

        let value = value.into();
        if key == DOC_ID && value.as_record_id().is_none() {
            log::error!("Document id must be a record id, found {}", value);
            return Err(MigrateError::new(
                &format!("Document id must be a record id, found {}", value),
                ErrorKind::EncodingError,
            ));
        }

        self.data.insert(key.into_owned(), value);
        Ok(())
    }

    /// Returns the value of `key`, or [Value::Null] when the key is absent.
    pub fn get(&self, key: &str) -> Value {
        self.data.get(key).cloned().unwrap_or(Value::Null)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.data.remove(key)
    }

    /// The identity assigned by the storage adapter, if the document was stored.
    pub fn id(&self) -> Option<RecordId> {
        self.data.get(DOC_ID).and_then(|v| v.as_record_id().copied())
    }

    pub(crate) fn set_id(&mut self, id: RecordId) {
        self.data.insert(DOC_ID.to_string(), Value::RecordId(id));
    }

    /// Field names in key order.
    pub fn fields(&self) -> Vec<String> {
        self.data.keys().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.data.iter()
    }
}

impl Display for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.data.is_empty() {
            return write!(f, "{{}}");
        }

        let body = self
            .data
            .iter()
            .map(|(key, value)| format!("\"{}\": {}", key, value))
            .collect::<Vec<_>>()
            .join(", ");
        write!(f, "{{{}}}", body)
    }
}

impl Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map().entries(self.data.iter()).finish()
    }
}

/// Builds a [Document] from `"key": value` pairs.
///
/// ```rust
/// use stepwise::doc;
/// use stepwise::common::Value;
///
/// let doc = doc! { "version": 2i64, "note": "seed users" };
/// assert_eq!(doc.get("version"), Value::I64(2));
/// ```
#[macro_export]
macro_rules! doc {
    () => {
        $crate::collection::Document::new()
    };

    ($($key:literal : $value:expr),* $(,)?) => {
        {
            let mut doc = $crate::collection::Document::new();
            $(
                doc.put($key, $crate::common::Value::from($value))
                    .expect(&format!("Failed to put value for key {}", $key));
            )*
            doc
        }
    };
}
