use crate::common::{DEFAULT_SCHEMA, DEFAULT_TIMEOUT};
use crate::errors::{ErrorKind, MigrateError, MigrateResult};
use std::time::Duration;

/// User-facing migrator settings, as read from a configuration file or set by
/// hand. Every field is optional; a blank value counts as unset.
///
/// - `schema`: name of the marker collection, `"migrations"` when unset
/// - `timeout`: per storage call deadline as a human-readable duration such
///   as `"2s"`, `"500ms"` or `"1m 30s"`; `"2s"` when unset
///
/// ```rust
/// use stepwise::migrator_config::{MigratorConfig, MigratorOptions};
/// use std::time::Duration;
///
/// let options = MigratorOptions {
///     timeout: Some("10s".to_string()),
///     ..Default::default()
/// };
/// let config = MigratorConfig::from_options(&options).unwrap();
/// assert_eq!(config.schema(), "migrations");
/// assert_eq!(config.timeout(), Duration::from_secs(10));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MigratorOptions {
    pub schema: Option<String>,
    pub timeout: Option<String>,
}

impl MigratorOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_schema(mut self, schema: &str) -> Self {
        self.schema = Some(schema.to_string());
        self
    }

    pub fn with_timeout(mut self, timeout: &str) -> Self {
        self.timeout = Some(timeout.to_string());
        self
    }
}

/// Resolved migrator settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigratorConfig {
    schema: String,
    timeout: Duration,
}

impl MigratorConfig {
    /// Resolves `options`, applying defaults to unset or blank fields.
    ///
    /// # Errors
    ///
    /// * [ErrorKind::InvalidTimeout] if the timeout cannot be parsed
    pub fn from_options(options: &MigratorOptions) -> MigrateResult<Self> {
        Ok(MigratorConfig {
            schema: resolve_schema(options.schema.as_deref()),
            timeout: resolve_timeout(options.timeout.as_deref())?,
        })
    }

    pub fn schema(&self) -> &str {
        &self.schema
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub(crate) fn set_schema(&mut self, schema: &str) {
        self.schema = resolve_schema(Some(schema));
    }

    pub(crate) fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = timeout;
    }
}

impl Default for MigratorConfig {
    fn default() -> Self {
        MigratorConfig {
            schema: DEFAULT_SCHEMA.to_string(),
            timeout: Duration::from_secs(2),
        }
    }
}

/// Parses a human-readable duration such as `"2s"` or `"1m 30s"`.
pub fn parse_timeout(raw: &str) -> MigrateResult<Duration> {
    humantime::parse_duration(raw.trim()).map_err(|err| {
        log::error!("Invalid timeout {:?}: {}", raw, err);
        MigrateError::new(
            &format!("Invalid timeout {:?}: {}", raw, err),
            ErrorKind::InvalidTimeout,
        )
    })
}

/// Parses `raw`, falling back to the default timeout when it is unset or
/// blank.
pub(crate) fn resolve_timeout(raw: Option<&str>) -> MigrateResult<Duration> {
    parse_timeout(non_blank(raw).unwrap_or(DEFAULT_TIMEOUT))
}

fn resolve_schema(raw: Option<&str>) -> String {
    non_blank(raw).unwrap_or(DEFAULT_SCHEMA).to_string()
}

fn non_blank(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|value| !value.is_empty())
}
