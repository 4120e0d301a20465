// doc constants
pub const DOC_ID: &str = "_id";

// marker record constants
pub const VERSION_FIELD: &str = "version";
pub const TIMESTAMP_FIELD: &str = "timestamp";

// configuration defaults
pub const DEFAULT_SCHEMA: &str = "migrations";
pub const DEFAULT_TIMEOUT: &str = "2s";

// version returned when no marker has been written yet
pub const INITIAL_VERSION: i64 = 0;
