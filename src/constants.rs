// Constants module for shared string constants

pub const CATALOG_FILE: &str = "catalog.toml";
pub const CONFIG_FILE: &str = "updraft.toml";
pub const DIR_ENV: &str = "UPDRAFT_DIR";

/// Page size used when a listing request does not ask for one
pub const DEFAULT_PAGE_SIZE: i64 = 50;

pub const DEFAULT_CHECK_INTERVAL_SECS: u64 = 3600;
pub const DEFAULT_STORAGE_TIMEOUT_MS: u64 = 5000;

/// How long a catalog writer waits for another process's lock file
pub const CATALOG_LOCK_TIMEOUT_MS: u64 = 10_000;

/// Schema version for the catalog file and the --json output format.
/// Increment only on breaking changes.
pub const SCHEMA_VERSION: u32 = 1;
