//! Application-wide constants and configuration defaults
//!
//! Every value here is only a default: the fetch and pacing parameters are
//! carried at runtime by [`crate::config::Config`] and the values derived from it.

/// Default API domain of the BSM match service
pub const DEFAULT_API_DOMAIN: &str = "https://bsm.baseball-softball.de";

/// Default timeout for a single HTTP attempt in seconds
pub const DEFAULT_HTTP_TIMEOUT_SECONDS: u64 = 30;

/// Maximum number of idle connections per host kept in the HTTP client pool
pub const HTTP_POOL_MAX_IDLE_PER_HOST: usize = 4;

/// Default location of the organization name → id mapping
pub const DEFAULT_ORGANIZATIONS_FILE: &str = "config/organizations.json";

/// Default directory the season snapshots are written to
pub const DEFAULT_OUTPUT_DIR: &str = "data";

/// Name of the log file inside the log directory
pub const LOG_FILE_NAME: &str = "bsm_structure.log";

/// Retry configuration
pub mod retry {
    /// Attempts per request, including the first one
    pub const MAX_ATTEMPTS: u32 = 3;

    /// Base backoff unit in seconds.
    /// Rate limits and server errors wait `unit * attempt`, network errors wait `unit`.
    pub const BACKOFF_UNIT_SECONDS: u64 = 10;

    /// Pause between two organizations in seconds
    pub const REQUEST_DELAY_SECONDS: u64 = 2;
}

/// Environment variable names
pub mod env_vars {
    /// Override for the API domain
    pub const API_DOMAIN: &str = "BSM_API_DOMAIN";

    /// Override for the log file path
    pub const LOG_FILE: &str = "BSM_LOG_FILE";

    /// Override for the per-attempt HTTP timeout in seconds
    pub const HTTP_TIMEOUT: &str = "BSM_HTTP_TIMEOUT";

    /// Override for the organizations file path
    pub const ORGANIZATIONS_FILE: &str = "BSM_ORGANIZATIONS_FILE";

    /// Override for the snapshot output directory
    pub const OUTPUT_DIR: &str = "BSM_OUTPUT_DIR";
}

/// Process exit codes
pub mod exit_codes {
    pub const GENERAL_FAILURE: u8 = 1;
    pub const CONFIGURATION: u8 = 2;
    pub const PERSISTENCE: u8 = 3;
    /// Conventional 128 + SIGINT
    pub const INTERRUPTED: u8 = 130;
}
