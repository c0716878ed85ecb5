pub mod fetch_utils;
pub mod http_client;
pub mod orchestrator;
pub mod retry;
pub mod urls;

// Re-export URL utilities
pub use urls::*;
// Re-export HTTP client utilities
pub use http_client::create_http_client_with_timeout;
pub use fetch_utils::{ResilientFetcher, Sleeper, TokioSleeper};
pub use orchestrator::{ShutdownFlag, StructureBuilder};
pub use retry::{AttemptOutcome, RetryDecision, RetryPolicy};
