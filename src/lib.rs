//! BSM league structure extractor
//!
//! This library fetches the season's matches of baseball/softball
//! organizations from the BSM API and derives the organizations → leagues →
//! teams → clubs hierarchy, persisted as one JSON snapshot per year.
//!
//! # Examples
//!
//! ```rust,no_run
//! use bsm_structure::config::{Config, Organization};
//! use bsm_structure::data_fetcher::StructureBuilder;
//! use bsm_structure::error::AppError;
//! use bsm_structure::snapshot::SnapshotWriter;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), AppError> {
//!     let config = Config::default();
//!     let organizations = vec![Organization::new("Bayern", "1")];
//!
//!     // Fetch and aggregate every organization
//!     let structure = StructureBuilder::from_config(&config)?
//!         .build(&organizations, 2025)
//!         .await?;
//!
//!     // Persist data/bsm-structure-2025.json
//!     let path = SnapshotWriter::new(&config.output_dir).write(&structure).await?;
//!     println!("{}", path.display());
//!
//!     Ok(())
//! }
//! ```

pub mod app;
pub mod cli;
pub mod commands;
pub mod config;
pub mod constants;
pub mod data_fetcher;
pub mod error;
pub mod logging;
pub mod snapshot;
pub mod testing_utils;

// Re-export commonly used types for convenience
pub use config::{Config, Organization};
pub use data_fetcher::api::{ResilientFetcher, RetryPolicy};
pub use data_fetcher::models::{Club, League, OrganizationEntry, Structure, Team};
pub use data_fetcher::{ShutdownFlag, StructureBuilder, aggregate_matches};
pub use error::AppError;
pub use snapshot::SnapshotWriter;

/// Current version of the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
