//! Builds the yearly structure by walking the configured organizations.

use super::fetch_utils::{ResilientFetcher, Sleeper, TokioSleeper};
use super::http_client::create_http_client_with_timeout;
use super::urls::build_matches_url;
use crate::config::{Config, Organization};
use crate::data_fetcher::models::{
    League, OrderedMap, OrganizationEntry, Structure, decode_matches,
};
use crate::data_fetcher::processors::aggregate_matches;
use crate::error::AppError;
use chrono::Local;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::{error, info, instrument, warn};

/// Shared flag raised when the user asks the run to stop.
#[derive(Debug, Clone, Default)]
pub struct ShutdownFlag(Arc<AtomicBool>);

impl ShutdownFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_requested(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Fetches and aggregates every organization, one after another.
pub struct StructureBuilder<S = TokioSleeper> {
    fetcher: ResilientFetcher<S>,
    api_domain: String,
    request_delay: Duration,
    shutdown: ShutdownFlag,
}

impl StructureBuilder<TokioSleeper> {
    /// Builder wired from the run configuration.
    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        let client =
            create_http_client_with_timeout(Duration::from_secs(config.http_timeout_seconds))?;
        Ok(Self::new(
            ResilientFetcher::new(client, config.retry_policy()),
            config.api_base_url(),
            config.request_delay(),
        ))
    }
}

impl<S: Sleeper> StructureBuilder<S> {
    pub fn new(
        fetcher: ResilientFetcher<S>,
        api_domain: impl Into<String>,
        request_delay: Duration,
    ) -> Self {
        Self {
            fetcher,
            api_domain: api_domain.into(),
            request_delay,
            shutdown: ShutdownFlag::new(),
        }
    }

    /// Uses `shutdown` to stop between organizations.
    pub fn with_shutdown(mut self, shutdown: ShutdownFlag) -> Self {
        self.shutdown = shutdown;
        self
    }

    /// Builds the structure for `year`.
    ///
    /// Organizations are processed in the given order with `request_delay`
    /// between two of them. A failing organization is recorded with empty
    /// leagues (and an `error` note if it raised) and the run moves on.
    ///
    /// # Errors
    /// Only `AppError::Interrupted`, when the shutdown flag is raised before
    /// an organization or by the time the last one is done.
    #[instrument(skip(self, organizations), fields(organizations = organizations.len()))]
    pub async fn build(
        &self,
        organizations: &[Organization],
        year: i32,
    ) -> Result<Structure, AppError> {
        let total = organizations.len();
        let mut structure = Structure::new(year, total, Local::now().to_rfc3339());

        for (index, organization) in organizations.iter().enumerate() {
            if self.shutdown.is_requested() {
                warn!("Interrupted before processing {}", organization.name);
                return Err(AppError::Interrupted);
            }

            info!("[{}/{}] Processing {}...", index + 1, total, organization.name);

            let entry = match self.fetch_organization(organization, year).await {
                Ok(leagues) => {
                    if leagues.is_empty() {
                        warn!("No leagues found for {}", organization.name);
                    }
                    OrganizationEntry {
                        id: organization.id.clone(),
                        leagues,
                        error: None,
                    }
                }
                Err(e) => {
                    error!(
                        "Unexpected error while processing {}: {e}",
                        organization.name
                    );
                    OrganizationEntry {
                        id: organization.id.clone(),
                        leagues: OrderedMap::new(),
                        error: Some(e.to_string()),
                    }
                }
            };
            structure.record(organization.name.clone(), entry);

            if index + 1 < total {
                self.fetcher.sleeper().sleep(self.request_delay).await;
            }
        }

        // A request during the last organization must not produce a snapshot
        if self.shutdown.is_requested() {
            warn!("Interrupted after processing {} organizations", structure.organizations.len());
            return Err(AppError::Interrupted);
        }

        Ok(structure)
    }

    /// Fetches one organization's matches and aggregates them.
    ///
    /// A fetch that yields no data, a malformed body or a body that is not a
    /// list all produce an empty mapping. Errors from the fetcher are
    /// passed on.
    #[instrument(skip(self, organization), fields(organization = %organization.name))]
    pub async fn fetch_organization(
        &self,
        organization: &Organization,
        year: i32,
    ) -> Result<OrderedMap<League>, AppError> {
        info!("Loading data for {} ({})", organization.name, organization.id);
        let url = build_matches_url(&self.api_domain, year, &organization.id);

        let Some(body) = self.fetcher.fetch(&url, &organization.name).await? else {
            warn!("Could not fetch data for {}", organization.name);
            return Ok(OrderedMap::new());
        };

        let matches = match decode_matches(&body, &url) {
            Ok(matches) => matches,
            Err(e) => {
                error!("{}: {e}", organization.name);
                return Ok(OrderedMap::new());
            }
        };

        let leagues = aggregate_matches(&matches);
        let teams: usize = leagues.values().map(|league| league.teams.len()).sum();
        info!(
            "Found {} leagues and {} teams for {}",
            leagues.len(),
            teams,
            organization.name
        );
        Ok(leagues)
    }
}
