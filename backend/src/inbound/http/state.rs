//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    AgencyReportingQuery, DownloadCountQuery, FederalAccountCountQuery, NoOpResponseCache,
    RecipientQuery, ResponseCache,
};

/// Parameter object bundling the use-case ports served over HTTP.
#[derive(Clone)]
pub struct HttpStatePorts {
    /// Disaster federal account counts.
    pub federal_accounts: Arc<dyn FederalAccountCountQuery>,
    /// Recipient overview and children.
    pub recipients: Arc<dyn RecipientQuery>,
    /// Download sizing.
    pub downloads: Arc<dyn DownloadCountQuery>,
    /// Agency reporting listings.
    pub reporting: Arc<dyn AgencyReportingQuery>,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Disaster federal account counts.
    pub federal_accounts: Arc<dyn FederalAccountCountQuery>,
    /// Recipient overview and children.
    pub recipients: Arc<dyn RecipientQuery>,
    /// Download sizing.
    pub downloads: Arc<dyn DownloadCountQuery>,
    /// Agency reporting listings.
    pub reporting: Arc<dyn AgencyReportingQuery>,
    /// Store for successful JSON responses.
    pub cache: Arc<dyn ResponseCache>,
}

impl From<HttpStatePorts> for HttpState {
    fn from(ports: HttpStatePorts) -> Self {
        Self::new(ports)
    }
}

impl HttpState {
    /// Construct state from a ports bundle with caching disabled.
    ///
    /// # Examples
    /// ```no_run
    /// use std::sync::Arc;
    ///
    /// use spending_api::domain::ports::{
    ///     FixtureFederalAccountRepository, FixtureRecipientRepository,
    ///     FixtureReferenceDataRepository, FixtureReportingRepository, FixtureTransactionSearch,
    /// };
    /// use spending_api::domain::{
    ///     AgencyReportingService, DEFAULT_DOWNLOAD_LIMIT, DownloadCountService,
    ///     FederalAccountCountService, RecipientService,
    /// };
    /// use spending_api::inbound::http::state::{HttpState, HttpStatePorts};
    /// use url::Url;
    ///
    /// let clock = Arc::new(mockable::DefaultClock);
    /// let reference = Arc::new(FixtureReferenceDataRepository);
    /// let search = Arc::new(FixtureTransactionSearch);
    /// let ports = HttpStatePorts {
    ///     federal_accounts: Arc::new(FederalAccountCountService::new(
    ///         reference.clone(),
    ///         Arc::new(FixtureFederalAccountRepository::default()),
    ///         clock.clone(),
    ///     )),
    ///     recipients: Arc::new(RecipientService::new(
    ///         Arc::new(FixtureRecipientRepository),
    ///         search.clone(),
    ///         clock.clone(),
    ///     )),
    ///     downloads: Arc::new(DownloadCountService::new(search, DEFAULT_DOWNLOAD_LIMIT)),
    ///     reporting: Arc::new(AgencyReportingService::new(
    ///         Arc::new(FixtureReportingRepository),
    ///         reference,
    ///         clock,
    ///         Url::parse("https://files.example.gov/").expect("valid url"),
    ///     )),
    /// };
    /// let state = HttpState::new(ports);
    /// let _reporting = state.reporting.clone();
    /// ```
    #[must_use]
    pub fn new(ports: HttpStatePorts) -> Self {
        Self::with_cache(ports, Arc::new(NoOpResponseCache))
    }

    /// Construct state from a ports bundle and a response cache.
    #[must_use]
    pub fn with_cache(ports: HttpStatePorts, cache: Arc<dyn ResponseCache>) -> Self {
        let HttpStatePorts {
            federal_accounts,
            recipients,
            downloads,
            reporting,
        } = ports;
        Self {
            federal_accounts,
            recipients,
            downloads,
            reporting,
            cache,
        }
    }
}
