//! HTTP server configuration object and helpers.

use std::net::SocketAddr;
use std::sync::Arc;

use url::Url;

use spending_api::domain::DEFAULT_DOWNLOAD_LIMIT;
use spending_api::domain::ports::ResponseCache;
use spending_api::outbound::elasticsearch::ElasticsearchTransactionSearch;
use spending_api::outbound::persistence::DbPool;

#[cfg(feature = "metrics")]
use actix_web_prom::PrometheusMetrics;

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) files_base_url: Url,
    pub(crate) download_limit: u64,
    pub(crate) db_pool: Option<DbPool>,
    pub(crate) search: Option<Arc<ElasticsearchTransactionSearch>>,
    pub(crate) cache: Option<Arc<dyn ResponseCache>>,
    #[cfg(feature = "metrics")]
    pub(crate) prometheus: Option<PrometheusMetrics>,
}

impl ServerConfig {
    /// Construct a configuration backed entirely by fixtures.
    #[must_use]
    pub const fn new(bind_addr: SocketAddr, files_base_url: Url) -> Self {
        Self {
            bind_addr,
            files_base_url,
            download_limit: DEFAULT_DOWNLOAD_LIMIT,
            db_pool: None,
            search: None,
            cache: None,
            #[cfg(feature = "metrics")]
            prometheus: None,
        }
    }

    /// Attach a database connection pool for persistence adapters.
    ///
    /// When provided, the server uses the Diesel repositories instead of
    /// fixtures.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    /// Attach the transaction search adapter.
    #[must_use]
    pub fn with_search(mut self, search: Arc<ElasticsearchTransactionSearch>) -> Self {
        self.search = Some(search);
        self
    }

    /// Attach a response cache; responses are not cached otherwise.
    #[must_use]
    pub fn with_cache(mut self, cache: Arc<dyn ResponseCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Override the largest download the service will build.
    #[must_use]
    pub const fn with_download_limit(mut self, limit: u64) -> Self {
        self.download_limit = limit;
        self
    }

    /// Return the socket address the server will bind to.
    #[must_use]
    pub const fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }

    #[cfg(feature = "metrics")]
    /// Attach Prometheus middleware to the configuration.
    #[must_use]
    pub fn with_metrics(mut self, prometheus: Option<PrometheusMetrics>) -> Self {
        self.prometheus = prometheus;
        self
    }
}
