//! Builders for HTTP state ports.
//!
//! Each port uses the real adapter when the matching backend is configured
//! and falls back to a fixture otherwise, so the server boots without
//! PostgreSQL or Elasticsearch for smoke tests.

use std::sync::Arc;

use actix_web::web;
use mockable::{Clock, DefaultClock};
use url::Url;

use spending_api::domain::ports::{
    AgencyReportingQuery, FederalAccountCountQuery, FederalAccountRepository,
    FixtureFederalAccountRepository, FixtureRecipientRepository, FixtureReferenceDataRepository,
    FixtureReportingRepository, FixtureTransactionSearch, NoOpResponseCache, RecipientQuery,
    RecipientRepository, ReferenceDataRepository, ReportingRepository, ResponseCache,
    TransactionSearch,
};
use spending_api::domain::{
    AgencyReportingService, DownloadCountService, FederalAccountCountService, RecipientService,
};
use spending_api::inbound::http::state::{HttpState, HttpStatePorts};
use spending_api::outbound::persistence::{
    DbPool, DieselFederalAccountRepository, DieselRecipientRepository,
    DieselReferenceDataRepository, DieselReportingRepository,
};

use super::ServerConfig;

/// Repositories served from one backend.
struct Repositories<D, F, R, P> {
    reference_data: Arc<D>,
    accounts: Arc<F>,
    recipients: Arc<R>,
    reporting: Arc<P>,
}

/// Build the database-facing ports over `repos` and the search-facing ports
/// over `search`.
fn build_ports<D, F, R, P, S>(
    repos: Repositories<D, F, R, P>,
    search: Arc<S>,
    download_limit: u64,
    files_base_url: Url,
) -> HttpStatePorts
where
    D: ReferenceDataRepository + 'static,
    F: FederalAccountRepository + 'static,
    R: RecipientRepository + 'static,
    P: ReportingRepository + 'static,
    S: TransactionSearch + 'static,
{
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let federal_accounts: Arc<dyn FederalAccountCountQuery> = Arc::new(
        FederalAccountCountService::new(repos.reference_data.clone(), repos.accounts, clock.clone()),
    );
    let recipients: Arc<dyn RecipientQuery> = Arc::new(RecipientService::new(
        repos.recipients,
        search.clone(),
        clock.clone(),
    ));
    let reporting: Arc<dyn AgencyReportingQuery> = Arc::new(AgencyReportingService::new(
        repos.reporting,
        repos.reference_data,
        clock,
        files_base_url,
    ));
    HttpStatePorts {
        federal_accounts,
        recipients,
        downloads: Arc::new(DownloadCountService::new(search, download_limit)),
        reporting,
    }
}

fn build_with_search<S>(config: &ServerConfig, search: Arc<S>) -> HttpStatePorts
where
    S: TransactionSearch + 'static,
{
    let limit = config.download_limit;
    let files = config.files_base_url.clone();
    if let Some(pool) = &config.db_pool {
        return build_ports(diesel_repositories(pool), search, limit, files);
    }
    build_ports(fixture_repositories(), search, limit, files)
}

fn diesel_repositories(
    pool: &DbPool,
) -> Repositories<
    DieselReferenceDataRepository,
    DieselFederalAccountRepository,
    DieselRecipientRepository,
    DieselReportingRepository,
> {
    Repositories {
        reference_data: Arc::new(DieselReferenceDataRepository::new(pool.clone())),
        accounts: Arc::new(DieselFederalAccountRepository::new(pool.clone())),
        recipients: Arc::new(DieselRecipientRepository::new(pool.clone())),
        reporting: Arc::new(DieselReportingRepository::new(pool.clone())),
    }
}

fn fixture_repositories() -> Repositories<
    FixtureReferenceDataRepository,
    FixtureFederalAccountRepository,
    FixtureRecipientRepository,
    FixtureReportingRepository,
> {
    Repositories {
        reference_data: Arc::new(FixtureReferenceDataRepository),
        accounts: Arc::new(FixtureFederalAccountRepository::default()),
        recipients: Arc::new(FixtureRecipientRepository),
        reporting: Arc::new(FixtureReportingRepository),
    }
}

/// Build the HTTP state from the configured adapters.
pub(super) fn build_http_state(config: &ServerConfig) -> web::Data<HttpState> {
    let ports = config.search.clone().map_or_else(
        || build_with_search(config, Arc::new(FixtureTransactionSearch)),
        |search| build_with_search(config, search),
    );
    let cache: Arc<dyn ResponseCache> = config
        .cache
        .clone()
        .unwrap_or_else(|| Arc::new(NoOpResponseCache));
    web::Data::new(HttpState::with_cache(ports, cache))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::{self, TestRequest};
    use actix_web::{App, http::StatusCode};
    use rstest::rstest;
    use serde_json::{Value, json};
    use spending_api::inbound::http::configure_api;

    fn fixture_config() -> ServerConfig {
        ServerConfig::new(
            "127.0.0.1:0".parse().expect("valid addr"),
            Url::parse("https://files.example.gov/").expect("valid url"),
        )
    }

    #[rstest]
    #[actix_web::test]
    async fn fixture_state_serves_download_counts() {
        let state = build_http_state(&fixture_config().with_download_limit(0));
        let app = test::init_service(
            App::new()
                .app_data(state)
                .service(web::scope("/api/v2").configure(configure_api)),
        )
        .await;

        let res = test::call_service(
            &app,
            TestRequest::post()
                .uri("/api/v2/download/count/")
                .set_json(json!({"filters": {"keywords": ["bridge"]}}))
                .to_request(),
        )
        .await;

        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["maximum_transaction_limit"], json!(0));
    }
}
