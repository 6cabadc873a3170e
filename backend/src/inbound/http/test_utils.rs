//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_web::dev::{HttpServiceFactory, ServiceResponse};
use actix_web::test::{self, TestRequest};
use actix_web::{App, web};
use serde_json::Value;

use crate::domain::ports::{
    MockAgencyReportingQuery, MockDownloadCountQuery, MockFederalAccountCountQuery,
    MockRecipientQuery,
};
use crate::inbound::http::error::{path_config, query_config};
use crate::inbound::http::state::{HttpState, HttpStatePorts};

/// Ports whose mocks fail the test when called without expectations.
pub fn mock_ports() -> HttpStatePorts {
    HttpStatePorts {
        federal_accounts: Arc::new(MockFederalAccountCountQuery::new()),
        recipients: Arc::new(MockRecipientQuery::new()),
        downloads: Arc::new(MockDownloadCountQuery::new()),
        reporting: Arc::new(MockAgencyReportingQuery::new()),
    }
}

/// Serve one request against `service` mounted under `/api/v2`.
pub async fn call<F>(ports: HttpStatePorts, service: F, req: TestRequest) -> ServiceResponse
where
    F: HttpServiceFactory + 'static,
{
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(HttpState::new(ports)))
            .app_data(query_config())
            .app_data(path_config())
            .service(web::scope("/api/v2").service(service)),
    )
    .await;
    test::call_service(&app, req.to_request()).await
}

/// Decode a response body as JSON.
pub async fn response_json(res: ServiceResponse) -> Value {
    test::read_body_json(res).await
}
