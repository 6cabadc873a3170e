//! HTTP inbound adapter exposing REST endpoints.

pub mod body;
pub mod disaster;
pub mod download;
pub mod error;
pub mod health;
pub mod recipient;
pub mod reporting;
pub mod response_cache;
pub mod schemas;
pub mod state;
#[cfg(test)]
pub mod test_utils;

use actix_web::web;

pub use error::ApiResult;

/// Register every data endpoint on `cfg`; mount it under `/api/v2`.
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.service(disaster::federal_account_count)
        .service(recipient::recipient_children)
        .service(recipient::recipient_overview)
        .service(download::download_count)
        .service(reporting::agencies_overview)
        .service(reporting::agency_overview)
        .service(reporting::differences)
        .service(reporting::submission_history);
}
