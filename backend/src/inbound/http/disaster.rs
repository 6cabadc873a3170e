//! Disaster spending endpoints.
//!
//! ```text
//! POST /api/v2/disaster/federal_account/count/
//! ```

use actix_web::{HttpRequest, HttpResponse, post, web};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::domain::ports::FederalAccountCountRequest;
use crate::inbound::http::ApiResult;
use crate::inbound::http::body::parse_json_body;
use crate::inbound::http::response_cache::cached_json;
use crate::inbound::http::schemas::{ErrorSchema, FederalAccountCountResponseSchema};
use crate::inbound::http::state::HttpState;

/// Request body for the federal account count.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct FederalAccountCountBody {
    /// Spending filter.
    #[serde(default)]
    pub filter: Option<DisasterFilterBody>,
}

/// Disaster spending filter.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct DisasterFilterBody {
    /// Disaster emergency fund codes.
    #[schema(example = json!(["L", "M"]))]
    pub def_codes: Option<Vec<String>>,
}

impl From<FederalAccountCountBody> for FederalAccountCountRequest {
    fn from(body: FederalAccountCountBody) -> Self {
        Self {
            def_codes: body.filter.and_then(|filter| filter.def_codes),
        }
    }
}

/// Count federal accounts with disaster spending.
#[utoipa::path(
    post,
    path = "/api/v2/disaster/federal_account/count/",
    request_body = FederalAccountCountBody,
    responses(
        (status = 200, description = "Number of federal accounts", body = FederalAccountCountResponseSchema),
        (status = 422, description = "Missing or unknown DEFC codes", body = ErrorSchema),
        (status = 503, description = "Database unavailable", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["disaster"],
    operation_id = "countDisasterFederalAccounts"
)]
#[post("/disaster/federal_account/count/")]
pub async fn federal_account_count(
    state: web::Data<HttpState>,
    req: HttpRequest,
    body: web::Bytes,
) -> ApiResult<HttpResponse> {
    let payload: FederalAccountCountBody = parse_json_body(&body)?;
    cached_json(state.cache.as_ref(), &req, &body, async {
        state.federal_accounts.count(payload.into()).await
    })
    .await
}
