//! Download sizing endpoint.
//!
//! ```text
//! POST /api/v2/download/count/
//! ```

use actix_web::{HttpRequest, HttpResponse, post, web};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

use crate::domain::ports::DownloadCountRequest;
use crate::domain::{
    AgencyFilter, AgencyRole, AgencyTier, Error, RecipientId, TimePeriod, TransactionFilters,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::body::parse_json_body;
use crate::inbound::http::response_cache::cached_json;
use crate::inbound::http::schemas::{DownloadCountResponseSchema, ErrorSchema};
use crate::inbound::http::state::HttpState;

/// Request body for the download count.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct DownloadCountBody {
    /// Transaction filters; at least one must be set.
    #[serde(default)]
    pub filters: Option<FiltersBody>,
}

/// Transaction filters accepted by the download endpoints.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct FiltersBody {
    /// Action date windows.
    pub time_period: Vec<TimePeriodBody>,
    /// Awarding or funding agencies.
    pub agencies: Vec<AgencyFilterBody>,
    /// Award type codes.
    #[schema(example = json!(["A", "B"]))]
    pub award_type_codes: Vec<String>,
    /// Free-text keywords.
    pub keywords: Vec<String>,
    /// Disaster emergency fund codes.
    pub def_codes: Vec<String>,
    /// Recipient hash and level.
    #[schema(example = "00077a9a-5a70-8919-fd19-330762af6b84-R")]
    pub recipient_id: Option<String>,
}

/// Inclusive action date window.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TimePeriodBody {
    /// First action date.
    pub start_date: NaiveDate,
    /// Last action date.
    pub end_date: NaiveDate,
}

/// Agency restriction.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AgencyFilterBody {
    /// `awarding` or `funding`.
    #[serde(rename = "type")]
    #[schema(value_type = String, example = "awarding")]
    pub role: AgencyRole,
    /// `toptier` or `subtier`.
    #[schema(value_type = String, example = "toptier")]
    pub tier: AgencyTier,
    /// Exact agency name.
    pub name: String,
}

impl TryFrom<FiltersBody> for TransactionFilters {
    type Error = Error;

    fn try_from(body: FiltersBody) -> Result<Self, Self::Error> {
        let recipient_id = body
            .recipient_id
            .map(|raw| raw.parse::<RecipientId>())
            .transpose()
            .map_err(|err| {
                Error::unprocessable(err.message().to_owned())
                    .with_details(json!({ "field": "filters|recipient_id" }))
            })?;
        Ok(Self {
            time_period: body
                .time_period
                .into_iter()
                .map(|period| TimePeriod::new(period.start_date, period.end_date))
                .collect(),
            agencies: body
                .agencies
                .into_iter()
                .map(|agency| AgencyFilter {
                    role: agency.role,
                    tier: agency.tier,
                    name: agency.name,
                })
                .collect(),
            award_type_codes: body.award_type_codes,
            keywords: body.keywords,
            def_codes: body.def_codes,
            recipient_id,
        })
    }
}

/// Count the transactions a download would contain.
#[utoipa::path(
    post,
    path = "/api/v2/download/count/",
    request_body = DownloadCountBody,
    responses(
        (status = 200, description = "Transaction count and limit", body = DownloadCountResponseSchema),
        (status = 422, description = "Missing or malformed filters", body = ErrorSchema),
        (status = 503, description = "Search index unavailable", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["download"],
    operation_id = "countDownloadTransactions"
)]
#[post("/download/count/")]
pub async fn download_count(
    state: web::Data<HttpState>,
    req: HttpRequest,
    body: web::Bytes,
) -> ApiResult<HttpResponse> {
    let payload: DownloadCountBody = parse_json_body(&body)?;
    let filters = TransactionFilters::try_from(payload.filters.unwrap_or_default())?;
    cached_json(state.cache.as_ref(), &req, &body, async {
        state.downloads.count(DownloadCountRequest { filters }).await
    })
    .await
}
