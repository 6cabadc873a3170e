//! Recipient profile endpoints.
//!
//! ```text
//! GET /api/v2/recipient/{recipient_id}/?year=
//! GET /api/v2/recipient/children/{duns}/?year=
//! ```

use actix_web::{HttpRequest, HttpResponse, get, web};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::domain::ports::{ChildRecipientsRequest, RecipientOverviewRequest};
use crate::inbound::http::ApiResult;
use crate::inbound::http::response_cache::cached_json;
use crate::inbound::http::schemas::{ChildRecipientSchema, ErrorSchema, RecipientOverviewSchema};
use crate::inbound::http::state::HttpState;

/// Year window shared by the recipient endpoints.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct YearQuery {
    /// `latest` (default), `all` or a fiscal year.
    #[param(example = "latest")]
    pub year: Option<String>,
}

/// Overview of one recipient.
#[utoipa::path(
    get,
    path = "/api/v2/recipient/{recipient_id}/",
    params(
        ("recipient_id" = String, Path, description = "Recipient hash and level", example = "00077a9a-5a70-8919-fd19-330762af6b84-C"),
        YearQuery
    ),
    responses(
        (status = 200, description = "Recipient overview", body = RecipientOverviewSchema),
        (status = 400, description = "Invalid recipient id or year", body = ErrorSchema),
        (status = 503, description = "Backing store unavailable", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["recipient"],
    operation_id = "getRecipientOverview"
)]
#[get("/recipient/{recipient_id}/")]
pub async fn recipient_overview(
    state: web::Data<HttpState>,
    req: HttpRequest,
    path: web::Path<String>,
    query: web::Query<YearQuery>,
) -> ApiResult<HttpResponse> {
    let request = RecipientOverviewRequest {
        recipient_id: path.into_inner(),
        year: query.into_inner().year,
    };
    cached_json(state.cache.as_ref(), &req, &[], async {
        state.recipients.overview(request).await
    })
    .await
}

/// Children of a parent recipient with their obligations.
#[utoipa::path(
    get,
    path = "/api/v2/recipient/children/{duns}/",
    params(
        ("duns" = String, Path, description = "Parent DUNS", example = "001006360"),
        YearQuery
    ),
    responses(
        (status = 200, description = "Child recipients", body = [ChildRecipientSchema]),
        (status = 400, description = "Unknown DUNS or invalid year", body = ErrorSchema),
        (status = 503, description = "Backing store unavailable", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["recipient"],
    operation_id = "listChildRecipients"
)]
#[get("/recipient/children/{duns}/")]
pub async fn recipient_children(
    state: web::Data<HttpState>,
    req: HttpRequest,
    path: web::Path<String>,
    query: web::Query<YearQuery>,
) -> ApiResult<HttpResponse> {
    let request = ChildRecipientsRequest {
        duns: path.into_inner(),
        year: query.into_inner().year,
    };
    cached_json(state.cache.as_ref(), &req, &[], async {
        state.recipients.children(request).await
    })
    .await
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::domain::ports::{ChildRecipient, MockRecipientQuery, RecipientOverview};
    use crate::domain::{Error, RecipientLevel, RecipientLocation};
    use crate::inbound::http::state::HttpStatePorts;
    use crate::inbound::http::test_utils::{call, mock_ports, response_json};
    use actix_web::http::StatusCode;
    use actix_web::test::TestRequest;
    use rstest::rstest;
    use serde_json::json;

    const RECIPIENT_ID: &str = "00077a9a-5a70-8919-fd19-330762af6b84-R";

    fn ports_with(query: MockRecipientQuery) -> HttpStatePorts {
        HttpStatePorts {
            recipients: Arc::new(query),
            ..mock_ports()
        }
    }

    fn overview() -> RecipientOverview {
        RecipientOverview {
            name: Some("ACME".to_owned()),
            alternate_names: vec![],
            duns: Some("001006360".to_owned()),
            uei: None,
            recipient_id: RECIPIENT_ID.to_owned(),
            recipient_level: RecipientLevel::Recipient,
            parent_id: None,
            parent_name: None,
            parent_duns: None,
            parent_uei: None,
            parents: vec![],
            business_types: vec!["category_business".to_owned()],
            location: RecipientLocation::default(),
            total_transaction_amount: 12.5,
            total_transactions: 2,
            total_face_value_loan_amount: 0.0,
            total_face_value_loan_transactions: 0,
        }
    }

    #[rstest]
    #[actix_web::test]
    async fn overview_forwards_path_and_year() {
        let mut query = MockRecipientQuery::new();
        query
            .expect_overview()
            .withf(|request| {
                request.recipient_id == RECIPIENT_ID && request.year.as_deref() == Some("2020")
            })
            .times(1)
            .return_once(|_| Ok(overview()));

        let res = call(
            ports_with(query),
            recipient_overview,
            TestRequest::get().uri(&format!("/api/v2/recipient/{RECIPIENT_ID}/?year=2020")),
        )
        .await;

        assert_eq!(res.status(), StatusCode::OK);
        let body = response_json(res).await;
        assert_eq!(body["recipient_level"], json!("R"));
        assert_eq!(body["total_transaction_amount"], json!(12.5));
        assert_eq!(body["location"]["country_code"], json!(null));
    }

    #[rstest]
    #[actix_web::test]
    async fn overview_surfaces_validation_errors() {
        let mut query = MockRecipientQuery::new();
        query
            .expect_overview()
            .return_once(|_| Err(Error::invalid_request("Invalid year: abc.")));

        let res = call(
            ports_with(query),
            recipient_overview,
            TestRequest::get().uri(&format!("/api/v2/recipient/{RECIPIENT_ID}/?year=abc")),
        )
        .await;

        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body = response_json(res).await;
        assert_eq!(body["message"], json!("Invalid year: abc."));
    }

    #[rstest]
    #[actix_web::test]
    async fn children_omit_missing_state() {
        let mut query = MockRecipientQuery::new();
        query
            .expect_children()
            .withf(|request| request.duns == "001006360" && request.year.is_none())
            .return_once(|_| {
                Ok(vec![
                    ChildRecipient {
                        recipient_id: "00077a9a-5a70-8919-fd19-330762af6b84-C".to_owned(),
                        name: Some("CHILD".to_owned()),
                        duns: None,
                        uei: None,
                        amount: 3.0,
                        state_province: Some(Some("VA".to_owned())),
                    },
                    ChildRecipient {
                        recipient_id: "10077a9a-5a70-8919-fd19-330762af6b84-C".to_owned(),
                        name: None,
                        duns: None,
                        uei: None,
                        amount: 0.0,
                        state_province: None,
                    },
                ])
            });

        let res = call(
            ports_with(query),
            recipient_children,
            TestRequest::get().uri("/api/v2/recipient/children/001006360/"),
        )
        .await;

        assert_eq!(res.status(), StatusCode::OK);
        let body = response_json(res).await;
        assert_eq!(body[0]["state_province"], json!("VA"));
        assert!(body[1].get("state_province").is_none());
    }
}
