//! Agency reporting endpoints.
//!
//! ```text
//! GET /api/v2/reporting/agencies/overview/
//! GET /api/v2/reporting/agencies/{toptier_code}/overview/
//! GET /api/v2/reporting/agencies/{toptier_code}/differences/
//! GET /api/v2/reporting/agencies/{toptier_code}/{fiscal_year}/{fiscal_period}/submission_history/
//! ```
//!
//! Query values are forwarded raw; range and sort validation happens in the
//! reporting service.

use actix_web::{HttpRequest, HttpResponse, get, web};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::domain::ports::{
    AgenciesOverviewRequest, AgencyOverviewRequest, DifferencesRequest, ListingParams,
    SubmissionHistoryRequest,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::response_cache::cached_json;
use crate::inbound::http::schemas::{
    AgenciesOverviewPageSchema, AgencyOverviewPageSchema, DifferencesPageSchema, ErrorSchema,
    SubmissionHistoryPageSchema,
};
use crate::inbound::http::state::HttpState;

/// Paging and ordering shared by every reporting listing.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListingQuery {
    /// Page number, starting at 1.
    #[param(example = 1)]
    pub page: Option<u32>,
    /// Rows per page, 1 to 100.
    #[param(example = 10)]
    pub limit: Option<u32>,
    /// `asc` or `desc`.
    #[param(example = "desc")]
    pub order: Option<String>,
    /// Field to sort by.
    pub sort: Option<String>,
}

impl From<ListingQuery> for ListingParams {
    fn from(query: ListingQuery) -> Self {
        Self {
            page: query.page,
            limit: query.limit,
            order: query.order,
            sort: query.sort,
        }
    }
}

/// Reporting period and name filter of the agencies overview.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AgenciesOverviewQuery {
    /// Fiscal year; requires `fiscal_period`.
    #[param(example = 2020)]
    pub fiscal_year: Option<i32>,
    /// Fiscal period; requires `fiscal_year`.
    #[param(example = 12)]
    pub fiscal_period: Option<u8>,
    /// Case-insensitive substring of the agency name or abbreviation.
    pub filter: Option<String>,
}

/// Reporting period of the differences listing.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PeriodQuery {
    /// Fiscal year.
    #[param(example = 2020)]
    pub fiscal_year: Option<i32>,
    /// Fiscal period.
    #[param(example = 12)]
    pub fiscal_period: Option<u8>,
}

/// Overview of every agency for one reporting period.
#[utoipa::path(
    get,
    path = "/api/v2/reporting/agencies/overview/",
    params(AgenciesOverviewQuery, ListingQuery),
    responses(
        (status = 200, description = "Agencies overview", body = AgenciesOverviewPageSchema),
        (status = 400, description = "Invalid period, paging or sort", body = ErrorSchema),
        (status = 503, description = "Database unavailable", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["reporting"],
    operation_id = "listAgenciesOverview"
)]
#[get("/reporting/agencies/overview/")]
pub async fn agencies_overview(
    state: web::Data<HttpState>,
    req: HttpRequest,
    period: web::Query<AgenciesOverviewQuery>,
    listing: web::Query<ListingQuery>,
) -> ApiResult<HttpResponse> {
    let AgenciesOverviewQuery {
        fiscal_year,
        fiscal_period,
        filter,
    } = period.into_inner();
    let request = AgenciesOverviewRequest {
        fiscal_year,
        fiscal_period,
        filter,
        listing: listing.into_inner().into(),
    };
    cached_json(state.cache.as_ref(), &req, &[], async {
        state.reporting.agencies_overview(request).await
    })
    .await
}

/// Per-period overview of one agency.
#[utoipa::path(
    get,
    path = "/api/v2/reporting/agencies/{toptier_code}/overview/",
    params(
        ("toptier_code" = String, Path, description = "Three or four digit agency code", example = "020"),
        ListingQuery
    ),
    responses(
        (status = 200, description = "Agency overview by period", body = AgencyOverviewPageSchema),
        (status = 400, description = "Invalid paging or sort", body = ErrorSchema),
        (status = 404, description = "Unknown toptier code", body = ErrorSchema),
        (status = 503, description = "Database unavailable", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["reporting"],
    operation_id = "listAgencyOverview"
)]
#[get(r"/reporting/agencies/{toptier_code:\d{3,4}}/overview/")]
pub async fn agency_overview(
    state: web::Data<HttpState>,
    req: HttpRequest,
    path: web::Path<String>,
    listing: web::Query<ListingQuery>,
) -> ApiResult<HttpResponse> {
    let request = AgencyOverviewRequest {
        toptier_code: path.into_inner(),
        listing: listing.into_inner().into(),
    };
    cached_json(state.cache.as_ref(), &req, &[], async {
        state.reporting.agency_overview(request).await
    })
    .await
}

/// TAS whose File A and File B obligations differ in one period.
#[utoipa::path(
    get,
    path = "/api/v2/reporting/agencies/{toptier_code}/differences/",
    params(
        ("toptier_code" = String, Path, description = "Three or four digit agency code", example = "020"),
        PeriodQuery,
        ListingQuery
    ),
    responses(
        (status = 200, description = "File A and File B differences", body = DifferencesPageSchema),
        (status = 400, description = "Missing or invalid period, paging or sort", body = ErrorSchema),
        (status = 404, description = "Unknown toptier code", body = ErrorSchema),
        (status = 503, description = "Database unavailable", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["reporting"],
    operation_id = "listAgencyDifferences"
)]
#[get(r"/reporting/agencies/{toptier_code:\d{3,4}}/differences/")]
pub async fn differences(
    state: web::Data<HttpState>,
    req: HttpRequest,
    path: web::Path<String>,
    period: web::Query<PeriodQuery>,
    listing: web::Query<ListingQuery>,
) -> ApiResult<HttpResponse> {
    let PeriodQuery {
        fiscal_year,
        fiscal_period,
    } = period.into_inner();
    let request = DifferencesRequest {
        toptier_code: path.into_inner(),
        fiscal_year,
        fiscal_period,
        listing: listing.into_inner().into(),
    };
    cached_json(state.cache.as_ref(), &req, &[], async {
        state.reporting.differences(request).await
    })
    .await
}

/// Publication history of one agency submission.
#[utoipa::path(
    get,
    path = "/api/v2/reporting/agencies/{toptier_code}/{fiscal_year}/{fiscal_period}/submission_history/",
    params(
        ("toptier_code" = String, Path, description = "Three or four digit agency code", example = "020"),
        ("fiscal_year" = i32, Path, description = "Four digit fiscal year", example = 2020),
        ("fiscal_period" = u8, Path, description = "Fiscal period", example = 12),
        ListingQuery
    ),
    responses(
        (status = 200, description = "Submission publications", body = SubmissionHistoryPageSchema),
        (status = 400, description = "Invalid period, paging or sort", body = ErrorSchema),
        (status = 404, description = "Unknown toptier code", body = ErrorSchema),
        (status = 503, description = "Database unavailable", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["reporting"],
    operation_id = "listSubmissionHistory"
)]
#[get(
    r"/reporting/agencies/{toptier_code:\d{3,4}}/{fiscal_year:\d{4}}/{fiscal_period:\d{1,2}}/submission_history/"
)]
pub async fn submission_history(
    state: web::Data<HttpState>,
    req: HttpRequest,
    path: web::Path<(String, i32, u8)>,
    listing: web::Query<ListingQuery>,
) -> ApiResult<HttpResponse> {
    let (toptier_code, fiscal_year, fiscal_period) = path.into_inner();
    let request = SubmissionHistoryRequest {
        toptier_code,
        fiscal_year,
        fiscal_period,
        listing: listing.into_inner().into(),
    };
    cached_json(state.cache.as_ref(), &req, &[], async {
        state.reporting.submission_history(request).await
    })
    .await
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::domain::ports::{DifferenceRow, MockAgencyReportingQuery, ReportingPage};
    use crate::domain::{Error, SubmissionPublication};
    use crate::inbound::http::state::HttpStatePorts;
    use crate::inbound::http::test_utils::{call, mock_ports, response_json};
    use actix_web::http::StatusCode;
    use actix_web::test::TestRequest;
    use chrono::{TimeZone, Utc};
    use pagination::PageRequest;
    use rstest::rstest;
    use serde_json::json;

    fn ports_with(query: MockAgencyReportingQuery) -> HttpStatePorts {
        HttpStatePorts {
            reporting: Arc::new(query),
            ..mock_ports()
        }
    }

    fn page_of<T>(rows: Vec<T>) -> ReportingPage<T> {
        let request = PageRequest::new(None, None).expect("default paging");
        ReportingPage {
            page: request.paginate(rows),
            messages: vec![],
        }
    }

    #[rstest]
    #[actix_web::test]
    async fn agencies_overview_forwards_period_filter_and_listing() {
        let mut query = MockAgencyReportingQuery::new();
        query
            .expect_agencies_overview()
            .withf(|request| {
                request.fiscal_year == Some(2020)
                    && request.fiscal_period == Some(6)
                    && request.filter.as_deref() == Some("def")
                    && request.listing.page == Some(2)
                    && request.listing.sort.as_deref() == Some("agency_name")
            })
            .times(1)
            .return_once(|_| Ok(page_of(vec![])));

        let res = call(
            ports_with(query),
            agencies_overview,
            TestRequest::get().uri(
                "/api/v2/reporting/agencies/overview/?fiscal_year=2020&fiscal_period=6&filter=def&page=2&sort=agency_name",
            ),
        )
        .await;

        assert_eq!(res.status(), StatusCode::OK);
        let body = response_json(res).await;
        assert_eq!(body["results"], json!([]));
        assert_eq!(body["messages"], json!([]));
        assert_eq!(body["page_metadata"]["hasNext"], json!(false));
    }

    #[rstest]
    #[actix_web::test]
    async fn non_numeric_page_is_bad_request() {
        let mut query = MockAgencyReportingQuery::new();
        query.expect_agencies_overview().never();

        let res = call(
            ports_with(query),
            agencies_overview,
            TestRequest::get().uri("/api/v2/reporting/agencies/overview/?page=two"),
        )
        .await;

        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body = response_json(res).await;
        assert_eq!(body["details"], json!({ "field": "query" }));
    }

    #[rstest]
    #[actix_web::test]
    async fn agency_overview_maps_unknown_agency_to_not_found() {
        let mut query = MockAgencyReportingQuery::new();
        query
            .expect_agency_overview()
            .withf(|request| request.toptier_code == "999")
            .return_once(|_| {
                Err(Error::not_found(
                    "Agency with a toptier code of '999' does not exist",
                ))
            });

        let res = call(
            ports_with(query),
            agency_overview,
            TestRequest::get().uri("/api/v2/reporting/agencies/999/overview/"),
        )
        .await;

        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[rstest]
    #[case("/api/v2/reporting/agencies/12/overview/")]
    #[case("/api/v2/reporting/agencies/12345/overview/")]
    #[case("/api/v2/reporting/agencies/abc/overview/")]
    #[actix_web::test]
    async fn agency_overview_rejects_malformed_codes(#[case] uri: &str) {
        let res = call(
            mock_ports(),
            agency_overview,
            TestRequest::get().uri(uri),
        )
        .await;

        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[rstest]
    #[actix_web::test]
    async fn differences_returns_rows() {
        let mut query = MockAgencyReportingQuery::new();
        query
            .expect_differences()
            .withf(|request| {
                request.toptier_code == "020"
                    && request.fiscal_year == Some(2020)
                    && request.fiscal_period == Some(12)
            })
            .return_once(|_| {
                Ok(page_of(vec![DifferenceRow {
                    tas: "011-X-8345-000".to_owned(),
                    file_a_obligation: 10.0,
                    file_b_obligation: 4.0,
                    difference: 6.0,
                }]))
            });

        let res = call(
            ports_with(query),
            differences,
            TestRequest::get()
                .uri("/api/v2/reporting/agencies/020/differences/?fiscal_year=2020&fiscal_period=12"),
        )
        .await;

        assert_eq!(res.status(), StatusCode::OK);
        let body = response_json(res).await;
        assert_eq!(body["results"][0]["difference"], json!(6.0));
        assert_eq!(body["page_metadata"]["total"], json!(1));
    }

    #[rstest]
    #[actix_web::test]
    async fn submission_history_parses_path_segments() {
        let published = Utc
            .with_ymd_and_hms(2020, 10, 11, 11, 59, 21)
            .single()
            .expect("valid timestamp");
        let mut query = MockAgencyReportingQuery::new();
        query
            .expect_submission_history()
            .withf(|request| {
                request.toptier_code == "1601"
                    && request.fiscal_year == 2020
                    && request.fiscal_period == 3
            })
            .return_once(move |_| {
                Ok(page_of(vec![SubmissionPublication {
                    publication_date: published,
                    certification_date: None,
                }]))
            });

        let res = call(
            ports_with(query),
            submission_history,
            TestRequest::get()
                .uri("/api/v2/reporting/agencies/1601/2020/3/submission_history/"),
        )
        .await;

        assert_eq!(res.status(), StatusCode::OK);
        let body = response_json(res).await;
        assert_eq!(
            body["results"][0]["publication_date"],
            json!("2020-10-11T11:59:21Z")
        );
        assert_eq!(body["results"][0]["certification_date"], json!(null));
    }
}
