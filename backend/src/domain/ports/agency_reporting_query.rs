//! Driving port for the agency reporting endpoints.
//!
//! Requests carry raw query values so validation messages are produced in
//! one place, the reporting service.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pagination::Page;
use serde::Serialize;

use crate::domain::{Error, SubmissionPublication};

/// Paging and ordering parameters shared by every listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingParams {
    /// 1-based page.
    pub page: Option<u32>,
    /// Page size.
    pub limit: Option<u32>,
    /// `asc` or `desc`.
    pub order: Option<String>,
    /// Field to sort by.
    pub sort: Option<String>,
}

/// Overview of every agency for one period.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AgenciesOverviewRequest {
    /// Fiscal year; defaults to the latest closed monthly window.
    pub fiscal_year: Option<i32>,
    /// Fiscal period; defaults to the latest closed monthly window.
    pub fiscal_period: Option<u8>,
    /// Case-insensitive substring of the agency name or abbreviation.
    pub filter: Option<String>,
    /// Paging and ordering.
    pub listing: ListingParams,
}

/// Per-period overview of one agency.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AgencyOverviewRequest {
    /// Toptier code path segment.
    pub toptier_code: String,
    /// Paging and ordering.
    pub listing: ListingParams,
}

/// File A / File B differences of one agency and period.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DifferencesRequest {
    /// Toptier code path segment.
    pub toptier_code: String,
    /// Required fiscal year.
    pub fiscal_year: Option<i32>,
    /// Required fiscal period.
    pub fiscal_period: Option<u8>,
    /// Paging and ordering.
    pub listing: ListingParams,
}

/// Publication history of one agency's submission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmissionHistoryRequest {
    /// Toptier code path segment.
    pub toptier_code: String,
    /// Fiscal year path segment.
    pub fiscal_year: i32,
    /// Fiscal period path segment.
    pub fiscal_period: u8,
    /// Paging and ordering.
    pub listing: ListingParams,
}

/// GTAS versus File A reconciliation totals.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TasAccountDiscrepancies {
    /// Obligations reported through GTAS.
    pub gtas_obligation_total: Option<f64>,
    /// Obligations across File A.
    pub tas_accounts_total: Option<f64>,
    /// Obligations of TAS missing from File A.
    pub tas_obligation_not_in_gtas_total: Option<f64>,
    /// Number of TAS missing from File A.
    pub missing_tas_accounts_count: i64,
}

/// Row of the all-agencies overview.
#[expect(missing_docs, reason = "field names are the JSON keys")]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgencyOverviewRow {
    pub agency_name: String,
    pub abbreviation: Option<String>,
    pub toptier_code: String,
    pub agency_id: Option<i32>,
    pub current_total_budget_authority_amount: Option<f64>,
    pub recent_publication_date: Option<DateTime<Utc>>,
    pub recent_publication_date_certified: bool,
    pub tas_account_discrepancies_totals: TasAccountDiscrepancies,
    pub obligation_difference: Option<f64>,
    pub unlinked_contract_award_count: i64,
    pub unlinked_assistance_award_count: i64,
    pub assurance_statement_url: Option<String>,
}

/// Row of one agency's per-period overview.
#[expect(missing_docs, reason = "field names are the JSON keys")]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgencyPeriodRow {
    pub fiscal_year: i32,
    pub fiscal_period: i32,
    pub current_total_budget_authority_amount: Option<f64>,
    pub total_budgetary_resources: Option<f64>,
    pub percent_of_total_budgetary_resources: Option<f64>,
    pub recent_publication_date: Option<DateTime<Utc>>,
    pub recent_publication_date_certified: bool,
    pub tas_account_discrepancies_totals: TasAccountDiscrepancies,
    pub obligation_difference: Option<f64>,
    pub unlinked_contract_award_count: i64,
    pub unlinked_assistance_award_count: i64,
    pub assurance_statement_url: Option<String>,
}

/// Row of the differences listing.
#[expect(missing_docs, reason = "field names are the JSON keys")]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DifferenceRow {
    pub tas: String,
    pub file_a_obligation: f64,
    pub file_b_obligation: f64,
    pub difference: f64,
}

/// Paginated listing with advisory messages.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportingPage<T> {
    /// Metadata and the current page of rows.
    #[serde(flatten)]
    pub page: Page<T>,
    /// Advisory messages; empty unless something needs the caller's attention.
    pub messages: Vec<String>,
}

/// Domain use-case port for agency reporting.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AgencyReportingQuery: Send + Sync {
    /// Overview of every agency for one period.
    async fn agencies_overview(
        &self,
        request: AgenciesOverviewRequest,
    ) -> Result<ReportingPage<AgencyOverviewRow>, Error>;

    /// Per-period overview of one agency.
    async fn agency_overview(
        &self,
        request: AgencyOverviewRequest,
    ) -> Result<ReportingPage<AgencyPeriodRow>, Error>;

    /// TAS whose File A and File B obligations differ.
    async fn differences(
        &self,
        request: DifferencesRequest,
    ) -> Result<ReportingPage<DifferenceRow>, Error>;

    /// Publication history of one submission.
    async fn submission_history(
        &self,
        request: SubmissionHistoryRequest,
    ) -> Result<ReportingPage<SubmissionPublication>, Error>;
}
